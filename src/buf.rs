//! Append-only byte builder for plaintext token payloads.
//!
//! All multi-byte values are written big-endian. The buffer grows on demand;
//! `into_bytes` returns exactly the bytes written, never padded.

/// Growable append-only writer with an explicit write cursor.
#[derive(Debug, Default, Clone)]
pub struct ByteBuf {
    data: Vec<u8>,
}

impl ByteBuf {
    /// Create an empty buffer sized for `capacity` bytes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: Vec::with_capacity(capacity),
        }
    }

    /// Current write position (number of bytes written so far).
    pub fn position(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn append(&mut self, bytes: &[u8]) -> &mut Self {
        self.data.extend_from_slice(bytes);
        self
    }

    /// Append `bytes` only when `condition` holds.
    pub fn append_if(&mut self, condition: bool, bytes: &[u8]) -> &mut Self {
        if condition {
            self.data.extend_from_slice(bytes);
        }
        self
    }

    pub fn append_u8(&mut self, value: u8) -> &mut Self {
        self.data.push(value);
        self
    }

    pub fn append_u16(&mut self, value: u16) -> &mut Self {
        self.append(&value.to_be_bytes())
    }

    pub fn append_u32(&mut self, value: u32) -> &mut Self {
        self.append(&value.to_be_bytes())
    }

    pub fn append_u64(&mut self, value: u64) -> &mut Self {
        self.append(&value.to_be_bytes())
    }

    pub fn append_i32(&mut self, value: i32) -> &mut Self {
        self.append(&value.to_be_bytes())
    }

    pub fn append_i64(&mut self, value: i64) -> &mut Self {
        self.append(&value.to_be_bytes())
    }

    /// IEEE 754 single precision, big-endian.
    pub fn append_f32(&mut self, value: f32) -> &mut Self {
        self.append(&value.to_be_bytes())
    }

    /// IEEE 754 double precision, big-endian.
    pub fn append_f64(&mut self, value: f64) -> &mut Self {
        self.append(&value.to_be_bytes())
    }

    /// Append the UTF-8 encoding of `value`. Rust strings are always UTF-8,
    /// so ASCII input produces its one-byte-per-char form.
    pub fn append_str(&mut self, value: &str) -> &mut Self {
        self.append(value.as_bytes())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Finish writing and take the exact-length payload.
    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }
}
