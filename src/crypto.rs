//! AES-GCM token envelope, context hashing and salt generation.
//!
//! Envelope format:
//! [12 bytes: nonce][N bytes: ciphertext][16 bytes: tag]
//! There is no version byte; the plaintext header carries the token version.

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes128Gcm, Aes256Gcm, Nonce};

use crate::codec;
use crate::error::CryptoError;

/// AES-GCM nonce length in bytes (96 bits).
pub const NONCE_LENGTH: usize = 12;

/// AES-GCM tag length in bytes (128 bits).
pub const TAG_LENGTH: usize = 16;

/// AES-128 key length, the reference deployment width.
pub const AES_128_KEY_LENGTH: usize = 16;

/// AES-256 key length.
pub const AES_256_KEY_LENGTH: usize = 32;

/// Generate a random 12-byte nonce.
pub fn generate_nonce() -> Result<[u8; NONCE_LENGTH], CryptoError> {
    let mut nonce = [0u8; NONCE_LENGTH];
    getrandom::getrandom(&mut nonce).map_err(|e| CryptoError::RngFailed(e.to_string()))?;
    Ok(nonce)
}

/// Generate a random salt uniformly in `[1, i64::MAX]`.
///
/// Zero is the "unset" sentinel in state records and is never returned.
pub fn generate_salt() -> Result<u64, CryptoError> {
    loop {
        let mut bytes = [0u8; 8];
        getrandom::getrandom(&mut bytes).map_err(|e| CryptoError::RngFailed(e.to_string()))?;
        let salt = u64::from_be_bytes(bytes) & (i64::MAX as u64);
        if salt != 0 {
            return Ok(salt);
        }
    }
}

/// BLAKE3-256 digest of a plaintext token payload, lower-case hex.
pub fn context_hash(payload: &[u8]) -> String {
    codec::to_hex(blake3::hash(payload).as_bytes(), false)
}

#[derive(Clone)]
enum Cipher {
    Aes128(Aes128Gcm),
    Aes256(Aes256Gcm),
}

/// AES-GCM cipher bound to one secret key.
///
/// Key width selects the variant: 16 bytes for AES-128-GCM, 32 for AES-256-GCM.
#[derive(Clone)]
pub struct TokenCipher {
    cipher: Cipher,
}

impl std::fmt::Debug for TokenCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let variant = match self.cipher {
            Cipher::Aes128(_) => "AES-128-GCM",
            Cipher::Aes256(_) => "AES-256-GCM",
        };
        f.debug_struct("TokenCipher")
            .field("algorithm", &variant)
            .finish_non_exhaustive()
    }
}

impl TokenCipher {
    pub fn new(key: &[u8]) -> Result<Self, CryptoError> {
        let cipher = match key.len() {
            0 => return Err(CryptoError::EmptyKey),
            AES_128_KEY_LENGTH => Cipher::Aes128(
                Aes128Gcm::new_from_slice(key)
                    .map_err(|e| CryptoError::EncryptionFailed(e.to_string()))?,
            ),
            AES_256_KEY_LENGTH => Cipher::Aes256(
                Aes256Gcm::new_from_slice(key)
                    .map_err(|e| CryptoError::EncryptionFailed(e.to_string()))?,
            ),
            other => return Err(CryptoError::InvalidKeyLength(other)),
        };
        Ok(Self { cipher })
    }

    /// Encrypt a payload under a fresh nonce.
    ///
    /// Returns: [nonce:12B][ciphertext+tag]
    pub fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>, CryptoError> {
        if plaintext.is_empty() {
            return Err(CryptoError::EmptyPlaintext);
        }
        let nonce_bytes = generate_nonce()?;
        let nonce = Nonce::from_slice(&nonce_bytes);

        let sealed = match &self.cipher {
            Cipher::Aes128(c) => c.encrypt(nonce, plaintext),
            Cipher::Aes256(c) => c.encrypt(nonce, plaintext),
        }
        .map_err(|e| CryptoError::EncryptionFailed(e.to_string()))?;

        let mut result = Vec::with_capacity(NONCE_LENGTH + sealed.len());
        result.extend_from_slice(&nonce_bytes);
        result.extend_from_slice(&sealed);
        Ok(result)
    }

    /// Decrypt a `[nonce][ciphertext+tag]` blob. Fails when the tag does not verify.
    pub fn decrypt(&self, blob: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let min = NONCE_LENGTH + TAG_LENGTH;
        if blob.len() < min {
            return Err(CryptoError::DataTooShort {
                min,
                got: blob.len(),
            });
        }

        let (nonce_bytes, sealed) = blob.split_at(NONCE_LENGTH);
        let nonce = Nonce::from_slice(nonce_bytes);

        match &self.cipher {
            Cipher::Aes128(c) => c.decrypt(nonce, sealed),
            Cipher::Aes256(c) => c.decrypt(nonce, sealed),
        }
        .map_err(|e| CryptoError::DecryptionFailed(e.to_string()))
    }
}

/// One-shot encryption with a raw key.
pub fn encrypt(plaintext: &[u8], key: &[u8]) -> Result<Vec<u8>, CryptoError> {
    TokenCipher::new(key)?.encrypt(plaintext)
}

/// One-shot decryption with a raw key.
pub fn decrypt(blob: &[u8], key: &[u8]) -> Result<Vec<u8>, CryptoError> {
    TokenCipher::new(key)?.decrypt(blob)
}
