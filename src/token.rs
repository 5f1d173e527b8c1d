//! Plaintext token layout.
//!
//! ```text
//! [2 bytes: header][4 bytes: timestamp u32 BE][8 bytes: salt u64 BE]
//! [1 byte: uid length][uid][8 bytes: UA hash]?[4|16 bytes: IP]?[associated data]?
//! ```
//!
//! Header bits alone decide which optional claims follow and how long they
//! are. There are no separators or claim tags.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use chrono::{DateTime, Utc};

use crate::buf::ByteBuf;
use crate::codec;
use crate::config::{Configuration, RevocationMode, EXTEND_MAX};
use crate::crypto;
use crate::error::{DecodeError, SrtError};
use crate::header::{Header, IpFamily, CURRENT_VERSION, HEADER_LENGTH};
use crate::session::{ip_bytes, Session, MAX_UID_LENGTH};

/// Token timestamps count seconds from 2020-01-01T00:00:00Z.
pub const TOKEN_EPOCH_UNIX: i64 = 1_577_836_800;

/// Bytes before the uid claim: header, timestamp, salt, uid length.
pub const FIXED_PREFIX_LENGTH: usize = HEADER_LENGTH + 4 + 8 + 1;

/// Seconds elapsed between the token epoch and `now`, clamped to `u32`.
pub fn token_seconds(now: DateTime<Utc>) -> u32 {
    let secs = now.timestamp() - TOKEN_EPOCH_UNIX;
    secs.clamp(0, i64::from(u32::MAX)) as u32
}

/// Current time in token seconds.
pub fn now_token_seconds() -> u32 {
    token_seconds(Utc::now())
}

/// Plaintext produced by [`Token::encode`], with the salt it embedded.
#[derive(Debug, Clone)]
pub struct EncodedToken {
    pub payload: Vec<u8>,
    pub salt: u64,
}

/// A decoded token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    header: Header,
    timestamp: u32,
    salt: u64,
    uid: Vec<u8>,
    ua: Option<u64>,
    ip: Option<IpAddr>,
    associated_data: Option<Vec<u8>>,
    context_hash: Option<String>,
}

struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }

    fn take(&mut self, field: &'static str, needed: usize) -> Result<&'a [u8], DecodeError> {
        let remaining = self.remaining();
        if needed > remaining {
            return Err(DecodeError::Truncated {
                field,
                needed,
                remaining,
            });
        }
        let slice = &self.bytes[self.pos..self.pos + needed];
        self.pos += needed;
        Ok(slice)
    }

    fn take_rest(&mut self) -> &'a [u8] {
        let slice = &self.bytes[self.pos..];
        self.pos = self.bytes.len();
        slice
    }

    fn u8(&mut self, field: &'static str) -> Result<u8, DecodeError> {
        Ok(self.take(field, 1)?[0])
    }

    fn u32(&mut self, field: &'static str) -> Result<u32, DecodeError> {
        let bytes = self.take(field, 4)?;
        codec::bytes_to_u32(bytes).map_err(|_| DecodeError::Truncated {
            field,
            needed: 4,
            remaining: bytes.len(),
        })
    }

    fn u64(&mut self, field: &'static str) -> Result<u64, DecodeError> {
        let bytes = self.take(field, 8)?;
        codec::bytes_to_u64(bytes).map_err(|_| DecodeError::Truncated {
            field,
            needed: 8,
            remaining: bytes.len(),
        })
    }
}

fn ip_from_bytes(family: IpFamily, bytes: &[u8]) -> Option<IpAddr> {
    match family {
        IpFamily::None => None,
        IpFamily::V4 => <[u8; 4]>::try_from(bytes).ok().map(|b| IpAddr::V4(Ipv4Addr::from(b))),
        IpFamily::V6 => <[u8; 16]>::try_from(bytes).ok().map(|b| IpAddr::V6(Ipv6Addr::from(b))),
    }
}

impl Token {
    /// Build the plaintext for a new token issued now.
    pub fn encode(
        session: &Session,
        config: &Configuration,
        extend: u8,
        data: Option<&[u8]>,
    ) -> Result<EncodedToken, SrtError> {
        Self::encode_at(session, config, extend, data, now_token_seconds())
    }

    /// Build the plaintext for a token issued at `issued_at` token seconds.
    ///
    /// `extend` is resolved against the configured policy before it is written;
    /// a customizable policy rejects requests above 15.
    /// A fresh random salt is embedded and returned alongside the payload.
    pub fn encode_at(
        session: &Session,
        config: &Configuration,
        extend: u8,
        data: Option<&[u8]>,
        issued_at: u32,
    ) -> Result<EncodedToken, SrtError> {
        let mode = config.validation_mode();
        let uid = session.uid_bytes();
        if uid.len() > MAX_UID_LENGTH {
            return Err(SrtError::InvalidInput(format!(
                "uid is {} bytes, max {MAX_UID_LENGTH}",
                uid.len()
            )));
        }
        let ip_len = session.ip_len(mode);
        let ua_len = session.ua_len(mode);
        let data = data.filter(|d| !d.is_empty());
        let extend = config.resolve_extend(extend).ok_or_else(|| {
            SrtError::InvalidInput(format!("extend {extend} exceeds {EXTEND_MAX}"))
        })?;

        let header = Header {
            version: CURRENT_VERSION,
            extend,
            ua_enabled: ua_len > 0,
            ip_family: IpFamily::from_len(ip_len),
            data_associated: data.is_some(),
            revocation_mode: config.revocation_mode(),
            cuc: config.cuc(),
        };
        let salt = crypto::generate_salt()?;

        let length = FIXED_PREFIX_LENGTH + uid.len() + ua_len + ip_len + data.map_or(0, <[u8]>::len);
        let mut buf = ByteBuf::with_capacity(length);
        buf.append(&header.to_bytes())
            .append_u32(issued_at)
            .append_u64(salt)
            .append_u8(uid.len() as u8)
            .append(uid)
            .append_if(ua_len > 0, &session.ua().to_be_bytes())
            .append_if(ip_len > 0, &ip_bytes(&session.ip()))
            .append_if(data.is_some(), data.unwrap_or_default());

        Ok(EncodedToken {
            payload: buf.into_bytes(),
            salt,
        })
    }

    /// Parse a decrypted payload.
    ///
    /// Claims are consumed in exactly the order `encode` writes them. When the
    /// header names PSS revocation the context hash of the whole payload is
    /// computed and kept on the token.
    pub fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        let mut reader = Reader::new(bytes);
        let head = reader.take("header", HEADER_LENGTH)?;
        let header = Header::parse([head[0], head[1]])?;
        let timestamp = reader.u32("timestamp")?;
        let salt = reader.u64("salt")?;
        let uid_len = reader.u8("uid length")? as usize;
        let uid = reader.take("uid", uid_len)?.to_vec();

        let ua = if header.ua_enabled {
            Some(reader.u64("ua")?)
        } else {
            None
        };

        let ip = if header.ip_family.is_none() {
            None
        } else {
            let raw = reader.take("ip", header.ip_family.claim_len())?;
            ip_from_bytes(header.ip_family, raw)
        };

        let associated_data = if header.data_associated {
            Some(reader.take_rest().to_vec()).filter(|d| !d.is_empty())
        } else {
            None
        };

        if reader.remaining() > 0 {
            return Err(DecodeError::TrailingBytes(reader.remaining()));
        }

        let context_hash =
            (header.revocation_mode == RevocationMode::Pss).then(|| crypto::context_hash(bytes));

        Ok(Self {
            header,
            timestamp,
            salt,
            uid,
            ua,
            ip,
            associated_data,
            context_hash,
        })
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn version(&self) -> u8 {
        self.header.version
    }

    pub fn is_version_supported(&self) -> bool {
        self.header.is_version_supported()
    }

    pub fn extend(&self) -> u8 {
        self.header.extend
    }

    pub fn revocation_mode(&self) -> RevocationMode {
        self.header.revocation_mode
    }

    pub fn cuc(&self) -> bool {
        self.header.cuc
    }

    /// Issue time in token seconds.
    pub fn timestamp(&self) -> u32 {
        self.timestamp
    }

    /// Issue time as a UTC instant.
    pub fn issued_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(TOKEN_EPOCH_UNIX + i64::from(self.timestamp), 0)
    }

    pub fn salt(&self) -> u64 {
        self.salt
    }

    pub fn uid(&self) -> &[u8] {
        &self.uid
    }

    pub fn ua(&self) -> Option<u64> {
        self.ua
    }

    pub fn ip(&self) -> Option<IpAddr> {
        self.ip
    }

    pub fn associated_data(&self) -> Option<&[u8]> {
        self.associated_data.as_deref()
    }

    /// BLAKE3 hash of the decoded payload; present only for PSS tokens.
    pub fn context_hash(&self) -> Option<&str> {
        self.context_hash.as_deref()
    }

    /// Whether the token has outlived `lifetime` seconds at token time `now`.
    ///
    /// Past the base lifetime a non-zero extend code stretches the window to
    /// `extend * lifetime`. Code 15 gets no special treatment.
    pub fn is_expired_at(&self, lifetime: u32, now: u32) -> bool {
        let elapsed = i64::from(now) - i64::from(self.timestamp);
        if elapsed <= i64::from(lifetime) {
            return false;
        }
        if self.header.extend == 0 {
            return true;
        }
        i64::from(self.header.extend) * i64::from(lifetime) < elapsed
    }

    pub fn is_expired(&self, lifetime: u32) -> bool {
        self.is_expired_at(lifetime, now_token_seconds())
    }

    pub fn check_uid(&self, uid: &[u8]) -> bool {
        self.uid == uid
    }

    /// Tokens without an IP claim always pass.
    pub fn check_ip(&self, ip: IpAddr) -> bool {
        self.ip.map_or(true, |embedded| embedded == ip)
    }

    /// Tokens without a UA claim always pass.
    pub fn check_ua(&self, ua: u64) -> bool {
        self.ua.map_or(true, |embedded| embedded == ua)
    }
}
