//! Request identity fingerprints bound into tokens.

use std::net::IpAddr;

use xxhash_rust::xxh3::xxh3_64;

use crate::config::ValidationMode;
use crate::error::SrtError;

/// Longest uid the one-byte length prefix can describe.
pub const MAX_UID_LENGTH: usize = u8::MAX as usize;

/// XXH3-64 fingerprint of a user-agent string.
///
/// Not collision resistant against an adversary; it only detects a token
/// replayed from a different client.
pub fn ua_fingerprint(ua: &str) -> u64 {
    xxh3_64(ua.as_bytes())
}

/// Canonical wire bytes of an address: 4 for IPv4, 16 for IPv6.
pub fn ip_bytes(ip: &IpAddr) -> Vec<u8> {
    match ip {
        IpAddr::V4(v4) => v4.octets().to_vec(),
        IpAddr::V6(v6) => v6.octets().to_vec(),
    }
}

/// An authenticated session as seen by the server on one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    uid: String,
    ip: IpAddr,
    ua: u64,
}

impl Session {
    /// Derive fingerprints from raw request attributes.
    ///
    /// The uid must be non-empty ASCII of at most 255 bytes; the IP must be a
    /// literal IPv4 or IPv6 address.
    pub fn new(uid: &str, ip: &str, ua: &str) -> Result<Self, SrtError> {
        if uid.is_empty() {
            return Err(SrtError::InvalidInput("uid is empty".into()));
        }
        if !uid.is_ascii() {
            return Err(SrtError::InvalidInput(format!("uid is not ASCII: {uid:?}")));
        }
        if uid.len() > MAX_UID_LENGTH {
            return Err(SrtError::InvalidInput(format!(
                "uid is {} bytes, max {MAX_UID_LENGTH}",
                uid.len()
            )));
        }
        let ip: IpAddr = ip
            .trim()
            .parse()
            .map_err(|_| SrtError::InvalidInput(format!("Invalid IP address: {ip}")))?;
        Ok(Self {
            uid: uid.to_string(),
            ip,
            ua: ua_fingerprint(ua),
        })
    }

    pub fn uid(&self) -> &str {
        &self.uid
    }

    pub fn uid_bytes(&self) -> &[u8] {
        self.uid.as_bytes()
    }

    pub fn uid_len(&self) -> usize {
        self.uid.len()
    }

    pub fn ip(&self) -> IpAddr {
        self.ip
    }

    pub fn ua(&self) -> u64 {
        self.ua
    }

    /// IP claim length under `mode`: the address width in strict mode, else 0.
    pub fn ip_len(&self, mode: ValidationMode) -> usize {
        if !mode.binds_ip() {
            return 0;
        }
        match self.ip {
            IpAddr::V4(_) => 4,
            IpAddr::V6(_) => 16,
        }
    }

    /// UA claim length under `mode`: 8 unless binding is disabled.
    pub fn ua_len(&self, mode: ValidationMode) -> usize {
        if mode.binds_ua() {
            8
        } else {
            0
        }
    }
}
