//! Two-byte token header.
//!
//! ```text
//! byte0: [version:3][extend:4][uaEnabled:1]
//! byte1: [ipEnabled:2][dataAssociated:1][revocationMode:2][cuc:1][reserved:2]
//! ```

use crate::config::RevocationMode;
use crate::error::DecodeError;

/// Length of the encoded header in bytes.
pub const HEADER_LENGTH: usize = 2;

/// The only token version currently issued and accepted.
pub const CURRENT_VERSION: u8 = 0;

const VERSION_SHIFT: u8 = 5;
const VERSION_MASK: u8 = 0b111;
const EXTEND_SHIFT: u8 = 1;
const EXTEND_MASK: u8 = 0b1111;
const UA_BIT: u8 = 0b0000_0001;

const IP_SHIFT: u8 = 6;
const IP_MASK: u8 = 0b11;
const DATA_BIT: u8 = 0b0010_0000;
const MODE_SHIFT: u8 = 3;
const MODE_MASK: u8 = 0b11;
const CUC_BIT: u8 = 0b0000_0100;

/// Address family of the IP claim, or its absence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IpFamily {
    None,
    V4,
    V6,
}

impl IpFamily {
    pub fn code(self) -> u8 {
        match self {
            IpFamily::None => 0,
            IpFamily::V4 => 1,
            IpFamily::V6 => 2,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(IpFamily::None),
            1 => Some(IpFamily::V4),
            2 => Some(IpFamily::V6),
            _ => None,
        }
    }

    /// Family for an IP claim of `len` bytes (0 means no claim).
    pub fn from_len(len: usize) -> Self {
        match len {
            0 => IpFamily::None,
            16 => IpFamily::V6,
            _ => IpFamily::V4,
        }
    }

    /// Claim length in bytes.
    pub fn claim_len(self) -> usize {
        match self {
            IpFamily::None => 0,
            IpFamily::V4 => 4,
            IpFamily::V6 => 16,
        }
    }

    pub fn is_none(self) -> bool {
        self == IpFamily::None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub version: u8,
    pub extend: u8,
    pub ua_enabled: bool,
    pub ip_family: IpFamily,
    pub data_associated: bool,
    pub revocation_mode: RevocationMode,
    pub cuc: bool,
}

impl Header {
    pub fn to_bytes(&self) -> [u8; HEADER_LENGTH] {
        let mut b0 = (self.version & VERSION_MASK) << VERSION_SHIFT;
        b0 |= (self.extend & EXTEND_MASK) << EXTEND_SHIFT;
        if self.ua_enabled {
            b0 |= UA_BIT;
        }

        let mut b1 = (self.ip_family.code() & IP_MASK) << IP_SHIFT;
        if self.data_associated {
            b1 |= DATA_BIT;
        }
        b1 |= (self.revocation_mode.code() & MODE_MASK) << MODE_SHIFT;
        if self.cuc {
            b1 |= CUC_BIT;
        }
        [b0, b1]
    }

    /// Unpack header bits. Reserved bits are ignored.
    pub fn parse(bytes: [u8; HEADER_LENGTH]) -> Result<Self, DecodeError> {
        let [b0, b1] = bytes;
        let ip_code = (b1 >> IP_SHIFT) & IP_MASK;
        let mode_code = (b1 >> MODE_SHIFT) & MODE_MASK;
        Ok(Self {
            version: (b0 >> VERSION_SHIFT) & VERSION_MASK,
            extend: (b0 >> EXTEND_SHIFT) & EXTEND_MASK,
            ua_enabled: b0 & UA_BIT != 0,
            ip_family: IpFamily::from_code(ip_code).ok_or(DecodeError::InvalidIpFamily(ip_code))?,
            data_associated: b1 & DATA_BIT != 0,
            revocation_mode: RevocationMode::from_code(mode_code)
                .ok_or(DecodeError::InvalidRevocationMode(mode_code))?,
            cuc: b1 & CUC_BIT != 0,
        })
    }

    pub fn is_version_supported(&self) -> bool {
        self.version == CURRENT_VERSION
    }
}
