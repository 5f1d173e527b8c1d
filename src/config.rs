//! Immutable issuance and verification policy.
//!
//! Everything is validated when the configuration is built so that key and
//! mode errors never reach the per-request path.

use serde::Deserialize;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::codec;
use crate::crypto::TokenCipher;
use crate::error::{ConfigError, CryptoError};

/// Hex key used by [`Configuration::test_defaults`]. Never deploy it.
pub const TEST_KEY: &str = "83ee04d15080db21cc46ed5849c38c7d";

/// Extend code meaning "use the extend value supplied by the caller".
pub const EXTEND_CUSTOMIZABLE: u8 = 14;

/// Extend code reserved for "forever". It is treated as a plain multiplier.
pub const EXTEND_FOREVER: u8 = 15;

/// Largest extend code that fits in the 4-bit header field.
pub const EXTEND_MAX: u8 = 15;

/// How issued tokens can be revoked, and what server state backs them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RevocationMode {
    /// User collaboration: no server state.
    Ucm,
    /// Global allow-list of salts.
    Gwm,
    /// Per-session state with context-hash binding.
    Pss,
}

impl RevocationMode {
    pub fn code(self) -> u8 {
        match self {
            RevocationMode::Ucm => 0,
            RevocationMode::Gwm => 1,
            RevocationMode::Pss => 2,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(RevocationMode::Ucm),
            1 => Some(RevocationMode::Gwm),
            2 => Some(RevocationMode::Pss),
            _ => None,
        }
    }

    /// Whether verification needs a state lookup.
    pub fn is_stateful(self) -> bool {
        self != RevocationMode::Ucm
    }
}

/// Which request attributes are bound into tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ValidationMode {
    /// IP and user-agent binding.
    Strict,
    /// No IP or user-agent binding.
    Loose,
    /// User-agent binding only; mobile clients roam across addresses.
    Mobile,
}

impl ValidationMode {
    pub fn code(self) -> u8 {
        match self {
            ValidationMode::Strict => 0,
            ValidationMode::Loose => 1,
            ValidationMode::Mobile => 2,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(ValidationMode::Strict),
            1 => Some(ValidationMode::Loose),
            2 => Some(ValidationMode::Mobile),
            _ => None,
        }
    }

    pub fn binds_ip(self) -> bool {
        self == ValidationMode::Strict
    }

    pub fn binds_ua(self) -> bool {
        self != ValidationMode::Loose
    }
}

/// Raw secret key bytes, wiped on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SecretKey(Vec<u8>);

impl SecretKey {
    pub fn from_hex(hex: &str) -> Result<Self, ConfigError> {
        let bytes = codec::from_hex(hex.trim()).map_err(|e| ConfigError::InvalidKey(e.to_string()))?;
        Ok(Self(bytes))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl std::fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SecretKey([REDACTED; {}])", self.0.len())
    }
}

/// A mode as written in settings: its numeric code (`2`) or its name (`"PSS"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ModeSetting<M> {
    Code(u8),
    Name(M),
}

impl<M> Default for ModeSetting<M> {
    fn default() -> Self {
        ModeSetting::Code(0)
    }
}

impl<M> ModeSetting<M> {
    /// Resolve to a mode, returning the offending code if it is unknown.
    pub fn resolve(self, from_code: impl FnOnce(u8) -> Option<M>) -> Result<M, u8> {
        match self {
            ModeSetting::Name(mode) => Ok(mode),
            ModeSetting::Code(code) => from_code(code).ok_or(code),
        }
    }
}

/// Serializable form of a configuration, e.g. from a host's config file.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Hex-encoded AES key (16 or 32 bytes).
    pub key: String,
    /// Token lifetime in seconds.
    pub lifetime: u32,
    #[serde(default)]
    pub extend: u8,
    #[serde(default)]
    pub cuc: bool,
    #[serde(default)]
    pub revocation_mode: ModeSetting<RevocationMode>,
    #[serde(default)]
    pub validation_mode: ModeSetting<ValidationMode>,
}

/// Validated, immutable token policy.
#[derive(Debug, Clone)]
pub struct Configuration {
    key: SecretKey,
    cipher: TokenCipher,
    lifetime: u32,
    extend: u8,
    cuc: bool,
    revocation_mode: RevocationMode,
    validation_mode: ValidationMode,
}

impl Configuration {
    pub fn builder() -> ConfigurationBuilder {
        ConfigurationBuilder::default()
    }

    /// Test-mode policy: fixed key, uid consistency on, extend 3,
    /// one hour lifetime, PSS revocation, strict validation.
    pub fn test_defaults() -> Result<Self, ConfigError> {
        Self::builder()
            .hex_key(TEST_KEY)
            .lifetime(3600)
            .extend(3)
            .cuc(true)
            .revocation_mode(RevocationMode::Pss)
            .validation_mode(ValidationMode::Strict)
            .build()
    }

    pub fn secret_key(&self) -> &SecretKey {
        &self.key
    }

    pub fn cipher(&self) -> &TokenCipher {
        &self.cipher
    }

    /// Base token lifetime in seconds.
    pub fn lifetime(&self) -> u32 {
        self.lifetime
    }

    /// Configured extend code.
    pub fn extend(&self) -> u8 {
        self.extend
    }

    /// Client uid consistency: verification requires the token uid to match
    /// the session uid.
    pub fn cuc(&self) -> bool {
        self.cuc
    }

    pub fn revocation_mode(&self) -> RevocationMode {
        self.revocation_mode
    }

    pub fn validation_mode(&self) -> ValidationMode {
        self.validation_mode
    }

    pub fn ua_enabled(&self) -> bool {
        self.validation_mode.binds_ua()
    }

    pub fn ip_enabled(&self) -> bool {
        self.validation_mode.binds_ip()
    }

    /// Extend value written into a new token.
    ///
    /// With the customizable code the caller's value wins, and `None` means it
    /// does not fit the 4-bit header field. Any other configured code is used
    /// as-is and the request is ignored.
    pub fn resolve_extend(&self, requested: u8) -> Option<u8> {
        if self.extend != EXTEND_CUSTOMIZABLE {
            return Some(self.extend);
        }
        (requested <= EXTEND_MAX).then_some(requested)
    }

    pub fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>, CryptoError> {
        self.cipher.encrypt(plaintext)
    }

    pub fn decrypt(&self, blob: &[u8]) -> Result<Vec<u8>, CryptoError> {
        self.cipher.decrypt(blob)
    }
}

impl TryFrom<Settings> for Configuration {
    type Error = ConfigError;

    fn try_from(settings: Settings) -> Result<Self, Self::Error> {
        let revocation_mode = settings
            .revocation_mode
            .resolve(RevocationMode::from_code)
            .map_err(ConfigError::InvalidRevocationMode)?;
        let validation_mode = settings
            .validation_mode
            .resolve(ValidationMode::from_code)
            .map_err(ConfigError::InvalidValidationMode)?;
        Self::builder()
            .hex_key(&settings.key)
            .lifetime(settings.lifetime)
            .extend(settings.extend)
            .cuc(settings.cuc)
            .revocation_mode(revocation_mode)
            .validation_mode(validation_mode)
            .build()
    }
}

#[derive(Debug, Default)]
pub struct ConfigurationBuilder {
    key: Option<Result<SecretKey, ConfigError>>,
    lifetime: Option<u32>,
    extend: u8,
    cuc: bool,
    revocation_mode: Option<RevocationMode>,
    validation_mode: Option<ValidationMode>,
}

impl ConfigurationBuilder {
    pub fn hex_key(mut self, hex: &str) -> Self {
        self.key = Some(SecretKey::from_hex(hex));
        self
    }

    pub fn key(mut self, bytes: &[u8]) -> Self {
        self.key = Some(Ok(SecretKey(bytes.to_vec())));
        self
    }

    pub fn lifetime(mut self, seconds: u32) -> Self {
        self.lifetime = Some(seconds);
        self
    }

    pub fn extend(mut self, extend: u8) -> Self {
        self.extend = extend;
        self
    }

    pub fn cuc(mut self, cuc: bool) -> Self {
        self.cuc = cuc;
        self
    }

    pub fn revocation_mode(mut self, mode: RevocationMode) -> Self {
        self.revocation_mode = Some(mode);
        self
    }

    pub fn validation_mode(mut self, mode: ValidationMode) -> Self {
        self.validation_mode = Some(mode);
        self
    }

    /// Validate and freeze. Defaults: UCM revocation, strict validation.
    pub fn build(self) -> Result<Configuration, ConfigError> {
        let key = self.key.ok_or(ConfigError::Missing("key"))??;
        let lifetime = self.lifetime.ok_or(ConfigError::Missing("lifetime"))?;
        if lifetime == 0 {
            return Err(ConfigError::ZeroLifetime);
        }
        if self.extend > EXTEND_MAX {
            return Err(ConfigError::InvalidExtend(self.extend));
        }
        let cipher =
            TokenCipher::new(key.as_bytes()).map_err(|e| ConfigError::InvalidKey(e.to_string()))?;

        Ok(Configuration {
            key,
            cipher,
            lifetime,
            extend: self.extend,
            cuc: self.cuc,
            revocation_mode: self.revocation_mode.unwrap_or(RevocationMode::Ucm),
            validation_mode: self.validation_mode.unwrap_or(ValidationMode::Strict),
        })
    }
}
