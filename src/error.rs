use thiserror::Error;

#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("Invalid key length: expected 16 or 32 bytes, got {0}")]
    InvalidKeyLength(usize),

    #[error("Secret key is empty")]
    EmptyKey,

    #[error("Refusing to encrypt an empty payload")]
    EmptyPlaintext,

    #[error("Encrypted data too short: need at least {min} bytes, got {got}")]
    DataTooShort { min: usize, got: usize },

    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("Decryption failed: {0}")]
    DecryptionFailed(String),

    #[error("Random number generation failed: {0}")]
    RngFailed(String),
}

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("Invalid hex: {0}")]
    InvalidHex(#[from] hex::FromHexError),

    #[error("Invalid width: expected {expected} bytes, got {got}")]
    InvalidWidth { expected: usize, got: usize },
}

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("Token truncated at {field}: need {needed} bytes, {remaining} remaining")]
    Truncated {
        field: &'static str,
        needed: usize,
        remaining: usize,
    },

    #[error("Invalid IP family code in header: {0}")]
    InvalidIpFamily(u8),

    #[error("Invalid revocation mode code in header: {0}")]
    InvalidRevocationMode(u8),

    #[error("{0} unexpected trailing bytes after the last claim")]
    TrailingBytes(usize),

    #[error("Malformed transport encoding: {0}")]
    Transport(String),

    #[error("Crypto error: {0}")]
    Crypto(#[from] CryptoError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required setting: {0}")]
    Missing(&'static str),

    #[error("Invalid secret key: {0}")]
    InvalidKey(String),

    #[error("Invalid revocation mode: {0} (expected 0=UCM, 1=GWM, 2=PSS)")]
    InvalidRevocationMode(u8),

    #[error("Invalid validation mode: {0} (expected 0=STRICT, 1=LOOSE, 2=MOBILE)")]
    InvalidValidationMode(u8),

    #[error("Invalid extend code: {0} (must fit in 4 bits)")]
    InvalidExtend(u8),

    #[error("Token lifetime must be positive")]
    ZeroLifetime,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("State store is closed")]
    Closed,

    #[error("State store backend error: {0}")]
    Backend(String),

    #[cfg(feature = "sqlite")]
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

#[derive(Debug, Error)]
pub enum SrtError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Crypto error: {0}")]
    Crypto(#[from] CryptoError),

    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),

    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    #[error("State store error: {0}")]
    Store(#[from] StoreError),
}
