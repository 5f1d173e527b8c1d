//! Compact, encrypted session tokens bound to the issuing request context.
//!
//! A token is a bit-packed plaintext (header, timestamp, salt, uid and
//! optional UA/IP/associated-data claims) sealed with AES-GCM and carried as
//! unpadded base64url. Verification runs a fixed sequence of checks and
//! reports the first failing one as a [`Verdict`]. Revocation state, if the
//! configured [`RevocationMode`] needs any, lives behind a [`StateStore`].

pub mod base64url;
pub mod buf;
pub mod codec;
pub mod config;
pub mod crypto;
pub mod error;
pub mod header;
pub mod revocation;
pub mod session;
pub mod storage;
pub mod token;
pub mod tokenizer;
pub mod verdict;

pub use base64url::{base64url_decode, base64url_encode};
pub use buf::ByteBuf;
pub use config::{
    Configuration, ConfigurationBuilder, ModeSetting, RevocationMode, SecretKey, Settings,
    ValidationMode, EXTEND_CUSTOMIZABLE, EXTEND_FOREVER,
};
pub use crypto::{context_hash, generate_salt, TokenCipher};
pub use error::{CodecError, ConfigError, CryptoError, DecodeError, SrtError, StoreError};
pub use header::{Header, IpFamily, CURRENT_VERSION};
pub use revocation::Revocation;
pub use session::{ua_fingerprint, Session};
pub use storage::{MemoryStore, MicroState, StateStore};
#[cfg(feature = "sqlite")]
pub use storage::SqliteStore;
pub use token::{EncodedToken, Token, TOKEN_EPOCH_UNIX};
pub use tokenizer::Tokenizer;
pub use verdict::Verdict;
