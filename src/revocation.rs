//! What "valid state" means under each revocation mode.
//!
//! | Mode | Stored          | Lookup            |
//! |------|-----------------|-------------------|
//! | UCM  | nothing         | none              |
//! | GWM  | salt            | salt, uid ignored |
//! | PSS  | uid, salt, hash | salt; uid for listing and bulk revoke |

use tracing::debug;

use crate::config::RevocationMode;
use crate::error::StoreError;
use crate::storage::{MicroState, StateStore};

/// Mode-specific state operations over a backend.
#[derive(Debug)]
pub struct Revocation<S> {
    mode: RevocationMode,
    store: S,
}

impl<S: StateStore> Revocation<S> {
    pub fn new(mode: RevocationMode, store: S) -> Self {
        Self { mode, store }
    }

    pub fn mode(&self) -> RevocationMode {
        self.mode
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Record a freshly issued token. Salt 0 is never stored.
    pub fn set_state(&self, uid: &[u8], salt: u64, hash: Option<String>) -> Result<(), StoreError> {
        if salt == 0 {
            return Ok(());
        }
        match self.mode {
            RevocationMode::Ucm => Ok(()),
            RevocationMode::Gwm => self.store.put(&MicroState::salt_only(salt)),
            RevocationMode::Pss => {
                if uid.is_empty() || hash.is_none() {
                    debug!(salt, "pss state skipped: missing uid or context hash");
                    return Ok(());
                }
                self.store.put(&MicroState::new(uid, salt, hash))
            }
        }
    }

    /// Store a prepared record under this mode's rules.
    pub fn put_state(&self, state: &MicroState) -> Result<(), StoreError> {
        self.set_state(state.uid.as_deref().unwrap_or_default(), state.salt, state.hash.clone())
    }

    /// Look up the record backing a token. GWM and PSS key on salt alone.
    pub fn get_state(&self, _uid: &[u8], salt: u64) -> Result<Option<MicroState>, StoreError> {
        match self.mode {
            RevocationMode::Ucm => Ok(None),
            RevocationMode::Gwm | RevocationMode::Pss => self.store.get(salt),
        }
    }

    /// Live sessions of `uid`. Only PSS tracks ownership.
    pub fn get_states(&self, uid: &[u8]) -> Result<Vec<MicroState>, StoreError> {
        match self.mode {
            RevocationMode::Pss => self.store.list(uid),
            RevocationMode::Ucm | RevocationMode::Gwm => Ok(Vec::new()),
        }
    }

    /// Revoke every session of `uid`. Only PSS tracks ownership.
    pub fn revoke_all(&self, uid: &[u8]) -> Result<(), StoreError> {
        match self.mode {
            RevocationMode::Pss => self.store.remove_all(uid),
            RevocationMode::Ucm | RevocationMode::Gwm => Ok(()),
        }
    }

    /// Revoke the single session identified by `salt`.
    pub fn revoke(&self, _uid: &[u8], salt: u64) -> Result<(), StoreError> {
        match self.mode {
            RevocationMode::Ucm => Ok(()),
            RevocationMode::Gwm | RevocationMode::Pss => self.store.remove(salt),
        }
    }

    pub fn close(&self) -> Result<(), StoreError> {
        self.store.close()
    }
}
