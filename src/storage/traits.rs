//! Persistence contract for revocation state.

use std::sync::Arc;

use crate::error::StoreError;

/// Server-side record backing one issued token.
///
/// Which fields are populated depends on the revocation mode: GWM keeps only
/// the salt, PSS keeps all three.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MicroState {
    pub uid: Option<Vec<u8>>,
    /// Token identity. Zero means "unset" and never backs a valid token.
    pub salt: u64,
    /// Context hash recorded at issuance.
    pub hash: Option<String>,
}

impl MicroState {
    pub fn new(uid: &[u8], salt: u64, hash: Option<String>) -> Self {
        Self {
            uid: Some(uid.to_vec()),
            salt,
            hash,
        }
    }

    pub fn salt_only(salt: u64) -> Self {
        Self {
            uid: None,
            salt,
            hash: None,
        }
    }

    pub fn check_salt(&self, salt: u64) -> bool {
        self.salt == salt
    }

    /// A missing hash on either side never matches.
    pub fn check_hash(&self, hash: Option<&str>) -> bool {
        matches!((self.hash.as_deref(), hash), (Some(a), Some(b)) if a == b)
    }
}

/// Synchronous state backend, keyed by salt with a secondary uid index.
///
/// `put` is an upsert: a salt collision overwrites the older record.
/// Backends must be safe to share between request threads; atomicity of
/// each call is the backend's responsibility.
pub trait StateStore: Send + Sync {
    fn put(&self, state: &MicroState) -> Result<(), StoreError>;

    fn get(&self, salt: u64) -> Result<Option<MicroState>, StoreError>;

    /// All records owned by `uid`.
    fn list(&self, uid: &[u8]) -> Result<Vec<MicroState>, StoreError>;

    fn remove(&self, salt: u64) -> Result<(), StoreError>;

    /// Remove every record owned by `uid`.
    fn remove_all(&self, uid: &[u8]) -> Result<(), StoreError>;

    /// Release backend resources. Later calls fail with `StoreError::Closed`.
    fn close(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

impl<S: StateStore + ?Sized> StateStore for Arc<S> {
    fn put(&self, state: &MicroState) -> Result<(), StoreError> {
        (**self).put(state)
    }

    fn get(&self, salt: u64) -> Result<Option<MicroState>, StoreError> {
        (**self).get(salt)
    }

    fn list(&self, uid: &[u8]) -> Result<Vec<MicroState>, StoreError> {
        (**self).list(uid)
    }

    fn remove(&self, salt: u64) -> Result<(), StoreError> {
        (**self).remove(salt)
    }

    fn remove_all(&self, uid: &[u8]) -> Result<(), StoreError> {
        (**self).remove_all(uid)
    }

    fn close(&self) -> Result<(), StoreError> {
        (**self).close()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_comparison_requires_both_sides() {
        let state = MicroState::new(b"u1", 7, Some("abc".into()));
        assert!(state.check_hash(Some("abc")));
        assert!(!state.check_hash(Some("abd")));
        assert!(!state.check_hash(None));
        assert!(!MicroState::salt_only(7).check_hash(None));
    }

    #[test]
    fn salt_comparison() {
        let state = MicroState::salt_only(42);
        assert!(state.check_salt(42));
        assert!(!state.check_salt(43));
        assert!(state.uid.is_none());
    }
}
