//! Issue and verify session tokens.
//!
//! Issue: encode claims → record state → AES-GCM seal → base64url.
//! Verify: base64url → open → decode → ordered checks, first failure wins:
//! version, expiry, uid, IP, UA, then (stateful modes only) state presence,
//! context hash (PSS) and salt.

use tracing::{debug, warn};

use crate::base64url::{base64url_decode, base64url_encode};
use crate::config::{Configuration, RevocationMode};
use crate::crypto;
use crate::error::{DecodeError, SrtError};
use crate::revocation::Revocation;
use crate::session::Session;
use crate::storage::{MicroState, StateStore};
use crate::token::{now_token_seconds, Token};
use crate::verdict::Verdict;

/// Token issuer and verifier for one deployment policy.
///
/// The revocation mode of `config` selects how `store` is used.
#[derive(Debug)]
pub struct Tokenizer<S> {
    config: Configuration,
    revocation: Revocation<S>,
}

impl<S: StateStore> Tokenizer<S> {
    pub fn new(config: Configuration, store: S) -> Self {
        let revocation = Revocation::new(config.revocation_mode(), store);
        Self { config, revocation }
    }

    pub fn config(&self) -> &Configuration {
        &self.config
    }

    pub fn revocation(&self) -> &Revocation<S> {
        &self.revocation
    }

    /// Issue a token using the configured extend code.
    pub fn issue(&self, session: &Session, data: Option<&[u8]>) -> Result<String, SrtError> {
        self.issue_with_extend(session, self.config.extend(), data)
    }

    /// Issue a token, requesting `extend` (honored only when the policy is
    /// customizable).
    pub fn issue_with_extend(
        &self,
        session: &Session,
        extend: u8,
        data: Option<&[u8]>,
    ) -> Result<String, SrtError> {
        let encoded = Token::encode(session, &self.config, extend, data)?;
        let hash = (self.config.revocation_mode() == RevocationMode::Pss)
            .then(|| crypto::context_hash(&encoded.payload));

        self.revocation
            .set_state(session.uid_bytes(), encoded.salt, hash)
            .inspect_err(|e| warn!(error = %e, "failed to record token state"))?;

        let sealed = self.config.encrypt(&encoded.payload)?;
        debug!(uid = session.uid(), salt = encoded.salt, "issued token");
        Ok(base64url_encode(&sealed))
    }

    /// Decrypt and decode a token without applying any policy check.
    pub fn inspect(&self, token: &str) -> Result<Token, DecodeError> {
        let sealed =
            base64url_decode(token.trim()).map_err(|e| DecodeError::Transport(e.to_string()))?;
        let payload = self.config.decrypt(&sealed)?;
        Token::decode(&payload)
    }

    /// Verify a token presented with `session`, at the current time.
    pub fn verify(&self, token: &str, session: &Session) -> Result<Verdict, SrtError> {
        self.verify_at(token, session, now_token_seconds())
    }

    /// Verify at an explicit clock reading (seconds since 2020-01-01 UTC).
    ///
    /// Malformed, tampered or undecryptable tokens yield `Verdict::ErrVer`.
    /// `Err` is returned only when the state store fails, so an outage is
    /// never mistaken for a revoked or a valid token.
    pub fn verify_at(&self, token: &str, session: &Session, now: u32) -> Result<Verdict, SrtError> {
        let token = match self.inspect(token) {
            Ok(token) => token,
            Err(e) => {
                debug!(error = %e, "token rejected: undecodable");
                return Ok(Verdict::ErrVer);
            }
        };
        let verdict = self.check(&token, session, now)?;
        debug!(uid = session.uid(), salt = token.salt(), %verdict, "verified token");
        Ok(verdict)
    }

    fn check(&self, token: &Token, session: &Session, now: u32) -> Result<Verdict, SrtError> {
        if !token.is_version_supported() {
            return Ok(Verdict::ErrVer);
        }
        if token.is_expired_at(self.config.lifetime(), now) {
            return Ok(Verdict::Expired);
        }
        if self.config.cuc() && !token.check_uid(session.uid_bytes()) {
            return Ok(Verdict::ErrUid);
        }
        if !token.check_ip(session.ip()) {
            return Ok(Verdict::ErrIp);
        }
        if !token.check_ua(session.ua()) {
            return Ok(Verdict::ErrUa);
        }

        let mode = self.config.revocation_mode();
        if mode == RevocationMode::Ucm {
            return Ok(Verdict::Ok);
        }

        let state = self
            .revocation
            .get_state(token.uid(), token.salt())
            .inspect_err(|e| warn!(error = %e, salt = token.salt(), "state lookup failed"))?;
        let state = match state {
            Some(state) if state.salt != 0 => state,
            _ => return Ok(Verdict::ErrState),
        };

        if mode == RevocationMode::Pss && !state.check_hash(token.context_hash()) {
            return Ok(Verdict::ErrHash);
        }
        if state.check_salt(token.salt()) {
            Ok(Verdict::Ok)
        } else {
            Ok(Verdict::ErrSalt)
        }
    }

    /// Live sessions of `uid` (PSS only; empty in other modes).
    pub fn sessions(&self, uid: &str) -> Result<Vec<MicroState>, SrtError> {
        Ok(self.revocation.get_states(uid.as_bytes())?)
    }

    /// Revoke one session.
    pub fn revoke(&self, uid: &str, salt: u64) -> Result<(), SrtError> {
        self.revocation.revoke(uid.as_bytes(), salt)?;
        debug!(uid, salt, "revoked token");
        Ok(())
    }

    /// Revoke every session of `uid` (PSS only).
    pub fn revoke_all(&self, uid: &str) -> Result<(), SrtError> {
        self.revocation.revoke_all(uid.as_bytes())?;
        debug!(uid, "revoked all tokens");
        Ok(())
    }

    /// Close the backing store.
    pub fn close(&self) -> Result<(), SrtError> {
        Ok(self.revocation.close()?)
    }
}
