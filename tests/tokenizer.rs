//! End-to-end issue/verify tests through the public API.

use std::sync::Arc;

use srt_token::{
    base64url_decode, base64url_encode, context_hash, Configuration, MemoryStore, MicroState,
    RevocationMode, Session, SrtError, StateStore, Token, Tokenizer, ValidationMode, Verdict,
    EXTEND_CUSTOMIZABLE,
};

// ============================================================================
// Helpers
// ============================================================================

const KEY: &str = "83ee04d15080db21cc46ed5849c38c7d";

fn config(
    revocation: RevocationMode,
    validation: ValidationMode,
    lifetime: u32,
    extend: u8,
) -> Configuration {
    Configuration::builder()
        .hex_key(KEY)
        .lifetime(lifetime)
        .extend(extend)
        .cuc(true)
        .revocation_mode(revocation)
        .validation_mode(validation)
        .build()
        .expect("valid configuration")
}

fn shared(
    revocation: RevocationMode,
    validation: ValidationMode,
) -> (Tokenizer<Arc<MemoryStore>>, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let tokenizer = Tokenizer::new(config(revocation, validation, 60, 0), Arc::clone(&store));
    (tokenizer, store)
}

fn session(ip: &str) -> Session {
    Session::new("u1", ip, "test-agent").expect("valid session")
}

// ============================================================================
// Reference scenario
// ============================================================================

#[test]
fn pss_strict_issue_then_verify() {
    let (t, _) = shared(RevocationMode::Pss, ValidationMode::Strict);
    let token = t.issue(&session("127.0.0.1"), None).unwrap();

    assert_eq!(t.verify(&token, &session("127.0.0.1")).unwrap(), Verdict::Ok);
    assert_eq!(t.verify(&token, &session("10.0.0.1")).unwrap(), Verdict::ErrIp);
}

#[test]
fn token_is_unpadded_base64url() {
    let (t, _) = shared(RevocationMode::Ucm, ValidationMode::Strict);
    let token = t.issue(&session("127.0.0.1"), Some(b"payload")).unwrap();
    assert!(token
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
}

#[test]
fn padded_token_still_verifies() {
    let (t, _) = shared(RevocationMode::Ucm, ValidationMode::Strict);
    let token = t.issue(&session("127.0.0.1"), None).unwrap();
    let padded = match token.len() % 4 {
        2 => format!("{token}=="),
        3 => format!("{token}="),
        _ => token.clone(),
    };
    assert_eq!(t.verify(&padded, &session("127.0.0.1")).unwrap(), Verdict::Ok);
}

// ============================================================================
// Round trip
// ============================================================================

#[test]
fn inspect_reconstructs_claims() {
    let (t, _) = shared(RevocationMode::Pss, ValidationMode::Strict);
    let s = Session::new("alice", "2001:db8::7", "Mozilla/5.0").unwrap();
    let token = t.issue(&s, Some(b"\x00\x01binary\xff")).unwrap();
    let decoded = t.inspect(&token).unwrap();

    assert_eq!(decoded.uid(), b"alice");
    assert_eq!(decoded.ip(), Some(s.ip()));
    assert_eq!(decoded.ua(), Some(s.ua()));
    assert_eq!(decoded.associated_data(), Some(&b"\x00\x01binary\xff"[..]));
    assert_eq!(decoded.revocation_mode(), RevocationMode::Pss);
}

#[test]
fn each_issue_gets_a_fresh_salt() {
    let (t, store) = shared(RevocationMode::Pss, ValidationMode::Strict);
    let a = t.issue(&session("127.0.0.1"), None).unwrap();
    let b = t.issue(&session("127.0.0.1"), None).unwrap();
    assert_ne!(t.inspect(&a).unwrap().salt(), t.inspect(&b).unwrap().salt());
    assert_eq!(store.len(), 2);
    assert_eq!(t.sessions("u1").unwrap().len(), 2);
}

// ============================================================================
// Tampering
// ============================================================================

#[test]
fn every_single_bit_flip_is_rejected() {
    let (t, _) = shared(RevocationMode::Ucm, ValidationMode::Strict);
    let token = t.issue(&session("127.0.0.1"), None).unwrap();
    let blob = base64url_decode(&token).unwrap();

    for byte in 0..blob.len() {
        for bit in 0..8 {
            let mut tampered = blob.clone();
            tampered[byte] ^= 1 << bit;
            let forged = base64url_encode(&tampered);
            let verdict = t.verify(&forged, &session("127.0.0.1")).unwrap();
            assert_eq!(verdict, Verdict::ErrVer, "flip at byte {byte} bit {bit}");
        }
    }
}

#[test]
fn token_from_other_key_is_err_ver() {
    let other = Configuration::builder()
        .hex_key("00112233445566778899aabbccddeeff")
        .lifetime(60)
        .build()
        .unwrap();
    let foreign = Tokenizer::new(other, MemoryStore::new())
        .issue(&session("127.0.0.1"), None)
        .unwrap();
    let (t, _) = shared(RevocationMode::Ucm, ValidationMode::Strict);
    assert_eq!(t.verify(&foreign, &session("127.0.0.1")).unwrap(), Verdict::ErrVer);
}

// ============================================================================
// Expiry
// ============================================================================

#[test]
fn expiry_boundary() {
    let t = Tokenizer::new(
        config(RevocationMode::Ucm, ValidationMode::Strict, 3600, 0),
        MemoryStore::new(),
    );
    let token = t.issue(&session("127.0.0.1"), None).unwrap();
    let issued = t.inspect(&token).unwrap().timestamp();

    let s = session("127.0.0.1");
    assert_eq!(t.verify_at(&token, &s, issued + 3600).unwrap(), Verdict::Ok);
    assert_eq!(t.verify_at(&token, &s, issued + 3601).unwrap(), Verdict::Expired);
}

#[test]
fn extend_multiplies_lifetime() {
    let t = Tokenizer::new(
        config(RevocationMode::Ucm, ValidationMode::Strict, 100, 3),
        MemoryStore::new(),
    );
    let token = t.issue(&session("127.0.0.1"), None).unwrap();
    let issued = t.inspect(&token).unwrap().timestamp();

    let s = session("127.0.0.1");
    assert_eq!(t.verify_at(&token, &s, issued + 250).unwrap(), Verdict::Ok);
    assert_eq!(t.verify_at(&token, &s, issued + 350).unwrap(), Verdict::Expired);
}

#[test]
fn customizable_extend_uses_caller_value() {
    let t = Tokenizer::new(
        config(RevocationMode::Ucm, ValidationMode::Strict, 100, EXTEND_CUSTOMIZABLE),
        MemoryStore::new(),
    );
    let token = t.issue_with_extend(&session("127.0.0.1"), 2, None).unwrap();
    let decoded = t.inspect(&token).unwrap();
    assert_eq!(decoded.extend(), 2);

    let s = session("127.0.0.1");
    let issued = decoded.timestamp();
    assert_eq!(t.verify_at(&token, &s, issued + 200).unwrap(), Verdict::Ok);
    assert_eq!(t.verify_at(&token, &s, issued + 201).unwrap(), Verdict::Expired);
}

#[test]
fn customizable_extend_rejects_out_of_range_request() {
    let t = Tokenizer::new(
        config(RevocationMode::Pss, ValidationMode::Strict, 100, EXTEND_CUSTOMIZABLE),
        MemoryStore::new(),
    );
    let result = t.issue_with_extend(&session("127.0.0.1"), 20, None);
    assert!(matches!(result, Err(SrtError::InvalidInput(_))));
    assert!(t.revocation().store().is_empty());
}

// ============================================================================
// Validation modes
// ============================================================================

#[test]
fn mobile_mode_tolerates_ip_change_but_not_ua() {
    let (t, _) = shared(RevocationMode::Ucm, ValidationMode::Mobile);
    let token = t.issue(&session("127.0.0.1"), None).unwrap();
    assert_eq!(t.verify(&token, &session("10.0.0.1")).unwrap(), Verdict::Ok);

    let other_ua = Session::new("u1", "127.0.0.1", "curl/8").unwrap();
    assert_eq!(t.verify(&token, &other_ua).unwrap(), Verdict::ErrUa);
}

#[test]
fn loose_mode_binds_nothing_but_uid() {
    let (t, _) = shared(RevocationMode::Ucm, ValidationMode::Loose);
    let token = t.issue(&session("127.0.0.1"), None).unwrap();
    let roaming = Session::new("u1", "::1", "curl/8").unwrap();
    assert_eq!(t.verify(&token, &roaming).unwrap(), Verdict::Ok);

    let stranger = Session::new("u2", "127.0.0.1", "test-agent").unwrap();
    assert_eq!(t.verify(&token, &stranger).unwrap(), Verdict::ErrUid);
}

// ============================================================================
// Revocation modes
// ============================================================================

#[test]
fn ucm_passes_with_unreachable_store() {
    let (t, store) = shared(RevocationMode::Ucm, ValidationMode::Strict);
    store.close().unwrap();
    let token = t.issue(&session("127.0.0.1"), None).unwrap();
    assert_eq!(t.verify(&token, &session("127.0.0.1")).unwrap(), Verdict::Ok);
}

#[test]
fn gwm_revoke_by_salt() {
    let (t, _) = shared(RevocationMode::Gwm, ValidationMode::Strict);
    let token = t.issue(&session("127.0.0.1"), None).unwrap();
    assert_eq!(t.verify(&token, &session("127.0.0.1")).unwrap(), Verdict::Ok);

    let salt = t.inspect(&token).unwrap().salt();
    t.revoke("u1", salt).unwrap();
    assert_eq!(t.verify(&token, &session("127.0.0.1")).unwrap(), Verdict::ErrState);
}

#[test]
fn gwm_lookup_ignores_uid() {
    let (t, _) = shared(RevocationMode::Gwm, ValidationMode::Strict);
    let token = t.issue(&session("127.0.0.1"), None).unwrap();
    let salt = t.inspect(&token).unwrap().salt();
    // revoking under any uid removes the global entry
    t.revoke("nobody", salt).unwrap();
    assert_eq!(t.verify(&token, &session("127.0.0.1")).unwrap(), Verdict::ErrState);
}

#[test]
fn pss_revoke_single_and_all() {
    let (t, _) = shared(RevocationMode::Pss, ValidationMode::Strict);
    let a = t.issue(&session("127.0.0.1"), None).unwrap();
    let b = t.issue(&session("127.0.0.1"), None).unwrap();
    let c = t.issue(&session("127.0.0.1"), None).unwrap();

    t.revoke("u1", t.inspect(&a).unwrap().salt()).unwrap();
    assert_eq!(t.verify(&a, &session("127.0.0.1")).unwrap(), Verdict::ErrState);
    assert_eq!(t.verify(&b, &session("127.0.0.1")).unwrap(), Verdict::Ok);

    t.revoke_all("u1").unwrap();
    assert_eq!(t.verify(&b, &session("127.0.0.1")).unwrap(), Verdict::ErrState);
    assert_eq!(t.verify(&c, &session("127.0.0.1")).unwrap(), Verdict::ErrState);
    assert!(t.sessions("u1").unwrap().is_empty());
}

#[test]
fn empty_uid_is_rejected_before_issuance() {
    let result = Session::new("", "127.0.0.1", "ua");
    assert!(matches!(result, Err(SrtError::InvalidInput(_))));
}

#[test]
fn issued_pss_tokens_always_have_backing_state() {
    let (t, store) = shared(RevocationMode::Pss, ValidationMode::Strict);
    let longest = "x".repeat(255);
    for uid in ["a", "u1", longest.as_str()] {
        let s = Session::new(uid, "127.0.0.1", "ua").unwrap();
        let token = t.issue(&s, None).unwrap();
        assert_eq!(t.verify(&token, &s).unwrap(), Verdict::Ok, "uid {uid:?}");
    }
    assert_eq!(store.len(), 3);
}

#[test]
fn pss_hash_binding_detects_reissued_context() {
    let (t, store) = shared(RevocationMode::Pss, ValidationMode::Strict);
    let s = session("127.0.0.1");
    let token = t.issue(&s, Some(b"original")).unwrap();
    let salt = t.inspect(&token).unwrap().salt();

    // Re-issue for the same uid with other associated data and let its hash
    // take over the original salt's record.
    let reissued = Token::encode(&s, t.config(), 0, Some(b"different")).unwrap();
    store
        .put(&MicroState::new(
            b"u1",
            salt,
            Some(context_hash(&reissued.payload)),
        ))
        .unwrap();

    assert_eq!(t.verify(&token, &s).unwrap(), Verdict::ErrHash);
}

#[test]
fn store_outage_is_distinct_from_err_state() {
    let (t, store) = shared(RevocationMode::Gwm, ValidationMode::Strict);
    let token = t.issue(&session("127.0.0.1"), None).unwrap();
    store.close().unwrap();
    let result = t.verify(&token, &session("127.0.0.1"));
    assert!(matches!(result, Err(SrtError::Store(_))));
}

#[test]
fn tokenizer_is_shareable_across_threads() {
    let (t, _) = shared(RevocationMode::Pss, ValidationMode::Strict);
    let t = Arc::new(t);
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let t = Arc::clone(&t);
            std::thread::spawn(move || {
                let s = Session::new(&format!("user-{i}"), "127.0.0.1", "ua").unwrap();
                let token = t.issue(&s, None).unwrap();
                t.verify(&token, &s).unwrap()
            })
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.join().unwrap(), Verdict::Ok);
    }
}
