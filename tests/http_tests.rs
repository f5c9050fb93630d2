use aip::aip::constants::{
    AIP_CONTENT_TYPE, AIP_SIGNATURE_HEADER, AIP_VERSION, AIP_VERSION_HEADER, ALGORITHM_VERSION,
    CHECKPOINT_ID_PREFIX, DRIFT_ALERT_ID_PREFIX, REGISTRATION_ID_PREFIX, WEBHOOK_MAX_RETRIES,
    WEBHOOK_RETRY_DELAYS_MS,
};
use aip::aip::http::{sign_payload, verify_signature};

#[test]
fn test_sign_payload_format_and_determinism() {
    let signature = sign_payload("secret", "payload");
    assert!(signature.starts_with("sha256="));
    let hex = &signature["sha256=".len()..];
    assert_eq!(hex.len(), 64);
    assert!(hex.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));

    assert_eq!(signature, sign_payload("secret", "payload"));
    assert_ne!(signature, sign_payload("secret", "payload2"));
    assert_ne!(signature, sign_payload("secret2", "payload"));
}

#[test]
fn test_sign_payload_matches_known_hmac_vector() {
    // RFC 4231 test case 2.
    let signature = sign_payload("Jefe", "what do ya want for nothing?");
    assert_eq!(
        signature,
        "sha256=5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843"
    );
}

#[test]
fn test_verify_signature_round_trip() {
    let payload = r#"{"proceed":true,"recommended_action":"continue"}"#;
    let signature = sign_payload("shared-secret", payload);

    assert!(verify_signature("shared-secret", payload, &signature));
}

#[test]
fn test_verify_rejects_any_tampering() {
    let payload = r#"{"proceed":true}"#;
    let signature = sign_payload("shared-secret", payload);

    // Tampered payload.
    assert!(!verify_signature("shared-secret", r#"{"proceed":false}"#, &signature));
    // Wrong secret.
    assert!(!verify_signature("other-secret", payload, &signature));
    // Tampered signature (flip the final hex digit).
    let mut tampered = signature.clone();
    let last = tampered.pop().unwrap();
    tampered.push(if last == '0' { '1' } else { '0' });
    assert!(!verify_signature("shared-secret", payload, &tampered));
    // Malformed signature shapes.
    assert!(!verify_signature("shared-secret", payload, ""));
    assert!(!verify_signature("shared-secret", payload, "sha256=short"));
}

#[test]
fn test_protocol_constants() {
    assert_eq!(AIP_VERSION, "0.1.0");
    assert_eq!(ALGORITHM_VERSION, "1.0.0");
    assert_eq!(AIP_CONTENT_TYPE, "application/aip+json");
    assert_eq!(AIP_VERSION_HEADER, "X-AIP-Version");
    assert_eq!(AIP_SIGNATURE_HEADER, "X-AIP-Signature");
    assert_eq!(CHECKPOINT_ID_PREFIX, "ic-");
    assert_eq!(DRIFT_ALERT_ID_PREFIX, "ida-");
    assert_eq!(REGISTRATION_ID_PREFIX, "reg-");
    assert_eq!(WEBHOOK_MAX_RETRIES, 3);
    assert_eq!(WEBHOOK_RETRY_DELAYS_MS, [1000, 4000, 16000]);
}
