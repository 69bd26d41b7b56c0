//! Property-based tests for signature validation invariants.
//!
//! Uses randomly generated payloads, secrets, and corruptions to verify
//! that the authorizer's core properties always hold: a correctly signed
//! payload verifies, any corruption of payload, signature, or secret does
//! not, and verification never panics on arbitrary header values.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use kotori_api::crypto::{sign, verify_signature};
use proptest::prelude::*;
use proptest::test_runner::Config as ProptestConfig;

/// Creates property test configuration based on environment.
///
/// Uses environment variables:
/// - `PROPTEST_CASES`: Number of test cases
/// - `CI`: If set to "true", uses CI configuration
fn proptest_config() -> ProptestConfig {
    let is_ci = std::env::var("CI").unwrap_or_default() == "true";
    let default_cases = if is_ci { 256 } else { 64 };

    let cases =
        std::env::var("PROPTEST_CASES").ok().and_then(|s| s.parse().ok()).unwrap_or(default_cases);

    ProptestConfig::with_cases(cases)
}

proptest! {
    #![proptest_config(proptest_config())]

    /// A payload signed with a secret always verifies with that secret.
    #[test]
    fn signed_payload_always_verifies(
        payload in prop::collection::vec(any::<u8>(), 0..4096),
        secret in "[ -~]{1,64}",
    ) {
        let signature = sign(&secret, &payload);
        prop_assert!(verify_signature(&payload, &signature, &secret));
    }

    /// Verification with a different secret never succeeds.
    #[test]
    fn different_secret_never_verifies(
        payload in prop::collection::vec(any::<u8>(), 0..4096),
        secret in "[ -~]{1,64}",
        other in "[ -~]{1,64}",
    ) {
        prop_assume!(secret != other);
        let signature = sign(&secret, &payload);
        prop_assert!(!verify_signature(&payload, &signature, &other));
    }

    /// Flipping any single byte of the payload invalidates the signature.
    #[test]
    fn payload_corruption_invalidates_signature(
        payload in prop::collection::vec(any::<u8>(), 1..4096),
        secret in "[ -~]{1,64}",
        index in any::<prop::sample::Index>(),
        flip in 1u8..=255,
    ) {
        let signature = sign(&secret, &payload);

        let mut corrupted = payload.clone();
        let i = index.index(corrupted.len());
        corrupted[i] ^= flip;

        prop_assert!(!verify_signature(&corrupted, &signature, &secret));
    }

    /// Flipping any single bit of the decoded signature invalidates it.
    #[test]
    fn signature_corruption_invalidates_signature(
        payload in prop::collection::vec(any::<u8>(), 0..1024),
        secret in "[ -~]{1,64}",
        index in any::<prop::sample::Index>(),
        flip in 1u8..=255,
    ) {
        let signature = sign(&secret, &payload);

        let mut digest = BASE64.decode(&signature).unwrap();
        let i = index.index(digest.len());
        digest[i] ^= flip;
        let corrupted = BASE64.encode(digest);

        prop_assert!(!verify_signature(&payload, &corrupted, &secret));
    }

    /// Arbitrary header values never panic and never verify by accident.
    #[test]
    fn arbitrary_header_values_never_panic(
        payload in prop::collection::vec(any::<u8>(), 0..1024),
        secret in "[ -~]{1,64}",
        header in "\\PC*",
    ) {
        // Either this happens to be the correct signature (astronomically
        // unlikely) or verification simply returns false.
        let verified = verify_signature(&payload, &header, &secret);
        if verified {
            prop_assert_eq!(header.trim(), sign(&secret, &payload));
        }
    }
}
