#![no_main]

//! Fuzz target for webhook signature validation.
//!
//! Feeds arbitrary payload, secret, and header splits into the verifier to
//! ensure it never panics on hostile input, and cross-checks that a
//! freshly computed signature always round-trips.

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    fuzz_signature_validation(data);
});

fn fuzz_signature_validation(data: &[u8]) {
    // Split the input into payload / secret / supplied-signature parts.
    let third = data.len() / 3;
    let (payload, rest) = data.split_at(third);
    let (secret_bytes, supplied_bytes) = rest.split_at(third);

    let secret = String::from_utf8_lossy(secret_bytes);
    let supplied = String::from_utf8_lossy(supplied_bytes);

    // Arbitrary header values must never panic.
    let _ = kotori_api::crypto::verify_signature(payload, &supplied, &secret);

    // A signature we just computed must always verify.
    let signature = kotori_api::crypto::sign(&secret, payload);
    assert!(kotori_api::crypto::verify_signature(payload, &signature, &secret));
}
