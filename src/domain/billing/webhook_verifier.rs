//! Gateway webhook signature verification.
//!
//! The gateway signs the raw request body with HMAC-SHA256 over the
//! shared webhook secret and sends the hex digest in the
//! `X-Razorpay-Signature` header. The checkout widget separately signs
//! `"{order_id}|{payment_id}"` with the key secret for the synchronous
//! verify flow.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use super::webhook_errors::WebhookError;

/// Verifier for gateway signatures.
pub struct WebhookVerifier {
    secret: String,
}

impl WebhookVerifier {
    /// Creates a verifier with the given signing secret.
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    /// Verifies the webhook body signature.
    ///
    /// The expected signature is HMAC-SHA256 over the raw body, hex
    /// encoded, compared in constant time.
    ///
    /// # Errors
    ///
    /// - `InvalidSignature` - digest mismatch or non-hex header value
    ///
    /// # Security
    ///
    /// Comparison is constant-time so response timing leaks nothing
    /// about the expected digest.
    pub fn verify_body(&self, payload: &[u8], signature_hex: &str) -> Result<(), WebhookError> {
        let provided = hex::decode(signature_hex).map_err(|_| WebhookError::InvalidSignature)?;
        let expected = self.compute_hmac(payload);

        if constant_time_compare(&expected, &provided) {
            Ok(())
        } else {
            Err(WebhookError::InvalidSignature)
        }
    }

    /// Verifies the checkout callback signature over
    /// `"{order_id}|{payment_id}"`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidSignature` on mismatch.
    pub fn verify_payment_signature(
        &self,
        order_id: &str,
        payment_id: &str,
        signature_hex: &str,
    ) -> Result<(), WebhookError> {
        let message = format!("{}|{}", order_id, payment_id);
        self.verify_body(message.as_bytes(), signature_hex)
    }

    fn compute_hmac(&self, payload: &[u8]) -> Vec<u8> {
        let mut mac =
            Hmac::<Sha256>::new_from_slice(self.secret.as_bytes()).expect("HMAC accepts any key");
        mac.update(payload);
        mac.finalize().into_bytes().to_vec()
    }
}

/// Performs constant-time comparison of two byte slices.
fn constant_time_compare(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}

/// Computes a hex HMAC-SHA256 for use in test fixtures.
#[cfg(test)]
pub fn compute_test_signature(secret: &str, payload: &[u8]) -> String {
    let mut mac =
        Hmac::<Sha256>::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key");
    mac.update(payload);
    hex::encode(mac.finalize().into_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const TEST_SECRET: &str = "whsec_test_secret_12345";

    // ══════════════════════════════════════════════════════════════
    // Body Signature Tests
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn verify_valid_body_signature() {
        let verifier = WebhookVerifier::new(TEST_SECRET);
        let payload = br#"{"event":"payment.captured"}"#;
        let signature = compute_test_signature(TEST_SECRET, payload);

        assert!(verifier.verify_body(payload, &signature).is_ok());
    }

    #[test]
    fn verify_wrong_signature_fails() {
        let verifier = WebhookVerifier::new(TEST_SECRET);
        let payload = br#"{"event":"payment.captured"}"#;
        let signature = "a".repeat(64);

        let result = verifier.verify_body(payload, &signature);
        assert_eq!(result, Err(WebhookError::InvalidSignature));
    }

    #[test]
    fn verify_wrong_secret_fails() {
        let verifier = WebhookVerifier::new("wrong_secret");
        let payload = br#"{"event":"payment.captured"}"#;
        let signature = compute_test_signature(TEST_SECRET, payload);

        let result = verifier.verify_body(payload, &signature);
        assert_eq!(result, Err(WebhookError::InvalidSignature));
    }

    #[test]
    fn verify_tampered_payload_fails() {
        let verifier = WebhookVerifier::new(TEST_SECRET);
        let signature =
            compute_test_signature(TEST_SECRET, br#"{"event":"payment.captured"}"#);

        let result = verifier.verify_body(br#"{"event":"payment.failed"}"#, &signature);
        assert_eq!(result, Err(WebhookError::InvalidSignature));
    }

    #[test]
    fn verify_non_hex_signature_fails() {
        let verifier = WebhookVerifier::new(TEST_SECRET);
        let result = verifier.verify_body(b"payload", "not_valid_hex!");
        assert_eq!(result, Err(WebhookError::InvalidSignature));
    }

    #[test]
    fn verify_truncated_signature_fails() {
        let verifier = WebhookVerifier::new(TEST_SECRET);
        let payload = b"payload";
        let mut signature = compute_test_signature(TEST_SECRET, payload);
        signature.truncate(32);

        let result = verifier.verify_body(payload, &signature);
        assert_eq!(result, Err(WebhookError::InvalidSignature));
    }

    // ══════════════════════════════════════════════════════════════
    // Payment Signature Tests
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn verify_valid_payment_signature() {
        let verifier = WebhookVerifier::new(TEST_SECRET);
        let signature =
            compute_test_signature(TEST_SECRET, b"order_Abc123|pay_Xyz789");

        let result = verifier.verify_payment_signature("order_Abc123", "pay_Xyz789", &signature);
        assert!(result.is_ok());
    }

    #[test]
    fn verify_payment_signature_with_swapped_ids_fails() {
        let verifier = WebhookVerifier::new(TEST_SECRET);
        let signature =
            compute_test_signature(TEST_SECRET, b"order_Abc123|pay_Xyz789");

        let result = verifier.verify_payment_signature("pay_Xyz789", "order_Abc123", &signature);
        assert_eq!(result, Err(WebhookError::InvalidSignature));
    }

    // ══════════════════════════════════════════════════════════════
    // Constant Time Comparison Tests
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn constant_time_compare_equal_values() {
        let a = vec![1, 2, 3, 4, 5];
        let b = vec![1, 2, 3, 4, 5];
        assert!(constant_time_compare(&a, &b));
    }

    #[test]
    fn constant_time_compare_different_values() {
        let a = vec![1, 2, 3, 4, 5];
        let b = vec![1, 2, 3, 4, 6];
        assert!(!constant_time_compare(&a, &b));
    }

    #[test]
    fn constant_time_compare_different_lengths() {
        let a = vec![1, 2, 3];
        let b = vec![1, 2, 3, 4];
        assert!(!constant_time_compare(&a, &b));
    }

    // ══════════════════════════════════════════════════════════════
    // Property: accept exactly the matching HMAC
    // ══════════════════════════════════════════════════════════════

    proptest! {
        #[test]
        fn accepts_only_the_matching_hmac(
            payload in proptest::collection::vec(any::<u8>(), 0..512),
            secret in "[a-zA-Z0-9_]{8,40}",
        ) {
            let verifier = WebhookVerifier::new(secret.as_str());
            let good = compute_test_signature(&secret, &payload);
            prop_assert!(verifier.verify_body(&payload, &good).is_ok());

            // Flipping any hex digit must break verification
            let mut bad = good.clone().into_bytes();
            bad[0] = if bad[0] == b'0' { b'1' } else { b'0' };
            let bad = String::from_utf8(bad).unwrap();
            prop_assert!(verifier.verify_body(&payload, &bad).is_err());
        }

        #[test]
        fn signature_for_one_payload_never_verifies_another(
            a in proptest::collection::vec(any::<u8>(), 1..256),
            b in proptest::collection::vec(any::<u8>(), 1..256),
        ) {
            prop_assume!(a != b);
            let verifier = WebhookVerifier::new(TEST_SECRET);
            let signature = compute_test_signature(TEST_SECRET, &a);
            prop_assert!(verifier.verify_body(&b, &signature).is_err());
        }
    }
}
