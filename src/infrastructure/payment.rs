use crate::domain::payment::{DUMMY_ORDER_PREFIX, PaymentConfirmation, PaymentMode};
use crate::domain::ports::PaymentVerifier;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use tracing::warn;

/// Accepts any payment for an order id issued in dummy mode.
#[derive(Debug, Clone, Copy, Default)]
pub struct DummyVerifier;

impl PaymentVerifier for DummyVerifier {
    fn mode(&self) -> PaymentMode {
        PaymentMode::Dummy
    }

    fn verify(&self, confirmation: &PaymentConfirmation) -> bool {
        confirmation.gateway_order_id.starts_with(DUMMY_ORDER_PREFIX)
    }
}

/// Checks the gateway's HMAC-SHA256 signature over `"{order_id}|{payment_id}"`.
pub struct SignatureVerifier {
    secret: String,
}

impl SignatureVerifier {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    fn mac(&self, confirmation: &PaymentConfirmation) -> Option<Hmac<Sha256>> {
        let mut mac = Hmac::<Sha256>::new_from_slice(self.secret.as_bytes()).ok()?;
        mac.update(confirmation.gateway_order_id.as_bytes());
        mac.update(b"|");
        mac.update(confirmation.payment_id.as_bytes());
        Some(mac)
    }

    /// Hex signature the gateway is expected to send for `confirmation`.
    pub fn sign(&self, confirmation: &PaymentConfirmation) -> String {
        self.mac(confirmation)
            .map(|mac| hex::encode(mac.finalize().into_bytes()))
            .unwrap_or_default()
    }
}

impl std::fmt::Debug for SignatureVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignatureVerifier")
            .field("secret", &"<redacted>")
            .finish()
    }
}

impl PaymentVerifier for SignatureVerifier {
    fn mode(&self) -> PaymentMode {
        PaymentMode::Live
    }

    fn verify(&self, confirmation: &PaymentConfirmation) -> bool {
        let Ok(signature) = hex::decode(confirmation.signature.trim()) else {
            warn!(
                order = %confirmation.gateway_order_id,
                "Payment signature is not valid hex"
            );
            return false;
        };
        self.mac(confirmation)
            .is_some_and(|mac| mac.verify_slice(&signature).is_ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn confirmation(order: &str, signature: &str) -> PaymentConfirmation {
        PaymentConfirmation {
            gateway_order_id: order.to_string(),
            payment_id: "pay_29QQoUBi66xm2f".to_string(),
            signature: signature.to_string(),
        }
    }

    #[test]
    fn test_dummy_accepts_only_dummy_orders() {
        let verifier = DummyVerifier;
        assert!(verifier.verify(&confirmation("dummy_ord_1700000000000", "")));
        assert!(!verifier.verify(&confirmation("order_EKwxwAgItmmXdp", "")));
    }

    #[test]
    fn test_signature_round_trip() {
        let verifier = SignatureVerifier::new("shop-secret");
        let mut paid = confirmation("order_EKwxwAgItmmXdp", "");
        paid.signature = verifier.sign(&paid);

        assert_eq!(paid.signature.len(), 64);
        assert!(verifier.verify(&paid));
    }

    #[test]
    fn test_signature_mismatch() {
        let verifier = SignatureVerifier::new("shop-secret");
        let other = SignatureVerifier::new("someone-else");
        let mut paid = confirmation("order_EKwxwAgItmmXdp", "");
        paid.signature = other.sign(&paid);

        assert!(!verifier.verify(&paid));
        assert!(!verifier.verify(&confirmation("order_EKwxwAgItmmXdp", "not-hex")));
    }

    #[test]
    fn test_live_mode_rejects_dummy_orders() {
        let verifier = SignatureVerifier::new("shop-secret");
        assert!(!verifier.verify(&confirmation("dummy_ord_1700000000000", "")));
    }
}
