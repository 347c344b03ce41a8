//! Midtrans notification signature check.
//!
//! `signature_key = hex(SHA512(order_id + status_code + gross_amount + server_key))`

use secrecy::{ExposeSecret, Secret};
use sha2::{Digest, Sha512};
use subtle::ConstantTimeEq;

use crate::dtos::MidtransNotification;

#[derive(Clone)]
pub struct SignatureVerifier {
    server_key: Secret<String>,
}

impl SignatureVerifier {
    pub fn new(server_key: Secret<String>) -> Self {
        Self { server_key }
    }

    /// Lowercase hex digest for the given fields, exactly as received.
    pub fn expected(&self, order_id: &str, status_code: &str, gross_amount: &str) -> String {
        let mut hasher = Sha512::new();
        hasher.update(order_id.as_bytes());
        hasher.update(status_code.as_bytes());
        hasher.update(gross_amount.as_bytes());
        hasher.update(self.server_key.expose_secret().as_bytes());
        hex::encode(hasher.finalize())
    }

    /// Without a server key every signature is computable, so nothing verifies.
    pub fn is_configured(&self) -> bool {
        !self.server_key.expose_secret().trim().is_empty()
    }

    pub fn verify(&self, notification: &MidtransNotification) -> bool {
        if !self.is_configured() {
            return false;
        }
        let expected = self.expected(
            &notification.order_id,
            &notification.status_code,
            &notification.gross_amount,
        );
        let provided = notification.signature_key.trim();

        expected.as_bytes().ct_eq(provided.as_bytes()).into()
    }
}
