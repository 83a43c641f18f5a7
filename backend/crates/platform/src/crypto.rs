//! Cryptographic Utilities

use base64::{Engine, engine::general_purpose};
use hmac::{Hmac, Mac};
use rand::{RngCore, rngs::OsRng};
use sha2::Sha256;
use uuid::Uuid;

/// Generate a random 32-byte secret
pub fn random_secret() -> [u8; 32] {
    let mut secret = [0u8; 32];
    OsRng.fill_bytes(&mut secret);
    secret
}

/// Encode bytes as URL-safe base64 without padding (cookie-safe)
pub fn to_base64(bytes: &[u8]) -> String {
    general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

/// Decode URL-safe base64 without padding
pub fn from_base64(s: &str) -> Result<Vec<u8>, base64::DecodeError> {
    general_purpose::URL_SAFE_NO_PAD.decode(s)
}

/// Decode standard base64 (with padding), as used for secrets in the environment
pub fn from_base64_standard(s: &str) -> Result<Vec<u8>, base64::DecodeError> {
    general_purpose::STANDARD.decode(s)
}

/// Compute HMAC-SHA256
pub fn hmac_sha256(key: &[u8; 32], data: &[u8]) -> [u8; 32] {
    let mut mac =
        <Hmac<Sha256> as Mac>::new_from_slice(key).expect("HMAC can take key of any size");
    mac.update(data);
    mac.finalize().into_bytes().into()
}

/// Create a signed token `<uuid>.<signature>` for a cookie value
pub fn sign_token(id: &Uuid, secret: &[u8; 32]) -> String {
    let id_str = id.to_string();
    let signature = hmac_sha256(secret, id_str.as_bytes());
    format!("{}.{}", id_str, to_base64(&signature))
}

/// Verify a token produced by [`sign_token`] and return the embedded id
pub fn verify_token(token: &str, secret: &[u8; 32]) -> Option<Uuid> {
    let (id_str, signature_b64) = token.split_once('.')?;
    let provided = from_base64(signature_b64).ok()?;

    // verify_slice compares in constant time
    let mut mac = <Hmac<Sha256> as Mac>::new_from_slice(secret).ok()?;
    mac.update(id_str.as_bytes());
    mac.verify_slice(&provided).ok()?;

    id_str.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hmac_key_sensitivity() {
        let key = [7u8; 32];
        assert_eq!(hmac_sha256(&key, b"what"), hmac_sha256(&key, b"what"));
        assert_ne!(hmac_sha256(&key, b"what"), hmac_sha256(&[8u8; 32], b"what"));
    }

    #[test]
    fn test_random_secret() {
        let secret = random_secret();
        assert!(secret.iter().any(|&b| b != 0));
        assert_ne!(secret, random_secret());
    }

    #[test]
    fn test_sign_and_verify_token() {
        let secret = [42u8; 32];
        let id = Uuid::new_v4();
        let token = sign_token(&id, &secret);

        assert_eq!(verify_token(&token, &secret), Some(id));
        assert_eq!(verify_token(&token, &[43u8; 32]), None);
    }

    #[test]
    fn test_verify_token_rejects_tampering() {
        let secret = [42u8; 32];
        let token = sign_token(&Uuid::new_v4(), &secret);
        let (_, sig) = token.split_once('.').unwrap();
        let forged = format!("{}.{}", Uuid::new_v4(), sig);

        assert_eq!(verify_token(&forged, &secret), None);
        assert_eq!(verify_token("no-dot-here", &secret), None);
        assert_eq!(verify_token("", &secret), None);
    }

    #[test]
    fn test_verify_token_rejects_truncated_signature() {
        let secret = [42u8; 32];
        let id = Uuid::new_v4();
        let signature = hmac_sha256(&secret, id.to_string().as_bytes());
        let truncated = format!("{id}.{}", to_base64(&signature[..16]));

        assert_eq!(verify_token(&truncated, &secret), None);
    }
}
