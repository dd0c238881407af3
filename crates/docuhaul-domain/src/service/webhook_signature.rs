//! Payment webhook signature verification (HMAC-SHA256, hex-encoded)

use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// Hex-encoded HMAC-SHA256 of `raw_body` keyed with `secret`.
pub fn compute_signature(raw_body: &[u8], secret: &str) -> String {
    match HmacSha256::new_from_slice(secret.as_bytes()) {
        Ok(mut mac) => {
            mac.update(raw_body);
            hex::encode(mac.finalize().into_bytes())
        }
        // HMAC accepts keys of any length
        Err(_) => String::new(),
    }
}

/// Verify a webhook signature header against the raw request body.
///
/// A missing header is treated as an empty string and never matches.
/// Lengths are checked first; only the content comparison is constant-time.
pub fn verify_webhook_signature(
    raw_body: &[u8],
    secret: &str,
    signature_header: Option<&str>,
) -> bool {
    let provided = signature_header.unwrap_or("").trim();
    let expected = compute_signature(raw_body, secret);

    if expected.is_empty() || provided.len() != expected.len() {
        return false;
    }

    expected.as_bytes().ct_eq(provided.as_bytes()).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "ls_whsec_test_secret";
    const BODY: &[u8] = b"{\"meta\":{\"event_name\":\"subscription_created\"}}";

    #[test]
    fn test_valid_signature() {
        let signature = compute_signature(BODY, SECRET);
        assert!(verify_webhook_signature(BODY, SECRET, Some(signature.as_str())));
    }

    #[test]
    fn test_empty_header_rejected() {
        assert!(!verify_webhook_signature(BODY, SECRET, Some("")));
    }

    #[test]
    fn test_missing_header_rejected() {
        assert!(!verify_webhook_signature(BODY, SECRET, None));
    }

    #[test]
    fn test_signature_of_other_body_rejected() {
        let other = compute_signature(b"{\"meta\":{}}", SECRET);
        assert!(!verify_webhook_signature(BODY, SECRET, Some(other.as_str())));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let signature = compute_signature(BODY, "wrong_secret");
        assert!(!verify_webhook_signature(BODY, SECRET, Some(signature.as_str())));
    }

    #[test]
    fn test_truncated_signature_rejected() {
        let signature = compute_signature(BODY, SECRET);
        assert!(!verify_webhook_signature(BODY, SECRET, Some(&signature[..32])));
    }

    #[test]
    fn test_known_vector() {
        // RFC 4231 test case 2
        let signature = compute_signature(b"what do ya want for nothing?", "Jefe");
        assert_eq!(
            signature,
            "5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843"
        );
    }

    #[test]
    fn test_repeated_calls_match() {
        let signature = compute_signature(BODY, SECRET);
        assert_eq!(signature, compute_signature(BODY, SECRET));
        assert!(verify_webhook_signature(BODY, SECRET, Some(signature.as_str())));
        assert!(verify_webhook_signature(BODY, SECRET, Some(signature.as_str())));
    }
}
