use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use super::errors::SecretError;

/// Resolve the configured signing secret into raw key bytes.
///
/// The secret may be supplied as plain text or, when `base64_encoded` is
/// set, as standard base64. Loaded once at startup and held for the
/// process lifetime; decoding failures are startup-fatal.
///
/// # Errors
/// * `Empty` - Secret resolves to zero bytes
/// * `InvalidBase64` - Flagged as base64 but does not decode
pub fn decode_secret(secret: &str, base64_encoded: bool) -> Result<Vec<u8>, SecretError> {
    let bytes = if base64_encoded {
        STANDARD
            .decode(secret)
            .map_err(|e| SecretError::InvalidBase64(e.to_string()))?
    } else {
        secret.as_bytes().to_vec()
    };

    if bytes.is_empty() {
        return Err(SecretError::Empty);
    }

    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_secret_passes_through() {
        let bytes = decode_secret("plain-secret", false).unwrap();
        assert_eq!(bytes, b"plain-secret");
    }

    #[test]
    fn test_base64_secret_is_decoded() {
        // "c2VjcmV0" is base64 for "secret"
        let bytes = decode_secret("c2VjcmV0", true).unwrap();
        assert_eq!(bytes, b"secret");
    }

    #[test]
    fn test_invalid_base64_is_rejected() {
        let result = decode_secret("not base64!!", true);
        assert!(matches!(result, Err(SecretError::InvalidBase64(_))));
    }

    #[test]
    fn test_empty_secret_is_rejected() {
        assert!(matches!(decode_secret("", false), Err(SecretError::Empty)));
    }
}
