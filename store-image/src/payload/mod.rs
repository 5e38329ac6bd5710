//! Base64 payload decoding

use base64::{engine::general_purpose::STANDARD, Engine as _};
use thiserror::Error;

/// Malformed base64 payload
#[derive(Error, Debug, PartialEq, Eq)]
#[error("Could not decode image payload: {0}")]
pub struct DecodeError(#[from] base64::DecodeError);

/// Decodes a standard, padded base64 string into raw bytes
///
/// Line breaks (`\r`, `\n`) inside the payload are skipped, so MIME-wrapped
/// output from `base64` tools decodes as-is. An empty string yields no bytes.
///
/// # Errors
///
/// Returns `DecodeError` for invalid characters, length or padding
pub fn decode(encoded: &str) -> Result<Vec<u8>, DecodeError> {
    if encoded.contains(['\r', '\n']) {
        let joined: String = encoded.chars().filter(|c| !matches!(c, '\r' | '\n')).collect();
        return Ok(STANDARD.decode(joined)?);
    }

    Ok(STANDARD.decode(encoded)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_round_trip() {
        let samples: [&[u8]; 4] = [b"", b"f", b"\x89PNG\r\n\x1a\n", &[0u8, 255, 128, 7, 9]];

        for bytes in samples {
            let encoded = STANDARD.encode(bytes);
            assert_eq!(decode(&encoded).unwrap(), bytes);
        }
    }

    #[test]
    fn test_empty_input_is_not_an_error() {
        assert_eq!(decode("").unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn test_line_wrapped_input() {
        assert_eq!(decode("aGVs\r\nbG8=\n").unwrap(), b"hello");
    }

    #[test]
    fn test_malformed_input() {
        // invalid character
        assert!(decode("not base64!").is_err());
        // bad length
        assert!(decode("abc").is_err());
        // missing padding
        assert!(decode("aGVsbG8").is_err());
        // url-safe alphabet is not accepted
        assert!(decode("_-8=").is_err());
    }
}
