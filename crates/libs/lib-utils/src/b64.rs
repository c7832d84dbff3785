//! # Base64 Encoding/Decoding
//!
//! Passlib's "adapted base64" (`ab64`): standard alphabet with `.` in place of `+`
//! and no padding. Credentials written by the previous admin backend store their
//! salt and digest in this encoding.

use base64::{engine::general_purpose, Engine as _};

/// Encode bytes to adapted base64.
pub fn ab64_encode(content: impl AsRef<[u8]>) -> String {
    general_purpose::STANDARD_NO_PAD
        .encode(content)
        .replace('+', ".")
}

/// Decode adapted base64 to bytes.
pub fn ab64_decode(ab64: &str) -> Result<Vec<u8>, Error> {
    general_purpose::STANDARD_NO_PAD
        .decode(ab64.trim_end_matches('=').replace('.', "+"))
        .map_err(|_| Error::FailToAb64Decode)
}

// region:    --- Error
#[derive(Debug)]
pub enum Error {
    FailToAb64Decode,
}

impl std::fmt::Display for Error {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(fmt, "{self:?}")
    }
}

impl std::error::Error for Error {}
// endregion: --- Error

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ab64_uses_dot_instead_of_plus() {
        // 0xfb 0xef encodes to "++8" in standard base64
        let encoded = ab64_encode([0xfb, 0xef]);
        assert_eq!(encoded, "..8");
        assert_eq!(ab64_decode(&encoded).expect("decode"), vec![0xfb, 0xef]);
    }

    #[test]
    fn test_ab64_decode_tolerates_padding() {
        assert_eq!(ab64_decode("YQ==").expect("decode"), b"a".to_vec());
    }

    #[test]
    fn test_ab64_decode_rejects_garbage() {
        assert!(ab64_decode("not*base64").is_err());
    }
}
