pub mod clock;
pub mod url_validator;

pub use clock::{Clock, ManualClock, SystemClock};
pub use url_validator::{is_valid_url, validate_url};

/// Alphabet used for generated short codes (62 characters).
pub const CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Minimum length of a user-supplied short code.
pub const MIN_CUSTOM_CODE_LENGTH: usize = 4;

pub fn generate_random_code(length: usize) -> String {
    use std::iter;

    // 随机选择字母和数字
    iter::repeat_with(|| CODE_ALPHABET[rand::random_range(0..CODE_ALPHABET.len())] as char)
        .take(length)
        .collect()
}

/// Checks a user-supplied short code against `[A-Za-z0-9_-]{4,}`.
pub fn is_valid_short_code(code: &str) -> bool {
    code.len() >= MIN_CUSTOM_CODE_LENGTH
        && code
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alphabet_size() {
        assert_eq!(CODE_ALPHABET.len(), 62);
    }

    #[test]
    fn test_valid_short_codes() {
        assert!(is_valid_short_code("abcd"));
        assert!(is_valid_short_code("my-link_2024"));
        assert!(is_valid_short_code("____"));
        assert!(is_valid_short_code("A1-b"));
    }

    #[test]
    fn test_invalid_short_codes() {
        assert!(!is_valid_short_code(""));
        assert!(!is_valid_short_code("abc"));
        assert!(!is_valid_short_code("has space"));
        assert!(!is_valid_short_code("dots.not.ok"));
        assert!(!is_valid_short_code("path/code"));
        assert!(!is_valid_short_code("ünïcode"));
    }

    #[test]
    fn test_generated_code_is_alphanumeric() {
        let code = generate_random_code(64);
        assert_eq!(code.len(), 64);
        assert!(code.bytes().all(|b| b.is_ascii_alphanumeric()));
    }
}
