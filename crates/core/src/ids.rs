//! Random human codes and sharing tokens for files.
//!
//! Generation alone does not guarantee uniqueness; callers must check the
//! generated value against the store and regenerate on collision, with the
//! database unique constraint as the final arbiter under concurrency.

use rand::Rng;

/// Prefix of every file human code (`F-XXXXXX`).
pub const FILE_CODE_PREFIX: &str = "F-";

/// Number of random characters after the file code prefix.
pub const FILE_CODE_RANDOM_LENGTH: usize = 6;

/// Prefix of every sharing token.
pub const SHARE_TOKEN_PREFIX: &str = "sh_";

/// Number of random characters after the sharing token prefix.
pub const SHARE_TOKEN_RANDOM_LENGTH: usize = 24;

const CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

const TOKEN_ALPHABET: &[u8] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-_";

/// Generate a candidate file code: `F-` plus six uppercase alphanumerics.
pub fn generate_file_code() -> String {
    format!(
        "{FILE_CODE_PREFIX}{}",
        random_string(CODE_ALPHABET, FILE_CODE_RANDOM_LENGTH)
    )
}

/// Generate a candidate sharing token: `sh_` plus a URL-safe random suffix.
pub fn generate_share_token() -> String {
    format!(
        "{SHARE_TOKEN_PREFIX}{}",
        random_string(TOKEN_ALPHABET, SHARE_TOKEN_RANDOM_LENGTH)
    )
}

fn random_string(alphabet: &[u8], length: usize) -> String {
    let mut rng = rand::rng();
    (0..length)
        .map(|_| alphabet[rng.random_range(0..alphabet.len())] as char)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_code_matches_format() {
        let code = generate_file_code();
        assert_eq!(code.len(), FILE_CODE_PREFIX.len() + FILE_CODE_RANDOM_LENGTH);
        assert!(code.starts_with(FILE_CODE_PREFIX));
        assert!(
            code[FILE_CODE_PREFIX.len()..]
                .chars()
                .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()),
            "suffix must be uppercase alphanumeric: {code}"
        );
    }

    #[test]
    fn share_token_matches_format() {
        let token = generate_share_token();
        assert_eq!(
            token.len(),
            SHARE_TOKEN_PREFIX.len() + SHARE_TOKEN_RANDOM_LENGTH
        );
        assert!(token.starts_with(SHARE_TOKEN_PREFIX));
        assert!(
            token[SHARE_TOKEN_PREFIX.len()..]
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'),
            "suffix must be URL-safe: {token}"
        );
    }

    #[test]
    fn consecutive_codes_differ() {
        // A collision within a handful of draws would indicate a broken RNG,
        // not bad luck (36^6 possibilities).
        let codes: Vec<String> = (0..8).map(|_| generate_file_code()).collect();
        let first = &codes[0];
        assert!(codes.iter().skip(1).any(|c| c != first));
    }
}
