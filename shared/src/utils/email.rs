//! Email address utilities

use once_cell::sync::Lazy;
use regex::Regex;

// Minimal shape check: non-whitespace local part, single @, dot in domain
static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap()
});

/// Check if an email address has a valid local@domain.tld shape
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_REGEX.is_match(email)
}

/// Mask an email address for display (e.g., k***@example.com)
pub fn mask_email(email: &str) -> String {
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() => {
            let first = &local[..local
                .char_indices()
                .nth(1)
                .map(|(i, _)| i)
                .unwrap_or(local.len())];
            format!("{}***@{}", first, domain)
        }
        _ => "***".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_valid_email() {
        assert!(is_valid_email("kofi@example.com"));
        assert!(is_valid_email("a.b@mail.example.org"));
        assert!(is_valid_email("x@y.co"));
    }

    #[test]
    fn test_invalid_email() {
        assert!(!is_valid_email("no-at-sign.com"));      // Missing @
        assert!(!is_valid_email("kofi@example"));        // No dot after @
        assert!(!is_valid_email("kofi @example.com"));   // Whitespace
        assert!(!is_valid_email("kofi@@example.com"));   // Double @
        assert!(!is_valid_email("@example.com"));        // Empty local part
        assert!(!is_valid_email(""));
    }

    #[test]
    fn test_mask_email() {
        assert_eq!(mask_email("kofi@example.com"), "k***@example.com");
        assert_eq!(mask_email("a@b.co"), "a***@b.co");
        assert_eq!(mask_email("not-an-email"), "***");
    }
}
