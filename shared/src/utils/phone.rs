//! Phone number utilities

use once_cell::sync::Lazy;
use regex::Regex;

// Ghana mobile number regex: optional 0 / 233 / +233 prefix, then a
// digit 2-9 followed by eight more digits
static GHANA_PHONE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(0|\+?233)?[2-9]\d{8}$").unwrap()
});

/// Normalize a phone number by removing spaces and hyphens
pub fn normalize_phone_number(phone: &str) -> String {
    phone
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .collect()
}

/// Check if a phone number is a valid Ghana mobile number
pub fn is_valid_ghana_phone(phone: &str) -> bool {
    let normalized = normalize_phone_number(phone);
    GHANA_PHONE_REGEX.is_match(&normalized)
}

/// Mask a phone number for display (e.g., 050****4567)
pub fn mask_phone_number(phone: &str) -> String {
    let normalized = normalize_phone_number(phone);
    // Preset contacts arrive unvalidated and may be non-ASCII; index by chars
    let chars: Vec<char> = normalized.chars().collect();
    if chars.len() >= 7 {
        let head: String = chars[..3].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{}****{}", head, tail)
    } else {
        "****".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_phone_number() {
        assert_eq!(normalize_phone_number("050 123 4567"), "0501234567");
        assert_eq!(normalize_phone_number("050-123-4567"), "0501234567");
        assert_eq!(normalize_phone_number("+233 50 123 4567"), "+233501234567");
    }

    #[test]
    fn test_is_valid_ghana_phone() {
        assert!(is_valid_ghana_phone("0501234567"));
        assert!(is_valid_ghana_phone("0244123456"));
        assert!(is_valid_ghana_phone("+233501234567"));
        assert!(is_valid_ghana_phone("233501234567"));
        assert!(is_valid_ghana_phone("501234567"));     // No prefix
        assert!(is_valid_ghana_phone("050 123 4567")); // Spaces stripped
        assert!(is_valid_ghana_phone("050-123-4567")); // Hyphens stripped
    }

    #[test]
    fn test_invalid_ghana_phone() {
        assert!(!is_valid_ghana_phone("0101234567"));   // Invalid network digit
        assert!(!is_valid_ghana_phone("050123456"));    // Too short
        assert!(!is_valid_ghana_phone("05012345678"));  // Too long
        assert!(!is_valid_ghana_phone("+1501234567"));  // Wrong country code
        assert!(!is_valid_ghana_phone("05O1234567"));   // Letter in number
        assert!(!is_valid_ghana_phone(""));
    }

    #[test]
    fn test_mask_phone_number() {
        assert_eq!(mask_phone_number("0501234567"), "050****4567");
        assert_eq!(mask_phone_number("+233501234567"), "+23****4567");
        assert_eq!(mask_phone_number("12345"), "****");
    }

    #[test]
    fn test_mask_phone_number_non_ascii() {
        // Session documents can carry any string as the preset contact
        assert_eq!(mask_phone_number("ééééééé"), "ééé****éééé");
        assert_eq!(mask_phone_number("05ò 123 4567"), "05ò****4567");
        assert_eq!(mask_phone_number("éé"), "****");
    }
}
