//! Contact method the one-time code is delivered to.

use std::fmt;

use gk_shared::utils::{email, phone};

use crate::errors::FlowError;

/// Delivery destination for a one-time code.
///
/// Carries the value exactly as entered; validation normalizes a copy
/// but the raw value is what gets sent to the verification service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContactMethod {
    /// Ghana mobile number
    Phone(String),
    /// Email address
    Email(String),
}

impl ContactMethod {
    /// Short channel name used in logs and wire payloads.
    pub fn kind(&self) -> &'static str {
        match self {
            ContactMethod::Phone(_) => "phone",
            ContactMethod::Email(_) => "email",
        }
    }

    /// The contact value as entered.
    pub fn value(&self) -> &str {
        match self {
            ContactMethod::Phone(value) => value,
            ContactMethod::Email(value) => value,
        }
    }

    /// Masked form safe for logging and display.
    pub fn masked(&self) -> String {
        match self {
            ContactMethod::Phone(value) => phone::mask_phone_number(value),
            ContactMethod::Email(value) => email::mask_email(value),
        }
    }

    /// Validate the contact before requesting a code.
    ///
    /// Phone numbers are checked against the Ghana mobile format after
    /// stripping spaces and hyphens; emails against a basic shape check.
    ///
    /// # Returns
    /// * `Ok(())` - the contact can receive a code
    /// * `Err(FlowError::InvalidContact)` - empty or malformed value,
    ///   with the message to surface next to the input field
    pub fn validate(&self) -> Result<(), FlowError> {
        match self {
            ContactMethod::Phone(value) => {
                if value.trim().is_empty() {
                    return Err(FlowError::InvalidContact {
                        field: "phone".to_string(),
                        message: "Phone number is required".to_string(),
                    });
                }
                if !phone::is_valid_ghana_phone(value) {
                    return Err(FlowError::InvalidContact {
                        field: "phone".to_string(),
                        message: "Please enter a valid Ghana phone number".to_string(),
                    });
                }
                Ok(())
            }
            ContactMethod::Email(value) => {
                if value.trim().is_empty() {
                    return Err(FlowError::InvalidContact {
                        field: "email".to_string(),
                        message: "Email address is required".to_string(),
                    });
                }
                if !email::is_valid_email(value) {
                    return Err(FlowError::InvalidContact {
                        field: "email".to_string(),
                        message: "Please enter a valid email address".to_string(),
                    });
                }
                Ok(())
            }
        }
    }
}

impl fmt::Display for ContactMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.masked())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_phone_passes() {
        assert!(ContactMethod::Phone("0501234567".to_string()).validate().is_ok());
        assert!(ContactMethod::Phone("050 123 4567".to_string()).validate().is_ok());
        assert!(ContactMethod::Phone("+233501234567".to_string()).validate().is_ok());
    }

    #[test]
    fn test_empty_phone_is_required() {
        let err = ContactMethod::Phone("  ".to_string()).validate().unwrap_err();
        match err {
            FlowError::InvalidContact { field, message } => {
                assert_eq!(field, "phone");
                assert_eq!(message, "Phone number is required");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_malformed_phone_is_rejected() {
        let err = ContactMethod::Phone("0101234567".to_string()).validate().unwrap_err();
        match err {
            FlowError::InvalidContact { field, message } => {
                assert_eq!(field, "phone");
                assert_eq!(message, "Please enter a valid Ghana phone number");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_valid_email_passes() {
        assert!(ContactMethod::Email("payer@example.com".to_string()).validate().is_ok());
    }

    #[test]
    fn test_empty_email_is_required() {
        let err = ContactMethod::Email(String::new()).validate().unwrap_err();
        match err {
            FlowError::InvalidContact { field, message } => {
                assert_eq!(field, "email");
                assert_eq!(message, "Email address is required");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_malformed_email_is_rejected() {
        let err = ContactMethod::Email("payer@example".to_string()).validate().unwrap_err();
        match err {
            FlowError::InvalidContact { message, .. } => {
                assert_eq!(message, "Please enter a valid email address");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_masked_forms() {
        assert_eq!(
            ContactMethod::Phone("0501234567".to_string()).masked(),
            "050****4567"
        );
        assert_eq!(
            ContactMethod::Email("payer@example.com".to_string()).masked(),
            "p***@example.com"
        );
    }

    #[test]
    fn test_masked_accepts_unvalidated_values() {
        // Preset contacts come straight from the session document, skipping validate()
        assert_eq!(
            ContactMethod::Phone("05ò 123 4567".to_string()).masked(),
            "05ò****4567"
        );
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(ContactMethod::Phone("0501234567".to_string()).kind(), "phone");
        assert_eq!(ContactMethod::Email("a@b.co".to_string()).kind(), "email");
    }
}
