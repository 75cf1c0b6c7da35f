//! Request-boundary validation for card identifiers
//!
//! Fields are private to force validation through the constructors; a raw
//! string that reaches the registry has always passed these checks.

use std::fmt;

use super::models::mask_card_number;

#[derive(Debug, Clone, thiserror::Error, PartialEq)]
pub enum ValidationError {
    #[error("Invalid length for {field}: expected {expected}, got {actual}")]
    InvalidLength {
        field: &'static str,
        expected: &'static str,
        actual: usize,
    },

    #[error("Invalid format for {field}: '{value}' (expected: {expected})")]
    InvalidFormat {
        field: &'static str,
        value: String,
        expected: &'static str,
    },
}

/// Validated 16-digit card number.
///
/// Error values carry the masked form only.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CardNumber(String);

impl CardNumber {
    pub fn new(raw: &str) -> Result<Self, ValidationError> {
        let raw = raw.trim();

        if raw.len() != 16 {
            return Err(ValidationError::InvalidLength {
                field: "card_number",
                expected: "16 digits",
                actual: raw.len(),
            });
        }

        if !raw.chars().all(|c| c.is_ascii_digit()) {
            return Err(ValidationError::InvalidFormat {
                field: "card_number",
                value: mask_card_number(raw),
                expected: "16 digits",
            });
        }

        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn masked(&self) -> String {
        mask_card_number(&self.0)
    }
}

impl fmt::Display for CardNumber {
    /// Displays masked. The raw digits only come out of `as_str`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.masked())
    }
}

/// Validated E.164-like phone number: `+` followed by 9 to 15 digits.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Phone(String);

impl Phone {
    pub fn new(raw: &str) -> Result<Self, ValidationError> {
        let raw = raw.trim();

        let digits = match raw.strip_prefix('+') {
            Some(rest) => rest,
            None => {
                return Err(ValidationError::InvalidFormat {
                    field: "phone",
                    value: raw.to_string(),
                    expected: "+<9-15 digits>",
                });
            }
        };

        if !(9..=15).contains(&digits.len()) || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(ValidationError::InvalidFormat {
                field: "phone",
                value: raw.to_string(),
                expected: "+<9-15 digits>",
            });
        }

        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Phone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn card_number_accepts_16_digits() {
        let n = CardNumber::new("8600123456789012").unwrap();
        assert_eq!(n.as_str(), "8600123456789012");
        assert_eq!(n.masked(), "8600****9012");
    }

    #[test]
    fn card_number_trims_whitespace() {
        let n = CardNumber::new("  8600123456789012  ").unwrap();
        assert_eq!(n.as_str(), "8600123456789012");
    }

    #[test]
    fn card_number_rejects_wrong_length() {
        assert!(CardNumber::new("860012345678901").is_err());
        assert!(CardNumber::new("86001234567890123").is_err());
        assert!(CardNumber::new("").is_err());
    }

    #[test]
    fn card_number_rejects_non_digits() {
        assert!(CardNumber::new("8600-1234-5678-90").is_err());
        assert!(CardNumber::new("86001234567890ab").is_err());
    }

    #[test]
    fn card_number_error_is_masked() {
        let err = CardNumber::new("86001234567890ab").unwrap_err();
        let text = err.to_string();
        assert!(!text.contains("86001234567890ab"), "leaked raw value: {}", text);
        assert!(text.contains("8600****90ab"));
    }

    #[test]
    fn card_number_display_is_masked() {
        let n = CardNumber::new("8600123456789012").unwrap();
        assert_eq!(format!("{}", n), "8600****9012");
    }

    #[test]
    fn phone_accepts_e164_like() {
        assert!(Phone::new("+998901234567").is_ok());
        assert!(Phone::new("+123456789").is_ok());
        assert!(Phone::new("+123456789012345").is_ok());
    }

    #[test]
    fn phone_rejects_bad_shapes() {
        for bad in [
            "998901234567",     // missing plus
            "+99890123",        // too short
            "+1234567890123456", // too long
            "+9989012345ab",
            "",
            "+",
        ] {
            assert!(Phone::new(bad).is_err(), "accepted {:?}", bad);
        }
    }
}
