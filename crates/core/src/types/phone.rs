//! Phone number type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Phone`].
#[derive(thiserror::Error, Debug, Clone)]
pub enum PhoneError {
    /// The input string is empty.
    #[error("phone number cannot be empty")]
    Empty,
    /// The input contains a non-digit character.
    #[error("phone number must contain only digits")]
    NonDigit,
    /// The digit count is outside the accepted range.
    #[error("phone number must be {min}-{max} digits")]
    BadLength {
        /// Minimum accepted digit count.
        min: usize,
        /// Maximum accepted digit count.
        max: usize,
    },
}

/// A Vietnamese phone number: 9 to 11 ASCII digits.
///
/// No carrier-prefix validation is attempted; the checkout gate only
/// requires a plausible digit string.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Phone(String);

impl Phone {
    /// Minimum number of digits.
    pub const MIN_DIGITS: usize = 9;
    /// Maximum number of digits.
    pub const MAX_DIGITS: usize = 11;

    /// Parse a `Phone` from a string, ignoring surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty, contains a non-digit
    /// character, or has fewer than 9 or more than 11 digits.
    pub fn parse(s: &str) -> Result<Self, PhoneError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(PhoneError::Empty);
        }
        if !trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return Err(PhoneError::NonDigit);
        }
        if trimmed.len() < Self::MIN_DIGITS || trimmed.len() > Self::MAX_DIGITS {
            return Err(PhoneError::BadLength {
                min: Self::MIN_DIGITS,
                max: Self::MAX_DIGITS,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the phone number as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `Phone` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Phone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Phone {
    type Err = PhoneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for Phone {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_lengths() {
        assert!(Phone::parse("098765432").is_ok()); // 9 digits
        assert!(Phone::parse("0987654321").is_ok()); // 10 digits
        assert!(Phone::parse("09876543210").is_ok()); // 11 digits
    }

    #[test]
    fn test_parse_trims_whitespace() {
        let phone = Phone::parse("  0987654321  ").unwrap();
        assert_eq!(phone.as_str(), "0987654321");
    }

    #[test]
    fn test_parse_empty() {
        assert!(matches!(Phone::parse(""), Err(PhoneError::Empty)));
        assert!(matches!(Phone::parse("   "), Err(PhoneError::Empty)));
    }

    #[test]
    fn test_parse_rejects_non_digits() {
        assert!(matches!(
            Phone::parse("09-8765-432"),
            Err(PhoneError::NonDigit)
        ));
        assert!(matches!(
            Phone::parse("+84987654321"),
            Err(PhoneError::NonDigit)
        ));
    }

    #[test]
    fn test_parse_rejects_bad_lengths() {
        assert!(matches!(
            Phone::parse("12345678"),
            Err(PhoneError::BadLength { .. })
        ));
        assert!(matches!(
            Phone::parse("123456789012"),
            Err(PhoneError::BadLength { .. })
        ));
    }
}
