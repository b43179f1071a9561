//! Email address type.
//!
//! Checkout collects two addresses (contact and optional invoice recipient)
//! and both flow into the order payload, so the validation lives here once.
//! Only structure is checked; deliverability is the mail system's problem.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing an [`Email`].
#[derive(thiserror::Error, Debug, Clone)]
pub enum EmailError {
    /// The input string is empty.
    #[error("email cannot be empty")]
    Empty,
    /// The input string is too long.
    #[error("email must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// The input does not contain an @ symbol.
    #[error("email must contain an @ symbol")]
    MissingAtSymbol,
    /// The local part (before @) is empty.
    #[error("email local part cannot be empty")]
    EmptyLocalPart,
    /// The domain part (after @) is empty.
    #[error("email domain cannot be empty")]
    EmptyDomain,
}

/// A structurally valid email address.
///
/// Accepts anything of the shape `local@domain` within the RFC 5321 length
/// limit. Deliberately loose beyond that: shoppers' real addresses are more
/// varied than any stricter pattern survives contact with.
///
/// ```
/// use booknest_core::Email;
///
/// let contact = Email::parse("doc.gia@nhasach.vn").unwrap();
/// assert_eq!(contact.domain(), "nhasach.vn");
///
/// assert!(Email::parse("khong-co-a-cong").is_err());
/// assert!(Email::parse("@nhasach.vn").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Email(String);

impl Email {
    /// Maximum length of an email address (RFC 5321).
    pub const MAX_LENGTH: usize = 254;

    /// Parse an `Email` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error when the input is empty, exceeds 254 characters,
    /// lacks an `@`, or has nothing on either side of it.
    pub fn parse(s: &str) -> Result<Self, EmailError> {
        if s.is_empty() {
            return Err(EmailError::Empty);
        }

        if s.len() > Self::MAX_LENGTH {
            return Err(EmailError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }

        let at_pos = s.find('@').ok_or(EmailError::MissingAtSymbol)?;

        if at_pos == 0 {
            return Err(EmailError::EmptyLocalPart);
        }

        if at_pos == s.len() - 1 {
            return Err(EmailError::EmptyDomain);
        }

        Ok(Self(s.to_owned()))
    }

    /// Returns the email address as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `Email` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }

    /// The part before the `@`.
    #[must_use]
    pub fn local_part(&self) -> &str {
        self.0.split('@').next().unwrap_or("")
    }

    /// The part after the `@`.
    #[must_use]
    pub fn domain(&self) -> &str {
        self.0.split('@').nth(1).unwrap_or("")
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Email {
    type Err = EmailError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_ordinary_shapes() {
        assert!(Email::parse("an.nguyen@nhasach.vn").is_ok());
        assert!(Email::parse("hoadon+cty@booknest.example").is_ok());
        assert!(Email::parse("a@b.c").is_ok());
    }

    #[test]
    fn test_rejects_structural_failures() {
        assert!(matches!(Email::parse(""), Err(EmailError::Empty)));
        assert!(matches!(
            Email::parse("khong-co-a-cong"),
            Err(EmailError::MissingAtSymbol)
        ));
        assert!(matches!(
            Email::parse("@nhasach.vn"),
            Err(EmailError::EmptyLocalPart)
        ));
        assert!(matches!(
            Email::parse("an.nguyen@"),
            Err(EmailError::EmptyDomain)
        ));
    }

    #[test]
    fn test_rejects_overlong_input() {
        let long = format!("{}@nhasach.vn", "a".repeat(250));
        assert!(matches!(
            Email::parse(&long),
            Err(EmailError::TooLong { .. })
        ));
    }

    #[test]
    fn test_splits_local_part_and_domain() {
        let email = Email::parse("an.nguyen@nhasach.vn").unwrap();
        assert_eq!(email.local_part(), "an.nguyen");
        assert_eq!(email.domain(), "nhasach.vn");
    }

    #[test]
    fn test_serde_is_transparent() {
        let email = Email::parse("an.nguyen@nhasach.vn").unwrap();
        let json = serde_json::to_string(&email).unwrap();
        assert_eq!(json, "\"an.nguyen@nhasach.vn\"");
        assert_eq!(serde_json::from_str::<Email>(&json).unwrap(), email);
    }

    #[test]
    fn test_from_str() {
        let email: Email = "an.nguyen@nhasach.vn".parse().unwrap();
        assert_eq!(email.as_str(), "an.nguyen@nhasach.vn");
    }
}
