//! Email address and login identifier types.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing an [`Email`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
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

/// An email address, as used for ERPNext user names.
///
/// ERPNext stores users under their email address, so this is also the
/// identifier that owns a wishlist document.
///
/// ## Constraints
///
/// - Length: 1-254 characters (RFC 5321 limit)
/// - Must contain an @ symbol with a non-empty local part and domain
/// - Surrounding whitespace is trimmed
///
/// ## Examples
///
/// ```
/// use erp_storefront_core::Email;
///
/// assert!(Email::parse("buyer@example.com").is_ok());
/// assert!(Email::parse("  buyer@example.com ").is_ok());
///
/// assert!(Email::parse("").is_err());
/// assert!(Email::parse("no-at-symbol").is_err());
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
    /// Returns an error if the trimmed input is empty, longer than 254
    /// characters, lacks an @ symbol, or has an empty local part or domain.
    pub fn parse(s: &str) -> Result<Self, EmailError> {
        let s = s.trim();

        if s.is_empty() {
            return Err(EmailError::Empty);
        }

        if s.len() > Self::MAX_LENGTH {
            return Err(EmailError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }

        let (local, domain) = s.split_once('@').ok_or(EmailError::MissingAtSymbol)?;

        if local.is_empty() {
            return Err(EmailError::EmptyLocalPart);
        }

        if domain.is_empty() {
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

    /// Returns the domain part of the email (after the @).
    #[must_use]
    pub fn domain(&self) -> &str {
        self.0.split_once('@').map_or("", |(_, domain)| domain)
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
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

/// Errors that can occur when parsing a [`LoginIdentifier`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum IdentifierError {
    /// Nothing was entered.
    #[error("login identifier cannot be empty")]
    Empty,
    /// Looks like neither an email nor a phone number.
    #[error("login identifier must be an email address or a phone number")]
    Unrecognized,
}

/// What a customer typed into the login form.
///
/// Customers can sign in with either their email address or the mobile
/// number stored on their ERPNext user. Phone numbers are normalized to
/// digits with an optional leading `+`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LoginIdentifier {
    /// An email address, usable as the ERPNext user name directly.
    Email(Email),
    /// A phone number that must be resolved to the user's email first.
    Phone(String),
}

impl LoginIdentifier {
    /// Minimum number of digits for a value to count as a phone number.
    pub const MIN_PHONE_DIGITS: usize = 7;

    /// Parse a login identifier.
    ///
    /// Anything containing `@` is treated as an email. Otherwise the value
    /// is accepted as a phone number when it consists of digits and common
    /// separators (spaces, dashes, dots, parentheses, a leading `+`).
    ///
    /// # Errors
    ///
    /// Returns `IdentifierError::Empty` for blank input and
    /// `IdentifierError::Unrecognized` for anything else that is neither.
    pub fn parse(s: &str) -> Result<Self, IdentifierError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(IdentifierError::Empty);
        }

        if s.contains('@') {
            return Email::parse(s)
                .map(Self::Email)
                .map_err(|_| IdentifierError::Unrecognized);
        }

        let (prefix, rest) = s
            .strip_prefix('+')
            .map_or(("", s), |rest| ("+", rest));

        if !rest
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, ' ' | '-' | '.' | '(' | ')'))
        {
            return Err(IdentifierError::Unrecognized);
        }

        let digits: String = rest.chars().filter(char::is_ascii_digit).collect();
        if digits.len() < Self::MIN_PHONE_DIGITS {
            return Err(IdentifierError::Unrecognized);
        }

        Ok(Self::Phone(format!("{prefix}{digits}")))
    }

    /// Returns the identifier as entered (normalized).
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Email(email) => email.as_str(),
            Self::Phone(phone) => phone,
        }
    }
}

impl fmt::Display for LoginIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
