//! Corporate email address type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// The only domain accounts may be registered under.
pub const CORPORATE_DOMAIN: &str = "cistcor.com";

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
    /// The input contains whitespace.
    #[error("email cannot contain whitespace")]
    Whitespace,
    /// The input does not contain exactly one @ symbol.
    #[error("email must contain exactly one @ symbol")]
    MissingAtSymbol,
    /// The local part (before @) is empty.
    #[error("email local part cannot be empty")]
    EmptyLocalPart,
    /// The domain part (after @) is empty or has no dot.
    #[error("email domain is invalid")]
    InvalidDomain,
    /// The address is well formed but not on the corporate domain.
    #[error("email must end in @{CORPORATE_DOMAIN}")]
    ForeignDomain,
}

/// A corporate email address.
///
/// ## Constraints
///
/// - Length: 1-254 characters (RFC 5321 limit)
/// - No whitespace, exactly one @ symbol
/// - Non-empty local part, dotted domain
/// - Ends in `@cistcor.com` (case-sensitive, matching stored accounts)
///
/// ## Examples
///
/// ```
/// use shiftwatch_core::Email;
///
/// assert!(Email::parse("ana.rojas@cistcor.com").is_ok());
/// assert!(Email::parse("ana.rojas@gmail.com").is_err());
/// assert!(Email::parse("@cistcor.com").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
    /// Maximum length of an email address (RFC 5321).
    pub const MAX_LENGTH: usize = 254;

    /// Parse a corporate `Email` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is structurally invalid or belongs to a
    /// domain other than [`CORPORATE_DOMAIN`].
    pub fn parse(s: &str) -> Result<Self, EmailError> {
        if s.is_empty() {
            return Err(EmailError::Empty);
        }

        if s.len() > Self::MAX_LENGTH {
            return Err(EmailError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }

        if s.chars().any(char::is_whitespace) {
            return Err(EmailError::Whitespace);
        }

        let (local, domain) = s.split_once('@').ok_or(EmailError::MissingAtSymbol)?;

        if domain.contains('@') {
            return Err(EmailError::MissingAtSymbol);
        }

        if local.is_empty() {
            return Err(EmailError::EmptyLocalPart);
        }

        if domain.is_empty() || !domain.contains('.') {
            return Err(EmailError::InvalidDomain);
        }

        if domain != CORPORATE_DOMAIN {
            return Err(EmailError::ForeignDomain);
        }

        Ok(Self(s.to_owned()))
    }

    /// Normalize what a user typed into a login or registration form.
    ///
    /// Surrounding whitespace is trimmed and a bare local part (no `@`) gets
    /// the corporate domain appended, so `ana.rojas` becomes
    /// `ana.rojas@cistcor.com`.
    #[must_use]
    pub fn normalize_input(input: &str) -> String {
        let trimmed = input.trim();
        if trimmed.is_empty() || trimmed.contains('@') {
            trimmed.to_owned()
        } else {
            format!("{trimmed}@{CORPORATE_DOMAIN}")
        }
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

    /// Returns the local part of the email (before the @).
    #[must_use]
    pub fn local_part(&self) -> &str {
        self.0.split('@').next().unwrap_or("")
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

impl TryFrom<String> for Email {
    type Error = EmailError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Email> for String {
    fn from(email: Email) -> Self {
        email.0
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// SQLx support (with postgres feature)
#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Email {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Email {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        // Rows were validated on the way in
        Ok(Self(s))
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Email {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <String as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_corporate_emails() {
        assert!(Email::parse("user@cistcor.com").is_ok());
        assert!(Email::parse("user.name@cistcor.com").is_ok());
        assert!(Email::parse("user+tag@cistcor.com").is_ok());
    }

    #[test]
    fn test_parse_empty() {
        assert_eq!(Email::parse(""), Err(EmailError::Empty));
    }

    #[test]
    fn test_parse_too_long() {
        let long = format!("{}@cistcor.com", "a".repeat(250));
        assert!(matches!(
            Email::parse(&long),
            Err(EmailError::TooLong { .. })
        ));
    }

    #[test]
    fn test_parse_structural_errors() {
        assert_eq!(Email::parse("no-at-symbol"), Err(EmailError::MissingAtSymbol));
        assert_eq!(Email::parse("a@b@cistcor.com"), Err(EmailError::MissingAtSymbol));
        assert_eq!(Email::parse("@cistcor.com"), Err(EmailError::EmptyLocalPart));
        assert_eq!(Email::parse("user@"), Err(EmailError::InvalidDomain));
        assert_eq!(Email::parse("user@localhost"), Err(EmailError::InvalidDomain));
        assert_eq!(Email::parse("us er@cistcor.com"), Err(EmailError::Whitespace));
    }

    #[test]
    fn test_parse_rejects_other_domains() {
        assert_eq!(Email::parse("user@gmail.com"), Err(EmailError::ForeignDomain));
        assert_eq!(Email::parse("user@sub.cistcor.com"), Err(EmailError::ForeignDomain));
        assert_eq!(Email::parse("user@CISTCOR.COM"), Err(EmailError::ForeignDomain));
    }

    #[test]
    fn test_normalize_input_appends_domain() {
        assert_eq!(Email::normalize_input("  ana.rojas "), "ana.rojas@cistcor.com");
        assert_eq!(Email::normalize_input("ana@gmail.com"), "ana@gmail.com");
        assert_eq!(Email::normalize_input("   "), "");
    }

    #[test]
    fn test_local_part() {
        let email = Email::parse("luis.quispe@cistcor.com").unwrap();
        assert_eq!(email.local_part(), "luis.quispe");
    }

    #[test]
    fn test_deserialize_validates() {
        let ok: Result<Email, _> = serde_json::from_str("\"luis@cistcor.com\"");
        assert!(ok.is_ok());
        let bad: Result<Email, _> = serde_json::from_str("\"luis@example.com\"");
        assert!(bad.is_err());
    }
}
