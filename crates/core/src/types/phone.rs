//! Mobile phone numbers.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Country calling code prepended when an international form is needed.
pub const COUNTRY_PREFIX: &str = "+51";

/// Number of digits in a local mobile number.
pub const PHONE_DIGITS: usize = 9;

/// Errors that can occur when parsing a [`PhoneNumber`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PhoneError {
    /// The input did not contain exactly nine digits.
    #[error("phone number must have exactly {PHONE_DIGITS} digits (got {got})")]
    WrongLength {
        /// Digits found after stripping separators.
        got: usize,
    },
}

/// A nine-digit local mobile number, stored without separators.
///
/// Spaces, dashes and other non-digits are stripped before counting, so
/// `"987 654 321"` and `"987-654-321"` parse to the same value. A leading
/// `+51` country prefix is dropped.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PhoneNumber(String);

impl PhoneNumber {
    /// Parse a local phone number.
    ///
    /// # Errors
    ///
    /// Returns [`PhoneError::WrongLength`] unless exactly nine digits remain
    /// after stripping the country prefix and non-digit characters.
    pub fn parse(s: &str) -> Result<Self, PhoneError> {
        let trimmed = s.trim();
        let local = trimmed.strip_prefix(COUNTRY_PREFIX).unwrap_or(trimmed);
        let digits: String = local.chars().filter(char::is_ascii_digit).collect();
        if digits.len() != PHONE_DIGITS {
            return Err(PhoneError::WrongLength { got: digits.len() });
        }
        Ok(Self(digits))
    }

    /// The bare nine digits.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The number with the country prefix, e.g. `+51 987654321`.
    #[must_use]
    pub fn international(&self) -> String {
        format!("{COUNTRY_PREFIX} {}", self.0)
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_separators() {
        let phone = PhoneNumber::parse("987 654-321").unwrap();
        assert_eq!(phone.as_str(), "987654321");
        assert_eq!(phone.international(), "+51 987654321");
    }

    #[test]
    fn test_wrong_length() {
        assert_eq!(
            PhoneNumber::parse("12345678"),
            Err(PhoneError::WrongLength { got: 8 })
        );
        assert_eq!(
            PhoneNumber::parse("51987654321"),
            Err(PhoneError::WrongLength { got: 11 })
        );
        assert_eq!(
            PhoneNumber::parse("+5198765432"),
            Err(PhoneError::WrongLength { got: 8 })
        );
    }

    #[test]
    fn test_country_prefix_is_dropped() {
        for input in ["+51987654321", "+51 987 654 321", " +51-987654321"] {
            assert_eq!(PhoneNumber::parse(input).unwrap().as_str(), "987654321");
        }
    }
}
