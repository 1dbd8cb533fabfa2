//! Password policy enforced at every boundary that accepts a new password.

/// Symbols that satisfy the "one special character" rule.
pub const PASSWORD_SYMBOLS: &str = "@%_=+.";

/// Minimum password length in characters.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Ways a candidate password can fail the policy.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordPolicyError {
    /// Fewer than [`MIN_PASSWORD_LENGTH`] characters.
    #[error("password must be at least {min} characters")]
    TooShort {
        /// Required minimum.
        min: usize,
    },
    /// No ASCII uppercase letter.
    #[error("password must contain an uppercase letter")]
    MissingUppercase,
    /// No ASCII digit.
    #[error("password must contain a digit")]
    MissingDigit,
    /// None of [`PASSWORD_SYMBOLS`].
    #[error("password must contain one of {PASSWORD_SYMBOLS}")]
    MissingSymbol,
}

/// Check a plaintext password against the policy.
///
/// Rules are checked in order (length, uppercase, digit, symbol) and the
/// first failure is reported.
///
/// # Errors
///
/// Returns the first [`PasswordPolicyError`] the password violates.
///
/// ```
/// use shiftwatch_core::validate_password;
///
/// assert!(validate_password("Sensor_2024").is_ok());
/// assert!(validate_password("sensor_2024").is_err());
/// ```
pub fn validate_password(password: &str) -> Result<(), PasswordPolicyError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(PasswordPolicyError::TooShort {
            min: MIN_PASSWORD_LENGTH,
        });
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        return Err(PasswordPolicyError::MissingUppercase);
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(PasswordPolicyError::MissingDigit);
    }
    if !password.chars().any(|c| PASSWORD_SYMBOLS.contains(c)) {
        return Err(PasswordPolicyError::MissingSymbol);
    }
    Ok(())
}
