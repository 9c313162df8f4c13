use rand::Rng;
use secrecy::{ExposeSecret, Secret};
use thiserror::Error;

use crate::domain::code_entry::CODE_LENGTH;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OtpCodeError {
    #[error("Code must be exactly 6 digits")]
    InvalidLength,
    #[error("Code must only contain digits")]
    NonDigit,
}

/// A complete six digit one-time code.
#[derive(Debug)]
pub struct OtpCode(Secret<String>);

impl OtpCode {
    /// Generates a random code.
    pub fn new() -> Self {
        let mut rng = rand::rng();
        let digits: String = (0..CODE_LENGTH)
            .map(|_| char::from(b'0' + rng.random_range(0..10u8)))
            .collect();
        Self(Secret::new(digits))
    }

    pub fn parse(code: impl Into<String>) -> Result<Self, OtpCodeError> {
        let code = code.into();
        if code.chars().count() != CODE_LENGTH {
            return Err(OtpCodeError::InvalidLength);
        }
        if !code.chars().all(|c| c.is_ascii_digit()) {
            return Err(OtpCodeError::NonDigit);
        }
        Ok(Self(Secret::new(code)))
    }
}

impl Default for OtpCode {
    fn default() -> Self {
        Self::new()
    }
}

impl AsRef<Secret<String>> for OtpCode {
    fn as_ref(&self) -> &Secret<String> {
        &self.0
    }
}

impl Clone for OtpCode {
    fn clone(&self) -> Self {
        Self(Secret::new(self.0.expose_secret().clone()))
    }
}

impl PartialEq for OtpCode {
    fn eq(&self, other: &Self) -> bool {
        self.0.expose_secret() == other.0.expose_secret()
    }
}

impl Eq for OtpCode {}
