use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{email::Email, otp_code::OtpCode};

// NotificationSender port trait and errors
#[derive(Debug, Clone, Error)]
pub enum SendError {
    #[error("Too many codes requested")]
    RateLimited,
    #[error("Recipient rejected")]
    InvalidRecipient,
    #[error("Transient failure: {0}")]
    TransientFailure(String),
}

impl PartialEq for SendError {
    fn eq(&self, other: &Self) -> bool {
        matches!(
            (self, other),
            (Self::RateLimited, Self::RateLimited)
                | (Self::InvalidRecipient, Self::InvalidRecipient)
                | (Self::TransientFailure(_), Self::TransientFailure(_))
        )
    }
}

/// Delivers a fresh one-time code to an email address.
#[async_trait]
pub trait NotificationSender: Send + Sync {
    async fn send(&self, email: &Email) -> Result<(), SendError>;
}

// CodeVerifier port trait and errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifyOutcome {
    Verified,
    Invalid,
    Expired,
}

#[derive(Debug, Clone, Error)]
pub enum VerifyError {
    #[error("Transient failure: {0}")]
    TransientFailure(String),
}

impl PartialEq for VerifyError {
    fn eq(&self, other: &Self) -> bool {
        matches!(
            (self, other),
            (Self::TransientFailure(_), Self::TransientFailure(_))
        )
    }
}

/// Checks a submitted code against the one issued for `email`.
#[async_trait]
pub trait CodeVerifier: Send + Sync {
    async fn verify(&self, email: &Email, code: &OtpCode) -> Result<VerifyOutcome, VerifyError>;
}
