use thiserror::Error;

/// Broad category of a [`FlowError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad input, caught before any external call.
    Validation,
    /// The code could not be sent.
    Delivery,
    /// The submitted code was wrong or expired.
    Verification,
}

/// User-facing error held by the session. `Display` renders the message shown in the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FlowError {
    #[error("Please enter a valid email address")]
    InvalidEmail,
    #[error("Please enter all 6 digits")]
    IncompleteCode,
    #[error("Failed to send verification code. Please try again.")]
    DeliveryFailed,
    #[error("Invalid verification code. Please try again.")]
    InvalidCode,
}

impl FlowError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidEmail | Self::IncompleteCode => ErrorKind::Validation,
            Self::DeliveryFailed => ErrorKind::Delivery,
            Self::InvalidCode => ErrorKind::Verification,
        }
    }

    pub fn is_retryable(&self) -> bool {
        self.kind() != ErrorKind::Validation
    }
}
