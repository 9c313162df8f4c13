pub mod domain;
pub mod ports;

// Re-export commonly used types for convenience
pub use domain::{
    code_entry::{CODE_LENGTH, CodeEntry, CodeEntryError},
    email::{Email, EmailError},
    flow_error::{ErrorKind, FlowError},
    otp_code::{OtpCode, OtpCodeError},
    session::{FlowStep, SessionId, TransitionError, VerificationSession},
};

pub use ports::collaborators::{
    CodeVerifier, NotificationSender, SendError, VerifyError, VerifyOutcome,
};
