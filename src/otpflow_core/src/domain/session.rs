use std::fmt;

use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::{
    domain::{
        code_entry::{CodeEntry, CodeEntryError},
        email::Email,
        flow_error::FlowError,
        otp_code::OtpCode,
    },
    ports::collaborators::{SendError, VerifyError, VerifyOutcome},
};

/// Identity of one session lifecycle. A reset produces a new one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FlowStep {
    #[default]
    CollectingEmail,
    CollectingCode,
    Verified,
}

/// Why a transition was not applied. The session is left untouched, except for
/// [`TransitionError::Validation`] which records the user-facing error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("An external call is already in flight")]
    Pending,
    #[error("Expected step {expected:?}, session is at {actual:?}")]
    WrongStep { expected: FlowStep, actual: FlowStep },
    #[error("Resend is available in {0}s")]
    CooldownActive(u32),
    #[error("Rejected code input: {0}")]
    Entry(#[from] CodeEntryError),
    #[error("{0}")]
    Validation(FlowError),
}

/// State of the email → code → verified sign-up flow.
///
/// Transitions are split in two halves around each external call: a `start_*` method that
/// validates and marks the session pending, and a `complete_*` method that applies the
/// collaborator's answer. The caller awaits the collaborator in between.
#[derive(Debug, Clone, Default)]
pub struct VerificationSession {
    id: SessionId,
    email: Option<Email>,
    code: CodeEntry,
    step: FlowStep,
    pending: bool,
    error: Option<FlowError>,
    resend_cooldown_secs: u32,
    attempt_count: u32,
    verified_at: Option<DateTime<Utc>>,
}

impl VerificationSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn email(&self) -> Option<&Email> {
        self.email.as_ref()
    }

    pub fn code(&self) -> &CodeEntry {
        &self.code
    }

    pub fn step(&self) -> FlowStep {
        self.step
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    pub fn error(&self) -> Option<FlowError> {
        self.error
    }

    pub fn resend_cooldown_secs(&self) -> u32 {
        self.resend_cooldown_secs
    }

    pub fn attempt_count(&self) -> u32 {
        self.attempt_count
    }

    pub fn verified_at(&self) -> Option<DateTime<Utc>> {
        self.verified_at
    }

    pub fn is_verified(&self) -> bool {
        self.step == FlowStep::Verified
    }

    pub fn can_resend(&self) -> bool {
        self.step == FlowStep::CollectingCode && !self.pending && self.resend_cooldown_secs == 0
    }

    fn ensure_ready(&self, expected: FlowStep) -> Result<(), TransitionError> {
        if self.step != expected {
            return Err(TransitionError::WrongStep {
                expected,
                actual: self.step,
            });
        }
        if self.pending {
            return Err(TransitionError::Pending);
        }
        Ok(())
    }

    /// Validates `raw` and marks the session pending. The returned address is what the
    /// notification sender should be called with.
    pub fn start_email_submission(&mut self, raw: &str) -> Result<Email, TransitionError> {
        self.ensure_ready(FlowStep::CollectingEmail)?;

        let Ok(email) = Email::parse(raw) else {
            self.error = Some(FlowError::InvalidEmail);
            return Err(TransitionError::Validation(FlowError::InvalidEmail));
        };

        self.pending = true;
        self.error = None;
        Ok(email)
    }

    pub fn complete_email_submission(
        &mut self,
        email: Email,
        result: Result<(), SendError>,
        cooldown_secs: u32,
    ) {
        self.pending = false;
        match result {
            Ok(()) => {
                self.email = Some(email);
                self.step = FlowStep::CollectingCode;
                self.code.clear();
                self.attempt_count = 0;
                self.resend_cooldown_secs = cooldown_secs;
            }
            Err(_) => self.error = Some(FlowError::DeliveryFailed),
        }
    }

    pub fn edit_code_digit(&mut self, index: usize, value: &str) -> Result<(), TransitionError> {
        self.ensure_ready(FlowStep::CollectingCode)?;
        self.code.set_digit(index, value)?;
        Ok(())
    }

    /// Returns the index of the last pasted digit.
    pub fn paste_code(&mut self, text: &str) -> Result<usize, TransitionError> {
        self.ensure_ready(FlowStep::CollectingCode)?;
        Ok(self.code.fill_from(text)?)
    }

    /// Checks the code is complete, counts the attempt and marks the session pending.
    pub fn start_code_submission(&mut self) -> Result<(Email, OtpCode), TransitionError> {
        self.ensure_ready(FlowStep::CollectingCode)?;

        let (Some(email), Some(code)) = (self.email.clone(), self.code.to_otp_code()) else {
            self.error = Some(FlowError::IncompleteCode);
            return Err(TransitionError::Validation(FlowError::IncompleteCode));
        };

        self.pending = true;
        self.error = None;
        self.attempt_count += 1;
        Ok((email, code))
    }

    pub fn complete_code_submission(&mut self, result: Result<VerifyOutcome, VerifyError>) {
        self.pending = false;
        match result {
            Ok(VerifyOutcome::Verified) => {
                self.step = FlowStep::Verified;
                self.verified_at = Some(Utc::now());
                self.resend_cooldown_secs = 0;
            }
            Ok(VerifyOutcome::Invalid | VerifyOutcome::Expired) | Err(_) => {
                self.error = Some(FlowError::InvalidCode);
                self.code.clear();
            }
        }
    }

    /// Returns to the email step. The email is kept so the form can be pre-filled.
    pub fn go_back(&mut self) -> Result<(), TransitionError> {
        self.ensure_ready(FlowStep::CollectingCode)?;
        self.code.clear();
        self.error = None;
        self.step = FlowStep::CollectingEmail;
        Ok(())
    }

    pub fn start_resend(&mut self) -> Result<Email, TransitionError> {
        self.ensure_ready(FlowStep::CollectingCode)?;
        if self.resend_cooldown_secs > 0 {
            return Err(TransitionError::CooldownActive(self.resend_cooldown_secs));
        }
        let email = self.email.clone().ok_or(TransitionError::WrongStep {
            expected: FlowStep::CollectingCode,
            actual: FlowStep::CollectingEmail,
        })?;

        self.pending = true;
        self.error = None;
        Ok(email)
    }

    pub fn complete_resend(&mut self, result: Result<(), SendError>, cooldown_secs: u32) {
        self.pending = false;
        match result {
            Ok(()) => {
                self.code.clear();
                self.resend_cooldown_secs = cooldown_secs;
            }
            Err(_) => self.error = Some(FlowError::DeliveryFailed),
        }
    }

    /// One second of cooldown elapsed. Returns what is left.
    pub fn tick_cooldown(&mut self) -> u32 {
        self.resend_cooldown_secs = self.resend_cooldown_secs.saturating_sub(1);
        self.resend_cooldown_secs
    }

    /// Fresh session with a new identity.
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const COOLDOWN: u32 = 30;

    fn session_at_code_step() -> VerificationSession {
        let mut session = VerificationSession::new();
        let email = session.start_email_submission("user@example.com").unwrap();
        session.complete_email_submission(email, Ok(()), COOLDOWN);
        session
    }

    fn fill(session: &mut VerificationSession, digits: &str) {
        for (index, digit) in digits.chars().enumerate() {
            session.edit_code_digit(index, &digit.to_string()).unwrap();
        }
    }

    #[test]
    fn test_new_session_defaults() {
        let session = VerificationSession::new();
        assert_eq!(session.step(), FlowStep::CollectingEmail);
        assert!(session.email().is_none());
        assert!(session.code().is_empty());
        assert!(!session.is_pending());
        assert!(session.error().is_none());
        assert_eq!(session.resend_cooldown_secs(), 0);
        assert_eq!(session.attempt_count(), 0);
        assert!(session.verified_at().is_none());
    }

    #[test]
    fn test_invalid_email_sets_error_and_stays() {
        for raw in ["", "   ", "userexample.com", "user@example"] {
            let mut session = VerificationSession::new();
            let result = session.start_email_submission(raw);
            assert_eq!(
                result,
                Err(TransitionError::Validation(FlowError::InvalidEmail))
            );
            assert_eq!(session.step(), FlowStep::CollectingEmail);
            assert_eq!(session.error(), Some(FlowError::InvalidEmail));
            assert!(!session.is_pending());
        }
    }

    #[test]
    fn test_valid_email_marks_pending_and_clears_error() {
        let mut session = VerificationSession::new();
        let _ = session.start_email_submission("bad");
        let email = session.start_email_submission(" user@example.com ").unwrap();
        assert_eq!(email.as_ref(), "user@example.com");
        assert!(session.is_pending());
        assert!(session.error().is_none());

        assert_eq!(
            session.start_email_submission("user@example.com"),
            Err(TransitionError::Pending)
        );
    }

    #[test]
    fn test_send_success_enters_code_step() {
        let session = session_at_code_step();
        assert_eq!(session.step(), FlowStep::CollectingCode);
        assert_eq!(session.email().unwrap().as_ref(), "user@example.com");
        assert!(session.code().is_empty());
        assert_eq!(session.attempt_count(), 0);
        assert_eq!(session.resend_cooldown_secs(), COOLDOWN);
        assert!(!session.is_pending());
    }

    #[test]
    fn test_send_failure_stays_on_email_step() {
        let mut session = VerificationSession::new();
        let email = session.start_email_submission("user@example.com").unwrap();
        session.complete_email_submission(email, Err(SendError::RateLimited), COOLDOWN);

        assert_eq!(session.step(), FlowStep::CollectingEmail);
        assert_eq!(session.error(), Some(FlowError::DeliveryFailed));
        assert!(session.email().is_none());
        assert!(!session.is_pending());
    }

    #[test]
    fn test_code_edits_rejected_outside_code_step() {
        let mut session = VerificationSession::new();
        assert!(matches!(
            session.edit_code_digit(0, "1"),
            Err(TransitionError::WrongStep { .. })
        ));
    }

    #[test]
    fn test_incomplete_code_is_rejected() {
        let mut session = session_at_code_step();
        fill(&mut session, "12345");

        assert_eq!(
            session.start_code_submission().map(|_| ()),
            Err(TransitionError::Validation(FlowError::IncompleteCode))
        );
        assert_eq!(session.error(), Some(FlowError::IncompleteCode));
        assert_eq!(session.attempt_count(), 0);
        assert!(!session.is_pending());
    }

    #[test]
    fn test_invalid_code_clears_entry_and_counts_attempt() {
        let mut session = session_at_code_step();
        fill(&mut session, "123456");

        let (email, code) = session.start_code_submission().unwrap();
        assert_eq!(email.as_ref(), "user@example.com");
        assert_eq!(code, OtpCode::parse("123456").unwrap());
        assert_eq!(session.attempt_count(), 1);

        session.complete_code_submission(Ok(VerifyOutcome::Invalid));
        assert_eq!(session.step(), FlowStep::CollectingCode);
        assert_eq!(session.error(), Some(FlowError::InvalidCode));
        assert!(session.code().is_empty());
        assert!(!session.is_pending());
    }

    #[test]
    fn test_expired_and_transient_map_to_invalid_code() {
        for result in [
            Ok(VerifyOutcome::Expired),
            Err(VerifyError::TransientFailure("timeout".into())),
        ] {
            let mut session = session_at_code_step();
            fill(&mut session, "123456");
            session.start_code_submission().unwrap();
            session.complete_code_submission(result);
            assert_eq!(session.error(), Some(FlowError::InvalidCode));
            assert_eq!(session.step(), FlowStep::CollectingCode);
        }
    }

    #[test]
    fn test_verified_is_terminal() {
        let mut session = session_at_code_step();
        fill(&mut session, "123456");
        session.start_code_submission().unwrap();
        session.complete_code_submission(Ok(VerifyOutcome::Verified));

        assert!(session.is_verified());
        assert!(session.verified_at().is_some());
        assert!(session.edit_code_digit(0, "1").is_err());
        assert!(session.start_code_submission().is_err());
        assert!(session.go_back().is_err());
        assert!(session.start_resend().is_err());
        assert!(session.start_email_submission("user@example.com").is_err());
        assert!(session.is_verified());
    }

    #[test]
    fn test_go_back_keeps_email_and_resubmit_resets_attempts() {
        let mut session = session_at_code_step();
        fill(&mut session, "123456");
        session.start_code_submission().unwrap();
        session.complete_code_submission(Ok(VerifyOutcome::Invalid));
        assert_eq!(session.attempt_count(), 1);

        fill(&mut session, "12");
        session.go_back().unwrap();
        assert_eq!(session.step(), FlowStep::CollectingEmail);
        assert_eq!(session.email().unwrap().as_ref(), "user@example.com");
        assert!(session.code().is_empty());
        assert!(session.error().is_none());

        let email = session.start_email_submission("user@example.com").unwrap();
        session.complete_email_submission(email, Ok(()), COOLDOWN);
        assert_eq!(session.step(), FlowStep::CollectingCode);
        assert_eq!(session.attempt_count(), 0);
    }

    #[test]
    fn test_resend_respects_cooldown() {
        let mut session = session_at_code_step();
        assert_eq!(
            session.start_resend(),
            Err(TransitionError::CooldownActive(COOLDOWN))
        );
        assert!(!session.is_pending());

        for _ in 0..COOLDOWN {
            session.tick_cooldown();
        }
        assert_eq!(session.tick_cooldown(), 0);
        assert!(session.can_resend());

        fill(&mut session, "12");
        let email = session.start_resend().unwrap();
        assert_eq!(email.as_ref(), "user@example.com");
        session.complete_resend(Ok(()), COOLDOWN);
        assert_eq!(session.step(), FlowStep::CollectingCode);
        assert_eq!(session.resend_cooldown_secs(), COOLDOWN);
        assert!(session.code().is_empty());
    }

    #[test]
    fn test_resend_failure_reports_delivery_error() {
        let mut session = session_at_code_step();
        for _ in 0..COOLDOWN {
            session.tick_cooldown();
        }
        session.start_resend().unwrap();
        session.complete_resend(Err(SendError::TransientFailure("down".into())), COOLDOWN);

        assert_eq!(session.error(), Some(FlowError::DeliveryFailed));
        assert_eq!(session.resend_cooldown_secs(), 0);
        assert_eq!(session.step(), FlowStep::CollectingCode);
    }

    #[test]
    fn test_reset_restores_defaults_with_new_identity() {
        let mut session = session_at_code_step();
        fill(&mut session, "123");
        let _ = session.start_code_submission();
        let previous = session.id();

        session.reset();
        assert_ne!(session.id(), previous);
        assert_eq!(session.step(), FlowStep::CollectingEmail);
        assert!(session.email().is_none());
        assert!(session.code().is_empty());
        assert!(session.error().is_none());
        assert!(!session.is_pending());
        assert_eq!(session.resend_cooldown_secs(), 0);
        assert_eq!(session.attempt_count(), 0);
    }
}
