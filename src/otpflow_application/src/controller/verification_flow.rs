use std::{sync::Arc, time::Duration};

use otpflow_core::{CodeVerifier, NotificationSender, VerificationSession};
use tokio::sync::RwLock;

use crate::controller::cooldown::CooldownTicker;

pub const DEFAULT_RESEND_COOLDOWN_SECS: u32 = 30;
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Tunables of the verification flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlowOptions {
    /// Seconds the user has to wait before requesting another code.
    pub resend_cooldown_secs: u32,
    /// Wall-clock length of one cooldown second.
    pub tick_interval: Duration,
}

impl Default for FlowOptions {
    fn default() -> Self {
        Self {
            resend_cooldown_secs: DEFAULT_RESEND_COOLDOWN_SECS,
            tick_interval: DEFAULT_TICK_INTERVAL,
        }
    }
}

pub(crate) struct FlowState {
    pub(crate) session: VerificationSession,
    ticker: Option<CooldownTicker>,
}

/// Drives one sign-up session from email entry to a verified address.
///
/// The controller is a cheap handle: clones share the same session. The session lock is only
/// held while a transition is applied, never while a collaborator is awaited, so `reset` can
/// always get through. Results that come back for a session that has since been reset are
/// dropped.
///
/// Every operation returns a snapshot of the session after the operation. Rejected operations
/// (wrong step, call in flight, cooldown running, bad input) leave the session unchanged apart
/// from the user-facing validation error where one applies.
pub struct VerificationFlowController<N, V>
where
    N: NotificationSender,
    V: CodeVerifier,
{
    notification_sender: Arc<N>,
    code_verifier: Arc<V>,
    options: FlowOptions,
    state: Arc<RwLock<FlowState>>,
}

impl<N, V> Clone for VerificationFlowController<N, V>
where
    N: NotificationSender,
    V: CodeVerifier,
{
    fn clone(&self) -> Self {
        Self {
            notification_sender: Arc::clone(&self.notification_sender),
            code_verifier: Arc::clone(&self.code_verifier),
            options: self.options,
            state: Arc::clone(&self.state),
        }
    }
}

impl<N, V> VerificationFlowController<N, V>
where
    N: NotificationSender + 'static,
    V: CodeVerifier + 'static,
{
    pub fn new(notification_sender: N, code_verifier: V, options: FlowOptions) -> Self {
        Self {
            notification_sender: Arc::new(notification_sender),
            code_verifier: Arc::new(code_verifier),
            options,
            state: Arc::new(RwLock::new(FlowState {
                session: VerificationSession::new(),
                ticker: None,
            })),
        }
    }

    pub fn options(&self) -> FlowOptions {
        self.options
    }

    pub async fn session(&self) -> VerificationSession {
        self.state.read().await.session.clone()
    }

    /// Validate the address and ask the notification sender for a code.
    ///
    /// On success the session moves to the code step and the resend cooldown starts.
    #[tracing::instrument(name = "VerificationFlowController::submit_email", skip_all)]
    pub async fn submit_email(&self, email: &str) -> VerificationSession {
        let (session_id, email) = {
            let mut state = self.state.write().await;
            match state.session.start_email_submission(email) {
                Ok(email) => (state.session.id(), email),
                Err(e) => {
                    tracing::debug!(reason = %e, "Email submission rejected");
                    return state.session.clone();
                }
            }
        };

        let result = self.notification_sender.send(&email).await;
        if let Err(e) = &result {
            tracing::warn!(error = %e, "Failed to send verification code");
        }

        let mut state = self.state.write().await;
        if state.session.id() != session_id {
            tracing::debug!(%session_id, "Discarding send result for a reset session");
            return state.session.clone();
        }

        let sent = result.is_ok();
        state
            .session
            .complete_email_submission(email, result, self.options.resend_cooldown_secs);
        if sent {
            self.restart_cooldown(&mut state);
        }
        state.session.clone()
    }

    #[tracing::instrument(name = "VerificationFlowController::edit_code_digit", skip(self, value))]
    pub async fn edit_code_digit(&self, index: usize, value: &str) -> VerificationSession {
        let mut state = self.state.write().await;
        if let Err(e) = state.session.edit_code_digit(index, value) {
            tracing::debug!(reason = %e, "Code edit ignored");
        }
        state.session.clone()
    }

    /// Fill the code slots from pasted text.
    #[tracing::instrument(name = "VerificationFlowController::paste_code", skip_all)]
    pub async fn paste_code(&self, text: &str) -> VerificationSession {
        let mut state = self.state.write().await;
        if let Err(e) = state.session.paste_code(text) {
            tracing::debug!(reason = %e, "Paste ignored");
        }
        state.session.clone()
    }

    /// Submit the six entered digits to the code verifier.
    #[tracing::instrument(name = "VerificationFlowController::submit_code", skip_all)]
    pub async fn submit_code(&self) -> VerificationSession {
        let (session_id, email, code) = {
            let mut state = self.state.write().await;
            match state.session.start_code_submission() {
                Ok((email, code)) => (state.session.id(), email, code),
                Err(e) => {
                    tracing::debug!(reason = %e, "Code submission rejected");
                    return state.session.clone();
                }
            }
        };

        let result = self.code_verifier.verify(&email, &code).await;
        match &result {
            Ok(outcome) => tracing::debug!(?outcome, "Code verifier answered"),
            Err(e) => tracing::warn!(error = %e, "Failed to verify code"),
        }

        let mut state = self.state.write().await;
        if state.session.id() != session_id {
            tracing::debug!(%session_id, "Discarding verification result for a reset session");
            return state.session.clone();
        }

        state.session.complete_code_submission(result);
        if state.session.is_verified() {
            state.ticker = None;
            tracing::info!(%session_id, attempts = state.session.attempt_count(), "Session verified");
        }
        state.session.clone()
    }

    /// Leave the code step. The email stays so the form can be pre-filled.
    #[tracing::instrument(name = "VerificationFlowController::go_back", skip(self))]
    pub async fn go_back(&self) -> VerificationSession {
        let mut state = self.state.write().await;
        if let Err(e) = state.session.go_back() {
            tracing::debug!(reason = %e, "Back ignored");
        }
        state.session.clone()
    }

    /// Request a new code for the current address once the cooldown has run out.
    #[tracing::instrument(name = "VerificationFlowController::resend", skip(self))]
    pub async fn resend(&self) -> VerificationSession {
        let (session_id, email) = {
            let mut state = self.state.write().await;
            match state.session.start_resend() {
                Ok(email) => (state.session.id(), email),
                Err(e) => {
                    tracing::debug!(reason = %e, "Resend ignored");
                    return state.session.clone();
                }
            }
        };

        let result = self.notification_sender.send(&email).await;
        if let Err(e) = &result {
            tracing::warn!(error = %e, "Failed to resend verification code");
        }

        let mut state = self.state.write().await;
        if state.session.id() != session_id {
            tracing::debug!(%session_id, "Discarding resend result for a reset session");
            return state.session.clone();
        }

        let sent = result.is_ok();
        state
            .session
            .complete_resend(result, self.options.resend_cooldown_secs);
        if sent {
            self.restart_cooldown(&mut state);
        }
        state.session.clone()
    }

    /// Start over with a fresh session. Always permitted; outstanding calls are abandoned.
    #[tracing::instrument(name = "VerificationFlowController::reset", skip(self))]
    pub async fn reset(&self) -> VerificationSession {
        let mut state = self.state.write().await;
        state.ticker = None;
        state.session.reset();
        state.session.clone()
    }

    fn restart_cooldown(&self, state: &mut FlowState) {
        state.ticker = None;
        if state.session.resend_cooldown_secs() == 0 {
            return;
        }
        state.ticker = Some(CooldownTicker::spawn(
            Arc::clone(&self.state),
            state.session.id(),
            self.options.tick_interval,
        ));
    }
}
