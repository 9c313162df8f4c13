use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use dashmap::{DashMap, mapref::entry::Entry};
use otpflow_core::{
    CodeVerifier, Email, NotificationSender, OtpCode, SendError, VerifyError, VerifyOutcome,
};
use secrecy::ExposeSecret;

#[derive(Debug, Clone)]
struct IssuedCode {
    code: OtpCode,
    expires_at: DateTime<Utc>,
}

/// In-process stand-in for the OTP service.
///
/// `send` issues a random code per address (replacing any earlier one) and "delivers" it by
/// logging it. `verify` consumes the code on success.
#[derive(Debug, Clone)]
pub struct InMemoryOtpBackend {
    codes: Arc<DashMap<Email, IssuedCode>>,
    code_ttl: TimeDelta,
}

impl InMemoryOtpBackend {
    pub fn new(code_ttl: TimeDelta) -> Self {
        Self {
            codes: Arc::new(DashMap::new()),
            code_ttl,
        }
    }

    /// The code currently outstanding for `email`, if any.
    pub fn latest_code(&self, email: &Email) -> Option<OtpCode> {
        self.codes.get(email).map(|issued| issued.code.clone())
    }
}

#[async_trait::async_trait]
impl NotificationSender for InMemoryOtpBackend {
    async fn send(&self, email: &Email) -> Result<(), SendError> {
        let code = OtpCode::new();
        tracing::info!(
            recipient = %email,
            code = %code.as_ref().expose_secret(),
            "Issued verification code"
        );

        self.codes.insert(
            email.clone(),
            IssuedCode {
                code,
                expires_at: Utc::now()
                    .checked_add_signed(self.code_ttl)
                    .unwrap_or(DateTime::<Utc>::MAX_UTC),
            },
        );
        Ok(())
    }
}

#[async_trait::async_trait]
impl CodeVerifier for InMemoryOtpBackend {
    async fn verify(&self, email: &Email, code: &OtpCode) -> Result<VerifyOutcome, VerifyError> {
        // the shard stays write-locked from lookup to removal, so a code is consumed at most once
        let Entry::Occupied(issued) = self.codes.entry(email.clone()) else {
            return Ok(VerifyOutcome::Invalid);
        };

        if Utc::now() >= issued.get().expires_at {
            issued.remove();
            return Ok(VerifyOutcome::Expired);
        }
        if issued.get().code != *code {
            return Ok(VerifyOutcome::Invalid);
        }

        issued.remove();
        Ok(VerifyOutcome::Verified)
    }
}
