use otpflow_core::{
    CodeVerifier, Email, NotificationSender, OtpCode, SendError, VerifyError, VerifyOutcome,
};
use reqwest::{Client, StatusCode, Url};
use secrecy::ExposeSecret;

use crate::config::routes;

/// Client for a remote OTP service, implementing both collaborator ports.
///
/// `POST /otp/send` answers 2xx once a code is on its way, 429 when the address has asked for
/// too many codes and 400/422 when it cannot be delivered to. `POST /otp/verify` answers 2xx
/// with `{"outcome": "verified" | "invalid" | "expired"}`.
#[derive(Debug, Clone)]
pub struct HttpOtpClient {
    http_client: Client,
    base_url: String,
}

impl HttpOtpClient {
    pub fn new(base_url: String, http_client: Client) -> Self {
        Self {
            http_client,
            base_url,
        }
    }

    fn endpoint(&self, route: &str) -> Result<Url, String> {
        let base = Url::parse(&self.base_url).map_err(|e| e.to_string())?;
        base.join(route).map_err(|e| e.to_string())
    }
}

#[async_trait::async_trait]
impl NotificationSender for HttpOtpClient {
    #[tracing::instrument(name = "Requesting verification code", skip_all)]
    async fn send(&self, email: &Email) -> Result<(), SendError> {
        let url = self
            .endpoint(routes::SEND_CODE)
            .map_err(SendError::TransientFailure)?;

        let response = self
            .http_client
            .post(url)
            .json(&SendCodeRequest {
                email: email.as_ref(),
            })
            .send()
            .await
            .map_err(|e| SendError::TransientFailure(e.to_string()))?;

        match response.status() {
            status if status.is_success() => Ok(()),
            StatusCode::TOO_MANY_REQUESTS => Err(SendError::RateLimited),
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                Err(SendError::InvalidRecipient)
            }
            status => Err(SendError::TransientFailure(format!(
                "Unexpected status {status}"
            ))),
        }
    }
}

#[async_trait::async_trait]
impl CodeVerifier for HttpOtpClient {
    #[tracing::instrument(name = "Verifying code", skip_all)]
    async fn verify(&self, email: &Email, code: &OtpCode) -> Result<VerifyOutcome, VerifyError> {
        let url = self
            .endpoint(routes::VERIFY_CODE)
            .map_err(VerifyError::TransientFailure)?;

        let response = self
            .http_client
            .post(url)
            .json(&VerifyCodeRequest {
                email: email.as_ref(),
                code: code.as_ref().expose_secret(),
            })
            .send()
            .await
            .map_err(|e| VerifyError::TransientFailure(e.to_string()))?
            .error_for_status()
            .map_err(|e| VerifyError::TransientFailure(e.to_string()))?;

        let body: VerifyCodeResponse = response
            .json()
            .await
            .map_err(|e| VerifyError::TransientFailure(e.to_string()))?;

        Ok(body.outcome.into())
    }
}

#[derive(serde::Serialize, Debug)]
struct SendCodeRequest<'a> {
    email: &'a str,
}

#[derive(serde::Serialize)]
struct VerifyCodeRequest<'a> {
    email: &'a str,
    code: &'a str,
}

#[derive(serde::Deserialize, Debug)]
struct VerifyCodeResponse {
    outcome: Outcome,
}

#[derive(serde::Deserialize, Debug)]
#[serde(rename_all = "lowercase")]
enum Outcome {
    Verified,
    Invalid,
    Expired,
}

impl From<Outcome> for VerifyOutcome {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Verified => VerifyOutcome::Verified,
            Outcome::Invalid => VerifyOutcome::Invalid,
            Outcome::Expired => VerifyOutcome::Expired,
        }
    }
}
