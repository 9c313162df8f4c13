use std::time::Duration;

use chrono::TimeDelta;
use fake::{Fake, faker::internet::en::SafeEmail};
use otpflow::{
    Email, ExposeSecret, FlowError, FlowOptions, FlowStep, HttpOtpClient, InMemoryOtpBackend,
    VerificationFlowController,
};
use serde_json::json;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path},
};

fn options() -> FlowOptions {
    FlowOptions {
        resend_cooldown_secs: 0,
        tick_interval: Duration::from_secs(1),
    }
}

fn in_memory_flow(
    code_ttl: TimeDelta,
) -> (
    VerificationFlowController<InMemoryOtpBackend, InMemoryOtpBackend>,
    InMemoryOtpBackend,
) {
    let backend = InMemoryOtpBackend::new(code_ttl);
    let controller = VerificationFlowController::new(backend.clone(), backend.clone(), options());
    (controller, backend)
}

fn http_flow(server: &MockServer) -> VerificationFlowController<HttpOtpClient, HttpOtpClient> {
    let http_client = reqwest::Client::builder()
        .timeout(Duration::from_millis(500))
        .build()
        .unwrap();
    let client = HttpOtpClient::new(server.uri(), http_client);
    VerificationFlowController::new(client.clone(), client, options())
}

#[tokio::test]
async fn signup_with_in_memory_backend() {
    let (controller, backend) = in_memory_flow(TimeDelta::minutes(10));
    let address: String = SafeEmail().fake();

    let session = controller.submit_email(&address).await;
    assert_eq!(session.step(), FlowStep::CollectingCode);

    let email = Email::parse(&address).unwrap();
    let code = backend.latest_code(&email).unwrap();
    for (index, digit) in code.as_ref().expose_secret().chars().enumerate() {
        controller.edit_code_digit(index, &digit.to_string()).await;
    }

    let session = controller.submit_code().await;
    assert_eq!(session.step(), FlowStep::Verified);
    assert_eq!(session.attempt_count(), 1);
    assert!(session.error().is_none());
}

#[tokio::test]
async fn wrong_code_then_resend_then_right_code() {
    let (controller, backend) = in_memory_flow(TimeDelta::minutes(10));
    let email = Email::parse("designer@example.com").unwrap();

    controller.submit_email(email.as_ref()).await;
    let issued = backend.latest_code(&email).unwrap();
    let wrong = if issued.as_ref().expose_secret() == "000000" {
        "111111"
    } else {
        "000000"
    };

    controller.paste_code(wrong).await;
    let session = controller.submit_code().await;
    assert_eq!(session.error(), Some(FlowError::InvalidCode));
    assert!(session.code().is_empty());

    let session = controller.resend().await;
    assert!(session.error().is_none());
    let reissued = backend.latest_code(&email).unwrap();

    controller
        .paste_code(reissued.as_ref().expose_secret())
        .await;
    let session = controller.submit_code().await;
    assert_eq!(session.step(), FlowStep::Verified);
    assert_eq!(session.attempt_count(), 2);
}

#[tokio::test]
async fn expired_code_is_reported_as_invalid() {
    let (controller, backend) = in_memory_flow(TimeDelta::zero());
    let email = Email::parse("designer@example.com").unwrap();

    controller.submit_email(email.as_ref()).await;
    let code = backend.latest_code(&email).unwrap();
    controller.paste_code(code.as_ref().expose_secret()).await;

    let session = controller.submit_code().await;
    assert_eq!(session.step(), FlowStep::CollectingCode);
    assert_eq!(session.error(), Some(FlowError::InvalidCode));
}

#[tokio::test]
async fn signup_against_remote_service() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/otp/send"))
        .respond_with(ResponseTemplate::new(202))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/otp/verify"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "outcome": "invalid" })))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/otp/verify"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "outcome": "verified" })))
        .mount(&server)
        .await;

    let controller = http_flow(&server);
    controller.submit_email("designer@example.com").await;

    controller.paste_code("123456").await;
    let session = controller.submit_code().await;
    assert_eq!(session.error(), Some(FlowError::InvalidCode));

    controller.paste_code("654321").await;
    let session = controller.submit_code().await;
    assert_eq!(session.step(), FlowStep::Verified);
    assert_eq!(session.attempt_count(), 2);
}

#[tokio::test]
async fn rate_limited_send_keeps_email_step() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/otp/send"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;

    let controller = http_flow(&server);
    let session = controller.submit_email("designer@example.com").await;

    assert_eq!(session.step(), FlowStep::CollectingEmail);
    assert_eq!(session.error(), Some(FlowError::DeliveryFailed));
    assert_eq!(
        session.error().unwrap().to_string(),
        "Failed to send verification code. Please try again."
    );
}
