use std::io::Write;

use color_eyre::eyre::Result;
use otpflow_adapters::{
    backend::{HttpOtpClient, InMemoryOtpBackend},
    config::{Settings, env::BACKEND_BASE_URL_ENV_VAR},
    telemetry::init_tracing,
};
use otpflow_application::VerificationFlowController;
use otpflow_core::{CodeEntry, CodeVerifier, FlowStep, NotificationSender, VerificationSession};
use reqwest::Client as HttpClient;
use tokio::io::{AsyncBufReadExt, BufReader};

/// Terminal front-end for the sign-up verification flow.
#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    init_tracing()?;

    let settings = Settings::load()?;
    let options = settings.flow_options();

    match settings.backend.base_url.clone() {
        Some(base_url) => {
            tracing::info!(%base_url, "Using remote OTP service");
            let http_client = HttpClient::builder()
                .timeout(settings.backend_timeout())
                .build()?;
            let client = HttpOtpClient::new(base_url, http_client);
            run(VerificationFlowController::new(client.clone(), client, options)).await
        }
        None => {
            tracing::info!(
                "{BACKEND_BASE_URL_ENV_VAR} is not set, codes are issued in memory and logged"
            );
            let backend = InMemoryOtpBackend::new(settings.code_ttl());
            run(VerificationFlowController::new(
                backend.clone(),
                backend,
                options,
            ))
            .await
        }
    }
}

async fn run<N, V>(controller: VerificationFlowController<N, V>) -> Result<()>
where
    N: NotificationSender + 'static,
    V: CodeVerifier + 'static,
{
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut session = controller.session().await;
    // slot that receives the next single typed digit
    let mut focus = 0;

    loop {
        render(&session, focus)?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let input = line.trim();
        if input == "quit" {
            break;
        }

        session = match session.step() {
            FlowStep::CollectingEmail => {
                // an empty line re-uses the address from before "back"
                let email = match (input.is_empty(), session.email()) {
                    (true, Some(previous)) => previous.to_string(),
                    _ => input.to_owned(),
                };
                controller.submit_email(&email).await
            }
            FlowStep::CollectingCode => match input {
                "back" => controller.go_back().await,
                "resend" => controller.resend().await,
                digit if digit.chars().count() == 1 => {
                    let edited = controller.edit_code_digit(focus, digit).await;
                    if edited.code().digit(focus) == digit.chars().next() {
                        focus = CodeEntry::next_focus(focus);
                    }
                    if edited.code().is_complete() {
                        controller.submit_code().await
                    } else {
                        edited
                    }
                }
                code => {
                    controller.paste_code(code).await;
                    controller.submit_code().await
                }
            },
            FlowStep::Verified => break,
        };

        if session.code().is_empty() {
            focus = 0;
        }

        if session.is_verified() {
            println!("You're in! Your account has been verified.");
            break;
        }
    }

    controller.reset().await;
    Ok(())
}

fn render(session: &VerificationSession, focus: usize) -> Result<()> {
    let mut stdout = std::io::stdout().lock();

    if let Some(error) = session.error() {
        writeln!(stdout, "! {error}")?;
    }

    match session.step() {
        FlowStep::CollectingEmail => {
            writeln!(
                stdout,
                "Enter your email to receive a 6-digit verification code."
            )?;
            match session.email() {
                Some(previous) => write!(stdout, "email [{previous}]> ")?,
                None => write!(stdout, "email> ")?,
            }
        }
        FlowStep::CollectingCode => {
            if let Some(email) = session.email() {
                writeln!(stdout, "We sent a 6-digit code to {email}")?;
            }
            match session.resend_cooldown_secs() {
                0 => writeln!(stdout, "Didn't receive a code? Type `resend`.")?,
                secs => writeln!(stdout, "You can request a new code in {secs}s.")?,
            }
            writeln!(stdout, "Type `back` to use a different address.")?;
            if session.code().is_empty() {
                write!(stdout, "code> ")?;
            } else {
                let entered: String = session.code().slots().iter().flatten().collect();
                write!(stdout, "code [{entered}] digit {}> ", focus + 1)?;
            }
        }
        FlowStep::Verified => {}
    }

    stdout.flush()?;
    Ok(())
}
