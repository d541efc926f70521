use crate::{
    api::HttpAuthService,
    cli::{
        actions::{
            console::Console,
            verify::{ConsoleFlow, run_screen},
        },
        commands::signup::Options as SignupDetails,
        globals::GlobalArgs,
    },
    navigator::ConsoleNavigator,
    signup::PendingSignup,
};
use anyhow::{Context, Result};
use secrecy::SecretString;
use tracing::debug;

/// Collects the signup details, requests a code and opens the verification
/// screen.
/// # Errors
/// Returns an error if the details are rejected or stdin cannot be read.
pub async fn execute(globals: &GlobalArgs, details: SignupDetails) -> Result<()> {
    debug!(?globals, "signup");
    let mut console = Console::new();

    let email = match details.email {
        Some(email) => email,
        None => console.ask("Email").await?,
    };
    let name = match details.name {
        Some(name) => name,
        None => console.ask("Full name (optional)").await?,
    };
    let phone = match details.phone {
        Some(phone) => phone,
        None => console.ask("Phone number (optional)").await?,
    };
    let (password, confirm_password) = match details.password {
        Some(password) => (password.clone(), password),
        None => (
            SecretString::from(console.ask("Password").await?),
            SecretString::from(console.ask("Confirm password").await?),
        ),
    };

    let signup = PendingSignup::new(&email, password, confirm_password)
        .with_full_name(&name)
        .with_phone_number(&phone);

    let auth = HttpAuthService::new(globals.api_client()?);
    let mut flow = ConsoleFlow::new(auth, globals.store(), ConsoleNavigator)
        .with_otp_window(globals.otp_window);
    flow.submit_signup_details(signup)
        .await
        .context("signup failed")?;
    if let Some(message) = flow.message() {
        println!("{message}");
    }

    run_screen(&mut flow, &mut console).await
}
