use crate::{
    api::HttpLoanService,
    cli::{commands::loan::flag_for_field, globals::GlobalArgs},
    loan::{LoanApplication, LoanError, LoanForm},
    navigator::ConsoleNavigator,
};
use anyhow::{Context, Result, bail};
use chrono::Local;

/// Validates the application locally, then submits it with the stored session.
/// # Errors
/// Returns an error if the application is invalid or the submission fails.
pub async fn execute(globals: &GlobalArgs, application: LoanApplication) -> Result<()> {
    let service = HttpLoanService::new(globals.api_client()?);
    let mut form = LoanForm::new(service, globals.store(), ConsoleNavigator);
    *form.application_mut() = application;

    match form.submit(Local::now().date_naive()).await {
        Ok(()) => {
            if let Some(message) = form.message() {
                println!("{message}");
            }
            form.wait_for_navigation().await;
            Ok(())
        }
        Err(LoanError::Invalid(errors)) => {
            for (field, message) in errors.iter() {
                eprintln!("  --{}: {message}", flag_for_field(field));
            }
            bail!("loan application has {} invalid field(s)", errors.len())
        }
        Err(err) => Err(err).context("loan application failed"),
    }
}
