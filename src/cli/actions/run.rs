use crate::cli::actions::{Action, apply, logout, signup, stats, status, verify};
use anyhow::Result;

/// Single dispatch point for all CLI actions.
/// # Errors
/// Returns an error if the action fails.
pub async fn execute(action: Action) -> Result<()> {
    match action {
        Action::Signup { globals, details } => signup::execute(&globals, details).await,
        Action::Verify { globals } => verify::execute(&globals).await,
        Action::Apply {
            globals,
            application,
        } => apply::execute(&globals, application).await,
        Action::Stats { globals, offline } => stats::execute(&globals, offline).await,
        Action::Logout { globals } => logout::execute(&globals),
        Action::Status { globals } => status::execute(&globals),
    }
}
