use crate::{cli::globals::GlobalArgs, session::Session};
use anyhow::{Context, Result};
use tracing::info;

/// Forgets the stored session token. Pending signups are left alone.
/// # Errors
/// Returns an error if the session file cannot be updated.
pub fn execute(globals: &GlobalArgs) -> Result<()> {
    let store = globals.store();
    Session::clear(&store).context("failed to clear the session")?;
    info!("session cleared");
    println!("Logged out.");
    Ok(())
}
