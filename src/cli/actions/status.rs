use crate::{cli::globals::GlobalArgs, session::Session, signup::PendingSignup};
use anyhow::{Context, Result};

/// Reports what the session file holds without revealing the token.
/// # Errors
/// Returns an error if the session file cannot be read.
pub fn execute(globals: &GlobalArgs) -> Result<()> {
    let store = globals.store();
    let signed_in = Session::load(&store)
        .context("failed to read the session")?
        .is_some();
    let pending = PendingSignup::load(&store).context("failed to read the pending signup")?;

    println!("API:            {}", globals.api_url);
    println!("Session file:   {}", globals.session_file.display());
    println!("Signed in:      {}", if signed_in { "yes" } else { "no" });
    match pending {
        Some(signup) => println!("Pending signup: {} (run `lendflow verify`)", signup.email),
        None => println!("Pending signup: none"),
    }
    Ok(())
}
