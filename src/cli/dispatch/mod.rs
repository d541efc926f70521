//! Maps parsed command-line matches to the action the binary runs.

use crate::cli::{
    actions::Action,
    commands::{
        self, ARG_OFFLINE, CMD_APPLY, CMD_LOGOUT, CMD_SIGNUP, CMD_STATS, CMD_STATUS, CMD_VERIFY,
        api, loan, session, signup,
    },
    globals::GlobalArgs,
};
use anyhow::{Result, bail};
use clap::ArgMatches;

/// # Errors
/// Returns an error if a required argument is missing or the subcommand is unknown.
pub fn handler(matches: &ArgMatches) -> Result<Action> {
    let api_opts = api::Options::parse(matches)?;
    let session_opts = session::Options::parse(matches)?;
    let globals = GlobalArgs::new(
        api_opts.url,
        api_opts.timeout,
        session_opts.file,
        session_opts.otp_window,
    );

    let action = match matches.subcommand() {
        Some((CMD_SIGNUP, sub)) => Action::Signup {
            globals,
            details: signup::Options::parse(sub),
        },
        Some((CMD_VERIFY, _)) => Action::Verify { globals },
        Some((CMD_APPLY, sub)) => Action::Apply {
            globals,
            application: loan::Options::parse(sub).application,
        },
        Some((CMD_STATS, sub)) => Action::Stats {
            globals,
            offline: sub.get_flag(ARG_OFFLINE),
        },
        Some((CMD_LOGOUT, _)) => Action::Logout { globals },
        Some((CMD_STATUS, _)) => Action::Status { globals },
        Some((other, _)) => bail!("unknown command: {other}"),
        None => bail!("missing command, see `{} --help`", commands::new().get_name()),
    };

    Ok(action)
}
