use anyhow::{Context, Result};
use clap::{Arg, ArgMatches, Command};
use std::path::PathBuf;

pub const ARG_SESSION_FILE: &str = "session-file";
pub const ARG_OTP_WINDOW_SECONDS: &str = "otp-window-seconds";

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_SESSION_FILE)
                .long(ARG_SESSION_FILE)
                .help("File holding the session token and pending signup")
                .env("LENDFLOW_SESSION_FILE")
                .default_value(".lendflow/session.json")
                .global(true)
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new(ARG_OTP_WINDOW_SECONDS)
                .long(ARG_OTP_WINDOW_SECONDS)
                .help("Seconds before a new OTP can be requested")
                .env("LENDFLOW_OTP_WINDOW_SECONDS")
                .default_value("300")
                .global(true)
                .value_parser(clap::value_parser!(u32)),
        )
}

#[derive(Debug)]
pub struct Options {
    pub file: PathBuf,
    pub otp_window: u32,
}

impl Options {
    /// # Errors
    /// Returns an error if a defaulted argument is missing.
    pub fn parse(matches: &ArgMatches) -> Result<Self> {
        Ok(Self {
            file: matches
                .get_one::<PathBuf>(ARG_SESSION_FILE)
                .cloned()
                .context("missing required argument: --session-file")?,
            otp_window: matches
                .get_one::<u32>(ARG_OTP_WINDOW_SECONDS)
                .copied()
                .context("missing required argument: --otp-window-seconds")?,
        })
    }
}
