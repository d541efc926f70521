pub mod api;
pub mod loan;
pub mod logging;
pub mod session;
pub mod signup;

use clap::{
    Arg, ArgAction, ColorChoice, Command,
    builder::styling::{AnsiColor, Effects, Styles},
};

pub const CMD_SIGNUP: &str = "signup";
pub const CMD_VERIFY: &str = "verify";
pub const CMD_APPLY: &str = "apply";
pub const CMD_STATS: &str = "stats";
pub const CMD_LOGOUT: &str = "logout";
pub const CMD_STATUS: &str = "status";
pub const ARG_OFFLINE: &str = "offline";

#[must_use]
pub fn new() -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    let long_version: &'static str = Box::leak(
        format!("{} - {}", env!("CARGO_PKG_VERSION"), crate::GIT_COMMIT_HASH).into_boxed_str(),
    );

    let command = Command::new("lendflow")
        .about("Sign up, verify your email and apply for loans")
        .version(env!("CARGO_PKG_VERSION"))
        .long_version(long_version)
        .color(ColorChoice::Auto)
        .styles(styles)
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(signup::with_args(
            Command::new(CMD_SIGNUP).about("Create an account and verify the emailed OTP"),
        ))
        .subcommand(
            Command::new(CMD_VERIFY).about("Resume verification of a pending signup"),
        )
        .subcommand(loan::with_args(
            Command::new(CMD_APPLY).about("Submit a loan application"),
        ))
        .subcommand(
            Command::new(CMD_STATS)
                .about("Show loan application statistics")
                .arg(
                    Arg::new(ARG_OFFLINE)
                        .long(ARG_OFFLINE)
                        .help("Show the built-in sample figures without calling the API")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(Command::new(CMD_LOGOUT).about("Forget the stored session"))
        .subcommand(Command::new(CMD_STATUS).about("Show session and pending signup state"));

    let command = api::with_args(command);
    let command = session::with_args(command);
    logging::with_args(command)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::{path::PathBuf, time::Duration};

    const CLEARED: [(&str, Option<&str>); 6] = [
        ("LENDFLOW_API_URL", None),
        ("LENDFLOW_TIMEOUT_SECONDS", None),
        ("LENDFLOW_SESSION_FILE", None),
        ("LENDFLOW_OTP_WINDOW_SECONDS", None),
        ("LENDFLOW_LOG_LEVEL", None),
        ("LENDFLOW_PASSWORD", None),
    ];

    #[test]
    fn test_new() {
        let command = new();

        assert_eq!(command.get_name(), "lendflow");
        assert_eq!(
            command.get_version().map(ToString::to_string),
            Some(env!("CARGO_PKG_VERSION").to_string())
        );
        let names: Vec<_> = command.get_subcommands().map(Command::get_name).collect();
        assert_eq!(
            names,
            [CMD_SIGNUP, CMD_VERIFY, CMD_APPLY, CMD_STATS, CMD_LOGOUT, CMD_STATUS]
        );
    }

    #[test]
    fn test_defaults() {
        temp_env::with_vars(CLEARED, || {
            let matches = new().get_matches_from(["lendflow", CMD_STATUS]);
            let api = api::Options::parse(&matches).unwrap();
            assert_eq!(api.url, "http://localhost:1000");
            assert_eq!(api.timeout, Duration::from_secs(10));

            let session = session::Options::parse(&matches).unwrap();
            assert_eq!(session.file, PathBuf::from(".lendflow/session.json"));
            assert_eq!(session.otp_window, 300);
        });
    }

    #[test]
    fn test_check_env() {
        temp_env::with_vars(
            [
                ("LENDFLOW_API_URL", Some("https://api.lendflow.test")),
                ("LENDFLOW_TIMEOUT_SECONDS", Some("3")),
                ("LENDFLOW_SESSION_FILE", Some("/tmp/lendflow.json")),
                ("LENDFLOW_OTP_WINDOW_SECONDS", Some("60")),
                ("LENDFLOW_LOG_LEVEL", Some("info")),
            ],
            || {
                let matches = new().get_matches_from(["lendflow", CMD_STATUS]);
                let api = api::Options::parse(&matches).unwrap();
                assert_eq!(api.url, "https://api.lendflow.test");
                assert_eq!(api.timeout, Duration::from_secs(3));
                let session = session::Options::parse(&matches).unwrap();
                assert_eq!(session.file, PathBuf::from("/tmp/lendflow.json"));
                assert_eq!(session.otp_window, 60);
                assert_eq!(
                    matches.get_one::<u8>(logging::ARG_VERBOSITY).copied(),
                    Some(2)
                );
            },
        );
    }

    #[test]
    fn test_check_log_level_env() {
        let levels = ["error", "warn", "info", "debug", "trace"];
        for (index, &level) in levels.iter().enumerate() {
            temp_env::with_vars([("LENDFLOW_LOG_LEVEL", Some(level))], || {
                let matches = new().get_matches_from(["lendflow", CMD_STATUS]);
                assert_eq!(
                    matches.get_one::<u8>(logging::ARG_VERBOSITY).copied(),
                    u8::try_from(index).ok()
                );
            });
        }
    }

    #[test]
    fn test_check_log_level_verbosity() {
        for index in 0..5 {
            temp_env::with_vars([("LENDFLOW_LOG_LEVEL", None::<String>)], || {
                let mut args = vec!["lendflow".to_string(), CMD_STATUS.to_string()];
                if index > 0 {
                    args.push(format!("-{}", "v".repeat(index)));
                }

                let matches = new().get_matches_from(args);

                assert_eq!(
                    matches.get_one::<u8>(logging::ARG_VERBOSITY).copied(),
                    u8::try_from(index).ok()
                );
            });
        }
    }

    #[test]
    fn test_signup_flags() {
        temp_env::with_vars(CLEARED, || {
            let matches = new().get_matches_from([
                "lendflow",
                CMD_SIGNUP,
                "--email",
                "ana@example.com",
                "--name",
                "Ana Lima",
            ]);
            let (_, sub) = matches.subcommand().unwrap();
            let options = signup::Options::parse(sub);
            assert_eq!(options.email.as_deref(), Some("ana@example.com"));
            assert_eq!(options.name.as_deref(), Some("Ana Lima"));
            assert!(options.phone.is_none());
            assert!(options.password.is_none());
        });
    }

    #[test]
    fn test_password_from_env_is_redacted() {
        temp_env::with_var("LENDFLOW_PASSWORD", Some("hunter22"), || {
            let matches = new().get_matches_from(["lendflow", CMD_SIGNUP]);
            let (_, sub) = matches.subcommand().unwrap();
            let options = signup::Options::parse(sub);
            assert!(options.password.is_some());
            assert!(!format!("{options:?}").contains("hunter22"));
        });
    }

    #[test]
    fn test_apply_flags() {
        let matches = new().get_matches_from([
            "lendflow",
            CMD_APPLY,
            "--dependents",
            "-1",
            "--education",
            "post graduate",
            "--self-employed",
            "--income",
            "500000",
            "--date-of-birth",
            "1990-04-12",
        ]);
        let (_, sub) = matches.subcommand().unwrap();
        let application = loan::Options::parse(sub).application;
        assert_eq!(application.no_of_dependents, -1);
        assert_eq!(
            application.education,
            Some(crate::loan::Education::PostGraduate)
        );
        assert!(application.self_employed);
        assert_eq!(application.income_annum, 500_000);
        assert_eq!(application.loan_term, 0);
        assert_eq!(
            application.date_of_birth.map(|date| date.to_string()),
            Some("1990-04-12".to_string())
        );
    }

    #[test]
    fn test_numeric_log_level_bounds() {
        let parser = logging::validator_log_level();
        let command = Command::new("lendflow").arg(Arg::new("level").value_parser(parser));
        let matches = command.clone().try_get_matches_from(["lendflow", "4"]).unwrap();
        assert_eq!(matches.get_one::<u8>("level").copied(), Some(4));
        assert!(command.try_get_matches_from(["lendflow", "5"]).is_err());
    }

    #[test]
    fn test_invalid_values_fail() {
        let result = new().try_get_matches_from(["lendflow", CMD_APPLY, "--education", "phd"]);
        assert_eq!(
            result.map_err(|e| e.kind()),
            Err(clap::error::ErrorKind::ValueValidation)
        );

        let result = new().try_get_matches_from(["lendflow"]);
        assert!(result.is_err());
    }
}
