use clap::{Arg, ArgMatches, Command};
use secrecy::SecretString;

pub const ARG_EMAIL: &str = "email";
pub const ARG_NAME: &str = "name";
pub const ARG_PHONE: &str = "phone";
pub const ARG_PASSWORD: &str = "password";

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_EMAIL)
                .long(ARG_EMAIL)
                .help("Email address to verify"),
        )
        .arg(Arg::new(ARG_NAME).long(ARG_NAME).help("Full name"))
        .arg(Arg::new(ARG_PHONE).long(ARG_PHONE).help("Phone number"))
        .arg(
            Arg::new(ARG_PASSWORD)
                .long(ARG_PASSWORD)
                .help("Account password; prompted for when not set")
                .env("LENDFLOW_PASSWORD")
                .hide_env_values(true),
        )
}

/// Values given up front; anything missing is prompted for.
pub struct Options {
    pub email: Option<String>,
    pub name: Option<String>,
    pub phone: Option<String>,
    pub password: Option<SecretString>,
}

impl Options {
    #[must_use]
    pub fn parse(matches: &ArgMatches) -> Self {
        Self {
            email: matches.get_one::<String>(ARG_EMAIL).cloned(),
            name: matches.get_one::<String>(ARG_NAME).cloned(),
            phone: matches.get_one::<String>(ARG_PHONE).cloned(),
            password: matches
                .get_one::<String>(ARG_PASSWORD)
                .map(|password| SecretString::from(password.clone())),
        }
    }
}

impl std::fmt::Debug for Options {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Options")
            .field("email", &self.email)
            .field("name", &self.name)
            .field("phone", &self.phone)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .finish()
    }
}
