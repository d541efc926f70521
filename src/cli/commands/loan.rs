use crate::loan::{Education, LoanApplication};
use chrono::NaiveDate;
use clap::{Arg, ArgAction, ArgMatches, Command};

pub const ARG_DEPENDENTS: &str = "dependents";
pub const ARG_EDUCATION: &str = "education";
pub const ARG_SELF_EMPLOYED: &str = "self-employed";
pub const ARG_INCOME: &str = "income";
pub const ARG_LOAN_AMOUNT: &str = "loan-amount";
pub const ARG_LOAN_TERM: &str = "loan-term";
pub const ARG_CIBIL_SCORE: &str = "cibil-score";
pub const ARG_DATE_OF_BIRTH: &str = "date-of-birth";

/// Form fields are optional here; missing ones fail local validation with the
/// same messages as an empty form.
#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_DEPENDENTS)
                .long(ARG_DEPENDENTS)
                .help("Number of dependents")
                .allow_negative_numbers(true)
                .value_parser(clap::value_parser!(i32)),
        )
        .arg(
            Arg::new(ARG_EDUCATION)
                .long(ARG_EDUCATION)
                .help("Not Graduate, Graduate, Post Graduate or Professional")
                .value_parser(clap::value_parser!(Education)),
        )
        .arg(
            Arg::new(ARG_SELF_EMPLOYED)
                .long(ARG_SELF_EMPLOYED)
                .help("Applicant is self-employed")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new(ARG_INCOME)
                .long(ARG_INCOME)
                .help("Annual income in rupees")
                .allow_negative_numbers(true)
                .value_parser(clap::value_parser!(i64)),
        )
        .arg(
            Arg::new(ARG_LOAN_AMOUNT)
                .long(ARG_LOAN_AMOUNT)
                .help("Requested amount in rupees")
                .allow_negative_numbers(true)
                .value_parser(clap::value_parser!(i64)),
        )
        .arg(
            Arg::new(ARG_LOAN_TERM)
                .long(ARG_LOAN_TERM)
                .help("Loan term in months (6-84)")
                .allow_negative_numbers(true)
                .value_parser(clap::value_parser!(i32)),
        )
        .arg(
            Arg::new(ARG_CIBIL_SCORE)
                .long(ARG_CIBIL_SCORE)
                .help("CIBIL credit score (300-900)")
                .allow_negative_numbers(true)
                .value_parser(clap::value_parser!(i32)),
        )
        .arg(
            Arg::new(ARG_DATE_OF_BIRTH)
                .long(ARG_DATE_OF_BIRTH)
                .help("Date of birth, YYYY-MM-DD")
                .value_parser(clap::value_parser!(NaiveDate)),
        )
}

#[derive(Debug)]
pub struct Options {
    pub application: LoanApplication,
}

impl Options {
    #[must_use]
    pub fn parse(matches: &ArgMatches) -> Self {
        let application = LoanApplication {
            no_of_dependents: matches.get_one::<i32>(ARG_DEPENDENTS).copied().unwrap_or(0),
            education: matches.get_one::<Education>(ARG_EDUCATION).copied(),
            self_employed: matches.get_flag(ARG_SELF_EMPLOYED),
            income_annum: matches.get_one::<i64>(ARG_INCOME).copied().unwrap_or(0),
            loan_amount: matches.get_one::<i64>(ARG_LOAN_AMOUNT).copied().unwrap_or(0),
            loan_term: matches.get_one::<i32>(ARG_LOAN_TERM).copied().unwrap_or(0),
            cibil_score: matches.get_one::<i32>(ARG_CIBIL_SCORE).copied().unwrap_or(0),
            date_of_birth: matches.get_one::<NaiveDate>(ARG_DATE_OF_BIRTH).copied(),
        };
        Self { application }
    }
}

/// Command-line flag for a form field, used when reporting validation errors.
#[must_use]
pub fn flag_for_field(field: &str) -> &str {
    match field {
        "no_of_dependents" => ARG_DEPENDENTS,
        "education" => ARG_EDUCATION,
        "self_employed" => ARG_SELF_EMPLOYED,
        "income_annum" => ARG_INCOME,
        "loan_amount" => ARG_LOAN_AMOUNT,
        "loan_term" => ARG_LOAN_TERM,
        "cibil_score" => ARG_CIBIL_SCORE,
        "date_of_birth" => ARG_DATE_OF_BIRTH,
        other => other,
    }
}
