//! Loan application payload and its local validation rules.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fmt, str::FromStr};
use thiserror::Error;

pub const MIN_AGE_YEARS: i32 = 18;
pub const MIN_ANNUAL_INCOME: i64 = 100_000;
pub const MIN_LOAN_AMOUNT: i64 = 10_000;
pub const LOAN_TERM_MONTHS: std::ops::RangeInclusive<i32> = 6..=84;
pub const CIBIL_SCORE: std::ops::RangeInclusive<i32> = 300..=900;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Education {
    #[serde(rename = "Not Graduate")]
    NotGraduate,
    Graduate,
    #[serde(rename = "Post Graduate")]
    PostGraduate,
    Professional,
}

impl Education {
    pub const ALL: [Self; 4] = [
        Self::NotGraduate,
        Self::Graduate,
        Self::PostGraduate,
        Self::Professional,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotGraduate => "Not Graduate",
            Self::Graduate => "Graduate",
            Self::PostGraduate => "Post Graduate",
            Self::Professional => "Professional",
        }
    }
}

impl fmt::Display for Education {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown education level: {0}")]
pub struct ParseEducationError(String);

impl FromStr for Education {
    type Err = ParseEducationError;

    /// Case-insensitive; `-` and `_` count as spaces.
    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let wanted = input.trim().replace(['-', '_'], " ").to_lowercase();
        Self::ALL
            .into_iter()
            .find(|level| level.as_str().to_lowercase() == wanted)
            .ok_or_else(|| ParseEducationError(input.to_string()))
    }
}

/// Form payload sent to `POST /api/loans/apply`. `Default` is the empty form.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanApplication {
    pub no_of_dependents: i32,
    pub education: Option<Education>,
    pub self_employed: bool,
    pub income_annum: i64,
    pub loan_amount: i64,
    pub loan_term: i32,
    pub cibil_score: i32,
    pub date_of_birth: Option<NaiveDate>,
}

/// Per-field validation messages keyed by wire field name.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ValidationErrors(BTreeMap<&'static str, &'static str>);

impl ValidationErrors {
    fn add(&mut self, field: &'static str, message: &'static str) {
        self.0.insert(field, message);
    }

    #[must_use]
    pub fn get(&self, field: &str) -> Option<&'static str> {
        self.0.get(field).copied()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &'static str)> + '_ {
        self.0.iter().map(|(field, message)| (*field, *message))
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<_> = self.0.values().copied().collect();
        f.write_str(&messages.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

/// Whole years between `birth` and `today`, counting a year only once the
/// birthday has passed.
#[must_use]
pub fn age_on(birth: NaiveDate, today: NaiveDate) -> i32 {
    let years = today.year() - birth.year();
    if (today.month(), today.day()) < (birth.month(), birth.day()) {
        years - 1
    } else {
        years
    }
}

impl LoanApplication {
    /// # Errors
    /// Returns every failed field rule.
    pub fn validate(&self, today: NaiveDate) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();

        match self.date_of_birth {
            None => errors.add("date_of_birth", "Date of birth is required"),
            Some(birth) if age_on(birth, today) < MIN_AGE_YEARS => {
                errors.add("date_of_birth", "You must be at least 18 years old");
            }
            Some(_) => {}
        }
        if self.no_of_dependents < 0 {
            errors.add(
                "no_of_dependents",
                "Number of dependents cannot be negative",
            );
        }
        if self.education.is_none() {
            errors.add("education", "Education is required");
        }
        if self.income_annum < MIN_ANNUAL_INCOME {
            errors.add("income_annum", "Annual income must be at least ₹1,00,000");
        }
        if self.loan_amount < MIN_LOAN_AMOUNT {
            errors.add("loan_amount", "Loan amount must be at least ₹10,000");
        }
        if !LOAN_TERM_MONTHS.contains(&self.loan_term) {
            errors.add("loan_term", "Loan term must be between 6 and 84 months");
        }
        if !CIBIL_SCORE.contains(&self.cibil_score) {
            errors.add("cibil_score", "CIBIL score must be between 300 and 900");
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
