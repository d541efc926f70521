//! Loan applications and statistics for signed-in users.

mod application;
mod form;
mod statistics;

pub use application::{
    CIBIL_SCORE, Education, LOAN_TERM_MONTHS, LoanApplication, MIN_AGE_YEARS, MIN_ANNUAL_INCOME,
    MIN_LOAN_AMOUNT, ParseEducationError, ValidationErrors, age_on,
};
pub use form::{LoanError, LoanForm, SUBMITTED_NAVIGATION_DELAY, load_statistics};
pub use statistics::LoanStatistics;
