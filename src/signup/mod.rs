//! Signup and email verification.
//!
//! The flow collects account details, asks the authentication service for a
//! one-time code, counts down the resend window and exchanges a valid code for
//! a bearer token. Decisions live in the pure [`machine`]; [`SignupFlow`]
//! performs the effects it asks for.

mod error;
mod flow;
pub mod machine;
pub mod timer;
mod types;

pub use error::FlowError;
pub use flow::SignupFlow;
pub use machine::{FlowState, Phase};
pub use types::{
    DEFAULT_OTP_WINDOW_SECONDS, OTP_LENGTH, OtpChallenge, OtpCode, PendingSignup,
    normalize_email, valid_email,
};
