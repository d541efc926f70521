//! # Lendflow (Signup, OTP Verification & Loan Application Client)
//!
//! `lendflow` drives the client side of the loan product onboarding: account
//! signup confirmed by an emailed one-time code, followed by authenticated loan
//! applications and statistics lookups against the lending API.
//!
//! ## Signup & OTP Verification
//!
//! 1. **Details:** The user enters name, email, phone and password. Inputs are
//!    validated locally; nothing is sent until the password confirmation matches.
//! 2. **Request:** `POST /api/auth/request-otp` issues a 6-digit code. The pending
//!    signup is written to the session store so the verification screen can be
//!    resumed after a restart.
//! 3. **Countdown:** A one-second timer runs the resend window (300 seconds by
//!    default). Resend is only possible once the countdown reaches zero.
//! 4. **Verify:** `POST /api/auth/verify-otp` returns a bearer token that is kept
//!    in the session store and attached to every later authenticated call.
//!
//! The flow itself is a pure state machine (`signup::machine`) wrapped by a
//! controller (`signup::SignupFlow`) that performs the side effects through
//! injected capabilities: the auth service, the session store and the navigator.
//!
//! ## Secrets
//!
//! Passwords, OTP codes and bearer tokens must never be logged. Passwords are
//! not written to the session store.

pub mod api;
pub mod cli;
pub mod loan;
pub mod navigator;
pub mod session;
pub mod signup;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);
