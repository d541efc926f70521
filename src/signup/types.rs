//! Data collected and tracked by the signup flow.

use super::error::FlowError;
use crate::session::{PENDING_SIGNUP_KEY, SessionStore, StoreError};
use regex::Regex;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of digits in a one-time code.
pub const OTP_LENGTH: usize = 6;
/// Resend window applied to every issued challenge, in seconds.
pub const DEFAULT_OTP_WINDOW_SECONDS: u32 = 300;

pub(crate) const MISSING_FIELDS: &str = "Please fill all required fields correctly.";
pub(crate) const PASSWORD_MISMATCH: &str = "Passwords do not match.";
pub(crate) const INVALID_EMAIL: &str = "Please enter a valid email address.";

/// Normalize an email for the request/verify pair.
#[must_use]
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Basic email format check on already-normalized input.
#[must_use]
pub fn valid_email(email_normalized: &str) -> bool {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").is_ok_and(|regex| regex.is_match(email_normalized))
}

/// Account details collected before the email is confirmed.
///
/// Only the profile fields are serialized; passwords stay in memory.
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingSignup {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(skip)]
    pub password: SecretString,
    #[serde(skip)]
    pub confirm_password: SecretString,
}

impl PendingSignup {
    #[must_use]
    pub fn new(email: &str, password: SecretString, confirm_password: SecretString) -> Self {
        Self {
            full_name: None,
            email: email.to_string(),
            phone_number: None,
            password,
            confirm_password,
        }
    }

    #[must_use]
    pub fn with_full_name(mut self, name: &str) -> Self {
        self.full_name = non_blank(name);
        self
    }

    #[must_use]
    pub fn with_phone_number(mut self, phone: &str) -> Self {
        self.phone_number = non_blank(phone);
        self
    }

    /// Normalized email identifying the flow.
    #[must_use]
    pub fn email(&self) -> String {
        normalize_email(&self.email)
    }

    /// Checks required fields and the password confirmation.
    /// # Errors
    /// Returns `FlowError::Validation` describing the first failed check.
    pub fn validate(&self) -> Result<(), FlowError> {
        let password = self.password.expose_secret();
        let confirm = self.confirm_password.expose_secret();

        if self.email().is_empty() || password.trim().is_empty() || confirm.trim().is_empty() {
            return Err(FlowError::Validation(MISSING_FIELDS.to_string()));
        }
        if password != confirm {
            return Err(FlowError::Validation(PASSWORD_MISMATCH.to_string()));
        }
        if !valid_email(&self.email()) {
            return Err(FlowError::Validation(INVALID_EMAIL.to_string()));
        }
        Ok(())
    }

    /// Writes the profile fields under the pending-signup key.
    /// # Errors
    /// Returns an error if the store cannot be written.
    pub fn save(&self, store: &impl SessionStore) -> Result<(), StoreError> {
        let mut persisted = self.clone();
        persisted.email = self.email();
        store.set(PENDING_SIGNUP_KEY, &serde_json::to_string(&persisted)?)
    }

    /// # Errors
    /// Returns an error if the store cannot be read or holds invalid JSON.
    pub fn load(store: &impl SessionStore) -> Result<Option<Self>, StoreError> {
        store
            .get(PENDING_SIGNUP_KEY)?
            .map(|raw| serde_json::from_str(&raw))
            .transpose()
            .map_err(StoreError::from)
    }

    /// # Errors
    /// Returns an error if the store cannot be written.
    pub fn discard(store: &impl SessionStore) -> Result<(), StoreError> {
        store.remove(PENDING_SIGNUP_KEY)
    }
}

impl PartialEq for PendingSignup {
    fn eq(&self, other: &Self) -> bool {
        self.full_name == other.full_name
            && self.email == other.email
            && self.phone_number == other.phone_number
            && self.password.expose_secret() == other.password.expose_secret()
            && self.confirm_password.expose_secret() == other.confirm_password.expose_secret()
    }
}

impl fmt::Debug for PendingSignup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingSignup")
            .field("full_name", &self.full_name)
            .field("email", &self.email)
            .field("phone_number", &self.phone_number)
            .field("password", &"***")
            .field("confirm_password", &"***")
            .finish()
    }
}

fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// A syntactically valid one-time code: exactly six ASCII digits.
#[derive(Clone, PartialEq, Eq)]
pub struct OtpCode(String);

impl OtpCode {
    /// # Errors
    /// Returns `FlowError::InvalidOtpFormat` unless `input` is exactly six ASCII digits.
    pub fn parse(input: &str) -> Result<Self, FlowError> {
        if input.len() == OTP_LENGTH && input.bytes().all(|b| b.is_ascii_digit()) {
            Ok(Self(input.to_string()))
        } else {
            Err(FlowError::InvalidOtpFormat)
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for OtpCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("OtpCode(***)")
    }
}

/// Verification challenge state tracked client-side.
///
/// `serial` identifies the issuance; it changes on every resend so responses
/// belonging to a superseded challenge can be recognized and dropped.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OtpChallenge {
    email: String,
    window: u32,
    remaining: u32,
    resend_allowed: bool,
    serial: u64,
}

impl OtpChallenge {
    #[must_use]
    pub fn issue(email: &str, window: u32) -> Self {
        Self {
            email: email.to_string(),
            window,
            remaining: window,
            resend_allowed: window == 0,
            serial: 1,
        }
    }

    /// Fresh challenge for the same email after a successful resend.
    #[must_use]
    pub fn reissue(&self) -> Self {
        Self {
            serial: self.serial + 1,
            ..Self::issue(&self.email, self.window)
        }
    }

    /// Counts one second down. Returns `true` only on the tick that reaches zero;
    /// further ticks leave the countdown at zero.
    pub fn tick(&mut self) -> bool {
        if self.remaining == 0 {
            return false;
        }
        self.remaining -= 1;
        if self.remaining == 0 {
            self.resend_allowed = true;
            return true;
        }
        false
    }

    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    #[must_use]
    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    #[must_use]
    pub fn window(&self) -> u32 {
        self.window
    }

    #[must_use]
    pub fn resend_allowed(&self) -> bool {
        self.resend_allowed
    }

    #[must_use]
    pub fn serial(&self) -> u64 {
        self.serial
    }

    /// Remaining time as `m:ss`.
    #[must_use]
    pub fn format_remaining(&self) -> String {
        format!("{}:{:02}", self.remaining / 60, self.remaining % 60)
    }
}
