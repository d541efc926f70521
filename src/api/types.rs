//! Request and response types for the lending API. Verification payloads carry
//! OTP codes and bearer tokens, so their `Debug` output is redacted.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Generic `{ message? }` body used by success and error responses.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct MessageBody {
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RequestOtpRequest {
    pub email: String,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct VerifyOtpRequest {
    pub email: String,
    pub otp: String,
}

impl fmt::Debug for VerifyOtpRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VerifyOtpRequest")
            .field("email", &self.email)
            .field("otp", &"***")
            .finish()
    }
}

#[derive(Clone, Default, Serialize, Deserialize)]
pub struct VerifyOtpResponse {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl fmt::Debug for VerifyOtpResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VerifyOtpResponse")
            .field("token", &self.token.as_ref().map(|_| "***"))
            .field("message", &self.message)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_types_redact_secrets() {
        let request = VerifyOtpRequest {
            email: "ana@example.com".to_string(),
            otp: "123456".to_string(),
        };
        let response = VerifyOtpResponse {
            token: Some("abc".to_string()),
            message: None,
        };
        assert!(!format!("{request:?}").contains("123456"));
        assert!(!format!("{response:?}").contains("abc"));
    }

    #[test]
    fn verify_response_fields_are_optional() -> serde_json::Result<()> {
        let response: VerifyOtpResponse = serde_json::from_str(r#"{"message":"ok"}"#)?;
        assert!(response.token.is_none());
        assert_eq!(response.message.as_deref(), Some("ok"));
        Ok(())
    }
}
