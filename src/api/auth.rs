//! Client wrappers for the authentication endpoints. The trait is the seam the
//! signup flow depends on, so tests can substitute a fake service and assert
//! which calls were (or were not) made.

use super::{
    ApiClient, ApiError,
    types::{MessageBody, RequestOtpRequest, VerifyOtpRequest, VerifyOtpResponse},
};
use crate::signup::OtpCode;
use std::future::Future;
use tracing::{debug, instrument};

pub const REQUEST_OTP_PATH: &str = "/api/auth/request-otp";
pub const VERIFY_OTP_PATH: &str = "/api/auth/verify-otp";

/// Authentication service consumed by the signup flow.
pub trait AuthService: Send + Sync {
    /// Asks the service to issue (or re-issue) a one-time code for `email`.
    fn request_otp(&self, email: &str)
    -> impl Future<Output = Result<MessageBody, ApiError>> + Send;

    /// Confirms `otp` for `email`; a successful response should carry a token.
    fn verify_otp(
        &self,
        email: &str,
        otp: &OtpCode,
    ) -> impl Future<Output = Result<VerifyOtpResponse, ApiError>> + Send;
}

#[derive(Clone, Debug)]
pub struct HttpAuthService {
    api: ApiClient,
}

impl HttpAuthService {
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

impl AuthService for HttpAuthService {
    /// Must not log the email address.
    #[instrument(skip_all)]
    async fn request_otp(&self, email: &str) -> Result<MessageBody, ApiError> {
        let request = RequestOtpRequest {
            email: email.to_string(),
        };
        let response: MessageBody = self.api.post_json(REQUEST_OTP_PATH, &request, None).await?;
        debug!("otp requested");
        Ok(response)
    }

    /// Must never log the code or the returned token.
    #[instrument(skip_all)]
    async fn verify_otp(&self, email: &str, otp: &OtpCode) -> Result<VerifyOtpResponse, ApiError> {
        let request = VerifyOtpRequest {
            email: email.to_string(),
            otp: otp.as_str().to_string(),
        };
        let response: VerifyOtpResponse =
            self.api.post_json(VERIFY_OTP_PATH, &request, None).await?;
        debug!(has_token = response.token.is_some(), "otp verified");
        Ok(response)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::api::DEFAULT_TIMEOUT;
    use serde_json::json;
    use std::net::TcpListener;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn can_bind_localhost() -> bool {
        TcpListener::bind("127.0.0.1:0").is_ok()
    }

    #[tokio::test]
    async fn verify_otp_posts_email_and_code() {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return;
        }
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(VERIFY_OTP_PATH))
            .and(body_json(json!({"email": "ana@example.com", "otp": "123456"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token": "abc"})))
            .expect(1)
            .mount(&server)
            .await;

        let service = HttpAuthService::new(ApiClient::new(&server.uri(), DEFAULT_TIMEOUT).unwrap());
        let code = OtpCode::parse("123456").unwrap();
        let response = service.verify_otp("ana@example.com", &code).await.unwrap();
        assert_eq!(response.token.as_deref(), Some("abc"));
    }

    #[tokio::test]
    async fn request_otp_surfaces_rejection_message() {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return;
        }
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(REQUEST_OTP_PATH))
            .respond_with(
                ResponseTemplate::new(429).set_body_json(json!({"message": "Too many requests"})),
            )
            .mount(&server)
            .await;

        let service = HttpAuthService::new(ApiClient::new(&server.uri(), DEFAULT_TIMEOUT).unwrap());
        let err = service.request_otp("ana@example.com").await.unwrap_err();
        assert_eq!(err.service_message(), Some("Too many requests"));
    }
}
