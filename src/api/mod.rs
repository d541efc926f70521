//! HTTP helpers for the lending API with consistent timeouts and error handling.
//! Service clients use these helpers to avoid duplicating request setup and to
//! enforce a predictable timeout policy. The helpers never log request bodies or
//! bearer tokens; they only attach credentials provided by callers.

pub mod auth;
pub mod errors;
pub mod loans;
pub mod types;

pub use auth::{AuthService, HttpAuthService};
pub use errors::ApiError;
pub use loans::{HttpLoanService, LoanService};

use crate::APP_USER_AGENT;
use reqwest::{Method, RequestBuilder, Response};
use secrecy::{ExposeSecret, SecretString};
use serde::{Serialize, de::DeserializeOwned};
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Default request timeout applied to all API calls.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
/// Maximum number of error body characters surfaced to the user.
const MAX_ERROR_CHARS: usize = 200;

#[derive(Clone, Debug)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// Build a client for the given API base URL.
    /// # Errors
    /// Returns `ApiError::Config` if the base URL is empty or invalid, or the HTTP
    /// client cannot be constructed.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let base_url = base_url.trim();
        if base_url.is_empty() {
            return Err(ApiError::Config(
                "API base URL is not configured.".to_string(),
            ));
        }
        Url::parse(base_url)
            .map_err(|err| ApiError::Config(format!("Invalid API base URL: {err}")))?;

        let client = reqwest::Client::builder()
            .user_agent(APP_USER_AGENT)
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(timeout)
            .build()
            .map_err(|err| ApiError::Config(format!("Failed to build HTTP client: {err}")))?;

        Ok(Self {
            client,
            base_url: base_url.to_string(),
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[must_use]
    pub fn endpoint_url(&self, path: &str) -> String {
        build_url_with_base(&self.base_url, path)
    }

    /// Posts JSON and parses an optional JSON body; an empty 2xx body yields
    /// `T::default()`.
    /// # Errors
    /// Returns an `ApiError` for transport failures, non-2xx statuses or bodies
    /// that cannot be decoded.
    pub async fn post_json<B, T>(
        &self,
        path: &str,
        body: &B,
        bearer: Option<&SecretString>,
    ) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned + Default,
    {
        let payload = serde_json::to_vec(body)
            .map_err(|err| ApiError::Serialization(format!("Failed to encode request: {err}")))?;
        let request = self
            .request(Method::POST, path, bearer)
            .header("Content-Type", "application/json")
            .body(payload);

        let response = send(request).await?;
        handle_optional_json_response(response).await
    }

    /// Fetches JSON, requiring a decodable body on success.
    /// # Errors
    /// Returns an `ApiError` for transport failures, non-2xx statuses or bodies
    /// that cannot be decoded.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        bearer: Option<&SecretString>,
    ) -> Result<T, ApiError> {
        let request = self.request(Method::GET, path, bearer);
        let response = send(request).await?;
        handle_json_response(response).await
    }

    fn request(&self, method: Method, path: &str, bearer: Option<&SecretString>) -> RequestBuilder {
        let url = self.endpoint_url(path);
        debug!("api request: {} {}", method, url);

        let mut builder = self
            .client
            .request(method, &url)
            .header("Accept", "application/json");
        if let Some(token) = bearer {
            builder = builder.bearer_auth(token.expose_secret());
        }
        builder
    }
}

/// Builds a URL from an explicit base URL and the provided path.
fn build_url_with_base(base_url: &str, path: &str) -> String {
    let base = base_url.trim().trim_end_matches('/');
    let path = path.trim();

    if base.is_empty() {
        path.to_string()
    } else {
        format!("{}/{}", base, path.trim_start_matches('/'))
    }
}

/// Maps reqwest failures into `ApiError` variants with timeout detection.
fn map_request_error(err: &reqwest::Error) -> ApiError {
    if err.is_timeout() {
        ApiError::Timeout("Request timed out. Please try again.".to_string())
    } else {
        ApiError::Network(format!("Unable to reach the server: {err}"))
    }
}

async fn send(request: RequestBuilder) -> Result<Response, ApiError> {
    request.send().await.map_err(|err| map_request_error(&err))
}

async fn read_body(response: Response) -> Result<(u16, bool, String), ApiError> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|err| map_request_error(&err))?;
    Ok((status.as_u16(), status.is_success(), body))
}

/// Parses JSON responses and surfaces HTTP errors with sanitized bodies.
async fn handle_json_response<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let (status, ok, body) = read_body(response).await?;
    if ok {
        serde_json::from_str(&body)
            .map_err(|err| ApiError::Parse(format!("Failed to decode response: {err}")))
    } else {
        Err(ApiError::Http {
            status,
            message: error_message(&body),
        })
    }
}

/// Parses responses whose success body is optional JSON.
async fn handle_optional_json_response<T: DeserializeOwned + Default>(
    response: Response,
) -> Result<T, ApiError> {
    let (status, ok, body) = read_body(response).await?;
    if !ok {
        return Err(ApiError::Http {
            status,
            message: error_message(&body),
        });
    }
    if body.trim().is_empty() {
        return Ok(T::default());
    }
    serde_json::from_str(&body)
        .map_err(|err| ApiError::Parse(format!("Failed to decode response: {err}")))
}

/// Extracts the service-supplied message from an error body.
///
/// JSON bodies contribute their `message` field only; plain-text bodies are
/// trimmed and truncated. Empty bodies, markup (proxy error pages) and JSON
/// without a message yield `None` so callers can apply their own fallback.
fn error_message(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }
    match serde_json::from_str::<types::MessageBody>(trimmed) {
        Ok(parsed) => parsed.message.filter(|message| !message.trim().is_empty()),
        Err(_) if trimmed.starts_with(['{', '[', '<']) => None,
        Err(_) => Some(trimmed.chars().take(MAX_ERROR_CHARS).collect()),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::signup::FlowError;
    use serde::Deserialize;
    use serde_json::json;
    use std::net::TcpListener;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn can_bind_localhost() -> bool {
        TcpListener::bind("127.0.0.1:0").is_ok()
    }

    #[derive(Debug, Default, Deserialize, PartialEq)]
    struct Echo {
        value: Option<String>,
    }

    #[test]
    fn build_url_joins_base_and_path() {
        assert_eq!(
            build_url_with_base("http://localhost:1000/", "/api/auth/request-otp"),
            "http://localhost:1000/api/auth/request-otp"
        );
        assert_eq!(
            build_url_with_base(" http://localhost:1000 ", "api/loans/apply"),
            "http://localhost:1000/api/loans/apply"
        );
        assert_eq!(build_url_with_base("", "/api"), "/api");
    }

    #[test]
    fn new_rejects_empty_or_invalid_base_url() {
        assert!(matches!(
            ApiClient::new("  ", DEFAULT_TIMEOUT),
            Err(ApiError::Config(_))
        ));
        assert!(matches!(
            ApiClient::new("not a url", DEFAULT_TIMEOUT),
            Err(ApiError::Config(_))
        ));
    }

    #[test]
    fn error_message_prefers_json_message() {
        assert_eq!(
            error_message(r#"{"message":"Invalid code"}"#),
            Some("Invalid code".to_string())
        );
        assert_eq!(error_message(r#"{"error":"nope"}"#), None);
        assert_eq!(error_message(r#"{"message":"  "}"#), None);
        assert_eq!(error_message(""), None);
        assert_eq!(
            error_message("  upstream unavailable \n"),
            Some("upstream unavailable".to_string())
        );
    }

    #[test]
    fn error_message_skips_html_pages() {
        let page = "<html>\r\n<head><title>502 Bad Gateway</title></head>\r\n\
                    <body><center><h1>502 Bad Gateway</h1></center></body></html>";
        assert_eq!(error_message(page), None);
        assert_eq!(error_message("  <!DOCTYPE html><p>oops</p>"), None);
        assert_eq!(
            FlowError::from_api(
                ApiError::Http {
                    status: 502,
                    message: error_message(page),
                },
                "Failed to send OTP",
            )
            .to_string(),
            "Failed to send OTP"
        );
    }

    #[test]
    fn error_message_truncates_plain_text() {
        let body = "x".repeat(500);
        assert_eq!(error_message(&body).unwrap().len(), MAX_ERROR_CHARS);
    }

    #[tokio::test]
    async fn post_json_sends_bearer_and_accepts_empty_body() {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return;
        }
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/echo"))
            .and(header("Authorization", "Bearer abc"))
            .and(body_json(json!({"value": "hi"})))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let client = ApiClient::new(&server.uri(), DEFAULT_TIMEOUT).unwrap();
        let token = SecretString::from("abc".to_string());
        let echo: Echo = client
            .post_json("/api/echo", &json!({"value": "hi"}), Some(&token))
            .await
            .unwrap();
        assert_eq!(echo, Echo::default());
    }

    #[tokio::test]
    async fn get_json_maps_error_status() {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return;
        }
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/echo"))
            .respond_with(ResponseTemplate::new(503).set_body_json(json!({"message": "down"})))
            .mount(&server)
            .await;

        let client = ApiClient::new(&server.uri(), DEFAULT_TIMEOUT).unwrap();
        let err = client.get_json::<Echo>("/api/echo", None).await.unwrap_err();
        assert_eq!(
            err,
            ApiError::Http {
                status: 503,
                message: Some("down".to_string())
            }
        );
    }

    #[tokio::test]
    async fn get_json_rejects_undecodable_body() {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return;
        }
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/echo"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let client = ApiClient::new(&server.uri(), DEFAULT_TIMEOUT).unwrap();
        let err = client.get_json::<Echo>("/api/echo", None).await.unwrap_err();
        assert!(matches!(err, ApiError::Parse(_)));
    }

    #[tokio::test]
    async fn unreachable_server_is_network_error() {
        // Port 9 (discard) on localhost is expected to refuse connections.
        let client = ApiClient::new("http://127.0.0.1:9", DEFAULT_TIMEOUT).unwrap();
        let err = client.get_json::<Echo>("/api/echo", None).await.unwrap_err();
        assert!(err.is_transport());
    }
}
