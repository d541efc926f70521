//! Authenticated loan endpoints. Every call carries the stored session token as
//! a bearer credential.

use super::{ApiClient, ApiError, types::MessageBody};
use crate::loan::{LoanApplication, LoanStatistics};
use secrecy::SecretString;
use std::future::Future;
use tracing::instrument;

pub const APPLY_PATH: &str = "/api/loans/apply";
pub const STATISTICS_PATH: &str = "/api/loans/statistics";

pub trait LoanService: Send + Sync {
    fn apply(
        &self,
        token: &SecretString,
        application: &LoanApplication,
    ) -> impl Future<Output = Result<MessageBody, ApiError>> + Send;

    fn statistics(
        &self,
        token: &SecretString,
    ) -> impl Future<Output = Result<LoanStatistics, ApiError>> + Send;
}

#[derive(Clone, Debug)]
pub struct HttpLoanService {
    api: ApiClient,
}

impl HttpLoanService {
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

impl LoanService for HttpLoanService {
    #[instrument(skip_all)]
    async fn apply(
        &self,
        token: &SecretString,
        application: &LoanApplication,
    ) -> Result<MessageBody, ApiError> {
        self.api.post_json(APPLY_PATH, application, Some(token)).await
    }

    #[instrument(skip_all)]
    async fn statistics(&self, token: &SecretString) -> Result<LoanStatistics, ApiError> {
        self.api.get_json(STATISTICS_PATH, Some(token)).await
    }
}
