//! Authenticated loan actions: the application form and the statistics view.

use super::{LoanApplication, LoanStatistics, ValidationErrors};
use crate::{
    api::{ApiError, LoanService},
    navigator::{Navigator, Screen},
    session::{Session, SessionStore, StoreError},
};
use chrono::NaiveDate;
use std::{sync::Arc, time::Duration};
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

/// Delay before showing the loan status after a successful submission.
pub const SUBMITTED_NAVIGATION_DELAY: Duration = Duration::from_secs(2);

const SUBMITTED_NOTICE: &str = "Loan application submitted successfully!";
const SUBMIT_FALLBACK: &str = "Failed to submit loan application";
const STATISTICS_FALLBACK: &str = "Failed to load statistics";

#[derive(Debug, Error)]
pub enum LoanError {
    #[error("{0}")]
    Invalid(ValidationErrors),
    #[error("Please login to submit loan application")]
    NotAuthenticated,
    /// Non-success response; the service message or a fallback.
    #[error("{0}")]
    Rejected(String),
    #[error("An error occurred while submitting the application")]
    Transport { detail: String },
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl LoanError {
    fn from_api(err: ApiError, fallback: &str) -> Self {
        match err {
            ApiError::Http { message, .. } => {
                Self::Rejected(message.unwrap_or_else(|| fallback.to_string()))
            }
            other => Self::Transport {
                detail: other.to_string(),
            },
        }
    }
}

/// Application form bound to the stored session.
pub struct LoanForm<L, S, N> {
    service: L,
    store: S,
    navigator: Arc<N>,
    application: LoanApplication,
    errors: ValidationErrors,
    message: Option<String>,
    navigation: Option<JoinHandle<()>>,
}

impl<L, S, N> LoanForm<L, S, N>
where
    L: LoanService,
    S: SessionStore,
    N: Navigator,
{
    #[must_use]
    pub fn new(service: L, store: S, navigator: N) -> Self {
        Self {
            service,
            store,
            navigator: Arc::new(navigator),
            application: LoanApplication::default(),
            errors: ValidationErrors::default(),
            message: None,
            navigation: None,
        }
    }

    #[must_use]
    pub fn application(&self) -> &LoanApplication {
        &self.application
    }

    pub fn application_mut(&mut self) -> &mut LoanApplication {
        &mut self.application
    }

    #[must_use]
    pub fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Validates and submits the form as of `today`.
    ///
    /// # Errors
    /// Returns the failure shown to the user; field errors stay available via
    /// [`LoanForm::errors`].
    #[instrument(skip_all)]
    pub async fn submit(&mut self, today: NaiveDate) -> Result<(), LoanError> {
        self.message = None;
        if let Err(errors) = self.application.validate(today) {
            self.errors = errors.clone();
            return Err(LoanError::Invalid(errors));
        }
        self.errors = ValidationErrors::default();

        let result = self.send().await;
        match &result {
            Ok(()) => {
                info!("loan application submitted");
                self.application = LoanApplication::default();
                self.message = Some(SUBMITTED_NOTICE.to_string());
                self.schedule_navigation(Screen::LoanStatus, SUBMITTED_NAVIGATION_DELAY);
            }
            Err(err) => {
                warn!("loan application failed: {err}");
                self.message = Some(err.to_string());
            }
        }
        result
    }

    /// Waits for the scheduled navigation, if any.
    pub async fn wait_for_navigation(&mut self) {
        if let Some(navigation) = self.navigation.take() {
            if let Err(err) = navigation.await {
                debug!("navigation task ended early: {err}");
            }
        }
    }

    async fn send(&self) -> Result<(), LoanError> {
        let session = Session::load(&self.store)?.ok_or(LoanError::NotAuthenticated)?;
        match self.service.apply(session.token(), &self.application).await {
            Ok(_) => Ok(()),
            Err(err) => Err(self.rejected(err, SUBMIT_FALLBACK)?),
        }
    }

    fn rejected(&self, err: ApiError, fallback: &str) -> Result<LoanError, LoanError> {
        let err = end_session_on_unauthorized(err, &self.store, self.navigator.as_ref())?;
        Ok(LoanError::from_api(err, fallback))
    }

    fn schedule_navigation(&mut self, screen: Screen, after: Duration) {
        if let Some(previous) = self.navigation.take() {
            previous.abort();
        }
        let navigator = Arc::clone(&self.navigator);
        self.navigation = Some(tokio::spawn(async move {
            tokio::time::sleep(after).await;
            navigator.navigate(screen);
        }));
    }
}

/// A 401 ends the stored session and sends the user to the login screen.
fn end_session_on_unauthorized<S, N>(
    err: ApiError,
    store: &S,
    navigator: &N,
) -> Result<ApiError, LoanError>
where
    S: SessionStore,
    N: Navigator,
{
    if err.is_unauthorized() {
        Session::clear(store)?;
        navigator.navigate(Screen::Login);
    }
    Ok(err)
}

/// Fetches the statistics with the stored session token.
///
/// # Errors
/// Returns `NotAuthenticated` without a session, otherwise the mapped service
/// failure. A 401 clears the stored session and navigates to the login screen.
#[instrument(skip_all)]
pub async fn load_statistics<L, S, N>(
    service: &L,
    store: &S,
    navigator: &N,
) -> Result<LoanStatistics, LoanError>
where
    L: LoanService,
    S: SessionStore,
    N: Navigator,
{
    let session = Session::load(store)?.ok_or(LoanError::NotAuthenticated)?;
    match service.statistics(session.token()).await {
        Ok(stats) => Ok(stats),
        Err(err) => {
            warn!("statistics request failed: {err}");
            let err = end_session_on_unauthorized(err, store, navigator)?;
            Err(match LoanError::from_api(err, STATISTICS_FALLBACK) {
                LoanError::Transport { .. } => LoanError::Rejected(STATISTICS_FALLBACK.to_string()),
                other => other,
            })
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::{
        api::types::MessageBody,
        loan::Education,
        navigator::RecordingNavigator,
        session::MemoryStore,
    };
    use secrecy::{ExposeSecret, SecretString};
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeLoans {
        tokens: Mutex<Vec<String>>,
        failure: Option<ApiError>,
    }

    impl LoanService for Arc<FakeLoans> {
        async fn apply(
            &self,
            token: &SecretString,
            _application: &LoanApplication,
        ) -> Result<MessageBody, ApiError> {
            self.tokens
                .lock()
                .unwrap()
                .push(token.expose_secret().to_string());
            self.failure.clone().map_or(Ok(MessageBody::default()), Err)
        }

        async fn statistics(&self, token: &SecretString) -> Result<LoanStatistics, ApiError> {
            self.tokens
                .lock()
                .unwrap()
                .push(token.expose_secret().to_string());
            self.failure.clone().map_or(Ok(LoanStatistics::sample()), Err)
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    fn signed_in() -> MemoryStore {
        let store = MemoryStore::new();
        Session::new(SecretString::from("abc".to_string()))
            .save(&store)
            .unwrap();
        store
    }

    fn fill(form: &mut LoanForm<Arc<FakeLoans>, MemoryStore, RecordingNavigator>) {
        *form.application_mut() = LoanApplication {
            no_of_dependents: 1,
            education: Some(Education::Professional),
            self_employed: true,
            income_annum: 1_200_000,
            loan_amount: 500_000,
            loan_term: 36,
            cibil_score: 780,
            date_of_birth: NaiveDate::from_ymd_opt(1988, 1, 30),
        };
    }

    #[tokio::test(start_paused = true)]
    async fn invalid_form_is_not_sent() {
        let loans = Arc::new(FakeLoans::default());
        let mut form = LoanForm::new(Arc::clone(&loans), signed_in(), RecordingNavigator::new());

        let err = form.submit(today()).await.unwrap_err();
        assert!(matches!(err, LoanError::Invalid(_)));
        assert_eq!(form.errors().get("education"), Some("Education is required"));
        assert!(loans.tokens.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn submission_requires_a_session() {
        let loans = Arc::new(FakeLoans::default());
        let mut form = LoanForm::new(
            Arc::clone(&loans),
            MemoryStore::new(),
            RecordingNavigator::new(),
        );
        fill(&mut form);

        let err = form.submit(today()).await.unwrap_err();
        assert!(matches!(err, LoanError::NotAuthenticated));
        assert_eq!(
            form.message(),
            Some("Please login to submit loan application")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn success_resets_form_and_navigates() {
        let loans = Arc::new(FakeLoans::default());
        let navigator = RecordingNavigator::new();
        let mut form = LoanForm::new(Arc::clone(&loans), signed_in(), navigator.clone());
        fill(&mut form);

        form.submit(today()).await.unwrap();
        assert_eq!(loans.tokens.lock().unwrap().as_slice(), ["abc"]);
        assert_eq!(form.application(), &LoanApplication::default());
        assert_eq!(
            form.message(),
            Some("Loan application submitted successfully!")
        );
        form.wait_for_navigation().await;
        assert_eq!(navigator.visited(), vec![Screen::LoanStatus]);
    }

    #[tokio::test(start_paused = true)]
    async fn unauthorized_clears_session() {
        let loans = Arc::new(FakeLoans {
            failure: Some(ApiError::Http {
                status: 401,
                message: None,
            }),
            ..FakeLoans::default()
        });
        let store = signed_in();
        let navigator = RecordingNavigator::new();
        let mut form = LoanForm::new(Arc::clone(&loans), store.clone(), navigator.clone());
        fill(&mut form);

        let err = form.submit(today()).await.unwrap_err();
        assert_eq!(err.to_string(), "Failed to submit loan application");
        assert!(Session::load(&store).unwrap().is_none());
        assert_eq!(navigator.visited(), vec![Screen::Login]);
        assert_eq!(form.application().loan_term, 36);
    }

    #[tokio::test]
    async fn statistics_use_stored_token() {
        let loans = Arc::new(FakeLoans::default());
        let navigator = RecordingNavigator::new();
        let stats = load_statistics(&loans, &signed_in(), &navigator)
            .await
            .unwrap();
        assert_eq!(stats, LoanStatistics::sample());

        let err = load_statistics(&loans, &MemoryStore::new(), &navigator)
            .await
            .unwrap_err();
        assert!(matches!(err, LoanError::NotAuthenticated));
        assert!(navigator.visited().is_empty());
    }

    #[tokio::test]
    async fn statistics_failure_uses_fallback() {
        let loans = Arc::new(FakeLoans {
            failure: Some(ApiError::Network("refused".to_string())),
            ..FakeLoans::default()
        });
        let err = load_statistics(&loans, &signed_in(), &RecordingNavigator::new())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Failed to load statistics");
    }

    #[tokio::test]
    async fn unauthorized_statistics_end_the_session() {
        let loans = Arc::new(FakeLoans {
            failure: Some(ApiError::Http {
                status: 401,
                message: None,
            }),
            ..FakeLoans::default()
        });
        let store = signed_in();
        let navigator = RecordingNavigator::new();

        let err = load_statistics(&loans, &store, &navigator)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Failed to load statistics");
        assert!(Session::load(&store).unwrap().is_none());
        assert_eq!(navigator.visited(), vec![Screen::Login]);
    }

    #[tokio::test(start_paused = true)]
    async fn aborted_navigation_is_tolerated() {
        let loans = Arc::new(FakeLoans::default());
        let navigator = RecordingNavigator::new();
        let mut form = LoanForm::new(Arc::clone(&loans), signed_in(), navigator.clone());
        fill(&mut form);
        form.submit(today()).await.unwrap();

        if let Some(navigation) = form.navigation.as_ref() {
            navigation.abort();
        }
        form.wait_for_navigation().await;
        assert!(navigator.visited().is_empty());
        assert!(form.navigation.is_none());
    }
}
