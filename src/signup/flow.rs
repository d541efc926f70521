//! Controller driving the signup state machine.
//!
//! `SignupFlow` owns the current state, the countdown timer and the injected
//! collaborators. Every public operation turns into one machine event; the
//! resulting effects are executed in order and network completions are fed
//! back as follow-up events until the queue drains.

use super::{
    error::FlowError,
    machine::{
        Effect, Event, FlowState, OtpPurpose, Phase, RESEND_FALLBACK, SEND_FALLBACK, Transition,
        VERIFY_FALLBACK, transition,
    },
    timer::{CountdownTimer, TICK_PERIOD},
    types::{DEFAULT_OTP_WINDOW_SECONDS, OtpChallenge, OtpCode, PendingSignup},
};
use crate::{
    api::AuthService,
    navigator::{Navigator, Screen},
    session::SessionStore,
};
use secrecy::SecretString;
use std::{collections::VecDeque, mem, sync::Arc, time::Duration};
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

pub struct SignupFlow<A, S, N> {
    auth: A,
    store: S,
    navigator: Arc<N>,
    state: FlowState,
    window: u32,
    timer: Option<CountdownTimer>,
    navigation: Option<JoinHandle<()>>,
    message: Option<String>,
}

impl<A, S, N> SignupFlow<A, S, N>
where
    A: AuthService,
    S: SessionStore,
    N: Navigator,
{
    #[must_use]
    pub fn new(auth: A, store: S, navigator: N) -> Self {
        Self {
            auth,
            store,
            navigator: Arc::new(navigator),
            state: FlowState::CollectingDetails,
            window: DEFAULT_OTP_WINDOW_SECONDS,
            timer: None,
            navigation: None,
            message: None,
        }
    }

    /// Overrides the resend window applied to issued challenges.
    #[must_use]
    pub fn with_otp_window(mut self, seconds: u32) -> Self {
        self.window = seconds;
        self
    }

    /// Reopens verification for a signup read back from the store.
    /// No new code is requested; the countdown starts from a full window.
    ///
    /// # Errors
    /// Returns an error if the store cannot be read.
    pub fn resume(auth: A, store: S, navigator: N, window: u32) -> Result<Option<Self>, FlowError> {
        let Some(signup) = PendingSignup::load(&store)? else {
            return Ok(None);
        };
        let mut flow = Self::new(auth, store, navigator).with_otp_window(window);
        flow.restore(signup)?;
        Ok(Some(flow))
    }

    /// Reopens verification for `signup` without contacting the service.
    ///
    /// # Errors
    /// Returns an error if a local effect fails.
    pub fn restore(&mut self, signup: PendingSignup) -> Result<(), FlowError> {
        let event = Event::Restore {
            signup,
            window: self.window,
        };
        let effects = self.commit(event)?;
        self.apply_local_effects(effects)
    }

    /// Validates `details` and requests a code for them.
    ///
    /// # Errors
    /// Returns the error surfaced to the user, if any.
    #[instrument(skip_all)]
    pub async fn submit_signup_details(&mut self, details: PendingSignup) -> Result<(), FlowError> {
        self.dispatch(Event::SubmitDetails(details)).await
    }

    /// One countdown second. Purely local.
    pub fn tick(&mut self) {
        if let Err(err) = self
            .commit(Event::Tick)
            .and_then(|effects| self.apply_local_effects(effects))
        {
            warn!("tick effect failed: {err}");
        }
    }

    /// Waits for the next countdown tick and applies it, returning the seconds
    /// left. Pends forever while no countdown is running, so it can sit in a
    /// `select!` next to user input.
    pub async fn advance_timer(&mut self) -> Option<u32> {
        let ticked = match self.timer.as_mut() {
            Some(timer) => timer.tick().await,
            None => std::future::pending().await,
        };
        if ticked.is_none() {
            self.timer = None;
            return None;
        }
        self.tick();
        self.challenge().map(OtpChallenge::remaining)
    }

    /// Requests a new code once the countdown has expired.
    /// Returns `Ok(false)` when the request was ignored.
    ///
    /// # Errors
    /// Returns the error surfaced to the user, if any.
    #[instrument(skip_all)]
    pub async fn resend_otp(&mut self) -> Result<bool, FlowError> {
        let allowed = self
            .challenge()
            .is_some_and(OtpChallenge::resend_allowed);
        self.dispatch(Event::Resend).await?;
        Ok(allowed)
    }

    /// # Errors
    /// Returns the error surfaced to the user, if any.
    #[instrument(skip_all)]
    pub async fn submit_otp(&mut self, code: &str) -> Result<(), FlowError> {
        self.dispatch(Event::SubmitOtp(code.to_string())).await
    }

    /// Leaves the flow: stops the countdown and any scheduled navigation.
    /// Responses arriving afterwards are ignored.
    pub fn abandon(&mut self) {
        if let Some(navigation) = self.navigation.take() {
            navigation.abort();
        }
        if let Err(err) = self
            .commit(Event::Abandon)
            .and_then(|effects| self.apply_local_effects(effects))
        {
            warn!("abandon effect failed: {err}");
        }
        info!("signup flow abandoned");
    }

    /// Waits for the scheduled navigation, if any, to fire.
    pub async fn wait_for_navigation(&mut self) {
        if let Some(navigation) = self.navigation.take() {
            if let Err(err) = navigation.await {
                debug!("navigation task ended early: {err}");
            }
        }
    }

    #[must_use]
    pub fn state(&self) -> &FlowState {
        &self.state
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.state.phase()
    }

    #[must_use]
    pub fn challenge(&self) -> Option<&OtpChallenge> {
        self.state.challenge()
    }

    /// Last message shown to the user: a notice or an error.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    #[must_use]
    pub fn is_timer_running(&self) -> bool {
        self.timer.as_ref().is_some_and(CountdownTimer::is_running)
    }

    fn take_state(&mut self) -> FlowState {
        mem::replace(&mut self.state, FlowState::Abandoned)
    }

    /// Runs `event` through the machine and applies its store writes before
    /// committing the new state. When a write fails the state it was reached
    /// from is kept, annotated with the error, so the operation can be
    /// retried. Returns the effects still to run.
    fn commit(&mut self, event: Event) -> Result<Vec<Effect>, FlowError> {
        let previous = self.state.resumed().clone();
        let Transition { state, effects } = transition(self.take_state(), event);
        let (writes, rest): (Vec<_>, Vec<_>) =
            effects.into_iter().partition(Effect::is_store_write);

        if let Err(err) = self.apply_local_effects(writes) {
            warn!(state = %state, "session store write failed: {err}");
            self.state = FlowState::failed(previous, err.clone());
            self.message = Some(err.to_string());
            return Err(err);
        }

        debug!(state = %state, "transition");
        self.state = state;
        Ok(rest)
    }

    async fn dispatch(&mut self, event: Event) -> Result<(), FlowError> {
        let mut queue = VecDeque::from([event]);
        let mut reported = None;

        while let Some(event) = queue.pop_front() {
            for effect in self.commit(event)? {
                match effect {
                    Effect::RequestOtp { email, purpose } => {
                        queue.push_back(self.request_otp(&email, purpose).await);
                    }
                    Effect::VerifyOtp {
                        email,
                        code,
                        serial,
                    } => {
                        queue.push_back(self.verify_otp(&email, &code, serial).await);
                    }
                    Effect::Report(error) => {
                        self.message = Some(error.to_string());
                        reported = Some(error);
                    }
                    local => {
                        if let Err(err) = self.apply_local(local) {
                            self.message = Some(err.to_string());
                            return Err(err);
                        }
                    }
                }
            }
        }

        reported.map_or(Ok(()), Err)
    }

    async fn request_otp(&self, email: &str, purpose: OtpPurpose) -> Event {
        let result = self.auth.request_otp(email).await;
        match (purpose, result) {
            (OtpPurpose::Signup(signup), Ok(_)) => Event::OtpIssued {
                signup,
                window: self.window,
            },
            (OtpPurpose::Signup(_), Err(err)) => {
                warn!("request-otp failed: {err}");
                Event::OtpRequestFailed(FlowError::from_api(err, SEND_FALLBACK))
            }
            (OtpPurpose::Resend { serial }, Ok(_)) => Event::ResendSucceeded { serial },
            (OtpPurpose::Resend { serial }, Err(err)) => {
                warn!("resend failed: {err}");
                Event::ResendFailed {
                    serial,
                    error: FlowError::from_api(err, RESEND_FALLBACK),
                }
            }
        }
    }

    async fn verify_otp(&self, email: &str, code: &OtpCode, serial: u64) -> Event {
        match self.auth.verify_otp(email, code).await {
            Ok(response) => Event::VerifySucceeded {
                serial,
                token: response
                    .token
                    .filter(|token| !token.trim().is_empty())
                    .map(SecretString::from),
            },
            Err(err) => {
                warn!("verify-otp failed: {err}");
                Event::VerifyFailed {
                    serial,
                    error: FlowError::from_api(err, VERIFY_FALLBACK),
                }
            }
        }
    }

    fn apply_local_effects(&mut self, effects: Vec<Effect>) -> Result<(), FlowError> {
        effects
            .into_iter()
            .try_for_each(|effect| self.apply_local(effect))
    }

    fn apply_local(&mut self, effect: Effect) -> Result<(), FlowError> {
        match effect {
            Effect::PersistPending(signup) => signup.save(&self.store)?,
            Effect::StartTimer => {
                self.timer = Some(CountdownTimer::start(TICK_PERIOD));
            }
            Effect::StopTimer => {
                if let Some(mut timer) = self.timer.take() {
                    timer.stop();
                }
            }
            Effect::StoreToken(session) => session.save(&self.store)?,
            Effect::RemovePending => PendingSignup::discard(&self.store)?,
            Effect::Navigate { screen, after } => self.schedule_navigation(screen, after),
            Effect::Notify(notice) => {
                info!("{notice}");
                self.message = Some(notice);
            }
            Effect::Report(error) => self.message = Some(error.to_string()),
            Effect::RequestOtp { .. } | Effect::VerifyOtp { .. } => {
                warn!("network effect outside dispatch dropped: {effect:?}");
            }
        }
        Ok(())
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
