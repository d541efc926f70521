//! Pure state machine for the signup flow.
//!
//! `transition` maps `(state, event)` to the next state plus the effects the
//! controller must perform. It never touches the network, the clock or the
//! session store, so every path is testable without a runtime.
//!
//! `Failed` annotates the state to resume with the error of the last operation.
//! User actions resume from the wrapped state (clearing the annotation); timer
//! ticks update the wrapped state and keep it. Completion events carry the
//! serial of the challenge they were started for and are dropped when that
//! challenge has been superseded.

use super::{
    error::FlowError,
    types::{OtpChallenge, OtpCode, PendingSignup},
};
use crate::{navigator::Screen, session::Session};
use secrecy::SecretString;
use std::{fmt, time::Duration};
use tracing::debug;

/// Delay before leaving the flow so the success notice can be read.
pub const NAVIGATION_DELAY: Duration = Duration::from_millis(1500);

pub(crate) const SEND_FALLBACK: &str = "Failed to send OTP";
pub(crate) const RESEND_FALLBACK: &str = "Failed to resend OTP";
pub(crate) const VERIFY_FALLBACK: &str = "Verification failed";
pub(crate) const RESENT_NOTICE: &str = "OTP resent successfully!";
pub(crate) const VERIFIED_NOTICE: &str = "Verification successful!";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FlowState {
    CollectingDetails,
    AwaitingOtp(OtpChallenge),
    Verified,
    Failed {
        prev: Box<FlowState>,
        error: FlowError,
    },
    /// The screen was left; every later event is ignored.
    Abandoned,
}

/// The state with any `Failed` annotation peeled off.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    CollectingDetails,
    AwaitingOtp,
    Verified,
    Abandoned,
}

impl FlowState {
    pub(crate) fn failed(prev: Self, error: FlowError) -> Self {
        Self::Failed {
            prev: Box::new(prev),
            error,
        }
    }

    #[must_use]
    pub fn resumed(&self) -> &Self {
        match self {
            Self::Failed { prev, .. } => prev.resumed(),
            other => other,
        }
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        match self.resumed() {
            Self::CollectingDetails | Self::Failed { .. } => Phase::CollectingDetails,
            Self::AwaitingOtp(_) => Phase::AwaitingOtp,
            Self::Verified => Phase::Verified,
            Self::Abandoned => Phase::Abandoned,
        }
    }

    #[must_use]
    pub fn error(&self) -> Option<&FlowError> {
        match self {
            Self::Failed { error, .. } => Some(error),
            _ => None,
        }
    }

    #[must_use]
    pub fn challenge(&self) -> Option<&OtpChallenge> {
        match self.resumed() {
            Self::AwaitingOtp(challenge) => Some(challenge),
            _ => None,
        }
    }
}

impl fmt::Display for FlowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CollectingDetails => f.write_str("collecting-details"),
            Self::AwaitingOtp(challenge) => write!(f, "awaiting-otp#{}", challenge.serial()),
            Self::Verified => f.write_str("verified"),
            Self::Failed { prev, .. } => write!(f, "failed({prev})"),
            Self::Abandoned => f.write_str("abandoned"),
        }
    }
}

/// Why a code is being requested.
#[derive(Clone, Debug)]
pub enum OtpPurpose {
    Signup(PendingSignup),
    Resend { serial: u64 },
}

pub enum Event {
    SubmitDetails(PendingSignup),
    /// A pending signup read back from the store; reopens verification
    /// without requesting a new code.
    Restore {
        signup: PendingSignup,
        window: u32,
    },
    OtpIssued {
        signup: PendingSignup,
        window: u32,
    },
    OtpRequestFailed(FlowError),
    Tick,
    Resend,
    ResendSucceeded {
        serial: u64,
    },
    ResendFailed {
        serial: u64,
        error: FlowError,
    },
    SubmitOtp(String),
    VerifySucceeded {
        serial: u64,
        token: Option<SecretString>,
    },
    VerifyFailed {
        serial: u64,
        error: FlowError,
    },
    Abandon,
}

impl Event {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::SubmitDetails(_) => "submit-details",
            Self::Restore { .. } => "restore",
            Self::OtpIssued { .. } => "otp-issued",
            Self::OtpRequestFailed(_) => "otp-request-failed",
            Self::Tick => "tick",
            Self::Resend => "resend",
            Self::ResendSucceeded { .. } => "resend-succeeded",
            Self::ResendFailed { .. } => "resend-failed",
            Self::SubmitOtp(_) => "submit-otp",
            Self::VerifySucceeded { .. } => "verify-succeeded",
            Self::VerifyFailed { .. } => "verify-failed",
            Self::Abandon => "abandon",
        }
    }
}

/// Only the event name is printed; payloads may hold codes or tokens.
impl fmt::Debug for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug)]
pub enum Effect {
    RequestOtp { email: String, purpose: OtpPurpose },
    PersistPending(PendingSignup),
    StartTimer,
    StopTimer,
    VerifyOtp {
        email: String,
        code: OtpCode,
        serial: u64,
    },
    StoreToken(Session),
    RemovePending,
    Navigate { screen: Screen, after: Duration },
    Notify(String),
    Report(FlowError),
}

impl Effect {
    /// Writes to the session store. These run before the new state is
    /// committed so a failed write leaves the previous state in place.
    #[must_use]
    pub const fn is_store_write(&self) -> bool {
        matches!(
            self,
            Self::PersistPending(_) | Self::StoreToken(_) | Self::RemovePending
        )
    }
}

#[derive(Debug)]
pub struct Transition {
    pub state: FlowState,
    pub effects: Vec<Effect>,
}

impl Transition {
    fn new(state: FlowState, effects: Vec<Effect>) -> Self {
        Self { state, effects }
    }

    fn idle(state: FlowState) -> Self {
        Self::new(state, Vec::new())
    }

    fn fail(prev: FlowState, error: FlowError) -> Self {
        Self::new(
            FlowState::failed(prev, error.clone()),
            vec![Effect::Report(error)],
        )
    }
}

#[must_use]
pub fn transition(state: FlowState, event: Event) -> Transition {
    match (state, event) {
        (FlowState::Abandoned, event) => {
            debug!("flow abandoned, ignoring {event:?}");
            Transition::idle(FlowState::Abandoned)
        }
        (_, Event::Abandon) => Transition::new(FlowState::Abandoned, vec![Effect::StopTimer]),

        (FlowState::Failed { prev, error }, Event::Tick) => {
            let next = transition(*prev, Event::Tick);
            Transition::new(FlowState::failed(next.state, error), next.effects)
        }
        (FlowState::Failed { prev, .. }, event) => transition(*prev, event),

        (FlowState::CollectingDetails, Event::SubmitDetails(signup)) => {
            match signup.validate() {
                Ok(()) => Transition::new(
                    FlowState::CollectingDetails,
                    vec![Effect::RequestOtp {
                        email: signup.email(),
                        purpose: OtpPurpose::Signup(signup),
                    }],
                ),
                Err(error) => Transition::fail(FlowState::CollectingDetails, error),
            }
        }
        (FlowState::CollectingDetails, Event::OtpIssued { signup, window }) => {
            let email = signup.email();
            Transition::new(
                FlowState::AwaitingOtp(OtpChallenge::issue(&email, window)),
                vec![
                    Effect::PersistPending(signup),
                    Effect::StartTimer,
                    Effect::Notify(format!("OTP sent to {email}")),
                ],
            )
        }
        (FlowState::CollectingDetails, Event::OtpRequestFailed(error)) => {
            Transition::fail(FlowState::CollectingDetails, error)
        }
        (FlowState::CollectingDetails, Event::Restore { signup, window }) => Transition::new(
            FlowState::AwaitingOtp(OtpChallenge::issue(&signup.email(), window)),
            vec![Effect::StartTimer],
        ),

        (FlowState::AwaitingOtp(mut challenge), Event::Tick) => {
            let effects = if challenge.tick() {
                vec![Effect::StopTimer]
            } else {
                Vec::new()
            };
            Transition::new(FlowState::AwaitingOtp(challenge), effects)
        }
        (FlowState::AwaitingOtp(challenge), Event::Resend) => {
            if challenge.resend_allowed() {
                let effects = vec![Effect::RequestOtp {
                    email: challenge.email().to_string(),
                    purpose: OtpPurpose::Resend {
                        serial: challenge.serial(),
                    },
                }];
                Transition::new(FlowState::AwaitingOtp(challenge), effects)
            } else {
                debug!("resend ignored, {}s left", challenge.remaining());
                Transition::idle(FlowState::AwaitingOtp(challenge))
            }
        }
        (FlowState::AwaitingOtp(challenge), Event::ResendSucceeded { serial })
            if serial == challenge.serial() =>
        {
            Transition::new(
                FlowState::AwaitingOtp(challenge.reissue()),
                vec![
                    Effect::StartTimer,
                    Effect::Notify(RESENT_NOTICE.to_string()),
                ],
            )
        }
        (FlowState::AwaitingOtp(challenge), Event::ResendFailed { serial, error })
            if serial == challenge.serial() =>
        {
            Transition::fail(FlowState::AwaitingOtp(challenge), error)
        }
        (FlowState::AwaitingOtp(challenge), Event::SubmitOtp(input)) => {
            match OtpCode::parse(&input) {
                Ok(code) => {
                    let effects = vec![Effect::VerifyOtp {
                        email: challenge.email().to_string(),
                        code,
                        serial: challenge.serial(),
                    }];
                    Transition::new(FlowState::AwaitingOtp(challenge), effects)
                }
                Err(error) => Transition::fail(FlowState::AwaitingOtp(challenge), error),
            }
        }
        (FlowState::AwaitingOtp(challenge), Event::VerifySucceeded { serial, token })
            if serial == challenge.serial() =>
        {
            match token {
                Some(token) => Transition::new(
                    FlowState::Verified,
                    vec![
                        Effect::StopTimer,
                        Effect::StoreToken(Session::new(token)),
                        Effect::RemovePending,
                        Effect::Notify(VERIFIED_NOTICE.to_string()),
                        Effect::Navigate {
                            screen: Screen::Dashboard,
                            after: NAVIGATION_DELAY,
                        },
                    ],
                ),
                None => Transition::fail(
                    FlowState::AwaitingOtp(challenge),
                    FlowError::ProtocolViolation,
                ),
            }
        }
        (FlowState::AwaitingOtp(challenge), Event::VerifyFailed { serial, error })
            if serial == challenge.serial() =>
        {
            Transition::fail(FlowState::AwaitingOtp(challenge), error)
        }

        (state, event) => {
            debug!("ignoring {event:?} in {state}");
            Transition::idle(state)
        }
    }
}
