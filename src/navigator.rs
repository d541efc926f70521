//! Screen transitions requested by the flows once a step completes.

use std::{
    fmt,
    sync::{Arc, Mutex},
};
use tracing::info;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Screen {
    Signup,
    VerifyOtp,
    Login,
    Dashboard,
    LoanStatus,
}

impl Screen {
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::Signup => "/signup",
            Self::VerifyOtp => "/verify-otp",
            Self::Login => "/login",
            Self::Dashboard => "/dashboard",
            Self::LoanStatus => "/loan-status",
        }
    }
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Moves the user to another screen. Called from spawned tasks, so
/// implementations must be thread-safe.
pub trait Navigator: Send + Sync + 'static {
    fn navigate(&self, screen: Screen);
}

impl<N: Navigator + ?Sized> Navigator for Arc<N> {
    fn navigate(&self, screen: Screen) {
        (**self).navigate(screen);
    }
}

/// Navigator for the terminal client: logs the transition and tells the user
/// which command continues the journey.
#[derive(Clone, Copy, Debug, Default)]
pub struct ConsoleNavigator;

impl ConsoleNavigator {
    #[must_use]
    pub const fn hint(screen: Screen) -> &'static str {
        match screen {
            Screen::Signup => "Run `lendflow signup` to create an account.",
            Screen::VerifyOtp => "Run `lendflow verify` to enter the code from your email.",
            Screen::Login => "Your session has expired. Run `lendflow signup` to sign in again.",
            Screen::Dashboard => "You are signed in. Run `lendflow apply` to request a loan.",
            Screen::LoanStatus => "Run `lendflow stats` to follow loan statistics.",
        }
    }
}

impl Navigator for ConsoleNavigator {
    fn navigate(&self, screen: Screen) {
        info!(%screen, "navigate");
        println!("{}", Self::hint(screen));
    }
}

/// Navigator that records every requested screen.
#[derive(Clone, Debug, Default)]
pub struct RecordingNavigator {
    visited: Arc<Mutex<Vec<Screen>>>,
}

impl RecordingNavigator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn visited(&self) -> Vec<Screen> {
        self.visited
            .lock()
            .map(|visited| visited.clone())
            .unwrap_or_default()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, screen: Screen) {
        if let Ok(mut visited) = self.visited.lock() {
            visited.push(screen);
        }
    }
}
