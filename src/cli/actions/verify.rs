//! Interactive verification screen.
//!
//! The loop waits on three sources at once: the countdown timer, a line from
//! stdin (`<code>`, `resend` or `quit`) and Ctrl-C. Requests started from a
//! line are raced against the same Ctrl-C future. Leaving the screen by any
//! route other than a successful verification abandons the flow.

use crate::{
    api::{AuthService, HttpAuthService},
    cli::{actions::console::Console, globals::GlobalArgs},
    navigator::{ConsoleNavigator, Navigator, Screen},
    session::{FileStore, SessionStore},
    signup::{Phase, SignupFlow},
};
use anyhow::{Context, Result};

pub type ConsoleFlow = SignupFlow<HttpAuthService, FileStore, ConsoleNavigator>;

/// Resumes verification for the signup stored in the session file.
/// # Errors
/// Returns an error if the session file or stdin cannot be read.
pub async fn execute(globals: &GlobalArgs) -> Result<()> {
    let auth = HttpAuthService::new(globals.api_client()?);
    let flow = ConsoleFlow::resume(auth, globals.store(), ConsoleNavigator, globals.otp_window)
        .context("failed to read the pending signup")?;
    let Some(mut flow) = flow else {
        println!(
            "No pending signup. {}",
            ConsoleNavigator::hint(Screen::Signup)
        );
        return Ok(());
    };

    run_screen(&mut flow, &mut Console::new()).await
}

/// Drives `flow` from the terminal until it is verified or abandoned.
/// # Errors
/// Returns an error if stdin cannot be read.
pub async fn run_screen<A, S, N>(flow: &mut SignupFlow<A, S, N>, console: &mut Console) -> Result<()>
where
    A: AuthService,
    S: SessionStore,
    N: Navigator,
{
    if let Some(challenge) = flow.challenge() {
        println!("Enter the 6-digit code sent to {}.", challenge.email());
        println!(
            "Type `resend` for a new code after {}, or `quit` to leave.",
            challenge.format_remaining()
        );
    }

    let interrupted = tokio::signal::ctrl_c();
    tokio::pin!(interrupted);

    loop {
        let line = tokio::select! {
            remaining = flow.advance_timer() => {
                announce(remaining);
                continue;
            }
            line = console.next_line() => line?,
            _ = &mut interrupted => {
                leave(flow);
                break;
            }
        };
        let Some(input) = line else {
            flow.abandon();
            break;
        };

        match input.trim() {
            "" => {}
            "quit" | "exit" => {
                flow.abandon();
                println!("{}", ConsoleNavigator::hint(Screen::VerifyOtp));
                break;
            }
            "resend" => {
                let outcome = tokio::select! {
                    outcome = flow.resend_otp() => outcome,
                    _ = &mut interrupted => {
                        leave(flow);
                        break;
                    }
                };
                match outcome {
                    Ok(false) => {
                        if let Some(challenge) = flow.challenge() {
                            println!(
                                "Please wait {} before requesting a new code.",
                                challenge.format_remaining()
                            );
                        }
                    }
                    Ok(true) | Err(_) => print_message(flow),
                }
            }
            code => {
                let outcome = tokio::select! {
                    outcome = flow.submit_otp(code) => outcome,
                    _ = &mut interrupted => {
                        leave(flow);
                        break;
                    }
                };
                let verified = outcome.is_ok() && flow.phase() == Phase::Verified;
                print_message(flow);
                if verified {
                    flow.wait_for_navigation().await;
                    break;
                }
            }
        }
    }

    Ok(())
}

fn announce(remaining: Option<u32>) {
    match remaining {
        Some(0) => println!("You can request a new code now: type `resend`."),
        Some(seconds) if seconds % 60 == 0 => {
            println!("Resend available in {}:00.", seconds / 60);
        }
        _ => {}
    }
}

/// Ctrl-C: an in-flight request is dropped and its response never applied.
fn leave<A, S, N>(flow: &mut SignupFlow<A, S, N>)
where
    A: AuthService,
    S: SessionStore,
    N: Navigator,
{
    flow.abandon();
    println!();
    println!("{}", ConsoleNavigator::hint(Screen::VerifyOtp));
}

fn print_message<A, S, N>(flow: &SignupFlow<A, S, N>)
where
    A: AuthService,
    S: SessionStore,
    N: Navigator,
{
    if let Some(message) = flow.message() {
        println!("{message}");
    }
}
