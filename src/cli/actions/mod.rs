pub mod apply;
pub mod console;
pub mod logout;
pub mod signup;
pub mod stats;
pub mod status;
pub mod verify;

mod run;

use crate::{
    cli::{commands::signup::Options as SignupDetails, globals::GlobalArgs},
    loan::LoanApplication,
};

#[derive(Debug)]
pub enum Action {
    Signup {
        globals: GlobalArgs,
        details: SignupDetails,
    },
    Verify {
        globals: GlobalArgs,
    },
    Apply {
        globals: GlobalArgs,
        application: LoanApplication,
    },
    Stats {
        globals: GlobalArgs,
        offline: bool,
    },
    Logout {
        globals: GlobalArgs,
    },
    Status {
        globals: GlobalArgs,
    },
}

impl Action {
    /// Execute the action.
    /// # Errors
    /// Returns an error if the action fails.
    pub async fn execute(self) -> anyhow::Result<()> {
        run::execute(self).await
    }
}
