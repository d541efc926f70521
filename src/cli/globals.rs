use crate::{
    api::ApiClient,
    session::FileStore,
};
use anyhow::{Context, Result};
use std::{path::PathBuf, time::Duration};

/// Settings shared by every subcommand.
#[derive(Clone, Debug)]
pub struct GlobalArgs {
    pub api_url: String,
    pub timeout: Duration,
    pub session_file: PathBuf,
    pub otp_window: u32,
}

impl GlobalArgs {
    #[must_use]
    pub fn new(api_url: String, timeout: Duration, session_file: PathBuf, otp_window: u32) -> Self {
        Self {
            api_url,
            timeout,
            session_file,
            otp_window,
        }
    }

    /// # Errors
    /// Returns an error if the API URL is invalid.
    pub fn api_client(&self) -> Result<ApiClient> {
        ApiClient::new(&self.api_url, self.timeout)
            .with_context(|| format!("invalid LENDFLOW_API_URL: {}", self.api_url))
    }

    #[must_use]
    pub fn store(&self) -> FileStore {
        FileStore::new(&self.session_file)
    }
}
