//! Line-oriented terminal input shared by the interactive screens.

use anyhow::{Context, Result};
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin, stdin};

pub struct Console {
    lines: Lines<BufReader<Stdin>>,
}

impl Console {
    #[must_use]
    pub fn new() -> Self {
        Self {
            lines: BufReader::new(stdin()).lines(),
        }
    }

    /// Next input line; `None` once stdin is closed. Cancel safe.
    ///
    /// # Errors
    /// Returns an error if stdin cannot be read.
    pub async fn next_line(&mut self) -> Result<Option<String>> {
        self.lines.next_line().await.context("failed to read stdin")
    }

    /// Prints `label` and reads one trimmed answer.
    ///
    /// # Errors
    /// Returns an error if stdin is closed or cannot be read.
    pub async fn ask(&mut self, label: &str) -> Result<String> {
        print!("{label}: ");
        std::io::stdout().flush().context("failed to flush stdout")?;
        let line = self
            .next_line()
            .await?
            .context("stdin closed before input was complete")?;
        Ok(line.trim().to_string())
    }
}

impl Default for Console {
    fn default() -> Self {
        Self::new()
    }
}
