use crate::{
    api::HttpLoanService,
    cli::globals::GlobalArgs,
    loan::{LoanError, LoanStatistics, load_statistics},
    navigator::{ConsoleNavigator, Navigator, Screen},
};
use anyhow::{Context, Result};

const BAR_WIDTH: u32 = 40;

/// Prints the statistics, from the API or the built-in sample.
/// # Errors
/// Returns an error if the statistics cannot be loaded.
pub async fn execute(globals: &GlobalArgs, offline: bool) -> Result<()> {
    let stats = if offline {
        LoanStatistics::sample()
    } else {
        let service = HttpLoanService::new(globals.api_client()?);
        match load_statistics(&service, &globals.store(), &ConsoleNavigator).await {
            Ok(stats) => stats,
            Err(LoanError::NotAuthenticated) => {
                ConsoleNavigator.navigate(Screen::Login);
                return Ok(());
            }
            Err(err) => return Err(err).context("statistics unavailable"),
        }
    };

    print!("{}", render(&stats));
    Ok(())
}

/// Text rendering: one bar per rate and the application total.
#[must_use]
pub fn render(stats: &LoanStatistics) -> String {
    let mut out = String::new();
    for (label, rate) in stats.breakdown() {
        let clamped = rate.clamp(0.0, 100.0);
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let filled = (clamped / 100.0 * f64::from(BAR_WIDTH)).round() as usize;
        out.push_str(&format!(
            "{label:<15} {:<width$} {rate:>5.1}%\n",
            "#".repeat(filled),
            width = BAR_WIDTH as usize,
        ));
    }
    out.push_str(&format!(
        "{:<15} {}\n",
        "Applications",
        stats.total_applications
    ));
    out
}
