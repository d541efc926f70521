use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanStatistics {
    pub approval_rate: f64,
    pub rejection_rate: f64,
    pub pending_rate: f64,
    pub total_applications: u64,
}

impl LoanStatistics {
    /// Figures shown when the service is not consulted.
    #[must_use]
    pub fn sample() -> Self {
        Self {
            approval_rate: 65.0,
            rejection_rate: 20.0,
            pending_rate: 15.0,
            total_applications: 150,
        }
    }

    /// Labelled percentages in display order.
    #[must_use]
    pub fn breakdown(&self) -> [(&'static str, f64); 3] {
        [
            ("Approval Rate", self.approval_rate),
            ("Rejection Rate", self.rejection_rate),
            ("Pending Rate", self.pending_rate),
        ]
    }
}
