use chrono::Duration;
use serde::{Deserialize, Serialize};

/// Tunables for proposal creation and duplicate detection.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProposalConfig {
    /// Days a proposal stays pending before it can be swept.
    pub default_expiry_days: i64,
    /// Confidence used when the agent does not state one.
    pub default_confidence: f64,
    /// Minimum score for [`crate::find_similar`] to report a match.
    pub similarity_threshold: f64,
}

impl Default for ProposalConfig {
    fn default() -> Self {
        Self {
            default_expiry_days: 7,
            default_confidence: 0.5,
            similarity_threshold: 0.5,
        }
    }
}

impl ProposalConfig {
    /// `None` when the day count cannot be represented as a duration.
    pub fn default_expiry(&self) -> Option<Duration> {
        Duration::try_days(self.default_expiry_days)
    }
}
