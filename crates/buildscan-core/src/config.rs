//! Scan configuration.

use serde::{Deserialize, Serialize};

use crate::error::{Result, ScanError};

/// Default lookback window for the slug workflow, in hours.
pub const DEFAULT_LOOKBACK_HOURS: u32 = 4;

/// Default target language of the failure signature.
pub const DEFAULT_TARGET_LANGUAGE: &str = "java";

/// Longest accepted lookback window: one hundred years.
pub const MAX_LOOKBACK_HOURS: u32 = 100 * 365 * 24;

/// Settings for one scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Builds started more than this many hours ago are ignored by the slug workflow.
    pub lookback_hours: u32,
    /// Language a build must be configured for to be considered.
    pub target_language: String,
}

impl Default for ScanConfig {
    fn default() -> Self {
        ScanConfig {
            lookback_hours: DEFAULT_LOOKBACK_HOURS,
            target_language: DEFAULT_TARGET_LANGUAGE.to_string(),
        }
    }
}

impl ScanConfig {
    /// Create a config for a specific language and window.
    pub fn new(target_language: &str, lookback_hours: u32) -> Self {
        ScanConfig {
            lookback_hours,
            target_language: target_language.to_string(),
        }
    }

    /// Reject settings no scan can run with.
    pub fn validate(&self) -> Result<()> {
        if self.target_language.trim().is_empty() {
            return Err(ScanError::InvalidConfig(
                "target language must not be empty".to_string(),
            ));
        }
        if self.lookback_hours > MAX_LOOKBACK_HOURS {
            return Err(ScanError::InvalidConfig(format!(
                "lookback of {} hours exceeds the maximum of {}",
                self.lookback_hours, MAX_LOOKBACK_HOURS
            )));
        }
        Ok(())
    }
}
