//! Review scheduling knobs.

use std::time::Duration;

use serde::{Deserialize, Serialize};

const fn default_lookahead_days() -> u32 {
    7
}

const fn default_skip_delay_hours() -> u32 {
    24
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ReviewConfig {
    /// How many days ahead `study today` lists upcoming reviews.
    #[serde(default = "default_lookahead_days")]
    pub lookahead_days: u32,

    /// How far `study review skip` pushes a question back.
    #[serde(default = "default_skip_delay_hours")]
    pub skip_delay_hours: u32,
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            lookahead_days: default_lookahead_days(),
            skip_delay_hours: default_skip_delay_hours(),
        }
    }
}

impl ReviewConfig {
    #[must_use]
    pub fn skip_delay(&self) -> Duration {
        Duration::from_secs(u64::from(self.skip_delay_hours) * 3600)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_correct() {
        let config = ReviewConfig::default();
        assert_eq!(config.lookahead_days, 7);
        assert_eq!(config.skip_delay(), Duration::from_secs(24 * 3600));
    }
}
