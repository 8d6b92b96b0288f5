//! An engine that invents rosters instead of reading them.

use std::time::Duration;

use crate::{extraction::generator::generate, prelude::*, roster::Roster};

use super::RosterEngine;

/// How long a real vision call takes, roughly.
pub const DEFAULT_LATENCY: Duration = Duration::from_millis(1500);

/// A [`RosterEngine`] that waits for a fixed time and then returns
/// [`generate`]'s roster for the seed.
#[derive(Debug)]
pub struct SyntheticRosterEngine {
    latency: Duration,
}

impl SyntheticRosterEngine {
    /// Create a new engine. `latency` is the same for every call, whatever
    /// the payload size.
    pub fn new(latency: Duration) -> Self {
        Self { latency }
    }
}

impl Default for SyntheticRosterEngine {
    fn default() -> Self {
        Self::new(DEFAULT_LATENCY)
    }
}

#[async_trait]
impl RosterEngine for SyntheticRosterEngine {
    #[instrument(level = "debug", skip_all, fields(seed = seed))]
    async fn extract_roster(&self, _payload: &str, seed: u32) -> Result<Roster> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        Ok(generate(seed))
    }
}
