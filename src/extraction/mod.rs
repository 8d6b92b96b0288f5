//! Turning mark sheet images into rosters.
//!
//! [`ExtractionService`] ties together key derivation, the
//! [`ExtractionCache`] and a [`RosterEngine`]. Submodules:
//!
//! - [`key`]: cache keys and seeds.
//! - [`generator`]: synthetic rosters from seeds.
//! - [`cache`]: memoized results.
//! - [`engines`]: the pluggable roster source.

use crate::{data_url::validate_payload, error::AnalysisError, prelude::*, roster::Roster};

use self::{cache::ExtractionCache, engines::RosterEngine};

pub mod cache;
pub mod engines;
pub mod generator;
pub mod key;

/// Extracts rosters from image payloads, remembering past results.
#[derive(Clone)]
pub struct ExtractionService {
    engine: Arc<dyn RosterEngine>,
    cache: Arc<ExtractionCache>,
}

impl ExtractionService {
    /// Create a new service. The cache may be shared with other services.
    pub fn new(engine: Arc<dyn RosterEngine>, cache: Arc<ExtractionCache>) -> Self {
        Self { engine, cache }
    }

    /// Our cache.
    pub fn cache(&self) -> &Arc<ExtractionCache> {
        &self.cache
    }

    /// Extract a roster from `payload`.
    ///
    /// We only write to the cache once the engine has produced a complete
    /// roster. If this future is dropped early, the cache is untouched. Two
    /// concurrent calls for the same new payload may both run the engine.
    #[instrument(level = "debug", skip_all, fields(payload_len = payload.len()))]
    pub async fn extract(&self, payload: &str) -> Result<Arc<Roster>, AnalysisError> {
        validate_payload(payload)?;

        let key = key::cache_key(payload);
        if let Some(roster) = self.cache.get(&key) {
            debug!("Using cached roster");
            return Ok(roster);
        }

        let seed = key::seed_for(payload);
        debug!(seed, "No cached roster, running engine");
        let roster = self
            .engine
            .extract_roster(payload, seed)
            .await
            .map_err(AnalysisError::Extraction)?;
        let roster = Arc::new(roster);
        self.cache.put(key, roster.clone());
        Ok(roster)
    }
}
