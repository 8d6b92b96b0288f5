//! Roster engine interface.
//!
//! An engine turns one image payload into a [`Roster`]. The only engine we
//! ship is [`synthetic::SyntheticRosterEngine`], but a real vision backend
//! would slot in here without touching the service or the cache.

use crate::{prelude::*, roster::Roster};

pub mod synthetic;

/// Interface to a roster engine.
#[async_trait]
pub trait RosterEngine: Send + Sync + 'static {
    /// Extract a roster from `payload`. `seed` is derived from the payload for
    /// engines that need a deterministic source of variation.
    async fn extract_roster(&self, payload: &str, seed: u32) -> Result<Roster>;
}
