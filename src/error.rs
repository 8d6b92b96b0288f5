//! Errors raised by the analysis core.
//!
//! Application code uses [`anyhow`], but callers of the core need to tell a
//! bad image apart from a failed extraction, so those cases get real types.

/// Things that can go wrong while turning images into a roster.
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    /// The image payload was empty or could not be read.
    #[error("invalid image payload: {0}")]
    InvalidPayload(String),

    /// The roster engine failed. Nothing was cached, so retrying is safe.
    #[error("could not extract marks from image")]
    Extraction(#[source] anyhow::Error),

    /// We were asked to merge zero rosters.
    #[error("cannot merge an empty list of rosters")]
    EmptyMergeInput,
}
