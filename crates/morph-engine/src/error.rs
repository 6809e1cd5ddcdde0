//! Error taxonomy for engine construction and initialization.
//!
//! Only construction and initialization can fail. Once an engine is running,
//! the per-frame path has no error cases.

use thiserror::Error;

/// Errors reported while configuring or initializing the engine.
#[derive(Debug, Error)]
pub enum MorphError {
    /// A sampling source produced no usable points (zero-area mesh, empty mask).
    #[error("source `{source_name}` has no samplable points")]
    EmptySource { source_name: String },

    /// The external loader reported that an asset could not be loaded.
    #[error("asset `{source_name}` failed to load: {reason}")]
    AssetLoadFailure { source_name: String, reason: String },

    /// Hover radius must be strictly positive.
    #[error("hover radius must be > 0, got {0}")]
    DegenerateRadius(f32),

    /// Phase boundaries do not partition [0, 1].
    #[error("invalid phase boundaries: {0}")]
    InvalidPhases(String),

    /// Mesh data is malformed (bad index, ragged position array).
    #[error("invalid mesh: {0}")]
    InvalidMesh(String),

    /// Any other configuration constraint violation.
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// Configuration JSON could not be parsed.
    #[error("config parse error: {0}")]
    Config(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, MorphError>;
