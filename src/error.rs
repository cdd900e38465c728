//! Configuration diagnostics and content load errors
//!
//! Nothing here is fatal to a running session: a `ConfigError` turns the offending
//! pattern, wave or entry into a no-op and is reported back to the caller.

use thiserror::Error;

use crate::content::PatternId;

/// Non-fatal problem found in authored data
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// A pattern's sub-pattern chain leads back to a pattern already in the chain
    #[error("pattern `{pattern}` reaches itself through sub-pattern `{repeated}`")]
    SubPatternCycle { pattern: PatternId, repeated: PatternId },

    /// A pattern or weapon references a pattern that is not in the library
    #[error("pattern `{missing}` referenced by `{referenced_by}` does not exist")]
    MissingPattern {
        missing: PatternId,
        referenced_by: String,
    },

    /// Sub-pattern nesting exceeded the session's depth cap
    #[error("pattern `{pattern}` nested {depth} levels deep (limit {limit})")]
    SubPatternTooDeep {
        pattern: PatternId,
        depth: u32,
        limit: u32,
    },

    /// Pattern fires zero bullets
    #[error("pattern `{0}` has a bullet count of zero")]
    EmptyPattern(PatternId),

    /// Wave spawns zero entities
    #[error("wave {index} (`{template}`) has a count of zero")]
    EmptyWave { index: usize, template: String },

    /// Wave asked for more entities than one wave may spawn
    #[error("wave {index} (`{template}`) asks for {count} entities, spawning the first {limit}")]
    WaveTruncated {
        index: usize,
        template: String,
        count: u32,
        limit: usize,
    },

    /// An entry failed to deserialize and was skipped
    #[error("skipped {kind} entry {index}: {reason}")]
    InvalidEntry {
        kind: &'static str,
        index: usize,
        reason: String,
    },
}

/// Content could not be read at all
#[derive(Debug, Error)]
pub enum ContentError {
    #[error("content is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to read content: {0}")]
    Io(#[from] std::io::Error),
}
