// error.rs - Engine error types
//
// Config errors are programmer mistakes caught when a scene is built.
// Scene errors are per-tick faults; the scheduler suspends the scene and
// never lets them reach the host page.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("edge {edge} references undeclared node `{id}`")]
    UnknownNode { edge: usize, id: String },

    #[error("node id `{0}` is declared more than once")]
    DuplicateNode(String),

    #[error("node `{id}` has layout ({x}, {y}) outside the unit square")]
    NodeOutOfRange { id: String, x: f32, y: f32 },

    #[error("token cap {cap} exceeds capacity {max}")]
    TokenCap { cap: usize, max: usize },

    #[error("{what}: count {count} exceeds capacity {max}")]
    TooMany { what: &'static str, count: usize, max: usize },

    #[error("{0} must not be empty")]
    Empty(&'static str),

    #[error("{what}: range [{min}, {max}] is inverted or not finite")]
    BadRange { what: &'static str, min: f32, max: f32 },

    #[error("{what} must be positive and finite, got {value}")]
    NotPositive { what: &'static str, value: f32 },

    #[error("`{0}` is not a #rrggbb colour")]
    BadColor(String),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SceneError {
    #[error("{what} {index} left the finite plane")]
    NonFinite { what: &'static str, index: usize },

    #[error("scene panicked during tick: {0}")]
    Panicked(String),
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("unknown scene `{0}`")]
    UnknownScene(String),

    #[error("malformed config for `{scene}`: {reason}")]
    BadConfig { scene: &'static str, reason: String },

    #[error("surface unavailable: {0}")]
    Surface(String),
}

/// Check a `[min, max]` pair used for random draws.
pub(crate) fn check_range(what: &'static str, (min, max): (f32, f32)) -> Result<(), ConfigError> {
    if min.is_finite() && max.is_finite() && min <= max {
        Ok(())
    } else {
        Err(ConfigError::BadRange { what, min, max })
    }
}

pub(crate) fn check_positive(what: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NotPositive { what, value })
    }
}
