// error.rs — errors raised by the orientation accessors

use crate::panorama::Axis;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PanoError {
    /// A numeric field was not a number (NaN).
    #[error("{field} value is not a number")]
    InvalidInput { field: &'static str },

    /// A min/max update would invert an axis.
    #[error("{axis} bounds would be inverted: min {min} > max {max}")]
    BoundsViolation { axis: Axis, min: f32, max: f32 },

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl From<serde_json::Error> for PanoError {
    fn from(e: serde_json::Error) -> Self {
        PanoError::Config(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, PanoError>;
