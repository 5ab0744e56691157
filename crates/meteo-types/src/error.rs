//! Validation errors for the shared data model.

/// Reasons a [`SensorDefinition`](crate::SensorDefinition) can be rejected.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DefinitionError {
    /// The sensor identifier is empty.
    #[error("sensor identifier must not be empty")]
    EmptyId,

    /// One of the generation bounds is NaN or infinite.
    #[error("sensor '{id}' has a non-finite bound")]
    NonFiniteBound {
        /// The offending sensor identifier.
        id: String,
    },

    /// The minimum is greater than the maximum.
    #[error("sensor '{id}' has min {min} greater than max {max}")]
    InvertedBounds {
        /// The offending sensor identifier.
        id: String,
        /// Configured minimum.
        min: f64,
        /// Configured maximum.
        max: f64,
    },

    /// The distance between the bounds is too large to represent.
    #[error("sensor '{id}' range from {min} to {max} is too wide")]
    RangeTooWide {
        /// The offending sensor identifier.
        id: String,
        /// Configured minimum.
        min: f64,
        /// Configured maximum.
        max: f64,
    },
}
