/// Convenience result type used across the animator.
pub type AnimatorResult<T> = Result<T, AnimatorError>;

/// Top-level error taxonomy used by engine APIs.
///
/// Cache problems never surface here: the tile cache heals itself by falling back to a direct
/// fetch. Cancellation is not an error either, see [`crate::RenderOutcome`].
#[derive(thiserror::Error, Debug)]
pub enum AnimatorError {
    /// Invalid user-provided configuration or data.
    #[error("validation error: {0}")]
    Validation(String),

    /// A track point has no timestamp and no forced point interval was configured.
    #[error("missing time for a track point in '{input}'; set a forced point interval for logs without timestamps")]
    MissingTime {
        /// The input that contains the offending point.
        input: String,
    },

    /// The requested total duration leaves no room for the animation itself.
    #[error("total time is too short; at least {required_ms} ms more are required")]
    InsufficientDuration {
        /// Additional milliseconds of total time needed for a single animation frame.
        required_ms: u64,
    },

    /// The resolved canvas cannot be allocated.
    #[error("canvas too large: {width}x{height} (zoom {zoom:?}); reduce width, height or zoom")]
    CanvasTooLarge {
        /// Requested canvas width in pixels.
        width: u64,
        /// Requested canvas height in pixels.
        height: u64,
        /// Map zoom level in effect, if any.
        zoom: Option<u32>,
    },

    /// A map tile could not be fetched.
    #[error("failed to fetch tile '{url}': {reason}")]
    TileFetch {
        /// Fully expanded tile URL.
        url: String,
        /// Underlying failure.
        reason: String,
    },

    /// Errors while reading or parsing track inputs.
    #[error("input error: {0}")]
    Input(String),

    /// Errors raised by frame sinks (encoder failure, disk full, ...).
    #[error("encode error: {0}")]
    Encode(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl AnimatorError {
    /// Build an [`AnimatorError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build an [`AnimatorError::Input`] value.
    pub fn input(msg: impl Into<String>) -> Self {
        Self::Input(msg.into())
    }

    /// Build an [`AnimatorError::Encode`] value.
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    /// Build an [`AnimatorError::TileFetch`] value.
    pub fn tile_fetch(url: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self::TileFetch {
            url: url.into(),
            reason: reason.to_string(),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
