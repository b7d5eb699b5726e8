/// Convenience result type used across lottie-pool.
pub type LottieResult<T> = Result<T, LottieError>;

/// Top-level error taxonomy.
///
/// None of these cross the [`crate::Orchestrator`] surface as failures of the caller's call; they
/// are logged at the point where a player stops producing frames.
#[derive(thiserror::Error, Debug)]
pub enum LottieError {
    /// Invalid caller-provided options or arguments.
    #[error("validation error: {0}")]
    Validation(String),

    /// The animation source could not be fetched.
    #[error("fetch error: {0}")]
    Fetch(String),

    /// The fetched bytes could not be decompressed.
    #[error("decompress error: {0}")]
    Decompress(String),

    /// The decompressed document is not a usable animation.
    #[error("parse error: {0}")]
    Parse(String),

    /// The decode module failed while creating, loading, resizing or rendering.
    #[error("decode error: {0}")]
    Decode(String),

    /// A decoder handle was used after it was destroyed.
    #[error("handle error: {0}")]
    Handle(String),

    /// A worker channel is closed or a worker could not be started.
    #[error("channel error: {0}")]
    Channel(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl LottieError {
    /// Build a [`LottieError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`LottieError::Fetch`] value.
    pub fn fetch(msg: impl Into<String>) -> Self {
        Self::Fetch(msg.into())
    }

    /// Build a [`LottieError::Decompress`] value.
    pub fn decompress(msg: impl Into<String>) -> Self {
        Self::Decompress(msg.into())
    }

    /// Build a [`LottieError::Parse`] value.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// Build a [`LottieError::Decode`] value.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Build a [`LottieError::Handle`] value.
    pub fn handle(msg: impl Into<String>) -> Self {
        Self::Handle(msg.into())
    }

    /// Build a [`LottieError::Channel`] value.
    pub fn channel(msg: impl Into<String>) -> Self {
        Self::Channel(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
