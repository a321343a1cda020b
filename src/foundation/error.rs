/// Convenience result type used across the crate.
pub type PortraitResult<T> = Result<T, PortraitError>;

/// Top-level error taxonomy used by compositor, session and export APIs.
#[derive(thiserror::Error, Debug)]
pub enum PortraitError {
    /// Invalid caller-provided data (configuration, parameters, asset paths).
    #[error("validation error: {0}")]
    Validation(String),

    /// An image source could not be decoded into pixels.
    #[error("decode error: {0}")]
    Decode(String),

    /// A surface could not be allocated or a render pass failed.
    #[error("render error: {0}")]
    Render(String),

    /// The rendered frame could not be encoded.
    #[error("encode error: {0}")]
    Encode(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PortraitError {
    /// Build a [`PortraitError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`PortraitError::Decode`] value.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Build a [`PortraitError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`PortraitError::Encode`] value.
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
