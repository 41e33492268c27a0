//! Error types for the cliff detector.

/// Result type alias
pub type Result<T> = std::result::Result<T, CliffError>;

/// Failures reported by a detection call or by the file helpers.
///
/// A detection either yields a polygon (possibly empty) or fails with one of
/// these; there is no partial result.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CliffError {
    /// Camera model not initialized or unusable for the supplied frame
    #[error("Invalid camera model: {0}")]
    InvalidModel(String),

    /// Parameter combination that would produce undefined geometry
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Frame buffer or dimensions inconsistent with the configuration or camera
    #[error("Malformed frame: {0}")]
    MalformedFrame(String),

    /// File or encoding failure in the I/O helpers
    #[error("I/O error: {0}")]
    Io(String),
}

impl CliffError {
    pub(crate) fn config(msg: impl Into<String>) -> Self {
        Self::InvalidConfiguration(msg.into())
    }

    pub(crate) fn model(msg: impl Into<String>) -> Self {
        Self::InvalidModel(msg.into())
    }

    pub(crate) fn frame(msg: impl Into<String>) -> Self {
        Self::MalformedFrame(msg.into())
    }
}
