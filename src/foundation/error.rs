/// Convenience result type used across zonecast.
pub type ZonecastResult<T> = Result<T, ZonecastError>;

/// Top-level error taxonomy used by engine APIs.
///
/// Playback never surfaces these past a zone or widget boundary: the compositor turns them into
/// placeholder or inline error states. They are returned by editing, loading and collaborator
/// calls.
#[derive(thiserror::Error, Debug)]
pub enum ZonecastError {
    /// Invalid user-provided or layout data.
    #[error("validation error: {0}")]
    Validation(String),

    /// A referenced screen, playlist, layout, file or key does not resolve.
    #[error("not found: {0}")]
    NotFound(String),

    /// An external content source was unreachable or answered with a non-success status.
    #[error("fetch error: {0}")]
    Fetch(String),

    /// An external document could not be parsed.
    #[error("parse error: {0}")]
    Parse(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ZonecastError {
    /// Build a [`ZonecastError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`ZonecastError::NotFound`] value.
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Build a [`ZonecastError::Fetch`] value.
    pub fn fetch(msg: impl Into<String>) -> Self {
        Self::Fetch(msg.into())
    }

    /// Build a [`ZonecastError::Parse`] value.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// Build a [`ZonecastError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// Return `true` for the not-found class.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

impl From<serde_json::Error> for ZonecastError {
    fn from(e: serde_json::Error) -> Self {
        Self::serde(e.to_string())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
