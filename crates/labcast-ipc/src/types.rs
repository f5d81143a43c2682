//! Common types used across IPC messages.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Which camera to request from the capture provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FacingMode {
    /// Front camera, facing the broadcaster.
    #[default]
    User,

    /// Rear camera, facing away from the broadcaster.
    Environment,
}

impl FacingMode {
    /// Returns the opposite facing mode.
    pub fn toggled(self) -> Self {
        match self {
            Self::User => Self::Environment,
            Self::Environment => Self::User,
        }
    }

    /// Returns the constraint string used by capture providers.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Environment => "environment",
        }
    }
}

impl fmt::Display for FacingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of a media track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackKind {
    /// Camera video.
    Video,

    /// Microphone audio.
    Audio,
}

impl TrackKind {
    /// Returns the lowercase kind name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Video => "video",
            Self::Audio => "audio",
        }
    }
}

impl fmt::Display for TrackKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Visual weight of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational or success message.
    Info,

    /// Failure the user has to act on.
    Destructive,
}

/// A titled, described message for the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    /// Visual weight.
    pub severity: Severity,

    /// Short headline distinguishing the failure category.
    pub title: String,

    /// Actionable detail.
    pub description: String,
}

impl Notification {
    /// Create an informational notification.
    pub fn info(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            severity: Severity::Info,
            title: title.into(),
            description: description.into(),
        }
    }

    /// Create a failure notification.
    pub fn destructive(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            severity: Severity::Destructive,
            title: title.into(),
            description: description.into(),
        }
    }

    /// Returns true if this notification reports a failure.
    pub fn is_destructive(&self) -> bool {
        self.severity == Severity::Destructive
    }
}

/// Errors constructing a stream key.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StreamKeyError {
    /// The key was empty or whitespace.
    #[error("Stream key must not be empty")]
    Empty,

    /// The key contained characters that cannot appear in a URL path segment.
    #[error("Stream key contains invalid characters")]
    InvalidCharacters,
}

/// Per-stream publish secret issued by the ingest control plane.
///
/// `Debug` and `Display` only ever print a masked form.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StreamKey(String);

impl StreamKey {
    /// Number of trailing characters left visible in the masked form.
    const VISIBLE_SUFFIX: usize = 4;

    /// Wrap a raw stream key.
    pub fn new(key: impl Into<String>) -> Result<Self, StreamKeyError> {
        let key = key.into();
        if key.trim().is_empty() {
            return Err(StreamKeyError::Empty);
        }
        if !key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '~'))
        {
            return Err(StreamKeyError::InvalidCharacters);
        }
        Ok(Self(key))
    }

    /// Raw secret. Only the endpoint builder should need this.
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Masked form suitable for logs and credential displays.
    pub fn masked(&self) -> String {
        let len = self.0.chars().count();
        if len <= Self::VISIBLE_SUFFIX * 2 {
            return "****".to_string();
        }
        let suffix: String = self.0.chars().skip(len - Self::VISIBLE_SUFFIX).collect();
        format!("****{suffix}")
    }
}

impl TryFrom<String> for StreamKey {
    type Error = StreamKeyError;

    fn try_from(key: String) -> Result<Self, Self::Error> {
        Self::new(key)
    }
}

impl From<StreamKey> for String {
    fn from(key: StreamKey) -> Self {
        key.0
    }
}

impl fmt::Debug for StreamKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("StreamKey").field(&self.masked()).finish()
    }
}

impl fmt::Display for StreamKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.masked())
    }
}
