//! Unified error types for the theme service.

use serde::{Deserialize, Serialize};
use std::io;
use std::path::PathBuf;
use thiserror::Error;

// ---------------------------------------------------------------------------
// ThemeError
// ---------------------------------------------------------------------------

/// Failures raised inside one worker step.
///
/// None of these cross the public operation surface: the worker logs them,
/// records them in the request report and moves on.
#[derive(Debug, Error)]
pub enum ThemeError {
    /// The archive handle could not be opened or read.
    #[error("theme source `{uri}` unavailable: {reason}")]
    SourceUnavailable { uri: String, reason: String },
    /// I/O error in the middle of an archive.
    #[error("extraction failed at `{entry}`: {reason}")]
    ExtractionFailure { entry: String, reason: String },
    /// Delete/create/chmod failure on the theme tree.
    #[error("{op} `{}`: {source}", .path.display())]
    FilesystemFailure {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// The privileged helper exited non-zero or could not be spawned.
    #[error("privileged call `{command}` failed: {reason}")]
    PrivilegedCallFailure { command: String, reason: String },
    /// The host could not be signalled.
    #[error("host notification failed: {0}")]
    NotifyFailure(String),
}

/// Serializable discriminant of [`ThemeError`] carried on worker events.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ThemeErrorKind {
    SourceUnavailable,
    ExtractionFailure,
    FilesystemFailure,
    PrivilegedCallFailure,
    NotifyFailure,
}

impl ThemeError {
    pub(crate) fn filesystem(op: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::FilesystemFailure {
            op,
            path: path.into(),
            source,
        }
    }

    pub fn kind(&self) -> ThemeErrorKind {
        match self {
            Self::SourceUnavailable { .. } => ThemeErrorKind::SourceUnavailable,
            Self::ExtractionFailure { .. } => ThemeErrorKind::ExtractionFailure,
            Self::FilesystemFailure { .. } => ThemeErrorKind::FilesystemFailure,
            Self::PrivilegedCallFailure { .. } => ThemeErrorKind::PrivilegedCallFailure,
            Self::NotifyFailure(_) => ThemeErrorKind::NotifyFailure,
        }
    }
}

// ---------------------------------------------------------------------------
// WorkerStopped
// ---------------------------------------------------------------------------

/// The worker task is gone; nothing more can be enqueued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("theme worker has stopped")]
pub struct WorkerStopped;

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// Errors when loading or parsing configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("io: {0}")]
    Io(#[from] io::Error),
    #[error("toml: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn theme_error_display() {
        let e = ThemeError::SourceUnavailable {
            uri: "file:///nope.zip".into(),
            reason: "not found".into(),
        };
        assert_eq!(
            e.to_string(),
            "theme source `file:///nope.zip` unavailable: not found"
        );

        let e = ThemeError::filesystem(
            "remove",
            "/data/system/theme/icons",
            io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        );
        assert_eq!(e.to_string(), "remove `/data/system/theme/icons`: denied");
    }

    #[test]
    fn theme_error_kind_matches_variant() {
        assert_eq!(
            ThemeError::NotifyFailure("down".into()).kind(),
            ThemeErrorKind::NotifyFailure
        );
        assert_eq!(
            ThemeError::ExtractionFailure {
                entry: "a/b".into(),
                reason: "eof".into()
            }
            .kind(),
            ThemeErrorKind::ExtractionFailure
        );
    }

    #[test]
    fn config_error_from_io() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let s = ConfigError::from(io_err).to_string();
        assert!(s.starts_with("io:"), "got: {s}");
        assert!(s.contains("file not found"));
    }

    #[test]
    fn config_error_from_toml() {
        let toml_err = toml::from_str::<toml::Value>("x = [unclosed").unwrap_err();
        assert!(ConfigError::from(toml_err).to_string().starts_with("toml:"));
    }

    #[test]
    fn config_error_invalid_message() {
        let e = ConfigError::Invalid("dir_mode out of range".into());
        assert_eq!(e.to_string(), "invalid config: dir_mode out of range");
    }
}
