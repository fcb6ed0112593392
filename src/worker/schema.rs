//! Worker request/event schema.
//!
//! Requests are what callers enqueue; events are what the worker reports back
//! while it drains the queue. Both serialize to tagged JSON so the stdin IPC
//! stub and frontends can speak them directly.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::ThemeErrorKind;

/// Id assigned to a request when it is enqueued. Strictly increasing per
/// worker.
pub type RequestId = u64;

/// Independently appliable subset of an installed theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum ThemeSection {
    Icons,
    Wallpaper,
    SystemUi,
    Framework,
    Ringtones,
    Lockscreen,
    BootAnimation,
    Mms,
}

impl ThemeSection {
    pub const ALL: [ThemeSection; 8] = [
        ThemeSection::Icons,
        ThemeSection::Wallpaper,
        ThemeSection::SystemUi,
        ThemeSection::Framework,
        ThemeSection::Ringtones,
        ThemeSection::Lockscreen,
        ThemeSection::BootAnimation,
        ThemeSection::Mms,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Icons => "icons",
            Self::Wallpaper => "wallpaper",
            Self::SystemUi => "system_ui",
            Self::Framework => "framework",
            Self::Ringtones => "ringtones",
            Self::Lockscreen => "lockscreen",
            Self::BootAnimation => "boot_animation",
            Self::Mms => "mms",
        }
    }
}

impl fmt::Display for ThemeSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One unit of work for the theme worker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ThemeRequest {
    /// Replace the installed theme with the package at `uri`.
    ApplyFromSource { uri: String },
    /// Re-apply whatever is installed.
    ApplyCurrent,
    RemoveTheme,
    RemoveThenApplyCurrent,
    ApplySection { section: ThemeSection },
}

impl fmt::Display for ThemeRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ApplyFromSource { uri } => write!(f, "apply `{uri}`"),
            Self::ApplyCurrent => f.write_str("apply current"),
            Self::RemoveTheme => f.write_str("remove"),
            Self::RemoveThenApplyCurrent => f.write_str("remove and apply"),
            Self::ApplySection { section } => write!(f, "apply section {section}"),
        }
    }
}

/// What the worker is doing right now.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum WorkerState {
    #[default]
    Idle,
    Processing {
        request_id: RequestId,
        request: ThemeRequest,
    },
}

/// Monotonic envelope for worker events.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WorkerEventEnvelope {
    pub seq: u64,
    pub ts_unix_ms: u64,
    pub event: WorkerEvent,
}

impl WorkerEventEnvelope {
    pub fn new(seq: u64, event: WorkerEvent) -> Self {
        Self {
            seq,
            ts_unix_ms: now_unix_millis(),
            event,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum WorkerEvent {
    Lifecycle(LifecycleEvent),
    RequestStarted {
        request_id: RequestId,
        request: ThemeRequest,
    },
    /// A step failed and was skipped; the request carried on.
    StepFailed {
        request_id: RequestId,
        step: String,
        kind: ThemeErrorKind,
        message: String,
    },
    RequestFinished {
        request_id: RequestId,
        failures: usize,
    },
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleEvent {
    Started,
    Stopped,
}

fn now_unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
