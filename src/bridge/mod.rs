//! Host platform collaborators.
//!
//! The worker never talks to the platform directly. It reads theme packages
//! through a [`ThemeSource`] and signals changes through a
//! [`NotificationBridge`]; both are injected so hosts (and tests) can supply
//! their own.

use image::DynamicImage;
use std::io::Read;

use crate::error::ThemeError;

pub mod flags;
mod host;
mod source;

pub use flags::ConfigChangeFlags;
pub use host::CommandBridge;
pub use source::LocalFileSource;

/// Byte stream of a theme package.
pub type SourceStream = Box<dyn Read + Send>;

/// Resolves a caller-supplied theme reference to a readable stream.
pub trait ThemeSource: Send + Sync {
    fn open(&self, uri: &str) -> Result<SourceStream, ThemeError>;
}

/// Signals the rest of the platform. Failures are logged by the worker and
/// otherwise ignored.
pub trait NotificationBridge: Send + Sync {
    /// Push `flags` into host-wide configuration and propagate the change.
    fn notify_config_changed(&self, flags: ConfigChangeFlags) -> Result<(), ThemeError>;

    /// Force-restart the process owning `package`.
    fn restart_process(&self, package: &str) -> Result<(), ThemeError>;

    /// Install `image` as the system wallpaper.
    fn set_system_wallpaper(&self, image: &DynamicImage) -> Result<(), ThemeError>;
}
