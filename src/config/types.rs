//! Configuration data model.
//!
//! Struct/enum definitions plus default values. Loading, environment
//! overrides and validation live in `config::loader`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::defaults::{
    DEFAULT_DIR_MODE, DEFAULT_FILE_MODE, DEFAULT_HELPER_COMMAND, DEFAULT_ICONS_DIR,
    DEFAULT_LAUNCHER_PACKAGE, DEFAULT_ROOT_OWNER, DEFAULT_SERVICE_GID, DEFAULT_SERVICE_OWNER,
    DEFAULT_SERVICE_UID, DEFAULT_STAGED_BOOT_ANIMATION, DEFAULT_THEME_DIR,
};

/// How privileged ownership/mode changes are carried out.
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PrivilegeBackendKind {
    /// Spawn the configured elevation helper once per command.
    #[default]
    Helper,
    /// Call `chown`/`chmod`/`copy` directly; the process must already hold
    /// the rights it needs.
    Direct,
}

/// Top-level service configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub paths: PathsConfig,
    pub permissions: PermissionsConfig,
    pub host: HostConfig,
}

/// Roots of the on-disk theme state.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct PathsConfig {
    pub theme_dir: PathBuf,
    pub icons_dir: PathBuf,
    pub staged_boot_animation: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            theme_dir: DEFAULT_THEME_DIR.into(),
            icons_dir: DEFAULT_ICONS_DIR.into(),
            staged_boot_animation: DEFAULT_STAGED_BOOT_ANIMATION.into(),
        }
    }
}

/// Ownership and mode policy for created and repaired paths.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct PermissionsConfig {
    /// Grant the world bits alongside owner and group on created entries.
    pub world_accessible: bool,
    pub dir_mode: u32,
    pub file_mode: u32,
    pub backend: PrivilegeBackendKind,
    pub helper_command: Vec<String>,
    pub service_owner: String,
    pub root_owner: String,
    pub service_uid: u32,
    pub service_gid: u32,
}

impl Default for PermissionsConfig {
    fn default() -> Self {
        Self {
            world_accessible: true,
            dir_mode: DEFAULT_DIR_MODE,
            file_mode: DEFAULT_FILE_MODE,
            backend: PrivilegeBackendKind::Helper,
            helper_command: DEFAULT_HELPER_COMMAND.iter().map(|s| s.to_string()).collect(),
            service_owner: DEFAULT_SERVICE_OWNER.into(),
            root_owner: DEFAULT_ROOT_OWNER.into(),
            service_uid: DEFAULT_SERVICE_UID,
            service_gid: DEFAULT_SERVICE_GID,
        }
    }
}

impl PermissionsConfig {
    /// Mode for directories the service creates itself.
    pub fn created_dir_mode(&self) -> u32 {
        if self.world_accessible {
            0o777
        } else {
            0o770
        }
    }

    /// Read bits added to files written during extraction.
    pub fn extracted_file_read_bits(&self) -> u32 {
        if self.world_accessible {
            0o444
        } else {
            0o440
        }
    }
}

/// Hooks into the host platform.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct HostConfig {
    pub launcher_package: String,
    /// Runs with the change flags appended as a hex argument.
    pub notify_command: Option<Vec<String>>,
    /// Runs with the package name appended.
    pub restart_command: Option<Vec<String>>,
    /// Decoded wallpapers are written here as PNG.
    pub wallpaper_path: Option<PathBuf>,
    /// Runs with `wallpaper_path` appended after each write.
    pub wallpaper_command: Option<Vec<String>>,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            launcher_package: DEFAULT_LAUNCHER_PACKAGE.into(),
            notify_command: None,
            restart_command: None,
            wallpaper_path: None,
            wallpaper_command: None,
        }
    }
}
