//! Default configuration constants.
//!
//! The roots mirror the device layout the service was built for; the subpaths
//! under the theme root are fixed and live in [`crate::store::layout`].

/// Active theme root.
pub(super) const DEFAULT_THEME_DIR: &str = "/data/system/theme";
/// Customized-icons directory, sibling of the theme root.
pub(super) const DEFAULT_ICONS_DIR: &str = "/data/system/customized_icons";
/// Staged boot animation read by the boot animation player.
pub(super) const DEFAULT_STAGED_BOOT_ANIMATION: &str = "/data/local/bootanimation.zip";

/// Mode applied to directories by the permission fixer.
pub(super) const DEFAULT_DIR_MODE: u32 = 0o777;
/// Mode applied to files by the permission fixer.
pub(super) const DEFAULT_FILE_MODE: u32 = 0o666;

/// Elevation prefix prepended to every helper command.
pub(super) const DEFAULT_HELPER_COMMAND: [&str; 3] = ["invoke-as", "-u", "root"];
/// `owner.group` handed to the helper's `chown` for service-owned paths.
pub(super) const DEFAULT_SERVICE_OWNER: &str = "system.system";
/// `owner.group` restored on the boot animation staging directory.
pub(super) const DEFAULT_ROOT_OWNER: &str = "root.root";
/// Numeric ids of the service identity for the direct backend.
pub(super) const DEFAULT_SERVICE_UID: u32 = 1000;
pub(super) const DEFAULT_SERVICE_GID: u32 = 1000;

/// Package force-restarted after launcher/icon/framework changes.
pub(super) const DEFAULT_LAUNCHER_PACKAGE: &str = "com.android.launcher";

/// Template written by `themer config --template`.
pub(super) const DEFAULT_THEMER_CONFIG_TEMPLATE: &str = r#"# themer configuration

[paths]
theme_dir = "/data/system/theme"
icons_dir = "/data/system/customized_icons"
staged_boot_animation = "/data/local/bootanimation.zip"

[permissions]
world_accessible = true
dir_mode = 0o777
file_mode = 0o666
# "helper" spawns helper_command per path, "direct" uses chown/chmod syscalls.
backend = "helper"
helper_command = ["invoke-as", "-u", "root"]
service_owner = "system.system"
root_owner = "root.root"
service_uid = 1000
service_gid = 1000

[host]
launcher_package = "com.android.launcher"
# notify_command = ["am", "theme-changed"]
# restart_command = ["am", "force-stop"]
# wallpaper_path = "/data/system/users/0/wallpaper.png"
# wallpaper_command = ["wallpaper-reload"]
"#;
