//! Fixed on-disk layout of the theme state.

use std::path::{Path, PathBuf};

use crate::config::PathsConfig;

const WALLPAPER_SUBDIR: &str = "wallpaper";
const ICONS_SUBDIR: &str = "icons";
const BOOT_ANIMATION_SUBPATH: &str = "boots/bootanimation.zip";
const SYSTEMUI_SUBDIR: &str = "com.android.systemui";
const MMS_SUBDIR: &str = "com.android.mms";

/// Wallpaper asset candidates, in lookup order.
const WALLPAPER_ASSETS: [&str; 2] = ["default_wallpaper.jpg", "default_wallpaper.png"];

/// Resolved paths of the theme root, its sibling icons directory and the
/// staged boot animation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemeLayout {
    theme_dir: PathBuf,
    icons_dir: PathBuf,
    staged_boot_animation: PathBuf,
}

impl ThemeLayout {
    pub fn new(
        theme_dir: impl Into<PathBuf>,
        icons_dir: impl Into<PathBuf>,
        staged_boot_animation: impl Into<PathBuf>,
    ) -> Self {
        Self {
            theme_dir: theme_dir.into(),
            icons_dir: icons_dir.into(),
            staged_boot_animation: staged_boot_animation.into(),
        }
    }

    pub fn from_config(paths: &PathsConfig) -> Self {
        Self::new(
            &paths.theme_dir,
            &paths.icons_dir,
            &paths.staged_boot_animation,
        )
    }

    pub fn theme_dir(&self) -> &Path {
        &self.theme_dir
    }

    /// Customized-icons directory (outside the theme root).
    pub fn icons_dir(&self) -> &Path {
        &self.icons_dir
    }

    pub fn staged_boot_animation(&self) -> &Path {
        &self.staged_boot_animation
    }

    /// Directory holding the staged boot animation.
    pub fn boot_animation_staging_dir(&self) -> Option<&Path> {
        self.staged_boot_animation.parent()
    }

    pub fn wallpaper_dir(&self) -> PathBuf {
        self.theme_dir.join(WALLPAPER_SUBDIR)
    }

    /// `icons/` inside the theme root, not the customized-icons directory.
    pub fn theme_icons_dir(&self) -> PathBuf {
        self.theme_dir.join(ICONS_SUBDIR)
    }

    pub fn boot_animation(&self) -> PathBuf {
        self.theme_dir.join(BOOT_ANIMATION_SUBPATH)
    }

    pub fn systemui_dir(&self) -> PathBuf {
        self.theme_dir.join(SYSTEMUI_SUBDIR)
    }

    pub fn mms_dir(&self) -> PathBuf {
        self.theme_dir.join(MMS_SUBDIR)
    }

    /// First wallpaper asset present on disk (JPEG before PNG).
    pub fn find_wallpaper_asset(&self) -> Option<PathBuf> {
        let dir = self.wallpaper_dir();
        WALLPAPER_ASSETS
            .iter()
            .map(|name| dir.join(name))
            .find(|candidate| candidate.is_file())
    }
}
