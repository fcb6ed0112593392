//! Hook-command host adapter.

use image::{DynamicImage, ImageFormat};
use std::path::PathBuf;
use std::process::{Command, Stdio};
use tracing::{debug, info};

use super::{ConfigChangeFlags, NotificationBridge};
use crate::config::HostConfig;
use crate::error::ThemeError;

/// Bridges to the host by running configured hook commands.
///
/// Hooks left unset turn the matching capability into a logged no-op, which
/// is what a host without that facility gets.
#[derive(Debug, Clone, Default)]
pub struct CommandBridge {
    notify_command: Option<Vec<String>>,
    restart_command: Option<Vec<String>>,
    wallpaper_path: Option<PathBuf>,
    wallpaper_command: Option<Vec<String>>,
}

impl CommandBridge {
    pub fn from_config(host: &HostConfig) -> Self {
        Self {
            notify_command: host.notify_command.clone(),
            restart_command: host.restart_command.clone(),
            wallpaper_path: host.wallpaper_path.clone(),
            wallpaper_command: host.wallpaper_command.clone(),
        }
    }
}

impl NotificationBridge for CommandBridge {
    fn notify_config_changed(&self, flags: ConfigChangeFlags) -> Result<(), ThemeError> {
        let Some(argv) = &self.notify_command else {
            info!(%flags, "theme configuration changed");
            return Ok(());
        };
        run_hook(argv, &format!("{:#x}", flags.bits()))
    }

    fn restart_process(&self, package: &str) -> Result<(), ThemeError> {
        let Some(argv) = &self.restart_command else {
            info!(package, "restart requested (no restart hook configured)");
            return Ok(());
        };
        run_hook(argv, package)
    }

    fn set_system_wallpaper(&self, image: &DynamicImage) -> Result<(), ThemeError> {
        let Some(path) = &self.wallpaper_path else {
            debug!(
                width = image.width(),
                height = image.height(),
                "wallpaper decoded (no wallpaper path configured)"
            );
            return Ok(());
        };
        image
            .save_with_format(path, ImageFormat::Png)
            .map_err(|e| ThemeError::NotifyFailure(format!("write wallpaper: {e}")))?;
        info!(path = %path.display(), "wallpaper written");
        match &self.wallpaper_command {
            Some(argv) => run_hook(argv, &path.display().to_string()),
            None => Ok(()),
        }
    }
}

fn run_hook(argv: &[String], argument: &str) -> Result<(), ThemeError> {
    let Some((program, args)) = argv.split_first() else {
        return Err(ThemeError::NotifyFailure("empty hook command".into()));
    };
    let status = Command::new(program)
        .args(args)
        .arg(argument)
        .stdin(Stdio::null())
        .status()
        .map_err(|e| ThemeError::NotifyFailure(format!("{program}: {e}")))?;
    if status.success() {
        Ok(())
    } else {
        Err(ThemeError::NotifyFailure(format!(
            "{program} exited with {status}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testsupport::TestTempDir;
    use image::RgbImage;

    #[test]
    fn unconfigured_hooks_are_no_ops() {
        let bridge = CommandBridge::default();
        assert!(bridge
            .notify_config_changed(ConfigChangeFlags::SYSTEM_INTEREST)
            .is_ok());
        assert!(bridge.restart_process("com.android.launcher").is_ok());
        let image = DynamicImage::ImageRgb8(RgbImage::new(2, 2));
        assert!(bridge.set_system_wallpaper(&image).is_ok());
    }

    #[test]
    fn hook_exit_status_maps_to_notify_failure() {
        let ok = CommandBridge {
            notify_command: Some(vec!["true".into()]),
            ..CommandBridge::default()
        };
        assert!(ok.notify_config_changed(ConfigChangeFlags::ICON).is_ok());

        let failing = CommandBridge {
            restart_command: Some(vec!["false".into()]),
            ..CommandBridge::default()
        };
        let err = failing.restart_process("com.android.launcher").unwrap_err();
        assert!(matches!(err, ThemeError::NotifyFailure(_)), "got: {err}");
    }

    #[test]
    fn wallpaper_is_written_as_png() {
        let tmp = TestTempDir::new("bridge-wallpaper");
        let bridge = CommandBridge {
            wallpaper_path: Some(tmp.child("wallpaper.png")),
            ..CommandBridge::default()
        };
        let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(3, 2, image::Rgb([10, 20, 30])));

        bridge.set_system_wallpaper(&image).expect("write");

        let written = image::open(tmp.child("wallpaper.png")).expect("decode");
        assert_eq!((written.width(), written.height()), (3, 2));
    }
}
