//! Wallpaper section.

use image::{DynamicImage, ImageReader};
use std::path::Path;
use tracing::{debug, info};

use crate::bridge::NotificationBridge;
use crate::error::ThemeError;
use crate::store::ThemeLayout;

/// Decode the theme's default wallpaper and hand it to the host.
///
/// Returns `Ok(false)` when the theme carries no wallpaper or the asset does
/// not decode; only a bridge failure is an error.
pub fn install_wallpaper(
    layout: &ThemeLayout,
    bridge: &dyn NotificationBridge,
) -> Result<bool, ThemeError> {
    let Some(asset) = layout.find_wallpaper_asset() else {
        debug!(dir = %layout.wallpaper_dir().display(), "theme has no wallpaper");
        return Ok(false);
    };
    let image = match decode(&asset) {
        Ok(image) => image,
        Err(err) => {
            debug!(path = %asset.display(), error = %err, "wallpaper does not decode, skipping");
            return Ok(false);
        }
    };
    bridge.set_system_wallpaper(&image)?;
    info!(path = %asset.display(), "wallpaper installed");
    Ok(true)
}

/// The format is sniffed from the content; the extension is only a fallback.
fn decode(path: &Path) -> image::ImageResult<DynamicImage> {
    ImageReader::open(path)?.with_guessed_format()?.decode()
}
