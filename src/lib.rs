//! Themer: a background service that installs and applies theme packages.
//!
//! Theme packages are zip archives of icons, wallpaper, UI skins and a boot
//! animation. Requests are serialized through one worker task which unpacks
//! the archive into the theme directory, hands the tree to the service
//! identity through privileged calls and tells the host what changed.
//!
//! # Quick start
//!
//! ```no_run
//! use themer::config::load_config;
//! use themer::service::ThemeService;
//! use themer::worker::ThemeContext;
//!
//! # async fn example() {
//! let config = load_config(None).unwrap();
//! let ctx = ThemeContext::from_config(&config);
//! ctx.store.ensure_layout();
//! let (service, _events) = ThemeService::start(ctx);
//! service.apply_theme("file:///sdcard/themes/dark.zip");
//! # }
//! ```

pub mod archive;
pub mod bridge;
pub mod build_info;
pub mod config;
pub mod error;
pub mod permissions;
pub mod privileged;
pub mod service;
pub mod store;
#[cfg(test)]
pub mod testsupport;
pub mod wallpaper;
pub mod worker;
