//! Configuration loading from TOML files and environment variables.
//!
//! See [`loader`] for the precedence order. Every field has a default, so an
//! empty file (or no file at all) yields the stock device layout.

mod defaults;
mod loader;
mod types;

pub use loader::{load_config, load_config_with_source, validate_config, ConfigSource};
pub use types::{Config, HostConfig, PathsConfig, PermissionsConfig, PrivilegeBackendKind};

/// Default `themer.toml` contents, printed by `themer config --template`.
pub fn default_config_template() -> &'static str {
    defaults::DEFAULT_THEMER_CONFIG_TEMPLATE
}
