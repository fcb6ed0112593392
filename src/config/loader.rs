//! Top-level config loading pipeline.
//!
//! Precedence (highest wins):
//! 1. `THEMER_*` environment variables
//! 2. TOML file given with `--config`
//! 3. `./themer.toml`
//! 4. `$XDG_CONFIG_HOME/themer/themer.toml` (or the platform equivalent)
//! 5. Built-in defaults

use std::path::{Path, PathBuf};

use crate::error::ConfigError;

use super::{Config, PrivilegeBackendKind};

/// Where the effective config text came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    Explicit(PathBuf),
    Local,
    Global(PathBuf),
    BuiltInDefaults,
}

/// Load configuration from disk and environment.
///
/// `path_override` is an explicit config file path (from `--config`).
pub fn load_config(path_override: Option<&str>) -> Result<Config, ConfigError> {
    Ok(load_config_with_source(path_override)?.0)
}

/// Load configuration and report which file supplied it.
pub fn load_config_with_source(
    path_override: Option<&str>,
) -> Result<(Config, ConfigSource), ConfigError> {
    load_config_from_sources(
        path_override,
        |path| std::fs::read_to_string(path),
        |name| std::env::var(name).ok(),
        dirs::config_dir,
    )
}

pub(super) fn load_config_from_sources<FRead, FEnv, FRoot>(
    path_override: Option<&str>,
    read_file: FRead,
    env_lookup: FEnv,
    config_root: FRoot,
) -> Result<(Config, ConfigSource), ConfigError>
where
    FRead: Fn(&Path) -> Result<String, std::io::Error>,
    FEnv: Fn(&str) -> Option<String>,
    FRoot: Fn() -> Option<PathBuf>,
{
    let (text, source) = read_config_text(path_override, &read_file, &config_root)?;
    let mut config: Config = toml::from_str(&text)?;
    apply_env_overrides(&mut config, &env_lookup)?;
    validate_config(&config)?;
    Ok((config, source))
}

fn read_config_text<FRead, FRoot>(
    path_override: Option<&str>,
    read_file: &FRead,
    config_root: &FRoot,
) -> Result<(String, ConfigSource), ConfigError>
where
    FRead: Fn(&Path) -> Result<String, std::io::Error>,
    FRoot: Fn() -> Option<PathBuf>,
{
    if let Some(p) = path_override {
        let path = PathBuf::from(p);
        let text = read_file(&path)?;
        return Ok((text, ConfigSource::Explicit(path)));
    }

    if let Ok(text) = read_file(Path::new("themer.toml")) {
        return Ok((text, ConfigSource::Local));
    }
    if let Some(dir) = config_root() {
        let global = dir.join("themer").join("themer.toml");
        if let Ok(text) = read_file(&global) {
            return Ok((text, ConfigSource::Global(global)));
        }
    }

    Ok((String::new(), ConfigSource::BuiltInDefaults))
}

fn apply_env_overrides<FEnv>(config: &mut Config, env_lookup: &FEnv) -> Result<(), ConfigError>
where
    FEnv: Fn(&str) -> Option<String>,
{
    let non_empty = |name: &str| env_lookup(name).filter(|value| !value.trim().is_empty());

    if let Some(dir) = non_empty("THEMER_THEME_DIR") {
        config.paths.theme_dir = dir.into();
    }
    if let Some(dir) = non_empty("THEMER_ICONS_DIR") {
        config.paths.icons_dir = dir.into();
    }
    if let Some(path) = non_empty("THEMER_BOOT_ANIMATION") {
        config.paths.staged_boot_animation = path.into();
    }
    if let Some(package) = non_empty("THEMER_LAUNCHER_PACKAGE") {
        config.host.launcher_package = package;
    }
    if let Some(backend) = non_empty("THEMER_PRIVILEGE_BACKEND") {
        config.permissions.backend = match backend.trim().to_ascii_lowercase().as_str() {
            "helper" => PrivilegeBackendKind::Helper,
            "direct" => PrivilegeBackendKind::Direct,
            other => {
                return Err(ConfigError::Invalid(format!(
                    "THEMER_PRIVILEGE_BACKEND must be `helper` or `direct`, got `{other}`"
                )))
            }
        };
    }
    Ok(())
}

/// Reject configurations the worker cannot act on.
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    for (name, path) in [
        ("paths.theme_dir", &config.paths.theme_dir),
        ("paths.icons_dir", &config.paths.icons_dir),
        ("paths.staged_boot_animation", &config.paths.staged_boot_animation),
    ] {
        if !path.is_absolute() {
            return Err(ConfigError::Invalid(format!(
                "{name} must be an absolute path, got `{}`",
                path.display()
            )));
        }
    }
    if config.paths.staged_boot_animation.parent().is_none() {
        return Err(ConfigError::Invalid(
            "paths.staged_boot_animation must name a file inside a directory".into(),
        ));
    }

    let perms = &config.permissions;
    for (name, mode) in [
        ("permissions.dir_mode", perms.dir_mode),
        ("permissions.file_mode", perms.file_mode),
    ] {
        if mode > 0o7777 {
            return Err(ConfigError::Invalid(format!(
                "{name} must fit in 0o7777, got {mode:#o}"
            )));
        }
    }
    if perms.backend == PrivilegeBackendKind::Helper
        && perms.helper_command.iter().all(|arg| arg.trim().is_empty())
    {
        return Err(ConfigError::Invalid(
            "permissions.helper_command must not be empty with the helper backend".into(),
        ));
    }

    let host = &config.host;
    if host.launcher_package.trim().is_empty() {
        return Err(ConfigError::Invalid(
            "host.launcher_package must not be empty".into(),
        ));
    }
    for (name, command) in [
        ("host.notify_command", &host.notify_command),
        ("host.restart_command", &host.restart_command),
        ("host.wallpaper_command", &host.wallpaper_command),
    ] {
        if command.as_ref().is_some_and(|argv| argv.is_empty()) {
            return Err(ConfigError::Invalid(format!(
                "{name} must name a program when set"
            )));
        }
    }
    Ok(())
}
