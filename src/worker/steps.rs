//! Per-request step sequences.
//!
//! Everything here is blocking filesystem and process work. The worker runs
//! one [`handle_request`] at a time on the blocking pool.

use std::path::Path;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use super::schema::{ThemeRequest, ThemeSection};
use crate::archive::ArchiveInstaller;
use crate::bridge::{
    CommandBridge, ConfigChangeFlags, LocalFileSource, NotificationBridge, ThemeSource,
};
use crate::config::Config;
use crate::error::ThemeError;
use crate::permissions::PermissionFixer;
use crate::privileged::{OwnerRole, PrivilegedCommand, PrivilegedExecutor};
use crate::store::{ThemeDir, ThemeLayout, ThemeStore};
use crate::wallpaper::install_wallpaper;

/// Everything a request needs to touch.
pub struct ThemeContext {
    pub store: ThemeStore,
    pub installer: ArchiveInstaller,
    pub fixer: PermissionFixer,
    pub source: Arc<dyn ThemeSource>,
    pub bridge: Arc<dyn NotificationBridge>,
    pub launcher_package: String,
}

impl ThemeContext {
    /// Wire the production collaborators described by `config`.
    pub fn from_config(config: &Config) -> Self {
        let permissions = &config.permissions;
        Self {
            store: ThemeStore::new(
                ThemeLayout::from_config(&config.paths),
                permissions.created_dir_mode(),
            ),
            installer: ArchiveInstaller::new(
                permissions.created_dir_mode(),
                permissions.extracted_file_read_bits(),
            ),
            fixer: PermissionFixer::new(
                PrivilegedExecutor::from_config(permissions),
                permissions.dir_mode,
                permissions.file_mode,
            ),
            source: Arc::new(LocalFileSource),
            bridge: Arc::new(CommandBridge::from_config(&config.host)),
            launcher_package: config.host.launcher_package.clone(),
        }
    }

    fn layout(&self) -> &ThemeLayout {
        self.store.layout()
    }
}

/// One failed step. The request carried on past it unless the step was
/// fatal to the request.
#[derive(Debug)]
pub struct StepFailure {
    pub step: &'static str,
    pub error: ThemeError,
}

#[derive(Debug, Default)]
pub struct RequestReport {
    pub failures: Vec<StepFailure>,
}

impl RequestReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    fn record(&mut self, step: &'static str, error: ThemeError) {
        warn!(step, error = %error, "theme step failed");
        self.failures.push(StepFailure { step, error });
    }

    fn absorb(&mut self, step: &'static str, errors: Vec<ThemeError>) {
        for error in errors {
            self.record(step, error);
        }
    }
}

/// Run every step of `request`.
pub fn handle_request(ctx: &ThemeContext, request: &ThemeRequest) -> RequestReport {
    let mut report = RequestReport::default();
    match request {
        ThemeRequest::ApplyFromSource { uri } => apply_from_source(ctx, uri, &mut report),
        ThemeRequest::ApplyCurrent => {
            repair(ctx, ctx.layout().theme_dir(), &mut report);
            stage_boot_animation(ctx, &mut report);
            notify(ctx, ConfigChangeFlags::SYSTEM_INTEREST, &mut report);
            wallpaper(ctx, &mut report);
        }
        ThemeRequest::RemoveTheme => clear(ctx, &mut report),
        ThemeRequest::RemoveThenApplyCurrent => {
            clear(ctx, &mut report);
            notify(ctx, ConfigChangeFlags::SYSTEM_INTEREST, &mut report);
        }
        ThemeRequest::ApplySection { section } => apply_section(ctx, *section, &mut report),
    }
    report
}

fn apply_from_source(ctx: &ThemeContext, uri: &str, report: &mut RequestReport) {
    if uri.is_empty() {
        info!("empty theme uri, ignoring request");
        return;
    }
    clear(ctx, report);

    let stream = match ctx.source.open(uri) {
        Ok(stream) => stream,
        Err(err) => {
            error!(uri, error = %err, "cannot open theme package, abandoning apply");
            report.record("open source", err);
            return;
        }
    };
    if let Err(err) = ctx.installer.extract_to(stream, ctx.layout().theme_dir()) {
        error!(uri, error = %err, "theme extraction failed, abandoning apply");
        report.record("extract", err);
        return;
    }

    let restarted = notify(ctx, ConfigChangeFlags::SYSTEM_INTEREST, report);
    if !restarted {
        restart_launcher(ctx, report);
    }
    info!(uri, "theme applied");
}

fn apply_section(ctx: &ThemeContext, section: ThemeSection, report: &mut RequestReport) {
    let layout = ctx.layout();
    match section {
        ThemeSection::Icons => {
            repair(ctx, &layout.theme_icons_dir(), report);
            if ctx.store.exists(ThemeDir::Icons) {
                report.absorb("clear icons", ctx.store.clear_icons().failures);
            }
            notify(ctx, ConfigChangeFlags::ICON, report);
        }
        ThemeSection::Wallpaper => wallpaper(ctx, report),
        ThemeSection::SystemUi => {
            repair(ctx, &layout.systemui_dir(), report);
            notify(ctx, ConfigChangeFlags::STATUS_BAR, report);
        }
        // Framework resources ship inside the system UI package directory.
        ThemeSection::Framework => {
            repair(ctx, &layout.systemui_dir(), report);
            notify(ctx, ConfigChangeFlags::SYSTEM_INTEREST, report);
        }
        ThemeSection::Ringtones | ThemeSection::Lockscreen => {
            info!(%section, "section has no apply steps");
        }
        ThemeSection::BootAnimation => stage_boot_animation(ctx, report),
        ThemeSection::Mms => {
            repair(ctx, &layout.mms_dir(), report);
            notify(ctx, ConfigChangeFlags::MMS, report);
        }
    }
}

fn clear(ctx: &ThemeContext, report: &mut RequestReport) {
    let cleared = ctx.store.clear();
    info!(removed = cleared.removed, "removed installed theme");
    report.absorb("clear", cleared.failures);
}

fn repair(ctx: &ThemeContext, path: &Path, report: &mut RequestReport) {
    report.absorb("repair permissions", ctx.fixer.repair(path).failures);
}

/// Copy the theme's boot animation to the staged location and hand it to
/// the service identity. The staging directory is root-owned except for the
/// duration of the copy.
fn stage_boot_animation(ctx: &ThemeContext, report: &mut RequestReport) {
    let layout = ctx.layout();
    let source = layout.boot_animation();
    if !source.is_file() {
        debug!(path = %source.display(), "theme has no boot animation");
        return;
    }
    repair(ctx, &source, report);

    let staged = layout.staged_boot_animation();
    let staging_dir = layout.boot_animation_staging_dir();
    let executor = ctx.fixer.executor();
    let mut run = |command: PrivilegedCommand| {
        if let Err(err) = executor.run(&command) {
            report.record("stage boot animation", err);
        }
    };
    if let Some(dir) = staging_dir {
        run(PrivilegedCommand::SetOwner {
            path: dir.to_path_buf(),
            owner: OwnerRole::Service,
        });
    }
    run(PrivilegedCommand::Copy {
        from: source,
        to: staged.to_path_buf(),
    });
    if let Some(dir) = staging_dir {
        run(PrivilegedCommand::SetOwner {
            path: dir.to_path_buf(),
            owner: OwnerRole::Root,
        });
    }
    repair(ctx, staged, report);
    info!(path = %staged.display(), "boot animation staged");
}

fn wallpaper(ctx: &ThemeContext, report: &mut RequestReport) {
    if let Err(err) = install_wallpaper(ctx.layout(), ctx.bridge.as_ref()) {
        report.record("install wallpaper", err);
    }
}

/// Push `flags` to the host. Returns whether a launcher restart was
/// attempted as part of it.
fn notify(ctx: &ThemeContext, flags: ConfigChangeFlags, report: &mut RequestReport) -> bool {
    if let Err(err) = ctx.bridge.notify_config_changed(flags) {
        report.record("notify", err);
        return false;
    }
    debug!(%flags, "host notified");
    if !flags.restarts_launcher() {
        return false;
    }
    restart_launcher(ctx, report);
    true
}

fn restart_launcher(ctx: &ThemeContext, report: &mut RequestReport) {
    match ctx.bridge.restart_process(&ctx.launcher_package) {
        Ok(()) => debug!(package = %ctx.launcher_package, "launcher restarted"),
        Err(err) => report.record("restart launcher", err),
    }
}
