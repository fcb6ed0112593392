//! On-disk theme state.
//!
//! The store owns the theme root, the customized-icons directory and the
//! staged boot animation. Only the worker mutates it; every operation is
//! best effort and reports failures instead of raising them.

use std::fs;
use std::io;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::error::ThemeError;

pub mod layout;

pub use layout::ThemeLayout;

/// Which store-owned directory to query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeDir {
    Theme,
    Icons,
}

/// Outcome of a best-effort delete walk.
#[derive(Debug, Default)]
pub struct ClearReport {
    /// Entries that were deleted.
    pub removed: usize,
    /// Deletions that failed; the walk continued past each one.
    pub failures: Vec<ThemeError>,
}

impl ClearReport {
    fn merge(&mut self, other: ClearReport) {
        self.removed += other.removed;
        self.failures.extend(other.failures);
    }
}

#[derive(Debug, Clone)]
pub struct ThemeStore {
    layout: ThemeLayout,
    dir_mode: u32,
}

impl ThemeStore {
    /// `dir_mode` is applied to the theme and icons directories on creation.
    pub fn new(layout: ThemeLayout, dir_mode: u32) -> Self {
        Self { layout, dir_mode }
    }

    pub fn layout(&self) -> &ThemeLayout {
        &self.layout
    }

    /// Create the theme and icons directories when absent.
    ///
    /// Single-level creation only; failures are logged and left for the next
    /// start to retry.
    pub fn ensure_layout(&self) {
        for (label, dir) in [
            ("theme", self.layout.theme_dir()),
            ("icons", self.layout.icons_dir()),
        ] {
            if dir.exists() {
                continue;
            }
            info!(path = %dir.display(), "creating {label} directory");
            if let Err(err) = create_dir_with_mode(dir, self.dir_mode) {
                warn!(path = %dir.display(), error = %err, "failed to create {label} directory");
            }
        }
    }

    pub fn exists(&self, which: ThemeDir) -> bool {
        match which {
            ThemeDir::Theme => self.layout.theme_dir().exists(),
            ThemeDir::Icons => self.layout.icons_dir().exists(),
        }
    }

    /// Remove the installed theme: contents of the theme and icons
    /// directories plus the staged boot animation.
    ///
    /// The two directories themselves are kept.
    pub fn clear(&self) -> ClearReport {
        let mut report = ClearReport::default();
        report.merge(remove_contents(self.layout.theme_dir()));
        report.merge(self.clear_icons());

        let staged = self.layout.staged_boot_animation();
        if fs::symlink_metadata(staged).is_ok() {
            report.merge(remove_tree(staged));
        }
        debug!(
            removed = report.removed,
            failed = report.failures.len(),
            "cleared theme state"
        );
        report
    }

    /// Remove every entry under the customized-icons directory.
    pub fn clear_icons(&self) -> ClearReport {
        remove_contents(self.layout.icons_dir())
    }
}

pub(crate) fn create_dir_with_mode(dir: &Path, mode: u32) -> io::Result<()> {
    fs::create_dir(dir)?;
    // Explicit chmod so the process umask cannot narrow the mode.
    fs::set_permissions(dir, fs::Permissions::from_mode(mode))
}

fn remove_contents(dir: &Path) -> ClearReport {
    let mut report = ClearReport::default();
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return report,
        Err(err) => {
            warn!(path = %dir.display(), error = %err, "unable to list directory");
            report.failures.push(ThemeError::filesystem("list", dir, err));
            return report;
        }
    };
    for entry in entries {
        match entry {
            Ok(entry) => report.merge(remove_tree(&entry.path())),
            Err(err) => {
                warn!(path = %dir.display(), error = %err, "unable to read directory entry");
                report.failures.push(ThemeError::filesystem("list", dir, err));
            }
        }
    }
    report
}

/// Depth-first delete: children before their parent. Symlinks are removed,
/// never followed.
fn remove_tree(path: &Path) -> ClearReport {
    let mut report = ClearReport::default();
    let is_dir = fs::symlink_metadata(path)
        .map(|meta| meta.file_type().is_dir())
        .unwrap_or(false);

    let result = if is_dir {
        report.merge(remove_contents(path));
        fs::remove_dir(path)
    } else {
        fs::remove_file(path)
    };

    match result {
        Ok(()) => report.removed += 1,
        Err(err) => {
            warn!(path = %path.display(), error = %err, "unable to delete");
            report.failures.push(ThemeError::filesystem("delete", path, err));
        }
    }
    report
}
