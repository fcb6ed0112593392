//! Recursive ownership/mode repair for the unpacked theme tree.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::ThemeError;
use crate::privileged::{OwnerRole, PrivilegedCommand, PrivilegedExecutor};

/// Outcome of one [`PermissionFixer::repair`] walk.
#[derive(Debug, Default)]
pub struct RepairReport {
    /// Paths that were visited (directories and files).
    pub visited: usize,
    /// Calls that failed; repair continued past each one.
    pub failures: Vec<ThemeError>,
}

/// Hands a subtree to the service identity.
///
/// One privileged call per attribute per path, children before their parent.
#[derive(Debug, Clone)]
pub struct PermissionFixer {
    executor: PrivilegedExecutor,
    dir_mode: u32,
    file_mode: u32,
}

impl PermissionFixer {
    pub fn new(executor: PrivilegedExecutor, dir_mode: u32, file_mode: u32) -> Self {
        Self {
            executor,
            dir_mode,
            file_mode,
        }
    }

    pub fn executor(&self) -> &PrivilegedExecutor {
        &self.executor
    }

    /// Repair `path` and everything below it. Never fails; a missing path is
    /// a no-op.
    pub fn repair(&self, path: &Path) -> RepairReport {
        let mut report = RepairReport::default();
        if fs::symlink_metadata(path).is_err() {
            debug!(path = %path.display(), "nothing to repair");
            return report;
        }
        self.repair_entry(path, &mut report);
        debug!(
            path = %path.display(),
            visited = report.visited,
            failed = report.failures.len(),
            "repaired permissions"
        );
        report
    }

    fn repair_entry(&self, path: &Path, report: &mut RepairReport) {
        let file_type = fs::symlink_metadata(path).map(|meta| meta.file_type()).ok();
        let is_dir = file_type.is_some_and(|t| t.is_dir());
        let is_symlink = file_type.is_some_and(|t| t.is_symlink());

        if is_dir {
            match fs::read_dir(path) {
                Ok(entries) => {
                    let children = entries.map(|entry| entry.map(|entry| entry.path()));
                    self.repair_children(path, children, report);
                }
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "unable to list directory");
                    report.failures.push(ThemeError::filesystem("list", path, err));
                }
            }
        }

        report.visited += 1;
        let mut commands = vec![PrivilegedCommand::SetOwner {
            path: path.to_path_buf(),
            owner: OwnerRole::Service,
        }];
        // chmod on a symlink would land on its target.
        if !is_symlink {
            let mode = if is_dir { self.dir_mode } else { self.file_mode };
            commands.push(PrivilegedCommand::SetMode {
                path: path.to_path_buf(),
                mode,
            });
        }
        for command in &commands {
            if let Err(err) = self.executor.run(command) {
                warn!(error = %err, "permission repair step failed");
                report.failures.push(err);
            }
        }
    }

    /// An unreadable entry is recorded and its siblings are still repaired.
    fn repair_children(
        &self,
        dir: &Path,
        children: impl IntoIterator<Item = io::Result<PathBuf>>,
        report: &mut RepairReport,
    ) {
        for child in children {
            match child {
                Ok(child) => self.repair_entry(&child, report),
                Err(err) => {
                    warn!(path = %dir.display(), error = %err, "unable to read directory entry");
                    report.failures.push(ThemeError::filesystem("list", dir, err));
                }
            }
        }
    }
}
