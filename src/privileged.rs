//! Privileged ownership/mode/copy calls.
//!
//! Every call goes through a [`PrivilegedExecutor`], which holds the lock that
//! serializes all elevated operations regardless of which component issued
//! them. Backends turn a typed [`PrivilegedCommand`] into either a helper
//! process invocation or direct syscalls.

use std::ffi::OsString;
use std::fmt;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::sync::{Arc, Mutex};
use tracing::debug;

use crate::config::{PermissionsConfig, PrivilegeBackendKind};
use crate::error::ThemeError;

/// Identity a path is handed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OwnerRole {
    /// The system identity the themed processes run as.
    Service,
    Root,
}

/// One elevated operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrivilegedCommand {
    SetOwner { path: PathBuf, owner: OwnerRole },
    SetMode { path: PathBuf, mode: u32 },
    Copy { from: PathBuf, to: PathBuf },
}

impl fmt::Display for PrivilegedCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SetOwner { path, owner } => {
                let owner = match owner {
                    OwnerRole::Service => "service",
                    OwnerRole::Root => "root",
                };
                write!(f, "chown {owner} {}", path.display())
            }
            Self::SetMode { path, mode } => write!(f, "chmod {mode:04o} {}", path.display()),
            Self::Copy { from, to } => write!(f, "cp {} {}", from.display(), to.display()),
        }
    }
}

/// Carries out privileged commands. Implementations are called with the
/// executor lock held.
pub trait PrivilegedBackend: Send + Sync {
    fn run(&self, command: &PrivilegedCommand) -> Result<(), ThemeError>;
}

/// Lock-serialized entry point for privileged calls.
#[derive(Clone)]
pub struct PrivilegedExecutor {
    backend: Arc<dyn PrivilegedBackend>,
    lock: Arc<Mutex<()>>,
}

impl fmt::Debug for PrivilegedExecutor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrivilegedExecutor").finish_non_exhaustive()
    }
}

impl PrivilegedExecutor {
    pub fn new(backend: Arc<dyn PrivilegedBackend>) -> Self {
        Self::with_lock(backend, Arc::new(Mutex::new(())))
    }

    /// Share an existing lock so unrelated executors still serialize against
    /// each other.
    pub fn with_lock(backend: Arc<dyn PrivilegedBackend>, lock: Arc<Mutex<()>>) -> Self {
        Self { backend, lock }
    }

    /// Build the backend selected by `permissions.backend`.
    pub fn from_config(permissions: &PermissionsConfig) -> Self {
        let backend: Arc<dyn PrivilegedBackend> = match permissions.backend {
            PrivilegeBackendKind::Helper => Arc::new(HelperBackend::from_config(permissions)),
            PrivilegeBackendKind::Direct => Arc::new(DirectBackend::from_config(permissions)),
        };
        Self::new(backend)
    }

    pub fn lock_handle(&self) -> Arc<Mutex<()>> {
        Arc::clone(&self.lock)
    }

    /// Run one command under the lock. Blocks until the backend returns.
    pub fn run(&self, command: &PrivilegedCommand) -> Result<(), ThemeError> {
        // A panicked holder leaves no state behind the unit value.
        let _guard = self.lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        debug!(%command, "privileged call");
        self.backend.run(command)
    }
}

// ---------------------------------------------------------------------------
// HelperBackend
// ---------------------------------------------------------------------------

/// Spawns the elevation helper (`invoke-as -u root ...`) once per command and
/// waits for it.
#[derive(Debug, Clone)]
pub struct HelperBackend {
    prefix: Vec<String>,
    service_owner: String,
    root_owner: String,
}

impl HelperBackend {
    pub fn new(
        prefix: Vec<String>,
        service_owner: impl Into<String>,
        root_owner: impl Into<String>,
    ) -> Self {
        Self {
            prefix,
            service_owner: service_owner.into(),
            root_owner: root_owner.into(),
        }
    }

    pub fn from_config(permissions: &PermissionsConfig) -> Self {
        Self::new(
            permissions.helper_command.clone(),
            &permissions.service_owner,
            &permissions.root_owner,
        )
    }

    /// Full argv for `command`, helper prefix included. Paths are passed
    /// through as raw OS strings.
    pub fn argv(&self, command: &PrivilegedCommand) -> Vec<OsString> {
        let mut argv: Vec<OsString> = self.prefix.iter().map(OsString::from).collect();
        match command {
            PrivilegedCommand::SetOwner { path, owner } => {
                let owner = match owner {
                    OwnerRole::Service => &self.service_owner,
                    OwnerRole::Root => &self.root_owner,
                };
                argv.extend([
                    OsString::from("chown"),
                    OsString::from(owner),
                    path.as_os_str().to_owned(),
                ]);
            }
            PrivilegedCommand::SetMode { path, mode } => {
                argv.extend([
                    OsString::from("chmod"),
                    OsString::from(format!("{mode:04o}")),
                    path.as_os_str().to_owned(),
                ]);
            }
            PrivilegedCommand::Copy { from, to } => {
                argv.extend([
                    OsString::from("cp"),
                    from.as_os_str().to_owned(),
                    to.as_os_str().to_owned(),
                ]);
            }
        }
        argv
    }
}

impl PrivilegedBackend for HelperBackend {
    fn run(&self, command: &PrivilegedCommand) -> Result<(), ThemeError> {
        let argv = self.argv(command);
        let failure = |reason: String| ThemeError::PrivilegedCallFailure {
            command: argv
                .iter()
                .map(|arg| arg.to_string_lossy())
                .collect::<Vec<_>>()
                .join(" "),
            reason,
        };
        let Some((program, args)) = argv.split_first() else {
            return Err(failure("empty helper command".into()));
        };
        let status = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map_err(|e| failure(format!("spawn: {e}")))?;
        if status.success() {
            Ok(())
        } else {
            Err(failure(format!("exited with {status}")))
        }
    }
}

// ---------------------------------------------------------------------------
// DirectBackend
// ---------------------------------------------------------------------------

/// Applies commands with direct syscalls. Needs a process that already holds
/// the rights (root or `CAP_CHOWN`/`CAP_FOWNER`).
#[derive(Debug, Clone, Copy)]
pub struct DirectBackend {
    service_uid: u32,
    service_gid: u32,
}

impl DirectBackend {
    pub fn new(service_uid: u32, service_gid: u32) -> Self {
        Self {
            service_uid,
            service_gid,
        }
    }

    pub fn from_config(permissions: &PermissionsConfig) -> Self {
        Self::new(permissions.service_uid, permissions.service_gid)
    }
}

impl PrivilegedBackend for DirectBackend {
    fn run(&self, command: &PrivilegedCommand) -> Result<(), ThemeError> {
        match command {
            PrivilegedCommand::SetOwner { path, owner } => {
                let (uid, gid) = match owner {
                    OwnerRole::Service => (self.service_uid, self.service_gid),
                    OwnerRole::Root => (0, 0),
                };
                std::os::unix::fs::lchown(path, Some(uid), Some(gid))
                    .map_err(|e| ThemeError::filesystem("chown", path, e))
            }
            PrivilegedCommand::SetMode { path, mode } => {
                fs::set_permissions(path, fs::Permissions::from_mode(*mode))
                    .map_err(|e| ThemeError::filesystem("chmod", path, e))
            }
            PrivilegedCommand::Copy { from, to } => fs::copy(from, to)
                .map(|_| ())
                .map_err(|e| ThemeError::filesystem("copy", from, e)),
        }
    }
}
