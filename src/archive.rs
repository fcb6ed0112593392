//! Theme archive installer.
//!
//! The package stream is spooled to an anonymous temp file so the central
//! directory can be read, which also covers entries whose sizes only follow
//! the data in a data descriptor. Entries are then extracted in archive
//! order; nothing is reordered. An archive must list every directory before
//! the entries it contains. A file whose parent directory has not been
//! created yet aborts the extraction at that entry, and everything written
//! before it stays on disk.
//!
//! Entry names are joined under the destination root as-is. `..` components
//! are not rejected, so callers that accept untrusted archives must vet the
//! names before they get here.

use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Read, Seek, SeekFrom, Write};
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use zip::ZipArchive;

use crate::error::ThemeError;

/// Counts of what one extraction wrote.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ExtractSummary {
    pub directories: usize,
    pub files: usize,
    pub bytes: u64,
}

#[derive(Debug, Clone, Copy)]
pub struct ArchiveInstaller {
    dir_mode: u32,
    file_read_bits: u32,
}

impl ArchiveInstaller {
    /// `dir_mode` is set on every created directory; `file_read_bits` are
    /// added to every written file.
    pub fn new(dir_mode: u32, file_read_bits: u32) -> Self {
        Self {
            dir_mode,
            file_read_bits,
        }
    }

    /// Unpack a zip stream under `destination`.
    pub fn extract_to<R: Read>(
        &self,
        source: R,
        destination: &Path,
    ) -> Result<ExtractSummary, ThemeError> {
        let spooled = spool(source).map_err(|e| archive_failure(e.to_string()))?;
        let mut archive =
            ZipArchive::new(BufReader::new(spooled)).map_err(|e| archive_failure(e.to_string()))?;
        let mut summary = ExtractSummary::default();

        for index in 0..archive.len() {
            let mut entry = archive
                .by_index(index)
                .map_err(|err| ThemeError::ExtractionFailure {
                    entry: format!("entry #{}", index + 1),
                    reason: err.to_string(),
                })?;
            let name = entry.name().to_string();
            let target = entry_target(destination, &name);

            if entry.is_dir() {
                debug!(path = %target.display(), "creating directory");
                self.create_directory(&target)
                    .map_err(|e| extraction_failure(&name, e))?;
                summary.directories += 1;
                continue;
            }

            debug!(path = %target.display(), "creating file");
            let written = self
                .write_file(&mut entry, &target)
                .map_err(|e| extraction_failure(&name, e))?;
            summary.files += 1;
            summary.bytes += written;
        }

        info!(
            destination = %destination.display(),
            directories = summary.directories,
            files = summary.files,
            bytes = summary.bytes,
            "archive extracted"
        );
        Ok(summary)
    }

    fn create_directory(&self, target: &Path) -> io::Result<()> {
        match fs::create_dir(target) {
            Ok(()) => {}
            Err(err) if err.kind() == io::ErrorKind::AlreadyExists && target.is_dir() => {}
            Err(err) => return Err(err),
        }
        fs::set_permissions(target, fs::Permissions::from_mode(self.dir_mode))
    }

    fn write_file(&self, entry: &mut impl Read, target: &Path) -> io::Result<u64> {
        let mut out = BufWriter::new(File::create(target)?);
        let written = io::copy(entry, &mut out)?;
        out.flush()?;
        drop(out);

        let mut permissions = fs::metadata(target)?.permissions();
        permissions.set_mode(permissions.mode() | self.file_read_bits);
        fs::set_permissions(target, permissions)?;
        Ok(written)
    }
}

/// Join an entry name under the root. A leading `/` stays under the root
/// rather than replacing it.
fn entry_target(destination: &Path, name: &str) -> PathBuf {
    destination.join(name.trim_start_matches('/'))
}

fn extraction_failure(entry: &str, err: io::Error) -> ThemeError {
    ThemeError::ExtractionFailure {
        entry: entry.to_string(),
        reason: err.to_string(),
    }
}

/// The package as a whole could not be read.
fn archive_failure(reason: String) -> ThemeError {
    ThemeError::ExtractionFailure {
        entry: "archive".to_string(),
        reason,
    }
}

fn spool(mut source: impl Read) -> io::Result<File> {
    let mut file = tempfile::tempfile()?;
    io::copy(&mut source, &mut file)?;
    file.seek(SeekFrom::Start(0))?;
    Ok(file)
}
