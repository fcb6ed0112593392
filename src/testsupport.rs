//! Shared test fixtures for store/archive/worker test modules.
//!
//! Fakes for every collaborator seam live here so each test module can wire a
//! complete worker context against a temp directory without touching the
//! host.

use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use std::collections::HashMap;
use std::fs;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::archive::ArchiveInstaller;
use crate::bridge::{ConfigChangeFlags, NotificationBridge, SourceStream, ThemeSource};
use crate::error::ThemeError;
use crate::permissions::PermissionFixer;
use crate::privileged::{PrivilegedBackend, PrivilegedCommand, PrivilegedExecutor};
use crate::store::{ThemeLayout, ThemeStore};
use crate::worker::ThemeContext;

static TEST_DIR_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Launcher package used by [`theme_context`].
pub const LAUNCHER: &str = "com.android.launcher";

/// Temporary directory fixture with best-effort cleanup.
#[derive(Debug)]
pub struct TestTempDir {
    path: PathBuf,
}

impl TestTempDir {
    /// Create a unique temporary directory with a readable prefix.
    pub fn new(prefix: &str) -> Self {
        let suffix = TEST_DIR_COUNTER.fetch_add(1, Ordering::Relaxed);
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis();
        let dir = std::env::temp_dir().join(format!(
            "themer-{prefix}-{}-{millis}-{suffix}",
            std::process::id()
        ));
        fs::create_dir_all(&dir).expect("failed to create temporary fixture directory");
        Self { path: dir }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn child(&self, relative: &str) -> PathBuf {
        self.path.join(relative)
    }

    /// Write bytes to a child path, creating parent directories as needed.
    pub fn write_bytes(&self, relative: &str, content: &[u8]) -> PathBuf {
        let path = self.child(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("failed to create parent directories for fixture");
        }
        fs::write(&path, content).expect("failed to write fixture file");
        path
    }
}

impl Drop for TestTempDir {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.path);
    }
}

/// In-memory zip archive written in the order entries are added.
pub struct ArchiveBuilder {
    writer: ZipWriter<Cursor<Vec<u8>>>,
    options: SimpleFileOptions,
}

impl Default for ArchiveBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ArchiveBuilder {
    /// Stored (uncompressed) entries.
    pub fn new() -> Self {
        Self::with_method(CompressionMethod::Stored)
    }

    pub fn deflated() -> Self {
        Self::with_method(CompressionMethod::Deflated)
    }

    fn with_method(method: CompressionMethod) -> Self {
        Self {
            writer: ZipWriter::new(Cursor::new(Vec::new())),
            options: SimpleFileOptions::default().compression_method(method),
        }
    }

    pub fn dir(mut self, name: &str) -> Self {
        self.writer
            .add_directory(name, self.options)
            .expect("add directory entry");
        self
    }

    pub fn file(mut self, name: &str, content: &[u8]) -> Self {
        self.writer
            .start_file(name, self.options)
            .expect("start file entry");
        self.writer.write_all(content).expect("write file entry");
        self
    }

    pub fn build(self) -> Vec<u8> {
        self.writer.finish().expect("finish archive").into_inner()
    }
}

/// Stored zip laid out the way streaming writers emit it: general-purpose
/// bit 3 set, zero sizes and CRC in every local header, and the real values
/// in a trailing data descriptor. Names ending in `/` become directories.
pub fn streamed_archive(entries: &[(&str, &[u8])]) -> Vec<u8> {
    const FLAGS: u16 = 0x0008;
    const DOS_DATE: u16 = (1 << 5) | 1;

    let mut out = Vec::new();
    let mut central = Vec::new();
    for (name, content) in entries {
        let offset = out.len() as u32;
        let crc = crc32(content);
        let size = content.len() as u32;

        put_u32(&mut out, 0x0403_4b50);
        for field in [20, FLAGS, 0, 0, DOS_DATE] {
            put_u16(&mut out, field);
        }
        for field in [0, 0, 0] {
            put_u32(&mut out, field);
        }
        put_u16(&mut out, name.len() as u16);
        put_u16(&mut out, 0);
        out.extend_from_slice(name.as_bytes());
        out.extend_from_slice(content);
        for field in [0x0807_4b50, crc, size, size] {
            put_u32(&mut out, field);
        }

        put_u32(&mut central, 0x0201_4b50);
        for field in [20, 20, FLAGS, 0, 0, DOS_DATE] {
            put_u16(&mut central, field);
        }
        for field in [crc, size, size] {
            put_u32(&mut central, field);
        }
        for field in [name.len() as u16, 0, 0, 0, 0] {
            put_u16(&mut central, field);
        }
        put_u32(&mut central, if name.ends_with('/') { 0x10 } else { 0 });
        put_u32(&mut central, offset);
        central.extend_from_slice(name.as_bytes());
    }

    let central_offset = out.len() as u32;
    let central_size = central.len() as u32;
    out.extend_from_slice(&central);
    put_u32(&mut out, 0x0605_4b50);
    for field in [0, 0, entries.len() as u16, entries.len() as u16] {
        put_u16(&mut out, field);
    }
    put_u32(&mut out, central_size);
    put_u32(&mut out, central_offset);
    put_u16(&mut out, 0);
    out
}

fn put_u16(out: &mut Vec<u8>, value: u16) {
    out.extend_from_slice(&value.to_le_bytes());
}

fn put_u32(out: &mut Vec<u8>, value: u32) {
    out.extend_from_slice(&value.to_le_bytes());
}

fn crc32(data: &[u8]) -> u32 {
    let mut crc = !0u32;
    for &byte in data {
        crc ^= u32::from(byte);
        for _ in 0..8 {
            let mask = (crc & 1).wrapping_neg();
            crc = (crc >> 1) ^ (0xEDB8_8320 & mask);
        }
    }
    !crc
}

/// PNG-encoded solid image of the given size.
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([40, 90, 160])));
    let mut out = Cursor::new(Vec::new());
    image
        .write_to(&mut out, ImageFormat::Png)
        .expect("encode png");
    out.into_inner()
}

/// Privileged backend that records commands instead of running them.
#[derive(Default)]
pub struct RecordingBackend {
    commands: Mutex<Vec<PrivilegedCommand>>,
    delay: Option<Duration>,
    fail: bool,
    active: AtomicUsize,
    max_active: AtomicUsize,
}

impl RecordingBackend {
    /// Records every command, then fails it.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// Sleeps inside every call so overlapping callers would be observable.
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    pub fn commands(&self) -> Vec<PrivilegedCommand> {
        self.commands.lock().expect("commands lock").clone()
    }

    /// Highest number of calls that were inside the backend at once.
    pub fn max_concurrency(&self) -> usize {
        self.max_active.load(Ordering::SeqCst)
    }
}

impl PrivilegedBackend for RecordingBackend {
    fn run(&self, command: &PrivilegedCommand) -> Result<(), ThemeError> {
        let active = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active.fetch_max(active, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }
        self.commands
            .lock()
            .expect("commands lock")
            .push(command.clone());
        self.active.fetch_sub(1, Ordering::SeqCst);
        if self.fail {
            return Err(ThemeError::PrivilegedCallFailure {
                command: command.to_string(),
                reason: "recording backend set to fail".into(),
            });
        }
        Ok(())
    }
}

/// Host bridge that records every call.
#[derive(Default)]
pub struct RecordingBridge {
    notifications: Mutex<Vec<ConfigChangeFlags>>,
    restarts: Mutex<Vec<String>>,
    wallpapers: Mutex<Vec<(u32, u32)>>,
    fail: bool,
}

impl RecordingBridge {
    /// Records every call, then fails it.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn notifications(&self) -> Vec<ConfigChangeFlags> {
        self.notifications.lock().expect("bridge lock").clone()
    }

    pub fn restarts(&self) -> Vec<String> {
        self.restarts.lock().expect("bridge lock").clone()
    }

    /// Dimensions of each wallpaper handed over.
    pub fn wallpapers(&self) -> Vec<(u32, u32)> {
        self.wallpapers.lock().expect("bridge lock").clone()
    }

    fn outcome(&self, what: &str) -> Result<(), ThemeError> {
        if self.fail {
            Err(ThemeError::NotifyFailure(format!("{what} unavailable")))
        } else {
            Ok(())
        }
    }
}

impl NotificationBridge for RecordingBridge {
    fn notify_config_changed(&self, flags: ConfigChangeFlags) -> Result<(), ThemeError> {
        self.notifications.lock().expect("bridge lock").push(flags);
        self.outcome("config service")
    }

    fn restart_process(&self, package: &str) -> Result<(), ThemeError> {
        self.restarts
            .lock()
            .expect("bridge lock")
            .push(package.to_string());
        self.outcome("activity manager")
    }

    fn set_system_wallpaper(&self, image: &DynamicImage) -> Result<(), ThemeError> {
        self.wallpapers
            .lock()
            .expect("bridge lock")
            .push((image.width(), image.height()));
        self.outcome("wallpaper manager")
    }
}

/// Theme source serving archives from memory by uri.
#[derive(Default)]
pub struct MemorySource {
    packages: HashMap<String, Vec<u8>>,
}

impl MemorySource {
    pub fn with_package(mut self, uri: &str, archive: Vec<u8>) -> Self {
        self.packages.insert(uri.to_string(), archive);
        self
    }
}

impl ThemeSource for MemorySource {
    fn open(&self, uri: &str) -> Result<SourceStream, ThemeError> {
        match self.packages.get(uri) {
            Some(bytes) => Ok(Box::new(Cursor::new(bytes.clone()))),
            None => Err(ThemeError::SourceUnavailable {
                uri: uri.to_string(),
                reason: "no such package".into(),
            }),
        }
    }
}

/// A worker context over `tmp` plus handles to its recording fakes.
pub struct ContextFixture {
    pub ctx: ThemeContext,
    pub backend: Arc<RecordingBackend>,
    pub bridge: Arc<RecordingBridge>,
}

/// Layout: `theme/`, `icons/` (both created) and `local/bootanimation.zip`.
pub fn theme_context(tmp: &TestTempDir, source: MemorySource) -> ContextFixture {
    let backend = Arc::new(RecordingBackend::default());
    let bridge = Arc::new(RecordingBridge::default());
    let store = ThemeStore::new(
        ThemeLayout::new(
            tmp.child("theme"),
            tmp.child("icons"),
            tmp.child("local/bootanimation.zip"),
        ),
        0o777,
    );
    store.ensure_layout();
    let ctx = ThemeContext {
        store,
        installer: ArchiveInstaller::new(0o777, 0o444),
        fixer: PermissionFixer::new(PrivilegedExecutor::new(backend.clone()), 0o777, 0o666),
        source: Arc::new(source),
        bridge: bridge.clone(),
        launcher_package: LAUNCHER.to_string(),
    };
    ContextFixture {
        ctx,
        backend,
        bridge,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    #[test]
    fn temp_dir_fixture_writes_and_cleans_up() {
        let path = {
            let fixture = TestTempDir::new("fixture");
            let file = fixture.write_bytes("nested/file.bin", b"ok");
            assert_eq!(fs::read(file).unwrap(), b"ok");
            fixture.path().to_path_buf()
        };
        assert!(!path.exists());
    }

    #[test]
    fn archive_builder_preserves_entry_order() {
        let bytes = ArchiveBuilder::new()
            .dir("a/")
            .file("a/b.txt", b"b")
            .file("c.txt", b"c")
            .build();
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).expect("read back");
        assert_eq!(archive.len(), 3);
        assert_eq!(archive.by_index(0).unwrap().name(), "a/");
        assert_eq!(archive.by_index(2).unwrap().name(), "c.txt");
    }

    #[test]
    fn streamed_archive_carries_data_descriptors() {
        assert_eq!(crc32(b"123456789"), 0xCBF4_3926);

        let bytes = streamed_archive(&[("a/", &b""[..]), ("a/b.txt", &b"payload"[..])]);
        assert_eq!(&bytes[6..8], &[0x08, 0x00]);

        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).expect("read back");
        assert!(archive.by_index(0).unwrap().is_dir());
        let mut content = String::new();
        archive
            .by_index(1)
            .unwrap()
            .read_to_string(&mut content)
            .unwrap();
        assert_eq!(content, "payload");
    }
}
