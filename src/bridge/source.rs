//! Local theme package source.

use std::fs::File;
use std::path::PathBuf;
use url::Url;

use super::{SourceStream, ThemeSource};
use crate::error::ThemeError;

/// Opens `file://` URLs and plain filesystem paths.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFileSource;

impl LocalFileSource {
    /// Map a theme reference to a local path.
    pub fn resolve(uri: &str) -> Result<PathBuf, ThemeError> {
        let unavailable = |reason: &str| ThemeError::SourceUnavailable {
            uri: uri.to_string(),
            reason: reason.to_string(),
        };
        match Url::parse(uri) {
            Ok(url) if url.scheme() == "file" => url
                .to_file_path()
                .map_err(|()| unavailable("not a local file URL")),
            // Single-letter "schemes" are drive letters, not URLs.
            Ok(url) if url.scheme().len() > 1 => {
                Err(unavailable(&format!("unsupported scheme `{}`", url.scheme())))
            }
            _ => Ok(PathBuf::from(uri)),
        }
    }
}

impl ThemeSource for LocalFileSource {
    fn open(&self, uri: &str) -> Result<SourceStream, ThemeError> {
        let path = Self::resolve(uri)?;
        let file = File::open(&path).map_err(|e| ThemeError::SourceUnavailable {
            uri: uri.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Box::new(file))
    }
}
