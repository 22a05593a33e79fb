//! Filesystem infrastructure: implements `ArtifactWriter`.

use std::fs::File;
use std::io::Write as _;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::application::ports::ArtifactWriter;

/// Production filesystem implementation of `ArtifactWriter`.
pub struct LocalFs;

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(std::ffi::OsStr::to_os_string).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Create a fresh temp file, owner-only from the first byte when `private`.
///
/// A stale temp file left by an interrupted run is removed first.
pub(crate) fn create_temp(temp_path: &Path, private: bool) -> Result<File> {
    match std::fs::remove_file(temp_path) {
        Ok(()) => tracing::debug!(path = %temp_path.display(), "removed stale temp file"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => {
            return Err(e)
                .with_context(|| format!("removing stale temp file {}", temp_path.display()));
        }
    }

    let mut options = std::fs::OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(if private { 0o600 } else { 0o644 });
    }
    #[cfg(not(unix))]
    let _ = private;

    options
        .open(temp_path)
        .with_context(|| format!("creating temp file {}", temp_path.display()))
}

/// Write `content` to `path` through `temp_path`, then rename into place.
pub(crate) fn write_via_temp(
    path: &Path,
    temp_path: &Path,
    content: &str,
    private: bool,
) -> Result<()> {
    let mut file = create_temp(temp_path, private)?;
    let written = file
        .write_all(content.as_bytes())
        .and_then(|()| file.sync_all())
        .with_context(|| format!("writing temp file {}", temp_path.display()));
    drop(file);
    if let Err(e) = written {
        let _ = std::fs::remove_file(temp_path);
        return Err(e);
    }

    std::fs::rename(temp_path, path).with_context(|| format!("finalizing {}", path.display()))
}

impl ArtifactWriter for LocalFs {
    fn write_atomic(&self, path: &Path, content: &str, private: bool) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating directory {}", parent.display()))?;
        }

        write_via_temp(path, &temp_path_for(path), content, private)?;
        tracing::debug!(path = %path.display(), private, "artifact written");
        Ok(())
    }
}
