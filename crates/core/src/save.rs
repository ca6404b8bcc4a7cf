//! Idempotent writes of generated files.

use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{Error, Result};

/// What [`save`] did with a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// The file was created or replaced.
    Written,
    /// Existing content already matched; nothing was written.
    Unchanged,
}

/// File access used by [`save_with`].
pub trait FileSystem: Send + Sync {
    /// Whole file as UTF-8.
    fn read_to_string(&self, path: &Path) -> impl Future<Output = io::Result<String>> + Send;

    /// Create `path` and its missing parents.
    fn create_dir_all(&self, path: &Path) -> impl Future<Output = io::Result<()>> + Send;

    /// Replace the file's content.
    fn write(&self, path: &Path, contents: &str) -> impl Future<Output = io::Result<()>> + Send;
}

/// The real file system, through `tokio::fs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioFs;

impl FileSystem for TokioFs {
    async fn read_to_string(&self, path: &Path) -> io::Result<String> {
        tokio::fs::read_to_string(path).await
    }

    async fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        tokio::fs::create_dir_all(path).await
    }

    async fn write(&self, path: &Path, contents: &str) -> io::Result<()> {
        tokio::fs::write(path, contents).await
    }
}

/// Write `text` to `path` unless the file already holds exactly `text`.
pub async fn save(text: &str, path: impl AsRef<Path>) -> Result<SaveOutcome> {
    save_with(&TokioFs, text, path.as_ref()).await
}

/// [`save`] through `fs`, with `path` made absolute first.
pub async fn save_with<F: FileSystem>(fs: &F, text: &str, path: &Path) -> Result<SaveOutcome> {
    let path = std::path::absolute(path).map_err(|source| io_error(path, source))?;

    // A missing or unreadable file counts as different content.
    match fs.read_to_string(&path).await {
        Ok(existing) if existing == text => {
            debug!("{} is up to date", path.display());
            return Ok(SaveOutcome::Unchanged);
        }
        Ok(_) => {}
        Err(err) => debug!("Could not read {}: {err}", path.display()),
    }

    if let Some(parent) = path.parent() {
        fs.create_dir_all(parent)
            .await
            .map_err(|source| io_error(parent, source))?;
    }
    fs.write(&path, text)
        .await
        .map_err(|source| io_error(&path, source))?;

    info!("Wrote {}", path.display());
    Ok(SaveOutcome::Written)
}

fn io_error(path: &Path, source: io::Error) -> Error {
    Error::Io {
        path: PathBuf::from(path),
        source,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct MemoryFs {
        files: Mutex<HashMap<PathBuf, String>>,
        writes: AtomicUsize,
    }

    impl FileSystem for MemoryFs {
        async fn read_to_string(&self, path: &Path) -> io::Result<String> {
            self.files
                .lock()
                .unwrap()
                .get(path)
                .cloned()
                .ok_or_else(|| io::Error::from(io::ErrorKind::NotFound))
        }

        async fn create_dir_all(&self, _path: &Path) -> io::Result<()> {
            Ok(())
        }

        async fn write(&self, path: &Path, contents: &str) -> io::Result<()> {
            self.writes.fetch_add(1, Ordering::SeqCst);
            self.files
                .lock()
                .unwrap()
                .insert(path.to_path_buf(), contents.to_string());
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_missing_file_is_written() {
        let fs = MemoryFs::default();
        let outcome = save_with(&fs, "foo", Path::new("/foo/bar")).await.unwrap();
        assert_eq!(outcome, SaveOutcome::Written);
        assert_eq!(fs.read_to_string(Path::new("/foo/bar")).await.unwrap(), "foo");
    }

    #[tokio::test]
    async fn test_identical_content_is_written_once() {
        let fs = MemoryFs::default();
        let path = Path::new("/foo/bar");

        assert_eq!(save_with(&fs, "foo", path).await.unwrap(), SaveOutcome::Written);
        assert_eq!(save_with(&fs, "foo", path).await.unwrap(), SaveOutcome::Unchanged);
        assert_eq!(fs.writes.load(Ordering::SeqCst), 1);

        assert_eq!(save_with(&fs, "bar", path).await.unwrap(), SaveOutcome::Written);
        assert_eq!(fs.writes.load(Ordering::SeqCst), 2);
        assert_eq!(fs.read_to_string(path).await.unwrap(), "bar");
    }

    #[tokio::test]
    async fn test_save_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("src/types/api.ts");

        assert_eq!(save("export {};\n", &path).await.unwrap(), SaveOutcome::Written);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "export {};\n");
        assert_eq!(save("export {};\n", &path).await.unwrap(), SaveOutcome::Unchanged);
    }

    #[tokio::test]
    async fn test_write_failure_names_the_path() {
        let dir = tempfile::tempdir().unwrap();
        // A directory cannot be overwritten with file contents.
        let error = save("x", dir.path()).await.unwrap_err();
        assert!(matches!(error, Error::Io { .. }));
        assert!(error.to_string().contains(&dir.path().display().to_string()));
    }
}
