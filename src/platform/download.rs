/// Saving exported files without prompting

use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::data_url::DataUrl;
use crate::{Error, Result};

/// Gives up after this many `name (n).ext` attempts
const MAX_DUPLICATES: u32 = 10_000;

/// Saves a data payload under a file name, returning where it went.
pub trait DownloadSink: Send + Sync {
    fn save(&self, filename: &str, data: &DataUrl) -> Result<PathBuf>;
}

/// Writes downloads into a fixed directory. Existing files are kept; a taken
/// name gets a ` (1)`, ` (2)`, ... suffix before the extension, as browsers
/// do for their default download location.
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Claim the first free name by creating it empty.
    fn reserve(&self, filename: &str) -> Result<PathBuf> {
        for n in 0..MAX_DUPLICATES {
            let path = self.dir.join(numbered(filename, n));
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(_) => return Ok(path),
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => continue,
                Err(e) => {
                    return Err(Error::DownloadError(format!(
                        "cannot create {}: {}",
                        path.display(),
                        e
                    )))
                }
            }
        }
        Err(Error::DownloadError(format!(
            "no free name for {} in {}",
            filename,
            self.dir.display()
        )))
    }
}

/// `name.ext` for 0, `name (n).ext` otherwise
fn numbered(filename: &str, n: u32) -> String {
    if n == 0 {
        return filename.to_string();
    }
    let path = Path::new(filename);
    match (path.file_stem(), path.extension()) {
        (Some(stem), Some(ext)) => {
            format!("{} ({}).{}", stem.to_string_lossy(), n, ext.to_string_lossy())
        }
        _ => format!("{} ({})", filename, n),
    }
}

/// Hidden sibling the payload is written to before it is renamed into place
fn partial_path(path: &Path) -> PathBuf {
    let name = path.file_name().unwrap_or_default().to_string_lossy();
    path.with_file_name(format!(".{}.part", name))
}

impl DownloadSink for DirectorySink {
    fn save(&self, filename: &str, data: &DataUrl) -> Result<PathBuf> {
        let bytes = data.decode()?;
        fs::create_dir_all(&self.dir).map_err(|e| {
            Error::DownloadError(format!("cannot create {}: {}", self.dir.display(), e))
        })?;

        let path = self.reserve(filename)?;
        let partial = partial_path(&path);
        if let Err(e) = fs::write(&partial, &bytes).and_then(|_| fs::rename(&partial, &path)) {
            let _ = fs::remove_file(&partial);
            let _ = fs::remove_file(&path);
            return Err(Error::DownloadError(format!(
                "cannot write {}: {}",
                path.display(),
                e
            )));
        }
        log::debug!("Saved {} ({})", path.display(), data.mime());
        Ok(path)
    }
}

/// A saved download kept in memory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedDownload {
    pub filename: String,
    pub data: DataUrl,
}

/// Records downloads instead of writing them; used by tests.
#[derive(Default)]
pub struct RecordingSink {
    saved: Mutex<Vec<RecordedDownload>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn downloads(&self) -> Vec<RecordedDownload> {
        self.saved.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl DownloadSink for RecordingSink {
    fn save(&self, filename: &str, data: &DataUrl) -> Result<PathBuf> {
        self.saved
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(RecordedDownload {
                filename: filename.to_string(),
                data: data.clone(),
            });
        Ok(PathBuf::from(filename))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directory_sink_writes_decoded_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let sink = DirectorySink::new(dir.path().join("nested"));
        let path = sink
            .save("out.png", &DataUrl::from_bytes("image/png", b"payload"))
            .unwrap();
        assert_eq!(path, dir.path().join("nested").join("out.png"));
        assert_eq!(fs::read(&path).unwrap(), b"payload");
    }

    #[test]
    fn directory_sink_keeps_earlier_downloads() {
        let dir = tempfile::tempdir().unwrap();
        let sink = DirectorySink::new(dir.path());
        let first = sink.save("a.png", &DataUrl::from_bytes("image/png", b"one")).unwrap();
        let second = sink.save("a.png", &DataUrl::from_bytes("image/png", b"two")).unwrap();
        assert_eq!(first, dir.path().join("a.png"));
        assert_eq!(second, dir.path().join("a (1).png"));
        assert_eq!(fs::read(first).unwrap(), b"one");
        assert_eq!(fs::read(second).unwrap(), b"two");
    }

    #[test]
    fn numbered_names_follow_browser_pattern() {
        assert_eq!(numbered("jelly.png", 0), "jelly.png");
        assert_eq!(numbered("jelly.png", 2), "jelly (2).png");
        assert_eq!(numbered("README", 1), "README (1)");
    }

    #[test]
    fn concurrent_saves_get_distinct_complete_files() {
        let dir = tempfile::tempdir().unwrap();
        let sink = std::sync::Arc::new(DirectorySink::new(dir.path()));
        let workers: Vec<_> = (0..8u8)
            .map(|i| {
                let sink = sink.clone();
                std::thread::spawn(move || {
                    let payload = vec![i; 4096];
                    let path = sink
                        .save("out.png", &DataUrl::from_bytes("image/png", &payload))
                        .unwrap();
                    (path, payload)
                })
            })
            .collect();

        let mut paths = Vec::new();
        for worker in workers {
            let (path, payload) = worker.join().unwrap();
            assert_eq!(fs::read(&path).unwrap(), payload);
            paths.push(path);
        }
        paths.sort();
        paths.dedup();
        assert_eq!(paths.len(), 8);
        // No partial files are left behind.
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 8);
    }

    #[test]
    fn recording_sink_keeps_order() {
        let sink = RecordingSink::new();
        sink.save("x.png", &DataUrl::from_bytes("image/png", b"1")).unwrap();
        sink.save("y.png", &DataUrl::from_bytes("image/png", b"2")).unwrap();
        let names: Vec<_> = sink.downloads().into_iter().map(|d| d.filename).collect();
        assert_eq!(names, vec!["x.png", "y.png"]);
    }
}
