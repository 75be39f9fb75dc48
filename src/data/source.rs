use std::collections::BTreeMap;
use std::io;
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::sync::Arc;
use std::thread;

use crate::error::LoadError;

// ---------------------------------------------------------------------------
// Dataset acquisition
// ---------------------------------------------------------------------------

/// Supplies the raw text of a named dataset. How the text is obtained is up
/// to the implementation.
pub trait DatasetProvider: Send + Sync {
    fn fetch(&self, name: &str) -> io::Result<String>;
}

/// Reads `<root>/<name>` from disk.
#[derive(Debug, Clone)]
pub struct DirectoryProvider {
    root: PathBuf,
}

impl DirectoryProvider {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        DirectoryProvider { root: root.into() }
    }
}

impl DatasetProvider for DirectoryProvider {
    fn fetch(&self, name: &str) -> io::Result<String> {
        std::fs::read_to_string(self.root.join(name))
    }
}

/// Named texts held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryProvider {
    texts: BTreeMap<String, String>,
}

impl MemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, text: impl Into<String>) -> Self {
        self.insert(name, text);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, text: impl Into<String>) {
        self.texts.insert(name.into(), text.into());
    }
}

impl DatasetProvider for MemoryProvider {
    fn fetch(&self, name: &str) -> io::Result<String> {
        self.texts.get(name).cloned().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, format!("no dataset named {name}"))
        })
    }
}

/// Fetch on the calling thread, mapping I/O failures to [`LoadError`].
pub fn fetch_dataset(provider: &dyn DatasetProvider, name: &str) -> Result<String, LoadError> {
    provider.fetch(name).map_err(|source| {
        log::error!("Error loading dataset {name}: {source}");
        LoadError::Acquisition {
            name: name.to_string(),
            source,
        }
    })
}

// ---------------------------------------------------------------------------
// Background fetch
// ---------------------------------------------------------------------------

/// A fetch running on a worker thread. Poll it with [`PendingFetch::try_take`].
#[derive(Debug)]
pub struct PendingFetch {
    name: String,
    rx: Receiver<Result<String, LoadError>>,
}

/// Start fetching `name` without blocking the caller.
pub fn spawn_fetch(provider: Arc<dyn DatasetProvider>, name: impl Into<String>) -> PendingFetch {
    let name = name.into();
    let (tx, rx) = mpsc::channel();
    let worker_name = name.clone();
    thread::spawn(move || {
        let result = fetch_dataset(provider.as_ref(), &worker_name);
        // The receiver may be gone if the caller moved on to another dataset.
        let _ = tx.send(result);
    });
    PendingFetch { name, rx }
}

impl PendingFetch {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// `None` while the worker is still busy.
    pub fn try_take(&self) -> Option<Result<String, LoadError>> {
        match self.rx.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Err(LoadError::Disconnected {
                name: self.name.clone(),
            })),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn wait_for(pending: &PendingFetch) -> Result<String, LoadError> {
        for _ in 0..2000 {
            if let Some(result) = pending.try_take() {
                return result;
            }
            thread::sleep(Duration::from_millis(1));
        }
        panic!("fetch of {} never finished", pending.name());
    }

    #[test]
    fn test_memory_provider() {
        let provider = MemoryProvider::new().with("small.csv", "a\n1\n");
        assert_eq!(provider.fetch("small.csv").unwrap(), "a\n1\n");
        assert_eq!(
            provider.fetch("large.csv").unwrap_err().kind(),
            io::ErrorKind::NotFound
        );
    }

    #[test]
    fn test_directory_provider_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("data.csv"), "x,y\n1,2\n").unwrap();
        let provider = DirectoryProvider::new(dir.path());
        assert_eq!(provider.fetch("data.csv").unwrap(), "x,y\n1,2\n");
    }

    #[test]
    fn test_missing_file_is_acquisition_failure() {
        let dir = tempfile::tempdir().unwrap();
        let provider = DirectoryProvider::new(dir.path());
        let err = fetch_dataset(&provider, "missing.csv").unwrap_err();
        assert!(matches!(err, LoadError::Acquisition { ref name, .. } if name == "missing.csv"));
        assert_eq!(err.to_string(), "Failed to load missing.csv");
    }

    #[test]
    fn test_spawn_fetch_delivers_text() {
        let provider: Arc<dyn DatasetProvider> =
            Arc::new(MemoryProvider::new().with("numbers.csv", "n\n1\n"));
        let pending = spawn_fetch(provider, "numbers.csv");
        assert_eq!(pending.name(), "numbers.csv");
        assert_eq!(wait_for(&pending).unwrap(), "n\n1\n");
    }

    #[test]
    fn test_spawn_fetch_reports_failure() {
        let provider: Arc<dyn DatasetProvider> = Arc::new(MemoryProvider::new());
        let err = wait_for(&spawn_fetch(provider, "absent.csv")).unwrap_err();
        assert!(matches!(err, LoadError::Acquisition { .. }));
    }
}
