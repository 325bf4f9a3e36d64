use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::error::{LoadError, LoadResult};
use super::loader::{self, LoadOptions};
use super::model::Dataset;

// ---------------------------------------------------------------------------
// Where dataset bytes come from
// ---------------------------------------------------------------------------

/// Source of raw file contents.
pub trait DataSource {
    fn read(&self, path: &Path) -> io::Result<Vec<u8>>;
}

/// Reads from the local file system.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsSource;

impl DataSource for FsSource {
    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        std::fs::read(path)
    }
}

// ---------------------------------------------------------------------------
// Process-lifetime memoization of loaded datasets
// ---------------------------------------------------------------------------

/// Path → dataset table, filled on first successful load and never
/// invalidated. Failed loads are not cached, so a later call retries.
pub struct DatasetCache<S: DataSource = FsSource> {
    source: S,
    options: LoadOptions,
    entries: HashMap<PathBuf, Arc<Dataset>>,
}

impl DatasetCache<FsSource> {
    pub fn new(options: LoadOptions) -> Self {
        Self::with_source(FsSource, options)
    }
}

impl<S: DataSource> DatasetCache<S> {
    pub fn with_source(source: S, options: LoadOptions) -> Self {
        Self {
            source,
            options,
            entries: HashMap::new(),
        }
    }

    /// Return the dataset for `path`, reading the file only the first time.
    pub fn load(&mut self, path: &Path) -> LoadResult<Arc<Dataset>> {
        if let Some(ds) = self.entries.get(path) {
            log::debug!("Cache hit for {}", path.display());
            return Ok(Arc::clone(ds));
        }

        let bytes = self.source.read(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let dataset = loader::parse_bytes(path, &bytes, &self.options)
            .map_err(|e| LoadError::format(path, e))?;

        let dataset = Arc::new(dataset);
        self.entries.insert(path.to_path_buf(), Arc::clone(&dataset));
        log::info!(
            "Cached {} ({} rows, {} columns)",
            path.display(),
            dataset.len(),
            dataset.column_names.len()
        );
        Ok(dataset)
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.entries.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::io::Write;

    use super::*;

    /// In-memory source that counts how often it is read.
    struct CountingSource {
        contents: &'static str,
        reads: Cell<usize>,
    }

    impl CountingSource {
        fn new(contents: &'static str) -> Self {
            Self {
                contents,
                reads: Cell::new(0),
            }
        }
    }

    impl DataSource for &CountingSource {
        fn read(&self, _path: &Path) -> io::Result<Vec<u8>> {
            self.reads.set(self.reads.get() + 1);
            Ok(self.contents.as_bytes().to_vec())
        }
    }

    struct FailingSource;

    impl DataSource for FailingSource {
        fn read(&self, _path: &Path) -> io::Result<Vec<u8>> {
            Err(io::Error::new(io::ErrorKind::PermissionDenied, "denied"))
        }
    }

    #[test]
    fn second_load_is_served_from_cache() {
        let source = CountingSource::new("Team,Year\nA,2000\nB,2001\n");
        let mut cache = DatasetCache::with_source(&source, LoadOptions::default());

        let first = cache.load(Path::new("baseball.csv")).unwrap();
        let second = cache.load(Path::new("baseball.csv")).unwrap();

        assert_eq!(source.reads.get(), 1);
        assert_eq!(*first, *second);
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn distinct_paths_are_cached_separately() {
        let source = CountingSource::new("Team\nA\n");
        let mut cache = DatasetCache::with_source(&source, LoadOptions::default());

        cache.load(Path::new("a.csv")).unwrap();
        cache.load(Path::new("b.csv")).unwrap();
        cache.load(Path::new("a.csv")).unwrap();

        assert_eq!(source.reads.get(), 2);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn failed_loads_are_not_cached() {
        let source = CountingSource::new("Team,Team\nA,B\n");
        let mut cache = DatasetCache::with_source(&source, LoadOptions::default());

        assert!(matches!(
            cache.load(Path::new("dup.csv")),
            Err(LoadError::Format { .. })
        ));
        assert!(cache.load(Path::new("dup.csv")).is_err());
        assert_eq!(source.reads.get(), 2);
        assert!(cache.is_empty());
    }

    #[test]
    fn unreadable_source_is_io_error() {
        let mut cache = DatasetCache::with_source(FailingSource, LoadOptions::default());
        let err = cache.load(Path::new("baseball.csv")).unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }

    #[test]
    fn file_system_source_reads_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("baseball.csv");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(f, "Team,Year\nOAK,2002").unwrap();
        drop(f);

        let mut cache = DatasetCache::new(LoadOptions::default());
        let first = cache.load(&path).unwrap();

        // Removing the file proves the second call never touches the disk.
        std::fs::remove_file(&path).unwrap();
        let second = cache.load(&path).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert!(cache.contains(&path));
    }
}
