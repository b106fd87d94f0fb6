//! In-memory directory implementation

use crate::error::{VfsError, VfsResult};
use crate::r#trait::{FileIter, FileStream, VfsDir, VfsFile};
use std::collections::BTreeMap;
use std::io::{self, Cursor};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// An in-memory directory.
///
/// All files are held in a `BTreeMap` keyed by relative path, so `files()`
/// yields them in path order. This is the backend of choice for custom
/// resolvers that fetch content themselves (over HTTP, from a database)
/// and for tests.
///
/// # Example
/// ```
/// use archvfs::{MemoryDir, VfsDir, VfsFile};
///
/// let dir = MemoryDir::with_files("mem:/app", [("pkg/A.class", b"cafe".to_vec())]);
/// let file = dir.files().next().unwrap();
/// assert_eq!(file.relative_path(), "pkg/A.class");
/// assert_eq!(file.read_bytes().unwrap(), b"cafe");
/// ```
#[derive(Debug, Clone)]
pub struct MemoryDir {
    path: String,
    files: Arc<BTreeMap<String, Arc<[u8]>>>,
    closed: Arc<AtomicBool>,
}

impl MemoryDir {
    /// Create an empty directory.
    pub fn new(path: impl Into<String>) -> Self {
        Self::with_files(path, std::iter::empty::<(String, Vec<u8>)>())
    }

    /// Create a directory pre-populated with files.
    ///
    /// # Arguments
    /// * `path` - Path reported by `path()`
    /// * `files` - Iterator of (relative path, content) tuples
    pub fn with_files<I, S>(path: impl Into<String>, files: I) -> Self
    where
        I: IntoIterator<Item = (S, Vec<u8>)>,
        S: AsRef<str>,
    {
        let files = files
            .into_iter()
            .map(|(name, content)| (normalize_key(name.as_ref()), Arc::from(content)))
            .collect();
        Self {
            path: path.into(),
            files: Arc::new(files),
            closed: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// Forward slashes, no leading slash
fn normalize_key(path: &str) -> String {
    path.replace('\\', "/").trim_start_matches('/').to_string()
}

impl VfsDir for MemoryDir {
    fn path(&self) -> &str {
        &self.path
    }

    fn files(&self) -> FileIter {
        let dir = self.clone();
        let names: Vec<String> = self.files.keys().cloned().collect();
        Box::new(names.into_iter().map(move |relative_path| {
            Box::new(MemoryFile {
                dir: dir.clone(),
                relative_path,
            }) as Box<dyn VfsFile>
        }))
    }

    fn close(&self) {
        if !self.closed.swap(true, Ordering::SeqCst) {
            tracing::debug!(path = %self.path, "closed memory directory");
        }
    }
}

/// A file of a [`MemoryDir`]
#[derive(Debug, Clone)]
pub struct MemoryFile {
    dir: MemoryDir,
    relative_path: String,
}

impl VfsFile for MemoryFile {
    fn name(&self) -> &str {
        self.relative_path
            .rsplit('/')
            .next()
            .unwrap_or(&self.relative_path)
    }

    fn relative_path(&self) -> &str {
        &self.relative_path
    }

    fn full_path(&self) -> String {
        format!("{}/{}", self.dir.path.trim_end_matches('/'), self.relative_path)
    }

    fn open(&self) -> VfsResult<FileStream> {
        if self.dir.closed.load(Ordering::SeqCst) {
            return Err(VfsError::stream(
                self.full_path(),
                io::Error::new(io::ErrorKind::Other, "directory is closed"),
            ));
        }
        let content = self.dir.files.get(&self.relative_path).cloned().ok_or_else(|| {
            VfsError::stream(
                self.full_path(),
                io::Error::new(io::ErrorKind::NotFound, "entry vanished"),
            )
        })?;
        Ok(Box::new(Cursor::new(content)))
    }
}
