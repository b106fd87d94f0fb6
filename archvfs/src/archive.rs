//! ZIP/JAR archive backend

use crate::error::{VfsError, VfsResult};
use crate::locator::Locator;
use crate::r#trait::{FileIter, FileStream, VfsDir, VfsFile};
use archvfs_config::DecodePolicy;
use std::fmt;
use std::fs::File;
use std::io::{self, BufReader, Cursor, Read, Seek};
use std::sync::{Arc, Mutex, MutexGuard};
use zip::ZipArchive;

/// Seekable archive source
trait ArchiveSource: Read + Seek + Send {}

impl<T: Read + Seek + Send> ArchiveSource for T {}

type Archive = ZipArchive<Box<dyn ArchiveSource>>;

/// Archive handle shared between a directory and its files.
/// `None` once closed.
struct Shared {
    path: String,
    archive: Mutex<Option<Archive>>,
}

impl fmt::Debug for Shared {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Shared")
            .field("path", &self.path)
            .field("closed", &self.lock().is_none())
            .finish()
    }
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Option<Archive>> {
        // a panic while reading leaves the handle usable
        self.archive.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[derive(Debug)]
struct Entry {
    index: usize,
    name: String,
}

/// A ZIP-formatted archive (`.jar`, `.zip`, `.war`, ...).
///
/// The archive is opened at construction and its entry list cached, so
/// `files()` can be iterated any number of times. Streams read the entry
/// into memory and fail once the directory is closed.
///
/// Archives nested in archives are supported through
/// [`ArchiveDir::from_locator`]: `/a/outer.jar!/lib/inner.jar` opens
/// `outer.jar` from disk and `lib/inner.jar` from memory.
#[derive(Debug, Clone)]
pub struct ArchiveDir {
    shared: Arc<Shared>,
    entries: Arc<[Entry]>,
}

impl ArchiveDir {
    /// Open an archive file on disk.
    pub fn open(path: impl AsRef<std::path::Path>) -> VfsResult<Self> {
        let path = path.as_ref();
        let display = path.to_string_lossy().replace('\\', "/");
        let file = File::open(path).map_err(|e| VfsError::io(display.clone(), e))?;
        Self::from_reader(display, BufReader::new(file))
    }

    /// Open an archive from any seekable reader. `path` names it in
    /// `path()` and in the files' full paths.
    pub fn from_reader<R>(path: impl Into<String>, reader: R) -> VfsResult<Self>
    where
        R: Read + Seek + Send + 'static,
    {
        let path = path.into();
        let source: Box<dyn ArchiveSource> = Box::new(reader);
        let mut archive = ZipArchive::new(source).map_err(|e| VfsError::InvalidArchive {
            path: path.clone(),
            source: e,
        })?;

        let mut entries = Vec::with_capacity(archive.len());
        for index in 0..archive.len() {
            let entry = archive
                .by_index_raw(index)
                .map_err(|e| VfsError::InvalidArchive {
                    path: path.clone(),
                    source: e,
                })?;
            if entry.is_dir() {
                continue;
            }
            entries.push(Entry {
                index,
                name: entry.name().to_string(),
            });
        }
        tracing::debug!(path = %path, entries = entries.len(), "opened archive");

        Ok(Self {
            shared: Arc::new(Shared {
                path,
                archive: Mutex::new(Some(archive)),
            }),
            entries: entries.into(),
        })
    }

    /// Open the archive a locator names.
    ///
    /// The locator is normalized first. Each `!` left in the normalized
    /// path separates an enclosing archive from the entry that holds the
    /// next, nested archive.
    pub fn from_locator(locator: &Locator, policy: DecodePolicy) -> VfsResult<Self> {
        let normalized = locator.normalized_path(policy)?;
        let mut segments = normalized.split('!');
        let outer = segments.next().unwrap_or_default();
        let mut dir = Self::open(outer)?;
        for segment in segments {
            let entry = segment.trim_start_matches('/');
            let bytes = dir.read_entry(entry)?;
            let path = format!("{}!/{}", dir.path(), entry);
            dir.close();
            dir = Self::from_reader(path, Cursor::new(bytes))?;
        }
        Ok(dir)
    }

    /// Whether `close()` has been called
    pub fn is_closed(&self) -> bool {
        self.shared.lock().is_none()
    }

    /// Number of file entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn read_entry(&self, name: &str) -> VfsResult<Vec<u8>> {
        let entry = self
            .entries
            .iter()
            .find(|e| e.name == name)
            .ok_or_else(|| VfsError::EntryNotFound {
                archive: self.shared.path.clone(),
                entry: name.to_string(),
            })?;
        read_index(&self.shared, entry.index)
            .map_err(|e| VfsError::io(format!("{}!/{}", self.shared.path, name), e))
    }
}

fn read_index(shared: &Shared, index: usize) -> io::Result<Vec<u8>> {
    let mut guard = shared.lock();
    let archive = guard
        .as_mut()
        .ok_or_else(|| io::Error::new(io::ErrorKind::Other, "archive is closed"))?;
    let mut entry = archive.by_index(index).map_err(io::Error::from)?;
    let mut buf = Vec::with_capacity(capacity_hint(entry.size()));
    entry.read_to_end(&mut buf)?;
    Ok(buf)
}

/// Largest buffer reserved up front from a declared entry size
const MAX_PREALLOC: usize = 1 << 20;

/// Initial buffer size for an entry. The declared size comes from the
/// archive itself and may be wrong.
fn capacity_hint(declared: u64) -> usize {
    usize::try_from(declared).unwrap_or(MAX_PREALLOC).min(MAX_PREALLOC)
}

impl VfsDir for ArchiveDir {
    fn path(&self) -> &str {
        &self.shared.path
    }

    fn files(&self) -> FileIter {
        let shared = Arc::clone(&self.shared);
        let entries = Arc::clone(&self.entries);
        Box::new((0..entries.len()).map(move |i| {
            let entry = &entries[i];
            Box::new(ArchiveFile {
                shared: Arc::clone(&shared),
                index: entry.index,
                relative_path: entry.name.clone(),
            }) as Box<dyn VfsFile>
        }))
    }

    fn close(&self) {
        if self.shared.lock().take().is_some() {
            tracing::debug!(path = %self.shared.path, "closed archive");
        }
    }
}

/// An entry of an [`ArchiveDir`]
#[derive(Debug, Clone)]
pub struct ArchiveFile {
    shared: Arc<Shared>,
    index: usize,
    relative_path: String,
}

impl VfsFile for ArchiveFile {
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
        format!("{}!/{}", self.shared.path, self.relative_path)
    }

    fn open(&self) -> VfsResult<FileStream> {
        let bytes = read_index(&self.shared, self.index)
            .map_err(|e| VfsError::stream(self.full_path(), e))?;
        tracing::trace!(entry = %self.relative_path, bytes = bytes.len(), "read archive entry");
        Ok(Box::new(Cursor::new(bytes)))
    }
}
