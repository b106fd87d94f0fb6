//! Directory-tree backend

use crate::error::{VfsError, VfsResult};
use crate::locator::Locator;
use crate::r#trait::{FileIter, FileStream, VfsDir, VfsFile};
use archvfs_config::DecodePolicy;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// A directory on the native file system.
///
/// `files()` walks the tree depth first, in file-name order, and yields
/// every regular file. Each call walks again from scratch.
///
/// # Example
/// ```no_run
/// use archvfs::{SystemDir, VfsDir, VfsFile};
///
/// let dir = SystemDir::open("target/classes").unwrap();
/// for file in dir.files() {
///     println!("{}", file.relative_path());
/// }
/// ```
#[derive(Debug, Clone)]
pub struct SystemDir {
    root: PathBuf,
    path: String,
}

impl SystemDir {
    /// Open a directory on disk.
    pub fn open(root: impl AsRef<Path>) -> VfsResult<Self> {
        let root = root.as_ref();
        let path = to_slashes(root);
        let meta = std::fs::metadata(root).map_err(|e| VfsError::io(path.clone(), e))?;
        if !meta.is_dir() {
            return Err(VfsError::NotADirectory { path });
        }
        tracing::debug!(path = %path, "opened directory");
        Ok(Self {
            root: root.to_path_buf(),
            path,
        })
    }

    /// Open the directory a `file:` locator names.
    pub fn from_locator(locator: &Locator, policy: DecodePolicy) -> VfsResult<Self> {
        Self::open(locator.normalized_path(policy)?)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl VfsDir for SystemDir {
    fn path(&self) -> &str {
        &self.path
    }

    fn files(&self) -> FileIter {
        let root = self.root.clone();
        let walk = WalkDir::new(&self.root)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_map(move |entry| match entry {
                Ok(entry) if entry.file_type().is_file() => {
                    let file = SystemFile::new(&root, entry.into_path());
                    tracing::trace!(file = %file.relative_path, "walked");
                    Some(Box::new(file) as Box<dyn VfsFile>)
                }
                Ok(_) => None,
                Err(e) => {
                    tracing::warn!(error = %e, "skipping unreadable entry");
                    None
                }
            });
        Box::new(walk)
    }

    fn close(&self) {
        // nothing held open
        tracing::trace!(path = %self.path, "closed directory");
    }
}

/// A regular file found under a [`SystemDir`]
#[derive(Debug, Clone)]
pub struct SystemFile {
    file: PathBuf,
    name: String,
    relative_path: String,
}

impl SystemFile {
    fn new(root: &Path, file: PathBuf) -> Self {
        let relative = file.strip_prefix(root).unwrap_or(&file);
        let relative_path = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        let name = file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            file,
            name,
            relative_path,
        }
    }
}

impl VfsFile for SystemFile {
    fn name(&self) -> &str {
        &self.name
    }

    fn relative_path(&self) -> &str {
        &self.relative_path
    }

    fn full_path(&self) -> String {
        to_slashes(&self.file)
    }

    fn open(&self) -> VfsResult<FileStream> {
        let file = File::open(&self.file).map_err(|e| VfsError::stream(self.full_path(), e))?;
        Ok(Box::new(BufReader::new(file)))
    }
}

fn to_slashes(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}
