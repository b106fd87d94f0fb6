//! VfsDir and VfsFile trait definitions

use crate::error::VfsResult;
use std::fmt;
use std::io::Read;

/// Owned iterator over the files of a directory
pub type FileIter = Box<dyn Iterator<Item = Box<dyn VfsFile>> + Send>;

/// Byte stream of a single file
pub type FileStream = Box<dyn Read + Send>;

/// One file inside a [`VfsDir`]
///
/// # Implementations
/// - `SystemFile`: a file under a directory tree
/// - `ArchiveFile`: an entry of a ZIP/JAR archive
/// - `MemoryFile`: an in-memory blob
pub trait VfsFile: Send + Sync + fmt::Debug {
    /// Leaf name, e.g. `b.txt`
    fn name(&self) -> &str;

    /// Path relative to the directory root, always `/`-separated
    fn relative_path(&self) -> &str;

    /// Absolute path including the container
    fn full_path(&self) -> String;

    /// Open a fresh stream positioned at the start of the file
    ///
    /// Every call returns an independent stream. Fails with
    /// `VfsError::StreamOpen` once the owning directory is closed.
    fn open(&self) -> VfsResult<FileStream>;

    /// Read the whole file
    fn read_bytes(&self) -> VfsResult<Vec<u8>> {
        let mut stream = self.open()?;
        let mut buf = Vec::new();
        stream
            .read_to_end(&mut buf)
            .map_err(|e| crate::VfsError::stream(self.full_path(), e))?;
        Ok(buf)
    }
}

/// A read-only view over a container of files
///
/// # Implementations
/// - `SystemDir`: a directory tree on disk
/// - `ArchiveDir`: a ZIP/JAR archive
/// - `MemoryDir`: in-memory files supplied by a custom resolver
pub trait VfsDir: Send + Sync + fmt::Debug {
    /// Path of the container
    fn path(&self) -> &str;

    /// Every regular file of the container, depth first
    ///
    /// The iterator is owned: each call starts a new, independent pass.
    fn files(&self) -> FileIter;

    /// Release backend resources
    ///
    /// Idempotent. Files handed out earlier fail to open afterwards.
    fn close(&self);
}
