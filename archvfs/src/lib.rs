//! Archvfs: read-only virtual file system
//!
//! A uniform view over directory trees and ZIP/JAR archives, addressed by
//! URL-like locators (`file:/lib/a.jar`, `jar:file:/lib/a.jar!/`, ...).
//!
//! - [`normalize`] turns a locator path into a plain filesystem path.
//! - [`VfsDir`] / [`VfsFile`] are the directory and file abstractions.
//! - A [`ResolverRegistry`] maps locators to directories; the first
//!   matching [`Resolver`] wins.
//! - [`Vfs`] dispatches single locators and runs lazy batch searches.
//! - The `*_default_resolver*` functions manage a process-wide registry.
//!
//! # Usage
//! ```no_run
//! use archvfs::{Locator, Vfs, VfsDir, VfsFile};
//!
//! let vfs = Vfs::default();
//! let dir = vfs.resolve(&Locator::new("file:/app/lib/core.jar"))?;
//! for file in dir.files() {
//!     println!("{} ({} bytes)", file.relative_path(), file.read_bytes()?.len());
//! }
//! dir.close();
//! # Ok::<(), archvfs::VfsError>(())
//! ```

mod archive;
mod dispatch;
mod error;
mod global;
mod locator;
mod memory;
mod normalize;
mod resolver;
mod system;
mod r#trait;

pub use archive::{ArchiveDir, ArchiveFile};
pub use dispatch::{prefix_filter, resolve_with, DirHandle, FilePredicate, FindFiles, Vfs};
pub use error::{ErrorKind, VfsError, VfsResult};
pub use global::{
    add_default_resolver, default_resolvers, default_vfs, find_files, find_files_with_prefix,
    from_locator, reset_default_resolvers, set_default_resolvers,
};
pub use locator::Locator;
pub use memory::{MemoryDir, MemoryFile};
pub use normalize::{normalize, normalize_with};
pub use r#trait::{FileIter, FileStream, VfsDir, VfsFile};
pub use resolver::{resolver_fn, BuiltinKind, BuiltinResolver, FnResolver, Resolver, ResolverRegistry};
pub use system::{SystemDir, SystemFile};

pub use archvfs_config::{ArchiveMatch, DecodePolicy, FailurePolicy, VfsConfig};
