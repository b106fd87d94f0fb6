//! Locator dispatch and batch file search

use crate::error::{VfsError, VfsResult};
use crate::locator::Locator;
use crate::r#trait::{FileIter, VfsDir, VfsFile};
use crate::resolver::{Resolver, ResolverRegistry};
use archvfs_config::{FailurePolicy, VfsConfig};
use std::fmt;
use std::iter::FusedIterator;
use std::ops::Deref;
use std::sync::Arc;

/// Boxed file predicate used by [`FindFiles`]
pub type FilePredicate = Box<dyn FnMut(&dyn VfsFile) -> bool + Send>;

/// Create a directory for `locator` with the first matching resolver.
///
/// A failing factory is reported as [`VfsError::DirectoryCreation`]; later
/// resolvers are not tried.
pub fn resolve_with(locator: &Locator, resolvers: &[Arc<dyn Resolver>]) -> VfsResult<DirHandle> {
    let Some(resolver) = resolvers.iter().find(|r| r.matches(locator)) else {
        tracing::debug!(locator = %locator, "no resolver matched");
        return Err(VfsError::NoMatchingResolver {
            locator: locator.to_string(),
        });
    };

    tracing::debug!(locator = %locator, resolver = resolver.name(), "resolving");
    match resolver.create_dir(locator) {
        Ok(dir) => Ok(DirHandle {
            dir,
            resolver: resolver.name().to_string(),
            locator: locator.clone(),
        }),
        Err(e) => Err(VfsError::DirectoryCreation {
            resolver: resolver.name().to_string(),
            locator: locator.to_string(),
            source: Box::new(e),
        }),
    }
}

/// Predicate of the prefix form of `find_files`.
///
/// A file matches when its relative path starts with `prefix` and the
/// remainder is not empty. The remainder, without one leading `/`, is
/// passed to `name_filter`.
pub fn prefix_filter<F>(prefix: &str, mut name_filter: F) -> impl FnMut(&dyn VfsFile) -> bool + Send
where
    F: FnMut(&str) -> bool + Send,
{
    let prefix = prefix.to_string();
    move |file: &dyn VfsFile| {
        let path = file.relative_path();
        match path.strip_prefix(prefix.as_str()) {
            Some(rest) if !rest.is_empty() => {
                name_filter(rest.strip_prefix('/').unwrap_or(rest))
            }
            _ => false,
        }
    }
}

/// A resolved directory together with its release function.
///
/// Closing is explicit: dropping a handle without calling [`close`]
/// leaves files handed out earlier readable until they are dropped too.
///
/// [`close`]: DirHandle::close
pub struct DirHandle {
    dir: Box<dyn VfsDir>,
    resolver: String,
    locator: Locator,
}

impl DirHandle {
    /// Name of the resolver that created the directory
    pub fn resolver(&self) -> &str {
        &self.resolver
    }

    pub fn locator(&self) -> &Locator {
        &self.locator
    }

    /// Release the directory. Safe to call more than once.
    pub fn close(&self) {
        self.dir.close();
    }

    pub fn into_inner(self) -> Box<dyn VfsDir> {
        self.dir
    }
}

impl Deref for DirHandle {
    type Target = dyn VfsDir;

    fn deref(&self) -> &Self::Target {
        self.dir.as_ref()
    }
}

impl fmt::Debug for DirHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DirHandle")
            .field("resolver", &self.resolver)
            .field("locator", &self.locator)
            .field("dir", &self.dir)
            .finish()
    }
}

/// Closes a borrowed directory when dropped
struct CloseOnDrop<'a>(&'a DirHandle);

impl Drop for CloseOnDrop<'_> {
    fn drop(&mut self) {
        self.0.close();
    }
}

/// The dispatcher: an injected resolver registry plus a failure policy.
///
/// # Example
/// ```no_run
/// use archvfs::{Locator, Vfs, VfsFile};
///
/// let vfs = Vfs::default();
/// let locators = vec![Locator::new("file:/app/lib/core.jar")];
/// let mut found = vfs.find_files_with_prefix(locators, "META-INF", |name| name.ends_with(".xml"));
/// for file in found.by_ref() {
///     let file = file.unwrap();
///     println!("{}", file.full_path());
/// }
/// found.close_all();
/// ```
#[derive(Debug, Clone, Default)]
pub struct Vfs {
    registry: ResolverRegistry,
    on_error: FailurePolicy,
}

impl Vfs {
    pub fn new(registry: ResolverRegistry) -> Self {
        Self {
            registry,
            on_error: FailurePolicy::Abort,
        }
    }

    /// Default resolvers and failure policy from `config`
    pub fn from_config(config: &VfsConfig) -> Self {
        Self {
            registry: ResolverRegistry::from_config(config),
            on_error: config.on_locator_error,
        }
    }

    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.on_error = policy;
        self
    }

    pub fn failure_policy(&self) -> FailurePolicy {
        self.on_error
    }

    pub fn registry(&self) -> &ResolverRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut ResolverRegistry {
        &mut self.registry
    }

    /// Create a directory for `locator` with this dispatcher's resolvers
    pub fn resolve(&self, locator: &Locator) -> VfsResult<DirHandle> {
        resolve_with(locator, self.registry.resolvers())
    }

    /// Resolve `locator`, run `f` on the directory, then close it.
    ///
    /// The directory is closed even if `f` panics.
    pub fn with_dir<T, F>(&self, locator: &Locator, f: F) -> VfsResult<T>
    where
        F: FnOnce(&DirHandle) -> T,
    {
        let dir = self.resolve(locator)?;
        let guard = CloseOnDrop(&dir);
        Ok(f(guard.0))
    }

    /// Lazily search `locators`, in order, for files accepted by `predicate`.
    ///
    /// Directories are resolved as the search reaches them and are not
    /// closed by it: see [`FindFiles::close_all`].
    pub fn find_files<L, P>(&self, locators: L, predicate: P) -> FindFiles
    where
        L: IntoIterator,
        L::Item: Into<Locator>,
        P: FnMut(&dyn VfsFile) -> bool + Send + 'static,
    {
        FindFiles::new(
            self.registry.resolvers().to_vec(),
            locators.into_iter().map(Into::into).collect(),
            Box::new(predicate),
            self.on_error,
        )
    }

    /// [`find_files`](Vfs::find_files) with a [`prefix_filter`] predicate
    pub fn find_files_with_prefix<L, F>(&self, locators: L, prefix: &str, name_filter: F) -> FindFiles
    where
        L: IntoIterator,
        L::Item: Into<Locator>,
        F: FnMut(&str) -> bool + Send + 'static,
    {
        self.find_files(locators, prefix_filter(prefix, name_filter))
    }
}

/// Lazy search over several locators.
///
/// Yields matching files locator by locator, preserving each directory's
/// own order. With [`FailurePolicy::Abort`] the first resolution error is
/// yielded and the search ends; with [`FailurePolicy::Skip`] the locator is
/// logged and skipped.
///
/// Every directory resolved so far stays open and is owned here; release
/// them with [`close_all`](FindFiles::close_all) or take them with
/// [`into_dirs`](FindFiles::into_dirs).
pub struct FindFiles {
    resolvers: Vec<Arc<dyn Resolver>>,
    locators: std::vec::IntoIter<Locator>,
    predicate: FilePredicate,
    on_error: FailurePolicy,
    current: Option<FileIter>,
    opened: Vec<DirHandle>,
    done: bool,
}

impl FindFiles {
    fn new(
        resolvers: Vec<Arc<dyn Resolver>>,
        locators: Vec<Locator>,
        predicate: FilePredicate,
        on_error: FailurePolicy,
    ) -> Self {
        Self {
            resolvers,
            locators: locators.into_iter(),
            predicate,
            on_error,
            current: None,
            opened: Vec::new(),
            done: false,
        }
    }

    /// Directories resolved so far
    pub fn dirs(&self) -> &[DirHandle] {
        &self.opened
    }

    /// Stop searching and take ownership of the resolved directories
    pub fn into_dirs(self) -> Vec<DirHandle> {
        self.opened
    }

    /// Close every directory resolved so far
    pub fn close_all(&mut self) {
        for dir in &self.opened {
            dir.close();
        }
    }
}

impl Iterator for FindFiles {
    type Item = VfsResult<Box<dyn VfsFile>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        loop {
            if let Some(files) = self.current.as_mut() {
                for file in files.by_ref() {
                    if (self.predicate)(file.as_ref()) {
                        return Some(Ok(file));
                    }
                }
                self.current = None;
            }

            let Some(locator) = self.locators.next() else {
                self.done = true;
                return None;
            };
            match resolve_with(&locator, &self.resolvers) {
                Ok(dir) => {
                    self.current = Some(dir.files());
                    self.opened.push(dir);
                }
                Err(e) => match self.on_error {
                    FailurePolicy::Abort => {
                        self.done = true;
                        return Some(Err(e));
                    }
                    FailurePolicy::Skip => {
                        tracing::warn!(locator = %locator, error = %e, "skipping locator");
                    }
                },
            }
        }
    }
}

impl FusedIterator for FindFiles {}

impl fmt::Debug for FindFiles {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FindFiles")
            .field("remaining", &self.locators.len())
            .field("opened", &self.opened)
            .field("on_error", &self.on_error)
            .field("done", &self.done)
            .finish()
    }
}
