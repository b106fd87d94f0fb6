//! Resolvers and the ordered resolver registry
//!
//! A resolver pairs a match predicate with a directory factory. The
//! registry is an ordered list of resolvers: the first one whose predicate
//! accepts a locator builds its directory, later ones are never consulted.

use crate::archive::ArchiveDir;
use crate::error::VfsResult;
use crate::locator::Locator;
use crate::r#trait::VfsDir;
use crate::system::SystemDir;
use archvfs_config::VfsConfig;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

/// A matcher and factory for locators
pub trait Resolver: Send + Sync {
    /// Name used in logs and error messages
    fn name(&self) -> &str;

    /// Whether this resolver handles `locator`
    fn matches(&self, locator: &Locator) -> bool;

    /// Build the directory for a matched locator
    fn create_dir(&self, locator: &Locator) -> VfsResult<Box<dyn VfsDir>>;
}

/// The built-in locator types, in default priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltinKind {
    /// `file:` locator of an archive file
    ArchiveFile,
    /// Any locator pointing inside an archive (`.jar!`)
    NestedArchive,
    /// `file:` locator of an existing directory
    Directory,
    /// Archive under an embedding host's scheme
    EmbeddedArchiveFile,
    /// Directory under an embedding host's scheme
    EmbeddedDirectory,
}

impl BuiltinKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BuiltinKind::ArchiveFile => "archive-file",
            BuiltinKind::NestedArchive => "nested-archive-entry",
            BuiltinKind::Directory => "directory",
            BuiltinKind::EmbeddedArchiveFile => "embedded-archive-file",
            BuiltinKind::EmbeddedDirectory => "embedded-directory",
        }
    }
}

/// One of the default resolvers, parameterized by a [`VfsConfig`]
#[derive(Debug, Clone)]
pub struct BuiltinResolver {
    kind: BuiltinKind,
    config: Arc<VfsConfig>,
}

impl BuiltinResolver {
    pub fn new(kind: BuiltinKind, config: Arc<VfsConfig>) -> Self {
        Self { kind, config }
    }

    pub fn kind(&self) -> BuiltinKind {
        self.kind
    }

    fn is_embedded(&self, locator: &Locator) -> bool {
        match (&self.config.embedded_scheme, locator.scheme()) {
            (Some(marker), Some(scheme)) => scheme.contains(marker.as_str()),
            _ => false,
        }
    }

    fn is_directory(&self, locator: &Locator) -> bool {
        match locator.normalized_path(self.config.decode) {
            Ok(path) => Path::new(&path).is_dir(),
            Err(e) => {
                tracing::debug!(locator = %locator, error = %e, "not a directory locator");
                false
            }
        }
    }
}

impl Resolver for BuiltinResolver {
    fn name(&self) -> &str {
        self.kind.as_str()
    }

    fn matches(&self, locator: &Locator) -> bool {
        let raw = locator.as_str();
        match self.kind {
            BuiltinKind::ArchiveFile => {
                locator.is_file_scheme() && self.config.matches_archive(raw)
            }
            BuiltinKind::NestedArchive => self.config.matches_archive_entry(raw),
            BuiltinKind::Directory => locator.is_file_scheme() && self.is_directory(locator),
            BuiltinKind::EmbeddedArchiveFile => {
                self.is_embedded(locator) && self.config.matches_archive(raw)
            }
            BuiltinKind::EmbeddedDirectory => {
                self.is_embedded(locator)
                    && !self.config.matches_archive(raw)
                    && self.is_directory(locator)
            }
        }
    }

    fn create_dir(&self, locator: &Locator) -> VfsResult<Box<dyn VfsDir>> {
        let policy = self.config.decode;
        match self.kind {
            BuiltinKind::ArchiveFile
            | BuiltinKind::NestedArchive
            | BuiltinKind::EmbeddedArchiveFile => {
                Ok(Box::new(ArchiveDir::from_locator(locator, policy)?))
            }
            BuiltinKind::Directory | BuiltinKind::EmbeddedDirectory => {
                Ok(Box::new(SystemDir::from_locator(locator, policy)?))
            }
        }
    }
}

/// A resolver built from two closures
pub struct FnResolver<M, C> {
    name: String,
    matches: M,
    create: C,
}

impl<M, C> FnResolver<M, C>
where
    M: Fn(&Locator) -> bool + Send + Sync,
    C: Fn(&Locator) -> VfsResult<Box<dyn VfsDir>> + Send + Sync,
{
    pub fn new(name: impl Into<String>, matches: M, create: C) -> Self {
        Self {
            name: name.into(),
            matches,
            create,
        }
    }
}

impl<M, C> Resolver for FnResolver<M, C>
where
    M: Fn(&Locator) -> bool + Send + Sync,
    C: Fn(&Locator) -> VfsResult<Box<dyn VfsDir>> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn matches(&self, locator: &Locator) -> bool {
        (self.matches)(locator)
    }

    fn create_dir(&self, locator: &Locator) -> VfsResult<Box<dyn VfsDir>> {
        (self.create)(locator)
    }
}

/// Shorthand for [`FnResolver::new`]
///
/// # Example
/// ```
/// use archvfs::{resolver_fn, Locator, MemoryDir, VfsDir};
///
/// let http = resolver_fn(
///     "http",
///     |locator: &Locator| locator.scheme() == Some("http"),
///     |locator: &Locator| {
///         // fetch the archive here
///         Ok(Box::new(MemoryDir::new(locator.as_str())) as Box<dyn VfsDir>)
///     },
/// );
/// # let _ = http;
/// ```
pub fn resolver_fn<M, C>(name: impl Into<String>, matches: M, create: C) -> FnResolver<M, C>
where
    M: Fn(&Locator) -> bool + Send + Sync,
    C: Fn(&Locator) -> VfsResult<Box<dyn VfsDir>> + Send + Sync,
{
    FnResolver::new(name, matches, create)
}

/// Ordered list of resolvers. Order is priority: first match wins.
///
/// `Default` gives the built-in resolvers, `new()` an empty list.
#[derive(Clone)]
pub struct ResolverRegistry {
    resolvers: Vec<Arc<dyn Resolver>>,
}

impl Default for ResolverRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl ResolverRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            resolvers: Vec::new(),
        }
    }

    /// The built-in resolvers for `config`, in priority order:
    /// archive-file, nested-archive-entry, directory, then the embedded
    /// pair when `config.embedded_scheme` is set.
    pub fn from_config(config: &VfsConfig) -> Self {
        let config = Arc::new(config.clone());
        let mut kinds = vec![
            BuiltinKind::ArchiveFile,
            BuiltinKind::NestedArchive,
            BuiltinKind::Directory,
        ];
        if config.embedded_scheme.is_some() {
            kinds.push(BuiltinKind::EmbeddedArchiveFile);
            kinds.push(BuiltinKind::EmbeddedDirectory);
        }
        let resolvers = kinds
            .into_iter()
            .map(|kind| Arc::new(BuiltinResolver::new(kind, Arc::clone(&config))) as Arc<dyn Resolver>)
            .collect();
        Self { resolvers }
    }

    /// The built-in resolvers for the default configuration
    pub fn with_defaults() -> Self {
        Self::from_config(&VfsConfig::default())
    }

    pub fn resolvers(&self) -> &[Arc<dyn Resolver>] {
        &self.resolvers
    }

    /// Replace the whole list
    pub fn set(&mut self, resolvers: Vec<Arc<dyn Resolver>>) {
        self.resolvers = resolvers;
    }

    /// Append a resolver (lowest priority)
    pub fn push(&mut self, resolver: impl Resolver + 'static) {
        self.resolvers.push(Arc::new(resolver));
    }

    /// Prepend a resolver (highest priority)
    pub fn push_front(&mut self, resolver: impl Resolver + 'static) {
        self.resolvers.insert(0, Arc::new(resolver));
    }

    /// First resolver accepting `locator`
    pub fn find(&self, locator: &Locator) -> Option<&Arc<dyn Resolver>> {
        self.resolvers.iter().find(|r| r.matches(locator))
    }

    pub fn names(&self) -> Vec<&str> {
        self.resolvers.iter().map(|r| r.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.resolvers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resolvers.is_empty()
    }
}

impl From<Vec<Arc<dyn Resolver>>> for ResolverRegistry {
    fn from(resolvers: Vec<Arc<dyn Resolver>>) -> Self {
        Self { resolvers }
    }
}

impl fmt::Debug for ResolverRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryDir;
    use archvfs_config::ArchiveMatch;

    fn builtin(kind: BuiltinKind) -> BuiltinResolver {
        BuiltinResolver::new(kind, Arc::new(VfsConfig::default()))
    }

    #[test]
    fn test_default_order() {
        let registry = ResolverRegistry::with_defaults();
        assert_eq!(
            registry.names(),
            vec![
                "archive-file",
                "nested-archive-entry",
                "directory",
                "embedded-archive-file",
                "embedded-directory",
            ]
        );
    }

    #[test]
    fn test_embedded_resolvers_are_optional() {
        let config = VfsConfig {
            embedded_scheme: None,
            ..VfsConfig::default()
        };
        assert_eq!(ResolverRegistry::from_config(&config).len(), 3);
    }

    #[test]
    fn test_archive_file_matching() {
        let r = builtin(BuiltinKind::ArchiveFile);
        assert!(r.matches(&Locator::new("file:/lib/a.jar")));
        assert!(r.matches(&Locator::new("file:/lib/a.zip")));
        assert!(!r.matches(&Locator::new("jar:file:/lib/a.jar!/")));
        assert!(!r.matches(&Locator::new("http://host/a.jar")));
        assert!(!r.matches(&Locator::new("file:/lib/a.jar?v=2")));
    }

    #[test]
    fn test_archive_file_contains_policy() {
        let config = VfsConfig {
            archive_match: ArchiveMatch::Contains,
            ..VfsConfig::default()
        };
        let r = BuiltinResolver::new(BuiltinKind::ArchiveFile, Arc::new(config));
        assert!(r.matches(&Locator::new("file:/lib/a.jar?v=2")));
    }

    #[test]
    fn test_nested_archive_matching() {
        let r = builtin(BuiltinKind::NestedArchive);
        assert!(r.matches(&Locator::new("jar:file:/lib/a.jar!/")));
        assert!(r.matches(&Locator::new("zip:/lib/a.zip!/pkg")));
        assert!(!r.matches(&Locator::new("file:/lib/a.jar")));
    }

    #[test]
    fn test_directory_matching() {
        let tmp = tempfile::tempdir().unwrap();
        let r = builtin(BuiltinKind::Directory);
        assert!(r.matches(&Locator::from_path(tmp.path())));
        assert!(!r.matches(&Locator::from_path(tmp.path().join("missing"))));
        assert!(!r.matches(&Locator::new("file:/bad%zz")));
    }

    #[test]
    fn test_embedded_matching() {
        let tmp = tempfile::tempdir().unwrap();
        let archive = builtin(BuiltinKind::EmbeddedArchiveFile);
        let dir = builtin(BuiltinKind::EmbeddedDirectory);
        assert_eq!(dir.kind(), BuiltinKind::EmbeddedDirectory);

        let zip = Locator::new("vfszip:/srv/app.war/lib/a.jar");
        let classes = Locator::new(format!("vfsfile:{}", tmp.path().to_string_lossy()));
        assert!(archive.matches(&zip));
        assert!(!dir.matches(&zip));
        assert!(dir.matches(&classes));
        assert!(!archive.matches(&classes));
        assert!(!dir.matches(&Locator::new("file:/srv/classes")));
    }

    #[test]
    fn test_embedded_directory_requires_existing_directory() {
        let dir = builtin(BuiltinKind::EmbeddedDirectory);
        assert!(!dir.matches(&Locator::new("vfsfile:/does/not/exist")));

        let mut registry = ResolverRegistry::with_defaults();
        registry.push(resolver_fn(
            "vfsmem",
            |l: &Locator| l.scheme() == Some("vfsmem"),
            |l: &Locator| Ok(Box::new(MemoryDir::new(l.as_str())) as Box<dyn VfsDir>),
        ));
        let found = registry.find(&Locator::new("vfsmem:/does/not/exist")).unwrap();
        assert_eq!(found.name(), "vfsmem");
    }

    #[test]
    fn test_find_first_match_wins() {
        let mut registry = ResolverRegistry::new();
        registry.push(resolver_fn(
            "first",
            |_: &Locator| true,
            |l: &Locator| Ok(Box::new(MemoryDir::new(l.as_str())) as Box<dyn VfsDir>),
        ));
        registry.push(resolver_fn(
            "second",
            |_: &Locator| true,
            |l: &Locator| Ok(Box::new(MemoryDir::new(l.as_str())) as Box<dyn VfsDir>),
        ));
        let found = registry.find(&Locator::new("any:thing")).unwrap();
        assert_eq!(found.name(), "first");
    }

    #[test]
    fn test_push_front_and_set() {
        let mut registry = ResolverRegistry::with_defaults();
        registry.push_front(resolver_fn(
            "custom",
            |_: &Locator| false,
            |l: &Locator| Ok(Box::new(MemoryDir::new(l.as_str())) as Box<dyn VfsDir>),
        ));
        assert_eq!(registry.names()[0], "custom");

        registry.set(Vec::new());
        assert!(registry.is_empty());
        assert!(registry.find(&Locator::new("file:/a.jar")).is_none());
    }

    #[test]
    fn test_debug_lists_names() {
        let config = VfsConfig {
            embedded_scheme: None,
            ..VfsConfig::default()
        };
        let registry = ResolverRegistry::from_config(&config);
        assert_eq!(
            format!("{registry:?}"),
            r#"["archive-file", "nested-archive-entry", "directory"]"#
        );
    }
}
