//! Process-wide default resolvers
//!
//! Convenience for top-level callers. The registry starts with the built-in
//! resolvers and may be replaced or extended at any time; every call here
//! reads it afresh. Library code takes a [`Vfs`] instead.

use crate::dispatch::{resolve_with, DirHandle, FindFiles, Vfs};
use crate::error::VfsResult;
use crate::locator::Locator;
use crate::r#trait::VfsFile;
use crate::resolver::{Resolver, ResolverRegistry};
use once_cell::sync::Lazy;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

static DEFAULTS: Lazy<RwLock<ResolverRegistry>> =
    Lazy::new(|| RwLock::new(ResolverRegistry::with_defaults()));

fn read() -> RwLockReadGuard<'static, ResolverRegistry> {
    DEFAULTS.read().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn write() -> RwLockWriteGuard<'static, ResolverRegistry> {
    DEFAULTS.write().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Snapshot of the current default resolvers
pub fn default_resolvers() -> Vec<Arc<dyn Resolver>> {
    read().resolvers().to_vec()
}

/// Replace the default resolvers
pub fn set_default_resolvers(resolvers: Vec<Arc<dyn Resolver>>) {
    write().set(resolvers);
}

/// Append a default resolver (lowest priority)
pub fn add_default_resolver(resolver: impl Resolver + 'static) {
    write().push(resolver);
}

/// Restore the built-in defaults
pub fn reset_default_resolvers() {
    *write() = ResolverRegistry::with_defaults();
}

/// A [`Vfs`] over a snapshot of the default resolvers
pub fn default_vfs() -> Vfs {
    Vfs::new(read().clone())
}

/// Create a directory for `locator` with the default resolvers
pub fn from_locator(locator: &Locator) -> VfsResult<DirHandle> {
    resolve_with(locator, &default_resolvers())
}

/// [`Vfs::find_files`] with the default resolvers
pub fn find_files<L, P>(locators: L, predicate: P) -> FindFiles
where
    L: IntoIterator,
    L::Item: Into<Locator>,
    P: FnMut(&dyn VfsFile) -> bool + Send + 'static,
{
    default_vfs().find_files(locators, predicate)
}

/// [`Vfs::find_files_with_prefix`] with the default resolvers
pub fn find_files_with_prefix<L, F>(locators: L, prefix: &str, name_filter: F) -> FindFiles
where
    L: IntoIterator,
    L::Item: Into<Locator>,
    F: FnMut(&str) -> bool + Send + 'static,
{
    default_vfs().find_files_with_prefix(locators, prefix, name_filter)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::VfsError;
    use crate::memory::MemoryDir;
    use crate::r#trait::VfsDir;
    use crate::resolver::resolver_fn;

    // One test owns the global registry so parallel tests never race on it.
    #[test]
    fn test_global_registry_lifecycle() {
        let names = |list: Vec<Arc<dyn Resolver>>| -> Vec<String> {
            list.iter().map(|r| r.name().to_string()).collect()
        };
        assert_eq!(
            names(default_resolvers()),
            ResolverRegistry::with_defaults().names()
        );

        let locator = Locator::new("mem:global");
        assert!(matches!(
            from_locator(&locator),
            Err(VfsError::NoMatchingResolver { .. })
        ));

        add_default_resolver(resolver_fn(
            "mem",
            |l: &Locator| l.scheme() == Some("mem"),
            |l: &Locator| {
                Ok(Box::new(MemoryDir::with_files(
                    l.as_str(),
                    [("pkg/a.txt", b"a".to_vec()), ("b.txt", b"b".to_vec())],
                )) as Box<dyn VfsDir>)
            },
        ));
        assert_eq!(names(default_resolvers()).last().unwrap(), "mem");

        let dir = from_locator(&locator).unwrap();
        assert_eq!(dir.resolver(), "mem");
        dir.close();

        let found: Vec<_> = find_files_with_prefix([locator.clone()], "pkg", |_| true)
            .map(|f| f.unwrap().relative_path().to_string())
            .collect();
        assert_eq!(found, vec!["pkg/a.txt"]);

        let count = find_files([locator.clone()], |_: &dyn VfsFile| true).count();
        assert_eq!(count, 2);

        set_default_resolvers(Vec::new());
        assert!(default_resolvers().is_empty());
        assert!(from_locator(&locator).is_err());

        reset_default_resolvers();
        assert_eq!(default_resolvers().len(), ResolverRegistry::with_defaults().len());
    }
}
