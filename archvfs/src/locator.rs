//! Locators: opaque resource identifiers naming a directory, an archive, or
//! an entry inside an archive.

use crate::error::VfsResult;
use crate::normalize::normalize_with;
use archvfs_config::DecodePolicy;
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use std::convert::Infallible;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Characters that would change the meaning of a `file:` locator
const PATH_ESCAPES: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// A URL-like resource identifier, e.g. `file:/lib/a.jar`,
/// `jar:file:/lib/a.jar!/pkg` or `vfszip:/srv/app.war/lib/a.jar`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Locator {
    raw: String,
}

impl Locator {
    pub fn new(raw: impl Into<String>) -> Self {
        Self { raw: raw.into() }
    }

    /// Build a `file:` locator for a host path.
    ///
    /// The path is percent-encoded where needed so that normalizing the
    /// locator gives the original path back.
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_string_lossy().replace('\\', "/");
        let encoded = utf8_percent_encode(&path, PATH_ESCAPES).to_string();
        if encoded.starts_with('/') {
            Self::new(format!("file:{encoded}"))
        } else {
            Self::new(format!("file:/{encoded}"))
        }
    }

    /// The full locator string
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// The scheme before the first `:`, if any.
    ///
    /// Single letters are drive letters (`C:/lib`), not schemes.
    pub fn scheme(&self) -> Option<&str> {
        let (scheme, _) = self.raw.split_once(':')?;
        let mut chars = scheme.chars();
        let first = chars.next()?;
        let valid = first.is_ascii_alphabetic()
            && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
        (valid && scheme.len() > 1).then_some(scheme)
    }

    /// Whether the scheme is `file`
    pub fn is_file_scheme(&self) -> bool {
        self.scheme()
            .is_some_and(|scheme| scheme.eq_ignore_ascii_case("file"))
    }

    /// The locator without its scheme, query and fragment.
    pub fn path(&self) -> &str {
        let rest = match self.scheme() {
            Some(scheme) => &self.raw[scheme.len() + 1..],
            None => self.raw.as_str(),
        };
        let end = rest.find(['?', '#']).unwrap_or(rest.len());
        &rest[..end]
    }

    /// Normalized filesystem path of this locator
    pub fn normalized_path(&self, policy: DecodePolicy) -> VfsResult<String> {
        normalize_with(self.path(), policy)
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl FromStr for Locator {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

impl From<&str> for Locator {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<String> for Locator {
    fn from(raw: String) -> Self {
        Self::new(raw)
    }
}

impl AsRef<str> for Locator {
    fn as_ref(&self) -> &str {
        &self.raw
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scheme() {
        assert_eq!(Locator::new("file:/a").scheme(), Some("file"));
        assert_eq!(Locator::new("jar:file:/a.jar!/").scheme(), Some("jar"));
        assert_eq!(Locator::new("vfs-zip:/a").scheme(), Some("vfs-zip"));
        assert_eq!(Locator::new("C:/a").scheme(), None);
        assert_eq!(Locator::new("/a/b").scheme(), None);
        assert_eq!(Locator::new("1x:/a").scheme(), None);
    }

    #[test]
    fn test_is_file_scheme() {
        assert!(Locator::new("file:/a").is_file_scheme());
        assert!(Locator::new("FILE:/a").is_file_scheme());
        assert!(!Locator::new("jar:file:/a.jar!/").is_file_scheme());
        assert!(!Locator::new("/a").is_file_scheme());
    }

    #[test]
    fn test_path_strips_scheme_query_fragment() {
        assert_eq!(Locator::new("file:/a/b.jar?v=1").path(), "/a/b.jar");
        assert_eq!(Locator::new("file:/a/b#frag").path(), "/a/b");
        assert_eq!(Locator::new("jar:file:/a.jar!/x").path(), "file:/a.jar!/x");
        assert_eq!(Locator::new("/plain").path(), "/plain");
    }

    #[test]
    fn test_from_path_round_trips_through_normalize() {
        let locator = Locator::from_path("/tmp/my libs/100%/a#b.jar");
        assert_eq!(locator.as_str(), "file:/tmp/my%20libs/100%25/a%23b.jar");
        assert_eq!(
            locator.normalized_path(DecodePolicy::Strict).unwrap(),
            "/tmp/my libs/100%/a#b.jar"
        );
    }

    #[test]
    fn test_from_windows_path() {
        let locator = Locator::from_path("C:\\work\\classes");
        assert_eq!(locator.as_str(), "file:/C:/work/classes");
        assert_eq!(
            locator.normalized_path(DecodePolicy::Strict).unwrap(),
            "c:/work/classes"
        );
    }

    #[test]
    fn test_display_and_parse() {
        let locator: Locator = "file:/a/b".parse().unwrap();
        assert_eq!(locator.to_string(), "file:/a/b");
        assert_eq!(Locator::from("x"), Locator::from(String::from("x")));
    }
}
