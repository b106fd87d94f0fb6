//! archvfs Config - Pure configuration data structures
//!
//! This crate contains only data structures, no I/O or global state.
//! It serves as the shared configuration vocabulary between the `archvfs`
//! library and its command line front end.

use serde::{Deserialize, Serialize};

/// How the archive-file resolvers recognise an archive suffix in a locator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArchiveMatch {
    /// The locator string must end with one of the archive extensions.
    #[default]
    Suffix,
    /// The extension may appear anywhere in the locator string
    /// (`file:/lib/a.jar?v=2` matches).
    Contains,
}

/// What the normalizer does with malformed percent-encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecodePolicy {
    /// Malformed escapes and non UTF-8 output are errors.
    #[default]
    Strict,
    /// Keep the undecoded string and carry on.
    Lenient,
}

/// What a batch search does when one locator cannot be resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Yield the error and stop the whole batch.
    #[default]
    Abort,
    /// Log the failure and continue with the next locator.
    Skip,
}

/// Configuration for locator resolution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VfsConfig {
    /// File extensions recognised as ZIP-formatted archives, dot included
    pub archive_extensions: Vec<String>,
    /// Suffix matching policy for archive locators
    pub archive_match: ArchiveMatch,
    /// Scheme marker of an embedding host (`vfs`, `vfszip`, ...).
    /// `None` disables the embedded resolvers.
    pub embedded_scheme: Option<String>,
    /// Percent-decoding policy of the path normalizer
    pub decode: DecodePolicy,
    /// Failure policy of batch searches
    pub on_locator_error: FailurePolicy,
}

impl Default for VfsConfig {
    fn default() -> Self {
        Self {
            archive_extensions: vec![".jar".to_string(), ".zip".to_string()],
            archive_match: ArchiveMatch::Suffix,
            embedded_scheme: Some("vfs".to_string()),
            decode: DecodePolicy::Strict,
            on_locator_error: FailurePolicy::Abort,
        }
    }
}

impl VfsConfig {
    /// Parse a configuration from JSON. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Whether `locator` carries one of the archive extensions under the
    /// configured match policy.
    pub fn matches_archive(&self, locator: &str) -> bool {
        self.archive_extensions.iter().any(|ext| match self.archive_match {
            ArchiveMatch::Suffix => locator.ends_with(ext.as_str()),
            ArchiveMatch::Contains => locator.contains(ext.as_str()),
        })
    }

    /// Whether `locator` points inside an archive (`.jar!`, `.zip!`, ...).
    pub fn matches_archive_entry(&self, locator: &str) -> bool {
        self.archive_extensions
            .iter()
            .any(|ext| locator.contains(&format!("{ext}!")))
    }
}

/// Library component, one per log target
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Component {
    Normalize,
    Resolver,
    Dispatch,
    System,
    Archive,
    Memory,
}

impl Component {
    /// Every component, in dependency order
    pub const ALL: [Component; 6] = [
        Component::Normalize,
        Component::Resolver,
        Component::Dispatch,
        Component::System,
        Component::Archive,
        Component::Memory,
    ];

    /// Get the string name of the component
    pub fn as_str(&self) -> &'static str {
        match self {
            Component::Normalize => "normalize",
            Component::Resolver => "resolver",
            Component::Dispatch => "dispatch",
            Component::System => "system",
            Component::Archive => "archive",
            Component::Memory => "memory",
        }
    }

    /// Get the log target name for this component
    pub fn target(&self) -> String {
        format!("archvfs::{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_vfs_config() {
        let cfg = VfsConfig::default();
        assert_eq!(cfg.archive_extensions, vec![".jar", ".zip"]);
        assert_eq!(cfg.archive_match, ArchiveMatch::Suffix);
        assert_eq!(cfg.embedded_scheme.as_deref(), Some("vfs"));
        assert_eq!(cfg.decode, DecodePolicy::Strict);
        assert_eq!(cfg.on_locator_error, FailurePolicy::Abort);
    }

    #[test]
    fn test_from_json_partial() {
        let cfg = VfsConfig::from_json_str(
            r#"{ "archive_match": "contains", "on_locator_error": "skip" }"#,
        )
        .unwrap();
        assert_eq!(cfg.archive_match, ArchiveMatch::Contains);
        assert_eq!(cfg.on_locator_error, FailurePolicy::Skip);
        assert_eq!(cfg.archive_extensions, vec![".jar", ".zip"]);
    }

    #[test]
    fn test_from_json_disables_embedded() {
        let cfg = VfsConfig::from_json_str(r#"{ "embedded_scheme": null }"#).unwrap();
        assert!(cfg.embedded_scheme.is_none());
    }

    #[test]
    fn test_from_json_rejects_unknown_policy() {
        assert!(VfsConfig::from_json_str(r#"{ "decode": "sloppy" }"#).is_err());
    }

    #[test]
    fn test_matches_archive_policies() {
        let mut cfg = VfsConfig::default();
        assert!(cfg.matches_archive("file:/lib/a.jar"));
        assert!(!cfg.matches_archive("file:/lib/a.jar?v=2"));

        cfg.archive_match = ArchiveMatch::Contains;
        assert!(cfg.matches_archive("file:/lib/a.jar?v=2"));
        assert!(!cfg.matches_archive("file:/lib/classes"));
    }

    #[test]
    fn test_matches_archive_entry() {
        let cfg = VfsConfig::default();
        assert!(cfg.matches_archive_entry("jar:file:/lib/a.jar!/"));
        assert!(cfg.matches_archive_entry("jar:file:/lib/a.zip!/pkg"));
        assert!(!cfg.matches_archive_entry("file:/lib/a.jar"));
    }

    #[test]
    fn test_component_target() {
        assert_eq!(Component::Archive.as_str(), "archive");
        assert_eq!(Component::Dispatch.target(), "archvfs::dispatch");
        assert_eq!(Component::ALL.len(), 6);
    }
}
