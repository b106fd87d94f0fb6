//! CLI configuration
//!
//! Log levels for the subscriber, plus loading of the resolver config file.

use archvfs_config::{Component, VfsConfig};
use std::path::Path;
use tracing::level_filters::LevelFilter;

/// CLI log configuration
#[derive(Debug, Clone)]
pub struct LogConfig {
    pub global: LevelFilter,
    /// Per-component overrides, last one wins
    pub components: Vec<(Component, LevelFilter)>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            global: LevelFilter::WARN,
            components: Vec::new(),
        }
    }
}

impl LogConfig {
    /// Get the log level of a library component
    pub fn level_for(&self, component: Component) -> LevelFilter {
        self.components
            .iter()
            .rev()
            .find(|(c, _)| *c == component)
            .map(|(_, level)| *level)
            .unwrap_or(self.global)
    }
}

/// Parse a `component=level` pair, e.g. `archive=debug`
pub fn parse_component_level(s: &str) -> Result<(Component, LevelFilter), String> {
    let (name, level) = s
        .split_once('=')
        .ok_or_else(|| format!("expected COMPONENT=LEVEL, got '{s}'"))?;
    let component = Component::ALL
        .into_iter()
        .find(|c| c.as_str() == name.trim())
        .ok_or_else(|| {
            let known: Vec<_> = Component::ALL.iter().map(|c| c.as_str()).collect();
            format!("unknown component '{name}' (one of: {})", known.join(", "))
        })?;
    let level = level
        .trim()
        .parse::<LevelFilter>()
        .map_err(|e| format!("invalid level '{level}': {e}"))?;
    Ok((component, level))
}

/// Read a resolver configuration file. Missing keys keep their defaults.
pub fn load_vfs_config(path: &Path) -> Result<VfsConfig, String> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("cannot read '{}': {}", path.display(), e))?;
    VfsConfig::from_json_str(&content)
        .map_err(|e| format!("failed to parse '{}': {}", path.display(), e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use archvfs_config::FailurePolicy;

    #[test]
    fn test_level_for_falls_back_to_global() {
        let config = LogConfig {
            global: LevelFilter::INFO,
            components: vec![
                (Component::Archive, LevelFilter::DEBUG),
                (Component::Archive, LevelFilter::TRACE),
            ],
        };
        assert_eq!(config.level_for(Component::Archive), LevelFilter::TRACE);
        assert_eq!(config.level_for(Component::Dispatch), LevelFilter::INFO);
    }

    #[test]
    fn test_parse_component_level() {
        assert_eq!(
            parse_component_level("resolver=debug").unwrap(),
            (Component::Resolver, LevelFilter::DEBUG)
        );
        assert_eq!(
            parse_component_level("system=off").unwrap(),
            (Component::System, LevelFilter::OFF)
        );
        assert!(parse_component_level("resolver").is_err());
        assert!(parse_component_level("lexer=debug").is_err());
        assert!(parse_component_level("archive=loud").is_err());
    }

    #[test]
    fn test_load_vfs_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vfs.json");
        std::fs::write(&path, r#"{ "on_locator_error": "skip" }"#).unwrap();

        let config = load_vfs_config(&path).unwrap();
        assert_eq!(config.on_locator_error, FailurePolicy::Skip);
        assert!(load_vfs_config(&dir.path().join("missing.json")).is_err());
    }
}
