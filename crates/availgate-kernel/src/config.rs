//! Engine configuration.
//!
//! Loaded from TOML:
//!
//! ```toml
//! platforms = ["iOS", "macOS", "watchOS", "tvOS", "visionOS"]
//! gap_policy = "empty"
//! implicit_platform = "iOS"
//!
//! [baseline]
//! iOS = "16"
//! macOS = "13"
//!
//! [naming]
//! legacy_prefix = "kSec"
//! ```

use std::collections::BTreeSet;
use std::path::Path;

use crate::naming::{DEFAULT_RESERVED_WORDS, NameTransform};
use crate::platform::{Baseline, Platform};

/// File looked up in the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "availgate.toml";

/// Errors raised while loading or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config: {path}: {source}")]
    ReadFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid toml at {path}: {source}")]
    ParseToml {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to render config: {0}")]
    Render(#[from] toml::ser::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// What follows the last versioned branch of a platform when no symbol
/// there is available from the baseline.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum GapPolicy {
    /// Close the decision with an empty fallback branch.
    #[default]
    Empty,
    /// Close the decision with an explicit trap marker.
    Trap,
    /// Refuse to resolve.
    Reject,
}

impl std::fmt::Display for GapPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "empty"),
            Self::Trap => write!(f, "trap"),
            Self::Reject => write!(f, "reject"),
        }
    }
}

/// Naming rules for case names.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NamingConfig {
    #[serde(default = "default_legacy_prefix")]
    pub legacy_prefix: String,
    #[serde(default = "default_reserved")]
    pub reserved: Vec<String>,
}

fn default_legacy_prefix() -> String {
    "kSec".to_string()
}

fn default_reserved() -> Vec<String> {
    DEFAULT_RESERVED_WORDS.iter().map(|w| w.to_string()).collect()
}

impl Default for NamingConfig {
    fn default() -> Self {
        Self {
            legacy_prefix: default_legacy_prefix(),
            reserved: default_reserved(),
        }
    }
}

/// Everything the engine needs besides the declarations themselves.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    /// Platforms the output must mention, in output order.
    pub platforms: Vec<Platform>,
    #[serde(default)]
    pub gap_policy: GapPolicy,
    /// Platform assumed for declarations that carry no attributes at all.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub implicit_platform: Option<Platform>,
    pub baseline: Baseline,
    #[serde(default)]
    pub naming: NamingConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            platforms: Platform::ALL.to_vec(),
            gap_policy: GapPolicy::default(),
            implicit_platform: None,
            baseline: Baseline::default(),
            naming: NamingConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Parse and validate a TOML document. `origin` names it in errors.
    pub fn from_toml_str(text: &str, origin: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text).map_err(|source| ConfigError::ParseToml {
            path: origin.to_string(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::from_toml_str(&text, &path.display().to_string())?;
        tracing::debug!(path = %path.display(), platforms = config.platforms.len(), "loaded config");
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.platforms.is_empty() {
            return Err(ConfigError::Invalid("platforms must not be empty".into()));
        }
        let mut seen = BTreeSet::new();
        for platform in &self.platforms {
            if !seen.insert(*platform) {
                return Err(ConfigError::Invalid(format!(
                    "platform listed twice: {platform}"
                )));
            }
            if !self.baseline.contains(*platform) {
                return Err(ConfigError::Invalid(format!(
                    "missing baseline for {platform}"
                )));
            }
        }
        if let Some(implicit) = self.implicit_platform
            && !self.platforms.contains(&implicit)
        {
            return Err(ConfigError::Invalid(format!(
                "implicit_platform {implicit} is not a configured platform"
            )));
        }
        if self.naming.legacy_prefix.is_empty() {
            return Err(ConfigError::Invalid(
                "naming.legacy_prefix must not be empty".into(),
            ));
        }
        Ok(())
    }

    /// Build the name transform for this configuration.
    pub fn name_transform(&self) -> Result<NameTransform, ConfigError> {
        NameTransform::new(&self.naming.legacy_prefix, &self.naming.reserved)
            .map_err(|e| ConfigError::Invalid(format!("naming: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::version::Version;

    #[test]
    fn default_config_is_valid() {
        let config = EngineConfig::default();
        config.validate().unwrap();
        assert_eq!(config.platforms, Platform::ALL.to_vec());
        assert_eq!(config.gap_policy, GapPolicy::Empty);
    }

    #[test]
    fn parses_full_document() {
        let text = r#"
platforms = ["macOS", "iOS"]
gap_policy = "trap"
implicit_platform = "iOS"

[baseline]
iOS = "17.2"
macOS = 14

[naming]
legacy_prefix = "kCF"
reserved = ["default"]
"#;
        let config = EngineConfig::from_toml_str(text, "inline").unwrap();
        assert_eq!(config.platforms, vec![Platform::MacOs, Platform::Ios]);
        assert_eq!(config.gap_policy, GapPolicy::Trap);
        assert_eq!(config.implicit_platform, Some(Platform::Ios));
        assert_eq!(config.baseline.get(Platform::Ios), Some(&Version::new([17, 2])));
        assert_eq!(config.baseline.get(Platform::MacOs), Some(&Version::major(14)));
        assert_eq!(config.naming.legacy_prefix, "kCF");
        assert_eq!(config.naming.reserved, vec!["default".to_string()]);
    }

    #[test]
    fn naming_section_is_optional() {
        let text = r#"
platforms = ["iOS"]
[baseline]
iOS = "16"
"#;
        let config = EngineConfig::from_toml_str(text, "inline").unwrap();
        assert_eq!(config.naming, NamingConfig::default());
        assert!(config.naming.reserved.iter().any(|w| w == "class"));
    }

    #[test]
    fn rejects_missing_baseline() {
        let text = r#"
platforms = ["iOS", "tvOS"]
[baseline]
iOS = "16"
"#;
        let err = EngineConfig::from_toml_str(text, "inline").unwrap_err();
        assert!(err.to_string().contains("missing baseline for tvOS"));
    }

    #[test]
    fn rejects_duplicates_and_unknown_platforms() {
        let dup = r#"
platforms = ["iOS", "iOS"]
[baseline]
iOS = "16"
"#;
        assert!(matches!(
            EngineConfig::from_toml_str(dup, "inline"),
            Err(ConfigError::Invalid(_))
        ));

        let unknown = r#"
platforms = ["android"]
[baseline]
iOS = "16"
"#;
        assert!(matches!(
            EngineConfig::from_toml_str(unknown, "inline"),
            Err(ConfigError::ParseToml { .. })
        ));
    }

    #[test]
    fn rejects_implicit_platform_outside_set() {
        let text = r#"
platforms = ["macOS"]
implicit_platform = "iOS"
[baseline]
macOS = "13"
"#;
        assert!(EngineConfig::from_toml_str(text, "inline").is_err());
    }

    #[test]
    fn default_renders_and_reloads() {
        let config = EngineConfig::default();
        let text = config.to_toml_string().unwrap();
        let reloaded = EngineConfig::from_toml_str(&text, "rendered").unwrap();
        assert_eq!(reloaded, config);
    }
}
