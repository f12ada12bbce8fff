//! Configuration for the draft workspace.

use draft_access::Visibility;
use serde::{Deserialize, Serialize};

/// Configuration for a [`crate::DraftWorkspace`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkspaceConfig {
    /// Visibility applied when a new draft does not specify one
    pub default_visibility: Visibility,
    /// Input limits
    pub limits: LimitsConfig,
    /// Decision audit trail
    pub audit: AuditConfig,
    /// Tracing output
    pub logging: LoggingConfig,
}

impl WorkspaceConfig {
    /// Load config from YAML.
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    /// Serialize to YAML.
    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }
}

/// Limits on caller-supplied text.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum title length in characters
    pub max_title_len: usize,
    /// Maximum topic length in characters
    pub max_topic_len: usize,
    /// Maximum comment length in characters
    pub max_comment_len: usize,
    /// Number of drafts listed as recent in workspace statistics
    pub recent_drafts: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_title_len: 255,
            max_topic_len: 100,
            max_comment_len: 10_000,
            recent_drafts: 5,
        }
    }
}

/// Audit trail configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditConfig {
    /// Record every lifecycle decision
    pub enabled: bool,
    /// Entries retained before the oldest are pruned
    pub max_entries: usize,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_entries: 10_000,
        }
    }
}

/// Output format for tracing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter used when `RUST_LOG` is unset
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = WorkspaceConfig::default();
        assert_eq!(config.default_visibility, Visibility::Hidden);
        assert_eq!(config.limits.max_title_len, 255);
        assert_eq!(config.limits.max_topic_len, 100);
        assert_eq!(config.limits.recent_drafts, 5);
        assert!(config.audit.enabled);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_yaml_roundtrip() {
        let config = WorkspaceConfig::default();
        let yaml = config.to_yaml().unwrap();
        let parsed = WorkspaceConfig::from_yaml(&yaml).unwrap();

        assert_eq!(parsed.default_visibility, config.default_visibility);
        assert_eq!(parsed.limits.max_comment_len, config.limits.max_comment_len);
        assert_eq!(parsed.logging.format, config.logging.format);
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let yaml = r#"
default_visibility: constituents
limits:
  recent_drafts: 10
logging:
  format: json
"#;
        let config = WorkspaceConfig::from_yaml(yaml).unwrap();

        assert_eq!(config.default_visibility, Visibility::Constituents);
        assert_eq!(config.limits.recent_drafts, 10);
        assert_eq!(config.limits.max_title_len, 255);
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.logging.level, "info");
        assert!(config.audit.enabled);
    }

    #[test]
    fn test_unknown_visibility_rejected() {
        assert!(WorkspaceConfig::from_yaml("default_visibility: secret").is_err());
    }
}
