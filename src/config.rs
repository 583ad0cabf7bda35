use indexmap::IndexMap;
use serde::Deserialize;
use tracing::warn;

use crate::pattern::{PATTERN_ALL, Pattern, PatternError, SemverPattern, TagMatcher};

/// Tag policy configuration: which tags each container may be updated to
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct TagPolicyConfig {
    /// Pattern for containers without their own entry
    pub default_pattern: Option<Pattern>,
    /// Per-container patterns, keyed by container name
    pub containers: IndexMap<String, Pattern>,
    /// Reject invalid patterns instead of treating them as permissive
    pub strict: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid tag pattern '{pattern}' for {target}")]
    InvalidPattern {
        target: String,
        pattern: String,
        #[source]
        source: PatternError,
    },
}

impl TagPolicyConfig {
    /// Parse a JSON configuration and check its patterns
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check every configured pattern.
    ///
    /// Invalid patterns are an error in strict mode and only logged otherwise.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let entries = self
            .default_pattern
            .iter()
            .map(|p| ("default pattern".to_string(), p))
            .chain(
                self.containers
                    .iter()
                    .map(|(name, p)| (format!("container '{}'", name), p)),
            );

        for (target, pattern) in entries {
            let Pattern::Semver(semver) = pattern else {
                continue;
            };
            if semver.is_valid() {
                continue;
            }
            if !self.strict {
                warn!(
                    "Invalid tag pattern '{}' for {}, matching all versions",
                    pattern, target
                );
                continue;
            }
            // Only the strict constructor keeps the parse error
            if let Err(source) = SemverPattern::try_new(semver.expression()) {
                return Err(ConfigError::InvalidPattern {
                    target,
                    pattern: pattern.to_string(),
                    source,
                });
            }
        }

        Ok(())
    }

    /// The pattern for `container`, falling back to the default pattern, then to matching all tags
    pub fn tag_pattern(&self, container: &str) -> Pattern {
        self.containers
            .get(container)
            .or(self.default_pattern.as_ref())
            .cloned()
            .unwrap_or_else(|| PATTERN_ALL.clone())
    }
}
