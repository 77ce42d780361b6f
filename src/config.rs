use serde::{Deserialize, Serialize};

use crate::EngineError;

/// Which JOIN shape the wire mapper emits. Both are always accepted on input.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JoinStyle {
    #[default]
    Relationship,
    Legacy,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub join_style: JoinStyle,
    /// Prefix of identifiers generated for unresolved schema references.
    pub placeholder_prefix: String,
    /// Emit the query name as a leading `-- name` comment.
    pub name_comment: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            join_style: JoinStyle::default(),
            placeholder_prefix: "ph-".to_string(),
            name_comment: true,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn legacy_joins() -> Self {
        Self { join_style: JoinStyle::Legacy, ..Self::default() }
    }

    pub fn with_placeholder_prefix(prefix: &str) -> Self {
        Self { placeholder_prefix: prefix.to_string(), ..Self::default() }
    }

    pub fn without_name_comment() -> Self {
        Self { name_comment: false, ..Self::default() }
    }

    pub fn from_json(text: &str) -> Result<Self, EngineError> {
        serde_json::from_str(text).map_err(EngineError::InvalidConfig)
    }
}

#[cfg(test)]
mod tests {
    use crate::{Config, JoinStyle};

    #[test]
    pub fn test_config_defaults() {
        let config = Config::new();

        assert_eq!(config.join_style, JoinStyle::Relationship);
        assert_eq!(config.placeholder_prefix, "ph-");
        assert!(config.name_comment);
    }

    #[test]
    pub fn test_config_from_json_partial() {
        let config = Config::from_json(r#"{"join_style": "Legacy"}"#).expect("Failed to load config");

        assert_eq!(config.join_style, JoinStyle::Legacy);
        assert_eq!(config.placeholder_prefix, "ph-");
    }

    #[test]
    pub fn test_config_from_json_invalid() {
        assert!(Config::from_json("{ nope").is_err());
    }
}
