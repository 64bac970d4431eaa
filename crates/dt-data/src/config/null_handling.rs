//! Null markers in text input

use serde::{Serialize, Deserialize};

/// Which cell texts load as null
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NullConfig {
    /// Cell texts treated as null
    pub patterns: Vec<String>,

    /// Trim whitespace before matching
    pub trim_whitespace: bool,

    pub case_sensitive: bool,
}

impl Default for NullConfig {
    fn default() -> Self {
        Self {
            patterns: ["", "-", "N/A", "null", "None", "NaN"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            trim_whitespace: true,
            case_sensitive: false,
        }
    }
}

impl NullConfig {
    /// Check if a cell should load as null
    pub fn is_null(&self, value: &str) -> bool {
        let value = if self.trim_whitespace { value.trim() } else { value };

        self.patterns.iter().any(|pattern| {
            if self.case_sensitive {
                value == pattern
            } else {
                value.eq_ignore_ascii_case(pattern)
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_patterns() {
        let config = NullConfig::default();
        assert!(config.is_null(""));
        assert!(config.is_null("  n/a "));
        assert!(config.is_null("NULL"));
        assert!(!config.is_null("0"));
    }

    #[test]
    fn test_case_sensitive() {
        let config = NullConfig {
            patterns: vec!["NA".to_string()],
            trim_whitespace: false,
            case_sensitive: true,
        };
        assert!(config.is_null("NA"));
        assert!(!config.is_null("na"));
        assert!(!config.is_null(" NA"));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: NullConfig = serde_json::from_str(r#"{"case_sensitive": true}"#).unwrap();
        assert!(config.case_sensitive);
        assert!(config.trim_whitespace);
        assert!(config.is_null("-"));
    }
}
