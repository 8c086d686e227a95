// Copyright 2025 Cowboy AI, LLC.

//! Registry configuration

use crate::errors::{TraitError, TraitResult};
use serde::{Deserialize, Serialize};

/// Policy applied to every composite allocated from a registry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompositionConfig {
    /// Seal a composite on its first instantiation, rejecting later widening
    pub seal_on_instantiate: bool,
    /// Extra static names a composite owns; traits' statics of these names are not copied
    pub reserved_statics: Vec<String>,
}

impl Default for CompositionConfig {
    fn default() -> Self {
        Self {
            seal_on_instantiate: true,
            reserved_statics: vec![],
        }
    }
}

impl CompositionConfig {
    /// Configuration that keeps composites open after instantiation
    pub fn unsealed() -> Self {
        Self {
            seal_on_instantiate: false,
            ..Self::default()
        }
    }

    /// Parse and validate a JSON configuration
    pub fn from_json_str(json: &str) -> TraitResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the configuration for unusable values
    pub fn validate(&self) -> TraitResult<()> {
        if let Some(blank) = self.reserved_statics.iter().find(|n| n.trim().is_empty()) {
            return Err(TraitError::Configuration(format!(
                "reserved static name {blank:?} is blank"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_seals_on_instantiate() {
        let config = CompositionConfig::default();
        assert!(config.seal_on_instantiate);
        assert!(config.reserved_statics.is_empty());
        assert!(!CompositionConfig::unsealed().seal_on_instantiate);
    }

    #[test]
    fn test_from_json_fills_defaults() {
        let config =
            CompositionConfig::from_json_str(r#"{"reserved_statics": ["schema"]}"#).unwrap();
        assert!(config.seal_on_instantiate);
        assert_eq!(config.reserved_statics, vec!["schema".to_string()]);

        let config = CompositionConfig::from_json_str(r#"{"seal_on_instantiate": false}"#).unwrap();
        assert_eq!(config, CompositionConfig::unsealed());
    }

    #[test]
    fn test_invalid_configuration() {
        assert!(matches!(
            CompositionConfig::from_json_str("{not json"),
            Err(TraitError::Configuration(_))
        ));
        assert!(matches!(
            CompositionConfig::from_json_str(r#"{"reserved_statics": ["  "]}"#),
            Err(TraitError::Configuration(_))
        ));
    }
}
