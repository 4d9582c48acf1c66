//! Engine configuration

use std::env;

use anyhow::{Context, Result};
use talent_tree_domain::DEFAULT_MAX_LEVEL;

pub const DEFAULT_FLAG_SCOPE: &str = "daggerheart-talent-tree";
pub const DEFAULT_FLAG_KEY: &str = "talentTree";

/// Engine configuration loaded from environment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TalentTreeConfig {
    /// Flag scope the tree is stored under on each character
    pub flag_scope: String,
    /// Flag key within the scope
    pub flag_key: String,
    /// Level cap of the current rules version; older saves are raised to it
    pub max_level: u32,
    /// Mirror saves made by privileged users into the legacy world table
    pub legacy_mirror: bool,
}

impl Default for TalentTreeConfig {
    fn default() -> Self {
        Self {
            flag_scope: DEFAULT_FLAG_SCOPE.to_string(),
            flag_key: DEFAULT_FLAG_KEY.to_string(),
            max_level: DEFAULT_MAX_LEVEL,
            legacy_mirror: true,
        }
    }
}

impl TalentTreeConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            flag_scope: lookup("TALENT_TREE_FLAG_SCOPE").unwrap_or(defaults.flag_scope),
            flag_key: lookup("TALENT_TREE_FLAG_KEY").unwrap_or(defaults.flag_key),
            max_level: match lookup("TALENT_TREE_MAX_LEVEL") {
                Some(raw) => raw
                    .trim()
                    .parse()
                    .context("TALENT_TREE_MAX_LEVEL must be a non-negative integer")?,
                None => defaults.max_level,
            },
            legacy_mirror: match lookup("TALENT_TREE_LEGACY_MIRROR") {
                Some(raw) => parse_bool(&raw)
                    .context("TALENT_TREE_LEGACY_MIRROR must be true/false")?,
                None => defaults.legacy_mirror,
            },
        })
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<TalentTreeConfig> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        TalentTreeConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_when_unset() {
        let config = load(&[]).expect("config");
        assert_eq!(config, TalentTreeConfig::default());
        assert_eq!(config.flag_scope, "daggerheart-talent-tree");
        assert_eq!(config.flag_key, "talentTree");
        assert_eq!(config.max_level, 11);
        assert!(config.legacy_mirror);
    }

    #[test]
    fn overrides_are_parsed() {
        let config = load(&[
            ("TALENT_TREE_FLAG_SCOPE", "my-module"),
            ("TALENT_TREE_MAX_LEVEL", " 20 "),
            ("TALENT_TREE_LEGACY_MIRROR", "off"),
        ])
        .expect("config");
        assert_eq!(config.flag_scope, "my-module");
        assert_eq!(config.flag_key, "talentTree");
        assert_eq!(config.max_level, 20);
        assert!(!config.legacy_mirror);
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(load(&[("TALENT_TREE_MAX_LEVEL", "eleven")]).is_err());
        assert!(load(&[("TALENT_TREE_LEGACY_MIRROR", "maybe")]).is_err());
    }
}
