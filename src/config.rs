//! Land configuration, loaded from `config.toml`.

use std::path::Path;

use serde::Deserialize;

use crate::error::ConfigError;

const DEFAULT_CONFIG: &str = include_str!("../config.toml");

/// Top-level config file layout.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LandsConfig {
    pub management: ManagementConfig,
    pub regions: RegionsConfig,
    pub claims: ClaimsConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ManagementConfig {
    /// Let non-owner members manage members/roles through their role's
    /// MANAGE_MEMBERS / MANAGE_ROLES permissions. Off: owner only.
    pub delegated_admins: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RegionsConfig {
    /// Repeat the merge pass until nothing merges, instead of one pass.
    pub merge_until_stable: bool,
}

impl Default for RegionsConfig {
    fn default() -> Self {
        Self {
            merge_until_stable: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ClaimsConfig {
    /// Reject claims that would leave a land with more stored cuboids than this.
    pub max_regions_per_land: Option<usize>,
}

impl LandsConfig {
    /// Load config from a TOML file. A missing file is created from the bundled default.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            let text = std::fs::read_to_string(path).map_err(ConfigError::Read)?;
            Self::from_toml_str(&text)
        } else {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).map_err(ConfigError::Write)?;
            }
            std::fs::write(path, DEFAULT_CONFIG).map_err(ConfigError::Write)?;
            log::info!("lands_pmc: Created default config at {path:?}");
            Self::from_toml_str(DEFAULT_CONFIG)
        }
    }

    /// Parse config text. Each documented key left out of `text` falls back to
    /// its default with a warning.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let table: toml::Table = toml::from_str(text)?;
        for key in missing_keys(&table) {
            log::warn!("lands_pmc: Config key {key} not set, using default");
        }
        Ok(toml::Value::Table(table).try_into()?)
    }
}

/// Keys with a default that are expected in the file. Optional limits such as
/// `claims.max_regions_per_land` are absent on purpose and not listed.
const EXPECTED_KEYS: [(&str, &str); 2] = [
    ("management", "delegated_admins"),
    ("regions", "merge_until_stable"),
];

fn missing_keys(table: &toml::Table) -> Vec<String> {
    EXPECTED_KEYS
        .iter()
        .filter(|(section, key)| {
            !table
                .get(*section)
                .and_then(toml::Value::as_table)
                .is_some_and(|t| t.contains_key(*key))
        })
        .map(|(section, key)| format!("{section}.{key}"))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_config_matches_default() {
        let parsed = LandsConfig::from_toml_str(DEFAULT_CONFIG).expect("bundled config parses");
        assert_eq!(parsed, LandsConfig::default());
    }

    #[test]
    fn missing_sections_fall_back_to_defaults() {
        let parsed = LandsConfig::from_toml_str("[management]\ndelegated_admins = true\n")
            .expect("partial config parses");
        assert!(parsed.management.delegated_admins);
        assert!(parsed.regions.merge_until_stable);
        assert_eq!(parsed.claims.max_regions_per_land, None);
    }

    #[test]
    fn reports_keys_that_fall_back() {
        let table: toml::Table = toml::from_str("[management]\ndelegated_admins = true\n")
            .expect("valid toml");
        assert_eq!(missing_keys(&table), vec!["regions.merge_until_stable".to_owned()]);

        let bundled: toml::Table = toml::from_str(DEFAULT_CONFIG).expect("valid toml");
        assert!(missing_keys(&bundled).is_empty());
    }

    #[test]
    fn bad_types_are_reported() {
        let err = LandsConfig::from_toml_str("[claims]\nmax_regions_per_land = \"lots\"\n")
            .expect_err("string is not a count");
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn load_writes_default_when_missing() {
        let dir = std::env::temp_dir().join(format!("lands_pmc-{}", uuid::Uuid::new_v4()));
        let path = dir.join("config.toml");
        let loaded = LandsConfig::load(&path).expect("default written and parsed");
        assert_eq!(loaded, LandsConfig::default());
        assert!(path.exists());

        std::fs::write(&path, "[regions]\nmerge_until_stable = false\n").expect("writable");
        let reloaded = LandsConfig::load(&path).expect("existing file parsed");
        assert!(!reloaded.regions.merge_until_stable);
        let _ = std::fs::remove_dir_all(dir);
    }
}
