use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::data::filter::AgeRange;
use crate::data::projection::DEFAULT_TOP_K;

/// Dashboard settings. Every field has a default, so a config file only needs
/// the values it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Rows in the Explore ranking.
    pub top_k: usize,
    /// Table preselected in every view.
    pub default_dataset: String,
    /// Bounds of the age slider; also the initial age filter.
    pub age_bounds: AgeRange,
    /// Position labels offered by the position filter.
    pub positions: Vec<String>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        DashboardConfig {
            top_k: DEFAULT_TOP_K,
            default_dataset: "player_defense".to_string(),
            age_bounds: AgeRange::default(),
            positions: ["GK", "DF", "MF", "FW"].map(String::from).to_vec(),
        }
    }
}

impl DashboardConfig {
    /// Read a JSON config file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    /// `default_dataset` if the catalog has it, else the first table id.
    pub fn initial_dataset(&self, table_ids: &[String]) -> Option<String> {
        if table_ids.contains(&self.default_dataset) {
            Some(self.default_dataset.clone())
        } else {
            table_ids.first().cloned()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scout.json");
        std::fs::write(&path, r#"{"top_k": 5, "age_bounds": {"min": 18, "max": 35}}"#).unwrap();

        let config = DashboardConfig::load(&path).unwrap();
        assert_eq!(config.top_k, 5);
        assert_eq!(config.age_bounds, AgeRange::new(18, 35));
        assert_eq!(config.default_dataset, "player_defense");
        assert_eq!(config.positions.len(), 4);
    }

    #[test]
    fn initial_dataset_falls_back_to_first_table() {
        let config = DashboardConfig::default();
        let ids = vec!["player_passing".to_string(), "player_shooting".to_string()];
        assert_eq!(config.initial_dataset(&ids).as_deref(), Some("player_passing"));
        assert_eq!(config.initial_dataset(&[]), None);
    }
}
