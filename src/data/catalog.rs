use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};

use super::loader::{SUPPORTED_EXTENSIONS, load_file};
use super::model::Dataset;

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("no table named '{0}'")]
    UnknownTable(String),
}

/// Read-only set of named player tables, loaded once and shared.
#[derive(Debug, Default)]
pub struct Catalog {
    tables: BTreeMap<String, Arc<Dataset>>,
}

impl Catalog {
    /// Load every supported file directly inside `dir`. The table id is the
    /// file stem; a later file with the same stem replaces an earlier one.
    pub fn from_dir(dir: &Path) -> Result<Self> {
        let entries = std::fs::read_dir(dir)
            .with_context(|| format!("reading data directory {}", dir.display()))?;

        let mut paths = Vec::new();
        for entry in entries {
            let path = entry.context("listing data directory")?.path();
            let supported = path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| SUPPORTED_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()));
            if path.is_file() && supported {
                paths.push(path);
            }
        }
        paths.sort();

        let mut tables = BTreeMap::new();
        for path in paths {
            let dataset = load_file(&path)
                .with_context(|| format!("loading {}", path.display()))?;
            log::info!(
                "Loaded table '{}' with {} players and {} columns",
                dataset.id,
                dataset.len(),
                dataset.columns.len()
            );
            tables.insert(dataset.id.clone(), Arc::new(dataset));
        }

        if tables.is_empty() {
            log::warn!("no player tables found in {}", dir.display());
        }
        Ok(Catalog { tables })
    }

    pub fn from_datasets(datasets: impl IntoIterator<Item = Dataset>) -> Self {
        Catalog {
            tables: datasets
                .into_iter()
                .map(|d| (d.id.clone(), Arc::new(d)))
                .collect(),
        }
    }

    /// The table named `id`. Repeated loads return the same shared table.
    pub fn load(&self, id: &str) -> Result<Arc<Dataset>, CatalogError> {
        self.get(id)
            .ok_or_else(|| CatalogError::UnknownTable(id.to_string()))
    }

    pub fn get(&self, id: &str) -> Option<Arc<Dataset>> {
        self.tables.get(id).cloned()
    }

    /// Table ids in sorted order.
    pub fn table_ids(&self) -> Vec<String> {
        self.tables.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_dir_loads_supported_files_only() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("player_defense.csv"), "player,team,tackles\nA,X,3\n")
            .unwrap();
        std::fs::write(
            dir.path().join("player_passing.json"),
            r#"[{"player": "A", "team": "X", "passes": 40}]"#,
        )
        .unwrap();
        std::fs::write(dir.path().join("README.md"), "# data").unwrap();

        let catalog = Catalog::from_dir(dir.path()).unwrap();
        assert_eq!(catalog.table_ids(), ["player_defense", "player_passing"]);

        let first = catalog.load("player_defense").unwrap();
        let again = catalog.load("player_defense").unwrap();
        assert!(Arc::ptr_eq(&first, &again));
        assert!(matches!(catalog.load("nope"), Err(CatalogError::UnknownTable(_))));
    }

    #[test]
    fn invalid_table_aborts_loading() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("broken.csv"), "name,goals\nA,1\n").unwrap();
        assert!(Catalog::from_dir(dir.path()).is_err());
    }
}
