use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::model::{AGE_COLUMN, Dataset, POSITION_COLUMN, Row};

// ---------------------------------------------------------------------------
// Filter predicate: age window and position labels
// ---------------------------------------------------------------------------

/// Inclusive age window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgeRange {
    pub min: u32,
    pub max: u32,
}

impl AgeRange {
    pub fn new(min: u32, max: u32) -> Self {
        AgeRange { min, max }
    }

    pub fn contains(&self, age: f64) -> bool {
        age >= f64::from(self.min) && age <= f64::from(self.max)
    }
}

impl Default for AgeRange {
    fn default() -> Self {
        AgeRange { min: 15, max: 40 }
    }
}

/// Row filter shared by the ranking and radar projections.
///
/// An absent age range or an empty position set means "no filter".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    pub age_range: Option<AgeRange>,
    pub positions: BTreeSet<String>,
}

impl FilterCriteria {
    pub fn new(age_range: Option<AgeRange>, positions: &[String]) -> Self {
        FilterCriteria {
            age_range,
            positions: positions.iter().cloned().collect(),
        }
    }

    /// Whether a single row passes both filters.
    ///
    /// * A row with a missing or non-numeric age fails an active age filter.
    /// * Positions like `"DF,MF"` match if any label is selected.
    pub fn matches(&self, row: &Row) -> bool {
        if let Some(range) = self.age_range {
            match row.number(AGE_COLUMN) {
                Some(age) if range.contains(age) => {}
                _ => return false,
            }
        }
        if !self.positions.is_empty() {
            let Some(position) = row.text(POSITION_COLUMN) else {
                return false;
            };
            if !position
                .split(',')
                .any(|label| self.positions.contains(label.trim()))
            {
                return false;
            }
        }
        true
    }
}

/// Return indices of rows that pass the criteria, in source order.
pub fn filtered_indices(dataset: &Dataset, criteria: &FilterCriteria) -> Vec<usize> {
    dataset
        .rows
        .iter()
        .enumerate()
        .filter(|(_, row)| criteria.matches(row))
        .map(|(i, _)| i)
        .collect()
}

/// Materialize the rows passing the criteria as a new dataset.
pub fn filter_rows(dataset: &Dataset, criteria: &FilterCriteria) -> Dataset {
    if *criteria == FilterCriteria::default() {
        return dataset.clone();
    }
    dataset.select_rows(&filtered_indices(dataset, criteria))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Value;

    fn table() -> Dataset {
        let rows = [
            ("A", "GK", Value::String("19-001".into())),
            ("B", "DF,MF", Value::String("25-100".into())),
            ("C", "FW", Value::String("33-300".into())),
            ("D", "MF", Value::Null),
        ]
        .into_iter()
        .map(|(player, position, age)| Row {
            values: [
                ("player".to_string(), Value::String(player.into())),
                ("team".to_string(), Value::String("X".into())),
                ("position".to_string(), Value::String(position.into())),
                ("age".to_string(), age),
            ]
            .into_iter()
            .collect(),
        })
        .collect();
        let columns = ["player", "team", "position", "age"]
            .iter()
            .map(|c| c.to_string())
            .collect();
        Dataset::from_rows("t", columns, rows).unwrap()
    }

    #[test]
    fn no_criteria_passes_everything() {
        let ds = table();
        assert_eq!(filtered_indices(&ds, &FilterCriteria::default()), [0, 1, 2, 3]);
    }

    #[test]
    fn age_bounds_are_inclusive_and_null_age_fails() {
        let ds = table();
        let criteria = FilterCriteria::new(Some(AgeRange::new(19, 25)), &[]);
        assert_eq!(filtered_indices(&ds, &criteria), [0, 1]);
    }

    #[test]
    fn multi_label_position_matches_any_label() {
        let ds = table();
        let criteria = FilterCriteria::new(None, &["MF".to_string()]);
        assert_eq!(filtered_indices(&ds, &criteria), [1, 3]);
    }

    #[test]
    fn filter_rows_materializes_subset() {
        let ds = table();
        let criteria = FilterCriteria::new(None, &["FW".to_string(), "GK".to_string()]);
        let sub = filter_rows(&ds, &criteria);
        let players: Vec<_> = sub.rows.iter().filter_map(Row::player).collect();
        assert_eq!(players, ["A", "C"]);
    }
}
