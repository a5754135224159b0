//! Pure projections over a player table: option lists, rankings, normalized
//! vectors and chart series. Nothing here keeps state between calls.

use std::collections::BTreeSet;

use super::filter::{AgeRange, FilterCriteria};
use super::model::{Dataset, PLAYER_COLUMN, Row, TEAM_COLUMN, Value};

/// Columns never offered as features, whatever the table.
pub const EXCLUDED_COLUMNS: &[&str] = &["birth_year", "club"];

/// Columns left off radar axes.
const RADAR_EXCLUDED: &[&str] = &["age", "position"];

pub const DEFAULT_TOP_K: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureKind {
    /// Every non-key, non-excluded column.
    All,
    /// Only columns of numeric semantic type.
    Numeric,
}

// ---------------------------------------------------------------------------
// Option lists
// ---------------------------------------------------------------------------

/// Selectable feature columns in lexicographic order.
pub fn feature_options(dataset: &Dataset, kind: FeatureKind) -> Vec<String> {
    dataset
        .columns
        .iter()
        .filter(|c| c.name != PLAYER_COLUMN && c.name != TEAM_COLUMN)
        .filter(|c| !EXCLUDED_COLUMNS.contains(&c.name.as_str()))
        .filter(|c| kind == FeatureKind::All || dataset.is_numeric(&c.name))
        .map(|c| c.name.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Distinct teams, sorted.
pub fn team_options(dataset: &Dataset) -> Vec<String> {
    dataset
        .unique_values(TEAM_COLUMN)
        .iter()
        .filter_map(Value::as_str)
        .map(str::to_string)
        .collect()
}

/// Distinct players of the given teams in order of first appearance.
///
/// No teams means no players, not every player.
pub fn player_options(dataset: &Dataset, teams: &[String]) -> Vec<String> {
    if teams.is_empty() {
        return Vec::new();
    }
    distinct_players(dataset.rows.iter().filter(|row| {
        row.text(TEAM_COLUMN)
            .is_some_and(|team| teams.iter().any(|t| t == team))
    }))
}

/// Every distinct player in order of first appearance.
pub fn all_players(dataset: &Dataset) -> Vec<String> {
    distinct_players(dataset.rows.iter())
}

fn distinct_players<'a>(rows: impl Iterator<Item = &'a Row>) -> Vec<String> {
    let mut seen = BTreeSet::new();
    rows.filter_map(Row::player)
        .filter(|p| seen.insert(*p))
        .map(str::to_string)
        .collect()
}

// ---------------------------------------------------------------------------
// Feature fallback
// ---------------------------------------------------------------------------

/// Keep `requested` if it is valid, otherwise use the lexicographically first
/// valid feature. `None` only when there is nothing valid at all.
pub fn feature_fallback(requested: Option<&str>, valid: &[String]) -> Option<String> {
    match requested {
        Some(feature) if valid.iter().any(|v| v == feature) => Some(feature.to_string()),
        _ => {
            let fallback = valid.iter().min().cloned();
            log::debug!("feature {requested:?} not available, falling back to {fallback:?}");
            fallback
        }
    }
}

/// Keep the valid requested features (request order, no duplicates); if none
/// survive, use every valid feature.
pub fn features_or_all(requested: &[String], valid: &[String]) -> Vec<String> {
    let mut kept: Vec<String> = Vec::new();
    for feature in requested {
        if valid.contains(feature) && !kept.contains(feature) {
            kept.push(feature.clone());
        }
    }
    if kept.is_empty() {
        valid.to_vec()
    } else {
        kept
    }
}

// ---------------------------------------------------------------------------
// Ranking
// ---------------------------------------------------------------------------

/// One row of a ranked table.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedRow {
    /// Row index in the source table.
    pub index: usize,
    pub player: String,
    pub team: Option<String>,
    pub value: f64,
}

/// The `k` highest rows by `feature` after the age and position filters.
///
/// Ties keep source row order. Rows without a numeric value for `feature`
/// are not ranked; an unknown feature yields an empty table.
pub fn top_k(
    dataset: &Dataset,
    feature: &str,
    k: usize,
    age_range: Option<AgeRange>,
    positions: &[String],
) -> Vec<RankedRow> {
    if !dataset.has_column(feature) {
        return Vec::new();
    }
    let criteria = FilterCriteria::new(age_range, positions);

    let mut ranked: Vec<RankedRow> = dataset
        .rows
        .iter()
        .enumerate()
        .filter(|(_, row)| criteria.matches(row))
        .filter_map(|(index, row)| {
            let value = row.number(feature)?;
            if value.is_nan() {
                return None;
            }
            Some(RankedRow {
                index,
                player: row.player()?.to_string(),
                team: row.text(TEAM_COLUMN).map(str::to_string),
                value,
            })
        })
        .collect();

    // sort_by is stable, so equal values stay in source order
    ranked.sort_by(|a, b| b.value.total_cmp(&a.value));
    ranked.truncate(k);
    ranked
}

// ---------------------------------------------------------------------------
// Normalization and scaling
// ---------------------------------------------------------------------------

/// Copy of `dataset` with each listed numeric column min-max scaled to [0, 1]
/// over the rows present in `dataset`.
///
/// A zero-variance column maps every value to `0.0`. Nulls stay null,
/// non-finite values become null and non-numeric columns are left untouched.
pub fn normalize(dataset: &Dataset, numeric_columns: &[String]) -> Dataset {
    let mut out = dataset.clone();
    for column in numeric_columns {
        if !dataset.is_numeric(column) {
            continue;
        }
        let Some((min, max)) = column_range(dataset, column) else {
            continue;
        };
        let span = max - min;
        for row in &mut out.rows {
            let Some(value) = row.values.get_mut(column) else {
                continue;
            };
            match value.as_f64() {
                Some(v) if v.is_finite() => {
                    let scaled = if span > 0.0 { (v - min) / span } else { 0.0 };
                    *value = Value::Float(scaled);
                }
                Some(_) => *value = Value::Null,
                None => {}
            }
        }
    }
    out
}

fn column_range(dataset: &Dataset, column: &str) -> Option<(f64, f64)> {
    dataset
        .rows
        .iter()
        .filter_map(|r| r.number(column))
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

/// Largest value across every listed feature and every row; `0.0` if none.
///
/// This is one bound shared by all radar axes, so per-feature fairness needs
/// [`normalize`] first.
pub fn radar_scale(dataset: &Dataset, features: &[String]) -> f64 {
    features
        .iter()
        .filter_map(|f| column_range(dataset, f))
        .map(|(_, hi)| hi)
        .fold(0.0, f64::max)
}

pub fn is_radar_feature(column: &str) -> bool {
    !RADAR_EXCLUDED.contains(&column)
}

// ---------------------------------------------------------------------------
// Chart series
// ---------------------------------------------------------------------------

/// Values of one player across a list of features.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub player: String,
    pub values: Vec<Option<f64>>,
}

/// Grouped bars: one series per player over `features`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BarChart {
    pub features: Vec<String>,
    pub series: Vec<Series>,
}

/// Radar polygons sharing one radial bound.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RadarChart {
    pub features: Vec<String>,
    pub series: Vec<Series>,
    /// Upper bound of the radial axis.
    pub scale: f64,
}

impl BarChart {
    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

impl RadarChart {
    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

/// First row of each player, values in `features` order. Unknown players are
/// skipped.
pub fn player_series(dataset: &Dataset, players: &[String], features: &[String]) -> Vec<Series> {
    players
        .iter()
        .filter_map(|player| {
            let row = dataset.find_player(player)?;
            Some(Series {
                player: player.clone(),
                values: features.iter().map(|f| row.number(f)).collect(),
            })
        })
        .collect()
}

pub fn bar_chart(dataset: &Dataset, players: &[String], features: &[String]) -> BarChart {
    BarChart {
        features: features.to_vec(),
        series: player_series(dataset, players, features),
    }
}

/// Radar over an already normalized dataset.
///
/// Non-numeric and radar-excluded features are dropped; the radial bound is
/// the shared [`radar_scale`] but never below `1.0`.
pub fn radar_chart(normalized: &Dataset, players: &[String], features: &[String]) -> RadarChart {
    let features: Vec<String> = features
        .iter()
        .filter(|f| is_radar_feature(f) && normalized.is_numeric(f))
        .cloned()
        .collect();
    if players.is_empty() || features.is_empty() {
        return RadarChart::default();
    }
    RadarChart {
        scale: radar_scale(normalized, &features).max(1.0),
        series: player_series(normalized, players, &features),
        features,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(v: &str) -> String {
        v.to_string()
    }

    fn table(rows: &[(&str, &str, &str, f64, f64)]) -> Dataset {
        let rows = rows
            .iter()
            .map(|&(player, team, position, age, feat)| Row {
                values: [
                    (s("player"), Value::String(s(player))),
                    (s("team"), Value::String(s(team))),
                    (s("position"), Value::String(s(position))),
                    (s("age"), Value::Float(age)),
                    (s("feat"), Value::Float(feat)),
                    (s("flat"), Value::Integer(4)),
                    (s("birth_year"), Value::Integer(1990)),
                    (s("club"), Value::String(s("FC"))),
                ]
                .into_iter()
                .collect(),
            })
            .collect();
        let columns = ["player", "team", "position", "age", "feat", "flat", "birth_year", "club"]
            .map(s)
            .to_vec();
        Dataset::from_rows("d", columns, rows).unwrap()
    }

    fn scenario() -> Dataset {
        table(&[
            ("P1", "X", "DF", 20.0, 10.0),
            ("P2", "Y", "MF", 25.0, 30.0),
            ("P3", "X", "FW", 30.0, 20.0),
        ])
    }

    #[test]
    fn feature_options_drop_keys_and_excluded_columns() {
        let ds = scenario();
        assert_eq!(
            feature_options(&ds, FeatureKind::All),
            ["age", "feat", "flat", "position"].map(s)
        );
        assert_eq!(
            feature_options(&ds, FeatureKind::Numeric),
            ["age", "feat", "flat"].map(s)
        );
    }

    #[test]
    fn player_options_narrow_by_team() {
        let ds = scenario();
        assert_eq!(team_options(&ds), ["X", "Y"].map(s));
        assert_eq!(player_options(&ds, &[s("X")]), ["P1", "P3"].map(s));
        assert!(player_options(&ds, &[]).is_empty());
        assert!(player_options(&ds, &[s("Nowhere")]).is_empty());
    }

    #[test]
    fn top_k_ranks_descending_and_truncates() {
        let ds = scenario();
        let top = top_k(&ds, "feat", 2, None, &[]);
        let got: Vec<_> = top.iter().map(|r| (r.player.as_str(), r.value)).collect();
        assert_eq!(got, [("P2", 30.0), ("P3", 20.0)]);
    }

    #[test]
    fn top_k_breaks_ties_by_row_order_and_is_deterministic() {
        let ds = table(&[
            ("A", "X", "DF", 20.0, 5.0),
            ("B", "X", "DF", 20.0, 9.0),
            ("C", "X", "DF", 20.0, 5.0),
            ("D", "X", "DF", 20.0, 5.0),
        ]);
        let first = top_k(&ds, "feat", DEFAULT_TOP_K, None, &[]);
        let second = top_k(&ds, "feat", DEFAULT_TOP_K, None, &[]);
        assert_eq!(first, second);
        let order: Vec<_> = first.iter().map(|r| r.index).collect();
        assert_eq!(order, [1, 0, 2, 3]);
    }

    #[test]
    fn top_k_applies_filters_before_ranking() {
        let ds = scenario();
        let top = top_k(&ds, "feat", 10, Some(AgeRange::new(18, 26)), &[s("DF")]);
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].player, "P1");
        assert!(top_k(&ds, "feat", 10, Some(AgeRange::new(40, 45)), &[]).is_empty());
        assert!(top_k(&ds, "missing", 10, None, &[]).is_empty());
    }

    #[test]
    fn normalize_spans_unit_interval() {
        let ds = scenario();
        let n = normalize(&ds, &[s("feat"), s("age")]);
        let feats: Vec<f64> = n.rows.iter().filter_map(|r| r.number("feat")).collect();
        assert_eq!(feats, [0.0, 1.0, 0.5]);
        assert!(feats.iter().all(|v| (0.0..=1.0).contains(v)));
        assert_eq!(n.rows[2].number("age"), Some(1.0));
    }

    #[test]
    fn normalize_maps_zero_variance_to_zero() {
        let ds = scenario();
        let n = normalize(&ds, &[s("flat")]);
        assert!(n.rows.iter().all(|r| r.number("flat") == Some(0.0)));
    }

    #[test]
    fn normalize_drops_infinite_values() {
        let ds = table(&[
            ("P1", "X", "DF", 20.0, 10.0),
            ("P2", "Y", "MF", 25.0, f64::INFINITY),
            ("P3", "X", "FW", 30.0, 20.0),
        ]);
        let n = normalize(&ds, &[s("feat")]);
        assert_eq!(n.rows[0].number("feat"), Some(0.0));
        assert_eq!(n.rows[1].get("feat"), Some(&Value::Null));
        assert_eq!(n.rows[2].number("feat"), Some(1.0));
    }

    #[test]
    fn normalize_uses_only_present_rows() {
        let ds = scenario().select_rows(&[0, 2]);
        let n = normalize(&ds, &[s("feat")]);
        let feats: Vec<f64> = n.rows.iter().filter_map(|r| r.number("feat")).collect();
        assert_eq!(feats, [0.0, 1.0]);
    }

    #[test]
    fn fallback_picks_lexicographic_first() {
        let valid = ["tackles", "blocks", "interceptions"].map(s);
        assert_eq!(feature_fallback(Some("blocks"), &valid), Some(s("blocks")));
        assert_eq!(feature_fallback(Some("goals"), &valid), Some(s("blocks")));
        assert_eq!(feature_fallback(None, &valid), Some(s("blocks")));
        assert_eq!(feature_fallback(Some("goals"), &[]), None);
    }

    #[test]
    fn features_or_all_drops_stale_entries() {
        let valid = ["a", "b", "c"].map(s);
        assert_eq!(features_or_all(&["c", "x", "c", "a"].map(s), &valid), ["c", "a"].map(s));
        assert_eq!(features_or_all(&[s("x")], &valid), valid.to_vec());
    }

    #[test]
    fn radar_scale_is_dataset_wide_max() {
        let ds = scenario();
        assert_eq!(radar_scale(&ds, &[s("feat"), s("age")]), 30.0);
        assert_eq!(radar_scale(&ds, &[s("position")]), 0.0);
    }

    #[test]
    fn radar_chart_skips_excluded_axes_and_unknown_players() {
        let ds = scenario();
        let features = ["age", "feat", "flat", "position"].map(s);
        let n = normalize(&ds, &features);
        let chart = radar_chart(&n, &[s("P2"), s("Ghost")], &features);
        assert_eq!(chart.features, ["feat", "flat"].map(s));
        assert_eq!(chart.scale, 1.0);
        assert_eq!(chart.series.len(), 1);
        assert_eq!(chart.series[0].values, [Some(1.0), Some(0.0)]);
    }

    #[test]
    fn bar_chart_keeps_raw_values() {
        let ds = scenario();
        let chart = bar_chart(&ds, &[s("P3"), s("P1")], &[s("feat")]);
        let values: Vec<_> = chart.series.iter().map(|s| s.values[0]).collect();
        assert_eq!(values, [Some(20.0), Some(10.0)]);
    }
}
