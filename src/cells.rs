//! Cell declarations for the three views.
//!
//! Every view reads its own table through the catalog, derives its option
//! lists from that table and builds its charts from the options. Only the
//! Compare charts read the shared selection.

use std::sync::Arc;

use crate::config::DashboardConfig;
use crate::data::catalog::Catalog;
use crate::data::filter::{AgeRange, FilterCriteria, filter_rows};
use crate::data::model::{AGE_COLUMN, Dataset};
use crate::data::projection::{
    FeatureKind, all_players, bar_chart, feature_fallback, feature_options, features_or_all,
    is_radar_feature, normalize, player_options, radar_chart, team_options, top_k, BarChart,
    RadarChart, RankedRow,
};
use crate::reactive::{GraphBuilder, Scope};
use crate::selection::{SELECTED_PLAYERS, Selection};
use crate::view::View;

/// A view's current table; `None` when nothing (or an unknown id) is chosen.
pub type Table = Option<Arc<Dataset>>;

pub mod explore {
    pub const DATASET: &str = "explore.dataset";
    pub const FEATURE: &str = "explore.feature";
    pub const AGE_RANGE: &str = "explore.age_range";
    pub const POSITIONS: &str = "explore.positions";
    pub const HOVERED: &str = "explore.hovered";

    pub const TABLE: &str = "explore.table";
    pub const FEATURES: &str = "explore.features";
    pub const ACTIVE_FEATURE: &str = "explore.active_feature";
    pub const TOP_PLAYERS: &str = "explore.top_players";
    pub const RADAR: &str = "explore.radar";
}

pub mod search {
    pub const DATASET: &str = "search.dataset";
    pub const FEATURES: &str = "search.features";
    pub const TEAMS: &str = "search.teams";
    pub const PLAYERS: &str = "search.players";

    pub const TABLE: &str = "search.table";
    pub const FEATURE_OPTIONS: &str = "search.feature_options";
    pub const TEAM_OPTIONS: &str = "search.team_options";
    pub const PLAYER_OPTIONS: &str = "search.player_options";
    pub const ACTIVE_FEATURES: &str = "search.active_features";
    pub const ACTIVE_PLAYERS: &str = "search.active_players";
    pub const BARS: &str = "search.bars";
    pub const RADAR: &str = "search.radar";
}

pub mod compare {
    pub const DATASET: &str = "compare.dataset";
    pub const FEATURES: &str = "compare.features";

    pub const TABLE: &str = "compare.table";
    pub const FEATURE_OPTIONS: &str = "compare.feature_options";
    pub const ACTIVE_FEATURES: &str = "compare.active_features";
    pub const NORMALIZED: &str = "compare.normalized";
    pub const BARS: &str = "compare.bars";
    pub const RADAR: &str = "compare.radar";
}

/// An input cleared together with a dataset switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reset {
    /// A multi-choice input, set to an empty list.
    List(&'static str),
    /// A single-choice input, set to `None`.
    Choice(&'static str),
}

/// Inputs cleared in the same batch as a dataset switch, keyed by the
/// dataset input. Explore keeps its feature and relies on the fallback.
pub fn dataset_resets(dataset_field: &str) -> &'static [Reset] {
    match dataset_field {
        explore::DATASET => &[Reset::Choice(explore::HOVERED)],
        search::DATASET => &[
            Reset::List(search::FEATURES),
            Reset::List(search::TEAMS),
            Reset::List(search::PLAYERS),
        ],
        compare::DATASET => &[Reset::List(compare::FEATURES)],
        _ => &[],
    }
}

pub fn is_dataset_field(field: &str) -> bool {
    matches!(field, explore::DATASET | search::DATASET | compare::DATASET)
}

/// Declare the cells of every view.
pub fn declare(
    builder: &mut GraphBuilder,
    catalog: &Arc<Catalog>,
    config: &DashboardConfig,
    dataset: Option<String>,
) {
    declare_explore(builder, catalog, config, dataset.clone());
    declare_search(builder, catalog, dataset.clone());
    declare_compare(builder, catalog, dataset);
}

fn register_table(
    builder: &mut GraphBuilder,
    name: &str,
    dataset_input: &'static str,
    scope: Scope,
    catalog: &Arc<Catalog>,
) {
    let catalog = Arc::clone(catalog);
    builder
        .register_computed(name, &[dataset_input], move |d| {
            let id = d.get::<Option<String>>(dataset_input)?;
            let table = id.as_deref().and_then(|id| catalog.get(id));
            if table.is_none() && id.is_some() {
                log::warn!("table {id:?} is not in the catalog");
            }
            Ok(table)
        })
        .scope(scope);
}

fn numeric_features(table: &Table) -> Vec<String> {
    table
        .as_deref()
        .map(|t| feature_options(t, FeatureKind::Numeric))
        .unwrap_or_default()
}

fn declare_explore(
    b: &mut GraphBuilder,
    catalog: &Arc<Catalog>,
    config: &DashboardConfig,
    dataset: Option<String>,
) {
    use explore::*;
    let scope = View::Explore.scope();

    b.register_input(DATASET, dataset).scope(scope);
    b.register_input(FEATURE, Some(AGE_COLUMN.to_string())).scope(scope);
    b.register_input(AGE_RANGE, config.age_bounds).scope(scope);
    b.register_input(POSITIONS, Vec::<String>::new()).scope(scope);
    b.register_input(HOVERED, None::<String>).scope(scope);

    register_table(b, TABLE, DATASET, scope, catalog);

    b.register_computed(FEATURES, &[TABLE], |d| {
        Ok(numeric_features(d.get::<Table>(TABLE)?))
    })
    .scope(scope)
    .renderable();

    b.register_computed(ACTIVE_FEATURE, &[FEATURE, FEATURES], |d| {
        let requested = d.get::<Option<String>>(FEATURE)?;
        Ok(feature_fallback(requested.as_deref(), d.get::<Vec<String>>(FEATURES)?))
    })
    .scope(scope)
    .renderable();

    let k = config.top_k;
    b.register_computed(
        TOP_PLAYERS,
        &[TABLE, ACTIVE_FEATURE, AGE_RANGE, POSITIONS],
        move |d| -> Result<Vec<RankedRow>, _> {
            let table = d.get::<Table>(TABLE)?;
            let feature = d.get::<Option<String>>(ACTIVE_FEATURE)?;
            let (Some(table), Some(feature)) = (table, feature) else {
                return Ok(Vec::new());
            };
            let ages = *d.get::<AgeRange>(AGE_RANGE)?;
            Ok(top_k(table, feature, k, Some(ages), d.get::<Vec<String>>(POSITIONS)?))
        },
    )
    .scope(scope)
    .renderable();

    // hovered player against the rows that pass the current filters
    b.register_computed(RADAR, &[TABLE, HOVERED, AGE_RANGE, POSITIONS], |d| {
        let table = d.get::<Table>(TABLE)?;
        let hovered = d.get::<Option<String>>(HOVERED)?;
        let (Some(table), Some(player)) = (table, hovered) else {
            return Ok(RadarChart::default());
        };
        let criteria = FilterCriteria::new(
            Some(*d.get::<AgeRange>(AGE_RANGE)?),
            d.get::<Vec<String>>(POSITIONS)?,
        );
        let rows = filter_rows(table, &criteria);
        let features: Vec<String> = feature_options(&rows, FeatureKind::Numeric)
            .into_iter()
            .filter(|f| is_radar_feature(f))
            .collect();
        let normalized = normalize(&rows, &features);
        Ok(radar_chart(&normalized, std::slice::from_ref(player), &features))
    })
    .scope(scope)
    .renderable();
}

fn declare_search(b: &mut GraphBuilder, catalog: &Arc<Catalog>, dataset: Option<String>) {
    use search::*;
    let scope = View::Search.scope();

    b.register_input(DATASET, dataset).scope(scope);
    b.register_input(FEATURES, Vec::<String>::new()).scope(scope);
    b.register_input(TEAMS, Vec::<String>::new()).scope(scope);
    b.register_input(PLAYERS, Vec::<String>::new()).scope(scope);

    register_table(b, TABLE, DATASET, scope, catalog);

    b.register_computed(FEATURE_OPTIONS, &[TABLE], |d| {
        Ok(numeric_features(d.get::<Table>(TABLE)?))
    })
    .scope(scope)
    .renderable();

    b.register_computed(TEAM_OPTIONS, &[TABLE], |d| {
        Ok(d.get::<Table>(TABLE)?
            .as_deref()
            .map(team_options)
            .unwrap_or_default())
    })
    .scope(scope)
    .renderable();

    b.register_computed(PLAYER_OPTIONS, &[TABLE, TEAMS], |d| {
        let teams = d.get::<Vec<String>>(TEAMS)?;
        Ok(d.get::<Table>(TABLE)?
            .as_deref()
            .map(|t| player_options(t, teams))
            .unwrap_or_default())
    })
    .scope(scope)
    .renderable();

    b.register_computed(ACTIVE_FEATURES, &[FEATURES, FEATURE_OPTIONS], |d| {
        Ok(features_or_all(
            d.get::<Vec<String>>(FEATURES)?,
            d.get::<Vec<String>>(FEATURE_OPTIONS)?,
        ))
    })
    .scope(scope);

    // chosen players that the team filter still offers
    b.register_computed(ACTIVE_PLAYERS, &[PLAYERS, PLAYER_OPTIONS], |d| {
        let options = d.get::<Vec<String>>(PLAYER_OPTIONS)?;
        Ok(d.get::<Vec<String>>(PLAYERS)?
            .iter()
            .filter(|p| options.contains(p))
            .cloned()
            .collect::<Vec<String>>())
    })
    .scope(scope);

    b.register_computed(BARS, &[TABLE, ACTIVE_PLAYERS, ACTIVE_FEATURES], |d| {
        let Some(table) = d.get::<Table>(TABLE)? else {
            return Ok(BarChart::default());
        };
        let chosen = d.get::<Vec<String>>(ACTIVE_PLAYERS)?;
        let players = if chosen.is_empty() {
            all_players(table)
        } else {
            chosen.clone()
        };
        Ok(bar_chart(table, &players, d.get::<Vec<String>>(ACTIVE_FEATURES)?))
    })
    .scope(scope)
    .renderable();

    b.register_computed(RADAR, &[TABLE, ACTIVE_PLAYERS, FEATURES, ACTIVE_FEATURES], |d| {
        let table = d.get::<Table>(TABLE)?;
        let players = d.get::<Vec<String>>(ACTIVE_PLAYERS)?;
        let requested = d.get::<Vec<String>>(FEATURES)?;
        let Some(table) = table else {
            return Ok(RadarChart::default());
        };
        if players.is_empty() || requested.is_empty() {
            return Ok(RadarChart::default());
        }
        let features = d.get::<Vec<String>>(ACTIVE_FEATURES)?;
        let normalized = normalize(table, features);
        Ok(radar_chart(&normalized, players, features))
    })
    .scope(scope)
    .renderable();
}

fn declare_compare(b: &mut GraphBuilder, catalog: &Arc<Catalog>, dataset: Option<String>) {
    use compare::*;
    let scope = View::Compare.scope();

    b.register_input(DATASET, dataset).scope(scope);
    b.register_input(FEATURES, Vec::<String>::new()).scope(scope);

    register_table(b, TABLE, DATASET, scope, catalog);

    b.register_computed(FEATURE_OPTIONS, &[TABLE], |d| {
        Ok(d.get::<Table>(TABLE)?
            .as_deref()
            .map(|t| feature_options(t, FeatureKind::All))
            .unwrap_or_default())
    })
    .scope(scope)
    .renderable();

    // only numeric features can be plotted
    b.register_computed(ACTIVE_FEATURES, &[TABLE, FEATURES], |d| {
        let valid = numeric_features(d.get::<Table>(TABLE)?);
        Ok(features_or_all(d.get::<Vec<String>>(FEATURES)?, &valid))
    })
    .scope(scope);

    b.register_computed(NORMALIZED, &[TABLE], |d| -> Result<Table, _> {
        Ok(d.get::<Table>(TABLE)?
            .as_deref()
            .map(|t| Arc::new(normalize(t, &t.numeric_columns()))))
    })
    .scope(scope);

    // both charts follow the selection while Compare is unmounted
    b.register_computed(BARS, &[TABLE, ACTIVE_FEATURES, SELECTED_PLAYERS], |d| {
        let selection = d.get::<Selection>(SELECTED_PLAYERS)?;
        let Some(table) = d.get::<Table>(TABLE)? else {
            return Ok(BarChart::default());
        };
        if selection.is_empty() {
            return Ok(BarChart::default());
        }
        Ok(bar_chart(
            table,
            selection.as_slice(),
            d.get::<Vec<String>>(ACTIVE_FEATURES)?,
        ))
    })
    .scope(scope)
    .renderable()
    .live();

    b.register_computed(RADAR, &[NORMALIZED, ACTIVE_FEATURES, SELECTED_PLAYERS], |d| {
        let selection = d.get::<Selection>(SELECTED_PLAYERS)?;
        let Some(normalized) = d.get::<Table>(NORMALIZED)? else {
            return Ok(RadarChart::default());
        };
        Ok(radar_chart(
            normalized,
            selection.as_slice(),
            d.get::<Vec<String>>(ACTIVE_FEATURES)?,
        ))
    })
    .scope(scope)
    .renderable()
    .live();
}
