use eframe::egui::{self, RichText, Ui};
use rusty_scout::cells::{compare, explore, search};
use rusty_scout::data::filter::AgeRange;
use rusty_scout::data::projection::{BarChart, RadarChart, RankedRow};
use rusty_scout::{Event, FieldValue, View};

use crate::state::AppState;
use crate::ui::plot;

/// Render the mounted view: its selectors on top, its charts below.
pub fn central_panel(ui: &mut Ui, state: &mut AppState) {
    let Some(view) = state.dashboard.as_ref().map(|d| d.view()) else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a data folder to explore players  (File → Open data folder…)");
        });
        return;
    };

    let mut events = Vec::new();
    match view {
        View::Explore => explore_view(ui, state, &mut events),
        View::Search => search_view(ui, state, &mut events),
        View::Compare => compare_view(ui, state, &mut events),
    }
    for event in events {
        state.dispatch(event);
    }
}

// ---------------------------------------------------------------------------
// Selector widgets
// ---------------------------------------------------------------------------

fn table_ids(state: &AppState) -> Vec<String> {
    state
        .dashboard
        .as_ref()
        .map(|d| d.catalog().table_ids())
        .unwrap_or_default()
}

/// Single-choice dropdown writing `field`.
fn single_select(
    ui: &mut Ui,
    label: &str,
    field: &str,
    options: &[String],
    current: Option<&str>,
    events: &mut Vec<Event>,
) {
    ui.label(label);
    egui::ComboBox::from_id_salt(field)
        .selected_text(current.unwrap_or("–"))
        .width(220.0)
        .show_ui(ui, |ui: &mut Ui| {
            for option in options {
                let is_current = current == Some(option.as_str());
                if ui.selectable_label(is_current, option).clicked() && !is_current {
                    events.push(Event::select(field, FieldValue::Text(Some(option.clone()))));
                }
            }
        });
}

/// Multi-choice list of checkboxes writing `field`.
fn multi_select(
    ui: &mut Ui,
    label: &str,
    field: &str,
    options: &[String],
    selected: &[String],
    events: &mut Vec<Event>,
) {
    let header = format!("{label}  ({}/{})", selected.len(), options.len());
    egui::CollapsingHeader::new(RichText::new(header).strong())
        .id_salt(field)
        .default_open(false)
        .show(ui, |ui: &mut Ui| {
            ui.horizontal(|ui: &mut Ui| {
                if ui.small_button("All").clicked() {
                    events.push(Event::select(field, FieldValue::List(options.to_vec())));
                }
                if ui.small_button("None").clicked() {
                    events.push(Event::select(field, FieldValue::List(Vec::new())));
                }
            });
            egui::ScrollArea::vertical()
                .id_salt(field)
                .max_height(180.0)
                .show(ui, |ui: &mut Ui| {
                    for option in options {
                        let mut checked = selected.contains(option);
                        if ui.checkbox(&mut checked, option).changed() {
                            let mut next = selected.to_vec();
                            if checked {
                                next.push(option.clone());
                            } else {
                                next.retain(|s| s != option);
                            }
                            events.push(Event::select(field, FieldValue::List(next)));
                        }
                    }
                });
        });
}

// ---------------------------------------------------------------------------
// Explore
// ---------------------------------------------------------------------------

fn explore_view(ui: &mut Ui, state: &mut AppState, events: &mut Vec<Event>) {
    let datasets = table_ids(state);
    let dataset: Option<String> = state.cell(explore::DATASET);
    let features: Vec<String> = state.cell(explore::FEATURES);
    let feature: Option<String> = state.cell(explore::ACTIVE_FEATURE);
    let ages: AgeRange = state.cell(explore::AGE_RANGE);
    let positions: Vec<String> = state.cell(explore::POSITIONS);
    let hovered: Option<String> = state.cell(explore::HOVERED);
    let top: Vec<RankedRow> = state.cell(explore::TOP_PLAYERS);
    let radar: RadarChart = state.cell(explore::RADAR);
    let bounds = state.config.age_bounds;
    let position_labels = state.config.positions.clone();

    ui.horizontal(|ui: &mut Ui| {
        ui.vertical(|ui: &mut Ui| {
            single_select(
                ui,
                "Select Stat Category",
                explore::DATASET,
                &datasets,
                dataset.as_deref(),
                events,
            );
        });
        ui.vertical(|ui: &mut Ui| {
            single_select(
                ui,
                "Select Feature",
                explore::FEATURE,
                &features,
                feature.as_deref(),
                events,
            );
        });
    });

    ui.horizontal(|ui: &mut Ui| {
        ui.label("Filter by Age");
        let mut next = ages;
        let min = ui.add(egui::Slider::new(&mut next.min, bounds.min..=bounds.max).text("from"));
        let max = ui.add(egui::Slider::new(&mut next.max, bounds.min..=bounds.max).text("to"));
        if min.changed() || max.changed() {
            next.max = next.max.max(next.min);
            events.push(Event::select(explore::AGE_RANGE, FieldValue::Ages(next)));
        }
    });
    multi_select(
        ui,
        "Filter by Position",
        explore::POSITIONS,
        &position_labels,
        &positions,
        events,
    );
    ui.separator();

    let feature_name = feature.unwrap_or_default();
    ui.columns(2, |columns| {
        columns[0].heading(format!("Top {} Players in {feature_name}", top.len()));
        let clicked = plot::ranked_bars(&mut columns[0], "explore_bars", &top, &state.colors);
        if let Some(player) = clicked {
            events.push(Event::Pick(player));
        }
        plot::ranked_table(&mut columns[0], &top, &feature_name, hovered.as_deref(), events);

        let title = match &hovered {
            Some(player) => format!("Radar plot with features of {player}"),
            None => "Hover over a player to view".to_string(),
        };
        columns[1].heading(title);
        plot::radar(
            &mut columns[1],
            "explore_radar",
            &radar,
            &state.colors,
            "Hover over a player to view",
        );
    });
}

// ---------------------------------------------------------------------------
// Search
// ---------------------------------------------------------------------------

fn search_view(ui: &mut Ui, state: &mut AppState, events: &mut Vec<Event>) {
    let datasets = table_ids(state);
    let dataset: Option<String> = state.cell(search::DATASET);
    let feature_options: Vec<String> = state.cell(search::FEATURE_OPTIONS);
    let features: Vec<String> = state.cell(search::FEATURES);
    let team_options: Vec<String> = state.cell(search::TEAM_OPTIONS);
    let teams: Vec<String> = state.cell(search::TEAMS);
    let player_options: Vec<String> = state.cell(search::PLAYER_OPTIONS);
    let players: Vec<String> = state.cell(search::PLAYERS);
    let bars: BarChart = state.cell(search::BARS);
    let radar: RadarChart = state.cell(search::RADAR);

    ui.horizontal(|ui: &mut Ui| {
        ui.vertical(|ui: &mut Ui| {
            single_select(
                ui,
                "Select Stat Category",
                search::DATASET,
                &datasets,
                dataset.as_deref(),
                events,
            );
        });
        ui.vertical(|ui: &mut Ui| {
            multi_select(
                ui,
                "Select Features",
                search::FEATURES,
                &feature_options,
                &features,
                events,
            );
        });
    });
    ui.horizontal(|ui: &mut Ui| {
        ui.vertical(|ui: &mut Ui| {
            multi_select(ui, "Select Teams", search::TEAMS, &team_options, &teams, events);
        });
        ui.vertical(|ui: &mut Ui| {
            multi_select(ui, "Select Players", search::PLAYERS, &player_options, &players, events);
        });
    });
    ui.separator();

    ui.columns(2, |columns| {
        columns[0].heading("Selected Features for Players");
        let clicked = plot::grouped_bars(&mut columns[0], "search_bars", &bars, &state.colors);
        if let Some(player) = clicked {
            events.push(Event::Pick(player));
        }
        columns[1].heading("Radar chart of selected players");
        plot::radar(
            &mut columns[1],
            "search_radar",
            &radar,
            &state.colors,
            "Select players and features to compare",
        );
    });
}

// ---------------------------------------------------------------------------
// Compare
// ---------------------------------------------------------------------------

fn compare_view(ui: &mut Ui, state: &mut AppState, events: &mut Vec<Event>) {
    let datasets = table_ids(state);
    let dataset: Option<String> = state.cell(compare::DATASET);
    let feature_options: Vec<String> = state.cell(compare::FEATURE_OPTIONS);
    let features: Vec<String> = state.cell(compare::FEATURES);
    let bars: BarChart = state.cell(compare::BARS);
    let radar: RadarChart = state.cell(compare::RADAR);

    ui.horizontal(|ui: &mut Ui| {
        ui.vertical(|ui: &mut Ui| {
            single_select(
                ui,
                "Select Stat Category",
                compare::DATASET,
                &datasets,
                dataset.as_deref(),
                events,
            );
        });
        ui.vertical(|ui: &mut Ui| {
            multi_select(
                ui,
                "Select Feature",
                compare::FEATURES,
                &feature_options,
                &features,
                events,
            );
        });
    });
    ui.separator();

    let title = format!(
        "Players performance in the selected features within {}",
        dataset.as_deref().unwrap_or("–")
    );
    ui.columns(2, |columns| {
        columns[0].heading(title);
        plot::grouped_bars(&mut columns[0], "compare_bars", &bars, &state.colors);
        columns[1].heading("Radar chart of selected players");
        plot::radar(
            &mut columns[1],
            "compare_radar",
            &radar,
            &state.colors,
            "Select players in Explore or Find to compare them",
        );
    });
}
