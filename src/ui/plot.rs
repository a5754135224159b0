use std::f64::consts::{FRAC_PI_2, TAU};

use eframe::egui::{self, Color32, RichText, Ui};
use egui_extras::{Column, TableBuilder};
use egui_plot::{Bar, BarChart as PlotBars, Legend, Line, Plot, PlotPoint, PlotPoints, Text};
use rusty_scout::Event;
use rusty_scout::data::projection::{BarChart, RadarChart, RankedRow};

use crate::color::ColorMap;

// ---------------------------------------------------------------------------
// Ranked table (Explore)
// ---------------------------------------------------------------------------

/// Top-K table. Clicking a row picks the player, hovering feeds the radar.
pub fn ranked_table(
    ui: &mut Ui,
    rows: &[RankedRow],
    feature: &str,
    hovered: Option<&str>,
    events: &mut Vec<Event>,
) {
    if rows.is_empty() {
        ui.label("No players match the current filters.");
        return;
    }

    TableBuilder::new(ui)
        .striped(true)
        .column(Column::exact(28.0))
        .column(Column::remainder().at_least(140.0))
        .column(Column::auto().at_least(90.0))
        .column(Column::auto().at_least(60.0))
        .header(20.0, |mut header| {
            header.col(|ui| {
                ui.strong("#");
            });
            header.col(|ui| {
                ui.strong("Player");
            });
            header.col(|ui| {
                ui.strong("Team");
            });
            header.col(|ui| {
                ui.strong(feature);
            });
        })
        .body(|mut body| {
            for (rank, row) in rows.iter().enumerate() {
                body.row(20.0, |mut table_row| {
                    table_row.col(|ui| {
                        ui.label(format!("{}", rank + 1));
                    });
                    table_row.col(|ui| {
                        let text = if hovered == Some(row.player.as_str()) {
                            RichText::new(&row.player).strong()
                        } else {
                            RichText::new(&row.player)
                        };
                        let response = ui.add(egui::Label::new(text).sense(egui::Sense::click()));
                        if response.clicked() {
                            events.push(Event::Pick(row.player.clone()));
                        }
                        if response.hovered() && hovered != Some(row.player.as_str()) {
                            events.push(Event::Hover(Some(row.player.clone())));
                        }
                    });
                    table_row.col(|ui| {
                        ui.label(row.team.as_deref().unwrap_or("–"));
                    });
                    table_row.col(|ui| {
                        ui.label(format!("{:.2}", row.value));
                    });
                });
            }
        });
}

/// Bars of a ranked table, one per player. Returns the clicked player.
pub fn ranked_bars(ui: &mut Ui, id: &str, rows: &[RankedRow], colors: &ColorMap) -> Option<String> {
    let bars: Vec<Bar> = rows
        .iter()
        .enumerate()
        .map(|(i, row)| {
            Bar::new(i as f64, row.value)
                .name(&row.player)
                .fill(colors.nth(i))
                .width(0.8)
        })
        .collect();

    let response = Plot::new(id)
        .height(240.0)
        .allow_drag(false)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(PlotBars::new(bars));
            plot_ui.pointer_coordinate()
        });

    if !response.response.clicked() {
        return None;
    }
    let point = response.inner?;
    let index = point.x.round();
    if index < 0.0 {
        return None;
    }
    rows.get(index as usize).map(|r| r.player.clone())
}

// ---------------------------------------------------------------------------
// Grouped bar chart (Search / Compare)
// ---------------------------------------------------------------------------

/// One group per feature, one bar per player. Returns the clicked player.
pub fn grouped_bars(ui: &mut Ui, id: &str, chart: &BarChart, colors: &ColorMap) -> Option<String> {
    if chart.is_empty() {
        ui.label("Select players to see their features.");
        return None;
    }
    ui.label(RichText::new(chart.features.join(" · ")).weak());

    let n = chart.series.len() as f64;
    let width = 0.8 / n;
    let response = Plot::new(id)
        .height(280.0)
        .legend(Legend::default())
        .allow_drag(false)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            for (s, series) in chart.series.iter().enumerate() {
                let offset = -0.4 + width * (s as f64 + 0.5);
                let bars: Vec<Bar> = series
                    .values
                    .iter()
                    .zip(&chart.features)
                    .enumerate()
                    .map(|(f, (value, feature))| {
                        Bar::new(f as f64 + offset, value.unwrap_or(0.0))
                            .name(feature)
                            .width(width * 0.95)
                    })
                    .collect();
                plot_ui.bar_chart(
                    PlotBars::new(bars)
                        .name(&series.player)
                        .color(colors.color_for(&series.player)),
                );
            }
            plot_ui.pointer_coordinate()
        });

    if !response.response.clicked() {
        return None;
    }
    let point = response.inner?;
    let offset_in_group = point.x - point.x.round() + 0.4;
    if !(0.0..0.8).contains(&offset_in_group) {
        return None;
    }
    let s = (offset_in_group / width) as usize;
    chart.series.get(s).map(|series| series.player.clone())
}

// ---------------------------------------------------------------------------
// Radar chart
// ---------------------------------------------------------------------------

fn polar(angle: f64, radius: f64) -> [f64; 2] {
    [radius * angle.cos(), radius * angle.sin()]
}

/// Axis `i` of `n`, clockwise from the top.
fn axis_angle(i: usize, n: usize) -> f64 {
    FRAC_PI_2 - TAU * i as f64 / n as f64
}

/// Polygons on shared radial axes scaled to `chart.scale`.
pub fn radar(ui: &mut Ui, id: &str, chart: &RadarChart, colors: &ColorMap, empty_hint: &str) {
    if chart.is_empty() || chart.scale <= 0.0 {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.label(empty_hint);
        });
        return;
    }

    let n = chart.features.len();
    Plot::new(id)
        .height(320.0)
        .data_aspect(1.0)
        .legend(Legend::default())
        .show_axes([false, false])
        .show_grid([false, false])
        .allow_drag(false)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            // spokes and feature labels
            for (i, feature) in chart.features.iter().enumerate() {
                let angle = axis_angle(i, n);
                let spoke: PlotPoints = vec![[0.0, 0.0], polar(angle, 1.0)].into();
                plot_ui.line(Line::new(spoke).color(Color32::GRAY).width(0.5));
                let [x, y] = polar(angle, 1.12);
                plot_ui.text(Text::new(PlotPoint::new(x, y), feature.as_str()));
            }

            for series in &chart.series {
                let mut points: Vec<[f64; 2]> = series
                    .values
                    .iter()
                    .enumerate()
                    .map(|(i, v)| polar(axis_angle(i, n), v.unwrap_or(0.0) / chart.scale))
                    .collect();
                if let Some(first) = points.first().copied() {
                    points.push(first);
                }
                let line = Line::new(PlotPoints::from(points))
                    .name(&series.player)
                    .color(colors.color_for(&series.player))
                    .width(2.0);
                plot_ui.line(line);
            }
        });
}
