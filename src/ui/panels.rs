use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use rusty_scout::{Event, View};

use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – shared player selection
// ---------------------------------------------------------------------------

/// Render the selection list. Clicking a player removes it.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Selected players");
    ui.separator();

    let Some(dashboard) = &state.dashboard else {
        ui.label("No data loaded.");
        return;
    };

    let selected = dashboard.selected().to_vec();
    if selected.is_empty() {
        ui.label(RichText::new("Click a player in a chart or table to select it.").weak());
        return;
    }

    let mut events = Vec::new();
    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for player in &selected {
                let color = state.colors.color_for(player);
                let text = RichText::new(format!("✖ {player}")).color(color);
                if ui
                    .add(egui::Button::new(text).frame(false))
                    .on_hover_text("Remove from selection")
                    .clicked()
                {
                    events.push(Event::Toggle(player.clone()));
                }
            }
        });

    for event in events {
        state.dispatch(event);
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu, the view tabs and the status line.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open data folder…").clicked() {
                open_folder_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(current) = state.dashboard.as_ref().map(|d| d.view()) {
            for view in View::ALL {
                if ui.selectable_label(current == view, view.title()).clicked() {
                    state.dispatch(Event::ShowView(view));
                }
            }
            ui.separator();
        }

        if let Some(ds) = &state.dashboard {
            ui.label(format!(
                "{} tables, {} players selected",
                ds.catalog().len(),
                ds.selected().len()
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// Folder dialog
// ---------------------------------------------------------------------------

pub fn open_folder_dialog(state: &mut AppState) {
    let folder = rfd::FileDialog::new()
        .set_title("Open folder with player tables")
        .pick_folder();

    if let Some(path) = folder {
        log::info!("Opening data folder {}", path.display());
        state.open_dir(&path);
    }
}
