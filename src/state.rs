use std::path::Path;
use std::sync::Arc;

use rusty_scout::config::DashboardConfig;
use rusty_scout::data::catalog::Catalog;
use rusty_scout::{Dashboard, Event, View};

use crate::color::ColorMap;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// Everything the shell keeps between frames, independent of rendering.
pub struct AppState {
    /// Running session (None until a data folder is opened).
    pub dashboard: Option<Dashboard>,

    /// Settings used when a session is (re)created.
    pub config: DashboardConfig,

    /// View mounted when a session starts.
    pub initial_view: View,

    /// Series colours keyed by player.
    pub colors: ColorMap,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(config: DashboardConfig, initial_view: View) -> Self {
        Self {
            dashboard: None,
            config,
            initial_view,
            colors: ColorMap::default(),
            status_message: None,
        }
    }

    /// Load every table in `dir` and start a fresh session on it.
    pub fn open_dir(&mut self, dir: &Path) {
        let catalog = match Catalog::from_dir(dir) {
            Ok(catalog) => catalog,
            Err(e) => {
                log::error!("Failed to load data folder: {e:#}");
                self.status_message = Some(format!("Error: {e:#}"));
                return;
            }
        };
        let view = self
            .dashboard
            .as_ref()
            .map_or(self.initial_view, Dashboard::view);

        match Dashboard::new(Arc::new(catalog), self.config.clone(), view) {
            Ok(dashboard) => {
                self.colors = ColorMap::new(dashboard.selected());
                self.dashboard = Some(dashboard);
                self.status_message = None;
            }
            Err(e) => {
                log::error!("Failed to start dashboard: {e}");
                self.status_message = Some(format!("Error: {e}"));
            }
        }
    }

    /// Forward a UI event to the session.
    pub fn dispatch(&mut self, event: Event) {
        let Some(dashboard) = self.dashboard.as_mut() else {
            return;
        };
        match dashboard.handle(event) {
            Ok(pass) => {
                if !pass.is_empty() {
                    log::trace!("recomputed {:?}", pass.recomputed);
                }
                self.colors.extend(dashboard.selected());
            }
            Err(e) => {
                log::error!("event failed: {e}");
                self.status_message = Some(format!("Error: {e}"));
            }
        }
    }

    /// Read a cell of the mounted view, logging wiring mistakes.
    pub fn cell<T: Clone + Default + 'static>(&mut self, name: &str) -> T {
        let Some(dashboard) = &self.dashboard else {
            return T::default();
        };
        match dashboard.get::<T>(name) {
            Ok(value) => value,
            Err(e) => {
                log::error!("reading {name}: {e}");
                self.status_message = Some(format!("Error: {e}"));
                T::default()
            }
        }
    }
}
