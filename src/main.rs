mod app;
mod color;
mod state;
mod ui;

use std::path::PathBuf;

use app::RustyScoutApp;
use clap::Parser;
use eframe::egui;
use rusty_scout::View;
use rusty_scout::config::DashboardConfig;
use state::AppState;

#[derive(Parser)]
#[command(version, about = "Football player statistics dashboard")]
struct Cli {
    /// Directory with player tables (.csv, .json, .parquet).
    #[arg(short, long, env = "RUSTY_SCOUT_DATA")]
    data_dir: Option<PathBuf>,

    /// JSON file overriding dashboard defaults.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// View shown at startup.
    #[arg(long, value_enum, default_value_t = View::Explore)]
    view: View,
}

fn main() -> eframe::Result {
    env_logger::init();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => DashboardConfig::load(path).unwrap_or_else(|e| {
            log::error!("{e:#}; using defaults");
            DashboardConfig::default()
        }),
        None => DashboardConfig::default(),
    };

    let mut state = AppState::new(config, cli.view);
    if let Some(dir) = &cli.data_dir {
        state.open_dir(dir);
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 820.0])
            .with_min_inner_size([720.0, 480.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Rusty Scout – Football Player Dashboard",
        options,
        Box::new(|_cc| Ok(Box::new(RustyScoutApp { state }))),
    )
}
