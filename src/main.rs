mod app;
mod chart;
mod color;
mod data;
mod state;
mod ui;

use std::path::PathBuf;

use app::TrackLensApp;
use clap::Parser;
use eframe::egui;
use state::AppState;

/// Explore song metadata and audio-feature statistics.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Table to open at start-up (.csv, .json or .parquet)
    #[arg(long, env = "TRACK_LENS_DATA")]
    data: Option<PathBuf>,

    /// Bars in the artist chart when its input is left blank
    #[arg(long, env = "TRACK_LENS_TOP_ARTISTS", default_value_t = chart::bar::DEFAULT_TOP_ARTISTS)]
    top_artists: usize,
}

fn main() -> eframe::Result {
    env_logger::init();
    let cli = Cli::parse();

    let mut state = AppState::new(cli.top_artists);
    if let Some(path) = &cli.data {
        ui::panels::load_into(&mut state, path);
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 840.0])
            .with_min_inner_size([640.0, 420.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Track Lens",
        options,
        Box::new(|_cc| Ok(Box::new(TrackLensApp::new(state)))),
    )
}
