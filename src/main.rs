mod app;
mod color;
mod data;
mod state;
mod ui;

use std::path::PathBuf;

use anyhow::anyhow;
use app::VehicleExplorerApp;
use clap::Parser;
use eframe::egui;

use crate::data::pipeline::load_listings;

#[derive(Parser)]
#[command(name = "vehicle-explorer")]
#[command(about = "Interactive dashboard for used-vehicle sale listings")]
#[command(version)]
struct Cli {
    /// Listings file (.csv, .tsv, .json or .parquet)
    #[arg(default_value = "vehicles_us.csv")]
    path: PathBuf,

    /// Print the cleaning report as JSON and exit instead of opening a window
    #[arg(long)]
    summary: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let loaded = load_listings(&cli.path);

    if cli.summary {
        let table = loaded?;
        println!("{}", serde_json::to_string_pretty(table.report())?);
        return Ok(());
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 900.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Vehicle Explorer – Used-Vehicle Listings",
        options,
        Box::new(move |_cc| Ok(Box::new(VehicleExplorerApp::new(loaded)))),
    )
    .map_err(|e| anyhow!("{e}"))
}
