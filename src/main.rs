mod analysis;
mod app;
mod color;
mod config;
mod data;
mod error;
mod state;
mod ui;

use std::path::PathBuf;

use app::ClimateEdaApp;
use clap::Parser;
use config::Settings;
use eframe::egui;
use state::AppState;

/// Interactive exploratory analysis of a tabular climate dataset.
#[derive(Parser, Debug)]
#[command(name = "climate-eda", version, about)]
struct Args {
    /// Dataset to open at startup (CSV, TSV, JSON or Parquet)
    #[arg(short, long)]
    data: Option<PathBuf>,

    /// Settings file (JSON). Defaults to ./climate-eda.json when present
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Histogram bin count
    #[arg(long)]
    bins: Option<usize>,

    /// Do not fit a trend line on scatter plots
    #[arg(long)]
    no_trendline: bool,
}

impl Args {
    fn settings(&self) -> anyhow::Result<Settings> {
        let mut settings = Settings::load(self.config.as_deref())?;
        if let Some(path) = &self.data {
            settings.data_path = path.clone();
        }
        if let Some(bins) = self.bins {
            settings.histogram_bins = bins;
        }
        if self.no_trendline {
            settings.trendline = false;
        }
        settings.validate()?;
        Ok(settings)
    }
}

fn main() -> eframe::Result {
    env_logger::init();
    let args = Args::parse();

    let settings = match args.settings() {
        Ok(s) => s,
        Err(e) => {
            log::error!("Invalid settings: {e:#}");
            eprintln!("climate-eda: {e:#}");
            std::process::exit(2);
        }
    };

    let data_path = settings.data_path.clone();
    let mut state = AppState::new(settings);
    // A failed load leaves the session empty with the error in the status bar.
    state.open(&data_path);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 820.0])
            .with_min_inner_size([640.0, 420.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Climate Change Data Analysis",
        options,
        Box::new(|_cc| Ok(Box::new(ClimateEdaApp::new(state)))),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_overrides_settings() {
        let args = Args::parse_from(["climate-eda", "--data", "x.csv", "--bins", "12", "--no-trendline"]);
        // No --config and no climate-eda.json in the test working directory.
        let settings = args.settings().unwrap();
        assert_eq!(settings.data_path, PathBuf::from("x.csv"));
        assert_eq!(settings.histogram_bins, 12);
        assert!(!settings.trendline);
    }

    #[test]
    fn zero_bins_rejected_from_cli() {
        let args = Args::parse_from(["climate-eda", "--bins", "0"]);
        assert!(args.settings().is_err());
    }
}
