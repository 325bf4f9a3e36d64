mod app;
mod color;
mod data;
mod state;
mod ui;

use std::path::PathBuf;

use anyhow::Context;
use app::DashboardApp;
use clap::Parser;
use eframe::egui;

use data::cache::DatasetCache;
use data::loader::LoadOptions;
use state::AppState;

/// Interactive dashboard over a table of baseball team statistics.
#[derive(Debug, Parser)]
#[command(name = "baseball-dashboard", version, about)]
struct Args {
    /// Dataset to open at startup (.csv, .tsv, .txt, .json or .parquet).
    #[arg(default_value = "baseball.csv")]
    path: PathBuf,

    /// Field delimiter for delimited text files, e.g. ';' or '|'.
    #[arg(long, value_parser = parse_delimiter)]
    delimiter: Option<u8>,

    /// Initial window width in points.
    #[arg(long, default_value_t = 1280.0)]
    width: f32,

    /// Initial window height in points.
    #[arg(long, default_value_t = 860.0)]
    height: f32,
}

fn parse_delimiter(s: &str) -> Result<u8, String> {
    match s {
        "\\t" | "tab" => Ok(b'\t'),
        _ => match s.as_bytes() {
            [b] if b.is_ascii() => Ok(*b),
            _ => Err(format!("delimiter must be a single ASCII character, got '{s}'")),
        },
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let options = LoadOptions {
        delimiter: args.delimiter,
    };
    let state = AppState::open(DatasetCache::new(options), &args.path)
        .inspect_err(|e| log::error!("Startup load failed: {e}"))
        .with_context(|| format!("loading {}", args.path.display()))?;

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([args.width, args.height])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Baseball Dashboard",
        native_options,
        Box::new(|_cc| Ok(Box::new(DashboardApp::new(state)))),
    )
    .map_err(|e| anyhow::anyhow!("window error: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delimiter_argument() {
        assert_eq!(parse_delimiter(";"), Ok(b';'));
        assert_eq!(parse_delimiter("tab"), Ok(b'\t'));
        assert!(parse_delimiter("::").is_err());
        assert!(parse_delimiter("é").is_err());
    }

    #[test]
    fn args_default_to_baseball_csv() {
        let args = Args::try_parse_from(["baseball-dashboard"]).unwrap();
        assert_eq!(args.path, PathBuf::from("baseball.csv"));
        assert_eq!(args.delimiter, None);

        let args = Args::try_parse_from(["baseball-dashboard", "stats.tsv", "--delimiter", "|"]).unwrap();
        assert_eq!(args.delimiter, Some(b'|'));
    }
}
