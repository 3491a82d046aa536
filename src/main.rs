mod app;
mod cli;
mod color;
mod data;
mod layout;
mod playback;
mod state;
mod ui;

use anyhow::Context;
use clap::Parser;
use eframe::egui;

use app::TyphoonApp;
use cli::Args;
use layout::TrackLayout;
use state::AppState;

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let dataset = match &args.path {
        Some(path) => Some(data::loader::load_csv(path, args.zero_is_nan)?),
        None => None,
    };

    // Headless mode: write the placement as JSON and exit without a window.
    if let Some(dump_path) = &args.dump_layout {
        let dataset = dataset
            .as_ref()
            .context("--dump-layout needs a CSV path to lay out")?;
        let layout = TrackLayout::compute(dataset, args.width, args.height, &args.layout_params());
        std::fs::write(dump_path, layout.to_json()?)
            .with_context(|| format!("writing {}", dump_path.display()))?;
        log::info!(
            "Wrote layout for {} storms to {}",
            dataset.len(),
            dump_path.display()
        );
        return Ok(());
    }

    let mut state = AppState::from_args(&args);
    if let Some(dataset) = dataset {
        state.set_dataset(dataset);
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([args.width as f32, args.height as f32])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Typhoon Art – Storm Track Spirals",
        options,
        Box::new(move |_cc| Ok(Box::new(TyphoonApp::new(state)))),
    )
    .map_err(|e| anyhow::anyhow!("window system error: {e}"))
}
