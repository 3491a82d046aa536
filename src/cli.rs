use std::path::PathBuf;

use clap::Parser;

use crate::layout::{LayoutParams, SpreadMode};

/// Animated spiral visualization of storm tracks.
#[derive(Parser, Debug, Clone)]
#[command(name = "typhoon-art")]
#[command(about = "Draws storm best-track data as rotating wind-colored spirals", long_about = None)]
pub struct Args {
    /// Storm track CSV (IBTrACS-style columns); opens a file dialog when omitted
    pub path: Option<PathBuf>,

    /// Maximum random offset per storm in pixels, applied on both axes
    #[arg(long, default_value_t = 40.0)]
    pub jitter: f64,

    /// How to separate storms whose anchors overlap
    #[arg(long, value_enum, default_value_t = SpreadMode::None)]
    pub spread: SpreadMode,

    /// Grid cell edge in pixels for cell spreading
    #[arg(long, default_value_t = 80)]
    pub grid_size: u32,

    /// Ring radius step in pixels for cell spreading
    #[arg(long, default_value_t = 30.0)]
    pub spread_radius: f64,

    /// Animate along observation timestamps instead of point indices
    #[arg(long)]
    pub use_datetime: bool,

    /// Seconds for one full sweep of the dataset in datetime playback
    #[arg(long, default_value_t = 60.0)]
    pub playback_duration: f64,

    /// Hide samples below this wind speed in knots
    #[arg(long, default_value_t = 0.0)]
    pub min_wind: f64,

    /// Treat wind values of exactly 0 as missing while loading
    #[arg(long)]
    pub zero_is_nan: bool,

    /// Draw grid cell boundaries and storm anchors for layout tuning
    #[arg(long)]
    pub debug_grid: bool,

    /// Only mark anchors in cells holding at least this many storms
    #[arg(long, default_value_t = 6)]
    pub debug_density: usize,

    /// Seed for jitter and spread randomness
    #[arg(long, default_value_t = 12345)]
    pub seed: u64,

    /// Derive playback time from the frame counter instead of the wall
    /// clock, so every run shows the same frames
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set, value_name = "BOOL")]
    pub deterministic_time: bool,

    /// Keep raw projected positions instead of centering the dataset mean
    #[arg(long)]
    pub no_center: bool,

    /// Window width in pixels
    #[arg(long, default_value_t = 1200)]
    pub width: u32,

    /// Window height in pixels
    #[arg(long, default_value_t = 900)]
    pub height: u32,

    /// Write the computed layout as JSON to this path and exit without
    /// opening a window
    #[arg(long, value_name = "PATH")]
    pub dump_layout: Option<PathBuf>,
}

impl Args {
    /// The placement-relevant subset of the flags.
    pub fn layout_params(&self) -> LayoutParams {
        LayoutParams {
            jitter: self.jitter,
            spread: self.spread,
            grid_size: self.grid_size,
            spread_radius: self.spread_radius,
            seed: self.seed,
            center: !self.no_center,
        }
    }
}
