//! Placement of storm glyphs on the canvas.
//!
//! ```text
//!   StormDataset
//!        │
//!        ▼
//!   ┌────────────┐
//!   │ projection │  mean track position → anchor pixel
//!   └────────────┘
//!        │
//!        ▼
//!   ┌────────────┐
//!   │   spread   │  fan out anchors that share a grid cell
//!   └────────────┘
//!        │
//!        ▼
//!    TrackLayout    per-storm anchor + jitter + spread offsets
//! ```
//!
//! Layouts are pure functions of the dataset, the canvas size and the RNG
//! seed, so the same invocation always produces the same picture.

pub mod projection;
pub mod spread;

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use crate::data::model::StormDataset;

// ---------------------------------------------------------------------------
// Parameters
// ---------------------------------------------------------------------------

/// How overlapping anchors are separated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SpreadMode {
    /// Leave anchors where the projection puts them.
    None,
    /// Fan out anchors that share a grid cell onto rings.
    Cell,
}

/// Placement knobs, fixed at startup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutParams {
    /// Maximum random offset per storm, in pixels, applied on both axes.
    pub jitter: f64,
    pub spread: SpreadMode,
    /// Cell edge length for `SpreadMode::Cell`, in pixels.
    pub grid_size: u32,
    /// Ring radius step for `SpreadMode::Cell`, in pixels.
    pub spread_radius: f64,
    pub seed: u64,
    /// Shift the dataset's mean position to the canvas center.
    pub center: bool,
}

// ---------------------------------------------------------------------------
// Layout
// ---------------------------------------------------------------------------

/// Placement of a single storm.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayoutEntry {
    /// Index into `StormDataset::storms`.
    pub storm: usize,
    pub id: String,
    /// Projected mean track position, before any offsets.
    pub anchor: (f64, f64),
    pub jitter: (f64, f64),
    pub spread: (i32, i32),
}

/// Complete placement for one canvas size.
#[derive(Debug, Clone, Serialize)]
pub struct TrackLayout {
    pub width: u32,
    pub height: u32,
    pub seed: u64,
    /// Earliest and latest observation timestamp across the dataset.
    pub time_span: Option<(DateTime<Utc>, DateTime<Utc>)>,
    /// Added to every drawn position when centering is on; zero otherwise.
    pub center_offset: (f64, f64),
    pub entries: Vec<LayoutEntry>,
}

impl TrackLayout {
    /// Compute anchors, jitter and spread offsets for every storm.
    ///
    /// All randomness comes from a single seeded RNG: jitter is drawn per
    /// storm in dataset order, then spread angles per cell in sorted cell
    /// order, so repeated runs line up exactly.
    pub fn compute(dataset: &StormDataset, width: u32, height: u32, params: &LayoutParams) -> Self {
        let w = width.max(1) as f64;
        let h = height.max(1) as f64;
        let mut rng = StdRng::seed_from_u64(params.seed);

        let anchors: Vec<(f64, f64)> = dataset
            .storms
            .iter()
            .map(|storm| match storm.mean_position() {
                Some((lat, lon)) => projection::project(lat, lon, w, h),
                None => (0.0, 0.0),
            })
            .collect();

        let jitter_max = params.jitter.abs();
        let jitters: Vec<(f64, f64)> = dataset
            .storms
            .iter()
            .map(|_| {
                (
                    rng.gen_range(-jitter_max..=jitter_max),
                    rng.gen_range(-jitter_max..=jitter_max),
                )
            })
            .collect();

        let spreads = match params.spread {
            SpreadMode::Cell => {
                spread::spread_offsets(&anchors, params.grid_size, params.spread_radius, &mut rng)
            }
            SpreadMode::None => vec![(0, 0); anchors.len()],
        };

        let center_offset = if params.center {
            match mean_projected_position(dataset, w, h) {
                Some((mx, my)) => (w / 2.0 - mx, h / 2.0 - my),
                None => (0.0, 0.0),
            }
        } else {
            (0.0, 0.0)
        };

        let entries = dataset
            .storms
            .iter()
            .enumerate()
            .map(|(storm, track)| LayoutEntry {
                storm,
                id: track.id.clone(),
                anchor: anchors[storm],
                jitter: jitters[storm],
                spread: spreads[storm],
            })
            .collect();

        TrackLayout {
            width,
            height,
            seed: params.seed,
            time_span: dataset.time_span,
            center_offset,
            entries,
        }
    }

    pub fn to_json(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Projected mean over every observation in the dataset, the point the
/// centering shift moves to the middle of the canvas.
fn mean_projected_position(dataset: &StormDataset, w: f64, h: f64) -> Option<(f64, f64)> {
    let mut sum = (0.0, 0.0);
    let mut count = 0usize;
    for storm in &dataset.storms {
        for point in &storm.points {
            let (x, y) = projection::project(point.lat, point.lon, w, h);
            sum.0 += x;
            sum.1 += y;
            count += 1;
        }
    }
    if count == 0 {
        return None;
    }
    Some((sum.0 / count as f64, sum.1 / count as f64))
}
