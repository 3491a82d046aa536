use std::collections::VecDeque;
use std::path::PathBuf;

use crate::cli::Args;
use crate::data::model::StormDataset;
use crate::layout::{LayoutParams, TrackLayout};
use crate::playback::{PlaybackClock, TimeSource};

// ---------------------------------------------------------------------------
// Trails
// ---------------------------------------------------------------------------

/// One remembered on-screen position of a storm.
#[derive(Debug, Clone, Copy)]
pub struct TrailPoint {
    pub x: f32,
    pub y: f32,
    pub wind: f64,
}

/// Recent positions of one storm, oldest first.
pub type Trail = VecDeque<TrailPoint>;

/// How many trail points each storm keeps.
pub const TRAIL_CAPACITY: usize = 90;

/// A frame-to-frame jump longer than this clears the trail instead of
/// drawing a streak across the canvas (playback loop wrap, layout rebuild).
pub const TRAIL_JUMP_THRESHOLD: f64 = 200.0;

// ---------------------------------------------------------------------------
// Display options
// ---------------------------------------------------------------------------

/// The live-adjustable subset of the CLI flags.
#[derive(Debug, Clone)]
pub struct DisplayOptions {
    pub min_wind: f64,
    pub show_labels: bool,
    pub show_trails: bool,
    pub show_timeline: bool,
    pub debug_grid: bool,
    pub debug_density: usize,
    pub use_datetime: bool,
    pub playback_duration: f64,
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Loaded dataset (None until user loads a file).
    pub dataset: Option<StormDataset>,

    /// Placement for the current canvas size, rebuilt on resize.
    pub layout: Option<TrackLayout>,

    /// Placement knobs, fixed at startup.
    pub layout_params: LayoutParams,

    /// Virtual-time source, ticked once per rendered frame.
    pub clock: PlaybackClock,

    pub options: DisplayOptions,

    /// Per-storm trails, parallel to `dataset.storms`.
    pub trails: Vec<Trail>,

    /// Storms drawn in the previous frame, for the status line.
    pub visible_count: usize,

    /// Forwarded to the loader when opening files from the UI.
    pub zero_is_nan: bool,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,

    /// Where to write the next screenshot once the backend delivers it.
    pub pending_snapshot: Option<PathBuf>,
}

impl AppState {
    pub fn from_args(args: &Args) -> Self {
        let source = if args.deterministic_time {
            TimeSource::Deterministic
        } else {
            TimeSource::WallClock
        };
        AppState {
            dataset: None,
            layout: None,
            layout_params: args.layout_params(),
            clock: PlaybackClock::new(source),
            options: DisplayOptions {
                min_wind: args.min_wind,
                show_labels: true,
                show_trails: true,
                show_timeline: true,
                debug_grid: args.debug_grid,
                debug_density: args.debug_density.max(1),
                use_datetime: args.use_datetime,
                playback_duration: args.playback_duration,
            },
            trails: Vec::new(),
            visible_count: 0,
            zero_is_nan: args.zero_is_nan,
            status_message: None,
            pending_snapshot: None,
        }
    }

    /// Ingest a newly loaded dataset and restart playback from t = 0.
    pub fn set_dataset(&mut self, dataset: StormDataset) {
        if self.options.use_datetime && dataset.time_span.is_none() {
            log::warn!(
                "datetime playback requested but the data has no usable timestamps; \
                 falling back to index playback"
            );
        }
        self.trails = (0..dataset.len())
            .map(|_| Trail::with_capacity(TRAIL_CAPACITY))
            .collect();
        self.layout = None;
        self.visible_count = 0;
        self.status_message = None;
        self.clock.restart();
        self.dataset = Some(dataset);
    }

    /// Rebuild the layout when the canvas size changed since the last frame.
    /// Trails are cleared alongside because every glyph moves.
    pub fn ensure_layout(&mut self, width: u32, height: u32) {
        let Some(dataset) = &self.dataset else {
            return;
        };
        let stale = match &self.layout {
            Some(layout) => layout.width != width || layout.height != height,
            None => true,
        };
        if !stale {
            return;
        }
        self.layout = Some(TrackLayout::compute(
            dataset,
            width,
            height,
            &self.layout_params,
        ));
        for trail in &mut self.trails {
            trail.clear();
        }
        log::debug!("layout rebuilt for {width}x{height}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{Observation, StormTrack};
    use clap::Parser;

    fn dataset() -> StormDataset {
        let mut track = StormTrack::new("2019182N11138", "HAIYAN");
        track.points.push(Observation {
            time: None,
            lat: 11.0,
            lon: 138.0,
            wind: Some(35.0),
        });
        track.points.push(Observation {
            time: None,
            lat: 13.0,
            lon: 136.0,
            wind: Some(75.0),
        });
        StormDataset::from_storms(vec![track])
    }

    #[test]
    fn from_args_picks_up_cli_values() {
        let args = Args::try_parse_from([
            "typhoon-art",
            "--min-wind",
            "25",
            "--debug-grid",
            "--deterministic-time",
            "false",
        ])
        .unwrap();
        let state = AppState::from_args(&args);
        assert_eq!(state.options.min_wind, 25.0);
        assert!(state.options.debug_grid);
        assert_eq!(state.clock.source(), TimeSource::WallClock);
        assert!(state.dataset.is_none());
    }

    #[test]
    fn set_dataset_resets_trails_and_clock() {
        let args = Args::try_parse_from(["typhoon-art"]).unwrap();
        let mut state = AppState::from_args(&args);
        state.clock.tick();
        state.clock.tick();
        state.status_message = Some("old error".into());

        state.set_dataset(dataset());
        assert_eq!(state.trails.len(), 1);
        assert!(state.trails[0].is_empty());
        assert_eq!(state.clock.frame(), 0);
        assert!(state.status_message.is_none());
        assert!(state.layout.is_none());
    }

    #[test]
    fn ensure_layout_rebuilds_only_on_resize() {
        let args = Args::try_parse_from(["typhoon-art"]).unwrap();
        let mut state = AppState::from_args(&args);
        state.set_dataset(dataset());

        state.ensure_layout(1000, 700);
        let first = state.layout.clone().unwrap();

        state.ensure_layout(1000, 700);
        assert_eq!(state.layout.as_ref().unwrap().entries, first.entries);

        state.ensure_layout(800, 700);
        let rebuilt = state.layout.as_ref().unwrap();
        assert_eq!(rebuilt.width, 800);
        assert_ne!(rebuilt.entries[0].anchor, first.entries[0].anchor);
    }

    #[test]
    fn ensure_layout_without_dataset_is_a_no_op() {
        let args = Args::try_parse_from(["typhoon-art"]).unwrap();
        let mut state = AppState::from_args(&args);
        state.ensure_layout(1200, 900);
        assert!(state.layout.is_none());
    }
}
