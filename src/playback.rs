//! Virtual time and its mapping onto the dataset timeline.

use std::time::Instant;

use chrono::{DateTime, Duration, Utc};

use crate::data::model::{StormTrack, TrackSample};

/// Frames per second assumed by the deterministic clock.
pub const FPS: f64 = 30.0;
/// Track points traversed per virtual second in index playback.
pub const INDEX_SPEED: f64 = 0.22;

// ---------------------------------------------------------------------------
// Clock
// ---------------------------------------------------------------------------

/// Where virtual time comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeSource {
    /// Frame counter divided by [`FPS`]. Playback advances the same amount
    /// every frame no matter how fast frames actually render, so a given
    /// frame number always shows the same picture.
    Deterministic,
    /// Wall-clock seconds since the clock started.
    WallClock,
}

/// Produces the virtual time for each frame. Tick exactly once per
/// rendered frame.
#[derive(Debug)]
pub struct PlaybackClock {
    source: TimeSource,
    frame: u64,
    started: Instant,
    now: f64,
}

impl PlaybackClock {
    pub fn new(source: TimeSource) -> Self {
        PlaybackClock {
            source,
            frame: 0,
            started: Instant::now(),
            now: 0.0,
        }
    }

    /// Advance one frame and return the new virtual time in seconds.
    /// The first tick lands on t = 0.
    pub fn tick(&mut self) -> f64 {
        self.now = match self.source {
            TimeSource::Deterministic => self.frame as f64 / FPS,
            TimeSource::WallClock => self.started.elapsed().as_secs_f64(),
        };
        self.frame += 1;
        self.now
    }

    /// Virtual time of the most recent tick.
    pub fn now(&self) -> f64 {
        self.now
    }

    /// Frames ticked so far.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn source(&self) -> TimeSource {
        self.source
    }

    /// Rewind to t = 0, e.g. after loading a new dataset.
    pub fn restart(&mut self) {
        self.frame = 0;
        self.started = Instant::now();
        self.now = 0.0;
    }
}

// ---------------------------------------------------------------------------
// Timeline mapping
// ---------------------------------------------------------------------------

/// What the current virtual time means for track sampling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TimelinePosition {
    /// Seconds fed into index-interpolated sampling.
    Index(f64),
    /// A concrete timestamp inside the dataset's span.
    Datetime(DateTime<Utc>),
}

/// Map virtual seconds onto the dataset timeline.
///
/// In datetime mode one loop of `playback_duration` seconds sweeps the
/// whole span from first to last observation, then wraps around. Without
/// timestamps (or with a degenerate span) playback falls back to index
/// mode, where every track is walked at [`INDEX_SPEED`] points per second.
pub fn timeline_position(
    virtual_secs: f64,
    use_datetime: bool,
    span: Option<(DateTime<Utc>, DateTime<Utc>)>,
    playback_duration: f64,
) -> TimelinePosition {
    if use_datetime && playback_duration > 0.0 {
        if let Some((start, end)) = span {
            let span_ms = (end - start).num_milliseconds();
            if span_ms > 0 {
                let frac = virtual_secs.rem_euclid(playback_duration) / playback_duration;
                let offset = Duration::milliseconds((frac * span_ms as f64) as i64);
                return TimelinePosition::Datetime(start + offset);
            }
        }
    }
    TimelinePosition::Index(virtual_secs)
}

/// Sample a track at the current timeline position.
pub fn sample_track(track: &StormTrack, position: TimelinePosition) -> Option<TrackSample> {
    match position {
        TimelinePosition::Index(secs) => track.sample_index(secs, INDEX_SPEED),
        TimelinePosition::Datetime(target) => track.sample_datetime(target),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn deterministic_clock_steps_by_frame() {
        let mut clock = PlaybackClock::new(TimeSource::Deterministic);
        assert_eq!(clock.tick(), 0.0);
        assert!((clock.tick() - 1.0 / FPS).abs() < 1e-12);
        assert!((clock.tick() - 2.0 / FPS).abs() < 1e-12);
        assert_eq!(clock.frame(), 3);
    }

    #[test]
    fn two_deterministic_clocks_agree() {
        let mut a = PlaybackClock::new(TimeSource::Deterministic);
        let mut b = PlaybackClock::new(TimeSource::Deterministic);
        for _ in 0..120 {
            assert_eq!(a.tick(), b.tick());
        }
    }

    #[test]
    fn restart_rewinds_to_zero() {
        let mut clock = PlaybackClock::new(TimeSource::Deterministic);
        for _ in 0..10 {
            clock.tick();
        }
        clock.restart();
        assert_eq!(clock.frame(), 0);
        assert_eq!(clock.tick(), 0.0);
    }

    #[test]
    fn datetime_mode_sweeps_the_span() {
        let start = Utc.with_ymd_and_hms(2019, 7, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2019, 7, 11, 0, 0, 0).unwrap();
        let span = Some((start, end));

        assert_eq!(
            timeline_position(0.0, true, span, 60.0),
            TimelinePosition::Datetime(start)
        );
        // Half a loop lands halfway through the span.
        assert_eq!(
            timeline_position(30.0, true, span, 60.0),
            TimelinePosition::Datetime(start + Duration::days(5))
        );
        // A full loop wraps back to the start.
        assert_eq!(
            timeline_position(60.0, true, span, 60.0),
            TimelinePosition::Datetime(start)
        );
    }

    #[test]
    fn falls_back_to_index_without_span() {
        assert_eq!(
            timeline_position(3.5, true, None, 60.0),
            TimelinePosition::Index(3.5)
        );
    }

    #[test]
    fn index_mode_ignores_the_span() {
        let start = Utc.with_ymd_and_hms(2019, 7, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2019, 7, 2, 0, 0, 0).unwrap();
        assert_eq!(
            timeline_position(7.0, false, Some((start, end)), 60.0),
            TimelinePosition::Index(7.0)
        );
    }

    #[test]
    fn degenerate_span_falls_back_to_index() {
        let t = Utc.with_ymd_and_hms(2019, 7, 1, 0, 0, 0).unwrap();
        assert_eq!(
            timeline_position(2.0, true, Some((t, t)), 60.0),
            TimelinePosition::Index(2.0)
        );
    }
}
