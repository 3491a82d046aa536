use chrono::{DateTime, Utc};

// ---------------------------------------------------------------------------
// Observation – a single cleaned CSV row
// ---------------------------------------------------------------------------

/// One storm observation. Position is always present (rows without a valid
/// lat/lon are dropped at load time); wind and timestamp are nullable.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    /// Observation timestamp (IBTrACS `ISO_TIME`), if parseable.
    pub time: Option<DateTime<Utc>>,
    pub lat: f64,
    pub lon: f64,
    /// Wind speed in knots. `None` means no agency reported anything usable.
    pub wind: Option<f64>,
}

// ---------------------------------------------------------------------------
// TrackSample – an interpolated storm position for one frame
// ---------------------------------------------------------------------------

/// Result of sampling a track at a virtual time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackSample {
    pub lat: f64,
    pub lon: f64,
    /// Interpolated wind; `None` only when both bracketing points are missing.
    pub wind: Option<f64>,
}

impl TrackSample {
    /// Wind with missing data treated as calm, the value the renderer sizes
    /// and filters on.
    pub fn wind_or_calm(&self) -> f64 {
        self.wind.unwrap_or(0.0)
    }
}

fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

fn lerp_wind(a: Option<f64>, b: Option<f64>, t: f64) -> Option<f64> {
    match (a, b) {
        (None, None) => None,
        (wa, wb) => Some(lerp(wa.unwrap_or(0.0), wb.unwrap_or(0.0), t)),
    }
}

// ---------------------------------------------------------------------------
// StormTrack – all observations of one storm
// ---------------------------------------------------------------------------

/// A single storm: its identity plus observations in CSV order.
#[derive(Debug, Clone)]
pub struct StormTrack {
    pub id: String,
    pub name: String,
    pub points: Vec<Observation>,
}

impl StormTrack {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        StormTrack {
            id: id.into(),
            name: name.into(),
            points: Vec::new(),
        }
    }

    /// Mean observed position, used as the layout anchor.
    pub fn mean_position(&self) -> Option<(f64, f64)> {
        if self.points.is_empty() {
            return None;
        }
        let n = self.points.len() as f64;
        let (lat_sum, lon_sum) = self
            .points
            .iter()
            .fold((0.0, 0.0), |(la, lo), p| (la + p.lat, lo + p.lon));
        Some((lat_sum / n, lon_sum / n))
    }

    /// First and last timestamp among points that carry one.
    pub fn time_range(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        let mut times = self.points.iter().filter_map(|p| p.time);
        let first = times.next()?;
        let (min, max) = times.fold((first, first), |(lo, hi), t| (lo.min(t), hi.max(t)));
        Some((min, max))
    }

    /// Index-based sampling: advance a fractional index at `speed` points per
    /// second and interpolate between the two bracketing observations. The
    /// index clamps at the final point so finished storms hold position
    /// instead of teleporting back to their genesis.
    pub fn sample_index(&self, virtual_secs: f64, speed: f64) -> Option<TrackSample> {
        let n = self.points.len();
        if n == 0 {
            return None;
        }
        let max_f = (n as f64 - 1.0 - 1e-6).max(0.0);
        let f = (virtual_secs * speed).clamp(0.0, max_f);
        let idx0 = f.floor() as usize;
        let frac = f - f.floor();
        let idx1 = (idx0 + 1).min(n - 1);
        let p0 = &self.points[idx0];
        let p1 = &self.points[idx1];
        Some(TrackSample {
            lat: lerp(p0.lat, p1.lat, frac),
            lon: lerp(p0.lon, p1.lon, frac),
            wind: lerp_wind(p0.wind, p1.wind, frac),
        })
    }

    /// Datetime-based sampling: interpolate between the two observations
    /// bracketing `target`. Returns `None` when the track has no timestamps
    /// or does not cover `target`, in which case the storm is simply not
    /// drawn that frame.
    pub fn sample_datetime(&self, target: DateTime<Utc>) -> Option<TrackSample> {
        let pts: Vec<(DateTime<Utc>, &Observation)> = self
            .points
            .iter()
            .filter_map(|p| p.time.map(|t| (t, p)))
            .collect();
        let (first_t, first) = *pts.first()?;
        let (last_t, last) = *pts.last()?;
        if target < first_t || target > last_t {
            return None;
        }
        let (mut prev_t, mut prev) = (first_t, first);
        for &(t1, p) in &pts[1..] {
            if t1 >= target {
                let total_ms = (t1 - prev_t).num_milliseconds();
                let alpha = if total_ms == 0 {
                    0.0
                } else {
                    (target - prev_t).num_milliseconds() as f64 / total_ms as f64
                };
                return Some(TrackSample {
                    lat: lerp(prev.lat, p.lat, alpha),
                    lon: lerp(prev.lon, p.lon, alpha),
                    wind: lerp_wind(prev.wind, p.wind, alpha),
                });
            }
            prev_t = t1;
            prev = p;
        }
        // Single timestamped point, or target == last timestamp.
        Some(TrackSample {
            lat: last.lat,
            lon: last.lon,
            wind: last.wind,
        })
    }
}

// ---------------------------------------------------------------------------
// StormDataset – the complete loaded dataset
// ---------------------------------------------------------------------------

/// The full parsed dataset with its global datetime span.
#[derive(Debug, Clone)]
pub struct StormDataset {
    /// All storms, in first-appearance order of the source CSV.
    pub storms: Vec<StormTrack>,
    /// Earliest and latest observation timestamp across all storms.
    pub time_span: Option<(DateTime<Utc>, DateTime<Utc>)>,
}

impl StormDataset {
    /// Build the dataset index from grouped storms.
    pub fn from_storms(storms: Vec<StormTrack>) -> Self {
        let time_span = storms
            .iter()
            .filter_map(|s| s.time_range())
            .reduce(|(lo, hi), (a, b)| (lo.min(a), hi.max(b)));
        StormDataset { storms, time_span }
    }

    /// Number of storms.
    pub fn len(&self) -> usize {
        self.storms.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.storms.is_empty()
    }

    /// Total observation count, for the status line.
    pub fn point_count(&self) -> usize {
        self.storms.iter().map(|s| s.points.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn obs(lat: f64, lon: f64, wind: Option<f64>) -> Observation {
        Observation {
            time: None,
            lat,
            lon,
            wind,
        }
    }

    fn obs_at(h: u32, lat: f64, lon: f64, wind: Option<f64>) -> Observation {
        Observation {
            time: Some(Utc.with_ymd_and_hms(2019, 8, 1, h, 0, 0).unwrap()),
            lat,
            lon,
            wind,
        }
    }

    #[test]
    fn index_sampling_interpolates_between_points() {
        let mut track = StormTrack::new("a", "ALPHA");
        track.points = vec![obs(10.0, 130.0, Some(40.0)), obs(20.0, 140.0, Some(80.0))];
        // speed 1.0 → f = 0.5, halfway between the two points
        let s = track.sample_index(0.5, 1.0).unwrap();
        assert!((s.lat - 15.0).abs() < 1e-9);
        assert!((s.lon - 135.0).abs() < 1e-9);
        assert!((s.wind.unwrap() - 60.0).abs() < 1e-9);
    }

    #[test]
    fn index_sampling_clamps_at_final_point() {
        let mut track = StormTrack::new("a", "ALPHA");
        track.points = vec![obs(10.0, 130.0, Some(40.0)), obs(20.0, 140.0, Some(80.0))];
        let s = track.sample_index(1e9, 0.22).unwrap();
        assert!((s.lat - 20.0).abs() < 1e-3);
        assert!((s.lon - 140.0).abs() < 1e-3);
    }

    #[test]
    fn index_sampling_handles_single_point_and_empty() {
        let mut track = StormTrack::new("a", "ALPHA");
        assert!(track.sample_index(1.0, 0.22).is_none());
        track.points = vec![obs(5.0, 125.0, None)];
        let s = track.sample_index(3.0, 0.22).unwrap();
        assert_eq!(s.lat, 5.0);
        assert_eq!(s.wind, None);
    }

    #[test]
    fn datetime_sampling_brackets_target() {
        let mut track = StormTrack::new("a", "ALPHA");
        track.points = vec![
            obs_at(0, 10.0, 130.0, Some(40.0)),
            obs_at(6, 16.0, 136.0, Some(100.0)),
        ];
        let target = Utc.with_ymd_and_hms(2019, 8, 1, 3, 0, 0).unwrap();
        let s = track.sample_datetime(target).unwrap();
        assert!((s.lat - 13.0).abs() < 1e-9);
        assert!((s.lon - 133.0).abs() < 1e-9);
        assert!((s.wind.unwrap() - 70.0).abs() < 1e-9);
    }

    #[test]
    fn datetime_sampling_is_none_outside_span() {
        let mut track = StormTrack::new("a", "ALPHA");
        track.points = vec![
            obs_at(6, 10.0, 130.0, Some(40.0)),
            obs_at(12, 12.0, 132.0, None),
        ];
        let before = Utc.with_ymd_and_hms(2019, 8, 1, 0, 0, 0).unwrap();
        let after = Utc.with_ymd_and_hms(2019, 8, 2, 0, 0, 0).unwrap();
        assert!(track.sample_datetime(before).is_none());
        assert!(track.sample_datetime(after).is_none());
    }

    #[test]
    fn datetime_sampling_is_none_without_timestamps() {
        let mut track = StormTrack::new("a", "ALPHA");
        track.points = vec![obs(10.0, 130.0, Some(40.0))];
        let t = Utc.with_ymd_and_hms(2019, 8, 1, 0, 0, 0).unwrap();
        assert!(track.sample_datetime(t).is_none());
    }

    #[test]
    fn missing_wind_interpolates_as_calm_unless_both_missing() {
        assert_eq!(lerp_wind(None, None, 0.5), None);
        assert_eq!(lerp_wind(Some(50.0), None, 0.5), Some(25.0));
        assert_eq!(lerp_wind(None, Some(50.0), 0.5), Some(25.0));
    }

    #[test]
    fn dataset_span_covers_all_storms() {
        let mut a = StormTrack::new("a", "ALPHA");
        a.points = vec![obs_at(0, 10.0, 130.0, None), obs_at(6, 11.0, 131.0, None)];
        let mut b = StormTrack::new("b", "BRAVO");
        b.points = vec![obs_at(3, 20.0, 140.0, None), obs_at(18, 21.0, 141.0, None)];
        let ds = StormDataset::from_storms(vec![a, b]);
        let (start, end) = ds.time_span.unwrap();
        assert_eq!(start, Utc.with_ymd_and_hms(2019, 8, 1, 0, 0, 0).unwrap());
        assert_eq!(end, Utc.with_ymd_and_hms(2019, 8, 1, 18, 0, 0).unwrap());
        assert_eq!(ds.point_count(), 4);
    }
}
