use super::model::TrackSample;

// ---------------------------------------------------------------------------
// Render-time predicates
// ---------------------------------------------------------------------------

/// Wind threshold test. Samples below `min_wind` stay in the dataset but
/// are skipped by the renderer for the current frame; a storm reappears as
/// soon as interpolation carries it back over the threshold. Missing wind
/// counts as calm, so any positive threshold hides it.
pub fn passes_min_wind(sample: &TrackSample, min_wind: f64) -> bool {
    sample.wind_or_calm() >= min_wind
}

/// Whether a final pixel position (after jitter, spread and centering)
/// lands on the canvas.
pub fn on_canvas(x: f64, y: f64, width: f64, height: f64) -> bool {
    x >= 0.0 && x < width && y >= 0.0 && y < height
}
