//! Equirectangular projection onto the pixel canvas.

/// Normalize any longitude into [-180, 180). IBTrACS mixes 0..360 and
/// -180..180 conventions depending on the basin export.
pub fn normalize_lon(lon: f64) -> f64 {
    (lon + 180.0).rem_euclid(360.0) - 180.0
}

/// Map (lat, lon) to pixel coordinates on a `width` x `height` canvas.
/// Longitude -180..180 spans x left to right, latitude 90..-90 spans y top
/// to bottom (north up).
pub fn project(lat: f64, lon: f64, width: f64, height: f64) -> (f64, f64) {
    let x = (normalize_lon(lon) + 180.0) / 360.0 * width;
    let y = (90.0 - lat) / 180.0 * height;
    (x, y)
}
