use eframe::egui::Color32;
use palette::{Hsv, IntoColor, Srgb};

// ---------------------------------------------------------------------------
// Canvas palette
// ---------------------------------------------------------------------------

/// Deep night-sky background the glyphs glow against.
pub const BACKGROUND: Color32 = Color32::from_rgb(10, 18, 28);
/// Debug grid cell boundaries.
pub const GRID_LINE: Color32 = Color32::from_rgb(40, 40, 60);
/// Debug anchor markers.
pub const ANCHOR: Color32 = Color32::from_rgb(200, 160, 40);
/// Debug anchor index labels.
pub const ANCHOR_LABEL: Color32 = Color32::from_rgb(220, 220, 200);
/// Storm name labels next to each glyph.
pub const STORM_LABEL: Color32 = Color32::from_rgb(220, 220, 220);
/// Current-timestamp overlay in datetime playback.
pub const TIMESTAMP: Color32 = Color32::from_rgb(200, 200, 200);
/// Dataset span overlay.
pub const DATA_SPAN: Color32 = Color32::from_rgb(180, 180, 180);

// ---------------------------------------------------------------------------
// Wind speed → colour
// ---------------------------------------------------------------------------

/// Maps wind speed in knots onto a hue ramp from deep blue (calm) through
/// green and yellow to red (violent). The ramp covers the usual best-track
/// range of 5 to 150 kt and clamps outside it.
pub fn wind_color(wind_knots: f64) -> Color32 {
    let wn = ((wind_knots - 5.0) / 145.0).clamp(0.0, 1.0) as f32;
    let hsv = Hsv::new(234.0 * (1.0 - wn), 0.92, 0.98);
    let rgb: Srgb = hsv.into_color();
    Color32::from_rgb(
        (rgb.red * 255.0) as u8,
        (rgb.green * 255.0) as u8,
        (rgb.blue * 255.0) as u8,
    )
}

/// The wind ramp with an explicit alpha, used for fading trail dots.
pub fn wind_color_alpha(wind_knots: f64, alpha: u8) -> Color32 {
    let c = wind_color(wind_knots);
    Color32::from_rgba_unmultiplied(c.r(), c.g(), c.b(), alpha)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn calm_wind_is_blue() {
        let c = wind_color(5.0);
        assert!(c.b() > c.r());
        assert!(c.b() > c.g());
    }

    #[test]
    fn violent_wind_is_red() {
        let c = wind_color(150.0);
        assert!(c.r() > c.g());
        assert!(c.r() > c.b());
    }

    #[test]
    fn ramp_clamps_outside_the_range() {
        assert_eq!(wind_color(-20.0), wind_color(5.0));
        assert_eq!(wind_color(500.0), wind_color(150.0));
    }

    #[test]
    fn midrange_wind_moves_off_blue() {
        let calm = wind_color(5.0);
        let mid = wind_color(80.0);
        assert_ne!(calm, mid);
        assert!(mid.b() < calm.b());
    }

    #[test]
    fn alpha_passes_through() {
        // Color32 stores premultiplied channels; r()/g()/b() come back scaled.
        let base = wind_color(60.0);
        let faded = wind_color_alpha(60.0, 90);
        assert_eq!(faded.a(), 90);
        assert_eq!(
            faded,
            Color32::from_rgba_unmultiplied(base.r(), base.g(), base.b(), 90)
        );
    }
}
