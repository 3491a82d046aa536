use std::collections::BTreeMap;

use eframe::egui::{
    pos2, vec2, Align2, CornerRadius, FontId, Painter, Pos2, Rect, Sense, Shape, Stroke, Ui,
};

use crate::color;
use crate::data::filter;
use crate::layout::spread::cell_of;
use crate::layout::{projection, TrackLayout};
use crate::playback::{self, TimelinePosition};
use crate::state::{AppState, TrailPoint, TRAIL_CAPACITY, TRAIL_JUMP_THRESHOLD};

// ---------------------------------------------------------------------------
// Glyph geometry
// ---------------------------------------------------------------------------

/// Points along each spiral polyline.
const SPIRAL_STEPS: usize = 32;
/// Total angular sweep of a spiral, three full coils.
const SPIRAL_COILS: f64 = 6.0 * std::f64::consts::PI;
/// Spiral rotation in radians per virtual second.
const SPIRAL_ROTATION: f64 = 0.9;
const SPIRAL_STROKE: f32 = 4.0;

// ---------------------------------------------------------------------------
// Canvas
// ---------------------------------------------------------------------------

/// Paints one frame of the animation: trails, spirals and overlays for
/// every storm visible at the current playback position.
pub fn storm_canvas(ui: &mut Ui, state: &mut AppState) {
    let (response, painter) = ui.allocate_painter(ui.available_size(), Sense::hover());
    let rect = response.rect;
    let painter = painter.with_clip_rect(rect);
    painter.rect_filled(rect, CornerRadius::ZERO, color::BACKGROUND);

    let width = rect.width().max(1.0) as u32;
    let height = rect.height().max(1.0) as u32;
    state.ensure_layout(width, height);

    let origin = rect.min;
    let (Some(dataset), Some(layout)) = (&state.dataset, &state.layout) else {
        painter.text(
            rect.center(),
            Align2::CENTER_CENTER,
            "Open a storm track CSV to begin  (File > Open...)",
            FontId::proportional(16.0),
            color::STORM_LABEL,
        );
        return;
    };
    let options = &state.options;
    let trails = &mut state.trails;
    let now = state.clock.now();
    let frame = state.clock.frame();

    let position = playback::timeline_position(
        now,
        options.use_datetime,
        dataset.time_span,
        options.playback_duration,
    );

    if options.debug_grid {
        draw_debug_grid(
            &painter,
            rect,
            layout,
            state.layout_params.grid_size,
            options.debug_density,
        );
    }

    let w = width as f64;
    let h = height as f64;
    let mut visible = 0usize;

    for (idx, storm) in dataset.storms.iter().enumerate() {
        let Some(sample) = playback::sample_track(storm, position) else {
            continue;
        };
        if !filter::passes_min_wind(&sample, options.min_wind) {
            continue;
        }

        let entry = &layout.entries[idx];
        let (px, py) = projection::project(sample.lat, sample.lon, w, h);
        let x = px + entry.jitter.0 + entry.spread.0 as f64 + layout.center_offset.0;
        let y = py + entry.jitter.1 + entry.spread.1 as f64 + layout.center_offset.1;
        if !filter::on_canvas(x, y, w, h) {
            continue;
        }
        visible += 1;
        let wind = sample.wind_or_calm();

        // Trail upkeep: a long jump means the playback loop wrapped, so
        // start over instead of smearing a line across the canvas.
        let trail = &mut trails[idx];
        if let Some(last) = trail.back() {
            let dx = x - last.x as f64;
            let dy = y - last.y as f64;
            if dx * dx + dy * dy > TRAIL_JUMP_THRESHOLD * TRAIL_JUMP_THRESHOLD {
                trail.clear();
            }
        }
        trail.push_back(TrailPoint {
            x: x as f32,
            y: y as f32,
            wind,
        });
        if trail.len() > TRAIL_CAPACITY {
            trail.pop_front();
        }

        if options.show_trails {
            let len = trail.len();
            for (i, point) in trail.iter().enumerate() {
                let age = (i + 1) as f64 / len as f64;
                let alpha = (80.0 + 175.0 * age) as u8;
                let radius = (3.0 + (point.wind / 150.0) * 6.0 * age).max(2.0) as f32;
                painter.circle_filled(
                    pos2(origin.x + point.x, origin.y + point.y),
                    radius,
                    color::wind_color_alpha(point.wind, alpha),
                );
            }
        }

        let center = pos2(origin.x + x as f32, origin.y + y as f32);
        painter.add(spiral_shape(center, wind, now));

        if options.show_labels {
            painter.text(
                pos2(center.x + 10.0, center.y + 10.0),
                Align2::LEFT_TOP,
                format!("{} ({:.0} kt)", storm.name, wind),
                FontId::proportional(14.0),
                color::STORM_LABEL,
            );
        }
    }

    if let TimelinePosition::Datetime(ts) = position {
        painter.text(
            origin + vec2(8.0, 8.0),
            Align2::LEFT_TOP,
            ts.format("%Y-%m-%d %H:%M").to_string(),
            FontId::proportional(13.0),
            color::TIMESTAMP,
        );
    }
    if let Some((start, end)) = dataset.time_span {
        painter.text(
            origin + vec2(8.0, 28.0),
            Align2::LEFT_TOP,
            format!(
                "Data span: {} to {}",
                start.format("%Y-%m-%d"),
                end.format("%Y-%m-%d")
            ),
            FontId::proportional(13.0),
            color::DATA_SPAN,
        );
    }

    if frame % 30 == 0 {
        log::debug!(
            "frame {frame}: {visible}/{} storms visible, t={now:.1}s",
            dataset.len()
        );
    }
    state.visible_count = visible;
}

/// Archimedean spiral wound around `center`, sized and colored by wind.
fn spiral_shape(center: Pos2, wind: f64, now: f64) -> Shape {
    let glyph_radius = (16.0 + wind / 100.0 * 120.0).min(160.0);
    let rotation = now * SPIRAL_ROTATION;
    let points: Vec<Pos2> = (0..SPIRAL_STEPS)
        .map(|step| {
            let t = step as f64 / (SPIRAL_STEPS - 1) as f64;
            let r = glyph_radius * t;
            let a = rotation + t * SPIRAL_COILS;
            pos2(
                center.x + (r * a.cos()) as f32,
                center.y + (r * a.sin()) as f32,
            )
        })
        .collect();
    Shape::line(points, Stroke::new(SPIRAL_STROKE, color::wind_color(wind)))
}

/// Cell boundaries plus anchor markers for cells crowded enough to care
/// about, drawn with the centering shift applied so markers sit where the
/// glyphs actually render.
fn draw_debug_grid(
    painter: &Painter,
    rect: Rect,
    layout: &TrackLayout,
    grid_size: u32,
    min_density: usize,
) {
    let grid = grid_size.max(1);
    let stroke = Stroke::new(1.0, color::GRID_LINE);
    let mut x = 0u32;
    while x < layout.width {
        let gx = rect.min.x + x as f32;
        painter.line_segment([pos2(gx, rect.min.y), pos2(gx, rect.max.y)], stroke);
        x += grid;
    }
    let mut y = 0u32;
    while y < layout.height {
        let gy = rect.min.y + y as f32;
        painter.line_segment([pos2(rect.min.x, gy), pos2(rect.max.x, gy)], stroke);
        y += grid;
    }

    let mut counts: BTreeMap<(i64, i64), usize> = BTreeMap::new();
    for entry in &layout.entries {
        *counts.entry(cell_of(entry.anchor, grid)).or_default() += 1;
    }
    for (idx, entry) in layout.entries.iter().enumerate() {
        let crowded = counts
            .get(&cell_of(entry.anchor, grid))
            .is_some_and(|n| *n >= min_density);
        if !crowded {
            continue;
        }
        let ax = rect.min.x + (entry.anchor.0 + layout.center_offset.0) as f32;
        let ay = rect.min.y + (entry.anchor.1 + layout.center_offset.1) as f32;
        painter.circle_filled(pos2(ax, ay), 4.0, color::ANCHOR);
        painter.text(
            pos2(ax + 6.0, ay - 6.0),
            Align2::LEFT_BOTTOM,
            anchor_label(idx),
            FontId::monospace(12.0),
            color::ANCHOR_LABEL,
        );
    }
}

/// Anchor markers count storms from 1.
fn anchor_label(index: usize) -> String {
    format!("#{}", index + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anchor_labels_count_from_one() {
        assert_eq!(anchor_label(0), "#1");
        assert_eq!(anchor_label(11), "#12");
    }
}
