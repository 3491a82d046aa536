use chrono::{DateTime, Utc};
use eframe::egui::Ui;
use egui_plot::{Line, Plot, PlotPoints, VLine};

use crate::color;
use crate::playback::{self, TimelinePosition};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Wind timeline (bottom strip)
// ---------------------------------------------------------------------------

/// Wind speed over time for every storm, with a cursor marking the current
/// playback position in datetime mode. Only meaningful when the dataset
/// carries timestamps; callers hide the panel otherwise.
pub fn wind_timeline(ui: &mut Ui, state: &AppState) {
    let Some(dataset) = &state.dataset else {
        return;
    };
    let Some((start, _end)) = dataset.time_span else {
        return;
    };
    let hours_since = |t: DateTime<Utc>| (t - start).num_milliseconds() as f64 / 3_600_000.0;

    let position = playback::timeline_position(
        state.clock.now(),
        state.options.use_datetime,
        dataset.time_span,
        state.options.playback_duration,
    );

    Plot::new("wind_timeline")
        .x_axis_label("Hours since first observation")
        .y_axis_label("Wind (kt)")
        .allow_boxed_zoom(false)
        .allow_drag(false)
        .allow_scroll(false)
        .allow_zoom(false)
        .show(ui, |plot_ui| {
            for storm in &dataset.storms {
                let points: PlotPoints = storm
                    .points
                    .iter()
                    .filter_map(|p| Some([hours_since(p.time?), p.wind?]))
                    .collect();
                let peak = storm
                    .points
                    .iter()
                    .filter_map(|p| p.wind)
                    .fold(0.0_f64, f64::max);

                let line = Line::new(points)
                    .name(&storm.name)
                    .color(color::wind_color(peak))
                    .width(1.0);
                plot_ui.line(line);
            }

            if let TimelinePosition::Datetime(ts) = position {
                plot_ui.vline(
                    VLine::new(hours_since(ts))
                        .color(color::TIMESTAMP)
                        .width(2.0),
                );
            }
        });
}
