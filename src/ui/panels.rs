use eframe::egui::{self, Color32, RichText, Slider, Ui};

use crate::playback::TimeSource;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – display and playback controls
// ---------------------------------------------------------------------------

/// Render the left control panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Display");
    ui.separator();

    let has_span = state
        .dataset
        .as_ref()
        .and_then(|ds| ds.time_span)
        .is_some();
    if state.dataset.is_none() {
        ui.label("No dataset loaded.");
        return;
    }

    let options = &mut state.options;
    ui.checkbox(&mut options.show_labels, "Storm labels");
    ui.checkbox(&mut options.show_trails, "Trails");
    ui.checkbox(&mut options.debug_grid, "Debug grid");
    if options.debug_grid {
        ui.add(Slider::new(&mut options.debug_density, 1..=20).text("anchor density"));
    }
    ui.add(
        Slider::new(&mut options.min_wind, 0.0..=100.0)
            .text("min wind (kt)")
            .integer(),
    );

    ui.add_space(8.0);
    ui.heading("Playback");
    ui.separator();

    let source = match state.clock.source() {
        TimeSource::Deterministic => "frame counter",
        TimeSource::WallClock => "wall clock",
    };
    ui.label(format!("Time source: {source}"));
    ui.label(format!("t = {:.1} s", state.clock.now()));

    if has_span {
        ui.checkbox(&mut options.use_datetime, "Follow observation times");
        if options.use_datetime {
            ui.add(
                Slider::new(&mut options.playback_duration, 10.0..=300.0).text("loop seconds"),
            );
        }
        ui.checkbox(&mut options.show_timeline, "Wind timeline");
    } else {
        ui.label("No timestamps in this dataset.");
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            if ui.button("Save frame…").clicked() {
                save_frame_dialog(ui.ctx(), state);
                ui.close_menu();
            }
            ui.separator();
            if ui.button("Quit").clicked() {
                ui.ctx().send_viewport_cmd(egui::ViewportCommand::Close);
            }
        });

        ui.separator();

        if let Some(ds) = &state.dataset {
            ui.label(format!(
                "{} storms ({} observations), {} visible",
                ds.len(),
                ds.point_count(),
                state.visible_count
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open storm track data")
        .add_filter("CSV", &["csv"])
        .pick_file();

    if let Some(path) = file {
        match crate::data::loader::load_csv(&path, state.zero_is_nan) {
            Ok(dataset) => {
                log::info!(
                    "Loaded {} storms with {} observations",
                    dataset.len(),
                    dataset.point_count()
                );
                state.set_dataset(dataset);
            }
            Err(e) => {
                log::error!("Failed to load file: {e:#}");
                state.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }
}

/// Ask for a destination, then request a screenshot from the backend. The
/// image arrives as an event a frame or two later and is written out in
/// the app's update loop.
fn save_frame_dialog(ctx: &egui::Context, state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Save current frame")
        .set_file_name("typhoon_frame.png")
        .add_filter("PNG image", &["png"])
        .save_file();

    if let Some(path) = file {
        state.pending_snapshot = Some(path);
        ctx.send_viewport_cmd(egui::ViewportCommand::Screenshot(egui::UserData::default()));
    }
}
