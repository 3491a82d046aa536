use std::path::Path;

use anyhow::Context;
use eframe::egui;

use crate::playback::FPS;
use crate::state::AppState;
use crate::ui::{canvas, panels, timeline};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct TyphoonApp {
    pub state: AppState,
}

impl TyphoonApp {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }

    /// Write out a screenshot delivered by the backend, if one was
    /// requested through File > Save frame.
    fn handle_screenshot_events(&mut self, ctx: &egui::Context) {
        let Some(path) = self.state.pending_snapshot.clone() else {
            return;
        };
        let shot = ctx.input(|i| {
            i.events.iter().find_map(|e| match e {
                egui::Event::Screenshot { image, .. } => Some(image.clone()),
                _ => None,
            })
        });
        let Some(shot) = shot else {
            return;
        };
        self.state.pending_snapshot = None;
        match save_frame(&shot, &path) {
            Ok(()) => {
                log::info!("Saved frame to {}", path.display());
                self.state.status_message = Some(format!("Saved {}", path.display()));
            }
            Err(e) => {
                log::error!("Failed to save frame: {e:#}");
                self.state.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }
}

impl eframe::App for TyphoonApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // One tick per rendered frame drives the whole animation.
        self.state.clock.tick();

        if ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
        }
        self.handle_screenshot_events(ctx);

        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: display and playback controls ----
        egui::SidePanel::left("control_panel")
            .default_width(220.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Bottom panel: wind timeline ----
        let has_span = self
            .state
            .dataset
            .as_ref()
            .and_then(|ds| ds.time_span)
            .is_some();
        if has_span && self.state.options.show_timeline {
            egui::TopBottomPanel::bottom("wind_timeline")
                .default_height(140.0)
                .resizable(true)
                .show(ctx, |ui| {
                    timeline::wind_timeline(ui, &self.state);
                });
        }

        // ---- Central panel: animated canvas ----
        egui::CentralPanel::default().show(ctx, |ui| {
            canvas::storm_canvas(ui, &mut self.state);
        });

        ctx.request_repaint_after(std::time::Duration::from_secs_f64(1.0 / FPS));
    }
}

fn save_frame(image: &egui::ColorImage, path: &Path) -> anyhow::Result<()> {
    let [width, height] = image.size;
    let pixels: Vec<u8> = image
        .pixels
        .iter()
        .flat_map(|c| c.to_array())
        .collect();
    image::save_buffer(
        path,
        &pixels,
        width as u32,
        height as u32,
        image::ExtendedColorType::Rgba8,
    )
    .with_context(|| format!("writing {}", path.display()))
}
