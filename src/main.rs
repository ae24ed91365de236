use scanview::cli::Args;
use scanview::shell::{self, DecodeEvent, Shell};
use scanview::widgets::viewfinder::{self, ViewfinderState, ViewfinderStyle};

use clap::Parser;
use eframe::egui;
use log::{info, warn};
use std::time::{Duration, Instant};

/// Main application state
struct ScanApp {
    shell: Shell,
    state: ViewfinderState,
    style: ViewfinderStyle,
    preview_tex: Option<egui::TextureHandle>,
    /// When set, the result stays on screen until this deadline
    result_until: Option<Instant>,
    hold: Duration,
    decodes: u32,
}

impl ScanApp {
    fn new(cc: &eframe::CreationContext<'_>, args: &Args, preview: image::RgbaImage) -> Self {
        // Restore overlay styling from previous session
        let style = cc
            .storage
            .and_then(|storage| eframe::get_value(storage, eframe::APP_KEY))
            .unwrap_or_default();

        let mut state = ViewfinderState::new();
        let shell = Shell::new(
            state.feed(),
            preview,
            Duration::from_secs_f32(args.decode_after.max(0.1)),
        );
        state.bind(shell.camera.clone());

        Self {
            shell,
            state,
            style,
            preview_tex: None,
            result_until: None,
            hold: Duration::from_secs_f32(args.hold.max(0.0)),
            decodes: 0,
        }
    }

    /// Pull decoder events and flip the overlay into result mode.
    fn poll_decoder(&mut self, ctx: &egui::Context) {
        while let Ok(event) = self.shell.decoder.events.try_recv() {
            match event {
                DecodeEvent::Decoded { image } => {
                    let size = [image.width() as usize, image.height() as usize];
                    let color = egui::ColorImage::from_rgba_unmultiplied(size, image.as_raw());
                    let texture =
                        ctx.load_texture("decode-result", color, egui::TextureOptions::LINEAR);
                    self.state.show_result(texture);
                    self.result_until = Some(Instant::now() + self.hold);
                    self.decodes += 1;
                }
            }
        }

        // Holding a result pauses the overlay's own scheduling, so keep
        // the hold timer alive ourselves
        if let Some(deadline) = self.result_until {
            let now = Instant::now();
            if now >= deadline {
                self.result_until = None;
                self.state.reset_to_live();
                self.shell.decoder.set_scanning(true);
            } else {
                ctx.request_repaint_after(deadline - now);
            }
        }
    }

    fn handle_keys(&mut self, ctx: &egui::Context) {
        ctx.input(|i| {
            if i.key_pressed(egui::Key::Space) && !self.state.showing_result() {
                let scanning = self.shell.decoder.is_scanning();
                self.shell.decoder.set_scanning(!scanning);
            }
            if i.key_pressed(egui::Key::R) {
                self.result_until = None;
                self.state.reset_to_live();
                self.shell.decoder.set_scanning(true);
            }
        });
    }
}

impl eframe::App for ScanApp {
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        eframe::set_value(storage, eframe::APP_KEY, &self.style);
    }

    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_decoder(ctx);
        self.handle_keys(ctx);

        if self.state.take_dirty() {
            ctx.request_repaint();
        }

        let mode = if self.state.showing_result() {
            "Result"
        } else if self.shell.decoder.is_scanning() {
            "Scanning"
        } else {
            "Paused"
        };

        egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(format!("Mode: {mode}"));
                ui.separator();
                ui.label(format!("Decodes: {}", self.decodes));
                ui.separator();
                if let Some(geom) = self.state.geometry() {
                    ui.label(format!(
                        "Frame: {:.0}x{:.0}",
                        geom.frame.width(),
                        geom.frame.height()
                    ));
                }
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if self.state.showing_result() {
                        if ui.button("Resume (R)").clicked() {
                            self.result_until = None;
                            self.state.reset_to_live();
                            self.shell.decoder.set_scanning(true);
                        }
                    } else if self.shell.decoder.is_scanning() {
                        if ui.button("Pause (Space)").clicked() {
                            self.shell.decoder.set_scanning(false);
                        }
                    } else if ui.button("Scan (Space)").clicked() {
                        self.shell.decoder.set_scanning(true);
                    }
                });
            });
        });

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                let view = ui.available_rect_before_wrap();
                self.shell.camera.set_display_rect(view);

                // Backdrop first, overlay second; painter order gives the z
                let texture = self.preview_tex.get_or_insert_with(|| {
                    let size = [
                        self.shell.preview.width() as usize,
                        self.shell.preview.height() as usize,
                    ];
                    let color =
                        egui::ColorImage::from_rgba_unmultiplied(size, self.shell.preview.as_raw());
                    ctx.load_texture("camera-preview", color, egui::TextureOptions::LINEAR)
                });
                ui.painter().image(
                    texture.id(),
                    view,
                    egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                    egui::Color32::WHITE,
                );

                viewfinder::render(ui, &mut self.state, &self.style);
            });
    }
}

fn main() -> eframe::Result<()> {
    let args = Args::parse();
    shell::init_logger(args.verbosity);
    info!("Starting scanview v{}", env!("CARGO_PKG_VERSION"));

    let preview = match shell::load_preview(args.image.as_deref()) {
        Ok(img) => img,
        Err(e) => {
            warn!("{e:#}; falling back to synthetic preview");
            shell::synthetic_preview(640, 480)
        }
    };

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([960.0, 720.0])
            .with_title(format!("Scanview v{}", env!("CARGO_PKG_VERSION"))),
        ..Default::default()
    };

    eframe::run_native(
        "scanview",
        options,
        Box::new(move |cc| Ok(Box::new(ScanApp::new(cc, &args, preview)))),
    )
}
