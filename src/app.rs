use eframe::egui;

use crate::config::Config;
use crate::pipeline::SimulationPipeline;
use crate::pointer::{screen_to_grid, SharedPointer};
use crate::presets::{ObstaclePreset, PresetMask};

const SCALES: [(f32, &str); 4] = [(0.25, "1/4"), (0.5, "1/2"), (1.0, "1"), (2.0, "2")];

/// Viewer: drives one simulation tick per repaint and shows the result.
pub struct App {
    config: Config,
    pipeline: Option<SimulationPipeline>,
    pointer: SharedPointer,
    texture: Option<egui::TextureHandle>,
    /// Size of the simulation viewport the current grid was built for.
    viewport: Option<egui::Vec2>,
    needs_reset: bool,
    last_error: Option<String>,
}

impl App {
    pub fn new(_cc: &eframe::CreationContext, config: Config) -> Self {
        let (pipeline, last_error) = match SimulationPipeline::new(config.solver.clone()) {
            Ok(pipeline) => (Some(pipeline), None),
            Err(e) => (None, Some(e.to_string())),
        };
        let pointer = pipeline
            .as_ref()
            .map(SimulationPipeline::pointer)
            .unwrap_or_default();

        Self {
            config,
            pipeline,
            pointer,
            texture: None,
            viewport: None,
            needs_reset: true,
            last_error,
        }
    }

    fn reset(&mut self, size: egui::Vec2) {
        let Some(pipeline) = self.pipeline.as_mut() else {
            return;
        };
        let display = &self.config.display;
        let source = PresetMask {
            preset: display.preset,
            text: &display.preset_text,
        };
        log::info!(
            "resetting for {:.0}x{:.0} viewport at scale {}, preset {:?}",
            size.x,
            size.y,
            display.sim_scale,
            display.preset
        );
        match pipeline.reset_for_display(size, display.sim_scale, &source) {
            Ok(()) => self.last_error = None,
            Err(e) => self.last_error = Some(e.to_string()),
        }
        self.pointer.clear();
        self.viewport = Some(size);
        self.needs_reset = false;
    }

    fn draw_controls(&mut self, ui: &mut egui::Ui) {
        ui.vertical(|ui| {
            ui.label("Simulation Scale");
            let mut scale = self.config.display.sim_scale;
            egui::ComboBox::from_id_salt("sim_scale")
                .selected_text(format!("{scale}"))
                .show_ui(ui, |ui| {
                    for (value, label) in SCALES {
                        ui.selectable_value(&mut scale, value, label);
                    }
                });
            if scale != self.config.display.sim_scale {
                self.config.display.sim_scale = scale;
                self.needs_reset = true;
            }

            ui.label("Obstacles");
            let mut preset = self.config.display.preset;
            egui::ComboBox::from_id_salt("preset")
                .selected_text(preset.label())
                .show_ui(ui, |ui| {
                    for option in ObstaclePreset::ALL {
                        ui.selectable_value(&mut preset, option, option.label());
                    }
                });
            if preset != self.config.display.preset {
                self.config.display.preset = preset;
                self.needs_reset = true;
            }

            if ui.button("Reset").clicked() {
                self.needs_reset = true;
            }
        });
    }

    fn draw_simulation(&mut self, ui: &mut egui::Ui, ctx: &egui::Context) {
        let rect = ui.available_rect_before_wrap();
        if rect.width() < 1.0 || rect.height() < 1.0 {
            return;
        }
        if self.needs_reset || self.viewport != Some(rect.size()) {
            self.reset(rect.size());
        }

        let Some(pipeline) = self.pipeline.as_mut() else {
            return;
        };
        if let (Some(hover), Some(grid)) = (ctx.pointer_hover_pos(), pipeline.grid()) {
            if let Some(position) = screen_to_grid(hover, rect, pipeline.scale(), grid.height) {
                self.pointer.store(position);
            }
        }

        let Some(ticket) = pipeline.request_frame() else {
            return;
        };
        match pipeline.tick(ticket) {
            Ok(Some(output)) => {
                let image = output.to_color_image();
                let options = egui::TextureOptions {
                    magnification: egui::TextureFilter::Nearest,
                    minification: egui::TextureFilter::Nearest,
                    mipmap_mode: Some(egui::TextureFilter::Nearest),
                    wrap_mode: egui::TextureWrapMode::ClampToEdge,
                };
                if let Some(texture) = &mut self.texture {
                    texture.set(image, options);
                } else {
                    self.texture = Some(ctx.load_texture("simulation", image, options));
                }
            }
            Ok(None) => {}
            Err(e) => {
                log::error!("tick failed: {e}");
                self.last_error = Some(e.to_string());
            }
        }

        if let Some(texture) = &self.texture {
            ui.image((texture.id(), rect.size()));
        }
    }
}

impl eframe::App for App {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::SidePanel::left("control_panel").show(ctx, |ui| {
            self.draw_controls(ui);
        });

        egui::TopBottomPanel::bottom("bottom_panel").show(ctx, |ui| {
            let status = match (&self.last_error, &self.pipeline) {
                (Some(error), _) => format!("Error: {error}"),
                (None, Some(pipeline)) => match pipeline.grid() {
                    Some(grid) => format!(
                        "Grid: {}x{}, Tick: {}, State: {}",
                        grid.width,
                        grid.height,
                        pipeline.ticks(),
                        pipeline.state().name()
                    ),
                    None => format!("State: {}", pipeline.state().name()),
                },
                (None, None) => "Solver unavailable".to_owned(),
            };
            ui.label(status);
        });

        egui::CentralPanel::default()
            .frame(egui::Frame::default())
            .show(ctx, |ui| {
                self.draw_simulation(ui, ctx);
            });

        // One tick per display refresh.
        ctx.request_repaint();
    }
}
