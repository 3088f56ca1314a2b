// ui.rs - egui front end: controls, the torus as a clickable grid, live stats

use eframe::egui;
use egui::{Color32, Rect, Stroke, Vec2};
use std::time::{Duration, Instant};

use toroid_life::Figure;

use crate::app::LifeView;

const MAX_BOARD: f32 = 760.0;

impl eframe::App for LifeView {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if self.is_running && self.last_update.elapsed() >= self.update_interval {
            self.step();
            self.last_update = Instant::now();
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("Toroidal Game of Life");

            ui.horizontal(|ui| {
                let button_text = if self.is_running { "⏸ Pause" } else { "▶ Start" };
                if ui.button(button_text).clicked() {
                    self.is_running = !self.is_running;
                    if self.is_running {
                        self.last_update = Instant::now();
                    }
                }

                if ui.button("⏭ Step").clicked() {
                    self.is_running = false;
                    self.step();
                }

                if ui.button("⏹ Clear").clicked() {
                    self.is_running = false;
                    self.clear();
                }

                if ui.button("🎲 Populate").clicked() {
                    self.is_running = false;
                    self.populate();
                }

                ui.separator();

                ui.label("Figure:");
                egui::ComboBox::from_id_source("figure_selector")
                    .selected_text(self.selected_figure.name())
                    .show_ui(ui, |ui| {
                        for figure in Figure::ALL {
                            ui.selectable_value(&mut self.selected_figure, figure, figure.name());
                        }
                    });

                if ui.button("Stamp").clicked() {
                    self.is_running = false;
                    self.stamp_selected();
                }

                ui.separator();

                ui.label(format!("Generation: {}", self.generation()));
            });

            ui.separator();

            ui.horizontal(|ui| {
                ui.label("Speed:");
                let mut speed = 1000.0 / self.update_interval.as_millis().max(1) as f32;
                if ui.add(egui::Slider::new(&mut speed, 0.5..=90.0).suffix(" gen/sec")).changed() {
                    self.update_interval = Duration::from_millis((1000.0 / speed) as u64);
                }

                ui.separator();

                ui.label("Live:");
                ui.color_edit_button_srgba(&mut self.live_color);
                ui.label("Dead:");
                ui.color_edit_button_srgba(&mut self.dead_color);
            });

            ui.separator();
            ui.label("Click cells to toggle them while paused. Edges wrap around.");
            ui.label(self.status.as_str());
            ui.separator();

            let (height, width) = (self.grid().height(), self.grid().width());
            let spacing = 0.5;
            let box_size = (MAX_BOARD / height.max(width) as f32 - spacing).clamp(2.0, 15.0);
            let pitch = box_size + spacing;

            let start_pos = ui.cursor().min;
            let total_size = Vec2::new(pitch * width as f32 - spacing, pitch * height as f32 - spacing);
            let (response, painter) = ui.allocate_painter(total_size, egui::Sense::click());

            painter.rect_filled(Rect::from_min_size(start_pos, total_size), 0.0, Color32::BLACK);

            for row in 0..height {
                for col in 0..width {
                    let rect = Rect::from_min_size(
                        egui::pos2(start_pos.x + col as f32 * pitch, start_pos.y + row as f32 * pitch),
                        Vec2::splat(box_size),
                    );
                    let cell_color = if self.grid().get(col as i64, row as i64) {
                        self.live_color
                    } else {
                        self.dead_color
                    };
                    painter.rect_filled(rect, 1.0, cell_color);
                    if box_size >= 6.0 {
                        painter.rect_stroke(rect, 1.0, Stroke::new(0.2, Color32::from_gray(60)));
                    }
                }
            }

            if !self.is_running && response.clicked() {
                if let Some(pos) = response.interact_pointer_pos() {
                    let col = ((pos.x - start_pos.x) / pitch) as i64;
                    let row = ((pos.y - start_pos.y) / pitch) as i64;
                    if (0..width as i64).contains(&col) && (0..height as i64).contains(&row) {
                        self.toggle(col, row);
                    }
                }
            }

            ui.separator();

            let live_cells = self.grid().live_cells();
            let size = self.grid().size();
            ui.horizontal(|ui| {
                ui.label(format!("Live cells: {live_cells}"));
                ui.label(format!("Dead cells: {}", size - live_cells));
                ui.label(format!("Population: {:.1}%", live_cells as f32 / size as f32 * 100.0));
                ui.label(format!("Entropy: {:.3}", self.entropy()));
            });
        });

        if self.is_running {
            ctx.request_repaint();
        }
    }
}
