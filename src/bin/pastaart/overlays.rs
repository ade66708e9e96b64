//! Full-screen layers drawn above the pages: the image lightbox and dialogs.

use crate::PastaArtApp;
use crate::colors;
use crate::constants::LIGHTBOX_FIT;
use eframe::egui;
use pastaart_ui::lightbox::{LightboxPhase, Pan};
use pastaart_ui::modal::{CLOSE_DURATION, DialogControl, DialogEvent, DialogPhase};
use std::time::Instant;

/// Glyph drawn for a dialog icon name.
fn icon_glyph(icon: &str) -> &'static str {
    match icon {
        "question-circle" => "❓",
        "exclamation-triangle" => "⚠",
        "check-circle" => "✔",
        _ => "ℹ",
    }
}

fn pan_of(pos: egui::Pos2) -> Pan {
    Pan { x: pos.x, y: pos.y }
}

impl PastaArtApp {
    /// Renders the lightbox when visible and feeds it pointer input.
    pub fn show_lightbox(&mut self, ctx: &egui::Context, now: Instant) {
        let Some(lightbox) = self.lightbox.as_mut() else {
            return;
        };
        if !lightbox.is_visible() {
            return;
        }
        let Some(image) = lightbox.image().cloned() else {
            return;
        };

        let opacity = lightbox.opacity(now);
        if matches!(lightbox.phase(), LightboxPhase::Closing { .. }) {
            ctx.request_repaint();
        }

        let screen = ctx.screen_rect();
        let texture = self.texture_cache.get(&image.key);

        egui::Area::new(egui::Id::new("lightbox"))
            .order(egui::Order::Foreground)
            .fixed_pos(screen.min)
            .interactable(true)
            .show(ctx, |ui| {
                let backdrop = ui.allocate_rect(screen, egui::Sense::click());
                ui.painter()
                    .rect_filled(screen, 0.0, colors::LIGHTBOX_BACKDROP.gamma_multiply(opacity));

                let Some(texture) = texture else {
                    ui.put(
                        egui::Rect::from_center_size(screen.center(), egui::vec2(64.0, 64.0)),
                        egui::Spinner::new(),
                    );
                    if backdrop.clicked() {
                        lightbox.close(now);
                    }
                    return;
                };

                let image_size = texture.size_vec2();
                let fit = (screen.width() * LIGHTBOX_FIT / image_size.x)
                    .min(screen.height() * LIGHTBOX_FIT / image_size.y);
                let pan = lightbox.pan();
                let rect = egui::Rect::from_center_size(
                    screen.center() + egui::vec2(pan.x, pan.y),
                    image_size * fit * lightbox.scale(),
                );

                let response = ui.interact(
                    rect,
                    egui::Id::new("lightbox_image"),
                    egui::Sense::click_and_drag(),
                );
                ui.painter().image(
                    texture.id(),
                    rect,
                    egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                    egui::Color32::WHITE.gamma_multiply(opacity),
                );

                if response.drag_started()
                    && let Some(pos) = response.interact_pointer_pos()
                {
                    lightbox.drag_start(pan_of(pos));
                }
                if response.dragged()
                    && let Some(pos) = response.interact_pointer_pos()
                {
                    lightbox.drag_move(pan_of(pos));
                }
                if response.drag_stopped() {
                    lightbox.drag_end();
                }
                if response.double_clicked() {
                    lightbox.toggle_zoom();
                }
                if response.hovered() {
                    let scroll = ui.input(|i| i.raw_scroll_delta.y);
                    if scroll != 0.0 {
                        // Wheel up zooms in
                        lightbox.wheel(-scroll);
                    }
                }

                if !image.caption.is_empty() {
                    ui.painter().text(
                        egui::pos2(screen.center().x, screen.bottom() - 56.0),
                        egui::Align2::CENTER_CENTER,
                        &image.caption,
                        egui::FontId::proportional(16.0),
                        egui::Color32::WHITE.gamma_multiply(opacity),
                    );
                }

                let toolbar = egui::Rect::from_center_size(
                    egui::pos2(screen.center().x, screen.bottom() - 24.0),
                    egui::vec2(220.0, 32.0),
                );
                ui.scope_builder(egui::UiBuilder::new().max_rect(toolbar), |ui| {
                    ui.horizontal(|ui| {
                        if ui.button("−").on_hover_text("Diminuir zoom (-)").clicked() {
                            lightbox.zoom_out();
                        }
                        ui.label(
                            egui::RichText::new(format!("{:.0}%", lightbox.scale() * 100.0))
                                .color(egui::Color32::WHITE),
                        );
                        if ui.button("+").on_hover_text("Aumentar zoom (+)").clicked() {
                            lightbox.zoom_in();
                        }
                        if ui.button("Reset").on_hover_text("Restaurar (0)").clicked() {
                            lightbox.reset();
                        }
                        if ui.button("✕").on_hover_text("Fechar (Esc)").clicked() {
                            lightbox.close(now);
                        }
                    });
                });

                // Clicks on the image itself keep the overlay open
                if backdrop.clicked() && !response.hovered() {
                    lightbox.close(now);
                }
            });
    }

    /// Renders the live dialog, if any, and routes its clicks to the controller.
    pub fn show_dialog(&mut self, ctx: &egui::Context, now: Instant) {
        let Some(dialog) = self.modal.current() else {
            return;
        };

        let opacity = match dialog.phase() {
            DialogPhase::Showing { .. } => 0.0,
            DialogPhase::Open => 1.0,
            DialogPhase::Closing { since, .. } => {
                ctx.request_repaint();
                let t = now.saturating_duration_since(since).as_secs_f32()
                    / CLOSE_DURATION.as_secs_f32();
                (1.0 - t).clamp(0.0, 1.0)
            }
        };

        let kind = dialog.kind;
        let title = dialog.title.clone();
        let message = dialog.message.clone();
        let icon = icon_glyph(&dialog.icon);
        let controls = dialog.focus.controls().to_vec();
        let focused = dialog.focus.focused();

        let screen = ctx.screen_rect();
        let mut events = Vec::new();

        egui::Area::new(egui::Id::new("dialog_backdrop"))
            .order(egui::Order::Foreground)
            .fixed_pos(screen.min)
            .show(ctx, |ui| {
                let backdrop = ui.allocate_rect(screen, egui::Sense::click());
                ui.painter()
                    .rect_filled(screen, 0.0, colors::BACKDROP.gamma_multiply(opacity));
                if backdrop.clicked() {
                    events.push(DialogEvent::BackdropClick);
                }
            });

        egui::Area::new(egui::Id::new("dialog"))
            .order(egui::Order::Tooltip)
            .anchor(egui::Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
            .show(ctx, |ui| {
                ui.set_opacity(opacity);
                egui::Frame::popup(ui.style())
                    .inner_margin(egui::Margin::same(16))
                    .show(ui, |ui| {
                        ui.set_max_width(360.0);
                        ui.horizontal(|ui| {
                            ui.label(egui::RichText::new(icon).size(22.0).color(colors::BRAND));
                            ui.heading(&title);
                        });
                        ui.add_space(8.0);
                        ui.label(&message);
                        ui.add_space(12.0);

                        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                            // Right-to-left: primary action first
                            for control in controls.iter().rev() {
                                let mut button = egui::Button::new(control.label(kind));
                                if *control == DialogControl::Ok {
                                    button = button.fill(colors::BRAND);
                                }
                                if focused == Some(*control) {
                                    button =
                                        button.stroke(egui::Stroke::new(2.0, colors::BRAND_DARK));
                                }
                                if ui.add(button).clicked() {
                                    events.push(DialogEvent::Activate(*control));
                                }
                            }
                        });
                    });
            });

        for event in events {
            self.modal.handle(event, now);
        }
    }
}
