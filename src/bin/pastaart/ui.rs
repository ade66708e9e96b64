//! Shared chrome and the action plumbing between pages and the app.

use crate::assets::ImageSource;
use crate::constants::{CART_STORAGE_KEY, CATALOG_SCHEME, STATUS_FILTER_STORAGE_KEY};
use crate::{PastaArtApp, colors};
use eframe::egui;
use pastaart_ui::Product;
use pastaart_ui::lightbox::LightboxKey;
use pastaart_ui::modal::{ConfirmIntent, DialogEvent};
use pastaart_ui::toast::ToastLevel;
use pastaart_ui::upload::UploadCandidate;
use std::collections::HashMap;
use std::time::Instant;

/// Work a confirm dialog guards until the user answers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingAction {
    None,
    DeleteProducts(Vec<u32>),
    ToggleStatus(u32),
    RemoveCartLine(u32),
    ClearCart,
}

/// Requests raised by page widgets during a frame, applied after drawing.
pub enum UiAction {
    Navigate(String),
    LoadImage {
        key: String,
        source: ImageSource,
    },
    OpenLightbox {
        key: String,
        caption: String,
    },
    Confirm {
        intent: ConfirmIntent,
        message: Option<String>,
        action: PendingAction,
        focus: egui::Id,
    },
    Alert {
        message: String,
        focus: Option<egui::Id>,
    },
    Notify(ToastLevel, String),
    PickImageFile,
    SelectUploads(Vec<UploadCandidate>),
    RemoveUpload,
    ProductSaved(Product),
    SaveCart,
    SaveStatusFilter(String),
}

/// Stable text key for a widget id, used to hand focus back after a dialog.
fn focus_key(id: egui::Id) -> String {
    format!("{:016x}", id.value())
}

impl PastaArtApp {
    /// Routes keys to the open dialog first, then to the lightbox.
    pub fn handle_keyboard_input(&mut self, ctx: &egui::Context, now: Instant) {
        if self.modal.current().is_some() {
            let events = ctx.input_mut(|i| {
                let mut events = Vec::new();
                if i.consume_key(egui::Modifiers::NONE, egui::Key::Escape) {
                    events.push(DialogEvent::Escape);
                }
                if i.consume_key(egui::Modifiers::SHIFT, egui::Key::Tab) {
                    events.push(DialogEvent::Tab { backwards: true });
                }
                if i.consume_key(egui::Modifiers::NONE, egui::Key::Tab) {
                    events.push(DialogEvent::Tab { backwards: false });
                }
                if i.consume_key(egui::Modifiers::NONE, egui::Key::Enter)
                    || i.consume_key(egui::Modifiers::NONE, egui::Key::Space)
                {
                    events.push(DialogEvent::ActivateFocused);
                }
                events
            });
            for event in events {
                self.modal.handle(event, now);
            }
            return;
        }

        let Some(lightbox) = self.lightbox.as_mut().filter(|l| l.is_visible()) else {
            return;
        };
        let keys = ctx.input(|i| {
            let mut keys = Vec::new();
            if i.key_pressed(egui::Key::Escape) {
                keys.push(LightboxKey::Escape);
            }
            if i.key_pressed(egui::Key::Plus) || i.key_pressed(egui::Key::Equals) {
                keys.push(LightboxKey::Plus);
            }
            if i.key_pressed(egui::Key::Minus) {
                keys.push(LightboxKey::Minus);
            }
            if i.key_pressed(egui::Key::Num0) {
                keys.push(LightboxKey::Zero);
            }
            keys
        });
        for key in keys {
            lightbox.handle_key(key, now);
        }
    }

    /// Brand header with the switch between storefront and admin panel.
    pub fn show_top_bar(&mut self, ctx: &egui::Context, actions: &mut Vec<UiAction>) {
        let in_admin = self.current_path.starts_with("/admin");
        let narrow = ctx.screen_rect().width() < 720.0;

        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if in_admin && narrow && ui.button("☰").on_hover_text("Menu").clicked() {
                    self.admin.menu.toggle();
                }
                ui.heading(egui::RichText::new("PastaArt Encanto").color(colors::BRAND));

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.selectable_label(in_admin, "Painel").clicked() && !in_admin {
                        actions.push(UiAction::Navigate("/admin".to_owned()));
                    }
                    if ui.selectable_label(!in_admin, "Loja").clicked() && in_admin {
                        actions.push(UiAction::Navigate("/".to_owned()));
                    }
                });
            });
        });
    }

    pub fn apply_actions(&mut self, ctx: &egui::Context, actions: Vec<UiAction>, now: Instant) {
        for action in actions {
            match action {
                UiAction::Navigate(path) => {
                    log::debug!("Navigating to {path}");
                    self.admin.menu.open = false;
                    self.current_path = path;
                }
                UiAction::LoadImage { key, source } => {
                    self.request_image(ctx, &key, source);
                }
                UiAction::OpenLightbox { key, caption } => {
                    self.open_lightbox(key, caption, now);
                }
                UiAction::Confirm {
                    intent,
                    message,
                    action,
                    focus,
                } => {
                    let key = focus_key(focus);
                    self.focus_targets.insert(key.clone(), focus);
                    let handle = self.modal.show_confirm(
                        intent.message(message.as_deref()),
                        None,
                        None,
                        Some(key),
                        now,
                    );
                    self.pending.push((handle, action));
                }
                UiAction::Alert { message, focus } => {
                    let key = focus.map(|id| {
                        let key = focus_key(id);
                        self.focus_targets.insert(key.clone(), id);
                        key
                    });
                    // Alerts only need acknowledging
                    drop(self.modal.show_alert(message, None, None, key, now));
                }
                UiAction::Notify(level, message) => {
                    self.notifier.show(level, message, now);
                }
                UiAction::PickImageFile => {
                    let picked = rfd::FileDialog::new()
                        .add_filter("Imagens", &["jpg", "jpeg", "png", "gif", "webp"])
                        .pick_file();
                    if let Some(path) = picked {
                        match UploadCandidate::from_path(path) {
                            Ok(candidate) => self.select_upload(ctx, vec![candidate], now),
                            Err(err) => {
                                self.notifier.error(err.to_string(), now);
                            }
                        }
                    }
                }
                UiAction::SelectUploads(candidates) => {
                    self.select_upload(ctx, candidates, now);
                }
                UiAction::RemoveUpload => {
                    if let Some(preview) = self.admin.upload.preview() {
                        let key = preview.texture_key();
                        self.lightbox_binder.unbind(&key);
                        self.forget_image(&key);
                    }
                    self.admin.loader.cancel();
                    self.admin.upload.remove();
                    self.admin.schedule_preview(now);
                }
                UiAction::ProductSaved(product) => {
                    self.notifier
                        .success(format!("Produto \"{}\" salvo com sucesso!", product.name), now);
                    self.store.add_product(&product);
                }
                UiAction::SaveCart => {
                    if !self.storage.set(CART_STORAGE_KEY, self.store.cart()) {
                        self.notifier
                            .warning("Não foi possível salvar o carrinho", now);
                    }
                }
                UiAction::SaveStatusFilter(status) => {
                    self.storage.set(STATUS_FILTER_STORAGE_KEY, &status);
                }
            }
        }
    }

    /// Runs the work behind a confirmed dialog.
    pub fn apply_pending(&mut self, ctx: &egui::Context, action: PendingAction, now: Instant) {
        let mut follow_up = Vec::new();
        match action {
            PendingAction::None => {}
            PendingAction::DeleteProducts(ids) => {
                let removed = self.admin.delete_products(&ids);
                self.store.remove_products(&ids);
                self.notifier.success(
                    if removed == 1 {
                        "Produto excluído".to_owned()
                    } else {
                        format!("{removed} produtos excluídos")
                    },
                    now,
                );
            }
            PendingAction::ToggleStatus(id) => {
                if let Some(status) = self.admin.toggle_status(id) {
                    self.store.set_status(id, &status);
                    self.notifier
                        .info(format!("Status alterado para \"{status}\""), now);
                }
            }
            PendingAction::RemoveCartLine(id) => {
                self.store.remove_line(id);
                follow_up.push(UiAction::SaveCart);
            }
            PendingAction::ClearCart => {
                self.store.clear_cart();
                follow_up.push(UiAction::SaveCart);
            }
        }
        self.apply_actions(ctx, follow_up, now);
    }
}

/// Queues a decode of an embedded catalog photo the first time its slot is drawn.
pub fn request_catalog_image(
    textures: &HashMap<String, egui::TextureHandle>,
    key: Option<&str>,
    actions: &mut Vec<UiAction>,
) {
    let Some(key) = key.filter(|key| !textures.contains_key(*key)) else {
        return;
    };
    if let Some(path) = key.strip_prefix(CATALOG_SCHEME) {
        actions.push(UiAction::LoadImage {
            key: key.to_owned(),
            source: ImageSource::Embedded(path.to_owned()),
        });
    }
}

/// Draws a cached texture fitted into `size`, or a placeholder while it loads.
/// The returned response is clickable.
pub fn thumbnail(
    ui: &mut egui::Ui,
    textures: &HashMap<String, egui::TextureHandle>,
    key: Option<&str>,
    size: egui::Vec2,
) -> egui::Response {
    match key.and_then(|key| textures.get(key)) {
        Some(texture) => ui
            .add(
                egui::Image::new(egui::load::SizedTexture::from_handle(texture))
                    .fit_to_exact_size(size)
                    .corner_radius(4.0)
                    .sense(egui::Sense::click()),
            )
            .on_hover_cursor(egui::CursorIcon::ZoomIn),
        None => {
            let (rect, response) = ui.allocate_exact_size(size, egui::Sense::click());
            ui.painter().rect_filled(rect, 4.0, colors::PLACEHOLDER);
            ui.painter().text(
                rect.center(),
                egui::Align2::CENTER_CENTER,
                "🖼",
                egui::FontId::proportional(size.y.min(size.x) * 0.4),
                colors::COUNTER_TEXT,
            );
            response
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_missing_catalog_photos_are_requested() {
        let textures = HashMap::new();
        let mut actions = Vec::new();

        request_catalog_image(&textures, Some("catalog://produtos/brigadeiro.png"), &mut actions);
        request_catalog_image(&textures, Some("preview://3/foto.png"), &mut actions);
        request_catalog_image(&textures, Some("upload:///tmp/foto.png"), &mut actions);
        request_catalog_image(&textures, None, &mut actions);

        assert_eq!(actions.len(), 1);
        assert!(matches!(
            &actions[0],
            UiAction::LoadImage { key, source: ImageSource::Embedded(path) }
                if key == "catalog://produtos/brigadeiro.png"
                    && path == "produtos/brigadeiro.png"
        ));
    }
}
