//! Storefront: product grid, product page, cart and contact form.

use crate::assets::ImageSource;
use crate::colors::{self, level_color};
use crate::constants::{CARD_WIDTH, CART_STORAGE_KEY, PREVIEW_MAX_WIDTH, QUANTITY_PULSE};
use crate::image_key;
use crate::ui::{PendingAction, UiAction, thumbnail};
use eframe::egui;
use pastaart_ui::busy::BusyButton;
use pastaart_ui::flash::FlashMessages;
use pastaart_ui::lazy::LazyImages;
use pastaart_ui::masks::{
    CART_QUANTITY_MAX, CART_QUANTITY_MIN, clamp_cart_quantity, format_phone_number,
};
use pastaart_ui::modal::ConfirmIntent;
use pastaart_ui::nav::{NavLink, active_bottom_link};
use pastaart_ui::storage::{JsonStorage, MemoryBackend};
use pastaart_ui::toast::ToastLevel;
use pastaart_ui::validation::validate_email_on_blur;
use pastaart_ui::{Catalog, Product};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Repaint interval while flashes, pulses or busy buttons are live.
const LIVE_REFRESH: Duration = Duration::from_millis(50);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub product_id: u32,
    pub name: String,
    pub price: f64,
    pub quantity: i64,
}

impl CartLine {
    fn subtotal(&self) -> f64 {
        self.price * self.quantity as f64
    }
}

#[derive(Debug, Default)]
struct ContactForm {
    name: String,
    phone: String,
    email: String,
    email_error: Option<&'static str>,
    message: String,
}

pub struct StorefrontPage {
    links: Vec<NavLink>,
    products: Vec<Product>,
    lazy: LazyImages,
    add_buttons: HashMap<u32, BusyButton>,
    cart: Vec<CartLine>,
    flashes: FlashMessages,
    contact: ContactForm,
    /// Quantity a product page adds to the cart
    detail_quantity: i64,
    /// Cart line whose quantity just changed
    pulse: Option<(u32, Instant)>,
}

impl StorefrontPage {
    pub fn new(catalog: &Catalog, storage: &JsonStorage<MemoryBackend>) -> Self {
        let cart: Vec<CartLine> = storage.get(CART_STORAGE_KEY, Vec::new());
        log::debug!("Restored cart with {} line(s)", cart.len());

        let mut page = Self {
            links: vec![
                NavLink::new("Início", "/"),
                NavLink::new("Produtos", "/produtos"),
                NavLink::new("Carrinho", "/carrinho"),
                NavLink::new("Contato", "/contato"),
            ],
            products: Vec::new(),
            lazy: LazyImages::default(),
            add_buttons: HashMap::new(),
            cart,
            flashes: FlashMessages::default(),
            contact: ContactForm::default(),
            detail_quantity: CART_QUANTITY_MIN,
            pulse: None,
        };
        for product in &catalog.products {
            page.add_product(product);
        }
        page
    }

    pub fn cart(&self) -> &[CartLine] {
        &self.cart
    }

    /// Adds a new product or replaces an edited one.
    pub fn add_product(&mut self, product: &Product) {
        if let Some(path) = &product.image {
            self.lazy.observe(product.id.to_string(), path.as_str());
        }
        self.add_buttons
            .entry(product.id)
            .or_insert_with(BusyButton::add_to_cart);
        match self.products.iter_mut().find(|p| p.id == product.id) {
            Some(existing) => *existing = product.clone(),
            None => self.products.push(product.clone()),
        }
    }

    pub fn remove_products(&mut self, ids: &[u32]) {
        self.products.retain(|p| !ids.contains(&p.id));
    }

    pub fn set_status(&mut self, id: u32, status: &str) {
        if let Some(product) = self.products.iter_mut().find(|p| p.id == id) {
            product.status = status.to_owned();
        }
    }

    pub fn remove_line(&mut self, product_id: u32) {
        self.cart.retain(|line| line.product_id != product_id);
    }

    pub fn clear_cart(&mut self) {
        self.cart.clear();
    }

    fn add_to_cart(&mut self, product: &Product, quantity: i64) {
        match self.cart.iter_mut().find(|l| l.product_id == product.id) {
            Some(line) => line.quantity = clamp_cart_quantity(line.quantity + quantity),
            None => self.cart.push(CartLine {
                product_id: product.id,
                name: product.name.clone(),
                price: product.price,
                quantity: clamp_cart_quantity(quantity),
            }),
        }
    }

    pub fn tick(&mut self, now: Instant) {
        self.flashes.tick(now);
        for button in self.add_buttons.values_mut() {
            button.tick(now);
        }
        if self
            .pulse
            .is_some_and(|(_, since)| now.saturating_duration_since(since) >= QUANTITY_PULSE)
        {
            self.pulse = None;
        }
    }

    pub fn next_deadline(&self) -> Option<Duration> {
        let live = !self.flashes.is_empty()
            || self.pulse.is_some()
            || self.add_buttons.values().any(BusyButton::is_busy);
        live.then_some(LIVE_REFRESH)
    }

    fn cart_count(&self) -> i64 {
        self.cart.iter().map(|l| l.quantity).sum()
    }

    pub fn show(
        &mut self,
        ctx: &egui::Context,
        path: &str,
        textures: &HashMap<String, egui::TextureHandle>,
        now: Instant,
        actions: &mut Vec<UiAction>,
    ) {
        self.show_bottom_nav(ctx, path, actions);

        egui::CentralPanel::default().show(ctx, |ui| {
            self.show_flashes(ui, now);
            egui::ScrollArea::vertical().show(ui, |ui| {
                match path {
                    "/" | "/produtos" => self.show_grid(ui, textures, now, actions),
                    "/carrinho" => self.show_cart(ui, now, actions),
                    "/contato" => self.show_contact(ui, now, actions),
                    _ => match path
                        .strip_prefix("/produtos/")
                        .and_then(|id| id.parse::<u32>().ok())
                    {
                        Some(id) => self.show_product(ui, id, textures, now, actions),
                        None => {
                            ui.label(format!("Página não encontrada: {path}"));
                        }
                    },
                }
            });
        });
    }

    fn show_bottom_nav(&self, ctx: &egui::Context, path: &str, actions: &mut Vec<UiAction>) {
        let active = active_bottom_link(&self.links, path);
        egui::TopBottomPanel::bottom("bottom_nav").show(ctx, |ui| {
            ui.horizontal(|ui| {
                for (idx, link) in self.links.iter().enumerate() {
                    let label = if link.href == "/carrinho" && !self.cart.is_empty() {
                        format!("{} ({})", link.label, self.cart_count())
                    } else {
                        link.label.clone()
                    };
                    if ui.selectable_label(active == Some(idx), label).clicked() {
                        actions.push(UiAction::Navigate(link.href.clone()));
                    }
                }
            });
        });
    }

    fn show_flashes(&mut self, ui: &mut egui::Ui, now: Instant) {
        let mut close = None;
        for (idx, flash) in self.flashes.messages().iter().enumerate() {
            let opacity = flash.opacity(now);
            ui.add_space(8.0 + flash.offset_y(now) * 0.4);
            egui::Frame::new()
                .fill(level_color(flash.level).gamma_multiply(opacity))
                .corner_radius(4.0)
                .inner_margin(egui::Margin::same(8))
                .show(ui, |ui| {
                    ui.horizontal(|ui| {
                        ui.label(
                            egui::RichText::new(format!("{}  {}", flash.level.icon(), flash.text))
                                .color(egui::Color32::WHITE.gamma_multiply(opacity)),
                        );
                        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                            if !flash.is_hiding() && ui.small_button("✕").clicked() {
                                close = Some(idx);
                            }
                        });
                    });
                });
        }
        if let Some(idx) = close {
            self.flashes.hide(idx, now);
        }
    }

    fn show_grid(
        &mut self,
        ui: &mut egui::Ui,
        textures: &HashMap<String, egui::TextureHandle>,
        now: Instant,
        actions: &mut Vec<UiAction>,
    ) {
        ui.heading("Nossos produtos");
        ui.add_space(8.0);

        let mut added = Vec::new();
        let image_size = egui::vec2(CARD_WIDTH - 16.0, (CARD_WIDTH - 16.0) * 0.75);

        ui.horizontal_wrapped(|ui| {
            for product in self.products.iter().filter(|p| p.status == "ativo") {
                egui::Frame::group(ui.style()).show(ui, |ui| {
                    ui.set_width(CARD_WIDTH - 16.0);
                    ui.vertical(|ui| {
                        let id = product.id.to_string();
                        let slot = egui::Rect::from_min_size(ui.cursor().min, image_size);
                        if ui.is_rect_visible(slot)
                            && let Some(src) = self.lazy.reveal(&id)
                            && !src.contains("://")
                        {
                            actions.push(UiAction::LoadImage {
                                key: image_key(src),
                                source: ImageSource::Embedded(src.to_owned()),
                            });
                        }

                        let key = self
                            .lazy
                            .get(&id)
                            .filter(|image| image.is_loaded())
                            .and(product.image.as_deref())
                            .map(image_key);
                        if thumbnail(ui, textures, key.as_deref(), image_size).clicked() {
                            actions.push(UiAction::Navigate(format!("/produtos/{}", product.id)));
                        }

                        if ui.link(egui::RichText::new(&product.name).strong()).clicked() {
                            actions.push(UiAction::Navigate(format!("/produtos/{}", product.id)));
                        }
                        ui.label(
                            egui::RichText::new(product.price_display())
                                .color(colors::BRAND)
                                .strong(),
                        );

                        if let Some(button) = self.add_buttons.get(&product.id)
                            && ui
                                .add_enabled(
                                    !button.disabled,
                                    egui::Button::new(button.label.as_str()),
                                )
                                .clicked()
                        {
                            added.push(product.clone());
                        }
                    });
                });
            }
        });

        for product in added {
            self.add_and_flash(&product, 1, now, actions);
        }
    }

    fn add_and_flash(
        &mut self,
        product: &Product,
        quantity: i64,
        now: Instant,
        actions: &mut Vec<UiAction>,
    ) {
        if let Some(button) = self.add_buttons.get_mut(&product.id) {
            button.show_loading(Some("Adicionando..."), now);
        }
        self.add_to_cart(product, quantity);
        self.flashes.push(
            ToastLevel::Success,
            format!("{} adicionado ao carrinho!", product.name),
            now,
        );
        actions.push(UiAction::SaveCart);
    }

    fn show_product(
        &mut self,
        ui: &mut egui::Ui,
        id: u32,
        textures: &HashMap<String, egui::TextureHandle>,
        now: Instant,
        actions: &mut Vec<UiAction>,
    ) {
        let Some(product) = self.products.iter().find(|p| p.id == id).cloned() else {
            ui.label("Produto não encontrado");
            return;
        };

        if let Some(src) = self.lazy.reveal(&id.to_string())
            && !src.contains("://")
        {
            actions.push(UiAction::LoadImage {
                key: image_key(src),
                source: ImageSource::Embedded(src.to_owned()),
            });
        }

        if ui.button("← Voltar").clicked() {
            actions.push(UiAction::Navigate("/produtos".to_owned()));
        }
        ui.add_space(6.0);

        ui.horizontal_top(|ui| {
            let key = product.image.as_deref().map(image_key);
            let size = egui::vec2(PREVIEW_MAX_WIDTH * 1.5, PREVIEW_MAX_WIDTH * 1.125);
            if thumbnail(ui, textures, key.as_deref(), size).clicked()
                && let Some(key) = key
            {
                actions.push(UiAction::OpenLightbox {
                    key,
                    caption: product.name.clone(),
                });
            }

            ui.vertical(|ui| {
                ui.heading(&product.name);
                ui.label(&product.description);
                ui.add_space(6.0);
                ui.label(
                    egui::RichText::new(product.price_display())
                        .size(20.0)
                        .color(colors::BRAND)
                        .strong(),
                );
                if product.status != "ativo" {
                    ui.label(
                        egui::RichText::new("Indisponível no momento").color(colors::FIELD_ERROR),
                    );
                    return;
                }

                ui.horizontal(|ui| {
                    ui.label("Quantidade");
                    if ui
                        .add(
                            egui::DragValue::new(&mut self.detail_quantity)
                                .range(CART_QUANTITY_MIN..=CART_QUANTITY_MAX),
                        )
                        .changed()
                    {
                        self.detail_quantity = clamp_cart_quantity(self.detail_quantity);
                    }
                });

                let clicked = self.add_buttons.get(&product.id).is_some_and(|button| {
                    ui.add_enabled(!button.disabled, egui::Button::new(button.label.as_str()))
                        .clicked()
                });
                if clicked {
                    let quantity = self.detail_quantity;
                    self.add_and_flash(&product, quantity, now, actions);
                    self.detail_quantity = CART_QUANTITY_MIN;
                }
            });
        });
    }

    fn show_cart(&mut self, ui: &mut egui::Ui, now: Instant, actions: &mut Vec<UiAction>) {
        ui.heading("Carrinho");
        ui.add_space(8.0);

        if self.cart.is_empty() {
            ui.label("Seu carrinho está vazio.");
            if ui.button("Ver produtos").clicked() {
                actions.push(UiAction::Navigate("/produtos".to_owned()));
            }
            return;
        }

        let mut changed = None;
        egui::Grid::new("cart_lines")
            .num_columns(5)
            .spacing([16.0, 8.0])
            .striped(true)
            .show(ui, |ui| {
                for line in &self.cart {
                    ui.label(&line.name);
                    ui.label(format!("R$ {:.2}", line.price));

                    ui.horizontal(|ui| {
                        if ui.small_button("−").clicked() {
                            changed = Some((line.product_id, line.quantity - 1));
                        }
                        let pulsing = self.pulse.is_some_and(|(id, _)| id == line.product_id);
                        let text = egui::RichText::new(line.quantity.to_string()).strong();
                        ui.label(if pulsing { text.color(colors::BRAND) } else { text });
                        if ui.small_button("+").clicked() {
                            changed = Some((line.product_id, line.quantity + 1));
                        }
                    });

                    ui.label(format!("R$ {:.2}", line.subtotal()));

                    let remove = ui.small_button("🗑").on_hover_text("Remover");
                    if remove.clicked() {
                        actions.push(UiAction::Confirm {
                            intent: ConfirmIntent::Delete,
                            message: Some(format!("Remover \"{}\" do carrinho?", line.name)),
                            action: PendingAction::RemoveCartLine(line.product_id),
                            focus: remove.id,
                        });
                    }
                    ui.end_row();
                }
            });

        if let Some((id, requested)) = changed
            && let Some(line) = self.cart.iter_mut().find(|l| l.product_id == id)
        {
            let quantity = clamp_cart_quantity(requested);
            if quantity != line.quantity {
                line.quantity = quantity;
                self.pulse = Some((id, now));
                actions.push(UiAction::SaveCart);
            }
        }

        ui.add_space(10.0);
        let total: f64 = self.cart.iter().map(CartLine::subtotal).sum();
        ui.label(
            egui::RichText::new(format!("Total: R$ {total:.2}"))
                .size(18.0)
                .strong(),
        );

        ui.horizontal(|ui| {
            let clear = ui.button("Esvaziar carrinho");
            if clear.clicked() {
                actions.push(UiAction::Confirm {
                    intent: ConfirmIntent::Delete,
                    message: Some("Deseja esvaziar o carrinho?".to_owned()),
                    action: PendingAction::ClearCart,
                    focus: clear.id,
                });
            }
            let checkout = ui.add(
                egui::Button::new(
                    egui::RichText::new("Finalizar pedido").color(egui::Color32::WHITE),
                )
                .fill(colors::BRAND),
            );
            if checkout.clicked() {
                actions.push(UiAction::Alert {
                    message: "Pedido recebido! Entraremos em contato para combinar a entrega."
                        .to_owned(),
                    focus: Some(checkout.id),
                });
            }
        });
    }

    fn show_contact(&mut self, ui: &mut egui::Ui, now: Instant, actions: &mut Vec<UiAction>) {
        ui.heading("Contato");
        ui.add_space(8.0);

        let contact = &mut self.contact;
        ui.label("Nome");
        ui.text_edit_singleline(&mut contact.name);

        ui.label("Telefone");
        if ui.text_edit_singleline(&mut contact.phone).changed() {
            contact.phone = format_phone_number(&contact.phone);
        }

        ui.label("Email");
        let email = ui.text_edit_singleline(&mut contact.email);
        if email.lost_focus() {
            contact.email_error = validate_email_on_blur(&contact.email).err();
        }
        if let Some(error) = contact.email_error {
            ui.label(egui::RichText::new(error).small().color(colors::FIELD_ERROR));
        }

        ui.label("Mensagem");
        ui.add(
            egui::TextEdit::multiline(&mut contact.message)
                .desired_rows(4)
                .desired_width(f32::INFINITY),
        );
        ui.add_space(8.0);

        let send = ui.button("Enviar mensagem");
        if send.clicked() {
            contact.email_error = validate_email_on_blur(&contact.email).err();
            if contact.email_error.is_some() || contact.name.trim().is_empty() {
                actions.push(UiAction::Notify(
                    ToastLevel::Warning,
                    "Preencha nome e um email válido".to_owned(),
                ));
                return;
            }
            log::info!("Contact message from {}", contact.email);
            *contact = ContactForm::default();
            self.flashes
                .push(ToastLevel::Success, "Mensagem enviada com sucesso!", now);
            actions.push(UiAction::Alert {
                message: "Obrigado pelo contato! Responderemos em breve.".to_owned(),
                focus: Some(send.id),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(id: u32, price: f64) -> Product {
        Product {
            id,
            name: format!("Doce {id}"),
            description: String::new(),
            price,
            status: "ativo".to_owned(),
            created: "2024-01-01".to_owned(),
            image: None,
        }
    }

    #[test]
    fn cart_quantities_stay_in_bounds() {
        let storage = JsonStorage::new(MemoryBackend::default());
        let mut page = StorefrontPage::new(&Catalog::default(), &storage);
        let bolo = product(1, 10.0);

        page.add_to_cart(&bolo, 30);
        page.add_to_cart(&bolo, 30);
        assert_eq!(page.cart().len(), 1);
        assert_eq!(page.cart()[0].quantity, CART_QUANTITY_MAX);

        page.add_to_cart(&product(2, 2.5), 0);
        assert_eq!(page.cart()[1].quantity, CART_QUANTITY_MIN);
    }

    #[test]
    fn cart_round_trips_through_storage() {
        let mut storage = JsonStorage::new(MemoryBackend::default());
        let mut page = StorefrontPage::new(&Catalog::default(), &storage);
        page.add_to_cart(&product(3, 4.0), 2);
        assert!(storage.set(CART_STORAGE_KEY, page.cart()));

        let restored = StorefrontPage::new(&Catalog::default(), &storage);
        assert_eq!(restored.cart(), page.cart());
        assert_eq!(restored.cart()[0].subtotal(), 8.0);
    }

    #[test]
    fn edited_product_replaces_existing() {
        let storage = JsonStorage::new(MemoryBackend::default());
        let mut page = StorefrontPage::new(&Catalog::default(), &storage);
        page.add_product(&product(1, 10.0));
        page.add_product(&Product {
            price: 12.0,
            ..product(1, 10.0)
        });
        assert_eq!(page.products.len(), 1);
        assert_eq!(page.products[0].price, 12.0);

        page.remove_products(&[1]);
        assert!(page.products.is_empty());
    }
}
