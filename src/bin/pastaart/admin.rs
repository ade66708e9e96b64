//! Admin panel: dashboard, product table, product form and photo gallery.

use crate::colors;
use crate::constants::{
    DESCRIPTION_MAX_CHARS, PREVIEW_MAX_WIDTH, SIDEBAR_WIDTH, STATUS_FILTER_STORAGE_KEY,
    THUMBNAIL_SIZE,
};
use crate::ui::{PendingAction, UiAction, request_catalog_image, thumbnail};
use crate::{PastaArtApp, image_key};
use eframe::egui;
use egui_extras::{Column, TableBuilder};
use pastaart_ui::debounce::{Debouncer, PREVIEW_DEBOUNCE};
use pastaart_ui::masks::format_price;
use pastaart_ui::modal::ConfirmIntent;
use pastaart_ui::nav::{MobileMenu, NavLink, active_link};
use pastaart_ui::preview::{PreviewImage, ProductPreview};
use pastaart_ui::stats::NumberAnimation;
use pastaart_ui::storage::{JsonStorage, MemoryBackend};
use pastaart_ui::table::{ProductTable, SortColumn, SortDirection};
use pastaart_ui::toast::ToastLevel;
use pastaart_ui::upload::{LoadedPreview, PreviewLoader, UploadCandidate, UploadField};
use pastaart_ui::validation::{Field, FieldKind, FormState, PRICE_FIELD};
use pastaart_ui::{Catalog, Product, StatCard};
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tokio::runtime::Handle;

const STATUSES: [&str; 3] = ["ativo", "inativo", "esgotado"];

/// Repaint interval while stat cards count up.
const STATS_FRAME: Duration = Duration::from_millis(16);

fn admin_links() -> Vec<NavLink> {
    vec![
        NavLink::new("Dashboard", "/admin"),
        NavLink::new("Produtos", "/admin/produtos"),
        NavLink::new("Novo produto", "/admin/produtos/novo"),
        NavLink::new("Galeria", "/admin/galeria"),
    ]
}

fn product_form() -> FormState {
    let mut form = FormState::new(vec![
        Field::new("nome", FieldKind::Text).required(),
        Field::new("descricao", FieldKind::TextArea).max_length(DESCRIPTION_MAX_CHARS),
        Field::new(PRICE_FIELD, FieldKind::Number).required(),
        Field::new("status", FieldKind::Select).required(),
    ]);
    form.set_value("status", STATUSES[0]);
    form
}

/// Route of the edit form for `id`.
fn edit_path(id: u32) -> String {
    format!("/admin/produtos/{id}/editar")
}

enum TableEvent {
    SelectAll(bool),
    Select(u32, bool),
    Sort(&'static str),
    Filter(String),
    Deselect,
    Edit(u32),
}

pub struct AdminPage {
    links: Vec<NavLink>,
    pub menu: MobileMenu,
    products: Vec<Product>,
    table: ProductTable,
    stats: Vec<(StatCard, NumberAnimation)>,
    form: FormState,
    /// Product being edited; `None` while creating
    editing: Option<u32>,
    pub upload: UploadField,
    pub loader: PreviewLoader,
    preview: ProductPreview,
    preview_debounce: Debouncer,
    /// Photos found in the uploads folder, by texture key
    pub gallery: Vec<(String, PathBuf)>,
}

impl AdminPage {
    pub fn new(
        catalog: &Catalog,
        runtime: Handle,
        storage: &JsonStorage<MemoryBackend>,
        now: Instant,
    ) -> Self {
        let mut table = ProductTable::from_products(&catalog.products);
        let filter: String = storage.get(STATUS_FILTER_STORAGE_KEY, String::new());
        if !filter.is_empty() {
            table.filter_by_status(&filter);
        }

        let stats = catalog
            .stats
            .iter()
            .map(|card| (card.clone(), NumberAnimation::new(0, card.value, now)))
            .collect();

        Self {
            links: admin_links(),
            menu: MobileMenu::default(),
            products: catalog.products.clone(),
            table,
            stats,
            form: product_form(),
            editing: None,
            upload: UploadField::default(),
            loader: PreviewLoader::new(runtime),
            preview: ProductPreview::default(),
            preview_debounce: Debouncer::new(PREVIEW_DEBOUNCE),
            gallery: Vec::new(),
        }
    }

    /// Runs the debounced preview refresh; returns how long until the next one is due.
    pub fn tick(&mut self, now: Instant) -> Option<Duration> {
        if self.preview_debounce.poll(now) {
            self.refresh_preview();
        }
        let counting = self
            .stats
            .iter()
            .any(|(_, animation)| !animation.is_finished(now));

        [
            self.preview_debounce.remaining(now),
            counting.then_some(STATS_FRAME),
        ]
        .into_iter()
        .flatten()
        .min()
    }

    pub fn schedule_preview(&mut self, now: Instant) {
        self.preview_debounce.trigger(now);
    }

    fn refresh_preview(&mut self) {
        let uploaded = self.upload.preview().map(LoadedPreview::texture_key);
        let current = self
            .editing
            .and_then(|id| self.products.iter().find(|p| p.id == id))
            .and_then(|p| p.image.as_deref())
            .map(image_key);

        self.preview = ProductPreview::from_form(
            self.form.value("nome"),
            self.form.value("descricao"),
            self.form.value(PRICE_FIELD),
            uploaded.as_deref(),
            current.as_deref(),
        );
    }

    fn rebuild_table(&mut self) {
        let filter = self.table.status_filter.clone();
        self.table = ProductTable::from_products(&self.products);
        if !filter.is_empty() {
            self.table.filter_by_status(&filter);
        }
    }

    /// Removes products from the table; returns how many were removed.
    pub fn delete_products(&mut self, ids: &[u32]) -> usize {
        let before = self.products.len();
        self.products.retain(|p| !ids.contains(&p.id));
        self.table.remove(ids);
        before - self.products.len()
    }

    /// Flips a product between active and inactive; returns the new status.
    pub fn toggle_status(&mut self, id: u32) -> Option<String> {
        let product = self.products.iter_mut().find(|p| p.id == id)?;
        product.status = if product.status == "ativo" {
            "inativo".to_owned()
        } else {
            "ativo".to_owned()
        };
        self.table.set_status(id, &product.status);
        Some(product.status.clone())
    }

    fn start_edit(&mut self, id: u32) -> bool {
        let Some(product) = self.products.iter().find(|p| p.id == id) else {
            return false;
        };
        let mut form = product_form();
        form.set_value("nome", product.name.as_str());
        form.set_value("descricao", product.description.as_str());
        form.set_value(PRICE_FIELD, format!("{:.2}", product.price));
        form.set_value("status", product.status.as_str());
        self.form = form;
        self.editing = Some(id);
        self.loader.cancel();
        self.upload.remove();
        self.refresh_preview();
        self.preview_debounce.cancel();
        log::debug!("Editing product #{id}");
        true
    }

    fn reset_form(&mut self) {
        self.form = product_form();
        self.editing = None;
        self.loader.cancel();
        self.upload.remove();
        self.preview_debounce.cancel();
        self.refresh_preview();
    }

    /// Stores the validated form as a product.
    fn save_product(&mut self) -> Product {
        let uploaded = self.upload.preview().map(LoadedPreview::texture_key);
        let price = self.form.value(PRICE_FIELD).trim().parse().unwrap_or(0.0);

        let editing = self
            .editing
            .and_then(|id| self.products.iter_mut().find(|p| p.id == id));
        let product = match editing {
            Some(existing) => {
                existing.name = self.form.value("nome").trim().to_owned();
                existing.description = self.form.value("descricao").trim().to_owned();
                existing.price = price;
                existing.status = self.form.value("status").to_owned();
                if uploaded.is_some() {
                    existing.image = uploaded;
                }
                existing.clone()
            }
            None => {
                let id = self.products.iter().map(|p| p.id).max().unwrap_or(0) + 1;
                let product = Product {
                    id,
                    name: self.form.value("nome").trim().to_owned(),
                    description: self.form.value("descricao").trim().to_owned(),
                    price,
                    status: self.form.value("status").to_owned(),
                    created: chrono::Local::now().format("%Y-%m-%d").to_string(),
                    image: uploaded,
                };
                self.products.push(product.clone());
                product
            }
        };

        self.rebuild_table();
        product
    }

    pub fn show(
        &mut self,
        ctx: &egui::Context,
        path: &str,
        textures: &HashMap<String, egui::TextureHandle>,
        now: Instant,
        actions: &mut Vec<UiAction>,
    ) {
        let narrow = ctx.screen_rect().width() < 720.0;
        if !narrow || self.menu.open {
            self.show_sidebar(ctx, path, actions);
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| match path {
                "/admin" => self.show_dashboard(ui, now),
                "/admin/produtos" => self.show_products(ui, textures, now, actions),
                "/admin/galeria" => self.show_gallery(ui, textures, actions),
                "/admin/produtos/novo" => self.show_form(ui, ctx, textures, now, actions),
                _ if path.ends_with("/editar") => self.show_form(ui, ctx, textures, now, actions),
                _ => {
                    ui.label(format!("Página não encontrada: {path}"));
                }
            });
        });
    }

    fn show_sidebar(&mut self, ctx: &egui::Context, path: &str, actions: &mut Vec<UiAction>) {
        let active = active_link(&self.links, path);
        let mut clicked = None;
        egui::SidePanel::left("admin_nav")
            .exact_width(SIDEBAR_WIDTH)
            .resizable(false)
            .show(ctx, |ui| {
                ui.add_space(4.0);
                ui.strong("Painel");
                ui.separator();
                for (idx, link) in self.links.iter().enumerate() {
                    if ui
                        .selectable_label(active == Some(idx), link.label.as_str())
                        .clicked()
                    {
                        clicked = Some(link.href.clone());
                    }
                }
            });

        if let Some(href) = clicked {
            if href == "/admin/produtos/novo" {
                self.reset_form();
            }
            actions.push(UiAction::Navigate(href));
        }
    }

    fn show_dashboard(&mut self, ui: &mut egui::Ui, now: Instant) {
        ui.heading("Dashboard");
        ui.add_space(8.0);
        ui.horizontal_wrapped(|ui| {
            for (card, animation) in &self.stats {
                egui::Frame::group(ui.style()).show(ui, |ui| {
                    ui.set_min_width(160.0);
                    ui.vertical(|ui| {
                        ui.label(egui::RichText::new(&card.label).color(colors::COUNTER_TEXT));
                        ui.label(
                            egui::RichText::new(animation.value_at(now).to_string())
                                .size(28.0)
                                .strong()
                                .color(colors::BRAND_DARK),
                        );
                    });
                });
            }
        });
        ui.add_space(12.0);
        ui.label(self.table.count_label());
    }

    fn sort_header(
        &self,
        ui: &mut egui::Ui,
        label: &str,
        key: &'static str,
        events: &mut Vec<TableEvent>,
    ) {
        let arrow = match self.table.direction(SortColumn::from_key(key)) {
            Some(SortDirection::Asc) => " ⏶",
            Some(SortDirection::Desc) => " ⏷",
            None => "",
        };
        if ui
            .button(egui::RichText::new(format!("{label}{arrow}")).strong())
            .clicked()
        {
            events.push(TableEvent::Sort(key));
        }
    }

    fn show_products(
        &mut self,
        ui: &mut egui::Ui,
        textures: &HashMap<String, egui::TextureHandle>,
        now: Instant,
        actions: &mut Vec<UiAction>,
    ) {
        let mut events = Vec::new();

        ui.horizontal(|ui| {
            ui.heading("Produtos");
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.button("➕ Novo produto").clicked() {
                    self.reset_form();
                    actions.push(UiAction::Navigate("/admin/produtos/novo".to_owned()));
                }
            });
        });

        ui.horizontal(|ui| {
            let current = self.table.status_filter.clone();
            let shown = if current.is_empty() { "Todos" } else { current.as_str() };
            egui::ComboBox::from_label("Status")
                .selected_text(shown)
                .show_ui(ui, |ui| {
                    if ui.selectable_label(current.is_empty(), "Todos").clicked() {
                        events.push(TableEvent::Filter(String::new()));
                    }
                    for status in self.table.statuses() {
                        if ui.selectable_label(current == status, status.as_str()).clicked() {
                            events.push(TableEvent::Filter(status));
                        }
                    }
                });
            ui.separator();
            ui.label(self.table.count_label());
        });

        if self.table.bulk_actions_visible() {
            egui::Frame::group(ui.style())
                .fill(colors::DROP_ZONE)
                .show(ui, |ui| {
                    ui.horizontal(|ui| {
                        ui.label(format!("{} selecionado(s)", self.table.selected_count()));
                        let delete = ui.button("🗑 Excluir selecionados");
                        if delete.clicked() {
                            let ids = self.table.selected_ids();
                            actions.push(UiAction::Confirm {
                                intent: ConfirmIntent::Delete,
                                message: Some(format!(
                                    "Tem certeza que deseja excluir {} produto(s)?",
                                    ids.len()
                                )),
                                action: PendingAction::DeleteProducts(ids),
                                focus: delete.id,
                            });
                        }
                        if ui.button("Desmarcar").clicked() {
                            events.push(TableEvent::Deselect);
                        }
                    });
                });
        }

        ui.add_space(6.0);

        let rows: Vec<_> = self.table.visible_rows().cloned().collect();
        let images: HashMap<u32, String> = self
            .products
            .iter()
            .filter_map(|p| p.image.as_deref().map(|path| (p.id, image_key(path))))
            .collect();
        let all_selected = self.table.all_selected();

        TableBuilder::new(ui)
            .vscroll(false)
            .striped(true)
            .resizable(false)
            .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
            .column(Column::exact(28.0))
            .column(Column::exact(THUMBNAIL_SIZE + 8.0))
            .column(Column::remainder().at_least(140.0))
            .column(Column::auto().at_least(90.0))
            .column(Column::auto().at_least(90.0))
            .column(Column::auto().at_least(80.0))
            .column(Column::auto())
            .header(28.0, |mut header| {
                header.col(|ui| {
                    let mut all = all_selected;
                    if ui.checkbox(&mut all, "").changed() {
                        events.push(TableEvent::SelectAll(all));
                    }
                });
                header.col(|_| {});
                header.col(|ui| self.sort_header(ui, "Produto", "name", &mut events));
                header.col(|ui| self.sort_header(ui, "Preço", "price", &mut events));
                header.col(|ui| self.sort_header(ui, "Data", "date", &mut events));
                header.col(|ui| {
                    ui.strong("Status");
                });
                header.col(|ui| {
                    ui.strong("Ações");
                });
            })
            .body(|body| {
                body.rows(THUMBNAIL_SIZE + 8.0, rows.len(), |mut table_row| {
                    let row = &rows[table_row.index()];
                    table_row.col(|ui| {
                        let mut selected = row.selected;
                        if ui.checkbox(&mut selected, "").changed() {
                            events.push(TableEvent::Select(row.id, selected));
                        }
                    });
                    table_row.col(|ui| {
                        let key = images.get(&row.id).map(String::as_str);
                        request_catalog_image(textures, key, actions);
                        let response =
                            thumbnail(ui, textures, key, egui::Vec2::splat(THUMBNAIL_SIZE));
                        if response.clicked()
                            && let Some(key) = key
                        {
                            actions.push(UiAction::OpenLightbox {
                                key: key.to_owned(),
                                caption: row.name.clone(),
                            });
                        }
                    });
                    table_row.col(|ui| {
                        ui.label(&row.name);
                    });
                    table_row.col(|ui| {
                        ui.label(&row.price_display);
                    });
                    table_row.col(|ui| {
                        ui.label(&row.date);
                    });
                    table_row.col(|ui| {
                        ui.label(&row.status);
                    });
                    table_row.col(|ui| {
                        if ui.small_button("✏").on_hover_text("Editar").clicked() {
                            events.push(TableEvent::Edit(row.id));
                        }
                        let status = ui.small_button("🔁").on_hover_text("Alterar status");
                        if status.clicked() {
                            actions.push(UiAction::Confirm {
                                intent: ConfirmIntent::Status,
                                message: None,
                                action: PendingAction::ToggleStatus(row.id),
                                focus: status.id,
                            });
                        }
                        let delete = ui.small_button("🗑").on_hover_text("Excluir");
                        if delete.clicked() {
                            actions.push(UiAction::Confirm {
                                intent: ConfirmIntent::Delete,
                                message: None,
                                action: PendingAction::DeleteProducts(vec![row.id]),
                                focus: delete.id,
                            });
                        }
                    });
                });
            });

        for event in events {
            match event {
                TableEvent::SelectAll(selected) => self.table.set_all_selected(selected),
                TableEvent::Select(id, selected) => self.table.set_selected(id, selected),
                TableEvent::Deselect => self.table.set_all_selected(false),
                TableEvent::Sort(key) => {
                    let direction = self.table.toggle_sort(key);
                    log::debug!("Sorted products by {key} {}", direction.as_str());
                }
                TableEvent::Filter(status) => {
                    self.table.filter_by_status(&status);
                    actions.push(UiAction::SaveStatusFilter(status));
                }
                TableEvent::Edit(id) => {
                    if self.start_edit(id) {
                        actions.push(UiAction::Navigate(edit_path(id)));
                    }
                }
            }
        }
    }

    /// Single-line or multi-line input bound to a form field, validated on blur.
    fn form_input(&mut self, ui: &mut egui::Ui, name: &str, label: &str, now: Instant) {
        ui.label(label);
        let Some(field) = self.form.field_mut(name) else {
            return;
        };
        let counter = field.counter;
        let response = match field.kind {
            FieldKind::TextArea => ui.add(
                egui::TextEdit::multiline(&mut field.value)
                    .char_limit(counter.map_or(usize::MAX, |c| c.max))
                    .desired_rows(4)
                    .desired_width(f32::INFINITY),
            ),
            _ => ui.add(egui::TextEdit::singleline(&mut field.value).desired_width(f32::INFINITY)),
        };

        if response.changed() {
            if name == PRICE_FIELD {
                let masked = format_price(&field.value);
                field.value = masked;
            }
            self.schedule_preview(now);
        }
        if response.lost_focus() {
            self.form.validate_field(name);
        }

        if let Some(counter) = counter {
            let value = self.form.value(name);
            let color = if counter.is_warning(value) {
                colors::FIELD_ERROR
            } else {
                colors::COUNTER_TEXT
            };
            ui.label(egui::RichText::new(counter.text(value)).small().color(color));
        }
        if let Some(error) = self.form.error(name) {
            ui.label(egui::RichText::new(error).small().color(colors::FIELD_ERROR));
        }
        ui.add_space(6.0);
    }

    fn show_form(
        &mut self,
        ui: &mut egui::Ui,
        ctx: &egui::Context,
        textures: &HashMap<String, egui::TextureHandle>,
        now: Instant,
        actions: &mut Vec<UiAction>,
    ) {
        self.handle_file_drag(ctx, actions);

        ui.heading(if self.editing.is_some() {
            "Editar produto"
        } else {
            "Novo produto"
        });
        ui.add_space(8.0);

        ui.columns(2, |columns| {
            let ui = &mut columns[0];
            self.form_input(ui, "nome", "Nome", now);
            self.form_input(ui, "descricao", "Descrição", now);
            self.form_input(ui, PRICE_FIELD, "Preço (R$)", now);

            ui.label("Status");
            let current = self.form.value("status").to_owned();
            egui::ComboBox::from_id_salt("status_select")
                .selected_text(&current)
                .show_ui(ui, |ui| {
                    for status in STATUSES {
                        if ui.selectable_label(current == status, status).clicked() {
                            self.form.set_value("status", status);
                            self.form.clear_field_error("status");
                        }
                    }
                });
            ui.add_space(10.0);

            self.show_upload_zone(ui, textures, actions);
            ui.add_space(10.0);

            let submit = ui.add_enabled(
                !self.form.submit_button.disabled,
                egui::Button::new(
                    egui::RichText::new(&self.form.submit_button.label).color(egui::Color32::WHITE),
                )
                .fill(colors::BRAND),
            );
            if submit.clicked() && self.form.submit() {
                let product = self.save_product();
                log::info!("Saved product #{} ({})", product.id, product.name);
                self.reset_form();
                actions.push(UiAction::ProductSaved(product));
                actions.push(UiAction::Navigate("/admin/produtos".to_owned()));
            }

            let ui = &mut columns[1];
            ui.strong("Pré-visualização");
            ui.add_space(4.0);
            self.show_preview_card(ui, textures, actions);
        });
    }

    fn handle_file_drag(&mut self, ctx: &egui::Context, actions: &mut Vec<UiAction>) {
        let (hovering, dropped) = ctx.input(|i| {
            (
                !i.raw.hovered_files.is_empty(),
                i.raw.dropped_files.clone(),
            )
        });

        if hovering && !self.upload.drag_over {
            self.upload.drag_enter();
        } else if !hovering && self.upload.drag_over && dropped.is_empty() {
            self.upload.drag_leave();
        }

        if dropped.is_empty() {
            return;
        }
        let candidates: Vec<UploadCandidate> = dropped
            .into_iter()
            .filter_map(|file| match (file.path, file.bytes) {
                (Some(path), _) => match UploadCandidate::from_path(path) {
                    Ok(candidate) => Some(candidate),
                    Err(err) => {
                        actions.push(UiAction::Notify(ToastLevel::Error, err.to_string()));
                        None
                    }
                },
                (None, Some(bytes)) => Some(UploadCandidate::from_bytes(
                    file.name,
                    Some(file.mime.as_str()).filter(|m| !m.is_empty()),
                    bytes,
                )),
                (None, None) => None,
            })
            .collect();
        actions.push(UiAction::SelectUploads(candidates));
    }

    fn show_upload_zone(
        &mut self,
        ui: &mut egui::Ui,
        textures: &HashMap<String, egui::TextureHandle>,
        actions: &mut Vec<UiAction>,
    ) {
        ui.label("Imagem");
        let fill = if self.upload.drag_over {
            colors::DROP_ZONE
        } else {
            egui::Color32::TRANSPARENT
        };
        let zone = egui::Frame::group(ui.style())
            .fill(fill)
            .show(ui, |ui| {
                ui.set_min_size(egui::vec2(PREVIEW_MAX_WIDTH, 60.0));
                ui.vertical_centered(|ui| {
                    ui.label("📁");
                    ui.label(&self.upload.label);
                    if self.loader.is_loading() {
                        ui.spinner();
                    }
                });
            })
            .response
            .interact(egui::Sense::click())
            .on_hover_cursor(egui::CursorIcon::PointingHand);
        if zone.clicked() {
            actions.push(UiAction::PickImageFile);
        }

        if let Some(preview) = self.upload.preview() {
            let key = preview.texture_key();
            ui.add_space(6.0);
            let size = egui::vec2(PREVIEW_MAX_WIDTH, PREVIEW_MAX_WIDTH * 0.75);
            if thumbnail(ui, textures, Some(key.as_str()), size).clicked() {
                actions.push(UiAction::OpenLightbox {
                    key,
                    caption: preview.file_name.clone(),
                });
            }
            if ui.button("Remover imagem").clicked() {
                actions.push(UiAction::RemoveUpload);
            }
        }
    }

    fn show_preview_card(
        &self,
        ui: &mut egui::Ui,
        textures: &HashMap<String, egui::TextureHandle>,
        actions: &mut Vec<UiAction>,
    ) {
        egui::Frame::group(ui.style()).show(ui, |ui| {
            ui.set_max_width(PREVIEW_MAX_WIDTH);
            let key = match &self.preview.image {
                PreviewImage::Uploaded(key) | PreviewImage::Current(key) => Some(key.as_str()),
                PreviewImage::Placeholder => None,
            };
            let size = egui::vec2(PREVIEW_MAX_WIDTH, PREVIEW_MAX_WIDTH * 0.75);
            request_catalog_image(textures, key, actions);
            if thumbnail(ui, textures, key, size).clicked()
                && let Some(key) = key
            {
                actions.push(UiAction::OpenLightbox {
                    key: key.to_owned(),
                    caption: self.preview.name.clone(),
                });
            }
            ui.add_space(4.0);
            ui.strong(&self.preview.name);
            ui.label(egui::RichText::new(&self.preview.description).color(colors::COUNTER_TEXT));
            ui.label(
                egui::RichText::new(&self.preview.price)
                    .strong()
                    .color(colors::BRAND),
            );
        });
    }

    fn show_gallery(
        &mut self,
        ui: &mut egui::Ui,
        textures: &HashMap<String, egui::TextureHandle>,
        actions: &mut Vec<UiAction>,
    ) {
        ui.heading("Galeria");
        ui.add_space(8.0);

        let catalog: Vec<(String, String)> = self
            .products
            .iter()
            .filter_map(|p| p.image.as_deref().map(|path| (image_key(path), p.name.clone())))
            .collect();

        ui.strong("Produtos");
        ui.horizontal_wrapped(|ui| {
            for (key, caption) in catalog {
                let size = egui::Vec2::splat(THUMBNAIL_SIZE * 2.5);
                request_catalog_image(textures, Some(key.as_str()), actions);
                if thumbnail(ui, textures, Some(key.as_str()), size)
                    .on_hover_text(&caption)
                    .clicked()
                {
                    actions.push(UiAction::OpenLightbox { key, caption });
                }
            }
        });

        ui.add_space(12.0);
        ui.strong("Uploads");
        if self.gallery.is_empty() {
            ui.label("Nenhuma foto na pasta de uploads");
            return;
        }
        let mut chosen = None;
        ui.horizontal_wrapped(|ui| {
            for (key, path) in &self.gallery {
                let caption = path
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_default();
                ui.vertical(|ui| {
                    let size = egui::Vec2::splat(THUMBNAIL_SIZE * 2.5);
                    if thumbnail(ui, textures, Some(key.as_str()), size).clicked() {
                        actions.push(UiAction::OpenLightbox {
                            key: key.clone(),
                            caption: caption.clone(),
                        });
                    }
                    if ui.small_button("Usar no produto").clicked() {
                        chosen = Some(path.clone());
                    }
                });
            }
        });

        if let Some(path) = chosen {
            self.use_gallery_photo(path, actions);
        }
    }

    /// Starts a new product with a gallery photo as its upload.
    fn use_gallery_photo(&mut self, path: PathBuf, actions: &mut Vec<UiAction>) {
        match UploadCandidate::from_path(path) {
            Ok(candidate) => {
                self.reset_form();
                actions.push(UiAction::SelectUploads(vec![candidate]));
                actions.push(UiAction::Navigate("/admin/produtos/novo".to_owned()));
            }
            Err(err) => {
                actions.push(UiAction::Notify(ToastLevel::Error, err.to_string()));
            }
        }
    }
}

impl PastaArtApp {
    /// Validates the first candidate and starts reading it for the preview.
    pub fn select_upload(
        &mut self,
        ctx: &egui::Context,
        candidates: Vec<UploadCandidate>,
        now: Instant,
    ) {
        let candidate = match self.admin.upload.drop_files(candidates) {
            None => return,
            Some(Ok(candidate)) => candidate.clone(),
            Some(Err(err)) => {
                log::warn!("Rejected upload: {err}");
                self.notifier.error(err.to_string(), now);
                return;
            }
        };

        let ctx = ctx.clone();
        self.admin
            .loader
            .load(candidate, move || ctx.request_repaint());
    }

    /// Installs a finished preview read as a texture.
    pub fn poll_preview(&mut self, ctx: &egui::Context, now: Instant) {
        let Some(result) = self.admin.loader.poll() else {
            return;
        };
        match result {
            Ok(preview) => {
                let key = preview.texture_key();
                let bytes = preview.bytes.clone();
                log::debug!("Preview ready for {} ({})", preview.file_name, preview.mime);
                if self.admin.upload.set_preview(preview) {
                    self.request_image(ctx, &key, crate::assets::ImageSource::Bytes(bytes));
                    self.lightbox_binder.bind(&key);
                    self.admin.schedule_preview(now);
                }
            }
            Err(err) => {
                self.admin.upload.remove();
                self.notifier.error(err.to_string(), now);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn product(id: u32) -> Product {
        Product {
            id,
            name: format!("Bolo {id}"),
            description: "Caseiro".to_owned(),
            price: 25.0,
            status: "ativo".to_owned(),
            created: "2024-03-01".to_owned(),
            image: None,
        }
    }

    fn page(products: Vec<Product>) -> AdminPage {
        let storage = JsonStorage::new(MemoryBackend::default());
        let catalog = Catalog {
            products,
            stats: Vec::new(),
        };
        AdminPage::new(&catalog, Handle::current(), &storage, Instant::now())
    }

    fn attach_upload(page: &mut AdminPage, request_id: u64, name: &str) {
        let bytes: Arc<[u8]> = Arc::from(&b"img"[..]);
        page.upload
            .select(UploadCandidate::from_bytes(name, Some("image/png"), bytes.clone()))
            .unwrap();
        assert!(page.upload.set_preview(LoadedPreview {
            request_id,
            file_name: name.to_owned(),
            mime: "image/png".to_owned(),
            data_url: String::new(),
            bytes,
        }));
    }

    #[tokio::test]
    async fn gallery_photo_starts_a_fresh_product() {
        let mut page = page(vec![product(7)]);
        assert!(page.start_edit(7));
        assert_eq!(page.form.value("nome"), "Bolo 7");

        let path =
            std::env::temp_dir().join(format!("pastaart-galeria-{}.png", std::process::id()));
        std::fs::write(&path, b"png").unwrap();
        let mut actions = Vec::new();
        page.use_gallery_photo(path.clone(), &mut actions);
        std::fs::remove_file(&path).ok();

        assert_eq!(page.editing, None);
        assert_eq!(page.form.value("nome"), "");
        assert!(matches!(
            actions.as_slice(),
            [UiAction::SelectUploads(files), UiAction::Navigate(to)]
                if files.len() == 1 && to == "/admin/produtos/novo"
        ));
    }

    #[tokio::test]
    async fn products_with_same_upload_name_keep_their_own_photo() {
        let mut page = page(Vec::new());

        page.form.set_value("nome", "Bolo A");
        page.form.set_value(PRICE_FIELD, "10");
        attach_upload(&mut page, 1, "foto.png");
        let first = page.save_product();
        page.reset_form();

        page.form.set_value("nome", "Bolo B");
        page.form.set_value(PRICE_FIELD, "12");
        attach_upload(&mut page, 2, "foto.png");
        let second = page.save_product();

        assert!(first.image.is_some());
        assert_ne!(first.image, second.image);
        assert_eq!(page.products[0].image, first.image);
    }
}
