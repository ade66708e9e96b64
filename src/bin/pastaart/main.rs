#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod admin;
mod assets;
mod colors;
mod constants;
mod overlays;
mod storefront;
mod ui;
mod upload_watcher;

use admin::AdminPage;
use assets::{AssetLoadState, ImageSource, load_and_decode_image, load_catalog};
use clap::{Parser, ValueEnum};
use constants::{CATALOG_SCHEME, STORAGE_KEY};
use eframe::egui::{self, ColorImage, TextureHandle, TextureOptions};
use egui_toast::{Toast, ToastKind, ToastOptions, Toasts};
use pastaart_ui::Catalog;
use pastaart_ui::lightbox::{Lightbox, LightboxBinder, LightboxImage};
use pastaart_ui::modal::{DialogHandle, ModalController};
use pastaart_ui::storage::{JsonStorage, MemoryBackend};
use pastaart_ui::toast::{Notifier, TOAST_DURATION, ToastLevel};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::mpsc;
use std::time::{Duration, Instant};
use storefront::StorefrontPage;
use ui::PendingAction;
use upload_watcher::UploadWatcher;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum StartPage {
    /// Admin panel
    Admin,
    /// Storefront
    Loja,
}

impl StartPage {
    fn path(self) -> &'static str {
        match self {
            Self::Admin => "/admin",
            Self::Loja => "/",
        }
    }
}

/// PastaArt Encanto storefront and admin panel.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Page shown on startup
    #[arg(long, value_enum, default_value_t = StartPage::Admin)]
    page: StartPage,

    /// Folder watched for uploaded product photos
    #[arg(long)]
    uploads_dir: Option<PathBuf>,
}

/// Main application state: owns every page and the shared overlay layer.
pub struct PastaArtApp {
    current_path: String,
    runtime: tokio::runtime::Runtime,
    toasts: Toasts,
    notifier: Notifier,
    modal: ModalController,
    /// Confirm dialogs waiting for an answer, with what they guard
    pending: Vec<(DialogHandle, PendingAction)>,
    /// Widgets that asked for a dialog, by focus-restore key
    focus_targets: HashMap<String, egui::Id>,
    /// Created on first use, then reused
    lightbox: Option<Lightbox>,
    lightbox_binder: LightboxBinder,
    asset_cache: HashMap<String, AssetLoadState>,
    texture_cache: HashMap<String, TextureHandle>,
    storage: JsonStorage<MemoryBackend>,
    upload_watcher: Option<UploadWatcher>,
    admin: AdminPage,
    store: StorefrontPage,
}

impl PastaArtApp {
    fn new(cc: &eframe::CreationContext<'_>, args: Args) -> std::io::Result<Self> {
        let toasts = Toasts::new()
            .anchor(egui::Align2::RIGHT_TOP, (-20.0, 20.0))
            .direction(egui::Direction::TopDown);
        let mut notifier = Notifier::default();
        let now = Instant::now();

        let catalog = match load_catalog() {
            Ok(catalog) => catalog,
            Err(err) => {
                notifier.error(err.to_string(), now);
                Catalog::default()
            }
        };

        let backend: MemoryBackend = cc
            .storage
            .and_then(|storage| eframe::get_value(storage, STORAGE_KEY))
            .unwrap_or_default();
        let storage = JsonStorage::new(backend);

        let runtime = tokio::runtime::Runtime::new()?;

        let uploads_dir = args.uploads_dir.or_else(UploadWatcher::default_dir);
        let upload_watcher = uploads_dir
            .as_deref()
            .and_then(|dir| UploadWatcher::new(cc.egui_ctx.clone(), dir));
        if upload_watcher.is_none() {
            log::info!("Upload watcher not available - gallery will only show catalog photos");
        }

        let admin = AdminPage::new(&catalog, runtime.handle().clone(), &storage, now);
        let store = StorefrontPage::new(&catalog, &storage);

        let mut app = Self {
            current_path: args.page.path().to_owned(),
            runtime,
            toasts,
            notifier,
            modal: ModalController::default(),
            pending: Vec::new(),
            focus_targets: HashMap::new(),
            lightbox: None,
            lightbox_binder: LightboxBinder::default(),
            asset_cache: HashMap::new(),
            texture_cache: HashMap::new(),
            storage,
            upload_watcher,
            admin,
            store,
        };

        // Photos are decoded on first draw; only the zoom binding happens up front
        for path in catalog.products.iter().filter_map(|p| p.image.as_deref()) {
            app.lightbox_binder.bind(&image_key(path));
        }

        log::info!("PastaArt Encanto - application initialised");
        Ok(app)
    }

    /// Starts decoding an image in the background unless it is cached already.
    fn request_image(&mut self, ctx: &egui::Context, key: &str, source: ImageSource) {
        if self.asset_cache.contains_key(key) {
            return;
        }

        let (tx, rx) = mpsc::channel();
        let ctx = ctx.clone();
        let cache_key = key.to_owned();

        self.runtime.spawn_blocking(move || {
            let result = load_and_decode_image(&cache_key, source);
            let _ = tx.send(result);
            ctx.request_repaint();
        });

        self.asset_cache
            .insert(key.to_owned(), AssetLoadState::Loading(rx));
    }

    /// Drops a cached image so the key can be reloaded with new content.
    fn forget_image(&mut self, key: &str) {
        self.asset_cache.remove(key);
        self.texture_cache.remove(key);
    }

    /// Polls all loading images and creates textures for ready ones.
    fn poll_all_assets(&mut self, ctx: &egui::Context, now: Instant) {
        let mut updates: Vec<(String, AssetLoadState)> = Vec::new();
        let mut errors: Vec<String> = Vec::new();

        for (key, state) in &mut self.asset_cache {
            if let AssetLoadState::Loading(rx) = state {
                match rx.try_recv() {
                    Ok(Ok(decoded)) => {
                        updates.push((key.clone(), AssetLoadState::Ready(decoded)));
                    }
                    Ok(Err(err)) => {
                        let msg = err.to_string();
                        errors.push(msg.clone());
                        updates.push((key.clone(), AssetLoadState::Error(msg)));
                    }
                    Err(mpsc::TryRecvError::Disconnected) => {
                        let msg = format!("{key}: channel disconnected");
                        errors.push(msg.clone());
                        updates.push((key.clone(), AssetLoadState::Error(msg)));
                    }
                    Err(mpsc::TryRecvError::Empty) => {}
                }
            }
        }

        for (key, new_state) in updates {
            self.asset_cache.insert(key, new_state);
        }

        for err in errors {
            self.notifier.error(err, now);
        }

        let ready_keys: Vec<_> = self
            .asset_cache
            .iter()
            .filter(|(key, state)| {
                matches!(state, AssetLoadState::Ready(_)) && !self.texture_cache.contains_key(*key)
            })
            .map(|(key, _)| key.clone())
            .collect();

        for key in ready_keys {
            if let Some(AssetLoadState::Ready(decoded)) = self.asset_cache.get(&key) {
                let image = ColorImage::from_rgba_unmultiplied(
                    [decoded.width as usize, decoded.height as usize],
                    &decoded.pixels,
                );
                let texture = ctx.load_texture(&key, image, TextureOptions::LINEAR);
                self.texture_cache.insert(key, texture);
            }
        }
    }

    /// Picks up photos that appeared in the uploads folder.
    fn poll_uploads(&mut self, ctx: &egui::Context) {
        let Some(watcher) = &mut self.upload_watcher else {
            return;
        };
        for path in watcher.poll() {
            let key = format!("upload://{}", path.display());
            if self.lightbox_binder.bind(&key) {
                self.request_image(ctx, &key, ImageSource::File(path.clone()));
                self.admin.gallery.push((key, path));
            }
        }
    }

    /// Lazily creates the overlay and opens it on `key`.
    fn open_lightbox(&mut self, key: String, caption: String, now: Instant) {
        if !self.lightbox_binder.is_bound(&key) {
            log::debug!("Ignoring lightbox request for unbound image {key}");
            return;
        }
        self.lightbox
            .get_or_insert_with(Lightbox::default)
            .open(LightboxImage { key, caption }, now);
    }

    /// Resolves finished confirm dialogs and restores focus to their trigger.
    fn poll_dialogs(&mut self, ctx: &egui::Context, now: Instant) {
        let mut resolved = Vec::new();
        self.pending.retain_mut(|(handle, action)| match handle.try_result() {
            Some(result) => {
                resolved.push((result, std::mem::replace(action, PendingAction::None)));
                false
            }
            None => true,
        });

        for (confirmed, action) in resolved {
            if confirmed {
                self.apply_pending(ctx, action, now);
            } else {
                log::debug!("Dialog dismissed: {action:?}");
            }
        }

        if let Some(key) = self.modal.take_focus_restore()
            && let Some(id) = self.focus_targets.remove(&key)
        {
            ctx.memory_mut(|memory| memory.request_focus(id));
        }
    }

    /// Forwards new notices to the toast renderer.
    fn flush_toasts(&mut self) {
        for notice in self.notifier.drain_new() {
            let kind = match notice.level {
                ToastLevel::Success => ToastKind::Success,
                ToastLevel::Error => ToastKind::Error,
                ToastLevel::Warning => ToastKind::Warning,
                ToastLevel::Info => ToastKind::Info,
            };
            self.toasts.add(Toast {
                kind,
                text: notice.message.into(),
                options: ToastOptions::default()
                    .duration_in_seconds(TOAST_DURATION.as_secs_f64())
                    .show_icon(true),
                ..Default::default()
            });
        }
    }

    /// Advances every timer-driven state and returns the nearest deadline.
    fn tick(&mut self, now: Instant) -> Option<Duration> {
        self.modal.tick(now);
        if let Some(lightbox) = &mut self.lightbox {
            lightbox.tick(now);
        }
        self.notifier.tick(now);
        self.store.tick(now);
        let preview_due = self.admin.tick(now);

        [
            self.modal.next_transition(now),
            self.lightbox.as_ref().and_then(|l| l.next_transition(now)),
            preview_due,
            self.store.next_deadline(),
        ]
        .into_iter()
        .flatten()
        .min()
    }
}

/// Texture cache key of a product photo. Embedded catalog paths get their own scheme.
pub fn image_key(path: &str) -> String {
    if path.contains("://") {
        path.to_owned()
    } else {
        format!("{CATALOG_SCHEME}{path}")
    }
}

impl eframe::App for PastaArtApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now = Instant::now();

        self.poll_all_assets(ctx, now);
        self.poll_uploads(ctx);
        self.poll_preview(ctx, now);
        let next_deadline = self.tick(now);
        self.poll_dialogs(ctx, now);

        self.handle_keyboard_input(ctx, now);

        let mut actions = Vec::new();
        self.show_top_bar(ctx, &mut actions);
        if self.current_path.starts_with("/admin") {
            self.admin
                .show(ctx, &self.current_path, &self.texture_cache, now, &mut actions);
        } else {
            self.store
                .show(ctx, &self.current_path, &self.texture_cache, now, &mut actions);
        }
        self.apply_actions(ctx, actions, now);

        self.show_lightbox(ctx, now);
        self.show_dialog(ctx, now);

        self.flush_toasts();
        self.toasts.show(ctx);

        if let Some(delay) = next_deadline {
            ctx.request_repaint_after(delay);
        }
    }

    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        eframe::set_value(storage, STORAGE_KEY, self.storage.backend());
    }
}

fn main() -> eframe::Result {
    env_logger::init();
    let args = Args::parse();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 800.0])
            .with_drag_and_drop(true),
        ..Default::default()
    };

    eframe::run_native(
        "PastaArt Encanto",
        options,
        Box::new(|cc| Ok(Box::new(PastaArtApp::new(cc, args)?))),
    )
}
