//! Watches the uploads folder so product photos saved by the server show up in
//! the admin gallery without a restart.

use eframe::egui;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use pastaart_ui::upload::{ALLOWED_IMAGE_TYPES, mime_for_path};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, TryRecvError};

/// Watches a directory for newly created image files.
pub struct UploadWatcher {
    path_rx: Receiver<PathBuf>,
    /// The watcher must be kept alive for events to fire
    _watcher: RecommendedWatcher,
    /// Images already present when watching started
    initial: Vec<PathBuf>,
}

impl UploadWatcher {
    /// Creates a watcher for `dir`, creating the folder if needed.
    ///
    /// Returns `None` if the folder cannot be created or watching fails.
    pub fn new(ctx: egui::Context, dir: &Path) -> Option<Self> {
        if let Err(err) = fs::create_dir_all(dir) {
            log::warn!("Cannot create uploads folder {}: {err}", dir.display());
            return None;
        }

        let (path_tx, path_rx) = mpsc::channel();
        let initial = Self::existing_images(dir);

        let mut watcher = notify::recommended_watcher(move |res: Result<Event, notify::Error>| {
            let Ok(event) = res else {
                return;
            };
            if !matches!(event.kind, EventKind::Create(_)) {
                return;
            }
            for path in event.paths {
                if is_image(&path) {
                    log::info!("New upload: {}", path.display());
                    let _ = path_tx.send(path);
                    ctx.request_repaint();
                }
            }
        })
        .ok()?;

        watcher.watch(dir, RecursiveMode::NonRecursive).ok()?;

        log::info!("Watching uploads folder: {}", dir.display());

        Some(Self {
            path_rx,
            _watcher: watcher,
            initial,
        })
    }

    /// Default uploads folder under the user's data directory.
    pub fn default_dir() -> Option<PathBuf> {
        Some(dirs::data_dir()?.join("pastaart").join("uploads"))
    }

    /// Images found on startup, oldest first.
    fn existing_images(dir: &Path) -> Vec<PathBuf> {
        let Ok(entries) = fs::read_dir(dir) else {
            return Vec::new();
        };
        let mut images: Vec<_> = entries
            .filter_map(|entry| entry.ok())
            .filter(|entry| is_image(&entry.path()))
            .map(|entry| {
                let modified = entry.metadata().ok().and_then(|m| m.modified().ok());
                (modified, entry.path())
            })
            .collect();
        images.sort();
        images.into_iter().map(|(_, path)| path).collect()
    }

    /// Drains new image paths; the first call also yields the pre-existing ones.
    pub fn poll(&mut self) -> Vec<PathBuf> {
        let mut paths = std::mem::take(&mut self.initial);
        loop {
            match self.path_rx.try_recv() {
                Ok(path) => paths.push(path),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    log::warn!("Upload watcher channel disconnected");
                    break;
                }
            }
        }
        paths
    }
}

fn is_image(path: &Path) -> bool {
    ALLOWED_IMAGE_TYPES.contains(&mime_for_path(path).as_str())
}
