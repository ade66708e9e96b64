//! Product image upload: type/size validation, drag-and-drop and async preview loading.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::mpsc;
use thiserror::Error;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

/// MIME types accepted for product photos.
pub const ALLOWED_IMAGE_TYPES: [&str; 5] = [
    "image/jpeg",
    "image/jpg",
    "image/png",
    "image/gif",
    "image/webp",
];

/// Largest accepted upload (16 MiB).
pub const MAX_UPLOAD_BYTES: u64 = 16 * 1024 * 1024;

pub const EMPTY_LABEL: &str = "Clique para selecionar uma imagem";

/// Reasons an upload is refused or its preview cannot be produced.
#[derive(Error, Debug)]
pub enum UploadError {
    #[error("Tipo de arquivo não suportado. Use JPG, PNG, GIF ou WebP.")]
    UnsupportedType { mime: String },
    #[error("Arquivo muito grande. Máximo 16MB.")]
    TooLarge { size: u64 },
    #[error("falha ao ler '{path}': {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("leitura da pré-visualização interrompida")]
    Interrupted,
}

/// Checks a file's declared type and size against the upload rules.
pub fn validate_image(mime: &str, size: u64) -> Result<(), UploadError> {
    if !ALLOWED_IMAGE_TYPES.contains(&mime) {
        return Err(UploadError::UnsupportedType {
            mime: mime.to_owned(),
        });
    }
    if size > MAX_UPLOAD_BYTES {
        return Err(UploadError::TooLarge { size });
    }
    Ok(())
}

/// Guesses the MIME type from a file extension.
pub fn mime_for_path(path: &Path) -> String {
    image::ImageFormat::from_path(path)
        .map(|format| format.to_mime_type().to_owned())
        .unwrap_or_else(|_| "application/octet-stream".to_owned())
}

/// Encodes bytes as a `data:` URL.
pub fn data_url(mime: &str, bytes: &[u8]) -> String {
    format!("data:{mime};base64,{}", STANDARD.encode(bytes))
}

/// Where the file content lives.
#[derive(Debug, Clone)]
pub enum UploadSource {
    /// Picked from disk; read lazily
    Path(PathBuf),
    /// Already in memory (e.g. a drop that carried its bytes)
    Bytes(Arc<[u8]>),
}

/// A file the user picked or dropped, before validation.
#[derive(Debug, Clone)]
pub struct UploadCandidate {
    pub name: String,
    pub mime: String,
    pub size: u64,
    pub source: UploadSource,
}

impl UploadCandidate {
    pub fn from_path(path: impl Into<PathBuf>) -> Result<Self, UploadError> {
        let path = path.into();
        let size = std::fs::metadata(&path)
            .map_err(|source| UploadError::Read {
                path: path.clone(),
                source,
            })?
            .len();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        Ok(Self {
            name,
            mime: mime_for_path(&path),
            size,
            source: UploadSource::Path(path),
        })
    }

    pub fn from_bytes(name: impl Into<String>, mime: Option<&str>, bytes: Arc<[u8]>) -> Self {
        let name = name.into();
        let mime = match mime {
            Some(mime) if !mime.is_empty() => mime.to_owned(),
            _ => mime_for_path(Path::new(&name)),
        };
        Self {
            name,
            mime,
            size: bytes.len() as u64,
            source: UploadSource::Bytes(bytes),
        }
    }
}

/// A decoded-ready preview produced by [`PreviewLoader`].
#[derive(Debug, Clone)]
pub struct LoadedPreview {
    /// Loader request that produced this preview; unique per session
    pub request_id: u64,
    pub file_name: String,
    pub mime: String,
    pub bytes: Arc<[u8]>,
    /// `data:` URL of the file, used as the preview image source
    pub data_url: String,
}

impl LoadedPreview {
    /// Texture cache key. Two uploads sharing a file name get distinct keys.
    pub fn texture_key(&self) -> String {
        format!("preview://{}/{}", self.request_id, self.file_name)
    }
}

/// State of the `imagem` file input and its preview container.
#[derive(Debug)]
pub struct UploadField {
    selected: Option<UploadCandidate>,
    preview: Option<LoadedPreview>,
    pub label: String,
    pub drag_over: bool,
}

impl Default for UploadField {
    fn default() -> Self {
        Self {
            selected: None,
            preview: None,
            label: EMPTY_LABEL.to_owned(),
            drag_over: false,
        }
    }
}

impl UploadField {
    pub fn selected(&self) -> Option<&UploadCandidate> {
        self.selected.as_ref()
    }

    pub fn preview(&self) -> Option<&LoadedPreview> {
        self.preview.as_ref()
    }

    /// Preview image source, empty while nothing has loaded.
    pub fn preview_src(&self) -> &str {
        self.preview.as_ref().map_or("", |p| p.data_url.as_str())
    }

    /// Handles a file selection. A rejected file resets the input.
    pub fn select(&mut self, candidate: UploadCandidate) -> Result<&UploadCandidate, UploadError> {
        if let Err(err) = validate_image(&candidate.mime, candidate.size) {
            log::warn!(
                "Rejected upload '{}' ({}, {} bytes): {err}",
                candidate.name,
                candidate.mime,
                candidate.size
            );
            self.remove();
            return Err(err);
        }

        self.label = format!("Arquivo selecionado: {}", candidate.name);
        Ok(self.selected.insert(candidate))
    }

    pub fn drag_enter(&mut self) {
        self.drag_over = true;
    }

    pub fn drag_leave(&mut self) {
        self.drag_over = false;
    }

    /// Forwards the first dropped file into [`Self::select`]. Returns `None` for an empty drop.
    pub fn drop_files(
        &mut self,
        files: impl IntoIterator<Item = UploadCandidate>,
    ) -> Option<Result<&UploadCandidate, UploadError>> {
        self.drag_over = false;
        let first = files.into_iter().next()?;
        Some(self.select(first))
    }

    /// Installs a loaded preview if it belongs to the current selection.
    pub fn set_preview(&mut self, preview: LoadedPreview) -> bool {
        let current = self
            .selected
            .as_ref()
            .is_some_and(|s| s.name == preview.file_name);
        if current {
            self.preview = Some(preview);
        }
        current
    }

    pub fn remove(&mut self) {
        self.selected = None;
        self.preview = None;
        self.label = EMPTY_LABEL.to_owned();
    }
}

type PreviewResult = (u64, Result<LoadedPreview, UploadError>);

/// Reads selected files into [`LoadedPreview`]s on the tokio runtime.
///
/// Starting a new load aborts the one in flight; results from superseded
/// requests are discarded in [`Self::poll`].
pub struct PreviewLoader {
    runtime: Handle,
    tx: mpsc::Sender<PreviewResult>,
    rx: mpsc::Receiver<PreviewResult>,
    request_id: u64,
    in_flight: Option<JoinHandle<()>>,
}

impl PreviewLoader {
    pub fn new(runtime: Handle) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            runtime,
            tx,
            rx,
            request_id: 0,
            in_flight: None,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Starts reading `candidate`, cancelling any earlier read.
    pub fn load(&mut self, candidate: UploadCandidate, repaint: impl FnOnce() + Send + 'static) {
        self.cancel();
        self.request_id += 1;

        let id = self.request_id;
        let tx = self.tx.clone();
        self.in_flight = Some(self.runtime.spawn(async move {
            let result = read_preview(id, candidate).await;
            let _ = tx.send((id, result));
            repaint();
        }));
    }

    pub fn cancel(&mut self) {
        if let Some(handle) = self.in_flight.take() {
            handle.abort();
        }
    }

    /// Returns the latest finished read for the current request, if any.
    pub fn poll(&mut self) -> Option<Result<LoadedPreview, UploadError>> {
        let mut latest = None;
        loop {
            match self.rx.try_recv() {
                Ok((id, result)) if id == self.request_id => latest = Some(result),
                Ok((id, _)) => log::debug!("Dropping stale preview read #{id}"),
                Err(mpsc::TryRecvError::Empty) => break,
                Err(mpsc::TryRecvError::Disconnected) => {
                    latest = Some(Err(UploadError::Interrupted));
                    break;
                }
            }
        }
        if latest.is_some() {
            self.in_flight = None;
        }
        latest
    }
}

async fn read_preview(
    request_id: u64,
    candidate: UploadCandidate,
) -> Result<LoadedPreview, UploadError> {
    let bytes: Arc<[u8]> = match candidate.source {
        UploadSource::Bytes(bytes) => bytes,
        UploadSource::Path(path) => tokio::fs::read(&path)
            .await
            .map_err(|source| UploadError::Read { path, source })?
            .into(),
    };

    Ok(LoadedPreview {
        request_id,
        data_url: data_url(&candidate.mime, &bytes),
        file_name: candidate.name,
        mime: candidate.mime,
        bytes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn candidate(name: &str, mime: &str, size: usize) -> UploadCandidate {
        UploadCandidate::from_bytes(name, Some(mime), vec![0u8; size].into())
    }

    #[test]
    fn text_file_is_rejected_and_input_cleared() {
        let mut field = UploadField::default();
        field.select(candidate("a.png", "image/png", 10)).unwrap();

        let err = field
            .select(candidate("notes.txt", "text/plain", 10))
            .unwrap_err();
        assert!(matches!(err, UploadError::UnsupportedType { .. }));
        assert!(field.selected().is_none());
        assert_eq!(field.label, EMPTY_LABEL);
    }

    #[test]
    fn size_limit_is_sixteen_mebibytes() {
        assert!(matches!(
            validate_image("image/png", 17 * 1024 * 1024),
            Err(UploadError::TooLarge { .. })
        ));
        assert!(validate_image("image/png", MAX_UPLOAD_BYTES).is_ok());
        assert!(validate_image("image/webp", 1024 * 1024).is_ok());
    }

    #[test]
    fn accepted_file_updates_label() {
        let mut field = UploadField::default();
        field.select(candidate("bolo.jpg", "image/jpeg", 64)).unwrap();
        assert_eq!(field.label, "Arquivo selecionado: bolo.jpg");
    }

    #[test]
    fn drop_forwards_first_file() {
        let mut field = UploadField::default();
        field.drag_enter();
        assert!(field.drag_over);

        let result = field.drop_files(vec![
            candidate("first.gif", "image/gif", 8),
            candidate("second.png", "image/png", 8),
        ]);
        assert_eq!(result.unwrap().unwrap().name, "first.gif");
        assert!(!field.drag_over);
        assert!(field.drop_files(Vec::new()).is_none());
    }

    #[test]
    fn mime_is_guessed_from_extension() {
        assert_eq!(mime_for_path(Path::new("x.png")), "image/png");
        assert_eq!(mime_for_path(Path::new("x.jpeg")), "image/jpeg");
        assert_eq!(
            mime_for_path(Path::new("x.txt")),
            "application/octet-stream"
        );
    }

    #[test]
    fn data_url_encodes_base64() {
        assert_eq!(data_url("image/png", b"hi"), "data:image/png;base64,aGk=");
    }

    #[test]
    fn stale_preview_is_not_installed() {
        let mut field = UploadField::default();
        field.select(candidate("new.png", "image/png", 4)).unwrap();
        let stale = LoadedPreview {
            request_id: 1,
            file_name: "old.png".to_owned(),
            mime: "image/png".to_owned(),
            bytes: Arc::from(&b"x"[..]),
            data_url: data_url("image/png", b"x"),
        };
        assert!(!field.set_preview(stale));
        assert_eq!(field.preview_src(), "");
    }

    async fn wait_for(loader: &mut PreviewLoader) -> Result<LoadedPreview, UploadError> {
        for _ in 0..200 {
            if let Some(result) = loader.poll() {
                return result;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("preview never loaded");
    }

    #[tokio::test]
    async fn one_mebibyte_png_gets_a_preview_src() {
        let mut field = UploadField::default();
        let mut loader = PreviewLoader::new(Handle::current());

        let selected = field
            .select(candidate("foto.png", "image/png", 1024 * 1024))
            .unwrap()
            .clone();
        loader.load(selected, || {});

        let preview = wait_for(&mut loader).await.unwrap();
        assert!(field.set_preview(preview));
        assert!(field.preview_src().starts_with("data:image/png;base64,"));
    }

    #[tokio::test]
    async fn newer_load_supersedes_older() {
        let mut loader = PreviewLoader::new(Handle::current());
        loader.load(candidate("a.png", "image/png", 4), || {});
        loader.load(candidate("b.png", "image/png", 4), || {});

        let preview = wait_for(&mut loader).await.unwrap();
        assert_eq!(preview.file_name, "b.png");
    }

    #[tokio::test]
    async fn same_file_name_gets_distinct_texture_keys() {
        let mut loader = PreviewLoader::new(Handle::current());

        loader.load(candidate("IMG_0001.jpg", "image/jpeg", 4), || {});
        let first = wait_for(&mut loader).await.unwrap();
        loader.load(candidate("IMG_0001.jpg", "image/jpeg", 8), || {});
        let second = wait_for(&mut loader).await.unwrap();

        assert_eq!(first.file_name, second.file_name);
        assert_ne!(first.texture_key(), second.texture_key());
        assert!(second.texture_key().starts_with("preview://"));
        assert!(second.texture_key().ends_with("/IMG_0001.jpg"));
    }

    #[tokio::test]
    async fn missing_file_reports_read_error() {
        let mut loader = PreviewLoader::new(Handle::current());
        let missing = UploadCandidate {
            name: "gone.png".to_owned(),
            mime: "image/png".to_owned(),
            size: 1,
            source: UploadSource::Path(PathBuf::from("/definitely/not/here.png")),
        };
        loader.load(missing, || {});
        assert!(matches!(
            wait_for(&mut loader).await,
            Err(UploadError::Read { .. })
        ));
    }
}
