//! Embedded catalog and image decoding.

use pastaart_ui::Catalog;
use rust_embed::RustEmbed;
use std::sync::mpsc;
use thiserror::Error;

/// Embeds the catalog fixture and product photos.
/// Debug builds read from the filesystem; release builds embed compressed copies.
#[derive(RustEmbed)]
#[folder = "assets/"]
pub struct Assets;

/// Errors that can occur when loading the catalog.
#[derive(Error, Debug)]
pub enum CatalogLoadError {
    #[error("catalog.ron not found in embedded assets")]
    CatalogNotFound,
    #[error("invalid UTF-8 in catalog.ron: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),
    #[error("failed to parse catalog.ron: {0}")]
    ParseError(#[from] ron::de::SpannedError),
}

/// Errors that can occur when loading and decoding images.
#[derive(Error, Debug)]
pub enum ImageLoadError {
    #[error("asset not found: {0}")]
    AssetNotFound(String),
    #[error("failed to read '{path}': {source}")]
    ReadError {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to decode image '{path}': {source}")]
    DecodeError {
        path: String,
        source: image::ImageError,
    },
}

/// Decoded image data ready for texture creation.
pub struct DecodedImage {
    pub pixels: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// State of an image being decoded off the UI thread.
pub enum AssetLoadState {
    /// Decoding in a background task.
    Loading(mpsc::Receiver<Result<DecodedImage, ImageLoadError>>),
    /// Decoded and ready for texture creation.
    Ready(DecodedImage),
    /// Decoding failed; the message was already shown as a toast.
    Error(String),
}

/// Where an image cache entry gets its bytes.
#[derive(Debug, Clone)]
pub enum ImageSource {
    /// Path inside the embedded assets
    Embedded(String),
    /// File on disk (uploads directory)
    File(std::path::PathBuf),
    /// Bytes already in memory (form preview)
    Bytes(std::sync::Arc<[u8]>),
}

/// Loads and decodes an image from any [`ImageSource`].
pub fn load_and_decode_image(
    key: &str,
    source: ImageSource,
) -> Result<DecodedImage, ImageLoadError> {
    let bytes: std::borrow::Cow<'_, [u8]> = match &source {
        ImageSource::Embedded(path) => Assets::get(path)
            .ok_or_else(|| ImageLoadError::AssetNotFound(path.clone()))?
            .data,
        ImageSource::File(path) => std::fs::read(path)
            .map_err(|source| ImageLoadError::ReadError {
                path: path.display().to_string(),
                source,
            })?
            .into(),
        ImageSource::Bytes(bytes) => std::borrow::Cow::Borrowed(&bytes[..]),
    };

    let img = image::load_from_memory(&bytes).map_err(|source| ImageLoadError::DecodeError {
        path: key.to_string(),
        source,
    })?;
    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();

    Ok(DecodedImage {
        pixels: rgba.into_raw(),
        width,
        height,
    })
}

/// Loads the catalog from embedded assets.
pub fn load_catalog() -> Result<Catalog, CatalogLoadError> {
    let file = Assets::get("catalog.ron").ok_or(CatalogLoadError::CatalogNotFound)?;
    let ron_string = std::str::from_utf8(&file.data)?;
    Ok(ron::from_str(ron_string)?)
}
