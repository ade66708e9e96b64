use std::time::Duration;

/// Width of the admin sidebar in pixels.
pub const SIDEBAR_WIDTH: f32 = 200.0;

/// Side length of product thumbnails in tables and cards.
pub const THUMBNAIL_SIZE: f32 = 48.0;

/// Width of a storefront product card.
pub const CARD_WIDTH: f32 = 220.0;

/// Max width of the inline upload preview.
pub const PREVIEW_MAX_WIDTH: f32 = 260.0;

/// Fraction of the screen the lightbox image fits into at scale 1.
pub const LIGHTBOX_FIT: f32 = 0.9;

/// Max characters of a product description.
pub const DESCRIPTION_MAX_CHARS: usize = 500;

/// Texture key prefix of embedded catalog photos.
pub const CATALOG_SCHEME: &str = "catalog://";

/// Key under which the JSON storage is persisted by eframe.
pub const STORAGE_KEY: &str = "pastaart.storage";

/// Storage keys used by the pages.
pub const CART_STORAGE_KEY: &str = "carrinho";
pub const STATUS_FILTER_STORAGE_KEY: &str = "admin.status_filter";

/// Feedback pulse on quantity buttons.
pub const QUANTITY_PULSE: Duration = Duration::from_millis(150);
