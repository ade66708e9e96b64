//! Deferred image loading: real sources are swapped in when an image first
//! becomes visible.

use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LazyImage {
    /// Source to load once visible
    pub data_src: String,
    /// Source currently displayed; `None` while still a placeholder
    pub src: Option<String>,
}

impl LazyImage {
    pub fn is_loaded(&self) -> bool {
        self.src.is_some()
    }
}

/// Registry of observed images keyed by element id.
#[derive(Debug, Default)]
pub struct LazyImages {
    images: BTreeMap<String, LazyImage>,
}

impl LazyImages {
    pub fn observe(&mut self, id: impl Into<String>, data_src: impl Into<String>) {
        self.images.entry(id.into()).or_insert_with(|| LazyImage {
            data_src: data_src.into(),
            src: None,
        });
    }

    pub fn get(&self, id: &str) -> Option<&LazyImage> {
        self.images.get(id)
    }

    /// Called when `id` intersects the viewport. Returns the source to start
    /// loading the first time only.
    pub fn reveal(&mut self, id: &str) -> Option<&str> {
        let image = self.images.get_mut(id)?;
        if image.is_loaded() || image.data_src.is_empty() {
            return None;
        }
        Some(image.src.insert(image.data_src.clone()).as_str())
    }

    /// Number of images still waiting to be revealed.
    pub fn pending(&self) -> usize {
        self.images.values().filter(|i| !i.is_loaded()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reveal_swaps_source_once() {
        let mut images = LazyImages::default();
        images.observe("card-1", "produtos/bolo.png");
        images.observe("card-2", "produtos/torta.png");
        assert_eq!(images.pending(), 2);

        assert_eq!(images.reveal("card-1"), Some("produtos/bolo.png"));
        assert_eq!(images.reveal("card-1"), None);
        assert!(images.get("card-1").unwrap().is_loaded());
        assert_eq!(images.pending(), 1);
        assert_eq!(images.reveal("missing"), None);
    }

    #[test]
    fn image_without_source_stays_placeholder() {
        let mut images = LazyImages::default();
        images.observe("card-3", "");
        assert_eq!(images.reveal("card-3"), None);
        assert!(!images.get("card-3").unwrap().is_loaded());
    }
}
