//! Live product card preview mirrored from the product form.

pub const DEFAULT_NAME: &str = "Nome do Produto";
pub const DEFAULT_DESCRIPTION: &str = "Descrição do produto aparecerá aqui...";

/// Characters of description shown before truncation.
const DESCRIPTION_LIMIT: usize = 80;

/// Image shown on the preview card, in priority order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreviewImage {
    /// Freshly uploaded file (texture/cache key)
    Uploaded(String),
    /// The product's existing photo when editing
    Current(String),
    Placeholder,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProductPreview {
    pub name: String,
    pub description: String,
    pub price: String,
    pub image: PreviewImage,
}

impl Default for ProductPreview {
    fn default() -> Self {
        Self::from_form("", "", "", None, None)
    }
}

impl ProductPreview {
    pub fn from_form(
        nome: &str,
        descricao: &str,
        preco: &str,
        uploaded: Option<&str>,
        current: Option<&str>,
    ) -> Self {
        let name = if nome.is_empty() { DEFAULT_NAME } else { nome };
        let description = if descricao.is_empty() {
            DEFAULT_DESCRIPTION
        } else {
            descricao
        };
        let price = preco
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|p| p.is_finite())
            .unwrap_or(0.0);

        let image = match (uploaded, current) {
            (Some(key), _) if !key.is_empty() => PreviewImage::Uploaded(key.to_owned()),
            (_, Some(key)) if !key.is_empty() => PreviewImage::Current(key.to_owned()),
            _ => PreviewImage::Placeholder,
        };

        Self {
            name: name.to_owned(),
            description: truncate(description, DESCRIPTION_LIMIT),
            price: format!("R$ {price:.2}"),
            image,
        }
    }
}

fn truncate(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        return text.to_owned();
    }
    let mut out: String = text.chars().take(limit).collect();
    out.push_str("...");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_form_uses_defaults() {
        let preview = ProductPreview::default();
        assert_eq!(preview.name, DEFAULT_NAME);
        assert_eq!(preview.description, DEFAULT_DESCRIPTION);
        assert_eq!(preview.price, "R$ 0.00");
        assert_eq!(preview.image, PreviewImage::Placeholder);
    }

    #[test]
    fn long_description_is_truncated() {
        let long = "á".repeat(100);
        let preview = ProductPreview::from_form("Bolo", &long, "12.5", None, None);
        assert_eq!(preview.description.chars().count(), 83);
        assert!(preview.description.ends_with("..."));
        assert_eq!(preview.price, "R$ 12.50");

        let exact = "b".repeat(80);
        let preview = ProductPreview::from_form("Bolo", &exact, "", None, None);
        assert_eq!(preview.description, exact);
    }

    #[test]
    fn invalid_price_renders_zero() {
        let preview = ProductPreview::from_form("", "", "doze", None, None);
        assert_eq!(preview.price, "R$ 0.00");

        let preview = ProductPreview::from_form("", "", "NaN", None, None);
        assert_eq!(preview.price, "R$ 0.00");
    }

    #[test]
    fn uploaded_image_wins_over_current() {
        let preview = ProductPreview::from_form("", "", "", Some("upload://a"), Some("bolo.png"));
        assert_eq!(preview.image, PreviewImage::Uploaded("upload://a".to_owned()));

        let preview = ProductPreview::from_form("", "", "", None, Some("bolo.png"));
        assert_eq!(preview.image, PreviewImage::Current("bolo.png".to_owned()));
    }
}
