//! Palette for the storefront and admin panel.

use eframe::egui::Color32;
use pastaart_ui::toast::ToastLevel;

pub const BRAND: Color32 = Color32::from_rgb(214, 96, 120);
pub const BRAND_DARK: Color32 = Color32::from_rgb(150, 55, 80);

// Inline validation
pub const FIELD_ERROR: Color32 = Color32::from_rgb(0xe7, 0x4c, 0x3c);
pub const COUNTER_TEXT: Color32 = Color32::from_rgb(0x6c, 0x75, 0x7d);

// Overlays
pub const BACKDROP: Color32 = Color32::from_rgba_premultiplied(0, 0, 0, 170);
pub const LIGHTBOX_BACKDROP: Color32 = Color32::from_rgba_premultiplied(0, 0, 0, 230);
pub const DROP_ZONE: Color32 = Color32::from_rgba_unmultiplied_const(214, 96, 120, 60);

pub const PLACEHOLDER: Color32 = Color32::from_rgb(240, 226, 230);

/// Banner color for a flash message level.
pub fn level_color(level: ToastLevel) -> Color32 {
    let [r, g, b] = level.color();
    Color32::from_rgb(r, g, b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn translucent_colors_are_premultiplied() {
        for color in [BACKDROP, LIGHTBOX_BACKDROP, DROP_ZONE] {
            let a = color.a();
            assert!(color.r() <= a && color.g() <= a && color.b() <= a, "{color:?}");
        }
    }
}
