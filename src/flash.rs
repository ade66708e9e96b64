//! Server flash messages: auto-hide after a delay, fade, then removal.

use crate::toast::ToastLevel;
use std::time::{Duration, Instant};

pub const FLASH_AUTO_HIDE: Duration = Duration::from_secs(5);
pub const FLASH_FADE: Duration = Duration::from_millis(300);

#[derive(Debug, Clone, PartialEq)]
pub struct FlashMessage {
    pub level: ToastLevel,
    pub text: String,
    shown_at: Instant,
    hiding_since: Option<Instant>,
}

impl FlashMessage {
    /// Opacity for rendering: 1 while shown, fading to 0 while hiding.
    pub fn opacity(&self, now: Instant) -> f32 {
        match self.hiding_since {
            None => 1.0,
            Some(since) => {
                let t = now.saturating_duration_since(since).as_secs_f32()
                    / FLASH_FADE.as_secs_f32();
                (1.0 - t).clamp(0.0, 1.0)
            }
        }
    }

    /// Upward slide in points applied while fading (matches the -20px translate).
    pub fn offset_y(&self, now: Instant) -> f32 {
        -20.0 * (1.0 - self.opacity(now))
    }

    pub fn is_hiding(&self) -> bool {
        self.hiding_since.is_some()
    }
}

#[derive(Debug, Default)]
pub struct FlashMessages {
    messages: Vec<FlashMessage>,
}

impl FlashMessages {
    pub fn push(&mut self, level: ToastLevel, text: impl Into<String>, now: Instant) {
        self.messages.push(FlashMessage {
            level,
            text: text.into(),
            shown_at: now,
            hiding_since: None,
        });
    }

    pub fn messages(&self) -> &[FlashMessage] {
        &self.messages
    }

    /// Close button: starts the fade immediately.
    pub fn hide(&mut self, index: usize, now: Instant) {
        if let Some(message) = self.messages.get_mut(index)
            && message.hiding_since.is_none()
        {
            message.hiding_since = Some(now);
        }
    }

    pub fn tick(&mut self, now: Instant) {
        for message in &mut self.messages {
            if message.hiding_since.is_none()
                && now.saturating_duration_since(message.shown_at) >= FLASH_AUTO_HIDE
            {
                message.hiding_since = Some(now);
            }
        }
        self.messages.retain(|m| {
            m.hiding_since
                .is_none_or(|since| now.saturating_duration_since(since) < FLASH_FADE)
        });
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auto_hides_then_removes() {
        let start = Instant::now();
        let mut flashes = FlashMessages::default();
        flashes.push(ToastLevel::Success, "Pedido realizado!", start);

        flashes.tick(start + Duration::from_millis(4999));
        assert!(!flashes.messages()[0].is_hiding());

        let hide_at = start + FLASH_AUTO_HIDE;
        flashes.tick(hide_at);
        assert!(flashes.messages()[0].is_hiding());
        let half = hide_at + FLASH_FADE / 2;
        let opacity = flashes.messages()[0].opacity(half);
        assert!(opacity > 0.4 && opacity < 0.6, "{opacity}");

        flashes.tick(hide_at + FLASH_FADE);
        assert!(flashes.is_empty());
    }

    #[test]
    fn close_button_starts_fade() {
        let start = Instant::now();
        let mut flashes = FlashMessages::default();
        flashes.push(ToastLevel::Error, "Erro", start);
        flashes.push(ToastLevel::Info, "Info", start);

        flashes.hide(0, start);
        flashes.tick(start + FLASH_FADE);
        assert_eq!(flashes.messages().len(), 1);
        assert_eq!(flashes.messages()[0].text, "Info");
    }
}
