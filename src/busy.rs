//! Buttons that show a spinner label while an action is in flight.

use std::time::{Duration, Instant};

pub const DEFAULT_LOADING_TEXT: &str = "Carregando...";

/// "Add to cart" buttons recover on their own if the page did not navigate.
pub const ADD_TO_CART_RECOVERY: Duration = Duration::from_secs(3);

#[derive(Debug, Clone)]
pub struct BusyButton {
    pub label: String,
    pub disabled: bool,
    original: Option<String>,
    busy_since: Option<Instant>,
    /// Re-enable automatically after this long
    recovery: Option<Duration>,
}

impl BusyButton {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            disabled: false,
            original: None,
            busy_since: None,
            recovery: None,
        }
    }

    pub fn add_to_cart() -> Self {
        Self {
            recovery: Some(ADD_TO_CART_RECOVERY),
            ..Self::new("Adicionar ao carrinho")
        }
    }

    pub fn is_busy(&self) -> bool {
        self.original.is_some()
    }

    pub fn show_loading(&mut self, text: Option<&str>, now: Instant) {
        if self.original.is_none() {
            self.original = Some(std::mem::take(&mut self.label));
        }
        self.label = text.unwrap_or(DEFAULT_LOADING_TEXT).to_owned();
        self.disabled = true;
        self.busy_since = Some(now);
    }

    pub fn hide_loading(&mut self) {
        if let Some(original) = self.original.take() {
            self.label = original;
        }
        self.disabled = false;
        self.busy_since = None;
    }

    pub fn tick(&mut self, now: Instant) {
        if let (Some(since), Some(recovery)) = (self.busy_since, self.recovery)
            && now.saturating_duration_since(since) >= recovery
        {
            self.hide_loading();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loading_round_trip_restores_label() {
        let now = Instant::now();
        let mut button = BusyButton::new("Salvar");
        button.show_loading(Some("Salvando..."), now);
        assert!(button.disabled);
        assert_eq!(button.label, "Salvando...");

        button.show_loading(None, now);
        assert_eq!(button.label, DEFAULT_LOADING_TEXT);

        button.hide_loading();
        assert!(!button.disabled);
        assert_eq!(button.label, "Salvar");
    }

    #[test]
    fn add_to_cart_recovers_after_timeout() {
        let now = Instant::now();
        let mut button = BusyButton::add_to_cart();
        button.show_loading(Some("Adicionando..."), now);

        button.tick(now + Duration::from_secs(2));
        assert!(button.is_busy());

        button.tick(now + ADD_TO_CART_RECOVERY);
        assert!(!button.is_busy());
        assert_eq!(button.label, "Adicionar ao carrinho");
    }

    #[test]
    fn plain_button_stays_busy() {
        let now = Instant::now();
        let mut button = BusyButton::new("Enviar");
        button.show_loading(None, now);
        button.tick(now + Duration::from_secs(60));
        assert!(button.disabled);
    }
}
