//! Form validation with inline per-field errors, submit-button state and char counters.

use regex::Regex;
use std::collections::BTreeMap;
use std::sync::LazyLock;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid")
});

pub const REQUIRED_MESSAGE: &str = "Este campo é obrigatório";
pub const EMAIL_MESSAGE: &str = "Email inválido";
pub const NUMBER_MESSAGE: &str = "Valor numérico inválido";
pub const PRICE_MESSAGE: &str = "O preço deve ser maior que zero";
pub const STOREFRONT_EMAIL_MESSAGE: &str = "Por favor, insira um email válido";

/// Name of the field that gets the positive-price check.
pub const PRICE_FIELD: &str = "preco";

/// Characters left below which a counter turns into a warning.
const COUNTER_WARNING_REMAINING: usize = 50;

pub fn is_valid_email(value: &str) -> bool {
    EMAIL_RE.is_match(value)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Email,
    Number,
    TextArea,
    Select,
}

#[derive(Debug, Clone)]
pub struct Field {
    pub name: String,
    pub kind: FieldKind,
    pub required: bool,
    pub value: String,
    /// Present on textareas with a `maxlength`
    pub counter: Option<CharCounter>,
}

impl Field {
    pub fn new(name: &str, kind: FieldKind) -> Self {
        Self {
            name: name.to_owned(),
            kind,
            required: false,
            value: String::new(),
            counter: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn max_length(mut self, max: usize) -> Self {
        self.counter = Some(CharCounter { max });
        self
    }

    /// Checks this field in isolation; returns the message to show on failure.
    pub fn check(&self) -> Option<&'static str> {
        let value = self.value.trim();

        if self.required && value.is_empty() {
            return Some(REQUIRED_MESSAGE);
        }
        if self.kind == FieldKind::Email && !value.is_empty() && !is_valid_email(value) {
            return Some(EMAIL_MESSAGE);
        }
        if self.kind == FieldKind::Number
            && !value.is_empty()
            && !value.parse::<f64>().is_ok_and(f64::is_finite)
        {
            return Some(NUMBER_MESSAGE);
        }
        None
    }
}

/// A form's fields plus the inline error rendered next to each one.
#[derive(Debug, Default)]
pub struct FormState {
    fields: Vec<Field>,
    errors: BTreeMap<String, String>,
    pub submit_button: SubmitButton,
}

impl FormState {
    pub fn new(fields: Vec<Field>) -> Self {
        Self {
            fields,
            errors: BTreeMap::new(),
            submit_button: SubmitButton::default(),
        }
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn field_mut(&mut self, name: &str) -> Option<&mut Field> {
        self.fields.iter_mut().find(|f| f.name == name)
    }

    pub fn value(&self, name: &str) -> &str {
        self.field(name).map_or("", |f| f.value.as_str())
    }

    pub fn set_value(&mut self, name: &str, value: impl Into<String>) {
        if let Some(field) = self.field_mut(name) {
            field.value = value.into();
        }
    }

    /// Inline error currently shown beside `name`.
    pub fn error(&self, name: &str) -> Option<&str> {
        self.errors.get(name).map(String::as_str)
    }

    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    /// Replaces any existing error for the field; a field never shows two.
    pub fn show_field_error(&mut self, name: &str, message: impl Into<String>) {
        self.errors.insert(name.to_owned(), message.into());
    }

    pub fn clear_field_error(&mut self, name: &str) {
        self.errors.remove(name);
    }

    /// Revalidates one field (e.g. on blur).
    pub fn validate_field(&mut self, name: &str) -> bool {
        self.clear_field_error(name);
        let Some(message) = self.field(name).and_then(Field::check) else {
            return true;
        };
        self.show_field_error(name, message);
        false
    }

    /// Validates every field and the positive-price rule. Failures leave inline errors.
    pub fn validate(&mut self) -> bool {
        let names: Vec<String> = self.fields.iter().map(|f| f.name.clone()).collect();
        let mut valid = true;
        for name in &names {
            valid &= self.validate_field(name);
        }

        if let Some(price) = self.field(PRICE_FIELD)
            && price.value.trim().parse::<f64>().is_ok_and(|p| p.is_finite() && p <= 0.0)
        {
            self.show_field_error(PRICE_FIELD, PRICE_MESSAGE);
            valid = false;
        }

        valid
    }

    /// Handles a submit: blocks on validation failure, otherwise marks the button busy.
    pub fn submit(&mut self) -> bool {
        if !self.validate() {
            log::debug!("Form blocked with {} field error(s)", self.errors.len());
            return false;
        }
        self.submit_button.begin_submit();
        true
    }
}

/// Submit control of a form.
#[derive(Debug, Clone)]
pub struct SubmitButton {
    pub label: String,
    pub disabled: bool,
}

impl Default for SubmitButton {
    fn default() -> Self {
        Self {
            label: "Salvar".to_owned(),
            disabled: false,
        }
    }
}

impl SubmitButton {
    /// Disables the control and swaps in the busy label; the page navigates away on success.
    pub fn begin_submit(&mut self) {
        self.disabled = true;
        self.label = "Salvando...".to_owned();
    }
}

/// Remaining-characters counter for a textarea with a max length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CharCounter {
    pub max: usize,
}

impl CharCounter {
    pub fn text(&self, value: &str) -> String {
        format!("{}/{} caracteres", value.chars().count(), self.max)
    }

    pub fn is_warning(&self, value: &str) -> bool {
        self.max.saturating_sub(value.chars().count()) < COUNTER_WARNING_REMAINING
    }
}

/// Storefront blur check on email inputs. Empty input is fine.
pub fn validate_email_on_blur(value: &str) -> Result<(), &'static str> {
    let email = value.trim();
    if !email.is_empty() && !is_valid_email(email) {
        return Err(STOREFRONT_EMAIL_MESSAGE);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product_form() -> FormState {
        FormState::new(vec![
            Field::new("nome", FieldKind::Text).required(),
            Field::new("descricao", FieldKind::TextArea).max_length(500),
            Field::new("preco", FieldKind::Number).required(),
            Field::new("email", FieldKind::Email),
        ])
    }

    #[test]
    fn empty_required_field_gets_one_error() {
        let mut form = product_form();
        form.set_value("preco", "10");

        assert!(!form.validate());
        assert_eq!(form.error("nome"), Some(REQUIRED_MESSAGE));
        assert_eq!(form.error_count(), 1);

        assert!(!form.validate());
        assert_eq!(form.error_count(), 1);

        form.set_value("nome", "Bolo");
        assert!(form.validate());
        assert_eq!(form.error("nome"), None);
        assert_eq!(form.error_count(), 0);
    }

    #[test]
    fn whitespace_only_counts_as_empty() {
        let mut form = product_form();
        form.set_value("nome", "   ");
        assert!(!form.validate_field("nome"));
    }

    #[test]
    fn email_and_number_checks_skip_empty_values() {
        let mut form = product_form();
        assert!(form.validate_field("email"));

        form.set_value("email", "not-an-email");
        assert!(!form.validate_field("email"));
        assert_eq!(form.error("email"), Some(EMAIL_MESSAGE));

        form.set_value("email", "cliente@pastaart.com.br");
        assert!(form.validate_field("email"));

        form.set_value("preco", "abc");
        assert!(!form.validate_field("preco"));
        assert_eq!(form.error("preco"), Some(NUMBER_MESSAGE));
    }

    #[test]
    fn non_positive_price_is_rejected() {
        let mut form = product_form();
        form.set_value("nome", "Bolo");
        form.set_value("preco", "0");
        assert!(!form.validate());
        assert_eq!(form.error("preco"), Some(PRICE_MESSAGE));

        form.set_value("preco", "-3.5");
        assert!(!form.submit());
        assert!(!form.submit_button.disabled);
    }

    #[test]
    fn non_finite_price_is_not_a_number() {
        let mut form = product_form();
        form.set_value("nome", "Bolo");
        for text in ["NaN", "nan", "-NaN", "inf", "-inf", "infinity"] {
            form.set_value("preco", text);
            assert!(!form.validate(), "{text} should be rejected");
            assert_eq!(form.error("preco"), Some(NUMBER_MESSAGE));
            assert!(!form.submit_button.disabled);
        }
    }

    #[test]
    fn successful_submit_disables_button() {
        let mut form = product_form();
        form.set_value("nome", "Bolo");
        form.set_value("preco", "12.5");
        assert!(form.submit());
        assert!(form.submit_button.disabled);
        assert_eq!(form.submit_button.label, "Salvando...");
    }

    #[test]
    fn char_counter_warns_near_limit() {
        let counter = CharCounter { max: 100 };
        assert_eq!(counter.text("açúcar"), "6/100 caracteres");
        assert!(!counter.is_warning(&"x".repeat(50)));
        assert!(counter.is_warning(&"x".repeat(51)));
        assert!(counter.is_warning(&"x".repeat(120)));
    }

    #[test]
    fn storefront_email_blur() {
        assert!(validate_email_on_blur("").is_ok());
        assert!(validate_email_on_blur(" a@b.co ").is_ok());
        assert_eq!(
            validate_email_on_blur("a@b"),
            Err(STOREFRONT_EMAIL_MESSAGE)
        );
    }
}
