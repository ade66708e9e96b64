//! Storefront input masks and the cart quantity guard.

use regex::Regex;
use std::sync::LazyLock;

static NON_DIGIT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^0-9]").expect("non-digit pattern is valid"));

pub const CART_QUANTITY_MIN: i64 = 1;
pub const CART_QUANTITY_MAX: i64 = 50;

/// Longest digit string the phone mask applies to (DDD + 9 digits).
const PHONE_MAX_DIGITS: usize = 11;

/// Formats a Brazilian phone number as the user types: `(11) 98765-4321`.
///
/// Inputs with more than eleven digits are returned as bare digits.
pub fn format_phone_number(value: &str) -> String {
    let digits = NON_DIGIT.replace_all(value, "");
    let n = digits.len();

    if n == 0 || n > PHONE_MAX_DIGITS {
        return digits.into_owned();
    }
    match n {
        ..=2 => format!("({digits}"),
        ..=7 => format!("({}) {}", &digits[..2], &digits[2..]),
        _ => format!("({}) {}-{}", &digits[..2], &digits[2..7], &digits[7..]),
    }
}

/// Truncates a numeric price to two decimal places; anything else passes through.
pub fn format_price(value: &str) -> String {
    if value.trim().parse::<f64>().is_err() {
        return value.to_owned();
    }
    match value.split_once('.') {
        Some((whole, decimals)) if decimals.chars().count() > 2 => {
            let cents: String = decimals.chars().take(2).collect();
            format!("{whole}.{cents}")
        }
        _ => value.to_owned(),
    }
}

/// Keeps a cart line quantity within the allowed range.
pub fn clamp_cart_quantity(quantity: i64) -> i64 {
    quantity.clamp(CART_QUANTITY_MIN, CART_QUANTITY_MAX)
}
