//! Custom Askama template filters.

#![allow(clippy::unnecessary_wraps)]

use std::fmt::Display;
use std::str::FromStr;

use rust_decimal::Decimal;

use aprova_facil_core::Price;

/// Returns the current year.
///
/// Usage in templates: `{{ ""|current_year }}`
#[askama::filter_fn]
pub fn current_year(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<i32> {
    use chrono::Datelike;
    Ok(chrono::Utc::now().year())
}

/// Returns the content hash for main.css.
///
/// The hash is computed at build time from the CSS file content.
///
/// Usage in templates: `{{ ""|css_hash }}`
#[askama::filter_fn]
pub fn css_hash(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<&'static str> {
    Ok(env!("CSS_HASH"))
}

/// Returns the content hash for a script under `static/js/`.
///
/// Usage in templates: `{{ "checkout"|js_hash }}`
#[askama::filter_fn]
pub fn js_hash(name: impl Display, _env: &dyn askama::Values) -> askama::Result<&'static str> {
    Ok(match name.to_string().as_str() {
        "checkout" => env!("CHECKOUT_JS_HASH"),
        "cep" => env!("CEP_JS_HASH"),
        _ => "",
    })
}

/// Formats a decimal amount as Brazilian reais (`R$ 1.800,00`).
///
/// Values that are not decimals are rendered unchanged.
///
/// Usage in templates: `{{ order.total|brl }}`
#[askama::filter_fn]
pub fn brl(value: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(format_brl(&value.to_string()))
}

fn format_brl(text: &str) -> String {
    Decimal::from_str(text.trim()).map_or_else(|_| text.to_owned(), |d| Price::brl(d).display())
}

/// Formats a backend timestamp as `dd/mm/aaaa`.
///
/// Accepts RFC 3339 and naive `YYYY-MM-DDTHH:MM:SS[.f]` timestamps.
///
/// Usage in templates: `{{ order.created_at|br_date }}`
#[askama::filter_fn]
pub fn br_date(value: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(format_br_date(&value.to_string()))
}

fn format_br_date(text: &str) -> String {
    let text = text.trim();
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(text) {
        return dt.format("%d/%m/%Y").to_string();
    }
    if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f") {
        return dt.format("%d/%m/%Y").to_string();
    }
    if let Ok(d) = chrono::NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return d.format("%d/%m/%Y").to_string();
    }
    text.to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_brl() {
        assert_eq!(format_brl("1800.00"), "R$ 1.800,00");
        assert_eq!(format_brl("750"), "R$ 750,00");
        assert_eq!(format_brl("abc"), "abc");
    }

    #[test]
    fn test_format_br_date() {
        assert_eq!(format_br_date("2026-03-05T14:30:00Z"), "05/03/2026");
        assert_eq!(format_br_date("2026-03-05T14:30:00.123456"), "05/03/2026");
        assert_eq!(format_br_date("2026-03-05"), "05/03/2026");
        assert_eq!(format_br_date(""), "");
    }
}
