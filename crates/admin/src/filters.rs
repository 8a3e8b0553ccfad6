//! Custom Askama template filters.

#![allow(clippy::unnecessary_wraps)]

use std::fmt::Display;

/// CSS class for a status badge.
///
/// Usage in templates: `<span class="{{ row.status|badge_class }}">`
#[askama::filter_fn]
pub fn badge_class(value: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(badge_class_for(&value.to_string()))
}

fn badge_class_for(status: &str) -> String {
    let tone = match status {
        "active" | "open" | "confirmed" => "success",
        "pending" => "warning",
        "full" | "completed" => "info",
        "cancelled" | "closed" | "inactive" => "muted",
        _ => "neutral",
    };
    format!("badge badge-{tone}")
}

/// Human label for a snake_case status.
///
/// Usage in templates: `{{ row.status|status_label }}`
#[askama::filter_fn]
pub fn status_label(value: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(humanize(&value.to_string()))
}

/// `confirmed` -> `Confirmed`.
pub(crate) fn humanize(value: &str) -> String {
    let mut chars = value.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

/// Returns the current year.
///
/// Usage in templates: `{{ ""|current_year }}`
#[askama::filter_fn]
pub fn current_year(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<i32> {
    use chrono::Datelike;
    Ok(chrono::Utc::now().year())
}
