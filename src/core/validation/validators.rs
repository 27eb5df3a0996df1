//! Reusable field validators
//!
//! Each validator is a closure over `(field, value)` returning the violation
//! message on failure. Missing fields arrive as `Value::Null`; only
//! [`required`] rejects them, every other validator lets them through.

use chrono::{DateTime, NaiveDate, Utc};
use serde_json::Value;

pub type Validator = Box<dyn Fn(&str, &Value) -> Result<(), String> + Send + Sync>;

/// Image formats accepted for screenshots and thumbnails
pub const IMAGE_EXTENSIONS: &[&str] = &[".jpg", ".jpeg", ".png", ".gif"];

/// "discountEndDate" -> "Discount end date"
pub fn humanize(field: &str) -> String {
    let mut label = String::with_capacity(field.len() + 4);
    for (i, c) in field.chars().enumerate() {
        if i == 0 {
            label.extend(c.to_uppercase());
        } else if c.is_uppercase() {
            label.push(' ');
            label.extend(c.to_lowercase());
        } else {
            label.push(c);
        }
    }
    label
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

/// Validator: field is present and not blank
pub fn required() -> impl Fn(&str, &Value) -> Result<(), String> + Send + Sync + Clone {
    |field: &str, value: &Value| {
        if is_blank(value) {
            Err(format!("{} is required", humanize(field)))
        } else {
            Ok(())
        }
    }
}

/// Validator: number must be zero or more
pub fn non_negative() -> impl Fn(&str, &Value) -> Result<(), String> + Send + Sync + Clone {
    |field: &str, value: &Value| {
        if value.is_null() {
            return Ok(());
        }
        match value.as_f64() {
            Some(num) if num >= 0.0 => Ok(()),
            _ => Err(format!("{} must be a positive number", humanize(field))),
        }
    }
}

/// Validator: whole number, zero or more
pub fn non_negative_integer() -> impl Fn(&str, &Value) -> Result<(), String> + Send + Sync + Clone
{
    |field: &str, value: &Value| {
        if value.is_null() {
            return Ok(());
        }
        match value.as_f64() {
            Some(num) if num >= 0.0 && num.fract() == 0.0 => Ok(()),
            _ => Err(format!("{} must be a positive number", humanize(field))),
        }
    }
}

/// Validator: value is a boolean
pub fn boolean() -> impl Fn(&str, &Value) -> Result<(), String> + Send + Sync + Clone {
    |field: &str, value: &Value| {
        if value.is_null() || value.is_boolean() {
            Ok(())
        } else {
            Err(format!("{} must be a boolean", field))
        }
    }
}

/// Parse an ISO 8601 date or date-time
pub fn parse_iso_date(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(datetime) = DateTime::parse_from_rfc3339(value) {
        return Some(datetime.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Validator: ISO 8601 date string
pub fn iso_date() -> impl Fn(&str, &Value) -> Result<(), String> + Send + Sync + Clone {
    |_: &str, value: &Value| {
        if value.is_null() {
            return Ok(());
        }
        match value.as_str().and_then(parse_iso_date) {
            Some(_) => Ok(()),
            None => Err("Invalid date format".to_string()),
        }
    }
}

/// Validator: array with at least `min` items
pub fn min_items(min: usize) -> impl Fn(&str, &Value) -> Result<(), String> + Send + Sync + Clone {
    move |field: &str, value: &Value| {
        let Some(items) = value.as_array() else {
            return Err(format!("{} must be an array", humanize(field)));
        };
        if items.len() < min {
            let noun = if min == 1 { "item" } else { "items" };
            Err(format!(
                "{} must have at least {} {}",
                humanize(field),
                min,
                noun
            ))
        } else {
            Ok(())
        }
    }
}

/// Lowercased extension of a URL's path, including the dot
fn url_extension(url: &str) -> Option<String> {
    let (_, rest) = url.split_once("://")?;
    let path = rest
        .split(['?', '#'])
        .next()
        .unwrap_or_default();
    let (_, path) = path.split_once('/')?;
    let file = path.rsplit('/').next()?;
    let (_, ext) = file.rsplit_once('.')?;
    Some(format!(".{}", ext.to_ascii_lowercase()))
}

/// True when `url` is an absolute URL whose path ends in one of `allowed`
pub fn has_extension(url: &str, allowed: &[&str]) -> bool {
    url_extension(url).is_some_and(|ext| allowed.contains(&ext.as_str()))
}

/// Validator: every array entry is a URL with an allowed extension
pub fn file_urls(
    allowed: &'static [&'static str],
) -> impl Fn(&str, &Value) -> Result<(), String> + Send + Sync + Clone {
    move |field: &str, value: &Value| {
        let Some(items) = value.as_array() else {
            return Ok(());
        };
        for (index, item) in items.iter().enumerate() {
            let valid = item.as_str().is_some_and(|url| has_extension(url, allowed));
            if !valid {
                return Err(format!(
                    "Invalid {} format at index {}. Allowed formats: {}",
                    field,
                    index,
                    allowed.join(", ")
                ));
            }
        }
        Ok(())
    }
}

/// Validator: every entry has mp4, webm and thumbnail URLs of the right type
pub fn video_entries() -> impl Fn(&str, &Value) -> Result<(), String> + Send + Sync + Clone {
    |field: &str, value: &Value| {
        let Some(items) = value.as_array() else {
            return Ok(());
        };
        for (index, item) in items.iter().enumerate() {
            let url = |key: &str| item.get(key).and_then(Value::as_str);
            let (Some(mp4), Some(webm), Some(thumbnail)) =
                (url("mp4"), url("webm"), url("thumbnail"))
            else {
                return Err(format!(
                    "{} at index {} must have mp4, webm, and thumbnail",
                    field, index
                ));
            };
            if !has_extension(mp4, &[".mp4"])
                || !has_extension(webm, &[".webm"])
                || !has_extension(thumbnail, IMAGE_EXTENSIONS)
            {
                return Err(format!("Invalid file format at index {}", index));
            }
        }
        Ok(())
    }
}
