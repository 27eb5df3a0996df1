//! Product input validation
//!
//! [`validate_product`] checks a product payload and returns every
//! violation it finds. It is a pure function: each call builds and returns
//! its own list, nothing is shared between calls.

pub mod validators;

use crate::core::error::FieldViolation;
use chrono::{DateTime, Utc};
use serde_json::Value;
use validators::{
    IMAGE_EXTENSIONS, Validator, boolean, file_urls, iso_date, min_items, non_negative,
    non_negative_integer, parse_iso_date, required, video_entries,
};

fn rule(validator: impl Fn(&str, &Value) -> Result<(), String> + Send + Sync + 'static) -> Validator {
    Box::new(validator)
}

/// Per-field rules, checked in order. Only the first failure of a field is
/// reported.
fn field_rules() -> Vec<(&'static str, Vec<Validator>)> {
    vec![
        ("title", vec![rule(required())]),
        ("type", vec![rule(required())]),
        ("description", vec![rule(required())]),
        ("price", vec![rule(required()), rule(non_negative())]),
        (
            "discount",
            vec![rule(required()), rule(non_negative_integer())],
        ),
        ("releaseDate", vec![rule(required()), rule(iso_date())]),
        ("developer", vec![rule(required())]),
        ("publisher", vec![rule(required())]),
        ("platform", vec![rule(min_items(1))]),
        ("isActive", vec![rule(required()), rule(boolean())]),
        (
            "screenshots",
            vec![rule(min_items(1)), rule(file_urls(IMAGE_EXTENSIONS))],
        ),
        ("videos", vec![rule(video_entries())]),
        ("genres", vec![rule(min_items(1))]),
        ("tags", vec![rule(min_items(3))]),
        ("features", vec![rule(min_items(1))]),
    ]
}

/// Validate a product payload against the catalog's input rules.
///
/// `now` anchors the "discount must end in the future" rule.
pub fn validate_product(payload: &Value, now: DateTime<Utc>) -> Vec<FieldViolation> {
    static MISSING: Value = Value::Null;
    let mut violations = Vec::new();

    for (field, rules) in field_rules() {
        let value = payload.get(field).unwrap_or(&MISSING);
        if let Some(message) = rules.iter().find_map(|rule| rule(field, value).err()) {
            violations.push(FieldViolation::new(field, message));
        }
    }

    if let Some(violation) = check_discount_window(payload, now) {
        violations.push(violation);
    }

    violations
}

/// A running discount needs an end date that has not passed yet
fn check_discount_window(payload: &Value, now: DateTime<Utc>) -> Option<FieldViolation> {
    const FIELD: &str = "discountEndDate";

    let discount = payload.get("discount").and_then(Value::as_f64)?;
    if discount <= 0.0 {
        return None;
    }

    let message = match payload.get(FIELD) {
        None | Some(Value::Null) => "Discount end date is required",
        Some(value) => match value.as_str().and_then(parse_iso_date) {
            None => "Invalid date format",
            Some(end) if end < now => "Discount end date must be greater than current date",
            Some(_) => return None,
        },
    };
    Some(FieldViolation::new(FIELD, message))
}
