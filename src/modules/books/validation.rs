//! Field checks run before any store mutation.

use serde::Serialize;
use serde_json::Value;

use super::models::{CostRange, CreateBook, UpdateBook};

/// One failing field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Validated creation input.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidCreate {
    pub title: String,
    pub publication: String,
    pub author: String,
    pub cost: f64,
}

/// String form of a JSON scalar. Arrays, objects and null have none.
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

fn required_text(
    value: Option<&Value>,
    field: &'static str,
    message: &str,
    errors: &mut Vec<FieldError>,
) -> String {
    match value.and_then(scalar_text) {
        Some(text) if !text.is_empty() => text,
        _ => {
            errors.push(FieldError::new(field, message));
            String::new()
        }
    }
}

/// Reads a cost given as a JSON number or numeric string.
///
/// `Ok(None)` when the value is absent, null, or an empty string.
fn parse_cost(value: Option<&Value>) -> Result<Option<f64>, FieldError> {
    let invalid = || FieldError::new("cost", "cost must be a number");
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(number)) => number.as_f64().map(Some).ok_or_else(invalid),
        Some(Value::String(text)) if text.trim().is_empty() => Ok(None),
        Some(Value::String(text)) => text
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|cost| cost.is_finite())
            .map(Some)
            .ok_or_else(invalid),
        Some(_) => Err(invalid()),
    }
}

/// Checks a creation request, reporting every failing field at once.
pub fn validate_create(request: &CreateBook) -> Result<ValidCreate, Vec<FieldError>> {
    let mut errors = Vec::new();

    let title = required_text(
        request.title.as_ref(),
        "title",
        "Title is required",
        &mut errors,
    );
    let publication = required_text(
        request.publication.as_ref(),
        "publication",
        "Publication is required",
        &mut errors,
    );
    let author = required_text(
        request.author.as_ref(),
        "author",
        "Author is required",
        &mut errors,
    );
    let cost = match parse_cost(request.cost.as_ref()) {
        Ok(cost) => cost.unwrap_or_default(),
        Err(error) => {
            errors.push(error);
            0.0
        }
    };

    if errors.is_empty() {
        Ok(ValidCreate {
            title,
            publication,
            author,
            cost,
        })
    } else {
        Err(errors)
    }
}

/// Checks an update request; `cost` is mandatory.
pub fn validate_update(request: &UpdateBook) -> Result<f64, Vec<FieldError>> {
    match parse_cost(request.cost.as_ref()) {
        Ok(Some(cost)) => Ok(cost),
        Ok(None) => Err(vec![FieldError::new("cost", "cost is required")]),
        Err(error) => Err(vec![error]),
    }
}

/// Both bounds must be present and non-empty. Their values are not used.
pub fn validate_cost_range(range: &CostRange) -> Result<(), Vec<FieldError>> {
    let mut errors = Vec::new();
    if range.min_cost.as_deref().map_or(true, str::is_empty) {
        errors.push(FieldError::new("minCost", "Please ensure you pick MinCost"));
    }
    if range.max_cost.as_deref().map_or(true, str::is_empty) {
        errors.push(FieldError::new("maxCost", "Please ensure you pick MaxCost"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
