//! Shape checks for item payloads.
//!
//! Fields are checked in a fixed order (`name`, `description`, `price`,
//! `imageURL`, `category`), each one presence first, then emptiness, then
//! type or format. Only the first violation is reported. Keys outside the
//! schema are rejected once every known field has passed.

use std::fmt;

use serde_json::{Map, Value};
use thiserror::Error;
use url::Url;

use crate::{error::VALIDATION_PREFIX, model::ItemFields, AppError};

pub const FIELD_NAME: &str = "name";
pub const FIELD_DESCRIPTION: &str = "description";
pub const FIELD_PRICE: &str = "price";
pub const FIELD_IMAGE_URL: &str = "imageURL";
pub const FIELD_CATEGORY: &str = "category";

const KNOWN_FIELDS: &[&str] = &[
    FIELD_NAME,
    FIELD_DESCRIPTION,
    FIELD_PRICE,
    FIELD_IMAGE_URL,
    FIELD_CATEGORY,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    Required,
    String,
    NotEmpty,
    Number,
    Minimum,
    Uri,
    Unknown,
}

impl Rule {
    pub fn as_str(&self) -> &'static str {
        match self {
            Rule::Required => "REQUIRED",
            Rule::String => "STRING",
            Rule::NotEmpty => "EMPTY",
            Rule::Number => "NUMBER",
            Rule::Minimum => "MIN",
            Rule::Uri => "URI",
            Rule::Unknown => "UNKNOWN_FIELD",
        }
    }

    fn describe(&self) -> &'static str {
        match self {
            Rule::Required => "is required",
            Rule::String => "must be a string",
            Rule::NotEmpty => "is not allowed to be empty",
            Rule::Number => "must be a number",
            Rule::Minimum => "must be greater than or equal to 0",
            Rule::Uri => "must be a valid uri",
            Rule::Unknown => "is not allowed",
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

/// The first rule a candidate item broke.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{field} {rule}")]
pub struct ValidationError {
    field: String,
    rule: Rule,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, rule: Rule) -> Self {
        Self {
            field: field.into(),
            rule,
        }
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn rule(&self) -> Rule {
        self.rule
    }
}

impl From<ValidationError> for AppError {
    fn from(error: ValidationError) -> Self {
        AppError::new(
            format!("{VALIDATION_PREFIX}{}", error.rule.as_str()),
            error.to_string(),
        )
        .with_context("field", error.field.clone())
    }
}

fn required_string(
    candidate: &Map<String, Value>,
    field: &'static str,
) -> Result<String, ValidationError> {
    match candidate.get(field) {
        None => Err(ValidationError::new(field, Rule::Required)),
        Some(Value::String(raw)) => {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                Err(ValidationError::new(field, Rule::NotEmpty))
            } else {
                Ok(trimmed.to_string())
            }
        }
        Some(_) => Err(ValidationError::new(field, Rule::String)),
    }
}

fn required_price(candidate: &Map<String, Value>) -> Result<f64, ValidationError> {
    let price = match candidate.get(FIELD_PRICE) {
        None => return Err(ValidationError::new(FIELD_PRICE, Rule::Required)),
        Some(Value::Number(number)) => number.as_f64(),
        // Numeric strings are accepted the way form posts deliver them.
        Some(Value::String(raw)) => raw.trim().parse::<f64>().ok(),
        Some(_) => None,
    };

    match price {
        Some(value) if value.is_finite() => {
            if value < 0.0 {
                Err(ValidationError::new(FIELD_PRICE, Rule::Minimum))
            } else {
                Ok(value)
            }
        }
        _ => Err(ValidationError::new(FIELD_PRICE, Rule::Number)),
    }
}

fn required_uri(candidate: &Map<String, Value>) -> Result<String, ValidationError> {
    let raw = required_string(candidate, FIELD_IMAGE_URL)?;
    Url::parse(&raw)
        .map(|_| raw)
        .map_err(|_| ValidationError::new(FIELD_IMAGE_URL, Rule::Uri))
}

/// Check a raw item payload and return its normalized fields.
///
/// Strings come back trimmed and the category label comes back uppercase.
pub fn validate_item(candidate: &Map<String, Value>) -> Result<ItemFields, ValidationError> {
    let name = required_string(candidate, FIELD_NAME)?;
    let description = required_string(candidate, FIELD_DESCRIPTION)?;
    let price = required_price(candidate)?;
    let image_url = required_uri(candidate)?;
    let category = required_string(candidate, FIELD_CATEGORY)?.to_uppercase();

    if let Some(unknown) = candidate
        .keys()
        .find(|key| !KNOWN_FIELDS.contains(&key.as_str()))
    {
        return Err(ValidationError::new(unknown.clone(), Rule::Unknown));
    }

    Ok(ItemFields {
        name,
        description,
        price,
        image_url,
        category,
    })
}

/// Normalize a free-text category label the way it is stored.
pub fn normalize_label(label: &str) -> String {
    label.trim().to_uppercase()
}
