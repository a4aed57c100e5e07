//! Declarative record validator
//!
//! Each schema field maps to a [`FieldRule`] chosen by its [`FieldKind`].
//! Rules run independently per field; [`validate`] then assembles the
//! [`CleanRecord`], rejecting the whole document if any field cannot be shaped
//! into its kind. No partial record is ever produced.

use super::rules::{
    coerce_id, coerce_rating, coerce_review_count, normalize_text, parse_timestamp, scalar_text,
};
use chrono::NaiveDateTime;
use review_common::records::as_timestamp;
use review_common::{CleanRecord, Field, FieldKind};
use serde_json::Value;
use thiserror::Error;

/// Typed output of a single field rule
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Null,
    Integer(i64),
    Float(f64),
    Text(String),
    Timestamp(NaiveDateTime),
}

/// Why a field value could not be shaped into its kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Skip {
    /// Array or object where a scalar belongs
    Nested(&'static str),
    /// Present but not integral
    NotAnInteger(String),
}

/// Why a raw document was dropped
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("document is not a field mapping (found {0})")]
    NotAMapping(&'static str),

    #[error("field {field} holds a nested {found}")]
    NestedValue { field: Field, found: &'static str },

    #[error("field {field} is not an integer: {value}")]
    NotAnInteger { field: Field, value: String },

    #[error("field {field} produced a value of the wrong type")]
    WrongType { field: Field },
}

impl Rejection {
    fn from_skip(field: Field, skip: Skip) -> Self {
        match skip {
            Skip::Nested(found) => Rejection::NestedValue { field, found },
            Skip::NotAnInteger(value) => Rejection::NotAnInteger { field, value },
        }
    }
}

/// Pure per-field rule
pub type FieldRule = fn(Option<&Value>) -> Result<FieldValue, Skip>;

/// Rule table: field kind to coercion rule
pub fn rule_for(kind: FieldKind) -> FieldRule {
    match kind {
        FieldKind::Integer => integer_rule,
        FieldKind::Timestamp => timestamp_rule,
        FieldKind::Text => text_rule,
        FieldKind::TitleText => title_text_rule,
        FieldKind::Rating => rating_rule,
        FieldKind::Count => count_rule,
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Scalars pass; arrays and objects do not
///
/// A structured timestamp is only a scalar for timestamp fields.
fn require_scalar(kind: FieldKind, value: Option<&Value>) -> Result<(), Skip> {
    match value {
        Some(v @ Value::Array(_)) => Err(Skip::Nested(json_kind(v))),
        Some(v @ Value::Object(_))
            if kind != FieldKind::Timestamp || as_timestamp(v).is_none() =>
        {
            Err(Skip::Nested(json_kind(v)))
        }
        _ => Ok(()),
    }
}

fn text_value(text: Option<String>) -> FieldValue {
    text.map(FieldValue::Text).unwrap_or(FieldValue::Null)
}

fn integer_rule(value: Option<&Value>) -> Result<FieldValue, Skip> {
    require_scalar(FieldKind::Integer, value)?;
    match coerce_id(value) {
        Ok(Some(i)) => Ok(FieldValue::Integer(i)),
        Ok(None) => Ok(FieldValue::Null),
        Err(raw) => Err(Skip::NotAnInteger(raw)),
    }
}

fn timestamp_rule(value: Option<&Value>) -> Result<FieldValue, Skip> {
    require_scalar(FieldKind::Timestamp, value)?;
    Ok(parse_timestamp(value)
        .map(FieldValue::Timestamp)
        .unwrap_or(FieldValue::Null))
}

fn text_rule(value: Option<&Value>) -> Result<FieldValue, Skip> {
    require_scalar(FieldKind::Text, value)?;
    Ok(text_value(scalar_text(value)))
}

fn title_text_rule(value: Option<&Value>) -> Result<FieldValue, Skip> {
    require_scalar(FieldKind::TitleText, value)?;
    Ok(text_value(normalize_text(value)))
}

fn rating_rule(value: Option<&Value>) -> Result<FieldValue, Skip> {
    require_scalar(FieldKind::Rating, value)?;
    Ok(FieldValue::Float(coerce_rating(value)))
}

fn count_rule(value: Option<&Value>) -> Result<FieldValue, Skip> {
    require_scalar(FieldKind::Count, value)?;
    Ok(FieldValue::Integer(coerce_review_count(value)))
}

fn text_slot(record: &mut CleanRecord, field: Field) -> Option<&mut Option<String>> {
    match field {
        Field::Phone => Some(&mut record.phone),
        Field::Organization => Some(&mut record.organization),
        Field::Olf => Some(&mut record.olf),
        Field::Category => Some(&mut record.category),
        Field::Country => Some(&mut record.country),
        Field::CountryCode => Some(&mut record.country_code),
        Field::State => Some(&mut record.state),
        Field::City => Some(&mut record.city),
        Field::Street => Some(&mut record.street),
        Field::Building => Some(&mut record.building),
        Field::Id | Field::TimeGmt | Field::Rating | Field::NumberReview => None,
    }
}

/// Structural check: place one rule output into the record
fn assign(record: &mut CleanRecord, field: Field, value: FieldValue) -> Result<(), Rejection> {
    match (field, value) {
        (Field::Id, FieldValue::Integer(i)) => record.id = Some(i),
        (Field::Id, FieldValue::Null) => record.id = None,
        (Field::TimeGmt, FieldValue::Timestamp(ts)) => record.time_gmt = Some(ts),
        (Field::TimeGmt, FieldValue::Null) => record.time_gmt = None,
        (Field::Rating, FieldValue::Float(r)) => record.rating = r,
        (Field::NumberReview, FieldValue::Integer(n)) => record.number_review = n,
        (field, FieldValue::Text(text)) => {
            *text_slot(record, field).ok_or(Rejection::WrongType { field })? = Some(text);
        }
        (field, FieldValue::Null) => {
            *text_slot(record, field).ok_or(Rejection::WrongType { field })? = None;
        }
        (field, _) => return Err(Rejection::WrongType { field }),
    }
    Ok(())
}

/// Validate one raw document into a clean record
///
/// Fields outside the schema are ignored.
pub fn validate(document: &Value) -> Result<CleanRecord, Rejection> {
    let fields = document
        .as_object()
        .ok_or_else(|| Rejection::NotAMapping(json_kind(document)))?;

    let mut record = CleanRecord::default();
    for field in Field::ALL {
        let rule = rule_for(field.kind());
        let value = rule(fields.get(field.name())).map_err(|skip| Rejection::from_skip(field, skip))?;
        assign(&mut record, field, value)?;
    }
    Ok(record)
}
