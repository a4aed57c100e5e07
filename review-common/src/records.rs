//! Record types shared by the pipeline stages
//!
//! - [`RawRecord`]: loosely typed field mapping produced by ingestion
//! - [`CleanRecord`]: validated record with the fixed schema
//! - [`AggregateRecord`]: per-city or per-state statistics

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::fmt;
use std::str::FromStr;

/// One ingested row: field name to arbitrary scalar value
pub type RawRecord = Map<String, Value>;

/// Key marking a structured timestamp inside a raw document
pub const DATE_KEY: &str = "$date";

const DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// Encode a timestamp as a structured raw value (`{"$date": "..."}`)
pub fn timestamp_value(ts: NaiveDateTime) -> Value {
    json!({ DATE_KEY: ts.format(DATE_FORMAT).to_string() })
}

/// Decode a structured raw timestamp; `None` for any other value
pub fn as_timestamp(value: &Value) -> Option<NaiveDateTime> {
    let obj = value.as_object()?;
    if obj.len() != 1 {
        return None;
    }
    let text = obj.get(DATE_KEY)?.as_str()?;
    NaiveDateTime::parse_from_str(text, DATE_FORMAT).ok()
}

/// Value family a schema field is coerced into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Optional integer, passthrough
    Integer,
    /// Optional timestamp parsed from known formats
    Timestamp,
    /// Optional text, passthrough
    Text,
    /// Optional text, trimmed and title-cased
    TitleText,
    /// Float defaulting to 0.0
    Rating,
    /// Integer defaulting to 0
    Count,
}

/// Fields of the clean schema, in storage order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Id,
    TimeGmt,
    Phone,
    Organization,
    Olf,
    Rating,
    NumberReview,
    Category,
    Country,
    CountryCode,
    State,
    City,
    Street,
    Building,
}

impl Field {
    pub const ALL: [Field; 14] = [
        Field::Id,
        Field::TimeGmt,
        Field::Phone,
        Field::Organization,
        Field::Olf,
        Field::Rating,
        Field::NumberReview,
        Field::Category,
        Field::Country,
        Field::CountryCode,
        Field::State,
        Field::City,
        Field::Street,
        Field::Building,
    ];

    /// Field name as it appears in source files and stored records
    pub fn name(self) -> &'static str {
        match self {
            Field::Id => "ID",
            Field::TimeGmt => "Time_GMT",
            Field::Phone => "Phone",
            Field::Organization => "Organization",
            Field::Olf => "OLF",
            Field::Rating => "Rating",
            Field::NumberReview => "NumberReview",
            Field::Category => "Category",
            Field::Country => "Country",
            Field::CountryCode => "CountryCode",
            Field::State => "State",
            Field::City => "City",
            Field::Street => "Street",
            Field::Building => "Building",
        }
    }

    pub fn kind(self) -> FieldKind {
        match self {
            Field::Id => FieldKind::Integer,
            Field::TimeGmt => FieldKind::Timestamp,
            Field::Phone | Field::Olf | Field::CountryCode => FieldKind::Text,
            Field::Rating => FieldKind::Rating,
            Field::NumberReview => FieldKind::Count,
            Field::Organization
            | Field::Category
            | Field::Country
            | Field::State
            | Field::City
            | Field::Street
            | Field::Building => FieldKind::TitleText,
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Validated review record
///
/// Every field is always present; `rating` and `number_review` are never null.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CleanRecord {
    #[serde(rename = "ID")]
    pub id: Option<i64>,
    #[serde(rename = "Time_GMT")]
    pub time_gmt: Option<NaiveDateTime>,
    #[serde(rename = "Phone")]
    pub phone: Option<String>,
    #[serde(rename = "Organization")]
    pub organization: Option<String>,
    #[serde(rename = "OLF")]
    pub olf: Option<String>,
    #[serde(rename = "Rating")]
    pub rating: f64,
    #[serde(rename = "NumberReview")]
    pub number_review: i64,
    #[serde(rename = "Category")]
    pub category: Option<String>,
    #[serde(rename = "Country")]
    pub country: Option<String>,
    #[serde(rename = "CountryCode")]
    pub country_code: Option<String>,
    #[serde(rename = "State")]
    pub state: Option<String>,
    #[serde(rename = "City")]
    pub city: Option<String>,
    #[serde(rename = "Street")]
    pub street: Option<String>,
    #[serde(rename = "Building")]
    pub building: Option<String>,
}

impl CleanRecord {
    /// Grouping key for a dimension (may be null or empty)
    pub fn key(&self, dimension: Dimension) -> Option<&str> {
        match dimension {
            Dimension::City => self.city.as_deref(),
            Dimension::State => self.state.as_deref(),
        }
    }
}

/// Grouping dimension for aggregation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dimension {
    City,
    State,
}

impl Dimension {
    pub const ALL: [Dimension; 2] = [Dimension::City, Dimension::State];

    /// Clean-schema field holding the grouping key
    pub fn field(self) -> Field {
        match self {
            Dimension::City => Field::City,
            Dimension::State => Field::State,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Dimension::City => "city",
            Dimension::State => "state",
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Dimension {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "city" => Ok(Dimension::City),
            "state" => Ok(Dimension::State),
            other => Err(format!("Unknown dimension: {}", other)),
        }
    }
}

/// Per-group statistics for one dimension
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateRecord {
    /// City or state name (never null or empty)
    pub key: String,
    /// Arithmetic mean of Rating across the group
    pub avg_rating: f64,
    /// Number of clean records in the group
    pub count: i64,
}
