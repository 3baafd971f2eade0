use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer};
use serde_json::Value as JsonValue;

use super::normalize::{normalize, NormalizeOptions};

// ---------------------------------------------------------------------------
// AttributeValue – a single attribute of a feature
// ---------------------------------------------------------------------------

/// A loosely-typed attribute value as delivered by the feed.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeValue::String(s) => write!(f, "{s}"),
            AttributeValue::Integer(i) => write!(f, "{i}"),
            AttributeValue::Float(v) => write!(f, "{v}"),
            AttributeValue::Bool(b) => write!(f, "{b}"),
            AttributeValue::Null => Ok(()),
        }
    }
}

impl AttributeValue {
    /// The value as filter/label text. `Null` and empty strings count as absent.
    pub fn as_label(&self) -> Option<String> {
        match self {
            AttributeValue::Null => None,
            AttributeValue::String(s) if s.trim().is_empty() => None,
            other => Some(other.to_string()),
        }
    }
}

impl From<&JsonValue> for AttributeValue {
    fn from(val: &JsonValue) -> Self {
        match val {
            JsonValue::String(s) => AttributeValue::String(s.clone()),
            JsonValue::Number(n) => {
                if let Some(i) = n.as_i64() {
                    AttributeValue::Integer(i)
                } else if let Some(f) = n.as_f64() {
                    AttributeValue::Float(f)
                } else {
                    AttributeValue::String(n.to_string())
                }
            }
            JsonValue::Bool(b) => AttributeValue::Bool(*b),
            JsonValue::Null => AttributeValue::Null,
            other => AttributeValue::String(other.to_string()),
        }
    }
}

impl<'de> Deserialize<'de> for AttributeValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let json = JsonValue::deserialize(deserializer)?;
        Ok(AttributeValue::from(&json))
    }
}

// ---------------------------------------------------------------------------
// RawFeature – one element of the feed's `features` array
// ---------------------------------------------------------------------------

/// Point geometry in feed order: `x` is longitude, `y` is latitude.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct RawGeometry {
    #[serde(default = "nan", deserialize_with = "lenient_f64")]
    pub x: f64,
    #[serde(default = "nan", deserialize_with = "lenient_f64")]
    pub y: f64,
}

impl Default for RawGeometry {
    fn default() -> Self {
        Self {
            x: f64::NAN,
            y: f64::NAN,
        }
    }
}

fn nan() -> f64 {
    f64::NAN
}

/// Accepts numbers, numeric strings (including `"NaN"`) and `null`.
/// Anything that is not a number ends up as NaN rather than an error.
fn lenient_f64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    let val = JsonValue::deserialize(deserializer)?;
    Ok(match val {
        JsonValue::Number(n) => n.as_f64().unwrap_or(f64::NAN),
        JsonValue::String(s) => s.trim().parse::<f64>().unwrap_or(f64::NAN),
        _ => f64::NAN,
    })
}

fn lenient_geometry<'de, D: Deserializer<'de>>(deserializer: D) -> Result<RawGeometry, D::Error> {
    let geometry = Option::<RawGeometry>::deserialize(deserializer)?;
    Ok(geometry.unwrap_or_default())
}

/// A feature exactly as fetched. Never mutated after loading.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawFeature {
    #[serde(default, deserialize_with = "lenient_geometry")]
    pub geometry: RawGeometry,
    #[serde(default)]
    pub attributes: BTreeMap<String, AttributeValue>,
}

/// Top-level feed document: `{ "features": [...] }`.
#[derive(Debug, Clone, Deserialize)]
pub struct FeatureCollection {
    pub features: Vec<RawFeature>,
}

// ---------------------------------------------------------------------------
// LatLng / FieldId
// ---------------------------------------------------------------------------

/// A valid (finite) map coordinate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

/// The filterable fields. Each one has a fixed accessor, see [`NormalizedRecord::field`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FieldId {
    Type,
    Year,
    Title,
    Site,
}

impl FieldId {
    /// Fields in the order the filter panel shows them.
    pub const ALL: [FieldId; 4] = [FieldId::Type, FieldId::Year, FieldId::Title, FieldId::Site];

    pub fn label(self) -> &'static str {
        match self {
            FieldId::Type => "Type",
            FieldId::Year => "Year",
            FieldId::Title => "Title",
            FieldId::Site => "Site",
        }
    }

    /// Feed attribute backing this field, `None` for derived fields.
    pub fn attribute(self) -> Option<&'static str> {
        match self {
            FieldId::Type => Some("Type"),
            FieldId::Title => Some("Title"),
            FieldId::Site => Some("Site"),
            FieldId::Year => None,
        }
    }
}

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// NormalizedRecord – a feature plus its derived fields
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedRecord {
    pub raw: RawFeature,
    /// `None` when either geometry component is not a finite number.
    pub coordinate: Option<LatLng>,
    /// UTC calendar year of the configured date attribute.
    pub year: Option<i32>,
}

impl NormalizedRecord {
    /// Typed accessor: the value of `field` as filter text.
    pub fn field(&self, field: FieldId) -> Option<String> {
        match field {
            FieldId::Year => self.year.map(|y| y.to_string()),
            FieldId::Type | FieldId::Title | FieldId::Site => field
                .attribute()
                .and_then(|name| self.raw.attributes.get(name))
                .and_then(AttributeValue::as_label),
        }
    }
}

// ---------------------------------------------------------------------------
// RecordSet – the complete loaded feed
// ---------------------------------------------------------------------------

/// All records in feed order. Derived fields are computed once, here.
#[derive(Debug, Clone, Default)]
pub struct RecordSet {
    records: Vec<NormalizedRecord>,
}

impl RecordSet {
    /// Normalize every feature.
    pub fn from_features(features: Vec<RawFeature>, options: &NormalizeOptions) -> Self {
        let records = features
            .into_iter()
            .map(|raw| normalize(raw, options))
            .collect();
        RecordSet { records }
    }

    pub fn records(&self) -> &[NormalizedRecord] {
        &self.records
    }

    pub fn get(&self, index: usize) -> Option<&NormalizedRecord> {
        self.records.get(index)
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the record set is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records whose geometry did not yield a coordinate.
    pub fn missing_coordinates(&self) -> usize {
        self.records.iter().filter(|r| r.coordinate.is_none()).count()
    }
}
