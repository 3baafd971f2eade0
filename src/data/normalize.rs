use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Utc};

use super::model::{AttributeValue, LatLng, NormalizedRecord, RawFeature, RawGeometry};

/// Attribute that carries the shoot date in the ABQ film locations feed.
pub const DEFAULT_DATE_ATTRIBUTE: &str = "ShootDate";

/// Settings for deriving record fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizeOptions {
    /// Attribute parsed as a date to derive the year.
    pub date_attribute: String,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            date_attribute: DEFAULT_DATE_ATTRIBUTE.to_string(),
        }
    }
}

/// Turn a raw feature into a record with derived coordinate and year.
pub fn normalize(raw: RawFeature, options: &NormalizeOptions) -> NormalizedRecord {
    let coordinate = derive_coordinate(&raw.geometry);
    let year = raw
        .attributes
        .get(&options.date_attribute)
        .and_then(derive_year);
    NormalizedRecord {
        raw,
        coordinate,
        year,
    }
}

/// `x` is longitude, `y` latitude. Both must be finite.
pub fn derive_coordinate(geometry: &RawGeometry) -> Option<LatLng> {
    if geometry.x.is_finite() && geometry.y.is_finite() {
        Some(LatLng {
            lat: geometry.y,
            lng: geometry.x,
        })
    } else {
        None
    }
}

/// UTC year of a date attribute.
///
/// Numbers are epoch milliseconds (the ArcGIS date encoding). Strings may hold
/// a bare four-digit year, epoch milliseconds (more than four digits), an
/// RFC 3339 timestamp, a zoneless `YYYY-MM-DDTHH:MM:SS` (read as UTC),
/// `YYYY-MM-DD` or `MM/DD/YYYY`.
pub fn derive_year(value: &AttributeValue) -> Option<i32> {
    match value {
        AttributeValue::Integer(ms) => year_from_millis(*ms),
        AttributeValue::Float(ms) if ms.is_finite() => year_from_millis(ms.floor() as i64),
        AttributeValue::String(s) => year_from_text(s.trim()),
        _ => None,
    }
}

fn year_from_millis(ms: i64) -> Option<i32> {
    DateTime::<Utc>::from_timestamp_millis(ms).map(|dt| dt.year())
}

fn year_from_text(text: &str) -> Option<i32> {
    if text.is_empty() {
        return None;
    }
    if text.bytes().all(|b| b.is_ascii_digit()) {
        return match text.len() {
            4 => text
                .parse::<i32>()
                .ok()
                .and_then(|year| NaiveDate::from_ymd_opt(year, 1, 1))
                .map(|date| date.year()),
            n if n > 4 => text.parse::<i64>().ok().and_then(year_from_millis),
            _ => None,
        };
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.naive_utc().year());
    }
    if let Some(dt) = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
    {
        return Some(dt.year());
    }
    ["%Y-%m-%d", "%m/%d/%Y"]
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
        .map(|date| date.year())
}
