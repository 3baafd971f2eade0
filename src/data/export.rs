use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

use super::filter::FilteredView;
use super::model::{FieldId, RecordSet};

const HEADER: [&str; 6] = ["Title", "Type", "Site", "Year", "Latitude", "Longitude"];

/// Write the records of `view` as CSV, one row per record in view order.
pub fn write_csv<W: Write>(writer: W, set: &RecordSet, view: &FilteredView) -> Result<usize> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(HEADER).context("writing CSV header")?;

    let mut rows = 0;
    for record in view.records(set) {
        let (lat, lng) = record
            .coordinate
            .map(|c| (c.lat.to_string(), c.lng.to_string()))
            .unwrap_or_default();
        csv.write_record([
            record.field(FieldId::Title).unwrap_or_default(),
            record.field(FieldId::Type).unwrap_or_default(),
            record.field(FieldId::Site).unwrap_or_default(),
            record.field(FieldId::Year).unwrap_or_default(),
            lat,
            lng,
        ])
        .with_context(|| format!("writing CSV row {rows}"))?;
        rows += 1;
    }
    csv.flush().context("flushing CSV")?;
    Ok(rows)
}

/// Export `view` to a CSV file at `path`.
pub fn export_csv(path: &Path, set: &RecordSet, view: &FilteredView) -> Result<usize> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("creating {}", path.display()))?;
    write_csv(file, set, view)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::data::filter::{evaluate, FilterCriterion};
    use crate::data::model::{AttributeValue, RawFeature, RawGeometry};
    use crate::data::normalize::NormalizeOptions;

    fn record_set() -> RecordSet {
        let mut a = BTreeMap::new();
        a.insert("Title".to_string(), AttributeValue::String("Breaking, Bad".into()));
        a.insert("Type".to_string(), AttributeValue::String("TV".into()));
        a.insert("ShootDate".to_string(), AttributeValue::Integer(1_136_073_600_000));
        let mut b = BTreeMap::new();
        b.insert("Title".to_string(), AttributeValue::String("Other".into()));
        b.insert("Type".to_string(), AttributeValue::String("TV".into()));
        let features = vec![
            RawFeature {
                geometry: RawGeometry { x: -106.5, y: 35.25 },
                attributes: a,
            },
            RawFeature {
                geometry: RawGeometry::default(),
                attributes: b,
            },
        ];
        RecordSet::from_features(features, &NormalizeOptions::default())
    }

    #[test]
    fn writes_view_rows_with_blank_missing_cells() {
        let set = record_set();
        let view = evaluate(&set, &[FilterCriterion::equals(FieldId::Type, "TV")]);
        let mut out = Vec::new();
        let rows = write_csv(&mut out, &set, &view).unwrap();
        assert_eq!(rows, 2);
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Title,Type,Site,Year,Latitude,Longitude");
        assert_eq!(lines[1], "\"Breaking, Bad\",TV,,2006,35.25,-106.5");
        assert_eq!(lines[2], "Other,TV,,,,");
    }

    #[test]
    fn exports_to_file() {
        let set = record_set();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("view.csv");
        let view = evaluate(&set, &[FilterCriterion::equals(FieldId::Title, "Other")]);
        assert_eq!(export_csv(&path, &set, &view).unwrap(), 1);
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().count(), 2);
    }
}
