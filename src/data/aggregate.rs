use std::cmp::Ordering;
use std::collections::BTreeMap;

use super::model::{FieldId, RecordSet};

/// Label of the synthetic leading bucket. A real value spelled like this
/// label, or like `MISSING_LABEL`, is shown quoted; see `value_label`.
pub const ALL_LABEL: &str = "All";

/// Label of the bucket counting records without a value.
pub const MISSING_LABEL: &str = "(none)";

// ---------------------------------------------------------------------------
// Buckets
// ---------------------------------------------------------------------------

/// What selecting a bucket in a filter control means.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BucketValue {
    /// No constraint.
    All,
    /// Records without a value. Shown for completeness, not selectable:
    /// absent values never match a criterion.
    Missing,
    Value(String),
}

impl BucketValue {
    /// The criterion value a control should emit for this bucket.
    /// `None` for buckets that cannot be selected as a constraint.
    pub fn criterion_value(&self) -> Option<&str> {
        match self {
            BucketValue::Value(v) => Some(v.as_str()),
            BucketValue::All | BucketValue::Missing => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bucket {
    pub label: String,
    pub count: usize,
    pub value: BucketValue,
}

/// Label/count buckets for one field, `All` first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrequencyDistribution {
    pub field: FieldId,
    pub buckets: Vec<Bucket>,
}

impl FrequencyDistribution {
    /// Buckets after `All`.
    pub fn values(&self) -> &[Bucket] {
        self.buckets.get(1..).unwrap_or(&[])
    }
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

/// Distribution of `field` over every record in `set`.
///
/// Records without a value land in a trailing `(none)` bucket so the value
/// buckets always add up to the `All` count.
pub fn distribution(set: &RecordSet, field: FieldId) -> FrequencyDistribution {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    let mut missing = 0usize;
    for record in set.records() {
        match record.field(field) {
            Some(label) => *counts.entry(label).or_default() += 1,
            None => missing += 1,
        }
    }

    let mut labelled: Vec<(String, usize)> = counts.into_iter().collect();
    labelled.sort_by(|(a, _), (b, _)| compare_labels(a, b));

    let mut buckets = Vec::with_capacity(labelled.len() + 2);
    buckets.push(Bucket {
        label: ALL_LABEL.to_string(),
        count: set.len(),
        value: BucketValue::All,
    });
    buckets.extend(labelled.into_iter().map(|(value, count)| Bucket {
        label: value_label(&value),
        value: BucketValue::Value(value),
        count,
    }));
    if missing > 0 {
        buckets.push(Bucket {
            label: MISSING_LABEL.to_string(),
            count: missing,
            value: BucketValue::Missing,
        });
    }

    FrequencyDistribution { field, buckets }
}

/// Display label of a real value, quoted when it would read as a synthetic bucket.
pub fn value_label(value: &str) -> String {
    if value == ALL_LABEL || value == MISSING_LABEL {
        format!("\"{value}\"")
    } else {
        value.to_string()
    }
}

/// Distributions for every filterable field, in panel order.
pub fn all_distributions(set: &RecordSet) -> Vec<FrequencyDistribution> {
    FieldId::ALL
        .iter()
        .map(|&field| distribution(set, field))
        .collect()
}

/// String order, except that two integer labels compare numerically and
/// integers sort before text. Keeps `"999"` ahead of `"2006"`.
pub fn compare_labels(a: &str, b: &str) -> Ordering {
    match (a.parse::<i64>(), b.parse::<i64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y).then_with(|| a.cmp(b)),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}
