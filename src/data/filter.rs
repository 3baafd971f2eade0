use super::model::{FieldId, NormalizedRecord, RecordSet};

// ---------------------------------------------------------------------------
// Filter criteria: one optional selected value per field
// ---------------------------------------------------------------------------

/// A single equality constraint. `value == None` means "no constraint".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterCriterion {
    pub field: FieldId,
    pub value: Option<String>,
}

impl FilterCriterion {
    pub fn unset(field: FieldId) -> Self {
        Self { field, value: None }
    }

    pub fn equals(field: FieldId, value: impl Into<String>) -> Self {
        Self {
            field,
            value: Some(value.into()),
        }
    }

    pub fn is_active(&self) -> bool {
        self.value.is_some()
    }

    /// Unset criteria match everything. A record without the field never
    /// matches a set value.
    pub fn matches(&self, record: &NormalizedRecord) -> bool {
        match &self.value {
            None => true,
            Some(wanted) => record.field(self.field).is_some_and(|v| v == *wanted),
        }
    }
}

/// One criterion per filterable field, all unset.
pub fn init_criteria() -> Vec<FilterCriterion> {
    FieldId::ALL.iter().copied().map(FilterCriterion::unset).collect()
}

// ---------------------------------------------------------------------------
// FilteredView: indices into the record set
// ---------------------------------------------------------------------------

/// Indices of the records passing a set of criteria, in record set order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilteredView {
    indices: Vec<usize>,
}

impl FilteredView {
    /// Every record of `set`.
    pub fn all(set: &RecordSet) -> Self {
        Self {
            indices: (0..set.len()).collect(),
        }
    }

    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// The records of the view, resolved against `set`.
    pub fn records<'a>(
        &'a self,
        set: &'a RecordSet,
    ) -> impl Iterator<Item = &'a NormalizedRecord> + 'a {
        self.indices.iter().filter_map(move |&i| set.get(i))
    }
}

fn passes(record: &NormalizedRecord, criteria: &[FilterCriterion]) -> bool {
    criteria.iter().all(|c| c.matches(record))
}

/// Records of `set` that satisfy every criterion (conjunction).
pub fn evaluate(set: &RecordSet, criteria: &[FilterCriterion]) -> FilteredView {
    FilteredView {
        indices: set
            .records()
            .iter()
            .enumerate()
            .filter(|(_, record)| passes(record, criteria))
            .map(|(i, _)| i)
            .collect(),
    }
}
