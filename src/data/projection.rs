use super::filter::FilteredView;
use super::model::{LatLng, NormalizedRecord, RecordSet};

/// Coordinates of `records` in input order, skipping records without one.
pub fn heatmap_points<'a, I>(records: I) -> Vec<LatLng>
where
    I: IntoIterator<Item = &'a NormalizedRecord>,
{
    records.into_iter().filter_map(|r| r.coordinate).collect()
}

/// Coordinates of the records in `view`.
pub fn project_view(set: &RecordSet, view: &FilteredView) -> Vec<LatLng> {
    heatmap_points(view.records(set))
}
