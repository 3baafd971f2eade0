use std::fmt;

use thiserror::Error;

use crate::data::aggregate::{all_distributions, FrequencyDistribution};
use crate::data::filter::{evaluate, init_criteria, FilterCriterion, FilteredView};
use crate::data::loader::{FeedError, FeedFetch, FeedSource};
use crate::data::model::{FieldId, RawFeature, RecordSet};
use crate::data::normalize::NormalizeOptions;
use crate::data::projection::project_view;
use crate::heatmap::HeatmapRenderer;

// ---------------------------------------------------------------------------
// Session phases
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Uninitialized,
    /// A fetch was issued. A failed fetch leaves the session here.
    Loading,
    Ready,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Uninitialized => "uninitialized",
            Phase::Loading => "loading",
            Phase::Ready => "ready",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("the feed can only be fetched once per session (session is {0})")]
    AlreadyStarted(Phase),
    #[error("no feed load is pending (session is {0})")]
    NotLoading(Phase),
    #[error("filters need loaded data (session is {0})")]
    NotReady(Phase),
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// One viewing session: the loaded records, the active filters, and the
/// renderer that receives the filtered coordinates.
pub struct AppState<R: HeatmapRenderer> {
    phase: Phase,
    options: NormalizeOptions,
    source: Option<FeedSource>,
    fetch: Option<FeedFetch>,

    /// All records, in feed order.
    records: RecordSet,
    /// One distribution per filterable field, computed on load.
    distributions: Vec<FrequencyDistribution>,
    /// One criterion per filterable field.
    criteria: Vec<FilterCriterion>,
    /// Records passing `criteria`.
    view: FilteredView,

    renderer: R,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl<R: HeatmapRenderer> AppState<R> {
    pub fn new(options: NormalizeOptions, renderer: R) -> Self {
        Self {
            phase: Phase::Uninitialized,
            options,
            source: None,
            fetch: None,
            records: RecordSet::default(),
            distributions: Vec::new(),
            criteria: init_criteria(),
            view: FilteredView::default(),
            renderer,
            status_message: None,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn source(&self) -> Option<&FeedSource> {
        self.source.as_ref()
    }

    pub fn records(&self) -> &RecordSet {
        &self.records
    }

    pub fn view(&self) -> &FilteredView {
        &self.view
    }

    pub fn distributions(&self) -> &[FrequencyDistribution] {
        &self.distributions
    }

    pub fn criteria(&self) -> &[FilterCriterion] {
        &self.criteria
    }

    /// Selected value for `field`, `None` when unconstrained.
    pub fn selected(&self, field: FieldId) -> Option<&str> {
        self.criteria
            .iter()
            .find(|c| c.field == field)
            .and_then(|c| c.value.as_deref())
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    // -- Loading --

    /// Start fetching the feed on a worker thread. Allowed once per session.
    pub fn begin_load<F>(&mut self, source: FeedSource, notify: F) -> Result<(), SessionError>
    where
        F: FnOnce() + Send + 'static,
    {
        if self.phase != Phase::Uninitialized {
            return Err(SessionError::AlreadyStarted(self.phase));
        }
        log::info!("Loading feed from {source}");
        self.fetch = Some(FeedFetch::spawn(source.clone(), notify));
        self.source = Some(source);
        self.phase = Phase::Loading;
        self.status_message = None;
        Ok(())
    }

    /// Pick up the fetch result if it arrived. Returns whether it did.
    pub fn poll_load(&mut self) -> bool {
        let Some(result) = self.fetch.as_ref().and_then(FeedFetch::poll) else {
            return false;
        };
        self.fetch = None;
        if let Err(err) = self.finish_load(result) {
            log::warn!("{err}");
        }
        true
    }

    /// Apply the outcome of the fetch. On failure the session stays `Loading`.
    pub fn finish_load(
        &mut self,
        result: Result<Vec<RawFeature>, FeedError>,
    ) -> Result<(), SessionError> {
        if self.phase != Phase::Loading {
            return Err(SessionError::NotLoading(self.phase));
        }
        match result {
            Ok(features) => {
                self.set_features(features);
                Ok(())
            }
            Err(err) => {
                log::error!("Failed to load feed: {err}");
                self.status_message = Some(format!("Error: {err}"));
                Ok(())
            }
        }
    }

    /// Normalize, aggregate, show everything.
    fn set_features(&mut self, features: Vec<RawFeature>) {
        self.records = RecordSet::from_features(features, &self.options);
        self.distributions = all_distributions(&self.records);
        self.criteria = init_criteria();
        self.phase = Phase::Ready;
        self.status_message = None;
        if self.records.is_empty() {
            log::warn!("Feed contained no features");
        }
        log::info!(
            "Loaded {} film locations ({} without coordinates)",
            self.records.len(),
            self.records.missing_coordinates()
        );
        self.refilter();
    }

    // -- Filtering --

    /// Constrain `field` to `value`, or lift the constraint with `None`.
    pub fn set_filter(&mut self, field: FieldId, value: Option<String>) -> Result<(), SessionError> {
        if self.phase != Phase::Ready {
            return Err(SessionError::NotReady(self.phase));
        }
        match self.criteria.iter_mut().find(|c| c.field == field) {
            Some(criterion) => criterion.value = value,
            None => self.criteria.push(FilterCriterion { field, value }),
        }
        self.refilter();
        Ok(())
    }

    /// Lift every constraint.
    pub fn clear_filters(&mut self) -> Result<(), SessionError> {
        if self.phase != Phase::Ready {
            return Err(SessionError::NotReady(self.phase));
        }
        self.criteria = init_criteria();
        self.refilter();
        Ok(())
    }

    /// Recompute the view from scratch and push its points to the renderer.
    fn refilter(&mut self) {
        self.view = evaluate(&self.records, &self.criteria);
        let points = project_view(&self.records, &self.view);
        log::debug!(
            "Filter {:?}: {} records, {} points",
            self.criteria
                .iter()
                .filter(|c| c.is_active())
                .map(|c| (c.field, c.value.as_deref().unwrap_or_default()))
                .collect::<Vec<_>>(),
            self.view.len(),
            points.len()
        );
        self.renderer.set_points(points);
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::mpsc;
    use std::time::Duration;

    use super::*;
    use crate::data::loader::parse_feed;
    use crate::data::model::LatLng;

    #[derive(Default)]
    struct RecordingRenderer {
        calls: Vec<Vec<LatLng>>,
    }

    impl HeatmapRenderer for RecordingRenderer {
        fn set_points(&mut self, points: Vec<LatLng>) {
            self.calls.push(points);
        }
    }

    const FEED: &str = r#"{"features":[
        {"geometry":{"x":-106.6,"y":35.1},
         "attributes":{"Type":"Feature Film","Title":"A","ShootDate":1136073600000}},
        {"geometry":{"x":"NaN","y":"NaN"},
         "attributes":{"Type":"TV","Title":"B","ShootDate":1420070400000}}
    ]}"#;

    fn loading_state() -> AppState<RecordingRenderer> {
        let mut state = AppState::new(NormalizeOptions::default(), RecordingRenderer::default());
        // Skip the worker thread: jump straight to Loading.
        state.phase = Phase::Loading;
        state
    }

    fn ready_state() -> AppState<RecordingRenderer> {
        let mut state = loading_state();
        state.finish_load(parse_feed(FEED)).unwrap();
        state
    }

    #[test]
    fn load_normalizes_aggregates_and_renders_everything() {
        let state = ready_state();
        assert_eq!(state.phase(), Phase::Ready);
        assert_eq!(state.records().len(), 2);

        let a = state.records().get(0).unwrap();
        let c = a.coordinate.unwrap();
        assert!((c.lat - 35.1).abs() < 1e-9);
        assert!((c.lng + 106.6).abs() < 1e-9);
        assert_eq!(a.year, Some(2006));

        let b = state.records().get(1).unwrap();
        assert_eq!(b.coordinate, None);
        assert_eq!(b.year, Some(2015));

        let types = &state.distributions()[0];
        assert_eq!(types.field, FieldId::Type);
        let labels: Vec<(&str, usize)> = types
            .buckets
            .iter()
            .map(|b| (b.label.as_str(), b.count))
            .collect();
        assert_eq!(labels, vec![("All", 2), ("Feature Film", 1), ("TV", 1)]);

        assert_eq!(state.view().len(), 2);
        assert_eq!(state.renderer().calls.len(), 1);
        assert_eq!(state.renderer().calls[0].len(), 1);
    }

    #[test]
    fn filter_change_recomputes_and_notifies_renderer() {
        let mut state = ready_state();
        state
            .set_filter(FieldId::Type, Some("TV".to_string()))
            .unwrap();
        assert_eq!(state.view().indices(), &[1]);
        assert_eq!(state.selected(FieldId::Type), Some("TV"));
        // Record B has no coordinate.
        assert!(state.renderer().calls.last().unwrap().is_empty());

        state.set_filter(FieldId::Type, None).unwrap();
        assert_eq!(state.view().len(), 2);
        assert_eq!(state.renderer().calls.len(), 3);
    }

    #[test]
    fn filters_combine_and_clear() {
        let mut state = ready_state();
        state
            .set_filter(FieldId::Year, Some("2006".to_string()))
            .unwrap();
        state
            .set_filter(FieldId::Type, Some("TV".to_string()))
            .unwrap();
        assert!(state.view().is_empty());

        state.clear_filters().unwrap();
        assert_eq!(state.view().len(), 2);
        assert!(state.criteria().iter().all(|c| !c.is_active()));
    }

    #[test]
    fn empty_feed_is_ready_with_nothing_to_draw() {
        let mut state = loading_state();
        state.finish_load(parse_feed(r#"{"features":[]}"#)).unwrap();
        assert_eq!(state.phase(), Phase::Ready);
        assert!(state.records().is_empty());
        assert!(state.view().is_empty());
        assert_eq!(state.renderer().calls, vec![Vec::<LatLng>::new()]);
    }

    #[test]
    fn failed_fetch_stays_loading() {
        let mut state = loading_state();
        state.finish_load(parse_feed("{oops")).unwrap();
        assert_eq!(state.phase(), Phase::Loading);
        assert!(state.status_message.as_deref().unwrap().starts_with("Error:"));
        assert!(state.renderer().calls.is_empty());
        assert_eq!(
            state.set_filter(FieldId::Type, None),
            Err(SessionError::NotReady(Phase::Loading))
        );
    }

    #[test]
    fn only_one_fetch_per_session() {
        let mut state = ready_state();
        let source = FeedSource::Path("unused.json".into());
        assert_eq!(
            state.begin_load(source, || {}),
            Err(SessionError::AlreadyStarted(Phase::Ready))
        );
        assert_eq!(
            state.finish_load(Ok(Vec::new())),
            Err(SessionError::NotLoading(Phase::Ready))
        );
    }

    #[test]
    fn filters_rejected_before_load() {
        let mut state = AppState::new(NormalizeOptions::default(), RecordingRenderer::default());
        assert_eq!(
            state.clear_filters(),
            Err(SessionError::NotReady(Phase::Uninitialized))
        );
        assert!(!state.poll_load());
    }

    #[test]
    fn background_load_reaches_ready() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(FEED.as_bytes()).unwrap();

        let mut state = AppState::new(NormalizeOptions::default(), RecordingRenderer::default());
        let (tx, rx) = mpsc::channel();
        state
            .begin_load(FeedSource::Path(file.path().to_path_buf()), move || {
                let _ = tx.send(());
            })
            .unwrap();
        assert_eq!(state.phase(), Phase::Loading);

        rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert!(state.poll_load());
        assert_eq!(state.phase(), Phase::Ready);
        assert_eq!(state.records().len(), 2);
        assert!(!state.poll_load());
    }
}
