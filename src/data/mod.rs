/// Data layer: feed loading, record normalization, aggregation and filtering.
///
/// Architecture:
/// ```text
///  file / ArcGIS query
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  JSON → Vec<RawFeature>  (background thread)
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ normalize  │  coordinate + year → RecordSet
///   └───────────┘
///        │
///        ├──────────────► aggregate   field → FrequencyDistribution
///        ▼
///   ┌──────────┐
///   │  filter   │  criteria → FilteredView
///   └──────────┘
///        │
///        ├──────────────► export      FilteredView → CSV
///        ▼
///   ┌────────────┐
///   │ projection  │  FilteredView → Vec<LatLng>
///   └────────────┘
/// ```

pub mod aggregate;
pub mod export;
pub mod filter;
pub mod loader;
pub mod model;
pub mod normalize;
pub mod projection;
