/// Data layer: core types, loading, cleaning and filtering.
///
/// Architecture:
/// ```text
///  .csv / .tsv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → RawTable
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ pipeline  │  normalize names, coerce, drop, bucket → ListingTable
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  selected year buckets → FilteredView
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ histogram │  equal-width bins for the charts
///   └───────────┘
/// ```

pub mod filter;
pub mod histogram;
pub mod loader;
pub mod model;
pub mod pipeline;
