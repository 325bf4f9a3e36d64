/// Data layer: core types, loading, filtering and aggregation.
///
/// Architecture:
/// ```text
///  .csv / .tsv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐     ┌──────────────┐
///   │  loader   │ ◄── │ DatasetCache │  path → Arc<Dataset>, read once
///   └──────────┘     └──────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ Dataset  │  rows of CellValue, column index, FeatureSet
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  team + year predicates → FilteredView
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ pipeline  │  metrics, per-team groupings, describe()
///   └──────────┘
/// ```

pub mod cache;
pub mod error;
pub mod filter;
pub mod loader;
pub mod model;
pub mod pipeline;
pub mod schema;
pub mod stats;
