/// Data layer: core types, loading, filtering and projections.
///
/// Architecture:
/// ```text
///  .parquet / .json / .csv
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → Dataset (age coerced, kinds inferred)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  catalog  │  table id → Arc<Dataset>, loaded once
///   └──────────┘
///        │
///        ▼
///   ┌────────────────────┐
///   │ filter / projection │  criteria → rows, rankings, normalized series
///   └────────────────────┘
/// ```

pub mod catalog;
pub mod filter;
pub mod loader;
pub mod model;
pub mod projection;
