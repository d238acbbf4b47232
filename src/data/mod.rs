/// Data layer: core types, loading, classification and filtering.
///
/// Architecture:
/// ```text
///  .csv / .tsv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → Dataset (declared dtypes)
///   └──────────┘
///        │
///        ▼
///   ┌──────────────┐
///   │ DatasetStore  │  load-once base dataset, shared read-only
///   └──────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  apply FilterSpecs → filtered view (same schema)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ classify  │  dtype → ColumnRole, consumed by the analysis layer
///   └──────────┘
/// ```

#[cfg(test)]
pub mod arbitrary;
pub mod classify;
pub mod filter;
pub mod loader;
pub mod model;
pub mod profile;
pub mod store;
