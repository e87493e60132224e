/// Data layer: loading, cleaning, filtering and aggregation.
///
/// Architecture:
/// ```text
///  2009.xlsx  2010.xlsx  …   (.xlsx / .csv / .parquet)
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  read each file, stack rows → RawTable
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  clean    │  typed SalesRecords, dedupe, fix spellings, clamp, impute
///   └──────────┘
///        │                         ┌──────────┐
///        ├────────────────────────▶│ snapshot  │  cleaned_data.csv
///        ▼                         └──────────┘
///   ┌──────────┐
///   │  filter   │  year range ∧ regions ∧ categories → SalesView
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  metrics  │  KPIs + nine chart series
///   └──────────┘
/// ```

pub mod clean;
pub mod filter;
pub mod loader;
pub mod metrics;
pub mod model;
pub mod pipeline;
pub mod snapshot;
