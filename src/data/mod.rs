/// Data layer: source records, loading, joins, filtering and aggregation.
///
/// Architecture:
/// ```text
///  six .csv / .parquet tables
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse files → RawDataset
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │   join    │  RawDataset → EnrichedViews (orders, items), built once
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  year / state / min review → matching rows
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ aggregate  │  group by category / state / period → ranked totals
///   └───────────┘
/// ```

pub mod aggregate;
pub mod filter;
pub mod join;
pub mod loader;
pub mod model;

#[cfg(test)]
pub mod fixtures;
