/// Data layer: schema, loading, cascading filters and aggregation.
///
/// Architecture:
/// ```text
///  remote URL / local .csv
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  validate header → Dataset
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  Dataset  │  Vec<SurveyRecord>, distinct values per Column
///   └──────────┘
///        │
///        ▼
///   ┌──────────────────┐
///   │ cascade + filter  │  Selection, RecordFilter → matching indices
///   └──────────────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ aggregate  │  counts / sums / cross tabs / record rows
///   └───────────┘
/// ```

pub mod aggregate;
pub mod cascade;
pub mod filter;
pub mod loader;
pub mod model;
pub mod schema;
