/// Data layer: core types, parsing, filtering and cross-filter options.
///
/// Architecture:
/// ```text
///   named source / file
///        │
///        ▼
///   ┌──────────┐
///   │  source   │  fetch raw text (worker thread)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse text → Vec<Row>, infer schema → Dataset
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  apply Selection → filtered row indices
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  options  │  per column: values reachable under the other filters
///   └──────────┘
/// ```

pub mod filter;
pub mod loader;
pub mod model;
pub mod options;
pub mod source;
