/// Data layer: core types, loading, and filtering.
///
/// Architecture:
/// ```text
///  URL / .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  fetch + parse → Dataset (memoized per source)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  Dataset  │  Vec<CaseRecord>, disease/region/year index
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  disease ∧ region ∧ year predicates → filtered Dataset
///   └──────────┘
/// ```

pub mod loader;
pub mod model;
pub mod filter;
