/// Data layer: core types, loading, and render filtering.
///
/// Architecture:
/// ```text
///  IBTrACS-style .csv
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse + clean rows → StormDataset
///   └──────────┘
///        │
///        ▼
///   ┌──────────────┐
///   │ StormDataset  │  Vec<StormTrack>, observation time span
///   └──────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  per-frame predicates (min wind, canvas bounds)
///   └──────────┘
/// ```

pub mod loader;
pub mod model;
pub mod filter;
