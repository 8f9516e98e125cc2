/// Data layer: core types, loading, filtering, and analysis.
///
/// Architecture:
/// ```text
///  .csv + .metadata.json (folder or URL)
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  fetch → normalize rows → drop invalid → records
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  Record   │  entity, year, semantic fields
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  year range → subset + average/progress tables
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ analysis  │  summary, per-entity change, correlation
///   └──────────┘
/// ```

pub mod analysis;
pub mod filter;
pub mod loader;
pub mod model;
pub mod normalize;
