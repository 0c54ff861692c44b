/// Data layer: core types, parsing, and fetching.
///
/// Architecture:
/// ```text
///   remote URL / local file
///        │
///        ▼
///   ┌──────────┐
///   │  fetch    │  one-shot GET on a worker thread
///   └──────────┘
///        │ text
///        ▼
///   ┌──────────┐
///   │  loader   │  schema-driven parse → Dataset (Measure per field)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  model    │  Dataset, Record, partition → Vec<Group>
///   └──────────┘
/// ```

pub mod fetch;
pub mod loader;
pub mod model;
