//! Input/output helpers.
//!
//! - CSV ingest + column-role resolution (`ingest`)
//! - clean/rejected CSV and summary JSON exports (`export`)
//! - GeoJSON point export (`geojson`)

pub mod export;
pub mod geojson;
pub mod ingest;

pub use export::*;
pub use geojson::*;
pub use ingest::*;
