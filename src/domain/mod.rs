//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the input shape handed over by the CSV collaborator (`RawRecord`)
//! - parsed and validated coordinates (`NumericCoordinate`, `GeoPoint`)
//! - the two terminal outputs (`NormalizedRecord`, `RejectedRecord`)

pub mod types;

pub use types::*;
