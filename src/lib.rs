//! `aerodromes` library crate.
//!
//! The binary (`aero`) is a thin wrapper around this library so that:
//!
//! - the normalization core is testable without spawning processes
//! - the pipeline can be embedded by other tools (map renderers, notebooks)
//! - code stays easy to navigate as the project grows

pub mod app;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod io;
pub mod logging;
pub mod normalize;
pub mod report;
