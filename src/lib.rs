//! Core library for `geoseed`: compiles hierarchical geographic JSON
//! datasets into a PostgreSQL seed script.
//!
//! The binary in `main.rs` wires these modules to the CLI; everything here is
//! usable without touching the filesystem except [`loader`] and [`util`].

pub mod compile;
pub mod loader;
pub mod model;
pub mod sanitize;
pub mod schema;
pub mod util;
