//! Domain logic for the form/checklist backend.
//!
//! This crate has no internal dependencies and holds everything that can be
//! expressed as pure functions over JSON documents: key normalization,
//! header resolution, legacy-shape unwrapping, file-document instantiation,
//! row flattening, and spreadsheet emission. The HTTP and persistence layers
//! live in `formdeck-api` and `formdeck-db`.

pub mod document;
pub mod error;
pub mod export;
pub mod flatten;
pub mod headers;
pub mod ids;
pub mod instantiate;
pub mod keys;
pub mod types;
