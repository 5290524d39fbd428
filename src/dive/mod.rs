//! Dive log import and decompression schedule labelling.
//!
//! Two paths share the gas physics: importing a recorded dive log into a
//! derived stop schedule, and validating a user stop schedule into exposure
//! figures and a printable label.

mod catalog;
mod exposure;
mod gas_usage;
mod import;
mod label;
mod models;
mod physics;
mod routes;
mod segments;
mod timeline;
mod tokens;
mod tree;
mod validator;

pub use import::{ImportError, ImportOptions};
pub use routes::router;
pub use segments::SegmentOptions;
pub use validator::RequestError;
