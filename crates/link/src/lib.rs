//! `gamestock-link`: game, ratings and market-data linking engine.
//!
//! Pure engine crate: receives pre-loaded records, returns linked results.
//! Loaders for the JSON and CSV input shapes live in [`load`]; reading files
//! is left to the caller.

pub mod align;
pub mod config;
pub mod engine;
pub mod error;
pub mod load;
pub mod matcher;
pub mod model;
pub mod normalize;
pub mod similarity;
pub mod summary;

pub use config::LinkConfig;
pub use engine::run;
pub use error::LinkError;
pub use model::{LinkInput, LinkResult, LinkedRecord};
