//! Engine capability descriptors for the engine manager.
//!
//! This crate owns the `config.yml` format that every installed transpiler
//! engine must carry in its `lib` directory. The installer verifies the file
//! exists after an install; the discovery layer parses it to answer
//! capability queries.

pub mod descriptor;
pub mod error;

/// The canonical filename for engine descriptors.
///
/// Engines must place a file with this name at the root of their payload
/// (the `lib` directory) so the manager can discover them.
pub const DESCRIPTOR_FILENAME: &str = "config.yml";

pub use descriptor::{ALL_DIALECTS, ConfigOption, EngineDescriptor, PromptMethod};
pub use error::{Error, Result};
