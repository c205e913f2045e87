//! Configuration loading and shared schema sections
//!
//! Shared configuration types used by every droidsign tool.

mod loader;
mod schema;

pub use loader::{find_config_file, load_toml, Loaded, DEFAULT_CANDIDATES};
pub use schema::*;
