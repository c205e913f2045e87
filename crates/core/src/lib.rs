//! Core utilities for droidsign
//!
//! This crate provides shared functionality used by the Android crate and the CLI:
//!
//! - **Error handling**: Structured errors with codes, context, and recovery suggestions
//! - **Configuration**: TOML-based configuration discovery and loading
//! - **Validation**: Fluent validation that collects errors and warnings
//!
//! # Example
//!
//! ```rust,no_run
//! use droidsign_core::config::{load_toml, GeneralConfig};
//! use std::path::Path;
//!
//! let loaded = load_toml::<GeneralConfig>(None, &["droidsign.toml"], Path::new("."))
//!     .expect("config should parse");
//! println!("project: {}", loaded.value.project_name);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod validation;

pub use error::{Error, ErrorCode, Result};
