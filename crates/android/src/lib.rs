//! Android signing and packaging configuration for droidsign
//!
//! This crate provides:
//! - A parser for `key.properties` style key/value files
//! - The signing configuration resolver
//! - Typed static build parameters (SDK bounds, ABI filters, build types)
//! - The packaging plan handed to the external packaging step
//!
//! # Example
//!
//! ```rust,no_run
//! use droidsign_android::signing::SigningConfigResolver;
//! use std::path::Path;
//!
//! let resolver = SigningConfigResolver::new("android/app");
//! let config = resolver.resolve(Path::new("android/key.properties"))?;
//! if !config.is_complete() {
//!     eprintln!("missing: {:?}", config.missing_fields());
//! }
//! # Ok::<(), droidsign_android::error::SigningError>(())
//! ```

#![warn(missing_docs)]

pub mod build_config;
pub mod error;
pub mod packaging;
pub mod project;
pub mod properties;
pub mod signing;

pub use error::{Result, SigningError};
pub use packaging::PackagingPlan;
pub use project::ProjectConfig;
pub use properties::SigningProperties;
pub use signing::{PropertiesOrigin, SigningConfig, SigningConfigResolver, SigningSummary};
