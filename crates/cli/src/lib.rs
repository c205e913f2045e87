//! Terminal output utilities for droidsign
//!
//! Provides status messages and small formatting helpers shared by the binary.

#![warn(missing_docs)]

pub mod output;
