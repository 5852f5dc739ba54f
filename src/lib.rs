//! Desktop and command-line client for a legal-document analysis service.
//!
//! The upload workflow lives in [`upload`]; [`app`] and [`headless`] are the
//! two hosts that drive it.

pub mod analysis;
pub mod app;
pub mod config;
pub mod error;
pub mod headless;
pub mod upload;
pub mod utils;
