#![forbid(unsafe_code)]

//! Core domain model and calculations for the mash water calculator.
//!
//! This crate provides:
//! - Domain types (parameters, result slots, rests, infusions)
//! - Infusion and loss equations
//! - The mash model and its recompute cascade
//! - Parameter store and result sink collaborators
//! - Configuration, initial payload loading and CSV export

pub mod types;
pub mod error;
pub mod equations;
pub mod store;
pub mod model;
pub mod config;
pub mod logging;
pub mod export;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use config::{Config, InitialParameters};
pub use store::{FormParameters, ParameterStore, ResultEntry, ResultSink, ResultTable};
pub use model::MashModel;
pub use export::{export_csv, write_csv};
