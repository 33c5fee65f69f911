pub mod config;
pub mod data_base;
pub mod error;
pub mod experiment;
pub mod fuzzy_rules;
pub mod genetic_algorithm;
pub mod report;

pub use error::{FuzzyChiError, Result};
