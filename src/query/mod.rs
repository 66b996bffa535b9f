//! Query translation for the listing endpoints

pub mod cql;
pub mod translator;

pub use translator::{history_filter, list_filter};
