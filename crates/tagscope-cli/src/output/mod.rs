//! Output formatters for plans and the synchronization table

pub mod json;
pub mod pretty;
