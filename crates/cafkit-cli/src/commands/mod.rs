//! CLI command implementations

pub mod chunks;
pub mod create;
pub mod formats;
pub mod info;
pub mod log;

mod reporting;
