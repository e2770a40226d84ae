//! Shared utilities.

pub mod scrape;
