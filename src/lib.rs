//! TRENDSCOUT: trending low-ticket resale product discovery.
//!
//! Library crate exposing all modules for use by integration tests
//! and the binary entry point.

pub mod config;
pub mod credentials;
pub mod engine;
pub mod marketplace;
pub mod report;
pub mod retry;
pub mod selftest;
pub mod supplier;
pub mod trends;
pub mod types;
