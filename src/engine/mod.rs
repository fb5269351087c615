//! Discovery engine: per-keyword evaluation and the region × keyword run.

pub mod discovery;
pub mod evaluator;
