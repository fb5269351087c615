//! Integration tests for the discovery pipeline.

mod fakes;
mod pipeline;
