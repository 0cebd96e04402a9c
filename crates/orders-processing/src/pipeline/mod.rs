//! Pipeline module.
//!
//! This module provides the end-to-end orders pipeline and its builder.

mod builder;

pub use builder::{Pipeline, PipelineBuilder};
