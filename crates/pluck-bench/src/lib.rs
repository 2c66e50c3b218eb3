//! Pluck Benchmark Suite
//!
//! Criterion benchmarks for the projection engine.
//!
//! # Benchmark Categories
//!
//! - **Projection**: batched vs row-at-a-time traversal, by depth and root count
//! - **Storage**: sled point lookups vs prefix scans, row codec

pub mod fixtures;
pub mod harness;

pub use fixtures::{blog_schema, generate_blog, paths_for_depth, BlogData, Scale};
pub use harness::{init_tracing, TestContext};
