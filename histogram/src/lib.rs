// Copyright 2022 Twitter, Inc.
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! This crate provides histograms which track the full distribution of
//! recorded values across a high dynamic range while guaranteeing a
//! configured number of significant figures, along with a compact binary
//! interchange format which is byte compatible with the V2 format used by
//! HDR histogram implementations in other languages.
//!
//! Recording is constant time and memory is fixed at construction. Recorded
//! distributions can be queried for summary statistics and percentiles,
//! walked with value, linear, logarithmic, or percentile stepped iterators,
//! merged, and round-tripped through the binary format for aggregation
//! across processes.

mod config;
mod counts;
mod error;
mod histogram;
mod indexing;
mod iter;
mod report;
mod serialization;

pub use config::*;
pub use counts::Width;
pub use error::*;
pub use histogram::*;
pub use iter::*;
