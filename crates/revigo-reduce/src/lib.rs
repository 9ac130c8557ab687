//! # revigo-reduce
//!
//! The synchronous, CPU-bound stages of a revigo job.
//!
//! This crate provides:
//! - Greedy redundancy reduction of one aspect's terms
//! - Classical MDS projection of the similarity matrix to 2-D
//! - Enrichment and correlation word statistics
//! - Binning of word statistics into the 1..=9 cloud size scale
//!
//! ## Example
//!
//! ```ignore
//! use revigo_reduce::{project, Reducer};
//! use revigo_core::ValueType;
//!
//! let reduction = Reducer::new(0.7, ValueType::PValue).reduce(terms, &matrix)?;
//! let points = project(&matrix);
//! ```

pub mod binning;
pub mod projection;
pub mod reducer;
pub mod wordcloud;

pub use binning::{bin, Transform};
pub use projection::{assign_coordinates, project, Point2};
pub use reducer::{priority_cmp, priority_order, reduce, Reducer, Reduction};
pub use wordcloud::{word_clouds, WordClouds};
