//! State module for tracking one author's crawl run
//!
//! This module provides the transient state of a crawl, kept apart from the
//! network and storage code so the loop arithmetic can be tested on its own.
//!
//! # Components
//!
//! - `Pagination`: page index, result offset, declared total and the termination decision
//! - `Termination`: why a crawl loop ended normally
//! - `SeenIds`: per-run guard against entries repeated across drifting pages

mod pagination;
mod seen;

// Re-export main types
pub use pagination::{Pagination, Termination};
pub use seen::SeenIds;
