//! Output module for registry files and the paper index
//!
//! This module handles:
//! - CSV record encoding shared by the registry and the export
//! - Building the `year,title,url` index from cached query pages

pub mod csv;
mod index;

pub use index::{build_index, collect_papers, write_index_csv, IndexReport, IndexSelection, Paper};
