//! URL and identifier handling
//!
//! This module handles:
//! - Building paginated arXiv query URLs for an author
//! - Building per-document (abstract page) URLs
//! - Extracting canonical ids from Atom entry ids
//! - Sanitizing ids into file names

mod ids;
mod query;

pub use ids::{canonical_id, pdf_url, sanitize_id, strip_version};
pub use query::{build_document_url, build_query_url};
