//! Input/output helpers.
//!
//! - CSV ingest + cleaning (`ingest`)
//! - reuse of cleaned data across reloads (`cache`)
//! - annual-average CSV export (`export`)
//! - whole-run JSON dump (`summary`)

pub mod cache;
pub mod export;
pub mod ingest;
pub mod summary;

pub use cache::*;
pub use export::*;
pub use ingest::*;
pub use summary::*;
