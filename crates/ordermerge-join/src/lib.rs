//! Joins the order-header and order-item CSV exports into [`OrderRecord`]s.
//!
//! Headers are read first and build an [`OrderBook`]; items are then attached
//! to the order that shares their document number, with each item's variant
//! id resolved through a [`SnapshotTable`]. Row-level problems (bad numbers,
//! unknown document numbers, discount lines) are recovered locally and
//! counted in [`JoinStats`]; only unreadable input aborts the join.
//!
//! [`OrderRecord`]: ordermerge_core::OrderRecord
//! [`SnapshotTable`]: ordermerge_core::SnapshotTable

pub mod book;
pub mod columns;
pub mod engine;
pub mod error;
pub mod parse;

pub use book::OrderBook;
pub use engine::{attach_items, join_files, join_orders, read_headers, JoinOutcome, JoinStats};
pub use error::JoinError;
