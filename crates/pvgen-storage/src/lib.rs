//! Storage layer for PVGen.
//!
//! Uploads rendered videos and cover images to an S3-compatible bucket and
//! appends per-user results to a sheet-style sink. Remote calls go through
//! the retry helper.

pub mod client;
pub mod error;
pub mod retry;
pub mod sink;

pub use client::{ObjectStore, StoreConfig};
pub use error::{StorageError, StorageResult};
pub use retry::{retry_async, RetryConfig};
pub use sink::{
    batch_sheet_name, outcome_row, CsvResultSink, MemorySink, ResultSink, FAILURES_SHEET,
};
