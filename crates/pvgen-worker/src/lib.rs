//! Batch worker for personalized video generation.
//!
//! Reads a window of customer rows, normalizes each customer's fields for
//! speech and on-screen text, synthesizes a voiceover, composes the video,
//! uploads both artifacts, and logs one result row per user.

pub mod config;
pub mod error;
pub mod executor;
pub mod ingest;
pub mod logging;
pub mod pipeline;
pub mod upload;

pub use config::WorkerConfig;
pub use error::{BatchError, StageError, WorkerResult};
pub use executor::{run_batch, ProcessedSet};
pub use ingest::read_customers;
pub use logging::UserLogger;
pub use pipeline::{process_customer, PipelineContext};
pub use upload::{ArtifactUploader, StoreUploader};
