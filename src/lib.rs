//! # Dominant Colors
//!
//! Downloads a list of images, counts the pixel colors of each one and appends
//! the three most frequent colors per image to an output file.
//!
//! The work is a three-stage pipeline running on tokio:
//!
//! - [`LineSource`] reads URLs from the input file onto an unbounded queue
//! - a [`WorkerPool`] of [`ImageFetchWorker`]s fetches, decodes and ranks
//!   each image concurrently (10 workers by default)
//! - [`LineSink`] appends every [`ResultRecord`] to the output file
//!
//! A URL that cannot be fetched or decoded is logged and skipped; it never
//! stops the run. Output order follows completion order, not input order.
//!
//! ## Output Format
//!
//! ```text
//! https://example.com/cat.png,#FF0000,#00FF00,#0000FF
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use dominant_colors::{Config, Pipeline};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config {
//!         concurrency: 4,
//!         ..Default::default()
//!     };
//!     let summary = Pipeline::with_http(config)?.run().await?;
//!     println!("Wrote {} records", summary.records_written);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## CLI Usage
//!
//! ```bash
//! # ./input.txt -> ./output.txt with 10 workers
//! dominant-colors
//!
//! dominant-colors --input urls.txt --output colors.txt --concurrency 32 --timeout 20
//! ```

/// Configuration and settings for the pipeline
pub mod config;

/// Error types and error handling utilities
pub mod error;

/// Pixel quantization and color frequency ranking
pub mod histogram;

/// Image download capability
pub mod fetch;

/// Content-sniffed image decoding
pub mod decode;

/// Formatted output records
pub mod record;

/// Workers and the worker pool
pub mod worker;

/// Input file reader
pub mod source;

/// Output file writer
pub mod sink;

/// Orchestration of source, workers and sink
pub mod pipeline;

/// Pipeline counters
pub mod telemetry;

/// Command-line interface implementation
pub mod cli;


pub use cli::*;
pub use config::*;
pub use decode::*;
pub use error::*;
pub use fetch::*;
pub use histogram::*;
pub use pipeline::*;
pub use record::*;
pub use sink::*;
pub use source::*;
pub use telemetry::*;
pub use worker::*;
