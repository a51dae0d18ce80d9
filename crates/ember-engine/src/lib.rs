//! Inference cycle driver for Ember models.
//!
//! [`InferenceDriver`] is the one long-lived object on the device: it
//! owns the tensor arena, binds the compiled-in model to it once, and
//! then runs one forward pass per cycle over a freshly sampled input,
//! reporting each result on a line-oriented [`DiagnosticSink`].
//!
//! ```text
//! Uninitialized ──initialize() ok──► Ready ──run_once()──► Ready
//!       │                                  (invoke failures stay Ready)
//!       └──────initialize() err──► Failed (terminal, no cycles)
//! ```
//!
//! Randomness, output, and pacing are injected through the
//! [`RandomSource`], [`DiagnosticSink`], and [`Pacer`] traits so the host
//! binary and tests drive the same code.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod driver;
pub mod input;
pub mod metrics;
pub mod pacing;
pub mod sink;

pub use config::{ConfigError, DriverConfig, SchemaPolicy, MAX_ARENA_BYTES};
pub use driver::{CycleError, CycleReport, DriverState, InferenceDriver, SetupError};
pub use input::{reference_output, sample_input, RandomSource, SeededRandom};
pub use metrics::DriverMetrics;
pub use pacing::{BlockingPacer, NoPacing, Pacer};
pub use sink::{DiagnosticSink, MemorySink, SerialSink};
