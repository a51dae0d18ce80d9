//! Ember: fixed-memory neural network inference with a periodic
//! self-checking driver.
//!
//! This is the facade crate that re-exports the public API from all
//! Ember sub-crates and carries the compiled-in model artifact.
//!
//! # Quick start
//!
//! ```rust
//! use ember::prelude::*;
//!
//! let mut driver = InferenceDriver::seeded(
//!     ember::LINEAR_MODEL,
//!     DriverConfig::default(),
//!     MemorySink::new(),
//!     NoPacing,
//! )
//! .unwrap();
//! driver.initialize().unwrap();
//! let report = driver.run_once().unwrap();
//! assert!((report.predicted - report.reference).abs() < 0.5);
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `ember-core` | Cycle IDs, operator vocabulary, schema version |
//! | [`runtime`] | `ember-runtime` | ONNX artifact, operator whitelist, tensor budget, interpreter |
//! | [`engine`] | `ember-engine` | The inference cycle driver |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Cycle IDs, the operator vocabulary, and the schema version (`ember-core`).
pub use ember_core as types;

/// The tract-backed interpreter and its budgets (`ember-runtime`).
pub use ember_runtime as runtime;

/// The inference cycle driver (`ember-engine`).
///
/// [`engine::InferenceDriver`] owns the arena and interpreter and runs
/// one sample-infer-report cycle per call.
pub use ember_engine as engine;

/// The linear-regression model compiled into the binary, approximating
/// `y = 2x + 1`. An ONNX graph with a single `Gemm` node.
pub static LINEAR_MODEL: &[u8] = include_bytes!("../models/linear_regression.onnx");

/// Common imports for typical Ember usage.
pub mod prelude {
    // Core
    pub use ember_core::{CycleId, OpKind, SCHEMA_VERSION};

    // Model and runtime
    pub use ember_runtime::{Interpreter, ModelArtifact, OpResolver, TensorArena};

    // Errors
    pub use ember_engine::{ConfigError, CycleError, SetupError};
    pub use ember_runtime::{AllocateError, InvokeError, ModelError, ResolverError};

    // Engine
    pub use ember_engine::{
        BlockingPacer, CycleReport, DiagnosticSink, DriverConfig, DriverState, InferenceDriver,
        MemorySink, NoPacing, Pacer, RandomSource, SchemaPolicy, SeededRandom, SerialSink,
    };
}
