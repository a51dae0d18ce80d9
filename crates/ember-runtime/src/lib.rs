//! Runtime adapter for Ember models.
//!
//! The forward pass itself is delegated to `tract-onnx`. This crate
//! wraps it in the contract the driver relies on:
//!
//! - [`ModelArtifact`]: the opaque ONNX blob, decoded once, with its
//!   stamped version and the op types its graph uses.
//! - [`OpResolver`]: a bounded whitelist of operator kinds. A graph
//!   using anything not registered is refused before tract sees it.
//! - [`TensorArena`]: a fixed byte budget every intermediate tensor of
//!   the optimised plan must fit in.
//! - [`Interpreter`]: binds the three, then runs one forward pass per
//!   [`invoke()`](Interpreter::invoke) over in-place input and output
//!   buffers.
//!
//! ```text
//! Interpreter::new(model, resolver, arena)
//!     └── allocate_tensors()   whitelist ops, optimise, budget tensors
//!           └── loop {
//!                 input_mut(0)  write input in place
//!                 invoke()      run the plan
//!                 output(0)     read result
//!               }
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod arena;
pub mod error;
pub mod interpreter;
pub mod model;
pub mod resolver;

pub use arena::{ArenaSpan, TensorArena, ALIGNMENT_BYTES};
pub use error::{AccessError, AllocateError, ArenaError, InvokeError, ModelError};
pub use interpreter::Interpreter;
pub use model::ModelArtifact;
pub use resolver::{OpResolver, ResolverError};
