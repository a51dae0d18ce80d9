//! Core types for the Ember inference driver.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the identifiers and operator vocabulary shared by the runtime adapter
//! and the driver.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod id;
pub mod op;

pub use id::CycleId;
pub use op::{OpKind, SCHEMA_VERSION};
