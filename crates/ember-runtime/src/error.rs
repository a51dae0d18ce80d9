//! Runtime adapter error types.
//!
//! tract reports failures as opaque error chains; they are carried here
//! as their rendered text so every error stays `Clone + Eq` and can be
//! compared in tests.

use std::error::Error;
use std::fmt;

use ember_core::OpKind;

/// Errors from decoding a model artifact.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ModelError {
    /// The bytes are not a valid ONNX model.
    Decode {
        /// The decoder's message.
        reason: String,
    },
    /// The model decodes but carries no graph.
    MissingGraph,
}

impl fmt::Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Decode { reason } => write!(f, "not a valid ONNX model: {reason}"),
            Self::MissingGraph => write!(f, "model has no graph"),
        }
    }
}

impl Error for ModelError {}

/// Errors from reserving space in a [`TensorArena`](crate::TensorArena).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ArenaError {
    /// The aligned request does not fit in the remaining space.
    CapacityExceeded {
        /// Bytes the request needed, alignment padding included.
        requested: usize,
        /// Bytes left before the request.
        available: usize,
        /// Total capacity.
        capacity: usize,
    },
    /// The request size overflows `usize` once aligned.
    SizeOverflow {
        /// The requested size.
        bytes: usize,
    },
}

impl fmt::Display for ArenaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CapacityExceeded {
                requested,
                available,
                capacity,
            } => write!(
                f,
                "arena exhausted: requested {requested} bytes, {available} of {capacity} available"
            ),
            Self::SizeOverflow { bytes } => write!(f, "request of {bytes} bytes overflows"),
        }
    }
}

impl Error for ArenaError {}

/// Errors from [`Interpreter::allocate_tensors`](crate::Interpreter::allocate_tensors).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AllocateError {
    /// A graph node uses an op type outside the known vocabulary.
    UnsupportedOperator {
        /// Position of the node in the graph.
        op_index: usize,
        /// The node's ONNX op type.
        op_type: String,
    },
    /// A graph node uses a known kind that was not registered.
    UnregisteredOperator {
        /// Position of the node in the graph.
        op_index: usize,
        /// The unregistered kind.
        kind: OpKind,
    },
    /// tract could not build or optimise the graph.
    Runtime {
        /// tract's message.
        reason: String,
    },
    /// A graph input or output is not `f32`.
    UnsupportedType {
        /// Name of the node producing the tensor.
        node: String,
        /// The tensor's element type.
        datum: String,
    },
    /// A tensor's shape is not known at setup time.
    DynamicShape {
        /// Name of the node producing the tensor.
        node: String,
    },
    /// The arena cannot hold every intermediate tensor.
    Arena {
        /// Name of the node whose output did not fit.
        node: String,
        /// The arena's reason.
        source: ArenaError,
    },
}

impl fmt::Display for AllocateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedOperator { op_index, op_type } => {
                write!(f, "operator {op_index}: unsupported op type {op_type:?}")
            }
            Self::UnregisteredOperator { op_index, kind } => {
                write!(f, "operator {op_index}: {kind} is not registered")
            }
            Self::Runtime { reason } => write!(f, "runtime rejected the graph: {reason}"),
            Self::UnsupportedType { node, datum } => {
                write!(f, "tensor from {node:?} has element type {datum}, expected f32")
            }
            Self::DynamicShape { node } => {
                write!(f, "tensor from {node:?} has no concrete shape")
            }
            Self::Arena { node, source } => write!(f, "cannot place output of {node:?}: {source}"),
        }
    }
}

impl Error for AllocateError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Arena { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Errors from [`Interpreter::invoke`](crate::Interpreter::invoke).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InvokeError {
    /// Tensors have not been allocated yet.
    NotAllocated,
    /// tract failed while running the plan.
    Runtime {
        /// tract's message.
        reason: String,
    },
    /// An output holds NaN or infinity.
    NonFinite {
        /// Graph output position.
        output: usize,
        /// Element index within that output.
        index: usize,
    },
}

impl fmt::Display for InvokeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotAllocated => write!(f, "tensors not allocated"),
            Self::Runtime { reason } => write!(f, "forward pass failed: {reason}"),
            Self::NonFinite { output, index } => {
                write!(f, "output {output} element {index} is not finite")
            }
        }
    }
}

impl Error for InvokeError {}

/// Errors from reading or writing a bound tensor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AccessError {
    /// Tensors have not been allocated yet.
    NotAllocated,
    /// The model has no graph input at this position.
    NoSuchInput {
        /// The requested position.
        position: usize,
    },
    /// The model has no graph output at this position.
    NoSuchOutput {
        /// The requested position.
        position: usize,
    },
}

impl fmt::Display for AccessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotAllocated => write!(f, "tensors not allocated"),
            Self::NoSuchInput { position } => write!(f, "model has no input {position}"),
            Self::NoSuchOutput { position } => write!(f, "model has no output {position}"),
        }
    }
}

impl Error for AccessError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arena_failure_chains_source() {
        let e = AllocateError::Arena {
            node: "dense".into(),
            source: ArenaError::CapacityExceeded {
                requested: 16,
                available: 12,
                capacity: 16,
            },
        };
        assert!(e.source().is_some());
        assert!(e.to_string().contains("dense"));
    }

    #[test]
    fn unsupported_operator_names_the_op_type() {
        let e = AllocateError::UnsupportedOperator {
            op_index: 1,
            op_type: "Sigmoid".into(),
        };
        assert_eq!(e.to_string(), "operator 1: unsupported op type \"Sigmoid\"");
    }
}
