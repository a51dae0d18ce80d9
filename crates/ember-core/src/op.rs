//! Operator vocabulary and schema versioning.

use std::fmt;

/// Model version this driver was built against.
///
/// Compared with the `model_version` field stamped into the artifact.
/// Whether a mismatch is fatal is decided by the caller.
pub const SCHEMA_VERSION: i64 = 3;

/// Graph operations the runtime adapter knows how to whitelist.
///
/// Each kind corresponds to one ONNX `op_type`. A model containing any
/// other operation is rejected before it reaches the runtime.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OpKind {
    /// Dense layer: `Y = A·B + C` (ONNX `Gemm`).
    FullyConnected,
    /// Plain matrix product (ONNX `MatMul`).
    MatMul,
    /// Element-wise sum (ONNX `Add`).
    Add,
    /// `max(0, v)` (ONNX `Relu`).
    Relu,
}

impl OpKind {
    /// Every known kind, in declaration order.
    pub const ALL: [OpKind; 4] = [Self::FullyConnected, Self::MatMul, Self::Add, Self::Relu];

    /// Map an ONNX `op_type` to its kind.
    pub fn from_op_type(op_type: &str) -> Option<Self> {
        match op_type {
            "Gemm" => Some(Self::FullyConnected),
            "MatMul" => Some(Self::MatMul),
            "Add" => Some(Self::Add),
            "Relu" => Some(Self::Relu),
            _ => None,
        }
    }

    /// The ONNX `op_type` string.
    pub fn op_type(self) -> &'static str {
        match self {
            Self::FullyConnected => "Gemm",
            Self::MatMul => "MatMul",
            Self::Add => "Add",
            Self::Relu => "Relu",
        }
    }
}

impl fmt::Display for OpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FullyConnected => write!(f, "FULLY_CONNECTED"),
            Self::MatMul => write!(f, "MATMUL"),
            Self::Add => write!(f, "ADD"),
            Self::Relu => write!(f, "RELU"),
        }
    }
}
