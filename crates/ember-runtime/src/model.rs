//! Opaque model artifact.

use tract_onnx::pb::ModelProto;
use tract_onnx::prelude::*;

use crate::error::ModelError;

/// A decoded ONNX model, not yet bound to a runtime plan.
///
/// Decoding only parses the protobuf; nothing is type-checked or
/// optimised until [`Interpreter::allocate_tensors`](crate::Interpreter::allocate_tensors).
#[derive(Clone, Debug)]
pub struct ModelArtifact {
    proto: ModelProto,
}

impl ModelArtifact {
    /// Decode an artifact from its serialized bytes.
    ///
    /// # Errors
    ///
    /// [`ModelError::Decode`] if the bytes are not an ONNX protobuf,
    /// [`ModelError::MissingGraph`] if the model carries no graph.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ModelError> {
        let mut reader = bytes;
        let proto = tract_onnx::onnx()
            .proto_model_for_read(&mut reader)
            .map_err(|e| ModelError::Decode {
                reason: format!("{e}"),
            })?;
        if proto.graph.is_none() {
            return Err(ModelError::MissingGraph);
        }
        Ok(Self { proto })
    }

    /// The `model_version` stamped in by the exporter.
    pub fn version(&self) -> i64 {
        self.proto.model_version
    }

    /// The exporting tool's name.
    pub fn producer(&self) -> &str {
        &self.proto.producer_name
    }

    /// Op type of every graph node, in graph order.
    pub fn op_types(&self) -> impl Iterator<Item = &str> + '_ {
        self.proto
            .graph
            .iter()
            .flat_map(|g| g.node.iter())
            .map(|n| n.op_type.as_str())
    }

    pub(crate) fn to_inference_model(&self) -> TractResult<InferenceModel> {
        tract_onnx::onnx().model_for_proto_model(&self.proto)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXACT_LINEAR: &[u8] = include_bytes!("../../ember-test-utils/models/exact_linear.onnx");
    const HIDDEN_LAYER: &[u8] = include_bytes!("../../ember-test-utils/models/hidden_layer.onnx");
    const FUTURE_VERSION: &[u8] =
        include_bytes!("../../ember-test-utils/models/future_version.onnx");

    #[test]
    fn reads_version_and_producer() {
        let model = ModelArtifact::from_bytes(EXACT_LINEAR).unwrap();
        assert_eq!(model.version(), 3);
        assert_eq!(model.producer(), "ember-export");
        assert_eq!(model.op_types().collect::<Vec<_>>(), vec!["Gemm"]);

        let future = ModelArtifact::from_bytes(FUTURE_VERSION).unwrap();
        assert_eq!(future.version(), 4);
    }

    #[test]
    fn lists_op_types_in_graph_order() {
        let model = ModelArtifact::from_bytes(HIDDEN_LAYER).unwrap();
        assert_eq!(
            model.op_types().collect::<Vec<_>>(),
            vec!["Gemm", "Relu", "Gemm"]
        );
    }

    #[test]
    fn empty_bytes_have_no_graph() {
        assert_eq!(
            ModelArtifact::from_bytes(&[]).unwrap_err(),
            ModelError::MissingGraph
        );
    }

    #[test]
    fn garbage_is_a_decode_error() {
        let err = ModelArtifact::from_bytes(b"not a model").unwrap_err();
        assert!(matches!(err, ModelError::Decode { .. }), "{err}");
    }
}
