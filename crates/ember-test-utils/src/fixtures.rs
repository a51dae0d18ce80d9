//! Reusable model artifacts.
//!
//! Every fixture is a checked-in ONNX file under `models/`, stamped with
//! `model_version` 3 unless noted. Single-layer fixtures are one `Gemm`
//! from a `[1, 1]` input `x` to a `[1, 1]` output `y`.

/// The shipped linear-regression model (`y ≈ 1.9987·x + 1.0031`).
///
/// The same bytes the `ember` binary embeds.
pub fn trained_linear_model() -> &'static [u8] {
    include_bytes!("../../ember/models/linear_regression.onnx")
}

/// `y = 2x + 1`, exactly.
pub fn exact_linear_model() -> &'static [u8] {
    include_bytes!("../models/exact_linear.onnx")
}

/// `y = 2x + 1` stamped with `model_version` 4.
pub fn future_version_model() -> &'static [u8] {
    include_bytes!("../models/future_version.onnx")
}

/// `y = 1e38·x`: finite for `x < 3.4`, infinite (and so a failed invoke)
/// for larger inputs.
pub fn overflowing_model() -> &'static [u8] {
    include_bytes!("../models/overflowing.onnx")
}

/// `Gemm → Relu → Gemm`: `x → relu([x, 1]) → 2·h0 + 0·h1 + 1`. Exact
/// for `x ≥ 0`.
pub fn hidden_layer_model() -> &'static [u8] {
    include_bytes!("../models/hidden_layer.onnx")
}

/// One input, two scalar outputs.
pub fn two_output_model() -> &'static [u8] {
    include_bytes!("../models/two_outputs.onnx")
}

/// A dense layer producing a `[1, 4]` vector, not a scalar.
pub fn vector_output_model() -> &'static [u8] {
    include_bytes!("../models/vector_output.onnx")
}

/// `Gemm → Sigmoid`; `Sigmoid` is outside the operator vocabulary.
pub fn sigmoid_head_model() -> &'static [u8] {
    include_bytes!("../models/sigmoid_head.onnx")
}
