//! The model interpreter.
//!
//! # Ownership model
//!
//! `Interpreter` owns its model, resolver and arena. Input and output
//! buffers are reached through `&mut self` / `&self`, so a caller can
//! never hold a tensor slice across an [`invoke()`](Interpreter::invoke).

use std::time::Instant;

use ember_core::OpKind;
use tract_onnx::prelude::*;
use tracing::{debug, trace};

use crate::arena::TensorArena;
use crate::error::{AccessError, AllocateError, InvokeError};
use crate::model::ModelArtifact;
use crate::resolver::OpResolver;

/// A graph input or output with its host-side buffer.
struct TensorSlot {
    shape: Vec<usize>,
    data: Vec<f32>,
}

/// Everything `allocate_tensors` produces.
struct Plan {
    runnable: TypedRunnableModel<TypedModel>,
    inputs: Vec<TensorSlot>,
    outputs: Vec<TensorSlot>,
}

/// Runs a whitelisted ONNX graph inside a fixed tensor budget.
pub struct Interpreter {
    model: ModelArtifact,
    resolver: OpResolver,
    arena: TensorArena,
    plan: Option<Plan>,
}

impl Interpreter {
    /// Bind a model, its operator whitelist, and the arena that bounds
    /// its tensors.
    ///
    /// Nothing is validated until [`allocate_tensors()`](Self::allocate_tensors).
    pub fn new(model: ModelArtifact, resolver: OpResolver, arena: TensorArena) -> Self {
        Self {
            model,
            resolver,
            arena,
            plan: None,
        }
    }

    /// Check every graph node against the whitelist, build the runtime
    /// plan, and reserve an arena span for each non-constant tensor.
    ///
    /// May be called again; the arena is rewound first, so repeated
    /// calls report the same usage.
    ///
    /// # Errors
    ///
    /// See [`AllocateError`]. On error the interpreter stays unallocated.
    pub fn allocate_tensors(&mut self) -> Result<(), AllocateError> {
        self.plan = None;
        self.arena.reset();

        for (op_index, op_type) in self.model.op_types().enumerate() {
            let kind =
                OpKind::from_op_type(op_type).ok_or_else(|| AllocateError::UnsupportedOperator {
                    op_index,
                    op_type: op_type.to_owned(),
                })?;
            if !self.resolver.contains(kind) {
                return Err(AllocateError::UnregisteredOperator { op_index, kind });
            }
        }

        let typed = self
            .model
            .to_inference_model()
            .and_then(|m| m.into_optimized())
            .map_err(runtime_error)?;

        let inputs = slots(&typed, &typed.inputs)?;
        let outputs = slots(&typed, &typed.outputs)?;

        for node in typed.nodes() {
            for outlet in &node.outputs {
                let fact = &outlet.fact;
                if fact.konst.is_some() {
                    continue;
                }
                let shape = fact
                    .shape
                    .as_concrete()
                    .ok_or_else(|| AllocateError::DynamicShape {
                        node: node.name.clone(),
                    })?;
                let bytes = shape.iter().product::<usize>() * fact.datum_type.size_of();
                let span = self
                    .arena
                    .reserve(bytes)
                    .map_err(|source| AllocateError::Arena {
                        node: node.name.clone(),
                        source,
                    })?;
                trace!(node = %node.name, offset = span.offset(), len = span.len(), "tensor placed");
            }
        }

        let runnable = typed.into_runnable().map_err(runtime_error)?;

        debug!(
            used = self.arena.used_bytes(),
            capacity = self.arena.capacity_bytes(),
            inputs = inputs.len(),
            outputs = outputs.len(),
            "tensors allocated"
        );
        self.plan = Some(Plan {
            runnable,
            inputs,
            outputs,
        });
        Ok(())
    }

    /// Run the plan once over the current input buffers.
    ///
    /// # Errors
    ///
    /// [`InvokeError::NotAllocated`] before a successful allocation,
    /// [`InvokeError::Runtime`] if tract fails, and
    /// [`InvokeError::NonFinite`] if an output holds NaN or infinity.
    /// Output buffers are updated before the finiteness check.
    pub fn invoke(&mut self) -> Result<(), InvokeError> {
        let plan = self.plan.as_mut().ok_or(InvokeError::NotAllocated)?;
        let started = Instant::now();

        let inputs = plan
            .inputs
            .iter()
            .map(|slot| Tensor::from_shape(&slot.shape, &slot.data).map(|t| t.into_tvalue()))
            .collect::<TractResult<TVec<TValue>>>()
            .map_err(invoke_error)?;
        let results = plan.runnable.run(inputs).map_err(invoke_error)?;

        for (slot, value) in plan.outputs.iter_mut().zip(results.iter()) {
            let values = value.as_slice::<f32>().map_err(invoke_error)?;
            if values.len() != slot.data.len() {
                return Err(InvokeError::Runtime {
                    reason: format!(
                        "output has {} elements, expected {}",
                        values.len(),
                        slot.data.len()
                    ),
                });
            }
            slot.data.copy_from_slice(values);
        }

        for (output, slot) in plan.outputs.iter().enumerate() {
            if let Some(index) = slot.data.iter().position(|v| !v.is_finite()) {
                return Err(InvokeError::NonFinite { output, index });
            }
        }

        let elapsed_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
        trace!(elapsed_us, "invoke complete");
        Ok(())
    }

    /// Number of graph inputs, or 0 before allocation.
    pub fn input_count(&self) -> usize {
        self.plan.as_ref().map_or(0, |p| p.inputs.len())
    }

    /// Number of graph outputs, or 0 before allocation.
    pub fn output_count(&self) -> usize {
        self.plan.as_ref().map_or(0, |p| p.outputs.len())
    }

    /// Shape of the `position`th graph input.
    pub fn input_shape(&self, position: usize) -> Result<&[usize], AccessError> {
        Ok(&self.input_slot(position)?.shape)
    }

    /// Shape of the `position`th graph output.
    pub fn output_shape(&self, position: usize) -> Result<&[usize], AccessError> {
        Ok(&self.output_slot(position)?.shape)
    }

    /// Writable buffer of the `position`th graph input.
    pub fn input_mut(&mut self, position: usize) -> Result<&mut [f32], AccessError> {
        let plan = self.plan.as_mut().ok_or(AccessError::NotAllocated)?;
        plan.inputs
            .get_mut(position)
            .map(|slot| slot.data.as_mut_slice())
            .ok_or(AccessError::NoSuchInput { position })
    }

    /// Buffer of the `position`th graph output, as left by the last invoke.
    pub fn output(&self, position: usize) -> Result<&[f32], AccessError> {
        Ok(&self.output_slot(position)?.data)
    }

    /// Bytes of the arena reserved by the current plan.
    pub fn arena_used_bytes(&self) -> usize {
        self.arena.used_bytes()
    }

    /// Fixed arena capacity.
    pub fn arena_capacity_bytes(&self) -> usize {
        self.arena.capacity_bytes()
    }

    /// Whether `allocate_tensors` has succeeded.
    pub fn is_allocated(&self) -> bool {
        self.plan.is_some()
    }

    /// The bound model.
    pub fn model(&self) -> &ModelArtifact {
        &self.model
    }

    /// The bound whitelist.
    pub fn resolver(&self) -> &OpResolver {
        &self.resolver
    }

    /// Give the arena back, rewound.
    pub fn into_arena(self) -> TensorArena {
        let mut arena = self.arena;
        arena.reset();
        arena
    }

    fn input_slot(&self, position: usize) -> Result<&TensorSlot, AccessError> {
        let plan = self.plan.as_ref().ok_or(AccessError::NotAllocated)?;
        plan.inputs
            .get(position)
            .ok_or(AccessError::NoSuchInput { position })
    }

    fn output_slot(&self, position: usize) -> Result<&TensorSlot, AccessError> {
        let plan = self.plan.as_ref().ok_or(AccessError::NotAllocated)?;
        plan.outputs
            .get(position)
            .ok_or(AccessError::NoSuchOutput { position })
    }
}

/// One zeroed `f32` buffer per outlet.
fn slots(typed: &TypedModel, outlets: &[OutletId]) -> Result<Vec<TensorSlot>, AllocateError> {
    outlets
        .iter()
        .map(|&outlet| {
            let node = typed.node(outlet.node).name.clone();
            let fact = typed.outlet_fact(outlet).map_err(runtime_error)?;
            if fact.datum_type != f32::datum_type() {
                return Err(AllocateError::UnsupportedType {
                    node,
                    datum: format!("{:?}", fact.datum_type),
                });
            }
            let shape = fact
                .shape
                .as_concrete()
                .ok_or(AllocateError::DynamicShape { node })?
                .to_vec();
            let len = shape.iter().product();
            Ok(TensorSlot {
                shape,
                data: vec![0.0; len],
            })
        })
        .collect()
}

fn runtime_error(e: TractError) -> AllocateError {
    AllocateError::Runtime {
        reason: format!("{e}"),
    }
}

fn invoke_error(e: TractError) -> InvokeError {
    InvokeError::Runtime {
        reason: format!("{e}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXACT_LINEAR: &[u8] = include_bytes!("../../ember-test-utils/models/exact_linear.onnx");
    const OVERFLOWING: &[u8] = include_bytes!("../../ember-test-utils/models/overflowing.onnx");
    const SIGMOID_HEAD: &[u8] = include_bytes!("../../ember-test-utils/models/sigmoid_head.onnx");

    fn fc_resolver() -> OpResolver {
        let mut r = OpResolver::with_capacity(1);
        r.add_fully_connected().unwrap();
        r
    }

    fn interpreter(bytes: &[u8], resolver: OpResolver, arena_bytes: usize) -> Interpreter {
        let model = ModelArtifact::from_bytes(bytes).unwrap();
        Interpreter::new(model, resolver, TensorArena::new(arena_bytes))
    }

    #[test]
    fn invoke_before_allocate_fails() {
        let mut interp = interpreter(EXACT_LINEAR, fc_resolver(), 256);
        assert_eq!(interp.invoke(), Err(InvokeError::NotAllocated));
        assert_eq!(interp.input_mut(0).unwrap_err(), AccessError::NotAllocated);
        assert_eq!(interp.input_count(), 0);
    }

    #[test]
    fn linear_model_round_trip() {
        let mut interp = interpreter(EXACT_LINEAR, fc_resolver(), 256);
        interp.allocate_tensors().unwrap();
        assert_eq!(interp.input_shape(0).unwrap(), &[1, 1]);
        assert_eq!(interp.output_shape(0).unwrap(), &[1, 1]);

        interp.input_mut(0).unwrap()[0] = 10.0;
        interp.invoke().unwrap();
        assert_eq!(interp.output(0).unwrap(), &[21.0]);

        let used = interp.arena_used_bytes();
        interp.input_mut(0).unwrap()[0] = 0.0;
        interp.invoke().unwrap();
        assert_eq!(interp.output(0).unwrap(), &[1.0]);
        assert_eq!(interp.arena_used_bytes(), used);
    }

    #[test]
    fn reallocation_reports_same_usage() {
        let mut interp = interpreter(EXACT_LINEAR, fc_resolver(), 256);
        interp.allocate_tensors().unwrap();
        let first = interp.arena_used_bytes();
        assert!(first > 0);
        interp.allocate_tensors().unwrap();
        assert_eq!(interp.arena_used_bytes(), first);
    }

    #[test]
    fn unregistered_kind_is_reported() {
        let mut interp = interpreter(EXACT_LINEAR, OpResolver::with_capacity(1), 256);
        assert_eq!(
            interp.allocate_tensors().unwrap_err(),
            AllocateError::UnregisteredOperator {
                op_index: 0,
                kind: OpKind::FullyConnected
            }
        );
        assert!(!interp.is_allocated());
    }

    #[test]
    fn unknown_op_type_is_reported() {
        let mut interp = interpreter(SIGMOID_HEAD, fc_resolver(), 256);
        assert_eq!(
            interp.allocate_tensors().unwrap_err(),
            AllocateError::UnsupportedOperator {
                op_index: 1,
                op_type: "Sigmoid".into()
            }
        );
    }

    #[test]
    fn undersized_arena_is_reported() {
        let mut interp = interpreter(EXACT_LINEAR, fc_resolver(), 16);
        let err = interp.allocate_tensors().unwrap_err();
        assert!(matches!(err, AllocateError::Arena { .. }), "{err}");
        assert!(!interp.is_allocated());
    }

    #[test]
    fn non_finite_output_is_an_invoke_error() {
        let mut interp = interpreter(OVERFLOWING, fc_resolver(), 256);
        interp.allocate_tensors().unwrap();

        interp.input_mut(0).unwrap()[0] = 1.0;
        interp.invoke().unwrap();

        interp.input_mut(0).unwrap()[0] = 5.0;
        assert_eq!(
            interp.invoke(),
            Err(InvokeError::NonFinite {
                output: 0,
                index: 0
            })
        );
    }

    #[test]
    fn out_of_range_positions_are_rejected() {
        let mut interp = interpreter(EXACT_LINEAR, fc_resolver(), 256);
        interp.allocate_tensors().unwrap();
        assert_eq!(
            interp.input_mut(1).unwrap_err(),
            AccessError::NoSuchInput { position: 1 }
        );
        assert_eq!(
            interp.output(3).unwrap_err(),
            AccessError::NoSuchOutput { position: 3 }
        );
    }

    #[test]
    fn into_arena_returns_rewound_arena() {
        let mut interp = interpreter(EXACT_LINEAR, fc_resolver(), 256);
        interp.allocate_tensors().unwrap();
        let arena = interp.into_arena();
        assert_eq!(arena.used_bytes(), 0);
        assert_eq!(arena.capacity_bytes(), 256);
    }
}
