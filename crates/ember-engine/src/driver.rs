//! The inference cycle driver and its state machine.
//!
//! # Ownership model
//!
//! The driver owns everything the cycle touches: the arena (created once
//! in [`new()`](InferenceDriver::new)), the interpreter bound to it, the
//! random source, the sink, and the pacer. The serialized model is
//! borrowed for `'m` and decoded during setup. There is no global state; the
//! host constructs one driver and calls it from a single thread.
//!
//! # Failure model
//!
//! - Setup failures ([`SetupError`]) move the driver to
//!   [`DriverState::Failed`], which is terminal: no cycle runs and no
//!   further output is produced.
//! - Invoke failures ([`CycleError::Invoke`]) are transient: the cycle's
//!   result line is skipped, the driver stays [`DriverState::Ready`], and
//!   the next cycle proceeds normally. Failed cycles are not retried.

use std::error::Error;
use std::fmt;
use std::time::Instant;

use ember_core::{CycleId, SCHEMA_VERSION};
use ember_runtime::{
    AccessError, AllocateError, Interpreter, InvokeError, ModelArtifact, ModelError, OpResolver,
    ResolverError, TensorArena,
};
use tracing::{debug, error, info, warn};

use crate::config::{ConfigError, DriverConfig, SchemaPolicy};
use crate::input::{reference_output, sample_input, RandomSource, SeededRandom};
use crate::metrics::DriverMetrics;
use crate::pacing::Pacer;
use crate::sink::DiagnosticSink;

// ── DriverState ────────────────────────────────────────────────────

/// Lifecycle state of an [`InferenceDriver`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DriverState {
    /// Constructed; [`initialize()`](InferenceDriver::initialize) not yet run.
    Uninitialized,
    /// Setup succeeded; cycles may run.
    Ready,
    /// Setup failed. Terminal.
    Failed,
}

impl fmt::Display for DriverState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uninitialized => write!(f, "uninitialized"),
            Self::Ready => write!(f, "ready"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

// ── Error types ────────────────────────────────────────────────────

/// Errors that abort [`InferenceDriver::initialize`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SetupError {
    /// The model artifact could not be decoded.
    Model(ModelError),
    /// Schema version differs and [`SchemaPolicy::Reject`] is in force.
    SchemaMismatch {
        /// Version stamped in the model.
        found: i64,
        /// Version this runtime supports.
        supported: i64,
    },
    /// The fully-connected operator could not be registered.
    Registration(ResolverError),
    /// Tensor allocation failed.
    Allocation(AllocateError),
    /// The model is not a single-scalar-in, single-scalar-out graph.
    Signature {
        /// What is wrong with the model's inputs or outputs.
        reason: String,
    },
    /// Setup already failed once; the driver does not retry.
    Terminal,
}

impl fmt::Display for SetupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Model(e) => write!(f, "model: {e}"),
            Self::SchemaMismatch { found, supported } => write!(
                f,
                "model schema version {found} does not match supported version {supported}"
            ),
            Self::Registration(e) => write!(f, "operator registration: {e}"),
            Self::Allocation(e) => write!(f, "tensor allocation: {e}"),
            Self::Signature { reason } => write!(f, "model signature: {reason}"),
            Self::Terminal => write!(f, "driver already failed setup"),
        }
    }
}

impl Error for SetupError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Model(e) => Some(e),
            Self::Registration(e) => Some(e),
            Self::Allocation(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ModelError> for SetupError {
    fn from(e: ModelError) -> Self {
        Self::Model(e)
    }
}

impl From<ResolverError> for SetupError {
    fn from(e: ResolverError) -> Self {
        Self::Registration(e)
    }
}

impl From<AllocateError> for SetupError {
    fn from(e: AllocateError) -> Self {
        Self::Allocation(e)
    }
}

/// Errors from [`InferenceDriver::run_once`].
#[derive(Clone, Debug, PartialEq)]
pub enum CycleError {
    /// The driver is not [`DriverState::Ready`]; nothing ran.
    NotReady {
        /// The state the driver was in.
        state: DriverState,
    },
    /// The forward pass failed for this cycle's input.
    Invoke {
        /// The cycle that failed.
        cycle: CycleId,
        /// The input that was fed in.
        input: f32,
        /// The interpreter's reason.
        source: InvokeError,
    },
    /// The bound input or output tensor could not be accessed.
    Tensor {
        /// The cycle that failed.
        cycle: CycleId,
        /// The interpreter's reason.
        source: AccessError,
    },
}

impl fmt::Display for CycleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotReady { state } => write!(f, "driver is {state}, not ready"),
            Self::Invoke {
                cycle,
                input,
                source,
            } => write!(f, "cycle {cycle}: invoke failed on x = {input}: {source}"),
            Self::Tensor { cycle, source } => write!(f, "cycle {cycle}: {source}"),
        }
    }
}

impl Error for CycleError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Invoke { source, .. } => Some(source),
            Self::Tensor { source, .. } => Some(source),
            Self::NotReady { .. } => None,
        }
    }
}

// ── CycleReport ────────────────────────────────────────────────────

/// Result of a successful cycle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CycleReport {
    /// The cycle that produced this report.
    pub cycle: CycleId,
    /// Input fed to the model.
    pub input: f32,
    /// Ground truth `2x + 1` for the input.
    pub reference: f32,
    /// The model's prediction.
    pub predicted: f32,
    /// Duration of the forward pass, in microseconds.
    pub invoke_us: u64,
}

impl CycleReport {
    /// The line written to the diagnostic sink for this cycle.
    pub fn line(&self) -> String {
        format!(
            "x = {:.2}\ty = {:.2}\tpredicted = {:.2}",
            self.input, self.reference, self.predicted
        )
    }
}

// ── InferenceDriver ────────────────────────────────────────────────

/// Owns the arena and interpreter and runs one inference per cycle.
///
/// # Example
///
/// ```
/// use ember_engine::{DriverConfig, DriverState, InferenceDriver, MemorySink, NoPacing};
/// use ember_test_utils::fixtures::exact_linear_model;
///
/// let mut driver = InferenceDriver::seeded(
///     exact_linear_model(),
///     DriverConfig::default(),
///     MemorySink::new(),
///     NoPacing,
/// )?;
/// driver.initialize()?;
/// assert_eq!(driver.run(Some(3)), 3);
/// assert_eq!(driver.state(), DriverState::Ready);
///
/// let lines = driver.sink().lines();
/// assert!(lines[0].starts_with("arena bytes used: "));
/// assert!(lines[1].starts_with("x = "));
/// assert_eq!(lines.len(), 4);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct InferenceDriver<'m, R, S, P> {
    model_bytes: &'m [u8],
    config: DriverConfig,
    random: R,
    sink: S,
    pacer: P,
    state: DriverState,
    /// Held here whenever no interpreter owns it.
    arena: Option<TensorArena>,
    interpreter: Option<Interpreter>,
    next_cycle: CycleId,
    metrics: DriverMetrics,
}

impl<'m, R, S, P> InferenceDriver<'m, R, S, P>
where
    R: RandomSource,
    S: DiagnosticSink,
    P: Pacer,
{
    /// Create a driver over a compiled-in model artifact.
    ///
    /// Validates `config` and creates the tensor arena. Nothing touches
    /// the model or the sink until [`initialize()`](Self::initialize).
    pub fn new(
        model_bytes: &'m [u8],
        config: DriverConfig,
        random: R,
        sink: S,
        pacer: P,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let arena = TensorArena::new(config.arena_bytes);
        Ok(Self {
            model_bytes,
            config,
            random,
            sink,
            pacer,
            state: DriverState::Uninitialized,
            arena: Some(arena),
            interpreter: None,
            next_cycle: CycleId(0),
            metrics: DriverMetrics::default(),
        })
    }

    /// Bind the model to the arena.
    ///
    /// Steps: decode the model and check its schema version, register
    /// the fully-connected operator, build the interpreter, allocate
    /// tensors, check the scalar input and output, and report arena
    /// usage on the sink.
    ///
    /// Calling this again on a ready driver repeats setup over the same
    /// arena. Calling it on a failed driver returns
    /// [`SetupError::Terminal`] without side effects.
    ///
    /// # Errors
    ///
    /// Any [`SetupError`]; the error is also written to the sink and the
    /// driver becomes [`DriverState::Failed`].
    pub fn initialize(&mut self) -> Result<(), SetupError> {
        if self.state == DriverState::Failed {
            return Err(SetupError::Terminal);
        }
        match self.setup() {
            Ok(()) => {
                self.state = DriverState::Ready;
                info!(
                    arena_used = self.metrics.arena_used_bytes,
                    arena_capacity = self.config.arena_bytes,
                    "driver ready"
                );
                Ok(())
            }
            Err(e) => {
                self.state = DriverState::Failed;
                self.sink.emit(&format!("setup failed: {e}"));
                error!(error = %e, "driver setup failed");
                Err(e)
            }
        }
    }

    fn setup(&mut self) -> Result<(), SetupError> {
        if let Some(previous) = self.interpreter.take() {
            self.arena = Some(previous.into_arena());
        }

        let model = ModelArtifact::from_bytes(self.model_bytes)?;
        if model.version() != SCHEMA_VERSION {
            let mismatch = SetupError::SchemaMismatch {
                found: model.version(),
                supported: SCHEMA_VERSION,
            };
            match self.config.schema_policy {
                SchemaPolicy::Warn => {
                    self.sink.emit(&mismatch.to_string());
                    warn!(
                        found = model.version(),
                        supported = SCHEMA_VERSION,
                        "schema version mismatch, continuing"
                    );
                }
                SchemaPolicy::Reject => return Err(mismatch),
            }
        }

        let mut resolver = OpResolver::with_capacity(self.config.op_slots);
        resolver.add_fully_connected()?;

        let arena = self
            .arena
            .take()
            .unwrap_or_else(|| TensorArena::new(self.config.arena_bytes));
        let mut interpreter = Interpreter::new(model, resolver, arena);

        let bound = interpreter
            .allocate_tensors()
            .map_err(SetupError::from)
            .and_then(|()| check_scalar_io(&interpreter));
        if let Err(e) = bound {
            self.arena = Some(interpreter.into_arena());
            return Err(e);
        }

        let used = interpreter.arena_used_bytes();
        self.sink.emit(&format!("arena bytes used: {used}"));
        self.metrics.arena_used_bytes = used;
        self.interpreter = Some(interpreter);
        Ok(())
    }

    /// Run one cycle: sample `x`, invoke, report, then pause.
    ///
    /// On success the result line `x = …\ty = …\tpredicted = …` is
    /// written to the sink. On invoke failure an error line naming `x`
    /// is written instead and the driver stays ready. Either way the
    /// pacer pauses once before returning.
    ///
    /// # Errors
    ///
    /// [`CycleError::NotReady`] if setup has not succeeded (no output,
    /// no pause); otherwise the cycle's transient failure.
    pub fn run_once(&mut self) -> Result<CycleReport, CycleError> {
        let (Some(interpreter), DriverState::Ready) = (self.interpreter.as_mut(), self.state) else {
            return Err(CycleError::NotReady { state: self.state });
        };

        let cycle = self.next_cycle;
        self.next_cycle = cycle.next();
        self.metrics.cycles_attempted += 1;

        let x = sample_input(&mut self.random);
        let outcome = forward(interpreter, cycle, x);

        let result = match outcome {
            Ok((predicted, invoke_us)) => {
                let report = CycleReport {
                    cycle,
                    input: x,
                    reference: reference_output(x),
                    predicted,
                    invoke_us,
                };
                self.sink.emit(&report.line());
                self.metrics.cycles_reported += 1;
                self.metrics.last_invoke_us = invoke_us;
                debug!(
                    %cycle,
                    x,
                    reference = report.reference,
                    predicted,
                    invoke_us,
                    "cycle complete"
                );
                Ok(report)
            }
            Err(e) => {
                self.metrics.invoke_failures += 1;
                self.sink.emit(&format!("invoke failed on x = {x:.2}: {e}"));
                error!(%cycle, x, error = %e, "cycle failed");
                Err(e)
            }
        };

        self.pacer.pause(self.config.cycle_interval);
        result
    }

    /// Run cycles until `limit` have executed, or forever when `None`.
    ///
    /// Returns the number of cycles executed. Returns 0 immediately if
    /// the driver is not ready.
    pub fn run(&mut self, limit: Option<u64>) -> u64 {
        let mut executed = 0;
        while self.state == DriverState::Ready && limit.is_none_or(|max| executed < max) {
            if let Err(CycleError::NotReady { .. }) = self.run_once() {
                break;
            }
            executed += 1;
        }
        executed
    }

    /// Current lifecycle state.
    pub fn state(&self) -> DriverState {
        self.state
    }

    /// Accumulated counters.
    pub fn metrics(&self) -> &DriverMetrics {
        &self.metrics
    }

    /// The configuration the driver was built with.
    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    /// The diagnostic sink.
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// The interpreter, once setup has succeeded.
    pub fn interpreter(&self) -> Option<&Interpreter> {
        self.interpreter.as_ref()
    }

    /// The id the next executed cycle will carry.
    pub fn next_cycle(&self) -> CycleId {
        self.next_cycle
    }
}

impl<'m, S, P> InferenceDriver<'m, SeededRandom, S, P>
where
    S: DiagnosticSink,
    P: Pacer,
{
    /// Create a driver whose random source is seeded from
    /// [`DriverConfig::seed`].
    pub fn seeded(
        model_bytes: &'m [u8],
        config: DriverConfig,
        sink: S,
        pacer: P,
    ) -> Result<Self, ConfigError> {
        let random = SeededRandom::new(config.seed);
        Self::new(model_bytes, config, random, sink, pacer)
    }
}

/// Check the model is one f32 scalar in, one f32 scalar out.
fn check_scalar_io(interpreter: &Interpreter) -> Result<(), SetupError> {
    let (inputs, outputs) = (interpreter.input_count(), interpreter.output_count());
    if inputs != 1 || outputs != 1 {
        return Err(SetupError::Signature {
            reason: format!("expected 1 input and 1 output, model has {inputs} and {outputs}"),
        });
    }
    for (role, shape) in [
        ("input", interpreter.input_shape(0)),
        ("output", interpreter.output_shape(0)),
    ] {
        let shape = shape.map_err(|e| SetupError::Signature {
            reason: format!("{role}: {e}"),
        })?;
        let elements: usize = shape.iter().product();
        if elements != 1 {
            return Err(SetupError::Signature {
                reason: format!("{role} has shape {shape:?} ({elements} elements), expected 1"),
            });
        }
    }
    Ok(())
}

fn forward(interpreter: &mut Interpreter, cycle: CycleId, x: f32) -> Result<(f32, u64), CycleError> {
    let tensor_error = |source| CycleError::Tensor { cycle, source };

    interpreter.input_mut(0).map_err(tensor_error)?[0] = x;

    let started = Instant::now();
    interpreter.invoke().map_err(|source| CycleError::Invoke {
        cycle,
        input: x,
        source,
    })?;
    let invoke_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);

    let predicted = interpreter.output(0).map_err(tensor_error)?[0];
    Ok((predicted, invoke_us))
}
