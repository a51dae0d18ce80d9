//! Host binary: runs the inference cycle driver over the compiled-in
//! model, one cycle per second, reporting on stdout.

use std::io;
use std::process::ExitCode;

use ember::prelude::*;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    init_logging();

    let mut driver = match InferenceDriver::seeded(
        ember::LINEAR_MODEL,
        DriverConfig::default(),
        SerialSink::new(io::stdout()),
        BlockingPacer,
    ) {
        Ok(driver) => driver,
        Err(e) => {
            error!(error = %e, "invalid driver configuration");
            return ExitCode::FAILURE;
        }
    };

    if driver.initialize().is_err() {
        // Already reported on the sink and logged by the driver.
        return ExitCode::FAILURE;
    }

    info!(model_bytes = ember::LINEAR_MODEL.len(), "starting inference loop");
    driver.run(None);
    ExitCode::SUCCESS
}

fn init_logging() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,ember=debug"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(true)
        .with_thread_ids(false)
        .init();
}
