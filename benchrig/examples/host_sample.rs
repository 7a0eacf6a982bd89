//! Host and Restricted Runners Side by Side
//!
//! The same benchmark is sampled twice: once with the host adapter, which
//! writes JSON reports to `target/benchrig`, and once in a restricted setup
//! where `WRITE_FILE` is an in-memory store.
//!
//! Run with: cargo run --example host_sample -p benchrig --release
//! Set `RUST_LOG=benchrig_core=debug` to see binding resolution.

use benchrig::prelude::*;
use benchrig::{CapabilityId, WALL_TIME_METRIC, init_logging, statistic};
use std::path::PathBuf;
use std::sync::Arc;

// ---------------------------------------------------------------------------
// Benchmark body
// ---------------------------------------------------------------------------

fn fibonacci(n: u32) -> u64 {
    let (mut a, mut b) = (0u64, 1u64);
    for _ in 0..n {
        (a, b) = (b, a.wrapping_add(b));
    }
    a
}

const OUTPUT_DIR: &str = "target/benchrig";

fn options() -> RunnerOptions {
    RunnerOptions {
        sample_size: 20,
        validator: ValidatorKind::regression_slope_on_wall_time(),
        json_output_dir: Some(PathBuf::from(OUTPUT_DIR)),
        ..Default::default()
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging(false);
    // WRITE_FILE writes files, it does not create directories
    tokio::fs::create_dir_all(OUTPUT_DIR).await?;

    // -----------------------------------------------------------------------
    // Host environment: WRITE_FILE is pre-filled by the adapter
    // -----------------------------------------------------------------------

    let host = host_runner(None, options())?;
    let state = host
        .sample(SampleRequest::new("fibonacci_host", || fibonacci(90)).describe("n", 90))
        .await?;
    let summary = statistic::summarize(&state.valid_values(WALL_TIME_METRIC));
    println!(
        "host:       {} runs, mean {:.4} ms, cv {:.2}%",
        state.completed.len(),
        summary.mean,
        summary.coefficient_of_variation
    );

    // -----------------------------------------------------------------------
    // Restricted environment: no filesystem, reports kept in memory
    // -----------------------------------------------------------------------

    let store = Arc::new(MemoryFileWriter::new());
    let restricted = Runner::new(
        RunnerConfig::new(BindingList::new().with(Binding::write_file_arc(store.clone())))
            .with_options(options()),
    )?;
    assert!(restricted.registry().contains(CapabilityId::WriteFile));

    let state = restricted
        .sample(SampleRequest::new("fibonacci_restricted", || fibonacci(90)))
        .await?;
    println!(
        "restricted: {} runs, {} report(s) held in memory",
        state.completed.len(),
        store.len()
    );
    for path in store.paths() {
        println!("  {}", path.display());
    }

    Ok(())
}
