//! Integration tests for benchrig
//!
//! These tests verify capability injection end to end: the host adapter, the
//! core runner, and the `WRITE_FILE` contract between them.

use benchrig::{
    Binding, BindingList, CapabilityId, FixedClock, HostFileWriter, Runner, RunnerConfig,
    RunnerError, RunnerOptions, SampleRequest, UnboundCapability, ValidatorKind, WritePrimitive,
    async_trait, host_bindings_with, host_runner, write_file_fn,
};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

type Recorded = Arc<Mutex<Vec<(PathBuf, Vec<u8>)>>>;

/// `WRITE_FILE` binding that records calls without touching disk
fn recording_binding() -> (Binding, Recorded) {
    let calls: Recorded = Arc::new(Mutex::new(Vec::new()));
    let sink = calls.clone();
    let writer = write_file_fn(move |path, content| {
        let sink = sink.clone();
        async move {
            sink.lock().unwrap().push((path, content));
            Ok(())
        }
    });
    (Binding::write_file(writer), calls)
}

/// Host primitive that always reports a permission error
struct PermissionDenied;

#[async_trait]
impl WritePrimitive for PermissionDenied {
    async fn write(&self, _path: &Path, _content: &[u8]) -> io::Result<()> {
        Err(io::Error::new(
            io::ErrorKind::PermissionDenied,
            "permission denied",
        ))
    }
}

fn json_options(dir: &Path, sample_size: usize) -> RunnerOptions {
    RunnerOptions {
        sample_size,
        json_output_dir: Some(dir.to_path_buf()),
        console: false,
        ..Default::default()
    }
}

/// Scenario A: default host runner writes and the content reads back
#[tokio::test]
async fn test_host_write_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("out.txt");

    let runner = host_runner(None, RunnerOptions::default()).unwrap();
    let write_file = runner.registry().write_file().unwrap();
    write_file.write_file(&path, b"hello").await.unwrap();

    assert_eq!(std::fs::read_to_string(&path).unwrap(), "hello");
}

/// Round trip for arbitrary binary payloads, including empty ones
#[tokio::test]
async fn test_host_write_binary_payloads() {
    let dir = TempDir::new().unwrap();
    let runner = host_runner(None, RunnerOptions::default()).unwrap();
    let write_file = runner.registry().write_file().unwrap();

    let payloads: [&[u8]; 3] = [b"", &[0, 159, 146, 150], "ünïcödé ✓".as_bytes()];
    for (i, payload) in payloads.iter().enumerate() {
        let path = dir.path().join(format!("payload-{i}"));
        write_file.write_file(&path, payload).await.unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), *payload);
    }
}

/// Scenario B: a failing host primitive surfaces as WriteFailure
#[tokio::test]
async fn test_host_primitive_failure_propagates() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("denied.txt");

    let bindings = host_bindings_with(HostFileWriter::with_primitive(PermissionDenied), None);
    let runner = Runner::new(RunnerConfig::new(bindings)).unwrap();
    let write_file = runner.registry().write_file().unwrap();

    let err = write_file.write_file(&path, b"secret").await.unwrap_err();

    assert_eq!(err.path(), path.as_path());
    assert_eq!(
        err.io_error().map(io::Error::kind),
        Some(io::ErrorKind::PermissionDenied)
    );
    assert!(!path.exists());
}

/// Scenario B through a sample: the failed report write fails the sample
#[tokio::test]
async fn test_failed_report_write_fails_sample() {
    let dir = TempDir::new().unwrap();
    let bindings = host_bindings_with(HostFileWriter::with_primitive(PermissionDenied), None);
    let runner = Runner::new(
        RunnerConfig::new(bindings).with_options(json_options(dir.path(), 2)),
    )
    .unwrap();

    let err = runner
        .sample(SampleRequest::new("denied", || 2 + 2))
        .await
        .unwrap_err();

    assert!(matches!(err, RunnerError::Write(_)));
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

/// Binding precedence: a caller-supplied WRITE_FILE wins over the host one
#[tokio::test]
async fn test_caller_write_file_overrides_host() {
    let (binding, calls) = recording_binding();
    let runner = host_runner(
        Some(BindingList::new().with(binding)),
        RunnerOptions::default(),
    )
    .unwrap();

    let dir = TempDir::new().unwrap();
    let path = dir.path().join("redirected.txt");
    runner
        .registry()
        .write_file()
        .unwrap()
        .write_file(&path, b"data")
        .await
        .unwrap();

    assert_eq!(calls.lock().unwrap().len(), 1);
    assert!(!path.exists());
}

/// Scenario C: a recording binding receives exactly one report write
#[tokio::test]
async fn test_injected_writer_receives_report() {
    let dir = TempDir::new().unwrap();
    let (binding, calls) = recording_binding();
    let bindings = BindingList::new()
        .with(binding)
        .with(Binding::clock(FixedClock::from_millis(1_234)));

    let runner = host_runner(Some(bindings), json_options(dir.path(), 3)).unwrap();
    let state = runner
        .sample(SampleRequest::new("scenario_c", || (0..1_000u64).sum::<u64>()))
        .await
        .unwrap();
    assert_eq!(state.valid.len(), 3);

    let calls = calls.lock().unwrap();
    assert_eq!(calls.len(), 1);

    let (path, content) = &calls[0];
    assert_eq!(path, &dir.path().join("scenario_c_1234.json"));

    let report: serde_json::Value = serde_json::from_slice(content).unwrap();
    assert_eq!(report["description"]["id"], "scenario_c");
    assert_eq!(report["completeSample"].as_array().unwrap().len(), 3);
    assert_eq!(report["validSample"].as_array().unwrap().len(), 3);

    // Nothing reached the real filesystem
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

/// End to end with the real host writer
#[tokio::test]
async fn test_host_runner_persists_report() {
    let dir = TempDir::new().unwrap();
    let options = RunnerOptions {
        validator: ValidatorKind::regression_slope_on_wall_time(),
        max_samples: 500,
        ..json_options(dir.path(), 4)
    };
    let runner = host_runner(None, options).unwrap();

    let data: Vec<u64> = (0..512).rev().collect();
    let mut prepared = 0usize;
    let state = {
        let request = SampleRequest::new("sort", || {
            let mut copy = data.clone();
            copy.sort_unstable();
            copy
        })
        .prepare(|| prepared += 1)
        .describe("len", 512);
        runner.sample(request).await.unwrap()
    };
    assert_eq!(state.valid.len(), 4);
    assert_eq!(prepared, state.completed.len());

    let files: Vec<PathBuf> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .collect();
    assert_eq!(files.len(), 1);
    assert!(
        files[0]
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with("sort_")
    );

    let report: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&files[0]).unwrap()).unwrap();
    assert_eq!(report["description"]["description"]["len"], 512);
    assert_eq!(
        report["description"]["description"]["regressionSlopeMetric"],
        "wallTimeMs"
    );
}

/// Persisting output without WRITE_FILE is a construction error
#[test]
fn test_missing_write_file_fails_construction() {
    let dir = TempDir::new().unwrap();
    let err = Runner::new(RunnerConfig::default().with_options(json_options(dir.path(), 3)))
        .unwrap_err();

    assert!(matches!(
        err,
        RunnerError::Unbound(UnboundCapability(CapabilityId::WriteFile))
    ));
}

/// The registry never changes: repeated lookups return the same implementation
#[test]
fn test_repeated_lookups_are_identical() {
    let runner = host_runner(None, RunnerOptions::default()).unwrap();

    let first = runner.registry().write_file().unwrap();
    for _ in 0..10 {
        let again = runner.registry().write_file().unwrap();
        assert!(Arc::ptr_eq(&first, &again));
    }
}

/// Concurrent writes to distinct paths all complete
#[tokio::test]
async fn test_concurrent_writes() {
    let dir = TempDir::new().unwrap();
    let runner = host_runner(None, RunnerOptions::default()).unwrap();
    let write_file = runner.registry().write_file().unwrap();

    let a = dir.path().join("a.txt");
    let b = dir.path().join("b.txt");
    let c = dir.path().join("c.txt");
    tokio::try_join!(
        write_file.write_file(&a, b"alpha"),
        write_file.write_file(&b, b"beta"),
        write_file.write_file(&c, b"gamma"),
    )
    .unwrap();

    assert_eq!(std::fs::read_to_string(a).unwrap(), "alpha");
    assert_eq!(std::fs::read_to_string(b).unwrap(), "beta");
    assert_eq!(std::fs::read_to_string(c).unwrap(), "gamma");
}
