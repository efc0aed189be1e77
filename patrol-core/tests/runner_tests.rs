// Tests for the scenario runner: retries, isolation, timeouts, traces

use anyhow::anyhow;
use futures::FutureExt;
use patrol_core::runner::ProgressEvent;
use patrol_core::{Case, CaseStatus, Runner, ScenarioGroup};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

fn group(name: &str, parallel: bool, cases: Vec<Case>) -> ScenarioGroup {
    ScenarioGroup {
        name: name.to_string(),
        parallel,
        case_timeout: Duration::from_secs(5),
        cases,
    }
}

fn passing_case(name: &str) -> Case {
    Case::new(name, |_ctx| async { Ok(()) }.boxed())
}

fn failing_case(name: &str) -> Case {
    Case::new(name, |_ctx| {
        async { Err(anyhow!("deliberate failure")) }.boxed()
    })
}

/// Fails until `failures` attempts have been burned, then passes.
fn flaky_case(name: &str, failures: u32) -> Case {
    let attempts = Arc::new(AtomicU32::new(0));
    Case::new(name, move |_ctx| {
        let attempts = attempts.clone();
        async move {
            if attempts.fetch_add(1, Ordering::SeqCst) < failures {
                Err(anyhow!("not yet"))
            } else {
                Ok(())
            }
        }
        .boxed()
    })
}

#[tokio::test]
async fn test_passing_case_runs_once() {
    let runner = Runner::new().with_retries(2);
    let results = runner.run_group(group("g", true, vec![passing_case("ok")])).await;

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].status, CaseStatus::Passed);
    assert_eq!(results[0].attempts, 1);
    assert!(results[0].error.is_none());
}

#[tokio::test]
async fn test_retry_recovers_a_flaky_case() {
    let runner = Runner::new()
        .with_retries(1)
        .with_trace_on_first_retry(false);
    let results = runner
        .run_group(group("g", false, vec![flaky_case("flaky", 1)]))
        .await;

    assert_eq!(results[0].status, CaseStatus::Passed);
    assert_eq!(results[0].attempts, 2);
}

#[tokio::test]
async fn test_retries_exhausted_reports_last_error() {
    let runner = Runner::new()
        .with_retries(1)
        .with_trace_on_first_retry(false);
    let results = runner.run_group(group("g", true, vec![failing_case("bad")])).await;

    assert_eq!(results[0].status, CaseStatus::Failed);
    assert_eq!(results[0].attempts, 2);
    assert_eq!(results[0].error.as_deref(), Some("deliberate failure"));
}

#[tokio::test]
async fn test_failure_does_not_abort_siblings() {
    let runner = Runner::new().with_retries(0).with_workers(2);
    let results = runner
        .run_group(group(
            "g",
            true,
            vec![failing_case("bad"), passing_case("ok"), passing_case("ok2")],
        ))
        .await;

    assert_eq!(results.len(), 3);
    let passed = results
        .iter()
        .filter(|r| r.status == CaseStatus::Passed)
        .count();
    assert_eq!(passed, 2);
}

#[tokio::test]
async fn test_sequential_group_preserves_case_order() {
    let runner = Runner::new().with_retries(0);
    let results = runner
        .run_group(group(
            "g",
            false,
            vec![passing_case("first"), passing_case("second")],
        ))
        .await;

    assert_eq!(results[0].name, "first");
    assert_eq!(results[1].name, "second");
}

#[tokio::test]
async fn test_case_timeout_is_a_failure() {
    let runner = Runner::new()
        .with_retries(0)
        .with_trace_on_first_retry(false);
    let stuck = Case::new("stuck", |_ctx| {
        async {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(())
        }
        .boxed()
    });
    let g = ScenarioGroup {
        name: "g".to_string(),
        parallel: false,
        case_timeout: Duration::from_millis(50),
        cases: vec![stuck],
    };

    let results = runner.run_group(g).await;

    assert_eq!(results[0].status, CaseStatus::Failed);
    assert!(results[0].error.as_deref().unwrap().contains("ceiling"));
}

#[tokio::test]
async fn test_trace_written_on_first_retry() {
    let dir = tempfile::tempdir().unwrap();
    let runner = Runner::new()
        .with_retries(1)
        .with_trace_dir(dir.path());

    let recorded = Case::new("flaky with steps", {
        let attempts = Arc::new(AtomicU32::new(0));
        move |ctx| {
            let attempts = attempts.clone();
            async move {
                ctx.step("probe", async { Ok(()) }).await?;
                if attempts.fetch_add(1, Ordering::SeqCst) == 0 {
                    Err(anyhow!("first attempt fails"))
                } else {
                    Ok(())
                }
            }
            .boxed()
        }
    });

    let results = runner.run_group(group("g", false, vec![recorded])).await;

    assert_eq!(results[0].status, CaseStatus::Passed);
    let trace = results[0].trace_path.as_ref().expect("retry should record a trace");
    assert!(trace.exists());
    let content = std::fs::read_to_string(trace).unwrap();
    assert!(content.contains("probe"));
}

#[tokio::test]
async fn test_no_trace_without_a_retry() {
    let dir = tempfile::tempdir().unwrap();
    let runner = Runner::new()
        .with_retries(2)
        .with_trace_dir(dir.path());

    let results = runner.run_group(group("g", false, vec![passing_case("ok")])).await;

    assert!(results[0].trace_path.is_none());
}

#[tokio::test]
async fn test_engine_label_is_attached_to_results() {
    let runner = Runner::new().with_engine_label("chromium");
    let results = runner.run_group(group("g", true, vec![passing_case("ok")])).await;

    assert_eq!(results[0].engine.as_deref(), Some("chromium"));
}

#[tokio::test]
async fn test_progress_events_bracket_each_case() {
    let events: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = events.clone();
    let runner = Runner::new()
        .with_retries(0)
        .with_progress_callback(Arc::new(move |event| {
            let line = match event {
                ProgressEvent::CaseStarted { case, .. } => format!("start {}", case),
                ProgressEvent::CaseFinished { case, status, .. } => {
                    format!("finish {} {:?}", case, status)
                }
            };
            sink.lock().unwrap().push(line);
        }));

    runner
        .run_group(group("g", false, vec![passing_case("ok"), failing_case("bad")]))
        .await;

    let seen = events.lock().unwrap();
    assert_eq!(
        *seen,
        vec![
            "start ok".to_string(),
            "finish ok Passed".to_string(),
            "start bad".to_string(),
            "finish bad Failed".to_string(),
        ]
    );
}
