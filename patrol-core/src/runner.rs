use crate::trace::CaseContext;
use futures::future::BoxFuture;
use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Callback for reporting case lifecycle events.
pub type ProgressCallback = Arc<dyn Fn(ProgressEvent) + Send + Sync>;

#[derive(Debug, Clone)]
pub enum ProgressEvent {
    CaseStarted { group: String, case: String },
    CaseFinished { group: String, case: String, status: CaseStatus },
}

type CaseFn = Arc<dyn Fn(CaseContext) -> BoxFuture<'static, anyhow::Result<()>> + Send + Sync>;

/// One scenario: a name plus a factory that produces a fresh run of it.
///
/// The factory shape matters for retries: a failed case is re-executed
/// from scratch, never resumed.
pub struct Case {
    pub name: String,
    run: CaseFn,
}

impl Case {
    pub fn new<F>(name: impl Into<String>, run: F) -> Self
    where
        F: Fn(CaseContext) -> BoxFuture<'static, anyhow::Result<()>> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            run: Arc::new(run),
        }
    }
}

/// An independent group of cases sharing a suspension/timeout profile.
pub struct ScenarioGroup {
    pub name: String,
    /// Sequential groups share state (one browser session) across cases.
    pub parallel: bool,
    /// Per-case ceiling; a timed-out case fails without touching siblings.
    pub case_timeout: Duration,
    pub cases: Vec<Case>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaseStatus {
    Passed,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseResult {
    pub group: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub engine: Option<String>,
    pub status: CaseStatus,
    pub attempts: u32,
    pub duration_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace_path: Option<PathBuf>,
}

/// Executes scenario groups through a bounded worker pool with a
/// retry-from-scratch policy.
pub struct Runner {
    workers: usize,
    retries: u32,
    trace_on_first_retry: bool,
    trace_dir: PathBuf,
    engine_label: Option<String>,
    progress_callback: Option<ProgressCallback>,
}

impl Runner {
    pub fn new() -> Self {
        Self {
            workers: 4,
            retries: 1,
            trace_on_first_retry: true,
            trace_dir: PathBuf::from("patrol-traces"),
            engine_label: None,
            progress_callback: None,
        }
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    pub fn with_trace_on_first_retry(mut self, enabled: bool) -> Self {
        self.trace_on_first_retry = enabled;
        self
    }

    pub fn with_trace_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.trace_dir = dir.into();
        self
    }

    pub fn with_engine_label(mut self, label: impl Into<String>) -> Self {
        self.engine_label = Some(label.into());
        self
    }

    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// Run every case of a group to completion. One case's failure never
    /// aborts its siblings.
    pub async fn run_group(&self, group: ScenarioGroup) -> Vec<CaseResult> {
        info!(
            "Running group '{}' ({} cases, {})",
            group.name,
            group.cases.len(),
            if group.parallel { "parallel" } else { "sequential" },
        );

        let group_name = group.name.clone();
        let timeout = group.case_timeout;

        if group.parallel {
            stream::iter(group.cases)
                .map(|case| self.run_case(&group_name, case, timeout))
                .buffer_unordered(self.workers)
                .collect()
                .await
        } else {
            let mut results = Vec::with_capacity(group.cases.len());
            for case in group.cases {
                results.push(self.run_case(&group_name, case, timeout).await);
            }
            results
        }
    }

    async fn run_case(&self, group: &str, case: Case, timeout: Duration) -> CaseResult {
        self.emit(ProgressEvent::CaseStarted {
            group: group.to_string(),
            case: case.name.clone(),
        });

        let attempts_allowed = self.retries + 1;
        let mut last_error = String::new();
        let mut trace_path = None;
        let started = Instant::now();

        for attempt in 0..attempts_allowed {
            let recording = self.trace_on_first_retry && attempt >= 1;
            let ctx = CaseContext::new(group, &case.name, attempt, recording);

            let outcome = tokio::time::timeout(timeout, (case.run)(ctx.clone())).await;

            if recording {
                match ctx.write(&self.trace_dir) {
                    Ok(path) => trace_path = path,
                    Err(e) => warn!("Failed to write trace for '{}': {}", case.name, e),
                }
            }

            match outcome {
                Ok(Ok(())) => {
                    let result = CaseResult {
                        group: group.to_string(),
                        name: case.name.clone(),
                        engine: self.engine_label.clone(),
                        status: CaseStatus::Passed,
                        attempts: attempt + 1,
                        duration_ms: started.elapsed().as_millis() as u64,
                        error: None,
                        trace_path,
                    };
                    self.emit(ProgressEvent::CaseFinished {
                        group: group.to_string(),
                        case: case.name.clone(),
                        status: CaseStatus::Passed,
                    });
                    return result;
                }
                Ok(Err(e)) => {
                    last_error = format!("{:#}", e);
                    warn!(
                        "Case '{}' failed on attempt {}: {}",
                        case.name,
                        attempt + 1,
                        last_error
                    );
                }
                Err(_) => {
                    last_error = format!("case exceeded its {}s ceiling", timeout.as_secs());
                    warn!(
                        "Case '{}' timed out on attempt {}",
                        case.name,
                        attempt + 1
                    );
                }
            }
        }

        self.emit(ProgressEvent::CaseFinished {
            group: group.to_string(),
            case: case.name.clone(),
            status: CaseStatus::Failed,
        });

        CaseResult {
            group: group.to_string(),
            name: case.name,
            engine: self.engine_label.clone(),
            status: CaseStatus::Failed,
            attempts: attempts_allowed,
            duration_ms: started.elapsed().as_millis() as u64,
            error: Some(last_error),
            trace_path,
        }
    }

    fn emit(&self, event: ProgressEvent) {
        if let Some(ref callback) = self.progress_callback {
            callback(event);
        }
    }
}

impl Default for Runner {
    fn default() -> Self {
        Self::new()
    }
}
