// Step traces captured on retry, for post-hoc diagnosis of flaky cases.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Instant;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceStep {
    pub name: String,
    pub started_at: DateTime<Utc>,
    pub duration_ms: u64,
    pub outcome: String,
}

struct ContextInner {
    group: String,
    case: String,
    attempt: u32,
    recording: bool,
    steps: Mutex<Vec<TraceStep>>,
}

/// Handed to every case; wraps its steps with timing and, on retry
/// attempts, records them for the trace file.
#[derive(Clone)]
pub struct CaseContext {
    inner: Arc<ContextInner>,
}

impl CaseContext {
    pub fn new(group: &str, case: &str, attempt: u32, recording: bool) -> Self {
        Self {
            inner: Arc::new(ContextInner {
                group: group.to_string(),
                case: case.to_string(),
                attempt,
                recording,
                steps: Mutex::new(Vec::new()),
            }),
        }
    }

    pub fn group(&self) -> &str {
        &self.inner.group
    }

    pub fn case(&self) -> &str {
        &self.inner.case
    }

    pub fn attempt(&self) -> u32 {
        self.inner.attempt
    }

    /// Run one named step, recording its timing and outcome.
    pub async fn step<T>(
        &self,
        name: impl Into<String>,
        fut: impl Future<Output = anyhow::Result<T>>,
    ) -> anyhow::Result<T> {
        let name = name.into();
        let started_at = Utc::now();
        let start = Instant::now();
        let result = fut.await;

        if self.inner.recording {
            let outcome = match &result {
                Ok(_) => "passed".to_string(),
                Err(e) => format!("failed: {}", e),
            };
            let mut steps = self.inner.steps.lock().expect("trace mutex poisoned");
            steps.push(TraceStep {
                name,
                started_at,
                duration_ms: start.elapsed().as_millis() as u64,
                outcome,
            });
        }

        result
    }

    /// Write the recorded steps to `dir`, one JSON file per attempt.
    /// Returns `None` when this context was not recording.
    pub fn write(&self, dir: &Path) -> std::io::Result<Option<PathBuf>> {
        if !self.inner.recording {
            return Ok(None);
        }

        std::fs::create_dir_all(dir)?;
        let file_name = format!(
            "{}-{}-attempt-{}.json",
            sanitize(&self.inner.group),
            sanitize(&self.inner.case),
            self.inner.attempt,
        );
        let path = dir.join(file_name);

        let steps = self.inner.steps.lock().expect("trace mutex poisoned");
        let document = serde_json::json!({
            "group": self.inner.group,
            "case": self.inner.case,
            "attempt": self.inner.attempt,
            "recorded_at": Utc::now().to_rfc3339(),
            "steps": *steps,
        });

        std::fs::write(&path, serde_json::to_string_pretty(&document)?)?;
        Ok(Some(path))
    }
}

fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect()
}
