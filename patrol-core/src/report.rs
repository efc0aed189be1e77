// Report generation from suite results

use crate::runner::{CaseResult, CaseStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ReportFormat {
    Text,
    Json,
    Html,
}

impl ReportFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" => Some(ReportFormat::Text),
            "json" => Some(ReportFormat::Json),
            "html" => Some(ReportFormat::Html),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub base_url: String,
    pub engines: Vec<String>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub cases: Vec<CaseResult>,
}

impl RunReport {
    pub fn passed(&self) -> usize {
        self.cases
            .iter()
            .filter(|c| c.status == CaseStatus::Passed)
            .count()
    }

    pub fn failed(&self) -> usize {
        self.cases
            .iter()
            .filter(|c| c.status == CaseStatus::Failed)
            .count()
    }

    pub fn retried(&self) -> usize {
        self.cases.iter().filter(|c| c.attempts > 1).count()
    }

    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }

    pub fn duration_seconds(&self) -> i64 {
        (self.finished_at - self.started_at).num_seconds()
    }
}

pub fn generate_text_report(report: &RunReport) -> String {
    let mut out = String::new();

    out.push_str("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n");
    out.push_str("                           PATROL SUITE REPORT\n");
    out.push_str("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n\n");

    out.push_str(&format!("Target:       {}\n", report.base_url));
    out.push_str(&format!("Engines:      {}\n", report.engines.join(", ")));
    out.push_str(&format!(
        "Run Date:     {}\n",
        report.started_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    out.push_str(&format!("Duration:     {} seconds\n", report.duration_seconds()));
    out.push_str(&format!(
        "Cases:        {} total, {} passed, {} failed, {} retried\n\n",
        report.cases.len(),
        report.passed(),
        report.failed(),
        report.retried(),
    ));

    if report.failed() > 0 {
        out.push_str("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n");
        out.push_str("FAILED CASES\n");
        out.push_str("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n\n");

        for case in report
            .cases
            .iter()
            .filter(|c| c.status == CaseStatus::Failed)
        {
            out.push_str(&format!("[{}] {}\n", case.group, case.name));
            if let Some(ref engine) = case.engine {
                out.push_str(&format!("Engine:       {}\n", engine));
            }
            out.push_str(&format!("Attempts:     {}\n", case.attempts));
            if let Some(ref error) = case.error {
                out.push_str(&format!("Error:        {}\n", error));
            }
            if let Some(ref trace) = case.trace_path {
                out.push_str(&format!("Trace:        {}\n", trace.display()));
            }
            out.push('\n');
        }
    }

    out.push_str("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n");
    out.push_str(if report.is_success() {
        "                          All cases passed\n"
    } else {
        "                          Suite failed\n"
    });
    out.push_str("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n");

    out
}

pub fn generate_json_report(report: &RunReport) -> Result<String, serde_json::Error> {
    let json_report = serde_json::json!({
        "report": {
            "metadata": {
                "generator": "Patrol",
                "version": env!("CARGO_PKG_VERSION"),
                "generated_at": Utc::now().to_rfc3339(),
                "format": "json"
            },
            "run": {
                "base_url": report.base_url,
                "engines": report.engines,
                "started_at": report.started_at.to_rfc3339(),
                "finished_at": report.finished_at.to_rfc3339(),
                "duration_seconds": report.duration_seconds()
            },
            "summary": {
                "total_cases": report.cases.len(),
                "passed": report.passed(),
                "failed": report.failed(),
                "retried": report.retried(),
                "success": report.is_success()
            },
            "cases": report.cases
        }
    });

    serde_json::to_string_pretty(&json_report)
}

pub fn generate_html_report(report: &RunReport) -> String {
    let mut html = String::new();

    html.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str("<title>Patrol Suite Report</title>\n");
    html.push_str(
        "<style>
body { font-family: -apple-system, sans-serif; margin: 2rem auto; max-width: 64rem; color: #222; }
h1 { border-bottom: 2px solid #222; padding-bottom: 0.5rem; }
table { border-collapse: collapse; width: 100%; margin-top: 1rem; }
th, td { text-align: left; padding: 0.4rem 0.6rem; border-bottom: 1px solid #ddd; }
tr.passed td.status { color: #1a7f37; font-weight: 600; }
tr.failed td.status { color: #cf222e; font-weight: 600; }
td.error { color: #cf222e; font-size: 0.85rem; }
.summary span { margin-right: 1.5rem; }
</style>\n</head>\n<body>\n",
    );

    html.push_str("<h1>Patrol Suite Report</h1>\n");
    html.push_str(&format!(
        "<p class=\"summary\">\
         <span>Target: <strong>{}</strong></span>\
         <span>Engines: {}</span>\
         <span>Started: {}</span>\
         <span>Duration: {}s</span></p>\n",
        escape_html(&report.base_url),
        escape_html(&report.engines.join(", ")),
        report.started_at.format("%Y-%m-%d %H:%M:%S UTC"),
        report.duration_seconds(),
    ));
    html.push_str(&format!(
        "<p class=\"summary\">\
         <span>Total: <strong>{}</strong></span>\
         <span>Passed: <strong>{}</strong></span>\
         <span>Failed: <strong>{}</strong></span>\
         <span>Retried: <strong>{}</strong></span></p>\n",
        report.cases.len(),
        report.passed(),
        report.failed(),
        report.retried(),
    ));

    html.push_str("<table>\n<tr><th>Group</th><th>Case</th><th>Engine</th><th>Status</th><th>Attempts</th><th>Duration</th><th>Detail</th></tr>\n");

    for case in &report.cases {
        let (class, label) = match case.status {
            CaseStatus::Passed => ("passed", "passed"),
            CaseStatus::Failed => ("failed", "failed"),
        };
        let detail = match (&case.error, &case.trace_path) {
            (Some(error), Some(trace)) => format!(
                "<span class=\"error\">{}</span><br>trace: {}",
                escape_html(error),
                escape_html(&trace.display().to_string()),
            ),
            (Some(error), None) => {
                format!("<span class=\"error\">{}</span>", escape_html(error))
            }
            (None, _) => String::new(),
        };
        html.push_str(&format!(
            "<tr class=\"{}\"><td>{}</td><td>{}</td><td>{}</td><td class=\"status\">{}</td><td>{}</td><td>{}ms</td><td>{}</td></tr>\n",
            class,
            escape_html(&case.group),
            escape_html(&case.name),
            escape_html(case.engine.as_deref().unwrap_or("-")),
            label,
            case.attempts,
            case.duration_ms,
            detail,
        ));
    }

    html.push_str("</table>\n");
    html.push_str(&format!(
        "<p><small>Generated by Patrol {} at {}</small></p>\n",
        env!("CARGO_PKG_VERSION"),
        Utc::now().to_rfc3339(),
    ));
    html.push_str("</body>\n</html>\n");

    html
}

pub fn save_report(content: &str, path: &Path) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(content.as_bytes())?;
    Ok(())
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
