use chrono::Utc;
use clap::ArgMatches;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use patrol_browser::Engine;
use patrol_core::report::{
    generate_html_report, generate_json_report, generate_text_report, save_report,
};
use patrol_core::runner::{ProgressCallback, ProgressEvent};
use patrol_core::scenario::{crawlability, links, newsletter};
use patrol_core::{CaseResult, CaseStatus, ReportFormat, RunReport, Runner, SuiteConfig};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Which scenario groups a subcommand runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupSelection {
    All,
    Links,
    Newsletter,
    Crawlability,
}

impl GroupSelection {
    pub fn includes_links(self) -> bool {
        matches!(self, GroupSelection::All | GroupSelection::Links)
    }

    pub fn includes_newsletter(self) -> bool {
        matches!(self, GroupSelection::All | GroupSelection::Newsletter)
    }

    pub fn includes_crawlability(self) -> bool {
        matches!(self, GroupSelection::All | GroupSelection::Crawlability)
    }

    /// Crawlability is plain HTTP; only the other groups need a browser.
    pub fn needs_browser(self) -> bool {
        self.includes_links() || self.includes_newsletter()
    }
}

// Helper functions for building the suite configuration

/// Parse a comma-separated engine list, preserving order and dropping duplicates
pub fn parse_engine_list(raw: &str) -> Result<Vec<Engine>, String> {
    let mut engines = Vec::new();
    for name in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let engine = Engine::from_str(name)
            .ok_or_else(|| format!("unknown engine '{}' (expected chromium, chrome or edge)", name))?;
        if !engines.contains(&engine) {
            engines.push(engine);
        }
    }
    if engines.is_empty() {
        return Err("no engines selected".to_string());
    }
    Ok(engines)
}

/// Environment defaults with command-line flags layered on top
pub fn build_config(matches: &ArgMatches) -> Result<SuiteConfig, String> {
    let mut config = SuiteConfig::from_env()?;

    if let Some(url) = matches.get_one::<Url>("base-url") {
        config.base_url = url.clone();
    }
    if let Some(workers) = matches.get_one::<usize>("workers") {
        config.workers = *workers;
    }
    if let Some(retries) = matches.get_one::<u32>("retries") {
        config.retries = *retries;
    }
    if let Some(raw) = matches.get_one::<String>("engine") {
        config.engines = parse_engine_list(raw)?;
    }
    if let Some(dir) = matches.get_one::<PathBuf>("output-dir") {
        config.output_dir = dir.clone();
        config.broken_links_path = dir.join("broken-links.txt");
    }
    if matches.get_flag("headful") {
        config.headless = false;
    }

    Ok(config)
}

/// Expand the --format flag into the formats to write
pub fn report_formats(raw: &str) -> Vec<ReportFormat> {
    match raw {
        "all" => vec![ReportFormat::Text, ReportFormat::Json, ReportFormat::Html],
        other => ReportFormat::from_str(other).into_iter().collect(),
    }
}

/// Where a report of the given format lands under the output directory
pub fn report_path(output_dir: &Path, format: &ReportFormat) -> PathBuf {
    let extension = match format {
        ReportFormat::Text => "txt",
        ReportFormat::Json => "json",
        ReportFormat::Html => "html",
    };
    output_dir.join(format!("patrol-report.{}", extension))
}

fn base_runner(config: &SuiteConfig) -> Runner {
    Runner::new()
        .with_workers(config.workers)
        .with_retries(config.retries)
        .with_trace_on_first_retry(config.trace_on_first_retry)
        .with_trace_dir(config.trace_dir())
}

fn case_spinner(quiet: bool) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .expect("spinner template is valid"),
    );
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

fn progress_callback(spinner: &ProgressBar) -> ProgressCallback {
    let pb = spinner.clone();
    Arc::new(move |event| match event {
        ProgressEvent::CaseStarted { group, case } => {
            pb.set_message(format!("[{}] {}", group, case));
        }
        ProgressEvent::CaseFinished { group, case, status } => {
            let mark = match status {
                CaseStatus::Passed => "✓".green().bold(),
                CaseStatus::Failed => "✗".red().bold(),
            };
            pb.println(format!("{} [{}] {}", mark, group, case));
        }
    })
}

pub async fn handle_suite(matches: &ArgMatches, selection: GroupSelection, quiet: bool) {
    tracing_subscriber::fmt::init();

    let config = match build_config(matches) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{} {}", "✗".red().bold(), e);
            std::process::exit(2);
        }
    };

    if let Err(e) = std::fs::create_dir_all(&config.output_dir) {
        eprintln!(
            "{} Cannot create output directory {}: {}",
            "✗".red().bold(),
            config.output_dir.display(),
            e
        );
        std::process::exit(2);
    }

    if !quiet {
        println!("\n🛰  Patrolling {}", config.base_url.as_str().bright_white());
        if selection.needs_browser() {
            let names: Vec<&str> = config.engines.iter().map(|e| e.name()).collect();
            println!("Engines: {}", names.join(", "));
        }
        println!("Workers: {}", config.workers);
        println!("Retries: {}\n", config.retries);
    }

    let spinner = case_spinner(quiet);
    let progress = progress_callback(&spinner);

    let config = Arc::new(config);
    let started = Utc::now();
    let mut cases: Vec<CaseResult> = Vec::new();
    let mut aborted_groups = false;

    if selection.includes_crawlability() {
        let runner = base_runner(&config).with_progress_callback(progress.clone());
        match crawlability::run(config.clone(), &runner).await {
            Ok(mut results) => cases.append(&mut results),
            Err(e) => {
                spinner.println(format!(
                    "{} Crawlability group could not run: {}",
                    "✗".red().bold(),
                    e
                ));
                aborted_groups = true;
            }
        }
    }

    if selection.needs_browser() {
        for engine in &config.engines {
            let runner = base_runner(&config)
                .with_engine_label(engine.name())
                .with_progress_callback(progress.clone());

            if selection.includes_newsletter() {
                match newsletter::run(config.clone(), *engine, &runner).await {
                    Ok(mut results) => cases.append(&mut results),
                    Err(e) => {
                        spinner.println(format!(
                            "{} Newsletter group could not run on {}: {}",
                            "✗".red().bold(),
                            engine.name(),
                            e
                        ));
                        aborted_groups = true;
                    }
                }
            }
            if selection.includes_links() {
                match links::run(config.clone(), *engine, &runner).await {
                    Ok(mut results) => cases.append(&mut results),
                    Err(e) => {
                        spinner.println(format!(
                            "{} Link health group could not run on {}: {}",
                            "✗".red().bold(),
                            engine.name(),
                            e
                        ));
                        aborted_groups = true;
                    }
                }
            }
        }
    }

    spinner.finish_and_clear();

    let engines = if selection.needs_browser() {
        config.engines.iter().map(|e| e.name().to_string()).collect()
    } else {
        Vec::new()
    };
    let report = RunReport {
        base_url: config.base_url.to_string(),
        engines,
        started_at: started,
        finished_at: Utc::now(),
        cases,
    };

    write_reports(&report, &config, matches);

    if !quiet {
        println!();
        println!(
            "{} {} passed, {} failed, {} retried",
            if report.is_success() && !aborted_groups {
                "✓".green().bold()
            } else {
                "✗".red().bold()
            },
            report.passed(),
            report.failed(),
            report.retried(),
        );
    }

    if !report.is_success() || aborted_groups {
        std::process::exit(1);
    }
}

fn write_reports(report: &RunReport, config: &SuiteConfig, matches: &ArgMatches) {
    let raw_format = matches
        .get_one::<String>("format")
        .map(String::as_str)
        .unwrap_or("all");

    for format in report_formats(raw_format) {
        let content = match format {
            ReportFormat::Text => generate_text_report(report),
            ReportFormat::Html => generate_html_report(report),
            ReportFormat::Json => match generate_json_report(report) {
                Ok(json) => json,
                Err(e) => {
                    eprintln!("{} Failed to render JSON report: {}", "✗".red().bold(), e);
                    continue;
                }
            },
        };

        let path = report_path(&config.output_dir, &format);
        match save_report(&content, &path) {
            Ok(()) => tracing::info!("Report written to {}", path.display()),
            Err(e) => eprintln!(
                "{} Failed to write report {}: {}",
                "✗".red().bold(),
                path.display(),
                e
            ),
        }
    }
}
