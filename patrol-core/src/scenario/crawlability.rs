use crate::config::SuiteConfig;
use crate::runner::{Case, CaseResult, Runner, ScenarioGroup};
use crate::trace::CaseContext;
use anyhow::ensure;
use futures::FutureExt;
use patrol_checks::{RobotsAudit, SitemapAuditor};
use std::sync::Arc;

pub const GROUP: &str = "crawlability";

/// Pure-HTTP group: no browser involved, so it runs once per suite
/// regardless of the engine matrix.
pub async fn run(config: Arc<SuiteConfig>, runner: &Runner) -> anyhow::Result<Vec<CaseResult>> {
    let sitemap_config = config.clone();
    let robots_config = config.clone();

    let cases = vec![
        Case::new(
            "sitemap URLs are accessible and crawlable",
            move |ctx| {
                let config = sitemap_config.clone();
                async move { audit_sitemap(&config, &ctx).await }.boxed()
            },
        ),
        Case::new(
            "important pages are not blocked in robots.txt",
            move |ctx| {
                let config = robots_config.clone();
                async move { audit_robots(&config, &ctx).await }.boxed()
            },
        ),
    ];

    let group = ScenarioGroup {
        name: GROUP.to_string(),
        parallel: true,
        case_timeout: config.crawl_case_timeout,
        cases,
    };

    Ok(runner.run_group(group).await)
}

async fn audit_sitemap(config: &SuiteConfig, ctx: &CaseContext) -> anyhow::Result<()> {
    let auditor = SitemapAuditor::new(patrol_checks::build_client(config.http_timeout_secs))
        .with_max_urls(config.max_sitemap_urls);

    // Parsing must precede sampling; the sample is the first N in
    // document order.
    let urls = ctx
        .step("fetch and parse sitemap.xml", async {
            Ok(auditor.fetch_urls(&config.base_url).await?)
        })
        .await?;

    for url in urls.iter().take(config.max_sitemap_urls) {
        let check = ctx
            .step(format!("checking {}", url), async {
                Ok(auditor.check_url(url).await?)
            })
            .await?;

        ensure!(
            check.status_code < 500,
            "URL failed: {} with status code {}",
            check.url,
            check.status_code,
        );
        ensure!(
            !check.noindex,
            "Unexpected noindex tag found at {}",
            check.url,
        );
    }

    Ok(())
}

async fn audit_robots(config: &SuiteConfig, ctx: &CaseContext) -> anyhow::Result<()> {
    let client = patrol_checks::build_client(config.http_timeout_secs);
    let audit = ctx
        .step("fetch robots.txt", async {
            Ok(RobotsAudit::fetch(&client, &config.base_url).await?)
        })
        .await?;

    for path in &config.important_paths {
        ensure!(
            !audit.disallows(path),
            "{} is disallowed in robots.txt",
            path,
        );
    }

    Ok(())
}
