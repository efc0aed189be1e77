use crate::config::SuiteConfig;
use crate::runner::{Case, CaseResult, Runner, ScenarioGroup};
use crate::scenario::session_config;
use crate::trace::CaseContext;
use anyhow::{anyhow, ensure};
use futures::FutureExt;
use patrol_browser::{BrowserSession, Engine};
use patrol_checks::{BrokenLinkLog, LinkHealthChecker};
use std::sync::Arc;
use url::Url;

pub const GROUP: &str = "link health";

/// One case per configured page: load it, check its first links for 404s.
pub async fn run(
    config: Arc<SuiteConfig>,
    engine: Engine,
    runner: &Runner,
) -> anyhow::Result<Vec<CaseResult>> {
    let pages = config.page_urls().map_err(|e| anyhow!(e))?;

    let cases = pages
        .into_iter()
        .map(|page_url| {
            let config = config.clone();
            Case::new(format!("no broken links on {}", page_url), move |ctx| {
                let config = config.clone();
                let page_url = page_url.clone();
                async move { check_page_links(&config, engine, &page_url, &ctx).await }.boxed()
            })
        })
        .collect();

    let group = ScenarioGroup {
        name: GROUP.to_string(),
        parallel: true,
        case_timeout: config.link_case_timeout,
        cases,
    };

    Ok(runner.run_group(group).await)
}

async fn check_page_links(
    config: &SuiteConfig,
    engine: Engine,
    page_url: &Url,
    ctx: &CaseContext,
) -> anyhow::Result<()> {
    // Load the page in a real browser so client-rendered links count too.
    let session = BrowserSession::launch(session_config(config, engine)).await?;
    let loaded = load_rendered_html(&session, page_url).await;
    if let Err(e) = session.close().await {
        tracing::warn!("Failed to close browser session: {}", e);
    }
    let html = loaded?;

    let checker = LinkHealthChecker::new(patrol_checks::build_client(config.http_timeout_secs))
        .with_max_links(config.max_links_per_page)
        .with_log(BrokenLinkLog::new(&config.broken_links_path));

    let candidates = LinkHealthChecker::extract_candidates(&html);
    let mut broken = Vec::new();

    for href in candidates.iter().take(config.max_links_per_page) {
        let Some(resolved) = LinkHealthChecker::resolve_candidate(page_url, href) else {
            continue;
        };
        let check = ctx
            .step(format!("checking {}", resolved), async {
                Ok(checker.check_link(resolved.as_str()).await?)
            })
            .await?;
        if check.broken {
            broken.push(check.url);
        }
    }

    ensure!(
        broken.is_empty(),
        "broken links on {}: {}",
        page_url,
        broken.join(", "),
    );
    Ok(())
}

async fn load_rendered_html(session: &BrowserSession, page_url: &Url) -> anyhow::Result<String> {
    let page = session.new_page().await?;
    page.goto(page_url.as_str()).await?;
    Ok(page.content().await?)
}
