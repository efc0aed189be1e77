use crate::error::{CheckError, Result};
use crate::result::LinkCheck;
use reqwest::Client;
use scraper::{Html, Selector};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, error, warn};
use url::Url;

/// Append-only sink for confirmed 404 URLs.
///
/// One line per broken link, written with a single `write_all` on an
/// `O_APPEND` handle so concurrent checkers never interleave lines.
#[derive(Debug, Clone)]
pub struct BrokenLinkLog {
    path: PathBuf,
}

impl BrokenLinkLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&self, url: &str) -> std::io::Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(format!("{}\n", url).as_bytes())
    }
}

/// Checks every qualifying anchor on a page for a 404 response.
pub struct LinkHealthChecker {
    client: Client,
    max_links: usize,
    log: Option<BrokenLinkLog>,
}

impl LinkHealthChecker {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            max_links: 30,
            log: None,
        }
    }

    pub fn with_max_links(mut self, max_links: usize) -> Self {
        self.max_links = max_links;
        self
    }

    pub fn with_log(mut self, log: BrokenLinkLog) -> Self {
        self.log = Some(log);
        self
    }

    /// Extract raw href candidates from rendered HTML, in document order.
    ///
    /// Fragment, `mailto:`, and `javascript:` hrefs never qualify; empty
    /// hrefs are dropped before resolution.
    pub fn extract_candidates(html: &str) -> Vec<String> {
        let document = Html::parse_document(html);
        let link_selector = Selector::parse("a[href]").unwrap();

        document
            .select(&link_selector)
            .filter_map(|element| element.value().attr("href"))
            .filter(|href| {
                !href.is_empty()
                    && !href.starts_with('#')
                    && !href.starts_with("mailto:")
                    && !href.starts_with("javascript:")
            })
            .map(|href| href.to_string())
            .collect()
    }

    /// Resolve a candidate against the page URL. Malformed candidates are
    /// skipped with a warning, never a failure.
    pub fn resolve_candidate(base: &Url, href: &str) -> Option<Url> {
        match base.join(href) {
            Ok(resolved) => Some(resolved),
            Err(e) => {
                warn!("Skipping malformed URL {}: {}", href, e);
                None
            }
        }
    }

    /// Check the first `max_links` qualifying candidates extracted from
    /// `html`, resolved against `page_url`.
    ///
    /// Every confirmed 404 is appended to the broken-link log. Transport
    /// errors fail the whole check after being logged.
    pub async fn check_page(&self, page_url: &Url, html: &str) -> Result<Vec<LinkCheck>> {
        let candidates = Self::extract_candidates(html);
        debug!(
            "{}: {} candidate links, checking at most {}",
            page_url, candidates.len(), self.max_links
        );

        let mut checks = Vec::new();

        for href in candidates.iter().take(self.max_links) {
            let Some(resolved) = Self::resolve_candidate(page_url, href) else {
                continue;
            };
            checks.push(self.check_link(resolved.as_str()).await?);
        }

        Ok(checks)
    }

    /// Issue a single GET and classify the response.
    pub async fn check_link(&self, url: &str) -> Result<LinkCheck> {
        debug!("Checking: {}", url);

        let start = Instant::now();
        let response = self.client.get(url).send().await.map_err(|e| {
            error!("Error checking {}: {}", url, e);
            CheckError::from(e)
        })?;
        let response_time = start.elapsed();

        let check = LinkCheck::new(url.to_string(), response.status().as_u16(), response_time);

        if check.broken {
            error!("Broken link: {}", url);
            if let Some(ref log) = self.log {
                log.append(url)?;
            }
        }

        Ok(check)
    }
}
