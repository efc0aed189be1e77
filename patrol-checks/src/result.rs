use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Outcome of one link-health probe.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkCheck {
    pub url: String,
    pub status_code: u16,
    pub response_time: Duration,
    pub broken: bool,
}

impl LinkCheck {
    pub fn new(url: String, status_code: u16, response_time: Duration) -> Self {
        Self {
            url,
            status_code,
            response_time,
            // Only an exact 404 counts as broken; 500s and friends are
            // someone else's problem.
            broken: status_code == 404,
        }
    }
}

/// Outcome of one sampled sitemap URL.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SitemapCheck {
    pub url: String,
    pub status_code: u16,
    pub noindex: bool,
}

impl SitemapCheck {
    /// Crawlable means any status below 500 (4xx tolerated, 403 included)
    /// and no robots noindex tag in the body.
    pub fn is_crawlable(&self) -> bool {
        self.status_code < 500 && !self.noindex
    }
}
