use crate::error::{CheckError, Result};
use reqwest::Client;
use tracing::info;
use url::Url;

/// Raw `robots.txt` text queried for literal `Disallow` lines.
///
/// No structured parse model: the audit only cares whether an important
/// path is named by an exact `Disallow: <path>` directive.
pub struct RobotsAudit {
    text: String,
}

impl RobotsAudit {
    pub fn from_text(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Fetch `<base>/robots.txt` as plain text.
    pub async fn fetch(client: &Client, base: &Url) -> Result<Self> {
        let robots_url = base
            .join("/robots.txt")
            .map_err(|e| CheckError::InvalidUrl(e.to_string()))?;

        let response = client.get(robots_url.as_str()).send().await?;
        let status = response.status().as_u16();
        if !response.status().is_success() {
            return Err(CheckError::UnexpectedStatus {
                url: robots_url.to_string(),
                status,
            });
        }

        let text = response.text().await?;
        info!("{}: {} bytes", robots_url, text.len());
        Ok(Self::from_text(text))
    }

    /// True if a line reads exactly `Disallow: <path>`.
    pub fn disallows(&self, path: &str) -> bool {
        let directive = format!("Disallow: {}", path);
        self.text.lines().any(|line| line.trim() == directive)
    }

    /// The subset of `paths` named by a literal `Disallow` line.
    pub fn disallowed_among<'a>(&self, paths: &'a [String]) -> Vec<&'a str> {
        paths
            .iter()
            .filter(|path| self.disallows(path))
            .map(String::as_str)
            .collect()
    }
}
