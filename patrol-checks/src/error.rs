use thiserror::Error;

#[derive(Error, Debug)]
pub enum CheckError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Sitemap parse error: {0}")]
    SitemapError(String),

    #[error("Sitemap at {0} lists no URLs")]
    EmptySitemap(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Unexpected status for {url}: {status}")]
    UnexpectedStatus { url: String, status: u16 },

    #[error("Other error: {0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, CheckError>;
