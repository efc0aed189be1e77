pub mod error;
pub mod links;
pub mod result;
pub mod robots;
pub mod sitemap;

pub use error::CheckError;
pub use links::{BrokenLinkLog, LinkHealthChecker};
pub use result::{LinkCheck, SitemapCheck};
pub use robots::RobotsAudit;
pub use sitemap::SitemapAuditor;

use reqwest::Client;

/// Shared HTTP client for all check components.
pub fn build_client(timeout_secs: u64) -> Client {
    Client::builder()
        .user_agent("Patrol/0.1 (https://github.com/trapdoorsec/patrol)")
        .timeout(std::time::Duration::from_secs(timeout_secs))
        .connect_timeout(std::time::Duration::from_secs(timeout_secs / 2))
        .pool_max_idle_per_host(50)
        .pool_idle_timeout(std::time::Duration::from_secs(90))
        .tcp_keepalive(std::time::Duration::from_secs(60))
        .redirect(reqwest::redirect::Policy::limited(5))
        .build()
        .expect("Failed to create HTTP client")
}
