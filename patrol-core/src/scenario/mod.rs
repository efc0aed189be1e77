// The three scenario groups. UI-interaction groups (newsletter, link
// health) drive a browser session; crawlability is pure HTTP.

pub mod crawlability;
pub mod links;
pub mod newsletter;

use crate::config::SuiteConfig;
use patrol_browser::{Engine, SessionConfig};

pub(crate) fn session_config(config: &SuiteConfig, engine: Engine) -> SessionConfig {
    SessionConfig {
        engine,
        headless: config.headless,
        ..SessionConfig::default()
    }
}
