use crate::error::BrowserError;
use crate::page::Page;
use crate::Result;
use chromiumoxide::browser::{Browser, BrowserConfig};
use futures::StreamExt;
use std::env;
use tracing::{debug, info};

/// Browser execution matrix entry.
///
/// The suite runs against Chromium-family channels; each engine resolves
/// to an executable, overridable via `PATROL_<ENGINE>_BIN`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Engine {
    Chromium,
    Chrome,
    Edge,
}

impl Engine {
    pub const ALL: [Engine; 3] = [Engine::Chromium, Engine::Chrome, Engine::Edge];

    pub fn name(self) -> &'static str {
        match self {
            Engine::Chromium => "chromium",
            Engine::Chrome => "chrome",
            Engine::Edge => "edge",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "chromium" => Some(Engine::Chromium),
            "chrome" => Some(Engine::Chrome),
            "edge" => Some(Engine::Edge),
            _ => None,
        }
    }

    fn env_override(self) -> String {
        format!("PATROL_{}_BIN", self.name().to_uppercase())
    }

    /// Executable to launch, if one must be named explicitly.
    ///
    /// `Chromium` with no override returns `None` and lets the CDP layer
    /// auto-detect an installed browser.
    pub fn executable(self) -> Option<String> {
        if let Ok(path) = env::var(self.env_override()) {
            return Some(path);
        }
        match self {
            Engine::Chromium => None,
            Engine::Chrome => Some("google-chrome".to_string()),
            Engine::Edge => Some("microsoft-edge".to_string()),
        }
    }
}

impl std::fmt::Display for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Launch options for one browser session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub engine: Engine,
    pub headless: bool,
    pub viewport: (u32, u32),
    pub sandbox: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            engine: Engine::Chromium,
            headless: true,
            viewport: (1280, 720),
            sandbox: true,
        }
    }
}

impl SessionConfig {
    pub fn for_engine(engine: Engine) -> Self {
        Self {
            engine,
            ..Self::default()
        }
    }

    pub fn browser_config(&self) -> std::result::Result<BrowserConfig, String> {
        let mut builder = BrowserConfig::builder().window_size(self.viewport.0, self.viewport.1);

        if !self.headless {
            builder = builder.with_head();
        }
        if !self.sandbox {
            builder = builder.no_sandbox();
        }
        if let Some(executable) = self.engine.executable() {
            builder = builder.chrome_executable(executable);
        }

        builder.build()
    }
}

/// One live browser process plus its CDP event loop.
///
/// A session is shared across the cases of a scenario group and closed
/// explicitly at group teardown.
pub struct BrowserSession {
    engine: Engine,
    browser: Browser,
    handle: tokio::task::JoinHandle<()>,
}

impl BrowserSession {
    pub async fn launch(config: SessionConfig) -> Result<Self> {
        let engine = config.engine;
        info!("Launching {} session", engine);

        let browser_config = config.browser_config().map_err(BrowserError::Launch)?;
        let (browser, mut handler) = Browser::launch(browser_config)
            .await
            .map_err(|e| BrowserError::Launch(e.to_string()))?;

        // CDP messages keep flowing until the browser goes away.
        let handle = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
            debug!("CDP handler loop finished");
        });

        Ok(Self {
            engine,
            browser,
            handle,
        })
    }

    pub fn engine(&self) -> Engine {
        self.engine
    }

    pub async fn new_page(&self) -> Result<Page> {
        let page = self.browser.new_page("about:blank").await?;
        Ok(Page::new(page))
    }

    pub async fn close(mut self) -> Result<()> {
        self.browser.close().await?;
        let _ = self.browser.wait().await;
        self.handle.abort();
        Ok(())
    }
}
