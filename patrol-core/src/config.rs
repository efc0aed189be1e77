use patrol_browser::Engine;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

/// Options for one suite run.
///
/// Defaults target the production marketing site; `BASE_URL` and `CI` are
/// honored from the environment, everything else comes from flags.
#[derive(Debug, Clone)]
pub struct SuiteConfig {
    pub base_url: Url,
    /// Pages the link-health group loads, as paths under `base_url`.
    pub pages_to_check: Vec<String>,
    /// Paths that must never be disallowed in robots.txt.
    pub important_paths: Vec<String>,
    /// Browser execution matrix.
    pub engines: Vec<Engine>,
    pub retries: u32,
    pub workers: usize,
    pub headless: bool,
    pub trace_on_first_retry: bool,
    /// Reports and traces land here.
    pub output_dir: PathBuf,
    pub broken_links_path: PathBuf,
    pub max_links_per_page: usize,
    pub max_sitemap_urls: usize,
    /// Ceiling for UI state transitions (element waits, URL waits).
    pub ui_timeout: Duration,
    /// Wall-clock ceiling from fill start to submit completion.
    pub submit_ceiling: Duration,
    /// Per-case ceiling for the newsletter group.
    pub form_case_timeout: Duration,
    /// Per-case ceiling for the link-health group.
    pub link_case_timeout: Duration,
    /// Per-case ceiling for the crawlability group.
    pub crawl_case_timeout: Duration,
    pub http_timeout_secs: u64,
    pub expected_title_fragment: String,
}

impl Default for SuiteConfig {
    fn default() -> Self {
        Self {
            base_url: Url::parse("https://www.netlify.com/").expect("default base URL parses"),
            pages_to_check: vec!["/".to_string(), "/pricing/".to_string()],
            important_paths: vec![
                "/pricing/".to_string(),
                "/platform/".to_string(),
                "/login/".to_string(),
            ],
            engines: Engine::ALL.to_vec(),
            retries: 1,
            workers: 4,
            headless: true,
            trace_on_first_retry: true,
            output_dir: PathBuf::from("."),
            broken_links_path: PathBuf::from("broken-links.txt"),
            max_links_per_page: 30,
            max_sitemap_urls: 20,
            ui_timeout: Duration::from_secs(10),
            submit_ceiling: Duration::from_secs(8),
            form_case_timeout: Duration::from_secs(30),
            link_case_timeout: Duration::from_secs(2 * 60),
            crawl_case_timeout: Duration::from_secs(5 * 60),
            http_timeout_secs: 30,
            expected_title_fragment: "Netlify".to_string(),
        }
    }
}

impl SuiteConfig {
    /// Defaults plus environment overrides.
    pub fn from_env() -> Result<Self, String> {
        let mut config = Self::default();
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Apply environment overrides through a lookup function.
    ///
    /// `BASE_URL` replaces the target site. `CI` tightens the runner the
    /// way a shared pipeline wants it: more retries, one worker.
    pub fn apply_env(
        &mut self,
        get: impl Fn(&str) -> Option<String>,
    ) -> Result<(), String> {
        if let Some(raw) = get("BASE_URL") {
            self.base_url = Url::parse(&raw)
                .map_err(|e| format!("BASE_URL '{}' is not a valid URL: {}", raw, e))?;
        }
        if get("CI").is_some() {
            self.retries = 2;
            self.workers = 1;
        }
        Ok(())
    }

    /// Absolute URLs for the pages the link-health group checks.
    pub fn page_urls(&self) -> Result<Vec<Url>, String> {
        self.pages_to_check
            .iter()
            .map(|path| {
                self.base_url
                    .join(path)
                    .map_err(|e| format!("cannot resolve page '{}': {}", path, e))
            })
            .collect()
    }

    pub fn trace_dir(&self) -> PathBuf {
        self.output_dir.join("patrol-traces")
    }
}
