// Tests for suite configuration and environment overrides

use patrol_core::SuiteConfig;
use std::collections::HashMap;
use std::time::Duration;

fn lookup<'a>(vars: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
    let map: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key: &str| map.get(key).cloned()
}

#[test]
fn test_defaults_match_the_production_target() {
    let config = SuiteConfig::default();

    assert_eq!(config.base_url.as_str(), "https://www.netlify.com/");
    assert_eq!(config.pages_to_check, vec!["/", "/pricing/"]);
    assert_eq!(
        config.important_paths,
        vec!["/pricing/", "/platform/", "/login/"]
    );
    assert_eq!(config.engines.len(), 3);
    assert_eq!(config.retries, 1);
    assert_eq!(config.workers, 4);
    assert_eq!(config.max_links_per_page, 30);
    assert_eq!(config.max_sitemap_urls, 20);
    assert_eq!(config.ui_timeout, Duration::from_secs(10));
    assert_eq!(config.submit_ceiling, Duration::from_secs(8));
    assert_eq!(config.link_case_timeout, Duration::from_secs(120));
    assert_eq!(config.crawl_case_timeout, Duration::from_secs(300));
    assert!(config.trace_on_first_retry);
    assert!(config.headless);
}

#[test]
fn test_base_url_env_override() {
    let mut config = SuiteConfig::default();
    config
        .apply_env(lookup(&[("BASE_URL", "https://staging.example.com/")]))
        .unwrap();

    assert_eq!(config.base_url.as_str(), "https://staging.example.com/");
}

#[test]
fn test_invalid_base_url_is_rejected() {
    let mut config = SuiteConfig::default();
    let result = config.apply_env(lookup(&[("BASE_URL", "not a url")]));

    assert!(result.is_err());
}

#[test]
fn test_ci_tightens_retries_and_workers() {
    let mut config = SuiteConfig::default();
    config.apply_env(lookup(&[("CI", "true")])).unwrap();

    assert_eq!(config.retries, 2);
    assert_eq!(config.workers, 1);
}

#[test]
fn test_no_env_leaves_defaults_untouched() {
    let mut config = SuiteConfig::default();
    config.apply_env(lookup(&[])).unwrap();

    assert_eq!(config.retries, 1);
    assert_eq!(config.workers, 4);
    assert_eq!(config.base_url.as_str(), "https://www.netlify.com/");
}

#[test]
fn test_page_urls_resolve_against_base() {
    let mut config = SuiteConfig::default();
    config
        .apply_env(lookup(&[("BASE_URL", "https://staging.example.com/")]))
        .unwrap();

    let urls = config.page_urls().unwrap();
    assert_eq!(urls[0].as_str(), "https://staging.example.com/");
    assert_eq!(urls[1].as_str(), "https://staging.example.com/pricing/");
}

#[test]
fn test_trace_dir_lives_under_output_dir() {
    let mut config = SuiteConfig::default();
    config.output_dir = "target/qa".into();

    assert_eq!(config.trace_dir(), std::path::PathBuf::from("target/qa/patrol-traces"));
}
