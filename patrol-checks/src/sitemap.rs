use crate::error::{CheckError, Result};
use crate::result::SitemapCheck;
use reqwest::Client;
use scraper::{Html, Selector};
use sitemap::reader::{SiteMapEntity, SiteMapReader};
use std::io::Cursor;
use tracing::{debug, info, warn};
use url::Url;

/// Fetches `/sitemap.xml` and samples the listed URLs for crawlability.
pub struct SitemapAuditor {
    client: Client,
    max_urls: usize,
}

impl SitemapAuditor {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            max_urls: 20,
        }
    }

    pub fn with_max_urls(mut self, max_urls: usize) -> Self {
        self.max_urls = max_urls;
        self
    }

    /// Fetch the sitemap under `base` and return its `loc` URLs in
    /// document order. An empty list is an error.
    pub async fn fetch_urls(&self, base: &Url) -> Result<Vec<String>> {
        let sitemap_url = base
            .join("/sitemap.xml")
            .map_err(|e| CheckError::InvalidUrl(e.to_string()))?;

        let response = self.client.get(sitemap_url.as_str()).send().await?;
        let status = response.status().as_u16();
        if !response.status().is_success() {
            return Err(CheckError::UnexpectedStatus {
                url: sitemap_url.to_string(),
                status,
            });
        }

        let body = response.bytes().await?;
        let urls = Self::parse_locs(&body)?;
        if urls.is_empty() {
            return Err(CheckError::EmptySitemap(sitemap_url.to_string()));
        }

        info!("{}: {} URLs listed", sitemap_url, urls.len());
        Ok(urls)
    }

    /// Extract `urlset.url[].loc` entries from raw sitemap XML.
    pub fn parse_locs(xml: &[u8]) -> Result<Vec<String>> {
        let mut urls = Vec::new();

        for entity in SiteMapReader::new(Cursor::new(xml)) {
            match entity {
                SiteMapEntity::Url(entry) => {
                    if let Some(loc) = entry.loc.get_url() {
                        urls.push(loc.to_string());
                    }
                }
                SiteMapEntity::SiteMap(entry) => {
                    // Index files are out of scope; note and move on.
                    debug!("Ignoring nested sitemap entry: {:?}", entry.loc);
                }
                SiteMapEntity::Err(e) => {
                    return Err(CheckError::SitemapError(e.to_string()));
                }
            }
        }

        Ok(urls)
    }

    /// GET at most the first `max_urls` entries and classify each.
    ///
    /// A transport failure on any sampled URL fails the audit.
    pub async fn audit_urls(&self, urls: &[String]) -> Result<Vec<SitemapCheck>> {
        let mut checks = Vec::new();

        for url in urls.iter().take(self.max_urls) {
            checks.push(self.check_url(url).await?);
        }

        Ok(checks)
    }

    /// GET a single listed URL and classify it.
    pub async fn check_url(&self, url: &str) -> Result<SitemapCheck> {
        let response = self.client.get(url).send().await?;
        let status_code = response.status().as_u16();
        let body = response.text().await?;
        let noindex = Self::has_noindex_tag(&body);

        if status_code >= 500 {
            warn!("{} answered {}", url, status_code);
        }

        Ok(SitemapCheck {
            url: url.to_string(),
            status_code,
            noindex,
        })
    }

    /// True if the document carries a `<meta name="robots">` tag whose
    /// content includes `noindex`.
    pub fn has_noindex_tag(html: &str) -> bool {
        let document = Html::parse_document(html);
        let selector = Selector::parse(r#"meta[name="robots"]"#).unwrap();

        document.select(&selector).any(|element| {
            element
                .value()
                .attr("content")
                .map(|content| content.to_lowercase().contains("noindex"))
                .unwrap_or(false)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build_client;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn auditor() -> SitemapAuditor {
        SitemapAuditor::new(build_client(10))
    }

    fn sitemap_xml(locs: &[&str]) -> String {
        let mut xml = String::from(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">"#,
        );
        for loc in locs {
            xml.push_str(&format!("<url><loc>{}</loc></url>", loc));
        }
        xml.push_str("</urlset>");
        xml
    }

    #[test]
    fn test_parse_locs_document_order() {
        let xml = sitemap_xml(&["https://x/a", "https://x/b"]);
        let urls = SitemapAuditor::parse_locs(xml.as_bytes()).unwrap();
        assert_eq!(urls, vec!["https://x/a", "https://x/b"]);
    }

    #[test]
    fn test_parse_locs_empty_urlset() {
        let xml = sitemap_xml(&[]);
        let urls = SitemapAuditor::parse_locs(xml.as_bytes()).unwrap();
        assert!(urls.is_empty());
    }

    #[test]
    fn test_has_noindex_tag() {
        assert!(SitemapAuditor::has_noindex_tag(
            r#"<html><head><meta name="robots" content="noindex, nofollow"></head></html>"#
        ));
        assert!(!SitemapAuditor::has_noindex_tag(
            r#"<html><head><meta name="robots" content="index, follow"></head></html>"#
        ));
        assert!(!SitemapAuditor::has_noindex_tag(
            r#"<html><head><meta name="viewport" content="width=device-width"></head></html>"#
        ));
    }

    #[tokio::test]
    async fn test_fetch_urls_requires_nonempty_sitemap() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/sitemap.xml"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "application/xml")
                    .set_body_string(sitemap_xml(&[])),
            )
            .mount(&mock_server)
            .await;

        let base = Url::parse(&mock_server.uri()).unwrap();
        let result = auditor().fetch_urls(&base).await;
        assert!(matches!(result, Err(CheckError::EmptySitemap(_))));
    }

    #[tokio::test]
    async fn test_audit_checks_every_listed_url() {
        let mock_server = MockServer::start().await;
        let base = mock_server.uri();

        Mock::given(method("GET"))
            .and(path("/sitemap.xml"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "application/xml")
                    .set_body_string(sitemap_xml(&[
                        &format!("{}/a", base),
                        &format!("{}/b", base),
                    ])),
            )
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path("/a"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path("/b"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
            .mount(&mock_server)
            .await;

        let base = Url::parse(&mock_server.uri()).unwrap();
        let auditor = auditor();
        let urls = auditor.fetch_urls(&base).await.unwrap();
        let checks = auditor.audit_urls(&urls).await.unwrap();

        assert_eq!(checks.len(), 2);
        assert!(checks.iter().all(|c| c.status_code < 500));
        assert!(checks.iter().all(SitemapCheck::is_crawlable));
        let checked: Vec<&str> = checks.iter().map(|c| c.url.as_str()).collect();
        assert_eq!(
            checked,
            vec![format!("{}/a", mock_server.uri()), format!("{}/b", mock_server.uri())]
        );
    }

    #[tokio::test]
    async fn test_audit_tolerates_403_but_not_500() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/forbidden"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path("/broken"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&mock_server)
            .await;

        let urls = vec![
            format!("{}/forbidden", mock_server.uri()),
            format!("{}/broken", mock_server.uri()),
        ];
        let checks = auditor().audit_urls(&urls).await.unwrap();

        assert_eq!(checks[0].status_code, 403);
        assert!(checks[0].is_crawlable());
        assert_eq!(checks[1].status_code, 500);
        assert!(!checks[1].is_crawlable());
    }

    #[tokio::test]
    async fn test_audit_flags_noindex_body() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/hidden"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"<html><head><meta name="robots" content="noindex"></head></html>"#,
            ))
            .mount(&mock_server)
            .await;

        let urls = vec![format!("{}/hidden", mock_server.uri())];
        let checks = auditor().audit_urls(&urls).await.unwrap();

        assert!(checks[0].noindex);
        assert!(!checks[0].is_crawlable());
    }

    #[tokio::test]
    async fn test_audit_caps_sample_size() {
        let mock_server = MockServer::start().await;

        for i in 0..4 {
            Mock::given(method("GET"))
                .and(path(format!("/p{}", i)))
                .respond_with(ResponseTemplate::new(200))
                .mount(&mock_server)
                .await;
        }

        let urls: Vec<String> = (0..4).map(|i| format!("{}/p{}", mock_server.uri(), i)).collect();
        let checks = auditor().with_max_urls(2).audit_urls(&urls).await.unwrap();

        assert_eq!(checks.len(), 2);
        assert!(checks[0].url.ends_with("/p0"));
        assert!(checks[1].url.ends_with("/p1"));
    }
}
