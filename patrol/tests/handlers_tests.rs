use patrol::handlers::*;
use patrol_browser::Engine;
use patrol_core::ReportFormat;
use std::path::Path;

#[test]
fn test_parse_engine_list_single() {
    let result = parse_engine_list("chromium").unwrap();
    assert_eq!(result, vec![Engine::Chromium]);
}

#[test]
fn test_parse_engine_list_preserves_order() {
    let result = parse_engine_list("edge, chrome,chromium").unwrap();
    assert_eq!(result, vec![Engine::Edge, Engine::Chrome, Engine::Chromium]);
}

#[test]
fn test_parse_engine_list_drops_duplicates() {
    let result = parse_engine_list("chrome,chrome,chromium").unwrap();
    assert_eq!(result, vec![Engine::Chrome, Engine::Chromium]);
}

#[test]
fn test_parse_engine_list_unknown() {
    let result = parse_engine_list("firefox");
    assert!(result.is_err());
    assert!(result.unwrap_err().contains("unknown engine 'firefox'"));
}

#[test]
fn test_parse_engine_list_empty() {
    assert!(parse_engine_list("").is_err());
    assert!(parse_engine_list(" , ,").is_err());
}

#[test]
fn test_report_formats_all_expands() {
    let formats = report_formats("all");
    assert_eq!(formats.len(), 3);
}

#[test]
fn test_report_formats_single() {
    assert!(matches!(report_formats("json")[..], [ReportFormat::Json]));
    assert!(matches!(report_formats("text")[..], [ReportFormat::Text]));
    assert!(report_formats("csv").is_empty());
}

#[test]
fn test_report_path_extension_tracks_format() {
    let dir = Path::new("out");
    assert_eq!(
        report_path(dir, &ReportFormat::Text),
        dir.join("patrol-report.txt")
    );
    assert_eq!(
        report_path(dir, &ReportFormat::Json),
        dir.join("patrol-report.json")
    );
    assert_eq!(
        report_path(dir, &ReportFormat::Html),
        dir.join("patrol-report.html")
    );
}

#[test]
fn test_group_selection_run_covers_everything() {
    let all = GroupSelection::All;
    assert!(all.includes_links());
    assert!(all.includes_newsletter());
    assert!(all.includes_crawlability());
    assert!(all.needs_browser());
}

#[test]
fn test_group_selection_crawlability_needs_no_browser() {
    let crawl = GroupSelection::Crawlability;
    assert!(!crawl.needs_browser());
    assert!(crawl.includes_crawlability());
    assert!(!crawl.includes_links());
}
