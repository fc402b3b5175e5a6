//! `ab-edge rewrite` against files on disk.

use ab_edge::assignment::Assignment;
use ab_edge::cli::rewrite_cmd;
use ab_edge::rewrite::rules::{HEADLINE_A, HEADLINE_B, LINK_LABEL, PAGE_TITLE};
use tempfile::TempDir;

const PAGE: &str = r#"<html><head><title>Variant</title></head><body><h1 id="title">Variant</h1><a id="url" href="https://cloudflare.com/">x</a></body></html>"#;

#[test]
fn rewrite_writes_output_file() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("variant.html");
    std::fs::write(&input, PAGE).unwrap();

    for (arm, headline) in [(Assignment::ArmA, HEADLINE_A), (Assignment::ArmB, HEADLINE_B)] {
        let output = dir.path().join(format!("{arm}.html"));
        rewrite_cmd::run(&input, arm, Some(&output)).unwrap();

        let html = std::fs::read_to_string(&output).unwrap();
        assert!(html.contains(&format!("<title>{PAGE_TITLE}</title>")));
        assert!(html.contains(&format!(">{headline}</h1>")));
        assert!(html.contains(&format!(
            r#"<a id="url" href="https://www.paridhikhaitan.me/">{LINK_LABEL}</a>"#
        )));
    }
}

#[test]
fn rewrite_reports_missing_input() {
    let dir = TempDir::new().unwrap();
    let err = rewrite_cmd::run(&dir.path().join("missing.html"), Assignment::ArmA, None)
        .unwrap_err();
    assert!(format!("{err:#}").contains("failed to read"));
}
