use crate::model::{SuiteReport, TestStatus};
use std::path::Path;

pub fn write_junit(suite: &str, report: &SuiteReport, out: &Path) -> anyhow::Result<()> {
    let mut xml = String::new();
    xml.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
    xml.push('\n');
    xml.push_str(&format!(
        r#"<testsuite name="{}" tests="{}" failures="{}" errors="{}">"#,
        escape(suite),
        report.total(),
        report.failed() - report.errors(),
        report.errors()
    ));
    xml.push('\n');

    for (i, case) in report.cases.iter().enumerate() {
        let name = case
            .description
            .clone()
            .unwrap_or_else(|| format!("case {}: {}", i + 1, case.input));
        xml.push_str(&format!(r#"  <testcase name="{}">"#, escape(&name)));
        match case.status {
            TestStatus::Pass => {}
            TestStatus::Fail => xml.push_str(&format!(
                r#"<failure message="expected {} got {}"/>"#,
                escape(&case.expected),
                escape(&case.actual)
            )),
            TestStatus::Error => {
                xml.push_str(&format!(r#"<error message="{}"/>"#, escape(&case.actual)))
            }
        }
        xml.push_str("</testcase>\n");
    }

    xml.push_str("</testsuite>\n");
    std::fs::write(out, xml)?;
    Ok(())
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\n', "&#10;")
}
