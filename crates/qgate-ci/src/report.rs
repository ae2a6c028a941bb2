//! Markdown report rendering.
//!
//! Rendering is pure and deterministic: identical inputs always
//! produce identical markdown, with no side effects.

/// Body text used when no report output was captured.
pub const NO_REPORT_MESSAGE: &str = "No coverage report provided.";

/// Render the quality report as markdown.
///
/// Layout, in order: title line, optional service-URL link line,
/// optional coverage line, and the captured report text in a fenced
/// `text` block. An empty report body is substituted with
/// [`NO_REPORT_MESSAGE`].
pub fn render_markdown(coverage: Option<f64>, url: &str, report: &str, title: &str) -> String {
    let body = if report.is_empty() {
        NO_REPORT_MESSAGE
    } else {
        report
    };

    let mut out = String::new();
    out.push_str(&format!("### {title}\n\n"));

    if !url.is_empty() {
        out.push_str(&format!("Service URL [{url}]({url})\n\n"));
    }

    if let Some(pct) = coverage {
        if !pct.is_nan() {
            out.push_str(&format!("**Coverage**: {pct}%\n\n"));
        }
    }

    out.push_str(&format!("```text\n{body}\n```\n\n"));
    out
}
