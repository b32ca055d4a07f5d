//! Renders an `AggregateResult` as markdown, JSON, or SARIF, per
//! `output.format`. Markdown is the human-facing default; JSON is the
//! machine-consumable escape hatch; SARIF targets CI annotation consumers.

use critique_engine::AggregateResult;
use critique_engine::config::OutputFormat;
use critique_providers::Severity;
use serde_json::json;

pub fn render(result: &AggregateResult, format: OutputFormat, include_code: bool) -> String {
    match format {
        OutputFormat::Markdown => render_markdown(result, include_code),
        OutputFormat::Json => serde_json::to_string_pretty(result).unwrap_or_else(|_| "{}".to_string()),
        OutputFormat::Sarif => render_sarif(result),
    }
}

fn render_markdown(result: &AggregateResult, include_code: bool) -> String {
    let mut md = format!(
        "# Review: {:?} ({} file{})\n\n",
        result.mode,
        result.total_files,
        if result.total_files == 1 { "" } else { "s" }
    );
    md.push_str(&format!(
        "**Total issues:** {}  \n**Critical:** {}  **Error:** {}  **Warning:** {}  **Info:** {}  \n",
        result.total_issues, result.severity_totals.critical, result.severity_totals.error, result.severity_totals.warning, result.severity_totals.info
    ));
    if let Some(score) = result.overall_score {
        md.push_str(&format!("**Overall score:** {score:.1}\n"));
    }
    md.push('\n');

    for file in &result.files {
        md.push_str(&format!("## {}\n", file.path));
        if let Some(err) = &file.error {
            md.push_str(&format!("_skipped: {err}_\n\n"));
            continue;
        }
        let Some(response) = &file.response else {
            md.push_str("_no result_\n\n");
            continue;
        };
        if file.from_cache {
            md.push_str("_(cache hit)_\n");
        }
        if response.issues.is_empty() {
            md.push_str("No issues found.\n\n");
            continue;
        }
        for issue in &response.issues {
            let line = issue.location.as_ref().map(|l| format!(":{}", l.start_line)).unwrap_or_default();
            md.push_str(&format!("- **[{:?}/{:?}]** {}{line}: {}\n", issue.severity, issue.issue_type, file.path, issue.message));
            if let Some(suggestion) = &issue.suggestion {
                md.push_str(&format!("  - suggestion: {suggestion}\n"));
            }
            if include_code {
                if let Some(fixed) = &issue.fixed_code {
                    md.push_str(&format!("  - fixed code:\n    ```\n    {}\n    ```\n", fixed.replace('\n', "\n    ")));
                }
            }
        }
        md.push('\n');
    }
    md
}

fn severity_to_sarif_level(severity: Severity) -> &'static str {
    match severity {
        Severity::Info => "note",
        Severity::Warning => "warning",
        Severity::Error | Severity::Critical => "error",
    }
}

/// Minimal SARIF 2.1.0 document: one run, one rule-less result per issue.
/// Enough for CI tools that annotate diffs from a `results[].locations[]`
/// array; a full rules catalog is out of scope for this reporter.
fn render_sarif(result: &AggregateResult) -> String {
    let mut results = Vec::new();
    for file in &result.files {
        let Some(response) = &file.response else { continue };
        for issue in &response.issues {
            let line = issue.location.as_ref().map(|l| l.start_line).unwrap_or(1);
            results.push(json!({
                "level": severity_to_sarif_level(issue.severity),
                "message": { "text": issue.message },
                "locations": [{
                    "physicalLocation": {
                        "artifactLocation": { "uri": file.path },
                        "region": { "startLine": line }
                    }
                }]
            }));
        }
    }

    let doc = json!({
        "$schema": "https://raw.githubusercontent.com/oasis-tcs/sarif-spec/master/Schemata/sarif-schema-2.1.0.json",
        "version": "2.1.0",
        "runs": [{
            "tool": { "driver": { "name": "critique", "version": env!("CARGO_PKG_VERSION") } },
            "results": results
        }]
    });
    serde_json::to_string_pretty(&doc).unwrap_or_else(|_| "{}".to_string())
}
