use crate::model::{MatchResult, Outcome, ScanResult, TargetReport, TargetStatus};
use anyhow::Result;
use std::fmt::Write;
use tabled::{settings::Style, Table, Tabled};

#[derive(Tabled)]
struct VersionRow {
    #[tabled(rename = "Edition")]
    edition: String,
    #[tabled(rename = "Version")]
    identifier: String,
    #[tabled(rename = "Reference")]
    reference: String,
}

pub fn print_cli_table(result: &ScanResult) -> Result<()> {
    print!("{}", render_cli_table(result, true));
    Ok(())
}

/// Renders the report; `color` adds ANSI highlighting to outcome lines.
pub(crate) fn render_cli_table(result: &ScanResult, color: bool) -> String {
    let mut out = String::new();

    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "Scan completed at: {}",
        result.scan_time.format("%Y-%m-%d %H:%M:%S UTC")
    );

    for target in &result.targets {
        let _ = writeln!(out);
        render_target(&mut out, target, color);
    }

    let _ = writeln!(out);
    render_summary(&mut out, result);
    out
}

fn render_target(out: &mut String, target: &TargetReport, color: bool) {
    let _ = writeln!(out, "Target: {}", target.target);
    let _ = writeln!(out, "  {}", format_outcome(target.outcome(), color));

    match &target.status {
        TargetStatus::Unavailable { reason } => {
            let _ = writeln!(out, "  Reason: {}", reason);
        }
        TargetStatus::Fingerprinted { result } => render_match(out, result),
    }
}

fn render_match(out: &mut String, result: &MatchResult) {
    if result.candidates.is_empty() {
        return;
    }

    let _ = writeln!(out, "  CSS files: {}", result.candidates.len());
    for bundle in &result.application_bundles {
        let _ = writeln!(out, "    └── {}", bundle);
    }
    for asset in &result.matched_assets {
        let _ = writeln!(out, "  Matched CSS: {}", asset);
    }

    if result.versions.is_empty() {
        return;
    }

    let rows: Vec<VersionRow> = result
        .versions
        .iter()
        .map(|v| VersionRow {
            edition: v
                .edition
                .map(|e| e.short_name().to_string())
                .unwrap_or_else(|| "-".to_string()),
            identifier: v.identifier.to_string(),
            reference: v.reference_url.clone().unwrap_or_else(|| "-".to_string()),
        })
        .collect();

    let table = Table::new(rows).with(Style::rounded()).to_string();
    let _ = writeln!(out, "{}", table);

    if let Some((low, high)) = result.version_range() {
        if low == high {
            let _ = writeln!(out, "  Version: {}", low);
        } else {
            let _ = writeln!(out, "  Version range: {} - {}", low, high);
        }
    }
}

fn render_summary(out: &mut String, result: &ScanResult) {
    let _ = writeln!(out, "Summary:");
    let _ = writeln!(out, "  Targets: {}", result.targets.len());
    let _ = writeln!(
        out,
        "  Identified: {}, no match: {}, no CSS found: {}, unavailable: {}",
        result.count(Outcome::Matched),
        result.count(Outcome::NoMatch),
        result.count(Outcome::NoCandidates),
        result.count(Outcome::Unavailable)
    );
}

fn format_outcome(outcome: Outcome, color: bool) -> String {
    if !color {
        return outcome.describe().to_string();
    }
    match outcome {
        Outcome::Matched => format!("\x1b[32m{}\x1b[0m", outcome.describe()),
        Outcome::NoMatch => format!("\x1b[33m{}\x1b[0m", outcome.describe()),
        Outcome::NoCandidates => format!("\x1b[33m{}\x1b[0m", outcome.describe()),
        Outcome::Unavailable => format!("\x1b[31m{}\x1b[0m", outcome.describe()),
    }
}
