//! Plain-text rendering of a pipeline report for the terminal.

use std::fmt::Write;

use crate::core::report::{PipelineReport, Stage, StagePayload, StageResult, StageStatus};

/// Render the stage list followed by the generated artifacts.
pub fn render_report(report: &PipelineReport) -> String {
    let mut out = String::new();
    for entry in report.entries() {
        render_stage_line(&mut out, entry);
    }

    for entry in report.entries().iter().filter(|entry| entry.is_ok()) {
        let title = match entry.stage {
            Stage::TestGen => "Generated Tests",
            Stage::CodeGen => "Generated Code",
            Stage::Audit => "Security Audit",
            Stage::Rules | Stage::BranchCheck => continue,
        };
        let _ = write!(out, "\n== {title} ==\n");
        match &entry.payload {
            StagePayload::Text(text) => {
                out.push_str(text.trim_end());
                out.push('\n');
            }
            StagePayload::Findings(findings) if findings.is_empty() => {
                out.push_str("No findings.\n");
            }
            StagePayload::Findings(findings) => {
                for finding in findings {
                    out.push_str(finding);
                    out.push('\n');
                }
            }
            StagePayload::Empty => {}
        }
    }

    if let Some(err) = report.failure().and_then(|entry| entry.error.as_ref()) {
        let _ = write!(out, "\nerror[{}]: {}\n", err.kind.as_str(), err.message);
    }
    out
}

fn render_stage_line(out: &mut String, entry: &StageResult) {
    let marker = match entry.status {
        StageStatus::Ok => "[ok]    ",
        StageStatus::Failed => "[failed]",
    };
    let detail = match (&entry.stage, &entry.payload, &entry.error) {
        (_, _, Some(err)) => Some(err.kind.as_str().to_string()),
        (Stage::Rules, StagePayload::Text(summary), None) => Some(summary.clone()),
        (Stage::BranchCheck, StagePayload::Text(target), None) => {
            Some(format!("switched to {target}"))
        }
        _ => None,
    };
    match detail {
        Some(detail) => {
            let _ = writeln!(out, "{marker} {}: {detail}", entry.stage.label());
        }
        None => {
            let _ = writeln!(out, "{marker} {}", entry.stage.label());
        }
    }
}
