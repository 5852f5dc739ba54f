//! Dashboard-free runners for the `analyze` and `health` commands.

use std::error::Error;
use std::fmt::Write as _;
use std::sync::mpsc;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Runtime;
use tracing::info;

use crate::analysis::AnalysisReport;
use crate::config::{AnalyzeArgs, AppConfig};
use crate::upload::{
    CandidateFile, FileStatus, HttpAnalysisService, NotificationKind, UploadSession,
    UploadedFileRecord,
};
use crate::utils::{collect_documents, FileSizeUtils};

pub fn run_analyze(
    config: &AppConfig,
    args: &AnalyzeArgs,
    runtime: &Runtime,
) -> Result<(), Box<dyn Error>> {
    let documents = collect_documents(&args.paths);
    if documents.is_empty() {
        return Err("No documents found to analyze".into());
    }
    info!("Submitting {} document(s) to {}", documents.len(), config.api_url);

    let (analysis_sender, analysis_receiver) = mpsc::channel();
    let service = Arc::new(HttpAnalysisService::new(config.api_url.clone()));
    let mut session = UploadSession::new(service, runtime.handle().clone()).with_callback(
        Box::new(move |result| {
            analysis_sender.send(result).unwrap_or_default();
        }),
    );

    let mut unreadable = 0;
    let mut rejected = 0;
    for path in documents {
        match CandidateFile::from_path(&path) {
            Ok(candidate) => {
                if session.submit(candidate).is_err() {
                    rejected += 1;
                }
            }
            Err(e) => {
                eprintln!("❌ Could not read {}: {}", path.display(), e);
                unreadable += 1;
            }
        }
    }

    let finished = session.wait_idle(Duration::from_secs(args.timeout_secs));

    for notification in session.take_notifications() {
        match notification.kind {
            NotificationKind::Success => println!("✅ {}", notification.message),
            NotificationKind::Error => eprintln!("❌ {}", notification.message),
        }
    }
    let records = session.records();

    println!();
    print!("{}", render_records(records));

    for (index, result) in analysis_receiver.try_iter().enumerate() {
        println!();
        if args.json {
            println!("{}", serde_json::to_string_pretty(result.as_value())?);
        } else {
            println!("── Analysis {} ──", index + 1);
            print!("{}", render_report(&result.report()));
        }
    }

    if !finished {
        return Err(format!(
            "Timed out with {} upload(s) still running",
            session.in_flight()
        )
        .into());
    }

    let failed = records
        .iter()
        .filter(|r| matches!(r.status, FileStatus::Error(_)))
        .count();
    if failed + rejected + unreadable > 0 {
        return Err(format!(
            "{} document(s) could not be analyzed",
            failed + rejected + unreadable
        )
        .into());
    }

    Ok(())
}

pub fn run_health(config: &AppConfig, runtime: &Runtime) -> Result<(), Box<dyn Error>> {
    let service = HttpAnalysisService::new(config.api_url.clone());
    let health = runtime.block_on(service.health())?;
    println!("{}: {}", service.base_url(), health.status);
    Ok(())
}

pub fn render_records(records: &[UploadedFileRecord]) -> String {
    let mut out = String::new();
    for record in records {
        let status = match &record.status {
            FileStatus::Error(message) => format!("error - {}", message),
            other => other.label().to_string(),
        };
        let _ = writeln!(
            out,
            "{:<40} {:>10}  {}",
            record.name,
            FileSizeUtils::format_size(record.size_bytes),
            status
        );
    }
    out
}

pub fn render_report(report: &AnalysisReport) -> String {
    let mut out = String::new();
    if report.is_empty() {
        out.push_str("No analysis details returned.\n");
        return out;
    }

    if let Some(title) = report.title() {
        let _ = writeln!(out, "Document:   {}", title);
    }
    if let Some(summary) = &report.summary {
        if !summary.parties.is_empty() {
            let _ = writeln!(out, "Parties:    {}", summary.parties.join(", "));
        }
    }
    if let Some(risk) = report.risk_label() {
        let _ = writeln!(out, "Risk score: {}", risk);
    }

    if let Some(summary) = &report.summary {
        if !summary.key_findings.is_empty() {
            out.push_str("Key findings:\n");
            for finding in &summary.key_findings {
                let _ = writeln!(out, "  • {}", finding);
            }
        }
    }

    if !report.risk.risky_clauses.is_empty() {
        out.push_str("Risks:\n");
        for risk in &report.risk.risky_clauses {
            let _ = write!(out, "  [{}] {}", risk.severity.label(), risk.title);
            if !risk.clause.is_empty() {
                let _ = write!(out, " ({})", risk.clause);
            }
            out.push('\n');
        }
    }

    if !report.suggestions.is_empty() {
        out.push_str("Suggestions:\n");
        for suggestion in &report.suggestions {
            let _ = writeln!(out, "  • {}", suggestion.title);
            if !suggestion.suggested_text.is_empty() {
                let _ = writeln!(out, "      → {}", suggestion.suggested_text);
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::AnalysisResult;
    use crate::upload::{validate, UploadTracker};
    use serde_json::json;

    #[test]
    fn renders_record_table_with_errors() {
        let mut tracker = UploadTracker::new();
        let ok = tracker.add_record(&validate(CandidateFile::new("a", "nda.pdf", 2048)).unwrap());
        let bad =
            tracker.add_record(&validate(CandidateFile::new("b", "lease.docx", 10)).unwrap());
        tracker.update_status(ok, FileStatus::Complete);
        tracker.update_status(bad, FileStatus::Error("Upload failed: 502 Bad Gateway".into()));

        let table = render_records(tracker.records());
        let lines: Vec<_> = table.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("nda.pdf"));
        assert!(lines[0].contains("2.0 KB"));
        assert!(lines[0].ends_with("complete"));
        assert!(lines[1].ends_with("error - Upload failed: 502 Bad Gateway"));
    }

    #[test]
    fn renders_report_sections() {
        let report = AnalysisResult::new(json!({
            "risk": {
                "score": 72,
                "risky_clauses": [{"title": "Vague IP assignment", "severity": "high", "clause": "Section 6.1"}]
            },
            "suggestions": {"suggestions": [
                {"title": "Clarify IP scope", "suggested_text": "Only work-related inventions."}
            ]},
            "summary": {"title": "Employment Agreement", "parties": ["Employer Corp.", "Jane Doe"]}
        }))
        .report();

        let text = render_report(&report);
        assert!(text.contains("Document:   Employment Agreement"));
        assert!(text.contains("Parties:    Employer Corp., Jane Doe"));
        assert!(text.contains("Risk score: 72/100"));
        assert!(text.contains("[High] Vague IP assignment (Section 6.1)"));
        assert!(text.contains("→ Only work-related inventions."));
    }

    #[test]
    fn empty_report_says_so() {
        let text = render_report(&AnalysisResult::new(json!({})).report());
        assert_eq!(text, "No analysis details returned.\n");
    }
}
