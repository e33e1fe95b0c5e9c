// Report generation from a finished walk

use crate::error::Result;
use crate::walk::WalkOutcome;
use capmap_client::{ApplicationMap, CapabilityNode};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

const RULE: &str = "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportFormat {
    Text,
    Json,
    Csv,
    Markdown,
}

impl ReportFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" => Some(ReportFormat::Text),
            "json" => Some(ReportFormat::Json),
            "csv" => Some(ReportFormat::Csv),
            "markdown" | "md" => Some(ReportFormat::Markdown),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapSummary {
    pub capabilities: usize,
    pub applications: usize,
    pub empty_capabilities: usize,
    pub by_lifecycle_phase: BTreeMap<String, usize>,
}

pub fn summarize(map: &ApplicationMap) -> MapSummary {
    let mut by_lifecycle_phase: BTreeMap<String, usize> = BTreeMap::new();
    for app in map.values().flatten() {
        *by_lifecycle_phase
            .entry(app.phase_or_unknown().to_string())
            .or_insert(0) += 1;
    }

    MapSummary {
        capabilities: map.len(),
        applications: map.values().map(Vec::len).sum(),
        empty_capabilities: map.values().filter(|apps| apps.is_empty()).count(),
        by_lifecycle_phase,
    }
}

pub fn generate_report(outcome: &WalkOutcome, format: ReportFormat) -> Result<String> {
    Ok(match format {
        ReportFormat::Text => generate_text_report(outcome),
        ReportFormat::Json => generate_json_report(outcome)?,
        ReportFormat::Csv => generate_csv_report(&outcome.applications),
        ReportFormat::Markdown => generate_markdown_report(outcome),
    })
}

pub fn generate_text_report(outcome: &WalkOutcome) -> String {
    let summary = summarize(&outcome.applications);
    let mut report = String::new();

    report.push_str(RULE);
    report.push_str("                   BUSINESS CAPABILITY APPLICATION REPORT\n");
    report.push_str(RULE);
    report.push('\n');

    report.push_str(&format!("Root:          {}\n", outcome.root_id));
    report.push_str(&format!("Fetched:       {} capabilities\n", outcome.nodes_fetched));
    report.push_str(&format!("Distinct:      {} names\n", summary.capabilities));
    report.push_str(&format!("Applications:  {}\n", summary.applications));

    for (bc_name, apps) in &outcome.applications {
        report.push_str(&format!("\n📂 {} - {} applications\n", bc_name, apps.len()));
        for app in apps {
            report.push_str(&format!("  • {} ({})\n", app.name, app.phase_or_unknown()));
        }
    }

    report.push('\n');
    report.push_str(RULE);
    report.push_str("SUMMARY\n");
    report.push_str(RULE);
    report.push('\n');
    report.push_str(&format!(
        "Capabilities without applications: {}\n",
        summary.empty_capabilities
    ));
    if !summary.by_lifecycle_phase.is_empty() {
        report.push_str("\nApplications by lifecycle phase:\n");
        for (phase, count) in &summary.by_lifecycle_phase {
            report.push_str(&format!("  {:<20} {}\n", phase, count));
        }
    }
    report.push('\n');

    report
}

pub fn generate_json_report(outcome: &WalkOutcome) -> std::result::Result<String, serde_json::Error> {
    let json_report = serde_json::json!({
        "report": {
            "metadata": {
                "generator": "capmap",
                "version": env!("CARGO_PKG_VERSION"),
                "generated_at": chrono::Utc::now().to_rfc3339(),
                "format": "json"
            },
            "root_id": outcome.root_id,
            "nodes_fetched": outcome.nodes_fetched,
            "summary": summarize(&outcome.applications),
            "capabilities": outcome.applications
        }
    });

    serde_json::to_string_pretty(&json_report)
}

pub fn generate_csv_report(map: &ApplicationMap) -> String {
    let mut report = String::from("capability,application_id,application_name,lifecycle_phase\n");

    for (bc_name, apps) in map {
        if apps.is_empty() {
            report.push_str(&format!("{},,,\n", csv_field(bc_name)));
            continue;
        }
        for app in apps {
            report.push_str(&format!(
                "{},{},{},{}\n",
                csv_field(bc_name),
                csv_field(&app.id),
                csv_field(&app.name),
                csv_field(app.lifecycle_phase.as_deref().unwrap_or(""))
            ));
        }
    }

    report
}

pub fn generate_markdown_report(outcome: &WalkOutcome) -> String {
    let summary = summarize(&outcome.applications);
    let mut report = String::new();

    report.push_str("# Business Capability Application Report\n\n");
    report.push_str(&format!("- **Root:** `{}`\n", outcome.root_id));
    report.push_str(&format!("- **Capabilities fetched:** {}\n", outcome.nodes_fetched));
    report.push_str(&format!("- **Distinct names:** {}\n", summary.capabilities));
    report.push_str(&format!("- **Applications:** {}\n", summary.applications));

    for (bc_name, apps) in &outcome.applications {
        report.push_str(&format!("\n## {}\n\n", md_escape(bc_name)));
        if apps.is_empty() {
            report.push_str("_No applications._\n");
            continue;
        }
        report.push_str("| Application | ID | Lifecycle phase |\n");
        report.push_str("|---|---|---|\n");
        for app in apps {
            report.push_str(&format!(
                "| {} | `{}` | {} |\n",
                md_escape(&app.name),
                app.id,
                md_escape(app.phase_or_unknown())
            ));
        }
    }

    report
}

/// Visited capabilities in visit order, one line each
pub fn tree_report(nodes: &[CapabilityNode]) -> String {
    let mut report = String::new();
    report.push_str(&format!("Visited {} capabilities:\n\n", nodes.len()));

    for (idx, node) in nodes.iter().enumerate() {
        report.push_str(&format!(
            "  [{}] {} ({}) - {} children, {} applications\n",
            idx + 1,
            node.name,
            node.id,
            node.children.len(),
            node.applications.len()
        ));
    }

    report
}

pub fn save_report(content: &str, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    let mut file = File::create(path)?;
    file.write_all(content.as_bytes())?;
    Ok(())
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn md_escape(value: &str) -> String {
    value.replace('|', "\\|")
}
