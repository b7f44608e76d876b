//! Structured status reporting
//!
//! `status()` returns a value, not formatted text: the runner never
//! prints. Rendering for humans (or machines) goes through the
//! [`StatusRenderer`] trait so the output format is swappable.

use serde::Serialize;

/// Per-changeset status line
#[derive(Debug, Clone, Serialize)]
pub struct StatusEntry {
    pub id: String,
    /// Numeric version, absent for ids without a numeric prefix
    pub version: Option<i64>,
    pub applied: bool,
}

/// Structured result of a status query
#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    pub current_version: i64,
    pub dirty: bool,
    /// One entry per loaded changeset, in execution order
    pub entries: Vec<StatusEntry>,
}

impl StatusReport {
    pub fn applied_count(&self) -> usize {
        self.entries.iter().filter(|e| e.applied).count()
    }

    pub fn pending_count(&self) -> usize {
        self.entries.len() - self.applied_count()
    }
}

/// Formats a status report for some output medium
pub trait StatusRenderer {
    fn render(&self, report: &StatusReport) -> String;
}

/// Human-readable plain text renderer
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainRenderer;

impl StatusRenderer for PlainRenderer {
    fn render(&self, report: &StatusReport) -> String {
        let mut out = String::new();
        out.push_str("Migration status:\n");
        out.push_str(&format!("  Current version: {}\n", report.current_version));
        out.push_str(&format!(
            "  Dirty: {}\n",
            if report.dirty { "YES" } else { "no" }
        ));

        for entry in &report.entries {
            let mark = if entry.applied { "✓" } else { "✗" };
            match entry.version {
                Some(v) => out.push_str(&format!("  {} {} (v{})\n", mark, entry.id, v)),
                None => out.push_str(&format!("  {} {} (unversioned)\n", mark, entry.id)),
            }
        }

        out.push_str(&format!(
            "Applied: {}, Pending: {}\n",
            report.applied_count(),
            report.pending_count()
        ));
        out
    }
}

/// JSON renderer for machine consumption
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonRenderer;

impl StatusRenderer for JsonRenderer {
    fn render(&self, report: &StatusReport) -> String {
        // Serialization of these plain structs cannot fail
        serde_json::to_string_pretty(report).unwrap_or_default()
    }
}
