//! Report history helpers: filtering and summary stats.

use serde::Serialize;

use crate::models::{Report, ReportStatus};

/// Reports whose channel name or email contains `term`, case-insensitively.
///
/// An empty (or whitespace-only) term matches everything. Order is kept.
pub fn filter_reports<'a>(reports: &'a [Report], term: &str) -> Vec<&'a Report> {
    let needle = term.trim().to_lowercase();
    if needle.is_empty() {
        return reports.iter().collect();
    }
    let matches = |field: &Option<String>| {
        field
            .as_deref()
            .is_some_and(|v| v.to_lowercase().contains(&needle))
    };
    reports
        .iter()
        .filter(|r| matches(&r.channel_name) || matches(&r.email))
        .collect()
}

/// Summary shown above the report list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReportStats {
    pub total_reports: usize,
    pub total_services: usize,
    pub completed: usize,
    /// Completed share as a rounded whole percentage; 0 for no reports.
    pub completion_rate: u32,
}

impl ReportStats {
    pub fn from_reports(reports: &[Report]) -> Self {
        let total_reports = reports.len();
        let completed = reports
            .iter()
            .filter(|r| r.status == ReportStatus::Completed)
            .count();
        let completion_rate = if total_reports == 0 {
            0
        } else {
            ((completed as f64 / total_reports as f64) * 100.0).round() as u32
        };
        Self {
            total_reports,
            total_services: reports.iter().map(Report::service_count).sum(),
            completed,
            completion_rate,
        }
    }
}
