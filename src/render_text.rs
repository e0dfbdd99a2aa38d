//! Plain-text rendering of report views for the terminal.
//!
//! Consumes the structures produced by [`report_vault_core::render`] and lays
//! them out as indented text. Empty sections are skipped, matching the
//! silent-omission policy of the dispatcher.

use report_vault_core::markup::{RichText, Segment};
use report_vault_core::models::Report;
use report_vault_core::render::{
    CopyrightView, CtrAnalysisView, FairUseView, MultiPlatformView, ReportView, ServiceView,
    Severity, TitleEngineView, TrendView,
};

const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

struct TextWriter {
    out: String,
    color: bool,
}

impl TextWriter {
    fn new(color: bool) -> Self {
        Self {
            out: String::new(),
            color,
        }
    }

    fn rich(&self, text: &RichText) -> String {
        text.segments()
            .iter()
            .map(|s| match s {
                Segment::Plain(t) => t.clone(),
                Segment::Strong(t) if self.color => format!("{}{}{}", BOLD, t, RESET),
                Segment::Strong(t) => t.clone(),
            })
            .collect()
    }

    fn line(&mut self, indent: usize, text: &str) {
        for (i, l) in text.lines().enumerate() {
            self.out.push_str(&" ".repeat(if i == 0 { indent } else { indent + 2 }));
            self.out.push_str(l);
            self.out.push('\n');
        }
        if text.is_empty() {
            self.out.push('\n');
        }
    }

    fn blank(&mut self) {
        self.out.push('\n');
    }

    fn heading(&mut self, indent: usize, title: &str) {
        self.line(indent, &format!("{}:", title));
    }

    fn labeled(&mut self, indent: usize, label: &str, text: Option<&RichText>) {
        if let Some(t) = text {
            let rendered = self.rich(t);
            self.line(indent, &format!("{}: {}", label, rendered));
        }
    }

    fn paragraph(&mut self, indent: usize, title: &str, text: Option<&RichText>) {
        if let Some(t) = text {
            self.heading(indent, title);
            let rendered = self.rich(t);
            self.line(indent + 2, &rendered);
        }
    }

    fn bullets(&mut self, indent: usize, title: &str, items: &[RichText]) {
        if items.is_empty() {
            return;
        }
        self.heading(indent, title);
        for item in items {
            let rendered = self.rich(item);
            self.line(indent + 2, &format!("- {}", rendered));
        }
    }

    fn numbered(&mut self, indent: usize, title: &str, items: &[RichText]) {
        if items.is_empty() {
            return;
        }
        self.heading(indent, title);
        for (i, item) in items.iter().enumerate() {
            let rendered = self.rich(item);
            self.line(indent + 2, &format!("{}. {}", i + 1, rendered));
        }
    }
}

/// Render the header and every service of `report` as text.
pub fn render_report_text(report: &Report, view: &ReportView, color: bool) -> String {
    let mut w = TextWriter::new(color);

    w.line(0, report.channel_name.as_deref().unwrap_or("Channel Analysis"));
    w.line(0, &format!("status:  {}", report.status.as_str()));
    w.line(0, &format!("date:    {}", format_date(report)));
    if let Some(email) = &report.email {
        w.line(0, &format!("email:   {}", email));
    }
    if let Some(channel_id) = &report.channel_id {
        w.line(
            0,
            &format!("channel: https://youtube.com/channel/{}", channel_id),
        );
    }
    w.blank();

    match view {
        ReportView::NoInsights => {
            w.line(0, "No Insights Generated");
            w.line(
                2,
                "The system failed to generate intelligence data for this request.",
            );
        }
        ReportView::Services(services) => {
            for service in services {
                let title = service.title.to_uppercase();
                w.line(0, &format!("== {} ==", title));
                write_service(&mut w, &service.view);
                w.blank();
            }
        }
    }

    w.out
}

fn format_date(report: &Report) -> String {
    match report.created_at() {
        Some(dt) => dt.format("%B %-d, %Y %H:%M UTC").to_string(),
        None => report
            .timestamp
            .clone()
            .unwrap_or_else(|| "unknown".to_string()),
    }
}

fn write_service(w: &mut TextWriter, view: &ServiceView) {
    match view {
        ServiceView::TitleEngine(v) => write_title_engine(w, v),
        ServiceView::CtrAnalysis(v) => write_ctr(w, v),
        ServiceView::MultiPlatform(v) => write_platforms(w, v),
        ServiceView::Copyright(v) => write_copyright(w, v),
        ServiceView::FairUse(v) => write_fair_use(w, v),
        ServiceView::Trends(v) => write_trends(w, v),
        ServiceView::Raw(raw) => w.line(0, &raw.pretty),
        ServiceView::NoData => w.line(0, "No data available for this service."),
    }
}

fn write_title_engine(w: &mut TextWriter, v: &TitleEngineView) {
    w.paragraph(0, "Channel Analysis", v.overall_assessment.as_ref());
    if !v.suggestions.is_empty() {
        w.heading(0, "Title Optimization");
        for (i, s) in v.suggestions.iter().enumerate() {
            let original = s
                .original_title
                .as_ref()
                .map(|t| w.rich(t))
                .unwrap_or_default();
            w.line(2, &format!("{}. {}", i + 1, original));
            w.bullets(5, "Friction Points", &s.current_issues);
            if !s.alternative_titles.is_empty() {
                w.heading(5, "Recommended Variants");
                for alt in &s.alternative_titles {
                    let title = alt.title.as_ref().map(|t| w.rich(t)).unwrap_or_default();
                    w.line(7, &format!("\"{}\"", title));
                    if let Some(rating) = &alt.ctr_potential_rating {
                        w.line(9, &format!("CTR Index: {}/10", rating));
                    }
                    w.labeled(9, "Why it works", alt.why_effective.as_ref());
                }
            }
        }
    }
    w.bullets(0, "Growth Tips", &v.growth_tips);
}

fn write_ctr(w: &mut TextWriter, v: &CtrAnalysisView) {
    if let Some(score) = &v.score {
        w.line(0, &format!("Current CTR Score: {}/10", score));
        if let Some(increase) = &v.potential_increase {
            w.line(0, &format!("Potential Increase: +{}", increase));
        }
        if let Some(reasoning) = &v.reasoning {
            let rendered = w.rich(reasoning);
            w.line(2, &rendered);
        }
        w.paragraph(0, "Industry Comparison", v.comparison_to_industry_average.as_ref());
    }
    w.paragraph(0, "What's Working", v.working.as_ref());
    w.paragraph(0, "What's Missing", v.missing.as_ref());
    w.bullets(0, "Optimization Recommendations", &v.recommendations);
    w.bullets(0, "Psychological Triggers", &v.psychological_triggers);
}

fn write_platforms(w: &mut TextWriter, v: &MultiPlatformView) {
    for p in &v.platforms {
        match &p.score {
            Some(score) => w.line(0, &format!("{} (score {}/10)", p.label, score)),
            None => w.line(0, &p.label),
        }
        w.paragraph(2, "Analysis", p.reasoning.as_ref());
        w.paragraph(2, "Ecosystem Strategy", p.strategy.as_ref());
        w.bullets(2, "Optimization Tips", &p.optimization_tips);
    }
}

fn write_copyright(w: &mut TextWriter, v: &CopyrightView) {
    let marker = match v.severity {
        Severity::Low => "[ok]",
        Severity::Medium => "[!]",
        Severity::High => "[!!]",
    };
    w.line(
        0,
        &format!(
            "{} Assessment: {} Risk",
            marker,
            v.risk_level.as_deref().unwrap_or("unknown")
        ),
    );
    if let Some(reasoning) = &v.reasoning {
        let rendered = w.rich(reasoning);
        w.line(2, &rendered);
    }
    w.bullets(0, "Detected Flags", &v.flags);
    w.paragraph(0, "Detailed Assessment", v.assessment.as_ref());
    w.bullets(0, "Compliance Measures", &v.recommendations);
}

fn write_fair_use(w: &mut TextWriter, v: &FairUseView) {
    if let Some(score) = &v.transformativeness_score {
        w.line(0, &format!("Fair Use Score: {}/100", score));
        if let Some(reasoning) = &v.reasoning {
            let rendered = w.rich(reasoning);
            w.line(2, &rendered);
        }
    }
    w.paragraph(0, "Assessment", v.assessment.as_ref());
    if !v.factors.is_empty() {
        w.heading(0, "Factor Attribution");
        for f in &v.factors {
            match &f.score {
                Some(score) => w.line(2, &format!("{} ({}/25)", f.label, score)),
                None => w.line(2, &f.label),
            }
            if let Some(description) = &f.description {
                let rendered = w.rich(description);
                w.line(4, &rendered);
            }
        }
    }
    w.paragraph(
        0,
        "Legal Safety Recommendations",
        v.recommendation_for_legal_safety.as_ref(),
    );
}

fn write_trends(w: &mut TextWriter, v: &TrendView) {
    if !v.trending_topics.is_empty() {
        w.heading(0, "Market Velocity Index");
        for t in &v.trending_topics {
            let mut header = t.name.as_ref().map(|n| w.rich(n)).unwrap_or_default();
            if let Some(growth) = &t.growth_percentage {
                header.push_str(&format!("  [{}]", growth));
            }
            if let Some(rel) = &t.relevance_rating {
                header.push_str(&format!("  REL: {}/10", rel));
            }
            w.line(2, &header);
            if let Some(reasoning) = &t.reasoning {
                let rendered = w.rich(reasoning);
                w.line(4, &rendered);
            }
        }
    }
    w.bullets(0, "Predictive Insights", &v.predictions);
    w.numbered(0, "Actionable Content Ideas", &v.actionable_content_ideas);
}

#[cfg(test)]
mod tests {
    use super::*;
    use report_vault_core::models::{AiReport, ReportStatus};
    use report_vault_core::render::render_report;
    use serde_json::json;

    fn report(services: serde_json::Value) -> Report {
        let mut r = Report::new(ReportStatus::Completed);
        r.channel_name = Some("Rust Daily".to_string());
        r.channel_id = Some("UC42".to_string());
        r.timestamp = Some("2025-03-01T10:15:00Z".to_string());
        r.ai_report = Some(AiReport {
            services: services.as_object().cloned().unwrap_or_default(),
            ..Default::default()
        });
        r
    }

    fn text(r: &Report, color: bool) -> String {
        render_report_text(r, &render_report(r), color)
    }

    #[test]
    fn test_header() {
        let out = text(&report(json!({})), false);
        assert!(out.starts_with("Rust Daily\n"));
        assert!(out.contains("date:    March 1, 2025 10:15 UTC"));
        assert!(out.contains("https://youtube.com/channel/UC42"));
        assert!(out.contains("No Insights Generated"));
    }

    #[test]
    fn test_sections_and_omissions() {
        let out = text(
            &report(json!({
                "semantic_title_engine": {"growth_tips": ["Post **weekly**"]},
                "copyright_protection": {"risk_level": "LOW", "flags": []}
            })),
            false,
        );
        assert!(out.contains("== SEMANTIC TITLE ENGINE =="));
        assert!(out.contains("Growth Tips:\n  - Post weekly"));
        assert!(!out.contains("Title Optimization"));
        assert!(out.contains("[ok] Assessment: LOW Risk"));
        assert!(!out.contains("Detected Flags"));
    }

    #[test]
    fn test_color_wraps_strong_segments() {
        let out = text(
            &report(json!({"trend_intelligence": {"predictions": ["**Shorts** grow"]}})),
            true,
        );
        assert!(out.contains("\x1b[1mShorts\x1b[0m grow"));
    }

    #[test]
    fn test_raw_fallback_and_no_data() {
        let out = text(
            &report(json!({"foo": {"x": 1}, "fair_use_analysis": null})),
            false,
        );
        assert!(out.contains("== FOO =="));
        assert!(out.contains("\"x\": 1"));
        assert!(out.contains("No data available for this service."));
    }
}
