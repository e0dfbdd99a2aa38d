//! Service render dispatcher.
//!
//! Turns one `(service key, payload)` pair from a report's
//! `aiReport.services` map into a [`ServiceView`]. Payloads come from an
//! external generation pipeline with no schema, so every field is optional:
//! a missing, `null`, empty or wrongly-typed field simply leaves its part of
//! the view empty. Rendering never fails and never mutates the payload.
//!
//! # Dispatch
//!
//! | Key | View |
//! |-----|------|
//! | `semantic_title_engine` | [`TitleEngineView`] |
//! | `predictive_ctr_analysis` | [`CtrAnalysisView`] |
//! | `multi_platform_mastery` | [`MultiPlatformView`] |
//! | `copyright_protection` | [`CopyrightView`] |
//! | `fair_use_analysis` | [`FairUseView`] |
//! | `trend_intelligence` | [`TrendView`] |
//! | anything else | [`RawView`] |
//!
//! All text fields are parsed for `**emphasis**` (see [`crate::markup`]).

use serde::Serialize;
use serde_json::{Map, Value};

use crate::markup::{parse_emphasis, RichText};
use crate::models::Report;

/// Identifier of one analysis sub-feature.
///
/// The set is open: keys this version does not know are kept as
/// [`ServiceKey::Other`] and rendered raw.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ServiceKey {
    SemanticTitleEngine,
    PredictiveCtrAnalysis,
    MultiPlatformMastery,
    CopyrightProtection,
    FairUseAnalysis,
    TrendIntelligence,
    Other(String),
}

impl ServiceKey {
    pub fn parse(key: &str) -> Self {
        match key {
            "semantic_title_engine" => ServiceKey::SemanticTitleEngine,
            "predictive_ctr_analysis" => ServiceKey::PredictiveCtrAnalysis,
            "multi_platform_mastery" => ServiceKey::MultiPlatformMastery,
            "copyright_protection" => ServiceKey::CopyrightProtection,
            "fair_use_analysis" => ServiceKey::FairUseAnalysis,
            "trend_intelligence" => ServiceKey::TrendIntelligence,
            other => ServiceKey::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ServiceKey::SemanticTitleEngine => "semantic_title_engine",
            ServiceKey::PredictiveCtrAnalysis => "predictive_ctr_analysis",
            ServiceKey::MultiPlatformMastery => "multi_platform_mastery",
            ServiceKey::CopyrightProtection => "copyright_protection",
            ServiceKey::FairUseAnalysis => "fair_use_analysis",
            ServiceKey::TrendIntelligence => "trend_intelligence",
            ServiceKey::Other(key) => key,
        }
    }

    /// Human-readable section title. Unknown keys use the raw key.
    pub fn display_name(&self) -> &str {
        match self {
            ServiceKey::SemanticTitleEngine => "Semantic Title Engine",
            ServiceKey::PredictiveCtrAnalysis => "Predictive CTR Analysis",
            ServiceKey::MultiPlatformMastery => "Multi-Platform Mastery",
            ServiceKey::CopyrightProtection => "Copyright Protection",
            ServiceKey::FairUseAnalysis => "Fair Use Analysis",
            ServiceKey::TrendIntelligence => "Trend Intelligence",
            ServiceKey::Other(key) => key,
        }
    }
}

impl Serialize for ServiceKey {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AlternativeTitle {
    pub title: Option<RichText>,
    pub ctr_potential_rating: Option<String>,
    pub why_effective: Option<RichText>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TitleSuggestion {
    pub original_title: Option<RichText>,
    pub current_issues: Vec<RichText>,
    pub alternative_titles: Vec<AlternativeTitle>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TitleEngineView {
    pub overall_assessment: Option<RichText>,
    pub suggestions: Vec<TitleSuggestion>,
    pub growth_tips: Vec<RichText>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CtrAnalysisView {
    pub score: Option<String>,
    pub potential_increase: Option<String>,
    pub reasoning: Option<RichText>,
    pub comparison_to_industry_average: Option<RichText>,
    pub working: Option<RichText>,
    pub missing: Option<RichText>,
    pub recommendations: Vec<RichText>,
    pub psychological_triggers: Vec<RichText>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PlatformView {
    pub key: String,
    pub label: String,
    pub score: Option<String>,
    pub reasoning: Option<RichText>,
    pub strategy: Option<RichText>,
    pub optimization_tips: Vec<RichText>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MultiPlatformView {
    pub platforms: Vec<PlatformView>,
}

/// Visual severity of a copyright assessment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    /// Case-insensitive; anything unrecognized, or nothing, is `High`.
    pub fn from_risk_level(level: Option<&str>) -> Self {
        match level.map(|l| l.trim().to_ascii_lowercase()).as_deref() {
            Some("low") => Severity::Low,
            Some("medium") => Severity::Medium,
            _ => Severity::High,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CopyrightView {
    pub risk_level: Option<String>,
    pub severity: Severity,
    pub reasoning: Option<RichText>,
    pub flags: Vec<RichText>,
    pub assessment: Option<RichText>,
    pub recommendations: Vec<RichText>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FairUseFactor {
    pub key: String,
    pub label: String,
    pub score: Option<String>,
    pub description: Option<RichText>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FairUseView {
    pub transformativeness_score: Option<String>,
    pub reasoning: Option<RichText>,
    pub assessment: Option<RichText>,
    pub factors: Vec<FairUseFactor>,
    pub recommendation_for_legal_safety: Option<RichText>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TrendingTopic {
    pub name: Option<RichText>,
    pub growth_percentage: Option<String>,
    pub relevance_rating: Option<String>,
    pub reasoning: Option<RichText>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TrendView {
    pub trending_topics: Vec<TrendingTopic>,
    pub predictions: Vec<RichText>,
    pub actionable_content_ideas: Vec<RichText>,
}

/// Inspectable dump of a payload no interpretation applies to.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RawView {
    pub value: Value,
    pub pretty: String,
}

/// Structured rendering of one service payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum ServiceView {
    TitleEngine(TitleEngineView),
    CtrAnalysis(CtrAnalysisView),
    MultiPlatform(MultiPlatformView),
    Copyright(CopyrightView),
    FairUse(FairUseView),
    Trends(TrendView),
    Raw(RawView),
    /// A known service is listed but its payload is `null`.
    NoData,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedService {
    pub key: ServiceKey,
    pub title: String,
    pub view: ServiceView,
}

/// Rendering of a whole report.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "services", rename_all = "snake_case")]
pub enum ReportView {
    /// The report has no services at all.
    NoInsights,
    Services(Vec<RenderedService>),
}

/// Render every service of `report`, in payload order.
pub fn render_report(report: &Report) -> ReportView {
    match report.services() {
        Some(services) if !services.is_empty() => ReportView::Services(
            services
                .iter()
                .map(|(key, payload)| {
                    let key = ServiceKey::parse(key);
                    RenderedService {
                        title: key.display_name().to_string(),
                        view: render_service(&key, payload),
                        key,
                    }
                })
                .collect(),
        ),
        _ => ReportView::NoInsights,
    }
}

/// Render one service payload.
///
/// Unknown keys always get the raw view. A known key renders as `NoData`
/// for a `null` payload and as raw for any other non-object payload.
pub fn render_service(key: &ServiceKey, payload: &Value) -> ServiceView {
    match key {
        ServiceKey::SemanticTitleEngine => {
            structured(payload, |data| ServiceView::TitleEngine(title_engine(data)))
        }
        ServiceKey::PredictiveCtrAnalysis => {
            structured(payload, |data| ServiceView::CtrAnalysis(ctr_analysis(data)))
        }
        ServiceKey::MultiPlatformMastery => {
            structured(payload, |data| ServiceView::MultiPlatform(multi_platform(data)))
        }
        ServiceKey::CopyrightProtection => {
            structured(payload, |data| ServiceView::Copyright(copyright(data)))
        }
        ServiceKey::FairUseAnalysis => {
            structured(payload, |data| ServiceView::FairUse(fair_use(data)))
        }
        ServiceKey::TrendIntelligence => {
            structured(payload, |data| ServiceView::Trends(trends(data)))
        }
        ServiceKey::Other(_) => raw(payload),
    }
}

fn structured(
    payload: &Value,
    view: impl FnOnce(&Map<String, Value>) -> ServiceView,
) -> ServiceView {
    match payload {
        Value::Null => ServiceView::NoData,
        Value::Object(data) => view(data),
        other => raw(other),
    }
}

fn raw(payload: &Value) -> ServiceView {
    ServiceView::Raw(RawView {
        value: payload.clone(),
        pretty: serde_json::to_string_pretty(payload).unwrap_or_else(|_| payload.to_string()),
    })
}

fn title_engine(data: &Map<String, Value>) -> TitleEngineView {
    let overall_assessment = match field(data, &["channel_analysis"]) {
        Some(Value::Object(analysis)) => text(analysis, &["overall_assessment"]),
        Some(other) => scalar(other).map(|s| parse_emphasis(&s)),
        None => None,
    };
    let suggestions = objects(data, &["suggestions"])
        .map(|s| TitleSuggestion {
            original_title: text(s, &["original_title"]),
            current_issues: text_list(s, &["current_issues"]),
            alternative_titles: array(s, &["alternative_titles"])
                .filter_map(alternative_title)
                .collect(),
        })
        .collect();
    TitleEngineView {
        overall_assessment,
        suggestions,
        growth_tips: text_list(data, &["growth_tips"]),
    }
}

fn alternative_title(value: &Value) -> Option<AlternativeTitle> {
    match value {
        Value::Object(alt) => Some(AlternativeTitle {
            title: text(alt, &["new_suggested_title"]),
            ctr_potential_rating: metric(alt, &["ctr_potential_rating"]),
            why_effective: text(alt, &["why_it_s_effective"]),
        }),
        other => scalar(other).map(|s| AlternativeTitle {
            title: Some(parse_emphasis(&s)),
            ..Default::default()
        }),
    }
}

fn ctr_analysis(data: &Map<String, Value>) -> CtrAnalysisView {
    let (working, missing) = match field(data, &["what_is_working_or_missing"]) {
        Some(Value::Object(wm)) => (text(wm, &["working"]), text(wm, &["missing"])),
        _ => (None, None),
    };
    CtrAnalysisView {
        score: metric(data, &["score"]),
        potential_increase: metric(data, &["potential_increase", "potentialIncrease"]),
        reasoning: text(data, &["reasoning"]),
        comparison_to_industry_average: text(data, &["comparison_to_industry_average"]),
        working,
        missing,
        recommendations: text_list(data, &["recommendations"]),
        psychological_triggers: text_list(data, &["psychological_triggers_to_boost_engagement"]),
    }
}

fn multi_platform(data: &Map<String, Value>) -> MultiPlatformView {
    let platforms = entries(data, &["platforms"])
        .map(|(key, value)| {
            let mut view = PlatformView {
                key: key.clone(),
                label: platform_label(key),
                ..Default::default()
            };
            if let Value::Object(p) = value {
                view.score = metric(p, &["score"]);
                view.reasoning = text(p, &["reasoning"]);
                view.strategy = text(p, &["strategy"]);
                view.optimization_tips = text_list(p, &["optimization_tips"]);
            }
            view
        })
        .collect();
    MultiPlatformView { platforms }
}

fn copyright(data: &Map<String, Value>) -> CopyrightView {
    let risk_level = metric(data, &["risk_level", "riskLevel"]);
    CopyrightView {
        severity: Severity::from_risk_level(risk_level.as_deref()),
        risk_level,
        reasoning: text(data, &["reasoning"]),
        flags: text_list(data, &["flags"]),
        assessment: text(data, &["assessment"]),
        recommendations: text_list(data, &["recommendations"]),
    }
}

fn fair_use(data: &Map<String, Value>) -> FairUseView {
    let factors = entries(
        data,
        &["fair_use_factors", "fair_use_factors_breakdown", "factors"],
    )
    .map(|(key, value)| {
        let mut factor = FairUseFactor {
            key: key.clone(),
            label: key.replace('_', " "),
            ..Default::default()
        };
        match value {
            Value::Object(f) => {
                factor.score = metric(f, &["score"]);
                factor.description = text(f, &["description", "reasoning"]);
            }
            other => factor.description = scalar(other).map(|s| parse_emphasis(&s)),
        }
        factor
    })
    .collect();
    FairUseView {
        transformativeness_score: metric(data, &["transformativeness_score", "score"]),
        reasoning: text(data, &["reasoning"]),
        assessment: text(data, &["assessment"]),
        factors,
        recommendation_for_legal_safety: text(
            data,
            &["recommendation_for_legal_safety", "recommendation"],
        ),
    }
}

fn trends(data: &Map<String, Value>) -> TrendView {
    let trending_topics = objects(data, &["trending_topics"])
        .map(|t| TrendingTopic {
            name: text(t, &["name"]),
            growth_percentage: metric(t, &["growth_percentage"]),
            relevance_rating: metric(t, &["relevance_rating"]),
            reasoning: text(t, &["reasoning"]),
        })
        .collect();
    TrendView {
        trending_topics,
        predictions: text_list(data, &["predictions"]),
        actionable_content_ideas: text_list(data, &["actionable_content_ideas"]),
    }
}

/// Display label for a platform key: underscores become spaces.
pub fn platform_label(key: &str) -> String {
    let spaced = key.replace('_', " ");
    if spaced.eq_ignore_ascii_case("x twitter") {
        "X (Twitter)".to_string()
    } else {
        spaced
    }
}

// ─── Tolerant field access ──────────────────────────────────────────

/// First of `names` that is present and not `null`.
fn field<'a>(data: &'a Map<String, Value>, names: &[&str]) -> Option<&'a Value> {
    names
        .iter()
        .filter_map(|name| data.get(*name))
        .find(|v| !v.is_null())
}

/// Strings (non-empty), numbers and booleans as display text.
fn scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn metric(data: &Map<String, Value>, names: &[&str]) -> Option<String> {
    field(data, names).and_then(scalar)
}

fn text(data: &Map<String, Value>, names: &[&str]) -> Option<RichText> {
    metric(data, names).map(|s| parse_emphasis(&s))
}

fn array<'a>(
    data: &'a Map<String, Value>,
    names: &[&str],
) -> impl Iterator<Item = &'a Value> + 'a {
    field(data, names)
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
}

fn objects<'a>(
    data: &'a Map<String, Value>,
    names: &[&str],
) -> impl Iterator<Item = &'a Map<String, Value>> + 'a {
    array(data, names).filter_map(Value::as_object)
}

fn text_list(data: &Map<String, Value>, names: &[&str]) -> Vec<RichText> {
    array(data, names)
        .filter_map(scalar)
        .map(|s| parse_emphasis(&s))
        .collect()
}

fn entries<'a>(
    data: &'a Map<String, Value>,
    names: &[&str],
) -> impl Iterator<Item = (&'a String, &'a Value)> + 'a {
    field(data, names)
        .and_then(Value::as_object)
        .into_iter()
        .flatten()
}
