//! Core data models for Report Vault.
//!
//! A [`Report`] is one channel-analysis record. Its `aiReport.services`
//! map is deliberately untyped: payloads come from an external generation
//! pipeline with no schema guarantee and are only interpreted at render
//! time (see [`crate::render`]).
//!
//! Field names on the wire are camelCase (`channelName`, `aiReport`, ...).
//! Decoding is tolerant: only `id` is required (a string or a number), a
//! status outside the known set is kept as [`ReportStatus::Other`], and
//! unknown fields are kept in `extra` so a re-serialized collection never
//! loses producer data.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

/// Lifecycle state of a report.
///
/// Serialized as a lowercase string. Any other string the producer writes
/// is carried as `Other` and written back unchanged; `null` reads as
/// `Pending`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ReportStatus {
    #[default]
    Pending,
    Completed,
    Failed,
    Other(String),
}

impl ReportStatus {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "pending" => ReportStatus::Pending,
            "completed" => ReportStatus::Completed,
            "failed" => ReportStatus::Failed,
            other => ReportStatus::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ReportStatus::Pending => "pending",
            ReportStatus::Completed => "completed",
            ReportStatus::Failed => "failed",
            ReportStatus::Other(raw) => raw,
        }
    }
}

impl Serialize for ReportStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ReportStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match Option::<Value>::deserialize(deserializer)? {
            None | Some(Value::Null) => ReportStatus::Pending,
            Some(Value::String(s)) => ReportStatus::parse(&s),
            Some(other) => ReportStatus::Other(other.to_string()),
        })
    }
}

/// Accept ids written as strings or as numbers (epoch-millis ids from older
/// producers).
fn id_from_scalar<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "report id must be a string or number, got {}",
            other
        ))),
    }
}

/// The analysis payload attached to a report.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AiReport {
    /// Service key → loosely-structured payload, in producer order.
    #[serde(default)]
    pub services: Map<String, Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One channel-analysis record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    #[serde(deserialize_with = "id_from_scalar")]
    pub id: String,
    /// Creation instant as an ISO 8601 string, stored verbatim.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default)]
    pub status: ReportStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_report: Option<AiReport>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Report {
    /// Create a fresh report with a new UUID and the current time.
    pub fn new(status: ReportStatus) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            timestamp: Some(Utc::now().to_rfc3339()),
            channel_name: None,
            channel_id: None,
            email: None,
            status,
            ai_report: None,
            extra: Map::new(),
        }
    }

    /// Parsed creation instant, if `timestamp` is present and valid RFC 3339.
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        let raw = self.timestamp.as_deref()?;
        DateTime::parse_from_rfc3339(raw)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }

    /// The service map, empty when the report carries no `aiReport`.
    pub fn services(&self) -> Option<&Map<String, Value>> {
        self.ai_report.as_ref().map(|r| &r.services)
    }

    pub fn service_count(&self) -> usize {
        self.services().map_or(0, Map::len)
    }
}
