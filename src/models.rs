//! API Models

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use utoipa::ToSchema;

// ============ Wire bodies ============

/// Acknowledgement returned for an accepted alert
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct IntakeAck {
    /// Always "Alert received"
    pub message: String,
    /// Echo of the submitted `alert_id`, whatever its JSON type
    #[schema(value_type = Object)]
    pub alert_id: Value,
}

impl IntakeAck {
    /// Acknowledge `alert_id`
    pub fn received(alert_id: Value) -> Self {
        Self { message: "Alert received".into(), alert_id }
    }
}

/// Error response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Rejection reason
    pub error: String,
}

/// Health check + schema documentation
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Liveness banner
    pub message: String,
    /// Always "healthy"
    pub status: String,
    /// Field-by-field payload documentation
    pub expected_payload: ExpectedPayload,
}

/// Human-readable type hints for every alert field.
///
/// Documentation only; the validator does not read it.
#[allow(missing_docs)]
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ExpectedPayload {
    pub alert_id: String,
    pub timestamp: String,
    pub source_system: String,
    pub alert_type: String,
    pub severity: String,
    pub risk_score: String,
    pub affected_assets: Vec<String>,
    pub geo_location: String,
    pub raw_log: String,
    pub correlation_id: String,
    pub status: String,
    pub assigned_team: String,
    pub notes: String,
    pub callback_url: String,
}

impl Default for ExpectedPayload {
    fn default() -> Self {
        Self {
            alert_id: "string".into(),
            timestamp: "ISO 8601 UTC".into(),
            source_system: "SIEM/XDR name".into(),
            alert_type: "e.g. brute_force, phishing".into(),
            severity: Severity::hint(),
            risk_score: "numeric".into(),
            affected_assets: vec!["hostname".into(), "IP".into(), "user".into()],
            geo_location: "optional".into(),
            raw_log: "original event data".into(),
            correlation_id: "optional".into(),
            status: AlertStatus::hint(),
            assigned_team: "optional".into(),
            notes: "optional".into(),
            callback_url: "optional".into(),
        }
    }
}

// ============ Alert ============

/// Alert severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// `low`
    Low,
    /// `medium`
    Medium,
    /// `high`
    High,
    /// `critical`
    Critical,
}

impl Severity {
    /// Every accepted severity
    pub const ALL: [Severity; 4] = [Self::Low, Self::Medium, Self::High, Self::Critical];

    /// Wire value
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }

    /// Exact, case-sensitive lookup of a wire value
    pub fn from_wire(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.as_str() == value)
    }

    fn hint() -> String {
        Self::ALL.map(|s| s.as_str()).join(" | ")
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Alert lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AlertStatus {
    /// `open`
    Open,
    /// `in_progress`
    InProgress,
    /// `closed`
    Closed,
}

impl AlertStatus {
    /// Every accepted status
    pub const ALL: [AlertStatus; 3] = [Self::Open, Self::InProgress, Self::Closed];

    /// Wire value
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::InProgress => "in_progress",
            Self::Closed => "closed",
        }
    }

    /// Exact, case-sensitive lookup of a wire value
    pub fn from_wire(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.as_str() == value)
    }

    fn hint() -> String {
        Self::ALL.map(|s| s.as_str()).join(" | ")
    }
}

impl fmt::Display for AlertStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Alert as accepted by the validator.
///
/// Fields the validator only checks for presence keep their raw JSON value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlertRecord {
    /// Submitter's identifier, echoed back on acceptance
    pub alert_id: Value,
    /// Event time; offset-less submissions are read as UTC
    pub timestamp: DateTime<FixedOffset>,
    /// Reporting SIEM/XDR
    pub source_system: Value,
    /// Detection category, e.g. `brute_force`
    pub alert_type: Value,
    /// Validated severity
    pub severity: Severity,
    /// Integer or float score as submitted
    pub risk_score: Number,
    /// Hosts, IPs or users involved
    pub affected_assets: Value,
    /// Original event data
    pub raw_log: Value,
    /// Validated lifecycle status
    pub status: AlertStatus,
    /// Optional keys that were present in the submission
    pub optional: BTreeMap<&'static str, Value>,
}

/// Render a JSON value for log lines: strings bare, everything else as JSON.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
