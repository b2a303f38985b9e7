//! Alert Validator
//!
//! Decides whether an inbound submission is acceptable. Checks run in a fixed
//! order and stop at the first failure:
//!
//! ```text
//!  api key ─▶ content type ─▶ JSON object ─▶ required fields
//!     403          415            400             422
//!
//!  timestamp ─▶ status ─▶ severity ─▶ risk_score ─▶ accepted (audit log)
//!     422         422        422          422
//! ```
//!
//! Request-level gates run before the body is parsed, so a caller without a
//! valid key learns nothing about the payload schema.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::http::StatusCode;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime};
use serde_json::{Map, Number, Value};

use crate::middleware::auth::verify_api_key;
use crate::models::{display_value, AlertRecord, AlertStatus, Severity};

/// Keys every submission must carry
pub const REQUIRED_FIELDS: [&str; 9] = [
    "alert_id",
    "timestamp",
    "source_system",
    "alert_type",
    "severity",
    "risk_score",
    "affected_assets",
    "raw_log",
    "status",
];

/// Keys that are carried through when present but never checked
pub const OPTIONAL_FIELDS: [&str; 5] = [
    "geo_location",
    "correlation_id",
    "assigned_team",
    "notes",
    "callback_url",
];

/// The only accepted media type
pub const JSON_MEDIA_TYPE: &str = "application/json";

/// Audit log target for accepted alerts
pub const AUDIT_TARGET: &str = "audit";

/// Raw pieces of an intake request the validator looks at
#[derive(Debug, Clone, Copy)]
pub struct IntakeRequest<'a> {
    /// `x-api-key` header, if present and readable
    pub api_key: Option<&'a str>,
    /// `Content-Type` header, if present and readable
    pub content_type: Option<&'a str>,
    /// Unparsed request body
    pub body: &'a [u8],
}

/// Why a submission was refused
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    /// HTTP status returned to the caller
    pub status: StatusCode,
    /// Text of the `error` field
    pub message: String,
}

impl Rejection {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self { status, message: message.into() }
    }

    /// 403 for an absent or wrong key
    pub fn invalid_api_key() -> Self {
        Self::new(StatusCode::FORBIDDEN, "Missing or invalid API key")
    }

    /// 415 for anything but JSON
    pub fn unsupported_media_type() -> Self {
        Self::new(StatusCode::UNSUPPORTED_MEDIA_TYPE, "Unsupported Media Type")
    }

    /// 400 for a body that is not a JSON object
    pub fn not_json() -> Self {
        Self::new(StatusCode::BAD_REQUEST, "Request must be JSON")
    }

    /// 422 listing every absent required key
    pub fn missing_fields(missing: &[&str]) -> Self {
        let list = missing
            .iter()
            .map(|field| format!("'{field}'"))
            .collect::<Vec<_>>()
            .join(", ");
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, format!("Missing fields: [{list}]"))
    }

    /// 422 for an unparseable `timestamp`
    pub fn invalid_timestamp() -> Self {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, "Invalid timestamp format")
    }

    /// 422 for a `status` outside the closed set
    pub fn invalid_status() -> Self {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, "Invalid status value")
    }

    /// 422 for a `severity` outside the closed set
    pub fn invalid_severity() -> Self {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, "Invalid severity value")
    }

    /// 422 for a non-numeric `risk_score`
    pub fn non_numeric_risk_score() -> Self {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, "risk_score must be numeric")
    }
}

/// Result of validating one submission
pub type ValidationOutcome = Result<AlertRecord, Rejection>;

/// Stateless validator bound to the configured API key.
///
/// Cloning is cheap; every clone shares the same key.
#[derive(Clone)]
pub struct AlertValidator {
    api_key: Arc<str>,
}

impl AlertValidator {
    /// Validator accepting only `api_key`
    pub fn new(api_key: impl Into<Arc<str>>) -> Self {
        Self { api_key: api_key.into() }
    }

    /// Run the full check chain over one request.
    ///
    /// The only side effect is the audit log line on acceptance.
    pub fn validate(&self, request: &IntakeRequest<'_>) -> ValidationOutcome {
        check_api_key(request.api_key, &self.api_key)?;
        check_content_type(request.content_type)?;
        let mut payload = parse_body(request.body)?;
        check_required_fields(&payload)?;

        let timestamp = check_timestamp(&take(&mut payload, "timestamp"))?;
        let status = check_status(&take(&mut payload, "status"))?;
        let severity = check_severity(&take(&mut payload, "severity"))?;
        let risk_score = check_risk_score(take(&mut payload, "risk_score"))?;

        let record = AlertRecord {
            alert_id: take(&mut payload, "alert_id"),
            timestamp,
            source_system: take(&mut payload, "source_system"),
            alert_type: take(&mut payload, "alert_type"),
            severity,
            risk_score,
            affected_assets: take(&mut payload, "affected_assets"),
            raw_log: take(&mut payload, "raw_log"),
            status,
            optional: collect_optional(&mut payload),
        };

        tracing::info!(
            target: AUDIT_TARGET,
            alert_id = %display_value(&record.alert_id),
            alert_type = %display_value(&record.alert_type),
            severity = %record.severity,
            "Received alert"
        );

        Ok(record)
    }
}

fn check_api_key(presented: Option<&str>, expected: &str) -> Result<(), Rejection> {
    if verify_api_key(presented, expected) {
        Ok(())
    } else {
        Err(Rejection::invalid_api_key())
    }
}

/// Media type parameters such as `charset` are ignored.
fn check_content_type(content_type: Option<&str>) -> Result<(), Rejection> {
    let essence = content_type
        .and_then(|ct| ct.split(';').next())
        .map(str::trim);

    match essence {
        Some(mime) if mime.eq_ignore_ascii_case(JSON_MEDIA_TYPE) => Ok(()),
        _ => Err(Rejection::unsupported_media_type()),
    }
}

/// The body must be a JSON object; arrays and scalars are refused.
fn parse_body(body: &[u8]) -> Result<Map<String, Value>, Rejection> {
    serde_json::from_slice(body).map_err(|_| Rejection::not_json())
}

fn check_required_fields(payload: &Map<String, Value>) -> Result<(), Rejection> {
    let missing: Vec<&str> = REQUIRED_FIELDS
        .iter()
        .copied()
        .filter(|field| !payload.contains_key(*field))
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(Rejection::missing_fields(&missing))
    }
}

fn check_timestamp(value: &Value) -> Result<DateTime<FixedOffset>, Rejection> {
    value
        .as_str()
        .and_then(parse_timestamp)
        .ok_or_else(Rejection::invalid_timestamp)
}

fn check_status(value: &Value) -> Result<AlertStatus, Rejection> {
    value
        .as_str()
        .and_then(AlertStatus::from_wire)
        .ok_or_else(Rejection::invalid_status)
}

fn check_severity(value: &Value) -> Result<Severity, Rejection> {
    value
        .as_str()
        .and_then(Severity::from_wire)
        .ok_or_else(Rejection::invalid_severity)
}

/// Integers and floats pass; numeric-looking strings and booleans do not.
fn check_risk_score(value: Value) -> Result<Number, Rejection> {
    match value {
        Value::Number(n) => Ok(n),
        _ => Err(Rejection::non_numeric_risk_score()),
    }
}

/// Parse an ISO-8601 date-time.
///
/// Accepts `YYYY-MM-DD`, optionally followed by `T` or a single space and
/// `HH`, `HH:MM`, `HH:MM:SS` or `HH:MM:SS.f` (1-9 fraction digits), then an
/// optional `±HH:MM` offset. Every field has a fixed width. A single
/// trailing `Z` is read as `+00:00`. Values without an offset are taken as
/// UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<FixedOffset>> {
    let normalized = match raw.strip_suffix('Z') {
        Some(head) => format!("{head}+00:00"),
        None => raw.to_owned(),
    };
    let mut scan = Scanner::new(&normalized);

    let year = scan.fixed(4)?;
    scan.expect(b'-')?;
    let month = scan.fixed(2)?;
    scan.expect(b'-')?;
    let day = scan.fixed(2)?;
    let date = NaiveDate::from_ymd_opt(i32::try_from(year).ok()?, month, day)
        .filter(|_| year > 0)?;

    let utc = FixedOffset::east_opt(0)?;
    if scan.done() {
        return date.and_hms_opt(0, 0, 0)?.and_local_timezone(utc).single();
    }

    if !(scan.eat(b'T') || scan.eat(b' ')) {
        return None;
    }

    let hour = scan.fixed(2)?;
    let (mut minute, mut second, mut nano) = (0, 0, 0);
    if scan.eat(b':') {
        minute = scan.fixed(2)?;
        if scan.eat(b':') {
            second = scan.fixed(2)?;
            if scan.eat(b'.') {
                nano = scan.fraction()?;
            }
        }
    }
    let time = NaiveTime::from_hms_nano_opt(hour, minute, second, nano)?;

    let offset = if scan.done() {
        utc
    } else {
        let sign = if scan.eat(b'+') {
            1
        } else if scan.eat(b'-') {
            -1
        } else {
            return None;
        };
        let hours = scan.fixed(2)?;
        scan.expect(b':')?;
        let minutes = scan.fixed(2)?;
        if hours > 23 || minutes > 59 || !scan.done() {
            return None;
        }
        let seconds = i32::try_from(hours * 3600 + minutes * 60).ok()?;
        FixedOffset::east_opt(sign * seconds)?
    };

    date.and_time(time).and_local_timezone(offset).single()
}

/// Byte cursor over a timestamp; every field read is fixed-width.
struct Scanner<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Scanner<'a> {
    fn new(input: &'a str) -> Self {
        Self { bytes: input.as_bytes(), pos: 0 }
    }

    /// Exactly `width` ASCII digits
    fn fixed(&mut self, width: usize) -> Option<u32> {
        let field = self.bytes.get(self.pos..self.pos + width)?;
        if !field.iter().all(u8::is_ascii_digit) {
            return None;
        }
        self.pos += width;
        Some(field.iter().fold(0, |acc, b| acc * 10 + u32::from(b - b'0')))
    }

    /// Fraction digits scaled to nanoseconds
    fn fraction(&mut self) -> Option<u32> {
        let width = self.bytes[self.pos..]
            .iter()
            .take_while(|b| b.is_ascii_digit())
            .count();
        if width == 0 || width > 9 {
            return None;
        }
        let value = self.fixed(width)?;
        Some(value * 10u32.pow((9 - width) as u32))
    }

    fn eat(&mut self, expected: u8) -> bool {
        if self.bytes.get(self.pos) == Some(&expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, expected: u8) -> Option<()> {
        self.eat(expected).then_some(())
    }

    fn done(&self) -> bool {
        self.pos == self.bytes.len()
    }
}

fn take(payload: &mut Map<String, Value>, key: &str) -> Value {
    payload.remove(key).unwrap_or(Value::Null)
}

fn collect_optional(payload: &mut Map<String, Value>) -> BTreeMap<&'static str, Value> {
    OPTIONAL_FIELDS
        .iter()
        .filter_map(|&key| payload.remove(key).map(|value| (key, value)))
        .collect()
}
