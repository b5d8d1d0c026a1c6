// Declarative input schemas shared by the JSON endpoints and the CSV importer

use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

use crate::{CloudProvider, CompanyProfile, Environment, InstanceStatus, NewCloudInstance};

/// Separator used when tags are flattened into a single string (CSV cells).
pub const TAG_SEPARATOR: char = ';';

/// Which rule a field broke.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Violation {
    Required,
    InvalidType,
    Empty,
    TooSmall,
    TooBig,
    InvalidEnum,
    InvalidEmail,
    InvalidTimestamp,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, utoipa::ToSchema)]
pub struct FieldError {
    pub field: String,
    pub rule: Violation,
    pub message: String,
}

impl FieldError {
    fn new(field: &str, rule: Violation, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            rule,
            message: message.into(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("{} field(s) failed validation", .0.len())]
    Invalid(Vec<FieldError>),
    /// Normalized output did not match the target type. Indicates a schema table bug.
    #[error("schema table does not match target type: {0}")]
    Shape(#[from] serde_json::Error),
}

impl SchemaError {
    pub fn field_errors(&self) -> &[FieldError] {
        match self {
            SchemaError::Invalid(errors) => errors,
            SchemaError::Shape(_) => &[],
        }
    }

    /// One-line summary, e.g. `cpu: must be greater than 0; provider: ...`.
    pub fn summary(&self) -> String {
        match self {
            SchemaError::Invalid(errors) => errors
                .iter()
                .map(|e| format!("{}: {}", e.field, e.message))
                .collect::<Vec<_>>()
                .join("; "),
            SchemaError::Shape(e) => e.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Bound {
    Inclusive(f64),
    Exclusive(f64),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldRule {
    /// Non-blank string, stored as given.
    Text,
    /// Non-blank string shaped like `user@domain.tld`.
    Email,
    /// Number, or a string that parses as one.
    Number { min: Bound, max: Option<f64> },
    /// Closed set of lower-case values; input is trimmed and lower-cased.
    Enum(&'static [&'static str]),
    /// Array of strings or a `;`-separated string.
    Tags,
    /// RFC 3339 timestamp; stamped with the current time when absent.
    Timestamp,
}

const POSITIVE: FieldRule = FieldRule::Number {
    min: Bound::Exclusive(0.0),
    max: None,
};
const NON_NEGATIVE: FieldRule = FieldRule::Number {
    min: Bound::Inclusive(0.0),
    max: None,
};
const PERCENT: FieldRule = FieldRule::Number {
    min: Bound::Inclusive(0.0),
    max: Some(100.0),
};
/// Hours in the longest month.
const HOURS_PER_MONTH: FieldRule = FieldRule::Number {
    min: Bound::Inclusive(0.0),
    max: Some(744.0),
};

#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub rule: FieldRule,
}

const fn field(name: &'static str, rule: FieldRule) -> FieldSpec {
    FieldSpec { name, rule }
}

#[derive(Debug)]
pub struct Schema {
    pub name: &'static str,
    pub fields: &'static [FieldSpec],
}

pub static PROFILE_SCHEMA: Schema = Schema {
    name: "profile",
    fields: &[
        field("name", FieldRule::Text),
        field("industry", FieldRule::Text),
        field("size", FieldRule::Text),
        field("contactEmail", FieldRule::Email),
    ],
};

pub static INSTANCE_SCHEMA: Schema = Schema {
    name: "instance",
    fields: &[
        field("name", FieldRule::Text),
        field("provider", FieldRule::Enum(&CloudProvider::ALL)),
        field("region", FieldRule::Text),
        field("type", FieldRule::Text),
        field("cpu", POSITIVE),
        field("memoryGb", POSITIVE),
        field("storageGb", NON_NEGATIVE),
        field("monthlyCost", NON_NEGATIVE),
        field("environment", FieldRule::Enum(&Environment::ALL)),
        field("status", FieldRule::Enum(&InstanceStatus::ALL)),
        field("cpuUtilization", PERCENT),
        field("memoryUtilization", PERCENT),
        field("networkInGb", NON_NEGATIVE),
        field("networkOutGb", NON_NEGATIVE),
        field("computeCost", NON_NEGATIVE),
        field("storageCost", NON_NEGATIVE),
        field("networkCost", NON_NEGATIVE),
        field("tags", FieldRule::Tags),
        field("uptime", HOURS_PER_MONTH),
        field("peakCpuUsage", PERCENT),
        field("avgResponseTime", NON_NEGATIVE),
        field("requestsPerHour", NON_NEGATIVE),
        field("createdDate", FieldRule::Timestamp),
        field("lastActivity", FieldRule::Timestamp),
    ],
};

/// Ordered column list a CSV import must carry. Timestamps are stamped by the server.
pub const INSTANCE_CSV_COLUMNS: [&str; 22] = [
    "name",
    "provider",
    "region",
    "type",
    "cpu",
    "memoryGb",
    "storageGb",
    "monthlyCost",
    "environment",
    "status",
    "cpuUtilization",
    "memoryUtilization",
    "networkInGb",
    "networkOutGb",
    "computeCost",
    "storageCost",
    "networkCost",
    "tags",
    "uptime",
    "peakCpuUsage",
    "avgResponseTime",
    "requestsPerHour",
];

fn email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("static email regex"))
}

impl Schema {
    /// Validate and normalize `input`, collecting every violation.
    pub fn normalize_at(
        &self,
        input: &Value,
        now: DateTime<Utc>,
    ) -> Result<Map<String, Value>, Vec<FieldError>> {
        let Some(object) = input.as_object() else {
            return Err(vec![FieldError::new(
                self.name,
                Violation::InvalidType,
                "expected a JSON object",
            )]);
        };

        let mut out = Map::with_capacity(self.fields.len());
        let mut errors = Vec::new();
        for spec in self.fields {
            match check(spec, object.get(spec.name), now) {
                Ok(v) => {
                    out.insert(spec.name.to_string(), v);
                }
                Err(e) => errors.push(e),
            }
        }

        if errors.is_empty() {
            Ok(out)
        } else {
            Err(errors)
        }
    }

    pub fn parse_at<T: DeserializeOwned>(
        &self,
        input: &Value,
        now: DateTime<Utc>,
    ) -> Result<T, SchemaError> {
        let normalized = self.normalize_at(input, now).map_err(SchemaError::Invalid)?;
        Ok(serde_json::from_value(Value::Object(normalized))?)
    }

    pub fn parse<T: DeserializeOwned>(&self, input: &Value) -> Result<T, SchemaError> {
        self.parse_at(input, Utc::now())
    }
}

pub fn parse_profile(input: &Value) -> Result<CompanyProfile, SchemaError> {
    PROFILE_SCHEMA.parse(input)
}

pub fn parse_instance(input: &Value) -> Result<NewCloudInstance, SchemaError> {
    INSTANCE_SCHEMA.parse(input)
}

pub fn parse_instance_at(input: &Value, now: DateTime<Utc>) -> Result<NewCloudInstance, SchemaError> {
    INSTANCE_SCHEMA.parse_at(input, now)
}

/// Split a flattened tag cell. `"a; b;;c"` gives `["a", "b", "c"]`, `""` gives `[]`.
pub fn split_tags(cell: &str) -> Vec<String> {
    cell.split(TAG_SEPARATOR)
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

fn check(spec: &FieldSpec, raw: Option<&Value>, now: DateTime<Utc>) -> Result<Value, FieldError> {
    let name = spec.name;
    let raw = raw.filter(|v| !v.is_null());

    if let FieldRule::Timestamp = spec.rule {
        return match raw {
            None => Ok(Value::String(now.to_rfc3339())),
            Some(Value::String(s)) if s.trim().is_empty() => Ok(Value::String(now.to_rfc3339())),
            Some(Value::String(s)) => DateTime::parse_from_rfc3339(s.trim())
                .map(|ts| Value::String(ts.with_timezone(&Utc).to_rfc3339()))
                .map_err(|_| {
                    FieldError::new(name, Violation::InvalidTimestamp, "expected an RFC 3339 timestamp")
                }),
            Some(_) => Err(FieldError::new(
                name,
                Violation::InvalidType,
                "expected an RFC 3339 timestamp string",
            )),
        };
    }

    let Some(raw) = raw else {
        return Err(FieldError::new(name, Violation::Required, "is required"));
    };

    match spec.rule {
        FieldRule::Text => {
            let s = expect_str(name, raw)?;
            if s.is_empty() {
                return Err(FieldError::new(name, Violation::Empty, "must not be empty"));
            }
            Ok(Value::String(s.to_string()))
        }
        FieldRule::Email => {
            let s = expect_str(name, raw)?;
            if s.is_empty() {
                return Err(FieldError::new(name, Violation::Empty, "must not be empty"));
            }
            if !email_regex().is_match(s) {
                return Err(FieldError::new(name, Violation::InvalidEmail, "must be a valid email address"));
            }
            Ok(Value::String(s.to_string()))
        }
        FieldRule::Number { min, max } => {
            let n = coerce_number(name, raw)?;
            match min {
                Bound::Exclusive(m) if n <= m => {
                    return Err(FieldError::new(name, Violation::TooSmall, format!("must be greater than {m}")));
                }
                Bound::Inclusive(m) if n < m => {
                    return Err(FieldError::new(name, Violation::TooSmall, format!("must be at least {m}")));
                }
                _ => {}
            }
            if let Some(m) = max {
                if n > m {
                    return Err(FieldError::new(name, Violation::TooBig, format!("must be at most {m}")));
                }
            }
            Number::from_f64(n)
                .map(Value::Number)
                .ok_or_else(|| FieldError::new(name, Violation::InvalidType, "expected a finite number"))
        }
        FieldRule::Enum(options) => {
            let s = expect_str(name, raw)?.trim().to_ascii_lowercase();
            if options.contains(&s.as_str()) {
                Ok(Value::String(s))
            } else {
                Err(FieldError::new(
                    name,
                    Violation::InvalidEnum,
                    format!("expected one of {}", options.join(", ")),
                ))
            }
        }
        FieldRule::Tags => match raw {
            Value::String(cell) => Ok(tags_value(split_tags(cell))),
            Value::Array(items) => {
                let mut tags = Vec::with_capacity(items.len());
                for item in items {
                    let Some(t) = item.as_str() else {
                        return Err(FieldError::new(name, Violation::InvalidType, "tags must be strings"));
                    };
                    let t = t.trim();
                    if !t.is_empty() {
                        tags.push(t.to_string());
                    }
                }
                Ok(tags_value(tags))
            }
            _ => Err(FieldError::new(
                name,
                Violation::InvalidType,
                "expected a list of strings or a ';'-separated string",
            )),
        },
        FieldRule::Timestamp => unreachable!("timestamps are handled above"),
    }
}

fn expect_str<'a>(name: &str, raw: &'a Value) -> Result<&'a str, FieldError> {
    raw.as_str()
        .ok_or_else(|| FieldError::new(name, Violation::InvalidType, "expected a string"))
}

fn coerce_number(name: &str, raw: &Value) -> Result<f64, FieldError> {
    let parsed = match raw {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match parsed {
        Some(n) if n.is_finite() => Ok(n),
        _ => Err(FieldError::new(name, Violation::InvalidType, "expected a number")),
    }
}

fn tags_value(tags: Vec<String>) -> Value {
    Value::Array(tags.into_iter().map(Value::String).collect())
}
