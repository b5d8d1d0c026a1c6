// AI recommendation pipeline: prompt, model call, JSON extraction, normalization

use cloudscope_common::{CloudProvider, Recommendation};
use cloudscope_providers::{GenerativeModel, ModelError};
use serde_json::{Map, Number, Value};
use std::time::Instant;

pub const RECOMMENDATION_COUNT: usize = 3;
pub const DEFAULT_WORKLOAD: &str = "web-app-frontend";
pub const DEFAULT_OPTIMIZATION: &str = "cost";

#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    #[error("model credential not configured")]
    NotConfigured,
    #[error(transparent)]
    Model(#[from] ModelError),
    /// No parseable JSON object in the model's text.
    #[error("could not parse model output")]
    Unparseable { raw: String },
    /// JSON parsed but lacks a `recommendations` array.
    #[error("model output has no recommendations list")]
    Malformed { raw: Value },
}

pub fn build_prompt(workload: &str, optimization_type: &str) -> String {
    format!(
        "You are an expert multi-cloud optimization assistant.\n\
Generate {RECOMMENDATION_COUNT} actionable recommendations in JSON only (no extra commentary) for the workload: {workload}.\n\
Primary objective: {optimization_type}.\n\
Allowed providers: aws, gcp, azure.\n\
Each recommendation must include: id (short slug), title, provider, confidence (0-100), costSavings (monthly USD estimate), performanceGain (percentage, can be negative), migrationTime (short string), reasoning (1 sentence), estimatedDowntime (short string).\n\
Return ONLY valid JSON object with shape {{\"recommendations\": [...]}}.\n\
Ensure numbers are raw numbers (no % or $ in values except inside reasoning)."
    )
}

/// Locate the first balanced top-level `{...}` in free text.
///
/// Braces inside JSON string literals are ignored. Returns `None` when no
/// object opens or the first one never closes.
pub fn extract_json_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text[start..].char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }
    None
}

#[derive(Debug, Clone, Copy)]
enum FieldDefault {
    /// `rec-{index+1}`
    Ordinal,
    Text(&'static str),
    Number { default: f64, range: Option<(f64, f64)> },
    Provider(CloudProvider),
}

/// Per-field defaulting rules applied to every model entry.
const RECOMMENDATION_DEFAULTS: &[(&str, FieldDefault)] = &[
    ("id", FieldDefault::Ordinal),
    ("title", FieldDefault::Text("Untitled Recommendation")),
    ("provider", FieldDefault::Provider(CloudProvider::Aws)),
    (
        "confidence",
        FieldDefault::Number {
            default: 70.0,
            range: Some((0.0, 100.0)),
        },
    ),
    (
        "costSavings",
        FieldDefault::Number {
            default: 0.0,
            range: None,
        },
    ),
    (
        "performanceGain",
        FieldDefault::Number {
            default: 0.0,
            range: None,
        },
    ),
    ("migrationTime", FieldDefault::Text("1-2 hours")),
    ("reasoning", FieldDefault::Text("No reasoning provided")),
    ("estimatedDowntime", FieldDefault::Text("Unknown")),
];

fn normalize_field(rule: FieldDefault, raw: Option<&Value>, index: usize) -> Value {
    let non_empty_str = raw.and_then(Value::as_str).filter(|s| !s.trim().is_empty());
    match rule {
        FieldDefault::Ordinal => Value::String(
            non_empty_str
                .map(str::to_string)
                .unwrap_or_else(|| format!("rec-{}", index + 1)),
        ),
        FieldDefault::Text(default) => Value::String(non_empty_str.unwrap_or(default).to_string()),
        FieldDefault::Provider(default) => Value::String(
            non_empty_str
                .and_then(CloudProvider::parse)
                .unwrap_or(default)
                .as_str()
                .to_string(),
        ),
        FieldDefault::Number { default, range } => {
            let n = raw
                .and_then(Value::as_f64)
                .filter(|n| n.is_finite())
                .map(|n| match range {
                    Some((lo, hi)) => n.clamp(lo, hi),
                    None => n,
                })
                .unwrap_or(default);
            Number::from_f64(n).map(Value::Number).unwrap_or(Value::Null)
        }
    }
}

/// Normalize one model entry. Anything that is not an object yields the canned fallback.
pub fn normalize_recommendation(entry: &Value, index: usize) -> Recommendation {
    let empty = Map::new();
    let fields = entry.as_object().unwrap_or(&empty);
    let normalized: Map<String, Value> = RECOMMENDATION_DEFAULTS
        .iter()
        .map(|(key, rule)| (key.to_string(), normalize_field(*rule, fields.get(*key), index)))
        .collect();

    match serde_json::from_value(Value::Object(normalized)) {
        Ok(r) => r,
        Err(e) => {
            tracing::error!(error = %e, "recommendation defaults table does not match type");
            fallback_recommendation(index)
        }
    }
}

/// The all-defaults entry used to pad short model answers.
pub fn fallback_recommendation(index: usize) -> Recommendation {
    Recommendation {
        id: format!("rec-{}", index + 1),
        title: "Untitled Recommendation".to_string(),
        provider: CloudProvider::Aws,
        confidence: 70.0,
        cost_savings: 0.0,
        performance_gain: 0.0,
        migration_time: "1-2 hours".to_string(),
        reasoning: "No reasoning provided".to_string(),
        estimated_downtime: "Unknown".to_string(),
    }
}

/// Turn raw model text into exactly [`RECOMMENDATION_COUNT`] recommendations.
pub fn parse_model_output(text: &str) -> Result<Vec<Recommendation>, ProxyError> {
    let candidate = extract_json_span(text).unwrap_or(text);
    let parsed: Value = serde_json::from_str(candidate).map_err(|_| ProxyError::Unparseable {
        raw: text.to_string(),
    })?;

    let Some(entries) = parsed.get("recommendations").and_then(Value::as_array) else {
        return Err(ProxyError::Malformed { raw: parsed });
    };

    Ok((0..RECOMMENDATION_COUNT)
        .map(|i| match entries.get(i) {
            Some(entry) => normalize_recommendation(entry, i),
            None => fallback_recommendation(i),
        })
        .collect())
}

pub async fn recommend(
    model: &dyn GenerativeModel,
    workload: &str,
    optimization_type: &str,
) -> Result<Vec<Recommendation>, ProxyError> {
    let correlation_id = uuid::Uuid::new_v4();
    let prompt = build_prompt(workload, optimization_type);
    tracing::info!(%correlation_id, source = model.source(), workload, optimization_type, "requesting recommendations");

    let started = Instant::now();
    let text = match model.generate(&prompt).await {
        Ok(t) => t,
        Err(e) => {
            tracing::error!(%correlation_id, elapsed_ms = started.elapsed().as_millis() as u64, error = %e, "model call failed");
            return Err(e.into());
        }
    };
    tracing::info!(%correlation_id, elapsed_ms = started.elapsed().as_millis() as u64, bytes = text.len(), "model answered");

    parse_model_output(&text).inspect_err(|e| {
        tracing::warn!(%correlation_id, error = %e, "model output rejected");
    })
}
