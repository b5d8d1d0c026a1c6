use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod schema;

pub use schema::{FieldError, SchemaError, Violation};

// --- Enums ---

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum CloudProvider {
    Aws,
    Gcp,
    Azure,
}

impl CloudProvider {
    pub const ALL: [&'static str; 3] = ["aws", "gcp", "azure"];

    pub fn as_str(&self) -> &'static str {
        match self {
            CloudProvider::Aws => "aws",
            CloudProvider::Gcp => "gcp",
            CloudProvider::Azure => "azure",
        }
    }

    /// Case-insensitive lookup; surrounding whitespace is ignored.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "aws" => Some(CloudProvider::Aws),
            "gcp" => Some(CloudProvider::Gcp),
            "azure" => Some(CloudProvider::Azure),
            _ => None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Prod,
    Staging,
    Dev,
}

impl Environment {
    pub const ALL: [&'static str; 3] = ["prod", "staging", "dev"];
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum InstanceStatus {
    Running,
    Stopped,
    Terminated,
    Pending,
}

impl InstanceStatus {
    pub const ALL: [&'static str; 4] = ["running", "stopped", "terminated", "pending"];
}

// --- Entities ---

/// Company profile captured by the onboarding wizard. One per process.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CompanyProfile {
    pub name: String,
    pub industry: String,
    /// Size bucket ("1-50", "51-250", ...). Free-form on the server side.
    pub size: String,
    pub contact_email: String,
}

/// A validated instance snapshot that has not been stored yet.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewCloudInstance {
    pub name: String,
    pub provider: CloudProvider,
    pub region: String,
    #[serde(rename = "type")]
    pub instance_type: String,
    pub cpu: f64,
    pub memory_gb: f64,
    pub storage_gb: f64,
    pub monthly_cost: f64,
    pub environment: Environment,
    pub status: InstanceStatus,
    pub cpu_utilization: f64,
    pub memory_utilization: f64,
    pub network_in_gb: f64,
    pub network_out_gb: f64,
    // Breakdown is operator-entered; it is not required to add up to monthly_cost.
    pub compute_cost: f64,
    pub storage_cost: f64,
    pub network_cost: f64,
    pub tags: Vec<String>,
    pub uptime: f64,
    pub peak_cpu_usage: f64,
    pub avg_response_time: f64,
    pub requests_per_hour: f64,
    pub created_date: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
}

impl NewCloudInstance {
    pub fn into_record(self, id: Uuid) -> CloudInstanceRecord {
        CloudInstanceRecord { id, instance: self }
    }
}

/// A stored instance: the validated fields plus the server-generated id.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, utoipa::ToSchema)]
pub struct CloudInstanceRecord {
    pub id: Uuid,
    #[serde(flatten)]
    pub instance: NewCloudInstance,
}

/// Normalized AI recommendation. Never persisted.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub id: String,
    pub title: String,
    pub provider: CloudProvider,
    pub confidence: f64,
    /// Monthly USD estimate.
    pub cost_savings: f64,
    /// Percentage, may be negative.
    pub performance_gain: f64,
    pub migration_time: String,
    pub reasoning: String,
    pub estimated_downtime: String,
}
