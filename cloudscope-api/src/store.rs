// Company profile and instance inventory storage

use async_trait::async_trait;
use cloudscope_common::{CloudInstanceRecord, CompanyProfile, NewCloudInstance};
use tokio::sync::RwLock;
use uuid::Uuid;

/// Failure reported by a repository backend. [`InMemoryRepository`] never fails;
/// this is the error a persistent implementation returns through the same trait.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store backend failure: {0}")]
    Backend(String),
}

#[async_trait]
pub trait CompanyRepository: Send + Sync {
    /// Replace the profile wholesale.
    async fn set_profile(&self, profile: CompanyProfile) -> Result<CompanyProfile, StoreError>;
    async fn get_profile(&self) -> Result<Option<CompanyProfile>, StoreError>;
    /// Append one instance under a freshly generated id.
    async fn add_instance(&self, instance: NewCloudInstance)
        -> Result<CloudInstanceRecord, StoreError>;
    /// Append a batch contiguously, preserving input order.
    async fn add_instances(
        &self,
        instances: Vec<NewCloudInstance>,
    ) -> Result<Vec<CloudInstanceRecord>, StoreError>;
    /// All instances in insertion order.
    async fn list_instances(&self) -> Result<Vec<CloudInstanceRecord>, StoreError>;
}

/// Process-memory store; empty again after a restart.
#[derive(Default)]
pub struct InMemoryRepository {
    profile: RwLock<Option<CompanyProfile>>,
    instances: RwLock<Vec<CloudInstanceRecord>>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CompanyRepository for InMemoryRepository {
    async fn set_profile(&self, profile: CompanyProfile) -> Result<CompanyProfile, StoreError> {
        *self.profile.write().await = Some(profile.clone());
        Ok(profile)
    }

    async fn get_profile(&self) -> Result<Option<CompanyProfile>, StoreError> {
        Ok(self.profile.read().await.clone())
    }

    async fn add_instance(
        &self,
        instance: NewCloudInstance,
    ) -> Result<CloudInstanceRecord, StoreError> {
        let record = instance.into_record(Uuid::new_v4());
        self.instances.write().await.push(record.clone());
        Ok(record)
    }

    async fn add_instances(
        &self,
        instances: Vec<NewCloudInstance>,
    ) -> Result<Vec<CloudInstanceRecord>, StoreError> {
        let records: Vec<CloudInstanceRecord> = instances
            .into_iter()
            .map(|i| i.into_record(Uuid::new_v4()))
            .collect();
        self.instances.write().await.extend(records.iter().cloned());
        Ok(records)
    }

    async fn list_instances(&self) -> Result<Vec<CloudInstanceRecord>, StoreError> {
        Ok(self.instances.read().await.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cloudscope_common::schema::parse_instance;
    use serde_json::json;
    use std::sync::Arc;

    fn instance(name: &str) -> NewCloudInstance {
        parse_instance(&json!({
            "name": name, "provider": "azure", "region": "westeurope", "type": "B2s",
            "cpu": 2, "memoryGb": 4, "storageGb": 30, "monthlyCost": 30,
            "environment": "dev", "status": "stopped",
            "cpuUtilization": 5, "memoryUtilization": 10, "networkInGb": 0, "networkOutGb": 0,
            "computeCost": 25, "storageCost": 5, "networkCost": 0, "tags": [],
            "uptime": 0, "peakCpuUsage": 10, "avgResponseTime": 0, "requestsPerHour": 0
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn profile_starts_empty_and_is_replaced_wholesale() {
        let repo = InMemoryRepository::new();
        assert!(repo.get_profile().await.unwrap().is_none());

        let first = CompanyProfile {
            name: "Acme".into(),
            industry: "Retail".into(),
            size: "1-50".into(),
            contact_email: "ops@acme.io".into(),
        };
        let second = CompanyProfile {
            name: "Acme Group".into(),
            ..first.clone()
        };
        repo.set_profile(first).await.unwrap();
        repo.set_profile(second.clone()).await.unwrap();
        assert_eq!(repo.get_profile().await.unwrap(), Some(second));
    }

    #[tokio::test]
    async fn appends_preserve_order_and_assign_unique_ids() {
        let repo = InMemoryRepository::new();
        let one = repo.add_instance(instance("one")).await.unwrap();
        let batch = repo
            .add_instances(vec![instance("two"), instance("three")])
            .await
            .unwrap();

        let all = repo.list_instances().await.unwrap();
        let names: Vec<&str> = all.iter().map(|r| r.instance.name.as_str()).collect();
        assert_eq!(names, vec!["one", "two", "three"]);
        assert_eq!(all[0].id, one.id);
        assert_eq!(&all[1..], batch.as_slice());
        assert_ne!(all[1].id, all[2].id);
    }

    #[tokio::test]
    async fn concurrent_appends_are_not_lost() {
        let repo = Arc::new(InMemoryRepository::new());
        let mut handles = Vec::new();
        for i in 0..64 {
            let repo = repo.clone();
            handles.push(tokio::spawn(async move {
                repo.add_instance(instance(&format!("vm-{i}"))).await.unwrap();
            }));
        }
        for h in handles {
            h.await.unwrap();
        }
        assert_eq!(repo.list_instances().await.unwrap().len(), 64);
    }
}
