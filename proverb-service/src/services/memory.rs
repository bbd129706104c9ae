use crate::models::{merge, Proverb, ProverbPatch};
use crate::services::ProverbRepository;
use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use service_core::error::AppError;
use tokio::sync::RwLock;

/// Insertion-ordered, process-local store. Used by the test-suite and for
/// running the service without a database.
#[derive(Default)]
pub struct InMemoryProverbRepository {
    records: RwLock<Vec<Proverb>>,
}

impl InMemoryProverbRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProverbRepository for InMemoryProverbRepository {
    async fn insert(&self, proverb: Proverb) -> Result<Proverb, AppError> {
        let mut records = self.records.write().await;
        if records.iter().any(|p| p.id == proverb.id) {
            return Err(AppError::DatabaseError(anyhow::anyhow!(
                "Duplicate proverb id {}",
                proverb.id
            )));
        }
        records.push(proverb.clone());
        Ok(proverb)
    }

    async fn find_all(&self) -> Result<Vec<Proverb>, AppError> {
        Ok(self.records.read().await.clone())
    }

    async fn update(
        &self,
        id: ObjectId,
        patch: ProverbPatch,
    ) -> Result<Option<Proverb>, AppError> {
        let mut records = self.records.write().await;
        let Some(slot) = records.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };

        let updated = merge(slot.clone(), patch);
        *slot = updated.clone();
        Ok(Some(updated))
    }

    async fn delete(&self, id: ObjectId) -> Result<Option<Proverb>, AppError> {
        let mut records = self.records.write().await;
        let removed = records
            .iter()
            .position(|p| p.id == id)
            .map(|idx| records.remove(idx));
        Ok(removed)
    }

    async fn health_check(&self) -> Result<(), AppError> {
        Ok(())
    }
}
