use crate::models::{Proverb, ProverbPatch};
use crate::services::MongoDb;
use async_trait::async_trait;
use futures::stream::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId};
use mongodb::options::{FindOneAndUpdateOptions, ReturnDocument};
use service_core::error::AppError;

/// Store operations behind the HTTP handlers. Each call is a single
/// document-level operation; atomicity is whatever the backing store gives a
/// single write.
#[async_trait]
pub trait ProverbRepository: Send + Sync {
    async fn insert(&self, proverb: Proverb) -> Result<Proverb, AppError>;

    /// Every record, in the store's natural order.
    async fn find_all(&self) -> Result<Vec<Proverb>, AppError>;

    /// Overwrites the keys present in `patch`. `None` when no record has `id`.
    async fn update(&self, id: ObjectId, patch: ProverbPatch)
        -> Result<Option<Proverb>, AppError>;

    /// Removes the record, returning it. `None` when no record has `id`.
    async fn delete(&self, id: ObjectId) -> Result<Option<Proverb>, AppError>;

    async fn health_check(&self) -> Result<(), AppError>;
}

#[derive(Clone)]
pub struct MongoProverbRepository {
    db: MongoDb,
}

impl MongoProverbRepository {
    pub fn new(db: MongoDb) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ProverbRepository for MongoProverbRepository {
    async fn insert(&self, proverb: Proverb) -> Result<Proverb, AppError> {
        self.db.proverbs().insert_one(&proverb, None).await?;
        Ok(proverb)
    }

    async fn find_all(&self) -> Result<Vec<Proverb>, AppError> {
        let cursor = self.db.proverbs().find(None, None).await?;
        let proverbs: Vec<Proverb> = cursor.try_collect().await?;
        Ok(proverbs)
    }

    async fn update(
        &self,
        id: ObjectId,
        patch: ProverbPatch,
    ) -> Result<Option<Proverb>, AppError> {
        let filter = doc! { "_id": id };

        // An update document with no operators is rejected by the server
        if patch.is_empty() {
            return Ok(self.db.proverbs().find_one(filter, None).await?);
        }

        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();

        let updated = self
            .db
            .proverbs()
            .find_one_and_update(filter, patch.to_update_document()?, options)
            .await?;
        Ok(updated)
    }

    async fn delete(&self, id: ObjectId) -> Result<Option<Proverb>, AppError> {
        let deleted = self
            .db
            .proverbs()
            .find_one_and_delete(doc! { "_id": id }, None)
            .await?;
        Ok(deleted)
    }

    async fn health_check(&self) -> Result<(), AppError> {
        self.db.health_check().await
    }
}
