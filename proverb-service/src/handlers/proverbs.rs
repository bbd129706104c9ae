use crate::dtos::{
    CreateProverbRequest, MessageResponse, ProverbJson, ProverbResponse, UpdateProverbRequest,
};
use crate::models::Proverb;
use crate::startup::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use metrics::counter;
use mongodb::bson::oid::ObjectId;
use service_core::error::AppError;
use validator::Validate;

pub const NOT_FOUND_MESSAGE: &str = "Proverb not found";
pub const DELETED_MESSAGE: &str = "Proverb deleted successfully";

/// Ids that are not 24-hex ObjectIds cannot name a stored record.
fn parse_id(id: &str) -> Result<ObjectId, AppError> {
    ObjectId::parse_str(id).map_err(|_| {
        tracing::warn!(proverb_id = %id, "Malformed proverb id");
        not_found()
    })
}

fn not_found() -> AppError {
    AppError::NotFound(anyhow::anyhow!(NOT_FOUND_MESSAGE))
}

/// Write failures on create and update are reported to the caller as 400,
/// carrying the store's message.
fn write_failure(err: AppError) -> AppError {
    match err {
        AppError::DatabaseError(e) | AppError::InternalError(e) => {
            tracing::error!(error = %e, "Proverb write failed");
            AppError::BadRequest(e)
        }
        other => other,
    }
}

pub async fn create_proverb(
    State(state): State<AppState>,
    ProverbJson(payload): ProverbJson<CreateProverbRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let proverb = Proverb::try_from(payload)?;
    let created = state.proverbs.insert(proverb).await.map_err(write_failure)?;

    counter!("proverbs_created_total").increment(1);
    tracing::info!(
        proverb_id = %created.id,
        language = %created.language,
        country = %created.country,
        "Proverb created"
    );

    Ok((StatusCode::CREATED, Json(ProverbResponse::from(created))))
}

pub async fn list_proverbs(
    State(state): State<AppState>,
) -> Result<Json<Vec<ProverbResponse>>, AppError> {
    let proverbs = state.proverbs.find_all().await.map_err(|e| {
        tracing::error!(error = %e, "Error fetching proverbs");
        e
    })?;

    Ok(Json(
        proverbs.into_iter().map(ProverbResponse::from).collect(),
    ))
}

pub async fn update_proverb(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ProverbJson(patch): ProverbJson<UpdateProverbRequest>,
) -> Result<Json<ProverbResponse>, AppError> {
    patch.validate()?;
    let id = parse_id(&id)?;

    let updated = state
        .proverbs
        .update(id, patch)
        .await
        .map_err(write_failure)?
        .ok_or_else(|| {
            tracing::warn!(proverb_id = %id, "Update of unknown proverb");
            not_found()
        })?;

    counter!("proverbs_updated_total").increment(1);
    tracing::info!(proverb_id = %updated.id, "Proverb updated");

    Ok(Json(ProverbResponse::from(updated)))
}

pub async fn delete_proverb(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    let id = parse_id(&id)?;

    let deleted = state
        .proverbs
        .delete(id)
        .await
        .map_err(|e| {
            tracing::error!(proverb_id = %id, error = %e, "Error deleting proverb");
            e
        })?
        .ok_or_else(|| {
            tracing::warn!(proverb_id = %id, "Delete of unknown proverb");
            not_found()
        })?;

    counter!("proverbs_deleted_total").increment(1);
    tracing::info!(proverb_id = %deleted.id, "Proverb deleted");

    Ok(Json(MessageResponse::new(DELETED_MESSAGE)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_id_accepts_object_id_hex() {
        let id = ObjectId::new();
        assert_eq!(parse_id(&id.to_hex()).unwrap(), id);
    }

    #[test]
    fn parse_id_maps_garbage_to_not_found() {
        let err = parse_id("not-an-id").unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        assert_eq!(err.to_string(), NOT_FOUND_MESSAGE);
    }

    #[test]
    fn write_failure_downgrades_store_errors_to_bad_request() {
        let err = write_failure(AppError::DatabaseError(anyhow::anyhow!("E11000 duplicate key")));
        assert!(matches!(err, AppError::BadRequest(_)));
        assert_eq!(err.to_string(), "E11000 duplicate key");
    }

    #[test]
    fn write_failure_keeps_not_found() {
        let err = write_failure(not_found());
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
