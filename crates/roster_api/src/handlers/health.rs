use crate::error::ApiError;
use crate::state::AppState;
use axum::{extract::State, Json};
use roster_core::db::schema_version;
use roster_core::RepoError;
use serde_json::{json, Value};

/// Reports the service version and the schema version of the open database.
pub async fn health_check(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let schema_version = state
        .with_tx(|conn| schema_version(conn).map_err(RepoError::from))
        .await?;

    Ok(Json(json!({
        "status": "ok",
        "version": roster_core::core_version(),
        "schema_version": schema_version,
    })))
}
