use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::Serialize;
use tracing::instrument;

use crate::db;
use crate::model::{Classroom, Student};
use crate::server::{ApiError, AppState};

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// GET /health. Liveness only; never touches storage.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

/// GET /api/classes
#[instrument(skip_all)]
pub async fn list_classes(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Classroom>>, ApiError> {
    let classes = db::list_classrooms_with_students(&state.pool).await?;
    Ok(Json(classes))
}

/// GET /api/students
#[instrument(skip_all)]
pub async fn list_students(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Student>>, ApiError> {
    let students = db::list_students(&state.pool).await?;
    Ok(Json(students))
}
