//! services/api/src/web/mood.rs
//!
//! Mood tracking endpoints.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use companion_core::domain::{Mood, MoodEntry, User};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::web::error::{ApiFailure, ErrorBody};
use crate::web::state::AppState;

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Deserialize, ToSchema)]
pub struct CreateMoodRequest {
    /// One of: joyful, happy, content, neutral, sad, anxious, stressed,
    /// angry, exhausted.
    pub mood: String,
    pub note: Option<String>,
}

#[derive(Deserialize, IntoParams)]
pub struct MoodListQuery {
    /// Inclusive lower bound (RFC 3339).
    pub start_date: Option<DateTime<Utc>>,
    /// Inclusive upper bound (RFC 3339).
    pub end_date: Option<DateTime<Utc>>,
}

#[derive(Serialize, ToSchema)]
pub struct MoodEntryResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    #[schema(value_type = String)]
    pub mood: Mood,
    pub note: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl From<MoodEntry> for MoodEntryResponse {
    fn from(entry: MoodEntry) -> Self {
        Self {
            id: entry.id,
            user_id: entry.user_id,
            mood: entry.mood,
            note: entry.note,
            timestamp: entry.timestamp,
        }
    }
}

//=========================================================================================
// Handlers
//=========================================================================================

/// POST /moods - Log a mood entry
#[utoipa::path(
    post,
    path = "/moods",
    request_body = CreateMoodRequest,
    responses(
        (status = 201, description = "Mood entry created", body = MoodEntryResponse),
        (status = 400, description = "Unknown mood value", body = ErrorBody),
        (status = 401, description = "Missing or invalid token", body = ErrorBody)
    ),
    security(("bearer" = []))
)]
pub async fn create_mood_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Json(req): Json<CreateMoodRequest>,
) -> Result<impl IntoResponse, ApiFailure> {
    let mood: Mood = req.mood.parse().map_err(ApiFailure::Validation)?;
    let entry = state.db.create_mood(user.id, mood, req.note).await?;
    Ok((StatusCode::CREATED, Json(MoodEntryResponse::from(entry))))
}

/// GET /moods - The caller's mood entries, newest first
#[utoipa::path(
    get,
    path = "/moods",
    params(MoodListQuery),
    responses(
        (status = 200, description = "Mood entries within the range", body = [MoodEntryResponse]),
        (status = 401, description = "Missing or invalid token", body = ErrorBody)
    ),
    security(("bearer" = []))
)]
pub async fn list_moods_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Query(query): Query<MoodListQuery>,
) -> Result<Json<Vec<MoodEntryResponse>>, ApiFailure> {
    let entries = state
        .db
        .list_moods(user.id, query.start_date, query.end_date)
        .await?;
    Ok(Json(
        entries.into_iter().map(MoodEntryResponse::from).collect(),
    ))
}

/// GET /moods/{mood_id} - One mood entry
#[utoipa::path(
    get,
    path = "/moods/{mood_id}",
    params(("mood_id" = Uuid, Path, description = "Mood entry id")),
    responses(
        (status = 200, description = "The mood entry", body = MoodEntryResponse),
        (status = 404, description = "Entry missing or owned by someone else", body = ErrorBody)
    ),
    security(("bearer" = []))
)]
pub async fn get_mood_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Path(mood_id): Path<Uuid>,
) -> Result<Json<MoodEntryResponse>, ApiFailure> {
    let entry = state.db.get_mood(user.id, mood_id).await?;
    Ok(Json(MoodEntryResponse::from(entry)))
}
