//! services/api/src/web/sessions.rs
//!
//! Scheduling, completing and cancelling mentorship sessions.

use afrilead_core::domain::{Session, SessionQuery, SessionStatus};
use afrilead_core::validation::{validate_session, validate_session_rating};
use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::error::{AppError, AppResult, ErrorBody};
use crate::web::auth::MessageResponse;
use crate::web::extract::{JsonBody, JsonPath, JsonQuery};
use crate::web::non_empty;
use crate::web::state::AppState;
use crate::web::views::{load_summaries, SessionView};

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListSessionsParams {
    pub status: Option<String>,
    /// `true` restricts the list to scheduled sessions that have not started yet.
    /// Any other value is ignored.
    pub upcoming: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct ListSessionsResponse {
    pub sessions: Vec<SessionView>,
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionBody {
    pub mentor_id: Option<Uuid>,
    pub mentee_id: Option<Uuid>,
    pub scheduled_at: Option<DateTime<Utc>>,
    /// Minutes, 15 to 180. Defaults to 30.
    pub duration: Option<u32>,
    pub topic: Option<String>,
    pub notes: Option<String>,
    pub meeting_link: Option<String>,
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSessionBody {
    pub status: Option<String>,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub duration: Option<u32>,
    pub topic: Option<String>,
    pub notes: Option<String>,
    pub meeting_link: Option<String>,
    /// Only read when completing a session.
    pub rating: Option<i64>,
    /// Only read when completing a session.
    pub feedback: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct SessionResponse {
    pub session: SessionView,
}

#[derive(Serialize, ToSchema)]
pub struct SessionWithMessageResponse {
    pub session: SessionView,
    pub message: String,
}

//=========================================================================================
// Helpers
//=========================================================================================

async fn load_own_session(state: &AppState, session_id: Uuid, user_id: Uuid) -> AppResult<Session> {
    let session = state.db.get_session(session_id).await?;
    if !session.involves(user_id) {
        return Err(AppError::forbidden("Unauthorized"));
    }
    Ok(session)
}

async fn session_view(state: &AppState, session: &Session) -> AppResult<SessionView> {
    let users = load_summaries(
        state.db.as_ref(),
        [session.mentor_id, session.mentee_id],
    )
    .await?;
    Ok(SessionView::new(session, &users))
}

/// Marks `session` completed, recording the mentee's rating and feedback.
///
/// Returns the rating to fold into the mentor's average, if one was given.
fn complete(session: &mut Session, body: UpdateSessionBody) -> AppResult<Option<u8>> {
    let rating = match body.rating {
        Some(rating) => {
            validate_session_rating(rating)?;
            u8::try_from(rating).ok()
        }
        None => None,
    };

    session.status = SessionStatus::Completed;
    session.completed_at = Some(Utc::now());
    if rating.is_some() {
        session.rating = rating;
    }
    if let Some(feedback) = non_empty(body.feedback) {
        session.feedback = Some(feedback);
    }
    Ok(rating)
}

/// Applies a reschedule or edit. Completion goes through [`complete`] instead.
fn apply_edit(session: &mut Session, body: UpdateSessionBody) -> AppResult<()> {
    if let Some(status) = non_empty(body.status) {
        session.status = match status.parse::<SessionStatus>()? {
            SessionStatus::Completed => return Err(AppError::bad_request("Invalid session status")),
            other => other,
        };
    }
    if let Some(scheduled_at) = body.scheduled_at {
        session.scheduled_at = scheduled_at;
    }
    if let Some(duration) = body.duration {
        session.duration = duration;
    }
    if let Some(topic) = body.topic {
        session.topic = topic;
    }
    if let Some(notes) = body.notes {
        session.notes = non_empty(Some(notes));
    }
    if let Some(link) = body.meeting_link {
        session.meeting_link = non_empty(Some(link));
    }
    Ok(())
}

//=========================================================================================
// Handlers
//=========================================================================================

/// GET /api/sessions - Sessions the caller takes part in
#[utoipa::path(
    get,
    path = "/api/sessions",
    params(ListSessionsParams),
    responses(
        (status = 200, description = "Matching sessions", body = ListSessionsResponse),
        (status = 400, description = "Unknown status", body = ErrorBody),
        (status = 401, description = "Not signed in", body = ErrorBody)
    )
)]
pub async fn list_sessions_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    JsonQuery(params): JsonQuery<ListSessionsParams>,
) -> AppResult<Json<ListSessionsResponse>> {
    let status = non_empty(params.status)
        .map(|s| s.parse::<SessionStatus>())
        .transpose()?;
    let upcoming_from = (params.upcoming.as_deref() == Some("true")).then(Utc::now);

    let sessions = state
        .db
        .list_sessions(&SessionQuery {
            user_id,
            status,
            upcoming_from,
        })
        .await?;
    let users = load_summaries(
        state.db.as_ref(),
        sessions.iter().flat_map(|s| [s.mentor_id, s.mentee_id]),
    )
    .await?;

    Ok(Json(ListSessionsResponse {
        sessions: sessions
            .iter()
            .map(|s| SessionView::new(s, &users))
            .collect(),
    }))
}

/// POST /api/sessions - Schedule a session
#[utoipa::path(
    post,
    path = "/api/sessions",
    request_body = CreateSessionBody,
    responses(
        (status = 201, description = "Session scheduled", body = SessionWithMessageResponse),
        (status = 400, description = "Invalid session", body = ErrorBody),
        (status = 401, description = "Not signed in", body = ErrorBody),
        (status = 403, description = "Caller is not a participant", body = ErrorBody),
        (status = 404, description = "User not found", body = ErrorBody)
    )
)]
pub async fn create_session_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    JsonBody(body): JsonBody<CreateSessionBody>,
) -> AppResult<impl IntoResponse> {
    let (Some(mentor_id), Some(mentee_id), Some(scheduled_at), Some(topic)) = (
        body.mentor_id,
        body.mentee_id,
        body.scheduled_at,
        non_empty(body.topic),
    ) else {
        return Err(AppError::bad_request("Missing required fields"));
    };
    if user_id != mentor_id && user_id != mentee_id {
        return Err(AppError::forbidden("Unauthorized"));
    }

    let now = Utc::now();
    let session = Session {
        id: Uuid::new_v4(),
        mentor_id,
        mentee_id,
        scheduled_at,
        duration: body.duration.unwrap_or(Session::DEFAULT_DURATION),
        status: SessionStatus::Scheduled,
        topic,
        notes: non_empty(body.notes),
        meeting_link: non_empty(body.meeting_link),
        rating: None,
        feedback: None,
        completed_at: None,
        created_at: now,
        updated_at: now,
    };
    validate_session(&session)?;

    let session = state.db.create_session(session).await?;
    info!(session_id = %session.id, mentor_id = %mentor_id, mentee_id = %mentee_id, "Session scheduled");

    Ok((
        StatusCode::CREATED,
        Json(SessionWithMessageResponse {
            session: session_view(&state, &session).await?,
            message: "Session created successfully".to_string(),
        }),
    ))
}

/// GET /api/sessions/{id} - A single session
#[utoipa::path(
    get,
    path = "/api/sessions/{id}",
    params(("id" = Uuid, Path, description = "The session's id")),
    responses(
        (status = 200, description = "The session", body = SessionResponse),
        (status = 401, description = "Not signed in", body = ErrorBody),
        (status = 403, description = "Caller is not a participant", body = ErrorBody),
        (status = 404, description = "Session not found", body = ErrorBody)
    )
)]
pub async fn get_session_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    JsonPath(id): JsonPath<Uuid>,
) -> AppResult<Json<SessionResponse>> {
    let session = load_own_session(&state, id, user_id).await?;
    Ok(Json(SessionResponse {
        session: session_view(&state, &session).await?,
    }))
}

/// PATCH /api/sessions/{id} - Edit, reschedule or complete a session
#[utoipa::path(
    patch,
    path = "/api/sessions/{id}",
    params(("id" = Uuid, Path, description = "The session's id")),
    request_body = UpdateSessionBody,
    responses(
        (status = 200, description = "Session updated", body = SessionWithMessageResponse),
        (status = 400, description = "Invalid change", body = ErrorBody),
        (status = 401, description = "Not signed in", body = ErrorBody),
        (status = 403, description = "Caller is not a participant", body = ErrorBody),
        (status = 404, description = "Session not found", body = ErrorBody)
    )
)]
pub async fn update_session_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    JsonPath(id): JsonPath<Uuid>,
    JsonBody(body): JsonBody<UpdateSessionBody>,
) -> AppResult<Json<SessionWithMessageResponse>> {
    let mut session = load_own_session(&state, id, user_id).await?;

    let completing = body.status.as_deref() == Some(SessionStatus::Completed.as_str());
    let rating = if completing {
        complete(&mut session, body)?
    } else {
        apply_edit(&mut session, body)?;
        None
    };
    validate_session(&session)?;
    session.updated_at = Utc::now();
    state.db.save_session(&session).await?;

    if let Some(rating) = rating {
        if let Some(mut mentor) = state.db.get_mentor_profile(session.mentor_id).await? {
            mentor.record_completed_session(rating);
            state.db.save_mentor_profile(&mentor).await?;
            info!(mentor_id = %mentor.user_id, rating = ?mentor.rating, "Mentor rating updated");
        }
    }
    info!(session_id = %id, status = session.status.as_str(), "Session updated");

    Ok(Json(SessionWithMessageResponse {
        session: session_view(&state, &session).await?,
        message: "Session updated successfully".to_string(),
    }))
}

/// DELETE /api/sessions/{id} - Cancel a session
#[utoipa::path(
    delete,
    path = "/api/sessions/{id}",
    params(("id" = Uuid, Path, description = "The session's id")),
    responses(
        (status = 200, description = "Session cancelled", body = MessageResponse),
        (status = 401, description = "Not signed in", body = ErrorBody),
        (status = 403, description = "Caller is not a participant", body = ErrorBody),
        (status = 404, description = "Session not found", body = ErrorBody)
    )
)]
pub async fn cancel_session_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    JsonPath(id): JsonPath<Uuid>,
) -> AppResult<Json<MessageResponse>> {
    let mut session = load_own_session(&state, id, user_id).await?;
    session.status = SessionStatus::Cancelled;
    session.updated_at = Utc::now();
    state.db.save_session(&session).await?;
    info!(session_id = %id, "Session cancelled");

    Ok(Json(MessageResponse {
        message: "Session cancelled successfully".to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scheduled() -> Session {
        let now = Utc::now();
        Session {
            id: Uuid::new_v4(),
            mentor_id: Uuid::new_v4(),
            mentee_id: Uuid::new_v4(),
            scheduled_at: now,
            duration: Session::DEFAULT_DURATION,
            status: SessionStatus::Scheduled,
            topic: "Career planning".into(),
            notes: None,
            meeting_link: None,
            rating: None,
            feedback: None,
            completed_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn body() -> UpdateSessionBody {
        UpdateSessionBody {
            status: None,
            scheduled_at: None,
            duration: None,
            topic: None,
            notes: None,
            meeting_link: None,
            rating: None,
            feedback: None,
        }
    }

    #[test]
    fn completing_records_rating_and_feedback() {
        let mut session = scheduled();
        let rating = complete(
            &mut session,
            UpdateSessionBody {
                status: Some("completed".into()),
                rating: Some(4),
                feedback: Some("Very helpful".into()),
                ..body()
            },
        )
        .unwrap();

        assert_eq!(rating, Some(4));
        assert_eq!(session.status, SessionStatus::Completed);
        assert!(session.completed_at.is_some());
        assert_eq!(session.feedback.as_deref(), Some("Very helpful"));
    }

    #[test]
    fn completing_rejects_out_of_range_rating() {
        let mut session = scheduled();
        let err = complete(
            &mut session,
            UpdateSessionBody {
                rating: Some(6),
                ..body()
            },
        )
        .unwrap_err();
        assert_eq!(err.message, "Rating must be between 1 and 5");
        assert_eq!(session.status, SessionStatus::Scheduled);
    }

    #[test]
    fn edits_cannot_complete_a_session() {
        let mut session = scheduled();
        assert!(apply_edit(
            &mut session,
            UpdateSessionBody {
                status: Some("no-show".into()),
                duration: Some(60),
                ..body()
            },
        )
        .is_ok());
        assert_eq!(session.status, SessionStatus::NoShow);
        assert_eq!(session.duration, 60);

        let err = apply_edit(
            &mut session,
            UpdateSessionBody {
                status: Some("completed".into()),
                ..body()
            },
        )
        .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }
}
