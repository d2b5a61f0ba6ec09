//! services/api/src/web/requests.rs
//!
//! Mentorship requests: a mentee asks a mentor to connect, the mentor answers.

use afrilead_core::domain::{MentorshipRequest, RequestDirection, RequestQuery, RequestStatus};
use afrilead_core::validation::validate_request_message;
use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use chrono::Utc;
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
use crate::web::views::{load_summaries, RequestView};

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListRequestsParams {
    /// `sent` for requests the caller made, `received` for requests addressed to them.
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub status: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct ListRequestsResponse {
    pub requests: Vec<RequestView>,
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateRequestBody {
    pub mentor_id: Option<Uuid>,
    pub message: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct UpdateRequestBody {
    /// One of `accepted`, `rejected`, `cancelled`.
    #[serde(default)]
    pub status: String,
}

#[derive(Serialize, ToSchema)]
pub struct RequestResponse {
    pub request: RequestView,
    pub message: String,
}

//=========================================================================================
// Helpers
//=========================================================================================

/// Loads a request the caller is a party to.
async fn load_own_request(
    state: &AppState,
    request_id: Uuid,
    user_id: Uuid,
) -> AppResult<MentorshipRequest> {
    let request = state.db.get_request(request_id).await?;
    if !request.involves(user_id) {
        return Err(AppError::forbidden("Unauthorized"));
    }
    Ok(request)
}

async fn request_view(state: &AppState, request: &MentorshipRequest) -> AppResult<RequestView> {
    let users = load_summaries(
        state.db.as_ref(),
        [request.mentor_id, request.mentee_id],
    )
    .await?;
    Ok(RequestView::new(request, &users))
}

/// Checks that `user_id` may move `request` into `status`.
fn authorize_transition(
    request: &MentorshipRequest,
    user_id: Uuid,
    status: RequestStatus,
) -> AppResult<()> {
    match status {
        RequestStatus::Accepted | RequestStatus::Rejected if request.mentor_id != user_id => Err(
            AppError::forbidden("Only mentor can accept or reject requests"),
        ),
        RequestStatus::Cancelled if request.mentee_id != user_id => {
            Err(AppError::forbidden("Only mentee can cancel requests"))
        }
        RequestStatus::Pending => Err(AppError::bad_request("Invalid status")),
        _ => Ok(()),
    }
}

//=========================================================================================
// Handlers
//=========================================================================================

/// GET /api/mentorship-requests - Requests the caller sent or received
#[utoipa::path(
    get,
    path = "/api/mentorship-requests",
    params(ListRequestsParams),
    responses(
        (status = 200, description = "Matching requests, newest first", body = ListRequestsResponse),
        (status = 400, description = "Unknown status", body = ErrorBody),
        (status = 401, description = "Not signed in", body = ErrorBody)
    )
)]
pub async fn list_requests_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    JsonQuery(params): JsonQuery<ListRequestsParams>,
) -> AppResult<Json<ListRequestsResponse>> {
    let direction = match params.kind.as_deref() {
        Some("sent") => RequestDirection::Sent,
        Some("received") => RequestDirection::Received,
        _ => RequestDirection::Any,
    };
    let status = non_empty(params.status)
        .map(|s| s.parse::<RequestStatus>())
        .transpose()?;

    let requests = state
        .db
        .list_requests(&RequestQuery {
            user_id,
            direction,
            status,
        })
        .await?;
    let users = load_summaries(
        state.db.as_ref(),
        requests.iter().flat_map(|r| [r.mentor_id, r.mentee_id]),
    )
    .await?;

    Ok(Json(ListRequestsResponse {
        requests: requests
            .iter()
            .map(|r| RequestView::new(r, &users))
            .collect(),
    }))
}

/// POST /api/mentorship-requests - Ask a mentor to connect
#[utoipa::path(
    post,
    path = "/api/mentorship-requests",
    request_body = CreateRequestBody,
    responses(
        (status = 201, description = "Request sent", body = RequestResponse),
        (status = 400, description = "Invalid request", body = ErrorBody),
        (status = 401, description = "Not signed in", body = ErrorBody),
        (status = 404, description = "Mentor not found", body = ErrorBody),
        (status = 409, description = "Request already exists", body = ErrorBody)
    )
)]
pub async fn create_request_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    JsonBody(body): JsonBody<CreateRequestBody>,
) -> AppResult<impl IntoResponse> {
    let mentor_id = body
        .mentor_id
        .ok_or_else(|| AppError::bad_request("Mentor ID is required"))?;
    if mentor_id == user_id {
        return Err(AppError::bad_request(
            "You cannot send a mentorship request to yourself",
        ));
    }
    let message = non_empty(body.message);
    validate_request_message(message.as_deref())?;

    if state.db.get_users(&[mentor_id]).await?.is_empty() {
        return Err(AppError::not_found("Mentor not found"));
    }

    let now = Utc::now();
    let request = state
        .db
        .create_request(MentorshipRequest {
            id: Uuid::new_v4(),
            mentor_id,
            mentee_id: user_id,
            status: RequestStatus::Pending,
            message,
            request_date: now,
            response_date: None,
            created_at: now,
            updated_at: now,
        })
        .await?;
    info!(request_id = %request.id, mentor_id = %mentor_id, mentee_id = %user_id, "Mentorship request sent");

    Ok((
        StatusCode::CREATED,
        Json(RequestResponse {
            request: request_view(&state, &request).await?,
            message: "Request sent successfully".to_string(),
        }),
    ))
}

/// PATCH /api/mentorship-requests/{id} - Accept, reject or cancel a request
#[utoipa::path(
    patch,
    path = "/api/mentorship-requests/{id}",
    params(("id" = Uuid, Path, description = "The request's id")),
    request_body = UpdateRequestBody,
    responses(
        (status = 200, description = "Request updated", body = RequestResponse),
        (status = 400, description = "Invalid status", body = ErrorBody),
        (status = 401, description = "Not signed in", body = ErrorBody),
        (status = 403, description = "Caller may not make this change", body = ErrorBody),
        (status = 404, description = "Request not found", body = ErrorBody)
    )
)]
pub async fn update_request_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    JsonPath(id): JsonPath<Uuid>,
    JsonBody(body): JsonBody<UpdateRequestBody>,
) -> AppResult<Json<RequestResponse>> {
    let status: RequestStatus = body.status.parse()?;
    if status == RequestStatus::Pending {
        return Err(AppError::bad_request("Invalid status"));
    }

    let request = load_own_request(&state, id, user_id).await?;
    authorize_transition(&request, user_id, status)?;

    let updated = state
        .db
        .update_request_status(id, status, Utc::now())
        .await?;
    info!(request_id = %id, status = %status, "Mentorship request updated");

    Ok(Json(RequestResponse {
        request: request_view(&state, &updated).await?,
        message: format!("Request {} successfully", status),
    }))
}

/// DELETE /api/mentorship-requests/{id} - Remove a request
#[utoipa::path(
    delete,
    path = "/api/mentorship-requests/{id}",
    params(("id" = Uuid, Path, description = "The request's id")),
    responses(
        (status = 200, description = "Request deleted", body = MessageResponse),
        (status = 401, description = "Not signed in", body = ErrorBody),
        (status = 403, description = "Not a party to the request", body = ErrorBody),
        (status = 404, description = "Request not found", body = ErrorBody)
    )
)]
pub async fn delete_request_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    JsonPath(id): JsonPath<Uuid>,
) -> AppResult<Json<MessageResponse>> {
    load_own_request(&state, id, user_id).await?;
    state.db.delete_request(id).await?;
    info!(request_id = %id, "Mentorship request deleted");

    Ok(Json(MessageResponse {
        message: "Request deleted successfully".to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pending(mentor_id: Uuid, mentee_id: Uuid) -> MentorshipRequest {
        let now = Utc::now();
        MentorshipRequest {
            id: Uuid::new_v4(),
            mentor_id,
            mentee_id,
            status: RequestStatus::Pending,
            message: None,
            request_date: now,
            response_date: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn only_mentor_answers_and_only_mentee_cancels() {
        let (mentor, mentee) = (Uuid::new_v4(), Uuid::new_v4());
        let request = pending(mentor, mentee);

        assert!(authorize_transition(&request, mentor, RequestStatus::Accepted).is_ok());
        assert!(authorize_transition(&request, mentor, RequestStatus::Rejected).is_ok());
        assert!(authorize_transition(&request, mentee, RequestStatus::Cancelled).is_ok());

        let err = authorize_transition(&request, mentee, RequestStatus::Accepted).unwrap_err();
        assert_eq!(err.status, StatusCode::FORBIDDEN);
        assert_eq!(err.message, "Only mentor can accept or reject requests");

        let err = authorize_transition(&request, mentor, RequestStatus::Cancelled).unwrap_err();
        assert_eq!(err.message, "Only mentee can cancel requests");
    }
}
