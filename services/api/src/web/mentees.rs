//! services/api/src/web/mentees.rs
//!
//! Mentee profile creation.

use afrilead_core::domain::{CareerStage, MenteeProfile};
use afrilead_core::validation::{validate_mentee_profile, ValidationError};
use axum::{extract::State, http::StatusCode, response::IntoResponse, Extension, Json};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::{AppError, AppResult, ErrorBody};
use crate::web::extract::JsonBody;
use crate::web::non_empty;
use crate::web::state::AppState;
use crate::web::views::MenteeProfileView;

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateMenteeProfileRequest {
    pub bio: Option<String>,
    #[serde(default)]
    pub interests: Vec<String>,
    #[serde(default)]
    pub goals: Vec<String>,
    /// One of `student`, `early-career`, `career-change`, `entrepreneur`.
    #[serde(default)]
    pub career_stage: String,
    pub education: Option<String>,
    pub current_role: Option<String>,
    pub linkedin_url: Option<String>,
    #[serde(default)]
    pub preferred_mentor_traits: Vec<String>,
}

impl CreateMenteeProfileRequest {
    fn into_profile(self, user_id: Uuid) -> Result<MenteeProfile, ValidationError> {
        let career_stage: CareerStage = self.career_stage.parse()?;
        let now = Utc::now();
        Ok(MenteeProfile {
            user_id,
            bio: non_empty(self.bio),
            interests: self.interests,
            goals: self.goals,
            career_stage,
            education: non_empty(self.education),
            current_role: non_empty(self.current_role),
            linkedin_url: non_empty(self.linkedin_url),
            preferred_mentor_traits: self.preferred_mentor_traits,
            is_active: true,
            created_at: now,
            updated_at: now,
        })
    }
}

#[derive(Serialize, ToSchema)]
pub struct CreateMenteeProfileResponse {
    pub mentee: MenteeProfileView,
    pub message: String,
}

/// POST /api/mentees - Create the caller's mentee profile
#[utoipa::path(
    post,
    path = "/api/mentees",
    request_body = CreateMenteeProfileRequest,
    responses(
        (status = 201, description = "Mentee profile created", body = CreateMenteeProfileResponse),
        (status = 400, description = "Invalid profile", body = ErrorBody),
        (status = 401, description = "Not signed in", body = ErrorBody),
        (status = 409, description = "Profile already exists", body = ErrorBody)
    )
)]
pub async fn create_mentee_profile_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    JsonBody(req): JsonBody<CreateMenteeProfileRequest>,
) -> AppResult<impl IntoResponse> {
    if state.db.get_mentee_profile(user_id).await?.is_some() {
        return Err(AppError::conflict("Mentee profile already exists"));
    }

    let profile = req.into_profile(user_id)?;
    validate_mentee_profile(&profile)?;

    let user = state.db.get_user(user_id).await?;
    let mentee = state.db.create_mentee_profile(profile).await?;
    state
        .db
        .set_user_role(user_id, user.role.with_mentee())
        .await?;
    info!(user_id = %user_id, "Mentee profile created");

    Ok((
        StatusCode::CREATED,
        Json(CreateMenteeProfileResponse {
            mentee: MenteeProfileView::from(&mentee),
            message: "Mentee profile created successfully".to_string(),
        }),
    ))
}
