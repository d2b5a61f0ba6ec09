//! services/api/src/web/mentors.rs
//!
//! Mentor discovery and mentor profile creation.

use afrilead_core::domain::{Availability, MentorFilter, MentorProfile};
use afrilead_core::validation::{validate_mentor_profile, ValidationError};
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
use crate::web::extract::{JsonBody, JsonQuery};
use crate::web::non_empty;
use crate::web::state::AppState;
use crate::web::views::{load_summaries, AvailabilityBody, MentorProfileView, UserSummary};

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ListMentorsParams {
    /// Comma-separated list; a mentor matches when they have any of these skills.
    pub skills: Option<String>,
    pub industry: Option<String>,
    pub min_rating: Option<f64>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl ListMentorsParams {
    fn into_filter(self) -> MentorFilter {
        let defaults = MentorFilter::default();
        MentorFilter {
            skills: self
                .skills
                .map(|s| {
                    s.split(',')
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .map(String::from)
                        .collect()
                })
                .unwrap_or_default(),
            industry: non_empty(self.industry),
            min_rating: self.min_rating,
            page: self.page.unwrap_or(defaults.page).max(1),
            limit: self
                .limit
                .unwrap_or(defaults.limit)
                .clamp(1, MentorFilter::MAX_LIMIT),
        }
    }
}

/// A mentor profile together with its owner's public details.
#[derive(Serialize, ToSchema)]
pub struct MentorListing {
    #[serde(flatten)]
    pub profile: MentorProfileView,
    pub user: Option<UserSummary>,
}

#[derive(Serialize, ToSchema)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub pages: u64,
}

impl Pagination {
    fn new(page: u32, limit: u32, total: u64) -> Self {
        Self {
            page,
            limit,
            total,
            pages: total.div_ceil(limit.max(1) as u64),
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct ListMentorsResponse {
    pub mentors: Vec<MentorListing>,
    pub pagination: Pagination,
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateMentorProfileRequest {
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub title: String,
    pub company: Option<String>,
    #[serde(default)]
    pub experience: String,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub expertise: Vec<String>,
    pub years_of_experience: Option<i64>,
    #[serde(default)]
    pub industry: String,
    pub linkedin_url: Option<String>,
    pub availability: Option<AvailabilityBody>,
}

impl CreateMentorProfileRequest {
    fn into_profile(self, user_id: Uuid) -> Result<MentorProfile, ValidationError> {
        let years = self
            .years_of_experience
            .ok_or_else(|| ValidationError::new("Please provide years of experience"))?;
        if years < 0 {
            return Err(ValidationError::new("Years of experience cannot be negative"));
        }
        let now = Utc::now();
        Ok(MentorProfile {
            user_id,
            bio: self.bio,
            title: self.title,
            company: non_empty(self.company),
            experience: self.experience,
            skills: self.skills,
            expertise: self.expertise,
            years_of_experience: u32::try_from(years).unwrap_or(u32::MAX),
            industry: self.industry,
            linkedin_url: non_empty(self.linkedin_url),
            availability: self
                .availability
                .map(Availability::from)
                .unwrap_or_default(),
            rating: None,
            total_sessions: 0,
            sessions_completed: 0,
            is_active: true,
            created_at: now,
            updated_at: now,
        })
    }
}

#[derive(Serialize, ToSchema)]
pub struct CreateMentorProfileResponse {
    pub mentor: MentorProfileView,
    pub message: String,
}

//=========================================================================================
// Handlers
//=========================================================================================

/// GET /api/mentors - List active mentors
#[utoipa::path(
    get,
    path = "/api/mentors",
    params(ListMentorsParams),
    responses(
        (status = 200, description = "A page of mentors", body = ListMentorsResponse),
        (status = 500, description = "Internal server error", body = ErrorBody)
    )
)]
pub async fn list_mentors_handler(
    State(state): State<Arc<AppState>>,
    JsonQuery(params): JsonQuery<ListMentorsParams>,
) -> AppResult<Json<ListMentorsResponse>> {
    let filter = params.into_filter();
    let (profiles, total) = state.db.list_mentors(&filter).await?;
    let users = load_summaries(state.db.as_ref(), profiles.iter().map(|p| p.user_id)).await?;

    let mentors = profiles
        .iter()
        .map(|p| MentorListing {
            profile: MentorProfileView::from(p),
            user: users.get(&p.user_id).cloned(),
        })
        .collect();

    Ok(Json(ListMentorsResponse {
        mentors,
        pagination: Pagination::new(filter.page, filter.limit, total),
    }))
}

/// POST /api/mentors - Create the caller's mentor profile
#[utoipa::path(
    post,
    path = "/api/mentors",
    request_body = CreateMentorProfileRequest,
    responses(
        (status = 201, description = "Mentor profile created", body = CreateMentorProfileResponse),
        (status = 400, description = "Invalid profile", body = ErrorBody),
        (status = 401, description = "Not signed in", body = ErrorBody),
        (status = 409, description = "Profile already exists", body = ErrorBody)
    )
)]
pub async fn create_mentor_profile_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    JsonBody(req): JsonBody<CreateMentorProfileRequest>,
) -> AppResult<impl IntoResponse> {
    if state.db.get_mentor_profile(user_id).await?.is_some() {
        return Err(AppError::conflict("Mentor profile already exists"));
    }

    let profile = req.into_profile(user_id)?;
    validate_mentor_profile(&profile)?;

    let user = state.db.get_user(user_id).await?;
    let mentor = state.db.create_mentor_profile(profile).await?;
    state
        .db
        .set_user_role(user_id, user.role.with_mentor())
        .await?;
    info!(user_id = %user_id, "Mentor profile created");

    Ok((
        StatusCode::CREATED,
        Json(CreateMentorProfileResponse {
            mentor: MentorProfileView::from(&mentor),
            message: "Mentor profile created successfully".to_string(),
        }),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn params_default_and_clamp() {
        let filter = ListMentorsParams {
            skills: Some("Tech, Design,,".into()),
            industry: Some(String::new()),
            min_rating: None,
            page: Some(0),
            limit: Some(1000),
        }
        .into_filter();
        assert_eq!(filter.skills, vec!["Tech".to_string(), "Design".to_string()]);
        assert_eq!(filter.industry, None);
        assert_eq!(filter.page, 1);
        assert_eq!(filter.limit, MentorFilter::MAX_LIMIT);
    }

    #[test]
    fn pagination_rounds_pages_up() {
        assert_eq!(Pagination::new(1, 10, 21).pages, 3);
        assert_eq!(Pagination::new(1, 10, 0).pages, 0);
    }
}
