//! services/api/src/web/users.rs
//!
//! Endpoints for reading and editing user accounts and their role-specific profiles.

use afrilead_core::domain::{Availability, Role, UserUpdate};
use afrilead_core::validation::{
    validate_country, validate_mentee_profile, validate_mentor_profile, validate_name,
};
use axum::{
    extract::State,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::{AppError, AppResult, ErrorBody};
use crate::web::auth::MessageResponse;
use crate::web::extract::{JsonBody, JsonPath};
use crate::web::non_empty;
use crate::web::state::AppState;
use crate::web::views::{AvailabilityBody, MenteeProfileView, MentorProfileView, UserView};

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OwnProfileResponse {
    pub user: UserView,
    pub mentor_profile: Option<MentorProfileView>,
    pub mentee_profile: Option<MenteeProfileView>,
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOwnProfileRequest {
    pub name: Option<String>,
    pub country: Option<String>,
    pub photo_url: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct UpdateOwnProfileResponse {
    pub user: UserView,
    pub message: String,
}

/// The role-specific slice of a profile shown to other users.
#[derive(Serialize, ToSchema)]
#[serde(untagged)]
pub enum PublicProfile {
    #[serde(rename_all = "camelCase")]
    Mentor {
        bio: String,
        skills: Vec<String>,
        experience: String,
        availability: AvailabilityBody,
        sessions_completed: u32,
        rating: Option<f64>,
    },
    Mentee {
        bio: Option<String>,
        interests: Vec<String>,
        goals: Vec<String>,
    },
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PublicUserResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: String,
    pub country: String,
    pub photo_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub profile: Option<PublicProfile>,
}

#[derive(Deserialize, ToSchema)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub country: Option<String>,
    pub bio: Option<String>,
    pub experience: Option<String>,
    pub availability: Option<AvailabilityBody>,
    pub skills: Option<Vec<String>>,
    pub interests: Option<Vec<String>>,
    pub goals: Option<Vec<String>>,
}

//=========================================================================================
// Helpers
//=========================================================================================

/// Builds a validated `UserUpdate`; blank values are treated as absent.
fn user_update(
    name: Option<String>,
    country: Option<String>,
    photo_url: Option<String>,
) -> AppResult<UserUpdate> {
    let update = UserUpdate {
        name: non_empty(name),
        country: non_empty(country),
        photo_url: non_empty(photo_url),
    };
    if let Some(name) = &update.name {
        validate_name(name)?;
    }
    if let Some(country) = &update.country {
        validate_country(country)?;
    }
    Ok(update)
}

//=========================================================================================
// Handlers
//=========================================================================================

/// GET /api/users/profile - The caller's account and profiles
#[utoipa::path(
    get,
    path = "/api/users/profile",
    responses(
        (status = 200, description = "The caller's profile", body = OwnProfileResponse),
        (status = 401, description = "Not signed in", body = ErrorBody),
        (status = 404, description = "User not found", body = ErrorBody)
    )
)]
pub async fn get_own_profile_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
) -> AppResult<Json<OwnProfileResponse>> {
    let user = state.db.get_user(user_id).await?;

    let mentor_profile = if user.role.is_mentor() {
        state.db.get_mentor_profile(user.id).await?
    } else {
        None
    };
    let mentee_profile = if user.role.is_mentee() {
        state.db.get_mentee_profile(user.id).await?
    } else {
        None
    };

    Ok(Json(OwnProfileResponse {
        user: UserView::from(&user),
        mentor_profile: mentor_profile.as_ref().map(MentorProfileView::from),
        mentee_profile: mentee_profile.as_ref().map(MenteeProfileView::from),
    }))
}

/// PATCH /api/users/profile - Update the caller's basic info
#[utoipa::path(
    patch,
    path = "/api/users/profile",
    request_body = UpdateOwnProfileRequest,
    responses(
        (status = 200, description = "Profile updated", body = UpdateOwnProfileResponse),
        (status = 400, description = "Invalid value", body = ErrorBody),
        (status = 401, description = "Not signed in", body = ErrorBody)
    )
)]
pub async fn update_own_profile_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    JsonBody(req): JsonBody<UpdateOwnProfileRequest>,
) -> AppResult<Json<UpdateOwnProfileResponse>> {
    let update = user_update(req.name, req.country, req.photo_url)?;
    let user = state.db.update_user(user_id, update).await?;

    Ok(Json(UpdateOwnProfileResponse {
        user: UserView::from(&user),
        message: "Profile updated successfully".to_string(),
    }))
}

/// GET /api/users/{id} - Public view of a user
#[utoipa::path(
    get,
    path = "/api/users/{id}",
    params(("id" = Uuid, Path, description = "The user's id")),
    responses(
        (status = 200, description = "The user", body = PublicUserResponse),
        (status = 401, description = "Not signed in", body = ErrorBody),
        (status = 404, description = "User not found", body = ErrorBody)
    )
)]
pub async fn get_user_handler(
    State(state): State<Arc<AppState>>,
    JsonPath(id): JsonPath<Uuid>,
) -> AppResult<Json<PublicUserResponse>> {
    let user = state.db.get_user(id).await?;

    let profile = match user.role {
        Role::Mentor | Role::Both => {
            state
                .db
                .get_mentor_profile(user.id)
                .await?
                .map(|p| PublicProfile::Mentor {
                    availability: AvailabilityBody::from(&p.availability),
                    bio: p.bio,
                    skills: p.skills,
                    experience: p.experience,
                    sessions_completed: p.sessions_completed,
                    rating: p.rating,
                })
        }
        Role::Mentee => state
            .db
            .get_mentee_profile(user.id)
            .await?
            .map(|p| PublicProfile::Mentee {
                bio: p.bio,
                interests: p.interests,
                goals: p.goals,
            }),
    };

    Ok(Json(PublicUserResponse {
        id: user.id,
        name: user.name,
        email: user.email,
        role: user.role.as_str().to_string(),
        country: user.country,
        photo_url: user.photo_url,
        created_at: user.created_at,
        profile,
    }))
}

/// PATCH /api/users/{id} - Update the caller's account and existing profiles
#[utoipa::path(
    patch,
    path = "/api/users/{id}",
    params(("id" = Uuid, Path, description = "Must be the caller's own id")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "Profile updated", body = MessageResponse),
        (status = 400, description = "Invalid value", body = ErrorBody),
        (status = 401, description = "Not signed in", body = ErrorBody),
        (status = 403, description = "Not the caller's account", body = ErrorBody),
        (status = 404, description = "User not found", body = ErrorBody)
    )
)]
pub async fn update_user_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    JsonPath(id): JsonPath<Uuid>,
    JsonBody(req): JsonBody<UpdateUserRequest>,
) -> AppResult<Json<MessageResponse>> {
    if id != user_id {
        return Err(AppError::forbidden("Forbidden"));
    }

    // Everything is validated before the first write.
    let update = user_update(req.name, req.country, None)?;
    let user = state.db.get_user(id).await?;

    let mentor_profile = if user.role.is_mentor() {
        state.db.get_mentor_profile(id).await?
    } else {
        None
    };
    let mentor_profile = mentor_profile.map(|mut profile| {
        if let Some(bio) = &req.bio {
            profile.bio = bio.clone();
        }
        if let Some(experience) = &req.experience {
            profile.experience = experience.clone();
        }
        if let Some(availability) = &req.availability {
            profile.availability = Availability::from(availability.clone());
        }
        if let Some(skills) = &req.skills {
            profile.skills = skills.clone();
        }
        profile
    });

    let mentee_profile = if user.role.is_mentee() {
        state.db.get_mentee_profile(id).await?
    } else {
        None
    };
    let mentee_profile = mentee_profile.map(|mut profile| {
        if let Some(bio) = &req.bio {
            profile.bio = non_empty(Some(bio.clone()));
        }
        if let Some(interests) = &req.interests {
            profile.interests = interests.clone();
        }
        if let Some(goals) = &req.goals {
            profile.goals = goals.clone();
        }
        profile
    });

    if let Some(profile) = &mentor_profile {
        validate_mentor_profile(profile)?;
    }
    if let Some(profile) = &mentee_profile {
        validate_mentee_profile(profile)?;
    }

    if !update.is_empty() {
        state.db.update_user(id, update).await?;
    }
    if let Some(profile) = &mentor_profile {
        state.db.save_mentor_profile(profile).await?;
    }
    if let Some(profile) = &mentee_profile {
        state.db.save_mentee_profile(profile).await?;
    }
    info!(user_id = %id, "User profile updated");

    Ok(Json(MessageResponse {
        message: "Profile updated successfully".to_string(),
    }))
}
