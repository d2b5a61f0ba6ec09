//! services/api/src/web/views.rs
//!
//! JSON shapes sent to (and, for a few nested objects, received from) the browser.
//! Domain structs never leave the service directly; they are converted here.

use afrilead_core::domain::{
    Availability, MenteeProfile, MentorProfile, MentorshipRequest, Message, Session, User,
};
use afrilead_core::ports::{DatabaseService, PortResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use utoipa::ToSchema;
use uuid::Uuid;

//=========================================================================================
// Users
//=========================================================================================

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: String,
    pub country: String,
    pub photo_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&User> for UserView {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role.as_str().to_string(),
            country: user.country.clone(),
            photo_url: user.photo_url.clone(),
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// The public fields of a user, embedded wherever another entity references one.
#[derive(Serialize, Clone, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub country: String,
    pub photo_url: Option<String>,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            country: user.country.clone(),
            photo_url: user.photo_url.clone(),
        }
    }
}

/// Loads the summaries of every existing user among `ids`.
pub async fn load_summaries(
    db: &dyn DatabaseService,
    ids: impl IntoIterator<Item = Uuid>,
) -> PortResult<HashMap<Uuid, UserSummary>> {
    let mut ids: Vec<Uuid> = ids.into_iter().collect();
    ids.sort_unstable();
    ids.dedup();
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    let users = db.get_users(&ids).await?;
    Ok(users.iter().map(|u| (u.id, UserSummary::from(u))).collect())
}

//=========================================================================================
// Profiles
//=========================================================================================

#[derive(Serialize, Deserialize, Clone, ToSchema)]
pub struct AvailabilityBody {
    pub hours: u32,
    pub timezone: String,
}

impl From<&Availability> for AvailabilityBody {
    fn from(a: &Availability) -> Self {
        Self {
            hours: a.hours,
            timezone: a.timezone.clone(),
        }
    }
}

impl From<AvailabilityBody> for Availability {
    fn from(a: AvailabilityBody) -> Self {
        Self {
            hours: a.hours,
            timezone: a.timezone,
        }
    }
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MentorProfileView {
    pub user_id: Uuid,
    pub bio: String,
    pub title: String,
    pub company: Option<String>,
    pub experience: String,
    pub skills: Vec<String>,
    pub expertise: Vec<String>,
    pub years_of_experience: u32,
    pub industry: String,
    pub linkedin_url: Option<String>,
    pub availability: AvailabilityBody,
    pub rating: Option<f64>,
    pub total_sessions: u32,
    pub sessions_completed: u32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&MentorProfile> for MentorProfileView {
    fn from(p: &MentorProfile) -> Self {
        Self {
            user_id: p.user_id,
            bio: p.bio.clone(),
            title: p.title.clone(),
            company: p.company.clone(),
            experience: p.experience.clone(),
            skills: p.skills.clone(),
            expertise: p.expertise.clone(),
            years_of_experience: p.years_of_experience,
            industry: p.industry.clone(),
            linkedin_url: p.linkedin_url.clone(),
            availability: AvailabilityBody::from(&p.availability),
            rating: p.rating,
            total_sessions: p.total_sessions,
            sessions_completed: p.sessions_completed,
            is_active: p.is_active,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MenteeProfileView {
    pub user_id: Uuid,
    pub bio: Option<String>,
    pub interests: Vec<String>,
    pub goals: Vec<String>,
    pub career_stage: String,
    pub education: Option<String>,
    pub current_role: Option<String>,
    pub linkedin_url: Option<String>,
    pub preferred_mentor_traits: Vec<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&MenteeProfile> for MenteeProfileView {
    fn from(p: &MenteeProfile) -> Self {
        Self {
            user_id: p.user_id,
            bio: p.bio.clone(),
            interests: p.interests.clone(),
            goals: p.goals.clone(),
            career_stage: p.career_stage.as_str().to_string(),
            education: p.education.clone(),
            current_role: p.current_role.clone(),
            linkedin_url: p.linkedin_url.clone(),
            preferred_mentor_traits: p.preferred_mentor_traits.clone(),
            is_active: p.is_active,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

//=========================================================================================
// Requests, Sessions, Messages
//=========================================================================================

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RequestView {
    pub id: Uuid,
    pub mentor_id: Uuid,
    pub mentee_id: Uuid,
    pub mentor: Option<UserSummary>,
    pub mentee: Option<UserSummary>,
    pub status: String,
    pub message: Option<String>,
    pub request_date: DateTime<Utc>,
    pub response_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RequestView {
    pub fn new(r: &MentorshipRequest, users: &HashMap<Uuid, UserSummary>) -> Self {
        Self {
            id: r.id,
            mentor_id: r.mentor_id,
            mentee_id: r.mentee_id,
            mentor: users.get(&r.mentor_id).cloned(),
            mentee: users.get(&r.mentee_id).cloned(),
            status: r.status.as_str().to_string(),
            message: r.message.clone(),
            request_date: r.request_date,
            response_date: r.response_date,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub id: Uuid,
    pub mentor_id: Uuid,
    pub mentee_id: Uuid,
    pub mentor: Option<UserSummary>,
    pub mentee: Option<UserSummary>,
    pub scheduled_at: DateTime<Utc>,
    pub duration: u32,
    pub status: String,
    pub topic: String,
    pub notes: Option<String>,
    pub meeting_link: Option<String>,
    pub rating: Option<u8>,
    pub feedback: Option<String>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SessionView {
    pub fn new(s: &Session, users: &HashMap<Uuid, UserSummary>) -> Self {
        Self {
            id: s.id,
            mentor_id: s.mentor_id,
            mentee_id: s.mentee_id,
            mentor: users.get(&s.mentor_id).cloned(),
            mentee: users.get(&s.mentee_id).cloned(),
            scheduled_at: s.scheduled_at,
            duration: s.duration,
            status: s.status.as_str().to_string(),
            topic: s.topic.clone(),
            notes: s.notes.clone(),
            meeting_link: s.meeting_link.clone(),
            rating: s.rating,
            feedback: s.feedback.clone(),
            completed_at: s.completed_at,
            created_at: s.created_at,
            updated_at: s.updated_at,
        }
    }
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MessageView {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub receiver_id: Uuid,
    pub content: String,
    pub read: bool,
    pub read_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<&Message> for MessageView {
    fn from(m: &Message) -> Self {
        Self {
            id: m.id,
            sender_id: m.sender_id,
            receiver_id: m.receiver_id,
            content: m.content.clone(),
            read: m.read,
            read_at: m.read_at,
            created_at: m.created_at,
        }
    }
}
