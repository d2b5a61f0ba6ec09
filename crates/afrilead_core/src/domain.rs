//! crates/afrilead_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any database or serialization format.

use chrono::{DateTime, Utc};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::validation::ValidationError;

//=========================================================================================
// Enumerations
//=========================================================================================

/// The role a user plays on the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Mentor,
    Mentee,
    Both,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Mentor => "mentor",
            Role::Mentee => "mentee",
            Role::Both => "both",
        }
    }

    pub fn is_mentor(&self) -> bool {
        matches!(self, Role::Mentor | Role::Both)
    }

    pub fn is_mentee(&self) -> bool {
        matches!(self, Role::Mentee | Role::Both)
    }

    /// The role a user ends up with after creating a mentor profile.
    pub fn with_mentor(self) -> Role {
        match self {
            Role::Mentee | Role::Both => Role::Both,
            Role::Mentor => Role::Mentor,
        }
    }

    /// The role a user ends up with after creating a mentee profile.
    pub fn with_mentee(self) -> Role {
        match self {
            Role::Mentor | Role::Both => Role::Both,
            Role::Mentee => Role::Mentee,
        }
    }
}

impl FromStr for Role {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mentor" => Ok(Role::Mentor),
            "mentee" => Ok(Role::Mentee),
            "both" => Ok(Role::Both),
            _ => Err(ValidationError::new("Invalid role")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CareerStage {
    Student,
    EarlyCareer,
    CareerChange,
    Entrepreneur,
}

impl CareerStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            CareerStage::Student => "student",
            CareerStage::EarlyCareer => "early-career",
            CareerStage::CareerChange => "career-change",
            CareerStage::Entrepreneur => "entrepreneur",
        }
    }
}

impl FromStr for CareerStage {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "student" => Ok(CareerStage::Student),
            "early-career" => Ok(CareerStage::EarlyCareer),
            "career-change" => Ok(CareerStage::CareerChange),
            "entrepreneur" => Ok(CareerStage::Entrepreneur),
            _ => Err(ValidationError::new("Please select your career stage")),
        }
    }
}

/// Lifecycle of a mentorship request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestStatus {
    Pending,
    Accepted,
    Rejected,
    Cancelled,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Accepted => "accepted",
            RequestStatus::Rejected => "rejected",
            RequestStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RequestStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(RequestStatus::Pending),
            "accepted" => Ok(RequestStatus::Accepted),
            "rejected" => Ok(RequestStatus::Rejected),
            "cancelled" => Ok(RequestStatus::Cancelled),
            _ => Err(ValidationError::new("Invalid status")),
        }
    }
}

/// Lifecycle of a scheduled mentorship session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Scheduled,
    Completed,
    Cancelled,
    NoShow,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Scheduled => "scheduled",
            SessionStatus::Completed => "completed",
            SessionStatus::Cancelled => "cancelled",
            SessionStatus::NoShow => "no-show",
        }
    }
}

impl FromStr for SessionStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "scheduled" => Ok(SessionStatus::Scheduled),
            "completed" => Ok(SessionStatus::Completed),
            "cancelled" => Ok(SessionStatus::Cancelled),
            "no-show" => Ok(SessionStatus::NoShow),
            _ => Err(ValidationError::new("Invalid session status")),
        }
    }
}

//=========================================================================================
// Users and Auth
//=========================================================================================

// Represents a user - used throughout app
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub country: String,
    pub photo_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Only used internally for login/signup - contains sensitive data
#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub user: User,
    pub hashed_password: String,
}

/// The fields needed to register a user. `email` must already be normalized.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub hashed_password: String,
    pub role: Role,
    pub country: String,
}

/// A partial update of a user's basic info. `None` leaves the field untouched.
#[derive(Debug, Clone, Default)]
pub struct UserUpdate {
    pub name: Option<String>,
    pub country: Option<String>,
    pub photo_url: Option<String>,
}

impl UserUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.country.is_none() && self.photo_url.is_none()
    }

    pub fn apply(&self, user: &mut User) {
        if let Some(name) = &self.name {
            user.name = name.clone();
        }
        if let Some(country) = &self.country {
            user.country = country.clone();
        }
        if let Some(photo_url) = &self.photo_url {
            user.photo_url = Some(photo_url.clone());
        }
    }
}

// Represents a browser login session (auth cookie)
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub id: String,
    pub user_id: Uuid,
    pub expires_at: DateTime<Utc>,
}

//=========================================================================================
// Profiles
//=========================================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct Availability {
    /// Hours per month.
    pub hours: u32,
    pub timezone: String,
}

impl Default for Availability {
    fn default() -> Self {
        Self {
            hours: 2,
            timezone: "UTC".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct MentorProfile {
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
    pub availability: Availability,
    pub rating: Option<f64>,
    pub total_sessions: u32,
    pub sessions_completed: u32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MentorProfile {
    /// Folds one more rated session into the running average.
    ///
    /// An unrated mentor counts as 0.0 over `sessions_completed` sessions.
    pub fn record_completed_session(&mut self, session_rating: u8) {
        let completed = self.sessions_completed as f64;
        let current = self.rating.unwrap_or(0.0);
        let total = self.sessions_completed + 1;
        self.rating = Some((current * completed + session_rating as f64) / total as f64);
        self.sessions_completed = total;
    }
}

#[derive(Debug, Clone)]
pub struct MenteeProfile {
    pub user_id: Uuid,
    pub bio: Option<String>,
    pub interests: Vec<String>,
    pub goals: Vec<String>,
    pub career_stage: CareerStage,
    pub education: Option<String>,
    pub current_role: Option<String>,
    pub linkedin_url: Option<String>,
    pub preferred_mentor_traits: Vec<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

//=========================================================================================
// Connections, Sessions and Messages
//=========================================================================================

/// A mentee's proposal to connect with a mentor.
#[derive(Debug, Clone)]
pub struct MentorshipRequest {
    pub id: Uuid,
    pub mentor_id: Uuid,
    pub mentee_id: Uuid,
    pub status: RequestStatus,
    pub message: Option<String>,
    pub request_date: DateTime<Utc>,
    pub response_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MentorshipRequest {
    pub fn involves(&self, user_id: Uuid) -> bool {
        self.mentor_id == user_id || self.mentee_id == user_id
    }
}

/// A scheduled meeting between a mentor and a mentee.
#[derive(Debug, Clone)]
pub struct Session {
    pub id: Uuid,
    pub mentor_id: Uuid,
    pub mentee_id: Uuid,
    pub scheduled_at: DateTime<Utc>,
    /// Minutes.
    pub duration: u32,
    pub status: SessionStatus,
    pub topic: String,
    pub notes: Option<String>,
    pub meeting_link: Option<String>,
    pub rating: Option<u8>,
    pub feedback: Option<String>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Session {
    pub const DEFAULT_DURATION: u32 = 30;

    pub fn involves(&self, user_id: Uuid) -> bool {
        self.mentor_id == user_id || self.mentee_id == user_id
    }
}

#[derive(Debug, Clone)]
pub struct Message {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub receiver_id: Uuid,
    pub content: String,
    pub read: bool,
    pub read_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One entry of a user's inbox: the latest message exchanged with another user.
#[derive(Debug, Clone)]
pub struct Conversation {
    pub other_user_id: Uuid,
    pub last_message: Message,
    pub unread_count: u64,
}

//=========================================================================================
// Query Parameters
//=========================================================================================

#[derive(Debug, Clone)]
pub struct MentorFilter {
    /// Matches mentors having any of these skills. Empty means no constraint.
    pub skills: Vec<String>,
    pub industry: Option<String>,
    pub min_rating: Option<f64>,
    pub page: u32,
    pub limit: u32,
}

impl MentorFilter {
    pub const MAX_LIMIT: u32 = 100;

    pub fn offset(&self) -> u64 {
        (self.page.saturating_sub(1) as u64) * self.limit as u64
    }

    pub fn matches(&self, profile: &MentorProfile) -> bool {
        if !profile.is_active {
            return false;
        }
        if !self.skills.is_empty() && !profile.skills.iter().any(|s| self.skills.contains(s)) {
            return false;
        }
        if let Some(industry) = &self.industry {
            if &profile.industry != industry {
                return false;
            }
        }
        if let Some(min) = self.min_rating {
            match profile.rating {
                Some(rating) if rating >= min => {}
                _ => return false,
            }
        }
        true
    }
}

impl Default for MentorFilter {
    fn default() -> Self {
        Self {
            skills: Vec::new(),
            industry: None,
            min_rating: None,
            page: 1,
            limit: 10,
        }
    }
}

/// Which side of a mentorship request the caller is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestDirection {
    /// Requests the user sent as a mentee.
    Sent,
    /// Requests the user received as a mentor.
    Received,
    Any,
}

#[derive(Debug, Clone)]
pub struct RequestQuery {
    pub user_id: Uuid,
    pub direction: RequestDirection,
    pub status: Option<RequestStatus>,
}

impl RequestQuery {
    pub fn matches(&self, request: &MentorshipRequest) -> bool {
        let side = match self.direction {
            RequestDirection::Sent => request.mentee_id == self.user_id,
            RequestDirection::Received => request.mentor_id == self.user_id,
            RequestDirection::Any => request.involves(self.user_id),
        };
        side && self.status.map_or(true, |s| s == request.status)
    }
}

#[derive(Debug, Clone)]
pub struct SessionQuery {
    pub user_id: Uuid,
    pub status: Option<SessionStatus>,
    /// When set, only scheduled sessions at or after this instant, earliest first.
    pub upcoming_from: Option<DateTime<Utc>>,
}

impl SessionQuery {
    pub fn matches(&self, session: &Session) -> bool {
        if !session.involves(self.user_id) {
            return false;
        }
        if let Some(from) = self.upcoming_from {
            return session.status == SessionStatus::Scheduled && session.scheduled_at >= from;
        }
        self.status.map_or(true, |s| s == session.status)
    }
}
