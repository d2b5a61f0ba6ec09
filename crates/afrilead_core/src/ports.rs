//! crates/afrilead_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of the concrete document store behind it.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{
    AuthSession, Conversation, MenteeProfile, MentorFilter, MentorProfile, MentorshipRequest,
    Message, NewUser, RequestQuery, RequestStatus, Role, Session, SessionQuery, User,
    UserCredentials, UserUpdate,
};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., database, network).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    /// A uniqueness constraint was violated.
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
    #[error("Unauthorized")]
    Unauthorized,
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait DatabaseService: Send + Sync {
    /// Cheap round trip used by the health check.
    async fn ping(&self) -> PortResult<()>;

    // --- User Management ---

    /// Fails with `Conflict` when the email is already registered.
    async fn create_user(&self, new_user: NewUser) -> PortResult<User>;

    async fn get_user(&self, user_id: Uuid) -> PortResult<User>;

    /// Returns the users that exist among `user_ids`, in no particular order.
    async fn get_users(&self, user_ids: &[Uuid]) -> PortResult<Vec<User>>;

    async fn get_user_credentials(&self, email: &str) -> PortResult<UserCredentials>;

    async fn update_user(&self, user_id: Uuid, update: UserUpdate) -> PortResult<User>;

    async fn set_user_role(&self, user_id: Uuid, role: Role) -> PortResult<()>;

    // --- Auth Methods ---
    async fn create_auth_session(&self, session: AuthSession) -> PortResult<()>;

    /// Resolves an unexpired session id to its user, or `Unauthorized`.
    async fn validate_auth_session(&self, session_id: &str) -> PortResult<Uuid>;

    async fn delete_auth_session(&self, session_id: &str) -> PortResult<()>;

    // --- Profiles ---

    /// Fails with `Conflict` when the user already has a mentor profile.
    async fn create_mentor_profile(&self, profile: MentorProfile) -> PortResult<MentorProfile>;

    async fn get_mentor_profile(&self, user_id: Uuid) -> PortResult<Option<MentorProfile>>;

    /// Overwrites an existing mentor profile.
    async fn save_mentor_profile(&self, profile: &MentorProfile) -> PortResult<()>;

    /// One page of active mentors plus the total number of matches.
    async fn list_mentors(&self, filter: &MentorFilter) -> PortResult<(Vec<MentorProfile>, u64)>;

    /// Fails with `Conflict` when the user already has a mentee profile.
    async fn create_mentee_profile(&self, profile: MenteeProfile) -> PortResult<MenteeProfile>;

    async fn get_mentee_profile(&self, user_id: Uuid) -> PortResult<Option<MenteeProfile>>;

    async fn save_mentee_profile(&self, profile: &MenteeProfile) -> PortResult<()>;

    // --- Mentorship Requests ---

    /// Fails with `Conflict` when the (mentor, mentee) pair already has a request.
    async fn create_request(&self, request: MentorshipRequest) -> PortResult<MentorshipRequest>;

    async fn get_request(&self, request_id: Uuid) -> PortResult<MentorshipRequest>;

    /// Matching requests, newest `request_date` first.
    async fn list_requests(&self, query: &RequestQuery) -> PortResult<Vec<MentorshipRequest>>;

    async fn update_request_status(
        &self,
        request_id: Uuid,
        status: RequestStatus,
        response_date: DateTime<Utc>,
    ) -> PortResult<MentorshipRequest>;

    async fn delete_request(&self, request_id: Uuid) -> PortResult<()>;

    // --- Sessions (mentorship meetings) ---
    async fn create_session(&self, session: Session) -> PortResult<Session>;

    async fn get_session(&self, session_id: Uuid) -> PortResult<Session>;

    /// Upcoming queries sort earliest first; all others latest first.
    async fn list_sessions(&self, query: &SessionQuery) -> PortResult<Vec<Session>>;

    async fn save_session(&self, session: &Session) -> PortResult<()>;

    // --- Messages ---
    async fn create_message(&self, message: Message) -> PortResult<Message>;

    /// Every message exchanged between the two users, oldest first.
    async fn get_messages_between(&self, user_a: Uuid, user_b: Uuid) -> PortResult<Vec<Message>>;

    /// Marks unread messages from `sender` to `receiver` as read; returns how many changed.
    async fn mark_messages_read(
        &self,
        sender: Uuid,
        receiver: Uuid,
        read_at: DateTime<Utc>,
    ) -> PortResult<u64>;

    async fn list_conversations(&self, user_id: Uuid) -> PortResult<Vec<Conversation>>;
}
