//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the `DatabaseService` port from the `core` crate. It handles all interactions
//! with the PostgreSQL database using `sqlx`.

use afrilead_core::domain::{
    AuthSession, Availability, Conversation, MenteeProfile, MentorFilter, MentorProfile,
    MentorshipRequest, Message, NewUser, RequestDirection, RequestQuery, RequestStatus, Role,
    Session, SessionQuery, User, UserCredentials, UserUpdate,
};
use afrilead_core::ports::{DatabaseService, PortError, PortResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `DatabaseService` port.
#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }
}

//=========================================================================================
// Error Mapping
//=========================================================================================

fn unexpected(e: sqlx::Error) -> PortError {
    PortError::Unexpected(e.to_string())
}

fn not_found_or_unexpected(e: sqlx::Error, what: &str) -> PortError {
    match e {
        sqlx::Error::RowNotFound => PortError::NotFound(what.to_string()),
        _ => unexpected(e),
    }
}

fn conflict_or_unexpected(e: sqlx::Error, what: &str) -> PortError {
    match &e {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            PortError::Conflict(what.to_string())
        }
        sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation() => {
            PortError::NotFound("User not found".to_string())
        }
        _ => unexpected(e),
    }
}

fn parse<T: std::str::FromStr>(value: &str, column: &str) -> PortResult<T> {
    value
        .parse()
        .map_err(|_| PortError::Unexpected(format!("invalid {} value '{}'", column, value)))
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

const USER_COLUMNS: &str =
    "id, name, email, hashed_password, role, country, photo_url, created_at, updated_at";

#[derive(FromRow)]
struct UserRecord {
    id: Uuid,
    name: String,
    email: String,
    hashed_password: String,
    role: String,
    country: String,
    photo_url: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}
impl UserRecord {
    fn to_credentials(self) -> PortResult<UserCredentials> {
        let user = User {
            id: self.id,
            name: self.name,
            email: self.email,
            role: parse::<Role>(&self.role, "role")?,
            country: self.country,
            photo_url: self.photo_url,
            created_at: self.created_at,
            updated_at: self.updated_at,
        };
        Ok(UserCredentials {
            user,
            hashed_password: self.hashed_password,
        })
    }

    fn to_domain(self) -> PortResult<User> {
        Ok(self.to_credentials()?.user)
    }
}

const MENTOR_COLUMNS: &str = "user_id, bio, title, company, experience, skills, expertise, \
     years_of_experience, industry, linkedin_url, availability_hours, availability_timezone, \
     rating, total_sessions, sessions_completed, is_active, created_at, updated_at";

#[derive(FromRow)]
struct MentorProfileRecord {
    user_id: Uuid,
    bio: String,
    title: String,
    company: Option<String>,
    experience: String,
    skills: Vec<String>,
    expertise: Vec<String>,
    years_of_experience: i32,
    industry: String,
    linkedin_url: Option<String>,
    availability_hours: i32,
    availability_timezone: String,
    rating: Option<f64>,
    total_sessions: i32,
    sessions_completed: i32,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}
impl MentorProfileRecord {
    fn to_domain(self) -> MentorProfile {
        MentorProfile {
            user_id: self.user_id,
            bio: self.bio,
            title: self.title,
            company: self.company,
            experience: self.experience,
            skills: self.skills,
            expertise: self.expertise,
            years_of_experience: self.years_of_experience.max(0) as u32,
            industry: self.industry,
            linkedin_url: self.linkedin_url,
            availability: Availability {
                hours: self.availability_hours.max(0) as u32,
                timezone: self.availability_timezone,
            },
            rating: self.rating,
            total_sessions: self.total_sessions.max(0) as u32,
            sessions_completed: self.sessions_completed.max(0) as u32,
            is_active: self.is_active,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

const MENTEE_COLUMNS: &str = "user_id, bio, interests, goals, career_stage, education, \
     current_position, linkedin_url, preferred_mentor_traits, is_active, created_at, updated_at";

#[derive(FromRow)]
struct MenteeProfileRecord {
    user_id: Uuid,
    bio: Option<String>,
    interests: Vec<String>,
    goals: Vec<String>,
    career_stage: String,
    education: Option<String>,
    current_position: Option<String>,
    linkedin_url: Option<String>,
    preferred_mentor_traits: Vec<String>,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}
impl MenteeProfileRecord {
    fn to_domain(self) -> PortResult<MenteeProfile> {
        Ok(MenteeProfile {
            user_id: self.user_id,
            bio: self.bio,
            interests: self.interests,
            goals: self.goals,
            career_stage: parse(&self.career_stage, "career_stage")?,
            education: self.education,
            current_role: self.current_position,
            linkedin_url: self.linkedin_url,
            preferred_mentor_traits: self.preferred_mentor_traits,
            is_active: self.is_active,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

const REQUEST_COLUMNS: &str = "id, mentor_id, mentee_id, status, message, request_date, \
     response_date, created_at, updated_at";

#[derive(FromRow)]
struct RequestRecord {
    id: Uuid,
    mentor_id: Uuid,
    mentee_id: Uuid,
    status: String,
    message: Option<String>,
    request_date: DateTime<Utc>,
    response_date: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}
impl RequestRecord {
    fn to_domain(self) -> PortResult<MentorshipRequest> {
        Ok(MentorshipRequest {
            id: self.id,
            mentor_id: self.mentor_id,
            mentee_id: self.mentee_id,
            status: parse(&self.status, "status")?,
            message: self.message,
            request_date: self.request_date,
            response_date: self.response_date,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

const SESSION_COLUMNS: &str = "id, mentor_id, mentee_id, scheduled_at, duration, status, topic, \
     notes, meeting_link, rating, feedback, completed_at, created_at, updated_at";

#[derive(FromRow)]
struct SessionRecord {
    id: Uuid,
    mentor_id: Uuid,
    mentee_id: Uuid,
    scheduled_at: DateTime<Utc>,
    duration: i32,
    status: String,
    topic: String,
    notes: Option<String>,
    meeting_link: Option<String>,
    rating: Option<i16>,
    feedback: Option<String>,
    completed_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}
impl SessionRecord {
    fn to_domain(self) -> PortResult<Session> {
        Ok(Session {
            id: self.id,
            mentor_id: self.mentor_id,
            mentee_id: self.mentee_id,
            scheduled_at: self.scheduled_at,
            duration: self.duration.max(0) as u32,
            status: parse(&self.status, "status")?,
            topic: self.topic,
            notes: self.notes,
            meeting_link: self.meeting_link,
            rating: self.rating.map(|r| r.clamp(0, u8::MAX as i16) as u8),
            feedback: self.feedback,
            completed_at: self.completed_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

const MESSAGE_COLUMNS: &str =
    "id, sender_id, receiver_id, content, read, read_at, created_at, updated_at";

#[derive(FromRow)]
struct MessageRecord {
    id: Uuid,
    sender_id: Uuid,
    receiver_id: Uuid,
    content: String,
    read: bool,
    read_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}
impl MessageRecord {
    fn to_domain(self) -> Message {
        Message {
            id: self.id,
            sender_id: self.sender_id,
            receiver_id: self.receiver_id,
            content: self.content,
            read: self.read,
            read_at: self.read_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(FromRow)]
struct ConversationRecord {
    other_user_id: Uuid,
    unread_count: i64,
    #[sqlx(flatten)]
    last_message: MessageRecord,
}

//=========================================================================================
// `DatabaseService` Trait Implementation
//=========================================================================================

#[async_trait]
impl DatabaseService for DbAdapter {
    async fn ping(&self) -> PortResult<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }

    async fn create_user(&self, new_user: NewUser) -> PortResult<User> {
        let record = sqlx::query_as::<_, UserRecord>(&format!(
            "INSERT INTO users (id, name, email, hashed_password, role, country) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {USER_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(&new_user.name)
        .bind(&new_user.email)
        .bind(&new_user.hashed_password)
        .bind(new_user.role.as_str())
        .bind(&new_user.country)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| conflict_or_unexpected(e, "User with this email already exists"))?;
        record.to_domain()
    }

    async fn get_user(&self, user_id: Uuid) -> PortResult<User> {
        let record = sqlx::query_as::<_, UserRecord>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| not_found_or_unexpected(e, "User not found"))?;
        record.to_domain()
    }

    async fn get_users(&self, user_ids: &[Uuid]) -> PortResult<Vec<User>> {
        let records = sqlx::query_as::<_, UserRecord>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = ANY($1)"
        ))
        .bind(user_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        records.into_iter().map(|r| r.to_domain()).collect()
    }

    async fn get_user_credentials(&self, email: &str) -> PortResult<UserCredentials> {
        let record = sqlx::query_as::<_, UserRecord>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| not_found_or_unexpected(e, "User not found"))?;
        record.to_credentials()
    }

    async fn update_user(&self, user_id: Uuid, update: UserUpdate) -> PortResult<User> {
        let record = sqlx::query_as::<_, UserRecord>(&format!(
            "UPDATE users SET name = COALESCE($2, name), country = COALESCE($3, country), \
             photo_url = COALESCE($4, photo_url), updated_at = NOW() \
             WHERE id = $1 RETURNING {USER_COLUMNS}"
        ))
        .bind(user_id)
        .bind(update.name)
        .bind(update.country)
        .bind(update.photo_url)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| not_found_or_unexpected(e, "User not found"))?;
        record.to_domain()
    }

    async fn set_user_role(&self, user_id: Uuid, role: Role) -> PortResult<()> {
        let result = sqlx::query("UPDATE users SET role = $2, updated_at = NOW() WHERE id = $1")
            .bind(user_id)
            .bind(role.as_str())
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        if result.rows_affected() == 0 {
            return Err(PortError::NotFound("User not found".to_string()));
        }
        Ok(())
    }

    async fn create_auth_session(&self, session: AuthSession) -> PortResult<()> {
        sqlx::query("INSERT INTO auth_sessions (id, user_id, expires_at) VALUES ($1, $2, $3)")
            .bind(&session.id)
            .bind(session.user_id)
            .bind(session.expires_at)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }

    async fn validate_auth_session(&self, session_id: &str) -> PortResult<Uuid> {
        let user_id: Option<Uuid> = sqlx::query_scalar(
            "SELECT user_id FROM auth_sessions WHERE id = $1 AND expires_at > NOW()",
        )
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;
        user_id.ok_or(PortError::Unauthorized)
    }

    async fn delete_auth_session(&self, session_id: &str) -> PortResult<()> {
        sqlx::query("DELETE FROM auth_sessions WHERE id = $1")
            .bind(session_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }

    async fn create_mentor_profile(&self, profile: MentorProfile) -> PortResult<MentorProfile> {
        let record = sqlx::query_as::<_, MentorProfileRecord>(&format!(
            "INSERT INTO mentor_profiles (user_id, bio, title, company, experience, skills, \
             expertise, years_of_experience, industry, linkedin_url, availability_hours, \
             availability_timezone, is_active) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13) \
             RETURNING {MENTOR_COLUMNS}"
        ))
        .bind(profile.user_id)
        .bind(&profile.bio)
        .bind(&profile.title)
        .bind(&profile.company)
        .bind(&profile.experience)
        .bind(&profile.skills)
        .bind(&profile.expertise)
        .bind(profile.years_of_experience as i32)
        .bind(&profile.industry)
        .bind(&profile.linkedin_url)
        .bind(profile.availability.hours as i32)
        .bind(&profile.availability.timezone)
        .bind(profile.is_active)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| conflict_or_unexpected(e, "Mentor profile already exists"))?;
        Ok(record.to_domain())
    }

    async fn get_mentor_profile(&self, user_id: Uuid) -> PortResult<Option<MentorProfile>> {
        let record = sqlx::query_as::<_, MentorProfileRecord>(&format!(
            "SELECT {MENTOR_COLUMNS} FROM mentor_profiles WHERE user_id = $1"
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(record.map(|r| r.to_domain()))
    }

    async fn save_mentor_profile(&self, profile: &MentorProfile) -> PortResult<()> {
        let result = sqlx::query(
            "UPDATE mentor_profiles SET bio = $2, title = $3, company = $4, experience = $5, \
             skills = $6, expertise = $7, years_of_experience = $8, industry = $9, \
             linkedin_url = $10, availability_hours = $11, availability_timezone = $12, \
             rating = $13, total_sessions = $14, sessions_completed = $15, is_active = $16, \
             updated_at = NOW() WHERE user_id = $1",
        )
        .bind(profile.user_id)
        .bind(&profile.bio)
        .bind(&profile.title)
        .bind(&profile.company)
        .bind(&profile.experience)
        .bind(&profile.skills)
        .bind(&profile.expertise)
        .bind(profile.years_of_experience as i32)
        .bind(&profile.industry)
        .bind(&profile.linkedin_url)
        .bind(profile.availability.hours as i32)
        .bind(&profile.availability.timezone)
        .bind(profile.rating)
        .bind(profile.total_sessions as i32)
        .bind(profile.sessions_completed as i32)
        .bind(profile.is_active)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;
        if result.rows_affected() == 0 {
            return Err(PortError::NotFound("Mentor profile not found".to_string()));
        }
        Ok(())
    }

    async fn list_mentors(&self, filter: &MentorFilter) -> PortResult<(Vec<MentorProfile>, u64)> {
        const WHERE: &str = "WHERE is_active \
             AND (cardinality($1::text[]) = 0 OR skills && $1::text[]) \
             AND ($2::text IS NULL OR industry = $2) \
             AND ($3::float8 IS NULL OR rating >= $3)";

        let total: i64 =
            sqlx::query_scalar(&format!("SELECT COUNT(*) FROM mentor_profiles {WHERE}"))
                .bind(&filter.skills)
                .bind(&filter.industry)
                .bind(filter.min_rating)
                .fetch_one(&self.pool)
                .await
                .map_err(unexpected)?;

        let records = sqlx::query_as::<_, MentorProfileRecord>(&format!(
            "SELECT {MENTOR_COLUMNS} FROM mentor_profiles {WHERE} \
             ORDER BY rating DESC NULLS LAST, sessions_completed DESC, created_at ASC \
             LIMIT $4 OFFSET $5"
        ))
        .bind(&filter.skills)
        .bind(&filter.industry)
        .bind(filter.min_rating)
        .bind(filter.limit as i64)
        .bind(filter.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;

        let mentors = records.into_iter().map(|r| r.to_domain()).collect();
        Ok((mentors, total.max(0) as u64))
    }

    async fn create_mentee_profile(&self, profile: MenteeProfile) -> PortResult<MenteeProfile> {
        let record = sqlx::query_as::<_, MenteeProfileRecord>(&format!(
            "INSERT INTO mentee_profiles (user_id, bio, interests, goals, career_stage, \
             education, current_position, linkedin_url, preferred_mentor_traits, is_active) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) RETURNING {MENTEE_COLUMNS}"
        ))
        .bind(profile.user_id)
        .bind(&profile.bio)
        .bind(&profile.interests)
        .bind(&profile.goals)
        .bind(profile.career_stage.as_str())
        .bind(&profile.education)
        .bind(&profile.current_role)
        .bind(&profile.linkedin_url)
        .bind(&profile.preferred_mentor_traits)
        .bind(profile.is_active)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| conflict_or_unexpected(e, "Mentee profile already exists"))?;
        record.to_domain()
    }

    async fn get_mentee_profile(&self, user_id: Uuid) -> PortResult<Option<MenteeProfile>> {
        let record = sqlx::query_as::<_, MenteeProfileRecord>(&format!(
            "SELECT {MENTEE_COLUMNS} FROM mentee_profiles WHERE user_id = $1"
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;
        record.map(|r| r.to_domain()).transpose()
    }

    async fn save_mentee_profile(&self, profile: &MenteeProfile) -> PortResult<()> {
        let result = sqlx::query(
            "UPDATE mentee_profiles SET bio = $2, interests = $3, goals = $4, \
             career_stage = $5, education = $6, current_position = $7, linkedin_url = $8, \
             preferred_mentor_traits = $9, is_active = $10, updated_at = NOW() \
             WHERE user_id = $1",
        )
        .bind(profile.user_id)
        .bind(&profile.bio)
        .bind(&profile.interests)
        .bind(&profile.goals)
        .bind(profile.career_stage.as_str())
        .bind(&profile.education)
        .bind(&profile.current_role)
        .bind(&profile.linkedin_url)
        .bind(&profile.preferred_mentor_traits)
        .bind(profile.is_active)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;
        if result.rows_affected() == 0 {
            return Err(PortError::NotFound("Mentee profile not found".to_string()));
        }
        Ok(())
    }

    async fn create_request(&self, request: MentorshipRequest) -> PortResult<MentorshipRequest> {
        let record = sqlx::query_as::<_, RequestRecord>(&format!(
            "INSERT INTO mentorship_requests (id, mentor_id, mentee_id, status, message, \
             request_date) VALUES ($1, $2, $3, $4, $5, $6) RETURNING {REQUEST_COLUMNS}"
        ))
        .bind(request.id)
        .bind(request.mentor_id)
        .bind(request.mentee_id)
        .bind(request.status.as_str())
        .bind(&request.message)
        .bind(request.request_date)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| conflict_or_unexpected(e, "Request already exists"))?;
        record.to_domain()
    }

    async fn get_request(&self, request_id: Uuid) -> PortResult<MentorshipRequest> {
        let record = sqlx::query_as::<_, RequestRecord>(&format!(
            "SELECT {REQUEST_COLUMNS} FROM mentorship_requests WHERE id = $1"
        ))
        .bind(request_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| not_found_or_unexpected(e, "Request not found"))?;
        record.to_domain()
    }

    async fn list_requests(&self, query: &RequestQuery) -> PortResult<Vec<MentorshipRequest>> {
        let side = match query.direction {
            RequestDirection::Sent => "mentee_id = $1",
            RequestDirection::Received => "mentor_id = $1",
            RequestDirection::Any => "(mentee_id = $1 OR mentor_id = $1)",
        };
        let records = sqlx::query_as::<_, RequestRecord>(&format!(
            "SELECT {REQUEST_COLUMNS} FROM mentorship_requests \
             WHERE {side} AND ($2::text IS NULL OR status = $2) \
             ORDER BY request_date DESC"
        ))
        .bind(query.user_id)
        .bind(query.status.map(|s| s.as_str()))
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        records.into_iter().map(|r| r.to_domain()).collect()
    }

    async fn update_request_status(
        &self,
        request_id: Uuid,
        status: RequestStatus,
        response_date: DateTime<Utc>,
    ) -> PortResult<MentorshipRequest> {
        let record = sqlx::query_as::<_, RequestRecord>(&format!(
            "UPDATE mentorship_requests SET status = $2, response_date = $3, updated_at = NOW() \
             WHERE id = $1 RETURNING {REQUEST_COLUMNS}"
        ))
        .bind(request_id)
        .bind(status.as_str())
        .bind(response_date)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| not_found_or_unexpected(e, "Request not found"))?;
        record.to_domain()
    }

    async fn delete_request(&self, request_id: Uuid) -> PortResult<()> {
        let result = sqlx::query("DELETE FROM mentorship_requests WHERE id = $1")
            .bind(request_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        if result.rows_affected() == 0 {
            return Err(PortError::NotFound("Request not found".to_string()));
        }
        Ok(())
    }

    async fn create_session(&self, session: Session) -> PortResult<Session> {
        let record = sqlx::query_as::<_, SessionRecord>(&format!(
            "INSERT INTO sessions (id, mentor_id, mentee_id, scheduled_at, duration, status, \
             topic, notes, meeting_link) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             RETURNING {SESSION_COLUMNS}"
        ))
        .bind(session.id)
        .bind(session.mentor_id)
        .bind(session.mentee_id)
        .bind(session.scheduled_at)
        .bind(session.duration as i32)
        .bind(session.status.as_str())
        .bind(&session.topic)
        .bind(&session.notes)
        .bind(&session.meeting_link)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| conflict_or_unexpected(e, "Session already exists"))?;
        record.to_domain()
    }

    async fn get_session(&self, session_id: Uuid) -> PortResult<Session> {
        let record = sqlx::query_as::<_, SessionRecord>(&format!(
            "SELECT {SESSION_COLUMNS} FROM sessions WHERE id = $1"
        ))
        .bind(session_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| not_found_or_unexpected(e, "Session not found"))?;
        record.to_domain()
    }

    async fn list_sessions(&self, query: &SessionQuery) -> PortResult<Vec<Session>> {
        let records = match query.upcoming_from {
            Some(from) => sqlx::query_as::<_, SessionRecord>(&format!(
                "SELECT {SESSION_COLUMNS} FROM sessions \
                 WHERE (mentor_id = $1 OR mentee_id = $1) \
                 AND status = 'scheduled' AND scheduled_at >= $2 \
                 ORDER BY scheduled_at ASC"
            ))
            .bind(query.user_id)
            .bind(from)
            .fetch_all(&self.pool)
            .await,
            None => sqlx::query_as::<_, SessionRecord>(&format!(
                "SELECT {SESSION_COLUMNS} FROM sessions \
                 WHERE (mentor_id = $1 OR mentee_id = $1) \
                 AND ($2::text IS NULL OR status = $2) \
                 ORDER BY scheduled_at DESC"
            ))
            .bind(query.user_id)
            .bind(query.status.map(|s| s.as_str()))
            .fetch_all(&self.pool)
            .await,
        }
        .map_err(unexpected)?;
        records.into_iter().map(|r| r.to_domain()).collect()
    }

    async fn save_session(&self, session: &Session) -> PortResult<()> {
        let result = sqlx::query(
            "UPDATE sessions SET scheduled_at = $2, duration = $3, status = $4, topic = $5, \
             notes = $6, meeting_link = $7, rating = $8, feedback = $9, completed_at = $10, \
             updated_at = NOW() WHERE id = $1",
        )
        .bind(session.id)
        .bind(session.scheduled_at)
        .bind(session.duration as i32)
        .bind(session.status.as_str())
        .bind(&session.topic)
        .bind(&session.notes)
        .bind(&session.meeting_link)
        .bind(session.rating.map(i16::from))
        .bind(&session.feedback)
        .bind(session.completed_at)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;
        if result.rows_affected() == 0 {
            return Err(PortError::NotFound("Session not found".to_string()));
        }
        Ok(())
    }

    async fn create_message(&self, message: Message) -> PortResult<Message> {
        let record = sqlx::query_as::<_, MessageRecord>(&format!(
            "INSERT INTO messages (id, sender_id, receiver_id, content) \
             VALUES ($1, $2, $3, $4) RETURNING {MESSAGE_COLUMNS}"
        ))
        .bind(message.id)
        .bind(message.sender_id)
        .bind(message.receiver_id)
        .bind(&message.content)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| conflict_or_unexpected(e, "Message already exists"))?;
        Ok(record.to_domain())
    }

    async fn get_messages_between(&self, user_a: Uuid, user_b: Uuid) -> PortResult<Vec<Message>> {
        let records = sqlx::query_as::<_, MessageRecord>(&format!(
            "SELECT {MESSAGE_COLUMNS} FROM messages \
             WHERE (sender_id = $1 AND receiver_id = $2) \
                OR (sender_id = $2 AND receiver_id = $1) \
             ORDER BY created_at ASC"
        ))
        .bind(user_a)
        .bind(user_b)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn mark_messages_read(
        &self,
        sender: Uuid,
        receiver: Uuid,
        read_at: DateTime<Utc>,
    ) -> PortResult<u64> {
        let result = sqlx::query(
            "UPDATE messages SET read = TRUE, read_at = $3, updated_at = NOW() \
             WHERE sender_id = $1 AND receiver_id = $2 AND NOT read",
        )
        .bind(sender)
        .bind(receiver)
        .bind(read_at)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(result.rows_affected())
    }

    async fn list_conversations(&self, user_id: Uuid) -> PortResult<Vec<Conversation>> {
        let records = sqlx::query_as::<_, ConversationRecord>(&format!(
            "WITH mine AS ( \
                SELECT {MESSAGE_COLUMNS}, \
                       CASE WHEN sender_id = $1 THEN receiver_id ELSE sender_id END AS other_user_id \
                FROM messages WHERE sender_id = $1 OR receiver_id = $1 \
             ), \
             unread AS ( \
                SELECT other_user_id, COUNT(*) FILTER (WHERE receiver_id = $1 AND NOT read) AS unread_count \
                FROM mine GROUP BY other_user_id \
             ) \
             SELECT * FROM ( \
                SELECT DISTINCT ON (mine.other_user_id) \
                       mine.id, mine.sender_id, mine.receiver_id, mine.content, mine.read, \
                       mine.read_at, mine.created_at, mine.updated_at, \
                       mine.other_user_id, unread.unread_count \
                FROM mine JOIN unread ON unread.other_user_id = mine.other_user_id \
                ORDER BY mine.other_user_id, mine.created_at DESC \
             ) latest ORDER BY created_at DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;

        Ok(records
            .into_iter()
            .map(|r| Conversation {
                other_user_id: r.other_user_id,
                unread_count: r.unread_count.max(0) as u64,
                last_message: r.last_message.to_domain(),
            })
            .collect())
    }
}
