//! services/api/src/adapters/memory.rs
//!
//! A process-local implementation of the `DatabaseService` port. Every table is
//! a map behind one `RwLock`; uniqueness rules mirror the Postgres schema.

use afrilead_core::conversations::group_conversations;
use afrilead_core::domain::{
    AuthSession, Conversation, MenteeProfile, MentorFilter, MentorProfile, MentorshipRequest,
    Message, NewUser, RequestQuery, RequestStatus, Role, Session, SessionQuery, User,
    UserCredentials, UserUpdate,
};
use afrilead_core::ports::{DatabaseService, PortError, PortResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::cmp::Ordering;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, UserCredentials>,
    auth_sessions: HashMap<String, AuthSession>,
    mentor_profiles: HashMap<Uuid, MentorProfile>,
    mentee_profiles: HashMap<Uuid, MenteeProfile>,
    requests: HashMap<Uuid, MentorshipRequest>,
    sessions: HashMap<Uuid, Session>,
    messages: Vec<Message>,
}

impl Tables {
    fn user_mut(&mut self, user_id: Uuid) -> PortResult<&mut UserCredentials> {
        self.users
            .get_mut(&user_id)
            .ok_or_else(|| PortError::NotFound("User not found".to_string()))
    }

    fn ensure_user(&self, user_id: Uuid) -> PortResult<()> {
        if self.users.contains_key(&user_id) {
            Ok(())
        } else {
            Err(PortError::NotFound("User not found".to_string()))
        }
    }
}

/// An in-memory store, used for local runs without Postgres and for tests.
#[derive(Default)]
pub struct MemoryDb {
    tables: RwLock<Tables>,
}

impl MemoryDb {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Highest rating first, unrated mentors last, then most sessions completed.
fn mentor_order(a: &MentorProfile, b: &MentorProfile) -> Ordering {
    let by_rating = match (a.rating, b.rating) {
        (Some(x), Some(y)) => y.partial_cmp(&x).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    };
    by_rating
        .then_with(|| b.sessions_completed.cmp(&a.sessions_completed))
        .then_with(|| a.created_at.cmp(&b.created_at))
}

#[async_trait]
impl DatabaseService for MemoryDb {
    async fn ping(&self) -> PortResult<()> {
        Ok(())
    }

    async fn create_user(&self, new_user: NewUser) -> PortResult<User> {
        let mut tables = self.tables.write().await;
        if tables.users.values().any(|c| c.user.email == new_user.email) {
            return Err(PortError::Conflict(
                "User with this email already exists".to_string(),
            ));
        }
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            name: new_user.name,
            email: new_user.email,
            role: new_user.role,
            country: new_user.country,
            photo_url: None,
            created_at: now,
            updated_at: now,
        };
        tables.users.insert(
            user.id,
            UserCredentials {
                user: user.clone(),
                hashed_password: new_user.hashed_password,
            },
        );
        Ok(user)
    }

    async fn get_user(&self, user_id: Uuid) -> PortResult<User> {
        let tables = self.tables.read().await;
        tables
            .users
            .get(&user_id)
            .map(|c| c.user.clone())
            .ok_or_else(|| PortError::NotFound("User not found".to_string()))
    }

    async fn get_users(&self, user_ids: &[Uuid]) -> PortResult<Vec<User>> {
        let tables = self.tables.read().await;
        Ok(user_ids
            .iter()
            .filter_map(|id| tables.users.get(id))
            .map(|c| c.user.clone())
            .collect())
    }

    async fn get_user_credentials(&self, email: &str) -> PortResult<UserCredentials> {
        let tables = self.tables.read().await;
        tables
            .users
            .values()
            .find(|c| c.user.email == email)
            .cloned()
            .ok_or_else(|| PortError::NotFound("User not found".to_string()))
    }

    async fn update_user(&self, user_id: Uuid, update: UserUpdate) -> PortResult<User> {
        let mut tables = self.tables.write().await;
        let credentials = tables.user_mut(user_id)?;
        update.apply(&mut credentials.user);
        credentials.user.updated_at = Utc::now();
        Ok(credentials.user.clone())
    }

    async fn set_user_role(&self, user_id: Uuid, role: Role) -> PortResult<()> {
        let mut tables = self.tables.write().await;
        let credentials = tables.user_mut(user_id)?;
        credentials.user.role = role;
        credentials.user.updated_at = Utc::now();
        Ok(())
    }

    async fn create_auth_session(&self, session: AuthSession) -> PortResult<()> {
        let mut tables = self.tables.write().await;
        tables.ensure_user(session.user_id)?;
        tables.auth_sessions.insert(session.id.clone(), session);
        Ok(())
    }

    async fn validate_auth_session(&self, session_id: &str) -> PortResult<Uuid> {
        let tables = self.tables.read().await;
        match tables.auth_sessions.get(session_id) {
            Some(session) if session.expires_at > Utc::now() => Ok(session.user_id),
            _ => Err(PortError::Unauthorized),
        }
    }

    async fn delete_auth_session(&self, session_id: &str) -> PortResult<()> {
        self.tables.write().await.auth_sessions.remove(session_id);
        Ok(())
    }

    async fn create_mentor_profile(&self, profile: MentorProfile) -> PortResult<MentorProfile> {
        let mut tables = self.tables.write().await;
        tables.ensure_user(profile.user_id)?;
        if tables.mentor_profiles.contains_key(&profile.user_id) {
            return Err(PortError::Conflict(
                "Mentor profile already exists".to_string(),
            ));
        }
        tables
            .mentor_profiles
            .insert(profile.user_id, profile.clone());
        Ok(profile)
    }

    async fn get_mentor_profile(&self, user_id: Uuid) -> PortResult<Option<MentorProfile>> {
        Ok(self.tables.read().await.mentor_profiles.get(&user_id).cloned())
    }

    async fn save_mentor_profile(&self, profile: &MentorProfile) -> PortResult<()> {
        let mut tables = self.tables.write().await;
        let stored = tables
            .mentor_profiles
            .get_mut(&profile.user_id)
            .ok_or_else(|| PortError::NotFound("Mentor profile not found".to_string()))?;
        *stored = profile.clone();
        stored.updated_at = Utc::now();
        Ok(())
    }

    async fn list_mentors(&self, filter: &MentorFilter) -> PortResult<(Vec<MentorProfile>, u64)> {
        let tables = self.tables.read().await;
        let mut matches: Vec<&MentorProfile> = tables
            .mentor_profiles
            .values()
            .filter(|p| filter.matches(p))
            .collect();
        matches.sort_by(|a, b| mentor_order(a, b));

        let total = matches.len() as u64;
        let page = matches
            .into_iter()
            .skip(filter.offset() as usize)
            .take(filter.limit as usize)
            .cloned()
            .collect();
        Ok((page, total))
    }

    async fn create_mentee_profile(&self, profile: MenteeProfile) -> PortResult<MenteeProfile> {
        let mut tables = self.tables.write().await;
        tables.ensure_user(profile.user_id)?;
        if tables.mentee_profiles.contains_key(&profile.user_id) {
            return Err(PortError::Conflict(
                "Mentee profile already exists".to_string(),
            ));
        }
        tables
            .mentee_profiles
            .insert(profile.user_id, profile.clone());
        Ok(profile)
    }

    async fn get_mentee_profile(&self, user_id: Uuid) -> PortResult<Option<MenteeProfile>> {
        Ok(self.tables.read().await.mentee_profiles.get(&user_id).cloned())
    }

    async fn save_mentee_profile(&self, profile: &MenteeProfile) -> PortResult<()> {
        let mut tables = self.tables.write().await;
        let stored = tables
            .mentee_profiles
            .get_mut(&profile.user_id)
            .ok_or_else(|| PortError::NotFound("Mentee profile not found".to_string()))?;
        *stored = profile.clone();
        stored.updated_at = Utc::now();
        Ok(())
    }

    async fn create_request(&self, request: MentorshipRequest) -> PortResult<MentorshipRequest> {
        let mut tables = self.tables.write().await;
        tables.ensure_user(request.mentor_id)?;
        tables.ensure_user(request.mentee_id)?;
        let duplicate = tables
            .requests
            .values()
            .any(|r| r.mentor_id == request.mentor_id && r.mentee_id == request.mentee_id);
        if duplicate {
            return Err(PortError::Conflict("Request already exists".to_string()));
        }
        tables.requests.insert(request.id, request.clone());
        Ok(request)
    }

    async fn get_request(&self, request_id: Uuid) -> PortResult<MentorshipRequest> {
        self.tables
            .read()
            .await
            .requests
            .get(&request_id)
            .cloned()
            .ok_or_else(|| PortError::NotFound("Request not found".to_string()))
    }

    async fn list_requests(&self, query: &RequestQuery) -> PortResult<Vec<MentorshipRequest>> {
        let tables = self.tables.read().await;
        let mut requests: Vec<MentorshipRequest> = tables
            .requests
            .values()
            .filter(|r| query.matches(r))
            .cloned()
            .collect();
        requests.sort_by(|a, b| b.request_date.cmp(&a.request_date));
        Ok(requests)
    }

    async fn update_request_status(
        &self,
        request_id: Uuid,
        status: RequestStatus,
        response_date: DateTime<Utc>,
    ) -> PortResult<MentorshipRequest> {
        let mut tables = self.tables.write().await;
        let request = tables
            .requests
            .get_mut(&request_id)
            .ok_or_else(|| PortError::NotFound("Request not found".to_string()))?;
        request.status = status;
        request.response_date = Some(response_date);
        request.updated_at = Utc::now();
        Ok(request.clone())
    }

    async fn delete_request(&self, request_id: Uuid) -> PortResult<()> {
        self.tables
            .write()
            .await
            .requests
            .remove(&request_id)
            .map(|_| ())
            .ok_or_else(|| PortError::NotFound("Request not found".to_string()))
    }

    async fn create_session(&self, session: Session) -> PortResult<Session> {
        let mut tables = self.tables.write().await;
        tables.ensure_user(session.mentor_id)?;
        tables.ensure_user(session.mentee_id)?;
        tables.sessions.insert(session.id, session.clone());
        Ok(session)
    }

    async fn get_session(&self, session_id: Uuid) -> PortResult<Session> {
        self.tables
            .read()
            .await
            .sessions
            .get(&session_id)
            .cloned()
            .ok_or_else(|| PortError::NotFound("Session not found".to_string()))
    }

    async fn list_sessions(&self, query: &SessionQuery) -> PortResult<Vec<Session>> {
        let tables = self.tables.read().await;
        let mut sessions: Vec<Session> = tables
            .sessions
            .values()
            .filter(|s| query.matches(s))
            .cloned()
            .collect();
        if query.upcoming_from.is_some() {
            sessions.sort_by(|a, b| a.scheduled_at.cmp(&b.scheduled_at));
        } else {
            sessions.sort_by(|a, b| b.scheduled_at.cmp(&a.scheduled_at));
        }
        Ok(sessions)
    }

    async fn save_session(&self, session: &Session) -> PortResult<()> {
        let mut tables = self.tables.write().await;
        let stored = tables
            .sessions
            .get_mut(&session.id)
            .ok_or_else(|| PortError::NotFound("Session not found".to_string()))?;
        *stored = session.clone();
        stored.updated_at = Utc::now();
        Ok(())
    }

    async fn create_message(&self, message: Message) -> PortResult<Message> {
        let mut tables = self.tables.write().await;
        tables.ensure_user(message.sender_id)?;
        tables.ensure_user(message.receiver_id)?;
        tables.messages.push(message.clone());
        Ok(message)
    }

    async fn get_messages_between(&self, user_a: Uuid, user_b: Uuid) -> PortResult<Vec<Message>> {
        let tables = self.tables.read().await;
        let mut messages: Vec<Message> = tables
            .messages
            .iter()
            .filter(|m| {
                (m.sender_id == user_a && m.receiver_id == user_b)
                    || (m.sender_id == user_b && m.receiver_id == user_a)
            })
            .cloned()
            .collect();
        messages.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(messages)
    }

    async fn mark_messages_read(
        &self,
        sender: Uuid,
        receiver: Uuid,
        read_at: DateTime<Utc>,
    ) -> PortResult<u64> {
        let mut tables = self.tables.write().await;
        let mut changed = 0;
        for message in tables
            .messages
            .iter_mut()
            .filter(|m| m.sender_id == sender && m.receiver_id == receiver && !m.read)
        {
            message.read = true;
            message.read_at = Some(read_at);
            message.updated_at = read_at;
            changed += 1;
        }
        Ok(changed)
    }

    async fn list_conversations(&self, user_id: Uuid) -> PortResult<Vec<Conversation>> {
        let tables = self.tables.read().await;
        Ok(group_conversations(user_id, tables.messages.iter().cloned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use afrilead_core::domain::{Availability, RequestDirection};
    use chrono::Duration;

    async fn user(db: &MemoryDb, email: &str, role: Role) -> User {
        db.create_user(NewUser {
            name: "Test User".into(),
            email: email.into(),
            hashed_password: "hash".into(),
            role,
            country: "Ghana".into(),
        })
        .await
        .unwrap()
    }

    fn mentor_profile(user_id: Uuid, rating: Option<f64>, completed: u32) -> MentorProfile {
        let now = Utc::now();
        MentorProfile {
            user_id,
            bio: "b".repeat(60),
            title: "Engineer".into(),
            company: None,
            experience: "e".repeat(30),
            skills: vec!["Tech".into()],
            expertise: vec!["Backend".into()],
            years_of_experience: 4,
            industry: "Software".into(),
            linkedin_url: None,
            availability: Availability::default(),
            rating,
            total_sessions: 0,
            sessions_completed: completed,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    fn request(mentor_id: Uuid, mentee_id: Uuid) -> MentorshipRequest {
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

    #[tokio::test]
    async fn duplicate_email_is_a_conflict() {
        let db = MemoryDb::new();
        user(&db, "ada@example.com", Role::Mentee).await;
        let err = db
            .create_user(NewUser {
                name: "Other".into(),
                email: "ada@example.com".into(),
                hashed_password: "hash".into(),
                role: Role::Mentor,
                country: "Kenya".into(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, PortError::Conflict(_)));
    }

    #[tokio::test]
    async fn duplicate_request_pair_is_a_conflict() {
        let db = MemoryDb::new();
        let mentor = user(&db, "mentor@example.com", Role::Mentor).await;
        let mentee = user(&db, "mentee@example.com", Role::Mentee).await;

        db.create_request(request(mentor.id, mentee.id)).await.unwrap();
        let err = db
            .create_request(request(mentor.id, mentee.id))
            .await
            .unwrap_err();
        assert!(matches!(err, PortError::Conflict(_)));

        // The reverse direction is a different pair.
        db.create_request(request(mentee.id, mentor.id)).await.unwrap();
    }

    #[tokio::test]
    async fn expired_auth_sessions_do_not_validate() {
        let db = MemoryDb::new();
        let someone = user(&db, "someone@example.com", Role::Mentee).await;
        db.create_auth_session(AuthSession {
            id: "expired".into(),
            user_id: someone.id,
            expires_at: Utc::now() - Duration::minutes(1),
        })
        .await
        .unwrap();
        assert!(matches!(
            db.validate_auth_session("expired").await,
            Err(PortError::Unauthorized)
        ));
    }

    #[tokio::test]
    async fn mentors_sorted_by_rating_then_sessions() {
        let db = MemoryDb::new();
        let a = user(&db, "a@example.com", Role::Mentor).await;
        let b = user(&db, "b@example.com", Role::Mentor).await;
        let c = user(&db, "c@example.com", Role::Mentor).await;
        let d = user(&db, "d@example.com", Role::Mentor).await;
        db.create_mentor_profile(mentor_profile(a.id, None, 9)).await.unwrap();
        db.create_mentor_profile(mentor_profile(b.id, Some(4.0), 1)).await.unwrap();
        db.create_mentor_profile(mentor_profile(c.id, Some(4.0), 5)).await.unwrap();
        db.create_mentor_profile(mentor_profile(d.id, Some(4.8), 2)).await.unwrap();

        let (page, total) = db.list_mentors(&MentorFilter::default()).await.unwrap();
        assert_eq!(total, 4);
        let order: Vec<Uuid> = page.iter().map(|p| p.user_id).collect();
        assert_eq!(order, vec![d.id, c.id, b.id, a.id]);

        let second_page = MentorFilter {
            page: 2,
            limit: 3,
            ..MentorFilter::default()
        };
        let (page, total) = db.list_mentors(&second_page).await.unwrap();
        assert_eq!(total, 4);
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].user_id, a.id);
    }

    #[tokio::test]
    async fn request_direction_filters() {
        let db = MemoryDb::new();
        let mentor = user(&db, "mentor@example.com", Role::Both).await;
        let mentee = user(&db, "mentee@example.com", Role::Both).await;
        db.create_request(request(mentor.id, mentee.id)).await.unwrap();

        let sent = RequestQuery {
            user_id: mentee.id,
            direction: RequestDirection::Sent,
            status: None,
        };
        assert_eq!(db.list_requests(&sent).await.unwrap().len(), 1);

        let received_by_mentee = RequestQuery {
            user_id: mentee.id,
            direction: RequestDirection::Received,
            status: None,
        };
        assert!(db.list_requests(&received_by_mentee).await.unwrap().is_empty());

        let accepted_only = RequestQuery {
            user_id: mentor.id,
            direction: RequestDirection::Any,
            status: Some(RequestStatus::Accepted),
        };
        assert!(db.list_requests(&accepted_only).await.unwrap().is_empty());
    }
}
