//! Store tests for the Postgres adapter.
//!
//! These run the embedded migrations against the database named by
//! `DATABASE_URL` and exercise every `DatabaseService` method. When the
//! variable is unset the tests are skipped. All rows use fresh ids and emails
//! so the tests can share one database and run in parallel.

use afrilead_api::adapters::DbAdapter;
use afrilead_core::domain::{
    AuthSession, Availability, CareerStage, MenteeProfile, MentorFilter, MentorProfile,
    MentorshipRequest, Message, NewUser, RequestDirection, RequestQuery, RequestStatus, Role,
    Session, SessionQuery, SessionStatus, User, UserUpdate,
};
use afrilead_core::ports::{DatabaseService, PortError};
use chrono::{Duration, Utc};
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

/// Connects and migrates, or returns `None` when no database is configured.
async fn test_db() -> Option<DbAdapter> {
    let Ok(url) = std::env::var("DATABASE_URL") else {
        eprintln!("Skipping Postgres test: DATABASE_URL is not set");
        return None;
    };
    let pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&url)
        .await
        .expect("failed to connect to DATABASE_URL");
    let db = DbAdapter::new(pool);
    db.run_migrations().await.expect("migrations must apply");
    Some(db)
}

async fn user(db: &DbAdapter, role: Role) -> User {
    db.create_user(NewUser {
        name: "Store Test".into(),
        email: format!("{}@example.com", Uuid::new_v4()),
        hashed_password: "hash".into(),
        role,
        country: "Kenya".into(),
    })
    .await
    .unwrap()
}

fn mentor_profile(user_id: Uuid, industry: &str) -> MentorProfile {
    let now = Utc::now();
    MentorProfile {
        user_id,
        bio: "b".repeat(60),
        title: "Engineer".into(),
        company: Some("Andela".into()),
        experience: "e".repeat(30),
        skills: vec!["Tech".into(), "Design".into()],
        expertise: vec!["Backend".into()],
        years_of_experience: 6,
        industry: industry.to_string(),
        linkedin_url: None,
        availability: Availability {
            hours: 5,
            timezone: "Africa/Nairobi".into(),
        },
        rating: None,
        total_sessions: 0,
        sessions_completed: 0,
        is_active: true,
        created_at: now,
        updated_at: now,
    }
}

fn session(mentor_id: Uuid, mentee_id: Uuid, offset: Duration) -> Session {
    let now = Utc::now();
    Session {
        id: Uuid::new_v4(),
        mentor_id,
        mentee_id,
        scheduled_at: now + offset,
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

fn message(sender_id: Uuid, receiver_id: Uuid, content: &str) -> Message {
    let now = Utc::now();
    Message {
        id: Uuid::new_v4(),
        sender_id,
        receiver_id,
        content: content.to_string(),
        read: false,
        read_at: None,
        created_at: now,
        updated_at: now,
    }
}

#[tokio::test]
async fn users_and_auth_sessions() {
    let Some(db) = test_db().await else { return };
    db.ping().await.unwrap();

    let created = user(&db, Role::Mentee).await;
    assert_eq!(db.get_user(created.id).await.unwrap().email, created.email);

    let err = db
        .create_user(NewUser {
            name: "Duplicate".into(),
            email: created.email.clone(),
            hashed_password: "hash".into(),
            role: Role::Mentor,
            country: "Kenya".into(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, PortError::Conflict(_)));

    let credentials = db.get_user_credentials(&created.email).await.unwrap();
    assert_eq!(credentials.hashed_password, "hash");
    assert!(matches!(
        db.get_user_credentials("nobody@example.com").await,
        Err(PortError::NotFound(_))
    ));

    let updated = db
        .update_user(
            created.id,
            UserUpdate {
                name: Some("Renamed".into()),
                ..UserUpdate::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.name, "Renamed");
    assert_eq!(updated.country, "Kenya");

    db.set_user_role(created.id, Role::Both).await.unwrap();
    let users = db.get_users(&[created.id, Uuid::new_v4()]).await.unwrap();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0].role, Role::Both);
    assert!(matches!(
        db.get_user(Uuid::new_v4()).await,
        Err(PortError::NotFound(_))
    ));

    let live = Uuid::new_v4().to_string();
    db.create_auth_session(AuthSession {
        id: live.clone(),
        user_id: created.id,
        expires_at: Utc::now() + Duration::days(1),
    })
    .await
    .unwrap();
    assert_eq!(db.validate_auth_session(&live).await.unwrap(), created.id);

    let expired = Uuid::new_v4().to_string();
    db.create_auth_session(AuthSession {
        id: expired.clone(),
        user_id: created.id,
        expires_at: Utc::now() - Duration::minutes(1),
    })
    .await
    .unwrap();
    assert!(matches!(
        db.validate_auth_session(&expired).await,
        Err(PortError::Unauthorized)
    ));

    db.delete_auth_session(&live).await.unwrap();
    assert!(matches!(
        db.validate_auth_session(&live).await,
        Err(PortError::Unauthorized)
    ));
}

#[tokio::test]
async fn mentor_and_mentee_profiles() {
    let Some(db) = test_db().await else { return };
    let industry = format!("Industry {}", Uuid::new_v4());

    let first = user(&db, Role::Mentor).await;
    let second = user(&db, Role::Mentor).await;
    db.create_mentor_profile(mentor_profile(first.id, &industry))
        .await
        .unwrap();
    db.create_mentor_profile(mentor_profile(second.id, &industry))
        .await
        .unwrap();
    assert!(matches!(
        db.create_mentor_profile(mentor_profile(first.id, &industry))
            .await,
        Err(PortError::Conflict(_))
    ));

    let mut rated = db.get_mentor_profile(second.id).await.unwrap().unwrap();
    rated.record_completed_session(4);
    db.save_mentor_profile(&rated).await.unwrap();

    let filter = MentorFilter {
        skills: vec!["Design".into()],
        industry: Some(industry.clone()),
        ..MentorFilter::default()
    };
    let (mentors, total) = db.list_mentors(&filter).await.unwrap();
    assert_eq!(total, 2);
    assert_eq!(mentors[0].user_id, second.id);
    assert_eq!(mentors[0].rating, Some(4.0));
    assert_eq!(mentors[1].rating, None);

    let rated_only = MentorFilter {
        min_rating: Some(3.5),
        ..filter
    };
    let (mentors, total) = db.list_mentors(&rated_only).await.unwrap();
    assert_eq!(total, 1);
    assert_eq!(mentors[0].availability.timezone, "Africa/Nairobi");

    let mentee = user(&db, Role::Mentee).await;
    let now = Utc::now();
    let mut profile = db
        .create_mentee_profile(MenteeProfile {
            user_id: mentee.id,
            bio: None,
            interests: vec!["Tech".into()],
            goals: vec!["Land a first job".into()],
            career_stage: CareerStage::EarlyCareer,
            education: Some("BSc Computer Science".into()),
            current_role: Some("Junior Developer".into()),
            linkedin_url: None,
            preferred_mentor_traits: vec![],
            is_active: true,
            created_at: now,
            updated_at: now,
        })
        .await
        .unwrap();
    assert_eq!(profile.current_role.as_deref(), Some("Junior Developer"));

    profile.current_role = Some("Backend Developer".into());
    db.save_mentee_profile(&profile).await.unwrap();
    let stored = db.get_mentee_profile(mentee.id).await.unwrap().unwrap();
    assert_eq!(stored.current_role.as_deref(), Some("Backend Developer"));
    assert_eq!(stored.career_stage, CareerStage::EarlyCareer);
    assert!(db.get_mentee_profile(first.id).await.unwrap().is_none());
}

#[tokio::test]
async fn mentorship_requests() {
    let Some(db) = test_db().await else { return };
    let mentor = user(&db, Role::Mentor).await;
    let mentee = user(&db, Role::Mentee).await;
    let now = Utc::now();
    let request = MentorshipRequest {
        id: Uuid::new_v4(),
        mentor_id: mentor.id,
        mentee_id: mentee.id,
        status: RequestStatus::Pending,
        message: Some("Hello".into()),
        request_date: now,
        response_date: None,
        created_at: now,
        updated_at: now,
    };

    let created = db.create_request(request.clone()).await.unwrap();
    assert!(matches!(
        db.create_request(MentorshipRequest {
            id: Uuid::new_v4(),
            ..request.clone()
        })
        .await,
        Err(PortError::Conflict(_))
    ));
    assert_eq!(db.get_request(created.id).await.unwrap().message.as_deref(), Some("Hello"));

    let received = RequestQuery {
        user_id: mentor.id,
        direction: RequestDirection::Received,
        status: Some(RequestStatus::Pending),
    };
    assert_eq!(db.list_requests(&received).await.unwrap().len(), 1);
    let sent_by_mentor = RequestQuery {
        direction: RequestDirection::Sent,
        ..received.clone()
    };
    assert!(db.list_requests(&sent_by_mentor).await.unwrap().is_empty());

    let accepted = db
        .update_request_status(created.id, RequestStatus::Accepted, Utc::now())
        .await
        .unwrap();
    assert_eq!(accepted.status, RequestStatus::Accepted);
    assert!(accepted.response_date.is_some());

    db.delete_request(created.id).await.unwrap();
    assert!(matches!(
        db.get_request(created.id).await,
        Err(PortError::NotFound(_))
    ));
    assert!(matches!(
        db.delete_request(created.id).await,
        Err(PortError::NotFound(_))
    ));
}

#[tokio::test]
async fn sessions_upcoming_and_completed() {
    let Some(db) = test_db().await else { return };
    let mentor = user(&db, Role::Mentor).await;
    let mentee = user(&db, Role::Mentee).await;

    let later = db
        .create_session(session(mentor.id, mentee.id, Duration::days(3)))
        .await
        .unwrap();
    let sooner = db
        .create_session(session(mentor.id, mentee.id, Duration::days(1)))
        .await
        .unwrap();
    db.create_session(session(mentor.id, mentee.id, -Duration::days(1)))
        .await
        .unwrap();

    let upcoming = db
        .list_sessions(&SessionQuery {
            user_id: mentee.id,
            status: None,
            upcoming_from: Some(Utc::now()),
        })
        .await
        .unwrap();
    let ids: Vec<Uuid> = upcoming.iter().map(|s| s.id).collect();
    assert_eq!(ids, vec![sooner.id, later.id]);

    let mut completed = db.get_session(later.id).await.unwrap();
    completed.status = SessionStatus::Completed;
    completed.rating = Some(5);
    completed.feedback = Some("Great".into());
    completed.completed_at = Some(Utc::now());
    db.save_session(&completed).await.unwrap();

    let done = db
        .list_sessions(&SessionQuery {
            user_id: mentor.id,
            status: Some(SessionStatus::Completed),
            upcoming_from: None,
        })
        .await
        .unwrap();
    assert_eq!(done.len(), 1);
    assert_eq!(done[0].rating, Some(5));

    let all = db
        .list_sessions(&SessionQuery {
            user_id: mentor.id,
            status: None,
            upcoming_from: None,
        })
        .await
        .unwrap();
    assert_eq!(all.len(), 3);
    assert!(all.windows(2).all(|w| w[0].scheduled_at >= w[1].scheduled_at));

    assert!(matches!(
        db.get_session(Uuid::new_v4()).await,
        Err(PortError::NotFound(_))
    ));
}

#[tokio::test]
async fn messages_and_conversations() {
    let Some(db) = test_db().await else { return };
    let me = user(&db, Role::Mentor).await;
    let first = user(&db, Role::Mentee).await;
    let second = user(&db, Role::Mentee).await;

    db.create_message(message(first.id, me.id, "Hi")).await.unwrap();
    db.create_message(message(me.id, first.id, "Hello back")).await.unwrap();
    db.create_message(message(second.id, me.id, "Question")).await.unwrap();
    db.create_message(message(second.id, me.id, "Another question"))
        .await
        .unwrap();

    assert!(matches!(
        db.create_message(message(me.id, Uuid::new_v4(), "Nobody")).await,
        Err(PortError::NotFound(_))
    ));

    let conversations = db.list_conversations(me.id).await.unwrap();
    assert_eq!(conversations.len(), 2);
    assert_eq!(conversations[0].other_user_id, second.id);
    assert_eq!(conversations[0].unread_count, 2);
    assert_eq!(conversations[0].last_message.content, "Another question");
    assert_eq!(conversations[1].other_user_id, first.id);
    assert_eq!(conversations[1].unread_count, 1);

    let thread = db.get_messages_between(me.id, first.id).await.unwrap();
    let contents: Vec<&str> = thread.iter().map(|m| m.content.as_str()).collect();
    assert_eq!(contents, vec!["Hi", "Hello back"]);

    assert_eq!(
        db.mark_messages_read(second.id, me.id, Utc::now()).await.unwrap(),
        2
    );
    assert_eq!(
        db.mark_messages_read(second.id, me.id, Utc::now()).await.unwrap(),
        0
    );
    let conversations = db.list_conversations(me.id).await.unwrap();
    assert_eq!(conversations[0].unread_count, 0);
}
