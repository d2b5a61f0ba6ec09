//! crates/afrilead_core/src/validation.rs
//!
//! Field-level rules for every entity. Each check returns the message that is
//! shown to the client verbatim.

use regex::Regex;
use std::sync::OnceLock;

use crate::domain::{MenteeProfile, MentorProfile, Session};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct ValidationError(pub String);

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

pub type ValidationResult = Result<(), ValidationError>;

pub const MIN_PASSWORD_LEN: usize = 8;
pub const MAX_MESSAGE_LEN: usize = 2000;
pub const MAX_REQUEST_MESSAGE_LEN: usize = 500;

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| {
        // ASCII word characters only; `\w` alone would admit any Unicode letter.
        Regex::new(r"^(?-u:\w)+([\.-]?(?-u:\w)+)*@(?-u:\w)+([\.-]?(?-u:\w)+)*(\.(?-u:\w){2,3})+$")
            .expect("valid email regex")
    })
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

fn ensure(condition: bool, message: &str) -> ValidationResult {
    if condition {
        Ok(())
    } else {
        Err(ValidationError::new(message))
    }
}

fn max_len(value: Option<&str>, max: usize, message: &str) -> ValidationResult {
    ensure(value.map_or(true, |v| char_len(v) <= max), message)
}

/// Lower-cases and trims an email address before it is stored or looked up.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub fn validate_email(email: &str) -> ValidationResult {
    ensure(email_regex().is_match(email), "Invalid email format")
}

pub fn validate_password(password: &str) -> ValidationResult {
    ensure(
        char_len(password) >= MIN_PASSWORD_LEN,
        "Password must be at least 8 characters",
    )
}

pub fn validate_name(name: &str) -> ValidationResult {
    ensure(!name.trim().is_empty(), "Please provide a name")?;
    ensure(
        char_len(name) <= 100,
        "Name cannot be more than 100 characters",
    )
}

pub fn validate_country(country: &str) -> ValidationResult {
    ensure(!country.trim().is_empty(), "Please provide a country")
}

/// Empty strings are treated as "not provided".
pub fn validate_linkedin_url(link: Option<&str>) -> ValidationResult {
    let Some(link) = link.filter(|l| !l.is_empty()) else {
        return Ok(());
    };
    url::Url::parse(link).map_err(|_| ValidationError::new("Invalid LinkedIn URL"))?;
    ensure(link.contains("linkedin.com"), "Must be a LinkedIn URL")
}

pub fn validate_mentor_profile(profile: &MentorProfile) -> ValidationResult {
    let bio_len = char_len(&profile.bio);
    ensure(bio_len >= 50, "Bio must be at least 50 characters")?;
    ensure(bio_len <= 500, "Bio cannot exceed 500 characters")?;

    let title_len = char_len(&profile.title);
    ensure(title_len >= 2, "Job title is required")?;
    ensure(title_len <= 100, "Title is too long")?;

    max_len(profile.company.as_deref(), 100, "Company name is too long")?;
    ensure(
        char_len(&profile.experience) >= 20,
        "Please provide more details about your experience",
    )?;

    ensure(!profile.skills.is_empty(), "Please select at least one skill")?;
    ensure(profile.skills.len() <= 20, "Maximum 20 skills allowed")?;
    ensure(
        !profile.expertise.is_empty(),
        "Please select at least one area of expertise",
    )?;
    ensure(
        profile.expertise.len() <= 10,
        "Maximum 10 areas of expertise allowed",
    )?;

    ensure(
        profile.years_of_experience <= 70,
        "Please enter a valid number of years",
    )?;
    ensure(
        char_len(&profile.industry) >= 2,
        "Please select an industry",
    )?;
    validate_linkedin_url(profile.linkedin_url.as_deref())?;

    ensure(
        profile.availability.hours >= 1,
        "Availability must be at least 1 hour per month",
    )?;
    ensure(
        profile.availability.hours <= 40,
        "Availability cannot exceed 40 hours per month",
    )?;

    if let Some(rating) = profile.rating {
        ensure((0.0..=5.0).contains(&rating), "Rating must be between 0 and 5")?;
    }
    Ok(())
}

pub fn validate_mentee_profile(profile: &MenteeProfile) -> ValidationResult {
    max_len(profile.bio.as_deref(), 500, "Bio cannot exceed 500 characters")?;

    ensure(
        !profile.interests.is_empty(),
        "Please select at least one interest",
    )?;
    ensure(profile.interests.len() <= 15, "Maximum 15 interests allowed")?;
    ensure(!profile.goals.is_empty(), "Please select at least one goal")?;
    ensure(profile.goals.len() <= 10, "Maximum 10 goals allowed")?;

    max_len(profile.education.as_deref(), 200, "Education is too long")?;
    max_len(profile.current_role.as_deref(), 100, "Current role is too long")?;
    validate_linkedin_url(profile.linkedin_url.as_deref())?;
    ensure(
        profile.preferred_mentor_traits.len() <= 10,
        "Maximum 10 traits allowed",
    )
}

pub fn validate_session(session: &Session) -> ValidationResult {
    ensure(
        session.duration >= 15,
        "Session must be at least 15 minutes",
    )?;
    ensure(session.duration <= 180, "Session cannot exceed 3 hours")?;

    ensure(
        !session.topic.trim().is_empty(),
        "Please provide a session topic",
    )?;
    ensure(
        char_len(&session.topic) <= 200,
        "Topic cannot be more than 200 characters",
    )?;
    max_len(
        session.notes.as_deref(),
        1000,
        "Notes cannot be more than 1000 characters",
    )?;
    max_len(
        session.feedback.as_deref(),
        1000,
        "Feedback cannot be more than 1000 characters",
    )?;
    if let Some(rating) = session.rating {
        validate_session_rating(rating as i64)?;
    }
    Ok(())
}

pub fn validate_session_rating(rating: i64) -> ValidationResult {
    ensure((1..=5).contains(&rating), "Rating must be between 1 and 5")
}

pub fn validate_request_message(message: Option<&str>) -> ValidationResult {
    max_len(
        message,
        MAX_REQUEST_MESSAGE_LEN,
        "Message cannot be more than 500 characters",
    )
}

pub fn validate_message_content(content: &str) -> ValidationResult {
    ensure(
        char_len(content) <= MAX_MESSAGE_LEN,
        "Message cannot exceed 2000 characters",
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Availability, CareerStage, SessionStatus};
    use chrono::Utc;
    use uuid::Uuid;

    fn mentor() -> MentorProfile {
        let now = Utc::now();
        MentorProfile {
            user_id: Uuid::new_v4(),
            bio: "I have spent a decade building payment systems across West Africa.".into(),
            title: "Staff Engineer".into(),
            company: Some("Paystack".into()),
            experience: "Ten years of backend and platform work.".into(),
            skills: vec!["Tech".into()],
            expertise: vec!["Payments".into()],
            years_of_experience: 10,
            industry: "Fintech".into(),
            linkedin_url: Some("https://www.linkedin.com/in/someone".into()),
            availability: Availability::default(),
            rating: None,
            total_sessions: 0,
            sessions_completed: 0,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    fn mentee() -> MenteeProfile {
        let now = Utc::now();
        MenteeProfile {
            user_id: Uuid::new_v4(),
            bio: None,
            interests: vec!["Tech".into()],
            goals: vec!["Learning".into()],
            career_stage: CareerStage::Student,
            education: None,
            current_role: None,
            linkedin_url: Some(String::new()),
            preferred_mentor_traits: Vec::new(),
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn email_format() {
        assert!(validate_email("ada@example.com").is_ok());
        assert!(validate_email("first.last@mail.example.ng").is_ok());
        assert!(validate_email("not-an-email").is_err());
        assert!(validate_email("a@b").is_err());
    }

    #[test]
    fn email_rejects_non_ascii_letters() {
        assert!(validate_email("josé@example.com").is_err());
        assert!(validate_email("ada@exämple.com").is_err());
        assert!(validate_email("ada@example.ком").is_err());
    }

    #[test]
    fn normalize_email_trims_and_lowercases() {
        assert_eq!(normalize_email(" Ada@Example.COM "), "ada@example.com");
    }

    #[test]
    fn password_needs_eight_chars() {
        assert_eq!(
            validate_password("short").unwrap_err().to_string(),
            "Password must be at least 8 characters"
        );
        assert!(validate_password("longenough").is_ok());
    }

    #[test]
    fn linkedin_url_rules() {
        assert!(validate_linkedin_url(None).is_ok());
        assert!(validate_linkedin_url(Some("")).is_ok());
        assert!(validate_linkedin_url(Some("linkedin.com/in/x")).is_err());
        assert_eq!(
            validate_linkedin_url(Some("https://github.com/x"))
                .unwrap_err()
                .to_string(),
            "Must be a LinkedIn URL"
        );
    }

    #[test]
    fn mentor_profile_rules() {
        assert!(validate_mentor_profile(&mentor()).is_ok());

        let mut short_bio = mentor();
        short_bio.bio = "Too short".into();
        assert_eq!(
            validate_mentor_profile(&short_bio).unwrap_err().to_string(),
            "Bio must be at least 50 characters"
        );

        let mut no_skills = mentor();
        no_skills.skills.clear();
        assert!(validate_mentor_profile(&no_skills).is_err());

        let mut overbooked = mentor();
        overbooked.availability.hours = 41;
        assert!(validate_mentor_profile(&overbooked).is_err());
    }

    #[test]
    fn mentee_profile_rules() {
        assert!(validate_mentee_profile(&mentee()).is_ok());

        let mut no_goals = mentee();
        no_goals.goals.clear();
        assert_eq!(
            validate_mentee_profile(&no_goals).unwrap_err().to_string(),
            "Please select at least one goal"
        );

        let mut too_many = mentee();
        too_many.interests = (0..16).map(|i| format!("interest {i}")).collect();
        assert!(validate_mentee_profile(&too_many).is_err());
    }

    #[test]
    fn session_duration_bounds() {
        let now = Utc::now();
        let mut session = Session {
            id: Uuid::new_v4(),
            mentor_id: Uuid::new_v4(),
            mentee_id: Uuid::new_v4(),
            scheduled_at: now,
            duration: 30,
            status: SessionStatus::Scheduled,
            topic: "Career planning".into(),
            notes: None,
            meeting_link: None,
            rating: None,
            feedback: None,
            completed_at: None,
            created_at: now,
            updated_at: now,
        };
        assert!(validate_session(&session).is_ok());

        session.duration = 10;
        assert!(validate_session(&session).is_err());
        session.duration = 181;
        assert!(validate_session(&session).is_err());
    }

    #[test]
    fn message_length() {
        assert!(validate_message_content(&"a".repeat(2000)).is_ok());
        assert!(validate_message_content(&"a".repeat(2001)).is_err());
        assert!(validate_request_message(Some(&"a".repeat(501))).is_err());
    }
}
