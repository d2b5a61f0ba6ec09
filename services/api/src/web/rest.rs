//! services/api/src/web/rest.rs
//!
//! The master definition for the OpenAPI specification. Every handler exposed by
//! the router is listed here so the Swagger UI and the `openapi` binary agree.

use utoipa::OpenApi;

use crate::error::ErrorBody;
use crate::web::{auth, health, mentees, mentors, messages, requests, sessions, users, views};

#[derive(OpenApi)]
#[openapi(
    paths(
        auth::signup_handler,
        auth::login_handler,
        auth::logout_handler,
        mentors::list_mentors_handler,
        mentors::create_mentor_profile_handler,
        mentees::create_mentee_profile_handler,
        users::get_own_profile_handler,
        users::update_own_profile_handler,
        users::get_user_handler,
        users::update_user_handler,
        requests::list_requests_handler,
        requests::create_request_handler,
        requests::update_request_handler,
        requests::delete_request_handler,
        sessions::list_sessions_handler,
        sessions::create_session_handler,
        sessions::get_session_handler,
        sessions::update_session_handler,
        sessions::cancel_session_handler,
        messages::list_messages_handler,
        messages::send_message_handler,
        health::health_handler,
    ),
    components(
        schemas(
            ErrorBody,
            views::UserView,
            views::UserSummary,
            views::AvailabilityBody,
            views::MentorProfileView,
            views::MenteeProfileView,
            views::RequestView,
            views::SessionView,
            views::MessageView,
            auth::SignupRequest,
            auth::LoginRequest,
            auth::AuthResponse,
            auth::MessageResponse,
            mentors::MentorListing,
            mentors::Pagination,
            mentors::ListMentorsResponse,
            mentors::CreateMentorProfileRequest,
            mentors::CreateMentorProfileResponse,
            mentees::CreateMenteeProfileRequest,
            mentees::CreateMenteeProfileResponse,
            users::OwnProfileResponse,
            users::UpdateOwnProfileRequest,
            users::UpdateOwnProfileResponse,
            users::PublicProfile,
            users::PublicUserResponse,
            users::UpdateUserRequest,
            requests::ListRequestsResponse,
            requests::CreateRequestBody,
            requests::UpdateRequestBody,
            requests::RequestResponse,
            sessions::ListSessionsResponse,
            sessions::CreateSessionBody,
            sessions::UpdateSessionBody,
            sessions::SessionResponse,
            sessions::SessionWithMessageResponse,
            messages::ConversationsResponse,
            messages::ConversationView,
            messages::LastMessageView,
            messages::MessagesResponse,
            messages::SendMessageBody,
            messages::SendMessageResponse,
            health::Health,
        )
    ),
    tags(
        (name = "AfriLead API", description = "Mentorship matching: profiles, requests, sessions and messages."),
        (name = "health", description = "Service health checks.")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_every_route() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/auth/signup",
            "/api/mentors",
            "/api/mentees",
            "/api/users/profile",
            "/api/users/{id}",
            "/api/mentorship-requests/{id}",
            "/api/sessions/{id}",
            "/api/messages",
            "/health",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {}", path);
        }
    }
}
