pub mod conversations;
pub mod domain;
pub mod ports;
pub mod validation;

pub use domain::{
    Availability, AuthSession, CareerStage, Conversation, MenteeProfile, MentorFilter,
    MentorProfile, MentorshipRequest, Message, NewUser, RequestDirection, RequestQuery,
    RequestStatus, Role, Session, SessionQuery, SessionStatus, User, UserCredentials, UserUpdate,
};
pub use ports::{DatabaseService, PortError, PortResult};
pub use validation::ValidationError;
