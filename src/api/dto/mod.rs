pub mod liked_descriptions;
pub mod messages;
pub mod user_session;
