pub mod alt_text;
pub mod auth;
pub mod health;
pub mod liked_descriptions;
pub mod user_session;
