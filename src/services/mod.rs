pub mod alt_text;
pub mod auth;
pub mod http_client;
pub mod id_codec;
pub mod inference;
pub mod users;
