pub mod error;
pub mod liked_description_repo;
#[cfg(test)]
pub mod memory;
pub mod user_repo;

pub use liked_description_repo::{LikedDescriptionStore, PgLikedDescriptionRepo};
pub use user_repo::{PgUserRepo, UserStore};
