/*
 * Responsibility
 * - Request extractors shared by handlers
 * - auth_ctx: authenticated caller placed by middleware::auth::access
 * - json: JSON body whose rejections render as AppError
 */
pub mod auth_ctx;
pub mod json;

pub use auth_ctx::{AuthCtx, AuthCtxExtractor};
pub use json::ApiJson;
