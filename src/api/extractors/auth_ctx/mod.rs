/*!
 * Authentication context extractor
 *
 * Responsibility:
 * - Hand the authenticated caller (AuthCtx) to handlers
 * - axum-specific code lives in core, the type in types
 */

mod core;
mod types;

pub use core::AuthCtxExtractor;
pub use types::AuthCtx;
