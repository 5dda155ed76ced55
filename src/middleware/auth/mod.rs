/*
 * Responsibility
 * - Authentication middleware for the protected routes
 * - access: bearer token -> VerifiedIdentity -> users row -> AuthCtx in request extensions
 */
pub mod access;
