/*
 * Responsibility
 * - Router-level middleware, one `apply(...)` per concern
 * - app.rs decides the order; route modules only opt in to `auth`
 */
pub mod auth;
pub mod cors;
pub mod http;
pub mod security_headers;
