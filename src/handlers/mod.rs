//! HTTP request handlers (route handlers).
//!
//! Each handler is an async function that receives extracted request data,
//! enforces authorization, delegates to a service, and returns JSON.

/// Backup and restore endpoints
pub mod admin;
/// Fund allocation endpoints
pub mod allocations;
/// Login and password endpoints
pub mod auth;
/// Branch management endpoints
pub mod branches;
/// Employee management endpoints
pub mod employees;
/// Liveness endpoint
pub mod health;
/// Notification endpoints
pub mod notifications;
/// Reporting endpoints
pub mod reports;
/// Transfer endpoints
pub mod transactions;
