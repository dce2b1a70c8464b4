//! Data models representing database entities and API payload shapes.

/// Branch entity and CRUD payloads
pub mod branch;
/// Fund ledger entity and allocation payloads
pub mod branch_fund;
/// Notification entity
pub mod notification;
/// Report response shapes
pub mod report;
/// Transfer transaction entity and payloads
pub mod transaction;
/// Shared database enums
pub mod types;
/// User entity and auth/CRUD payloads
pub mod user;
