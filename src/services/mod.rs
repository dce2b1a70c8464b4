//! Business logic services.
//!
//! Services contain core business logic separated from HTTP handlers:
//! database transactions, validation, and the fund ledger rules.

pub mod auth_service;
pub mod backup_service;
pub mod ledger_service;
pub mod notification_service;
pub mod report_service;
pub mod transaction_service;
