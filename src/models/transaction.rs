//! Transfer transaction models and API request/response types.
//!
//! A transaction is a money transfer handed in at an origin branch and paid
//! out at a destination branch. The tax owed on the transfer is computed
//! server-side from the origin branch's rate at creation time and frozen on
//! the row, so later rate changes never rewrite history.

use super::types::{Currency, TransferStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Represents a transaction record from the database.
///
/// # Invariants (enforced by CHECK constraints and the service layer)
///
/// - `tax_amount` is `base_amount * tax_rate_bp / 10_000`, truncated
/// - `amount = base_amount + tax_amount`
/// - origin and destination branches differ
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct Transaction {
    /// Unique identifier for this transaction
    pub id: Uuid,

    /// Short human-readable reference printed on the receipt
    pub reference: String,

    pub sender_name: String,
    pub sender_phone: String,
    pub receiver_name: String,
    pub receiver_phone: String,

    /// Branch where the sender handed in the money
    pub from_branch_id: Uuid,

    /// Branch where the receiver collects it
    pub to_branch_id: Uuid,

    /// Employee who keyed the transfer in
    pub created_by: Uuid,

    pub currency: Currency,

    /// Principal in minor units
    pub base_amount: i64,

    /// Origin branch tax rate at creation time, basis points
    pub tax_rate_bp: i32,

    /// Tax collected on top of the principal, minor units
    pub tax_amount: i64,

    /// Total the sender paid: `base_amount + tax_amount`
    pub amount: i64,

    pub status: TransferStatus,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request body for `POST /api/v1/transactions`.
///
/// `from_branch_id` is taken from the caller's own branch; only a director
/// (who has no branch) must name it explicitly.
///
/// # JSON Example
///
/// ```json
/// {
///   "sender_name": "Samir Khoury",
///   "sender_phone": "+963-11-555-0101",
///   "receiver_name": "Rana Khoury",
///   "receiver_phone": "+963-21-555-0199",
///   "to_branch_id": "660e8400-e29b-41d4-a716-446655440001",
///   "currency": "usd",
///   "base_amount": 50000
/// }
/// ```
#[derive(Debug, Deserialize)]
pub struct CreateTransferRequest {
    pub sender_name: String,

    #[serde(default)]
    pub sender_phone: String,

    pub receiver_name: String,

    #[serde(default)]
    pub receiver_phone: String,

    /// Origin branch override, used by director callers
    pub from_branch_id: Option<Uuid>,

    pub to_branch_id: Uuid,

    pub currency: Currency,

    /// Principal in minor units; tax is added on top server-side
    pub base_amount: i64,
}

/// Query parameters for transaction listings and the transactions report.
#[derive(Debug, Default, Deserialize)]
pub struct TransactionFilter {
    /// Match transactions where this branch is origin or destination
    pub branch_id: Option<Uuid>,
    pub status: Option<TransferStatus>,
    /// Inclusive lower bound on creation time
    pub from: Option<DateTime<Utc>>,
    /// Exclusive upper bound on creation time
    pub to: Option<DateTime<Utc>>,
}

/// Response body for transaction endpoints.
#[derive(Debug, Serialize)]
pub struct TransactionResponse {
    pub id: Uuid,
    pub reference: String,
    pub sender_name: String,
    pub sender_phone: String,
    pub receiver_name: String,
    pub receiver_phone: String,
    pub from_branch_id: Uuid,
    pub to_branch_id: Uuid,
    pub created_by: Uuid,
    pub currency: Currency,
    pub base_amount: i64,
    pub tax_rate_bp: i32,
    pub tax_amount: i64,
    pub amount: i64,
    pub status: TransferStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Transaction> for TransactionResponse {
    fn from(t: Transaction) -> Self {
        Self {
            id: t.id,
            reference: t.reference,
            sender_name: t.sender_name,
            sender_phone: t.sender_phone,
            receiver_name: t.receiver_name,
            receiver_phone: t.receiver_phone,
            from_branch_id: t.from_branch_id,
            to_branch_id: t.to_branch_id,
            created_by: t.created_by,
            currency: t.currency,
            base_amount: t.base_amount,
            tax_rate_bp: t.tax_rate_bp,
            tax_amount: t.tax_amount,
            amount: t.amount,
            status: t.status,
            created_at: t.created_at,
            updated_at: t.updated_at,
        }
    }
}
