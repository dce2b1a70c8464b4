//! Branch fund ledger models and allocation request/response types.
//!
//! Every change to a branch balance is recorded as a `BranchFund` row. A
//! single allocation action from the client may carry a SYP part and a USD
//! part; the resulting rows share an `event_id` so the whole action can be
//! reversed atomically later.

use super::types::{Currency, FundEntryType};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Represents a branch fund ledger row from the database.
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct BranchFund {
    /// Unique identifier for this ledger row
    pub id: Uuid,

    /// Groups the rows written by one allocation action
    pub event_id: Uuid,

    /// Branch whose balance this row adjusted
    pub branch_id: Uuid,

    /// What kind of adjustment this was
    pub entry_type: FundEntryType,

    /// Currency of the adjustment
    pub currency: Currency,

    /// Magnitude in minor units; always positive, the sign is implied by
    /// `entry_type`
    pub amount: i64,

    /// Free-text note entered by the operator
    pub note: Option<String>,

    /// User who performed the action; NULL for rows written by automated
    /// reversals of deleted users' events
    pub created_by: Option<Uuid>,

    /// Transfer this row belongs to; NULL for operator allocation actions.
    /// Linked rows are part of that transfer's history and cannot be
    /// reversed through the allocations endpoint.
    pub transaction_id: Option<Uuid>,

    pub created_at: DateTime<Utc>,
}

/// Direction of one currency part of an allocation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FundDirection {
    /// Add to the branch balance
    Allocate,
    /// Remove from the branch balance
    Deduct,
}

/// One currency part of an allocation request.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct FundChange {
    pub direction: FundDirection,

    /// Amount in minor units; validated against the per-currency range
    pub amount: i64,
}

/// Request body for `POST /api/v1/branches/{id}/allocations`.
///
/// At least one of `syp` / `usd` must be present.
///
/// # JSON Example
///
/// ```json
/// {
///   "syp": { "direction": "allocate", "amount": 5000000 },
///   "usd": { "direction": "deduct", "amount": 25000 },
///   "note": "weekly float adjustment"
/// }
/// ```
#[derive(Debug, Deserialize)]
pub struct AllocateFundsRequest {
    pub syp: Option<FundChange>,
    pub usd: Option<FundChange>,
    pub note: Option<String>,
}

/// Response body for a completed allocation action.
///
/// Carries the ledger rows written plus the branch balances after commit,
/// so the client can refresh its display without a second round trip.
#[derive(Debug, Serialize)]
pub struct AllocationEventResponse {
    pub event_id: Uuid,
    pub entries: Vec<BranchFund>,
    pub balance_syp: i64,
    pub balance_usd_cents: i64,
}
