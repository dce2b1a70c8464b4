//! Branch data models and API request/response types.
//!
//! This module defines:
//! - `Branch`: database entity for a physical office
//! - `CreateBranchRequest` / `UpdateBranchRequest`: request bodies
//! - `BranchResponse`: response body returned to clients

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Represents a branch record from the database.
///
/// # Balance Storage
///
/// Balances are integer minor units to avoid floating-point drift:
/// whole pounds for SYP, cents for USD. Both are CHECKed non-negative by
/// the database. Balances are mutated only by the ledger service, together
/// with a `branch_funds` row in the same database transaction.
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct Branch {
    /// Unique identifier for this branch
    pub id: Uuid,

    /// Human-readable branch name (unique across the network)
    pub name: String,

    /// City / address line shown in the client
    pub location: String,

    /// SYP balance in whole pounds
    pub balance_syp: i64,

    /// USD balance in cents
    pub balance_usd_cents: i64,

    /// Tax rate applied to transfers created at this branch, in basis
    /// points (250 = 2.5%)
    pub tax_rate_bp: i32,

    /// Timestamp when the branch was created
    pub created_at: DateTime<Utc>,

    /// Timestamp of the last balance or detail update
    pub updated_at: DateTime<Utc>,
}

/// Request body for creating a new branch.
///
/// Balances always start at zero; funds arrive only through allocation
/// events so the ledger stays complete.
///
/// # JSON Example
///
/// ```json
/// {
///   "name": "Damascus Central",
///   "location": "Damascus",
///   "tax_rate_bp": 250
/// }
/// ```
#[derive(Debug, Deserialize)]
pub struct CreateBranchRequest {
    pub name: String,

    #[serde(default)]
    pub location: String,

    /// Tax rate in basis points, defaults to 0
    #[serde(default)]
    pub tax_rate_bp: i32,
}

/// Request body for updating branch details.
///
/// Only details are updatable here; balances move exclusively through the
/// funds endpoints.
#[derive(Debug, Deserialize)]
pub struct UpdateBranchRequest {
    pub name: String,

    #[serde(default)]
    pub location: String,

    pub tax_rate_bp: i32,
}

/// Response body for branch endpoints.
#[derive(Debug, Serialize)]
pub struct BranchResponse {
    pub id: Uuid,
    pub name: String,
    pub location: String,
    pub balance_syp: i64,
    pub balance_usd_cents: i64,
    pub tax_rate_bp: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Branch> for BranchResponse {
    fn from(branch: Branch) -> Self {
        Self {
            id: branch.id,
            name: branch.name,
            location: branch.location,
            balance_syp: branch.balance_syp,
            balance_usd_cents: branch.balance_usd_cents,
            tax_rate_bp: branch.tax_rate_bp,
            created_at: branch.created_at,
            updated_at: branch.updated_at,
        }
    }
}
