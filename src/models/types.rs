//! Shared database enums.
//!
//! These map to the Postgres enum types created by the initial migration.
//! Keeping them as Rust enums (rather than free-form strings) means an
//! unknown role or status can never enter the system through a request body.

use serde::{Deserialize, Serialize};

/// Currency a balance, ledger entry, or transfer is denominated in.
///
/// Amounts are integer minor units: whole pounds for SYP, cents for USD.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, sqlx::Type, Serialize, Deserialize)]
#[sqlx(type_name = "currency_code", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Currency {
    Syp,
    Usd,
}

impl Currency {
    /// Name of the branch balance column holding this currency.
    ///
    /// Used to build UPDATE statements in the ledger service; never derived
    /// from client input beyond this enum, so it cannot inject SQL.
    pub fn balance_column(self) -> &'static str {
        match self {
            Currency::Syp => "balance_syp",
            Currency::Usd => "balance_usd_cents",
        }
    }
}

/// Role attached to a user account.
///
/// - `Director` runs the whole network: branch CRUD, staff everywhere,
///   fund allocation, backup/restore.
/// - `BranchManager` manages staff and views reports for one branch.
/// - `Employee` creates and settles transfers at their branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type, Serialize, Deserialize)]
#[sqlx(type_name = "user_role", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Director,
    BranchManager,
    Employee,
}

/// Type tag on a branch fund ledger row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type, Serialize, Deserialize)]
#[sqlx(type_name = "fund_entry_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum FundEntryType {
    /// Money added to the branch balance.
    Allocation,
    /// Money removed from the branch balance.
    Deduction,
    /// Money returned to a sender after a cancellation or a reversal.
    Refund,
}

/// Lifecycle status of a transfer transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type, Serialize, Deserialize)]
#[sqlx(type_name = "transfer_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TransferStatus {
    /// Created at the origin branch, not yet paid out.
    Pending,
    /// Paid out to the receiver at the destination branch.
    Completed,
    /// Cancelled at the origin branch; the sender was refunded.
    Cancelled,
}

impl TransferStatus {
    /// Whether a transition from `self` to `to` is legal.
    ///
    /// Only `pending` admits transitions; completed and cancelled are
    /// terminal.
    pub fn can_transition_to(self, to: TransferStatus) -> bool {
        matches!(
            (self, to),
            (TransferStatus::Pending, TransferStatus::Completed)
                | (TransferStatus::Pending, TransferStatus::Cancelled)
        )
    }

    /// Lowercase wire name, used in error messages.
    pub fn as_str(self) -> &'static str {
        match self {
            TransferStatus::Pending => "pending",
            TransferStatus::Completed => "completed",
            TransferStatus::Cancelled => "cancelled",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_can_complete_or_cancel() {
        assert!(TransferStatus::Pending.can_transition_to(TransferStatus::Completed));
        assert!(TransferStatus::Pending.can_transition_to(TransferStatus::Cancelled));
    }

    #[test]
    fn terminal_states_admit_nothing() {
        for terminal in [TransferStatus::Completed, TransferStatus::Cancelled] {
            for to in [
                TransferStatus::Pending,
                TransferStatus::Completed,
                TransferStatus::Cancelled,
            ] {
                assert!(!terminal.can_transition_to(to));
            }
        }
    }

    #[test]
    fn self_transition_is_rejected() {
        assert!(!TransferStatus::Pending.can_transition_to(TransferStatus::Pending));
    }

    #[test]
    fn currency_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Currency::Usd).unwrap(), "\"usd\"");
        assert_eq!(
            serde_json::from_str::<Currency>("\"syp\"").unwrap(),
            Currency::Syp
        );
    }

    #[test]
    fn role_uses_snake_case() {
        assert_eq!(
            serde_json::to_string(&UserRole::BranchManager).unwrap(),
            "\"branch_manager\""
        );
    }
}
