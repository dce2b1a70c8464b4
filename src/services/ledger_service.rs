//! Branch fund ledger - the only path that moves branch balances.
//!
//! Every balance change is a ledger write: the `branches` row update and the
//! `branch_funds` insert (or delete, for event reversal) commit in the same
//! database transaction, so the ledger always explains the balances.
//!
//! # Atomicity
//!
//! The branch row is locked with FOR UPDATE before any mutation. An
//! allocation action carrying both a SYP and a USD part either lands
//! entirely or not at all, and so does its reversal.

use crate::{
    db::DbPool,
    error::AppError,
    models::{
        branch::Branch,
        branch_fund::{AllocateFundsRequest, AllocationEventResponse, BranchFund, FundDirection},
        types::{Currency, FundEntryType},
    },
    services::notification_service,
};
use sqlx::PgConnection;
use uuid::Uuid;

/// Allocation bounds per currency, in minor units.
///
/// SYP moves in whole pounds, USD in cents. Anything outside these ranges
/// is a keying error, not a plausible float adjustment.
const SYP_MIN: i64 = 1_000;
const SYP_MAX: i64 = 500_000_000;
const USD_MIN_CENTS: i64 = 1_000;
const USD_MAX_CENTS: i64 = 100_000_000;

/// Allowed `[min, max]` allocation range for a currency.
pub fn allocation_bounds(currency: Currency) -> (i64, i64) {
    match currency {
        Currency::Syp => (SYP_MIN, SYP_MAX),
        Currency::Usd => (USD_MIN_CENTS, USD_MAX_CENTS),
    }
}

/// Reject amounts outside the per-currency allocation range.
pub fn validate_allocation_amount(currency: Currency, amount: i64) -> Result<(), AppError> {
    let (min, max) = allocation_bounds(currency);
    if amount < min || amount > max {
        return Err(AppError::AmountOutOfRange { amount, min, max });
    }
    Ok(())
}

/// Signed effect of a ledger entry on the branch balance.
///
/// Allocations flow in; deductions and refunds flow out. Row amounts stay
/// positive, the type carries the sign.
pub fn balance_delta(entry_type: FundEntryType, amount: i64) -> i64 {
    match entry_type {
        FundEntryType::Allocation => amount,
        FundEntryType::Deduction | FundEntryType::Refund => -amount,
    }
}

/// Apply one ledger entry inside an open database transaction.
///
/// Updates the branch balance column for the entry's currency and inserts
/// the `branch_funds` row. The caller must already hold a FOR UPDATE lock
/// on the branch row and have verified it exists.
///
/// # Errors
///
/// - `InsufficientBalance`: an outflow would drive the balance negative
/// - `Database`: any sqlx error
#[allow(clippy::too_many_arguments)]
pub(crate) async fn record_entry(
    conn: &mut PgConnection,
    event_id: Uuid,
    branch_id: Uuid,
    entry_type: FundEntryType,
    currency: Currency,
    amount: i64,
    note: Option<String>,
    created_by: Option<Uuid>,
    transaction_id: Option<Uuid>,
) -> Result<BranchFund, AppError> {
    let delta = balance_delta(entry_type, amount);
    let column = currency.balance_column();

    // The column name comes from the Currency enum, never from the client.
    // The WHERE guard keeps an outflow from racing past zero; the CHECK
    // constraint is the backstop.
    let updated = sqlx::query(&format!(
        "UPDATE branches
         SET {column} = {column} + $1, updated_at = NOW()
         WHERE id = $2 AND {column} + $1 >= 0"
    ))
    .bind(delta)
    .bind(branch_id)
    .execute(&mut *conn)
    .await?
    .rows_affected();

    if updated == 0 {
        return Err(AppError::InsufficientBalance);
    }

    let entry = sqlx::query_as::<_, BranchFund>(
        r#"
        INSERT INTO branch_funds (event_id, branch_id, entry_type, currency, amount, note,
                                  created_by, transaction_id)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING *
        "#,
    )
    .bind(event_id)
    .bind(branch_id)
    .bind(entry_type)
    .bind(currency)
    .bind(amount)
    .bind(note)
    .bind(created_by)
    .bind(transaction_id)
    .fetch_one(&mut *conn)
    .await?;

    Ok(entry)
}

/// Execute an allocation action against a branch.
///
/// # Process
///
/// 1. Validate each currency part against its range
/// 2. Lock the branch row
/// 3. Apply each part as a ledger entry (allocation or deduction)
/// 4. Notify the branch
/// 5. Commit, returning the rows written and the fresh balances
pub async fn allocate_funds(
    pool: &DbPool,
    branch_id: Uuid,
    request: AllocateFundsRequest,
    created_by: Uuid,
) -> Result<AllocationEventResponse, AppError> {
    let parts: Vec<(Currency, _)> = [
        (Currency::Syp, request.syp),
        (Currency::Usd, request.usd),
    ]
    .into_iter()
    .filter_map(|(currency, change)| change.map(|c| (currency, c)))
    .collect();

    if parts.is_empty() {
        return Err(AppError::InvalidRequest(
            "At least one of 'syp' or 'usd' must be provided".to_string(),
        ));
    }

    for (currency, change) in &parts {
        if change.amount <= 0 {
            return Err(AppError::InvalidRequest(
                "Amount must be positive".to_string(),
            ));
        }
        validate_allocation_amount(*currency, change.amount)?;
    }

    let mut tx = pool.begin().await?;

    let branch = sqlx::query_as::<_, Branch>("SELECT * FROM branches WHERE id = $1 FOR UPDATE")
        .bind(branch_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(AppError::BranchNotFound)?;

    let event_id = Uuid::new_v4();
    let mut entries = Vec::with_capacity(parts.len());

    for (currency, change) in parts {
        let entry_type = match change.direction {
            FundDirection::Allocate => FundEntryType::Allocation,
            FundDirection::Deduct => FundEntryType::Deduction,
        };

        let entry = record_entry(
            &mut tx,
            event_id,
            branch_id,
            entry_type,
            currency,
            change.amount,
            request.note.clone(),
            Some(created_by),
            None,
        )
        .await?;

        entries.push(entry);
    }

    notification_service::notify_branch(
        &mut tx,
        branch_id,
        None,
        format!("Fund balances of branch '{}' were adjusted", branch.name),
    )
    .await?;

    let (balance_syp, balance_usd_cents): (i64, i64) =
        sqlx::query_as("SELECT balance_syp, balance_usd_cents FROM branches WHERE id = $1")
            .bind(branch_id)
            .fetch_one(&mut *tx)
            .await?;

    tx.commit().await?;

    tracing::info!(%branch_id, %event_id, "fund allocation applied");

    Ok(AllocationEventResponse {
        event_id,
        entries,
        balance_syp,
        balance_usd_cents,
    })
}

/// List the fund ledger of a branch, newest first.
pub async fn list_branch_funds(
    pool: &DbPool,
    branch_id: Uuid,
) -> Result<Vec<BranchFund>, AppError> {
    let branch_exists: bool =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM branches WHERE id = $1)")
            .bind(branch_id)
            .fetch_one(pool)
            .await?;

    if !branch_exists {
        return Err(AppError::BranchNotFound);
    }

    let entries = sqlx::query_as::<_, BranchFund>(
        "SELECT * FROM branch_funds WHERE branch_id = $1 ORDER BY created_at DESC",
    )
    .bind(branch_id)
    .fetch_all(pool)
    .await?;

    Ok(entries)
}

/// Whether every row of an event was written by an operator allocation
/// action.
///
/// Rows written by the transfer lifecycle carry their transaction id;
/// removing one would detach a transfer's money movement from its status,
/// so such events are never reversible here.
pub fn is_operator_event(entries: &[BranchFund]) -> bool {
    entries.iter().all(|e| e.transaction_id.is_none())
}

/// Reverse a whole allocation event.
///
/// Deletes every row of the event and applies the opposite balance
/// adjustments inside one database transaction. The SYP part and the USD
/// part of an event can never be undone separately, and a failure on
/// either leaves both untouched.
///
/// Only operator-written events are reversible; ledger rows linked to a
/// transfer are that transaction's history (see [`is_operator_event`]).
pub async fn reverse_event(pool: &DbPool, event_id: Uuid) -> Result<(), AppError> {
    let mut tx = pool.begin().await?;

    let entries = sqlx::query_as::<_, BranchFund>(
        "SELECT * FROM branch_funds WHERE event_id = $1 ORDER BY created_at",
    )
    .bind(event_id)
    .fetch_all(&mut *tx)
    .await?;

    if entries.is_empty() {
        return Err(AppError::AllocationNotFound);
    }

    if !is_operator_event(&entries) {
        return Err(AppError::InvalidRequest(
            "Ledger entries written by a transfer cannot be reversed".to_string(),
        ));
    }

    // All rows of an event belong to one branch; lock it once.
    let branch_id = entries[0].branch_id;
    sqlx::query("SELECT id FROM branches WHERE id = $1 FOR UPDATE")
        .bind(branch_id)
        .fetch_one(&mut *tx)
        .await?;

    for entry in &entries {
        let column = entry.currency.balance_column();
        // Undo: apply the negated original delta.
        let delta = -balance_delta(entry.entry_type, entry.amount);

        let updated = sqlx::query(&format!(
            "UPDATE branches
             SET {column} = {column} + $1, updated_at = NOW()
             WHERE id = $2 AND {column} + $1 >= 0"
        ))
        .bind(delta)
        .bind(entry.branch_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if updated == 0 {
            // Allocation already spent; removing it would go negative.
            return Err(AppError::InsufficientBalance);
        }
    }

    sqlx::query("DELETE FROM branch_funds WHERE event_id = $1")
        .bind(event_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    tracing::info!(%event_id, %branch_id, "allocation event reversed");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_accept_range_endpoints() {
        assert!(validate_allocation_amount(Currency::Syp, SYP_MIN).is_ok());
        assert!(validate_allocation_amount(Currency::Syp, SYP_MAX).is_ok());
        assert!(validate_allocation_amount(Currency::Usd, USD_MIN_CENTS).is_ok());
        assert!(validate_allocation_amount(Currency::Usd, USD_MAX_CENTS).is_ok());
    }

    #[test]
    fn bounds_reject_outside_range() {
        assert!(matches!(
            validate_allocation_amount(Currency::Syp, SYP_MIN - 1),
            Err(AppError::AmountOutOfRange { min, max, .. }) if min == SYP_MIN && max == SYP_MAX
        ));
        assert!(matches!(
            validate_allocation_amount(Currency::Usd, USD_MAX_CENTS + 1),
            Err(AppError::AmountOutOfRange { .. })
        ));
    }

    #[test]
    fn allocations_flow_in_everything_else_out() {
        assert_eq!(balance_delta(FundEntryType::Allocation, 500), 500);
        assert_eq!(balance_delta(FundEntryType::Deduction, 500), -500);
        assert_eq!(balance_delta(FundEntryType::Refund, 500), -500);
    }

    fn fund_row(entry_type: FundEntryType, transaction_id: Option<Uuid>) -> BranchFund {
        BranchFund {
            id: Uuid::new_v4(),
            event_id: Uuid::new_v4(),
            branch_id: Uuid::new_v4(),
            entry_type,
            currency: Currency::Syp,
            amount: 10_000,
            note: None,
            created_by: Some(Uuid::new_v4()),
            transaction_id,
            created_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn operator_events_are_reversible() {
        let entries = vec![
            fund_row(FundEntryType::Allocation, None),
            fund_row(FundEntryType::Deduction, None),
        ];
        assert!(is_operator_event(&entries));
    }

    #[test]
    fn transfer_linked_rows_are_never_reversible() {
        // Each lifecycle step's row: receipt at creation, payout at
        // completion, refund at cancellation.
        for entry_type in [
            FundEntryType::Allocation,
            FundEntryType::Deduction,
            FundEntryType::Refund,
        ] {
            let entries = vec![fund_row(entry_type, Some(Uuid::new_v4()))];
            assert!(!is_operator_event(&entries));
        }
    }

    #[test]
    fn one_linked_row_taints_the_whole_event() {
        let entries = vec![
            fund_row(FundEntryType::Allocation, None),
            fund_row(FundEntryType::Allocation, Some(Uuid::new_v4())),
        ];
        assert!(!is_operator_event(&entries));
    }

    #[test]
    fn reversal_negates_the_original_delta() {
        for entry_type in [
            FundEntryType::Allocation,
            FundEntryType::Deduction,
            FundEntryType::Refund,
        ] {
            assert_eq!(
                balance_delta(entry_type, 1234) + -balance_delta(entry_type, 1234),
                0
            );
        }
    }
}
