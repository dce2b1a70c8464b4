//! Transfer lifecycle - core business logic for money transfers.
//!
//! A transfer is handed in at an origin branch (which receives the
//! principal plus tax from the sender), then either paid out at the
//! destination branch or cancelled and refunded at the origin. Every
//! lifecycle step writes its balance effect through the fund ledger inside
//! the same database transaction that flips the status, so the books and
//! the statuses can never disagree.
//!
//! # Money flow
//!
//! - create:   origin balance += base + tax  (ledger `allocation`)
//! - complete: destination balance -= base   (ledger `deduction`)
//! - cancel:   origin balance -= base + tax  (ledger `refund`)
//!
//! The tax stays with the network; it is the profit the reports sum up.

use crate::{
    db::DbPool,
    error::AppError,
    models::{
        transaction::{CreateTransferRequest, Transaction, TransactionFilter},
        types::{FundEntryType, TransferStatus, UserRole},
    },
    services::{ledger_service, notification_service},
};
use uuid::Uuid;

/// Tax owed on a principal at a basis-point rate, truncated toward zero.
///
/// `i128` intermediate so `base * rate` cannot overflow before the divide.
pub fn compute_tax(base_amount: i64, tax_rate_bp: i32) -> i64 {
    (base_amount as i128 * tax_rate_bp as i128 / 10_000) as i64
}

/// Generate a short human-readable reference for receipts.
fn make_reference() -> String {
    let id = Uuid::new_v4().simple().to_string();
    format!("TR-{}", &id[..10].to_uppercase())
}

/// Resolve the branch filter a caller is allowed to query.
///
/// Directors (`scope = None`) may request any branch or none; everyone
/// else is pinned to their own branch and may not ask for another.
pub fn effective_branch_filter(
    scope: Option<Uuid>,
    requested: Option<Uuid>,
) -> Result<Option<Uuid>, AppError> {
    match (scope, requested) {
        (None, requested) => Ok(requested),
        (Some(own), None) => Ok(Some(own)),
        (Some(own), Some(requested)) if own == requested => Ok(Some(own)),
        (Some(_), Some(_)) => Err(AppError::Forbidden),
    }
}

/// Create a transfer at an origin branch.
///
/// # Process
///
/// 1. Resolve the origin branch (the caller's own; directors name one)
/// 2. Lock the origin branch and snapshot its tax rate
/// 3. Compute `tax = base * rate`, `amount = base + tax`
/// 4. Insert the transaction as `pending`
/// 5. Receive `amount` into the origin balance through a ledger entry
///    linked to the transaction, and notify the destination
pub async fn create_transfer(
    pool: &DbPool,
    created_by: Uuid,
    creator_role: UserRole,
    creator_branch: Option<Uuid>,
    request: CreateTransferRequest,
) -> Result<Transaction, AppError> {
    if request.base_amount <= 0 {
        return Err(AppError::InvalidRequest(
            "Amount must be positive".to_string(),
        ));
    }
    if request.sender_name.trim().is_empty() || request.receiver_name.trim().is_empty() {
        return Err(AppError::InvalidRequest(
            "Sender and receiver names are required".to_string(),
        ));
    }

    let from_branch_id = match (creator_role, creator_branch, request.from_branch_id) {
        // Directors have no branch of their own and must name the origin.
        (UserRole::Director, _, Some(branch)) => branch,
        (UserRole::Director, _, None) => {
            return Err(AppError::InvalidRequest(
                "from_branch_id is required for director-created transfers".to_string(),
            ));
        }
        (_, Some(own), None) => own,
        (_, Some(own), Some(requested)) if own == requested => own,
        (_, Some(_), Some(_)) => return Err(AppError::Forbidden),
        (_, None, _) => return Err(AppError::Forbidden),
    };

    if from_branch_id == request.to_branch_id {
        return Err(AppError::InvalidRequest(
            "Origin and destination branches must differ".to_string(),
        ));
    }

    let mut tx = pool.begin().await?;

    let (tax_rate_bp,): (i32,) =
        sqlx::query_as("SELECT tax_rate_bp FROM branches WHERE id = $1 FOR UPDATE")
            .bind(from_branch_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(AppError::BranchNotFound)?;

    let destination_exists: bool =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM branches WHERE id = $1)")
            .bind(request.to_branch_id)
            .fetch_one(&mut *tx)
            .await?;
    if !destination_exists {
        return Err(AppError::BranchNotFound);
    }

    let tax_amount = compute_tax(request.base_amount, tax_rate_bp);
    let amount = request.base_amount + tax_amount;
    let reference = make_reference();

    let transaction = sqlx::query_as::<_, Transaction>(
        r#"
        INSERT INTO transactions (
            reference, sender_name, sender_phone, receiver_name, receiver_phone,
            from_branch_id, to_branch_id, created_by, currency,
            base_amount, tax_rate_bp, tax_amount, amount, status
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, 'pending')
        RETURNING *
        "#,
    )
    .bind(&reference)
    .bind(request.sender_name.trim())
    .bind(request.sender_phone.trim())
    .bind(request.receiver_name.trim())
    .bind(request.receiver_phone.trim())
    .bind(from_branch_id)
    .bind(request.to_branch_id)
    .bind(created_by)
    .bind(request.currency)
    .bind(request.base_amount)
    .bind(tax_rate_bp)
    .bind(tax_amount)
    .bind(amount)
    .fetch_one(&mut *tx)
    .await?;

    // The sender's cash lands in the origin branch till. The row carries the
    // transaction id so it can never be unwound through the allocations
    // endpoint.
    ledger_service::record_entry(
        &mut tx,
        Uuid::new_v4(),
        from_branch_id,
        FundEntryType::Allocation,
        request.currency,
        amount,
        Some(format!("transfer {reference} received")),
        Some(created_by),
        Some(transaction.id),
    )
    .await?;

    notification_service::notify_branch(
        &mut tx,
        request.to_branch_id,
        None,
        format!(
            "Incoming transfer {} for {}",
            reference, transaction.receiver_name
        ),
    )
    .await?;

    tx.commit().await?;

    tracing::info!(reference = %transaction.reference, "transfer created");

    Ok(transaction)
}

/// Pay out a pending transfer at its destination branch.
///
/// Only staff of the destination branch (or a director) may complete it.
/// The payout is a `deduction` ledger entry for the principal against the
/// destination balance; the status flips to `completed` in the same
/// database transaction.
pub async fn complete_transfer(
    pool: &DbPool,
    transaction_id: Uuid,
    actor_id: Uuid,
    actor_scope: Option<Uuid>,
) -> Result<Transaction, AppError> {
    let mut tx = pool.begin().await?;

    let transaction =
        sqlx::query_as::<_, Transaction>("SELECT * FROM transactions WHERE id = $1 FOR UPDATE")
            .bind(transaction_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(AppError::TransactionNotFound)?;

    if let Some(branch) = actor_scope {
        if branch != transaction.to_branch_id {
            return Err(AppError::Forbidden);
        }
    }

    if !transaction
        .status
        .can_transition_to(TransferStatus::Completed)
    {
        return Err(AppError::InvalidStatusTransition {
            from: transaction.status.as_str().to_string(),
            to: TransferStatus::Completed.as_str().to_string(),
        });
    }

    sqlx::query("SELECT id FROM branches WHERE id = $1 FOR UPDATE")
        .bind(transaction.to_branch_id)
        .fetch_one(&mut *tx)
        .await?;

    // Receiver takes the principal; the tax stays at the origin.
    ledger_service::record_entry(
        &mut tx,
        Uuid::new_v4(),
        transaction.to_branch_id,
        FundEntryType::Deduction,
        transaction.currency,
        transaction.base_amount,
        Some(format!("transfer {} paid out", transaction.reference)),
        Some(actor_id),
        Some(transaction.id),
    )
    .await?;

    let updated = sqlx::query_as::<_, Transaction>(
        "UPDATE transactions SET status = 'completed', updated_at = NOW() WHERE id = $1 RETURNING *",
    )
    .bind(transaction_id)
    .fetch_one(&mut *tx)
    .await?;

    notification_service::notify_branch(
        &mut tx,
        transaction.from_branch_id,
        None,
        format!("Transfer {} was paid out", transaction.reference),
    )
    .await?;

    tx.commit().await?;

    tracing::info!(reference = %updated.reference, "transfer completed");

    Ok(updated)
}

/// Cancel a pending transfer and refund the sender at the origin branch.
///
/// Only staff of the origin branch (or a director) may cancel. The sender
/// gets the full amount back, tax included, as a `refund` ledger entry.
pub async fn cancel_transfer(
    pool: &DbPool,
    transaction_id: Uuid,
    actor_id: Uuid,
    actor_scope: Option<Uuid>,
) -> Result<Transaction, AppError> {
    let mut tx = pool.begin().await?;

    let transaction =
        sqlx::query_as::<_, Transaction>("SELECT * FROM transactions WHERE id = $1 FOR UPDATE")
            .bind(transaction_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(AppError::TransactionNotFound)?;

    if let Some(branch) = actor_scope {
        if branch != transaction.from_branch_id {
            return Err(AppError::Forbidden);
        }
    }

    if !transaction
        .status
        .can_transition_to(TransferStatus::Cancelled)
    {
        return Err(AppError::InvalidStatusTransition {
            from: transaction.status.as_str().to_string(),
            to: TransferStatus::Cancelled.as_str().to_string(),
        });
    }

    sqlx::query("SELECT id FROM branches WHERE id = $1 FOR UPDATE")
        .bind(transaction.from_branch_id)
        .fetch_one(&mut *tx)
        .await?;

    ledger_service::record_entry(
        &mut tx,
        Uuid::new_v4(),
        transaction.from_branch_id,
        FundEntryType::Refund,
        transaction.currency,
        transaction.amount,
        Some(format!("transfer {} cancelled", transaction.reference)),
        Some(actor_id),
        Some(transaction.id),
    )
    .await?;

    let updated = sqlx::query_as::<_, Transaction>(
        "UPDATE transactions SET status = 'cancelled', updated_at = NOW() WHERE id = $1 RETURNING *",
    )
    .bind(transaction_id)
    .fetch_one(&mut *tx)
    .await?;

    notification_service::notify_branch(
        &mut tx,
        transaction.to_branch_id,
        None,
        format!("Transfer {} was cancelled", transaction.reference),
    )
    .await?;

    tx.commit().await?;

    tracing::info!(reference = %updated.reference, "transfer cancelled");

    Ok(updated)
}

/// Get a transaction by id, scoped to the caller's branch.
pub async fn get_transaction(
    pool: &DbPool,
    transaction_id: Uuid,
    actor_scope: Option<Uuid>,
) -> Result<Transaction, AppError> {
    let transaction =
        sqlx::query_as::<_, Transaction>("SELECT * FROM transactions WHERE id = $1")
            .bind(transaction_id)
            .fetch_optional(pool)
            .await?
            .ok_or(AppError::TransactionNotFound)?;

    if let Some(branch) = actor_scope {
        if branch != transaction.from_branch_id && branch != transaction.to_branch_id {
            // Hidden rather than forbidden, like the rest of the listings.
            return Err(AppError::TransactionNotFound);
        }
    }

    Ok(transaction)
}

/// List transactions matching a filter, newest first.
///
/// The branch filter is forced to the caller's own branch for non-director
/// callers (see [`effective_branch_filter`]).
pub async fn list_transactions(
    pool: &DbPool,
    filter: TransactionFilter,
    actor_scope: Option<Uuid>,
) -> Result<Vec<Transaction>, AppError> {
    let branch_filter = effective_branch_filter(actor_scope, filter.branch_id)?;

    let transactions = sqlx::query_as::<_, Transaction>(
        r#"
        SELECT * FROM transactions
        WHERE ($1::uuid IS NULL OR from_branch_id = $1 OR to_branch_id = $1)
          AND ($2::transfer_status IS NULL OR status = $2)
          AND ($3::timestamptz IS NULL OR created_at >= $3)
          AND ($4::timestamptz IS NULL OR created_at < $4)
        ORDER BY created_at DESC
        LIMIT 500
        "#,
    )
    .bind(branch_filter)
    .bind(filter.status)
    .bind(filter.from)
    .bind(filter.to)
    .fetch_all(pool)
    .await?;

    Ok(transactions)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tax_is_base_times_rate() {
        // 2.5% of 100_000
        assert_eq!(compute_tax(100_000, 250), 2_500);
        assert_eq!(compute_tax(100_000, 0), 0);
        // 100% cap
        assert_eq!(compute_tax(100_000, 10_000), 100_000);
    }

    #[test]
    fn tax_truncates_toward_zero() {
        // 2.5% of 999 = 24.975 -> 24
        assert_eq!(compute_tax(999, 250), 24);
        // 0.01% of 99 = 0.0099 -> 0
        assert_eq!(compute_tax(99, 1), 0);
    }

    #[test]
    fn tax_survives_large_amounts() {
        // Near the SYP ceiling; i64 * i32 would overflow without widening.
        let base = i64::MAX / 2;
        assert_eq!(compute_tax(base, 10_000), base);
    }

    #[test]
    fn reference_has_expected_shape() {
        let reference = make_reference();
        assert!(reference.starts_with("TR-"));
        assert_eq!(reference.len(), 13);
        assert!(
            reference[3..]
                .chars()
                .all(|c| c.is_ascii_digit() || c.is_ascii_uppercase())
        );
    }

    #[test]
    fn branch_filter_pins_scoped_callers() {
        let own = Uuid::new_v4();
        let other = Uuid::new_v4();

        assert_eq!(effective_branch_filter(None, None).unwrap(), None);
        assert_eq!(
            effective_branch_filter(None, Some(other)).unwrap(),
            Some(other)
        );
        assert_eq!(
            effective_branch_filter(Some(own), None).unwrap(),
            Some(own)
        );
        assert_eq!(
            effective_branch_filter(Some(own), Some(own)).unwrap(),
            Some(own)
        );
        assert!(matches!(
            effective_branch_filter(Some(own), Some(other)),
            Err(AppError::Forbidden)
        ));
    }
}
