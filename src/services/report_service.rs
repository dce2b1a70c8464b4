//! Reporting queries: profits, network statistics, employee activity.
//!
//! Aggregation happens in SQL; the Rust side only folds the per-currency
//! rows into the response shape and derives the averages. Cancelled
//! transfers are excluded from profit figures since their tax was refunded
//! with the principal.

use crate::{
    db::DbPool,
    error::AppError,
    models::{
        report::{
            BranchStatistics, CurrencyAggregate, CurrencyProfit, EmployeeActivity, ProfitsReport,
            ReportFilter, StatisticsReport,
        },
        types::Currency,
    },
    services::transaction_service::effective_branch_filter,
};
use uuid::Uuid;

/// Fold per-currency aggregate rows into the profits report.
///
/// Currencies absent from `rows` stay at all-zero. The average is the
/// truncated mean of the transaction totals.
pub fn build_profits_report(rows: Vec<CurrencyAggregate>) -> ProfitsReport {
    let mut report = ProfitsReport {
        syp: CurrencyProfit::default(),
        usd: CurrencyProfit::default(),
    };

    for row in rows {
        let average_amount = if row.transaction_count > 0 {
            row.total_amount / row.transaction_count
        } else {
            0
        };

        let profit = CurrencyProfit {
            transaction_count: row.transaction_count,
            total_base_amount: row.total_base_amount,
            total_tax_amount: row.total_tax_amount,
            total_amount: row.total_amount,
            average_amount,
            highest_amount: row.highest_amount,
        };

        match row.currency {
            Currency::Syp => report.syp = profit,
            Currency::Usd => report.usd = profit,
        }
    }

    report
}

/// Profit summary per currency: totals of principal and tax, the truncated
/// average transfer, and the single highest transfer.
pub async fn profits(
    pool: &DbPool,
    filter: ReportFilter,
    actor_scope: Option<Uuid>,
) -> Result<ProfitsReport, AppError> {
    let branch_filter = effective_branch_filter(actor_scope, filter.branch_id)?;

    let rows = sqlx::query_as::<_, CurrencyAggregate>(
        r#"
        SELECT currency,
               COUNT(*) AS transaction_count,
               COALESCE(SUM(base_amount), 0) AS total_base_amount,
               COALESCE(SUM(tax_amount), 0) AS total_tax_amount,
               COALESCE(SUM(amount), 0) AS total_amount,
               COALESCE(MAX(amount), 0) AS highest_amount
        FROM transactions
        WHERE status <> 'cancelled'
          AND ($1::uuid IS NULL OR from_branch_id = $1 OR to_branch_id = $1)
          AND ($2::timestamptz IS NULL OR created_at >= $2)
          AND ($3::timestamptz IS NULL OR created_at < $3)
        GROUP BY currency
        "#,
    )
    .bind(branch_filter)
    .bind(filter.from)
    .bind(filter.to)
    .fetch_all(pool)
    .await?;

    Ok(build_profits_report(rows))
}

/// Row shape for the status-count aggregate.
#[derive(Debug, sqlx::FromRow)]
struct StatusCounts {
    total_transactions: i64,
    pending: i64,
    completed: i64,
    cancelled: i64,
}

/// Network statistics: transfer counts by status plus per-branch traffic.
pub async fn statistics(
    pool: &DbPool,
    actor_scope: Option<Uuid>,
) -> Result<StatisticsReport, AppError> {
    let counts = sqlx::query_as::<_, StatusCounts>(
        r#"
        SELECT COUNT(*) AS total_transactions,
               COUNT(*) FILTER (WHERE status = 'pending') AS pending,
               COUNT(*) FILTER (WHERE status = 'completed') AS completed,
               COUNT(*) FILTER (WHERE status = 'cancelled') AS cancelled
        FROM transactions
        WHERE ($1::uuid IS NULL OR from_branch_id = $1 OR to_branch_id = $1)
        "#,
    )
    .bind(actor_scope)
    .fetch_one(pool)
    .await?;

    let branches = sqlx::query_as::<_, BranchStatistics>(
        r#"
        SELECT b.id AS branch_id,
               b.name AS branch_name,
               (SELECT COUNT(*) FROM transactions t WHERE t.from_branch_id = b.id) AS outgoing_count,
               (SELECT COUNT(*) FROM transactions t WHERE t.to_branch_id = b.id) AS incoming_count
        FROM branches b
        WHERE ($1::uuid IS NULL OR b.id = $1)
        ORDER BY b.name
        "#,
    )
    .bind(actor_scope)
    .fetch_all(pool)
    .await?;

    Ok(StatisticsReport {
        total_transactions: counts.total_transactions,
        pending: counts.pending,
        completed: counts.completed,
        cancelled: counts.cancelled,
        branches,
    })
}

/// Per-employee activity: transfer count and totals moved per currency.
///
/// Directors see every branch; managers their own. Employees with no
/// transfers still appear with zero counts so the report covers the roster.
pub async fn employee_activity(
    pool: &DbPool,
    filter: ReportFilter,
    actor_scope: Option<Uuid>,
) -> Result<Vec<EmployeeActivity>, AppError> {
    let branch_filter = effective_branch_filter(actor_scope, filter.branch_id)?;

    let rows = sqlx::query_as::<_, EmployeeActivity>(
        r#"
        SELECT u.id AS user_id,
               u.username,
               u.full_name,
               b.name AS branch_name,
               COUNT(t.id) AS transaction_count,
               COALESCE(SUM(t.amount) FILTER (WHERE t.currency = 'syp'), 0) AS total_syp,
               COALESCE(SUM(t.amount) FILTER (WHERE t.currency = 'usd'), 0) AS total_usd_cents
        FROM users u
        JOIN branches b ON b.id = u.branch_id
        LEFT JOIN transactions t
            ON t.created_by = u.id
           AND t.status <> 'cancelled'
           AND ($2::timestamptz IS NULL OR t.created_at >= $2)
           AND ($3::timestamptz IS NULL OR t.created_at < $3)
        WHERE ($1::uuid IS NULL OR u.branch_id = $1)
        GROUP BY u.id, u.username, u.full_name, b.name
        ORDER BY transaction_count DESC, u.username
        "#,
    )
    .bind(branch_filter)
    .bind(filter.from)
    .bind(filter.to)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn aggregate(currency: Currency, count: i64, base: i64, tax: i64, highest: i64) -> CurrencyAggregate {
        CurrencyAggregate {
            currency,
            transaction_count: count,
            total_base_amount: base,
            total_tax_amount: tax,
            total_amount: base + tax,
            highest_amount: highest,
        }
    }

    #[test]
    fn missing_currencies_report_zero() {
        let report = build_profits_report(vec![]);
        assert_eq!(report.syp, CurrencyProfit::default());
        assert_eq!(report.usd, CurrencyProfit::default());
    }

    #[test]
    fn averages_are_truncated_means() {
        let report =
            build_profits_report(vec![aggregate(Currency::Usd, 3, 10_000, 250, 5_125)]);

        assert_eq!(report.usd.transaction_count, 3);
        assert_eq!(report.usd.total_amount, 10_250);
        // 10_250 / 3 = 3416.66 -> 3416
        assert_eq!(report.usd.average_amount, 3_416);
        assert_eq!(report.usd.highest_amount, 5_125);
        assert_eq!(report.syp, CurrencyProfit::default());
    }

    #[test]
    fn currencies_fold_independently() {
        let report = build_profits_report(vec![
            aggregate(Currency::Syp, 2, 1_000_000, 25_000, 700_000),
            aggregate(Currency::Usd, 1, 50_000, 1_250, 51_250),
        ]);

        assert_eq!(report.syp.total_tax_amount, 25_000);
        assert_eq!(report.syp.average_amount, 512_500);
        assert_eq!(report.usd.average_amount, 51_250);
    }
}
