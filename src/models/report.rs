//! Report response types.
//!
//! Shapes returned by the reporting endpoints: per-currency profit
//! summaries, network statistics, and per-employee activity. All money is
//! integer minor units, like everywhere else.

use super::types::Currency;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Profit figures for one currency.
///
/// `average_amount` is the truncated mean of the transaction totals, zero
/// when there were no transactions.
#[derive(Debug, Default, PartialEq, Eq, Serialize)]
pub struct CurrencyProfit {
    pub transaction_count: i64,
    pub total_base_amount: i64,
    pub total_tax_amount: i64,
    pub total_amount: i64,
    pub average_amount: i64,
    pub highest_amount: i64,
}

/// Response body for `GET /api/v1/reports/profits`.
///
/// Tax collected is the branch network's profit, reported separately per
/// currency since SYP and USD never mix arithmetically.
#[derive(Debug, Serialize)]
pub struct ProfitsReport {
    pub syp: CurrencyProfit,
    pub usd: CurrencyProfit,
}

/// One branch's row in the statistics report.
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct BranchStatistics {
    pub branch_id: Uuid,
    pub branch_name: String,
    pub outgoing_count: i64,
    pub incoming_count: i64,
}

/// Response body for `GET /api/v1/reports/statistics`.
#[derive(Debug, Serialize)]
pub struct StatisticsReport {
    pub total_transactions: i64,
    pub pending: i64,
    pub completed: i64,
    pub cancelled: i64,
    pub branches: Vec<BranchStatistics>,
}

/// One employee's row in the employees report.
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct EmployeeActivity {
    pub user_id: Uuid,
    pub username: String,
    pub full_name: String,
    pub branch_name: String,
    pub transaction_count: i64,
    pub total_syp: i64,
    pub total_usd_cents: i64,
}

/// Query parameters shared by the report endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct ReportFilter {
    pub branch_id: Option<Uuid>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

/// Row shape used while aggregating profits in SQL.
#[derive(Debug, sqlx::FromRow)]
pub struct CurrencyAggregate {
    pub currency: Currency,
    pub transaction_count: i64,
    pub total_base_amount: i64,
    pub total_tax_amount: i64,
    pub total_amount: i64,
    pub highest_amount: i64,
}
