//! Reporting HTTP handlers.
//!
//! - GET /api/v1/reports/profits - Per-currency profit summary
//! - GET /api/v1/reports/statistics - Counts by status and branch
//! - GET /api/v1/reports/transactions - Filterable transaction report
//! - GET /api/v1/reports/employees - Per-employee activity
//!
//! Reports are manager-and-up; each is automatically scoped to the
//! caller's branch unless the caller is the director.

use crate::{
    error::AppError,
    middleware::auth::AuthContext,
    models::{
        report::{EmployeeActivity, ProfitsReport, ReportFilter, StatisticsReport},
        transaction::{TransactionFilter, TransactionResponse},
    },
    services::{report_service, transaction_service},
    state::AppState,
};
use axum::{Extension, Json, extract::{Query, State}};

/// Profit summary: totals of principal and tax per currency, the average
/// transfer, and the highest single transfer. Cancelled transfers are
/// excluded; their tax was refunded.
pub async fn profits(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(filter): Query<ReportFilter>,
) -> Result<Json<ProfitsReport>, AppError> {
    auth.require_manager()?;

    let report = report_service::profits(&state.pool, filter, auth.branch_scope()).await?;

    Ok(Json(report))
}

/// Network statistics: transfer counts by status plus per-branch traffic.
pub async fn statistics(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<StatisticsReport>, AppError> {
    auth.require_manager()?;

    let report = report_service::statistics(&state.pool, auth.branch_scope()).await?;

    Ok(Json(report))
}

/// Transactions report: the filtered transfer list the client renders and
/// prints.
pub async fn transactions(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(filter): Query<TransactionFilter>,
) -> Result<Json<Vec<TransactionResponse>>, AppError> {
    auth.require_manager()?;

    let rows =
        transaction_service::list_transactions(&state.pool, filter, auth.branch_scope()).await?;

    Ok(Json(rows.into_iter().map(Into::into).collect()))
}

/// Employees report: per-employee transfer counts and totals moved.
pub async fn employees(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(filter): Query<ReportFilter>,
) -> Result<Json<Vec<EmployeeActivity>>, AppError> {
    auth.require_manager()?;

    let rows = report_service::employee_activity(&state.pool, filter, auth.branch_scope()).await?;

    Ok(Json(rows))
}
