//! Database backup and restore.
//!
//! The backup is a versioned JSON snapshot of every table, checksummed with
//! SHA-256 so a truncated or hand-edited file is caught before it wipes the
//! database. Restore is destructive: inside one database transaction the
//! tables are emptied and reloaded, so a failure mid-restore leaves the
//! previous state intact.
//!
//! Snapshot row shapes are private to this module and deliberately
//! decoupled from the API models; the wire format must stay stable even if
//! the response types move.

use crate::{db::DbPool, error::AppError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Bump when the snapshot layout changes incompatibly.
const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow)]
struct BranchRow {
    id: Uuid,
    name: String,
    location: String,
    balance_syp: i64,
    balance_usd_cents: i64,
    tax_rate_bp: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    username: String,
    password_hash: String,
    full_name: String,
    role: String,
    branch_id: Option<Uuid>,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow)]
struct BranchFundRow {
    id: Uuid,
    event_id: Uuid,
    branch_id: Uuid,
    entry_type: String,
    currency: String,
    amount: i64,
    note: Option<String>,
    created_by: Option<Uuid>,
    transaction_id: Option<Uuid>,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow)]
struct TransactionRow {
    id: Uuid,
    reference: String,
    sender_name: String,
    sender_phone: String,
    receiver_name: String,
    receiver_phone: String,
    from_branch_id: Uuid,
    to_branch_id: Uuid,
    created_by: Uuid,
    currency: String,
    base_amount: i64,
    tax_rate_bp: i32,
    tax_amount: i64,
    amount: i64,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow)]
struct NotificationRow {
    id: Uuid,
    branch_id: Uuid,
    user_id: Option<Uuid>,
    message: String,
    is_read: bool,
    created_at: DateTime<Utc>,
}

/// Table contents of a snapshot, in foreign-key order: ledger rows
/// reference transactions, so transactions load first.
#[derive(Debug, Default, Serialize, Deserialize)]
struct SnapshotData {
    branches: Vec<BranchRow>,
    users: Vec<UserRow>,
    transactions: Vec<TransactionRow>,
    branch_funds: Vec<BranchFundRow>,
    notifications: Vec<NotificationRow>,
}

/// A complete database snapshot as streamed to and from the client.
#[derive(Debug, Serialize, Deserialize)]
pub struct Snapshot {
    format_version: u32,
    created_at: DateTime<Utc>,
    data: SnapshotData,
    /// SHA-256 over the canonical JSON of `data`, hex-encoded
    checksum: String,
}

fn compute_checksum(data: &SnapshotData) -> Result<String, AppError> {
    let canonical = serde_json::to_vec(data).map_err(|_| AppError::Internal)?;
    let mut hasher = Sha256::new();
    hasher.update(&canonical);
    Ok(hex::encode(hasher.finalize()))
}

fn check_enum(field: &str, value: &str, allowed: &[&str]) -> Result<(), AppError> {
    if allowed.contains(&value) {
        return Ok(());
    }
    Err(AppError::InvalidSnapshot(format!(
        "unknown {field} '{value}'"
    )))
}

/// Reject a snapshot that cannot restore cleanly: wrong version, damaged
/// payload, or enum values the schema does not know. Everything is checked
/// here, before the destructive transaction begins.
fn verify_snapshot(snapshot: &Snapshot) -> Result<(), AppError> {
    if snapshot.format_version != FORMAT_VERSION {
        return Err(AppError::InvalidSnapshot(format!(
            "unsupported format version {}",
            snapshot.format_version
        )));
    }
    if compute_checksum(&snapshot.data)? != snapshot.checksum {
        return Err(AppError::InvalidSnapshot("checksum mismatch".to_string()));
    }

    // Enum columns travel as plain strings and are cast during the INSERTs;
    // an unknown value would otherwise surface as a database error mid-way.
    for user in &snapshot.data.users {
        check_enum(
            "role",
            &user.role,
            &["director", "branch_manager", "employee"],
        )?;
    }
    for transaction in &snapshot.data.transactions {
        check_enum("currency", &transaction.currency, &["syp", "usd"])?;
        check_enum(
            "status",
            &transaction.status,
            &["pending", "completed", "cancelled"],
        )?;
    }
    for entry in &snapshot.data.branch_funds {
        check_enum(
            "entry_type",
            &entry.entry_type,
            &["allocation", "deduction", "refund"],
        )?;
        check_enum("currency", &entry.currency, &["syp", "usd"])?;
    }

    Ok(())
}

/// Export a snapshot of the whole database.
///
/// All tables are read inside one database transaction for a consistent
/// view.
pub async fn export_snapshot(pool: &DbPool) -> Result<Snapshot, AppError> {
    let mut tx = pool.begin().await?;

    let data = SnapshotData {
        branches: sqlx::query_as("SELECT * FROM branches ORDER BY created_at")
            .fetch_all(&mut *tx)
            .await?,
        users: sqlx::query_as(
            "SELECT id, username, password_hash, full_name, role::text AS role, branch_id,
                    is_active, created_at, updated_at
             FROM users ORDER BY created_at",
        )
        .fetch_all(&mut *tx)
        .await?,
        transactions: sqlx::query_as(
            "SELECT id, reference, sender_name, sender_phone, receiver_name, receiver_phone,
                    from_branch_id, to_branch_id, created_by, currency::text AS currency,
                    base_amount, tax_rate_bp, tax_amount, amount, status::text AS status,
                    created_at, updated_at
             FROM transactions ORDER BY created_at",
        )
        .fetch_all(&mut *tx)
        .await?,
        branch_funds: sqlx::query_as(
            "SELECT id, event_id, branch_id, entry_type::text AS entry_type,
                    currency::text AS currency, amount, note, created_by, transaction_id,
                    created_at
             FROM branch_funds ORDER BY created_at",
        )
        .fetch_all(&mut *tx)
        .await?,
        notifications: sqlx::query_as("SELECT * FROM notifications ORDER BY created_at")
            .fetch_all(&mut *tx)
            .await?,
    };

    tx.commit().await?;

    let checksum = compute_checksum(&data)?;

    Ok(Snapshot {
        format_version: FORMAT_VERSION,
        created_at: Utc::now(),
        data,
        checksum,
    })
}

/// Destructively restore the database from a snapshot.
///
/// The snapshot is verified first; then every table is emptied and reloaded
/// in one database transaction. Rejecting before the first DELETE means a
/// bad file can never leave a half-empty database.
pub async fn restore_snapshot(pool: &DbPool, snapshot: Snapshot) -> Result<(), AppError> {
    verify_snapshot(&snapshot)?;

    let mut tx = pool.begin().await?;

    // Children before parents.
    for table in [
        "notifications",
        "branch_funds",
        "transactions",
        "users",
        "branches",
    ] {
        sqlx::query(&format!("DELETE FROM {table}"))
            .execute(&mut *tx)
            .await?;
    }

    for b in &snapshot.data.branches {
        sqlx::query(
            "INSERT INTO branches (id, name, location, balance_syp, balance_usd_cents,
                                   tax_rate_bp, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(b.id)
        .bind(&b.name)
        .bind(&b.location)
        .bind(b.balance_syp)
        .bind(b.balance_usd_cents)
        .bind(b.tax_rate_bp)
        .bind(b.created_at)
        .bind(b.updated_at)
        .execute(&mut *tx)
        .await?;
    }

    for u in &snapshot.data.users {
        sqlx::query(
            "INSERT INTO users (id, username, password_hash, full_name, role, branch_id,
                                is_active, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5::user_role, $6, $7, $8, $9)",
        )
        .bind(u.id)
        .bind(&u.username)
        .bind(&u.password_hash)
        .bind(&u.full_name)
        .bind(&u.role)
        .bind(u.branch_id)
        .bind(u.is_active)
        .bind(u.created_at)
        .bind(u.updated_at)
        .execute(&mut *tx)
        .await?;
    }

    for t in &snapshot.data.transactions {
        sqlx::query(
            "INSERT INTO transactions (id, reference, sender_name, sender_phone, receiver_name,
                                       receiver_phone, from_branch_id, to_branch_id, created_by,
                                       currency, base_amount, tax_rate_bp, tax_amount, amount,
                                       status, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10::currency_code, $11, $12, $13, $14,
                     $15::transfer_status, $16, $17)",
        )
        .bind(t.id)
        .bind(&t.reference)
        .bind(&t.sender_name)
        .bind(&t.sender_phone)
        .bind(&t.receiver_name)
        .bind(&t.receiver_phone)
        .bind(t.from_branch_id)
        .bind(t.to_branch_id)
        .bind(t.created_by)
        .bind(&t.currency)
        .bind(t.base_amount)
        .bind(t.tax_rate_bp)
        .bind(t.tax_amount)
        .bind(t.amount)
        .bind(&t.status)
        .bind(t.created_at)
        .bind(t.updated_at)
        .execute(&mut *tx)
        .await?;
    }

    for f in &snapshot.data.branch_funds {
        sqlx::query(
            "INSERT INTO branch_funds (id, event_id, branch_id, entry_type, currency,
                                       amount, note, created_by, transaction_id, created_at)
             VALUES ($1, $2, $3, $4::fund_entry_type, $5::currency_code, $6, $7, $8, $9, $10)",
        )
        .bind(f.id)
        .bind(f.event_id)
        .bind(f.branch_id)
        .bind(&f.entry_type)
        .bind(&f.currency)
        .bind(f.amount)
        .bind(&f.note)
        .bind(f.created_by)
        .bind(f.transaction_id)
        .bind(f.created_at)
        .execute(&mut *tx)
        .await?;
    }

    for n in &snapshot.data.notifications {
        sqlx::query(
            "INSERT INTO notifications (id, branch_id, user_id, message, is_read, created_at)
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(n.id)
        .bind(n.branch_id)
        .bind(n.user_id)
        .bind(&n.message)
        .bind(n.is_read)
        .bind(n.created_at)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    tracing::warn!(
        branches = snapshot.data.branches.len(),
        transactions = snapshot.data.transactions.len(),
        "database restored from snapshot"
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_snapshot() -> Snapshot {
        let data = SnapshotData {
            branches: vec![BranchRow {
                id: Uuid::new_v4(),
                name: "Damascus Central".to_string(),
                location: "Damascus".to_string(),
                balance_syp: 1_000_000,
                balance_usd_cents: 500_000,
                tax_rate_bp: 250,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            }],
            ..Default::default()
        };
        let checksum = compute_checksum(&data).unwrap();
        Snapshot {
            format_version: FORMAT_VERSION,
            created_at: Utc::now(),
            data,
            checksum,
        }
    }

    #[test]
    fn valid_snapshot_verifies() {
        assert!(verify_snapshot(&sample_snapshot()).is_ok());
    }

    #[test]
    fn tampered_data_fails_checksum() {
        let mut snapshot = sample_snapshot();
        snapshot.data.branches[0].balance_syp += 1;

        assert!(matches!(
            verify_snapshot(&snapshot),
            Err(AppError::InvalidSnapshot(msg)) if msg.contains("checksum")
        ));
    }

    #[test]
    fn unknown_format_version_is_rejected() {
        let mut snapshot = sample_snapshot();
        snapshot.format_version = 99;

        assert!(matches!(
            verify_snapshot(&snapshot),
            Err(AppError::InvalidSnapshot(msg)) if msg.contains("version")
        ));
    }

    #[test]
    fn unknown_role_is_rejected_before_restore() {
        let mut snapshot = sample_snapshot();
        snapshot.data.users.push(UserRow {
            id: Uuid::new_v4(),
            username: "director".to_string(),
            password_hash: "hash".to_string(),
            full_name: "Director".to_string(),
            role: "superadmin".to_string(),
            branch_id: None,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        });
        snapshot.checksum = compute_checksum(&snapshot.data).unwrap();

        assert!(matches!(
            verify_snapshot(&snapshot),
            Err(AppError::InvalidSnapshot(msg)) if msg.contains("role")
        ));
    }

    #[test]
    fn unknown_ledger_entry_type_is_rejected_before_restore() {
        let mut snapshot = sample_snapshot();
        snapshot.data.branch_funds.push(BranchFundRow {
            id: Uuid::new_v4(),
            event_id: Uuid::new_v4(),
            branch_id: snapshot.data.branches[0].id,
            entry_type: "adjustment".to_string(),
            currency: "syp".to_string(),
            amount: 5_000,
            note: None,
            created_by: None,
            transaction_id: None,
            created_at: Utc::now(),
        });
        snapshot.checksum = compute_checksum(&snapshot.data).unwrap();

        assert!(matches!(
            verify_snapshot(&snapshot),
            Err(AppError::InvalidSnapshot(msg)) if msg.contains("entry_type")
        ));
    }

    #[test]
    fn known_enum_values_verify() {
        let mut snapshot = sample_snapshot();
        snapshot.data.branch_funds.push(BranchFundRow {
            id: Uuid::new_v4(),
            event_id: Uuid::new_v4(),
            branch_id: snapshot.data.branches[0].id,
            entry_type: "allocation".to_string(),
            currency: "usd".to_string(),
            amount: 5_000,
            note: None,
            created_by: None,
            transaction_id: None,
            created_at: Utc::now(),
        });
        snapshot.checksum = compute_checksum(&snapshot.data).unwrap();

        assert!(verify_snapshot(&snapshot).is_ok());
    }

    #[test]
    fn snapshot_json_round_trips() {
        let snapshot = sample_snapshot();
        let json = serde_json::to_string(&snapshot).unwrap();
        let parsed: Snapshot = serde_json::from_str(&json).unwrap();

        assert!(verify_snapshot(&parsed).is_ok());
        assert_eq!(parsed.data.branches[0].name, "Damascus Central");
    }
}
