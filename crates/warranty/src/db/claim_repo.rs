//! Claim repository: CRUD operations for the `claims` table.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, OptionalExtension, Row};

use super::{ClaimStore, Database, DatabaseError};
use crate::claim::{Claim, ClaimId, ClaimStatus, ClaimUpdate, InvoiceDocument, NewClaim};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// A raw claim row from the database.
#[derive(Debug, Clone)]
pub struct ClaimRow {
    pub id: ClaimId,
    pub owner_id: i64,
    pub customer_name: String,
    pub customer_phone: String,
    pub product_name: String,
    pub installation_date: String,
    pub invoice_date: Option<String>,
    pub invoice: String,
    pub status: String,
    pub created_at: String,
    pub updated_at: String,
}

impl ClaimRow {
    fn from_row(row: &Row<'_>) -> Result<Self, rusqlite::Error> {
        Ok(Self {
            id: row.get("id")?,
            owner_id: row.get("owner_id")?,
            customer_name: row.get("customer_name")?,
            customer_phone: row.get("customer_phone")?,
            product_name: row.get("product_name")?,
            installation_date: row.get("installation_date")?,
            invoice_date: row.get("invoice_date")?,
            invoice: row.get("invoice")?,
            status: row.get("status")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }
}

impl TryFrom<ClaimRow> for Claim {
    type Error = DatabaseError;

    fn try_from(row: ClaimRow) -> Result<Self, Self::Error> {
        let id = row.id;
        let invalid = |reason: String| DatabaseError::InvalidRow { id, reason };

        let installation_date = NaiveDate::parse_from_str(&row.installation_date, DATE_FORMAT)
            .map_err(|e| invalid(format!("installation_date: {}", e)))?;
        let invoice_date = row
            .invoice_date
            .as_deref()
            .map(|d| NaiveDate::parse_from_str(d, DATE_FORMAT))
            .transpose()
            .map_err(|e| invalid(format!("invoice_date: {}", e)))?;
        let invoice: InvoiceDocument = serde_json::from_str(&row.invoice)
            .map_err(|e| invalid(format!("invoice: {}", e)))?;
        let status: ClaimStatus = row.status.parse().map_err(|e| invalid(format!("{}", e)))?;

        Ok(Claim {
            id,
            owner_id: row.owner_id,
            customer_name: row.customer_name,
            customer_phone: row.customer_phone,
            product_name: row.product_name,
            installation_date,
            invoice_date,
            invoice,
            status,
            created_at: parse_timestamp(&row.created_at).map_err(&invalid)?,
            updated_at: parse_timestamp(&row.updated_at).map_err(&invalid)?,
        })
    }
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| format!("timestamp '{}': {}", value, e))
}

fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Decodes listed rows. Rows that no longer decode are logged and skipped.
fn collect(rows: Vec<ClaimRow>) -> Vec<Claim> {
    rows.into_iter()
        .filter_map(|row| match Claim::try_from(row) {
            Ok(claim) => Some(claim),
            Err(e) => {
                log::warn!("Skipping unreadable claim row: {}", e);
                None
            }
        })
        .collect()
}

/// Inserts a new `pending` claim and returns it as stored.
pub fn insert(db: &Database, claim: &NewClaim) -> Result<Claim, DatabaseError> {
    let invoice = serde_json::to_string(&claim.invoice).map_err(|e| DatabaseError::InvalidRow {
        id: 0,
        reason: format!("invoice: {}", e),
    })?;
    let now = Utc::now().to_rfc3339();

    let id = db.with_conn(|conn| {
        conn.execute(
            "INSERT INTO claims (owner_id, customer_name, customer_phone, product_name,
             installation_date, invoice_date, invoice, status, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, NULL, ?6, ?7, ?8, ?8)",
            params![
                claim.owner_id,
                claim.customer_name,
                claim.customer_phone,
                claim.product_name,
                format_date(claim.installation_date),
                invoice,
                ClaimStatus::Pending.as_str(),
                now,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    })?;

    find_by_id(db, id)?.ok_or(DatabaseError::NotFound(id))
}

/// Finds a claim by its ID.
pub fn find_by_id(db: &Database, id: ClaimId) -> Result<Option<Claim>, DatabaseError> {
    let row = db.with_conn(|conn| {
        let row = conn
            .query_row(
                "SELECT * FROM claims WHERE id = ?1",
                params![id],
                ClaimRow::from_row,
            )
            .optional()?;
        Ok(row)
    })?;
    row.map(Claim::try_from).transpose()
}

/// Lists claims in the given status, oldest first.
pub fn find_by_status(db: &Database, status: ClaimStatus) -> Result<Vec<Claim>, DatabaseError> {
    let rows = db.with_conn(|conn| {
        let mut stmt = conn.prepare("SELECT * FROM claims WHERE status = ?1 ORDER BY id ASC")?;
        let rows = stmt
            .query_map(params![status.as_str()], ClaimRow::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    })?;
    Ok(collect(rows))
}

/// Lists every claim, oldest first.
pub fn find_all(db: &Database) -> Result<Vec<Claim>, DatabaseError> {
    let rows = db.with_conn(|conn| {
        let mut stmt = conn.prepare("SELECT * FROM claims ORDER BY id ASC")?;
        let rows = stmt
            .query_map([], ClaimRow::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    })?;
    Ok(collect(rows))
}

/// Writes a status and, when present, an invoice date onto a claim.
///
/// A `None` invoice date keeps whatever date is already stored.
pub fn update(db: &Database, id: ClaimId, update: &ClaimUpdate) -> Result<(), DatabaseError> {
    let changed = db.with_conn(|conn| {
        let changed = conn.execute(
            "UPDATE claims SET status = ?2, invoice_date = COALESCE(?3, invoice_date),
             updated_at = ?4 WHERE id = ?1",
            params![
                id,
                update.status.as_str(),
                update.invoice_date.map(format_date),
                Utc::now().to_rfc3339(),
            ],
        )?;
        Ok(changed)
    })?;

    if changed == 0 {
        return Err(DatabaseError::NotFound(id));
    }
    Ok(())
}

/// Sets a claim's status by hand, leaving the invoice date alone.
pub fn override_status(
    db: &Database,
    id: ClaimId,
    status: ClaimStatus,
) -> Result<Claim, DatabaseError> {
    update(db, id, &ClaimUpdate::status_only(status))?;
    log::info!("Claim {} status overridden to {}", id, status);
    find_by_id(db, id)?.ok_or(DatabaseError::NotFound(id))
}

/// Counts claims per status. Every status is present, possibly with zero.
pub fn count_by_status(db: &Database) -> Result<BTreeMap<String, u64>, DatabaseError> {
    let mut counts: BTreeMap<String, u64> = ClaimStatus::ALL
        .iter()
        .map(|s| (s.as_str().to_string(), 0))
        .collect();

    db.with_conn(|conn| {
        let mut stmt = conn.prepare("SELECT status, COUNT(*) FROM claims GROUP BY status")?;
        let rows = stmt.query_map([], |r| Ok((r.get::<_, String>(0)?, r.get::<_, i64>(1)?)))?;
        for row in rows {
            let (status, count) = row?;
            counts.insert(status, count.max(0) as u64);
        }
        Ok(())
    })?;

    Ok(counts)
}

impl ClaimStore for Database {
    fn create_pending_claim(&self, claim: &NewClaim) -> Result<Claim, DatabaseError> {
        self::insert(self, claim)
    }

    fn find_by_id(&self, id: ClaimId) -> Result<Option<Claim>, DatabaseError> {
        self::find_by_id(self, id)
    }

    fn find_all_by_status(&self, status: ClaimStatus) -> Result<Vec<Claim>, DatabaseError> {
        self::find_by_status(self, status)
    }

    fn find_all(&self) -> Result<Vec<Claim>, DatabaseError> {
        self::find_all(self)
    }

    fn update(&self, id: ClaimId, update: &ClaimUpdate) -> Result<(), DatabaseError> {
        self::update(self, id, update)
    }
}
