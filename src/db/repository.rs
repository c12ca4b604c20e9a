//! Repositories for procurement database operations

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use super::models::{
    ProposalRow, RelationCounts, RfpItemRow, RfpRow, RfpVendorRow, VendorRow,
};
use super::DbError;
use crate::model::vendor::VendorPatch;
use crate::model::{DispatchStatus, Proposal, Rfp, RfpStatus, RfpVendor, UnitPrice, Vendor};

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}

fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_foreign_key_violation())
}

/// Repository for vendor directory operations
#[derive(Clone)]
pub struct VendorRepository {
    pool: PgPool,
}

impl VendorRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// List all vendors, newest first, with relation counts
    pub async fn list(&self) -> Result<Vec<(Vendor, RelationCounts)>, DbError> {
        let rows: Vec<VendorRow> =
            sqlx::query_as("SELECT * FROM vendors ORDER BY created_at DESC")
                .fetch_all(&self.pool)
                .await?;

        let counts = self.relation_counts().await?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let vendor = row.into_domain();
                let count = counts.get(&vendor.id).copied().unwrap_or_default();
                (vendor, count)
            })
            .collect())
    }

    async fn relation_counts(&self) -> Result<HashMap<String, RelationCounts>, DbError> {
        let proposal_counts: Vec<(String, i64)> =
            sqlx::query_as("SELECT vendor_id, COUNT(*) FROM proposals GROUP BY vendor_id")
                .fetch_all(&self.pool)
                .await?;

        let dispatch_counts: Vec<(String, i64)> =
            sqlx::query_as("SELECT vendor_id, COUNT(*) FROM rfp_vendors GROUP BY vendor_id")
                .fetch_all(&self.pool)
                .await?;

        let mut counts: HashMap<String, RelationCounts> = HashMap::new();
        for (vendor_id, count) in proposal_counts {
            counts.entry(vendor_id).or_default().proposals = count;
        }
        for (vendor_id, count) in dispatch_counts {
            counts.entry(vendor_id).or_default().rfp_vendors = count;
        }

        Ok(counts)
    }

    /// Get a vendor by ID
    pub async fn get(&self, id: &str) -> Result<Vendor, DbError> {
        let row: VendorRow = sqlx::query_as("SELECT * FROM vendors WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::NotFound(id.to_string()))?;

        Ok(row.into_domain())
    }

    /// Find a vendor by exact email (case-insensitive)
    pub async fn find_by_email(&self, email: &str) -> Result<Option<Vendor>, DbError> {
        let row: Option<VendorRow> =
            sqlx::query_as("SELECT * FROM vendors WHERE LOWER(email) = LOWER($1)")
                .bind(email)
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.map(VendorRow::into_domain))
    }

    /// List every vendor; the inbound matcher resolves senders in memory
    /// against this set with a single matching predicate.
    pub async fn list_all(&self) -> Result<Vec<Vendor>, DbError> {
        let rows: Vec<VendorRow> = sqlx::query_as("SELECT * FROM vendors")
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(VendorRow::into_domain).collect())
    }

    /// Resolve a set of vendor ids. Unknown ids are silently absent from
    /// the result.
    pub async fn list_by_ids(&self, ids: &[String]) -> Result<Vec<Vendor>, DbError> {
        let rows: Vec<VendorRow> = sqlx::query_as("SELECT * FROM vendors WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(VendorRow::into_domain).collect())
    }

    /// Insert a new vendor
    pub async fn insert(&self, vendor: &Vendor) -> Result<(), DbError> {
        sqlx::query(
            r#"
            INSERT INTO vendors (id, name, email, contact_person, phone, address, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(&vendor.id)
        .bind(&vendor.name)
        .bind(&vendor.email)
        .bind(&vendor.contact_person)
        .bind(&vendor.phone)
        .bind(&vendor.address)
        .bind(vendor.created_at)
        .bind(vendor.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                DbError::Duplicate(vendor.email.clone())
            } else {
                DbError::Connection(e)
            }
        })?;

        tracing::debug!(vendor = %vendor.id, "Inserted vendor");
        Ok(())
    }

    /// Partially update a vendor. Absent fields keep their current value.
    pub async fn update(&self, id: &str, patch: &VendorPatch) -> Result<Vendor, DbError> {
        let row: Option<VendorRow> = sqlx::query_as(
            r#"
            UPDATE vendors SET
                name = COALESCE($2, name),
                email = COALESCE($3, email),
                contact_person = COALESCE($4, contact_person),
                phone = COALESCE($5, phone),
                address = COALESCE($6, address),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&patch.name)
        .bind(&patch.email)
        .bind(&patch.contact_person)
        .bind(&patch.phone)
        .bind(&patch.address)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                DbError::Duplicate(patch.email.clone().unwrap_or_default())
            } else {
                DbError::Connection(e)
            }
        })?;

        let row = row.ok_or_else(|| DbError::NotFound(id.to_string()))?;
        Ok(row.into_domain())
    }

    /// Delete a vendor. Fails with `Referenced` while dispatch records or
    /// proposals still point at it.
    pub async fn delete(&self, id: &str) -> Result<bool, DbError> {
        let result = sqlx::query("DELETE FROM vendors WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                if is_foreign_key_violation(&e) {
                    DbError::Referenced(id.to_string())
                } else {
                    DbError::Connection(e)
                }
            })?;

        let deleted = result.rows_affected() > 0;
        if deleted {
            tracing::debug!(vendor = %id, "Deleted vendor");
        }

        Ok(deleted)
    }
}

/// Repository for RFP, item, and dispatch-record operations
#[derive(Clone)]
pub struct RfpRepository {
    pool: PgPool,
}

impl RfpRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Persist an RFP and its items atomically
    pub async fn create_with_items(&self, rfp: &Rfp) -> Result<(), DbError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO rfps (
                id, title, raw_input, description, budget, currency,
                delivery_days, payment_terms, warranty_months, status,
                created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(&rfp.id)
        .bind(&rfp.title)
        .bind(&rfp.raw_input)
        .bind(&rfp.description)
        .bind(rfp.budget)
        .bind(&rfp.currency)
        .bind(rfp.delivery_days)
        .bind(&rfp.payment_terms)
        .bind(rfp.warranty_months)
        .bind(rfp.status.as_str())
        .bind(rfp.created_at)
        .bind(rfp.updated_at)
        .execute(&mut *tx)
        .await?;

        for item in &rfp.items {
            let specifications = serde_json::to_value(&item.specifications)
                .map_err(|e| DbError::Serialization(e.to_string()))?;

            sqlx::query(
                r#"
                INSERT INTO rfp_items (id, rfp_id, name, description, quantity, specifications, position)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                "#,
            )
            .bind(&item.id)
            .bind(&rfp.id)
            .bind(&item.name)
            .bind(&item.description)
            .bind(item.quantity)
            .bind(&specifications)
            .bind(item.position)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        tracing::debug!(rfp = %rfp.id, items = rfp.items.len(), "Created RFP with items");
        Ok(())
    }

    /// List all RFPs, newest first, with items and relation counts
    pub async fn list(&self) -> Result<Vec<(Rfp, RelationCounts)>, DbError> {
        let rows: Vec<RfpRow> = sqlx::query_as("SELECT * FROM rfps ORDER BY created_at DESC")
            .fetch_all(&self.pool)
            .await?;

        let ids: Vec<String> = rows.iter().map(|r| r.id.clone()).collect();
        let mut items = self.items_for_rfps(&ids).await?;

        let proposal_counts: Vec<(String, i64)> =
            sqlx::query_as("SELECT rfp_id, COUNT(*) FROM proposals GROUP BY rfp_id")
                .fetch_all(&self.pool)
                .await?;
        let dispatch_counts: Vec<(String, i64)> =
            sqlx::query_as("SELECT rfp_id, COUNT(*) FROM rfp_vendors GROUP BY rfp_id")
                .fetch_all(&self.pool)
                .await?;

        let mut counts: HashMap<String, RelationCounts> = HashMap::new();
        for (rfp_id, count) in proposal_counts {
            counts.entry(rfp_id).or_default().proposals = count;
        }
        for (rfp_id, count) in dispatch_counts {
            counts.entry(rfp_id).or_default().rfp_vendors = count;
        }

        rows.into_iter()
            .map(|row| {
                let id = row.id.clone();
                let rfp = row
                    .into_domain(items.remove(&id).unwrap_or_default())
                    .map_err(DbError::Serialization)?;
                let count = counts.get(&id).copied().unwrap_or_default();
                Ok((rfp, count))
            })
            .collect()
    }

    /// Get an RFP with its items
    pub async fn get(&self, id: &str) -> Result<Rfp, DbError> {
        self.try_get(id)
            .await?
            .ok_or_else(|| DbError::NotFound(id.to_string()))
    }

    /// Get an RFP with its items, or None when absent
    pub async fn try_get(&self, id: &str) -> Result<Option<Rfp>, DbError> {
        let row: Option<RfpRow> = sqlx::query_as("SELECT * FROM rfps WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let mut items = self.items_for_rfps(std::slice::from_ref(&row.id)).await?;
        let rfp_items = items.remove(&row.id).unwrap_or_default();

        row.into_domain(rfp_items)
            .map(Some)
            .map_err(DbError::Serialization)
    }

    async fn items_for_rfps(
        &self,
        rfp_ids: &[String],
    ) -> Result<HashMap<String, Vec<crate::model::RfpItem>>, DbError> {
        if rfp_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows: Vec<RfpItemRow> = sqlx::query_as(
            "SELECT * FROM rfp_items WHERE rfp_id = ANY($1) ORDER BY rfp_id, position",
        )
        .bind(rfp_ids)
        .fetch_all(&self.pool)
        .await?;

        let mut grouped: HashMap<String, Vec<crate::model::RfpItem>> = HashMap::new();
        for row in rows {
            let item = row.into_domain();
            grouped.entry(item.rfp_id.clone()).or_default().push(item);
        }

        Ok(grouped)
    }

    /// Advance the RFP status, enforcing the forward-only lifecycle.
    ///
    /// A request to move backward keeps the current status; the returned
    /// value is whatever the row holds afterwards.
    pub async fn advance_status(&self, id: &str, next: RfpStatus) -> Result<RfpStatus, DbError> {
        let mut tx = self.pool.begin().await?;

        let current: Option<(String,)> =
            sqlx::query_as("SELECT status FROM rfps WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;

        let (current,) = current.ok_or_else(|| DbError::NotFound(id.to_string()))?;
        let current = RfpStatus::parse(&current)
            .ok_or_else(|| DbError::Serialization(format!("Unknown RFP status: {current}")))?;

        if !current.advances_to(next) {
            tx.commit().await?;
            tracing::debug!(rfp = %id, current = current.as_str(), requested = next.as_str(), "Status transition skipped");
            return Ok(current);
        }

        sqlx::query("UPDATE rfps SET status = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(next.as_str())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!(rfp = %id, from = current.as_str(), to = next.as_str(), "RFP status advanced");
        Ok(next)
    }

    /// Delete an RFP; items, dispatch records, and proposals cascade.
    pub async fn delete(&self, id: &str) -> Result<bool, DbError> {
        let result = sqlx::query("DELETE FROM rfps WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        let deleted = result.rows_affected() > 0;
        if deleted {
            tracing::debug!(rfp = %id, "Deleted RFP");
        }

        Ok(deleted)
    }

    /// Record a dispatch attempt. Re-sending updates the existing row for
    /// the (rfp, vendor) pair; a failed attempt leaves any earlier sent_at
    /// untouched.
    pub async fn upsert_dispatch(
        &self,
        rfp_id: &str,
        vendor_id: &str,
        status: DispatchStatus,
        sent_at: Option<DateTime<Utc>>,
    ) -> Result<(), DbError> {
        sqlx::query(
            r#"
            INSERT INTO rfp_vendors (rfp_id, vendor_id, sent_at, status)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (rfp_id, vendor_id) DO UPDATE SET
                status = EXCLUDED.status,
                sent_at = COALESCE(EXCLUDED.sent_at, rfp_vendors.sent_at)
            "#,
        )
        .bind(rfp_id)
        .bind(vendor_id)
        .bind(sent_at)
        .bind(status.as_str())
        .execute(&self.pool)
        .await?;

        tracing::debug!(rfp = %rfp_id, vendor = %vendor_id, status = status.as_str(), "Upserted dispatch record");
        Ok(())
    }

    /// Dispatch records for an RFP, with the vendor attached
    pub async fn dispatches_for_rfp(
        &self,
        rfp_id: &str,
    ) -> Result<Vec<(RfpVendor, Vendor)>, DbError> {
        let rows: Vec<RfpVendorRow> =
            sqlx::query_as("SELECT * FROM rfp_vendors WHERE rfp_id = $1 ORDER BY sent_at DESC NULLS LAST")
                .bind(rfp_id)
                .fetch_all(&self.pool)
                .await?;

        let vendor_ids: Vec<String> = rows.iter().map(|r| r.vendor_id.clone()).collect();
        let vendors = self.vendors_by_ids(&vendor_ids).await?;

        rows.into_iter()
            .map(|row| {
                let record = row.into_domain().map_err(DbError::Serialization)?;
                let vendor = vendors
                    .get(&record.vendor_id)
                    .cloned()
                    .ok_or_else(|| DbError::NotFound(record.vendor_id.clone()))?;
                Ok((record, vendor))
            })
            .collect()
    }

    /// The most recently dispatched SENT record for a vendor, if any.
    /// Used by the inbound matcher as the fallback RFP resolution.
    pub async fn latest_sent_dispatch(
        &self,
        vendor_id: &str,
    ) -> Result<Option<RfpVendor>, DbError> {
        let row: Option<RfpVendorRow> = sqlx::query_as(
            r#"
            SELECT * FROM rfp_vendors
            WHERE vendor_id = $1 AND status = 'SENT'
            ORDER BY sent_at DESC NULLS LAST
            LIMIT 1
            "#,
        )
        .bind(vendor_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.into_domain().map_err(DbError::Serialization))
            .transpose()
    }

    /// Dispatch records for a vendor, most recent first
    pub async fn dispatches_for_vendor(&self, vendor_id: &str) -> Result<Vec<RfpVendor>, DbError> {
        let rows: Vec<RfpVendorRow> = sqlx::query_as(
            "SELECT * FROM rfp_vendors WHERE vendor_id = $1 ORDER BY sent_at DESC NULLS LAST",
        )
        .bind(vendor_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| row.into_domain().map_err(DbError::Serialization))
            .collect()
    }

    async fn vendors_by_ids(&self, ids: &[String]) -> Result<HashMap<String, Vendor>, DbError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows: Vec<VendorRow> = sqlx::query_as("SELECT * FROM vendors WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| (row.id.clone(), row.into_domain()))
            .collect())
    }
}

/// Fields written by a proposal upsert
#[derive(Debug, Clone)]
pub struct ProposalUpsert {
    pub rfp_id: String,
    pub vendor_id: String,
    pub raw_email: String,
    pub raw_subject: Option<String>,
    pub parsed_data: serde_json::Value,
    pub total_price: Option<f64>,
    pub unit_prices: Vec<UnitPrice>,
    pub delivery_days: Option<i32>,
    pub warranty: Option<String>,
    pub payment_terms: Option<String>,
}

/// Repository for proposal operations
#[derive(Clone)]
pub struct ProposalRepository {
    pool: PgPool,
}

impl ProposalRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert or overwrite the proposal for a (rfp, vendor) pair.
    ///
    /// The pair is unique; a second submission replaces the stored payload
    /// and stamps received_at to the current time.
    pub async fn upsert(&self, input: &ProposalUpsert) -> Result<Proposal, DbError> {
        let unit_prices = serde_json::to_value(&input.unit_prices)
            .map_err(|e| DbError::Serialization(e.to_string()))?;

        let row: ProposalRow = sqlx::query_as(
            r#"
            INSERT INTO proposals (
                id, rfp_id, vendor_id, raw_email, raw_subject, parsed_data,
                total_price, unit_prices, delivery_days, warranty, payment_terms
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            ON CONFLICT (rfp_id, vendor_id) DO UPDATE SET
                raw_email = EXCLUDED.raw_email,
                raw_subject = EXCLUDED.raw_subject,
                parsed_data = EXCLUDED.parsed_data,
                total_price = EXCLUDED.total_price,
                unit_prices = EXCLUDED.unit_prices,
                delivery_days = EXCLUDED.delivery_days,
                warranty = EXCLUDED.warranty,
                payment_terms = EXCLUDED.payment_terms,
                received_at = NOW()
            RETURNING *
            "#,
        )
        .bind(uuid::Uuid::new_v4().to_string())
        .bind(&input.rfp_id)
        .bind(&input.vendor_id)
        .bind(&input.raw_email)
        .bind(&input.raw_subject)
        .bind(&input.parsed_data)
        .bind(input.total_price)
        .bind(&unit_prices)
        .bind(input.delivery_days)
        .bind(&input.warranty)
        .bind(&input.payment_terms)
        .fetch_one(&self.pool)
        .await?;

        let proposal = row.into_domain();
        tracing::debug!(proposal = %proposal.id, rfp = %proposal.rfp_id, vendor = %proposal.vendor_id, "Upserted proposal");
        Ok(proposal)
    }

    /// List proposals, optionally filtered by RFP, newest first, with the
    /// vendor attached
    pub async fn list(&self, rfp_id: Option<&str>) -> Result<Vec<(Proposal, Vendor)>, DbError> {
        let rows: Vec<ProposalRow> = match rfp_id {
            Some(rfp_id) => {
                sqlx::query_as(
                    "SELECT * FROM proposals WHERE rfp_id = $1 ORDER BY received_at DESC",
                )
                .bind(rfp_id)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as("SELECT * FROM proposals ORDER BY received_at DESC")
                    .fetch_all(&self.pool)
                    .await?
            }
        };

        self.attach_vendors(rows).await
    }

    /// Get a proposal by ID with the vendor attached
    pub async fn get(&self, id: &str) -> Result<(Proposal, Vendor), DbError> {
        let row: ProposalRow = sqlx::query_as("SELECT * FROM proposals WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::NotFound(id.to_string()))?;

        let mut joined = self.attach_vendors(vec![row]).await?;
        joined
            .pop()
            .ok_or_else(|| DbError::NotFound(id.to_string()))
    }

    /// Find the proposal for a (rfp, vendor) pair
    pub async fn find_by_pair(
        &self,
        rfp_id: &str,
        vendor_id: &str,
    ) -> Result<Option<(Proposal, Vendor)>, DbError> {
        let row: Option<ProposalRow> =
            sqlx::query_as("SELECT * FROM proposals WHERE rfp_id = $1 AND vendor_id = $2")
                .bind(rfp_id)
                .bind(vendor_id)
                .fetch_optional(&self.pool)
                .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let mut joined = self.attach_vendors(vec![row]).await?;
        Ok(joined.pop())
    }

    /// List a vendor's proposals, newest first
    pub async fn list_for_vendor(&self, vendor_id: &str) -> Result<Vec<Proposal>, DbError> {
        let rows: Vec<ProposalRow> =
            sqlx::query_as("SELECT * FROM proposals WHERE vendor_id = $1 ORDER BY received_at DESC")
                .bind(vendor_id)
                .fetch_all(&self.pool)
                .await?;

        Ok(rows.into_iter().map(ProposalRow::into_domain).collect())
    }

    /// Write a comparison evaluation back onto the proposal row
    pub async fn apply_evaluation(
        &self,
        rfp_id: &str,
        vendor_id: &str,
        score: f64,
        summary: &str,
        strengths: &[String],
        weaknesses: &[String],
    ) -> Result<(), DbError> {
        let strengths = serde_json::to_value(strengths)
            .map_err(|e| DbError::Serialization(e.to_string()))?;
        let weaknesses = serde_json::to_value(weaknesses)
            .map_err(|e| DbError::Serialization(e.to_string()))?;

        sqlx::query(
            r#"
            UPDATE proposals SET
                ai_score = $3,
                ai_summary = $4,
                ai_strengths = $5,
                ai_weaknesses = $6
            WHERE rfp_id = $1 AND vendor_id = $2
            "#,
        )
        .bind(rfp_id)
        .bind(vendor_id)
        .bind(score)
        .bind(summary)
        .bind(&strengths)
        .bind(&weaknesses)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn attach_vendors(
        &self,
        rows: Vec<ProposalRow>,
    ) -> Result<Vec<(Proposal, Vendor)>, DbError> {
        let vendor_ids: Vec<String> = rows.iter().map(|r| r.vendor_id.clone()).collect();

        let vendors: HashMap<String, Vendor> = if vendor_ids.is_empty() {
            HashMap::new()
        } else {
            let vendor_rows: Vec<VendorRow> =
                sqlx::query_as("SELECT * FROM vendors WHERE id = ANY($1)")
                    .bind(&vendor_ids)
                    .fetch_all(&self.pool)
                    .await?;
            vendor_rows
                .into_iter()
                .map(|row| (row.id.clone(), row.into_domain()))
                .collect()
        };

        rows.into_iter()
            .map(|row| {
                let proposal = row.into_domain();
                let vendor = vendors
                    .get(&proposal.vendor_id)
                    .cloned()
                    .ok_or_else(|| DbError::NotFound(proposal.vendor_id.clone()))?;
                Ok((proposal, vendor))
            })
            .collect()
    }
}
