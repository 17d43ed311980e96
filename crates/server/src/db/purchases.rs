//! Purchase repository for QR receipt lookups and seeding.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use pantry_manager_core::{ProductId, Purchase, PurchaseId, PurchaseItem};

use super::RepositoryError;

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct PurchaseRow {
    id: Uuid,
    store_name: String,
    purchase_date: DateTime<Utc>,
    receipt_number: String,
    payment_method: String,
    total_amount: Decimal,
    created_at: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
struct PurchaseItemRow {
    product_id: Uuid,
    item_name: String,
    quantity: f64,
    unit: String,
    unit_cost: Decimal,
    expiration_date: Option<DateTime<Utc>>,
    category: String,
}

impl From<PurchaseItemRow> for PurchaseItem {
    fn from(row: PurchaseItemRow) -> Self {
        Self {
            product_id: ProductId::new(row.product_id),
            item_name: row.item_name,
            quantity: row.quantity,
            unit: row.unit,
            unit_cost: row.unit_cost,
            expiration_date: row.expiration_date,
            category: row.category,
        }
    }
}

fn assemble(row: PurchaseRow, items: Vec<PurchaseItemRow>) -> Purchase {
    Purchase {
        id: PurchaseId::new(row.id),
        store_name: row.store_name,
        purchase_date: row.purchase_date,
        receipt_number: row.receipt_number,
        payment_method: row.payment_method,
        total_amount: row.total_amount,
        created_at: row.created_at,
        items: items.into_iter().map(Into::into).collect(),
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for purchase database operations.
pub struct PurchaseRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> PurchaseRepository<'a> {
    /// Create a new purchase repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a purchase and its lines by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn get_by_id(&self, id: PurchaseId) -> Result<Option<Purchase>, RepositoryError> {
        let Some(row) = sqlx::query_as::<_, PurchaseRow>(
            "SELECT id, store_name, purchase_date, receipt_number, payment_method,
                    total_amount, created_at
             FROM pantry.purchase
             WHERE id = $1",
        )
        .bind(id.as_uuid())
        .fetch_optional(self.pool)
        .await?
        else {
            return Ok(None);
        };

        let items = sqlx::query_as::<_, PurchaseItemRow>(
            "SELECT product_id, item_name, quantity, unit, unit_cost, expiration_date, category
             FROM pantry.purchase_item
             WHERE purchase_id = $1
             ORDER BY position",
        )
        .bind(id.as_uuid())
        .fetch_all(self.pool)
        .await?;

        Ok(Some(assemble(row, items)))
    }

    /// Insert a purchase and its lines in one transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if a purchase with the same ID exists.
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn insert(&self, purchase: &Purchase) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO pantry.purchase
                (id, store_name, purchase_date, receipt_number, payment_method, total_amount, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(purchase.id.as_uuid())
        .bind(&purchase.store_name)
        .bind(purchase.purchase_date)
        .bind(&purchase.receipt_number)
        .bind(&purchase.payment_method)
        .bind(purchase.total_amount)
        .bind(purchase.created_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            RepositoryError::conflict_on_unique(e, &format!("purchase {} already exists", purchase.id))
        })?;

        for (position, item) in purchase.items.iter().enumerate() {
            let position = i32::try_from(position).map_err(|_| {
                RepositoryError::Conflict("purchase has too many items".to_string())
            })?;

            sqlx::query(
                "INSERT INTO pantry.purchase_item
                    (purchase_id, position, product_id, item_name, quantity, unit,
                     unit_cost, expiration_date, category)
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
            )
            .bind(purchase.id.as_uuid())
            .bind(position)
            .bind(item.product_id.as_uuid())
            .bind(&item.item_name)
            .bind(item.quantity)
            .bind(&item.unit)
            .bind(item.unit_cost)
            .bind(item.expiration_date)
            .bind(&item.category)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn test_assemble_keeps_line_order() {
        let now = Utc::now();
        let row = PurchaseRow {
            id: Uuid::new_v4(),
            store_name: "Corner Market".to_string(),
            purchase_date: now,
            receipt_number: "R-1".to_string(),
            payment_method: "cash".to_string(),
            total_amount: Decimal::new(550, 2),
            created_at: now,
        };
        let line = |name: &str| PurchaseItemRow {
            product_id: Uuid::new_v4(),
            item_name: name.to_string(),
            quantity: 1.0,
            unit: "pcs".to_string(),
            unit_cost: Decimal::new(275, 2),
            expiration_date: None,
            category: "produce".to_string(),
        };

        let purchase = assemble(row, vec![line("Apples"), line("Pears")]);

        assert_eq!(purchase.items.len(), 2);
        assert_eq!(purchase.items[0].item_name, "Apples");
        assert_eq!(purchase.items[1].item_name, "Pears");
        assert_eq!(purchase.total_amount, Decimal::new(550, 2));
    }
}
