//! Seed the database with purchases for QR import testing.
//!
//! Reads receipts from a YAML file and inserts them into `pantry.purchase`.
//! Purchases that already exist are skipped, so the command can be re-run.
//!
//! ```yaml
//! purchases:
//!   - id: 0b7f6f4e-3c1a-4f0e-9a55-2f0d7c1f4a10   # optional, generated if absent
//!     store_name: Corner Market
//!     purchase_date: 2026-03-01T10:15:00Z
//!     receipt_number: R-1001
//!     payment_method: card
//!     total_amount: 7.48
//!     items:
//!       - item_name: Milk
//!         quantity: 1
//!         unit: l
//!         unit_cost: 1.99
//!         expiration_date: 2026-03-08T00:00:00Z
//!         category: dairy
//! ```

use std::path::Path;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::{error, info};
use uuid::Uuid;

use pantry_manager_core::{ProductId, Purchase, PurchaseId, PurchaseItem};
use pantry_manager_server::db::{self, PurchaseRepository, RepositoryError};

/// Top-level seed file.
#[derive(Debug, Deserialize)]
pub struct SeedFile {
    pub purchases: Vec<PurchaseSeed>,
}

/// One purchase in a seed file.
#[derive(Debug, Deserialize)]
pub struct PurchaseSeed {
    pub id: Option<Uuid>,
    pub store_name: String,
    pub purchase_date: DateTime<Utc>,
    pub receipt_number: String,
    #[serde(default = "default_payment_method")]
    pub payment_method: String,
    pub total_amount: Option<Decimal>,
    pub items: Vec<PurchaseItemSeed>,
}

/// One receipt line in a seed file.
#[derive(Debug, Deserialize)]
pub struct PurchaseItemSeed {
    pub product_id: Option<Uuid>,
    pub item_name: String,
    pub quantity: f64,
    pub unit: String,
    pub unit_cost: Decimal,
    pub expiration_date: Option<DateTime<Utc>>,
    pub category: String,
}

fn default_payment_method() -> String {
    "card".to_string()
}

impl PurchaseSeed {
    /// Build the purchase, generating missing IDs.
    ///
    /// A missing total is computed from the lines.
    fn into_purchase(self, now: DateTime<Utc>) -> Purchase {
        let items: Vec<PurchaseItem> = self
            .items
            .into_iter()
            .map(|item| PurchaseItem {
                product_id: item.product_id.map_or_else(ProductId::generate, ProductId::new),
                item_name: item.item_name,
                quantity: item.quantity,
                unit: item.unit,
                unit_cost: item.unit_cost,
                expiration_date: item.expiration_date,
                category: item.category,
            })
            .collect();

        let total_amount = self.total_amount.unwrap_or_else(|| line_total(&items));

        Purchase {
            id: self.id.map_or_else(PurchaseId::generate, PurchaseId::new),
            store_name: self.store_name,
            purchase_date: self.purchase_date,
            receipt_number: self.receipt_number,
            payment_method: self.payment_method,
            total_amount,
            created_at: now,
            items,
        }
    }
}

/// Sum of `unit_cost * quantity`, rounded to cents.
fn line_total(items: &[PurchaseItem]) -> Decimal {
    items
        .iter()
        .map(|item| item.unit_cost * Decimal::try_from(item.quantity).unwrap_or(Decimal::ZERO))
        .sum::<Decimal>()
        .round_dp(2)
}

/// Check a seed file for problems before touching the database.
fn validate(seed: &SeedFile) -> Vec<String> {
    let mut errors = Vec::new();
    for (index, purchase) in seed.purchases.iter().enumerate() {
        if purchase.store_name.trim().is_empty() {
            errors.push(format!("purchase {index}: store_name is empty"));
        }
        if purchase.items.is_empty() {
            errors.push(format!("purchase {index}: no items"));
        }
        for (line, item) in purchase.items.iter().enumerate() {
            if item.item_name.trim().is_empty() {
                errors.push(format!("purchase {index} item {line}: item_name is empty"));
            }
            if !item.quantity.is_finite() || item.quantity <= 0.0 {
                errors.push(format!("purchase {index} item {line}: quantity must be positive"));
            }
            if item.unit_cost.is_sign_negative() {
                errors.push(format!("purchase {index} item {line}: unit_cost is negative"));
            }
        }
    }
    errors
}

/// Seed purchases from a YAML file.
///
/// # Arguments
///
/// * `file_path` - Path to the YAML seed file
/// * `dry_run` - If true, only parse and validate the file
///
/// # Errors
///
/// Returns an error if the database URL is missing, the file cannot be read
/// or fails validation, or a database operation fails.
pub async fn purchases(file_path: &str, dry_run: bool) -> Result<(), Box<dyn std::error::Error>> {
    let path = Path::new(file_path);
    if !path.exists() {
        return Err(format!("File not found: {file_path}").into());
    }

    info!(path = %file_path, "Loading purchases from file");

    // Read and validate YAML before connecting to database
    let content = tokio::fs::read_to_string(path).await?;
    let seed: SeedFile = serde_yaml::from_str(&content)?;
    info!(purchases = seed.purchases.len(), "Parsed seed file");

    let errors = validate(&seed);
    if !errors.is_empty() {
        error!("Seed file validation failed:");
        for err in &errors {
            error!("  - {err}");
        }
        return Err(format!("{} validation errors found", errors.len()).into());
    }

    if dry_run {
        info!("Dry run: seed file is valid, nothing written");
        return Ok(());
    }

    let database_url = super::database_url().ok_or("PANTRY_DATABASE_URL not set")?;
    let pool = db::create_pool(&database_url).await?;
    info!("Connected to database");

    let repo = PurchaseRepository::new(&pool);
    let now = Utc::now();
    let mut inserted = 0_usize;
    let mut skipped = 0_usize;

    for seed in seed.purchases {
        let purchase = seed.into_purchase(now);
        match repo.insert(&purchase).await {
            Ok(()) => {
                info!(id = %purchase.id, store = %purchase.store_name, "Inserted purchase");
                inserted += 1;
            }
            Err(RepositoryError::Conflict(_)) => {
                info!(id = %purchase.id, "Purchase already exists, skipping");
                skipped += 1;
            }
            Err(e) => return Err(e.into()),
        }
    }

    info!("Seeding complete!");
    info!("  Purchases inserted: {inserted}");
    info!("  Purchases skipped (already exist): {skipped}");
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    const SEED: &str = r"
purchases:
  - id: 0b7f6f4e-3c1a-4f0e-9a55-2f0d7c1f4a10
    store_name: Corner Market
    purchase_date: 2026-03-01T10:15:00Z
    receipt_number: R-1001
    items:
      - item_name: Milk
        quantity: 2
        unit: l
        unit_cost: 1.25
        category: dairy
      - item_name: Bread
        quantity: 1
        unit: pcs
        unit_cost: 2.49
        expiration_date: 2026-03-04T00:00:00Z
        category: bakery
";

    #[test]
    fn test_seed_file_parses() {
        let seed: SeedFile = serde_yaml::from_str(SEED).unwrap();
        assert_eq!(seed.purchases.len(), 1);
        assert_eq!(seed.purchases[0].payment_method, "card");
        assert!(validate(&seed).is_empty());
    }

    #[test]
    fn test_missing_total_is_computed() {
        let mut seed: SeedFile = serde_yaml::from_str(SEED).unwrap();
        let purchase = seed.purchases.remove(0).into_purchase(Utc::now());

        assert_eq!(purchase.total_amount, Decimal::new(499, 2));
        assert_eq!(purchase.id.to_string(), "0b7f6f4e-3c1a-4f0e-9a55-2f0d7c1f4a10");
        assert_eq!(purchase.items[1].item_name, "Bread");
    }

    #[test]
    fn test_validation_reports_bad_lines() {
        let mut seed: SeedFile = serde_yaml::from_str(SEED).unwrap();
        seed.purchases[0].items[0].quantity = 0.0;
        seed.purchases[0].items[1].item_name = " ".to_string();

        let errors = validate(&seed);
        assert_eq!(errors.len(), 2);
        assert!(errors[0].contains("quantity"));
    }
}
