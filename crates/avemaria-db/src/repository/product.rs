//! # Product Repository
//!
//! Database operations for the product catalog.
//!
//! ## Key Operations
//! - CRUD with soft delete (is_active flag)
//! - Search by name/ref, category filter, low-stock filter
//! - Inventory valuation stats
//!
//! Stock is mutated here only by direct edits; the sale/purchase paths go
//! through the ledger repository so the adjustment, the document and the
//! ledger entry always commit together.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use avemaria_core::reports::ProductStats;
use avemaria_core::types::{
    NewProduct, Product, ProductDetail, ProductPurchaseLine, ProductSaleLine, UpdateProduct,
};

/// Columns selected for a full [`Product`] row.
const PRODUCT_COLUMNS: &str = "id, ref, name, category, icon, wholesale_price, retail_price, \
                               stock, min_stock, is_active, created_at, updated_at";

/// Catalog listing filters (all optional, combined with AND).
#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    /// Case-insensitive substring match against name and ref.
    pub search: Option<String>,
    /// Exact category match (wire name, e.g. `CANDONGAS`).
    pub category: Option<String>,
    /// Only products at or below their low-stock threshold.
    pub low_stock: bool,
}

/// Repository for product database operations.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Inserts a new product and returns it.
    ///
    /// A duplicate ref surfaces as [`DbError::Duplicate`].
    pub async fn insert(&self, input: &NewProduct) -> DbResult<Product> {
        let now = Utc::now();
        let product = Product {
            id: Uuid::new_v4().to_string(),
            reference: input.reference.trim().to_string(),
            name: input.name.trim().to_string(),
            category: input.category,
            icon: input.icon.clone(),
            wholesale_price: input.wholesale_price,
            retail_price: input.retail_price,
            stock: input.stock,
            min_stock: input.min_stock,
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        debug!(id = %product.id, reference = %product.reference, "Inserting product");

        sqlx::query(
            r#"
            INSERT INTO products (
                id, ref, name, category, icon,
                wholesale_price, retail_price, stock, min_stock,
                is_active, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            "#,
        )
        .bind(&product.id)
        .bind(&product.reference)
        .bind(&product.name)
        .bind(product.category)
        .bind(&product.icon)
        .bind(product.wholesale_price)
        .bind(product.retail_price)
        .bind(product.stock)
        .bind(product.min_stock)
        .bind(product.is_active)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(product)
    }

    /// Gets a product by ID, active or not.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {} FROM products WHERE id = ?1",
            PRODUCT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Lists active products with optional search/category/low-stock filters,
    /// ordered by name.
    pub async fn list(&self, filter: &ProductFilter) -> DbResult<Vec<Product>> {
        let search = filter.search.as_deref().map(str::trim).filter(|s| !s.is_empty());

        let products = sqlx::query_as::<_, Product>(&format!(
            r#"
            SELECT {}
            FROM products
            WHERE is_active = 1
              AND (?1 IS NULL OR name LIKE '%' || ?1 || '%' OR ref LIKE '%' || ?1 || '%')
              AND (?2 IS NULL OR category = ?2)
              AND (?3 = 0 OR stock <= min_stock)
            ORDER BY name ASC
            "#,
            PRODUCT_COLUMNS
        ))
        .bind(search)
        .bind(filter.category.as_deref())
        .bind(filter.low_stock)
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Lists active products at or below their low-stock threshold.
    pub async fn low_stock(&self) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(&format!(
            r#"
            SELECT {}
            FROM products
            WHERE is_active = 1 AND stock <= min_stock
            ORDER BY name ASC
            "#,
            PRODUCT_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Inventory valuation over active products: total units on hand and the
    /// stock valued at wholesale cost and at retail price.
    pub async fn stats(&self) -> DbResult<ProductStats> {
        let (total_units, total_cost_value, total_retail_value) =
            sqlx::query_as::<_, (i64, i64, i64)>(
                r#"
                SELECT
                    COALESCE(SUM(stock), 0),
                    COALESCE(SUM(stock * wholesale_price), 0),
                    COALESCE(SUM(stock * retail_price), 0)
                FROM products
                WHERE is_active = 1
                "#,
            )
            .fetch_one(&self.pool)
            .await?;

        Ok(ProductStats {
            total_units,
            total_cost_value,
            total_retail_value,
        })
    }

    /// Gets an active product with its recent purchase and sale lines.
    ///
    /// Returns `None` for unknown OR soft-deleted products: the detail view
    /// only serves the live catalog.
    pub async fn detail(&self, id: &str) -> DbResult<Option<ProductDetail>> {
        let product = match self.get_by_id(id).await? {
            Some(p) if p.is_active => p,
            _ => return Ok(None),
        };

        let recent_purchases = sqlx::query_as::<_, ProductPurchaseLine>(
            r#"
            SELECT pi.purchase_id, pu.order_number, pi.quantity, pi.unit_cost, pu.purchased_at
            FROM purchase_items pi
            JOIN purchases pu ON pu.id = pi.purchase_id
            WHERE pi.product_id = ?1
            ORDER BY pu.purchased_at DESC
            LIMIT 10
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        let recent_sales = sqlx::query_as::<_, ProductSaleLine>(
            r#"
            SELECT si.sale_id, s.folio, si.quantity, si.unit_revenue, s.sold_at
            FROM sale_items si
            JOIN sales s ON s.id = si.sale_id
            WHERE si.product_id = ?1
            ORDER BY s.sold_at DESC
            LIMIT 10
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(ProductDetail {
            product,
            recent_purchases,
            recent_sales,
        }))
    }

    /// Applies a partial update to an active product and returns the result.
    ///
    /// Unknown or soft-deleted products are reported as not found, matching
    /// the catalog the clients can see.
    pub async fn update(&self, id: &str, changes: &UpdateProduct) -> DbResult<Product> {
        let existing = self
            .get_by_id(id)
            .await?
            .filter(|p| p.is_active)
            .ok_or_else(|| DbError::not_found("Product", id))?;

        let updated = Product {
            reference: changes
                .reference
                .as_deref()
                .map(|r| r.trim().to_string())
                .unwrap_or(existing.reference),
            name: changes
                .name
                .as_deref()
                .map(|n| n.trim().to_string())
                .unwrap_or(existing.name),
            category: changes.category.unwrap_or(existing.category),
            icon: changes.icon.clone().or(existing.icon),
            wholesale_price: changes.wholesale_price.unwrap_or(existing.wholesale_price),
            retail_price: changes.retail_price.unwrap_or(existing.retail_price),
            stock: changes.stock.unwrap_or(existing.stock),
            min_stock: changes.min_stock.unwrap_or(existing.min_stock),
            updated_at: Utc::now(),
            ..existing
        };

        debug!(id = %updated.id, "Updating product");

        sqlx::query(
            r#"
            UPDATE products SET
                ref = ?2,
                name = ?3,
                category = ?4,
                icon = ?5,
                wholesale_price = ?6,
                retail_price = ?7,
                stock = ?8,
                min_stock = ?9,
                updated_at = ?10
            WHERE id = ?1
            "#,
        )
        .bind(&updated.id)
        .bind(&updated.reference)
        .bind(&updated.name)
        .bind(updated.category)
        .bind(&updated.icon)
        .bind(updated.wholesale_price)
        .bind(updated.retail_price)
        .bind(updated.stock)
        .bind(updated.min_stock)
        .bind(updated.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(updated)
    }

    /// Soft-deletes a product by setting is_active = false.
    ///
    /// ## Why Soft Delete?
    /// - Historical sale and purchase lines still reference this product
    /// - Can be restored manually if deleted by mistake
    pub async fn soft_delete(&self, id: &str) -> DbResult<()> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE products
            SET is_active = 0, updated_at = ?2
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::testing::{product_input, test_db};
    use avemaria_core::types::Category;

    #[tokio::test]
    async fn test_insert_and_get() {
        let db = test_db().await;
        let repo = db.products();

        let created = repo
            .insert(&product_input("CAN-001", 22_000, 60_000, 10))
            .await
            .unwrap();

        let fetched = repo.get_by_id(&created.id).await.unwrap().unwrap();
        assert_eq!(fetched.reference, "CAN-001");
        assert_eq!(fetched.stock, 10);
        assert_eq!(fetched.category, Category::Candongas);
        assert!(fetched.is_active);
    }

    #[tokio::test]
    async fn test_duplicate_ref_rejected() {
        let db = test_db().await;
        let repo = db.products();

        repo.insert(&product_input("CAN-001", 22_000, 60_000, 10))
            .await
            .unwrap();
        let err = repo
            .insert(&product_input("CAN-001", 20_000, 55_000, 5))
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::Duplicate { .. }));
    }

    #[tokio::test]
    async fn test_list_filters() {
        let db = test_db().await;
        let repo = db.products();

        repo.insert(&product_input("CAN-001", 22_000, 60_000, 10))
            .await
            .unwrap();
        let mut topos = product_input("TOP-001", 10_000, 30_000, 2);
        topos.name = "Topos mariposa".to_string();
        topos.category = Category::Topos;
        repo.insert(&topos).await.unwrap();

        // Search by ref fragment
        let found = repo
            .list(&ProductFilter {
                search: Some("CAN".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].reference, "CAN-001");

        // Search by name fragment, case-insensitive
        let found = repo
            .list(&ProductFilter {
                search: Some("mariposa".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(found.len(), 1);

        // Category filter
        let found = repo
            .list(&ProductFilter {
                category: Some("TOPOS".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].category, Category::Topos);

        // Low-stock filter (stock 2 <= min_stock 3)
        let found = repo
            .list(&ProductFilter {
                low_stock: true,
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].reference, "TOP-001");
    }

    #[tokio::test]
    async fn test_stats() {
        let db = test_db().await;
        let repo = db.products();

        repo.insert(&product_input("CAN-001", 22_000, 60_000, 10))
            .await
            .unwrap();
        repo.insert(&product_input("TOP-001", 10_000, 30_000, 5))
            .await
            .unwrap();

        let stats = repo.stats().await.unwrap();
        assert_eq!(stats.total_units, 15);
        assert_eq!(stats.total_cost_value, 10 * 22_000 + 5 * 10_000);
        assert_eq!(stats.total_retail_value, 10 * 60_000 + 5 * 30_000);
    }

    #[tokio::test]
    async fn test_update_partial() {
        let db = test_db().await;
        let repo = db.products();

        let created = repo
            .insert(&product_input("CAN-001", 22_000, 60_000, 10))
            .await
            .unwrap();

        let updated = repo
            .update(
                &created.id,
                &UpdateProduct {
                    retail_price: Some(65_000),
                    stock: Some(12),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.retail_price, 65_000);
        assert_eq!(updated.stock, 12);
        // Untouched fields survive
        assert_eq!(updated.wholesale_price, 22_000);
        assert_eq!(updated.reference, "CAN-001");
    }

    #[tokio::test]
    async fn test_soft_delete_hides_from_catalog() {
        let db = test_db().await;
        let repo = db.products();

        let created = repo
            .insert(&product_input("CAN-001", 22_000, 60_000, 10))
            .await
            .unwrap();

        repo.soft_delete(&created.id).await.unwrap();

        // Hidden from the listing and the detail view
        assert!(repo.list(&ProductFilter::default()).await.unwrap().is_empty());
        assert!(repo.detail(&created.id).await.unwrap().is_none());

        // Update refuses to touch it
        let err = repo
            .update(&created.id, &UpdateProduct::default())
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));

        // But the row is still there for history
        assert!(repo.get_by_id(&created.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_soft_delete_unknown_product() {
        let db = test_db().await;
        let err = db.products().soft_delete("missing").await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }
}
