//! # Product Repository
//!
//! Database operations for the product catalog.
//!
//! ## Key Operations
//! - Paged listing with category and text filters
//! - CRUD operations (hard delete)
//!
//! ## Listing
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  GET /public/products?category=Minuman&search=teh&page=2&limit=10      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ProductQuery { category, search, page: 2, limit: 10 }                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  WHERE category = 'Minuman'                                            │
//! │    AND (name LIKE '%teh%' OR description LIKE … OR barcode LIKE …)     │
//! │  ORDER BY name, id  LIMIT 10 OFFSET 10                                 │
//! │       │                                                                 │
//! │       ├── SELECT COUNT(*) with the same WHERE → pagination.total       │
//! │       ▼                                                                 │
//! │  ProductPage { products, pagination }                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Inputs are expected to be validated by `warung_core::validation` first.

use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use warung_core::filter::ProductQuery;
use warung_core::{NewProduct, Pagination, Product, ProductPage, ProductPatch};

const PRODUCT_COLUMNS: &str =
    "id, name, price, stock, category, description, barcode, created_at, updated_at";

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.products();
///
/// let page = repo.list(&ProductQuery::default()).await?;
/// let product = repo.get(42).await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Lists one page of products ordered by name.
    pub async fn list(&self, query: &ProductQuery) -> DbResult<ProductPage> {
        debug!(
            category = ?query.category,
            search = ?query.search,
            page = query.page,
            limit = query.limit,
            "Listing products"
        );

        let mut count_query = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM products");
        push_filters(&mut count_query, query);
        let (total,) = count_query
            .build_query_as::<(i64,)>()
            .fetch_one(&self.pool)
            .await?;

        let mut select =
            QueryBuilder::<Sqlite>::new(format!("SELECT {PRODUCT_COLUMNS} FROM products"));
        push_filters(&mut select, query);
        select
            .push(" ORDER BY name COLLATE NOCASE, id LIMIT ")
            .push_bind(i64::from(query.limit))
            .push(" OFFSET ")
            .push_bind(query.offset());

        let products = select
            .build_query_as::<Product>()
            .fetch_all(&self.pool)
            .await?;

        debug!(count = products.len(), total, "Listed products");
        Ok(ProductPage {
            products,
            pagination: Pagination::new(query.page, query.limit, total),
        })
    }

    /// Gets a product by its ID.
    ///
    /// ## Returns
    /// * `Ok(Some(Product))` - Product found
    /// * `Ok(None)` - Product not found
    pub async fn find(&self, id: i64) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Gets a product by its ID, failing with `NotFound`.
    pub async fn get(&self, id: i64) -> DbResult<Product> {
        self.find(id)
            .await?
            .ok_or_else(|| DbError::not_found("Product", id))
    }

    /// Inserts a new product and returns it with its assigned ID.
    pub async fn create(&self, product: &NewProduct) -> DbResult<Product> {
        debug!(name = %product.name, price = product.price, "Inserting product");

        let now = Utc::now();

        let created = sqlx::query_as::<_, Product>(&format!(
            r#"
            INSERT INTO products (
                name, price, stock, category, description, barcode, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)
            RETURNING {PRODUCT_COLUMNS}
            "#
        ))
        .bind(product.name.trim())
        .bind(product.price)
        .bind(product.stock)
        .bind(product.category.trim())
        .bind(product.description.as_deref())
        .bind(product.barcode.as_deref().map(str::trim))
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        debug!(id = created.id, "Product inserted");
        Ok(created)
    }

    /// Applies a partial update. Fields absent from the patch keep their value.
    ///
    /// ## Returns
    /// * `Ok(Product)` - The updated row
    /// * `Err(DbError::NotFound)` - Product doesn't exist
    pub async fn update(&self, id: i64, patch: &ProductPatch) -> DbResult<Product> {
        debug!(id, "Updating product");

        let now = Utc::now();

        let updated = sqlx::query_as::<_, Product>(&format!(
            r#"
            UPDATE products SET
                name = COALESCE(?2, name),
                price = COALESCE(?3, price),
                stock = COALESCE(?4, stock),
                category = COALESCE(?5, category),
                description = COALESCE(?6, description),
                barcode = COALESCE(?7, barcode),
                updated_at = ?8
            WHERE id = ?1
            RETURNING {PRODUCT_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(patch.name.as_deref().map(str::trim))
        .bind(patch.price)
        .bind(patch.stock)
        .bind(patch.category.as_deref().map(str::trim))
        .bind(patch.description.as_deref())
        .bind(patch.barcode.as_deref().map(str::trim))
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;

        updated.ok_or_else(|| DbError::not_found("Product", id))
    }

    /// Hard-deletes a product.
    ///
    /// Historical sale items keep their `product_id` and name snapshot.
    pub async fn delete(&self, id: i64) -> DbResult<()> {
        debug!(id, "Deleting product");

        let result = sqlx::query("DELETE FROM products WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Counts all products.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

fn push_filters(builder: &mut QueryBuilder<'_, Sqlite>, query: &ProductQuery) {
    builder.push(" WHERE 1 = 1");

    if let Some(category) = &query.category {
        builder.push(" AND category = ").push_bind(category.clone());
    }

    if let Some(search) = &query.search {
        let pattern = format!("%{}%", escape_like(search));
        builder
            .push(" AND (name LIKE ")
            .push_bind(pattern.clone())
            .push(" ESCAPE '\\' OR description LIKE ")
            .push_bind(pattern.clone())
            .push(" ESCAPE '\\' OR barcode LIKE ")
            .push_bind(pattern)
            .push(" ESCAPE '\\')");
    }
}

/// Escapes LIKE wildcards so user input matches literally.
fn escape_like(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support::{seed_product, test_db};

    #[tokio::test]
    async fn test_create_and_get() {
        let db = test_db().await;
        let created = seed_product(&db, "  Minyak Goreng 1L ", 18_000, 12).await;

        assert!(created.id > 0);
        assert_eq!(created.name, "Minyak Goreng 1L");

        let fetched = db.products().get(created.id).await.unwrap();
        assert_eq!(fetched, created);
        assert!(db.products().find(created.id + 1).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_patch_keeps_absent_fields() {
        let db = test_db().await;
        let product = seed_product(&db, "Gula 1kg", 15_000, 8).await;

        let updated = db
            .products()
            .update(
                product.id,
                &ProductPatch {
                    price: Some(16_500),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.price, 16_500);
        assert_eq!(updated.stock, 8);
        assert_eq!(updated.name, "Gula 1kg");
        assert!(updated.updated_at >= product.updated_at);

        let missing = db.products().update(999, &ProductPatch::default()).await;
        assert!(matches!(missing, Err(DbError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_negative_stock_rejected_by_schema() {
        let db = test_db().await;
        let product = seed_product(&db, "Telur 1kg", 28_000, 3).await;

        let result = db
            .products()
            .update(
                product.id,
                &ProductPatch {
                    stock: Some(-1),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(result, Err(DbError::CheckViolation { .. })));
        assert_eq!(db.products().get(product.id).await.unwrap().stock, 3);
    }

    #[tokio::test]
    async fn test_delete() {
        let db = test_db().await;
        let product = seed_product(&db, "Sabun Mandi", 4_000, 20).await;

        db.products().delete(product.id).await.unwrap();
        assert!(db.products().find(product.id).await.unwrap().is_none());
        assert!(matches!(
            db.products().delete(product.id).await,
            Err(DbError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_list_pages_and_filters() {
        let db = test_db().await;
        for name in ["Teh Pucuk", "Kopi Kapal Api", "Teh Botol", "Aqua 600ml"] {
            seed_product(&db, name, 5_000, 10).await;
        }
        db.products()
            .create(&NewProduct {
                name: "Sikat Gigi".to_string(),
                price: 9_000,
                stock: 5,
                category: "Toiletries".to_string(),
                description: Some("bulu halus".to_string()),
                barcode: None,
            })
            .await
            .unwrap();

        let first = db
            .products()
            .list(&ProductQuery {
                limit: 2,
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(first.pagination.total, 5);
        assert_eq!(first.pagination.total_pages, 3);
        let names: Vec<_> = first.products.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["Aqua 600ml", "Kopi Kapal Api"]);

        let teh = db
            .products()
            .list(&ProductQuery {
                search: Some("teh".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(teh.pagination.total, 2);

        let by_description = db
            .products()
            .list(&ProductQuery {
                search: Some("HALUS".to_string()),
                category: Some("Toiletries".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(by_description.products.len(), 1);
        assert_eq!(by_description.products[0].name, "Sikat Gigi");

        let past_end = db
            .products()
            .list(&ProductQuery {
                page: 9,
                ..Default::default()
            })
            .await
            .unwrap();
        assert!(past_end.products.is_empty());
        assert_eq!(past_end.pagination.total, 5);
    }

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
    }
}
