//! SQLite-backed catalog store using sqlx.

use {
    anyhow::{Context, Result},
    async_trait::async_trait,
    sqlx::{SqlitePool, sqlite::SqlitePoolOptions},
};

use crate::{
    product::{DealType, Platform, Product},
    store::CatalogStore,
};

/// SQLite-backed persistence for the product catalog.
pub struct SqliteCatalogStore {
    pool: SqlitePool,
}

impl SqliteCatalogStore {
    /// Create a store with its own connection pool and run migrations.
    pub async fn new(database_url: &str) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await
            .context("failed to connect to SQLite")?;

        crate::run_migrations(&pool).await?;

        Ok(Self { pool })
    }

    /// Create a store using an existing pool (migrations must already be run).
    ///
    /// Call [`crate::run_migrations`] before using this constructor.
    #[must_use]
    pub fn with_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

type ProductRow = (
    String, // id
    String, // title
    String, // description
    i64,    // price
    String, // category
    String, // image
    f64,    // rating
    String, // tags (JSON array)
    String, // platform
    String, // deal_type
);

fn row_to_product(row: ProductRow) -> Product {
    let (id, title, description, price, category, image, rating, tags, platform, deal_type) = row;
    Product {
        id,
        title,
        description,
        price,
        category,
        image,
        rating,
        tags: serde_json::from_str(&tags).unwrap_or_default(),
        platform: Platform::parse(&platform),
        deal_type: DealType::parse(&deal_type),
    }
}

#[async_trait]
impl CatalogStore for SqliteCatalogStore {
    async fn upsert(&self, product: &Product) -> Result<()> {
        let tags = serde_json::to_string(&product.tags)?;
        sqlx::query(
            "INSERT INTO products (id, title, description, price, category, image, rating, tags, platform, deal_type)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(id) DO UPDATE SET
                 title = excluded.title,
                 description = excluded.description,
                 price = excluded.price,
                 category = excluded.category,
                 image = excluded.image,
                 rating = excluded.rating,
                 tags = excluded.tags,
                 platform = excluded.platform,
                 deal_type = excluded.deal_type,
                 updated_at = datetime('now')",
        )
        .bind(&product.id)
        .bind(&product.title)
        .bind(&product.description)
        .bind(product.price)
        .bind(&product.category)
        .bind(&product.image)
        .bind(product.rating)
        .bind(&tags)
        .bind(product.platform.as_str())
        .bind(product.deal_type.as_str())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<Product>> {
        let row: Option<ProductRow> = sqlx::query_as(
            "SELECT id, title, description, price, category, image, rating, tags, platform, deal_type
             FROM products WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(row_to_product))
    }

    async fn list(&self) -> Result<Vec<Product>> {
        let rows: Vec<ProductRow> = sqlx::query_as(
            "SELECT id, title, description, price, category, image, rating, tags, platform, deal_type
             FROM products ORDER BY updated_at DESC, id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(row_to_product).collect())
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {super::*, crate::product::*};

    async fn make_store() -> SqliteCatalogStore {
        SqliteCatalogStore::new("sqlite::memory:").await.unwrap()
    }

    fn make_product(id: &str) -> Product {
        Product {
            id: id.into(),
            title: format!("deal-{id}"),
            description: format!("deal-{id}\nPP 899"),
            price: 899,
            category: DEALS_CATEGORY.into(),
            image: "https://picsum.photos/500".into(),
            rating: 0.0,
            tags: Vec::new(),
            platform: Platform::Amazon,
            deal_type: DealType::Discount,
        }
    }

    #[tokio::test]
    async fn test_sqlite_roundtrip() {
        let store = make_store().await;
        store.upsert(&make_product("https://amzn.to/a")).await.unwrap();
        store.upsert(&make_product("https://fkrt.it/b")).await.unwrap();

        let all = store.list().await.unwrap();
        assert_eq!(all.len(), 2);

        let found = store.get("https://amzn.to/a").await.unwrap().unwrap();
        assert_eq!(found, make_product("https://amzn.to/a"));
    }

    #[tokio::test]
    async fn test_sqlite_upsert_is_idempotent() {
        let store = make_store().await;
        let product = make_product("https://amzn.to/a");
        store.upsert(&product).await.unwrap();
        store.upsert(&product).await.unwrap();

        let all = store.list().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0], product);
    }

    #[tokio::test]
    async fn test_sqlite_upsert_overwrites_whole_row() {
        let store = make_store().await;
        store.upsert(&make_product("https://amzn.to/a")).await.unwrap();

        let mut updated = make_product("https://amzn.to/a");
        updated.title = "corrected".into();
        updated.price = 799;
        updated.deal_type = DealType::Review;
        store.upsert(&updated).await.unwrap();

        let found = store.get("https://amzn.to/a").await.unwrap().unwrap();
        assert_eq!(found, updated);
    }

    #[tokio::test]
    async fn test_sqlite_tags_column_roundtrip() {
        let store = make_store().await;
        let mut product = make_product("https://amzn.to/a");
        product.tags = vec!["electronics".into(), "clock".into()];
        store.upsert(&product).await.unwrap();

        let found = store.get("https://amzn.to/a").await.unwrap().unwrap();
        assert_eq!(found.tags, vec!["electronics", "clock"]);
    }

    #[tokio::test]
    async fn test_sqlite_get_missing() {
        let store = make_store().await;
        assert!(store.get("https://nowhere").await.unwrap().is_none());
    }
}
