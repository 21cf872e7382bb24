//! Product catalog: model, store trait, and SQLite persistence.
//!
//! The catalog is the boundary between the ingestion pipeline and the rest
//! of the product: the listener writes through [`CatalogStore`], downstream
//! consumers read the same records. Records are keyed by the deal link and
//! upserts replace the whole row, so re-ingesting a post is always safe.

pub mod product;
pub mod store;
pub mod store_memory;
pub mod store_sqlite;

pub use {
    product::{DEALS_CATEGORY, DealType, Platform, Product},
    store::{CatalogStore, upsert_batch},
    store_memory::InMemoryCatalogStore,
    store_sqlite::SqliteCatalogStore,
};

/// Run database migrations for the catalog.
///
/// Creates the `products` table. Called automatically by
/// [`SqliteCatalogStore::new`]; call it yourself before
/// [`SqliteCatalogStore::with_pool`] when sharing a pool.
pub async fn run_migrations(pool: &sqlx::SqlitePool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations")
        .set_ignore_missing(true)
        .run(pool)
        .await?;
    Ok(())
}
