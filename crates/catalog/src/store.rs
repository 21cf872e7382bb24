use {
    anyhow::Result,
    async_trait::async_trait,
    tracing::{info, warn},
};

use crate::product::Product;

/// Persistent catalog storage keyed by product identity.
///
/// `upsert` must be idempotent per id: create-if-absent, whole-row
/// replace-if-present, no partial-field merge. Concurrent upserts to the
/// same id resolve last-writer-wins; that is a documented race, not a
/// consistency guarantee.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn upsert(&self, product: &Product) -> Result<()>;
    async fn get(&self, id: &str) -> Result<Option<Product>>;
    async fn list(&self) -> Result<Vec<Product>>;
}

/// Write a batch of candidates, best-effort per item.
///
/// A failing item is logged and skipped; the rest of the batch continues.
/// There is no transaction across the batch — a crash mid-batch leaves a
/// post partially ingested, and per-id idempotency makes re-delivery safe.
/// Returns the number of products persisted.
pub async fn upsert_batch(store: &dyn CatalogStore, products: &[Product]) -> usize {
    let mut saved = 0;
    for product in products {
        match store.upsert(product).await {
            Ok(()) => {
                info!(id = %product.id, title = %product.title, "saved product");
                saved += 1;
            },
            Err(e) => {
                warn!(id = %product.id, error = %e, "failed to save product");
            },
        }
    }
    saved
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {super::*, crate::product::*, crate::store_memory::InMemoryCatalogStore};

    fn make_product(id: &str) -> Product {
        Product {
            id: id.into(),
            title: format!("deal-{id}"),
            description: "desc".into(),
            price: 100,
            category: DEALS_CATEGORY.into(),
            image: "https://picsum.photos/500".into(),
            rating: 0.0,
            tags: Vec::new(),
            platform: Platform::Other,
            deal_type: DealType::Discount,
        }
    }

    /// Store that rejects one specific id, for batch-continuation tests.
    struct RejectingStore {
        inner: InMemoryCatalogStore,
        reject_id: String,
    }

    #[async_trait]
    impl CatalogStore for RejectingStore {
        async fn upsert(&self, product: &Product) -> Result<()> {
            if product.id == self.reject_id {
                anyhow::bail!("record rejected: {}", product.id);
            }
            self.inner.upsert(product).await
        }

        async fn get(&self, id: &str) -> Result<Option<Product>> {
            self.inner.get(id).await
        }

        async fn list(&self) -> Result<Vec<Product>> {
            self.inner.list().await
        }
    }

    #[tokio::test]
    async fn batch_saves_all() {
        let store = InMemoryCatalogStore::new();
        let products = vec![make_product("a"), make_product("b")];
        assert_eq!(upsert_batch(&store, &products).await, 2);
        assert_eq!(store.list().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn batch_continues_past_failure() {
        let store = RejectingStore {
            inner: InMemoryCatalogStore::new(),
            reject_id: "bad".into(),
        };
        let products = vec![make_product("a"), make_product("bad"), make_product("c")];
        assert_eq!(upsert_batch(&store, &products).await, 2);

        let saved = store.list().await.unwrap();
        assert_eq!(saved.len(), 2);
        assert!(store.get("bad").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn empty_batch_saves_nothing() {
        let store = InMemoryCatalogStore::new();
        assert_eq!(upsert_batch(&store, &[]).await, 0);
    }
}
