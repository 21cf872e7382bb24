//! In-memory catalog store for tests and tooling.

use std::{collections::HashMap, sync::Mutex};

use {anyhow::Result, async_trait::async_trait};

use crate::{product::Product, store::CatalogStore};

/// `HashMap`-backed store. No persistence — lets tests run the pipeline
/// against a real [`CatalogStore`] without touching disk.
#[derive(Default)]
pub struct InMemoryCatalogStore {
    products: Mutex<HashMap<String, Product>>,
}

impl InMemoryCatalogStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CatalogStore for InMemoryCatalogStore {
    async fn upsert(&self, product: &Product) -> Result<()> {
        let mut products = self.products.lock().unwrap_or_else(|e| e.into_inner());
        products.insert(product.id.clone(), product.clone());
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<Product>> {
        let products = self.products.lock().unwrap_or_else(|e| e.into_inner());
        Ok(products.get(id).cloned())
    }

    async fn list(&self) -> Result<Vec<Product>> {
        let products = self.products.lock().unwrap_or_else(|e| e.into_inner());
        Ok(products.values().cloned().collect())
    }
}
