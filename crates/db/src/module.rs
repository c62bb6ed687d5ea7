use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use quire_kernel::{InitCtx, Module};

use crate::StoreHandle;

/// Core module owning the document store lifecycle.
///
/// The store is opened before the registry is built; stopping this module
/// closes it, flushing any file-backed data.
pub struct DbModule {
    store: StoreHandle,
}

impl DbModule {
    pub fn new(store: StoreHandle) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Module for DbModule {
    fn name(&self) -> &'static str {
        "db"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            path = ?ctx.settings.database.path,
            "db module initialized"
        );
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        self.store
            .close()
            .await
            .context("failed to close document store")?;
        tracing::info!(module = self.name(), "db module stopped");
        Ok(())
    }
}

/// Create the core `db` module around an opened store
pub fn create_module(store: StoreHandle) -> Arc<dyn Module> {
    Arc::new(DbModule::new(store))
}
