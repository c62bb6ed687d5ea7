//! Process bootstrap: open the store, build the registry, serve, shut down.

use std::sync::Arc;

use anyhow::Context;
use quire_authz::{IdentityResolverArc, JwtResolver};
use quire_db::{MemoryStore, StoreHandle};
use quire_kernel::{settings::Settings, InitCtx, ModuleRegistry};

use crate::modules;

/// Registers the core `db` and `authz` modules followed by the application
/// modules.
pub fn build_registry(store: StoreHandle, identity: IdentityResolverArc) -> ModuleRegistry {
    let mut registry = ModuleRegistry::new();
    registry.register_core(quire_db::create_module(store.clone()));
    registry.register_core(quire_authz::create_module());
    modules::register_all(&mut registry, &store, &identity);

    tracing::info!(
        core = registry.core_module_count(),
        custom = registry.custom_module_count(),
        "module registry built"
    );
    registry
}

/// Opens the configured store, in memory when no path is set.
pub async fn open_store(settings: &Settings) -> anyhow::Result<StoreHandle> {
    let store = MemoryStore::open_optional(settings.database.path.as_deref())
        .await
        .context("failed to open document store")?;
    Ok(Arc::new(store))
}

pub fn identity_resolver(settings: &Settings) -> anyhow::Result<IdentityResolverArc> {
    let resolver = JwtResolver::new(&settings.auth).context("failed to configure jwt resolver")?;
    Ok(Arc::new(resolver))
}

/// Runs the service until Ctrl-C, then stops every module.
pub async fn run(settings: Settings) -> anyhow::Result<()> {
    let store = open_store(&settings).await?;
    let identity = identity_resolver(&settings)?;
    let registry = build_registry(store, identity);

    let ctx = InitCtx {
        settings: &settings,
    };
    registry.boot(&ctx).await?;

    let served = quire_http::start_server(&registry, &settings, shutdown_signal()).await;
    let stopped = registry.shutdown().await;

    served?;
    stopped?;
    tracing::info!("quire-app stopped");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("shutdown signal received"),
        Err(err) => {
            tracing::error!(error = %err, "failed to listen for shutdown signal");
            std::future::pending::<()>().await;
        }
    }
}
