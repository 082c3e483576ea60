//! Application bootstrap: storage, module registry and HTTP lifecycle.

use std::future::Future;

use anyhow::Context;
use axum::Router;
use libris_kernel::{settings::Settings, InitCtx, ModuleRegistry};

use crate::modules;
use crate::store::RecordStore;

/// A connected record store together with the modules serving it.
pub struct App {
    pub store: RecordStore,
    pub registry: ModuleRegistry,
}

impl App {
    /// Open the storage pool and register every module.
    pub async fn connect(settings: &Settings) -> anyhow::Result<Self> {
        let pool = libris_db::connect(&settings.database)
            .await
            .context("failed to open the record store database")?;
        let store = RecordStore::new(pool);

        let mut registry = ModuleRegistry::new();
        modules::register_all(&mut registry, &store);
        tracing::debug!(modules = registry.len(), "module registry ready");

        Ok(Self { store, registry })
    }

    /// Apply pending module migrations; returns how many ran.
    pub async fn migrate(&self) -> anyhow::Result<usize> {
        let migrations = self.registry.collect_migrations();
        let applied = libris_db::run_migrations(self.store.pool(), &migrations).await?;
        tracing::info!(applied, total = migrations.len(), "migrations complete");
        Ok(applied)
    }

    pub fn router(&self, settings: &Settings) -> Router {
        libris_http::build_router(&self.registry, settings)
    }

    pub async fn close(self) {
        self.store.pool().close().await;
    }
}

/// Run the full lifecycle: init, migrate, start, serve until `shutdown`
/// resolves, then stop modules and close the pool.
pub async fn serve<F>(settings: &Settings, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = App::connect(settings).await?;
    let ctx = InitCtx { settings };

    app.registry.init_modules(&ctx).await?;
    app.migrate().await?;
    app.registry.start_modules(&ctx).await?;

    tracing::info!("libris-app bootstrap complete");

    let served = libris_http::start_server(&app.registry, settings, shutdown).await;

    app.registry.stop_modules().await?;
    app.close().await;

    served
}

/// Apply pending migrations and exit.
pub async fn migrate(settings: &Settings) -> anyhow::Result<usize> {
    let app = App::connect(settings).await?;
    let applied = app.migrate().await;
    app.close().await;
    applied
}
