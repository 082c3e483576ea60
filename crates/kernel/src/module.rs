//! The contract every libris feature module (authors, books) fulfils.

use async_trait::async_trait;
use axum::Router;

use crate::settings::Settings;

/// Borrowed view of the loaded configuration handed to `init` and `start`.
///
/// Modules that need storage receive it at construction time; the context
/// only carries what is known once settings have been layered.
pub struct InitCtx<'a> {
    pub settings: &'a Settings,
}

/// One schema step contributed by a module.
///
/// `id` is compared as a string, so zero-padded prefixes (`001_init`,
/// `002_...`) keep steps in order within a module. Modules are migrated in
/// name order. Each step runs once: the runner records `(module, id)` in the
/// same transaction as `up` and skips it on every later run, so `up` does
/// not need to be idempotent, but it must never be edited after release.
/// `up` may hold several `;`-separated statements.
#[derive(Debug, Clone)]
pub struct Migration {
    pub id: &'static str,
    pub up: &'static str,
}

/// A feature module mounted by the server.
///
/// Lifecycle: `init` for every module in registration order, then every
/// pending migration, then `start`; `stop` runs in reverse registration
/// order on shutdown. A failing hook aborts bootstrap with the module name in
/// the error context.
#[async_trait]
pub trait Module: Sync + Send {
    /// Stable name; also the mount prefix `/api/{name}` and the migration
    /// bookkeeping key, so it must not change once a database exists.
    fn name(&self) -> &'static str;

    async fn init(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        Ok(())
    }

    /// Routes relative to `/api/{name}`; `/` maps to the bare prefix.
    fn routes(&self) -> Router {
        Router::new()
    }

    /// OpenAPI fragment with `paths` relative to the module prefix and
    /// optional `components.schemas`, merged into the served document.
    fn openapi(&self) -> Option<serde_json::Value> {
        None
    }

    fn migrations(&self) -> Vec<Migration> {
        vec![]
    }

    /// Runs once the schema is current; storage is safe to use from here on.
    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        Ok(())
    }
}
