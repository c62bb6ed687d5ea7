use async_trait::async_trait;
use axum::Router;

/// Borrowed view of process state handed to lifecycle hooks.
pub struct InitCtx<'a> {
    pub settings: &'a crate::settings::Settings,
}

/// A unit of the application with a lifecycle and, optionally, HTTP routes.
///
/// Hooks run in this order: every `init`, then every `start`, and at
/// shutdown every `stop` in reverse. See [`crate::ModuleRegistry`].
#[async_trait]
pub trait Module: Sync + Send {
    /// Unique name; also the last segment of [`Module::mount_path`].
    fn name(&self) -> &'static str;

    /// Prefix the module's routes and OpenAPI paths are served under.
    fn mount_path(&self) -> String {
        format!("/api/{}", self.name())
    }

    async fn init(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        Ok(())
    }

    /// Routes relative to [`Module::mount_path`]. `None` for modules that
    /// serve nothing over HTTP.
    fn routes(&self) -> Option<Router> {
        None
    }

    /// OpenAPI fragment with `paths` relative to [`Module::mount_path`] and
    /// optional `components.schemas`.
    fn openapi(&self) -> Option<serde_json::Value> {
        None
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        Ok(())
    }

    /// Release resources held by the module.
    async fn stop(&self) -> anyhow::Result<()> {
        Ok(())
    }
}
