use std::sync::Arc;

use async_trait::async_trait;
use quire_kernel::{settings::Environment, InitCtx, Module};

/// Core module guarding identity configuration.
pub struct AuthzModule;

impl AuthzModule {
    pub const fn new() -> Self {
        Self
    }
}

impl Default for AuthzModule {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Module for AuthzModule {
    fn name(&self) -> &'static str {
        "authz"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        let auth = &ctx.settings.auth;
        if auth.uses_development_secret() {
            if ctx.settings.environment == Environment::Production {
                anyhow::bail!("refusing to start in production with the development jwt secret");
            }
            tracing::warn!(
                module = self.name(),
                "using the development jwt secret; set QUIRE_AUTH__JWT_SECRET"
            );
        }

        tracing::info!(
            module = self.name(),
            token_ttl_secs = auth.token_ttl_secs,
            "authz module initialized"
        );
        Ok(())
    }
}

/// Create the core `authz` module
pub fn create_module() -> Arc<dyn Module> {
    Arc::new(AuthzModule::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use quire_kernel::settings::Settings;

    #[tokio::test]
    async fn development_secret_is_allowed_locally() {
        let settings = Settings::default();
        let ctx = InitCtx {
            settings: &settings,
        };
        assert!(AuthzModule::new().init(&ctx).await.is_ok());
    }

    #[tokio::test]
    async fn development_secret_is_refused_in_production() {
        let mut settings = Settings::default();
        settings.environment = Environment::Production;
        let ctx = InitCtx {
            settings: &settings,
        };
        assert!(AuthzModule::new().init(&ctx).await.is_err());

        settings.auth.jwt_secret = "a-real-secret".to_string();
        let ctx = InitCtx {
            settings: &settings,
        };
        assert!(AuthzModule::new().init(&ctx).await.is_ok());
    }
}
