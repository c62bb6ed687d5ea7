use anyhow::Context;
use quire_kernel::settings::Settings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().context("failed to load Quire settings")?;
    quire_telemetry::init(&settings.telemetry)?;

    tracing::info!(
        env = ?settings.environment,
        db = ?settings.database.path,
        "quire-app bootstrap starting"
    );

    quire_app::run(settings).await
}
