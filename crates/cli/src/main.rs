use anyhow::Context;
use clap::{Parser, Subcommand};
use quire_authz::JwtResolver;
use quire_db::ObjectId;
use quire_kernel::settings::Settings;

/// Quire book catalogue service
#[derive(Debug, Parser)]
#[command(name = "quire", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP service until Ctrl-C
    Serve,
    /// Print a bearer token for a user id
    Token {
        /// 24 hex character user id; a fresh id is generated when omitted
        #[arg(long)]
        user: Option<String>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let settings = Settings::load().context("failed to load Quire settings")?;

    match cli.command {
        Command::Serve => serve(settings),
        Command::Token { user } => token(&settings, user.as_deref()),
    }
}

fn serve(settings: Settings) -> anyhow::Result<()> {
    quire_telemetry::init(&settings.telemetry)?;
    tracing::info!(env = ?settings.environment, "quire serve starting");

    tokio::runtime::Runtime::new()
        .context("failed to start tokio runtime")?
        .block_on(quire_app::run(settings))
}

// Writes only the token to stdout so the output can be captured by scripts.
fn token(settings: &Settings, user: Option<&str>) -> anyhow::Result<()> {
    let user = match user {
        Some(raw) => ObjectId::parse_str(raw).with_context(|| format!("invalid user id '{raw}'"))?,
        None => ObjectId::new(),
    };

    let resolver = JwtResolver::new(&settings.auth).context("failed to configure jwt resolver")?;
    let token = resolver.issue(user).context("failed to issue token")?;

    eprintln!("user {user}, valid for {}s", resolver.ttl_secs());
    println!("{token}");
    Ok(())
}
