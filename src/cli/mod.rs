use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub mod sync;

use crate::core::AppConfig;
use crate::google::oauth;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Section identifiers to look up (registrar uid values)
    #[arg(default_values_t = [16290, 12625, 22890, 20997, 16717])]
    courses: Vec<i64>,

    /// Don't authenticate with Google; just build the requests. No auth
    /// implies a dry run.
    #[arg(long = "no-auth", action = clap::ArgAction::SetFalse)]
    auth: bool,

    /// Don't create the events, just show what would happen
    #[arg(long, action, default_value = "false")]
    dry_run: bool,
}

/// No auth implies dry run, whatever was asked for
pub fn effective_dry_run(auth: bool, dry_run: bool) -> bool {
    dry_run || !auth
}

pub async fn run() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("{}=info", env!("CARGO_CRATE_NAME")).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Cli::parse();
    let config = AppConfig::default();
    let dry_run = effective_dry_run(args.auth, args.dry_run);

    // Authorization failures abort before any query or format work
    let session = if args.auth {
        let session = oauth::authorize(&config).await?;
        println!("authentication succeeded");
        Some(session)
    } else {
        None
    };

    sync::run(&config, session.as_ref(), &args.courses, dry_run).await
}
