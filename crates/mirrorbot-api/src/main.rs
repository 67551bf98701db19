//! Mirrorbot entry point.
//!
//! Binary name: `mirrorbot`
//!
//! Parses CLI arguments, loads configuration from the environment, then
//! either starts the webhook server or runs a configuration check.

mod http;
mod state;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use state::AppState;

/// Telegram webhook bot that mirrors GitHub repositories into Gitea.
#[derive(Parser)]
#[command(name = "mirrorbot", version, about, long_about = None)]
struct Cli {
    /// Suppress all output except errors.
    #[arg(long, global = true)]
    quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the webhook server.
    Serve {
        /// Port to listen on.
        #[arg(short, long, default_value_t = 8080)]
        port: u16,

        /// Host to bind.
        #[arg(long, default_value = "0.0.0.0")]
        host: String,
    },

    /// Validate configuration and database connectivity, then exit.
    Check,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up tracing based on verbosity
    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "warn",
        1 => "info,mirrorbot=debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .init();

    let config = mirrorbot_infra::config::from_env()?;

    match cli.command {
        Commands::Serve { port, host } => {
            let state = AppState::init(config).await?;

            let addr = format!("{host}:{port}");
            let listener = tokio::net::TcpListener::bind(&addr).await?;

            println!(
                "  {} Mirrorbot webhook listening on {}",
                console::style("⚡").bold(),
                console::style(format!("http://{addr}")).cyan()
            );
            println!("  {}", console::style("Press Ctrl+C to stop").dim());

            let router = http::router::build_router(state);

            axum::serve(listener, router)
                .with_graceful_shutdown(shutdown_signal())
                .await?;

            println!("\n  Server stopped.");
        }

        Commands::Check => {
            let check_mark = |ok: bool| {
                if ok {
                    format!("{}", console::style("✓").green())
                } else {
                    format!("{}", console::style("✗").red())
                }
            };

            let gitea_configured =
                config.gitea_base.is_some() && config.gitea_token.is_some();
            println!();
            println!(
                "  {} Configuration check",
                console::style("🔍").bold()
            );
            println!();
            println!(
                "  {} webhook secret configured",
                check_mark(config.webhook_secret.is_some())
            );
            println!("  {} Gitea configured", check_mark(gitea_configured));
            println!(
                "  {} token encryption enabled",
                check_mark(config.vault_secret().is_some())
            );
            println!(
                "  {} owner fallback token available",
                check_mark(config.github_fallback_token.is_some())
            );
            println!(
                "  {} login restricted to an organization",
                check_mark(config.required_org.is_some())
            );

            // Verifies the data directory is writable and migrations apply.
            let state = AppState::init(config).await;
            println!("  {} database reachable", check_mark(state.is_ok()));
            println!();
            state?;
        }
    }

    Ok(())
}

/// Wait for Ctrl+C or SIGTERM for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
