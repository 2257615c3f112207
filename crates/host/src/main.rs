use anyhow::{Context, Result};
use lightdeck_host::api::{self, AppState};
use lightdeck_host::channel;
use lightdeck_host::config::HostConfig;
use lightdeck_host::registry::LightRegistry;
use tokio::net::TcpListener;
use tokio::signal;
use tracing_subscriber::EnvFilter;

const VERSION: &str = env!("CARGO_PKG_VERSION");

fn print_connection_info(bind: &str, http_port: u16, ws_port: u16) {
    eprintln!();
    eprintln!("  \x1b[1;36mlightdeck-host\x1b[0m v{VERSION}");
    eprintln!("  \x1b[1;32m[http]\x1b[0m   API and UI on port \x1b[1;96m{http_port}\x1b[0m");
    eprintln!("  \x1b[1;32m[ws]\x1b[0m     Event channel on port \x1b[1;96m{ws_port}\x1b[0m");
    eprintln!("  \x1b[1;37m>\x1b[0m Open: \x1b[4;96mhttp://{bind}:{http_port}\x1b[0m");
    eprintln!();
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Graceful shutdown initiated");
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize structured logging (tracing)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_level(true)
        .init();

    if let Some(arg) = std::env::args().nth(1) {
        match arg.as_str() {
            "--version" | "-v" => {
                println!("lightdeck-host {VERSION}");
                return Ok(());
            }
            "--help" | "-h" => {
                println!("lightdeck-host - development host for the lightdeck UI");
                println!();
                println!("USAGE:");
                println!("    lightdeck-host");
                println!();
                println!("ENVIRONMENT:");
                println!("    LIGHTDECK_CONFIG   Path to config file (default: ./lightdeck.toml)");
                println!("    PORT               Override the HTTP port");
                println!("    RUST_LOG           Log filter (default: info)");
                return Ok(());
            }
            other => {
                eprintln!("Unknown argument: {other} (try --help)");
                std::process::exit(2);
            }
        }
    }

    let config = HostConfig::load()?;
    let server = &config.server;

    let registry = LightRegistry::new(config.initial_lights());
    tracing::info!(count = config.lights.len(), "Registry seeded");

    let ws_addr = format!("{}:{}", server.bind, server.ws_port);
    let ws_listener = TcpListener::bind(&ws_addr)
        .await
        .with_context(|| format!("Failed to bind event channel on {ws_addr}"))?;

    let http_addr = format!("{}:{}", server.bind, server.http_port);
    let http_listener = TcpListener::bind(&http_addr)
        .await
        .with_context(|| format!("Failed to bind HTTP on {http_addr}"))?;

    print_connection_info(&server.bind, server.http_port, server.ws_port);

    let app = api::app(
        AppState {
            registry,
            ws_port: server.ws_port,
        },
        &server.static_dir,
    );
    let http_server = axum::serve(http_listener, app);

    tokio::select! {
        result = channel::serve_channel(ws_listener) => {
            result?;
        }
        result = http_server => {
            result.context("HTTP server error")?;
        }
        () = shutdown_signal() => {}
    }

    Ok(())
}
