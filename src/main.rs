use std::process::ExitCode;
use std::sync::Arc;

use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use co2_monitor::bot::{Bot, BotError};
use co2_monitor::config::{Config, ConfigError};
use co2_monitor::server::{AppState, build_router};
use co2_monitor::transport::{HttpTransport, TransportError};
use co2_monitor::updates::UpdateSource;
use co2_monitor::worker::WorkerRegistry;

#[derive(Debug, Error)]
enum FatalError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("failed to build HTTP client: {0}")]
    Transport(#[from] TransportError),

    #[error("status server error: {0}")]
    Server(#[from] std::io::Error),

    #[error(transparent)]
    Bot(#[from] BotError),
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "co2_monitor=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "Fatal error, exiting");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), FatalError> {
    let config = Config::from_env()?;
    info!(?config, "Configuration loaded");

    let shutdown = CancellationToken::new();
    let transport = Arc::new(HttpTransport::new(config.transport.clone())?);
    let registry = Arc::new(WorkerRegistry::new_with_shutdown(
        Arc::clone(&transport),
        config.watch,
        shutdown.clone(),
    ));

    let server = match config.http_addr {
        Some(addr) => {
            let listener = tokio::net::TcpListener::bind(addr).await?;
            info!("Status server listening on {}", addr);

            let app = build_router(AppState::new(Arc::clone(&registry)));
            let server_shutdown = shutdown.clone();
            Some(tokio::spawn(async move {
                axum::serve(listener, app)
                    .with_graceful_shutdown(server_shutdown.cancelled_owned())
                    .await
            }))
        }
        None => None,
    };

    {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Interrupt received, shutting down");
                shutdown.cancel();
            }
        });
    }

    let mut source =
        UpdateSource::new(Arc::clone(&transport)).with_poll_timeout(config.poll_timeout);
    if let Some(limit) = config.poll_limit {
        source = source.with_limit(limit);
    }
    let mut bot = Bot::new(transport, registry);
    let outcome = bot.run(source, shutdown.clone()).await;

    // The status server goes down with the bot either way.
    shutdown.cancel();
    if let Some(server) = server {
        match server.await {
            Ok(Err(e)) => error!(error = %e, "Status server failed"),
            Err(e) => error!(error = %e, "Status server task panicked"),
            Ok(Ok(())) => {}
        }
    }

    outcome?;
    info!("Shut down cleanly");
    Ok(())
}
