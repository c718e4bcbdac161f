mod cli;
mod config;
mod connection;
mod map_cache;
mod metrics;
mod status_relay;
mod ticker;
mod versions;
mod voting;

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use cli::Args;
use config::ServerConfig;
use connection::{ConnectionHandler, Options, Voting};
use limbo_net::{NetConfig, NetServer};
use limbo_world::Content;
use tracing::{error, info, warn};
use versions::VersionRegistry;

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let config = if args.config.exists() {
        match ServerConfig::load(&args.config) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Failed to load {}: {e}", args.config.display());
                std::process::exit(1);
            }
        }
    } else {
        eprintln!("{} not found, using defaults", args.config.display());
        ServerConfig::default()
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    let forwarding = match args.forwarding() {
        Ok(f) => f,
        Err(e) => {
            error!("{e}");
            std::process::exit(1);
        }
    };

    let root = args
        .config
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    let content = match Content::load(root, &config.content) {
        Ok(c) => c,
        Err(e) => {
            error!("Failed to load worlds: {e}");
            std::process::exit(1);
        }
    };

    let registry = match VersionRegistry::builtin() {
        Ok(r) => r,
        Err(e) => {
            error!("Invalid version table: {e}");
            std::process::exit(1);
        }
    };
    for family in registry.families() {
        let worlds = content.worlds.worlds(family).len();
        if worlds == 0 {
            warn!("No worlds for {family}, those clients will be refused");
        } else {
            info!("{family}: {worlds} world(s)");
        }
    }

    let options = Options {
        forwarding,
        debug: args.debug,
        voting: args.voting_secret.as_ref().map(|secret| Voting {
            secret: secret.as_bytes().to_vec(),
            url: config.voting_url.clone(),
        }),
        status_secret: config.status_secret.as_ref().map(|s| s.as_bytes().to_vec()),
        max_players: args.max_players,
        ..Options::default()
    };

    info!(
        "limbo-server v{} starting on {}:{}",
        env!("CARGO_PKG_VERSION"),
        args.address,
        args.port
    );
    info!("Forwarding: {:?}", options.forwarding);
    if options.voting.is_some() {
        info!("Voting mode enabled");
    }

    let address: SocketAddr = match format!("{}:{}", args.address, args.port).parse() {
        Ok(a) => a,
        Err(e) => {
            error!("Invalid listen address {}: {e}", args.address);
            std::process::exit(1);
        }
    };

    let (mut server, mut events, server_handle) = match NetServer::bind(NetConfig {
        address,
        max_connections: args.max_players,
    })
    .await
    {
        Ok(bound) => bound,
        Err(e) => {
            error!("Failed to bind {address}: {e}");
            std::process::exit(1);
        }
    };

    let (players_tx, players_rx) = tokio::sync::watch::channel(0usize);
    if let Some(port) = args.metrics_port {
        metrics::start(port, players_rx);
    }

    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
    let shutdown_tx = Arc::new(shutdown_tx);

    // Handle Ctrl+C
    let shutdown_tx_ctrlc = shutdown_tx.clone();
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        info!("Shutdown signal received");
        let _ = shutdown_tx_ctrlc.send(true);
    });

    let mut shutdown_rx_handler = shutdown_rx.clone();
    tokio::spawn(async move {
        let mut handler = ConnectionHandler::new(server_handle, content, registry, options);
        let mut tick_interval = tokio::time::interval(Duration::from_millis(50));
        loop {
            tokio::select! {
                event = events.recv() => {
                    match event {
                        Some(e) => handler.handle_event(e).await,
                        None => break,
                    }
                }
                _ = tick_interval.tick() => {
                    handler.tick().await;
                    players_tx.send_replace(handler.player_count());
                }
                _ = shutdown_rx_handler.changed() => {
                    if *shutdown_rx_handler.borrow() {
                        break;
                    }
                }
            }
        }
    });

    server.run(shutdown_rx).await;
    info!("Server shut down.");
}
