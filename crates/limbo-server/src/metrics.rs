//! Prometheus text endpoint.
//!
//! Answers every HTTP request on the metrics port with the current player
//! count, whatever the path.

use std::net::SocketAddr;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Start the metrics server on the given port.
pub fn start(port: u16, players_rx: watch::Receiver<usize>) {
    tokio::spawn(async move {
        let addr = SocketAddr::from(([0, 0, 0, 0], port));
        let listener = match TcpListener::bind(addr).await {
            Ok(l) => l,
            Err(e) => {
                warn!("Failed to bind metrics server on port {port}: {e}");
                return;
            }
        };
        info!("Metrics server listening on port {port}");

        loop {
            let (mut stream, peer) = match listener.accept().await {
                Ok(r) => r,
                Err(e) => {
                    warn!("Metrics accept error: {e}");
                    continue;
                }
            };
            let players = *players_rx.borrow();
            tokio::spawn(async move {
                // The request itself is irrelevant; drain what arrived.
                let mut buf = [0u8; 1024];
                let _ = stream.read(&mut buf).await;
                if let Err(e) = stream.write_all(build_response(players).as_bytes()).await {
                    debug!("Metrics write to {peer} failed: {e}");
                }
                let _ = stream.shutdown().await;
            });
        }
    });
}

fn build_body(players: usize) -> String {
    format!(
        "# HELP waitingserver_players_online Players currently connected.\n\
         # TYPE waitingserver_players_online gauge\n\
         waitingserver_players_online {players}\n"
    )
}

fn build_response(players: usize) -> String {
    let body = build_body(players);
    format!(
        "HTTP/1.1 200 OK\r\n\
         Content-Type: text/plain; version=0.0.4\r\n\
         Content-Length: {}\r\n\
         Connection: close\r\n\r\n{body}",
        body.len()
    )
}
