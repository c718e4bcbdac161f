use std::collections::HashMap;
use std::fmt;
use std::net::SocketAddr;

use bytes::Bytes;
use tokio::net::TcpListener;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

use crate::error::NetError;
use crate::session::{self, SessionCommand};

/// Process-unique connection id. Never reused.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnId(pub u64);

impl fmt::Debug for ConnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl fmt::Display for ConnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Events emitted by the server to the consumer.
#[derive(Debug)]
pub enum NetEvent {
    /// A socket was accepted.
    Connected { id: ConnId, addr: SocketAddr },
    /// One decoded packet payload (id + body).
    Packet { id: ConnId, payload: Bytes },
    /// The socket closed; no further events follow for this id.
    Disconnected { id: ConnId },
}

/// Commands that can be sent to the server from another task.
#[derive(Debug)]
pub enum ServerCommand {
    /// Frame and write a payload.
    Send { id: ConnId, payload: Bytes },
    /// Switch framing to compressed mode for all following packets.
    SetCompression { id: ConnId, threshold: i32 },
    /// Flush queued packets and close the socket.
    Close { id: ConnId },
}

/// A cloneable handle for sending commands to the server from any task.
#[derive(Clone)]
pub struct ServerHandle {
    command_tx: mpsc::Sender<ServerCommand>,
}

impl ServerHandle {
    /// Wrap a raw command channel. The server side is usually created by
    /// [`NetServer::bind`]; tests drive the receiver directly.
    pub fn new(command_tx: mpsc::Sender<ServerCommand>) -> Self {
        Self { command_tx }
    }

    /// Queue a payload to be sent to a connection.
    pub async fn send_to(&self, id: ConnId, payload: Bytes) {
        let _ = self.command_tx.send(ServerCommand::Send { id, payload }).await;
    }

    pub async fn set_compression(&self, id: ConnId, threshold: i32) {
        let _ = self
            .command_tx
            .send(ServerCommand::SetCompression { id, threshold })
            .await;
    }

    pub async fn close(&self, id: ConnId) {
        let _ = self.command_tx.send(ServerCommand::Close { id }).await;
    }
}

/// Configuration for the TCP server.
pub struct NetConfig {
    pub address: SocketAddr,
    pub max_connections: usize,
}

/// The listener plus the command routes to every live socket task.
pub struct NetServer {
    listener: TcpListener,
    sessions: HashMap<ConnId, mpsc::UnboundedSender<SessionCommand>>,
    next_id: u64,
    config: NetConfig,
    event_tx: mpsc::Sender<NetEvent>,
    command_rx: mpsc::Receiver<ServerCommand>,
    closed_tx: mpsc::UnboundedSender<ConnId>,
    closed_rx: mpsc::UnboundedReceiver<ConnId>,
}

impl NetServer {
    /// Bind the listener and create the server. Returns the server, an
    /// event receiver for the consumer, and a handle for sending commands.
    pub async fn bind(
        config: NetConfig,
    ) -> Result<(Self, mpsc::Receiver<NetEvent>, ServerHandle), NetError> {
        let listener = TcpListener::bind(config.address).await?;
        let (event_tx, event_rx) = mpsc::channel(1024);
        let (command_tx, command_rx) = mpsc::channel(1024);
        let (closed_tx, closed_rx) = mpsc::unbounded_channel();

        info!("Listening on {}", listener.local_addr()?);

        Ok((
            Self {
                listener,
                sessions: HashMap::new(),
                next_id: 1,
                config,
                event_tx,
                command_rx,
                closed_tx,
                closed_rx,
            },
            event_rx,
            ServerHandle::new(command_tx),
        ))
    }

    pub fn local_addr(&self) -> Result<SocketAddr, NetError> {
        Ok(self.listener.local_addr()?)
    }

    /// Run the accept / routing loop until the shutdown signal is received.
    pub async fn run(&mut self, mut shutdown: watch::Receiver<bool>) {
        loop {
            tokio::select! {
                result = self.listener.accept() => {
                    match result {
                        Ok((stream, addr)) => self.accept(stream, addr).await,
                        Err(e) => warn!("Accept error: {e}"),
                    }
                }
                Some(cmd) = self.command_rx.recv() => self.route(cmd),
                Some(id) = self.closed_rx.recv() => {
                    self.sessions.remove(&id);
                }
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        info!("Network server shutting down");
                        for tx in self.sessions.values() {
                            let _ = tx.send(SessionCommand::Close);
                        }
                        self.sessions.clear();
                        break;
                    }
                }
            }
        }
    }

    async fn accept(&mut self, stream: tokio::net::TcpStream, addr: SocketAddr) {
        if self.sessions.len() >= self.config.max_connections {
            debug!("Connection from {addr} rejected: max connections reached");
            return;
        }
        if let Err(e) = stream.set_nodelay(true) {
            debug!("set_nodelay failed for {addr}: {e}");
        }

        let id = ConnId(self.next_id);
        self.next_id += 1;
        let (tx, rx) = mpsc::unbounded_channel();
        self.sessions.insert(id, tx);

        let _ = self.event_tx.send(NetEvent::Connected { id, addr }).await;
        tokio::spawn(session::run(
            id,
            stream,
            self.event_tx.clone(),
            rx,
            self.closed_tx.clone(),
        ));
    }

    fn route(&mut self, cmd: ServerCommand) {
        let (id, session_cmd) = match cmd {
            ServerCommand::Send { id, payload } => (id, SessionCommand::Send(payload)),
            ServerCommand::SetCompression { id, threshold } => {
                (id, SessionCommand::SetCompression(threshold))
            }
            ServerCommand::Close { id } => (id, SessionCommand::Close),
        };
        if let Some(tx) = self.sessions.get(&id) {
            let _ = tx.send(session_cmd);
        }
    }
}
