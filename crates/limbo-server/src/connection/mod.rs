//! Per-player connection state and the handler that owns every session.
//!
//! Packet handlers and tick callbacks are synchronous: they queue packets in
//! the session's [`Outbox`], and [`ConnectionHandler::flush_all`] hands the queue
//! to the network task afterwards.

mod login;
mod play;

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use bytes::Bytes;
use limbo_net::{ConnId, NetEvent, ServerHandle};
use limbo_proto::codec::ProtoDecode;
use limbo_proto::packets::{encode_packet, id as ids, LoginDisconnect};
use limbo_proto::{Uuid, VarInt};
use limbo_world::{Content, World};
use tracing::{debug, info, warn};

use crate::cli::Forwarding;
use crate::map_cache::MapPacketCache;
use crate::status_relay::StatusTable;
use crate::ticker::Ticker;
use crate::versions::{Adapter, Ctx, VersionRegistry};

pub use login::LoginError;
use play::Session;

/// Default compression threshold, in bytes.
pub const COMPRESSION_THRESHOLD: i32 = 1500;

/// First id handed to client-side entities; the player is entity 0.
const FIRST_ENTITY_ID: i32 = 1000;

/// One queued action for the network task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outgoing {
    Packet(Bytes),
    /// Switch the socket to compressed framing.
    Compression(i32),
    Close,
}

/// Actions queued by synchronous handlers, in order.
#[derive(Debug, Default)]
pub struct Outbox {
    queue: Vec<Outgoing>,
    closed: bool,
}

impl Outbox {
    pub fn packet(&mut self, packet: Bytes) {
        if !self.closed {
            self.queue.push(Outgoing::Packet(packet));
        }
    }

    pub fn compression(&mut self, threshold: i32) {
        if !self.closed {
            self.queue.push(Outgoing::Compression(threshold));
        }
    }

    /// Close after everything queued so far. Later packets are dropped.
    pub fn close(&mut self) {
        if !self.closed {
            self.closed = true;
            self.queue.push(Outgoing::Close);
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn drain(&mut self) -> Vec<Outgoing> {
        std::mem::take(&mut self.queue)
    }
}

/// Who the player is, as declared or as forwarded by the proxy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub name: String,
    pub uuid: Uuid,
    /// Set when a proxy vouched for the uuid.
    pub confirmed: bool,
    /// The player's own address as the proxy reported it, or the socket
    /// address.
    pub host: String,
}

/// Scheduled per-session work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Task {
    KeepAlive,
    StopVanillaMusic,
    Music,
    Tablist,
    SendWorld,
    ResetSound,
    BedrockTime,
}

/// State of a session that reached PLAY.
#[derive(Debug)]
pub struct PlayState {
    pub world: Arc<World>,
    pub next_entity_id: i32,
    /// What the client was last told; `None` forces the next weather packet.
    pub raining: Option<bool>,
    /// Hologram entity ids per server key, one group per placement.
    pub holograms: HashMap<String, Vec<Vec<i32>>>,
    pub last_portal: Option<Instant>,
    pub last_command: Option<Instant>,
    pub ticker: Ticker<Task>,
}

impl PlayState {
    pub fn new(world: Arc<World>) -> Self {
        Self {
            world,
            next_entity_id: FIRST_ENTITY_ID,
            raining: None,
            holograms: HashMap::new(),
            last_portal: None,
            last_command: None,
            ticker: Ticker::new(),
        }
    }
}

/// Voting mode settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Voting {
    pub secret: Vec<u8>,
    /// Link template with `{uuid}` and `{token}`.
    pub url: Option<String>,
}

/// Process-wide behavior switches.
#[derive(Debug, Clone)]
pub struct Options {
    pub forwarding: Forwarding,
    pub debug: bool,
    pub voting: Option<Voting>,
    pub status_secret: Option<Vec<u8>>,
    pub compression_threshold: i32,
    pub max_players: usize,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            forwarding: Forwarding::None,
            debug: false,
            voting: None,
            status_secret: None,
            compression_threshold: COMPRESSION_THRESHOLD,
            max_players: 65535,
        }
    }
}

/// Login state machine states.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginState {
    /// Waiting for the handshake.
    Handshake,
    /// Server list ping.
    Status,
    /// Waiting for LoginStart.
    LoginStart,
    /// Plugin request sent, waiting for the proxy's signed player info.
    AwaitingForwarding { message_id: i32, name: String },
    /// Login success sent (1.20.2+), waiting for LoginAcknowledged.
    AwaitingAcknowledge,
    /// Registries sent, waiting for the client to finish configuration.
    Configuration,
    /// In the world.
    Play,
}

/// Identity fields read from a legacy forwarding handshake.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Forwarded {
    pub host: String,
    pub uuid: Uuid,
}

/// Per-socket connection state.
#[derive(Debug)]
pub struct PlayerConnection {
    pub addr: SocketAddr,
    pub state: LoginState,
    pub protocol: i32,
    pub adapter: Option<Arc<Adapter>>,
    pub forwarded: Option<Forwarded>,
    pub identity: Option<Identity>,
    /// Connected through Geyser/Floodgate.
    pub bedrock: bool,
    pub play: Option<PlayState>,
    pub out: Outbox,
}

impl PlayerConnection {
    fn new(addr: SocketAddr) -> Self {
        Self {
            addr,
            state: LoginState::Handshake,
            protocol: 0,
            adapter: None,
            forwarded: None,
            identity: None,
            bedrock: false,
            play: None,
            out: Outbox::default(),
        }
    }

    fn name(&self) -> &str {
        self.identity.as_ref().map_or("?", |i| i.name.as_str())
    }
}

/// Manages all sessions, the loaded content and the shared caches.
pub struct ConnectionHandler {
    sessions: HashMap<ConnId, PlayerConnection>,
    server_handle: ServerHandle,
    content: Content,
    registry: VersionRegistry,
    options: Options,
    statuses: StatusTable,
    cache: MapPacketCache,
}

impl ConnectionHandler {
    pub fn new(
        server_handle: ServerHandle,
        content: Content,
        registry: VersionRegistry,
        options: Options,
    ) -> Self {
        Self {
            sessions: HashMap::new(),
            server_handle,
            content,
            registry,
            options,
            statuses: StatusTable::new(),
            cache: MapPacketCache::new(),
        }
    }

    pub async fn handle_event(&mut self, event: NetEvent) {
        match event {
            NetEvent::Connected { id, addr } => {
                debug!(conn = %id, "connected from {addr}");
                self.sessions.insert(id, PlayerConnection::new(addr));
            }
            NetEvent::Packet { id, payload } => {
                self.handle_packet(id, payload, Instant::now());
                self.flush_all().await;
            }
            NetEvent::Disconnected { id } => {
                if let Some(conn) = self.sessions.remove(&id) {
                    if conn.state == LoginState::Play {
                        info!("{} left ({} online)", conn.name(), self.player_count());
                    } else {
                        debug!(conn = %id, "disconnected in {:?}", conn.state);
                    }
                }
            }
        }
    }

    /// One 50 ms tick: advance every PLAY session's scheduler.
    pub async fn tick(&mut self) {
        self.advance_sessions();
        self.flush_all().await;
    }

    fn advance_sessions(&mut self) {
        let conns: Vec<ConnId> = self.sessions.keys().copied().collect();
        for id in conns {
            if let Some(mut session) = self.session(id) {
                let due = session.ctx.play.ticker.advance();
                for task in due {
                    session.run(task);
                }
            }
        }
    }

    /// Sessions that reached PLAY.
    pub fn player_count(&self) -> usize {
        self.sessions
            .values()
            .filter(|c| c.state == LoginState::Play)
            .count()
    }

    /// Decode the packet id and dispatch on the session's state. Errors
    /// close the connection.
    pub(crate) fn handle_packet(&mut self, id: ConnId, mut payload: Bytes, now: Instant) {
        let Some(conn) = self.sessions.get(&id) else {
            return;
        };
        if conn.out.is_closed() {
            return;
        }
        let state = conn.state.clone();

        let packet_id = match VarInt::proto_decode(&mut payload) {
            Ok(v) => v.0,
            Err(e) => {
                self.reject(id, &LoginError::Malformed(e));
                return;
            }
        };

        let result = match state {
            LoginState::Handshake => self.handle_handshake(id, packet_id, payload),
            LoginState::Status => self.handle_status(id, packet_id, payload),
            LoginState::Play => {
                self.handle_play(id, packet_id, payload, now);
                Ok(())
            }
            _ => self.handle_login(id, packet_id, payload, state),
        };
        if let Err(e) = result {
            self.reject(id, &e);
        }
    }

    /// Close with a reason, as a login disconnect where the client expects
    /// one.
    fn reject(&mut self, id: ConnId, error: &LoginError) {
        let Some(conn) = self.sessions.get_mut(&id) else {
            return;
        };
        warn!(conn = %id, addr = %conn.addr, "closing connection: {error}");
        if matches!(
            conn.state,
            LoginState::LoginStart | LoginState::AwaitingForwarding { .. }
        ) {
            conn.out.packet(encode_packet(
                ids::login::DISCONNECT,
                &LoginDisconnect::with_message(error.to_string()),
            ));
        }
        conn.out.close();
    }

    /// Borrow everything a PLAY session's handlers need.
    fn session(&mut self, id: ConnId) -> Option<Session<'_>> {
        let conn = self.sessions.get_mut(&id)?;
        if conn.out.is_closed() {
            return None;
        }
        let (Some(v), Some(player), Some(play)) = (
            conn.adapter.as_deref(),
            conn.identity.as_ref(),
            conn.play.as_mut(),
        ) else {
            return None;
        };
        Some(Session {
            ctx: Ctx {
                v,
                content: &self.content,
                cache: &mut self.cache,
                player,
                bedrock: conn.bedrock,
                play,
                out: &mut conn.out,
            },
            options: &self.options,
            statuses: &self.statuses,
        })
    }

    /// Hand every queued action to the network task.
    pub async fn flush_all(&mut self) {
        let mut pending = Vec::new();
        for (&id, conn) in self.sessions.iter_mut() {
            let queued = conn.out.drain();
            if !queued.is_empty() {
                pending.push((id, queued));
            }
        }
        for (id, queued) in pending {
            for item in queued {
                match item {
                    Outgoing::Packet(payload) => self.server_handle.send_to(id, payload).await,
                    Outgoing::Compression(threshold) => {
                        self.server_handle.set_compression(id, threshold).await
                    }
                    Outgoing::Close => self.server_handle.close(id).await,
                }
            }
        }
    }
}
