//! Handshake, server list ping, and the login and configuration phases.

use bytes::{Buf, Bytes};
use limbo_crypto::CryptoError;
use limbo_proto::codec::{read_string, read_string_max};
use limbo_proto::packets::login::MAX_NAME;
use limbo_proto::packets::status::{StatusPlayers, StatusVersion};
use limbo_proto::packets::{
    build_packet, Handshake, LoginPluginRequest, LoginPluginResponse, LoginStart, NextState,
    PingRequest, PongResponse, SetCompression, StatusResponse,
};
use limbo_proto::{Component, ProtoError};
use rand::Rng;
use thiserror::Error;
use tracing::trace;

use super::*;

/// Login plugin channel for modern forwarding.
pub const VELOCITY_CHANNEL: &str = "velocity:player_info";
/// Highest modern forwarding version understood.
pub const MODERN_FORWARDING_VERSION: i32 = 1;

const MOTD: &str = "Waiting Server";
const GEYSER_MARKER: &str = "Geyser-Floodgate";
const FLOODGATE_PREFIX: &str = "^Floodgate^";

/// Why a connection was refused. The message is shown to the client.
#[derive(Debug, Error)]
pub enum LoginError {
    #[error("Invalid forwarding data")]
    InvalidForwarding,

    #[error("Unsupported Minecraft Version")]
    UnsupportedVersion,

    #[error("Unexpected packet {0:#04x}")]
    UnexpectedPacket(i32),

    #[error("Unexpected forwarding response")]
    UnexpectedResponse,

    #[error("This server requires you to connect through the proxy")]
    ForwardingMissing,

    #[error("Unsupported forwarding version {0}")]
    ForwardingVersion(i32),

    #[error("Invalid forwarding signature")]
    BadSignature(#[source] CryptoError),

    #[error("Malformed packet: {0}")]
    Malformed(#[from] ProtoError),
}

/// Split a legacy forwarding host string. Returns the forwarded identity
/// and whether the player came through Geyser.
pub fn parse_legacy_host(host: &str) -> Result<(Forwarded, bool), LoginError> {
    let fields: Vec<&str> = host.split('\0').collect();
    if fields.len() < 3 {
        return Err(LoginError::InvalidForwarding);
    }
    let (bedrock, at) = if fields[1] == GEYSER_MARKER {
        (true, 4)
    } else if fields[1].starts_with(FLOODGATE_PREFIX) {
        (true, 2)
    } else {
        (false, 1)
    };
    let (Some(host), Some(uuid)) = (fields.get(at), fields.get(at + 1)) else {
        return Err(LoginError::InvalidForwarding);
    };
    let uuid = Uuid::parse(uuid).map_err(|_| LoginError::InvalidForwarding)?;
    Ok((
        Forwarded {
            host: (*host).to_owned(),
            uuid,
        },
        bedrock,
    ))
}

/// Verify a modern forwarding response and read the identity it carries.
/// Trailing profile properties are ignored.
pub fn read_modern_forwarding(secret: &[u8], data: &[u8]) -> Result<Identity, LoginError> {
    let mut payload =
        limbo_crypto::verify_forwarding(secret, data).map_err(LoginError::BadSignature)?;
    let version = VarInt::proto_decode(&mut payload)?.0;
    if version != MODERN_FORWARDING_VERSION {
        return Err(LoginError::ForwardingVersion(version));
    }
    let host = read_string(&mut payload)?;
    let uuid = Uuid::proto_decode(&mut payload)?;
    let name = read_string_max(&mut payload, MAX_NAME)?;
    trace!(properties = payload.remaining(), "forwarded profile for {name}");
    Ok(Identity {
        name,
        uuid,
        confirmed: true,
        host,
    })
}

fn expect(packet_id: i32, expected: i32) -> Result<(), LoginError> {
    if packet_id == expected {
        Ok(())
    } else {
        Err(LoginError::UnexpectedPacket(packet_id))
    }
}

impl ConnectionHandler {
    pub(super) fn handle_handshake(
        &mut self,
        id: ConnId,
        packet_id: i32,
        mut body: Bytes,
    ) -> Result<(), LoginError> {
        expect(packet_id, ids::handshake::INTENTION)?;
        let handshake = Handshake::proto_decode(&mut body)?;
        let Some(conn) = self.sessions.get_mut(&id) else {
            return Ok(());
        };
        debug!(
            conn = %id,
            protocol = handshake.protocol_version,
            "handshake, next state {:?}",
            handshake.next_state
        );
        conn.protocol = handshake.protocol_version;
        conn.adapter = self.registry.select(handshake.protocol_version).cloned();

        if handshake.next_state == NextState::Status {
            conn.state = LoginState::Status;
            return Ok(());
        }
        conn.state = LoginState::LoginStart;

        if self.options.forwarding == Forwarding::Legacy {
            let (forwarded, bedrock) = parse_legacy_host(&handshake.server_address)?;
            conn.forwarded = Some(forwarded);
            conn.bedrock = bedrock;
        }

        let supported = conn
            .adapter
            .as_ref()
            .is_some_and(|v| !self.content.worlds.worlds(v.family).is_empty());
        if !supported {
            return Err(LoginError::UnsupportedVersion);
        }
        Ok(())
    }

    pub(super) fn handle_status(
        &mut self,
        id: ConnId,
        packet_id: i32,
        mut body: Bytes,
    ) -> Result<(), LoginError> {
        let online = self.player_count();
        let newest = self.registry.adapters().last().cloned();
        let Some(conn) = self.sessions.get_mut(&id) else {
            return Ok(());
        };

        match packet_id {
            ids::status::REQUEST => {
                let version = match (&conn.adapter, &newest) {
                    (Some(v), _) => StatusVersion {
                        name: v.name.to_owned(),
                        protocol: conn.protocol,
                    },
                    (None, Some(newest)) => StatusVersion {
                        name: newest.name.to_owned(),
                        protocol: newest.protocol,
                    },
                    (None, None) => StatusVersion {
                        name: String::new(),
                        protocol: -1,
                    },
                };
                let response = StatusResponse {
                    version,
                    players: StatusPlayers {
                        max: i32::try_from(self.options.max_players).unwrap_or(i32::MAX),
                        online: online as i32,
                    },
                    description: Component::text(MOTD),
                };
                conn.out.packet(encode_packet(ids::status::RESPONSE, &response));
                Ok(())
            }
            ids::status::PING => {
                let ping = PingRequest::proto_decode(&mut body)?;
                conn.out.packet(encode_packet(
                    ids::status::PONG,
                    &PongResponse {
                        payload: ping.payload,
                    },
                ));
                conn.out.close();
                Ok(())
            }
            other => Err(LoginError::UnexpectedPacket(other)),
        }
    }

    pub(super) fn handle_login(
        &mut self,
        id: ConnId,
        packet_id: i32,
        mut body: Bytes,
        state: LoginState,
    ) -> Result<(), LoginError> {
        match state {
            LoginState::LoginStart => {
                expect(packet_id, ids::login::START)?;
                let start = LoginStart::proto_decode(&mut body)?;
                let Some(conn) = self.sessions.get_mut(&id) else {
                    return Ok(());
                };

                if let Forwarding::Modern(_) = self.options.forwarding {
                    let message_id = rand::thread_rng().gen_range(0..=i32::MAX);
                    conn.out.packet(encode_packet(
                        ids::login::PLUGIN_REQUEST,
                        &LoginPluginRequest {
                            message_id,
                            channel: VELOCITY_CHANNEL.into(),
                            data: Bytes::from_static(&[MODERN_FORWARDING_VERSION as u8]),
                        },
                    ));
                    conn.state = LoginState::AwaitingForwarding {
                        message_id,
                        name: start.name,
                    };
                    return Ok(());
                }

                let identity = match conn.forwarded.clone() {
                    Some(forwarded) => Identity {
                        name: start.name,
                        uuid: forwarded.uuid,
                        confirmed: true,
                        host: forwarded.host,
                    },
                    None => Identity {
                        uuid: Uuid::from_bytes(limbo_crypto::offline_uuid(&start.name)),
                        name: start.name,
                        confirmed: false,
                        host: conn.addr.ip().to_string(),
                    },
                };
                self.joined(id, identity);
                Ok(())
            }
            LoginState::AwaitingForwarding { message_id, name } => {
                expect(packet_id, ids::login::PLUGIN_RESPONSE)?;
                let response = LoginPluginResponse::proto_decode(&mut body)?;
                if response.message_id != message_id {
                    return Err(LoginError::UnexpectedResponse);
                }
                let data = response.data.ok_or(LoginError::ForwardingMissing)?;
                let Forwarding::Modern(secret) = &self.options.forwarding else {
                    return Err(LoginError::UnexpectedResponse);
                };
                let identity = read_modern_forwarding(secret, &data)?;
                if identity.name != name {
                    debug!(conn = %id, "proxy renamed {name} to {}", identity.name);
                }
                self.joined(id, identity);
                Ok(())
            }
            LoginState::AwaitingAcknowledge => {
                expect(packet_id, ids::login::ACKNOWLEDGED)?;
                let Some(conn) = self.sessions.get_mut(&id) else {
                    return Ok(());
                };
                if let Some(v) = conn.adapter.clone() {
                    if let Some(configure) = v.configure {
                        configure(&v, &self.content, &mut conn.out);
                    }
                }
                conn.state = LoginState::Configuration;
                Ok(())
            }
            LoginState::Configuration => {
                let finish_ack = self
                    .sessions
                    .get(&id)
                    .and_then(|c| c.adapter.as_ref())
                    .and_then(|v| v.config)
                    .map(|c| c.finish_ack);
                if finish_ack == Some(packet_id) {
                    self.player_joined(id);
                } else {
                    trace!(conn = %id, "ignoring configuration packet {packet_id:#04x}");
                }
                Ok(())
            }
            LoginState::Handshake | LoginState::Status | LoginState::Play => {
                Err(LoginError::UnexpectedPacket(packet_id))
            }
        }
    }

    /// Identity settled: compression, login success, then either the
    /// configuration phase or PLAY.
    fn joined(&mut self, id: ConnId, identity: Identity) {
        let threshold = self.options.compression_threshold;
        let Some(conn) = self.sessions.get_mut(&id) else {
            return;
        };
        let Some(v) = conn.adapter.clone() else {
            return;
        };

        if threshold >= 0 {
            conn.out
                .packet(encode_packet(ids::login::SET_COMPRESSION, &SetCompression { threshold }));
            conn.out.compression(threshold);
        }
        conn.out.packet(build_packet(ids::login::SUCCESS, |buf| {
            (v.login_success)(buf, &identity)
        }));
        info!(
            conn = %id,
            bedrock = conn.bedrock,
            "{} ({}) logged in with {} ({})",
            identity.name,
            identity.uuid,
            v.name,
            conn.protocol
        );
        conn.identity = Some(identity);

        if v.config.is_some() {
            conn.state = LoginState::AwaitingAcknowledge;
        } else {
            self.player_joined(id);
        }
    }
}
