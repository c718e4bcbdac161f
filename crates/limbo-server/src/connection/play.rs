//! The PLAY phase: world sends, resets, movement, commands and scheduled
//! tasks.

use std::time::Duration;

use limbo_proto::packets::{raw_packet, ChatCommand, ChatMessage, CustomPayload, MovePlayer};
use limbo_proto::{BlockPos, ProtoError};
use tracing::trace;

use super::*;
use crate::status_relay::STATUS_CHANNEL;
use crate::versions::{entities, ui, world};
use crate::voting;

const PORTAL_COOLDOWN: Duration = Duration::from_secs(3);
const SPAWN_COOLDOWN: Duration = Duration::from_millis(500);
const RESET_COOLDOWN: Duration = Duration::from_secs(2);
const CREDITS_COOLDOWN: Duration = Duration::from_millis(500);

const KEEP_ALIVE_TICKS: u64 = 100;
const VANILLA_MUSIC_TICKS: u64 = 200;
const BEDROCK_TIME_TICKS: u64 = 100;
const TABLIST_DELAY: u64 = 10;

const COMMANDS: [&str; 5] = ["reset", "spawn", "hub", "unlink", "credits"];
const VOTING_COMMANDS: [&str; 2] = ["next", "prev"];

/// One PLAY session borrowed out of the handler.
pub(super) struct Session<'a> {
    pub ctx: Ctx<'a>,
    pub options: &'a Options,
    pub statuses: &'a StatusTable,
}

impl Session<'_> {
    pub fn player_joined(&mut self) {
        let voting = self.options.voting.is_some();
        let ctx = &mut self.ctx;
        let v = ctx.v;
        ctx.play.ticker.add_loop(Task::KeepAlive, KEEP_ALIVE_TICKS);
        ctx.play
            .ticker
            .add_loop(Task::StopVanillaMusic, VANILLA_MUSIC_TICKS);

        (v.join)(ctx);
        let mut names = COMMANDS.to_vec();
        if voting {
            names.extend(VOTING_COMMANDS);
        }
        ui::commands(ctx, &names);

        // versions with a configuration phase got their tags there
        if v.config.is_none() {
            if let Some(tags) = v.tag_format.and_then(|f| ctx.content.tags.get(f)) {
                ctx.out.packet(raw_packet(v.cb.tags, tags));
            }
        }

        self.send_world();

        let ctx = &mut self.ctx;
        if ctx.bedrock {
            (v.inventory)(ctx);
        }
        ctx.play.ticker.add_delay(Task::Tablist, TABLIST_DELAY);
        ctx.play.ticker.add_delay(Task::Music, v.delays.music);
    }

    /// Everything the client needs to see the active world.
    pub fn send_world(&mut self) {
        let Self {
            ctx,
            options,
            statuses,
        } = self;
        let (options, statuses) = (*options, *statuses);
        let v = ctx.v;

        if ctx.bedrock {
            world::empty_chunks(ctx);
        }
        world::replay_packets(ctx);
        (v.spawn)(ctx);
        entities::send_maps(ctx, options.debug);
        spawn_holograms(ctx, statuses);
        if options.debug {
            entities::debug_markers(ctx);
        }
        world::weather(ctx);
        if ctx.bedrock {
            ctx.play
                .ticker
                .add_loop_unique(Task::BedrockTime, BEDROCK_TIME_TICKS);
        } else {
            (v.time)(ctx);
        }
        if let Some(voting) = &options.voting {
            voting_lines(ctx, voting);
        }
    }

    /// Respawn through the reset dimension and schedule the world send.
    pub fn reset_world(&mut self, effects: bool) {
        let ctx = &mut self.ctx;
        let v = ctx.v;
        if self.options.debug {
            entities::clear_markers(ctx);
        }
        ctx.play.holograms.clear();
        ctx.play.raining = None;
        (v.respawn)(ctx, true);
        (v.respawn)(ctx, false);

        // a reset replaces any world send still pending from the last one
        let ticker = &mut ctx.play.ticker;
        for task in [Task::SendWorld, Task::Music, Task::ResetSound] {
            ticker.cancel(&task);
        }
        ticker.add_delay(Task::SendWorld, v.delays.world);
        ticker.add_delay(Task::Music, v.delays.music);
        if effects {
            ticker.add_delay(Task::ResetSound, v.delays.sound);
        }
    }

    pub fn run(&mut self, task: Task) {
        let ctx = &mut self.ctx;
        match task {
            Task::KeepAlive => ui::keep_alive(ctx),
            Task::StopVanillaMusic => world::music(ctx, true),
            Task::Music => world::music(ctx, false),
            Task::Tablist => (ctx.v.tablist)(ctx),
            Task::SendWorld => self.send_world(),
            Task::ResetSound => world::reset_sound(ctx),
            Task::BedrockTime => (ctx.v.time)(ctx),
        }
    }

    /// Serverbound PLAY packets. Anything not listed is ignored.
    pub fn handle_packet(
        &mut self,
        packet_id: i32,
        mut body: Bytes,
        now: Instant,
    ) -> Result<(), ProtoError> {
        let sb = self.ctx.v.sb;
        if packet_id < 0 {
            return Ok(());
        }
        if packet_id == sb.position || packet_id == sb.position_rotation {
            let pos = MovePlayer::proto_decode(&mut body)?;
            self.on_move(pos, now);
        } else if packet_id == sb.chat_command {
            let command = ChatCommand::proto_decode(&mut body)?;
            self.on_command(&command.command, now);
        } else if packet_id == sb.chat {
            let chat = ChatMessage::proto_decode(&mut body)?;
            // commands only arrive as chat before 1.19
            if sb.chat_command < 0 {
                if let Some(command) = chat.message.strip_prefix('/') {
                    self.on_command(command, now);
                }
            }
        }
        Ok(())
    }

    fn on_move(&mut self, pos: MovePlayer, now: Instant) {
        let ctx = &mut self.ctx;
        let block = BlockPos::floor(pos.x, pos.y, pos.z);
        let world = ctx.world();

        if let Some(server) = world.portal_at(block) {
            let ready = ctx
                .play
                .last_portal
                .map_or(true, |last| now.duration_since(last) > PORTAL_COOLDOWN);
            if ready {
                ctx.play.last_portal = Some(now);
                info!("Sending {} to {server}", ctx.player.name);
                ui::transfer(ctx, server);
            }
        }
        if !world.within_bounds(block) {
            self.spawn(true);
        }
    }

    fn on_command(&mut self, line: &str, now: Instant) {
        let name = line.split_whitespace().next().unwrap_or_default();
        let cooldown = match name {
            "spawn" | "hub" => Some(SPAWN_COOLDOWN),
            "reset" => Some(RESET_COOLDOWN),
            "credits" => Some(CREDITS_COOLDOWN),
            _ => None,
        };
        if let (Some(cooldown), Some(last)) = (cooldown, self.ctx.play.last_command) {
            if now.duration_since(last) < cooldown {
                trace!(player = %self.ctx.player.name, "/{name} on cooldown");
                return;
            }
        }

        let voting = self.options.voting.is_some();
        match name {
            "spawn" | "hub" => self.spawn(true),
            "reset" => self.reset_world(true),
            "credits" => {
                let credits = self.ctx.world().credits();
                (self.ctx.v.chat)(&mut self.ctx, &credits);
            }
            "next" if voting => self.switch_world(true),
            "prev" if voting => self.switch_world(false),
            "unlink" => {}
            _ => debug!(player = %self.ctx.player.name, "unknown command /{line}"),
        }
        self.ctx.play.last_command = Some(now);
    }

    /// Move to the next or previous world of the family, wrapping.
    fn switch_world(&mut self, forward: bool) {
        let ctx = &mut self.ctx;
        let (family, worlds) = (ctx.v.family, &ctx.content.worlds);
        let current = ctx.world();
        let target = if forward {
            worlds.next(family, &current)
        } else {
            worlds.prev(family, &current)
        };
        debug!(player = %ctx.player.name, "switching from {} to {}", current.name, target.name);
        ctx.play.world = target;
        self.reset_world(false);
    }

    fn spawn(&mut self, effects: bool) {
        let ctx = &mut self.ctx;
        (ctx.v.spawn)(ctx);
        if effects {
            world::spawn_effect(ctx);
        }
    }

    /// Re-render the holograms showing any of `servers`.
    pub fn update_holograms(&mut self, servers: &[String]) {
        for server in servers {
            let Some(lines) = self.statuses.lines(server) else {
                continue;
            };
            let Some(groups) = self.ctx.play.holograms.get(server).cloned() else {
                continue;
            };
            for ids in groups {
                entities::hologram_text(&mut self.ctx, &ids, lines);
            }
        }
    }
}

fn spawn_holograms(ctx: &mut Ctx<'_>, statuses: &StatusTable) {
    let world = ctx.world();
    for placement in &world.holograms {
        let ids = entities::spawn_hologram(ctx, placement);
        if let Some(lines) = statuses.lines(&placement.server) {
            entities::hologram_text(ctx, &ids, lines);
        }
        ctx.play
            .holograms
            .entry(placement.server.clone())
            .or_default()
            .push(ids);
    }
}

/// Entry number, credits, and the navigation line.
fn voting_lines(ctx: &mut Ctx<'_>, settings: &Voting) {
    let v = ctx.v;
    let world = ctx.world();
    let worlds = &ctx.content.worlds;
    let index = worlds.position(v.family, &world).unwrap_or(0);
    let total = worlds.worlds(v.family).len();

    (v.chat)(ctx, &voting::entry_line(index, total));
    (v.chat)(ctx, &world.credits());
    if !ctx.bedrock {
        let link = settings
            .url
            .as_deref()
            .and_then(|template| voting::voting_link(template, &settings.secret, ctx.player.uuid));
        (v.chat)(ctx, &voting::navigation_line(link.as_deref()));
    }
}

impl ConnectionHandler {
    /// Enter PLAY in the family's starting world.
    pub(super) fn player_joined(&mut self, id: ConnId) {
        let voting = self.options.voting.is_some();
        let online = self.player_count() + 1;
        let Some(conn) = self.sessions.get_mut(&id) else {
            return;
        };
        let Some(v) = conn.adapter.clone() else {
            return;
        };
        let worlds = &self.content.worlds;
        let start = if voting {
            worlds.first(v.family)
        } else {
            worlds.default_world(v.family)
        };
        let Some(start) = start.cloned() else {
            warn!(conn = %id, "no world for {}, closing", v.family);
            conn.out.close();
            return;
        };

        info!(
            "{} joined {} ({} online)",
            conn.name(),
            start.name,
            online
        );
        conn.state = LoginState::Play;
        conn.play = Some(PlayState::new(start));
        if let Some(mut session) = self.session(id) {
            session.player_joined();
        }
    }

    pub(super) fn handle_play(&mut self, id: ConnId, packet_id: i32, mut body: Bytes, now: Instant) {
        let custom_payload = self
            .sessions
            .get(&id)
            .and_then(|c| c.adapter.as_ref())
            .map(|v| v.sb.custom_payload);
        if packet_id >= 0 && Some(packet_id) == custom_payload {
            match CustomPayload::proto_decode(&mut body) {
                Ok(payload) if payload.channel == STATUS_CHANNEL => self.relay_status(&payload.data),
                Ok(payload) => trace!(conn = %id, "plugin message on {}", payload.channel),
                Err(e) => debug!(conn = %id, "bad plugin message: {e}"),
            }
            return;
        }

        let Some(mut session) = self.session(id) else {
            return;
        };
        if let Err(e) = session.handle_packet(packet_id, body, now) {
            debug!(conn = %id, "skipping packet {packet_id:#04x}: {e}");
        }
    }

    /// Apply a signed status update and refresh every affected hologram.
    fn relay_status(&mut self, data: &[u8]) {
        let changed = match self
            .statuses
            .apply(self.options.status_secret.as_deref(), data)
        {
            Ok(changed) => changed,
            Err(e) => {
                warn!("Rejected status update: {e}");
                return;
            }
        };
        debug!("status update for {}", changed.join(", "));
        let conns: Vec<ConnId> = self.sessions.keys().copied().collect();
        for id in conns {
            if let Some(mut session) = self.session(id) {
                session.update_holograms(&changed);
            }
        }
    }
}
