//! Per-socket task: framing, compression and idle timeout.

use std::time::Duration;

use bytes::{Bytes, BytesMut};
use limbo_proto::frame::FrameCodec;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, trace};

use crate::error::NetError;
use crate::server::{ConnId, NetEvent};

/// Vanilla clients are dropped after 30 s of silence.
const READ_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug)]
pub(crate) enum SessionCommand {
    Send(Bytes),
    SetCompression(i32),
    Close,
}

pub(crate) async fn run(
    id: ConnId,
    stream: TcpStream,
    event_tx: mpsc::Sender<NetEvent>,
    commands: mpsc::UnboundedReceiver<SessionCommand>,
    closed_tx: mpsc::UnboundedSender<ConnId>,
) {
    match pump(id, stream, &event_tx, commands).await {
        Ok(()) => trace!("{id} closed"),
        Err(e) => debug!("{id} closed: {e}"),
    }
    let _ = event_tx.send(NetEvent::Disconnected { id }).await;
    let _ = closed_tx.send(id);
}

async fn pump(
    id: ConnId,
    stream: TcpStream,
    event_tx: &mpsc::Sender<NetEvent>,
    mut commands: mpsc::UnboundedReceiver<SessionCommand>,
) -> Result<(), NetError> {
    let (mut reader, mut writer) = stream.into_split();
    let mut codec = FrameCodec::new();
    let mut buf = BytesMut::with_capacity(4096);
    let mut deadline = Instant::now() + READ_TIMEOUT;

    loop {
        tokio::select! {
            read = reader.read_buf(&mut buf) => {
                if read? == 0 {
                    return Ok(());
                }
                deadline = Instant::now() + READ_TIMEOUT;
                while let Some(payload) = codec.decode(&mut buf)? {
                    if event_tx.send(NetEvent::Packet { id, payload }).await.is_err() {
                        return Ok(());
                    }
                }
            }
            cmd = commands.recv() => match cmd {
                Some(SessionCommand::Send(payload)) => {
                    let frame = codec.encode(&payload)?;
                    writer.write_all(&frame).await?;
                }
                Some(SessionCommand::SetCompression(threshold)) => codec.set_threshold(threshold),
                Some(SessionCommand::Close) | None => {
                    writer.shutdown().await?;
                    return Ok(());
                }
            },
            _ = tokio::time::sleep_until(deadline) => return Err(NetError::Timeout),
        }
    }
}
