use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{Context, Result};
use cmsdecode_core::{
    AsyncFrameReader, DecodeConfig, FrameError, SessionState, decode_frame_block_with,
};
use tokio::io::AsyncRead;
use tokio::net::{TcpListener, TcpStream};
use tracing::{info, warn};

#[derive(Debug, Clone, Copy)]
pub struct ListenOptions {
    pub bind: SocketAddr,
    pub decode: DecodeConfig,
    /// Close a connection that sends no complete frame for this long.
    pub idle_timeout: Option<Duration>,
}

/// Accept monitor connections until Ctrl-C, one task per connection.
pub async fn serve(options: ListenOptions) -> Result<()> {
    let listener = TcpListener::bind(options.bind)
        .await
        .with_context(|| format!("Failed to bind {}", options.bind))?;
    info!(addr = %listener.local_addr()?, "listening for monitors");

    loop {
        tokio::select! {
            accepted = listener.accept() => {
                let (stream, peer) = accepted.context("Failed to accept connection")?;
                tokio::spawn(async move {
                    if let Err(err) = handle_connection(stream, peer, options).await {
                        warn!(%peer, error = %err, "connection dropped");
                    }
                });
            }
            _ = tokio::signal::ctrl_c() => {
                info!("shutting down");
                return Ok(());
            }
        }
    }
}

async fn handle_connection(
    stream: TcpStream,
    peer: SocketAddr,
    options: ListenOptions,
) -> Result<(), ConnectionError> {
    info!(%peer, "monitor connected");
    let mut state = SessionState::new();
    read_blocks(stream, peer, &options, &mut state).await?;
    info!(%peer, device = %state.device_path(), "monitor disconnected");
    Ok(())
}

/// Decode frames from one monitor until it closes the stream.
///
/// Rejected blocks are logged and skipped. Structural errors and idle
/// timeouts end the connection.
async fn read_blocks<R: AsyncRead + Unpin>(
    stream: R,
    peer: SocketAddr,
    options: &ListenOptions,
    state: &mut SessionState,
) -> Result<(), ConnectionError> {
    let mut reader = AsyncFrameReader::new(stream);
    loop {
        let next = match options.idle_timeout {
            Some(limit) => tokio::time::timeout(limit, reader.read_frame())
                .await
                .map_err(|_| ConnectionError::Idle(limit))?,
            None => reader.read_frame().await,
        };
        let Some(frame) = next? else {
            return Ok(());
        };
        match decode_frame_block_with(&frame, &options.decode) {
            Ok(block) => {
                state.apply(&block);
                info!(%peer, device = %state.device_path(), "{block}");
            }
            Err(err) => warn!(
                %peer,
                device = %state.device_path(),
                error = %err,
                "block skipped"
            ),
        }
    }
}

#[derive(Debug)]
enum ConnectionError {
    Frame(FrameError),
    Idle(Duration),
}

impl From<FrameError> for ConnectionError {
    fn from(err: FrameError) -> Self {
        ConnectionError::Frame(err)
    }
}

impl std::fmt::Display for ConnectionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConnectionError::Frame(err) => write!(f, "{err}"),
            ConnectionError::Idle(limit) => write!(f, "no frame for {}s", limit.as_secs()),
        }
    }
}
