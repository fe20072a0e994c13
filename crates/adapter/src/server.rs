//! TCP server for the JSON adapter
//!
//! Accepts connections, performs the hello/welcome handshake, validates and
//! forwards commands to the game loop over a bounded channel, and writes
//! whatever the game loop sends back. The server never touches game state.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, oneshot, RwLock};
use tracing::{debug, info, warn};

use crate::protocol::*;
use crate::runtime::{ClientCommand, InboundCommand, InboundPayload, OutboundMessage};
use crate::types::{CellId, Direction};

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub protocol_version: String,
    pub max_pending_commands: usize,
    /// Cadence of time-budget ticks
    pub tick_interval: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 7878,
            protocol_version: PROTOCOL_VERSION.to_string(),
            max_pending_commands: 16,
            tick_interval: Duration::from_millis(100),
        }
    }
}

impl ServerConfig {
    /// Read `TILE_GRID_*` variables, falling back to the defaults
    pub fn from_env() -> Self {
        use std::env;

        let defaults = Self::default();
        let host = env::var("TILE_GRID_HOST").unwrap_or(defaults.host);
        let port = env::var("TILE_GRID_PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.port);
        let max_pending_commands = env::var("TILE_GRID_MAX_PENDING")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.max_pending_commands);
        let tick_interval = env::var("TILE_GRID_TICK_MS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .filter(|ms| *ms > 0)
            .map(Duration::from_millis)
            .unwrap_or(defaults.tick_interval);

        Self {
            host,
            port,
            protocol_version: PROTOCOL_VERSION.to_string(),
            max_pending_commands,
            tick_interval,
        }
    }

    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid socket address {}:{}", self.host, self.port))
    }

    /// `TILE_GRID_DISABLED=1` (or `true`) turns the adapter off
    pub fn is_disabled() -> bool {
        std::env::var("TILE_GRID_DISABLED")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false)
    }
}

/// Handle to a connected client
struct ClientHandle {
    id: usize,
    handshaken: bool,
    stream_observations: bool,
    last_seq: Option<u64>,
    tx: mpsc::UnboundedSender<ServerMessage>,
}

struct ServerState {
    config: ServerConfig,
    clients: RwLock<Vec<ClientHandle>>,
}

impl ServerState {
    async fn is_handshaken(&self, client_id: usize) -> bool {
        let clients = self.clients.read().await;
        clients
            .iter()
            .find(|c| c.id == client_id)
            .map(|c| c.handshaken)
            .unwrap_or(false)
    }

    /// Accept `seq` only if it is strictly greater than the last one seen.
    async fn check_and_update_seq(&self, client_id: usize, seq: u64) -> bool {
        let mut clients = self.clients.write().await;
        let Some(client) = clients.iter_mut().find(|c| c.id == client_id) else {
            return true;
        };
        match client.last_seq {
            Some(prev) if seq <= prev => false,
            _ => {
                client.last_seq = Some(seq);
                true
            }
        }
    }

    async fn dispatch(&self, msg: OutboundMessage) {
        let clients = self.clients.read().await;
        match msg {
            OutboundMessage::ToClient { client_id, message } => {
                if let Some(c) = clients.iter().find(|c| c.id == client_id) {
                    let _ = c.tx.send(message);
                }
            }
            OutboundMessage::Broadcast { message } => {
                for c in clients
                    .iter()
                    .filter(|c| c.handshaken && c.stream_observations)
                {
                    let _ = c.tx.send(message.clone());
                }
            }
        }
    }
}

/// Start the TCP server.
///
/// `ready_tx` receives the bound address once the listener is up (useful
/// with port 0 in tests).
pub async fn run_server(
    config: ServerConfig,
    command_tx: mpsc::Sender<InboundCommand>,
    mut out_rx: mpsc::UnboundedReceiver<OutboundMessage>,
    ready_tx: Option<oneshot::Sender<SocketAddr>>,
) -> anyhow::Result<()> {
    let addr = config.socket_addr()?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    let bound = listener.local_addr()?;
    info!(%bound, "adapter listening");
    if let Some(tx) = ready_tx {
        let _ = tx.send(bound);
    }

    let state = Arc::new(ServerState {
        config,
        clients: RwLock::new(Vec::new()),
    });

    // Outbound dispatcher.
    {
        let state = Arc::clone(&state);
        tokio::spawn(async move {
            while let Some(msg) = out_rx.recv().await {
                state.dispatch(msg).await;
            }
        });
    }

    let mut client_id_counter = 0usize;
    loop {
        let (socket, peer) = listener.accept().await?;
        client_id_counter += 1;
        let client_id = client_id_counter;
        info!(client_id, %peer, "client connected");

        let state = Arc::clone(&state);
        let command_tx = command_tx.clone();
        tokio::spawn(async move {
            if let Err(e) = handle_client(socket, client_id, state, command_tx).await {
                warn!(client_id, error = %e, "client error");
            }
            info!(client_id, "client disconnected");
        });
    }
}

/// Handle a single client connection
async fn handle_client(
    socket: TcpStream,
    client_id: usize,
    state: Arc<ServerState>,
    command_tx: mpsc::Sender<InboundCommand>,
) -> anyhow::Result<()> {
    let (reader, mut writer) = socket.into_split();
    let mut reader = BufReader::new(reader);
    let (tx, mut rx) = mpsc::unbounded_channel::<ServerMessage>();

    state.clients.write().await.push(ClientHandle {
        id: client_id,
        handshaken: false,
        stream_observations: false,
        last_seq: None,
        tx: tx.clone(),
    });

    let write_task = tokio::spawn(async move {
        let mut buf: Vec<u8> = Vec::with_capacity(4096);
        while let Some(msg) = rx.recv().await {
            buf.clear();
            if serde_json::to_writer(&mut buf, &msg).is_err() {
                continue;
            }
            buf.push(b'\n');
            if writer.write_all(&buf).await.is_err() || writer.flush().await.is_err() {
                break;
            }
        }
    });

    let result = read_loop(&mut reader, client_id, &state, &command_tx, &tx).await;

    state.clients.write().await.retain(|c| c.id != client_id);
    drop(tx);
    let _ = write_task.await;
    result
}

async fn read_loop(
    reader: &mut BufReader<tokio::net::tcp::OwnedReadHalf>,
    client_id: usize,
    state: &ServerState,
    command_tx: &mpsc::Sender<InboundCommand>,
    tx: &mpsc::UnboundedSender<ServerMessage>,
) -> anyhow::Result<()> {
    let reply = |msg: ServerMessage| {
        let _ = tx.send(msg);
    };
    let mut line = String::new();

    loop {
        line.clear();
        if reader.read_line(&mut line).await? == 0 {
            return Ok(());
        }
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        debug!(client_id, line = trimmed, "received");

        match parse_message(trimmed) {
            Ok(ParsedMessage::Hello(hello)) => {
                if state.is_handshaken(client_id).await
                    && !state.check_and_update_seq(client_id, hello.seq).await
                {
                    reply(create_error(
                        hello.seq,
                        ErrorCode::InvalidCommand,
                        "seq must be strictly increasing",
                    ));
                    continue;
                }
                if !is_compatible(&hello.protocol_version) {
                    reply(create_error(
                        hello.seq,
                        ErrorCode::ProtocolMismatch,
                        &format!("protocol version {} not supported", hello.protocol_version),
                    ));
                    return Ok(());
                }

                {
                    let mut clients = state.clients.write().await;
                    if let Some(c) = clients.iter_mut().find(|c| c.id == client_id) {
                        c.handshaken = true;
                        c.stream_observations = hello.stream_observations;
                        c.last_seq = Some(hello.seq);
                    }
                }
                info!(client_id, client = %hello.client, "handshake complete");
                reply(create_welcome(hello.seq, &state.config.protocol_version));

                if hello.stream_observations {
                    let _ = command_tx.try_send(InboundCommand {
                        client_id,
                        seq: hello.seq,
                        payload: InboundPayload::SnapshotRequest,
                    });
                }
            }

            Ok(ParsedMessage::Command(cmd)) => {
                if !state.is_handshaken(client_id).await {
                    reply(create_error(
                        cmd.seq,
                        ErrorCode::HandshakeRequired,
                        "send hello before command",
                    ));
                    continue;
                }
                if !state.check_and_update_seq(client_id, cmd.seq).await {
                    reply(create_error(
                        cmd.seq,
                        ErrorCode::InvalidCommand,
                        "seq must be strictly increasing",
                    ));
                    continue;
                }

                let mapped = match map_command(&cmd) {
                    Ok(c) => c,
                    Err((code, message)) => {
                        reply(create_error(cmd.seq, code, &message));
                        continue;
                    }
                };

                if command_tx
                    .try_send(InboundCommand {
                        client_id,
                        seq: cmd.seq,
                        payload: InboundPayload::Command(mapped),
                    })
                    .is_err()
                {
                    warn!(client_id, seq = cmd.seq, "command queue full");
                    reply(create_error(
                        cmd.seq,
                        ErrorCode::Backpressure,
                        "command queue is full",
                    ));
                }
            }

            Ok(ParsedMessage::Unknown { seq }) => {
                reply(create_error(seq, ErrorCode::InvalidCommand, "unknown message type"));
            }

            Err(e) => {
                let seq = extract_seq_best_effort(trimmed).unwrap_or(0);
                reply(create_error(
                    seq,
                    ErrorCode::InvalidCommand,
                    &format!("JSON parse error: {}", e),
                ));
            }
        }
    }
}

/// Map a wire command into a game command.
pub fn map_command(cmd: &CommandMessage) -> Result<ClientCommand, (ErrorCode, String)> {
    match cmd.action.as_str() {
        "move" => {
            let Some(dir) = cmd.direction.as_deref() else {
                return Err((ErrorCode::InvalidCommand, "missing direction".to_string()));
            };
            Direction::from_str(dir)
                .map(ClientCommand::Move)
                .ok_or_else(|| (ErrorCode::InvalidCommand, format!("unknown direction: {}", dir)))
        }
        "swap" => match (cmd.a, cmd.b) {
            (Some(a), Some(b)) => Ok(ClientCommand::Swap {
                a: CellId::new(a),
                b: CellId::new(b),
            }),
            _ => Err((
                ErrorCode::InvalidCommand,
                "swap needs cell ids a and b".to_string(),
            )),
        },
        "undo" => Ok(ClientCommand::Undo),
        "restore" => Ok(ClientCommand::Restore),
        "pause" => Ok(ClientCommand::Pause),
        "resume" => Ok(ClientCommand::Resume),
        "observe" => Ok(ClientCommand::Observe),
        other => Err((
            ErrorCode::InvalidCommand,
            format!("unknown action: {}", other),
        )),
    }
}
