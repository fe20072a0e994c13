//! Adapter runtime integration.
//!
//! Bridges the synchronous game loop with the async TCP server. Server
//! tasks and the time-budget timer only enqueue [`InboundCommand`]s; the
//! loop that owns the [`Game`] is the only code that mutates it.

use std::time::Duration;

use anyhow::Context;
use tokio::runtime::Runtime;
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::core::{Game, GridError};
use crate::protocol::{create_ack, create_error, create_observation, ErrorCode, ServerMessage};
use crate::server::{run_server, ServerConfig};
use crate::types::{CellId, Direction, PlayState};

/// Command delivered to the game loop.
#[derive(Debug, Clone, PartialEq)]
pub struct InboundCommand {
    pub client_id: usize,
    pub seq: u64,
    pub payload: InboundPayload,
}

#[derive(Debug, Clone, PartialEq)]
pub enum InboundPayload {
    Command(ClientCommand),
    /// Send the current snapshot to the requesting client
    SnapshotRequest,
    /// Timer tick: count the time budget down by `delta` seconds
    TickTime { delta: f32 },
}

/// Game command payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientCommand {
    Move(Direction),
    Swap { a: CellId, b: CellId },
    Undo,
    Restore,
    Pause,
    Resume,
    Observe,
}

/// Outbound message to be delivered by the server.
#[derive(Debug, Clone, PartialEq)]
pub enum OutboundMessage {
    ToClient {
        client_id: usize,
        message: ServerMessage,
    },
    /// Sent to every handshaken client that streams observations
    Broadcast { message: ServerMessage },
}

/// Run one command against the game. Ok carries whether the board changed.
pub fn apply_command(game: &mut Game, command: ClientCommand) -> Result<bool, GridError> {
    match command {
        ClientCommand::Move(direction) => game.apply_move(direction),
        ClientCommand::Swap { a, b } => game.apply_swap(a, b).map(|()| true),
        ClientCommand::Undo => game.consume_undo().map(|_| false),
        ClientCommand::Restore => {
            game.restore_default();
            Ok(true)
        }
        ClientCommand::Pause => game.set_state(PlayState::Paused).map(|()| false),
        ClientCommand::Resume => game.set_state(PlayState::Playing).map(|()| false),
        ClientCommand::Observe => Ok(false),
    }
}

/// Process one inbound item and return the messages to send back.
pub fn handle_inbound(game: &mut Game, inbound: &InboundCommand) -> Vec<OutboundMessage> {
    let to_client = |message| OutboundMessage::ToClient {
        client_id: inbound.client_id,
        message,
    };

    match inbound.payload {
        InboundPayload::SnapshotRequest => {
            vec![to_client(create_observation(inbound.seq, game.snapshot()))]
        }
        InboundPayload::TickTime { delta } => {
            game.tick_time(delta);
            Vec::new()
        }
        InboundPayload::Command(command) => match apply_command(game, command) {
            Ok(changed) => {
                debug!(seq = inbound.seq, ?command, changed, "command applied");
                let mut out = vec![to_client(create_ack(inbound.seq, changed))];
                if command == ClientCommand::Observe {
                    out.push(to_client(create_observation(inbound.seq, game.snapshot())));
                } else {
                    out.push(OutboundMessage::Broadcast {
                        message: create_observation(inbound.seq, game.snapshot()),
                    });
                }
                out
            }
            Err(err) => vec![to_client(create_error(
                inbound.seq,
                ErrorCode::from(&err),
                &err.to_string(),
            ))],
        },
    }
}

/// Running adapter instance.
pub struct Adapter {
    _rt: Runtime,
    cmd_rx: mpsc::Receiver<InboundCommand>,
    out_tx: mpsc::UnboundedSender<OutboundMessage>,
}

impl Adapter {
    /// Start the adapter from environment variables.
    ///
    /// Returns `Ok(None)` if `TILE_GRID_DISABLED` is set.
    pub fn start_from_env() -> anyhow::Result<Option<Self>> {
        if ServerConfig::is_disabled() {
            info!("adapter disabled via TILE_GRID_DISABLED");
            return Ok(None);
        }
        Self::start(ServerConfig::from_env()).map(Some)
    }

    /// Start the server and the time-budget timer on a private runtime.
    pub fn start(config: ServerConfig) -> anyhow::Result<Self> {
        let max_pending = config.max_pending_commands.max(1);
        let tick_interval = config.tick_interval;
        let (cmd_tx, cmd_rx) = mpsc::channel::<InboundCommand>(max_pending);
        let (out_tx, out_rx) = mpsc::unbounded_channel::<OutboundMessage>();

        let rt = Runtime::new().context("failed to create tokio runtime")?;

        let timer_tx = cmd_tx.clone();
        rt.spawn(tick_timer(timer_tx, tick_interval));
        rt.spawn(async move {
            if let Err(e) = run_server(config, cmd_tx, out_rx, None).await {
                tracing::error!(error = %e, "adapter server stopped");
            }
        });

        Ok(Self {
            _rt: rt,
            cmd_rx,
            out_tx,
        })
    }

    pub fn try_recv(&mut self) -> Option<InboundCommand> {
        self.cmd_rx.try_recv().ok()
    }

    /// Block until the next inbound item; `None` once every sender is gone
    pub fn recv_blocking(&mut self) -> Option<InboundCommand> {
        self.cmd_rx.blocking_recv()
    }

    pub fn send(&self, msg: OutboundMessage) {
        let _ = self.out_tx.send(msg);
    }

    /// Drive `game` from adapter input until the channel closes.
    pub fn serve(&mut self, game: &mut Game) {
        while let Some(inbound) = self.recv_blocking() {
            for msg in handle_inbound(game, &inbound) {
                self.send(msg);
            }
        }
    }
}

/// Enqueue a `TickTime` every `interval`. Never touches the game directly.
pub async fn tick_timer(tx: mpsc::Sender<InboundCommand>, interval: Duration) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    let delta = interval.as_secs_f32();
    loop {
        ticker.tick().await;
        let tick = InboundCommand {
            client_id: 0,
            seq: 0,
            payload: InboundPayload::TickTime { delta },
        };
        if tx.send(tick).await.is_err() {
            break;
        }
    }
}
