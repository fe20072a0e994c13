//! Adapter - drive a tile grid over a TCP socket with a JSON protocol
//!
//! External controllers (bots, test harnesses, a remote UI) connect over
//! TCP and exchange **line-delimited JSON**:
//!
//! 1. **Connection**: client connects (default `127.0.0.1:7878`)
//! 2. **Handshake**: client sends `hello`, server answers `welcome`
//! 3. **Commanding**: client sends `command`; the game loop answers `ack` or `error`
//! 4. **Observation Streaming**: every applied command is followed by an
//!    `observation` broadcast carrying a full [`GridSnapshot`](crate::core::GridSnapshot)
//!
//! # Commands
//!
//! `move` (with `direction`), `swap` (with cell ids `a` and `b`), `undo`,
//! `restore`, `pause`, `resume`, `observe`.
//!
//! # Environment Variables
//!
//! - `TILE_GRID_HOST`: bind address (default: "127.0.0.1")
//! - `TILE_GRID_PORT`: port number (default: 7878)
//! - `TILE_GRID_MAX_PENDING`: command queue capacity (default: 16)
//! - `TILE_GRID_TICK_MS`: time-budget tick cadence in milliseconds (default: 100)
//! - `TILE_GRID_DISABLED`: set to "1" or "true" to disable the adapter
//!
//! # Example Protocol Flow
//!
//! ```text
//! Client -> Server: {"type":"hello","seq":1,"client":"bot","protocol_version":"1.0.0"}
//! Server -> Client: {"type":"welcome","seq":1,"protocol_version":"1.0.0"}
//! Server -> Client: {"type":"observation","seq":1,"snapshot":{...}}
//! Client -> Server: {"type":"command","seq":2,"action":"move","direction":"left"}
//! Server -> Client: {"type":"ack","seq":2,"changed":true}
//! Server -> Client: {"type":"observation","seq":2,"snapshot":{...}}
//! ```
//!
//! # Testing
//!
//! ```bash
//! nc 127.0.0.1 7878
//! {"type":"hello","seq":1,"client":"nc","protocol_version":"1.0.0"}
//! ```

pub mod protocol;
pub mod runtime;
pub mod server;

pub use tile_grid_core as core;
pub use tile_grid_types as types;

pub use protocol::*;
pub use runtime::{
    apply_command, handle_inbound, Adapter, ClientCommand, InboundCommand, InboundPayload,
    OutboundMessage,
};
pub use server::{map_command, run_server, ServerConfig};
