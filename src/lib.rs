//! Tile grid (workspace facade crate).
//!
//! Re-exports `tile_grid::{core,adapter,types}` while the implementation
//! lives in dedicated crates under `crates/`, plus the input-script parser
//! used by the headless runner.

pub mod script;

pub use tile_grid_adapter as adapter;
pub use tile_grid_core as core;
pub use tile_grid_types as types;
