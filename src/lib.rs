//! Realtime collaborative kanban board.
//!
//! Clients hold a whole [`board::Board`], apply pure mutation operations to
//! it, and send the result whole to a coordination point ([`sync::Hub`]),
//! which adopts it as canonical and relays it to everyone. The last adopted
//! board wins.

pub mod board;
pub mod config;
pub mod errors;
pub mod sync;
pub mod telemetry;
