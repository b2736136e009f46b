//! Realtime synchronization between clients and the coordination point.
//!
//! ## Module Map
//!
//! ```text
//! ┌──────────────┐ updateBoard ┌──────────────────────────────────────────┐
//! │  session.rs  │ ──────────> │  server.rs  (axum Router, start_server)  │
//! │  (Session)   │ <────────── │    ├─ ws.rs   (socket loop, keepalive)   │
//! └──────┬───────┘ boardState  │    └─ api.rs  (read-only HTTP, AppState) │
//!        │         presence    │         │                                │
//!        │                     │         v                                │
//!        │ Connector::open()   │  hub.rs  (canonical board, presence,     │
//!        v                     │           total order of adoptions)      │
//!  transport.rs                └──────────────────────────────────────────┘
//!  (WsTransport, LocalTransport ── in-process, straight to the Hub)
//! ```
//!
//! ## Supporting Modules
//!
//! | Module     | Responsibility                                          |
//! |------------|---------------------------------------------------------|
//! | `protocol` | `ClientMessage` / `ServerMessage` JSON frames           |
//!
//! ## Update Flow
//!
//! 1. `Session::apply(op)` runs the operation on the local board, adopts the
//!    result and sends it whole as `updateBoard`.
//! 2. The hub replaces its canonical board and relays `boardState` to every
//!    client, the sender included.
//! 3. Each `Session` replaces its local board wholesale on `boardState`.
//!    The last adopted board wins; concurrent edits are not merged.

pub mod api;
pub mod hub;
pub mod protocol;
pub mod server;
pub mod session;
pub mod transport;
pub mod ws;

pub use hub::{ClientId, Connection, Hub};
pub use protocol::{ClientMessage, ServerMessage};
pub use session::{ConnectionStatus, Session, SessionEvent};
pub use transport::{Connector, LocalConnector, LocalTransport, Transport, WsConnector, WsTransport};
