//! CLI command implementations.
//!
//! | Module  | Commands handled |
//! |---------|------------------|
//! | `serve` | `Serve`          |
//! | `watch` | `Watch`          |

pub mod serve;
pub mod watch;

pub use serve::cmd_serve;
pub use watch::cmd_watch;
