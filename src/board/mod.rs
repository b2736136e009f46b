//! Board state model and pure mutation operations.
//!
//! | Module     | Responsibility                                          |
//! |------------|---------------------------------------------------------|
//! | `models`   | `Board`, `Column`, `Task` and their opaque ids          |
//! | `ids`      | `IdSource` and `Clock` seams injected into operations   |
//! | `ops`      | `move_column`, `move_task`, add/delete/update, `BoardOp`|
//! | `state`    | `BoardState`: the board a client holds, if any          |
//! | `validate` | `Board::validate()` structural invariant check          |

pub mod ids;
pub mod models;
pub mod ops;
pub mod state;
mod validate;

pub use ids::{Clock, IdSource, ManualClock, SequentialIds, SystemClock, UuidIds};
pub use models::{Board, Column, ColumnId, Task, TaskId};
pub use ops::BoardOp;
pub use state::BoardState;
