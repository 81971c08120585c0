//! Command tree model.
//!
//! - `types`: the [`Command`] node and its executor type
//! - `argument`: positional [`Argument`]s
//! - `flag`: [`Flag`]s, presence switches or valued

mod argument;
mod flag;
mod types;

pub use argument::{Argument, ArgumentKind};
pub use flag::{Flag, FlagKind};
pub use types::{Command, CommandExecutor};
