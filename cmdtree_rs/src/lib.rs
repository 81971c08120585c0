//! # cmdtree
//!
//! **Command trees for chat and console input.** Hosts register a tree of
//! named commands once, then feed it free-form lines such as
//! `"kick -s Steve being rude"`. The engine walks the tree, binds typed
//! arguments and flags, checks permissions and runs the matched command's
//! executor off the submitting thread.
//!
//! ## Features
//!
//! - **Immutable command model** - `with_*` builders, `Arc`-shared subtrees
//! - **Validated registration** - argument ordering, executors and alias
//!   collisions are checked before anything becomes dispatchable
//! - **Collision policies** - override, relocate or ignore a duplicate top-level name
//! - **Typed binding** - pluggable [`ValueParser`]s, typed [`CommandContext`] lookups
//! - **Scheduler** - dispatch on a worker, continue on the host's main thread
//!
//! ## Quick Start
//!
//! ```rust
//! use cmdtree::parsers::{GreedyStringParser, StringParser};
//! use cmdtree::{Argument, Command, CommandRegistry, Flag};
//!
//! let registry = CommandRegistry::<String>::inline();
//! registry
//!     .register(
//!         Command::new("kick")
//!             .with_argument(Argument::required("player", StringParser))
//!             .with_argument(Argument::optional("reason", GreedyStringParser))
//!             .with_flag(Flag::single("silent").with_alias("s"))
//!             .with_executor(|ctx| {
//!                 let player = ctx.argument::<String>("player")?;
//!                 let reason = ctx.argument_or("reason", String::from("no reason"))?;
//!                 println!("{} kicked {player}: {reason}", ctx.caller());
//!                 Ok(())
//!             }),
//!     )
//!     .unwrap();
//!
//! let ctx = futures::executor::block_on(
//!     registry.handle("admin".to_string(), "kick -s Steve being rude"),
//! )
//! .unwrap();
//! assert!(ctx.has_flag("silent"));
//! ```
//!
//! ## Custom Parsers
//!
//! ```rust
//! use cmdtree::{ArgumentFailure, BoundValue, CommandContext, TokenQueue, ValueParser};
//!
//! struct Coordinates;
//!
//! impl<C> ValueParser<C> for Coordinates {
//!     fn parse(
//!         &self,
//!         _ctx: &CommandContext<C>,
//!         input: &mut TokenQueue,
//!     ) -> Result<BoundValue, ArgumentFailure> {
//!         let mut axis = || -> Result<f64, ArgumentFailure> {
//!             let token = input.pop().ok_or(ArgumentFailure::NoInput)?;
//!             token
//!                 .parse()
//!                 .map_err(|_| ArgumentFailure::invalid(&token, "not a number"))
//!         };
//!         Ok(BoundValue::new((axis()?, axis()?, axis()?)))
//!     }
//! }
//! ```

// ============================================================================
// Command Model
// ============================================================================

/// Command tree nodes.
///
/// - [`Command`] - a named node with aliases, arguments, flags, subcommands
/// - [`Argument`] - positional, REQUIRED or OPTIONAL
/// - [`Flag`] - presence switch or valued option, SINGLE or REPEATABLE
pub mod command;
/// Standard value parsers (strings, integers, booleans, greedy text).
pub mod parsers;
/// Token queue and the tokenizer.
pub mod tokens;
/// Parser contract and type-erased values.
pub mod value;

// ============================================================================
// Registry & Dispatch
// ============================================================================

/// Registry configuration loaded from `.cmdtree/config.toml`.
pub mod config;
/// Per-invocation bound values.
pub mod context;
mod dispatch;
/// Error types.
pub mod error;
/// Authorization hook consulted before entering guarded commands.
pub mod permission;
/// Command registry, registration policy and the dispatch future.
///
/// # Key Types
///
/// - [`CommandRegistry`] - shared handle to the tree
/// - [`RegistrationPolicy`] - what happens on a top-level name collision
/// - [`DispatchHandle`] - future returned by [`CommandRegistry::handle`]
pub mod registry;
/// Task executors behind dispatch and continuations.
///
/// The async executor runs dispatch; the sync executor stands for the host's
/// main thread (see [`MainThreadQueue`]).
pub mod scheduler;

// ============================================================================
// Re-exports
// ============================================================================

pub use command::{Argument, ArgumentKind, Command, CommandExecutor, Flag, FlagKind};
pub use config::RegistryConfig;
pub use context::CommandContext;
pub use error::{ContextError, DispatchError, ParseError, RegistrationError};
pub use permission::{AllowAll, Authorizer};
pub use registry::{
    CommandRegistry, DispatchHandle, Registration, RegistrationPolicy, RegistryBuilder,
};
#[cfg(feature = "tokio")]
pub use scheduler::TokioExecutor;
pub use scheduler::{
    InlineExecutor, MainThreadQueue, Scheduler, TaskAborted, TaskExecutor, TaskHandle,
};
pub use tokens::{Checkpoint, TokenQueue, tokenize};
pub use value::{ArgumentFailure, BoundValue, SharedParser, ValueParser};
