//! The value-parser contract and the type-erased values it produces.
//!
//! Every argument and valued flag is backed by a [`ValueParser`]. A parser
//! reads zero or more tokens from the cursor and either returns a
//! [`BoundValue`] or an [`ArgumentFailure`]. When a parser fails, the engine
//! rewinds the cursor to where the parser started, so a parser may consume
//! tokens before deciding it cannot handle them.

use std::any::{Any, type_name};
use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::context::CommandContext;
use crate::tokens::TokenQueue;

/// Why a value parser could not produce a value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArgumentFailure {
    /// The cursor ran out of tokens.
    ///
    /// OPTIONAL arguments treat this as "not supplied" rather than an error.
    #[error("no input left")]
    NoInput,

    /// A token was present but could not be turned into a value.
    #[error("invalid value '{token}': {reason}")]
    Invalid { token: String, reason: String },
}

impl ArgumentFailure {
    pub fn invalid(token: impl Into<String>, reason: impl Into<String>) -> Self {
        ArgumentFailure::Invalid {
            token: token.into(),
            reason: reason.into(),
        }
    }

    pub fn is_no_input(&self) -> bool {
        matches!(self, ArgumentFailure::NoInput)
    }
}

/// A parsed value of any `'static + Send + Sync` type.
///
/// Cloning shares the underlying value.
#[derive(Clone)]
pub struct BoundValue {
    inner: Arc<dyn Any + Send + Sync>,
    type_name: &'static str,
}

impl BoundValue {
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self {
            inner: Arc::new(value),
            type_name: type_name::<T>(),
        }
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.inner.downcast_ref::<T>()
    }

    pub fn is<T: Any>(&self) -> bool {
        self.inner.is::<T>()
    }

    /// Name of the stored type, for diagnostics.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }
}

impl fmt::Debug for BoundValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BoundValue<{}>", self.type_name)
    }
}

/// Capability every argument and flag value parser implements.
///
/// Closures with the matching signature implement it too:
///
/// ```
/// use cmdtree::{ArgumentFailure, BoundValue, CommandContext, TokenQueue, ValueParser};
///
/// fn upper<C>() -> impl ValueParser<C> {
///     |_: &CommandContext<C>, input: &mut TokenQueue| -> Result<BoundValue, ArgumentFailure> {
///         let token = input.pop().ok_or(ArgumentFailure::NoInput)?;
///         Ok(BoundValue::new(token.to_uppercase()))
///     }
/// }
/// ```
pub trait ValueParser<C>: Send + Sync {
    fn parse(
        &self,
        context: &CommandContext<C>,
        input: &mut TokenQueue,
    ) -> Result<BoundValue, ArgumentFailure>;
}

impl<C, F> ValueParser<C> for F
where
    F: Fn(&CommandContext<C>, &mut TokenQueue) -> Result<BoundValue, ArgumentFailure> + Send + Sync,
{
    fn parse(
        &self,
        context: &CommandContext<C>,
        input: &mut TokenQueue,
    ) -> Result<BoundValue, ArgumentFailure> {
        self(context, input)
    }
}

/// Shared handle to a value parser, as stored in arguments and flags.
pub type SharedParser<C> = Arc<dyn ValueParser<C>>;
