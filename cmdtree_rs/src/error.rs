//! Error types for registration, dispatch and context access.
//!
//! Every variant carries the detail a host needs to render a message itself
//! (command path, offending token, token position). The library never prints.

use thiserror::Error;

use crate::value::ArgumentFailure;

/// Structural problem found while registering a command subtree.
///
/// `command` is the space-joined path from the top-level command.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistrationError {
    #[error("command '{command}' has required argument '{argument}' after an optional one")]
    RequiredAfterOptional { command: String, argument: String },

    #[error("command '{command}' has neither an executor nor subcommands")]
    MissingExecutor { command: String },

    #[error("command '{command}' declares argument '{argument}' more than once")]
    DuplicateArgument { command: String, argument: String },

    #[error("command '{command}' has a collision with the subcommand '{subcommand}' on alias '{alias}'")]
    SubcommandAliasCollision {
        command: String,
        subcommand: String,
        alias: String,
    },

    #[error("command '{command}' has a collision with the flag '{flag}' on alias '{alias}'")]
    FlagAliasCollision {
        command: String,
        flag: String,
        alias: String,
    },
}

/// Why an input could not be matched against the command tree.
///
/// `position` is the index of the offending token in the space-split input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("unknown flag '{name}' at token {position}")]
    UnknownFlag { name: String, position: usize },

    #[error("empty flag name at token {position}")]
    EmptyFlagName { position: usize },

    #[error("flag '{name}' can only be used once (token {position})")]
    DuplicateSingleFlag { name: String, position: usize },

    #[error("failed to parse flag '{name}' at token {position}: {failure}")]
    FlagValueParseFailure {
        name: String,
        position: usize,
        failure: ArgumentFailure,
    },

    #[error("failed to parse argument '{name}' at token {position}: {failure}")]
    ArgumentParseFailure {
        name: String,
        position: usize,
        failure: ArgumentFailure,
    },

    #[error("unknown subcommand '{token}' at token {position}{}", suggestion_suffix(.suggestion))]
    UnknownSubcommand {
        token: String,
        position: usize,
        suggestion: Option<String>,
    },

    #[error("command '{command}' has no executor")]
    MissingExecutor { command: String },

    #[error("not allowed to use '{command}' (requires '{permission}')")]
    PermissionDenied { command: String, permission: String },
}

fn suggestion_suffix(suggestion: &Option<String>) -> String {
    match suggestion {
        Some(name) => format!(", did you mean '{}'?", name),
        None => String::new(),
    }
}

/// Outcome of a failed `handle` call.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// The executor ran and returned an error.
    #[error("command '{command}' failed: {reason:#}")]
    Execution {
        command: String,
        reason: anyhow::Error,
    },

    /// The dispatch task was dropped or panicked before completing.
    #[error("dispatch task aborted before completion")]
    Aborted,
}

impl DispatchError {
    pub fn as_parse_error(&self) -> Option<&ParseError> {
        match self {
            DispatchError::Parse(err) => Some(err),
            _ => None,
        }
    }
}

/// Failed lookup on a [`crate::CommandContext`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContextError {
    #[error("argument '{0}' is not bound")]
    MissingArgument(String),

    #[error("flag '{0}' is not present")]
    FlagNotPresent(String),

    #[error("flag '{0}' was given without a value")]
    FlagHasNoValue(String),

    #[error("'{name}' holds a {found}, not a {expected}")]
    TypeMismatch {
        name: String,
        expected: &'static str,
        found: &'static str,
    },
}
