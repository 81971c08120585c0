//! Dispatch engine: walks the command tree along the token queue.
//!
//! Starting at the root router, each level binds its arguments (resolving flag
//! tokens in between), then either descends into the subcommand named by the
//! next token or, when input is exhausted, runs the executor of the command it
//! stopped at. There is no backtracking: a token that fails at one level is
//! never retried against a sibling.

mod flags;
mod helpers;

use std::sync::Arc;

use tracing::{debug, trace};

use crate::command::{Argument, Command, Flag};
use crate::context::CommandContext;
use crate::error::{DispatchError, ParseError};
use crate::registry::CommandRegistry;
use crate::tokens::{TokenQueue, tokenize};
use crate::value::ArgumentFailure;

/// Parse, bind and execute `input` against the tree rooted at `root`.
pub(crate) fn run<C>(
    registry: CommandRegistry<C>,
    root: &Arc<Command<C>>,
    caller: C,
    input: String,
) -> Result<CommandContext<C>, DispatchError> {
    let mut tokens = tokenize(&input);
    let mut context = CommandContext::new(registry, caller, input);
    debug!(input = context.input(), "dispatch started");

    let mut current: &Command<C> = root;
    let mut visible: Vec<&Flag<C>> = current.flags().iter().collect();

    loop {
        bind_arguments(&mut context, current, &visible, &mut tokens)?;

        let Some(token) = tokens.peek() else { break };
        let position = tokens.position();
        let Some(next) = current.find_subcommand(token).map(|sub| &**sub) else {
            return Err(unknown_subcommand(&context, current, token, position).into());
        };

        authorize(&context, next)?;
        tokens.pop();
        trace!(command = next.name(), position, "entered subcommand");
        context.push_command(next.name());
        visible.extend(next.flags());
        current = next;
    }

    let label = context.command_path().join(" ");
    let Some(executor) = current.executor() else {
        return Err(ParseError::MissingExecutor { command: label }.into());
    };

    executor(&context).map_err(|reason| DispatchError::Execution {
        command: label.clone(),
        reason,
    })?;
    debug!(command = %label, "dispatch finished");
    Ok(context)
}

/// Bind every argument of `command` in declaration order.
///
/// Flags are resolved before each argument and once more after the last one.
fn bind_arguments<C>(
    context: &mut CommandContext<C>,
    command: &Command<C>,
    visible: &[&Flag<C>],
    tokens: &mut TokenQueue,
) -> Result<(), ParseError> {
    let arguments = command.arguments();

    for (index, argument) in arguments.iter().enumerate() {
        flags::resolve(context, visible, tokens)?;

        let mark = tokens.checkpoint();
        match argument.parser().parse(context, tokens) {
            Ok(value) => {
                trace!(argument = argument.name(), "bound argument");
                context.set_argument(argument.name(), value);
            }
            Err(ArgumentFailure::NoInput) if argument.is_optional() => {
                tokens.restore(mark);
                for skipped in &arguments[index..] {
                    apply_default(context, skipped)?;
                }
                return Ok(());
            }
            Err(failure) => {
                tokens.restore(mark);
                return Err(ParseError::ArgumentParseFailure {
                    name: argument.name().to_string(),
                    position: tokens.position(),
                    failure,
                });
            }
        }
    }

    flags::resolve(context, visible, tokens)
}

/// Bind the parsed default of an optional argument that received no input.
fn apply_default<C>(
    context: &mut CommandContext<C>,
    argument: &Argument<C>,
) -> Result<(), ParseError> {
    let Some(default) = argument.default_value() else {
        return Ok(());
    };

    let mut tokens = tokenize(default);
    let value = argument
        .parser()
        .parse(context, &mut tokens)
        .map_err(|failure| ParseError::ArgumentParseFailure {
            name: argument.name().to_string(),
            position: tokens.position(),
            failure,
        })?;
    trace!(argument = argument.name(), default, "bound default value");
    context.set_argument(argument.name(), value);
    Ok(())
}

fn authorize<C>(context: &CommandContext<C>, command: &Command<C>) -> Result<(), ParseError> {
    let (Some(permission), Some(authorizer)) =
        (command.permission(), context.registry().authorizer())
    else {
        return Ok(());
    };

    if authorizer.is_authorized(context.caller(), permission) {
        return Ok(());
    }

    let mut path = context.command_path().to_vec();
    path.push(command.name().to_string());
    Err(ParseError::PermissionDenied {
        command: path.join(" "),
        permission: permission.to_string(),
    })
}

fn unknown_subcommand<C>(
    context: &CommandContext<C>,
    current: &Command<C>,
    token: &str,
    position: usize,
) -> ParseError {
    let suggestion = if context.registry().suggests_similar() {
        helpers::suggest_similar(
            token,
            current
                .subcommands()
                .iter()
                .flat_map(|sub| sub.all_aliases()),
        )
        .map(str::to_string)
    } else {
        None
    };

    ParseError::UnknownSubcommand {
        token: token.to_string(),
        position,
        suggestion,
    }
}
