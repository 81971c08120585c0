//! Flag resolution at the head of the token queue.
//!
//! `--name` matches a visible flag by exact name. `-abc` resolves each
//! character against the one-character aliases of the visible flags. Visible
//! flags are those of the current command and all of its ancestors.

use crate::command::{Flag, FlagKind};
use crate::context::CommandContext;
use crate::error::ParseError;
use crate::tokens::TokenQueue;

/// Consume every flag token at the head of the queue, with their values.
///
/// Stops at the first token that does not start with `-`.
pub(super) fn resolve<C>(
    context: &mut CommandContext<C>,
    visible: &[&Flag<C>],
    tokens: &mut TokenQueue,
) -> Result<(), ParseError> {
    while tokens.peek().is_some_and(|head| head.starts_with('-')) {
        let position = tokens.position();
        let Some(token) = tokens.pop() else { break };
        let matched = match_flags(visible, &token, position)?;

        for flag in matched {
            bind_flag(context, flag, tokens, position)?;
        }
    }
    Ok(())
}

fn match_flags<'f, C>(
    visible: &[&'f Flag<C>],
    token: &str,
    position: usize,
) -> Result<Vec<&'f Flag<C>>, ParseError> {
    if let Some(name) = token.strip_prefix("--") {
        if name.is_empty() {
            return Err(ParseError::EmptyFlagName { position });
        }
        let flag = visible
            .iter()
            .copied()
            .find(|flag| flag.name() == name)
            .ok_or_else(|| ParseError::UnknownFlag {
                name: name.to_string(),
                position,
            })?;
        return Ok(vec![flag]);
    }

    let shorts = token.strip_prefix('-').unwrap_or(token);
    if shorts.is_empty() {
        return Err(ParseError::EmptyFlagName { position });
    }
    shorts
        .chars()
        .map(|alias| {
            visible
                .iter()
                .copied()
                .find(|flag| flag.matches_short(alias))
                .ok_or_else(|| ParseError::UnknownFlag {
                    name: alias.to_string(),
                    position,
                })
        })
        .collect()
}

fn bind_flag<C>(
    context: &mut CommandContext<C>,
    flag: &Flag<C>,
    tokens: &mut TokenQueue,
    position: usize,
) -> Result<(), ParseError> {
    if flag.kind() == FlagKind::Single && context.has_flag(flag.name()) {
        return Err(ParseError::DuplicateSingleFlag {
            name: flag.name().to_string(),
            position,
        });
    }

    let Some(parser) = flag.value_parser() else {
        context.add_flag_value(flag.name(), None);
        return Ok(());
    };

    let mark = tokens.checkpoint();
    match parser.parse(context, tokens) {
        Ok(value) => {
            context.add_flag_value(flag.name(), Some(value));
            Ok(())
        }
        Err(failure) => {
            tokens.restore(mark);
            Err(ParseError::FlagValueParseFailure {
                name: flag.name().to_string(),
                position: tokens.position(),
                failure,
            })
        }
    }
}
