//! Standard value parsers.
//!
//! Small building blocks for common argument types. Hosts with their own
//! domain types (players, maps, items, ...) implement [`ValueParser`] directly.

use crate::context::CommandContext;
use crate::tokens::TokenQueue;
use crate::value::{ArgumentFailure, BoundValue, ValueParser};

/// One token, bound as `String`.
#[derive(Debug, Clone, Copy, Default)]
pub struct StringParser;

impl<C> ValueParser<C> for StringParser {
    fn parse(
        &self,
        _context: &CommandContext<C>,
        input: &mut TokenQueue,
    ) -> Result<BoundValue, ArgumentFailure> {
        let token = input.pop().ok_or(ArgumentFailure::NoInput)?;
        Ok(BoundValue::new(token))
    }
}

/// Every remaining token joined with single spaces, bound as `String`.
///
/// Suited to a trailing "message" argument.
#[derive(Debug, Clone, Copy, Default)]
pub struct GreedyStringParser;

impl<C> ValueParser<C> for GreedyStringParser {
    fn parse(
        &self,
        _context: &CommandContext<C>,
        input: &mut TokenQueue,
    ) -> Result<BoundValue, ArgumentFailure> {
        if input.is_empty() {
            return Err(ArgumentFailure::NoInput);
        }
        Ok(BoundValue::new(input.drain_remaining().join(" ")))
    }
}

/// One token parsed as `i64`, optionally bounded (inclusive).
#[derive(Debug, Clone, Copy)]
pub struct IntegerParser {
    min: i64,
    max: i64,
}

impl IntegerParser {
    pub fn new() -> Self {
        Self {
            min: i64::MIN,
            max: i64::MAX,
        }
    }

    pub fn with_min(mut self, min: i64) -> Self {
        self.min = min;
        self
    }

    pub fn with_max(mut self, max: i64) -> Self {
        self.max = max;
        self
    }
}

impl Default for IntegerParser {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> ValueParser<C> for IntegerParser {
    fn parse(
        &self,
        _context: &CommandContext<C>,
        input: &mut TokenQueue,
    ) -> Result<BoundValue, ArgumentFailure> {
        let token = input.pop().ok_or(ArgumentFailure::NoInput)?;
        let value: i64 = token
            .parse()
            .map_err(|_| ArgumentFailure::invalid(&token, "not an integer"))?;
        if value < self.min {
            return Err(ArgumentFailure::invalid(
                &token,
                format!("must be at least {}", self.min),
            ));
        }
        if value > self.max {
            return Err(ArgumentFailure::invalid(
                &token,
                format!("must be at most {}", self.max),
            ));
        }
        Ok(BoundValue::new(value))
    }
}

/// One token parsed as `bool`, accepting the usual yes/no spellings.
#[derive(Debug, Clone, Copy, Default)]
pub struct BooleanParser;

impl<C> ValueParser<C> for BooleanParser {
    fn parse(
        &self,
        _context: &CommandContext<C>,
        input: &mut TokenQueue,
    ) -> Result<BoundValue, ArgumentFailure> {
        let token = input.pop().ok_or(ArgumentFailure::NoInput)?;
        match token.to_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Ok(BoundValue::new(true)),
            "false" | "no" | "off" | "0" => Ok(BoundValue::new(false)),
            _ => Err(ArgumentFailure::invalid(&token, "expected true or false")),
        }
    }
}
