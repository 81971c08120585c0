//! Positional arguments.

use std::fmt;
use std::sync::Arc;

use crate::value::{SharedParser, ValueParser};

/// Whether an argument must be supplied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArgumentKind {
    Required,
    Optional,
}

/// A positional, typed input bound by name.
pub struct Argument<C> {
    name: String,
    parser: SharedParser<C>,
    kind: ArgumentKind,
    default_value: Option<String>,
}

impl<C> Argument<C> {
    /// A REQUIRED argument backed by `parser`.
    pub fn required(name: impl Into<String>, parser: impl ValueParser<C> + 'static) -> Self {
        Self::with_shared_parser(name, Arc::new(parser), ArgumentKind::Required)
    }

    /// An OPTIONAL argument backed by `parser`.
    pub fn optional(name: impl Into<String>, parser: impl ValueParser<C> + 'static) -> Self {
        Self::with_shared_parser(name, Arc::new(parser), ArgumentKind::Optional)
    }

    /// Build from a parser that is already shared with other arguments or flags.
    pub fn with_shared_parser(
        name: impl Into<String>,
        parser: SharedParser<C>,
        kind: ArgumentKind,
    ) -> Self {
        Self {
            name: name.into(),
            parser,
            kind,
            default_value: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn kind(&self) -> ArgumentKind {
        self.kind
    }

    pub fn is_optional(&self) -> bool {
        self.kind == ArgumentKind::Optional
    }

    pub fn with_kind(mut self, kind: ArgumentKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn parser(&self) -> &SharedParser<C> {
        &self.parser
    }

    pub fn with_parser(mut self, parser: impl ValueParser<C> + 'static) -> Self {
        self.parser = Arc::new(parser);
        self
    }

    /// Raw text fed to the parser when an optional argument is not supplied.
    pub fn default_value(&self) -> Option<&str> {
        self.default_value.as_deref()
    }

    pub fn with_default_value(mut self, default_value: impl Into<String>) -> Self {
        self.default_value = Some(default_value.into());
        self
    }

    pub fn without_default_value(mut self) -> Self {
        self.default_value = None;
        self
    }
}

impl<C> Clone for Argument<C> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            parser: Arc::clone(&self.parser),
            kind: self.kind,
            default_value: self.default_value.clone(),
        }
    }
}

impl<C> fmt::Debug for Argument<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Argument")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("default_value", &self.default_value)
            .finish_non_exhaustive()
    }
}
