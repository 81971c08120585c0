//! Flags introduced with `--name` or combined short `-abc` syntax.

use std::fmt;
use std::sync::Arc;

use crate::value::{SharedParser, ValueParser};

/// How often a flag may appear in one invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlagKind {
    Single,
    Repeatable,
}

/// A named, optionally valued input.
///
/// Without a value parser the flag is a presence-only switch.
pub struct Flag<C> {
    name: String,
    aliases: Vec<String>,
    kind: FlagKind,
    value_parser: Option<SharedParser<C>>,
}

impl<C> Flag<C> {
    pub fn new(name: impl Into<String>, kind: FlagKind) -> Self {
        Self {
            name: name.into(),
            aliases: Vec::new(),
            kind,
            value_parser: None,
        }
    }

    pub fn single(name: impl Into<String>) -> Self {
        Self::new(name, FlagKind::Single)
    }

    pub fn repeatable(name: impl Into<String>) -> Self {
        Self::new(name, FlagKind::Repeatable)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    pub fn with_aliases<I, S>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.aliases = aliases.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    /// Declared aliases followed by the name.
    pub fn all_aliases(&self) -> Vec<&str> {
        self.aliases
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(self.name.as_str()))
            .collect()
    }

    /// True when `alias` is a one-character entry of [`Flag::all_aliases`].
    pub fn matches_short(&self, alias: char) -> bool {
        self.all_aliases().into_iter().any(|candidate| {
            let mut chars = candidate.chars();
            chars.next() == Some(alias) && chars.next().is_none()
        })
    }

    pub fn kind(&self) -> FlagKind {
        self.kind
    }

    pub fn with_kind(mut self, kind: FlagKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn value_parser(&self) -> Option<&SharedParser<C>> {
        self.value_parser.as_ref()
    }

    pub fn takes_value(&self) -> bool {
        self.value_parser.is_some()
    }

    pub fn with_value_parser(mut self, parser: impl ValueParser<C> + 'static) -> Self {
        self.value_parser = Some(Arc::new(parser));
        self
    }

    pub fn with_shared_value_parser(mut self, parser: SharedParser<C>) -> Self {
        self.value_parser = Some(parser);
        self
    }

    pub fn without_value_parser(mut self) -> Self {
        self.value_parser = None;
        self
    }
}

impl<C> Clone for Flag<C> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            aliases: self.aliases.clone(),
            kind: self.kind,
            value_parser: self.value_parser.clone(),
        }
    }
}

impl<C> fmt::Debug for Flag<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Flag")
            .field("name", &self.name)
            .field("aliases", &self.aliases)
            .field("kind", &self.kind)
            .field("takes_value", &self.takes_value())
            .finish()
    }
}
