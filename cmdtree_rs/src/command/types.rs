//! Command node definition.

use std::fmt;
use std::sync::Arc;

use super::argument::Argument;
use super::flag::Flag;
use crate::context::CommandContext;

/// Host-supplied function invoked with the completed context.
pub type CommandExecutor<C> =
    Arc<dyn Fn(&CommandContext<C>) -> anyhow::Result<()> + Send + Sync>;

/// A named node in the dispatch tree.
///
/// Commands are values: every `with_*` method consumes the command and returns
/// the modified copy. Subcommands sit behind `Arc`, so cloning a command (or
/// swapping one field) shares the unchanged subtrees instead of copying them.
///
/// ```
/// use cmdtree::{Argument, Command, Flag};
/// use cmdtree::parsers::{IntegerParser, StringParser};
///
/// let kick: Command<String> = Command::new("kick")
///     .with_alias("k")
///     .with_argument(Argument::required("player", StringParser))
///     .with_argument(Argument::optional("minutes", IntegerParser::new()))
///     .with_flag(Flag::single("silent").with_alias("s"))
///     .with_executor(|_ctx| Ok(()));
///
/// assert_eq!(kick.all_aliases(), vec!["k", "kick"]);
/// ```
pub struct Command<C> {
    name: String,
    aliases: Vec<String>,
    description: Option<String>,
    permission: Option<String>,
    arguments: Vec<Argument<C>>,
    flags: Vec<Flag<C>>,
    subcommands: Vec<Arc<Command<C>>>,
    executor: Option<CommandExecutor<C>>,
}

impl<C> Command<C> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            aliases: Vec::new(),
            description: None,
            permission: None,
            arguments: Vec::new(),
            flags: Vec::new(),
            subcommands: Vec::new(),
            executor: None,
        }
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

    pub fn matches_alias(&self, token: &str) -> bool {
        self.name == token || self.aliases.iter().any(|alias| alias == token)
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Permission string handed to the registry's authorizer, if any.
    pub fn permission(&self) -> Option<&str> {
        self.permission.as_deref()
    }

    pub fn with_permission(mut self, permission: impl Into<String>) -> Self {
        self.permission = Some(permission.into());
        self
    }

    pub fn arguments(&self) -> &[Argument<C>] {
        &self.arguments
    }

    pub fn with_arguments(mut self, arguments: Vec<Argument<C>>) -> Self {
        self.arguments = arguments;
        self
    }

    pub fn with_argument(mut self, argument: Argument<C>) -> Self {
        self.arguments.push(argument);
        self
    }

    pub fn flags(&self) -> &[Flag<C>] {
        &self.flags
    }

    pub fn with_flags(mut self, flags: Vec<Flag<C>>) -> Self {
        self.flags = flags;
        self
    }

    pub fn with_flag(mut self, flag: Flag<C>) -> Self {
        self.flags.push(flag);
        self
    }

    pub fn subcommands(&self) -> &[Arc<Command<C>>] {
        &self.subcommands
    }

    pub fn with_subcommands(mut self, subcommands: Vec<Command<C>>) -> Self {
        self.subcommands = subcommands.into_iter().map(Arc::new).collect();
        self
    }

    pub fn with_subcommand(self, subcommand: Command<C>) -> Self {
        self.with_shared_subcommand(Arc::new(subcommand))
    }

    /// Attach a subtree that is already shared with another tree.
    pub fn with_shared_subcommand(mut self, subcommand: Arc<Command<C>>) -> Self {
        self.subcommands.push(subcommand);
        self
    }

    /// Replace every subcommand with already shared subtrees.
    pub fn with_shared_subcommands(mut self, subcommands: Vec<Arc<Command<C>>>) -> Self {
        self.subcommands = subcommands;
        self
    }

    /// First subcommand answering to `token`.
    pub fn find_subcommand(&self, token: &str) -> Option<&Arc<Command<C>>> {
        self.subcommands.iter().find(|sub| sub.matches_alias(token))
    }

    pub fn executor(&self) -> Option<&CommandExecutor<C>> {
        self.executor.as_ref()
    }

    pub fn has_executor(&self) -> bool {
        self.executor.is_some()
    }

    pub fn with_executor<F>(mut self, executor: F) -> Self
    where
        F: Fn(&CommandContext<C>) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.executor = Some(Arc::new(executor));
        self
    }

    pub fn without_executor(mut self) -> Self {
        self.executor = None;
        self
    }
}

impl<C> Clone for Command<C> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            aliases: self.aliases.clone(),
            description: self.description.clone(),
            permission: self.permission.clone(),
            arguments: self.arguments.clone(),
            flags: self.flags.clone(),
            subcommands: self.subcommands.clone(),
            executor: self.executor.clone(),
        }
    }
}

impl<C> fmt::Debug for Command<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("name", &self.name)
            .field("aliases", &self.aliases)
            .field("arguments", &self.arguments)
            .field("flags", &self.flags)
            .field("subcommands", &self.subcommands)
            .field("has_executor", &self.has_executor())
            .finish()
    }
}
