//! Per-invocation record of bound values.
//!
//! A [`CommandContext`] is created once per `handle` call. The dispatch engine
//! fills it through crate-private setters; executors only get `&self` access.

use std::any::{Any, type_name};
use std::collections::HashMap;
use std::fmt;

use crate::error::ContextError;
use crate::registry::CommandRegistry;
use crate::scheduler::Scheduler;
use crate::value::BoundValue;

pub struct CommandContext<C> {
    registry: CommandRegistry<C>,
    caller: C,
    input: String,
    command_path: Vec<String>,
    arguments: HashMap<String, BoundValue>,
    // `None` entries record presence-only occurrences.
    flags: HashMap<String, Vec<Option<BoundValue>>>,
}

impl<C> CommandContext<C> {
    pub(crate) fn new(registry: CommandRegistry<C>, caller: C, input: String) -> Self {
        Self {
            registry,
            caller,
            input,
            command_path: Vec::new(),
            arguments: HashMap::new(),
            flags: HashMap::new(),
        }
    }

    pub fn caller(&self) -> &C {
        &self.caller
    }

    /// Raw input exactly as it was handed to `handle`.
    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn registry(&self) -> &CommandRegistry<C> {
        &self.registry
    }

    /// Scheduler of the owning registry, for sync/async continuations.
    pub fn scheduler(&self) -> &Scheduler {
        self.registry.scheduler()
    }

    /// Names of the commands matched so far, top-level first.
    pub fn command_path(&self) -> &[String] {
        &self.command_path
    }

    // ------------------------------------------------------------------
    // Arguments
    // ------------------------------------------------------------------

    pub fn has_argument(&self, name: &str) -> bool {
        self.arguments.contains_key(name)
    }

    /// Typed lookup of a bound argument.
    pub fn argument<T: Any>(&self, name: &str) -> Result<&T, ContextError> {
        let value = self
            .arguments
            .get(name)
            .ok_or_else(|| ContextError::MissingArgument(name.to_string()))?;
        downcast(name, value)
    }

    /// Typed lookup falling back to `default` when the argument is unbound.
    pub fn argument_or<T: Any + Clone>(&self, name: &str, default: T) -> Result<T, ContextError> {
        match self.arguments.get(name) {
            Some(value) => downcast(name, value).cloned(),
            None => Ok(default),
        }
    }

    pub fn argument_names(&self) -> impl Iterator<Item = &str> {
        self.arguments.keys().map(String::as_str)
    }

    // ------------------------------------------------------------------
    // Flags
    // ------------------------------------------------------------------

    pub fn has_flag(&self, name: &str) -> bool {
        self.flags.contains_key(name)
    }

    /// How many times the flag was given (e.g. `-vvv` counts 3).
    pub fn flag_count(&self, name: &str) -> usize {
        self.flags.get(name).map_or(0, Vec::len)
    }

    /// First value of a valued flag.
    pub fn flag_value<T: Any>(&self, name: &str) -> Result<&T, ContextError> {
        let first = self
            .flags
            .get(name)
            .and_then(|values| values.first())
            .ok_or_else(|| ContextError::FlagNotPresent(name.to_string()))?;
        match first {
            Some(value) => downcast(name, value),
            None => Err(ContextError::FlagHasNoValue(name.to_string())),
        }
    }

    /// First value of a valued flag, or `default` when the flag is absent.
    pub fn flag_value_or<T: Any + Clone>(&self, name: &str, default: T) -> Result<T, ContextError> {
        match self.flag_value::<T>(name) {
            Ok(value) => Ok(value.clone()),
            Err(ContextError::FlagNotPresent(_)) => Ok(default),
            Err(err) => Err(err),
        }
    }

    /// Every value given for the flag, in input order.
    pub fn flag_values<T: Any>(&self, name: &str) -> Result<Vec<&T>, ContextError> {
        let values = self
            .flags
            .get(name)
            .ok_or_else(|| ContextError::FlagNotPresent(name.to_string()))?;
        values
            .iter()
            .map(|value| match value {
                Some(value) => downcast(name, value),
                None => Err(ContextError::FlagHasNoValue(name.to_string())),
            })
            .collect()
    }

    pub fn flag_names(&self) -> impl Iterator<Item = &str> {
        self.flags.keys().map(String::as_str)
    }

    // ------------------------------------------------------------------
    // Engine-side setters
    // ------------------------------------------------------------------

    pub(crate) fn set_argument(&mut self, name: &str, value: BoundValue) {
        self.arguments.insert(name.to_string(), value);
    }

    pub(crate) fn add_flag_value(&mut self, name: &str, value: Option<BoundValue>) {
        self.flags.entry(name.to_string()).or_default().push(value);
    }

    pub(crate) fn push_command(&mut self, name: &str) {
        self.command_path.push(name.to_string());
    }
}

fn downcast<'a, T: Any>(name: &str, value: &'a BoundValue) -> Result<&'a T, ContextError> {
    value
        .downcast_ref::<T>()
        .ok_or_else(|| ContextError::TypeMismatch {
            name: name.to_string(),
            expected: type_name::<T>(),
            found: value.type_name(),
        })
}

impl<C: fmt::Debug> fmt::Debug for CommandContext<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandContext")
            .field("caller", &self.caller)
            .field("input", &self.input)
            .field("command_path", &self.command_path)
            .field("arguments", &self.arguments)
            .field("flags", &self.flags)
            .finish_non_exhaustive()
    }
}
