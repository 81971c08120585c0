//! Command registry: owns the tree, validates registrations, submits dispatch.
//!
//! The root is an implicit unnamed router whose subcommands are the top-level
//! commands. Registration replaces the root with a new tree; dispatch takes a
//! snapshot of the current root when a call is submitted and never locks
//! afterwards.

mod validate;

use std::fmt;
use std::future::Future;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::pin::Pin;
use std::sync::{Arc, PoisonError, RwLock};
use std::task::{Context, Poll};

use futures::channel::oneshot;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::command::Command;
use crate::config::RegistryConfig;
use crate::context::CommandContext;
use crate::dispatch;
use crate::error::{DispatchError, RegistrationError};
use crate::permission::Authorizer;
use crate::scheduler::Scheduler;

/// Behaviour when a new top-level command shares an alias with an existing one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegistrationPolicy {
    /// The new command replaces the existing one.
    Override,
    /// The new command is nested under the existing one.
    #[default]
    Relocate,
    /// The existing command is kept, the new one is dropped.
    Ignore,
}

/// What `register` did with the command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Registration {
    /// Added as a new top-level command.
    Attached,
    /// Replaced the top-level command `replaced`.
    Overridden { replaced: String },
    /// Nested under the command at the space-joined path `under`.
    ///
    /// Usually a top-level command; repeated relocations of one name go
    /// deeper (`"help help"`).
    Relocated { under: String },
    /// Dropped in favour of the existing top-level command `existing`.
    Ignored { existing: String },
}

struct RegistryInner<C> {
    root: RwLock<Arc<Command<C>>>,
    policy: RegistrationPolicy,
    scheduler: Scheduler,
    authorizer: Option<Arc<dyn Authorizer<C>>>,
    suggest_similar: bool,
}

/// Shared handle to a command tree and its execution substrate.
///
/// Cloning is cheap and every clone sees the same tree.
pub struct CommandRegistry<C> {
    inner: Arc<RegistryInner<C>>,
}

/// Builder for [`CommandRegistry`].
pub struct RegistryBuilder<C> {
    scheduler: Scheduler,
    policy: RegistrationPolicy,
    authorizer: Option<Arc<dyn Authorizer<C>>>,
    suggest_similar: bool,
}

impl<C> RegistryBuilder<C> {
    pub fn policy(mut self, policy: RegistrationPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn authorizer(mut self, authorizer: impl Authorizer<C> + 'static) -> Self {
        self.authorizer = Some(Arc::new(authorizer));
        self
    }

    pub fn suggest_similar(mut self, enabled: bool) -> Self {
        self.suggest_similar = enabled;
        self
    }

    /// Apply every setting from a loaded config file.
    pub fn config(self, config: &RegistryConfig) -> Self {
        self.policy(config.policy).suggest_similar(config.suggest_similar)
    }

    pub fn build(self) -> CommandRegistry<C> {
        CommandRegistry {
            inner: Arc::new(RegistryInner {
                root: RwLock::new(Arc::new(Command::new(""))),
                policy: self.policy,
                scheduler: self.scheduler,
                authorizer: self.authorizer,
                suggest_similar: self.suggest_similar,
            }),
        }
    }
}

impl<C> CommandRegistry<C> {
    pub fn builder(scheduler: Scheduler) -> RegistryBuilder<C> {
        let defaults = RegistryConfig::default();
        RegistryBuilder {
            scheduler,
            policy: defaults.policy,
            authorizer: None,
            suggest_similar: defaults.suggest_similar,
        }
    }

    /// Registry with default settings.
    pub fn new(scheduler: Scheduler) -> Self {
        Self::builder(scheduler).build()
    }

    /// Registry with settings from `config`.
    pub fn from_config(config: &RegistryConfig, scheduler: Scheduler) -> Self {
        Self::builder(scheduler).config(config).build()
    }

    /// Registry running everything on the calling thread.
    pub fn inline() -> Self {
        Self::new(Scheduler::inline())
    }

    pub fn policy(&self) -> RegistrationPolicy {
        self.inner.policy
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.inner.scheduler
    }

    pub(crate) fn authorizer(&self) -> Option<&Arc<dyn Authorizer<C>>> {
        self.inner.authorizer.as_ref()
    }

    pub(crate) fn suggests_similar(&self) -> bool {
        self.inner.suggest_similar
    }

    /// Snapshot of the current root router.
    pub fn root(&self) -> Arc<Command<C>> {
        let guard = self.inner.root.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }

    /// Snapshot of the registered top-level commands.
    pub fn commands(&self) -> Vec<Arc<Command<C>>> {
        self.root().subcommands().to_vec()
    }

    /// Validate `command` and attach it to the tree.
    ///
    /// Nothing is attached when validation fails. Registration is meant to
    /// happen before the registry starts handling input.
    pub fn register(&self, command: Command<C>) -> Result<Registration, RegistrationError> {
        validate::verify(&command)?;

        let mut root = self.inner.root.write().unwrap_or_else(PoisonError::into_inner);
        let existing: Vec<usize> = root
            .subcommands()
            .iter()
            .enumerate()
            .filter(|(_, sub)| collides(sub, &command))
            .map(|(index, _)| index)
            .collect();

        let Some(&first) = existing.first() else {
            debug!(command = command.name(), "attached command");
            let updated = (**root).clone().with_subcommand(command);
            *root = Arc::new(updated);
            return Ok(Registration::Attached);
        };
        let host_index = pick_host(root.subcommands(), &command).unwrap_or(first);
        let host = Arc::clone(&root.subcommands()[host_index]);

        let outcome = match self.inner.policy {
            RegistrationPolicy::Override => {
                let mut subcommands = Vec::with_capacity(root.subcommands().len());
                for (index, sub) in root.subcommands().iter().enumerate() {
                    if index == first {
                        subcommands.push(Arc::new(command.clone()));
                    } else if !existing.contains(&index) {
                        subcommands.push(Arc::clone(sub));
                    }
                }
                let updated = (**root).clone().with_shared_subcommands(subcommands);
                *root = Arc::new(updated);
                Registration::Overridden {
                    replaced: host.name().to_string(),
                }
            }
            RegistrationPolicy::Relocate => {
                let mut under = Vec::new();
                let merged = relocate_into(&host, command.clone(), &mut under);
                validate::verify(&merged)?;
                let merged = Arc::new(merged);
                let subcommands = root
                    .subcommands()
                    .iter()
                    .enumerate()
                    .map(|(index, sub)| {
                        if index == host_index {
                            Arc::clone(&merged)
                        } else {
                            Arc::clone(sub)
                        }
                    })
                    .collect();
                let updated = (**root).clone().with_shared_subcommands(subcommands);
                *root = Arc::new(updated);
                Registration::Relocated {
                    under: under.join(" "),
                }
            }
            RegistrationPolicy::Ignore => Registration::Ignored {
                existing: host.name().to_string(),
            },
        };

        debug!(
            command = command.name(),
            policy = ?self.inner.policy,
            outcome = ?outcome,
            "top-level name collision resolved"
        );
        Ok(outcome)
    }
}

impl<C: Send + 'static> CommandRegistry<C> {
    /// Dispatch `input` on behalf of `caller`.
    ///
    /// Returns immediately. Tokenizing, parsing, binding and the executor call
    /// run as one task on the scheduler's async executor. The handle resolves
    /// exactly once, to the completed context or to the error that stopped it.
    pub fn handle(&self, caller: C, input: impl Into<String>) -> DispatchHandle<C> {
        let input = input.into();
        let root = self.root();
        let registry = self.clone();
        let (tx, rx) = oneshot::channel();

        self.inner.scheduler.async_executor().execute(Box::new(move || {
            let outcome = catch_unwind(AssertUnwindSafe(move || {
                dispatch::run(registry, &root, caller, input)
            }));
            match outcome {
                Ok(result) => {
                    let _ = tx.send(result);
                }
                // Dropping `tx` resolves the handle to `Aborted`.
                Err(_) => warn!("dispatch task panicked"),
            }
        }));

        DispatchHandle { rx }
    }
}

impl<C> Clone for CommandRegistry<C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<C> fmt::Debug for CommandRegistry<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandRegistry")
            .field("policy", &self.inner.policy)
            .field("commands", &self.root().subcommands().len())
            .field("has_authorizer", &self.inner.authorizer.is_some())
            .finish_non_exhaustive()
    }
}

fn collides<C>(existing: &Command<C>, incoming: &Command<C>) -> bool {
    incoming
        .all_aliases()
        .into_iter()
        .any(|alias| existing.matches_alias(alias))
}

/// The command `incoming` collides with: the one answering to its name,
/// else the first one sharing any alias.
fn pick_host<C>(candidates: &[Arc<Command<C>>], incoming: &Command<C>) -> Option<usize> {
    candidates
        .iter()
        .position(|sub| sub.matches_alias(incoming.name()))
        .or_else(|| candidates.iter().position(|sub| collides(sub, incoming)))
}

/// Nest `command` under `host`. When a child of `host` already collides with
/// it, the command goes one level further down, under that child.
///
/// `under` receives the path of the command it ends up attached to.
fn relocate_into<C>(host: &Command<C>, command: Command<C>, under: &mut Vec<String>) -> Command<C> {
    under.push(host.name().to_string());
    let children = host.subcommands();
    let Some(index) = pick_host(children, &command) else {
        return host.clone().with_subcommand(command);
    };

    let nested = Arc::new(relocate_into(&children[index], command, under));
    let subcommands = children
        .iter()
        .enumerate()
        .map(|(i, child)| {
            if i == index {
                Arc::clone(&nested)
            } else {
                Arc::clone(child)
            }
        })
        .collect();
    host.clone().with_shared_subcommands(subcommands)
}

/// Future returned by [`CommandRegistry::handle`].
#[must_use = "the dispatch result is only observable through the handle"]
pub struct DispatchHandle<C> {
    rx: oneshot::Receiver<Result<CommandContext<C>, DispatchError>>,
}

impl<C> Future for DispatchHandle<C> {
    type Output = Result<CommandContext<C>, DispatchError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx).poll(cx).map(|received| match received {
            Ok(result) => result,
            Err(oneshot::Canceled) => Err(DispatchError::Aborted),
        })
    }
}

impl<C> fmt::Debug for DispatchHandle<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DispatchHandle").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{Argument, Flag};
    use crate::parsers::{IntegerParser, StringParser};
    use futures::executor::block_on;

    fn leaf(name: &str) -> Command<()> {
        Command::new(name).with_executor(|_| Ok(()))
    }

    fn registry(policy: RegistrationPolicy) -> CommandRegistry<()> {
        CommandRegistry::builder(Scheduler::inline())
            .policy(policy)
            .build()
    }

    #[test]
    fn test_default_policy_is_relocate() {
        assert_eq!(CommandRegistry::<()>::inline().policy(), RegistrationPolicy::Relocate);
    }

    #[test]
    fn test_register_attaches_top_level() {
        let registry = registry(RegistrationPolicy::Relocate);
        assert_eq!(registry.register(leaf("help")), Ok(Registration::Attached));
        assert_eq!(registry.register(leaf("kick")), Ok(Registration::Attached));

        let names: Vec<String> = registry
            .commands()
            .iter()
            .map(|c| c.name().to_string())
            .collect();
        assert_eq!(names, vec!["help", "kick"]);
    }

    #[test]
    fn test_invalid_command_is_not_attached() {
        let registry = registry(RegistrationPolicy::Relocate);
        let err = registry.register(Command::new("broken")).unwrap_err();
        assert_eq!(
            err,
            RegistrationError::MissingExecutor {
                command: "broken".into()
            }
        );
        assert!(registry.commands().is_empty());
    }

    #[test]
    fn test_required_after_optional_fails_registration() {
        let registry = registry(RegistrationPolicy::Relocate);
        let give = leaf("give")
            .with_argument(Argument::optional("amount", IntegerParser::new()))
            .with_argument(Argument::required("item", StringParser));

        assert_eq!(
            registry.register(give),
            Err(RegistrationError::RequiredAfterOptional {
                command: "give".into(),
                argument: "item".into(),
            })
        );
        assert!(registry.commands().is_empty());
    }

    #[test]
    fn test_override_replaces_existing() {
        let registry = registry(RegistrationPolicy::Override);
        registry.register(leaf("help").with_alias("h")).unwrap();
        registry.register(leaf("kick")).unwrap();

        let outcome = registry.register(leaf("h").with_description("new help"));
        assert_eq!(
            outcome,
            Ok(Registration::Overridden {
                replaced: "help".into()
            })
        );

        let commands = registry.commands();
        assert_eq!(commands.len(), 2);
        assert_eq!(commands[0].name(), "h");
        assert_eq!(commands[0].description(), Some("new help"));
        assert_eq!(commands[1].name(), "kick");
    }

    #[test]
    fn test_relocate_nests_under_existing() {
        let registry = registry(RegistrationPolicy::Relocate);
        registry.register(leaf("help")).unwrap();

        let outcome = registry.register(leaf("help").with_description("plugin help"));
        assert_eq!(
            outcome,
            Ok(Registration::Relocated {
                under: "help".into()
            })
        );

        let commands = registry.commands();
        assert_eq!(commands.len(), 1);
        let nested = commands[0].find_subcommand("help").expect("relocated command");
        assert_eq!(nested.description(), Some("plugin help"));
    }

    #[test]
    fn test_relocate_prefers_host_with_same_name() {
        let registry = registry(RegistrationPolicy::Relocate);
        registry.register(leaf("a").with_alias("x")).unwrap();
        registry.register(leaf("b")).unwrap();

        let outcome = registry.register(leaf("b").with_alias("x"));
        assert_eq!(
            outcome,
            Ok(Registration::Relocated {
                under: "b".into()
            })
        );

        let commands = registry.commands();
        assert_eq!(commands.len(), 2);
        assert!(commands[0].subcommands().is_empty());
        assert!(commands[1].find_subcommand("x").is_some());
    }

    #[test]
    fn test_relocate_same_name_repeatedly_nests_deeper() {
        let registry = registry(RegistrationPolicy::Relocate);
        registry.register(leaf("help")).unwrap();
        registry.register(leaf("help").with_description("second")).unwrap();

        let outcome = registry.register(leaf("help").with_description("third"));
        assert_eq!(
            outcome,
            Ok(Registration::Relocated {
                under: "help help".into()
            })
        );

        let commands = registry.commands();
        let top = &commands[0];
        let second = top.find_subcommand("help").expect("second help");
        assert_eq!(second.description(), Some("second"));
        let third = second.find_subcommand("help").expect("third help");
        assert_eq!(third.description(), Some("third"));

        let ctx = block_on(registry.handle((), "help help help")).expect("dispatch");
        assert_eq!(ctx.command_path(), ["help", "help", "help"]);
    }

    #[test]
    fn test_relocate_revalidates_merged_tree() {
        let registry = registry(RegistrationPolicy::Relocate);
        registry
            .register(leaf("map").with_flag(Flag::single("force").with_alias("f")))
            .unwrap();

        let clash = leaf("map").with_flag(Flag::single("fast").with_alias("f"));
        assert!(matches!(
            registry.register(clash),
            Err(RegistrationError::FlagAliasCollision { .. })
        ));
        assert!(registry.commands()[0].subcommands().is_empty());
    }

    #[test]
    fn test_ignore_keeps_existing() {
        let registry = registry(RegistrationPolicy::Ignore);
        registry.register(leaf("help")).unwrap();
        let outcome = registry.register(leaf("help").with_description("ignored"));
        assert_eq!(
            outcome,
            Ok(Registration::Ignored {
                existing: "help".into()
            })
        );
        assert_eq!(registry.commands()[0].description(), None);
    }

    #[test]
    fn test_from_config() {
        let config = RegistryConfig {
            policy: RegistrationPolicy::Ignore,
            suggest_similar: false,
        };
        let registry = CommandRegistry::<()>::from_config(&config, Scheduler::inline());
        assert_eq!(registry.policy(), RegistrationPolicy::Ignore);
        assert!(!registry.suggests_similar());
    }

    #[test]
    fn test_handle_snapshots_root() {
        let registry = registry(RegistrationPolicy::Relocate);
        registry
            .register(leaf("say").with_argument(Argument::required("message", StringParser)))
            .unwrap();

        let ctx = block_on(registry.handle((), "say hi")).expect("dispatch");
        assert_eq!(ctx.argument::<String>("message").map(String::as_str), Ok("hi"));
        assert_eq!(ctx.command_path(), ["say"]);
    }

    #[test]
    fn test_panicking_executor_aborts() {
        let registry = registry(RegistrationPolicy::Relocate);
        registry
            .register(Command::new("boom").with_executor(|_| panic!("executor exploded")))
            .unwrap();

        let result = block_on(registry.handle((), "boom"));
        assert!(matches!(result, Err(DispatchError::Aborted)));
    }
}
