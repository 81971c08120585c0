//! Structural checks run once when a subtree is registered.
//!
//! Flags inherit down the subcommand path, so flag aliases are accumulated
//! along each branch: a subcommand's flags must not reuse an alias of any
//! flag declared on its ancestors.

use std::collections::HashSet;

use crate::command::{ArgumentKind, Command};
use crate::error::RegistrationError;

/// Validate a top-level subtree.
pub(crate) fn verify<C>(command: &Command<C>) -> Result<(), RegistrationError> {
    let mut path = Vec::new();
    verify_node(command, &HashSet::new(), &mut path)
}

fn verify_node<'a, C>(
    command: &'a Command<C>,
    inherited: &HashSet<&'a str>,
    path: &mut Vec<&'a str>,
) -> Result<(), RegistrationError> {
    path.push(command.name());
    let label = path.join(" ");

    let mut seen_optional = false;
    let mut argument_names = HashSet::new();
    for argument in command.arguments() {
        if !argument_names.insert(argument.name()) {
            return Err(RegistrationError::DuplicateArgument {
                command: label.clone(),
                argument: argument.name().to_string(),
            });
        }
        match argument.kind() {
            ArgumentKind::Optional => seen_optional = true,
            ArgumentKind::Required if seen_optional => {
                return Err(RegistrationError::RequiredAfterOptional {
                    command: label.clone(),
                    argument: argument.name().to_string(),
                });
            }
            ArgumentKind::Required => {}
        }
    }

    if !command.has_executor() && command.subcommands().is_empty() {
        return Err(RegistrationError::MissingExecutor { command: label });
    }

    let mut visible = inherited.clone();
    for flag in command.flags() {
        for alias in flag.all_aliases() {
            if !visible.insert(alias) {
                return Err(RegistrationError::FlagAliasCollision {
                    command: label.clone(),
                    flag: flag.name().to_string(),
                    alias: alias.to_string(),
                });
            }
        }
    }

    let mut sibling_aliases = HashSet::new();
    for subcommand in command.subcommands() {
        for alias in subcommand.all_aliases() {
            if !sibling_aliases.insert(alias) {
                return Err(RegistrationError::SubcommandAliasCollision {
                    command: label.clone(),
                    subcommand: subcommand.name().to_string(),
                    alias: alias.to_string(),
                });
            }
        }
        verify_node(subcommand, &visible, path)?;
    }

    path.pop();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{Argument, Flag};
    use crate::parsers::{IntegerParser, StringParser};

    fn leaf(name: &str) -> Command<()> {
        Command::new(name).with_executor(|_| Ok(()))
    }

    #[test]
    fn test_required_after_optional_is_rejected() {
        let cmd = leaf("give")
            .with_argument(Argument::optional("amount", IntegerParser::new()))
            .with_argument(Argument::required("item", StringParser));

        assert_eq!(
            verify(&cmd),
            Err(RegistrationError::RequiredAfterOptional {
                command: "give".into(),
                argument: "item".into(),
            })
        );
    }

    #[test]
    fn test_optional_after_required_is_fine() {
        let cmd = leaf("give")
            .with_argument(Argument::required("item", StringParser))
            .with_argument(Argument::optional("amount", IntegerParser::new()))
            .with_argument(Argument::optional("target", StringParser));
        assert_eq!(verify(&cmd), Ok(()));
    }

    #[test]
    fn test_duplicate_argument_name() {
        let cmd = leaf("tp")
            .with_argument(Argument::required("x", IntegerParser::new()))
            .with_argument(Argument::required("x", IntegerParser::new()));
        assert!(matches!(
            verify(&cmd),
            Err(RegistrationError::DuplicateArgument { .. })
        ));
    }

    #[test]
    fn test_missing_executor_on_leaf() {
        let cmd: Command<()> = Command::new("admin").with_subcommand(Command::new("reload"));
        assert_eq!(
            verify(&cmd),
            Err(RegistrationError::MissingExecutor {
                command: "admin reload".into(),
            })
        );
    }

    #[test]
    fn test_router_without_executor_is_fine() {
        let cmd: Command<()> = Command::new("admin").with_subcommand(leaf("reload"));
        assert_eq!(verify(&cmd), Ok(()));
    }

    #[test]
    fn test_sibling_alias_collision() {
        let cmd: Command<()> = Command::new("perm")
            .with_subcommand(leaf("group").with_alias("g"))
            .with_subcommand(leaf("grant").with_alias("g"));
        assert_eq!(
            verify(&cmd),
            Err(RegistrationError::SubcommandAliasCollision {
                command: "perm".into(),
                subcommand: "grant".into(),
                alias: "g".into(),
            })
        );
    }

    #[test]
    fn test_flag_collision_with_inherited_flag() {
        let cmd: Command<()> = Command::new("map")
            .with_flag(Flag::single("verbose").with_alias("v"))
            .with_subcommand(leaf("load").with_flag(Flag::single("version").with_alias("v")));
        assert_eq!(
            verify(&cmd),
            Err(RegistrationError::FlagAliasCollision {
                command: "map load".into(),
                flag: "version".into(),
                alias: "v".into(),
            })
        );
    }

    #[test]
    fn test_flag_collision_within_one_command() {
        let cmd = leaf("ban")
            .with_flag(Flag::single("silent").with_alias("s"))
            .with_flag(Flag::single("s"));
        assert!(matches!(
            verify(&cmd),
            Err(RegistrationError::FlagAliasCollision { .. })
        ));
    }

    #[test]
    fn test_same_flag_alias_on_separate_branches() {
        let cmd: Command<()> = Command::new("map")
            .with_subcommand(leaf("load").with_flag(Flag::single("force").with_alias("f")))
            .with_subcommand(leaf("save").with_flag(Flag::single("force").with_alias("f")));
        assert_eq!(verify(&cmd), Ok(()));
    }

    #[test]
    fn test_leaf_flags_are_checked() {
        let cmd: Command<()> = Command::new("map").with_subcommand(
            leaf("load")
                .with_flag(Flag::single("a"))
                .with_flag(Flag::single("b").with_alias("a")),
        );
        assert!(matches!(
            verify(&cmd),
            Err(RegistrationError::FlagAliasCollision { ref command, .. }) if command == "map load"
        ));
    }
}
