//! The console's built-in command tree.

use anyhow::{Result, bail};
use tracing::info;

use cmdtree::parsers::{GreedyStringParser, IntegerParser, StringParser};
use cmdtree::{Argument, Command, CommandContext, CommandRegistry, Flag};

/// Whoever typed the line.
#[derive(Debug, Clone)]
pub struct Caller {
    pub name: String,
    pub permissions: Vec<String>,
}

impl Caller {
    /// `*` grants everything; `admin.*` grants every `admin.` permission.
    pub fn may(&self, permission: &str) -> bool {
        self.permissions.iter().any(|granted| {
            granted == permission
                || granted == "*"
                || granted
                    .strip_suffix('*')
                    .is_some_and(|prefix| permission.starts_with(prefix))
        })
    }
}

pub fn register_all(registry: &CommandRegistry<Caller>) -> Result<()> {
    for command in [echo(), add(), greet(), whoami(), admin(), help()] {
        let name = command.name().to_string();
        let outcome = registry.register(command)?;
        info!(command = %name, ?outcome, "registered");
    }
    Ok(())
}

fn echo() -> Command<Caller> {
    Command::new("echo")
        .with_alias("say")
        .with_description("Print the rest of the line")
        .with_argument(Argument::required("message", GreedyStringParser))
        .with_executor(|ctx| {
            println!("{}", ctx.argument::<String>("message")?);
            Ok(())
        })
}

fn add() -> Command<Caller> {
    Command::new("add")
        .with_alias("sum")
        .with_description("Add two integers")
        .with_argument(Argument::required("left", IntegerParser::new()))
        .with_argument(Argument::required("right", IntegerParser::new()))
        .with_flag(Flag::single("hex").with_alias("x"))
        .with_executor(|ctx| {
            let left = *ctx.argument::<i64>("left")?;
            let right = *ctx.argument::<i64>("right")?;
            let Some(total) = left.checked_add(right) else {
                bail!("{left} + {right} overflows");
            };
            if ctx.has_flag("hex") {
                println!("{total:#x}");
            } else {
                println!("{total}");
            }
            Ok(())
        })
}

fn greet() -> Command<Caller> {
    Command::new("greet")
        .with_description("Greet someone, optionally more than once")
        .with_argument(Argument::optional("name", StringParser).with_default_value("world"))
        .with_argument(
            Argument::optional("times", IntegerParser::new().with_min(1).with_max(10))
                .with_default_value("1"),
        )
        .with_flag(Flag::repeatable("excited").with_alias("e"))
        .with_flag(Flag::single("prefix").with_alias("p").with_value_parser(StringParser))
        .with_executor(|ctx| {
            let name = ctx.argument::<String>("name")?;
            let times = *ctx.argument::<i64>("times")?;
            let prefix = ctx.flag_value_or("prefix", String::from("Hello"))?;
            let bang = "!".repeat(ctx.flag_count("excited"));
            for _ in 0..times {
                println!("{prefix}, {name}{bang}");
            }
            Ok(())
        })
}

fn whoami() -> Command<Caller> {
    Command::<Caller>::new("whoami")
        .with_description("Show the caller and its permissions")
        .with_executor(|ctx| {
            let caller = ctx.caller();
            if caller.permissions.is_empty() {
                println!("{}", caller.name);
            } else {
                println!("{} ({})", caller.name, caller.permissions.join(", "));
            }
            Ok(())
        })
}

fn admin() -> Command<Caller> {
    Command::new("admin")
        .with_description("Administrative commands")
        .with_permission("console.admin")
        .with_flag(Flag::single("dry-run").with_alias("n"))
        .with_subcommand(
            Command::new("reload")
                .with_description("Reload the configuration")
                .with_executor(|ctx| {
                    if ctx.has_flag("dry-run") {
                        println!("would reload configuration");
                    } else {
                        println!("configuration reloaded");
                    }
                    Ok(())
                }),
        )
        .with_subcommand(
            Command::new("broadcast")
                .with_alias("bc")
                .with_description("Announce a message from the main loop")
                .with_permission("console.admin.broadcast")
                .with_argument(Argument::required("message", GreedyStringParser))
                .with_executor(broadcast),
        )
}

fn broadcast(ctx: &CommandContext<Caller>) -> Result<()> {
    let line = format!(
        "[{}] {}",
        ctx.caller().name,
        ctx.argument::<String>("message")?
    );
    // The announcement itself belongs to the main loop.
    let _ = ctx.scheduler().run_sync(move || println!("{line}"));
    Ok(())
}

fn help() -> Command<Caller> {
    Command::new("help")
        .with_alias("?")
        .with_description("List commands, or the subcommands of one")
        .with_argument(Argument::optional("command", StringParser))
        .with_executor(|ctx| {
            let commands = match ctx.argument::<String>("command") {
                Ok(name) => {
                    let root = ctx.registry().root();
                    let Some(command) = root.find_subcommand(name) else {
                        bail!("no command named '{name}'");
                    };
                    command.subcommands().to_vec()
                }
                Err(_) => ctx.registry().commands(),
            };
            for command in commands {
                let aliases = command.aliases().join(", ");
                let description = command.description().unwrap_or("");
                if aliases.is_empty() {
                    println!("{:<12} {}", command.name(), description);
                } else {
                    println!("{:<12} {} (aliases: {})", command.name(), description, aliases);
                }
            }
            Ok(())
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn caller(permissions: &[&str]) -> Caller {
        Caller {
            name: "tester".into(),
            permissions: permissions.iter().map(|p| p.to_string()).collect(),
        }
    }

    #[test]
    fn test_permission_matching() {
        assert!(caller(&["*"]).may("console.admin"));
        assert!(caller(&["console.admin"]).may("console.admin"));
        assert!(caller(&["console.*"]).may("console.admin.broadcast"));
        assert!(!caller(&["console.admin"]).may("console.admin.broadcast"));
        assert!(!caller(&[]).may("console.admin"));
    }

    #[test]
    fn test_builtin_tree_registers() {
        let registry = CommandRegistry::inline();
        register_all(&registry).expect("built-in commands are valid");
        let names: Vec<String> = registry
            .commands()
            .iter()
            .map(|c| c.name().to_string())
            .collect();
        assert_eq!(names, ["echo", "add", "greet", "whoami", "admin", "help"]);
    }

    #[test]
    fn test_whoami_reads_caller() {
        let registry = CommandRegistry::inline();
        register_all(&registry).expect("built-in commands are valid");

        let ctx = block_on(registry.handle(caller(&["console.*"]), "whoami"));
        assert_eq!(ctx.command_path(), ["whoami"]);
        assert_eq!(ctx.caller().name, "tester");
    }

    fn block_on(handle: cmdtree::DispatchHandle<Caller>) -> CommandContext<Caller> {
        tokio::runtime::Builder::new_current_thread()
            .build()
            .expect("runtime")
            .block_on(handle)
            .expect("dispatch")
    }
}
