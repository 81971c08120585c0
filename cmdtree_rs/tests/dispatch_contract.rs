use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use cmdtree::parsers::{GreedyStringParser, IntegerParser, StringParser};
use cmdtree::{
    Argument, Command, CommandContext, CommandRegistry, DispatchError, Flag, InlineExecutor, MainThreadQueue,
    ParseError, Registration, RegistrationPolicy, RegistryConfig, Scheduler, TaskAborted,
};

fn tokio_registry(main: &MainThreadQueue) -> CommandRegistry<String> {
    CommandRegistry::new(Scheduler::tokio(main.clone()))
}

#[tokio::test(flavor = "multi_thread")]
async fn continuation_runs_when_main_queue_is_drained() {
    let main = MainThreadQueue::new();
    let registry = tokio_registry(&main);
    let log = Arc::new(Mutex::new(Vec::<String>::new()));

    let sink = Arc::clone(&log);
    registry
        .register(
            Command::new("broadcast")
                .with_argument(Argument::required("message", GreedyStringParser))
                .with_executor(move |ctx| {
                    let message = ctx.argument::<String>("message")?.clone();
                    let sink = Arc::clone(&sink);
                    let _ = ctx
                        .scheduler()
                        .run_sync(move || sink.lock().unwrap().push(message));
                    Ok(())
                }),
        )
        .unwrap();

    let ctx = registry
        .handle("console".to_string(), "broadcast server restarting soon")
        .await
        .unwrap();
    assert_eq!(ctx.command_path(), ["broadcast"]);

    assert_eq!(main.len(), 1);
    assert!(log.lock().unwrap().is_empty());
    assert_eq!(main.run_pending(), 1);
    assert_eq!(*log.lock().unwrap(), vec!["server restarting soon"]);
}

#[tokio::test(flavor = "multi_thread")]
async fn concurrent_handles_complete_independently() {
    let main = MainThreadQueue::new();
    let registry = tokio_registry(&main);
    let runs = Arc::new(AtomicUsize::new(0));

    let counter = Arc::clone(&runs);
    registry
        .register(
            Command::new("sleep")
                .with_argument(Argument::required("millis", IntegerParser::new().with_min(0)))
                .with_executor(move |ctx| {
                    let millis = *ctx.argument::<i64>("millis")?;
                    std::thread::sleep(Duration::from_millis(millis as u64));
                    counter.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                }),
        )
        .unwrap();

    let handles: Vec<_> = (0..8)
        .map(|i| registry.handle(format!("caller-{i}"), format!("sleep {}", 5 * (i % 3))))
        .collect();
    let results = futures::future::join_all(handles).await;

    for (i, result) in results.into_iter().enumerate() {
        let ctx = result.expect("dispatch");
        assert_eq!(ctx.caller(), &format!("caller-{i}"));
        assert_eq!(ctx.argument::<i64>("millis"), Ok(&(5 * (i as i64 % 3))));
    }
    assert_eq!(runs.load(Ordering::SeqCst), 8);
}

#[tokio::test(flavor = "multi_thread")]
async fn failures_complete_the_future() {
    let main = MainThreadQueue::new();
    let registry = tokio_registry(&main);
    registry
        .register(
            Command::new("db")
                .with_subcommand(
                    Command::new("migrate")
                        .with_executor(|_| Err(anyhow::anyhow!("schema locked"))),
                )
                .with_subcommand(Command::new("crash").with_executor(|_| panic!("boom"))),
        )
        .unwrap();

    let err = registry
        .handle("ops".to_string(), "db migrat")
        .await
        .unwrap_err();
    assert_eq!(
        err.as_parse_error(),
        Some(&ParseError::UnknownSubcommand {
            token: "migrat".into(),
            position: 1,
            suggestion: Some("migrate".into()),
        })
    );
    assert_eq!(
        err.to_string(),
        "unknown subcommand 'migrat' at token 1, did you mean 'migrate'?"
    );

    let err = registry
        .handle("ops".to_string(), "db migrate")
        .await
        .unwrap_err();
    assert!(matches!(err, DispatchError::Execution { ref command, .. } if command == "db migrate"));
    assert_eq!(err.to_string(), "command 'db migrate' failed: schema locked");

    let err = registry
        .handle("ops".to_string(), "db crash")
        .await
        .unwrap_err();
    assert!(matches!(err, DispatchError::Aborted));
}

#[tokio::test]
async fn dropped_main_queue_aborts_continuation() {
    let main = MainThreadQueue::new();
    let scheduler = Scheduler::new(InlineExecutor, main.clone());

    let pending = scheduler.run_sync(|| 5);
    let finished = scheduler.run_async(|| 7);
    drop(scheduler);
    drop(main);

    assert_eq!(finished.await, Ok(7));
    assert_eq!(pending.await, Err(TaskAborted));
}

#[test]
fn relocated_command_is_reachable_under_its_host() {
    let registry = CommandRegistry::<String>::inline();
    let ok = |_: &CommandContext<String>| -> anyhow::Result<()> { Ok(()) };

    registry
        .register(
            Command::new("warp")
                .with_flag(Flag::single("silent").with_alias("s"))
                .with_executor(ok),
        )
        .unwrap();
    let outcome = registry
        .register(
            Command::new("warp")
                .with_alias("w")
                .with_argument(Argument::optional("target", StringParser))
                .with_flag(Flag::single("force").with_alias("f"))
                .with_executor(ok),
        )
        .unwrap();
    assert_eq!(
        outcome,
        Registration::Relocated {
            under: "warp".into()
        }
    );

    let ctx =
        futures::executor::block_on(registry.handle("p".to_string(), "warp -s w -f spawn"))
            .unwrap();
    assert_eq!(ctx.command_path(), ["warp", "warp"]);
    assert!(ctx.has_flag("silent"));
    assert!(ctx.has_flag("force"));
    assert_eq!(
        ctx.argument::<String>("target").map(String::as_str),
        Ok("spawn")
    );
}

#[test]
fn registry_config_from_file() {
    let temp = tempfile::TempDir::new().unwrap();
    std::fs::create_dir_all(temp.path().join(".cmdtree")).unwrap();
    std::fs::write(
        temp.path().join(".cmdtree/config.toml"),
        "policy = \"override\"\nsuggest_similar = false\n",
    )
    .unwrap();

    let config = RegistryConfig::load(temp.path());
    let registry = CommandRegistry::<String>::from_config(&config, Scheduler::inline());
    assert_eq!(registry.policy(), RegistrationPolicy::Override);

    let ok = |_: &CommandContext<String>| -> anyhow::Result<()> { Ok(()) };
    registry.register(Command::new("spawn").with_executor(ok)).unwrap();
    let err = futures::executor::block_on(registry.handle("p".to_string(), "spwn")).unwrap_err();
    assert!(matches!(
        err.as_parse_error(),
        Some(ParseError::UnknownSubcommand {
            suggestion: None,
            ..
        })
    ));
}
