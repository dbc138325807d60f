use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Context};
use colored::Colorize;
use serde::Serialize;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::watch;
use tracing::warn;

use watchkv_poller::{PollUpdate, Poller};
use watchkv_registry::{Registration, StoreRegistry};
use watchkv_store::{Change, ChangeAction, Store, StoreConfig, StoreStats};

use crate::cli::*;
use crate::config::CliConfig;
use crate::world::SimulatedWorld;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config = CliConfig::load(cli.config.as_deref())?;
    match cli.command {
        Command::Demo(args) => cmd_demo(args, config, cli.format),
        Command::Poll(args) => cmd_poll(args, config, cli.format),
    }
}

/// Result of the demo scenario.
#[derive(Debug, Serialize)]
pub struct DemoReport {
    pub store: String,
    pub first_registration: bool,
    pub duplicate_rejected: bool,
    pub changes: Vec<Change<i64>>,
    pub final_value: Option<i64>,
}

/// Result of a polling run.
#[derive(Debug, Serialize)]
pub struct PollReport {
    pub updates: Vec<PollUpdate<i64>>,
    pub stats: StoreStats,
}

/// Register a store under `name`, find it again through the registry, and
/// run set/get/set/remove/get on `score` while recording notifications.
pub fn run_demo(
    registry: &StoreRegistry,
    name: &str,
    config: StoreConfig,
) -> anyhow::Result<DemoReport> {
    let config = StoreConfig {
        name: name.to_string(),
        ..config
    };
    let first = registry.register(name, Arc::new(Store::<i64>::with_config(config)))?;

    // Reach the store the way an unrelated component would.
    let store = registry
        .lookup::<i64>(name)?
        .with_context(|| format!("store {name:?} missing right after registration"))?;

    let duplicate = registry.register(name, Arc::new(Store::<i64>::new()))?;

    let log = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&log);
    let listener = store.on_change("score", move |c: &Change<i64>| {
        if let Ok(mut log) = sink.lock() {
            log.push(c.clone());
        }
    })?;

    store.set("score", 10)?;
    let read = store.get("score")?;
    if read != Some(10) {
        return Err(anyhow!("expected score 10 after set, read {read:?}"));
    }
    store.set("score", 20)?;
    store.remove("score")?;
    let final_value = store.get("score")?;
    store.unsubscribe(listener);

    let changes = log
        .lock()
        .map_err(|e| anyhow!("change log poisoned: {e}"))?
        .clone();

    Ok(DemoReport {
        store: name.to_string(),
        first_registration: first.is_registered(),
        duplicate_rejected: matches!(duplicate, Registration::Duplicate { .. }),
        changes,
        final_value,
    })
}

/// Poll a [`SimulatedWorld`] until `updates` poll updates have been seen.
pub async fn run_poll(config: CliConfig, updates: usize) -> anyhow::Result<PollReport> {
    let store = Arc::new(Store::with_config(config.store));
    let poller = Poller::new(Arc::clone(&store), SimulatedWorld::default(), config.poller);
    let mut rx = poller.subscribe();
    let (stop_tx, stop_rx) = watch::channel(false);
    let handle = tokio::spawn(poller.run(stop_rx));

    let mut seen = Vec::with_capacity(updates);
    while seen.len() < updates {
        match rx.recv().await {
            Ok(update) => seen.push(update),
            Err(RecvError::Lagged(skipped)) => warn!(skipped, "update stream lagged"),
            Err(RecvError::Closed) => break,
        }
    }

    let _ = stop_tx.send(true);
    handle.await.context("poller task panicked")??;

    Ok(PollReport {
        updates: seen,
        stats: store.stats(),
    })
}

fn cmd_demo(args: DemoArgs, config: CliConfig, format: OutputFormat) -> anyhow::Result<()> {
    let report = run_demo(watchkv_registry::global(), &args.name, config.store)?;

    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    if report.first_registration {
        println!("{} Registered store {}", "✓".green().bold(), report.store.bold());
    }
    if report.duplicate_rejected {
        println!(
            "  {} second registration of {} rejected, first kept",
            "!".yellow().bold(),
            report.store.bold()
        );
    }
    for change in &report.changes {
        let action = match change.action {
            ChangeAction::Set => "set".green(),
            ChangeAction::Remove => "remove".red(),
        };
        println!(
            "  {:<6} {}  {} -> {}",
            action,
            change.key.cyan(),
            show(change.old),
            show(change.new)
        );
    }
    println!("  final {}: {}", "score".cyan(), show(report.final_value));
    Ok(())
}

fn cmd_poll(args: PollArgs, config: CliConfig, format: OutputFormat) -> anyhow::Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let report = runtime.block_on(run_poll(config, args.ticks))?;

    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    for update in &report.updates {
        let changed: Vec<String> = update
            .changed
            .iter()
            .map(|(k, v)| format!("{}={}", k.cyan(), v))
            .collect();
        let vanished: Vec<String> = update
            .vanished
            .iter()
            .map(|k| format!("-{}", k).red().to_string())
            .collect();
        println!(
            "{} {}  {}",
            "tick".dimmed(),
            update.tick.to_string().yellow(),
            changed.into_iter().chain(vanished).collect::<Vec<_>>().join(" ")
        );
    }
    let stats = &report.stats;
    println!(
        "{} {} entries, {} sets, {} removes, {} notifications",
        "✓".green().bold(),
        stats.entries,
        stats.sets,
        stats.removes,
        stats.notifications
    );
    Ok(())
}

fn show(value: Option<i64>) -> String {
    value.map_or_else(|| "absent".dimmed().to_string(), |v| v.to_string())
}
