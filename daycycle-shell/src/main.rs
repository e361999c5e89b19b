use anyhow::Result;
use colored::Colorize;
use daycycle::prelude::*;
use daycycle::{ENGINE_NAME, VERSION as LIB_VERSION};
use rustyline::highlight::Highlighter;
use rustyline::Editor;
use rustyline_derive::{Completer, Helper, Hinter, Validator};
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::env;
use tokio::sync::broadcast;
use tracing::info;
use tracing_subscriber::EnvFilter;

const SHELL_VERSION: &str = env!("CARGO_PKG_VERSION");

/// A custom helper struct for rustyline that enables syntax highlighting.
#[derive(Completer, Helper, Hinter, Validator)]
struct CommandHighlighter;

impl Highlighter for CommandHighlighter {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        if let Some((command, rest)) = line.split_once(' ') {
            Cow::Owned(format!("{} {}", command.yellow().bold(), rest.yellow()))
        } else {
            Cow::Owned(line.yellow().bold().to_string())
        }
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        true
    }
}

fn print_banner() {
    if env::var("QUIET_MODE").is_ok() {
        return;
    }
    let rule = "-".repeat(72);
    println!("{}", format!("  {} shell", ENGINE_NAME).cyan().bold());
    println!("{}", rule.dimmed());
    println!(
        "          Shell   v{:<8} Library   v{:<8}",
        SHELL_VERSION, LIB_VERSION
    );
    println!(
        "{}",
        "  Distributed under the MIT OR Apache-2.0 license. Use at your own risk.".dimmed()
    );
    println!("{}", rule.dimmed());
}

fn print_help() {
    println!("Available commands:");
    println!("  status                       - Shows the current time and period.");
    println!("  advance <TICKS>              - Advances the clock by TICKS minutes.");
    println!("  pause | resume               - Stops or restarts the real-time tick loop.");
    println!("  export                       - Prints the current state as JSON.");
    println!("  import <MIN> <HOUR> <DAY> <SEASON>");
    println!("                               - Loads a state (SEASON is an ordinal 0-3).");
    println!("  watch <day|season|period|all> [NAME]");
    println!("                               - Prints matching events; 'period' needs a NAME.");
    println!("  unwatch <HANDLE>             - Removes a watch by its handle.");
    println!("  list                         - Shows active watches and their handles.");
    println!("  periods                      - Shows the configured period windows.");
    println!("  exit                         - Quits the shell.");
}

/// Spawns a task that prints engine lifecycle events.
fn spawn_system_listener(engine: &ClockEngine) {
    let mut system_rx = engine.subscribe_system_events();
    tokio::spawn(async move {
        while let Ok(event) = system_rx.recv().await {
            match event {
                SystemEvent::SubscriberAdded { .. } | SystemEvent::SubscriberRemoved { .. } => {}
                other => println!("\n<-- [SYSTEM EVENT] {:?}", other),
            }
        }
    });
}

fn print_event(label: &str, event: &ClockEvent, view: &ClockView<'_>) {
    println!(
        "<-- [{}] {:?} at {}",
        label.green(),
        event,
        view.snapshot()
    );
}

/// Registers a printing subscriber for a `watch` command.
async fn add_watch(engine: &ClockEngine, args: &[&str]) -> Result<(String, SubscriberId), String> {
    match args {
        ["day"] => Ok((
            "day".to_string(),
            engine
                .on_day_start(|event, view| print_event("DAY", event, view))
                .await,
        )),
        ["season"] => Ok((
            "season".to_string(),
            engine
                .on_season_change(|event, view| print_event("SEASON", event, view))
                .await,
        )),
        ["period", name] => {
            let label = format!("period {}", name);
            Ok((
                label,
                engine
                    .on_period_start(*name, |event, view| print_event("PERIOD", event, view))
                    .await,
            ))
        }
        ["all"] => Ok((
            "all".to_string(),
            engine
                .on_any(|event, view| print_event("EVENT", event, view))
                .await,
        )),
        ["period"] => Err("Usage: watch period <NAME>".to_string()),
        _ => Err("Usage: watch <day|season|period|all> [NAME]".to_string()),
    }
}

fn parse_record(args: &[&str]) -> Result<TimeRecord, String> {
    let [minute, hour, day, season] = args else {
        return Err("Usage: import <MIN> <HOUR> <DAY> <SEASON>".to_string());
    };
    let parse = |value: &str| {
        value
            .parse::<i32>()
            .map_err(|_| format!("Error: '{}' is not a whole number.", value))
    };
    let season = match season.parse::<Season>() {
        Ok(named) => i32::from(named.ordinal()),
        Err(_) => parse(*season)?,
    };
    Ok(TimeRecord {
        minute: parse(*minute)?,
        hour: parse(*hour)?,
        day: parse(*day)?,
        season,
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    print_banner();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_target(false)
        .init();

    let config = match env::args().nth(1) {
        Some(path) => ClockConfig::load(&path)?,
        None => ClockConfig::default(),
    };
    let engine = ClockEngine::new(config)?;
    spawn_system_listener(&engine);

    // The shell starts paused so the clock only moves when asked to.
    engine.pause();

    info!("Spawning {} tick loop in the background...", ENGINE_NAME.cyan());
    let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
    let driver = engine.clone();
    let tick_loop = tokio::spawn(async move {
        if let Err(e) = driver.run_until(shutdown_rx).await {
            eprintln!("\nTick loop stopped with an error: {}", e);
        }
    });

    // The shell's watch bookkeeping.
    let mut watches: BTreeMap<usize, (String, SubscriberId)> = BTreeMap::new();
    let mut next_handle: usize = 0;

    let mut rl = Editor::new()?;
    rl.set_helper(Some(CommandHighlighter));

    println!(
        "{} is ready at {}. Type 'help' for commands or 'exit' to quit.",
        ENGINE_NAME.cyan(),
        engine.snapshot().await
    );

    loop {
        let prompt = format!("{}", ">> ".cyan().bold());
        let line = match rl.readline(&prompt) {
            Ok(line) => line,
            Err(_) => {
                println!("Exiting dayshell...");
                break;
            }
        };
        rl.add_history_entry(line.as_str())?;
        let args = line.split_whitespace().collect::<Vec<_>>();
        let Some((command, rest)) = args.split_first() else {
            continue;
        };

        match *command {
            "status" => {
                let snapshot = engine.snapshot().await;
                let state = if engine.is_running() { "running" } else { "paused" };
                println!(
                    "--> {} [{}, one tick every {:?}]",
                    snapshot.to_string().bold(),
                    state,
                    engine.tick_interval()
                );
            }
            "advance" => match rest.first().map(|s| s.parse::<u64>()) {
                Some(Ok(ticks)) => {
                    engine.advance(ticks).await;
                    println!("--> Advanced {} ticks. Now {}", ticks, engine.snapshot().await);
                }
                Some(Err(_)) => println!("Error: tick count must be a whole number."),
                None => println!("Usage: advance <TICKS>"),
            },
            "pause" => {
                if engine.pause() {
                    println!("--> Paused.");
                } else {
                    println!("--> Already paused.");
                }
            }
            "resume" => {
                if engine.resume() {
                    println!("--> Resumed.");
                } else {
                    println!("--> Already running.");
                }
            }
            "export" => {
                let record = engine.export_state().await;
                println!("--> {}", serde_json::to_string(&record)?);
            }
            "import" => match parse_record(rest) {
                Ok(record) => match engine.import_state(record).await {
                    Ok(()) => println!("--> Imported. Now {}", engine.snapshot().await),
                    Err(e) => println!("{} {}", "Rejected:".red(), e),
                },
                Err(message) => println!("{}", message),
            },
            "watch" => match add_watch(&engine, rest).await {
                Ok((label, id)) => {
                    let handle = next_handle;
                    next_handle += 1;
                    watches.insert(handle, (label.clone(), id));
                    println!("--> Watching {} with handle: #{}", label, handle);
                }
                Err(usage) => println!("{}", usage),
            },
            "unwatch" => match rest.first().map(|s| s.parse::<usize>()) {
                Some(Ok(handle)) => match watches.remove(&handle) {
                    Some((_, id)) => {
                        if engine.unsubscribe(id).await {
                            println!("--> Watch successfully removed.");
                        } else {
                            println!("--> Error: watch not found in clock.");
                        }
                    }
                    None => println!(
                        "Error: Invalid handle #{}. Use 'list' to see active watches.",
                        handle
                    ),
                },
                Some(Err(_)) => println!("Error: Handle must be a number (e.g., '0', '1')."),
                None => println!("Usage: unwatch <HANDLE>"),
            },
            "list" => {
                println!("Active watches:");
                for (handle, (label, id)) in &watches {
                    println!("  Handle #{}: {} ({:?})", handle, label, id);
                }
            }
            "periods" => {
                for window in engine.periods().await {
                    println!("  {}", window);
                }
            }
            "help" => print_help(),
            "exit" => break,
            _ => println!("Unknown command: '{}'. Type 'help'.", line.trim()),
        }
    }

    shutdown_tx.send(()).ok();
    tick_loop.await?;
    Ok(())
}
