use anyhow::Result;
use colored::Colorize;
use daycycle::config::{StartAt, StartConfig};
use daycycle::prelude::*;
use daycycle::ENGINE_NAME;
use std::env;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    // 2. Load a configuration file if one was given, otherwise run a fast
    //    demo day that starts just before nightfall.
    let config = match env::args().nth(1) {
        Some(path) => ClockConfig::load(&path)?,
        None => ClockConfig {
            ticks_per_second: 240.0,
            start: StartConfig::Forced {
                season: Season::Summer,
                day: 29,
                at: StartAt::Period("Evening".to_string()),
                minute: 0,
            },
            ..Default::default()
        },
    };

    // 3. Create the ClockEngine instance.
    let engine = ClockEngine::new(config)?;
    info!("{} v{} starting at {}", ENGINE_NAME.cyan(), daycycle::VERSION, engine.snapshot().await);

    // 4. Spawn concurrent tasks to listen to the event streams.
    spawn_event_listeners(&engine);

    // 5. Register subscribers the way lighting and seasonal systems would.
    register_demo_subscribers(&engine).await;

    // 6. Run the engine until Ctrl+C.
    engine.run().await?;

    Ok(())
}

/// Spawns tasks that log each event stream from the engine.
fn spawn_event_listeners(engine: &ClockEngine) {
    let mut system_rx = engine.subscribe_system_events();
    tokio::spawn(async move {
        while let Ok(event) = system_rx.recv().await {
            info!("{} => {:?}", "[SYSTEM]".dimmed(), event);
        }
    });

    let mut clock_rx = engine.subscribe_clock_events();
    tokio::spawn(async move {
        while let Ok(event) = clock_rx.recv().await {
            let tag = match &event {
                ClockEvent::DayStarted { .. } => "[DAY]".yellow(),
                ClockEvent::SeasonChanged { .. } => "[SEASON]".green(),
                ClockEvent::PeriodStarted { .. } => "[PERIOD]".cyan(),
            };
            info!("{} => {:?}", tag, event);
        }
    });
}

/// Registers subscribers that read the clock through their view.
async fn register_demo_subscribers(engine: &ClockEngine) {
    let days_seen = Arc::new(AtomicU32::new(0));

    let counter = Arc::clone(&days_seen);
    engine
        .on_day_start(move |_event, view| {
            let total = counter.fetch_add(1, Ordering::Relaxed) + 1;
            info!("[DAY TASK] => {} (day #{} since start)", view.snapshot(), total);
        })
        .await;

    engine
        .on_season_change(|_event, view| {
            info!("[SEASONAL ASSETS] => swapping sprites to {}", view.current_season());
        })
        .await;

    for period in ["Morning", "Afternoon", "Evening", "Night"] {
        engine
            .on_period_start(period, move |_event, view| {
                info!(
                    "[LIGHTING] => {} begins, time of day {:.3}",
                    period,
                    view.time_of_day()
                );
            })
            .await;
    }
}
