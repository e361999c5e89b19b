//! The engine that drives a clock from real time and shares it across tasks.

use crate::clock::{Clock, ClockView};
use crate::common::SubscriberId;
use crate::components::ticker::TickAccumulator;
use crate::config::ClockConfig;
use crate::error::{ClockError, StateValidationError};
use crate::events::{ClockEvent, SystemEvent};
use crate::period::PeriodWindow;
use crate::state::{ClockSnapshot, TimeRecord};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, RwLock};
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, error, info, trace};

/// The main daycycle engine.
///
/// This struct owns the clock behind an async lock, gates ticks with a
/// running flag, and rebroadcasts every clock event on a channel. The
/// `ClockEngine` is designed to be cloned and shared across tasks, providing
/// a handle to the running instance.
#[derive(Clone)]
pub struct ClockEngine {
    config: Arc<ClockConfig>,
    clock: Arc<RwLock<Clock>>,
    running: Arc<AtomicBool>,
    clock_event_sender: broadcast::Sender<ClockEvent>,
    system_event_sender: broadcast::Sender<SystemEvent>,
}

// Core implementation block for internal logic.
impl ClockEngine {
    /// Creates a new `ClockEngine` and initialises its clock from `config`.
    ///
    /// The initial season announcement is broadcast before anyone can have
    /// subscribed; read [`ClockEngine::snapshot`] for the starting state.
    pub fn new(config: ClockConfig) -> Result<Self, ClockError> {
        const CHANNEL_CAPACITY: usize = 256;
        TickAccumulator::new(config.ticks_per_second)?;
        let (clock_event_sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        let (system_event_sender, _) = broadcast::channel(64);

        let mut clock = Clock::with_config(&config)?;
        let forwarder = clock_event_sender.clone();
        clock.on_any(move |event, _view| {
            forwarder.send(event.clone()).ok();
        });
        clock.initialize(&config.start)?;

        Ok(Self {
            config: Arc::new(config),
            clock: Arc::new(RwLock::new(clock)),
            running: Arc::new(AtomicBool::new(true)),
            clock_event_sender,
            system_event_sender,
        })
    }

    /// Runs the tick loop until a Ctrl+C signal is received.
    pub async fn run(&self) -> anyhow::Result<()> {
        info!("ClockEngine starting up...");
        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);

        let driver = self.clone();
        let handle = tokio::spawn(async move { driver.run_until(shutdown_rx).await });

        info!(
            "Engine running at {} ticks per second. Press Ctrl+C to shut down.",
            self.config.ticks_per_second
        );
        tokio::signal::ctrl_c().await?;

        info!("Shutdown signal received. Stopping the tick loop...");
        if shutdown_tx.send(()).is_err() {
            error!("Failed to send shutdown signal. The tick loop may already have stopped.");
        }
        handle.await??;
        info!("ClockEngine has shut down.");
        Ok(())
    }

    /// Runs the tick loop until `shutdown_rx` receives a value or its sender
    /// is dropped.
    ///
    /// Real elapsed time is measured on every timer tick and fed through a
    /// [`TickAccumulator`], so a stalled runtime catches up in one batched
    /// advance instead of dropping minutes. While paused, time is discarded.
    pub async fn run_until(&self, mut shutdown_rx: broadcast::Receiver<()>) -> anyhow::Result<()> {
        let mut accumulator = TickAccumulator::new(self.config.ticks_per_second)?;
        let mut ticker = tokio::time::interval(accumulator.interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut last = Instant::now();

        self.system_event_sender
            .send(SystemEvent::EngineStarted {
                at: chrono::Utc::now(),
            })
            .ok();
        loop {
            tokio::select! {
                biased;
                _ = shutdown_rx.recv() => break,
                now = ticker.tick() => {
                    let elapsed = now.duration_since(last);
                    last = now;
                    let ticks = accumulator.accumulate(elapsed, self.is_running());
                    if ticks > 0 {
                        trace!(ticks, "tick loop advancing clock");
                        self.clock.write().await.advance(ticks);
                    }
                }
            }
        }
        self.system_event_sender
            .send(SystemEvent::EngineShutdown)
            .ok();
        Ok(())
    }
}

// Public API implementation block.
impl ClockEngine {
    /// Stops ticks from reaching the clock. Returns `true` if it was running.
    pub fn pause(&self) -> bool {
        let was_running = self.running.swap(false, Ordering::SeqCst);
        if was_running {
            debug!("clock paused");
            self.system_event_sender.send(SystemEvent::Paused).ok();
        }
        was_running
    }

    /// Lets ticks reach the clock again. Returns `true` if it was paused.
    pub fn resume(&self) -> bool {
        let was_paused = !self.running.swap(true, Ordering::SeqCst);
        if was_paused {
            debug!("clock resumed");
            self.system_event_sender.send(SystemEvent::Resumed).ok();
        }
        was_paused
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Real time between ticks.
    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs_f64(self.config.ticks_per_second.recip())
    }

    /// Advances the clock directly, regardless of the running flag.
    pub async fn advance(&self, ticks: u64) {
        self.clock.write().await.advance(ticks);
    }

    pub async fn snapshot(&self) -> ClockSnapshot {
        self.clock.read().await.snapshot()
    }

    pub async fn export_state(&self) -> TimeRecord {
        self.clock.read().await.export_state()
    }

    /// Adopts a saved time. See [`Clock::import_state`].
    pub async fn import_state(&self, record: TimeRecord) -> Result<(), StateValidationError> {
        self.clock.write().await.import_state(record)?;
        self.system_event_sender
            .send(SystemEvent::StateImported { record })
            .ok();
        Ok(())
    }

    pub async fn periods(&self) -> Vec<PeriodWindow> {
        self.clock.read().await.periods().windows().to_vec()
    }

    /// Registers a callback for each day rollover.
    pub async fn on_day_start(
        &self,
        callback: impl FnMut(&ClockEvent, &ClockView<'_>) + Send + Sync + 'static,
    ) -> SubscriberId {
        let id = self.clock.write().await.on_day_start(callback);
        self.announce_added(id)
    }

    /// Registers a callback for each season change.
    pub async fn on_season_change(
        &self,
        callback: impl FnMut(&ClockEvent, &ClockView<'_>) + Send + Sync + 'static,
    ) -> SubscriberId {
        let id = self.clock.write().await.on_season_change(callback);
        self.announce_added(id)
    }

    /// Registers a callback for the start of one named period.
    pub async fn on_period_start(
        &self,
        period: impl Into<String>,
        callback: impl FnMut(&ClockEvent, &ClockView<'_>) + Send + Sync + 'static,
    ) -> SubscriberId {
        let id = self.clock.write().await.on_period_start(period, callback);
        self.announce_added(id)
    }

    /// Registers a callback for every clock event.
    pub async fn on_any(
        &self,
        callback: impl FnMut(&ClockEvent, &ClockView<'_>) + Send + Sync + 'static,
    ) -> SubscriberId {
        let id = self.clock.write().await.on_any(callback);
        self.announce_added(id)
    }

    /// Removes a subscriber from the clock.
    ///
    /// Returns `true` if the subscriber was found and removed.
    pub async fn unsubscribe(&self, id: SubscriberId) -> bool {
        let was_removed = self.clock.write().await.unsubscribe(id);
        if was_removed {
            self.system_event_sender
                .send(SystemEvent::SubscriberRemoved { id })
                .ok();
        }
        was_removed
    }

    /// Subscribes to the `ClockEvent` stream.
    pub fn subscribe_clock_events(&self) -> broadcast::Receiver<ClockEvent> {
        self.clock_event_sender.subscribe()
    }

    /// Subscribes to the `SystemEvent` stream.
    pub fn subscribe_system_events(&self) -> broadcast::Receiver<SystemEvent> {
        self.system_event_sender.subscribe()
    }

    fn announce_added(&self, id: SubscriberId) -> SubscriberId {
        self.system_event_sender
            .send(SystemEvent::SubscriberAdded { id })
            .ok();
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{StartAt, StartConfig};
    use crate::season::Season;
    use std::sync::atomic::AtomicU32;

    fn engine_at(hour: u8, minute: u8) -> ClockEngine {
        ClockEngine::new(ClockConfig {
            start: StartConfig::Forced {
                season: Season::Summer,
                day: 30,
                at: StartAt::Hour(hour),
                minute,
            },
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn rejects_bad_tick_rate() {
        let result = ClockEngine::new(ClockConfig {
            ticks_per_second: 0.0,
            ..Default::default()
        });
        assert!(matches!(result, Err(ClockError::InvalidTickRate(_))));
    }

    #[test]
    fn tick_interval_follows_configured_rate() {
        let engine = ClockEngine::new(ClockConfig {
            ticks_per_second: 4.0,
            ..Default::default()
        })
        .unwrap();
        assert_eq!(engine.tick_interval(), Duration::from_millis(250));
    }

    #[tokio::test(start_paused = true)]
    async fn tick_loop_only_advances_while_running() {
        let engine = engine_at(6, 0);
        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
        let driver = engine.clone();
        let handle = tokio::spawn(async move { driver.run_until(shutdown_rx).await });

        // Paused time auto-advances from one interval deadline to the next,
        // so each 1s tick is processed before the sleep wakes at 5.5s.
        tokio::time::sleep(Duration::from_millis(5_500)).await;
        let running = engine.snapshot().await;
        assert_eq!((running.hour, running.minute), (6, 5));

        engine.pause();
        tokio::time::sleep(Duration::from_secs(10)).await;
        let paused = engine.snapshot().await;
        assert_eq!((paused.hour, paused.minute), (6, 5));

        // Time spent paused is not banked.
        engine.resume();
        tokio::time::sleep(Duration::from_secs(3)).await;
        let resumed = engine.snapshot().await;
        assert_eq!((resumed.hour, resumed.minute), (6, 8));

        shutdown_tx.send(()).unwrap();
        handle.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn rebroadcasts_clock_events() {
        let engine = engine_at(23, 59);
        let mut events = engine.subscribe_clock_events();

        engine.advance(1).await;

        assert_eq!(
            events.recv().await.unwrap(),
            ClockEvent::DayStarted {
                day: 1,
                season: Season::Winter
            }
        );
        assert_eq!(
            events.recv().await.unwrap(),
            ClockEvent::SeasonChanged {
                season: Season::Winter
            }
        );
        assert!(events.try_recv().is_err());
    }

    #[tokio::test]
    async fn pause_and_resume_report_transitions() {
        let engine = engine_at(6, 0);
        let mut system = engine.subscribe_system_events();

        assert!(engine.is_running());
        assert!(engine.pause());
        assert!(!engine.pause());
        assert!(!engine.is_running());
        assert!(engine.resume());
        assert!(!engine.resume());

        assert!(matches!(system.recv().await.unwrap(), SystemEvent::Paused));
        assert!(matches!(system.recv().await.unwrap(), SystemEvent::Resumed));
        assert!(system.try_recv().is_err());
    }

    #[tokio::test]
    async fn subscribers_registered_through_the_engine_fire() {
        let engine = engine_at(20, 59);
        let mut system = engine.subscribe_system_events();
        let nights = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&nights);
        let id = engine
            .on_period_start("Night", move |_event, _view| {
                counter.fetch_add(1, Ordering::Relaxed);
            })
            .await;
        assert!(matches!(
            system.recv().await.unwrap(),
            SystemEvent::SubscriberAdded { id: added } if added == id
        ));

        engine.advance(1).await;
        assert_eq!(nights.load(Ordering::Relaxed), 1);

        assert!(engine.unsubscribe(id).await);
        assert!(!engine.unsubscribe(id).await);
    }

    #[tokio::test]
    async fn import_keeps_state_on_error() {
        let engine = engine_at(6, 0);
        let before = engine.export_state().await;

        let bad = TimeRecord {
            minute: 60,
            ..before
        };
        assert_eq!(
            engine.import_state(bad).await,
            Err(StateValidationError::MinuteOutOfRange(60))
        );
        assert_eq!(engine.export_state().await, before);

        let good = TimeRecord { hour: 13, ..before };
        engine.import_state(good).await.unwrap();
        assert_eq!(engine.snapshot().await.period.as_deref(), Some("Afternoon"));
    }

    #[tokio::test]
    async fn run_until_stops_on_shutdown() {
        let engine = ClockEngine::new(ClockConfig {
            ticks_per_second: 1000.0,
            ..Default::default()
        })
        .unwrap();
        let mut system = engine.subscribe_system_events();
        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);

        let driver = engine.clone();
        let handle = tokio::spawn(async move { driver.run_until(shutdown_rx).await });
        assert!(matches!(
            system.recv().await.unwrap(),
            SystemEvent::EngineStarted { .. }
        ));
        shutdown_tx.send(()).unwrap();
        handle.await.unwrap().unwrap();
        assert!(matches!(
            system.recv().await.unwrap(),
            SystemEvent::EngineShutdown
        ));
    }
}
