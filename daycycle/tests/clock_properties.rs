use daycycle::prelude::*;
use std::sync::{Arc, Mutex};

type EventLog = Arc<Mutex<Vec<ClockEvent>>>;

fn record_events(clock: &mut Clock) -> EventLog {
    let log = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&log);
    clock.on_any(move |event, _view| sink.lock().unwrap().push(event.clone()));
    log
}

fn clock_at(season: Season, day: u8, hour: u8, minute: u8) -> Clock {
    let mut clock = Clock::default();
    clock
        .initialize(&StartConfig::Forced {
            season,
            day,
            at: StartAt::Hour(hour),
            minute,
        })
        .unwrap();
    clock
}

fn taken(log: &EventLog) -> Vec<ClockEvent> {
    std::mem::take(&mut *log.lock().unwrap())
}

#[test]
fn batched_ticks_match_single_ticks() {
    // Includes spans that cross hours, days, a season and a whole year.
    for ticks in [0u64, 1, 59, 60, 61, 1_439, 1_440, 3_000, 43_217, 200_000] {
        let mut stepped = clock_at(Season::Autumn, 29, 20, 37);
        let mut batched = clock_at(Season::Autumn, 29, 20, 37);
        let stepped_log = record_events(&mut stepped);
        let batched_log = record_events(&mut batched);

        for _ in 0..ticks {
            stepped.advance(1);
        }
        batched.advance(ticks);

        assert_eq!(stepped.export_state(), batched.export_state(), "ticks = {ticks}");
        assert_eq!(stepped.current_period_name(), batched.current_period_name());
        assert_eq!(taken(&stepped_log), taken(&batched_log), "ticks = {ticks}");
    }
}

#[test]
fn last_minute_of_season_rolls_everything_over_in_order() {
    let mut clock = clock_at(Season::Summer, 30, 23, 59);
    let log = record_events(&mut clock);

    clock.advance(1);

    assert_eq!(
        clock.export_state(),
        TimeRecord {
            minute: 0,
            hour: 0,
            day: 1,
            season: Season::Winter.ordinal().into(),
        }
    );
    assert_eq!(
        taken(&log),
        vec![
            ClockEvent::DayStarted {
                day: 1,
                season: Season::Winter
            },
            ClockEvent::SeasonChanged {
                season: Season::Winter
            },
        ]
    );
}

#[test]
fn night_window_wraps_midnight() {
    let table = PeriodTable::new(vec![
        PeriodWindow::new("Night", 21, 6),
        PeriodWindow::new("Morning", 6, 12),
        PeriodWindow::new("Day", 12, 21),
    ])
    .unwrap();

    for hour in [22, 23, 0, 5] {
        let mut clock = Clock::new(table.clone());
        clock
            .initialize(&StartConfig::Forced {
                season: Season::Summer,
                day: 1,
                at: StartAt::Hour(hour),
                minute: 0,
            })
            .unwrap();
        assert_eq!(clock.current_period_name(), Some("Night"), "hour {hour}");
    }

    let mut clock = clock_at(Season::Summer, 1, 5, 59);
    let log = record_events(&mut clock);
    clock.advance(1);
    assert_eq!(clock.current_period_name(), Some("Morning"));
    assert_eq!(
        taken(&log),
        vec![ClockEvent::PeriodStarted {
            period: "Morning".to_string(),
            hour: 6
        }]
    );
}

#[test]
fn recompute_without_hour_change_fires_nothing() {
    let mut clock = clock_at(Season::Spring, 4, 13, 0);
    let log = record_events(&mut clock);

    assert!(!clock.recompute_period());
    assert!(!clock.recompute_period());
    clock.advance(59);
    assert!(!clock.recompute_period());

    assert!(taken(&log).is_empty());
}

#[test]
fn import_of_export_is_silent_no_op() {
    let mut clock = clock_at(Season::Winter, 17, 19, 42);
    let log = record_events(&mut clock);
    let before = clock.snapshot();

    clock.import_state(clock.export_state()).unwrap();

    assert_eq!(clock.snapshot(), before);
    assert!(taken(&log).is_empty());
}

#[test]
fn invalid_import_leaves_state_unchanged() {
    let mut clock = clock_at(Season::Autumn, 8, 10, 15);
    let log = record_events(&mut clock);
    let before = clock.export_state();

    let cases = [
        (
            TimeRecord { minute: 60, ..before },
            StateValidationError::MinuteOutOfRange(60),
        ),
        (
            TimeRecord { hour: 24, ..before },
            StateValidationError::HourOutOfRange(24),
        ),
        (
            TimeRecord { day: 0, ..before },
            StateValidationError::DayOutOfRange(0),
        ),
        (
            TimeRecord { season: 7, ..before },
            StateValidationError::UnknownSeason(7),
        ),
    ];
    for (record, expected) in cases {
        assert_eq!(clock.import_state(record), Err(expected));
        assert_eq!(clock.export_state(), before);
    }
    assert_eq!(clock.current_period_name(), Some("Morning"));
    assert!(taken(&log).is_empty());
}

#[test]
fn four_rollovers_complete_the_season_cycle() {
    let mut clock = clock_at(Season::Summer, 30, 23, 59);
    let seasons = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seasons);
    clock.on_season_change(move |event, _view| {
        if let ClockEvent::SeasonChanged { season } = event {
            sink.lock().unwrap().push(*season);
        }
    });

    let minutes_per_season = 30 * 24 * 60;
    clock.advance(1);
    for _ in 0..3 {
        clock.advance(minutes_per_season);
    }

    assert_eq!(
        *seasons.lock().unwrap(),
        vec![Season::Winter, Season::Autumn, Season::Spring, Season::Summer]
    );
    assert_eq!(clock.current_season(), Season::Summer);
    assert_eq!(clock.current_day(), 1);
}

#[test]
fn one_large_advance_fires_every_season_change() {
    let mut clock = clock_at(Season::Summer, 1, 0, 0);
    let log = record_events(&mut clock);

    // Two full years.
    clock.advance(8 * 30 * 24 * 60);

    let events = taken(&log);
    let season_changes = events
        .iter()
        .filter(|e| matches!(e, ClockEvent::SeasonChanged { .. }))
        .count();
    let day_starts = events
        .iter()
        .filter(|e| matches!(e, ClockEvent::DayStarted { .. }))
        .count();
    assert_eq!(season_changes, 8);
    assert_eq!(day_starts, 8 * 30);
    assert_eq!(clock.current_season(), Season::Summer);
    assert_eq!(clock.current_day(), 1);
}

#[test]
fn export_serializes_for_save_files() {
    let clock = clock_at(Season::Spring, 22, 7, 3);
    let json = serde_json::to_string(&clock.export_state()).unwrap();
    let restored: TimeRecord = serde_json::from_str(&json).unwrap();

    let mut loaded = Clock::default();
    loaded.import_state(restored).unwrap();
    assert_eq!(loaded.snapshot(), clock.snapshot());
}
