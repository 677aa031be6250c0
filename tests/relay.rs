mod common;

use common::{event_log, events, relay, Event};
use embedded_hal::digital::PinState;
use rfid_gate::{Actuator, GateConfig};

#[test]
fn construction_parks_every_output() {
    let log = event_log();
    let config = GateConfig::default().with_relay_idle_high(true);
    let actuator = relay(&config, &log);

    assert_eq!(actuator.idle_level(), PinState::High);
    assert_eq!(
        events(&log),
        vec![Event::Pin("relay", true), Event::Pin("power", false), Event::Pin("led", false)]
    );
}

#[test]
fn activation_follows_supply_then_signal_sequence() {
    let log = event_log();
    let config = GateConfig::default();
    let mut actuator = relay(&config, &log);
    log.borrow_mut().clear();

    actuator.activate();

    assert_eq!(
        events(&log),
        vec![
            Event::DelayMs(1),
            Event::Pin("power", true),
            Event::DelayMs(5),
            Event::Pin("relay", true),
            Event::DelayMs(100),
            Event::Pin("relay", false),
            Event::Pin("power", false),
        ]
    );
}

#[test]
fn relay_returns_to_idle_high_after_every_pulse() {
    let log = event_log();
    let config = GateConfig::default().with_relay_idle_high(true);
    let mut actuator = relay(&config, &log);

    for _ in 0..3 {
        log.borrow_mut().clear();
        actuator.activate();
        let relay_levels: Vec<_> = events(&log)
            .into_iter()
            .filter_map(|e| match e {
                Event::Pin("relay", level) => Some(level),
                _ => None,
            })
            .collect();
        assert_eq!(relay_levels, vec![false, true]);
    }
}

#[test]
fn rejection_blinks_led_for_50ms() {
    let log = event_log();
    let config = GateConfig::default();
    let mut actuator = relay(&config, &log);
    log.borrow_mut().clear();

    actuator.indicate_rejection();

    assert_eq!(
        events(&log),
        vec![Event::Pin("led", true), Event::DelayMs(50), Event::Pin("led", false)]
    );
}
