use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{OutputPin, PinState};

use crate::config::GateConfig;

/// Outputs driven by the access decision.
pub trait Actuator {
    /// One timed relay pulse. The relay is back at its idle level on return.
    fn activate(&mut self);

    /// Short LED blink for a rejected tag.
    fn indicate_rejection(&mut self);
}

#[derive(Clone, Copy, Debug)]
pub struct RelayTiming {
    pub settle_ms: u32,
    pub supply_ms: u32,
    pub pulse_ms: u32,
    pub indicator_ms: u32,
}

impl RelayTiming {
    pub fn from_config(config: &GateConfig) -> Self {
        RelayTiming {
            settle_ms: config.relay_settle_ms,
            supply_ms: config.relay_supply_ms,
            pulse_ms: config.relay_pulse_ms,
            indicator_ms: config.indicator_pulse_ms,
        }
    }
}

/// Relay with a switched supply plus an indicator LED.
///
/// The relay coil supply is only powered for the duration of a pulse.
/// GPIO writes are treated as infallible.
pub struct RelayActuator<SIG, PWR, LED, D> {
    signal: SIG,
    power: PWR,
    led: LED,
    delay: D,
    idle: PinState,
    timing: RelayTiming,
}

impl<SIG, PWR, LED, D> RelayActuator<SIG, PWR, LED, D>
where
    SIG: OutputPin,
    PWR: OutputPin,
    LED: OutputPin,
    D: DelayNs,
{
    /// Drives every output to its rest level.
    pub fn new(
        mut signal: SIG,
        mut power: PWR,
        mut led: LED,
        delay: D,
        idle_high: bool,
        timing: RelayTiming,
    ) -> Self {
        let idle = PinState::from(idle_high);
        signal.set_state(idle).ok();
        power.set_low().ok();
        led.set_low().ok();
        RelayActuator { signal, power, led, delay, idle, timing }
    }

    pub fn idle_level(&self) -> PinState {
        self.idle
    }
}

impl<SIG, PWR, LED, D> Actuator for RelayActuator<SIG, PWR, LED, D>
where
    SIG: OutputPin,
    PWR: OutputPin,
    LED: OutputPin,
    D: DelayNs,
{
    fn activate(&mut self) {
        self.delay.delay_ms(self.timing.settle_ms);
        self.power.set_high().ok();
        self.delay.delay_ms(self.timing.supply_ms);
        self.signal.set_state(!self.idle).ok();
        self.delay.delay_ms(self.timing.pulse_ms);
        self.signal.set_state(self.idle).ok();
        self.power.set_low().ok();
    }

    fn indicate_rejection(&mut self) {
        self.led.set_high().ok();
        self.delay.delay_ms(self.timing.indicator_ms);
        self.led.set_low().ok();
    }
}
