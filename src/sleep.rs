/// Timer-woken low-power mode.
///
/// On hardware a wake restarts the firmware from its entry point, so
/// [`enter_low_power_sleep`](Sleeper::enter_low_power_sleep) does not return
/// there. Implementations that do return simply hand control back to the
/// poll loop.
pub trait Sleeper {
    /// Longest single timer period, at most `duration_us`, the wake source
    /// can count. Intervals beyond it are slept in several periods.
    fn timer_period_us(&self, duration_us: u32) -> u32 {
        duration_us
    }

    fn arm_wake_timer(&mut self, duration_us: u32);

    fn enter_low_power_sleep(&mut self);
}
