#![no_std]
#![no_main]

// Arduino Uno image. The watchdog doubles as the wake timer: it is started in
// reset mode right before power-down, so every wake re-enters `main` with
// only the `.noinit` region intact. Intervals longer than one watchdog period
// are slept as a chain of periods, with the remainder kept in that region.
//
// Wiring: MFRC522 RST d9, SS d10, SPI d11-d13; LED d6, relay signal d7,
// relay supply d8.

use core::mem::MaybeUninit;

use arduino_hal::hal::wdt;
use arduino_hal::spi;
use embedded_hal::spi::{Mode, Phase, Polarity};
use panic_halt as _;
use ufmt::uwriteln;

use rfid_gate::config::{GateConfig, SERIAL_BAUD};
use rfid_gate::{Gate, RelayActuator, RelayTiming, RetainedRegion, RfidRc522, Sleeper};

#[link_section = ".noinit"]
static mut RETAINED: MaybeUninit<RetainedRegion> = MaybeUninit::uninit();

struct WatchdogSleep {
    watchdog: wdt::Wdt,
    cpu: arduino_hal::pac::CPU,
    timeout: wdt::Timeout,
}

/// Longest watchdog period that does not exceed the request, in µs.
fn watchdog_timeout(duration_us: u32) -> (wdt::Timeout, u32) {
    match duration_us / 1000 {
        ms if ms >= 8000 => (wdt::Timeout::Ms8000, 8_000_000),
        ms if ms >= 4000 => (wdt::Timeout::Ms4000, 4_000_000),
        ms if ms >= 2000 => (wdt::Timeout::Ms2000, 2_000_000),
        ms if ms >= 1000 => (wdt::Timeout::Ms1000, 1_000_000),
        ms if ms >= 500 => (wdt::Timeout::Ms500, 500_000),
        ms if ms >= 250 => (wdt::Timeout::Ms250, 250_000),
        ms if ms >= 125 => (wdt::Timeout::Ms125, 125_000),
        ms if ms >= 64 => (wdt::Timeout::Ms64, 64_000),
        ms if ms >= 32 => (wdt::Timeout::Ms32, 32_000),
        _ => (wdt::Timeout::Ms16, 16_000),
    }
}

impl Sleeper for WatchdogSleep {
    fn timer_period_us(&self, duration_us: u32) -> u32 {
        watchdog_timeout(duration_us).1
    }

    fn arm_wake_timer(&mut self, duration_us: u32) {
        self.timeout = watchdog_timeout(duration_us).0;
    }

    fn enter_low_power_sleep(&mut self) {
        self.cpu.smcr.write(|w| w.sm().pdown().se().set_bit());
        self.watchdog.start(self.timeout).ok();
        loop {
            avr_device::asm::sleep();
        }
    }
}

#[arduino_hal::entry]
fn main() -> ! {
    let dp = arduino_hal::Peripherals::take().unwrap();
    let pins = arduino_hal::pins!(dp);

    // A watchdog reset leaves the watchdog running with its shortest period
    let mut watchdog = wdt::Wdt::new(dp.WDT, &dp.CPU.mcusr);
    watchdog.stop();

    let mut serial = arduino_hal::default_serial!(dp, pins, SERIAL_BAUD);

    let settings = spi::Settings {
        data_order: spi::DataOrder::MostSignificantFirst,
        mode: Mode {
            polarity: Polarity::IdleLow,
            phase: Phase::CaptureOnFirstTransition,
        },
        clock: spi::SerialClockRate::OscfOver16,
    };
    let sclk = pins.d13.into_output();
    let mosi = pins.d11.into_output();
    let miso = pins.d12.into_pull_up_input();
    let cs = pins.d10.into_output();
    let (spi, cs_pin) = spi::Spi::new(dp.SPI, sclk, mosi, miso, cs, settings);
    let mut rst = pins.d9.into_output();

    let config = GateConfig::default();

    let mut rfid = RfidRc522::new(spi, cs_pin, arduino_hal::Delay::new());
    if let Err(e) = rfid.init(&mut rst, &mut serial) {
        uwriteln!(&mut serial, "MFRC522 init failed: {:?}", e).ok();
    }

    let relay = RelayActuator::new(
        pins.d7.into_output(),
        pins.d8.into_output(),
        pins.d6.into_output(),
        arduino_hal::Delay::new(),
        config.relay_idle_high,
        RelayTiming::from_config(&config),
    );

    // SAFETY: the only reference to RETAINED, taken once at start-up. Every
    // field of RetainedRegion is plain integer data, so any leftover bit
    // pattern is a valid value and `load` validates it.
    let retained = unsafe { &mut *core::ptr::addr_of_mut!(RETAINED).cast::<RetainedRegion>() };

    let mut sleeper = WatchdogSleep {
        watchdog,
        cpu: dp.CPU,
        timeout: wdt::Timeout::Ms2000,
    };

    let mut gate = Gate::new(&config, rfid, relay, retained, serial);
    gate.run(&mut sleeper)
}
