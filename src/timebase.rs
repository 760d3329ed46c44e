/*
 * The millisecond timebase for the board.
 *
 * SysTick interrupts once per millisecond and bumps a `TickCounter`; the
 * control loop reads it through the `Clock` trait. The counter does its own
 * interrupt masking around every access, so reading it from thread mode while
 * SysTick fires is safe.
 */

use cortex_m::peripheral::{SYST, syst::SystClkSource};
use cortex_m_rt::exception;
use pelican_crossing::{Clock, Millis, TickCounter};

// embassy-stm32's default clock tree runs the STM32F103 straight from the 8 MHz
// HSI oscillator.
const CORE_CLOCK_HZ: u32 = 8_000_000;
const TICK_HZ: u32 = 1_000;

static MILLIS: TickCounter = TickCounter::new();

pub fn init(mut syst: SYST) {
    MILLIS.reset();

    syst.set_clock_source(SystClkSource::Core);
    syst.set_reload(CORE_CLOCK_HZ / TICK_HZ - 1);
    syst.clear_current();
    syst.enable_counter();
    syst.enable_interrupt();
}

pub struct Timebase;

impl Clock for Timebase {
    fn now(&self) -> Millis {
        MILLIS.now()
    }
}

#[exception]
fn SysTick() {
    MILLIS.tick();
}
