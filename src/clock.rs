/*
 * Millisecond time keeping for the control loop.
 *
 * The timebase is a free-running 32-bit counter that wraps after about 49.7
 * days. Nothing in the controller ever compares two timestamps directly; it
 * only asks how much time has passed since an earlier timestamp, and that
 * difference is computed with wrapping arithmetic so it stays correct when the
 * counter rolls over between the two readings.
 */

use core::cell::Cell;
use critical_section::Mutex;

/// A reading of the millisecond timebase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Millis(u32);

impl Millis {
    pub const fn new(ms: u32) -> Self {
        Millis(ms)
    }

    pub const fn as_u32(self) -> u32 {
        self.0
    }

    /// Milliseconds from `earlier` to `self`, across at most one rollover.
    pub const fn since(self, earlier: Millis) -> u32 {
        self.0.wrapping_sub(earlier.0)
    }

    pub const fn wrapping_add(self, ms: u32) -> Self {
        Millis(self.0.wrapping_add(ms))
    }

    /// True once at least `duration` ms have passed since `earlier`.
    pub const fn has_elapsed(self, earlier: Millis, duration: u32) -> bool {
        self.since(earlier) >= duration
    }
}

pub trait Clock {
    fn now(&self) -> Millis;
}

/*
 * The counter behind the timebase. An interrupt calls `tick()` once per
 * millisecond and the control loop calls `now()`. Both run inside a critical
 * section: on targets where a 32-bit load is not a single instruction, a read
 * interrupted halfway by an increment would return a torn value.
 */
pub struct TickCounter {
    count: Mutex<Cell<u32>>,
}

impl TickCounter {
    pub const fn new() -> Self {
        TickCounter {
            count: Mutex::new(Cell::new(0)),
        }
    }

    pub fn tick(&self) {
        critical_section::with(|cs| {
            let count = self.count.borrow(cs);
            count.set(count.get().wrapping_add(1));
        });
    }

    pub fn reset(&self) {
        critical_section::with(|cs| self.count.borrow(cs).set(0));
    }
}

impl Clock for TickCounter {
    fn now(&self) -> Millis {
        critical_section::with(|cs| Millis(self.count.borrow(cs).get()))
    }
}

impl Default for TickCounter {
    fn default() -> Self {
        Self::new()
    }
}
