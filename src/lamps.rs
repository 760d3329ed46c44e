/*
 * The lamps of the crossing and the snapshot of which of them are lit.
 *
 * The control logic never touches a pin. It produces an `OutputSet`, which
 * precisely captures the desired state of every lamp, and hands it to an
 * `OutputSink`. On the board the sink drives GPIO; in the tests it records
 * what was written. Every lamp is written on every tick, lit or not, so a pin
 * that was disturbed is corrected on the next pass of the loop.
 */

use enum_ordinalize::Ordinalize;

#[derive(Ordinalize, Debug, Clone, Copy, PartialEq, Eq)]
#[repr(usize)]
pub enum Lamp {
    // Vehicle light.
    Red,
    Amber,
    Green,

    // Pedestrian light.
    DontWalk,
    Walk,
}

impl Lamp {
    pub fn is_vehicle(self) -> bool {
        match self {
            Lamp::Red | Lamp::Amber | Lamp::Green => true,
            Lamp::DontWalk | Lamp::Walk => false,
        }
    }

    pub fn is_pedestrian(self) -> bool {
        !self.is_vehicle()
    }
}

pub trait OutputSink {
    fn set(&mut self, lamp: Lamp);
    fn clear(&mut self, lamp: Lamp);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputSet {
    lamps: [bool; Lamp::VARIANT_COUNT],
}

impl OutputSet {
    pub fn new() -> Self {
        OutputSet {
            lamps: [false; Lamp::VARIANT_COUNT],
        }
    }

    pub fn vehicle(mut self, red: bool, amber: bool, green: bool) -> Self {
        self.set_on_off(Lamp::Red, red);
        self.set_on_off(Lamp::Amber, amber);
        self.set_on_off(Lamp::Green, green);
        self
    }

    pub fn pedestrian(mut self, dont_walk: bool, walk: bool) -> Self {
        self.set_on_off(Lamp::DontWalk, dont_walk);
        self.set_on_off(Lamp::Walk, walk);
        self
    }

    /// Traffic flowing, pedestrians waiting. Asserted before the control loop
    /// starts.
    pub fn safe() -> Self {
        OutputSet::new()
            .vehicle(false, false, true)
            .pedestrian(true, false)
    }

    pub fn set_on_off(&mut self, lamp: Lamp, on: bool) {
        self.lamps[lamp.ordinal()] = on;
    }

    pub fn is_on(&self, lamp: Lamp) -> bool {
        self.lamps[lamp.ordinal()]
    }

    pub fn lit(&self) -> impl Iterator<Item = Lamp> + '_ {
        Lamp::VARIANTS
            .iter()
            .copied()
            .filter(move |lamp| self.is_on(*lamp))
    }

    pub fn apply(&self, sink: &mut impl OutputSink) {
        for lamp in Lamp::VARIANTS.iter().copied() {
            if self.is_on(lamp) {
                sink.set(lamp);
            } else {
                sink.clear(lamp);
            }
        }
    }
}

impl Default for OutputSet {
    fn default() -> Self {
        Self::new()
    }
}
