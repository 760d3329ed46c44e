#![cfg_attr(not(test), no_std)]

/*
 * Control logic for a pedestrian-actuated traffic light.
 *
 * Everything in this library is independent of the board: it consumes a
 * millisecond clock and a raw button level and produces the lamp states. The
 * firmware binary wires it to the GPIO pins, the host simulation and the tests
 * wire it to plain values.
 */

pub mod clock;
pub mod config;
pub mod lamps;
pub mod trafficlight;

pub use clock::{Clock, Millis, TickCounter};
pub use lamps::{Lamp, OutputSet, OutputSink};
pub use trafficlight::{Crossing, Phase, PhaseController, Tick, Transition};
