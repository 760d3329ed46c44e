#![cfg_attr(target_arch = "arm", no_std)]
#![cfg_attr(target_arch = "arm", no_main)]

// Firmware for a pelican crossing on the DESPI-M02 (STM32F103VE). Built for
// any other target, this is a host simulation of a single button press.

#[cfg(target_arch = "arm")]
mod io;
#[cfg(target_arch = "arm")]
mod timebase;

#[cfg(target_arch = "arm")]
use {
    embassy_executor::Spawner,
    embassy_futures::yield_now,
    embassy_sync::channel::Channel,
    panic_halt as _,
    pelican_crossing::{Clock, Crossing},
};

#[cfg(target_arch = "arm")]
static TRANSITIONS: io::TransitionChannel = Channel::new();

#[cfg(target_arch = "arm")]
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    // Before embassy_stm32::init, which may steal the core peripherals itself.
    let core = cortex_m::Peripherals::take().unwrap();
    let peripherals = embassy_stm32::init(Default::default());

    let mut crossing = Crossing::default();
    let io::Board {
        mut lamps,
        button,
        console,
    } = io::Board::new(peripherals, crossing.initial_outputs());

    spawner
        .spawn(io::log_task(console, TRANSITIONS.receiver()))
        .unwrap();

    // Interrupts are enabled out of reset; arming SysTick starts the clock.
    timebase::init(core.SYST);
    let clock = timebase::Timebase;

    loop {
        let tick = crossing.run_once(button.pressed(), clock.now(), &mut lamps);
        if let Some(transition) = tick.transition {
            // A full channel only costs a log line, never a tick.
            let _ = TRANSITIONS.try_send(transition);
        }

        // Let the log task run; the loop itself never waits.
        yield_now().await;
    }
}

#[cfg(not(target_arch = "arm"))]
fn main() {
    use pelican_crossing::{Crossing, Lamp, Millis};

    const PRESS: core::ops::Range<u32> = 10..15;
    const RUN_FOR_MS: u32 = 20_000;

    let mut crossing = Crossing::default();
    let lamps = |outputs: pelican_crossing::OutputSet| outputs.lit().collect::<Vec<Lamp>>();

    println!("0 ms: start {:?}", lamps(crossing.initial_outputs()));
    println!("button pressed {} ms to {} ms", PRESS.start, PRESS.end);

    for t in 0..RUN_FOR_MS {
        let tick = crossing.step(PRESS.contains(&t), Millis::new(t));
        if let Some(transition) = tick.transition {
            println!("{transition} {:?}", lamps(tick.outputs));
        }
    }
}
