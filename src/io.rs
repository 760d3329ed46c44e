/*
 * The I/O module for the crossing.
 *
 * This is the only part of the program that knows about the DESPI-M02 board:
 * which pin drives which lamp, where the call button is, and which UART is the
 * console. The control logic sees the lamps as an `OutputSink` and the button
 * as a plain `bool`.
 *
 * Logging runs in its own task. The control loop drops each phase transition
 * into a channel and carries on; the task formats it and writes it to the UART
 * at whatever pace the UART allows.
 */

use core::fmt::Write;

use embassy_stm32::{
    Peripherals, bind_interrupts,
    gpio::{Input, Level, Output, Pin, Pull, Speed},
    mode::Async,
    peripherals,
    usart::{self, Config, Uart},
};
use embassy_sync::{
    blocking_mutex::raw::ThreadModeRawMutex,
    channel::{Channel, Receiver},
};
use enum_ordinalize::Ordinalize;
use heapless::String;
use pelican_crossing::{Lamp, OutputSet, OutputSink, Transition};

bind_interrupts!(struct Irqs {
    USART1 => usart::InterruptHandler<peripherals::USART1>;
});

pub const CHANNEL_CAPACITY: usize = 8;
pub type TransitionChannel = Channel<ThreadModeRawMutex, Transition, CHANNEL_CAPACITY>;

// The lamp drivers on the board switch on with a high level.
const LAMPS_ACTIVE_LOW: bool = false;

// Longest line is "4294967295 ms: YellowToGreen -> Green\n".
const LINE_CAPACITY: usize = 48;

pub struct Lamps {
    outputs: [Output<'static>; Lamp::VARIANT_COUNT],
}

// Deal with active-high or active-low, so that the state machine can just use
// easy to understand `true` for on logic.
fn level(on: bool) -> Level {
    if on != LAMPS_ACTIVE_LOW {
        Level::High
    } else {
        Level::Low
    }
}

impl OutputSink for Lamps {
    fn set(&mut self, lamp: Lamp) {
        self.outputs[lamp.ordinal()].set_level(level(true));
    }

    fn clear(&mut self, lamp: Lamp) {
        self.outputs[lamp.ordinal()].set_level(level(false));
    }
}

pub struct CallButton {
    input: Input<'static>,
}

impl CallButton {
    // Wired to ground with the internal pull-up, so pressed reads low.
    pub fn pressed(&self) -> bool {
        self.input.is_low()
    }
}

pub struct Board {
    pub lamps: Lamps,
    pub button: CallButton,
    pub console: Uart<'static, Async>,
}

impl Board {
    /*
     * Claims the pins and brings every lamp up in `initial`, so the crossing
     * shows a valid aspect from the moment the pins become outputs.
     */
    pub fn new(peripherals: Peripherals, initial: OutputSet) -> Self {
        let initial_level = |lamp: Lamp| level(initial.is_on(lamp));

        // Same order as `Lamp`.
        let outputs: [Output<'static>; Lamp::VARIANT_COUNT] = [
            Output::new(peripherals.PE1.degrade(), initial_level(Lamp::Red), Speed::Low),
            Output::new(peripherals.PB9.degrade(), initial_level(Lamp::Amber), Speed::Low),
            Output::new(peripherals.PB7.degrade(), initial_level(Lamp::Green), Speed::Low),
            Output::new(peripherals.PB6.degrade(), initial_level(Lamp::DontWalk), Speed::Low),
            Output::new(peripherals.PB8.degrade(), initial_level(Lamp::Walk), Speed::Low),
        ];

        let input = Input::new(peripherals.PE11.degrade(), Pull::Up);

        let console = Uart::new(
            peripherals.USART1,
            peripherals.PA10,
            peripherals.PA9,
            Irqs,
            peripherals.DMA1_CH4,
            peripherals.DMA1_CH5,
            Config::default(), // 115200 baud
        )
        .unwrap();

        Board {
            lamps: Lamps { outputs },
            button: CallButton { input },
            console,
        }
    }
}

#[embassy_executor::task]
pub async fn log_task(
    mut console: Uart<'static, Async>,
    transitions: Receiver<'static, ThreadModeRawMutex, Transition, CHANNEL_CAPACITY>,
) -> ! {
    let _ = console
        .write(b"pelican crossing: green, waiting for a call\n")
        .await;

    loop {
        let transition = transitions.receive().await;

        let mut line: String<LINE_CAPACITY> = String::new();
        if writeln!(line, "{transition}").is_ok() {
            let _ = console.write(line.as_bytes()).await;
        }
    }
}
