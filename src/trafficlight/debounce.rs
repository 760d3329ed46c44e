/*
 * Debouncer for the pedestrian call button.
 *
 * A mechanical push button makes and breaks contact a few times every time it
 * is pressed or released. The debouncer turns the raw level into a single call
 * per press: it waits for the press edge, then for a release observed at least
 * `delay` ms after the press, then for a further `delay` ms of quiet before it
 * reports the call.
 *
 * Only the time at which the release is seen is checked against the window,
 * not how long the button was actually held. A short jab that is released
 * inside the window is picked up as soon as the window has passed.
 */

use crate::clock::Millis;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonState {
    Idle,
    Pressed,
    Released,
}

/// A debounced pedestrian request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallEvent {
    pub at: Millis,
}

#[derive(Debug)]
pub struct Debouncer {
    state: ButtonState,
    since: Millis,
    last_pressed: bool,
    delay: u32,
}

impl Debouncer {
    pub const fn new(delay: u32) -> Self {
        Debouncer {
            state: ButtonState::Idle,
            since: Millis::new(0),
            last_pressed: false,
            delay,
        }
    }

    pub fn state(&self) -> ButtonState {
        self.state
    }

    /*
     * Feed one sample of the button. `accepting_calls` gates only the start of
     * a new press; a press that is already being tracked always runs to the
     * end.
     */
    pub fn step(&mut self, pressed: bool, now: Millis, accepting_calls: bool) -> Option<CallEvent> {
        let mut call = None;

        match self.state {
            ButtonState::Idle => {
                if accepting_calls && pressed && !self.last_pressed {
                    self.enter(ButtonState::Pressed, now);
                }
            }
            ButtonState::Pressed => {
                if !pressed && now.has_elapsed(self.since, self.delay) {
                    self.enter(ButtonState::Released, now);
                }
            }
            ButtonState::Released => {
                if now.has_elapsed(self.since, self.delay) {
                    self.state = ButtonState::Idle;
                    call = Some(CallEvent { at: now });
                }
            }
        }

        self.last_pressed = pressed;
        call
    }

    fn enter(&mut self, state: ButtonState, now: Millis) {
        self.state = state;
        self.since = now;
    }
}
