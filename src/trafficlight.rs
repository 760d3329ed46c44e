pub mod debounce;
use debounce::{CallEvent, Debouncer};

use core::fmt;

use crate::clock::Millis;
use crate::config::{DEBOUNCE_DELAY, TIMING_PLAN, TimingPlan};
use crate::lamps::{OutputSet, OutputSink};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Green,
    Yellow,
    Red,
    YellowToGreen,
}

impl Phase {
    pub fn name(self) -> &'static str {
        match self {
            Phase::Green => "Green",
            Phase::Yellow => "Yellow",
            Phase::Red => "Red",
            Phase::YellowToGreen => "YellowToGreen",
        }
    }

    pub fn red(self) -> bool {
        match self {
            Phase::Red => true,
            Phase::Green | Phase::Yellow | Phase::YellowToGreen => false,
        }
    }

    pub fn amber(self) -> bool {
        match self {
            Phase::Yellow | Phase::YellowToGreen => true,
            Phase::Green | Phase::Red => false,
        }
    }

    pub fn green(self) -> bool {
        match self {
            Phase::Green => true,
            Phase::Yellow | Phase::Red | Phase::YellowToGreen => false,
        }
    }

    // There is no separate pedestrian phase: walk is shown exactly while
    // traffic has red.
    pub fn walk(self) -> bool {
        self.red()
    }

    pub fn dont_walk(self) -> bool {
        !self.walk()
    }

    pub fn outputs(self) -> OutputSet {
        OutputSet::new()
            .vehicle(self.red(), self.amber(), self.green())
            .pedestrian(self.dont_walk(), self.walk())
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: Phase,
    pub to: Phase,
    pub at: Millis,
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ms: {} -> {}", self.at.as_u32(), self.from, self.to)
    }
}

/*
 * The timed phase state machine. Green is held for as long as nobody asks to
 * cross; a call starts the cycle, and once started the cycle always runs back
 * to green on its own timers.
 *
 * `started` is `None` exactly while the phase is green: green has no
 * countdown.
 */
#[derive(Debug)]
pub struct PhaseController {
    phase: Phase,
    started: Option<Millis>,
    plan: TimingPlan,
}

impl PhaseController {
    pub const fn new(plan: TimingPlan) -> Self {
        PhaseController {
            phase: Phase::Green,
            started: None,
            plan,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn started(&self) -> Option<Millis> {
        self.started
    }

    pub fn accepting_calls(&self) -> bool {
        self.phase == Phase::Green
    }

    fn next_phase(&self) -> Phase {
        match self.phase {
            Phase::Green => Phase::Yellow,
            Phase::Yellow => Phase::Red,
            Phase::Red => Phase::YellowToGreen,
            Phase::YellowToGreen => Phase::Green,
        }
    }

    fn phase_time(&self) -> Option<u32> {
        match self.phase {
            Phase::Green => None,
            Phase::Yellow | Phase::YellowToGreen => Some(self.plan.yellow),
            Phase::Red => Some(self.plan.red),
        }
    }

    /*
     * Advance by one tick. A call only matters while green; outside green it
     * is dropped, not remembered for the next cycle. At most one transition
     * happens per tick.
     */
    pub fn step(&mut self, call: Option<CallEvent>, now: Millis) -> Option<Transition> {
        let due = match (self.started, self.phase_time()) {
            (Some(started), Some(phase_time)) => now.has_elapsed(started, phase_time),
            _ => call.is_some() && self.accepting_calls(),
        };

        if !due {
            return None;
        }

        let transition = Transition {
            from: self.phase,
            to: self.next_phase(),
            at: now,
        };
        self.enter(transition.to, now);
        Some(transition)
    }

    fn enter(&mut self, phase: Phase, now: Millis) {
        self.phase = phase;
        self.started = match phase {
            Phase::Green => None,
            Phase::Yellow | Phase::Red | Phase::YellowToGreen => Some(now),
        };
    }

    pub fn outputs(&self) -> OutputSet {
        self.phase.outputs()
    }
}

/// What one pass of the control loop decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    pub phase: Phase,
    pub outputs: OutputSet,
    pub call: Option<CallEvent>,
    pub transition: Option<Transition>,
}

/*
 * One crossing: the call button debouncer feeding the phase controller. The
 * debouncer only starts tracking a press while the controller is green, which
 * is what keeps button presses during a cycle from queueing up another one.
 */
#[derive(Debug)]
pub struct Crossing {
    debouncer: Debouncer,
    controller: PhaseController,
}

impl Crossing {
    pub const fn new(plan: TimingPlan, debounce_delay: u32) -> Self {
        Crossing {
            debouncer: Debouncer::new(debounce_delay),
            controller: PhaseController::new(plan),
        }
    }

    pub fn phase(&self) -> Phase {
        self.controller.phase()
    }

    pub fn controller(&self) -> &PhaseController {
        &self.controller
    }

    pub fn debouncer(&self) -> &Debouncer {
        &self.debouncer
    }

    /// The lamp state to assert before the first tick.
    pub fn initial_outputs(&self) -> OutputSet {
        OutputSet::safe()
    }

    pub fn step(&mut self, pressed: bool, now: Millis) -> Tick {
        let call = self
            .debouncer
            .step(pressed, now, self.controller.accepting_calls());
        let transition = self.controller.step(call, now);

        Tick {
            phase: self.controller.phase(),
            outputs: self.controller.outputs(),
            call,
            transition,
        }
    }

    pub fn run_once(&mut self, pressed: bool, now: Millis, sink: &mut impl OutputSink) -> Tick {
        let tick = self.step(pressed, now);
        tick.outputs.apply(sink);
        tick
    }
}

impl Default for Crossing {
    fn default() -> Self {
        Crossing::new(TIMING_PLAN, DEBOUNCE_DELAY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lamps::Lamp;

    const PLAN: TimingPlan = TimingPlan::STANDARD;
    const ALL_PHASES: [Phase; 4] = [Phase::Green, Phase::Yellow, Phase::Red, Phase::YellowToGreen];

    fn call_at(t: u32) -> Option<CallEvent> {
        Some(CallEvent { at: Millis::new(t) })
    }

    // Steps the controller once per millisecond without calls and returns the
    // first transition seen.
    fn run_until_transition(controller: &mut PhaseController, from: u32, to: u32) -> Option<Transition> {
        (from..to).find_map(|t| controller.step(None, Millis::new(t)))
    }

    #[test]
    fn green_holds_without_a_call() {
        let mut controller = PhaseController::new(PLAN);
        assert_eq!(run_until_transition(&mut controller, 0, 100_000), None);
        assert_eq!(controller.phase(), Phase::Green);
        assert_eq!(controller.started(), None);
    }

    #[test]
    fn full_cycle_follows_the_plan() {
        let mut controller = PhaseController::new(PLAN);

        let to_yellow = controller.step(call_at(110), Millis::new(110));
        assert_eq!(
            to_yellow,
            Some(Transition {
                from: Phase::Green,
                to: Phase::Yellow,
                at: Millis::new(110),
            })
        );
        assert_eq!(controller.started(), Some(Millis::new(110)));

        let to_red = run_until_transition(&mut controller, 111, 20_000).unwrap();
        assert_eq!((to_red.to, to_red.at), (Phase::Red, Millis::new(3_110)));

        let to_yellow2 = run_until_transition(&mut controller, 3_111, 20_000).unwrap();
        assert_eq!(
            (to_yellow2.to, to_yellow2.at),
            (Phase::YellowToGreen, Millis::new(13_110))
        );

        let to_green = run_until_transition(&mut controller, 13_111, 20_000).unwrap();
        assert_eq!((to_green.to, to_green.at), (Phase::Green, Millis::new(16_110)));
        assert_eq!(controller.started(), None);
    }

    #[test]
    fn late_ticks_still_transition() {
        // The loop may not run on the exact millisecond a phase expires.
        let mut controller = PhaseController::new(PLAN);
        controller.step(call_at(0), Millis::new(0));

        assert_eq!(controller.step(None, Millis::new(2_999)), None);
        let late = controller.step(None, Millis::new(3_007)).unwrap();
        assert_eq!(late.to, Phase::Red);
        assert_eq!(controller.started(), Some(Millis::new(3_007)));
    }

    #[test]
    fn calls_outside_green_are_dropped() {
        let mut controller = PhaseController::new(PLAN);
        controller.step(call_at(0), Millis::new(0));

        for t in 1..16_000u32 {
            let before = controller.phase();
            if controller.step(call_at(t), Millis::new(t)).is_some() {
                // Only the timers move the cycle along.
                assert_ne!(before, Phase::Green);
                assert!(matches!(t, 3_000 | 13_000));
            }
        }
        assert_eq!(controller.step(None, Millis::new(16_000)).unwrap().to, Phase::Green);

        // Back on green nothing was remembered.
        assert_eq!(run_until_transition(&mut controller, 16_001, 40_000), None);
    }

    #[test]
    fn start_time_is_none_only_on_green() {
        let mut controller = PhaseController::new(PLAN);
        for t in 0..40_000u32 {
            let call = if t % 5_000 == 0 { call_at(t) } else { None };
            controller.step(call, Millis::new(t));
            assert_eq!(controller.started().is_none(), controller.phase() == Phase::Green);
        }
    }

    #[test]
    fn cycle_spans_clock_rollover() {
        let mut controller = PhaseController::new(PLAN);
        let start = Millis::new(u32::MAX - 1_500);
        controller.step(call_at(start.as_u32()), start);

        assert_eq!(controller.step(None, start.wrapping_add(2_999)), None);
        let to_red = controller.step(None, start.wrapping_add(3_000)).unwrap();
        assert_eq!(to_red.to, Phase::Red);
        assert_eq!(to_red.at, Millis::new(1_499));
    }

    #[test]
    fn outputs_follow_the_phase_table() {
        let expected = [
            (Phase::Green, Lamp::Green, Lamp::DontWalk),
            (Phase::Yellow, Lamp::Amber, Lamp::DontWalk),
            (Phase::Red, Lamp::Red, Lamp::Walk),
            (Phase::YellowToGreen, Lamp::Amber, Lamp::DontWalk),
        ];

        for (phase, vehicle, pedestrian) in expected {
            let lit: Vec<Lamp> = phase.outputs().lit().collect();
            assert_eq!(lit, vec![vehicle, pedestrian], "{phase}");
        }
    }

    #[test]
    fn exactly_one_lamp_per_head() {
        for phase in ALL_PHASES {
            let outputs = phase.outputs();
            assert_eq!(outputs.lit().filter(|l| l.is_vehicle()).count(), 1);
            assert_eq!(outputs.lit().filter(|l| l.is_pedestrian()).count(), 1);
        }
    }

    #[test]
    fn crossing_runs_the_reference_scenario() {
        let mut crossing = Crossing::new(PLAN, DEBOUNCE_DELAY);
        let mut transitions = Vec::new();

        for t in 0..20_000u32 {
            let pressed = (10..15).contains(&t);
            let tick = crossing.step(pressed, Millis::new(t));
            if let Some(call) = tick.call {
                assert_eq!(call.at, Millis::new(110));
            }
            transitions.extend(tick.transition.map(|tr| (tr.at.as_u32(), tr.to)));
        }

        assert_eq!(
            transitions,
            vec![
                (110, Phase::Yellow),
                (3_110, Phase::Red),
                (13_110, Phase::YellowToGreen),
                (16_110, Phase::Green),
            ]
        );
    }

    #[test]
    fn crossing_ignores_presses_during_the_cycle() {
        let mut crossing = Crossing::new(PLAN, DEBOUNCE_DELAY);
        let mut greens = 0;

        for t in 0..40_000u32 {
            // First press at 10, then someone keeps pressing every second.
            let pressed = (10..15).contains(&t) || (t > 1_000 && t % 1_000 < 5 && t < 16_000);
            let tick = crossing.step(pressed, Millis::new(t));
            if let Some(Transition { to: Phase::Green, .. }) = tick.transition {
                greens += 1;
            }
        }

        assert_eq!(greens, 1);
        assert_eq!(crossing.phase(), Phase::Green);
    }

    #[test]
    fn transition_display() {
        let transition = Transition {
            from: Phase::Red,
            to: Phase::YellowToGreen,
            at: Millis::new(13_110),
        };
        assert_eq!(transition.to_string(), "13110 ms: Red -> YellowToGreen");
    }
}
