use std::time::Duration;

use super::timer::TimerChain;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Trigger {
    OnMount,
    OnTap,
}

/// Timing of a staged reveal. Step 1 shows as soon as the script is
/// triggered; `later_steps[i]` is when step `i + 2` shows, and `reveal` is
/// when the continue control appears. All offsets count from the trigger.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NarrativeScript {
    pub trigger: Trigger,
    pub later_steps: Vec<Duration>,
    pub reveal: Duration,
}

impl NarrativeScript {
    pub fn step_count(&self) -> usize {
        self.later_steps.len() + 1
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NarrativePhase {
    Idle,
    Animating { step: usize, of: usize },
    Complete,
}

pub struct NarrativeSession {
    script: NarrativeScript,
    phase: NarrativePhase,
    timers: Option<TimerChain>,
}

impl NarrativeSession {
    pub fn new(script: NarrativeScript) -> Self {
        Self {
            script,
            phase: NarrativePhase::Idle,
            timers: None,
        }
    }

    pub fn mount(&mut self) {
        if self.script.trigger == Trigger::OnMount {
            self.begin();
        }
    }

    /// The user tapped the interactive element. Returns whether this started
    /// the sequence; repeat taps are ignored.
    pub fn tap(&mut self) -> bool {
        self.script.trigger == Trigger::OnTap && self.begin()
    }

    pub fn phase(&self) -> NarrativePhase {
        self.phase
    }

    pub fn can_continue(&self) -> bool {
        self.phase == NarrativePhase::Complete
    }

    pub fn is_waiting_for_tap(&self) -> bool {
        self.script.trigger == Trigger::OnTap && self.phase == NarrativePhase::Idle
    }

    /// Applies fired timers. Returns whether the phase changed.
    pub fn poll(&mut self) -> bool {
        let Some(timers) = self.timers.as_mut() else {
            return false;
        };

        let of = self.script.step_count();
        let mut changed = false;
        while let Some(fired) = timers.try_next() {
            self.phase = if fired + 1 < of {
                NarrativePhase::Animating {
                    step: fired + 2,
                    of,
                }
            } else {
                NarrativePhase::Complete
            };
            log::debug!("narrative step {fired} fired: {:?}", self.phase);
            changed = true;
        }

        if timers.is_finished() {
            self.timers = None;
        }
        changed
    }

    fn begin(&mut self) -> bool {
        if self.phase != NarrativePhase::Idle {
            return false;
        }
        self.phase = NarrativePhase::Animating {
            step: 1,
            of: self.script.step_count(),
        };
        let mut offsets = self.script.later_steps.clone();
        offsets.push(self.script.reveal);
        self.timers = Some(TimerChain::start(offsets));
        true
    }
}
