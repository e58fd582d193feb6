use crate::input::{ChannelUpdate, InputState};
use crate::latch::LatchState;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineState {
    #[default]
    Stopped,
    Running,
}

impl EngineState {
    pub fn is_running(&self) -> bool {
        matches!(self, EngineState::Running)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EngineState::Stopped => "stopped",
            EngineState::Running => "running",
        }
    }
}

/// Something the operator did at the console.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Event {
    /// Ignition switched to an explicit position.
    Ignition { on: bool },
    /// Ignition push button.
    ToggleIgnition,
    Input(ChannelUpdate),
    TriggerLatch,
    ResetLatch,
}

impl Event {
    pub fn kind(&self) -> &'static str {
        match self {
            Event::Ignition { .. } => "ignition",
            Event::ToggleIgnition => "toggle_ignition",
            Event::Input(_) => "input",
            Event::TriggerLatch => "trigger_latch",
            Event::ResetLatch => "reset_latch",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IgnoreReason {
    /// Controls are disabled while the engine is off.
    EngineStopped,
    AlreadyRunning,
    AlreadyStopped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Applied,
    Ignored(IgnoreReason),
}

impl Outcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Outcome::Applied)
    }
}

/// Whole console state: ignition, live inputs and latches.
///
/// Only [`ControlState::reduce`] produces new values, so engine and latch
/// always change together in one step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ControlState {
    pub engine: EngineState,
    pub input: InputState,
    pub latch: LatchState,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reduction {
    pub state: ControlState,
    pub outcome: Outcome,
}

impl ControlState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reduce(self, event: &Event) -> Reduction {
        match *event {
            Event::Ignition { on: true } => self.start(),
            Event::Ignition { on: false } => self.stop(),
            Event::ToggleIgnition => {
                if self.engine.is_running() {
                    self.stop()
                } else {
                    self.start()
                }
            }
            Event::Input(update) => self.when_running(|s| ControlState {
                input: s.input.apply(update),
                ..s
            }),
            Event::TriggerLatch => self.when_running(|s| ControlState {
                latch: s.latch.trigger(&s.input),
                ..s
            }),
            Event::ResetLatch => self.when_running(|s| ControlState {
                latch: s.latch.cleared(),
                ..s
            }),
        }
    }

    fn start(self) -> Reduction {
        if self.engine.is_running() {
            return self.ignored(IgnoreReason::AlreadyRunning);
        }
        Reduction {
            state: ControlState {
                engine: EngineState::Running,
                input: InputState::NEUTRAL,
                latch: LatchState::EMPTY,
            },
            outcome: Outcome::Applied,
        }
    }

    // Live inputs are left as they were; nothing reads them until restart.
    fn stop(self) -> Reduction {
        if !self.engine.is_running() {
            return self.ignored(IgnoreReason::AlreadyStopped);
        }
        Reduction {
            state: ControlState {
                engine: EngineState::Stopped,
                latch: self.latch.cleared(),
                ..self
            },
            outcome: Outcome::Applied,
        }
    }

    fn when_running(self, f: impl FnOnce(Self) -> Self) -> Reduction {
        if !self.engine.is_running() {
            return self.ignored(IgnoreReason::EngineStopped);
        }
        Reduction {
            state: f(self),
            outcome: Outcome::Applied,
        }
    }

    fn ignored(self, reason: IgnoreReason) -> Reduction {
        Reduction {
            state: self,
            outcome: Outcome::Ignored(reason),
        }
    }
}
