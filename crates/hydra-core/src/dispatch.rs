use crate::action::Action;
use crate::engine::{ControlState, Event, Outcome};
use crate::input::Channel;
use crate::readout::Readout;
use crate::resolver::resolve;
use log::{debug, trace};

/// Everything a presentation layer needs after one event, taken from the
/// same reducer step.
#[derive(Debug, Clone, PartialEq)]
pub struct ControlSnapshot {
    pub sequence: u64,
    pub state: ControlState,
    pub actions: Vec<Action>,
    pub locked: bool,
    pub locked_channels: Vec<Channel>,
    pub readout: Readout,
}

impl ControlSnapshot {
    fn build(sequence: u64, state: ControlState) -> Self {
        let actions = resolve(&state.input, &state.latch, state.engine);
        let readout = Readout::derive(&state, &actions);
        Self {
            sequence,
            state,
            locked: state.latch.is_any_locked(),
            locked_channels: state.latch.locked_channels(),
            actions,
            readout,
        }
    }
}

/// Receives a snapshot after every applied event, together with the event
/// that produced it. Observers only read; they cannot feed anything back into
/// the controller.
pub trait ControlObserver {
    /// Called once from [`Controller::subscribe`] with the snapshot current at
    /// that moment, so the observer starts in step with the controller.
    fn on_attach(&mut self, _snapshot: &ControlSnapshot) {}

    fn on_snapshot(&mut self, event: &Event, snapshot: &ControlSnapshot);

    fn on_ignored(&mut self, _event: &Event, _outcome: Outcome) {}
}

#[derive(Clone, Default, Debug)]
pub struct DispatchStats {
    pub events_applied: u64,
    pub events_ignored: u64,
    pub latch_triggers: u64,
    pub latch_resets: u64,
}

pub struct Controller {
    snapshot: ControlSnapshot,
    observers: Vec<Box<dyn ControlObserver + Send>>,
    stats: DispatchStats,
}

impl Controller {
    pub fn new() -> Self {
        Self::with_state(ControlState::new())
    }

    pub fn with_state(state: ControlState) -> Self {
        Self {
            snapshot: ControlSnapshot::build(0, state),
            observers: Vec::new(),
            stats: DispatchStats::default(),
        }
    }

    pub fn subscribe(&mut self, mut observer: Box<dyn ControlObserver + Send>) {
        observer.on_attach(&self.snapshot);
        self.observers.push(observer);
    }

    /// Apply one event, recompute the actions and notify observers.
    ///
    /// The snapshot is replaced as a whole, so a reader sees either the
    /// state before the event or after it.
    pub fn dispatch(&mut self, event: &Event) -> Outcome {
        let reduction = self.snapshot.state.reduce(event);

        if let Outcome::Ignored(reason) = reduction.outcome {
            self.stats.events_ignored += 1;
            debug!("ignored {} event: {:?}", event.kind(), reason);
            for observer in self.observers.iter_mut() {
                observer.on_ignored(event, reduction.outcome);
            }
            return reduction.outcome;
        }

        self.stats.events_applied += 1;
        match event {
            Event::TriggerLatch => self.stats.latch_triggers += 1,
            Event::ResetLatch => self.stats.latch_resets += 1,
            _ => {}
        }

        self.snapshot = ControlSnapshot::build(self.snapshot.sequence + 1, reduction.state);
        trace!(
            "seq {} after {}: {:?}",
            self.snapshot.sequence,
            event.kind(),
            self.snapshot.actions
        );

        for observer in self.observers.iter_mut() {
            observer.on_snapshot(event, &self.snapshot);
        }
        reduction.outcome
    }

    pub fn snapshot(&self) -> &ControlSnapshot {
        &self.snapshot
    }

    pub fn actions(&self) -> &[Action] {
        &self.snapshot.actions
    }

    pub fn is_any_locked(&self) -> bool {
        self.snapshot.locked
    }

    pub fn stats(&self) -> &DispatchStats {
        &self.stats
    }
}

impl Default for Controller {
    fn default() -> Self {
        Self::new()
    }
}
