pub mod action;
pub mod dispatch;
pub mod engine;
pub mod input;
pub mod latch;
pub mod readout;
pub mod resolver;
pub mod tags;

pub use action::{Action, Circuit};
pub use dispatch::{ControlObserver, ControlSnapshot, Controller, DispatchStats};
pub use engine::{ControlState, EngineState, Event, IgnoreReason, Outcome, Reduction};
pub use input::{AxisPair, AxisScalar, Channel, ChannelUpdate, InputState};
pub use latch::{LatchState, DEADZONE};
pub use readout::{
    FlowPath, MachineComponent, PedalIndicator, Pressures, Readout, StatusGauges, ValveSection,
};
pub use resolver::{resolve, ACTION_THRESHOLD};
