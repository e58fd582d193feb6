use crate::input::{AxisPair, AxisScalar, Channel, InputState};
use serde::{Deserialize, Serialize};

/// Magnitude a live axis must exceed before a trigger will latch it.
pub const DEADZONE: f64 = 0.1;

/// Frozen snapshots of the input channels. An absent slot means the channel
/// follows its live value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LatchState {
    pub left_stick: Option<AxisPair>,
    pub right_stick: Option<AxisPair>,
    pub left_pedal: Option<AxisScalar>,
    pub right_pedal: Option<AxisScalar>,
}

impl LatchState {
    pub const EMPTY: Self = Self {
        left_stick: None,
        right_stick: None,
        left_pedal: None,
        right_pedal: None,
    };

    /// Stamp every channel whose live value is past the deadzone.
    ///
    /// Channels inside the deadzone keep whatever they held before, so
    /// repeated triggers accumulate locks. A stick is latched as a whole pair
    /// when either of its components is past the deadzone.
    pub fn trigger(self, live: &InputState) -> Self {
        Self {
            left_stick: stamp_pair(self.left_stick, live.left_stick),
            right_stick: stamp_pair(self.right_stick, live.right_stick),
            left_pedal: stamp_scalar(self.left_pedal, live.left_pedal),
            right_pedal: stamp_scalar(self.right_pedal, live.right_pedal),
        }
    }

    pub fn cleared(self) -> Self {
        Self::EMPTY
    }

    pub fn is_any_locked(&self) -> bool {
        self.left_stick.is_some()
            || self.right_stick.is_some()
            || self.left_pedal.is_some()
            || self.right_pedal.is_some()
    }

    pub fn is_locked(&self, channel: Channel) -> bool {
        match channel {
            Channel::LeftStick => self.left_stick.is_some(),
            Channel::RightStick => self.right_stick.is_some(),
            Channel::LeftPedal => self.left_pedal.is_some(),
            Channel::RightPedal => self.right_pedal.is_some(),
        }
    }

    pub fn locked_channels(&self) -> Vec<Channel> {
        Channel::ALL
            .into_iter()
            .filter(|c| self.is_locked(*c))
            .collect()
    }

    /// Latched value where present, live value otherwise.
    pub fn effective(&self, live: &InputState) -> InputState {
        InputState {
            left_stick: self.left_stick.unwrap_or(live.left_stick),
            right_stick: self.right_stick.unwrap_or(live.right_stick),
            left_pedal: self.left_pedal.unwrap_or(live.left_pedal),
            right_pedal: self.right_pedal.unwrap_or(live.right_pedal),
        }
    }
}

fn stamp_pair(slot: Option<AxisPair>, live: AxisPair) -> Option<AxisPair> {
    if live.exceeds(DEADZONE) {
        Some(live)
    } else {
        slot
    }
}

fn stamp_scalar(slot: Option<AxisScalar>, live: AxisScalar) -> Option<AxisScalar> {
    if live.exceeds(DEADZONE) {
        Some(live)
    } else {
        slot
    }
}
