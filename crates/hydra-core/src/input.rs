use serde::{Deserialize, Serialize};

/// Clamp a raw axis reading into [-1, 1]. NaN reads as neutral.
fn clamp_axis(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(-1.0, 1.0)
    }
}

/// One analog stick, both components normalized to [-1, 1].
///
/// `x` is positive to the right, `y` is positive away from the operator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AxisPair {
    pub x: f64,
    pub y: f64,
}

impl AxisPair {
    pub const NEUTRAL: Self = Self { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x: clamp_axis(x),
            y: clamp_axis(y),
        }
    }

    /// True when either component is strictly past `threshold`.
    pub fn exceeds(&self, threshold: f64) -> bool {
        self.x.abs() > threshold || self.y.abs() > threshold
    }
}

/// One pedal, normalized to [-1, 1]. Positive is forward travel.
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AxisScalar(f64);

impl AxisScalar {
    pub const NEUTRAL: Self = Self(0.0);

    pub fn new(value: f64) -> Self {
        Self(clamp_axis(value))
    }

    pub fn value(&self) -> f64 {
        self.0
    }

    pub fn exceeds(&self, threshold: f64) -> bool {
        self.0.abs() > threshold
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    LeftStick,
    RightStick,
    LeftPedal,
    RightPedal,
}

impl Channel {
    pub const ALL: [Channel; 4] = [
        Channel::LeftStick,
        Channel::RightStick,
        Channel::LeftPedal,
        Channel::RightPedal,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::LeftStick => "left_stick",
            Channel::RightStick => "right_stick",
            Channel::LeftPedal => "left_pedal",
            Channel::RightPedal => "right_pedal",
        }
    }

    pub fn is_stick(&self) -> bool {
        matches!(self, Channel::LeftStick | Channel::RightStick)
    }
}

/// A new reading for one channel. Sticks carry a pair, pedals a scalar, so a
/// mismatched shape cannot be constructed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ChannelUpdate {
    LeftStick(AxisPair),
    RightStick(AxisPair),
    LeftPedal(AxisScalar),
    RightPedal(AxisScalar),
}

impl ChannelUpdate {
    pub fn channel(&self) -> Channel {
        match self {
            ChannelUpdate::LeftStick(_) => Channel::LeftStick,
            ChannelUpdate::RightStick(_) => Channel::RightStick,
            ChannelUpdate::LeftPedal(_) => Channel::LeftPedal,
            ChannelUpdate::RightPedal(_) => Channel::RightPedal,
        }
    }
}

/// Live readings of all four channels. Always fully populated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct InputState {
    pub left_stick: AxisPair,
    pub right_stick: AxisPair,
    pub left_pedal: AxisScalar,
    pub right_pedal: AxisScalar,
}

impl InputState {
    pub const NEUTRAL: Self = Self {
        left_stick: AxisPair::NEUTRAL,
        right_stick: AxisPair::NEUTRAL,
        left_pedal: AxisScalar::NEUTRAL,
        right_pedal: AxisScalar::NEUTRAL,
    };

    pub fn apply(mut self, update: ChannelUpdate) -> Self {
        match update {
            ChannelUpdate::LeftStick(v) => self.left_stick = v,
            ChannelUpdate::RightStick(v) => self.right_stick = v,
            ChannelUpdate::LeftPedal(v) => self.left_pedal = v,
            ChannelUpdate::RightPedal(v) => self.right_pedal = v,
        }
        self
    }
}
