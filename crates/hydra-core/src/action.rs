use serde::{Deserialize, Serialize};

/// Discrete hydraulic function derived from the control inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    Idle,
    BoomUp,
    BoomDown,
    StickIn,
    StickOut,
    BucketOpen,
    BucketClose,
    SwingLeft,
    SwingRight,
    TravelForward,
    TravelBackward,
    TravelLeft,
    TravelRight,
    EngineOff,
    LockedState,
}

/// Actuator circuit fed by a main control valve section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Circuit {
    Boom,
    Stick,
    Bucket,
    Swing,
    Travel,
}

impl Action {
    pub const ALL: [Action; 15] = [
        Action::Idle,
        Action::BoomUp,
        Action::BoomDown,
        Action::StickIn,
        Action::StickOut,
        Action::BucketOpen,
        Action::BucketClose,
        Action::SwingLeft,
        Action::SwingRight,
        Action::TravelForward,
        Action::TravelBackward,
        Action::TravelLeft,
        Action::TravelRight,
        Action::EngineOff,
        Action::LockedState,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Idle => "IDLE",
            Action::BoomUp => "BOOM_UP",
            Action::BoomDown => "BOOM_DOWN",
            Action::StickIn => "STICK_IN",
            Action::StickOut => "STICK_OUT",
            Action::BucketOpen => "BUCKET_OPEN",
            Action::BucketClose => "BUCKET_CLOSE",
            Action::SwingLeft => "SWING_LEFT",
            Action::SwingRight => "SWING_RIGHT",
            Action::TravelForward => "TRAVEL_FORWARD",
            Action::TravelBackward => "TRAVEL_BACKWARD",
            Action::TravelLeft => "TRAVEL_LEFT",
            Action::TravelRight => "TRAVEL_RIGHT",
            Action::EngineOff => "ENGINE_OFF",
            Action::LockedState => "LOCKED_STATE",
        }
    }

    /// The circuit this action drives, if it moves anything at all.
    pub fn circuit(&self) -> Option<Circuit> {
        match self {
            Action::BoomUp | Action::BoomDown => Some(Circuit::Boom),
            Action::StickIn | Action::StickOut => Some(Circuit::Stick),
            Action::BucketOpen | Action::BucketClose => Some(Circuit::Bucket),
            Action::SwingLeft | Action::SwingRight => Some(Circuit::Swing),
            Action::TravelForward
            | Action::TravelBackward
            | Action::TravelLeft
            | Action::TravelRight => Some(Circuit::Travel),
            Action::Idle | Action::EngineOff | Action::LockedState => None,
        }
    }

    pub fn is_motion(&self) -> bool {
        self.circuit().is_some()
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
