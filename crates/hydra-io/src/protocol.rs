use hydra_core::{
    Action, AxisPair, AxisScalar, Channel, ChannelUpdate, ControlSnapshot, Event, Readout,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Key codes bound to the latch trigger.
pub const LATCH_KEYS: &[&str] = &["Space", "Enter"];

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("malformed message: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("{channel} update is missing `{field}`")]
    MissingComponent {
        channel: &'static str,
        field: &'static str,
    },
    #[error("{channel} does not accept `{field}`")]
    ShapeMismatch {
        channel: &'static str,
        field: &'static str,
    },
}

#[derive(Debug, Deserialize)]
pub struct InputMsg {
    pub channel: Channel,
    #[serde(default)]
    pub x: Option<f64>,
    #[serde(default)]
    pub y: Option<f64>,
    #[serde(default)]
    pub value: Option<f64>,
}

impl InputMsg {
    pub fn to_update(&self) -> Result<ChannelUpdate, ProtocolError> {
        let channel = self.channel.as_str();
        if self.channel.is_stick() {
            if self.value.is_some() {
                return Err(ProtocolError::ShapeMismatch {
                    channel,
                    field: "value",
                });
            }
            let x = self
                .x
                .ok_or(ProtocolError::MissingComponent { channel, field: "x" })?;
            let y = self
                .y
                .ok_or(ProtocolError::MissingComponent { channel, field: "y" })?;
            let pair = AxisPair::new(x, y);
            Ok(match self.channel {
                Channel::LeftStick => ChannelUpdate::LeftStick(pair),
                _ => ChannelUpdate::RightStick(pair),
            })
        } else {
            if let Some(field) = self
                .x
                .map(|_| "x")
                .or_else(|| self.y.map(|_| "y"))
            {
                return Err(ProtocolError::ShapeMismatch { channel, field });
            }
            let value = self.value.ok_or(ProtocolError::MissingComponent {
                channel,
                field: "value",
            })?;
            let scalar = AxisScalar::new(value);
            Ok(match self.channel {
                Channel::LeftPedal => ChannelUpdate::LeftPedal(scalar),
                _ => ChannelUpdate::RightPedal(scalar),
            })
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct KeyMsg {
    pub code: String,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum IncomingMessage {
    Input(InputMsg),
    Key(KeyMsg),
    Reset,
    Ignition { on: bool },
    ToggleIgnition,
}

impl IncomingMessage {
    pub fn parse(line: &str) -> Result<Self, ProtocolError> {
        Ok(serde_json::from_str(line)?)
    }

    /// Translate into a controller event. Keys without a binding yield `None`.
    pub fn into_event(self) -> Result<Option<Event>, ProtocolError> {
        let event = match self {
            IncomingMessage::Input(msg) => Event::Input(msg.to_update()?),
            IncomingMessage::Key(key) => {
                if !LATCH_KEYS.contains(&key.code.as_str()) {
                    return Ok(None);
                }
                Event::TriggerLatch
            }
            IncomingMessage::Reset => Event::ResetLatch,
            IncomingMessage::Ignition { on } => Event::Ignition { on },
            IncomingMessage::ToggleIgnition => Event::ToggleIgnition,
        };
        Ok(Some(event))
    }
}

#[derive(Debug, Serialize)]
pub struct StatusMsg<'a> {
    #[serde(rename = "type")]
    pub msg_type: &'static str,
    pub sequence: u64,
    pub engine_running: bool,
    pub actions: &'a [Action],
    pub locked: bool,
    pub locked_channels: &'a [Channel],
    pub readout: &'a Readout,
}

impl<'a> StatusMsg<'a> {
    pub fn from_snapshot(snapshot: &'a ControlSnapshot) -> Self {
        Self {
            msg_type: "status",
            sequence: snapshot.sequence,
            engine_running: snapshot.state.engine.is_running(),
            actions: &snapshot.actions,
            locked: snapshot.locked,
            locked_channels: &snapshot.locked_channels,
            readout: &snapshot.readout,
        }
    }

    pub fn to_line(&self) -> Result<String, ProtocolError> {
        let mut line = serde_json::to_string(self)?;
        line.push('\n');
        Ok(line)
    }
}
