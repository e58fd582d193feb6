//! Gauge values and schematic highlights derived from the active actions.
//!
//! None of these numbers come from a hydraulic model. Each one is a fixed
//! display constant picked by which circuits are moving, matching the relief
//! settings printed on the machine's schematic.

use crate::action::{Action, Circuit};
use crate::engine::{ControlState, EngineState};
use crate::input::AxisScalar;
use crate::latch::DEADZONE;
use serde::Serialize;

/// Main relief setting, reached whenever a circuit is working.
pub const MAIN_RELIEF_KPA: u32 = 34_300;
pub const SWING_RELIEF_KPA: u32 = 24_500;
/// Pilot/standby pressure with the engine running and nothing moving.
pub const STANDBY_KPA: u32 = 3_900;
pub const RETURN_ACTIVE_KPA: u32 = 450;
pub const RETURN_IDLE_KPA: u32 = 120;
pub const HYDRAULIC_TEMP_C: u32 = 62;
pub const ENGINE_LOAD_ACTIVE_PCT: u32 = 82;
pub const ENGINE_LOAD_IDLE_PCT: u32 = 18;

/// Spool sections of the main control valve, in block order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValveSection {
    TravelRight,
    Boom1,
    Bucket,
    Boom2,
    Swing,
    Stick1,
    Stick2,
    TravelLeft,
}

impl ValveSection {
    pub const BLOCK_ORDER: [ValveSection; 8] = [
        ValveSection::TravelRight,
        ValveSection::Boom1,
        ValveSection::Bucket,
        ValveSection::Boom2,
        ValveSection::Swing,
        ValveSection::Stick1,
        ValveSection::Stick2,
        ValveSection::TravelLeft,
    ];

    pub fn circuit(&self) -> Circuit {
        match self {
            ValveSection::TravelRight | ValveSection::TravelLeft => Circuit::Travel,
            ValveSection::Boom1 | ValveSection::Boom2 => Circuit::Boom,
            ValveSection::Bucket => Circuit::Bucket,
            ValveSection::Swing => Circuit::Swing,
            ValveSection::Stick1 | ValveSection::Stick2 => Circuit::Stick,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowPath {
    PumpP1ToValve,
    PumpP2ToValve,
    ValveToBoom,
    ValveToStick,
    ValveToSwing,
    ReturnToReservoir,
}

/// Catalogued machine components, shown in the technical data panel while
/// their circuit is working.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MachineComponent {
    MainPump,
    MainControlValve,
    HydraulicTank,
    BoomCylinder,
    SwingMotor,
}

impl MachineComponent {
    /// Catalogue order.
    pub const ALL: [MachineComponent; 5] = [
        MachineComponent::MainPump,
        MachineComponent::MainControlValve,
        MachineComponent::HydraulicTank,
        MachineComponent::BoomCylinder,
        MachineComponent::SwingMotor,
    ];

    /// Item number on the machine location diagram.
    pub fn item(&self) -> u8 {
        match self {
            MachineComponent::MainPump => 17,
            MachineComponent::MainControlValve => 30,
            MachineComponent::HydraulicTank => 24,
            MachineComponent::BoomCylinder => 7,
            MachineComponent::SwingMotor => 16,
        }
    }

    // Pump, valve and tank are always on duty while running. The stick
    // cylinder has no catalogue entry, so stick motion lists nothing extra.
    fn in_duty(&self, active: &impl Fn(Circuit) -> bool) -> bool {
        match self {
            MachineComponent::MainPump
            | MachineComponent::MainControlValve
            | MachineComponent::HydraulicTank => true,
            MachineComponent::BoomCylinder => active(Circuit::Boom),
            MachineComponent::SwingMotor => active(Circuit::Swing),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PedalIndicator {
    Fwd,
    Rev,
    Neu,
}

impl PedalIndicator {
    pub fn from_axis(axis: AxisScalar) -> Self {
        let v = axis.value();
        if v > DEADZONE {
            PedalIndicator::Fwd
        } else if v < -DEADZONE {
            PedalIndicator::Rev
        } else {
            PedalIndicator::Neu
        }
    }
}

/// Pressure badges on the schematic, in kPa.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Pressures {
    /// Pump P1/P2 outlets and the parallel gallery.
    pub main_kpa: u32,
    pub boom_line_kpa: u32,
    pub stick_line_kpa: u32,
    pub swing_relief_kpa: u32,
    pub return_kpa: u32,
}

/// Header strip: main pressure, oil temperature and engine load bar.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusGauges {
    pub main_pressure_kpa: u32,
    pub hydraulic_temp_c: Option<u32>,
    pub engine_load_pct: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Readout {
    pub status: StatusGauges,
    pub pressures: Pressures,
    pub active_circuits: Vec<Circuit>,
    pub lit_sections: Vec<ValveSection>,
    pub flow_paths: Vec<FlowPath>,
    pub active_components: Vec<MachineComponent>,
    pub left_pedal: PedalIndicator,
    pub right_pedal: PedalIndicator,
}

impl Readout {
    pub fn derive(state: &ControlState, actions: &[Action]) -> Self {
        let running = state.engine == EngineState::Running;
        let effective = state.latch.effective(&state.input);

        let active_circuits = active_circuits(actions);
        let active = |c: Circuit| active_circuits.contains(&c);
        let motion = actions.iter().any(Action::is_motion);

        Self {
            status: status_gauges(running, actions),
            pressures: pressures(running, motion, &active),
            lit_sections: ValveSection::BLOCK_ORDER
                .into_iter()
                .filter(|s| active(s.circuit()))
                .collect(),
            flow_paths: flow_paths(running, motion, &active),
            active_components: active_components(running, &active),
            left_pedal: PedalIndicator::from_axis(effective.left_pedal),
            right_pedal: PedalIndicator::from_axis(effective.right_pedal),
            active_circuits,
        }
    }
}

fn active_circuits(actions: &[Action]) -> Vec<Circuit> {
    let mut circuits = Vec::new();
    for circuit in actions.iter().filter_map(Action::circuit) {
        if !circuits.contains(&circuit) {
            circuits.push(circuit);
        }
    }
    circuits
}

// The header counts the lock marker as activity, the schematic does not.
fn status_gauges(running: bool, actions: &[Action]) -> StatusGauges {
    if !running {
        return StatusGauges::default();
    }
    let busy = actions
        .iter()
        .any(|a| !matches!(a, Action::Idle | Action::EngineOff));
    StatusGauges {
        main_pressure_kpa: if busy { MAIN_RELIEF_KPA } else { STANDBY_KPA },
        hydraulic_temp_c: Some(HYDRAULIC_TEMP_C),
        engine_load_pct: if busy {
            ENGINE_LOAD_ACTIVE_PCT
        } else {
            ENGINE_LOAD_IDLE_PCT
        },
    }
}

fn pressures(running: bool, motion: bool, active: &impl Fn(Circuit) -> bool) -> Pressures {
    if !running {
        return Pressures::default();
    }
    let line = |working: bool, relief: u32| if working { relief } else { STANDBY_KPA };
    Pressures {
        main_kpa: line(motion, MAIN_RELIEF_KPA),
        boom_line_kpa: line(active(Circuit::Boom), MAIN_RELIEF_KPA),
        stick_line_kpa: line(active(Circuit::Stick), MAIN_RELIEF_KPA),
        swing_relief_kpa: line(active(Circuit::Swing), SWING_RELIEF_KPA),
        return_kpa: if motion {
            RETURN_ACTIVE_KPA
        } else {
            RETURN_IDLE_KPA
        },
    }
}

fn active_components(running: bool, active: &impl Fn(Circuit) -> bool) -> Vec<MachineComponent> {
    if !running {
        return Vec::new();
    }
    MachineComponent::ALL
        .into_iter()
        .filter(|c| c.in_duty(active))
        .collect()
}

fn flow_paths(running: bool, motion: bool, active: &impl Fn(Circuit) -> bool) -> Vec<FlowPath> {
    let mut paths = Vec::new();
    if running {
        paths.push(FlowPath::PumpP1ToValve);
        paths.push(FlowPath::PumpP2ToValve);
    }
    if active(Circuit::Boom) {
        paths.push(FlowPath::ValveToBoom);
    }
    if active(Circuit::Stick) {
        paths.push(FlowPath::ValveToStick);
    }
    if active(Circuit::Swing) {
        paths.push(FlowPath::ValveToSwing);
    }
    if running && motion {
        paths.push(FlowPath::ReturnToReservoir);
    }
    paths
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Event;
    use crate::input::{AxisPair, ChannelUpdate};
    use crate::resolver::resolve;

    fn readout_for(events: &[Event]) -> Readout {
        let state = events
            .iter()
            .fold(ControlState::new(), |s, e| s.reduce(e).state);
        let actions = resolve(&state.input, &state.latch, state.engine);
        Readout::derive(&state, &actions)
    }

    #[test]
    fn engine_off_reads_zero_everywhere() {
        let r = readout_for(&[]);
        assert_eq!(r.pressures, Pressures::default());
        assert_eq!(r.status.hydraulic_temp_c, None);
        assert_eq!(r.status.engine_load_pct, 0);
        assert!(r.lit_sections.is_empty());
        assert!(r.flow_paths.is_empty());
        assert!(r.active_components.is_empty());
    }

    #[test]
    fn idle_sits_at_standby() {
        let r = readout_for(&[Event::Ignition { on: true }]);
        assert_eq!(r.status.main_pressure_kpa, STANDBY_KPA);
        assert_eq!(r.status.engine_load_pct, ENGINE_LOAD_IDLE_PCT);
        assert_eq!(r.pressures.return_kpa, RETURN_IDLE_KPA);
        assert_eq!(
            r.flow_paths,
            vec![FlowPath::PumpP1ToValve, FlowPath::PumpP2ToValve]
        );
    }

    #[test]
    fn swing_uses_its_own_relief() {
        let r = readout_for(&[
            Event::Ignition { on: true },
            Event::Input(ChannelUpdate::LeftStick(AxisPair::new(-0.8, 0.0))),
        ]);
        assert_eq!(r.pressures.swing_relief_kpa, SWING_RELIEF_KPA);
        assert_eq!(r.pressures.boom_line_kpa, STANDBY_KPA);
        assert_eq!(r.pressures.main_kpa, MAIN_RELIEF_KPA);
        assert_eq!(r.lit_sections, vec![ValveSection::Swing]);
        assert!(r.flow_paths.contains(&FlowPath::ReturnToReservoir));
    }

    #[test]
    fn component_panel_follows_boom_and_swing() {
        let idle = readout_for(&[Event::Ignition { on: true }]);
        assert_eq!(
            idle.active_components,
            vec![
                MachineComponent::MainPump,
                MachineComponent::MainControlValve,
                MachineComponent::HydraulicTank,
            ]
        );

        let r = readout_for(&[
            Event::Ignition { on: true },
            Event::Input(ChannelUpdate::LeftStick(AxisPair::new(0.8, 0.0))),
            Event::Input(ChannelUpdate::RightStick(AxisPair::new(0.0, -0.8))),
        ]);
        let items: Vec<u8> = r.active_components.iter().map(|c| c.item()).collect();
        assert_eq!(items, vec![17, 30, 24, 7, 16]);
    }

    #[test]
    fn stick_motion_adds_no_component() {
        let r = readout_for(&[
            Event::Ignition { on: true },
            Event::Input(ChannelUpdate::LeftStick(AxisPair::new(0.0, 0.9))),
        ]);
        assert!(r.lit_sections.contains(&ValveSection::Stick1));
        assert_eq!(r.active_components.len(), 3);
        assert!(!r.active_components.contains(&MachineComponent::BoomCylinder));
    }

    #[test]
    fn travel_lights_both_track_sections() {
        let r = readout_for(&[
            Event::Ignition { on: true },
            Event::Input(ChannelUpdate::LeftPedal(AxisScalar::new(0.9))),
        ]);
        assert_eq!(
            r.lit_sections,
            vec![ValveSection::TravelRight, ValveSection::TravelLeft]
        );
        assert_eq!(r.left_pedal, PedalIndicator::Fwd);
        assert_eq!(r.right_pedal, PedalIndicator::Neu);
    }

    #[test]
    fn lock_marker_loads_header_but_not_schematic() {
        let r = readout_for(&[
            Event::Ignition { on: true },
            Event::Input(ChannelUpdate::RightPedal(AxisScalar::new(-0.2))),
            Event::TriggerLatch,
            Event::Input(ChannelUpdate::RightPedal(AxisScalar::new(0.0))),
        ]);
        assert_eq!(r.status.main_pressure_kpa, MAIN_RELIEF_KPA);
        assert_eq!(r.status.engine_load_pct, ENGINE_LOAD_ACTIVE_PCT);
        assert_eq!(r.pressures.main_kpa, STANDBY_KPA);
        assert_eq!(r.right_pedal, PedalIndicator::Rev);
    }
}
