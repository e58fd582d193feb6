/// A readout value exported as a gauge, labelled as it is on the schematic.
#[derive(Debug, Clone, Copy)]
pub struct Tag {
    pub metric: &'static str,
    pub schematic_label: &'static str,
}

pub const MAIN_PRESSURE_KPA: Tag = Tag {
    metric: "hydrasim_main_pressure_kpa",
    schematic_label: "PUMP OUTLET P1/P2",
};

pub const BOOM_LINE_KPA: Tag = Tag {
    metric: "hydrasim_boom_line_kpa",
    schematic_label: "LINE A",
};

pub const STICK_LINE_KPA: Tag = Tag {
    metric: "hydrasim_stick_line_kpa",
    schematic_label: "LINE B",
};

pub const SWING_RELIEF_KPA: Tag = Tag {
    metric: "hydrasim_swing_relief_kpa",
    schematic_label: "SWING RELIEF",
};

pub const RETURN_KPA: Tag = Tag {
    metric: "hydrasim_return_kpa",
    schematic_label: "RETURN",
};

pub const ENGINE_LOAD_PCT: Tag = Tag {
    metric: "hydrasim_engine_load_percent",
    schematic_label: "ENGINE LOAD",
};

pub const HYDRAULIC_TEMP_C: Tag = Tag {
    metric: "hydrasim_hydraulic_temperature_celsius",
    schematic_label: "HYDRAULIC TEMP",
};

pub const ENGINE_RUNNING: Tag = Tag {
    metric: "hydrasim_engine_running",
    schematic_label: "IGNITION",
};

pub const LATCHED_CHANNELS: Tag = Tag {
    metric: "hydrasim_latched_channels",
    schematic_label: "ACCUMULATED FLOW",
};
