use hydra_core::{ControlObserver, ControlSnapshot, Event, Outcome};
use hydra_io::metrics::{init_metrics, serve_metrics};
use std::thread;
use tracing::{debug, info};

pub fn init() {
    init_metrics();
}

pub fn start_metrics_server(addr: &Option<String>) -> Option<thread::JoinHandle<()>> {
    addr.as_ref().map(|addr| {
        info!(addr = %addr, "Starting metrics server");
        serve_metrics(addr.clone())
    })
}

/// Logs console changes through `tracing`: ignition and latch changes at
/// info, everything else at debug.
pub struct ConsoleTrace;

impl ControlObserver for ConsoleTrace {
    fn on_snapshot(&mut self, event: &Event, snapshot: &ControlSnapshot) {
        let actions: Vec<&str> = snapshot.actions.iter().map(|a| a.as_str()).collect();
        match event {
            Event::Ignition { .. } | Event::ToggleIgnition => info!(
                sequence = snapshot.sequence,
                engine = snapshot.state.engine.as_str(),
                "Ignition switched"
            ),
            Event::TriggerLatch => info!(
                sequence = snapshot.sequence,
                locked = ?snapshot.locked_channels,
                ?actions,
                "Inputs latched"
            ),
            Event::ResetLatch => info!(sequence = snapshot.sequence, "Latches released"),
            Event::Input(update) => debug!(
                sequence = snapshot.sequence,
                channel = update.channel().as_str(),
                ?actions,
                main_kpa = snapshot.readout.pressures.main_kpa,
                "Input updated"
            ),
        }
    }

    fn on_ignored(&mut self, event: &Event, outcome: Outcome) {
        debug!(event = event.kind(), ?outcome, "Event ignored");
    }
}
