//! Prometheus metrics for the excavator console.
//!
//! Gauges mirror the schematic readouts after every applied event; counters
//! track event traffic through the controller.

use hydra_core::{tags, Action, ControlObserver, ControlSnapshot, Event, Outcome};
use prometheus::{Encoder, Gauge, IntCounter, IntGaugeVec, Opts, Registry, TextEncoder};
use std::sync::LazyLock;
use std::thread;
use tiny_http::{Response, Server};

/// Global metrics registry
pub static REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

// ============================================================================
// Event Metrics
// ============================================================================

/// Console events applied by the controller
pub static EVENTS_APPLIED: LazyLock<IntCounter> = LazyLock::new(|| {
    let counter = IntCounter::new(
        "hydrasim_events_applied_total",
        "Console events applied by the controller",
    )
    .unwrap();
    REGISTRY.register(Box::new(counter.clone())).unwrap();
    counter
});

/// Console events ignored (engine off, redundant ignition)
pub static EVENTS_IGNORED: LazyLock<IntCounter> = LazyLock::new(|| {
    let counter = IntCounter::new(
        "hydrasim_events_ignored_total",
        "Console events ignored because the controls were disabled",
    )
    .unwrap();
    REGISTRY.register(Box::new(counter.clone())).unwrap();
    counter
});

pub static LATCH_TRIGGERS: LazyLock<IntCounter> = LazyLock::new(|| {
    let counter = IntCounter::new(
        "hydrasim_latch_triggers_total",
        "Latch trigger key presses accepted",
    )
    .unwrap();
    REGISTRY.register(Box::new(counter.clone())).unwrap();
    counter
});

/// Lines that failed to parse or had the wrong channel shape
pub static PROTOCOL_ERRORS: LazyLock<IntCounter> = LazyLock::new(|| {
    let counter = IntCounter::new(
        "hydrasim_protocol_errors_total",
        "Incoming lines rejected by the protocol parser",
    )
    .unwrap();
    REGISTRY.register(Box::new(counter.clone())).unwrap();
    counter
});

/// Controller sessions started (bridge or script)
pub static SESSIONS_STARTED: LazyLock<IntCounter> = LazyLock::new(|| {
    let counter = IntCounter::new(
        "hydrasim_sessions_started_total",
        "Controller sessions started",
    )
    .unwrap();
    REGISTRY.register(Box::new(counter.clone())).unwrap();
    counter
});

// ============================================================================
// Readout Metrics
// ============================================================================

fn readout_gauge(tag: tags::Tag, help: &str) -> Gauge {
    let help = format!("{} [{}]", help, tag.schematic_label);
    let gauge = Gauge::new(tag.metric, help).unwrap();
    REGISTRY.register(Box::new(gauge.clone())).unwrap();
    gauge
}

pub static MAIN_PRESSURE_KPA: LazyLock<Gauge> = LazyLock::new(|| {
    readout_gauge(
        tags::MAIN_PRESSURE_KPA,
        "Pump outlet and parallel gallery pressure in kPa",
    )
});

pub static BOOM_LINE_KPA: LazyLock<Gauge> =
    LazyLock::new(|| readout_gauge(tags::BOOM_LINE_KPA, "Boom cylinder line pressure in kPa"));

pub static STICK_LINE_KPA: LazyLock<Gauge> =
    LazyLock::new(|| readout_gauge(tags::STICK_LINE_KPA, "Stick cylinder line pressure in kPa"));

pub static SWING_RELIEF_KPA: LazyLock<Gauge> =
    LazyLock::new(|| readout_gauge(tags::SWING_RELIEF_KPA, "Swing motor relief pressure in kPa"));

pub static RETURN_KPA: LazyLock<Gauge> =
    LazyLock::new(|| readout_gauge(tags::RETURN_KPA, "Return line pressure in kPa"));

pub static ENGINE_LOAD_PCT: LazyLock<Gauge> =
    LazyLock::new(|| readout_gauge(tags::ENGINE_LOAD_PCT, "Engine load in percent"));

pub static HYDRAULIC_TEMP_C: LazyLock<Gauge> = LazyLock::new(|| {
    readout_gauge(
        tags::HYDRAULIC_TEMP_C,
        "Hydraulic oil temperature in Celsius (0 when stopped)",
    )
});

/// Ignition state (1 = running, 0 = stopped)
pub static ENGINE_RUNNING: LazyLock<Gauge> =
    LazyLock::new(|| readout_gauge(tags::ENGINE_RUNNING, "Engine state (1=running, 0=stopped)"));

pub static LATCHED_CHANNELS: LazyLock<Gauge> = LazyLock::new(|| {
    readout_gauge(
        tags::LATCHED_CHANNELS,
        "Number of input channels currently latched",
    )
});

/// One series per action, 1 while the action is active
pub static ACTIVE_ACTIONS: LazyLock<IntGaugeVec> = LazyLock::new(|| {
    let gauge = IntGaugeVec::new(
        Opts::new("hydrasim_action_active", "Resolved action state (1=active)"),
        &["action"],
    )
    .unwrap();
    REGISTRY.register(Box::new(gauge.clone())).unwrap();
    gauge
});

/// Bridge client connection status (1 = connected, 0 = disconnected)
pub static BRIDGE_CONNECTED: LazyLock<Gauge> = LazyLock::new(|| {
    let gauge = Gauge::new(
        "hydrasim_bridge_connected",
        "Bridge client connection status (1=connected, 0=disconnected)",
    )
    .unwrap();
    REGISTRY.register(Box::new(gauge.clone())).unwrap();
    gauge
});

/// Copy each snapshot into the registry.
pub struct MetricsObserver;

impl ControlObserver for MetricsObserver {
    fn on_attach(&mut self, snapshot: &ControlSnapshot) {
        record_snapshot(snapshot);
    }

    fn on_snapshot(&mut self, event: &Event, snapshot: &ControlSnapshot) {
        EVENTS_APPLIED.inc();
        if matches!(event, Event::TriggerLatch) {
            LATCH_TRIGGERS.inc();
        }
        record_snapshot(snapshot);
    }

    fn on_ignored(&mut self, _event: &Event, _outcome: Outcome) {
        EVENTS_IGNORED.inc();
    }
}

pub fn record_snapshot(snapshot: &ControlSnapshot) {
    let readout = &snapshot.readout;
    MAIN_PRESSURE_KPA.set(readout.pressures.main_kpa as f64);
    BOOM_LINE_KPA.set(readout.pressures.boom_line_kpa as f64);
    STICK_LINE_KPA.set(readout.pressures.stick_line_kpa as f64);
    SWING_RELIEF_KPA.set(readout.pressures.swing_relief_kpa as f64);
    RETURN_KPA.set(readout.pressures.return_kpa as f64);
    ENGINE_LOAD_PCT.set(readout.status.engine_load_pct as f64);
    HYDRAULIC_TEMP_C.set(readout.status.hydraulic_temp_c.unwrap_or(0) as f64);
    ENGINE_RUNNING.set(if snapshot.state.engine.is_running() {
        1.0
    } else {
        0.0
    });
    LATCHED_CHANNELS.set(snapshot.locked_channels.len() as f64);

    for action in Action::ALL {
        let active = snapshot.actions.contains(&action);
        ACTIVE_ACTIONS
            .with_label_values(&[action.as_str()])
            .set(i64::from(active));
    }
}

/// Render the registry in the Prometheus text format.
pub fn encode_metrics() -> Result<Vec<u8>, prometheus::Error> {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    encoder.encode(&REGISTRY.gather(), &mut buffer)?;
    Ok(buffer)
}

// ============================================================================
// Metrics HTTP Server
// ============================================================================

/// Start the metrics HTTP server on the given address.
/// Returns a join handle for the server thread.
pub fn serve_metrics(bind_addr: String) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        let server = match Server::http(&bind_addr) {
            Ok(s) => s,
            Err(e) => {
                tracing::error!("Failed to start metrics server on {}: {}", bind_addr, e);
                return;
            }
        };

        tracing::info!("Metrics server listening on http://{}/metrics", bind_addr);

        for request in server.incoming_requests() {
            let path = request.url();

            match path {
                "/metrics" => {
                    let buffer = match encode_metrics() {
                        Ok(b) => b,
                        Err(e) => {
                            tracing::warn!("Failed to encode metrics: {}", e);
                            let _ = request.respond(
                                Response::from_string("Internal Server Error")
                                    .with_status_code(500),
                            );
                            continue;
                        }
                    };

                    let mut response = Response::from_data(buffer);
                    if let Ok(header) = tiny_http::Header::from_bytes(
                        &b"Content-Type"[..],
                        &b"text/plain; version=0.0.4"[..],
                    ) {
                        response = response.with_header(header);
                    }
                    let _ = request.respond(response);
                }
                "/health" => {
                    let _ = request.respond(Response::from_string("OK"));
                }
                "/ready" => {
                    // Ready once a controller session is accepting events
                    if SESSIONS_STARTED.get() > 0 {
                        let _ = request.respond(Response::from_string("Ready"));
                    } else {
                        let _ = request
                            .respond(Response::from_string("Not Ready").with_status_code(503));
                    }
                }
                _ => {
                    let _ =
                        request.respond(Response::from_string("Not Found").with_status_code(404));
                }
            }
        }
    })
}

/// Initialize all metrics (forces lazy initialization)
pub fn init_metrics() {
    let _ = EVENTS_APPLIED.get();
    let _ = EVENTS_IGNORED.get();
    let _ = LATCH_TRIGGERS.get();
    let _ = PROTOCOL_ERRORS.get();
    let _ = SESSIONS_STARTED.get();
    let _ = MAIN_PRESSURE_KPA.get();
    let _ = BOOM_LINE_KPA.get();
    let _ = STICK_LINE_KPA.get();
    let _ = SWING_RELIEF_KPA.get();
    let _ = RETURN_KPA.get();
    let _ = ENGINE_LOAD_PCT.get();
    let _ = HYDRAULIC_TEMP_C.get();
    let _ = ENGINE_RUNNING.get();
    let _ = LATCHED_CHANNELS.get();
    let _ = BRIDGE_CONNECTED.get();
    for action in Action::ALL {
        let _ = ACTIVE_ACTIONS.with_label_values(&[action.as_str()]);
    }
}
