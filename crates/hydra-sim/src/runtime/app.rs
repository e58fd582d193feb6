use crate::infra::audit::{AuditEventType, AuditLogger, AuditObserver};
use crate::runtime::clock::SessionClock;
use crate::runtime::config::RuntimeConfig;
use crate::runtime::logging::init_tracing;
use crate::runtime::script::run_script;
use crate::runtime::telemetry::{self, ConsoleTrace};
use hydra_core::Controller;
use hydra_io::bridge::{Bridge, BridgeConfig, BridgeError};
use hydra_io::MetricsObserver;
use std::fs::File;
use std::io::{self, BufReader};
use std::path::PathBuf;
use std::sync::{atomic::AtomicBool, Arc};
use std::thread;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Bridge(#[from] BridgeError),
    #[error("audit log {path}: {source}")]
    Audit {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("script {path}: {source}")]
    Script {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("stdin/stdout: {0}")]
    Io(#[from] io::Error),
}

pub fn run_from_args() -> Result<(), AppError> {
    let config = RuntimeConfig::from_env();
    if config.show_help {
        RuntimeConfig::print_help();
        return Ok(());
    }
    run(config)
}

pub fn run(config: RuntimeConfig) -> Result<(), AppError> {
    let _log_guard = init_tracing(config.json_logs, config.log_dir.as_deref());

    telemetry::init();
    let metrics_enabled = config.metrics_addr.is_some();
    let _metrics_handle = telemetry::start_metrics_server(&config.metrics_addr);

    let clock = SessionClock::new();
    let audit_logger = init_audit_logger(config.audit_path.as_ref())?;

    if let Some(ref logger) = audit_logger {
        audit_session(
            logger,
            &clock,
            AuditEventType::SessionStart,
            serde_json::json!({
                "version": env!("CARGO_PKG_VERSION"),
                "bridge_enabled": config.bridge_enabled,
                "metrics_enabled": metrics_enabled,
            }),
        );
    }

    let mut controller = Controller::new();
    controller.subscribe(Box::new(MetricsObserver));
    controller.subscribe(Box::new(ConsoleTrace));
    if let Some(ref logger) = audit_logger {
        controller.subscribe(Box::new(AuditObserver::new(Arc::clone(logger), clock)));
    }

    let stop = Arc::new(AtomicBool::new(false));
    if let Some(seconds) = config.run_seconds {
        info!(seconds, "Running for limited duration");
        let stop_timer = Arc::clone(&stop);
        thread::spawn(move || {
            thread::sleep(Duration::from_secs(seconds));
            stop_timer.store(true, std::sync::atomic::Ordering::Relaxed);
        });
    }

    if config.bridge_enabled {
        let bridge = Bridge::bind(BridgeConfig {
            bind_addr: config.bind_addr.clone(),
            ..Default::default()
        })?;
        info!("HydraSim running. Connect a console client to send events.");
        bridge.run(&mut controller, &stop)?;
    } else {
        let stdout = io::stdout().lock();
        let stats = match &config.script_path {
            Some(path) => {
                info!(path = %path.display(), "Replaying script");
                let file = File::open(path).map_err(|source| AppError::Script {
                    path: path.clone(),
                    source,
                })?;
                run_script(BufReader::new(file), stdout, &mut controller, &stop)
            }
            None => {
                info!("Reading events from stdin");
                run_script(io::stdin().lock(), stdout, &mut controller, &stop)
            }
        }?;
        info!(
            lines_read = stats.lines_read,
            statuses_written = stats.statuses_written,
            rejected = stats.rejected,
            "Script complete"
        );
    }

    let stats = controller.stats().clone();
    info!(
        events_applied = stats.events_applied,
        events_ignored = stats.events_ignored,
        latch_triggers = stats.latch_triggers,
        latch_resets = stats.latch_resets,
        "Session complete"
    );

    if let Some(ref logger) = audit_logger {
        audit_session(
            logger,
            &clock,
            AuditEventType::SessionShutdown,
            serde_json::json!({
                "events_applied": stats.events_applied,
                "events_ignored": stats.events_ignored,
                "latch_triggers": stats.latch_triggers,
            }),
        );
    }
    Ok(())
}

/// Write a session lifecycle entry. A failed write is logged and the session
/// carries on; returns whether the entry was written.
fn audit_session(
    logger: &AuditLogger,
    clock: &SessionClock,
    event_type: AuditEventType,
    details: serde_json::Value,
) -> bool {
    match logger.log_event(clock.now_us(), clock.unix_us(), event_type.clone(), details) {
        Ok(()) => true,
        Err(e) => {
            warn!(error = %e, event = ?event_type, "Failed to write session audit entry");
            false
        }
    }
}

fn init_audit_logger(audit_path: Option<&PathBuf>) -> Result<Option<Arc<AuditLogger>>, AppError> {
    let Some(path) = audit_path else {
        return Ok(None);
    };
    match AuditLogger::new(path) {
        Ok(logger) => {
            info!(path = %path.display(), "Audit logging enabled");
            Ok(Some(Arc::new(logger)))
        }
        Err(source) => {
            warn!(error = %source, path = %path.display(), "Failed to initialize audit logger");
            Err(AppError::Audit {
                path: path.clone(),
                source,
            })
        }
    }
}
