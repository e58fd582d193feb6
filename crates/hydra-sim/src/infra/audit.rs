//! Audit trail of console operations.
//!
//! Ignition changes, latch triggers and latch resets are appended to a JSONL
//! file so a training session can be reviewed afterwards. Stick and pedal
//! movement is not recorded.

use crate::runtime::SessionClock;
use hydra_core::{Action, Channel, ControlObserver, ControlSnapshot, Event};
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::warn;

/// Types of events that are logged in the audit trail
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditEventType {
    SessionStart,
    SessionShutdown,
    EngineStarted,
    EngineStopped,
    /// Latch key pressed while running
    LatchTriggered,
    /// Reset button pressed while running
    LatchReset,
}

/// A single audit log entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    /// Monotonic timestamp in microseconds since session start
    pub timestamp_us: u64,
    /// Wall-clock Unix timestamp in microseconds
    pub unix_us: u64,
    pub event_type: AuditEventType,
    /// Additional event-specific details
    pub details: serde_json::Value,
}

/// Thread-safe audit logger that writes to a JSONL file
pub struct AuditLogger {
    writer: Mutex<BufWriter<File>>,
}

impl AuditLogger {
    /// Create a new audit logger writing to the specified path.
    /// The file is opened in append mode to preserve existing logs.
    pub fn new(path: &Path) -> std::io::Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new().create(true).append(true).open(path)?;

        Ok(Self {
            writer: Mutex::new(BufWriter::with_capacity(8192, file)),
        })
    }

    pub fn log(&self, entry: AuditEntry) -> std::io::Result<()> {
        let mut writer = self
            .writer
            .lock()
            .map_err(|_| std::io::Error::other("audit writer poisoned"))?;
        serde_json::to_writer(&mut *writer, &entry)?;
        writer.write_all(b"\n")?;
        writer.flush()
    }

    pub fn log_event(
        &self,
        timestamp_us: u64,
        unix_us: u64,
        event_type: AuditEventType,
        details: serde_json::Value,
    ) -> std::io::Result<()> {
        self.log(AuditEntry {
            timestamp_us,
            unix_us,
            event_type,
            details,
        })
    }
}

/// Details for a latch trigger
#[derive(Debug, Clone, Serialize)]
pub struct LatchDetails<'a> {
    pub sequence: u64,
    pub locked_channels: &'a [Channel],
    pub actions: &'a [Action],
}

/// Feeds applied console events into an [`AuditLogger`].
pub struct AuditObserver {
    logger: Arc<AuditLogger>,
    clock: SessionClock,
}

impl AuditObserver {
    pub fn new(logger: Arc<AuditLogger>, clock: SessionClock) -> Self {
        Self { logger, clock }
    }

    fn entry_for(event: &Event, snapshot: &ControlSnapshot) -> Option<(AuditEventType, serde_json::Value)> {
        let details = LatchDetails {
            sequence: snapshot.sequence,
            locked_channels: &snapshot.locked_channels,
            actions: &snapshot.actions,
        };
        let event_type = match event {
            Event::Ignition { .. } | Event::ToggleIgnition => {
                if snapshot.state.engine.is_running() {
                    AuditEventType::EngineStarted
                } else {
                    AuditEventType::EngineStopped
                }
            }
            Event::TriggerLatch => AuditEventType::LatchTriggered,
            Event::ResetLatch => AuditEventType::LatchReset,
            Event::Input(_) => return None,
        };
        let details = serde_json::to_value(details).unwrap_or(serde_json::Value::Null);
        Some((event_type, details))
    }
}

impl ControlObserver for AuditObserver {
    fn on_snapshot(&mut self, event: &Event, snapshot: &ControlSnapshot) {
        let Some((event_type, details)) = Self::entry_for(event, snapshot) else {
            return;
        };
        if let Err(e) = self.logger.log_event(
            self.clock.now_us(),
            self.clock.unix_us(),
            event_type,
            details,
        ) {
            warn!(error = %e, "Failed to write audit entry");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hydra_core::{AxisScalar, ChannelUpdate, Controller};
    use std::io::Read;
    use tempfile::tempdir;

    fn read_entries(path: &Path) -> Vec<AuditEntry> {
        let mut content = String::new();
        File::open(path)
            .unwrap()
            .read_to_string(&mut content)
            .unwrap();
        content
            .trim()
            .split('\n')
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[test]
    fn test_audit_logger_writes_jsonl() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("audit.jsonl");

        let logger = AuditLogger::new(&path).unwrap();
        logger
            .log_event(
                1000,
                1704067200000000,
                AuditEventType::SessionStart,
                serde_json::json!({"version": "0.1.0"}),
            )
            .unwrap();
        logger
            .log_event(
                2000,
                1704067201000000,
                AuditEventType::EngineStarted,
                serde_json::json!({"sequence": 1}),
            )
            .unwrap();

        let entries = read_entries(&path);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].timestamp_us, 1000);
        assert_eq!(entries[1].event_type, AuditEventType::EngineStarted);
    }

    #[test]
    fn observer_records_ignition_and_latch_but_not_movement() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("audit.jsonl");
        let logger = Arc::new(AuditLogger::new(&path).unwrap());

        let mut controller = Controller::new();
        controller.subscribe(Box::new(AuditObserver::new(
            Arc::clone(&logger),
            SessionClock::new(),
        )));
        controller.dispatch(&Event::ToggleIgnition);
        controller.dispatch(&Event::Input(ChannelUpdate::LeftPedal(AxisScalar::new(
            0.6,
        ))));
        controller.dispatch(&Event::TriggerLatch);
        controller.dispatch(&Event::ToggleIgnition);

        let entries = read_entries(&path);
        let kinds: Vec<AuditEventType> = entries.iter().map(|e| e.event_type.clone()).collect();
        assert_eq!(
            kinds,
            vec![
                AuditEventType::EngineStarted,
                AuditEventType::LatchTriggered,
                AuditEventType::EngineStopped,
            ]
        );
        assert_eq!(
            entries[1].details["locked_channels"],
            serde_json::json!(["left_pedal"])
        );
        assert_eq!(
            entries[1].details["actions"],
            serde_json::json!(["TRAVEL_LEFT", "LOCKED_STATE"])
        );
        assert_eq!(entries[2].details["locked_channels"], serde_json::json!([]));
    }
}
