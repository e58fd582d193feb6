use hydra_core::Controller;
use hydra_io::bridge::handle_line;
use hydra_io::metrics::{PROTOCOL_ERRORS, SESSIONS_STARTED};
use std::io::{BufRead, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{info, warn};

#[derive(Debug, Default, Clone, Copy)]
pub struct ScriptStats {
    pub lines_read: u64,
    pub statuses_written: u64,
    pub rejected: u64,
}

/// Replay newline-delimited events and write one status line per applied
/// event. Bad lines are logged and skipped.
pub fn run_script<R: BufRead, W: Write>(
    input: R,
    mut output: W,
    controller: &mut Controller,
    stop: &AtomicBool,
) -> std::io::Result<ScriptStats> {
    SESSIONS_STARTED.inc();
    let mut stats = ScriptStats::default();

    for (index, line) in input.lines().enumerate() {
        if stop.load(Ordering::Relaxed) {
            info!(line = index + 1, "Script interrupted");
            break;
        }
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        stats.lines_read += 1;

        match handle_line(controller, trimmed) {
            Ok(Some(status)) => {
                output.write_all(status.as_bytes())?;
                stats.statuses_written += 1;
            }
            Ok(None) => {}
            Err(e) => {
                warn!(line = index + 1, error = %e, "Rejected script line");
                PROTOCOL_ERRORS.inc();
                stats.rejected += 1;
            }
        }
    }

    output.flush()?;
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replays_boom_and_travel_session() {
        let script = r#"
# start the machine and raise the boom
{"type":"ignition","on":true}
{"type":"input","channel":"right_stick","x":0.0,"y":0.5}
{"type":"input","channel":"left_pedal","value":0.5}
{"type":"input","channel":"right_pedal","value":0.5}
not json
{"type":"key","code":"KeyQ"}
"#;
        let mut out = Vec::new();
        let mut controller = Controller::new();
        let stats = run_script(
            script.as_bytes(),
            &mut out,
            &mut controller,
            &AtomicBool::new(false),
        )
        .unwrap();

        assert_eq!(stats.lines_read, 6);
        assert_eq!(stats.statuses_written, 4);
        assert_eq!(stats.rejected, 1);

        let text = String::from_utf8(out).unwrap();
        let last: serde_json::Value =
            serde_json::from_str(text.lines().last().unwrap()).unwrap();
        assert_eq!(
            last["actions"],
            serde_json::json!(["BOOM_UP", "TRAVEL_FORWARD"])
        );
    }
}
