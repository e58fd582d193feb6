use std::io::{BufRead, BufReader, Write};
use std::net::{TcpListener, TcpStream};
use std::process::{Child, Command, Stdio};
use std::thread;
use std::time::Duration;

const SIM_BIN: &str = env!("CARGO_BIN_EXE_hydra-sim");

struct SimProcess {
    child: Child,
    addr: String,
}

impl SimProcess {
    fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .expect("Failed to bind ephemeral port for integration test");
        let addr = listener
            .local_addr()
            .expect("Failed to resolve bound address");
        let bind_addr = format!("127.0.0.1:{}", addr.port());
        drop(listener);

        let child = Command::new(SIM_BIN)
            .args(["--bind", &bind_addr])
            .stderr(Stdio::null())
            .spawn()
            .expect("Failed to start hydra-sim");

        // Loop until port is open (up to 5s)
        let start = std::time::Instant::now();
        while start.elapsed().as_secs() < 5 {
            if TcpStream::connect(&bind_addr).is_ok() {
                break;
            }
            thread::sleep(Duration::from_millis(100));
        }

        Self {
            child,
            addr: bind_addr,
        }
    }

    fn addr(&self) -> &str {
        &self.addr
    }
}

impl Drop for SimProcess {
    fn drop(&mut self) {
        let _ = self.child.kill();
    }
}

// The bridge serves one client at a time; the readiness probe above must be
// closed before this connection is accepted.
fn connect(sim: &SimProcess) -> (TcpStream, BufReader<TcpStream>) {
    let stream = TcpStream::connect(sim.addr()).expect("Failed to connect to hydra-sim");
    stream
        .set_read_timeout(Some(Duration::from_secs(5)))
        .unwrap();
    let reader = BufReader::new(stream.try_clone().unwrap());
    (stream, reader)
}

fn next_status(reader: &mut BufReader<TcpStream>) -> serde_json::Value {
    let mut line = String::new();
    reader.read_line(&mut line).unwrap();
    let value: serde_json::Value = serde_json::from_str(&line).unwrap();
    assert_eq!(value["type"], "status");
    value
}

#[test]
fn test_boom_up_over_bridge() {
    let sim = SimProcess::start();
    let (mut stream, mut reader) = connect(&sim);

    let initial = next_status(&mut reader);
    assert_eq!(initial["engine_running"], false);
    assert_eq!(initial["actions"], serde_json::json!(["ENGINE_OFF"]));
    assert_eq!(initial["readout"]["pressures"]["main_kpa"], 0);

    writeln!(stream, r#"{{"type":"toggle_ignition"}}"#).unwrap();
    let running = next_status(&mut reader);
    assert_eq!(running["engine_running"], true);

    writeln!(
        stream,
        r#"{{"type":"input","channel":"right_stick","x":0.0,"y":0.5}}"#
    )
    .unwrap();
    let boom = next_status(&mut reader);
    assert_eq!(boom["actions"], serde_json::json!(["BOOM_UP"]));
    assert_eq!(boom["readout"]["pressures"]["boom_line_kpa"], 34300);
    assert_eq!(
        boom["readout"]["lit_sections"],
        serde_json::json!(["BOOM_1", "BOOM_2"])
    );
    assert!(boom["sequence"].as_u64().unwrap() > running["sequence"].as_u64().unwrap());
}

#[test]
fn test_ignition_off_releases_latches() {
    let sim = SimProcess::start();
    let (mut stream, mut reader) = connect(&sim);
    let _initial = next_status(&mut reader);

    for line in [
        r#"{"type":"ignition","on":true}"#,
        r#"{"type":"input","channel":"left_pedal","value":-0.8}"#,
        r#"{"type":"input","channel":"right_pedal","value":-0.8}"#,
        r#"{"type":"key","code":"Space"}"#,
    ] {
        writeln!(stream, "{}", line).unwrap();
        let _ = next_status(&mut reader);
    }

    writeln!(stream, r#"{{"type":"ignition","on":false}}"#).unwrap();
    let stopped = next_status(&mut reader);
    assert_eq!(stopped["actions"], serde_json::json!(["ENGINE_OFF"]));
    assert_eq!(stopped["locked"], false);

    writeln!(stream, r#"{{"type":"ignition","on":true}}"#).unwrap();
    let restarted = next_status(&mut reader);
    assert_eq!(restarted["actions"], serde_json::json!(["IDLE"]));
    assert_eq!(restarted["readout"]["left_pedal"], "NEU");
}

#[test]
fn test_stdin_script_mode() {
    let mut child = Command::new(SIM_BIN)
        .arg("--no-bridge")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("Failed to start hydra-sim");

    {
        let mut stdin = child.stdin.take().unwrap();
        writeln!(stdin, r#"{{"type":"ignition","on":true}}"#).unwrap();
        writeln!(
            stdin,
            r#"{{"type":"input","channel":"left_stick","x":-0.5,"y":0.5}}"#
        )
        .unwrap();
    }

    let output = child.wait_with_output().unwrap();
    assert!(output.status.success());

    let text = String::from_utf8(output.stdout).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 2);
    let last: serde_json::Value = serde_json::from_str(lines[1]).unwrap();
    assert_eq!(last["actions"], serde_json::json!(["SWING_LEFT", "STICK_IN"]));
}
