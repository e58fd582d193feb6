use hydra_core::Controller;
use hydra_io::{Bridge, BridgeConfig};
use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpStream;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

fn read_status(reader: &mut BufReader<TcpStream>) -> serde_json::Value {
    let mut line = String::new();
    reader.read_line(&mut line).expect("status line");
    serde_json::from_str(&line).expect("status should be JSON")
}

#[test]
fn latch_session_over_tcp() {
    let bridge = Bridge::bind(BridgeConfig {
        bind_addr: "127.0.0.1:0".to_string(),
        ..Default::default()
    })
    .expect("bind ephemeral port");
    let addr = bridge.local_addr().unwrap();

    let stop = Arc::new(AtomicBool::new(false));
    let stop_bridge = Arc::clone(&stop);
    let handle = thread::spawn(move || {
        let mut controller = Controller::new();
        bridge.run(&mut controller, &stop_bridge)
    });

    let mut stream = TcpStream::connect(addr).expect("connect to bridge");
    stream
        .set_read_timeout(Some(Duration::from_secs(5)))
        .unwrap();
    let mut reader = BufReader::new(stream.try_clone().unwrap());

    let initial = read_status(&mut reader);
    assert_eq!(initial["sequence"], 0);
    assert_eq!(initial["actions"], serde_json::json!(["ENGINE_OFF"]));

    // Ignored while the engine is off: produces no status line.
    writeln!(stream, r#"{{"type":"key","code":"Space"}}"#).unwrap();
    writeln!(stream, r#"{{"type":"ignition","on":true}}"#).unwrap();
    let started = read_status(&mut reader);
    assert_eq!(started["sequence"], 1);
    assert_eq!(started["actions"], serde_json::json!(["IDLE"]));

    writeln!(
        stream,
        r#"{{"type":"input","channel":"left_stick","x":0.4,"y":0.0}}"#
    )
    .unwrap();
    writeln!(stream, r#"{{"type":"key","code":"Enter"}}"#).unwrap();
    writeln!(
        stream,
        r#"{{"type":"input","channel":"left_stick","x":0.0,"y":0.0}}"#
    )
    .unwrap();

    let _moved = read_status(&mut reader);
    let _latched = read_status(&mut reader);
    let released = read_status(&mut reader);
    assert_eq!(released["sequence"], 4);
    assert_eq!(
        released["actions"],
        serde_json::json!(["SWING_RIGHT", "LOCKED_STATE"])
    );
    assert_eq!(released["locked"], true);
    assert_eq!(released["locked_channels"], serde_json::json!(["left_stick"]));

    writeln!(stream, r#"{{"type":"reset"}}"#).unwrap();
    let reset = read_status(&mut reader);
    assert_eq!(reset["actions"], serde_json::json!(["IDLE"]));
    assert_eq!(reset["locked"], false);

    stop.store(true, Ordering::Relaxed);
    handle.join().unwrap().unwrap();
}

#[test]
fn overlong_line_drops_client_and_keeps_serving() {
    let bridge = Bridge::bind(BridgeConfig {
        bind_addr: "127.0.0.1:0".to_string(),
        max_line_bytes: 64,
        ..Default::default()
    })
    .expect("bind ephemeral port");
    let addr = bridge.local_addr().unwrap();

    let stop = Arc::new(AtomicBool::new(false));
    let stop_bridge = Arc::clone(&stop);
    let handle = thread::spawn(move || {
        let mut controller = Controller::new();
        bridge.run(&mut controller, &stop_bridge)
    });

    let mut stream = TcpStream::connect(addr).expect("connect to bridge");
    stream
        .set_read_timeout(Some(Duration::from_secs(5)))
        .unwrap();
    let mut reader = BufReader::new(stream.try_clone().unwrap());
    let _initial = read_status(&mut reader);

    stream.write_all(&[b'a'; 256]).unwrap();
    let mut rest = Vec::new();
    match reader.read_to_end(&mut rest) {
        Ok(_) => assert!(rest.is_empty()),
        Err(e) => assert_ne!(e.kind(), std::io::ErrorKind::WouldBlock),
    }
    drop(reader);
    drop(stream);

    let next = TcpStream::connect(addr).expect("reconnect to bridge");
    next.set_read_timeout(Some(Duration::from_secs(5)))
        .unwrap();
    let mut next_reader = BufReader::new(next);
    let status = read_status(&mut next_reader);
    assert_eq!(status["sequence"], 0);

    stop.store(true, Ordering::Relaxed);
    handle.join().unwrap().unwrap();
}
