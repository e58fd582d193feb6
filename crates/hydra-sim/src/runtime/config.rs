use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub show_help: bool,
    pub run_seconds: Option<u64>,
    pub bind_addr: String,
    pub bridge_enabled: bool,
    pub script_path: Option<PathBuf>,
    pub json_logs: bool,
    pub log_dir: Option<PathBuf>,
    pub metrics_addr: Option<String>,
    pub audit_path: Option<PathBuf>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            show_help: false,
            run_seconds: None,
            bind_addr: "127.0.0.1:7100".to_string(),
            bridge_enabled: true,
            script_path: None,
            json_logs: false,
            log_dir: None,
            metrics_addr: None,
            audit_path: None,
        }
    }
}

impl RuntimeConfig {
    pub fn from_env() -> Self {
        let args: Vec<String> = std::env::args().collect();
        Self::from_args(&args)
    }

    pub fn from_args(args: &[String]) -> Self {
        let mut cfg = RuntimeConfig::default();
        let mut i = 1;
        while i < args.len() {
            match args[i].as_str() {
                "--run-seconds" => {
                    if i + 1 < args.len() {
                        cfg.run_seconds = args[i + 1].parse::<u64>().ok();
                        i += 1;
                    }
                }
                "--bind" => {
                    if i + 1 < args.len() {
                        cfg.bind_addr = args[i + 1].clone();
                        i += 1;
                    }
                }
                "--no-bridge" => {
                    cfg.bridge_enabled = false;
                }
                "--script" => {
                    if i + 1 < args.len() {
                        cfg.script_path = Some(PathBuf::from(&args[i + 1]));
                        cfg.bridge_enabled = false;
                        i += 1;
                    }
                }
                "--json-logs" => {
                    cfg.json_logs = true;
                }
                "--log-dir" => {
                    if i + 1 < args.len() {
                        cfg.log_dir = Some(PathBuf::from(&args[i + 1]));
                        i += 1;
                    }
                }
                "--metrics-addr" => {
                    if i + 1 < args.len() {
                        cfg.metrics_addr = Some(args[i + 1].clone());
                        i += 1;
                    }
                }
                "--audit-log" => {
                    if i + 1 < args.len() {
                        cfg.audit_path = Some(PathBuf::from(&args[i + 1]));
                        i += 1;
                    }
                }
                "--help" | "-h" => {
                    cfg.show_help = true;
                    break;
                }
                _ => {}
            }
            i += 1;
        }
        cfg
    }

    pub fn print_help() {
        println!(
            r#"HydraSim - Excavator pilot control and hydraulic schematic simulator

USAGE:
    hydra-sim [OPTIONS]

OPTIONS:
    --bind <ADDR>           Bridge TCP bind address [default: 127.0.0.1:7100]
    --no-bridge             Read events from stdin instead of serving TCP
    --script <PATH>         Replay events from a JSONL file (implies --no-bridge)
    --run-seconds <SECS>    Stop the bridge after a fixed duration
    --json-logs             Output logs in JSON format (for log aggregation)
    --log-dir <DIR>         Also write daily rolling log files into DIR
    --metrics-addr <ADDR>   Enable Prometheus metrics server on address (e.g., 0.0.0.0:9090)
    --audit-log <PATH>      Record ignition and latch events to a JSONL file
    -h, --help              Print this help message

EVENTS (one JSON object per line):
    {{"type":"ignition","on":true}}
    {{"type":"toggle_ignition"}}
    {{"type":"input","channel":"left_stick","x":-0.5,"y":0.5}}
    {{"type":"input","channel":"right_pedal","value":0.8}}
    {{"type":"key","code":"Space"}}      latch current inputs (Space or Enter)
    {{"type":"reset"}}                   release every latch

ENVIRONMENT VARIABLES:
    RUST_LOG                Set log filter (e.g., RUST_LOG=debug,hydra_core=trace)

EXAMPLES:
    # Serve a console client with metrics
    hydra-sim --metrics-addr 0.0.0.0:9090

    # Replay a recorded session
    hydra-sim --script session.jsonl --audit-log audit.jsonl
"#
        );
    }
}
