pub mod bridge;
pub mod metrics;
pub mod protocol;

pub use bridge::{handle_line, Bridge, BridgeConfig, BridgeError};
pub use metrics::{init_metrics, serve_metrics, MetricsObserver};
pub use protocol::{IncomingMessage, ProtocolError, StatusMsg, LATCH_KEYS};
