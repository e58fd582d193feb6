mod app;
mod clock;
mod config;
mod logging;
mod script;
mod telemetry;

pub use app::run_from_args;
pub use clock::SessionClock;
