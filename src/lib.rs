//! Deterministic hex-grid strategy engine and reasoning-agent benchmark harness.
//!
//! The engine (`map`, `model`, `deploy`, `orders`, `resolve`, `upkeep`, `view`) is a
//! pure, single-threaded state machine. The harness (`render`, `integrity`, `probes`,
//! `telemetry`, `metrics`, `agents`, `runner`) wraps it for measuring how well an
//! agent reasons about hidden information.

pub mod agents;
pub mod combat;
pub mod config;
pub mod deploy;
pub mod error;
pub mod integrity;
pub mod map;
pub mod metrics;
pub mod model;
pub mod orders;
pub mod probes;
pub mod render;
pub mod resolve;
pub mod runner;
pub mod telemetry;
pub mod upkeep;
pub mod view;

/// Initialize dual logging (terminal + timestamped file under `logs/`).
///
/// Library code never calls this itself; it is an application-level decision
/// made once by the binary entrypoint.
#[cfg(feature = "cli")]
pub fn init_logging() {
    use std::time::{SystemTime, UNIX_EPOCH};

    std::fs::create_dir_all("logs").expect("create logs directory");
    let cfg = simplelog::ConfigBuilder::new()
        .set_location_level(log::LevelFilter::Off)
        .set_target_level(log::LevelFilter::Off)
        .build();
    let stamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock before epoch")
        .as_secs();
    let file = simplelog::WriteLogger::new(
        log::LevelFilter::Debug,
        cfg.clone(),
        std::fs::File::create(format!("logs/{stamp}.log")).expect("create log file"),
    );
    let term = simplelog::TermLogger::new(
        log::LevelFilter::Info,
        cfg,
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    );
    simplelog::CombinedLogger::init(vec![term, file]).expect("initialize logger");
}
