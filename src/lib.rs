// Library surface for headless/integration tests and reuse.
// Keep this lean to avoid coupling to bin-only types in main.rs.
pub mod app_dirs;
pub mod config;
pub mod game;
pub mod grid;
pub mod matcher;
pub mod puzzle;
pub mod runtime;
pub mod selection;
pub mod session;
pub mod telemetry;
pub mod ui;
pub mod wordbank;

/// Event loop cadence; ten sub-ticks make one countdown second.
pub const TICK_RATE_MS: u64 = 100;
