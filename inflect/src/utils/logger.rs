use log::*;
use simplelog::{ColorChoice, ConfigBuilder, TermLogger, TerminalMode};

/// Terminal logger. `LOG_LEVEL` picks the level (default info),
/// `LOG_UTC_OFFSET` the whole-hour offset of logged timestamps (default UTC).
pub fn init_logger() -> anyhow::Result<()> {
  let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
  let log_level = match log_level.to_lowercase().as_str() {
    "trace" => LevelFilter::Trace,
    "debug" => LevelFilter::Debug,
    "info" => LevelFilter::Info,
    "warn" => LevelFilter::Warn,
    "error" => LevelFilter::Error,
    _ => LevelFilter::Info,
  };
  let offset_hours = std::env::var("LOG_UTC_OFFSET")
    .ok()
    .and_then(|h| h.parse::<i8>().ok())
    .unwrap_or(0);

  let mut cfg = ConfigBuilder::new();
  cfg.set_time_offset(time::UtcOffset::from_hms(offset_hours, 0, 0)?);
  let cfg = cfg.build();

  TermLogger::init(log_level, cfg, TerminalMode::Mixed, ColorChoice::Auto)
    .map_err(|e| anyhow::anyhow!("Failed to initialize logger: {}", e))
}
