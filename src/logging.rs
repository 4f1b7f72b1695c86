use flexi_logger::{Logger, LoggerHandle};
use std::sync::OnceLock;

static LOGGER: OnceLock<LoggerHandle> = OnceLock::new();

/// Starts stderr logging once per process. `spec` is a flexi_logger level
/// spec such as `info` or `timetable_core=debug`; repeated calls are no-ops.
pub fn init(spec: &str) -> Result<(), String> {
    if LOGGER.get().is_some() {
        return Ok(());
    }
    let handle = Logger::try_with_env_or_str(spec)
        .map_err(|err| format!("invalid log spec '{spec}': {err}"))?
        .log_to_stderr()
        .start()
        .map_err(|err| format!("failed to start logger: {err}"))?;
    let _ = LOGGER.set(handle);
    Ok(())
}

/// Default level spec for the binaries: debug locally, info in release.
pub fn default_spec() -> &'static str {
    if cfg!(debug_assertions) { "debug" } else { "info" }
}
