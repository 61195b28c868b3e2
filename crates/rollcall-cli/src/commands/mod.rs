pub mod channel;
pub mod config;
pub mod report;
pub mod run;
pub mod staff;

use rollcall_core::{AttendanceService, CommandContext, Config};

use crate::console::ConsolePlatform;

/// Load config and the attendance document behind a console platform.
pub fn open_service() -> Result<AttendanceService<ConsolePlatform>, Box<dyn std::error::Error>> {
    let config = Config::load()?;
    Ok(AttendanceService::from_config(&config, ConsolePlatform::new())?)
}

/// Commands typed at the terminal act as the local operator.
pub fn cli_context() -> CommandContext {
    CommandContext {
        actor: "cli".into(),
        channel: "cli".into(),
    }
}

/// Fail the command if the last write didn't reach disk.
pub fn ensure_saved(
    service: &AttendanceService<ConsolePlatform>,
) -> Result<(), Box<dyn std::error::Error>> {
    if service.ledger().is_dirty() {
        return Err("attendance state could not be saved".into());
    }
    Ok(())
}
