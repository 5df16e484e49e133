use flexi_logger::{FlexiLoggerError, Logger, LoggerHandle};

/// Starts stderr logging for a binary from a spec such as `info` or
/// `study_planner=debug`. Keep the handle alive for the life of the process.
pub fn init_logging(spec: &str) -> Result<LoggerHandle, FlexiLoggerError> {
    Logger::try_with_str(spec)?
        .log_to_stderr()
        .format(flexi_logger::detailed_format)
        .start()
}
