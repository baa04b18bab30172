use chrono::Local;
use log::{Level, Metadata, Record, SetLoggerError};
use serde::Serialize;

use crate::events::{AppEvent, EventSink};

#[derive(Debug, Serialize, Clone)]
pub struct LogMessage {
    pub level: String,
    pub message: String,
    pub timestamp: String,
}

/// Logger that mirrors every record to stderr and to the event channel
pub struct ChannelLogger {
    sink: EventSink,
    level: Level,
}

impl ChannelLogger {
    pub fn new(sink: EventSink, level: Level) -> Self {
        Self { sink, level }
    }

    /// Installs the logger globally. Fails if another logger is already set.
    pub fn init(sink: EventSink, level: Level) -> Result<(), SetLoggerError> {
        let logger = ChannelLogger::new(sink, level);
        log::set_boxed_logger(Box::new(logger))
            .map(|()| log::set_max_level(level.to_level_filter()))
    }

    fn emit_log(&self, record: &Record) {
        let log_message = LogMessage {
            level: record.level().to_string(),
            message: record.args().to_string(),
            timestamp: Local::now().to_rfc3339(),
        };

        // logging from here would recurse
        if let Err(e) = self.sink.emit(AppEvent::Log(log_message)) {
            eprintln!("Failed to emit log message: {}", e);
        }
    }
}

impl log::Log for ChannelLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            eprintln!("[{}] {}", record.level(), record.args());
            self.emit_log(record);
        }
    }

    fn flush(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use log::Log;

    #[test]
    fn test_records_above_level_are_dropped() {
        let (sink, mut rx) = EventSink::channel();
        let logger = ChannelLogger::new(sink, Level::Info);

        logger.log(
            &Record::builder()
                .level(Level::Debug)
                .args(format_args!("noisy"))
                .build(),
        );
        assert!(rx.try_recv().is_err());

        logger.log(
            &Record::builder()
                .level(Level::Warn)
                .args(format_args!("adapter missing"))
                .build(),
        );
        match rx.try_recv() {
            Ok(AppEvent::Log(message)) => {
                assert_eq!(message.level, "WARN");
                assert_eq!(message.message, "adapter missing");
            }
            other => panic!("unexpected event {:?}", other),
        }
    }
}
