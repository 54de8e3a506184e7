//! Console logger for the desktop build.
//!
//! Implements `log::Log` directly, printing the level, the emitting thread and
//! the target. The thread name tells caller lines apart from worker lines.

use log::{Level, Log, Metadata, Record};

/// Logger that prints every enabled record to stdout.
pub struct ConsoleLogger {
    max_level: Level,
}

impl ConsoleLogger {
    pub const fn new(max_level: Level) -> Self {
        Self { max_level }
    }
}

impl Log for ConsoleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.max_level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let level_str = match record.level() {
            Level::Error => "ERROR",
            Level::Warn => "WARN",
            Level::Info => "INFO",
            Level::Debug => "DEBUG",
            Level::Trace => "TRACE",
        };
        let thread = std::thread::current();
        println!(
            "[{}] ({}) {}: {}",
            level_str,
            thread.name().unwrap_or("unnamed"),
            record.target(),
            record.args()
        );
    }

    fn flush(&self) {}
}

/// Global logger instance.
static LOGGER: ConsoleLogger = ConsoleLogger::new(Level::Trace);

/// Install the console logger.
pub fn init(max_level: log::LevelFilter) {
    match log::set_logger(&LOGGER) {
        Ok(()) => {
            log::set_max_level(max_level);
        }
        Err(_) => {
            // Logger already set
        }
    }
}

/// Level from `BUZZER_LOG` (error, warn, info, debug, trace), `Info` if unset.
pub fn level_from_env() -> log::LevelFilter {
    std::env::var("BUZZER_LOG")
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(log::LevelFilter::Info)
}
