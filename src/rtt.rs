//! `log` backend that prints over RTT.
//!
//! Set up the RTT print channel first, then install the logger:
//!
//! ```no_run
//! use log::LevelFilter;
//! use rtt_target::rtt_init_print;
//!
//! rtt_init_print!();
//! midiusb::rtt::init(LevelFilter::Debug).unwrap();
//! log::debug!("logging over RTT");
//! ```

use log::{LevelFilter, Metadata, Record, SetLoggerError};
use rtt_target::rprintln;

pub struct RttLogger;

static LOGGER: RttLogger = RttLogger;

pub fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
    log::set_logger(&LOGGER)?;
    log::set_max_level(level);
    Ok(())
}

impl log::Log for RttLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            rprintln!("{} {}: {}", record.level(), record.target(), record.args());
        }
    }

    fn flush(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use log::{Level, Log};

    #[test]
    fn filters_on_max_level() {
        log::set_max_level(LevelFilter::Info);
        let warn = Metadata::builder().level(Level::Warn).build();
        let trace = Metadata::builder().level(Level::Trace).build();
        assert!(RttLogger.enabled(&warn));
        assert!(!RttLogger.enabled(&trace));
    }
}
