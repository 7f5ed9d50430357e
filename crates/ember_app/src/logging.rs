//! Process-wide logger setup.  Libraries only use the `log` macros; the
//! application installs the dispatcher once at startup.

use anyhow::{Context, Result};
use log::LevelFilter;

/// Local time with milliseconds, e.g. `2026-10-15 09:08:07.042`.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// Installs a `fern` dispatcher writing `[time level target] message` lines
/// to stdout.  Fails if a logger is already installed.
pub fn init(level: LevelFilter) -> Result<()> {
    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{} {} {}] {}",
                chrono::Local::now().format(TIMESTAMP_FORMAT),
                record.level(),
                record.target(),
                message
            ))
        })
        .level(level)
        // the windowing backend is chatty at debug level
        .level_for("winit", LevelFilter::Warn)
        .chain(std::io::stdout())
        .apply()
        .context("installing the logger")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn installs_only_once() {
        init(LevelFilter::Debug).unwrap();
        log::debug!("logger installed");
        assert!(init(LevelFilter::Info).is_err());
    }

    #[test]
    fn timestamp_format_is_local_datetime_with_millis() {
        let at = chrono::NaiveDate::from_ymd_opt(2026, 10, 15)
            .unwrap()
            .and_hms_milli_opt(9, 8, 7, 42)
            .unwrap();
        assert_eq!(
            at.format(TIMESTAMP_FORMAT).to_string(),
            "2026-10-15 09:08:07.042"
        );
    }
}
