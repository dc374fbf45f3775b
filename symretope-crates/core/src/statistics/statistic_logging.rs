//! Writes statistics as `{PREFIX} {NAME}={VALUE}` lines, optionally followed by a closing line.
//!
//! Nothing is written until [`configure_statistic_logging`] has been called.

use std::io::stdout;
use std::io::Write;
use std::sync::Mutex;
use std::sync::OnceLock;

use convert_case::Case;
use convert_case::Casing;

struct StatisticOptions {
    statistic_prefix: &'static str,
    after_statistics: Option<&'static str>,
    /// Names are written as given if absent.
    statistics_casing: Option<Case>,
    statistics_writer: Box<dyn Write + Send>,
}

static STATISTIC_OPTIONS: OnceLock<Mutex<StatisticOptions>> = OnceLock::new();

/// Configures the logging of the statistics; only the first call has an effect.
///
/// If no writer is given, statistics are written to stdout.
pub fn configure_statistic_logging(
    prefix: &'static str,
    after: Option<&'static str>,
    casing: Option<Case>,
    writer: Option<Box<dyn Write + Send>>,
) {
    let _ = STATISTIC_OPTIONS.get_or_init(|| {
        Mutex::new(StatisticOptions {
            statistic_prefix: prefix,
            after_statistics: after,
            statistics_casing: casing,
            statistics_writer: writer.unwrap_or_else(|| Box::new(stdout())),
        })
    });
}

pub(crate) fn log_statistic(name: String, value: usize) {
    with_options(|options| {
        let name = match options.statistics_casing {
            Some(casing) => name.to_case(casing),
            None => name,
        };
        let prefix = options.statistic_prefix;
        let _ = writeln!(options.statistics_writer, "{prefix} {name}={value}");
    });
}

/// Logs the closing line of a block of statistics, if one is configured.
pub fn log_statistic_postfix() {
    with_options(|options| {
        if let Some(postfix) = options.after_statistics {
            let _ = writeln!(options.statistics_writer, "{postfix}");
        }
    });
}

fn with_options(action: impl FnOnce(&mut StatisticOptions)) {
    if let Some(Ok(mut options)) = STATISTIC_OPTIONS.get().map(Mutex::lock) {
        action(&mut options);
    }
}
