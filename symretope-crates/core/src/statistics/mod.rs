//! Writes the counters of the propagator as statistic lines.
mod statistic_logger;
mod statistic_logging;

pub use statistic_logger::StatisticLogger;
pub use statistic_logging::configure_statistic_logging;
pub use statistic_logging::log_statistic_postfix;

/// Declares a struct of counters which logs every counter under the name of its field.
#[macro_export]
#[doc(hidden)]
macro_rules! create_statistics_struct {
    ($name:ident { $($field:ident : usize),+ $(,)? }) => {
        #[derive(Default, Debug, Copy, Clone)]
        pub(crate) struct $name {
            $(pub(crate) $field: usize),+
        }

        impl $name {
            fn log(&self, statistic_logger: &$crate::statistics::StatisticLogger) {
                $(statistic_logger.log(stringify!($field), self.$field);)+
            }
        }
    };
}
