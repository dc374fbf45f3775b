use std::fmt::Display;

use super::statistic_logging::log_statistic;

/// Names statistics by joining a prefix and the name of the counter with an underscore.
#[derive(Clone, Debug)]
pub struct StatisticLogger {
    name_prefix: String,
}

impl StatisticLogger {
    pub fn new(name_prefix: impl Display) -> Self {
        Self {
            name_prefix: name_prefix.to_string(),
        }
    }

    pub fn attach_to_prefix(&self, addition_to_prefix: impl Display) -> Self {
        Self {
            name_prefix: self.qualified_name(addition_to_prefix),
        }
    }

    pub(crate) fn log(&self, name: &str, value: usize) {
        log_statistic(self.qualified_name(name), value);
    }

    fn qualified_name(&self, name: impl Display) -> String {
        format!("{}_{name}", self.name_prefix)
    }
}
