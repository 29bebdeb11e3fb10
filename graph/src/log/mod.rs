use slog::{o, Drain, FilterLevel, Logger};
use std::fmt::{Display, Error, Formatter};

/// Implements `slog::Value` for a type by rendering it with the given format string.
#[macro_export]
macro_rules! impl_slog_value {
    ($T:ty) => {
        $crate::impl_slog_value!($T, "{}");
    };
    ($T:ty, $fmt:expr) => {
        impl $crate::slog::Value for $T {
            fn serialize(
                &self,
                record: &$crate::slog::Record,
                key: $crate::slog::Key,
                serializer: &mut dyn $crate::slog::Serializer,
            ) -> $crate::slog::Result {
                $crate::slog::Value::serialize(&format!($fmt, self), record, key, serializer)
            }
        }
    };
}

/// Name of the environment variable holding `RUST_LOG`-style filter directives.
pub const LOG_FILTER_VAR: &str = "QUIRE_LOG";

pub fn logger(show_debug: bool) -> Logger {
    logger_with_levels(show_debug, std::env::var(LOG_FILTER_VAR).ok().as_deref())
}

pub fn logger_with_levels(show_debug: bool, levels: Option<&str>) -> Logger {
    let decorator = slog_term::TermDecorator::new().build();
    let drain = slog_term::CompactFormat::new(decorator).build().fuse();
    let drain = slog_envlogger::LogBuilder::new(drain)
        .filter(
            None,
            if show_debug {
                FilterLevel::Debug
            } else {
                FilterLevel::Info
            },
        )
        .parse(levels.unwrap_or(""))
        .build();
    let drain = slog_async::Async::new(drain)
        .chan_size(20000)
        .build()
        .fuse();
    Logger::root(drain, o!())
}

/// A logger that drops every record.
pub fn discard() -> Logger {
    Logger::root(slog::Discard, o!())
}

pub enum LogCode {
    SchemaLoadFailure,
    DatasetLoadFailure,
    DanglingReference,
    GraphQlQuerySuccess,
    GraphQlQueryFailure,
}

impl Display for LogCode {
    fn fmt(&self, f: &mut Formatter) -> Result<(), Error> {
        let value = match self {
            LogCode::SchemaLoadFailure => "SchemaLoadFailure",
            LogCode::DatasetLoadFailure => "DatasetLoadFailure",
            LogCode::DanglingReference => "DanglingReference",
            LogCode::GraphQlQuerySuccess => "GraphQlQuerySuccess",
            LogCode::GraphQlQueryFailure => "GraphQlQueryFailure",
        };
        write!(f, "{}", value)
    }
}

impl_slog_value!(LogCode);
