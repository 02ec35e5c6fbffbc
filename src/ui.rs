//! Terminal output of the command line tool.

use std::{
    fmt::{self, Write as _},
    io,
};

use colored::Colorize;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::{
    filter::LevelFilter,
    fmt::{FmtContext, FormatEvent, FormatFields, format::Writer},
    registry::LookupSpan,
};

/// Formats each event as a colored level tag followed by its message.
pub struct Tagged;

impl<S, N> FormatEvent<S, N> for Tagged
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        write!(writer, "{} ", tag(*event.metadata().level()))?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

/// Installs the stderr subscriber. Does nothing if one is already installed.
pub fn init(level: LevelFilter) {
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .event_format(Tagged)
        .try_init();
}

fn tag(level: Level) -> String {
    if level == Level::ERROR {
        "[ERROR]".red().to_string()
    } else if level == Level::WARN {
        "[WARNING]".yellow().to_string()
    } else if level == Level::INFO {
        "[INFO]".green().to_string()
    } else if level == Level::DEBUG {
        "[DEBUG]".blue().to_string()
    } else {
        "[TRACE]".dimmed().to_string()
    }
}

/// The log level selected by the `--debug` and `-v` flags.
pub fn level(debug: bool, verbose: u8) -> LevelFilter {
    match (debug, verbose) {
        (_, 1..) => LevelFilter::TRACE,
        (true, 0) => LevelFilter::DEBUG,
        (false, 0) => LevelFilter::INFO,
    }
}
