use core::fmt;
use std::fs::OpenOptions;
use std::sync::Once;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::FmtContext;
use tracing_subscriber::fmt::format::{self, FormatEvent, FormatFields};
use tracing_subscriber::prelude::*;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{EnvFilter, fmt as tracingfmt};

/// if `cond` is false, logs a warning with your message.
#[macro_export]
macro_rules! assert_warn {
    ($cond:expr, $($arg:tt)+) => {{
        if !$cond {
            tracing::warn!(
                target: module_path!(),
                "assertion warning: `{}` failed: {} at {}:{}",
                stringify!($cond),
                format_args!($($arg)+),
                file!(),
                line!(),
            );
        }
    }};
}

struct AlignedFormatter;

/// Visitor to extract the cycle field value
struct CycleVisitor {
    cycle: Option<String>,
}

impl tracing::field::Visit for CycleVisitor {
    fn record_u64(&mut self, field: &tracing::field::Field, value: u64) {
        if field.name() == "cycle" {
            self.cycle = Some(format!("{:>10}", value));
        }
    }

    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn fmt::Debug) {
        if field.name() == "cycle" {
            self.cycle = Some(format!("{:>10?}", value));
        }
    }
}

impl<S, N> FormatEvent<S, N> for AlignedFormatter
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(&self, ctx: &FmtContext<'_, S, N>, mut writer: format::Writer<'_>, event: &tracing::Event<'_>) -> fmt::Result {
        let metadata = event.metadata();

        let mut visitor = CycleVisitor { cycle: None };
        event.record(&mut visitor);
        let has_cycle = visitor.cycle.is_some();
        let cycle_str = visitor.cycle.unwrap_or_else(|| " ".repeat(10));

        let (color_level, color_reset) = if writer.has_ansi_escapes() {
            match *metadata.level() {
                tracing::Level::ERROR => ("\x1b[31m", "\x1b[0m"),
                tracing::Level::WARN => ("\x1b[33m", "\x1b[0m"),
                tracing::Level::INFO => ("\x1b[32m", "\x1b[0m"),
                tracing::Level::DEBUG => ("\x1b[34m", "\x1b[0m"),
                tracing::Level::TRACE => ("\x1b[35m", "\x1b[0m"),
            }
        } else {
            ("", "")
        };

        // "crates/pipe-entities/src/ltssm/ltssm_fsm.rs" becomes "cycle [entities/ltssm] ltssm_fsm.rs"
        let file_path = metadata.file().unwrap_or("unknown");
        let formatted_path = match file_path.find("/src/") {
            Some(src_idx) => {
                let before_src = &file_path[..src_idx];
                let after_src = &file_path[src_idx + 5..];

                let crate_name = match before_src.rfind("pipe-") {
                    Some(idx) => &before_src[idx + 5..],
                    None => before_src.rsplit('/').next().unwrap_or("unknown"),
                };

                match after_src.rfind('/') {
                    Some(last_slash) => {
                        let first_module = after_src[..last_slash].split('/').next().unwrap_or("");
                        let filename = &after_src[last_slash + 1..];
                        format!("{} [{}/{}] {}", cycle_str, crate_name, first_module, filename)
                    }
                    None => format!("{} [{}] {}", cycle_str, crate_name, after_src),
                }
            }
            None => format!("{} {}", cycle_str, file_path),
        };

        // Format: "LEVEL cycle [module] file:line: message"
        let location = format!(
            "{}{:<5}{} {}:{}:",
            color_level,
            metadata.level(),
            color_reset,
            formatted_path,
            metadata.line().unwrap_or(0)
        );

        let mut message_buf = String::new();
        let message_writer = format::Writer::new(&mut message_buf);
        ctx.field_format().format_fields(message_writer, event)?;

        // The cycle is already printed in front, drop it from the field list
        if has_cycle {
            if let Some(idx) = message_buf.find("cycle=") {
                match message_buf[idx..].find(' ') {
                    Some(space_idx) => message_buf.replace_range(idx..idx + space_idx + 1, ""),
                    None => message_buf.truncate(idx),
                }
            }
        }

        write!(writer, "{:<width$} {}", location, message_buf.trim_end(), width = 64)?;
        writeln!(writer)
    }
}

static INIT_LOG: Once = Once::new();

/// Sets up logging with maximum verbosity (trace level)
/// Mainly for unit tests
pub fn setup_logging_verbose() {
    setup_logging(EnvFilter::new("trace"), None);
}

/// Sets up default logging to stdout and optionally, a verbose log file
/// Returns a guard, that needs to be kept alive for logging to file to work
pub fn setup_logging_default(verbose_logfile: Option<String>) -> Option<WorkerGuard> {
    let stdout_filter = get_default_stdout_filter();
    let logfile_and_filter = verbose_logfile.map(|file| (file, get_default_logfile_filter()));
    setup_logging(stdout_filter, logfile_and_filter)
}

const DEFAULT_STDOUT_DIRECTIVES: &[&str] = &[
    "info",
    // Mismatches and generator progress are per-word
    "pipe_entities::ordered_set=info",
    "pipe_entities::scrambling=info",
    // Burst level events
    "pipe_entities::lfps=info",
    // State transitions
    "pipe_entities::ltssm=info",
    "pipe_entities::pipe=info",
    "pipe_entities::loopback=debug",
];

pub fn get_default_stdout_filter() -> EnvFilter {
    EnvFilter::new(DEFAULT_STDOUT_DIRECTIVES.join(","))
}

fn get_default_logfile_filter() -> EnvFilter {
    EnvFilter::new("debug")
}

/// Sets up logging to stdout and optionally, a verbose log file
/// If an output file is requested, returns Some<WorkerGuard>. Keep this value alive
/// or logging to file may cease working. If the file can't be opened, only stdout
/// logging is set up and None is returned.
fn setup_logging(stdout_filter: EnvFilter, outfile: Option<(String, EnvFilter)>) -> Option<WorkerGuard> {
    let file = outfile.and_then(|(path, filter)| {
        match OpenOptions::new().create(true).append(true).open(&path) {
            Ok(f) => Some((f, filter)),
            Err(e) => {
                eprintln!("Failed to open log file {}: {}", path, e);
                None
            }
        }
    });

    match file {
        Some((file, outfile_filter)) => {
            let (file_writer, guard) = tracing_appender::non_blocking(file);
            INIT_LOG.call_once(|| {
                let file_layer = tracingfmt::layer()
                    .event_format(AlignedFormatter)
                    .with_writer(file_writer)
                    .with_ansi(false);
                let stdout_layer = tracingfmt::layer().event_format(AlignedFormatter);

                tracing_subscriber::registry()
                    .with(file_layer.with_filter(outfile_filter))
                    .with(stdout_layer.with_filter(stdout_filter))
                    .init();
            });
            Some(guard)
        }
        None => {
            INIT_LOG.call_once(|| {
                let stdout_layer = tracingfmt::layer().event_format(AlignedFormatter);
                tracing_subscriber::registry()
                    .with(stdout_layer.with_filter(stdout_filter))
                    .init();
            });
            None
        }
    }
}
