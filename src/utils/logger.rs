use chrono::Local;
use eyre::Result;
use fern::Dispatch;
use log::LevelFilter;

/// Log level from `RUST_LOG`, or `default` when unset or unparsable
fn level_from_env(default: LevelFilter) -> LevelFilter {
    std::env::var("RUST_LOG")
        .ok()
        .and_then(|level| level.trim().parse().ok())
        .unwrap_or(default)
}

/// Sets up console logging for the command line tool.
///
/// Logs go to stderr so stdout stays clean for JSON output. `verbose` lowers
/// the default level to debug; `RUST_LOG` always wins when set.
///
/// # Errors
/// * If a logger has already been installed
pub fn setup_logger(verbose: bool) -> Result<()> {
    let default = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    Dispatch::new()
        .level(level_from_env(default))
        .chain(std::io::stderr())
        .format(|out, message, record| {
            out.finish(format_args!(
                "{} [{}] {}",
                Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
                record.level(),
                message
            ));
        })
        .apply()?;
    Ok(())
}
