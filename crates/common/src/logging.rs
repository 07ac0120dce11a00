use log::LevelFilter;

use crate::settings::Logging;

/// Level filter for the given logging settings.
pub fn level_filter(logging: &Logging) -> LevelFilter {
    if logging.debug {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    }
}

/// Initialize logging for the application
/// Should be called once at the start of main()
///
/// Records go to stderr so rendered output on stdout stays clean.
pub fn init_logging(logging: &Logging) {
    let result = fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "{}  {} [{}] {}",
                chrono::Local::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
                record.level(),
                record.target(),
                message
            ))
        })
        .level(level_filter(logging))
        .chain(std::io::stderr())
        .apply();

    if result.is_err() {
        log::debug!("Logger already initialized");
    }
}
