use std::{env, fmt::Display};

use colored::Colorize;
use log::{Level, LevelFilter};

/// External crates only need to log warnings and errors
const ALLOWED_EXTERNAL_LEVELS: [Level; 2] = [Level::Warn, Level::Error];
const DEFAULT_LEVEL: LevelFilter = LevelFilter::Info;

/// Overrides how verbose jamroom's own crates are, e.g. `JAMROOM_LOG=debug`
const LEVEL_VARIABLE: &str = "JAMROOM_LOG";

pub fn init_logger() {
    let requested = env::var(LEVEL_VARIABLE).ok();
    let local_level = local_level(requested.as_deref());

    let result = fern::Dispatch::new()
        .format(move |out, message, record| {
            let target = Target::from_str(record.target());
            let now = chrono::Local::now();

            out.finish(format_args!(
                "{:^5} {} {:^8} {}",
                level_to_string(&record.level()),
                now.format("%H:%M:%S").to_string().bright_black(),
                target,
                message
            ))
        })
        .filter(move |meta| {
            let target = Target::from_str(meta.target());

            let is_allowed = meta.level() <= local_level;
            let is_severe = ALLOWED_EXTERNAL_LEVELS.contains(&meta.level());

            target.is_local() && is_allowed || is_severe
        })
        .chain(std::io::stdout())
        .apply();

    if let Err(e) = result {
        eprintln!("Could not initialize logging: {e}");
        return;
    }

    if let Some(value) = requested.filter(|v| v.trim().parse::<LevelFilter>().is_err()) {
        log::warn!(
            "{} must be one of off, error, warn, info, debug, trace, got {}",
            LEVEL_VARIABLE,
            value
        );
    }
}

/// The level for jamroom's own crates. Unknown values fall back to info.
fn local_level(requested: Option<&str>) -> LevelFilter {
    requested
        .and_then(|level| level.trim().parse().ok())
        .unwrap_or(DEFAULT_LEVEL)
}

enum Target {
    External(String),
    Server,
    Collab,
    Core,
    Main,
}

impl Target {
    fn from_str(str: &str) -> Self {
        let module = str.split("::").next().unwrap_or(str);

        match module {
            "jamroom_core" => Self::Core,
            "jamroom_server" => Self::Server,
            "jamroom_collab" => Self::Collab,
            "jamroom" => Self::Main,
            other => Target::External(other.to_string()),
        }
    }

    fn is_local(&self) -> bool {
        !matches!(self, Self::External(_))
    }
}

impl Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let result = match self {
            Target::External(x) => x.as_str().clear(),
            Target::Server => "SERVER".bright_green(),
            Target::Collab => "COLLAB".bright_purple(),
            Target::Core => "CORE".blue(),
            Target::Main => "MAIN".bright_cyan(),
        };

        Display::fmt(&result, f)
    }
}

fn level_to_string(level: &Level) -> String {
    match level {
        Level::Error => " ERR ".black().on_red().bold().to_string(),
        Level::Warn => " WRN ".black().on_yellow().bold().to_string(),
        Level::Info => " INF ".black().on_blue().bold().to_string(),
        Level::Debug => " DBG ".white().on_black().to_string(),
        Level::Trace => " TRC ".to_string(),
    }
}
