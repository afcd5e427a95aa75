//! `-v` / `PRAXIS_GUARD_LOG_LEVEL`.
//!
//! Guard decisions log at `debug`, grace and logout transitions at `info`,
//! and provider failures at `warn`, so `-vv` is enough to follow a login.

use clap::{Arg, ArgAction, Command, builder::ValueParser};

pub const ARG_VERBOSITY: &str = "verbosity";

const LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];

/// Accept a level name (any case) or its index, `error`=0 through `trace`=4.
#[must_use]
pub fn validator_log_level() -> ValueParser {
    ValueParser::from(move |level: &str| -> std::result::Result<u8, String> {
        let level = level.trim();
        if let Ok(index) = level.parse::<u8>() {
            return if usize::from(index) < LEVELS.len() {
                Ok(index)
            } else {
                Err(format!("log level index must be 0-{}", LEVELS.len() - 1))
            };
        }

        LEVELS
            .iter()
            .position(|name| name.eq_ignore_ascii_case(level))
            .and_then(|index| u8::try_from(index).ok())
            .ok_or_else(|| format!("invalid log level {level:?}, expected one of {LEVELS:?}"))
    })
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command.arg(
        Arg::new(ARG_VERBOSITY)
            .short('v')
            .long("verbose")
            .help("Verbosity: -v warn, -vv info (grace and logout), -vvv debug (every decision), -vvvv trace")
            .env("PRAXIS_GUARD_LOG_LEVEL")
            .global(true)
            .action(ArgAction::Count)
            .value_parser(validator_log_level()),
    )
}
