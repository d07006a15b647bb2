use std::env::var;
use tracing::Level;

pub struct Config {
    pub log_level: Level,
    pub voters: usize,
}

impl Config {
    pub fn from_env() -> Self {
        let log_level = match var("BLINDVOTE_LOG") {
            Ok(val) => val.parse().unwrap_or_else(|_| {
                eprintln!("blindvote: invalid BLINDVOTE_LOG level {}", val);
                std::process::exit(1);
            }),
            Err(_e) => Level::WARN,
        };

        let voters = match var("BLINDVOTE_VOTERS") {
            Ok(val) => val.parse().unwrap_or_else(|_| {
                eprintln!("blindvote: BLINDVOTE_VOTERS must be a number, got {}", val);
                std::process::exit(1);
            }),
            Err(_e) => 10,
        };

        Config { log_level, voters }
    }
}
