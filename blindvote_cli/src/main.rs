use clap::{App, AppSettings, Arg, SubCommand};
use tracing::Level;

mod command_e2e;
mod command_generator;
mod command_tally;
mod config;

use command_e2e::command_e2e;
use command_generator::command_generator;
use command_tally::{command_tally, command_verify};
use config::Config;

fn app<'a, 'b>() -> App<'a, 'b> {
    App::new("BlindVote CLI")
        .version(env!("CARGO_PKG_VERSION"))
        .author(env!("CARGO_PKG_AUTHORS"))
        .about("Tallies Pedersen-committed ballots without opening them")
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .arg(
            Arg::with_name("v")
                .short("v")
                .multiple(true)
                .help("Sets the level of verbosity - can also be set with BLINDVOTE_LOG"),
        )
        .subcommand(
            SubCommand::with_name("e2e")
                .about("Run a complete election in memory: register, vote, tally and verify")
                .arg(
                    Arg::with_name("voters")
                        .long("voters")
                        .takes_value(true)
                        .help("Number of voters - can also be set with BLINDVOTE_VOTERS"),
                )
                .arg(
                    Arg::with_name("options")
                        .long("options")
                        .takes_value(true)
                        .default_value("A,B,C")
                        .help("Comma separated option ids"),
                )
                .arg(
                    Arg::with_name("output")
                        .long("output")
                        .short("o")
                        .takes_value(true)
                        .help("Write the bulletin board to this file (CBOR if it ends in .cbor, JSON otherwise)"),
                ),
        )
        .subcommand(
            SubCommand::with_name("tally")
                .about("Tally a bulletin board")
                .arg(
                    Arg::with_name("INPUT")
                        .index(1)
                        .required(true)
                        .help("Bulletin board file in JSON or CBOR format"),
                ),
        )
        .subcommand(
            SubCommand::with_name("verify")
                .about("Re-verify a published election result")
                .arg(
                    Arg::with_name("INPUT")
                        .index(1)
                        .required(true)
                        .help("Election result file in JSON format"),
                ),
        )
        .subcommand(
            SubCommand::with_name("generator").about("Print the group generators and order"),
        )
}

fn main() {
    let matches = app().get_matches();

    let mut config = Config::from_env();
    config.log_level = match matches.occurrences_of("v") {
        0 => config.log_level,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .with_writer(std::io::stderr)
        .init();

    // Subcommands
    if let Some(matches) = matches.subcommand_matches("e2e") {
        command_e2e(matches, &config);
    }
    if let Some(matches) = matches.subcommand_matches("tally") {
        command_tally(matches);
    }
    if let Some(matches) = matches.subcommand_matches("verify") {
        command_verify(matches);
    }
    if matches.subcommand_matches("generator").is_some() {
        command_generator();
    }
}

/// Expand `~` and environment variables in a path
pub fn expand(path: &str) -> String {
    shellexpand::full(path)
        .map(|expanded| expanded.into_owned())
        .unwrap_or_else(|_| path.to_owned())
}

/// Read a file or exit with an error naming the command
pub fn read_file(command: &str, filename: &str) -> Vec<u8> {
    let filename = expand(filename);
    match std::fs::read(&filename) {
        Ok(bytes) => bytes,
        Err(e) => {
            eprintln!("blindvote {}: unable to read {}: {}", command, filename, e);
            std::process::exit(1);
        }
    }
}
