use crate::read_file;
use blindvote::*;
use tracing::debug;

pub fn command_tally(matches: &clap::ArgMatches) {
    let filename = matches.value_of("INPUT").unwrap_or_else(|| {
        eprintln!("blindvote tally: input filename required");
        std::process::exit(1);
    });
    let file_bytes = read_file("tally", filename);

    let board = match BulletinBoard::from_bytes(&file_bytes) {
        Ok(board) => board,
        Err(e) => {
            eprintln!("blindvote tally: unable to read {}: {}", filename, e);
            std::process::exit(1);
        }
    };
    debug!(votes = board.votes.len(), election = %board.election.election_id, "loaded bulletin board");

    let result = match board.tally() {
        Ok(result) => result,
        Err(e) => {
            eprintln!("blindvote tally: {}", e);
            std::process::exit(1);
        }
    };

    match serde_json::to_string_pretty(&result) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("blindvote tally: unable to serialize result: {}", e);
            std::process::exit(1);
        }
    }
}

pub fn command_verify(matches: &clap::ArgMatches) {
    let filename = matches.value_of("INPUT").unwrap_or_else(|| {
        eprintln!("blindvote verify: input filename required");
        std::process::exit(1);
    });
    let file_bytes = read_file("verify", filename);

    let result: ElectionResult = match serde_json::from_slice(&file_bytes) {
        Ok(result) => result,
        Err(e) => {
            eprintln!("blindvote verify: unable to read {}: {}", filename, e);
            std::process::exit(1);
        }
    };

    // Per-option report; the verdict comes from ElectionResult::verify alone
    for option_id in result.option_results.keys() {
        let verified = result
            .option_tally(option_id)
            .map_or(false, |tally| tally.verify());
        let status = if verified { "OK" } else { "FAILED" };
        println!(
            "  {} got {} votes: {}",
            option_id, result.option_results[option_id], status
        );
    }

    if !result.verify() {
        eprintln!("blindvote verify: {} failed verification", filename);
        std::process::exit(1);
    }
    println!("> Election result verified OK");
}
