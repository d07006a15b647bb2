use crate::config::Config;
use blindvote::*;
use rand::Rng;
use tracing::info;

const ELECTION_ID: &str = "e2e-election";
const CONTEST_ID: &str = "e2e-contest";

pub fn command_e2e(matches: &clap::ArgMatches, config: &Config) {
    let voters: usize = match matches.value_of("voters") {
        Some(voters) => voters.parse().unwrap_or_else(|_| {
            eprintln!("blindvote e2e: --voters must be a number");
            std::process::exit(1);
        }),
        None => config.voters,
    };
    let options: Vec<&str> = matches
        .value_of("options")
        .unwrap_or("A,B,C")
        .split(',')
        .map(str::trim)
        .collect();

    let mut system = VotingSystem::new();
    if let Err(e) = system.create_election(ELECTION_ID, CONTEST_ID, &options) {
        eprintln!("blindvote e2e: {}", e);
        std::process::exit(1);
    }

    // Register every voter and cast a random choice for each
    let mut rng = rand::thread_rng();
    let mut expected = vec![0u64; options.len()];
    for i in 0..voters {
        let voter_id = format!("voter-{}", i);
        let choice = rng.gen_range(0, options.len());
        expected[choice] += 1;

        if let Err(e) = cast_vote(&mut system, &voter_id, options[choice]) {
            eprintln!("blindvote e2e: failed to cast vote for {}: {}", voter_id, e);
            std::process::exit(1);
        }
    }
    info!(voters = voters, "votes cast");

    let result = match system.tally_election(ELECTION_ID) {
        Ok(result) => result,
        Err(e) => {
            eprintln!("blindvote e2e: tally failed: {}", e);
            std::process::exit(1);
        }
    };

    if !result.verify() {
        eprintln!("blindvote e2e: published aggregates failed to re-verify");
        std::process::exit(1);
    }
    println!("> Election tallied and verified OK");

    println!("Tally:");
    for (i, (option_id, count)) in result.option_results.iter().enumerate() {
        println!("  {} got {} votes", option_id, count);
        if *count != expected[i] {
            eprintln!(
                "blindvote e2e: {} expected {} votes, tallied {}",
                option_id, expected[i], count
            );
            std::process::exit(1);
        }
    }

    if let Some(output) = matches.value_of("output") {
        let output = crate::expand(output);
        let board = match system.bulletin_board(ELECTION_ID) {
            Ok(board) => board,
            Err(e) => {
                eprintln!("blindvote e2e: {}", e);
                std::process::exit(1);
            }
        };
        let bytes = if output.ends_with(".cbor") {
            board.to_cbor()
        } else {
            board.to_json()
        };
        if let Err(e) = std::fs::write(&output, bytes) {
            eprintln!("blindvote e2e: unable to write {}: {}", output, e);
            std::process::exit(1);
        }
        println!("> Bulletin board written to {}", output);
    }
}

fn cast_vote(system: &mut VotingSystem, voter_id: &str, choice: &str) -> Result<(), ValidationError> {
    system.register_voter(voter_id, ELECTION_ID, CONTEST_ID)?;
    let ballot = system.generate_vote(voter_id, ELECTION_ID, CONTEST_ID, choice)?;
    system.submit_vote(ballot.into_record(voter_id))
}
