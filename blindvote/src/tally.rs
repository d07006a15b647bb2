use crate::*;
use curve25519_dalek::scalar::Scalar;
use indexmap::IndexMap;
use std::collections::HashSet;
use tracing::debug;

/// One voter's commitment for a single option
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct OptionBallot {
    pub voter_id: String,
    pub commitment: Commitment,
}

/// One voter's anchor for a single option
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct OptionAnchor {
    pub voter_id: String,
    pub anchor: Anchor,
}

/// The tally of a single option, with the aggregates needed to re-check it
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct OptionTally {
    pub count: u64,
    pub c_agg: Commitment,
    pub h_s: Anchor,
    pub x: Residue,
}

impl OptionTally {
    /// Re-check the final identity and the residue
    pub fn verify(&self) -> bool {
        cancel(&self.c_agg, &self.h_s) == self.x && final_check(&self.c_agg, &self.h_s, self.count)
    }
}

/// Tally one option.
///
/// Only anchors from voters who cast a ballot count. Every ballot needs
/// exactly one matching anchor; anything else is `Error::AnchorBallotMismatch`.
pub fn tally_option(ballots: &[OptionBallot], anchors: &[OptionAnchor]) -> Result<OptionTally, Error> {
    let mismatch = |found: usize| Error::AnchorBallotMismatch {
        ballots: ballots.len(),
        anchors: found,
    };

    let mut voters: HashSet<&str> = HashSet::with_capacity(ballots.len());
    for ballot in ballots {
        if !voters.insert(&ballot.voter_id) {
            return Err(mismatch(anchors.len()));
        }
    }

    let mut anchored: HashSet<&str> = HashSet::with_capacity(ballots.len());
    let mut filtered: Vec<&Anchor> = Vec::with_capacity(ballots.len());
    for a in anchors.iter().filter(|a| voters.contains(a.voter_id.as_str())) {
        if !anchored.insert(&a.voter_id) {
            return Err(mismatch(filtered.len() + 1));
        }
        filtered.push(&a.anchor);
    }
    if filtered.len() != ballots.len() {
        return Err(mismatch(filtered.len()));
    }

    let c_agg = Commitment::combine(ballots.iter().map(|b| &b.commitment));
    let h_s = Anchor::combine(filtered);
    let x = cancel(&c_agg, &h_s);

    if ballots.is_empty() {
        return Ok(OptionTally {
            count: 0,
            c_agg,
            h_s,
            x,
        });
    }

    let count = recover_tally(x.as_point(), ballots.len() as u64)?;
    if !final_check(&c_agg, &h_s, count) {
        return Err(Error::FinalCheckFailed);
    }

    Ok(OptionTally { count, c_agg, h_s, x })
}

/// Check `C_agg == g^M + H_S` from encoded aggregates.
///
/// Undecodable input is a failed check, not an error.
pub fn verify_final(c_agg: &[u8], h_s: &[u8], m: u64) -> bool {
    match (Commitment::from_bytes(c_agg), Anchor::from_bytes(h_s)) {
        (Ok(c_agg), Ok(h_s)) => final_check(&c_agg, &h_s, m),
        _ => false,
    }
}

fn final_check(c_agg: &Commitment, h_s: &Anchor, m: u64) -> bool {
    let expected = if m == 0 {
        *h_s.as_point()
    } else {
        base_generator() * Scalar::from(m) + h_s.as_point()
    };
    points_equal(&expected, c_agg.as_point())
}

/// Per-option results of an election, with the public aggregates
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ElectionResult {
    pub election_id: String,
    pub contest_id: String,

    /// Voters registered for the contest in the tallying store
    pub total_voters: usize,

    /// Votes cast in the contest
    pub total_votes: usize,

    pub option_results: IndexMap<String, u64>,
    pub c_agg: IndexMap<String, Commitment>,
    pub h_s: IndexMap<String, Anchor>,
    pub x: IndexMap<String, Residue>,

    /// Every option passed its final check
    pub verified: bool,
}

impl ElectionResult {
    /// Re-verify every option from the published aggregates alone.
    ///
    /// A result with no options fails. With one-hot ballots the counts must
    /// add up to `total_votes`.
    pub fn verify(&self) -> bool {
        if self.option_results.is_empty() {
            return false;
        }

        let counted = self
            .option_results
            .values()
            .try_fold(0u64, |sum, count| sum.checked_add(*count));
        if counted != Some(self.total_votes as u64) {
            return false;
        }

        self.option_results.iter().all(|(option_id, count)| {
            match (
                self.c_agg.get(option_id),
                self.h_s.get(option_id),
                self.x.get(option_id),
            ) {
                (Some(c_agg), Some(h_s), Some(x)) => OptionTally {
                    count: *count,
                    c_agg: *c_agg,
                    h_s: *h_s,
                    x: *x,
                }
                .verify(),
                _ => false,
            }
        })
    }

    /// The aggregates for one option
    pub fn option_tally(&self, option_id: &str) -> Option<OptionTally> {
        Some(OptionTally {
            count: *self.option_results.get(option_id)?,
            c_agg: *self.c_agg.get(option_id)?,
            h_s: *self.h_s.get(option_id)?,
            x: *self.x.get(option_id)?,
        })
    }
}

/// Tally every option of an election independently.
///
/// Any option failing its tally aborts the whole election with that error.
pub fn tally_election<S: Store>(store: &S, election_id: &str) -> Result<ElectionResult, ValidationError> {
    let election = store
        .get_election(election_id)
        .ok_or_else(|| ValidationError::ElectionNotFound(election_id.to_owned()))?;
    let votes = store.votes_for_contest(&election.election_id, &election.contest_id);

    let mut result = ElectionResult {
        election_id: election.election_id.clone(),
        contest_id: election.contest_id.clone(),
        total_voters: store.count_registrations(&election.election_id, &election.contest_id),
        total_votes: votes.len(),
        option_results: IndexMap::with_capacity(election.options.len()),
        c_agg: IndexMap::with_capacity(election.options.len()),
        h_s: IndexMap::with_capacity(election.options.len()),
        x: IndexMap::with_capacity(election.options.len()),
        verified: false,
    };

    for option_id in election.options.iter() {
        let ballots: Vec<OptionBallot> = votes
            .iter()
            .filter_map(|v| {
                v.commitments.get(option_id).map(|c| OptionBallot {
                    voter_id: v.voter_id.clone(),
                    commitment: *c,
                })
            })
            .collect();
        let anchors: Vec<OptionAnchor> = votes
            .iter()
            .filter_map(|v| {
                v.anchors.get(option_id).map(|a| OptionAnchor {
                    voter_id: v.voter_id.clone(),
                    anchor: *a,
                })
            })
            .collect();

        let tally = tally_option(&ballots, &anchors)?;
        debug!(election = election_id, option = %option_id, count = tally.count, "tallied option");

        result.option_results.insert(option_id.clone(), tally.count);
        result.c_agg.insert(option_id.clone(), tally.c_agg);
        result.h_s.insert(option_id.clone(), tally.h_s);
        result.x.insert(option_id.clone(), tally.x);
    }

    result.verified = true;
    Ok(result)
}
