use crate::*;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::debug;

/// Configuration of a single-contest election
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ElectionConfig {
    pub election_id: String,
    pub contest_id: String,

    /// Option ids, in ballot order
    pub options: Vec<String>,

    /// Selections per voter. Always 1: ballots are one-hot.
    pub max_votes: u32,

    pub allow_abstain: bool,
}

impl ElectionConfig {
    /// Create a one-hot election configuration
    pub fn new<S: AsRef<str>>(
        election_id: &str,
        contest_id: &str,
        options: &[S],
    ) -> Result<Self, ValidationError> {
        Context::new(election_id, contest_id)?;
        if options.is_empty() {
            return Err(ValidationError::NoOptions);
        }

        let mut checked: Vec<String> = Vec::with_capacity(options.len());
        for option in options {
            let option = check_identifier(option.as_ref())?;
            if checked.iter().any(|o| o == option) {
                return Err(Error::DuplicateOption(option.to_owned()).into());
            }
            checked.push(option.to_owned());
        }

        Ok(ElectionConfig {
            election_id: election_id.to_owned(),
            contest_id: contest_id.to_owned(),
            options: checked,
            max_votes: 1,
            allow_abstain: false,
        })
    }

    /// Check a configuration that did not come from `ElectionConfig::new`,
    /// such as one read from a bulletin board.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let rebuilt = ElectionConfig::new(&self.election_id, &self.contest_id, &self.options)?;
        if rebuilt != *self {
            return Err(ValidationError::UnsupportedElection(self.election_id.clone()));
        }
        Ok(())
    }

    /// Is this option on the ballot?
    pub fn has_option(&self, option_id: &str) -> bool {
        self.options.iter().any(|o| o == option_id)
    }

    /// Contest-level domain-separation context
    pub fn context(&self) -> Result<Context, Error> {
        Context::new(&self.election_id, &self.contest_id)
    }
}

/// A registered voter and their base secret
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct VoterRegistration {
    pub voter_id: String,
    pub election_id: String,
    pub contest_id: String,
    pub secret: VoterSecret,

    /// Unix timestamp (seconds)
    pub registered_at: u64,
}

impl VoterRegistration {
    pub fn key(&self) -> VoterKey {
        VoterKey::new(&self.voter_id, &self.election_id, &self.contest_id)
    }
}

/// Elections, registrations and votes in one place.
///
/// Creates elections, registers voters (one secret per voter and contest),
/// builds and accepts votes, and tallies.
#[derive(Default, Debug)]
pub struct VotingSystem {
    store: MemStore,
}

impl VotingSystem {
    pub fn new() -> Self {
        VotingSystem::default()
    }

    /// The underlying store
    pub fn store(&self) -> &MemStore {
        &self.store
    }

    /// Create a new election with the given options
    pub fn create_election<S: AsRef<str>>(
        &mut self,
        election_id: &str,
        contest_id: &str,
        options: &[S],
    ) -> Result<ElectionConfig, ValidationError> {
        if self.store.get_election(election_id).is_some() {
            return Err(ValidationError::ElectionExists(election_id.to_owned()));
        }

        let config = ElectionConfig::new(election_id, contest_id, options)?;
        self.store.set_election(config.clone());

        debug!(election = election_id, contest = contest_id, options = options.len(), "created election");
        Ok(config)
    }

    /// Register a voter, assigning a fresh base secret.
    ///
    /// A voter can register only once per election and contest.
    pub fn register_voter(
        &mut self,
        voter_id: &str,
        election_id: &str,
        contest_id: &str,
    ) -> Result<VoterRegistration, ValidationError> {
        let election = self.election(election_id)?;
        if election.contest_id != contest_id {
            return Err(ValidationError::ElectionMismatch(election_id.to_owned()));
        }

        let key = VoterKey::new(voter_id, election_id, contest_id);
        if self.store.get_registration(&key).is_some() {
            return Err(ValidationError::VoterAlreadyRegistered(key));
        }

        let registration = VoterRegistration {
            voter_id: voter_id.to_owned(),
            election_id: election_id.to_owned(),
            contest_id: contest_id.to_owned(),
            secret: VoterSecret::generate(),
            registered_at: unix_now(),
        };
        self.store.set_registration(registration.clone());

        debug!(voter = voter_id, election = election_id, "registered voter");
        Ok(registration)
    }

    /// Build a ballot for a registered voter from their stored secret
    pub fn generate_vote(
        &self,
        voter_id: &str,
        election_id: &str,
        contest_id: &str,
        chosen_option_id: &str,
    ) -> Result<Ballot, ValidationError> {
        let key = VoterKey::new(voter_id, election_id, contest_id);
        let registration = self
            .store
            .get_registration(&key)
            .ok_or_else(|| ValidationError::VoterNotRegistered(key.clone()))?;

        let election = self.election(election_id)?;
        let ballot = build_ballot(
            &registration.secret,
            &election.context()?,
            chosen_option_id,
            &election.options,
        )?;
        Ok(ballot)
    }

    /// Validate and accept a vote. A later vote replaces an earlier one.
    pub fn submit_vote(&mut self, mut vote: VoteRecord) -> Result<(), ValidationError> {
        let key = vote.key();
        if self.store.get_registration(&key).is_none() {
            return Err(ValidationError::VoterNotRegistered(key));
        }

        vote.validate(self.election(&vote.election_id)?)?;
        vote.submitted_at = Some(unix_now());

        debug!(voter = %key.voter_id, election = %key.election_id, "accepted vote");
        self.store.set_vote(vote);
        Ok(())
    }

    /// Add a vote reconstructed from a ballot store, without validation
    pub fn add_vote_for_tallying(&mut self, vote: VoteRecord) {
        self.store.set_vote(vote);
    }

    /// Tally every option of an election
    pub fn tally_election(&self, election_id: &str) -> Result<ElectionResult, ValidationError> {
        tally_election(&self.store, election_id)
    }

    /// Snapshot the public record of an election
    pub fn bulletin_board(&self, election_id: &str) -> Result<BulletinBoard, ValidationError> {
        BulletinBoard::from_store(&self.store, election_id)
    }

    pub fn get_voter(
        &self,
        voter_id: &str,
        election_id: &str,
        contest_id: &str,
    ) -> Option<&VoterRegistration> {
        self.store
            .get_registration(&VoterKey::new(voter_id, election_id, contest_id))
    }

    pub fn get_vote(&self, voter_id: &str, election_id: &str, contest_id: &str) -> Option<&VoteRecord> {
        self.store
            .get_vote(&VoterKey::new(voter_id, election_id, contest_id))
    }

    /// Drop all elections, registrations and votes
    pub fn clear(&mut self) {
        self.store.clear();
    }

    fn election(&self, election_id: &str) -> Result<&ElectionConfig, ValidationError> {
        self.store
            .get_election(election_id)
            .ok_or_else(|| ValidationError::ElectionNotFound(election_id.to_owned()))
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
