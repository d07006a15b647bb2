use crate::*;
use content_inspector::ContentType;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Composite key for per-voter records
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VoterKey {
    pub voter_id: String,
    pub election_id: String,
    pub contest_id: String,
}

impl VoterKey {
    pub fn new(voter_id: &str, election_id: &str, contest_id: &str) -> Self {
        VoterKey {
            voter_id: voter_id.to_owned(),
            election_id: election_id.to_owned(),
            contest_id: contest_id.to_owned(),
        }
    }
}

impl fmt::Display for VoterKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} (election {}, contest {})",
            self.voter_id, self.election_id, self.contest_id
        )
    }
}

/// A read-only view of elections, registrations and votes
pub trait Store {
    /// Get an election configuration
    fn get_election(&self, election_id: &str) -> Option<&ElectionConfig>;

    /// Get a voter registration
    fn get_registration(&self, key: &VoterKey) -> Option<&VoterRegistration>;

    /// Get a submitted vote
    fn get_vote(&self, key: &VoterKey) -> Option<&VoteRecord>;

    /// All votes for one contest, in key order
    fn votes_for_contest(&self, election_id: &str, contest_id: &str) -> Vec<&VoteRecord>;

    /// Number of voters registered for one contest
    fn count_registrations(&self, election_id: &str, contest_id: &str) -> usize;
}

/// A simple store that uses in-memory BTreeMaps
#[derive(Default, Clone, Debug)]
pub struct MemStore {
    elections: BTreeMap<String, ElectionConfig>,
    registrations: BTreeMap<VoterKey, VoterRegistration>,
    votes: BTreeMap<VoterKey, VoteRecord>,
}

impl MemStore {
    pub fn set_election(&mut self, election: ElectionConfig) {
        self.elections.insert(election.election_id.clone(), election);
    }

    pub fn set_registration(&mut self, registration: VoterRegistration) {
        self.registrations.insert(registration.key(), registration);
    }

    pub fn set_vote(&mut self, vote: VoteRecord) {
        self.votes.insert(vote.key(), vote);
    }

    pub fn clear(&mut self) {
        self.elections.clear();
        self.registrations.clear();
        self.votes.clear();
    }
}

impl Store for MemStore {
    fn get_election(&self, election_id: &str) -> Option<&ElectionConfig> {
        self.elections.get(election_id)
    }

    fn get_registration(&self, key: &VoterKey) -> Option<&VoterRegistration> {
        self.registrations.get(key)
    }

    fn get_vote(&self, key: &VoterKey) -> Option<&VoteRecord> {
        self.votes.get(key)
    }

    fn votes_for_contest(&self, election_id: &str, contest_id: &str) -> Vec<&VoteRecord> {
        self.votes
            .values()
            .filter(|v| v.election_id == election_id && v.contest_id == contest_id)
            .collect()
    }

    fn count_registrations(&self, election_id: &str, contest_id: &str) -> usize {
        self.registrations
            .keys()
            .filter(|k| k.election_id == election_id && k.contest_id == contest_id)
            .count()
    }
}

/// The public record of one election: its configuration and every vote cast.
///
/// Anyone holding a bulletin board can recompute and check the tally.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct BulletinBoard {
    pub election: ElectionConfig,
    pub votes: Vec<VoteRecord>,
}

impl BulletinBoard {
    /// Snapshot one election out of a store
    pub fn from_store<S: Store>(store: &S, election_id: &str) -> Result<Self, ValidationError> {
        let election = store
            .get_election(election_id)
            .ok_or_else(|| ValidationError::ElectionNotFound(election_id.to_owned()))?
            .clone();
        let votes = store
            .votes_for_contest(&election.election_id, &election.contest_id)
            .into_iter()
            .cloned()
            .collect();

        Ok(BulletinBoard { election, votes })
    }

    /// Unpack from JSON or CBOR bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        // CBOR without NUL bytes also inspects as UTF-8, so JSON is
        // recognized by its opening brace
        match content_inspector::inspect(bytes) {
            ContentType::UTF_8 if looks_like_json(bytes) => Ok(serde_json::from_slice(bytes)?),
            ContentType::UTF_8 | ContentType::BINARY => Ok(serde_cbor::from_slice(bytes)?),
            _ => Err(Error::DeserializationUnknownFormat),
        }
    }

    pub fn to_json(&self) -> Vec<u8> {
        serde_json::to_vec_pretty(self)
            .expect("blindvote: Unexpected error serializing bulletin board")
    }

    pub fn to_cbor(&self) -> Vec<u8> {
        serde_cbor::to_vec(self).expect("blindvote: Unexpected error packing bulletin board")
    }

    /// Load into a fresh store without re-validating the votes
    pub fn into_store(self) -> MemStore {
        let mut store = MemStore::default();
        store.set_election(self.election);
        for vote in self.votes {
            store.set_vote(vote);
        }
        store
    }

    /// Check the configuration and every published vote, anchor proofs
    /// included. Each voter may appear once.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.election.validate()?;

        let mut seen: BTreeSet<VoterKey> = BTreeSet::new();
        for vote in self.votes.iter() {
            vote.validate(&self.election)?;
            if !seen.insert(vote.key()) {
                return Err(ValidationError::DuplicateVote(vote.key()));
            }
        }
        Ok(())
    }

    /// Validate, then recompute the election result from the published votes
    pub fn tally(&self) -> Result<ElectionResult, ValidationError> {
        self.validate()?;
        let store = self.clone().into_store();
        tally_election(&store, &self.election.election_id)
    }
}

fn looks_like_json(bytes: &[u8]) -> bool {
    bytes
        .iter()
        .find(|b| !b.is_ascii_whitespace())
        .map_or(false, |b| *b == b'{')
}
