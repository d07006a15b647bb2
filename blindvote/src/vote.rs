use crate::*;
use curve25519_dalek::scalar::Scalar;
use indexmap::IndexMap;
use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};
use std::fmt;

/// A voter's base secret for one (election, contest).
///
/// Per-option randomness is derived from it on demand and never stored.
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct VoterSecret(#[serde(with = "ScalarHex")] Scalar);

impl VoterSecret {
    /// Generate a fresh secret in [1, q-1]
    pub fn generate() -> Self {
        VoterSecret(random_scalar())
    }

    pub fn generate_with_rng<R: RngCore + CryptoRng>(rng: &mut R) -> Self {
        VoterSecret(random_scalar_from(rng))
    }

    /// 32-byte big-endian encoding
    pub fn to_bytes(&self) -> [u8; SCALAR_LENGTH] {
        encode_scalar(&self.0)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        let scalar = decode_scalar(bytes)?;
        if scalar == Scalar::zero() {
            return Err(Error::InvalidRandomness);
        }
        Ok(VoterSecret(scalar))
    }
}

impl fmt::Debug for VoterSecret {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("VoterSecret(..)")
    }
}

/// Derive the randomness for one (voter, option) pair.
pub fn derive_option_randomness(
    secret: &VoterSecret,
    election_id: &str,
    contest_id: &str,
    option_id: &str,
) -> Result<Scalar, Error> {
    let ctx = Context::new(election_id, contest_id)?.for_option(option_id)?;
    Ok(option_randomness(secret, &ctx))
}

pub(crate) fn option_randomness(secret: &VoterSecret, option_ctx: &Context) -> Scalar {
    hash_to_scalar(&option_ctx.label(RANDOMNESS_DOMAIN), &[&secret.to_bytes()])
}

/// One voter's commitments, anchors and anchor proofs for every option of a
/// contest, in option order.
///
/// Exactly one commitment opens to 1. That one-hot property holds by
/// construction only: no bit proof or sum-to-one proof is attached, so a
/// verifier has to trust the voter's client on it.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Ballot {
    pub context: Context,
    pub chosen_option_id: String,
    pub commitments: IndexMap<String, Commitment>,
    pub anchors: IndexMap<String, Anchor>,
    pub anchor_proofs: IndexMap<String, AnchorProof>,
}

impl Ballot {
    /// Strip the choice and turn this ballot into a publishable vote record.
    pub fn into_record(self, voter_id: &str) -> VoteRecord {
        VoteRecord {
            voter_id: voter_id.to_owned(),
            election_id: self.context.election_id().to_owned(),
            contest_id: self.context.contest_id().to_owned(),
            commitments: self.commitments,
            anchors: self.anchors,
            anchor_proofs: self.anchor_proofs,
            submitted_at: None,
        }
    }
}

/// Build a one-hot ballot for `chosen_option_id` using OS randomness for the
/// anchor proofs.
pub fn build_ballot<S: AsRef<str>>(
    secret: &VoterSecret,
    ctx: &Context,
    chosen_option_id: &str,
    all_option_ids: &[S],
) -> Result<Ballot, Error> {
    build_ballot_with_rng(secret, ctx, chosen_option_id, all_option_ids, &mut OsRng)
}

pub fn build_ballot_with_rng<S: AsRef<str>, R: RngCore + CryptoRng>(
    secret: &VoterSecret,
    ctx: &Context,
    chosen_option_id: &str,
    all_option_ids: &[S],
    rng: &mut R,
) -> Result<Ballot, Error> {
    if !all_option_ids.iter().any(|o| o.as_ref() == chosen_option_id) {
        return Err(Error::InvalidOption(chosen_option_id.to_owned()));
    }

    let mut commitments: IndexMap<String, Commitment> = IndexMap::with_capacity(all_option_ids.len());
    let mut anchors: IndexMap<String, Anchor> = IndexMap::with_capacity(all_option_ids.len());
    let mut anchor_proofs: IndexMap<String, AnchorProof> = IndexMap::with_capacity(all_option_ids.len());

    for option_id in all_option_ids.iter() {
        let option_id: &str = option_id.as_ref();
        if commitments.contains_key(option_id) {
            return Err(Error::DuplicateOption(option_id.to_owned()));
        }
        let option_ctx = ctx.for_option(option_id)?;
        let r = option_randomness(secret, &option_ctx);

        let m = if option_id == chosen_option_id { 1 } else { 0 };
        let option_anchor = anchor(&r)?;
        let proof = prove_with_rng(&option_anchor, &r, &option_ctx, rng);

        commitments.insert(option_id.to_owned(), commit(m, &r)?);
        anchors.insert(option_id.to_owned(), option_anchor);
        anchor_proofs.insert(option_id.to_owned(), proof);
    }

    Ok(Ballot {
        context: ctx.clone(),
        chosen_option_id: chosen_option_id.to_owned(),
        commitments,
        anchors,
        anchor_proofs,
    })
}

/// A submitted vote as it appears on the bulletin board.
///
/// Carries no plaintext choice: only per-option commitments, anchors and
/// anchor proofs, keyed by option id in election option order.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct VoteRecord {
    pub voter_id: String,
    pub election_id: String,
    pub contest_id: String,
    pub commitments: IndexMap<String, Commitment>,
    pub anchors: IndexMap<String, Anchor>,
    pub anchor_proofs: IndexMap<String, AnchorProof>,

    /// Unix timestamp (seconds) set when the vote is accepted
    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submitted_at: Option<u64>,
}

impl VoteRecord {
    /// The store key for this record
    pub fn key(&self) -> VoterKey {
        VoterKey::new(&self.voter_id, &self.election_id, &self.contest_id)
    }

    /// Validate the record against its election.
    ///
    /// Every option needs a commitment, an anchor and an anchor proof that
    /// verifies under that option's context; no other options may appear.
    pub fn validate(&self, election: &ElectionConfig) -> Result<(), ValidationError> {
        if self.election_id != election.election_id || self.contest_id != election.contest_id {
            return Err(ValidationError::ElectionMismatch(election.election_id.clone()));
        }

        let extra = self
            .commitments
            .keys()
            .chain(self.anchors.keys())
            .chain(self.anchor_proofs.keys())
            .find(|option_id| !election.has_option(option_id));
        if let Some(option_id) = extra {
            return Err(ValidationError::UnexpectedOption(option_id.clone()));
        }

        let ctx = election.context()?;
        for option_id in election.options.iter() {
            let (anchor, proof) = match (
                self.commitments.get(option_id),
                self.anchors.get(option_id),
                self.anchor_proofs.get(option_id),
            ) {
                (Some(_), Some(anchor), Some(proof)) => (anchor, proof),
                _ => return Err(ValidationError::MissingOptionArtifacts(option_id.clone())),
            };

            if !verify(anchor, proof, &ctx.for_option(option_id)?) {
                return Err(ValidationError::AnchorProofInvalid(option_id.clone()));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaChaRng;

    fn ctx() -> Context {
        Context::new("election-1", "contest-1").unwrap()
    }

    #[test]
    fn test_randomness_is_reproducible_and_independent() {
        let mut rng = ChaChaRng::seed_from_u64(10);
        let secret = VoterSecret::generate_with_rng(&mut rng);

        let a1 = derive_option_randomness(&secret, "e", "c", "a").unwrap();
        let a2 = derive_option_randomness(&secret, "e", "c", "a").unwrap();
        let b = derive_option_randomness(&secret, "e", "c", "b").unwrap();
        let other_contest = derive_option_randomness(&secret, "e", "c2", "a").unwrap();

        assert_eq!(a1, a2);
        assert_ne!(a1, b);
        assert_ne!(a1, other_contest);

        let other_secret = VoterSecret::generate_with_rng(&mut rng);
        assert_ne!(a1, derive_option_randomness(&other_secret, "e", "c", "a").unwrap());

        assert!(derive_option_randomness(&secret, "e", "c", "a|b").is_err());
    }

    #[test]
    fn test_build_ballot_one_hot() {
        let mut rng = ChaChaRng::seed_from_u64(11);
        let secret = VoterSecret::generate_with_rng(&mut rng);
        let options = ["A", "B", "C"];

        let ballot = build_ballot_with_rng(&secret, &ctx(), "B", &options, &mut rng).unwrap();
        assert_eq!(ballot.commitments.keys().collect::<Vec<_>>(), vec!["A", "B", "C"]);
        assert_eq!(ballot.anchors.len(), 3);
        assert_eq!(ballot.anchor_proofs.len(), 3);

        for option_id in options.iter() {
            let r = derive_option_randomness(&secret, "election-1", "contest-1", option_id).unwrap();
            let m = if *option_id == "B" { 1 } else { 0 };
            assert!(ballot.commitments[*option_id].verify_opening(m, &r));
            assert_eq!(ballot.anchors[*option_id], anchor(&r).unwrap());

            let option_ctx = ctx().for_option(option_id).unwrap();
            assert!(verify(
                &ballot.anchors[*option_id],
                &ballot.anchor_proofs[*option_id],
                &option_ctx
            ));
        }
    }

    #[test]
    fn test_build_ballot_rejects_bad_options() {
        let secret = VoterSecret::generate();
        match build_ballot(&secret, &ctx(), "D", &["A", "B"]) {
            Err(Error::InvalidOption(o)) => assert_eq!(o, "D"),
            other => panic!("expected InvalidOption, got {:?}", other),
        }
        match build_ballot(&secret, &ctx(), "A", &["A", "B", "A"]) {
            Err(Error::DuplicateOption(o)) => assert_eq!(o, "A"),
            other => panic!("expected DuplicateOption, got {:?}", other),
        }
    }

    #[test]
    fn test_ballot_into_record() {
        let secret = VoterSecret::generate();
        let ballot = build_ballot(&secret, &ctx(), "A", &["A", "B"]).unwrap();
        let commitments = ballot.commitments.clone();

        let record = ballot.into_record("voter-1");
        assert_eq!(record.voter_id, "voter-1");
        assert_eq!(record.election_id, "election-1");
        assert_eq!(record.contest_id, "contest-1");
        assert_eq!(record.commitments, commitments);
    }

    #[test]
    fn test_voter_secret_bytes() {
        let secret = VoterSecret::generate();
        assert_eq!(VoterSecret::from_bytes(&secret.to_bytes()).unwrap(), secret);
        assert!(VoterSecret::from_bytes(&[0u8; 32]).is_err());
        assert_eq!(format!("{:?}", secret), "VoterSecret(..)");
    }
}
