use crate::VoterKey;
use thiserror::Error;

/// Error types
#[derive(Debug, Error)]
pub enum Error {
    #[error("blindvote: invalid encoding - malformed or non-canonical bytes")]
    InvalidEncoding,

    #[error("blindvote: invalid message {0} - commitment message must be 0 or 1")]
    InvalidMessage(u64),

    #[error("blindvote: invalid randomness - randomness cannot be zero")]
    InvalidRandomness,

    #[error("blindvote: anchor/ballot mismatch: {ballots} ballots, {anchors} anchors")]
    AnchorBallotMismatch { ballots: usize, anchors: usize },

    #[error("blindvote: small-range discrete log not found within bound {bound}")]
    DiscreteLogNotFound { bound: u64 },

    #[error("blindvote: tally bound {bound} exceeds the maximum of {max}")]
    BoundTooLarge { bound: u64, max: u64 },

    #[error("blindvote: final check failed - recovered tally does not reproduce the aggregate")]
    FinalCheckFailed,

    #[error("blindvote: invalid identifier {0:?} - must be non-empty and must not contain '|'")]
    InvalidIdentifier(String),

    #[error("blindvote: invalid option {0}")]
    InvalidOption(String),

    #[error("blindvote: duplicate option {0}")]
    DuplicateOption(String),

    #[error("blindvote: CBOR error deserializing bulletin board: {0}")]
    CBORDeserialization(#[from] serde_cbor::Error),

    #[error("blindvote: JSON error deserializing bulletin board: {0}")]
    JSONDeserialization(#[from] serde_json::Error),

    #[error("blindvote: error deserializing bulletin board: unknown format")]
    DeserializationUnknownFormat,
}

/// Election, registration and vote validation errors
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("blindvote validation: election {0} not found")]
    ElectionNotFound(String),

    #[error("blindvote validation: election {0} already exists")]
    ElectionExists(String),

    #[error("blindvote validation: election must have at least one option")]
    NoOptions,

    #[error("blindvote validation: voter {0} already registered")]
    VoterAlreadyRegistered(VoterKey),

    #[error("blindvote validation: voter {0} not registered")]
    VoterNotRegistered(VoterKey),

    #[error("blindvote validation: missing commitment, anchor or anchor proof for option {0}")]
    MissingOptionArtifacts(String),

    #[error("blindvote validation: vote contains option {0} which is not in the election")]
    UnexpectedOption(String),

    #[error("blindvote validation: anchor proof for option {0} failed to verify")]
    AnchorProofInvalid(String),

    #[error("blindvote validation: election {0} must be single-choice without abstention")]
    UnsupportedElection(String),

    #[error("blindvote validation: more than one vote for voter {0}")]
    DuplicateVote(VoterKey),

    #[error("blindvote validation: vote does not belong to election {0}")]
    ElectionMismatch(String),

    #[error("blindvote validation: {0}")]
    Crypto(#[from] Error),
}
