//! Domain-separated hashing to scalars.

use crate::*;
use curve25519_dalek::scalar::Scalar;
use hmac::{Hmac, Mac, NewMac};
use sha2::Sha512;
use std::convert::TryFrom;
use std::fmt;

/// Separator between label fields. Identifiers may not contain it.
pub const LABEL_SEPARATOR: char = '|';

/// Label prefix for per-option randomness derivation
pub const RANDOMNESS_DOMAIN: &str = "randomness/v1";

/// Label prefix for anchor proof challenges
pub const ANCHOR_PROOF_DOMAIN: &str = "anchor/v1";

/// Hash a domain label and a sequence of byte strings to a scalar.
///
/// The label is the HMAC-SHA-512 key, the parts are the message. The 64-byte
/// digest is read as a big-endian integer and reduced modulo the group order.
pub fn hash_to_scalar(domain: &str, parts: &[&[u8]]) -> Scalar {
    let mut mac = Hmac::<Sha512>::new_from_slice(domain.as_bytes())
        .expect("blindvote: HMAC accepts keys of any length");
    for part in parts {
        mac.update(part);
    }

    let mut digest = [0u8; 64];
    digest.copy_from_slice(&mac.finalize().into_bytes());
    scalar_from_wide_be(&digest)
}

/// Domain-separation context: (election, contest, option?).
///
/// Never secret, and never part of the group arithmetic. It only decides
/// which scalar a given input hashes to.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
#[serde(try_from = "ContextFields")]
pub struct Context {
    election_id: String,
    contest_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    option_id: Option<String>,
}

#[derive(Deserialize)]
struct ContextFields {
    election_id: String,
    contest_id: String,
    #[serde(default)]
    option_id: Option<String>,
}

impl TryFrom<ContextFields> for Context {
    type Error = Error;

    fn try_from(fields: ContextFields) -> Result<Self, Error> {
        let ctx = Context::new(&fields.election_id, &fields.contest_id)?;
        match fields.option_id {
            Some(option_id) => ctx.for_option(&option_id),
            None => Ok(ctx),
        }
    }
}

impl Context {
    /// Create a contest-level context
    pub fn new(election_id: &str, contest_id: &str) -> Result<Self, Error> {
        Ok(Context {
            election_id: check_identifier(election_id)?.to_owned(),
            contest_id: check_identifier(contest_id)?.to_owned(),
            option_id: None,
        })
    }

    /// Narrow this context to a single option
    pub fn for_option(&self, option_id: &str) -> Result<Self, Error> {
        Ok(Context {
            election_id: self.election_id.clone(),
            contest_id: self.contest_id.clone(),
            option_id: Some(check_identifier(option_id)?.to_owned()),
        })
    }

    pub fn election_id(&self) -> &str {
        &self.election_id
    }

    pub fn contest_id(&self) -> &str {
        &self.contest_id
    }

    pub fn option_id(&self) -> Option<&str> {
        self.option_id.as_deref()
    }

    /// Build the hash label `<domain>|<election>|<contest>[|<option>]`.
    pub fn label(&self, domain: &str) -> String {
        let mut label = format!(
            "{}{}{}{}{}",
            domain, LABEL_SEPARATOR, self.election_id, LABEL_SEPARATOR, self.contest_id
        );
        if let Some(option_id) = &self.option_id {
            label.push(LABEL_SEPARATOR);
            label.push_str(option_id);
        }
        label
    }
}

impl fmt::Display for Context {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}/{}", self.election_id, self.contest_id)?;
        if let Some(option_id) = &self.option_id {
            write!(f, "/{}", option_id)?;
        }
        Ok(())
    }
}

/// Identifiers must be non-empty and free of the label separator.
pub fn check_identifier(id: &str) -> Result<&str, Error> {
    if id.is_empty() || id.contains(LABEL_SEPARATOR) {
        return Err(Error::InvalidIdentifier(id.to_owned()));
    }
    Ok(id)
}
