//! Privacy-preserving tallying with Pedersen commitments over ristretto255.
//!
//! Each voter commits to a one-hot vector (one commitment per option) and
//! publishes, next to each commitment, an anchor `h^r` for the same
//! randomness and a Schnorr proof that the anchor is well-formed. Summing the
//! commitments and anchors of an option and subtracting leaves `g^M`, from
//! which the option's count `M` is recovered with a bounded discrete log. No
//! individual ballot is ever opened.
//!
//! Ballots carry no bit or sum-to-one proofs: the one-hot property is trusted.

#[macro_use]
extern crate serde;

#[macro_use]
extern crate lazy_static;

mod commitment;
mod dlog;
mod election;
mod error;
mod group;
mod hash;
mod proof;
mod serde_hex;
mod store;
mod tally;
mod vote;

pub use commitment::*;
pub use dlog::*;
pub use election::*;
pub use error::*;
pub use group::*;
pub use hash::*;
pub use proof::*;
pub use serde_hex::*;
pub use store::*;
pub use tally::*;
pub use vote::*;
