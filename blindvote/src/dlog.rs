//! Bounded discrete log by baby-step/giant-step.
//!
//! Given `X = g^M` with `M` known to lie in `[0, n_max]`, recover `M` in
//! `O(sqrt(n_max))` group operations.

use crate::*;
use curve25519_dalek::ristretto::RistrettoPoint;
use curve25519_dalek::scalar::Scalar;
use std::collections::HashMap;
use tracing::trace;

/// Largest accepted bound. Bounds are ballot counts, and this keeps the
/// table at about 65 thousand entries.
pub const MAX_TALLY_BOUND: u64 = 1 << 32;

/// Precomputed baby steps for a fixed bound.
///
/// Immutable once built, so one table can serve every option that shares the
/// same bound.
#[derive(Clone)]
pub struct BabyStepTable {
    n_max: u64,
    step: u64,
    table: HashMap<[u8; POINT_LENGTH], u64>,
    giant_step: RistrettoPoint,
}

impl BabyStepTable {
    /// Build the table for `M ∈ [0, n_max]`: `g^j -> j` for `j = 1..=m`,
    /// `m = ceil(sqrt(n_max + 1))`.
    ///
    /// `n_max` above `MAX_TALLY_BOUND` is `Error::BoundTooLarge`.
    pub fn new(n_max: u64) -> Result<Self, Error> {
        if n_max > MAX_TALLY_BOUND {
            return Err(Error::BoundTooLarge {
                bound: n_max,
                max: MAX_TALLY_BOUND,
            });
        }

        let step = ceil_sqrt(n_max.saturating_add(1));
        let g = base_generator();

        let mut table = HashMap::with_capacity(step as usize);
        let mut p = g;
        for j in 1..=step {
            table.insert(encode(&p), j);
            p += g;
        }

        let giant_step = -(g * Scalar::from(step));

        Ok(BabyStepTable {
            n_max,
            step,
            table,
            giant_step,
        })
    }

    /// The upper bound this table was built for
    pub fn bound(&self) -> u64 {
        self.n_max
    }

    /// Recover `M` from `X = g^M`.
    ///
    /// `Error::DiscreteLogNotFound` means no `M <= n_max` exists, which points
    /// at inconsistent inputs upstream rather than a search limit.
    pub fn solve(&self, x: &RistrettoPoint) -> Result<u64, Error> {
        if encode(x) == encode(&identity()) {
            return Ok(0);
        }

        let mut y = *x;
        for i in 0..=self.step {
            if let Some(j) = self.table.get(&encode(&y)) {
                let candidate = i.checked_mul(self.step).and_then(|im| im.checked_add(*j));
                match candidate {
                    Some(m) if m <= self.n_max => {
                        trace!(giant_steps = i, tally = m, "discrete log found");
                        return Ok(m);
                    }
                    _ => {}
                }
            }
            y += self.giant_step;
        }

        Err(Error::DiscreteLogNotFound { bound: self.n_max })
    }
}

/// Recover `M ∈ [0, n_max]` from `X = g^M`.
pub fn recover_tally(x: &RistrettoPoint, n_max: u64) -> Result<u64, Error> {
    BabyStepTable::new(n_max)?.solve(x)
}

/// Recover `M` from an encoded `X`.
pub fn recover_tally_bytes(x: &[u8], n_max: u64) -> Result<u64, Error> {
    recover_tally(&decode(x)?, n_max)
}

/// Smallest `m` with `m * m >= n`, by integer Newton iteration.
fn ceil_sqrt(n: u64) -> u64 {
    if n < 2 {
        return n;
    }
    let mut x = n;
    let mut y = n / 2 + n % 2;
    while y < x {
        x = y;
        y = (x + n / x) / 2;
    }
    if x * x == n {
        x
    } else {
        x + 1
    }
}
