//! Pedersen commitments and anchors.
//!
//! A commitment is `C = g^m · h^r` with `m ∈ {0, 1}`; an anchor is the
//! randomness alone, `H = h^r`. Summing commitments and subtracting the sum of
//! the matching anchors leaves `g^M`, where `M` counts the ones.

use crate::*;
use curve25519_dalek::ristretto::RistrettoPoint;
use curve25519_dalek::scalar::Scalar;
use std::borrow::Borrow;
use std::fmt;

/// A Pedersen commitment `C = g^m · h^r`
#[derive(Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct Commitment(#[serde(with = "RistrettoPointHex")] RistrettoPoint);

/// An anchor `H = h^r`: a commitment to no message
#[derive(Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct Anchor(#[serde(with = "RistrettoPointHex")] RistrettoPoint);

/// What is left of an aggregate once its anchors are subtracted, `X = g^M`
#[derive(Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct Residue(#[serde(with = "RistrettoPointHex")] RistrettoPoint);

/// Commit to `m` with randomness `r`.
pub fn commit(m: u64, r: &Scalar) -> Result<Commitment, Error> {
    check_randomness(r)?;
    let hr = secondary_generator() * r;
    match m {
        0 => Ok(Commitment(hr)),
        1 => Ok(Commitment(base_generator() + hr)),
        _ => Err(Error::InvalidMessage(m)),
    }
}

/// Create the anchor `h^r` for randomness `r`.
pub fn anchor(r: &Scalar) -> Result<Anchor, Error> {
    check_randomness(r)?;
    Ok(Anchor(secondary_generator() * r))
}

/// Homomorphically add group elements. The empty sum is the identity.
pub fn combine<I>(elements: I) -> RistrettoPoint
where
    I: IntoIterator,
    I::Item: Borrow<RistrettoPoint>,
{
    elements
        .into_iter()
        .fold(identity(), |acc, p| acc + p.borrow())
}

/// Cancel the aggregate randomness: `C_agg - H_S`.
///
/// Equals `g^M` whenever every `r` in `c_agg` was also contributed to `h_s`.
pub fn cancel(c_agg: &Commitment, h_s: &Anchor) -> Residue {
    Residue(c_agg.0 + negate(&h_s.0))
}

fn check_randomness(r: &Scalar) -> Result<(), Error> {
    if *r == Scalar::zero() {
        return Err(Error::InvalidRandomness);
    }
    Ok(())
}

macro_rules! point_newtype {
    ($name:ident) => {
        impl $name {
            /// Wrap a raw group element
            pub fn from_point(point: RistrettoPoint) -> Self {
                $name(point)
            }

            /// Homomorphic sum; identity for an empty input
            pub fn combine<'a, I: IntoIterator<Item = &'a $name>>(items: I) -> Self {
                $name(combine(items.into_iter().map(|item| item.0)))
            }

            pub fn as_point(&self) -> &RistrettoPoint {
                &self.0
            }

            /// Canonical 32-byte encoding
            pub fn to_bytes(&self) -> [u8; POINT_LENGTH] {
                encode(&self.0)
            }

            pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
                Ok($name(decode(bytes)?))
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), hex::encode(self.to_bytes()))
            }
        }

        impl AsRef<RistrettoPoint> for $name {
            fn as_ref(&self) -> &RistrettoPoint {
                &self.0
            }
        }
    };
}

point_newtype!(Commitment);
point_newtype!(Anchor);
point_newtype!(Residue);

impl Commitment {
    /// Check that this commitment opens to `(m, r)`.
    pub fn verify_opening(&self, m: u64, r: &Scalar) -> bool {
        match commit(m, r) {
            Ok(expected) => points_equal(&expected.0, &self.0),
            Err(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaChaRng;

    #[test]
    fn test_commit_rules() {
        let r = Scalar::from(42u64);
        assert!(commit(0, &r).is_ok());
        assert!(commit(1, &r).is_ok());

        match commit(2, &r) {
            Err(Error::InvalidMessage(2)) => {}
            other => panic!("expected InvalidMessage, got {:?}", other),
        }
        match commit(1, &Scalar::zero()) {
            Err(Error::InvalidRandomness) => {}
            other => panic!("expected InvalidRandomness, got {:?}", other),
        }
        assert!(anchor(&Scalar::zero()).is_err());
    }

    #[test]
    fn test_commit_zero_equals_anchor() {
        let r = Scalar::from(7u64);
        assert_eq!(commit(0, &r).unwrap().to_bytes(), anchor(&r).unwrap().to_bytes());

        // m = 1 is the same formula with the g term present
        let one = commit(1, &r).unwrap();
        let expected = base_generator() * Scalar::one() + secondary_generator() * r;
        assert!(points_equal(one.as_point(), &expected));
    }

    #[test]
    fn test_homomorphism() {
        // combine(C(m_i, r_i)) == g^(sum m) * h^(sum r), built directly
        let mut rng = ChaChaRng::seed_from_u64(3);
        let messages = [1u64, 0, 1, 1, 0, 0, 1];
        let randomness: Vec<Scalar> = messages
            .iter()
            .map(|_| random_scalar_from(&mut rng))
            .collect();

        let commitments: Vec<Commitment> = messages
            .iter()
            .zip(randomness.iter())
            .map(|(m, r)| commit(*m, r).unwrap())
            .collect();

        let sum_m: u64 = messages.iter().sum();
        let sum_r: Scalar = randomness.iter().sum();
        let expected = base_generator() * Scalar::from(sum_m) + secondary_generator() * sum_r;

        assert!(points_equal(Commitment::combine(&commitments).as_point(), &expected));
    }

    #[test]
    fn test_cancellation_identity() {
        let mut rng = ChaChaRng::seed_from_u64(4);
        let messages = [0u64, 1, 1, 0, 1];
        let randomness: Vec<Scalar> = messages
            .iter()
            .map(|_| random_scalar_from(&mut rng))
            .collect();

        let commitments: Vec<Commitment> = messages
            .iter()
            .zip(randomness.iter())
            .map(|(m, r)| commit(*m, r).unwrap())
            .collect();
        let anchors: Vec<Anchor> = randomness.iter().map(|r| anchor(r).unwrap()).collect();

        let x = cancel(&Commitment::combine(&commitments), &Anchor::combine(&anchors));
        assert!(points_equal(x.as_point(), &(base_generator() * Scalar::from(3u64))));

        // Dropping one anchor breaks the identity
        let partial = Anchor::combine(&anchors[1..]);
        let y = cancel(&Commitment::combine(&commitments), &partial);
        assert!(!points_equal(y.as_point(), &(base_generator() * Scalar::from(3u64))));
    }

    #[test]
    fn test_combine_empty_is_identity() {
        let none: Vec<RistrettoPoint> = vec![];
        assert_eq!(combine(none), identity());
        assert_eq!(Commitment::combine(&[]).to_bytes(), [0u8; 32]);
    }

    #[test]
    fn test_verify_opening() {
        let r = Scalar::from(99u64);
        let c = commit(1, &r).unwrap();
        assert!(c.verify_opening(1, &r));
        assert!(!c.verify_opening(0, &r));
        assert!(!c.verify_opening(1, &Scalar::from(98u64)));
        assert!(!c.verify_opening(5, &r));
    }

    #[test]
    fn test_bytes_and_serde() {
        let a = anchor(&Scalar::from(11u64)).unwrap();
        assert_eq!(Anchor::from_bytes(&a.to_bytes()).unwrap(), a);
        assert!(Anchor::from_bytes(&[1u8; 32]).is_err());

        let json = serde_json::to_string(&a).unwrap();
        assert_eq!(json, format!("\"{}\"", hex::encode(a.to_bytes())));
        let back: Anchor = serde_json::from_str(&json).unwrap();
        assert_eq!(back, a);
    }
}
