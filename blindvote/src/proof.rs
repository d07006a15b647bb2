//! Schnorr proof of knowledge of an anchor opening, made non-interactive
//! with Fiat-Shamir.
//!
//! The prover shows `H = h^r` for some `r` it knows. The challenge is bound to
//! the election, contest and option, so a proof cannot be replayed against a
//! different anchor or context.

use crate::*;
use curve25519_dalek::ristretto::RistrettoPoint;
use curve25519_dalek::scalar::Scalar;
use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};

/// A proof `(T, s)` that an anchor is well-formed
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnchorProof {
    /// Commitment `T = h^k`
    #[serde(with = "RistrettoPointHex")]
    pub t: RistrettoPoint,

    /// Response `s = k + e·r mod q`
    #[serde(with = "ScalarHex")]
    pub s: Scalar,
}

impl AnchorProof {
    /// Serialize as `(T, s)`: canonical point encoding, big-endian scalar
    pub fn to_bytes(&self) -> ([u8; POINT_LENGTH], [u8; SCALAR_LENGTH]) {
        (encode(&self.t), encode_scalar(&self.s))
    }

    pub fn from_bytes(t: &[u8], s: &[u8]) -> Result<Self, Error> {
        Ok(AnchorProof {
            t: decode(t)?,
            s: decode_scalar(s)?,
        })
    }
}

fn challenge(anchor: &RistrettoPoint, t: &RistrettoPoint, ctx: &Context) -> Scalar {
    hash_to_scalar(
        &ctx.label(ANCHOR_PROOF_DOMAIN),
        &[
            &encode(&secondary_generator()),
            &encode(anchor),
            &encode(t),
        ],
    )
}

/// Prove knowledge of `r` such that `anchor = h^r`, using OS randomness.
pub fn prove(anchor: &Anchor, r: &Scalar, ctx: &Context) -> AnchorProof {
    prove_with_rng(anchor, r, ctx, &mut OsRng)
}

/// Prove knowledge of `r` such that `anchor = h^r`.
pub fn prove_with_rng<R: RngCore + CryptoRng>(
    anchor: &Anchor,
    r: &Scalar,
    ctx: &Context,
    rng: &mut R,
) -> AnchorProof {
    let k = random_scalar_from(rng);
    let t = secondary_generator() * k;
    let e = challenge(anchor.as_point(), &t, ctx);
    let s = k + e * r;

    AnchorProof { t, s }
}

/// Verify an anchor proof: `h^s == T + H^e`.
pub fn verify(anchor: &Anchor, proof: &AnchorProof, ctx: &Context) -> bool {
    let e = challenge(anchor.as_point(), &proof.t, ctx);
    let lhs = secondary_generator() * proof.s;
    let rhs = proof.t + anchor.as_point() * e;
    points_equal(&lhs, &rhs)
}

/// Verify an anchor proof given as raw bytes.
///
/// Malformed bytes are not an error here: a proof that cannot be decoded is
/// simply not valid.
pub fn verify_bytes(anchor: &[u8], t: &[u8], s: &[u8], ctx: &Context) -> bool {
    let anchor = match Anchor::from_bytes(anchor) {
        Ok(anchor) => anchor,
        Err(_) => return false,
    };
    match AnchorProof::from_bytes(t, s) {
        Ok(proof) => verify(&anchor, &proof, ctx),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaChaRng;

    fn setup(seed: u64) -> (Scalar, Anchor, Context, ChaChaRng) {
        let mut rng = ChaChaRng::seed_from_u64(seed);
        let r = random_scalar_from(&mut rng);
        let h = anchor(&r).unwrap();
        let ctx = Context::new("election-1", "contest-1")
            .unwrap()
            .for_option("option-a")
            .unwrap();
        (r, h, ctx, rng)
    }

    #[test]
    fn test_proof_verifies() {
        let (r, h, ctx, mut rng) = setup(1);
        for _ in 0..8 {
            let proof = prove_with_rng(&h, &r, &ctx, &mut rng);
            assert!(verify(&h, &proof, &ctx));
        }

        // OS randomness path
        let proof = prove(&h, &r, &ctx);
        assert!(verify(&h, &proof, &ctx));
    }

    #[test]
    fn test_proof_bound_to_context() {
        let (r, h, ctx, mut rng) = setup(2);
        let proof = prove_with_rng(&h, &r, &ctx, &mut rng);

        let other_option = Context::new("election-1", "contest-1")
            .unwrap()
            .for_option("option-b")
            .unwrap();
        let other_contest = Context::new("election-1", "contest-2")
            .unwrap()
            .for_option("option-a")
            .unwrap();
        let other_election = Context::new("election-2", "contest-1")
            .unwrap()
            .for_option("option-a")
            .unwrap();
        let no_option = Context::new("election-1", "contest-1").unwrap();

        assert!(!verify(&h, &proof, &other_option));
        assert!(!verify(&h, &proof, &other_contest));
        assert!(!verify(&h, &proof, &other_election));
        assert!(!verify(&h, &proof, &no_option));
    }

    #[test]
    fn test_proof_bound_to_anchor() {
        let (r, h, ctx, mut rng) = setup(3);
        let proof = prove_with_rng(&h, &r, &ctx, &mut rng);

        let other = anchor(&random_scalar_from(&mut rng)).unwrap();
        assert!(!verify(&other, &proof, &ctx));
    }

    #[test]
    fn test_proof_with_wrong_secret_fails() {
        let (r, h, ctx, mut rng) = setup(4);
        let wrong = r + Scalar::one();
        let proof = prove_with_rng(&h, &wrong, &ctx, &mut rng);
        assert!(!verify(&h, &proof, &ctx));
    }

    #[test]
    fn test_tampered_proof_fails() {
        let (r, h, ctx, mut rng) = setup(5);
        let proof = prove_with_rng(&h, &r, &ctx, &mut rng);

        let mut bad_s = proof;
        bad_s.s += Scalar::one();
        assert!(!verify(&h, &bad_s, &ctx));

        let mut bad_t = proof;
        bad_t.t += base_generator();
        assert!(!verify(&h, &bad_t, &ctx));
    }

    #[test]
    fn test_verify_bytes() {
        let (r, h, ctx, mut rng) = setup(6);
        let proof = prove_with_rng(&h, &r, &ctx, &mut rng);
        let (t, s) = proof.to_bytes();

        assert!(verify_bytes(&h.to_bytes(), &t, &s, &ctx));
        assert_eq!(AnchorProof::from_bytes(&t, &s).unwrap(), proof);

        // Malformed inputs return false rather than erroring
        assert!(!verify_bytes(&[0xff; 32], &t, &s, &ctx));
        assert!(!verify_bytes(&h.to_bytes(), &[0xff; 32], &s, &ctx));
        assert!(!verify_bytes(&h.to_bytes(), &t, &[0xff; 32], &ctx));
        assert!(!verify_bytes(&h.to_bytes(), &t[..31], &s, &ctx));
        assert!(!verify_bytes(&[], &[], &[], &ctx));
    }
}
