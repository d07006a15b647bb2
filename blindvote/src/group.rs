//! Group arithmetic over ristretto255.
//!
//! Points travel as their 32-byte canonical encoding, scalars as 32-byte
//! big-endian integers modulo the group order.

use crate::*;
use curve25519_dalek::constants::RISTRETTO_BASEPOINT_POINT;
use curve25519_dalek::ristretto::{CompressedRistretto, RistrettoPoint};
use curve25519_dalek::scalar::Scalar;
use curve25519_dalek::traits::Identity;
use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};
use std::convert::TryInto;

/// Length of a canonical point encoding
pub const POINT_LENGTH: usize = 32;

/// Length of a scalar encoding
pub const SCALAR_LENGTH: usize = 32;

/// Public domain string the secondary generator is derived from.
pub const H_GENERATOR_DOMAIN: &str = "auvo/vote/h-generator/v1";

// q = 2^252 + 27742317777372353535851937790883648493, big-endian
const GROUP_ORDER: [u8; SCALAR_LENGTH] = [
    0x10, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x14, 0xde, 0xf9, 0xde, 0xa2, 0xf7, 0x9c, 0xd6, 0x58, 0x12, 0x63, 0x1a, 0x5c, 0xf5, 0xd3, 0xed,
];

lazy_static! {
    static ref H_GENERATOR: RistrettoPoint = derive_secondary_generator();
}

fn derive_secondary_generator() -> RistrettoPoint {
    // The domain string is zero-padded to 64 bytes and fed through the
    // ristretto255 one-way map. Nobody knows log_g(h).
    let mut uniform = [0u8; 64];
    let domain = H_GENERATOR_DOMAIN.as_bytes();
    uniform[..domain.len()].copy_from_slice(domain);
    RistrettoPoint::from_uniform_bytes(&uniform)
}

/// The standard ristretto255 base point `g`.
pub fn base_generator() -> RistrettoPoint {
    RISTRETTO_BASEPOINT_POINT
}

/// The secondary generator `h`, computed once per process.
pub fn secondary_generator() -> RistrettoPoint {
    *H_GENERATOR
}

/// The group identity (the encoding of which is 32 zero bytes).
pub fn identity() -> RistrettoPoint {
    RistrettoPoint::identity()
}

/// The group order `q`, big-endian.
pub fn group_order() -> [u8; SCALAR_LENGTH] {
    GROUP_ORDER
}

/// Encode a point to its canonical 32-byte form.
pub fn encode(point: &RistrettoPoint) -> [u8; POINT_LENGTH] {
    point.compress().to_bytes()
}

/// Decode a canonical point encoding.
///
/// Wrong lengths, bytes that are not a valid ristretto255 encoding, and
/// non-canonical encodings are all rejected with `Error::InvalidEncoding`.
pub fn decode(bytes: &[u8]) -> Result<RistrettoPoint, Error> {
    let bytes: [u8; POINT_LENGTH] = bytes.try_into().map_err(|_| Error::InvalidEncoding)?;
    CompressedRistretto(bytes)
        .decompress()
        .ok_or(Error::InvalidEncoding)
}

pub fn add(p: &RistrettoPoint, q: &RistrettoPoint) -> RistrettoPoint {
    p + q
}

pub fn negate(p: &RistrettoPoint) -> RistrettoPoint {
    -p
}

pub fn scalar_multiply(p: &RistrettoPoint, s: &Scalar) -> RistrettoPoint {
    p * s
}

/// Point equality on canonical encodings.
pub fn points_equal(a: &RistrettoPoint, b: &RistrettoPoint) -> bool {
    encode(a) == encode(b)
}

/// Encode a scalar as a 32-byte big-endian integer.
pub fn encode_scalar(s: &Scalar) -> [u8; SCALAR_LENGTH] {
    let mut bytes = s.to_bytes();
    bytes.reverse();
    bytes
}

/// Decode a 32-byte big-endian scalar. Values >= q are rejected.
pub fn decode_scalar(bytes: &[u8]) -> Result<Scalar, Error> {
    let mut bytes: [u8; SCALAR_LENGTH] = bytes.try_into().map_err(|_| Error::InvalidEncoding)?;
    bytes.reverse();
    Scalar::from_canonical_bytes(bytes).ok_or(Error::InvalidEncoding)
}

/// Reduce a 64-byte big-endian integer modulo q.
pub(crate) fn scalar_from_wide_be(wide: &[u8; 64]) -> Scalar {
    let mut le = *wide;
    le.reverse();
    Scalar::from_bytes_mod_order_wide(&le)
}

/// Draw a uniform scalar in [1, q-1] from the OS random source.
pub fn random_scalar() -> Scalar {
    random_scalar_from(&mut OsRng)
}

/// Draw a uniform scalar in [1, q-1].
///
/// 64 random bytes are reduced modulo q, so the bias is negligible; zero is
/// rejected and redrawn.
pub fn random_scalar_from<R: RngCore + CryptoRng>(rng: &mut R) -> Scalar {
    loop {
        let mut wide = [0u8; 64];
        rng.fill_bytes(&mut wide);
        let s = Scalar::from_bytes_mod_order_wide(&wide);
        if s != Scalar::zero() {
            return s;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaChaRng;

    #[test]
    fn test_encoding_roundtrip() {
        let mut rng = ChaChaRng::seed_from_u64(1);
        for _ in 0..16 {
            let p = base_generator() * random_scalar_from(&mut rng);
            let bytes = encode(&p);
            assert_eq!(decode(&bytes).unwrap(), p);
            assert_eq!(encode(&decode(&bytes).unwrap()), bytes);
        }

        // Identity encodes as all zeros
        assert_eq!(encode(&identity()), [0u8; 32]);
        assert_eq!(decode(&[0u8; 32]).unwrap(), identity());
    }

    #[test]
    fn test_decode_rejects_bad_bytes() {
        // Wrong length
        assert!(decode(&[0u8; 31]).is_err());
        assert!(decode(&[0u8; 33]).is_err());
        assert!(decode(&[]).is_err());

        // Negative field element (low bit set) is non-canonical in ristretto255
        let mut bad = [0u8; 32];
        bad[0] = 1;
        assert!(decode(&bad).is_err());

        // Field element >= p
        assert!(decode(&[0xff; 32]).is_err());
    }

    #[test]
    fn test_generators() {
        let g = base_generator();
        let h = secondary_generator();
        assert!(!points_equal(&g, &h));
        assert!(!points_equal(&h, &identity()));

        // Same h every time
        assert_eq!(encode(&secondary_generator()), encode(&h));
        assert_eq!(encode(&derive_secondary_generator()), encode(&h));
    }

    #[test]
    fn test_group_order() {
        let mut le = group_order();
        le.reverse();

        // q reduces to zero, q - 1 is canonical
        assert_eq!(Scalar::from_bytes_mod_order(le), Scalar::zero());
        assert!(Scalar::from_canonical_bytes(le).is_none());

        let minus_one = Scalar::zero() - Scalar::one();
        let mut expected = group_order();
        expected[31] -= 1;
        assert_eq!(encode_scalar(&minus_one), expected);

        // g * q == identity
        assert_eq!(
            base_generator() * Scalar::from_bytes_mod_order(le),
            identity()
        );
    }

    #[test]
    fn test_scalar_encoding() {
        let s = Scalar::from(0x0102u64);
        let bytes = encode_scalar(&s);
        assert_eq!(bytes[30], 0x01);
        assert_eq!(bytes[31], 0x02);
        assert_eq!(decode_scalar(&bytes).unwrap(), s);

        // Values >= q are rejected rather than reduced
        assert!(decode_scalar(&group_order()).is_err());
        assert!(decode_scalar(&[0xff; 32]).is_err());
        assert!(decode_scalar(&[0u8; 16]).is_err());
    }

    #[test]
    fn test_wide_reduction_is_big_endian() {
        let mut wide = [0u8; 64];
        wide[63] = 7;
        assert_eq!(scalar_from_wide_be(&wide), Scalar::from(7u64));

        wide[62] = 1;
        assert_eq!(scalar_from_wide_be(&wide), Scalar::from(263u64));
    }

    #[test]
    fn test_arithmetic() {
        let g = base_generator();
        let two = Scalar::from(2u64);
        assert_eq!(add(&g, &g), scalar_multiply(&g, &two));
        assert_eq!(add(&g, &negate(&g)), identity());
    }

    #[test]
    fn test_random_scalar_nonzero() {
        let mut rng = ChaChaRng::seed_from_u64(9);
        for _ in 0..64 {
            assert_ne!(random_scalar_from(&mut rng), Scalar::zero());
        }
        assert_ne!(random_scalar(), random_scalar());
    }
}
