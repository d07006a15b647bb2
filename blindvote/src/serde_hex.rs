// Points and scalars are written as lowercase hex of their byte contract
// encodings, so a JSON bulletin board carries exactly the bytes another
// implementation would exchange.

use curve25519_dalek::ristretto::RistrettoPoint;
use curve25519_dalek::scalar::Scalar;
use std::borrow::Cow;

pub use hex_buffer_serde::Hex;

// a single-purpose type for use in `#[serde(with)]`
pub enum RistrettoPointHex {}

impl Hex<RistrettoPoint> for RistrettoPointHex {
    type Error = String;

    fn create_bytes(point: &RistrettoPoint) -> Cow<[u8]> {
        Cow::from(crate::encode(point).to_vec())
    }

    fn from_bytes(bytes: &[u8]) -> Result<RistrettoPoint, String> {
        crate::decode(bytes).map_err(|e| format!("{}", e))
    }
}

// a single-purpose type for use in `#[serde(with)]`
pub enum ScalarHex {}

impl Hex<Scalar> for ScalarHex {
    type Error = String;

    fn create_bytes(scalar: &Scalar) -> Cow<[u8]> {
        Cow::from(crate::encode_scalar(scalar).to_vec())
    }

    fn from_bytes(bytes: &[u8]) -> Result<Scalar, String> {
        crate::decode_scalar(bytes).map_err(|e| format!("{}", e))
    }
}
