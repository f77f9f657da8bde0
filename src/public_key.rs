//! SEC1 public key parsing and serialization.

use crate::arithmetic::{decompress_y, FieldElement, ProjectivePoint, CURVE_B};
use crate::error::Error;
use subtle::Choice;

/// Length of a compressed public key: format byte plus X.
const COMPRESSED_LEN: usize = 33;
/// Length of an uncompressed or hybrid public key: format byte, X and Y.
const UNCOMPRESSED_LEN: usize = 65;

/// SEC1 format byte for a compressed key with even Y.
const FORMAT_COMPRESSED_EVEN: u8 = 0x02;
/// SEC1 format byte for a compressed key with odd Y.
const FORMAT_COMPRESSED_ODD: u8 = 0x03;
/// SEC1 format byte for an uncompressed key.
const FORMAT_UNCOMPRESSED: u8 = 0x04;
/// SEC1 format byte for a hybrid key with even Y.
const FORMAT_HYBRID_EVEN: u8 = 0x06;
/// SEC1 format byte for a hybrid key with odd Y.
const FORMAT_HYBRID_ODD: u8 = 0x07;

/// A validated secp256k1 public key in affine coordinates.
///
/// Parsing guarantees both coordinates are canonical field elements and that
/// the point satisfies the curve equation; the point at infinity is not
/// representable.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PublicKey {
    x: FieldElement,
    y: FieldElement,
}

impl PublicKey {
    /// Builds a public key directly from affine coordinates.
    ///
    /// The coordinates are not checked against the curve equation; this is
    /// intended for coordinates produced by the group operations themselves.
    pub(crate) fn from_affine_unchecked(x: FieldElement, y: FieldElement) -> Self {
        Self { x, y }
    }

    /// Parses a public key in any of the SEC1 encodings:
    ///
    /// * compressed (33 bytes): `0x02/0x03 || X`, where the format byte
    ///   carries the oddness of Y;
    /// * uncompressed (65 bytes): `0x04 || X || Y`;
    /// * hybrid (65 bytes): `0x06/0x07 || X || Y`, where the format byte
    ///   must agree with the oddness of Y.
    pub fn from_sec1_bytes(bytes: &[u8]) -> Result<Self, Error> {
        match bytes.len() {
            COMPRESSED_LEN => {
                let format = bytes[0];
                let odd = match format {
                    FORMAT_COMPRESSED_EVEN => Choice::from(0),
                    FORMAT_COMPRESSED_ODD => Choice::from(1),
                    _ => return Err(Error::PubKeyInvalidFormat),
                };

                let x_bytes: [u8; 32] = bytes[1..33].try_into().expect("length checked");
                let x = Option::<FieldElement>::from(FieldElement::from_bytes(&x_bytes))
                    .ok_or(Error::PubKeyXTooBig)?;
                let y = Option::<FieldElement>::from(decompress_y(&x, odd))
                    .ok_or(Error::PubKeyNotOnCurve)?;
                Ok(Self { x, y: y.normalize() })
            }
            UNCOMPRESSED_LEN => {
                let format = bytes[0];
                let hybrid_odd = match format {
                    FORMAT_UNCOMPRESSED => None,
                    FORMAT_HYBRID_EVEN => Some(false),
                    FORMAT_HYBRID_ODD => Some(true),
                    _ => return Err(Error::PubKeyInvalidFormat),
                };

                let x_bytes: [u8; 32] = bytes[1..33].try_into().expect("length checked");
                let y_bytes: [u8; 32] = bytes[33..65].try_into().expect("length checked");
                let x = Option::<FieldElement>::from(FieldElement::from_bytes(&x_bytes))
                    .ok_or(Error::PubKeyXTooBig)?;
                let y = Option::<FieldElement>::from(FieldElement::from_bytes(&y_bytes))
                    .ok_or(Error::PubKeyYTooBig)?;

                if let Some(want_odd) = hybrid_odd {
                    if bool::from(y.is_odd()) != want_odd {
                        return Err(Error::PubKeyMismatchedOddness);
                    }
                }

                // y² = x³ + 7 must hold; this also rejects the (0, 0)
                // encoding of the point at infinity.
                let lhs = y.square().normalize();
                let rhs = x.square().mul(&x).add(&CURVE_B).normalize();
                if lhs != rhs {
                    return Err(Error::PubKeyNotOnCurve);
                }
                Ok(Self { x, y })
            }
            _ => Err(Error::PubKeyInvalidLen),
        }
    }

    /// Serializes to the 33-byte SEC1 compressed form.
    pub fn to_sec1_compressed(&self) -> [u8; COMPRESSED_LEN] {
        let mut out = [0u8; COMPRESSED_LEN];
        out[0] = if bool::from(self.y.is_odd()) {
            FORMAT_COMPRESSED_ODD
        } else {
            FORMAT_COMPRESSED_EVEN
        };
        out[1..].copy_from_slice(&self.x.to_bytes());
        out
    }

    /// Serializes to the 65-byte SEC1 uncompressed form.
    pub fn to_sec1_uncompressed(&self) -> [u8; UNCOMPRESSED_LEN] {
        let mut out = [0u8; UNCOMPRESSED_LEN];
        out[0] = FORMAT_UNCOMPRESSED;
        out[1..33].copy_from_slice(&self.x.to_bytes());
        out[33..].copy_from_slice(&self.y.to_bytes());
        out
    }

    /// The affine x coordinate.
    pub fn x(&self) -> FieldElement {
        self.x
    }

    /// The affine y coordinate.
    pub fn y(&self) -> FieldElement {
        self.y
    }

    /// The point in Jacobian coordinates (Z = 1).
    pub fn to_projective(&self) -> ProjectivePoint {
        ProjectivePoint::from_affine(self.x, self.y)
    }
}
