//! Pure Rust secp256k1 elliptic curve and ECDSA.
//!
//! This crate is a self-contained implementation of the secp256k1 Koblitz
//! curve (y² = x³ + 7 over GF(p), p = 2²⁵⁶ − 2³² − 977) and the pieces a
//! transaction signer needs on top of it:
//!
//! * field arithmetic in a 10×26-limb representation with deferred
//!   reduction, and scalar arithmetic modulo the group order;
//! * Jacobian-coordinate group operations with endomorphism-accelerated
//!   variable-time scalar multiplication and a precomputed table for
//!   base-point multiplication;
//! * deterministic ECDSA per RFC 6979 with low-S (BIP 62) normalization,
//!   DER and 65-byte compact codecs, and public key recovery;
//! * SEC1 public key parsing/serialization and ECDH shared secrets.
//!
//! # Signing, verifying, recovering
//!
//! ```
//! use rand_core::OsRng;
//! use secp256k1_kit::{ecdsa, SecretKey};
//! use sha2::{Digest, Sha256};
//!
//! let secret_key = SecretKey::random(&mut OsRng);
//! let public_key = secret_key.public_key();
//!
//! let digest = Sha256::digest(b"message to sign");
//! let signature = ecdsa::sign(&secret_key, &digest);
//!
//! assert!(signature.verify_prehash(&digest, &public_key));
//! assert_eq!(signature.recover_public_key(&digest)?, public_key);
//! # Ok::<(), secp256k1_kit::Error>(())
//! ```
//!
//! # Timing caveats
//!
//! Field and scalar arithmetic are constant time, but scalar multiplication
//! (of both arbitrary points and the base point) is **not**: its branch
//! pattern follows the digits of the scalar. The RFC 6979 signing path uses
//! it with the secret nonce anyway, a deliberate trade inherited from the
//! implementations this one interoperates with; enable the
//! `constant-time-inverse` feature to at least harden the nonce inversion.

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]

pub mod arithmetic;
pub mod ecdh;
pub mod ecdsa;
mod error;
mod nonce;
mod public_key;
mod secret_key;

pub use crate::arithmetic::{FieldElement, ProjectivePoint, Scalar};
pub use crate::error::Error;
pub use crate::nonce::nonce_rfc6979;
pub use crate::public_key::PublicKey;
pub use crate::secret_key::SecretKey;

/// Domain parameters of the secp256k1 curve, as specified in SEC 2.
///
/// This is the parameter block callers outside this crate need when they
/// bridge to generic elliptic-curve interfaces; all values are big-endian.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Secp256k1;

impl Secp256k1 {
    /// The field prime p = 2²⁵⁶ − 2³² − 977.
    pub const FIELD_PRIME: [u8; 32] = [
        0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
        0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xfe, 0xff, 0xff,
        0xfc, 0x2f,
    ];

    /// The group order n.
    pub const ORDER: [u8; 32] = [
        0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
        0xfe, 0xba, 0xae, 0xdc, 0xe6, 0xaf, 0x48, 0xa0, 0x3b, 0xbf, 0xd2, 0x5e, 0x8c, 0xd0, 0x36,
        0x41, 0x41,
    ];

    /// x coordinate of the generator G.
    pub const GENERATOR_X: [u8; 32] = [
        0x79, 0xbe, 0x66, 0x7e, 0xf9, 0xdc, 0xbb, 0xac, 0x55, 0xa0, 0x62, 0x95, 0xce, 0x87, 0x0b,
        0x07, 0x02, 0x9b, 0xfc, 0xdb, 0x2d, 0xce, 0x28, 0xd9, 0x59, 0xf2, 0x81, 0x5b, 0x16, 0xf8,
        0x17, 0x98,
    ];

    /// y coordinate of the generator G.
    pub const GENERATOR_Y: [u8; 32] = [
        0x48, 0x3a, 0xda, 0x77, 0x26, 0xa3, 0xc4, 0x65, 0x5d, 0xa4, 0xfb, 0xfc, 0x0e, 0x11, 0x08,
        0xa8, 0xfd, 0x17, 0xb4, 0x48, 0xa6, 0x85, 0x54, 0x19, 0x9c, 0x47, 0xd0, 0x8f, 0xfb, 0x10,
        0xd4, 0xb8,
    ];

    /// The constant term b of the curve equation.
    pub const EQUATION_B: u8 = 7;

    /// Size of the underlying field in bits.
    pub const BIT_SIZE: usize = 256;
}

#[cfg(test)]
mod tests {
    use super::{ProjectivePoint, Scalar, Secp256k1};

    #[test]
    fn curve_params_match_arithmetic_constants() {
        let g = ProjectivePoint::GENERATOR;
        assert_eq!(g.x().to_bytes(), Secp256k1::GENERATOR_X);
        assert_eq!(g.y().to_bytes(), Secp256k1::GENERATOR_Y);

        // n·G = ∞ pins the order constant to the group itself.
        let n_scalar = Scalar::from_bytes_reduced(&Secp256k1::ORDER);
        assert_eq!(n_scalar, Scalar::ZERO);
        let n_minus_one = Scalar::ZERO.sub(&Scalar::ONE);
        let almost = crate::arithmetic::base_mul_var(&n_minus_one);
        assert!(bool::from(almost.add_var(&g).is_identity()));
    }
}
