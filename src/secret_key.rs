//! Private key generation, parsing and serialization.

use crate::arithmetic::{base_mul_var, Scalar};
use crate::public_key::PublicKey;
use rand_core::{CryptoRng, RngCore};
use zeroize::{Zeroize, Zeroizing};

/// A secp256k1 private key: a scalar in [1, n-1].
///
/// The backing scalar is wiped when the key is dropped.
#[derive(Clone)]
pub struct SecretKey {
    inner: Scalar,
}

impl SecretKey {
    /// Generates a new private key by rejection sampling from the given
    /// cryptographically secure generator: candidates that are zero or not
    /// below the group order are discarded.
    pub fn random(rng: &mut (impl CryptoRng + RngCore)) -> Self {
        loop {
            let mut bytes = Zeroizing::new([0u8; 32]);
            rng.fill_bytes(&mut bytes[..]);
            if let Some(scalar) = Option::<Scalar>::from(Scalar::from_bytes(&bytes)) {
                if !bool::from(scalar.is_zero()) {
                    return Self { inner: scalar };
                }
            }
        }
    }

    /// Builds a private key from an existing scalar.
    pub fn from_scalar(scalar: Scalar) -> Self {
        Self { inner: scalar }
    }

    /// Interprets a big-endian byte slice as a private key, reducing it
    /// modulo the group order. Slices longer than 32 bytes keep the low 32.
    ///
    /// Reduction means out-of-range input is accepted silently; callers that
    /// need to detect that (or the zero key) should generate keys with
    /// [`SecretKey::random`] instead.
    pub fn from_slice(bytes: &[u8]) -> Self {
        Self {
            inner: Scalar::from_byte_slice_reduced(bytes),
        }
    }

    /// Returns the 32-byte big-endian encoding of the key, in a wrapper
    /// that wipes it on drop.
    pub fn to_bytes(&self) -> Zeroizing<[u8; 32]> {
        Zeroizing::new(self.inner.to_bytes())
    }

    /// The key as a scalar.
    pub fn to_scalar(&self) -> Scalar {
        self.inner
    }

    /// Computes the public key d·G.
    ///
    /// The key must be nonzero; d = 0 has no corresponding public point.
    pub fn public_key(&self) -> PublicKey {
        let point = base_mul_var(&self.inner).to_affine();
        PublicKey::from_affine_unchecked(point.x(), point.y())
    }
}

impl Drop for SecretKey {
    fn drop(&mut self) {
        self.inner.zeroize();
    }
}

impl zeroize::ZeroizeOnDrop for SecretKey {}

// No Debug derive: a secret key must never end up in log output.
impl core::fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("SecretKey { ... }")
    }
}
