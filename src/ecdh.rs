//! Diffie-Hellman shared secret derivation (RFC 5903 style, x only).

use crate::arithmetic::mul_var;
use crate::public_key::PublicKey;
use crate::secret_key::SecretKey;
use zeroize::Zeroizing;

/// Computes the shared secret between a private key and a peer's public
/// key: the x coordinate of d·Q, as 32 big-endian bytes.
///
/// Per RFC 5903 section 9 only the x coordinate is returned. The raw
/// coordinate is not uniformly distributed; hash it before use as a
/// symmetric key.
pub fn shared_secret(secret: &SecretKey, public: &PublicKey) -> Zeroizing<[u8; 32]> {
    let point = mul_var(&secret.to_scalar(), &public.to_projective());
    Zeroizing::new(point.to_affine().x().to_bytes())
}
