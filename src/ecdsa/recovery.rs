//! Public key recovery from signatures and the 65-byte compact encoding.

use crate::arithmetic::{
    base_mul_var, decompress_y, mul_var, scalar_to_field, FieldElement, ProjectivePoint, Scalar,
    ORDER_AS_FIELD_ELEMENT,
};
use crate::ecdsa::Signature;
use crate::error::Error;
use crate::public_key::PublicKey;
use subtle::Choice;

/// Size of a compact signature: recovery byte plus fixed 32-byte R and S.
pub const COMPACT_SIGNATURE_SIZE: usize = 65;

/// Offset added to the recovery code byte of compact signatures. Inherited
/// from Bitcoin; historical, but required for interoperability.
const COMPACT_MAGIC_OFFSET: u8 = 27;

/// Added on top of the magic offset when the signature commits to a
/// compressed public key.
const COMPACT_COMPRESSED_FLAG: u8 = 4;

/// A 2-bit public key recovery code.
///
/// Bit 0 records the oddness of the y coordinate of the random point
/// computed during signing; bit 1 records whether that point's x coordinate
/// was reduced modulo the group order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct RecoveryId(u8);

impl RecoveryId {
    /// Maximum value of a recovery code.
    pub const MAX: u8 = 3;

    /// Builds a recovery code from its two bits.
    pub const fn new(is_y_odd: bool, is_x_reduced: bool) -> Self {
        Self((is_x_reduced as u8) << 1 | (is_y_odd as u8))
    }

    /// Whether the y coordinate of the random point was odd.
    pub const fn is_y_odd(self) -> bool {
        self.0 & 1 != 0
    }

    /// Whether the x coordinate of the random point overflowed the group
    /// order.
    pub const fn is_x_reduced(self) -> bool {
        self.0 & 0b10 != 0
    }

    /// Parses a recovery code from its byte representation.
    pub const fn from_byte(byte: u8) -> Option<Self> {
        if byte <= Self::MAX {
            Some(Self(byte))
        } else {
            None
        }
    }

    /// The code as a byte in [0, 3].
    pub const fn to_byte(self) -> u8 {
        self.0
    }

    /// The code with the y-oddness bit inverted, matching the parity flip
    /// that comes with negating s.
    pub(crate) const fn with_flipped_parity(self) -> Self {
        Self(self.0 ^ 1)
    }
}

/// Byte order of a compact signature. Both layouts circulate; callers must
/// state which one they mean.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CompactSignatureLayout {
    /// `<recovery byte> || R || S` (the Bitcoin message-signing layout).
    RecoveryFirst,
    /// `R || S || <recovery byte>`.
    RecoveryLast,
}

impl Signature {
    /// Serializes to the 65-byte compact form.
    ///
    /// The recovery byte is `27 + code`, plus 4 when `compressed_key` marks
    /// the signature as committing to a compressed public key. S is lowered
    /// to its canonical half (flipping the recovery code parity to match)
    /// exactly as DER serialization does.
    ///
    /// Returns `None` when this signature carries no recovery code.
    pub fn to_compact(
        &self,
        layout: CompactSignatureLayout,
        compressed_key: bool,
    ) -> Option<[u8; COMPACT_SIGNATURE_SIZE]> {
        let mut recovery_id = self.recovery_id?;
        let mut s = self.s;
        if bool::from(s.is_high()) {
            s = s.negate();
            recovery_id = recovery_id.with_flipped_parity();
        }

        let mut code = COMPACT_MAGIC_OFFSET + recovery_id.to_byte();
        if compressed_key {
            code += COMPACT_COMPRESSED_FLAG;
        }

        let mut out = [0u8; COMPACT_SIGNATURE_SIZE];
        match layout {
            CompactSignatureLayout::RecoveryFirst => {
                out[0] = code;
                out[1..33].copy_from_slice(&self.r.to_bytes());
                out[33..].copy_from_slice(&s.to_bytes());
            }
            CompactSignatureLayout::RecoveryLast => {
                out[0..32].copy_from_slice(&self.r.to_bytes());
                out[32..64].copy_from_slice(&s.to_bytes());
                out[64] = code;
            }
        }
        Some(out)
    }

    /// Parses a 65-byte compact signature, returning the signature (tagged
    /// with its recovery code) and whether it commits to a compressed
    /// public key.
    pub fn from_compact(
        bytes: &[u8],
        layout: CompactSignatureLayout,
    ) -> Result<(Self, bool), Error> {
        if bytes.len() != COMPACT_SIGNATURE_SIZE {
            return Err(Error::SigInvalidLen);
        }

        let (code, r_bytes, s_bytes) = match layout {
            CompactSignatureLayout::RecoveryFirst => (bytes[0], &bytes[1..33], &bytes[33..65]),
            CompactSignatureLayout::RecoveryLast => (bytes[64], &bytes[0..32], &bytes[32..64]),
        };

        const MIN_VALID_CODE: u8 = COMPACT_MAGIC_OFFSET;
        const MAX_VALID_CODE: u8 =
            COMPACT_MAGIC_OFFSET + COMPACT_COMPRESSED_FLAG + RecoveryId::MAX;
        if !(MIN_VALID_CODE..=MAX_VALID_CODE).contains(&code) {
            return Err(Error::SigInvalidRecoveryCode);
        }
        let code = code - COMPACT_MAGIC_OFFSET;
        let was_compressed = code & COMPACT_COMPRESSED_FLAG != 0;
        let recovery_id = RecoveryId(code & RecoveryId::MAX);

        let r = Option::<Scalar>::from(Scalar::from_byte_slice(r_bytes))
            .ok_or(Error::SigRTooBig)?;
        if bool::from(r.is_zero()) {
            return Err(Error::SigRIsZero);
        }
        let s = Option::<Scalar>::from(Scalar::from_byte_slice(s_bytes))
            .ok_or(Error::SigSTooBig)?;
        if bool::from(s.is_zero()) {
            return Err(Error::SigSIsZero);
        }

        Ok((
            Self {
                r,
                s,
                recovery_id: Some(recovery_id),
            },
            was_compressed,
        ))
    }

    /// Recovers the public key that produced this signature over `prehash`.
    ///
    /// Reconstructs the random point X from r and the recovery code, then
    /// solves Q = r⁻¹(s·X − e·G). Fails when the signature carries no
    /// recovery code, or when the code and signature are inconsistent
    /// (no matching curve point, or a recovered point at infinity).
    pub fn recover_public_key(&self, prehash: &[u8]) -> Result<PublicKey, Error> {
        let recovery_id = self.recovery_id.ok_or(Error::SigInvalidRecoveryCode)?;
        if bool::from(self.r.is_zero()) || bool::from(self.s.is_zero()) {
            return Err(Error::PointNotOnCurve);
        }

        // The x coordinate of the random point is r, or r + n when the
        // recovery code says the coordinate was reduced; the latter is only
        // possible when r + n still fits below the field prime.
        let mut field_r = scalar_to_field(&self.r);
        if recovery_id.is_x_reduced() {
            if bool::from(field_r.is_ge_prime_minus_order()) {
                return Err(Error::SigOverflowsPrime);
            }
            field_r = field_r.add(&ORDER_AS_FIELD_ELEMENT).normalize();
        }

        // y = ±sqrt(x³ + 7), with the sign picked by the recovery code. A
        // valid signature came from a point on the curve, so a missing root
        // means the signature or code is bogus.
        let odd = Choice::from(recovery_id.is_y_odd() as u8);
        let y = Option::<FieldElement>::from(decompress_y(&field_r, odd)).ok_or(Error::PointNotOnCurve)?;
        let x_point = ProjectivePoint::from_affine(field_r, y.normalize());

        // Q = u1·G + u2·X with u1 = -e·r⁻¹ and u2 = s·r⁻¹.
        let e = Scalar::from_byte_slice_reduced(prehash);
        let w = self.r.invert_vartime();
        let u1 = e.mul(&w).negate();
        let u2 = self.s.mul(&w);
        let q = base_mul_var(&u1).add_var(&mul_var(&u2, &x_point));

        if bool::from(q.is_identity()) {
            return Err(Error::PointNotOnCurve);
        }
        let q = q.to_affine();
        Ok(PublicKey::from_affine_unchecked(q.x(), q.y()))
    }

    /// Finds the recovery code for a signature that does not carry one, by
    /// trying all four codes and comparing the recovered key against the
    /// expected public key. Returns the tagged signature on success.
    ///
    /// Fails when no code recovers `public_key`, which means the signature
    /// is not valid for that key and hash in the first place.
    pub fn with_recovered_id(
        &self,
        prehash: &[u8],
        public_key: &PublicKey,
    ) -> Result<Self, Error> {
        for code in 0..=RecoveryId::MAX {
            let candidate = Self {
                r: self.r,
                s: self.s,
                recovery_id: RecoveryId::from_byte(code),
            };
            if let Ok(recovered) = candidate.recover_public_key(prehash) {
                if &recovered == public_key {
                    return Ok(candidate);
                }
            }
        }
        Err(Error::SigInvalidRecoveryCode)
    }
}

#[cfg(test)]
mod tests {
    use super::{CompactSignatureLayout, RecoveryId, COMPACT_SIGNATURE_SIZE};
    use crate::ecdsa::{sign, Signature};
    use crate::error::Error;
    use crate::secret_key::SecretKey;
    use hex_literal::hex;
    use rand_core::{OsRng, RngCore};
    use sha2::{Digest, Sha256};

    #[test]
    fn recovery_id_bits() {
        let id = RecoveryId::new(true, false);
        assert!(id.is_y_odd());
        assert!(!id.is_x_reduced());
        assert_eq!(id.to_byte(), 1);
        assert_eq!(id.with_flipped_parity().to_byte(), 0);

        let id = RecoveryId::new(false, true);
        assert_eq!(id.to_byte(), 2);
        assert!(id.is_x_reduced());

        assert_eq!(RecoveryId::from_byte(3), Some(RecoveryId::new(true, true)));
        assert_eq!(RecoveryId::from_byte(4), None);
    }

    #[test]
    fn sign_and_recover() {
        let key = SecretKey::from_slice(&hex!(
            "cca9fbcc1b41e5a95d369eaa6ddcff73b61a4efaa279cfc6567e8daa39cbaf50"
        ));
        let hash = Sha256::digest(b"sample");
        let sig = sign(&key, &hash);
        let recovered = sig.recover_public_key(&hash).unwrap();
        assert_eq!(recovered, key.public_key());
    }

    #[test]
    fn recover_random_roundtrips() {
        for _ in 0..16 {
            let key = SecretKey::random(&mut OsRng);
            let mut msg = [0u8; 32];
            OsRng.fill_bytes(&mut msg);
            let hash = Sha256::digest(msg);

            let sig = sign(&key, &hash);
            let recovered = sig.recover_public_key(&hash).unwrap();
            assert_eq!(recovered, key.public_key());
        }
    }

    #[test]
    fn compact_round_trip_both_layouts() {
        let key = SecretKey::from_slice(&[11]);
        let hash = Sha256::digest(b"compact");
        let sig = sign(&key, &hash);

        for layout in [
            CompactSignatureLayout::RecoveryFirst,
            CompactSignatureLayout::RecoveryLast,
        ] {
            for compressed in [false, true] {
                let bytes = sig.to_compact(layout, compressed).unwrap();
                let (parsed, was_compressed) = Signature::from_compact(&bytes, layout).unwrap();
                assert_eq!(parsed, sig);
                assert_eq!(was_compressed, compressed);
                assert_eq!(parsed.recovery_id(), sig.recovery_id());
            }
        }
    }

    /// Flipping the compressed-key flag must not disturb recovery; the flag
    /// rides along and comes back flipped.
    #[test]
    fn compact_compressed_flag_is_independent() {
        let key = SecretKey::random(&mut OsRng);
        let mut data = [0u8; 32];
        OsRng.fill_bytes(&mut data);
        let hash = Sha256::digest(data);

        let sig = sign(&key, &hash);
        let mut bytes = sig
            .to_compact(CompactSignatureLayout::RecoveryFirst, true)
            .unwrap();
        bytes[0] -= 4; // clear the compressed flag

        let (parsed, was_compressed) =
            Signature::from_compact(&bytes, CompactSignatureLayout::RecoveryFirst).unwrap();
        assert!(!was_compressed);
        let recovered = parsed.recover_public_key(&hash).unwrap();
        assert_eq!(recovered, key.public_key());
    }

    #[test]
    fn compact_rejects_malformed_input() {
        let key = SecretKey::from_slice(&[5]);
        let hash = Sha256::digest(b"malformed");
        let sig = sign(&key, &hash);
        let bytes = sig
            .to_compact(CompactSignatureLayout::RecoveryFirst, false)
            .unwrap();

        assert_eq!(
            Signature::from_compact(&bytes[..64], CompactSignatureLayout::RecoveryFirst),
            Err(Error::SigInvalidLen)
        );

        let mut bad_code = bytes;
        bad_code[0] = 26;
        assert_eq!(
            Signature::from_compact(&bad_code, CompactSignatureLayout::RecoveryFirst),
            Err(Error::SigInvalidRecoveryCode)
        );
        bad_code[0] = 27 + 8;
        assert_eq!(
            Signature::from_compact(&bad_code, CompactSignatureLayout::RecoveryFirst),
            Err(Error::SigInvalidRecoveryCode)
        );

        let mut zero_r = bytes;
        zero_r[1..33].fill(0);
        assert_eq!(
            Signature::from_compact(&zero_r, CompactSignatureLayout::RecoveryFirst),
            Err(Error::SigRIsZero)
        );

        let mut big_s = bytes;
        big_s[33..65].copy_from_slice(&hex!(
            "fffffffffffffffffffffffffffffffebaaedce6af48a03bbfd25e8cd0364141"
        ));
        assert_eq!(
            Signature::from_compact(&big_s, CompactSignatureLayout::RecoveryFirst),
            Err(Error::SigSTooBig)
        );
    }

    #[test]
    fn recovery_without_id_is_rejected() {
        let key = SecretKey::from_slice(&[9]);
        let hash = Sha256::digest(b"untagged");
        let sig = sign(&key, &hash);
        let untagged = Signature::new(sig.r(), sig.s());
        assert_eq!(
            untagged.recover_public_key(&hash),
            Err(Error::SigInvalidRecoveryCode)
        );
    }

    #[test]
    fn trial_recovery_finds_the_code() {
        let key = SecretKey::from_slice(&[13]);
        let hash = Sha256::digest(b"trial recovery");
        let sig = sign(&key, &hash);
        let public = key.public_key();

        let untagged = Signature::new(sig.r(), sig.s());
        let tagged = untagged.with_recovered_id(&hash, &public).unwrap();
        assert_eq!(tagged.recovery_id(), sig.recovery_id());

        // A key that did not produce the signature must not match any code.
        let other = SecretKey::from_slice(&[14]).public_key();
        assert_eq!(
            untagged.with_recovered_id(&hash, &other),
            Err(Error::SigInvalidRecoveryCode)
        );
    }

    /// The x-reduced recovery path requires r + n < p, which only holds for
    /// r below p - n (roughly 2^129). Larger r with the overflow bit set
    /// must be rejected rather than silently recovering a wrong key.
    #[test]
    fn x_reduced_code_with_large_r_is_rejected() {
        // r = n - 1, for which r + n exceeds the field prime.
        let r_bytes = hex!("fffffffffffffffffffffffffffffffebaaedce6af48a03bbfd25e8cd0364140");
        let r = crate::arithmetic::Scalar::from_bytes_reduced(&r_bytes);
        let s = crate::arithmetic::Scalar::from(7u32);
        let sig = Signature {
            r,
            s,
            recovery_id: RecoveryId::from_byte(2),
        };
        let hash = Sha256::digest(b"overflow");
        assert_eq!(
            sig.recover_public_key(&hash),
            Err(Error::SigOverflowsPrime)
        );
    }

    #[test]
    fn compact_size_constant() {
        assert_eq!(COMPACT_SIGNATURE_SIZE, 65);
    }
}
