//! ECDSA signing and verification over secp256k1.
//!
//! Signing is deterministic per RFC 6979 and always canonicalizes the S
//! component to the low half of the scalar range before serialization (the
//! BIP 62 low-S rule). Parsing accepts high-S signatures; callers that
//! require strict low-S can check [`Signature::s`] themselves.

pub mod recovery;

use crate::arithmetic::{
    base_mul_var, field_to_scalar, mul_var, scalar_to_field, Scalar, ORDER_AS_FIELD_ELEMENT,
};
use crate::error::Error;
use crate::nonce::nonce_rfc6979;
use crate::public_key::PublicKey;
use crate::secret_key::SecretKey;
use self::recovery::RecoveryId;
use zeroize::Zeroize;

/// ASN.1 identifier for a sequence.
const ASN1_SEQUENCE_ID: u8 = 0x30;
/// ASN.1 identifier for an integer.
const ASN1_INTEGER_ID: u8 = 0x02;

/// Minimum length of a DER signature: both R and S a single byte.
const MIN_DER_SIG_LEN: usize = 8;
/// Maximum length of a DER signature: both R and S 33 bytes (32 value bytes
/// plus a sign-padding byte).
const MAX_DER_SIG_LEN: usize = 72;

/// An ECDSA signature (r, s), optionally tagged with the public key
/// recovery code produced during signing.
#[derive(Clone, Copy, Debug)]
pub struct Signature {
    pub(crate) r: Scalar,
    pub(crate) s: Scalar,
    pub(crate) recovery_id: Option<RecoveryId>,
}

impl Signature {
    /// Builds a signature from raw r and s scalars, without a recovery code.
    pub fn new(r: Scalar, s: Scalar) -> Self {
        Self {
            r,
            s,
            recovery_id: None,
        }
    }

    /// The r component.
    pub fn r(&self) -> Scalar {
        self.r
    }

    /// The s component. May be in the high half of the scalar range if this
    /// signature was parsed rather than produced by [`sign`].
    pub fn s(&self) -> Scalar {
        self.s
    }

    /// The recovery code, when this signature was produced by [`sign`] or
    /// parsed from a compact encoding.
    pub fn recovery_id(&self) -> Option<RecoveryId> {
        self.recovery_id
    }

    /// Parses a DER signature:
    ///
    /// `0x30 <len> 0x02 <rlen> <R> 0x02 <slen> <S>`
    ///
    /// Beyond the DER structure itself, R and S must be positive, minimally
    /// encoded, and in the range [1, n-1]. Each violation maps to a distinct
    /// [`Error`] kind.
    pub fn from_der(sig: &[u8]) -> Result<Self, Error> {
        // Byte offsets of the fixed-position fields.
        const SEQUENCE_OFFSET: usize = 0;
        const DATA_LEN_OFFSET: usize = 1;
        const R_TYPE_OFFSET: usize = 2;
        const R_LEN_OFFSET: usize = 3;
        const R_OFFSET: usize = 4;

        let sig_len = sig.len();
        if sig_len < MIN_DER_SIG_LEN {
            return Err(Error::SigTooShort);
        }
        if sig_len > MAX_DER_SIG_LEN {
            return Err(Error::SigTooLong);
        }

        if sig[SEQUENCE_OFFSET] != ASN1_SEQUENCE_ID {
            return Err(Error::SigInvalidSeqId);
        }
        if sig[DATA_LEN_OFFSET] as usize != sig_len - 2 {
            return Err(Error::SigInvalidDataLen);
        }

        // Locate S from the declared length of R and make sure both the
        // type and length bytes for S are inside the signature.
        let r_len = sig[R_LEN_OFFSET] as usize;
        let s_type_offset = R_OFFSET + r_len;
        let s_len_offset = s_type_offset + 1;
        if s_type_offset >= sig_len {
            return Err(Error::SigMissingSTypeId);
        }
        if s_len_offset >= sig_len {
            return Err(Error::SigMissingSLen);
        }

        let s_offset = s_len_offset + 1;
        let s_len = sig[s_len_offset] as usize;
        if s_offset + s_len != sig_len {
            return Err(Error::SigInvalidSLen);
        }

        if sig[R_TYPE_OFFSET] != ASN1_INTEGER_ID {
            return Err(Error::SigInvalidRIntId);
        }
        if r_len == 0 {
            return Err(Error::SigZeroRLen);
        }
        if sig[R_OFFSET] & 0x80 != 0 {
            return Err(Error::SigNegativeR);
        }
        if r_len > 1 && sig[R_OFFSET] == 0x00 && sig[R_OFFSET + 1] & 0x80 == 0 {
            return Err(Error::SigTooMuchRPadding);
        }

        if sig[s_type_offset] != ASN1_INTEGER_ID {
            return Err(Error::SigInvalidSIntId);
        }
        if s_len == 0 {
            return Err(Error::SigZeroSLen);
        }
        if sig[s_offset] & 0x80 != 0 {
            return Err(Error::SigNegativeS);
        }
        if s_len > 1 && sig[s_offset] == 0x00 && sig[s_offset + 1] & 0x80 == 0 {
            return Err(Error::SigTooMuchSPadding);
        }

        // The encoding is structurally valid; now require R and S in
        // [1, n-1]. The byte-count check matters because the scalar parser
        // truncates longer input.
        let mut r_bytes = &sig[R_OFFSET..R_OFFSET + r_len];
        while !r_bytes.is_empty() && r_bytes[0] == 0x00 {
            r_bytes = &r_bytes[1..];
        }
        if r_bytes.len() > 32 {
            return Err(Error::SigRTooBig);
        }
        let r = Option::<Scalar>::from(Scalar::from_byte_slice(r_bytes))
            .ok_or(Error::SigRTooBig)?;
        if bool::from(r.is_zero()) {
            return Err(Error::SigRIsZero);
        }

        let mut s_bytes = &sig[s_offset..s_offset + s_len];
        while !s_bytes.is_empty() && s_bytes[0] == 0x00 {
            s_bytes = &s_bytes[1..];
        }
        if s_bytes.len() > 32 {
            return Err(Error::SigSTooBig);
        }
        let s = Option::<Scalar>::from(Scalar::from_byte_slice(s_bytes))
            .ok_or(Error::SigSTooBig)?;
        if bool::from(s.is_zero()) {
            return Err(Error::SigSIsZero);
        }

        Ok(Self::new(r, s))
    }

    /// Serializes to DER, always emitting the low-S form: a high S is
    /// replaced by its negation so every signature this crate produces or
    /// re-encodes is unmalleable per BIP 62.
    pub fn to_der(&self) -> Vec<u8> {
        let mut s = self.s;
        if bool::from(s.is_high()) {
            s = s.negate();
        }

        // 33-byte buffers leave room for the sign-padding byte; the loop
        // below trims it back off whenever it is not required.
        let mut r_buf = [0u8; 33];
        r_buf[1..].copy_from_slice(&self.r.to_bytes());
        let mut s_buf = [0u8; 33];
        s_buf[1..].copy_from_slice(&s.to_bytes());

        fn canonical(buf: &[u8]) -> &[u8] {
            let mut v = buf;
            while v.len() > 1 && v[0] == 0x00 && v[1] & 0x80 == 0 {
                v = &v[1..];
            }
            v
        }
        let canon_r = canonical(&r_buf);
        let canon_s = canonical(&s_buf);

        let total_len = 6 + canon_r.len() + canon_s.len();
        let mut out = Vec::with_capacity(total_len);
        out.push(ASN1_SEQUENCE_ID);
        out.push((total_len - 2) as u8);
        out.push(ASN1_INTEGER_ID);
        out.push(canon_r.len() as u8);
        out.extend_from_slice(canon_r);
        out.push(ASN1_INTEGER_ID);
        out.push(canon_s.len() as u8);
        out.extend_from_slice(canon_s);
        out
    }

    /// Verifies this signature over `prehash` (a 32-byte message digest)
    /// against a public key.
    pub fn verify_prehash(&self, prehash: &[u8], public_key: &PublicKey) -> bool {
        // r and s must be in [1, n-1]; parsing enforces this, but a
        // signature can also be assembled from raw scalars.
        if bool::from(self.r.is_zero()) || bool::from(self.s.is_zero()) {
            return false;
        }

        // Standard verification: w = s⁻¹, X = (e·w)·G + (r·w)·Q, accept
        // when X.x ≡ r (mod n). s is public here, so the fast
        // variable-time inverse is fine.
        let e = Scalar::from_byte_slice_reduced(prehash);
        let w = self.s.invert_vartime();
        let u1 = e.mul(&w);
        let u2 = self.r.mul(&w);

        let x = base_mul_var(&u1).add_var(&mul_var(&u2, &public_key.to_projective()));
        if bool::from(x.is_identity()) {
            return false;
        }

        // Compare in projective form to avoid an affine inversion: the
        // signature is valid when r·Xz² = Xx (mod p). Since r came from a
        // coordinate mod p reduced mod n, the original coordinate may also
        // have been r + n when that still fits below p.
        let z2 = x.z.square();
        let sig_r_field = scalar_to_field(&self.r);
        let result = sig_r_field.mul(&z2).normalize();
        if result == x.x {
            return true;
        }

        if bool::from(sig_r_field.is_ge_prime_minus_order()) {
            return false;
        }
        let r_plus_n = sig_r_field.add(&ORDER_AS_FIELD_ELEMENT);
        r_plus_n.mul(&z2).normalize() == x.x
    }
}

/// Signature equality ignores the recovery code: two signatures are the
/// same signature when their (r, s) pairs match.
impl PartialEq for Signature {
    fn eq(&self, other: &Self) -> bool {
        self.r == other.r && self.s == other.s
    }
}

impl Eq for Signature {}

/// One signing attempt with a fixed nonce.
///
/// Fails (so the caller retries with the next nonce) when the attempt
/// produces r = 0 or s = 0.
fn sign_with_nonce(priv_key: &Scalar, nonce: &Scalar, hash: &[u8]) -> Option<Signature> {
    // R = k·G, in affine coordinates so its x can be reduced mod n.
    let kg = base_mul_var(nonce).to_affine();
    let (r, x_overflow) = field_to_scalar(&kg.x());
    if bool::from(r.is_zero()) {
        return None;
    }

    // The recovery code pins down which of the (up to four) candidate
    // points recovery would otherwise have to try: bit 0 is the oddness of
    // R.y, bit 1 records that R.x was reduced mod n. The overflow case is a
    // roughly 1-in-2^127 event, but it must round-trip correctly.
    let mut recovery_id = RecoveryId::new(bool::from(kg.y().is_odd()), bool::from(x_overflow));

    // s = k⁻¹(e + d·r) mod n. The nonce is secret, which makes the
    // variable-time inverse a deliberate side-channel trade-off; the
    // `constant-time-inverse` feature swaps in the Fermat ladder.
    let e = Scalar::from_byte_slice_reduced(hash);
    let kinv = if cfg!(feature = "constant-time-inverse") {
        nonce.invert()
    } else {
        nonce.invert_vartime()
    };
    let mut s = priv_key.mul(&r).add(&e).mul(&kinv);
    if bool::from(s.is_zero()) {
        return None;
    }

    if bool::from(s.is_high()) {
        s = s.negate();
        // Negating s matches the signature that -k would have produced,
        // and -k generates the random point with the opposite y parity.
        recovery_id = recovery_id.with_flipped_parity();
    }

    Some(Signature {
        r,
        s,
        recovery_id: Some(recovery_id),
    })
}

/// Signs a 32-byte message digest, returning a low-S signature tagged with
/// its public key recovery code.
///
/// Nonces come from RFC 6979, so the signature is deterministic for a given
/// key and digest. The nonce iteration count handles the (cryptographically
/// negligible) r = 0 / s = 0 retries, which means signing cannot fail once
/// the key exists.
pub fn sign(secret_key: &SecretKey, prehash: &[u8]) -> Signature {
    let priv_scalar = secret_key.to_scalar();
    let priv_bytes = secret_key.to_bytes();

    let mut iteration = 0u32;
    loop {
        let mut nonce = nonce_rfc6979(&priv_bytes[..], prehash, None, None, iteration);
        let sig = sign_with_nonce(&priv_scalar, &nonce, prehash);
        nonce.zeroize();
        if let Some(sig) = sig {
            return sig;
        }
        iteration += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::{sign, Signature};
    use crate::arithmetic::Scalar;
    use crate::error::Error;
    use crate::secret_key::SecretKey;
    use hex_literal::hex;
    use sha2::{Digest, Sha256};

    /// Signing vectors cross-checked against other deterministic-ECDSA
    /// implementations (Trezor, CoreBitcoin).
    #[test]
    fn deterministic_signatures() {
        struct Case {
            key: [u8; 32],
            msg: &'static str,
            der: &'static str,
        }
        let cases = [
            Case {
                key: hex!("cca9fbcc1b41e5a95d369eaa6ddcff73b61a4efaa279cfc6567e8daa39cbaf50"),
                msg: "sample",
                der: "3045022100af340daf02cc15c8d5d08d7735dfe6b98a474ed373bdb5fbecf7571be52b384202205009fb27f37034a9b24b707b7c6b79ca23ddef9e25f7282e8a797efe53a8f124",
            },
            Case {
                // Internally produces a high S, which must come out lowered.
                key: hex!("0000000000000000000000000000000000000000000000000000000000000001"),
                msg: "Satoshi Nakamoto",
                der: "3045022100934b1ea10a4b3c1757e2b0c017d0b6143ce3c9a7e6a4a49860d7a6ab210ee3d802202442ce9d2b916064108014783e923ec36b49743e2ffa1c4496f01a512aafd9e5",
            },
            Case {
                key: hex!("fffffffffffffffffffffffffffffffebaaedce6af48a03bbfd25e8cd0364140"),
                msg: "Satoshi Nakamoto",
                der: "3045022100fd567d121db66e382991534ada77a6bd3106f0a1098c231e47993447cd6af2d002206b39cd0eb1bc8603e159ef5c20a5c8ad685a45b06ce9bebed3f153d10d93bed5",
            },
            Case {
                key: hex!("f8b8af8ce3c7cca5e300d33939540c10d45ce001b8f252bfbc57ba0342904181"),
                msg: "Alan Turing",
                der: "304402207063ae83e7f62bbb171798131b4a0564b956930092b33b07b395615d9ec7e15c022058dfcc1e00a35e1572f366ffe34ba0fc47db1e7189759b9fb233c5b05ab388ea",
            },
            Case {
                key: hex!("0000000000000000000000000000000000000000000000000000000000000001"),
                msg: "All those moments will be lost in time, like tears in rain. Time to die...",
                der: "30450221008600dbd41e348fe5c9465ab92d23e3db8b98b873beecd930736488696438cb6b0220547fe64427496db33bf66019dacbf0039c04199abb0122918601db38a72cfc21",
            },
            Case {
                key: hex!("e91671c46231f833a6406ccbea0e3e392c76c167bac1cb013f6f1013980455c2"),
                msg: "There is a computer disease that anybody who works with computers knows about. It's a very serious disease and it interferes completely with the work. The trouble with computers is that you 'play' with them!",
                der: "3045022100b552edd27580141f3b2a5463048cb7cd3e047b97c9f98076c32dbdf85a68718b0220279fa72dd19bfae05577e06c7c0c1900c371fcd5893f7e1d56a37d30174671f6",
            },
        ];

        for case in &cases {
            let key = SecretKey::from_slice(&case.key);
            let hash = Sha256::digest(case.msg.as_bytes());
            let sig = sign(&key, &hash);
            assert_eq!(hex::encode(sig.to_der()), case.der, "msg: {}", case.msg);
            assert!(sig.verify_prehash(&hash, &key.public_key()));
            assert!(!bool::from(sig.s().is_high()));
        }
    }

    #[test]
    fn low_s_normalization_vector() {
        let key = SecretKey::from_slice(&[1]);
        let hash = Sha256::digest(b"Satoshi Nakamoto");
        let sig = sign(&key, &hash);
        assert_eq!(
            sig.s().to_bytes(),
            hex!("2442ce9d2b916064108014783e923ec36b49743e2ffa1c4496f01a512aafd9e5")
        );
    }

    #[test]
    fn verify_rejects_tampering() {
        let key = SecretKey::from_slice(&hex!(
            "cca9fbcc1b41e5a95d369eaa6ddcff73b61a4efaa279cfc6567e8daa39cbaf50"
        ));
        let hash = Sha256::digest(b"sample");
        let sig = sign(&key, &hash);
        let public = key.public_key();

        assert!(sig.verify_prehash(&hash, &public));

        let other_hash = Sha256::digest(b"samplf");
        assert!(!sig.verify_prehash(&other_hash, &public));

        let other_key = SecretKey::from_slice(&[7]);
        assert!(!sig.verify_prehash(&hash, &other_key.public_key()));

        let tampered = Signature::new(sig.r(), sig.s().add(&Scalar::ONE));
        assert!(!tampered.verify_prehash(&hash, &public));

        assert!(!Signature::new(Scalar::ZERO, sig.s()).verify_prehash(&hash, &public));
        assert!(!Signature::new(sig.r(), Scalar::ZERO).verify_prehash(&hash, &public));
    }

    /// A high-S signature is the negation of a low-S one and remains valid
    /// under plain ECDSA verification rules.
    #[test]
    fn verify_accepts_high_s() {
        let key = SecretKey::from_slice(&[42]);
        let hash = Sha256::digest(b"malleability");
        let sig = sign(&key, &hash);
        let high = Signature::new(sig.r(), sig.s().negate());
        assert!(high.verify_prehash(&hash, &key.public_key()));
    }

    #[test]
    fn der_round_trip_lowers_s() {
        let key = SecretKey::from_slice(&[3]);
        let hash = Sha256::digest(b"round trip");
        let sig = sign(&key, &hash);

        let parsed = Signature::from_der(&sig.to_der()).unwrap();
        assert_eq!(parsed, sig);

        // Re-encoding the high-S variant must produce the canonical bytes.
        let high = Signature::new(sig.r(), sig.s().negate());
        assert_eq!(high.to_der(), sig.to_der());
    }

    const VALID_R: [u8; 32] =
        hex!("4e45e16932b8af514961a1d3a1a25fdf3f4f7732e9d624c6c61548ab5fb8cd41");
    const VALID_S: [u8; 32] =
        hex!("181522ec8eca07de4860a4acdd12909d831cc56cbbac4622082221a8768d1d09");
    const ORDER: [u8; 32] =
        hex!("fffffffffffffffffffffffffffffffebaaedce6af48a03bbfd25e8cd0364141");

    /// 0x30 0x44 0x02 0x20 R 0x02 0x20 S with the test constants above.
    fn valid_der() -> Vec<u8> {
        let mut v = vec![0x30, 0x44, 0x02, 0x20];
        v.extend_from_slice(&VALID_R);
        v.extend_from_slice(&[0x02, 0x20]);
        v.extend_from_slice(&VALID_S);
        v
    }

    #[test]
    fn der_parse_accepts_valid_and_high_s() {
        let sig = Signature::from_der(&valid_der()).unwrap();
        assert_eq!(sig.r().to_bytes(), VALID_R);
        assert_eq!(sig.s().to_bytes(), VALID_S);
        assert!(sig.recovery_id().is_none());

        // s = n - 1 is in range and parses even though it is high.
        let mut n_minus_one = ORDER;
        n_minus_one[31] -= 1;
        let mut v = vec![0x30, 0x45, 0x02, 0x20];
        v.extend_from_slice(&VALID_R);
        v.extend_from_slice(&[0x02, 0x21, 0x00]);
        v.extend_from_slice(&n_minus_one);
        let sig = Signature::from_der(&v).unwrap();
        assert!(bool::from(sig.s().is_high()));
    }

    #[test]
    fn der_parse_error_taxonomy() {
        // (name, bytes, expected kind)
        let mut cases: Vec<(&str, Vec<u8>, Error)> = Vec::new();

        cases.push(("empty", vec![], Error::SigTooShort));
        cases.push(("7 bytes", vec![0x30, 0x05, 0x02, 0x01, 0x01, 0x02, 0x01], Error::SigTooShort));
        cases.push(("73 bytes", {
            let mut v = valid_der();
            v.extend_from_slice(&[0x00; 3]);
            v
        }, Error::SigTooLong));
        cases.push(("bad sequence id", {
            let mut v = valid_der();
            v[0] = 0x50;
            v
        }, Error::SigInvalidSeqId));
        cases.push(("bad data length", {
            let mut v = valid_der();
            v[1] = 0x45;
            v
        }, Error::SigInvalidDataLen));
        cases.push(("S type runs off the end", {
            // rlen pushes the S type offset past the signature.
            vec![0x30, 0x06, 0x02, 0x05, 0x01, 0x02, 0x03, 0x04]
        }, Error::SigMissingSTypeId));
        cases.push(("S length missing", {
            vec![0x30, 0x06, 0x02, 0x03, 0x01, 0x02, 0x03, 0x02]
        }, Error::SigMissingSLen));
        cases.push(("S length inconsistent", {
            let mut v = valid_der();
            let s_len_offset = 4 + 32 + 1;
            v[s_len_offset] = 0x21;
            v
        }, Error::SigInvalidSLen));
        cases.push(("R not an integer", {
            let mut v = valid_der();
            v[2] = 0x01;
            v
        }, Error::SigInvalidRIntId));
        cases.push(("zero R length", {
            let mut v = vec![0x30, 0x24, 0x02, 0x00, 0x02, 0x20];
            v.extend_from_slice(&VALID_S);
            v
        }, Error::SigZeroRLen));
        cases.push(("negative R", {
            let mut v = valid_der();
            v[4] = 0xce;
            v
        }, Error::SigNegativeR));
        cases.push(("superfluous R padding", {
            let mut v = vec![0x30, 0x45, 0x02, 0x21, 0x00];
            v.extend_from_slice(&VALID_R);
            v.extend_from_slice(&[0x02, 0x20]);
            v.extend_from_slice(&VALID_S);
            v
        }, Error::SigTooMuchRPadding));
        cases.push(("R is zero", {
            let mut v = vec![0x30, 0x25, 0x02, 0x01, 0x00, 0x02, 0x20];
            v.extend_from_slice(&VALID_S);
            v
        }, Error::SigRIsZero));
        cases.push(("R equals the group order", {
            let mut v = vec![0x30, 0x45, 0x02, 0x21, 0x00];
            v.extend_from_slice(&ORDER);
            v.extend_from_slice(&[0x02, 0x20]);
            v.extend_from_slice(&VALID_S);
            v
        }, Error::SigRTooBig));
        cases.push(("S not an integer", {
            let mut v = valid_der();
            v[4 + 32] = 0x01;
            v
        }, Error::SigInvalidSIntId));
        cases.push(("zero S length", {
            let mut v = vec![0x30, 0x24, 0x02, 0x20];
            v.extend_from_slice(&VALID_R);
            v.extend_from_slice(&[0x02, 0x00]);
            v
        }, Error::SigZeroSLen));
        cases.push(("negative S", {
            let mut v = valid_der();
            v[4 + 32 + 2] = 0x98;
            v
        }, Error::SigNegativeS));
        cases.push(("superfluous S padding", {
            let mut v = vec![0x30, 0x45, 0x02, 0x20];
            v.extend_from_slice(&VALID_R);
            v.extend_from_slice(&[0x02, 0x21, 0x00]);
            v.extend_from_slice(&VALID_S);
            v
        }, Error::SigTooMuchSPadding));
        cases.push(("S is zero", {
            let mut v = vec![0x30, 0x25, 0x02, 0x20];
            v.extend_from_slice(&VALID_R);
            v.extend_from_slice(&[0x02, 0x01, 0x00]);
            v
        }, Error::SigSIsZero));
        cases.push(("S equals the group order", {
            let mut v = vec![0x30, 0x45, 0x02, 0x20];
            v.extend_from_slice(&VALID_R);
            v.extend_from_slice(&[0x02, 0x21, 0x00]);
            v.extend_from_slice(&ORDER);
            v
        }, Error::SigSTooBig));

        for (name, bytes, want) in cases {
            assert_eq!(Signature::from_der(&bytes), Err(want), "case: {name}");
        }
    }
}
