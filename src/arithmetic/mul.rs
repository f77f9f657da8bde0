//! Variable-time scalar multiplication.
//!
//! `mul_var` splits the scalar along the curve's λ-endomorphism into two
//! half-width components, encodes both in non-adjacent form, and runs an
//! interleaved double-and-add walk. `base_mul_var` instead walks the scalar
//! bytes over a lazily-built table of 32×256 precomputed multiples of G.
//!
//! Both are explicitly NOT constant time: their branch patterns depend on
//! the scalar digits. They must not be used where an attacker can observe
//! timing of a secret-scalar path, with the documented exception of the
//! RFC 6979 signing loop which deliberately trades this off for speed.

use crate::arithmetic::projective::{batch_normalize, ProjectivePoint};
use crate::arithmetic::scalar::Scalar;
use std::sync::OnceLock;
use subtle::{Choice, ConditionallySelectable};

/// -λ (mod n), where λ·P computes the endomorphism φ(P) = (β·Px, Py).
const MINUS_LAMBDA: Scalar = Scalar::from_bytes_unchecked(&[
    0xac, 0x9c, 0x52, 0xb3, 0x3f, 0xa3, 0xcf, 0x1f, 0x5a, 0xd9, 0xe3, 0xfd, 0x77, 0xed, 0x9b, 0xa4,
    0xa8, 0x80, 0xb9, 0xfc, 0x8e, 0xc7, 0x39, 0xc2, 0xe0, 0xcf, 0xc8, 0x10, 0xb5, 0x12, 0x83, 0xcf,
]);

/// -b1 from the endomorphism basis matrix.
const MINUS_B1: Scalar = Scalar::from_bytes_unchecked(&[
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0xe4, 0x43, 0x7e, 0xd6, 0x01, 0x0e, 0x88, 0x28, 0x6f, 0x54, 0x7f, 0xa9, 0x0a, 0xbf, 0xe4, 0xc3,
]);

/// -b2 from the endomorphism basis matrix.
const MINUS_B2: Scalar = Scalar::from_bytes_unchecked(&[
    0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xfe,
    0x8a, 0x28, 0x0a, 0xc5, 0x07, 0x74, 0x34, 0x6d, 0xd7, 0x65, 0xcd, 0xa8, 0x3d, 0xb1, 0x56, 0x2c,
]);

/// g1 = round(2^272 · b2 / n): replaces the division in the decomposition
/// with a rounded multiplication.
const G1: Scalar = Scalar::from_bytes_unchecked(&[
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x30, 0x86,
    0xd2, 0x21, 0xa7, 0xd4, 0x6b, 0xcd, 0xe8, 0x6c, 0x90, 0xe4, 0x92, 0x84, 0xeb, 0x15, 0x3d, 0xab,
]);

/// g2 = round(2^272 · (-b1) / n).
const G2: Scalar = Scalar::from_bytes_unchecked(&[
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xe4, 0x43,
    0x7e, 0xd6, 0x01, 0x0e, 0x88, 0x28, 0x6f, 0x54, 0x7f, 0xa9, 0x0a, 0xbf, 0xe4, 0xc4, 0x22, 0x12,
]);

/// λ (mod n); only needed to verify decompositions in tests.
#[cfg(test)]
pub(crate) const LAMBDA: Scalar = Scalar::from_bytes_unchecked(&[
    0x53, 0x63, 0xad, 0x4c, 0xc0, 0x5c, 0x30, 0xe0, 0xa5, 0x26, 0x1c, 0x02, 0x88, 0x12, 0x64, 0x5a,
    0x12, 0x2e, 0x22, 0xea, 0x20, 0x81, 0x66, 0x78, 0xdf, 0x02, 0x96, 0x7c, 0x1b, 0x23, 0xbd, 0x72,
]);

/// Splits a scalar k into (k1, σ1, k2, σ2) such that
/// σ1·k1 + σ2·k2·λ ≡ k (mod n), with k1 and k2 around 128 bits.
///
/// The decomposition computes c1 = round(k·g1 / 2^272) and
/// c2 = round(k·g2 / 2^272), sets k2 = c1·(-b1) + c2·(-b2) and
/// k1 = k + k2·(-λ), then folds scalars over the half order into their
/// negations so the returned magnitudes stay small. The signs are `Choice`s
/// that are set when the corresponding component is negated.
pub(crate) fn split_k(k: &Scalar) -> (Scalar, Choice, Scalar, Choice) {
    let c1 = k.mul_shift_var(&G1, 272);
    let c2 = k.mul_shift_var(&G2, 272);

    let c1 = c1.mul(&MINUS_B1);
    let c2 = c2.mul(&MINUS_B2);
    let r2 = c1.add(&c2);
    let r1 = k.add(&r2.mul(&MINUS_LAMBDA));

    let neg1 = r1.is_high();
    let neg2 = r2.is_high();
    let k1 = Scalar::conditional_select(&r1, &r1.negate(), neg1);
    let k2 = Scalar::conditional_select(&r2, &r2.negate(), neg2);
    (k1, neg1, k2, neg2)
}

/// A scalar in non-adjacent form: the +1 digits as bits of `pos`, the -1
/// digits as bits of `neg`, so that the value equals pos - neg and no two
/// adjacent digits are both nonzero.
///
/// Both windows share the same start offset, so `pos()` and `neg()` have
/// equal length, `pos()` never has a leading zero byte, and the encoding can
/// be one bit longer than the input.
pub(crate) struct NafScalar {
    pos: [u8; 33],
    neg: [u8; 33],
    start: usize,
}

impl NafScalar {
    pub(crate) fn pos(&self) -> &[u8] {
        &self.pos[self.start..]
    }

    pub(crate) fn neg(&self) -> &[u8] {
        &self.neg[self.start..]
    }
}

/// Encodes a big-endian value (up to 32 bytes) in non-adjacent form.
///
/// With h = 3k/2 and l = k/2, the digits fall out of the bitwise identity
/// pos = h & (h ^ l), neg = l & (h ^ l): pos - neg = k.
pub(crate) fn naf(k: &[u8]) -> NafScalar {
    debug_assert!(k.len() <= 32);

    // Right-aligned copies of k, 3k and their halves, with one spare byte
    // for the carry out of 3k.
    let mut k33 = [0u8; 33];
    k33[33 - k.len()..].copy_from_slice(k);

    // 3k = k + 2k.
    let mut three_k = [0u8; 33];
    let mut carry = 0u16;
    for i in (0..33).rev() {
        let shifted = ((k33[i] as u16) << 1 | (k33.get(i + 1).map_or(0, |&b| b as u16) >> 7)) & 0xff;
        let sum = k33[i] as u16 + shifted + carry;
        three_k[i] = sum as u8;
        carry = sum >> 8;
    }
    debug_assert!(carry == 0);

    let h = shr1(&three_k);
    let l = shr1(&k33);

    let mut pos = [0u8; 33];
    let mut neg = [0u8; 33];
    for i in 0..33 {
        let x = h[i] ^ l[i];
        pos[i] = h[i] & x;
        neg[i] = l[i] & x;
    }

    // Trim the shared leading zero bytes. The most significant nonzero NAF
    // digit is always positive, so stopping when either array has a nonzero
    // byte leaves pos without a leading zero.
    let mut start = 33;
    for i in 0..33 {
        if pos[i] != 0 || neg[i] != 0 {
            start = i;
            break;
        }
    }

    NafScalar { pos, neg, start }
}

fn shr1(v: &[u8; 33]) -> [u8; 33] {
    let mut r = [0u8; 33];
    let mut carry = 0u8;
    for i in 0..33 {
        r[i] = (v[i] >> 1) | (carry << 7);
        carry = v[i] & 1;
    }
    r
}

/// Computes k·P.
///
/// NOT constant time; see the module docs.
pub fn mul_var(k: &Scalar, point: &ProjectivePoint) -> ProjectivePoint {
    // Decompose k = σ1·k1 + σ2·k2·λ and pair each half-width component with
    // the matching (possibly negated, possibly endomorphism-mapped) point.
    let (k1, k1_neg, k2, k2_neg) = split_k(k);

    let p1 = ProjectivePoint::conditional_select(point, &point.neg(), k1_neg);
    let phi = point.endomorphism();
    let p2 = ProjectivePoint::conditional_select(&phi, &phi.neg(), k2_neg);
    let p1_neg = p1.neg();
    let p2_neg = p2.neg();

    let k1_bytes = k1.to_bytes();
    let k2_bytes = k2.to_bytes();
    let naf1 = naf(&k1_bytes);
    let naf2 = naf(&k2_bytes);
    let len1 = naf1.pos().len();
    let len2 = naf2.pos().len();
    let m = len1.max(len2);

    let mut q = ProjectivePoint::IDENTITY;
    for i in 0..m {
        // Right-align the two encodings: shorter ones contribute zero
        // digits at the top.
        let (pos1, neg1) = if i >= m - len1 {
            let j = i - (m - len1);
            (naf1.pos()[j], naf1.neg()[j])
        } else {
            (0, 0)
        };
        let (pos2, neg2) = if i >= m - len2 {
            let j = i - (m - len2);
            (naf2.pos()[j], naf2.neg()[j])
        } else {
            (0, 0)
        };

        for bit in (0..8).rev() {
            q = q.double_var();
            if pos1 >> bit & 1 != 0 {
                q = q.add_var(&p1);
            } else if neg1 >> bit & 1 != 0 {
                q = q.add_var(&p1_neg);
            }
            if pos2 >> bit & 1 != 0 {
                q = q.add_var(&p2);
            } else if neg2 >> bit & 1 != 0 {
                q = q.add_var(&p2_neg);
            }
        }
    }

    q
}

/// Number of byte windows in the base-point table.
const WINDOWS: usize = 32;

/// Precomputed multiples of G: entry (w, b) holds b·256^(31-w)·G in affine
/// form, so the walk below can use the fast Z2 = 1 addition. Entry (w, 0) is
/// the point at infinity.
///
/// Around 1 MiB once built, so it is derived on first use rather than at
/// startup; callers that never perform base multiplications pay nothing.
fn byte_points() -> &'static [ProjectivePoint] {
    static BYTE_POINTS: OnceLock<Vec<ProjectivePoint>> = OnceLock::new();
    BYTE_POINTS.get_or_init(|| {
        let mut table = vec![ProjectivePoint::IDENTITY; WINDOWS * 256];

        // window_base starts at G and gains a factor of 256 per window;
        // windows are stored most significant first to match the big-endian
        // scalar bytes.
        let mut window_base = ProjectivePoint::GENERATOR;
        for w in (0..WINDOWS).rev() {
            let row = &mut table[w * 256..(w + 1) * 256];
            for b in 1..256 {
                row[b] = row[b - 1].add_var(&window_base);
            }
            window_base = row[255].add_var(&window_base);
            batch_normalize(row);
        }
        table
    })
}

/// Computes k·G using the precomputed byte table.
///
/// NOT constant time; see the module docs.
pub fn base_mul_var(k: &Scalar) -> ProjectivePoint {
    let table = byte_points();
    let kb = k.to_bytes();

    let mut q = ProjectivePoint::IDENTITY;
    for (w, byte) in kb.iter().enumerate() {
        q = q.add_var(&table[w * 256 + *byte as usize]);
    }
    q
}
