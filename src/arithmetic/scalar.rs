//! Scalar arithmetic modulo the secp256k1 group order n.
//!
//! Scalars are eight 32-bit little-endian limbs and are kept fully reduced
//! after every public operation. Reduction of wide products uses the
//! complement 2^256 - n, which is below 2^129, so at most two folding passes
//! are ever required.

use crate::arithmetic::util::{adc32, sbb32};
use subtle::{Choice, ConditionallySelectable, ConstantTimeEq, CtOption};
use zeroize::Zeroize;

/// n = FFFFFFFF FFFFFFFF FFFFFFFF FFFFFFFE BAAEDCE6 AF48A03B BFD25E8C D0364141
pub(crate) const MODULUS: [u32; 8] = [
    0xD036_4141,
    0xBFD2_5E8C,
    0xAF48_A03B,
    0xBAAE_DCE6,
    0xFFFF_FFFE,
    0xFFFF_FFFF,
    0xFFFF_FFFF,
    0xFFFF_FFFF,
];

/// Limbs of 2^256 - n.
const NEG_MODULUS: [u32; 8] = [
    !MODULUS[0] + 1,
    !MODULUS[1],
    !MODULUS[2],
    !MODULUS[3],
    !MODULUS[4],
    !MODULUS[5],
    !MODULUS[6],
    !MODULUS[7],
];

/// Limbs of n / 2 (rounded down).
const FRAC_MODULUS_2: [u32; 8] = [
    0x681B_20A0,
    0xDFE9_2F46,
    0x57A4_501D,
    0x5D57_6E73,
    0xFFFF_FFFF,
    0xFFFF_FFFF,
    0xFFFF_FFFF,
    0x7FFF_FFFF,
];

/// n - 2, big-endian, the fixed exponent of the Fermat inverse.
const MODULUS_MINUS_2: [u8; 32] = [
    0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xfe,
    0xba, 0xae, 0xdc, 0xe6, 0xaf, 0x48, 0xa0, 0x3b, 0xbf, 0xd2, 0x5e, 0x8c, 0xd0, 0x36, 0x41, 0x3f,
];

#[inline(always)]
fn sbb_array(lhs: &[u32; 8], rhs: &[u32; 8]) -> ([u32; 8], u32) {
    let borrow = 0;
    let (r0, borrow) = sbb32(lhs[0], rhs[0], borrow);
    let (r1, borrow) = sbb32(lhs[1], rhs[1], borrow);
    let (r2, borrow) = sbb32(lhs[2], rhs[2], borrow);
    let (r3, borrow) = sbb32(lhs[3], rhs[3], borrow);
    let (r4, borrow) = sbb32(lhs[4], rhs[4], borrow);
    let (r5, borrow) = sbb32(lhs[5], rhs[5], borrow);
    let (r6, borrow) = sbb32(lhs[6], rhs[6], borrow);
    let (r7, borrow) = sbb32(lhs[7], rhs[7], borrow);
    ([r0, r1, r2, r3, r4, r5, r6, r7], borrow)
}

#[inline(always)]
fn sbb_array_with_underflow(lhs: &[u32; 8], rhs: &[u32; 8]) -> ([u32; 8], Choice) {
    let (res, borrow) = sbb_array(lhs, rhs);
    (res, Choice::from((borrow >> 31) as u8))
}

#[inline(always)]
fn adc_array(lhs: &[u32; 8], rhs: &[u32; 8]) -> ([u32; 8], u32) {
    let carry = 0;
    let (r0, carry) = adc32(lhs[0], rhs[0], carry);
    let (r1, carry) = adc32(lhs[1], rhs[1], carry);
    let (r2, carry) = adc32(lhs[2], rhs[2], carry);
    let (r3, carry) = adc32(lhs[3], rhs[3], carry);
    let (r4, carry) = adc32(lhs[4], rhs[4], carry);
    let (r5, carry) = adc32(lhs[5], rhs[5], carry);
    let (r6, carry) = adc32(lhs[6], rhs[6], carry);
    let (r7, carry) = adc32(lhs[7], rhs[7], carry);
    ([r0, r1, r2, r3, r4, r5, r6, r7], carry)
}

#[inline(always)]
fn adc_array_with_overflow(lhs: &[u32; 8], rhs: &[u32; 8]) -> ([u32; 8], Choice) {
    let (res, carry) = adc_array(lhs, rhs);
    (res, Choice::from(carry as u8))
}

#[inline(always)]
fn select_limbs(a: &[u32; 8], b: &[u32; 8], choice: Choice) -> [u32; 8] {
    let mut r = [0u32; 8];
    for i in 0..8 {
        r[i] = u32::conditional_select(&a[i], &b[i], choice);
    }
    r
}

#[inline(always)]
fn ct_less(a: u32, b: u32) -> u32 {
    (a < b) as u32
}

/// Adds `a` to the 96-bit accumulator (c0, c1, c2). `c2` must not overflow.
#[inline(always)]
fn sumadd(a: u32, c0: u32, c1: u32, c2: u32) -> (u32, u32, u32) {
    let new_c0 = c0.wrapping_add(a);
    let over = ct_less(new_c0, a);
    let new_c1 = c1.wrapping_add(over);
    let new_c2 = c2 + ct_less(new_c1, over);
    (new_c0, new_c1, new_c2)
}

/// Adds `a` to the accumulator (c0, c1) whose `c1` cannot overflow.
#[inline(always)]
fn sumadd_fast(a: u32, c0: u32, c1: u32) -> (u32, u32) {
    let new_c0 = c0.wrapping_add(a);
    let new_c1 = c1 + ct_less(new_c0, a);
    debug_assert!((new_c1 != 0) | (new_c0 >= a));
    (new_c0, new_c1)
}

/// Adds `a * b` to the 96-bit accumulator (c0, c1, c2). `c2` must not
/// overflow.
#[inline(always)]
fn muladd(a: u32, b: u32, c0: u32, c1: u32, c2: u32) -> (u32, u32, u32) {
    let t = (a as u64) * (b as u64);
    let th = (t >> 32) as u32;
    let tl = t as u32;

    let new_c0 = c0.wrapping_add(tl);
    let new_th = th + ct_less(new_c0, tl);
    let new_c1 = c1.wrapping_add(new_th);
    let new_c2 = c2 + ct_less(new_c1, new_th);
    debug_assert!((new_c1 >= new_th) || (new_c2 != 0));
    (new_c0, new_c1, new_c2)
}

/// Adds `a * b` to the accumulator (c0, c1) whose `c1` cannot overflow.
#[inline(always)]
fn muladd_fast(a: u32, b: u32, c0: u32, c1: u32) -> (u32, u32) {
    let t = (a as u64) * (b as u64);
    let th = (t >> 32) as u32;
    let tl = t as u32;

    let new_c0 = c0.wrapping_add(tl);
    let new_th = th + ct_less(new_c0, tl);
    let new_c1 = c1 + new_th;
    debug_assert!(new_c1 >= new_th);
    (new_c0, new_c1)
}

/// An integer modulo the secp256k1 group order.
#[derive(Clone, Copy, Debug, Default)]
pub struct Scalar(pub(crate) [u32; 8]);

impl Scalar {
    /// The scalar zero.
    pub const ZERO: Self = Self([0; 8]);

    /// The scalar one.
    pub const ONE: Self = Self([1, 0, 0, 0, 0, 0, 0, 0]);

    /// Unpacks a 32-byte big-endian value without reducing it. Only for
    /// compile-time constants already known to be canonical.
    pub(crate) const fn from_bytes_unchecked(bytes: &[u8; 32]) -> Self {
        let w7 = ((bytes[0] as u32) << 24)
            | ((bytes[1] as u32) << 16)
            | ((bytes[2] as u32) << 8)
            | (bytes[3] as u32);
        let w6 = ((bytes[4] as u32) << 24)
            | ((bytes[5] as u32) << 16)
            | ((bytes[6] as u32) << 8)
            | (bytes[7] as u32);
        let w5 = ((bytes[8] as u32) << 24)
            | ((bytes[9] as u32) << 16)
            | ((bytes[10] as u32) << 8)
            | (bytes[11] as u32);
        let w4 = ((bytes[12] as u32) << 24)
            | ((bytes[13] as u32) << 16)
            | ((bytes[14] as u32) << 8)
            | (bytes[15] as u32);
        let w3 = ((bytes[16] as u32) << 24)
            | ((bytes[17] as u32) << 16)
            | ((bytes[18] as u32) << 8)
            | (bytes[19] as u32);
        let w2 = ((bytes[20] as u32) << 24)
            | ((bytes[21] as u32) << 16)
            | ((bytes[22] as u32) << 8)
            | (bytes[23] as u32);
        let w1 = ((bytes[24] as u32) << 24)
            | ((bytes[25] as u32) << 16)
            | ((bytes[26] as u32) << 8)
            | (bytes[27] as u32);
        let w0 = ((bytes[28] as u32) << 24)
            | ((bytes[29] as u32) << 16)
            | ((bytes[30] as u32) << 8)
            | (bytes[31] as u32);
        Self([w0, w1, w2, w3, w4, w5, w6, w7])
    }

    fn unpack(bytes: &[u8; 32]) -> [u32; 8] {
        let mut w = [0u32; 8];
        for i in 0..8 {
            let j = (7 - i) * 4;
            w[i] = u32::from_be_bytes([bytes[j], bytes[j + 1], bytes[j + 2], bytes[j + 3]]);
        }
        w
    }

    /// Parses a 32-byte big-endian value.
    ///
    /// Returns `None` when the value is not in the range `[0, n)`; callers
    /// treat that overflow as a parse failure.
    pub fn from_bytes(bytes: &[u8; 32]) -> CtOption<Self> {
        let w = Self::unpack(bytes);
        let (_, underflow) = sbb_array_with_underflow(&w, &MODULUS);
        CtOption::new(Self(w), underflow)
    }

    /// Parses a 32-byte big-endian value, reducing it modulo n when it
    /// overflows the group order.
    pub fn from_bytes_reduced(bytes: &[u8; 32]) -> Self {
        let w = Self::unpack(bytes);
        let (r2, underflow) = sbb_array_with_underflow(&w, &MODULUS);
        Self(select_limbs(&w, &r2, !underflow))
    }

    fn pad_slice(bytes: &[u8]) -> [u8; 32] {
        let mut b32 = [0u8; 32];
        let src = if bytes.len() > 32 {
            &bytes[bytes.len() - 32..]
        } else {
            bytes
        };
        b32[32 - src.len()..].copy_from_slice(src);
        b32
    }

    /// Parses a big-endian byte slice of any length: shorter inputs are
    /// left-zero-padded, longer inputs keep the low 32 bytes. Returns `None`
    /// when the value is not in `[0, n)`.
    pub fn from_byte_slice(bytes: &[u8]) -> CtOption<Self> {
        Self::from_bytes(&Self::pad_slice(bytes))
    }

    /// Parses a big-endian byte slice with the same padding/truncation rules
    /// as [`Scalar::from_byte_slice`], reducing overflowing values modulo n.
    pub fn from_byte_slice_reduced(bytes: &[u8]) -> Self {
        Self::from_bytes_reduced(&Self::pad_slice(bytes))
    }

    /// Returns the 32-byte big-endian encoding.
    pub fn to_bytes(&self) -> [u8; 32] {
        let mut ret = [0u8; 32];
        for i in 0..8 {
            ret[i * 4..i * 4 + 4].copy_from_slice(&self.0[7 - i].to_be_bytes());
        }
        ret
    }

    /// Whether this scalar is greater than n / 2 (the half order).
    pub fn is_high(&self) -> Choice {
        let (_, underflow) = sbb_array_with_underflow(&FRAC_MODULUS_2, &self.0);
        underflow
    }

    /// Whether this scalar is zero.
    pub fn is_zero(&self) -> Choice {
        let accum = self.0[0]
            | self.0[1]
            | self.0[2]
            | self.0[3]
            | self.0[4]
            | self.0[5]
            | self.0[6]
            | self.0[7];
        Choice::from((accum == 0) as u8)
    }

    /// Whether this scalar is odd.
    pub fn is_odd(&self) -> Choice {
        (self.0[0] as u8 & 1).into()
    }

    /// Returns `n - self` (zero maps to zero).
    pub fn negate(&self) -> Self {
        let (res, _) = sbb_array(&MODULUS, &self.0);
        Self::conditional_select(&Self(res), &Self::ZERO, self.is_zero())
    }

    /// Returns `self + rhs mod n`.
    pub fn add(&self, rhs: &Self) -> Self {
        let (res1, overflow) = adc_array_with_overflow(&self.0, &rhs.0);
        let (res2, underflow) = sbb_array_with_underflow(&res1, &MODULUS);
        Self(select_limbs(&res1, &res2, overflow | !underflow))
    }

    /// Returns `self - rhs mod n`.
    pub fn sub(&self, rhs: &Self) -> Self {
        let (res1, underflow) = sbb_array_with_underflow(&self.0, &rhs.0);
        let (res2, _) = adc_array(&res1, &MODULUS);
        Self(select_limbs(&res1, &res2, underflow))
    }

    /// Returns `self * rhs mod n`.
    pub fn mul(&self, rhs: &Self) -> Self {
        reduce_wide(&self.mul_wide(rhs))
    }

    /// Returns `self * self mod n`.
    pub fn square(&self) -> Self {
        self.mul(self)
    }

    /// Multiplies without reduction, producing a 512-bit product.
    #[inline(always)]
    fn mul_wide(&self, rhs: &Self) -> [u32; 16] {
        // 96-bit accumulator.
        let c0 = 0;
        let c1 = 0;
        let c2 = 0;

        // l[0..15] = a[0..7] * b[0..7].
        let (c0, c1) = muladd_fast(self.0[0], rhs.0[0], c0, c1);
        let (l0, c0, c1) = (c0, c1, 0);
        let (c0, c1, c2) = muladd(self.0[0], rhs.0[1], c0, c1, c2);
        let (c0, c1, c2) = muladd(self.0[1], rhs.0[0], c0, c1, c2);
        let (l1, c0, c1, c2) = (c0, c1, c2, 0);
        let (c0, c1, c2) = muladd(self.0[0], rhs.0[2], c0, c1, c2);
        let (c0, c1, c2) = muladd(self.0[1], rhs.0[1], c0, c1, c2);
        let (c0, c1, c2) = muladd(self.0[2], rhs.0[0], c0, c1, c2);
        let (l2, c0, c1, c2) = (c0, c1, c2, 0);
        let (c0, c1, c2) = muladd(self.0[0], rhs.0[3], c0, c1, c2);
        let (c0, c1, c2) = muladd(self.0[1], rhs.0[2], c0, c1, c2);
        let (c0, c1, c2) = muladd(self.0[2], rhs.0[1], c0, c1, c2);
        let (c0, c1, c2) = muladd(self.0[3], rhs.0[0], c0, c1, c2);
        let (l3, c0, c1, c2) = (c0, c1, c2, 0);
        let (c0, c1, c2) = muladd(self.0[0], rhs.0[4], c0, c1, c2);
        let (c0, c1, c2) = muladd(self.0[1], rhs.0[3], c0, c1, c2);
        let (c0, c1, c2) = muladd(self.0[2], rhs.0[2], c0, c1, c2);
        let (c0, c1, c2) = muladd(self.0[3], rhs.0[1], c0, c1, c2);
        let (c0, c1, c2) = muladd(self.0[4], rhs.0[0], c0, c1, c2);
        let (l4, c0, c1, c2) = (c0, c1, c2, 0);
        let (c0, c1, c2) = muladd(self.0[0], rhs.0[5], c0, c1, c2);
        let (c0, c1, c2) = muladd(self.0[1], rhs.0[4], c0, c1, c2);
        let (c0, c1, c2) = muladd(self.0[2], rhs.0[3], c0, c1, c2);
        let (c0, c1, c2) = muladd(self.0[3], rhs.0[2], c0, c1, c2);
        let (c0, c1, c2) = muladd(self.0[4], rhs.0[1], c0, c1, c2);
        let (c0, c1, c2) = muladd(self.0[5], rhs.0[0], c0, c1, c2);
        let (l5, c0, c1, c2) = (c0, c1, c2, 0);
        let (c0, c1, c2) = muladd(self.0[0], rhs.0[6], c0, c1, c2);
        let (c0, c1, c2) = muladd(self.0[1], rhs.0[5], c0, c1, c2);
        let (c0, c1, c2) = muladd(self.0[2], rhs.0[4], c0, c1, c2);
        let (c0, c1, c2) = muladd(self.0[3], rhs.0[3], c0, c1, c2);
        let (c0, c1, c2) = muladd(self.0[4], rhs.0[2], c0, c1, c2);
        let (c0, c1, c2) = muladd(self.0[5], rhs.0[1], c0, c1, c2);
        let (c0, c1, c2) = muladd(self.0[6], rhs.0[0], c0, c1, c2);
        let (l6, c0, c1, c2) = (c0, c1, c2, 0);
        let (c0, c1, c2) = muladd(self.0[0], rhs.0[7], c0, c1, c2);
        let (c0, c1, c2) = muladd(self.0[1], rhs.0[6], c0, c1, c2);
        let (c0, c1, c2) = muladd(self.0[2], rhs.0[5], c0, c1, c2);
        let (c0, c1, c2) = muladd(self.0[3], rhs.0[4], c0, c1, c2);
        let (c0, c1, c2) = muladd(self.0[4], rhs.0[3], c0, c1, c2);
        let (c0, c1, c2) = muladd(self.0[5], rhs.0[2], c0, c1, c2);
        let (c0, c1, c2) = muladd(self.0[6], rhs.0[1], c0, c1, c2);
        let (c0, c1, c2) = muladd(self.0[7], rhs.0[0], c0, c1, c2);
        let (l7, c0, c1, c2) = (c0, c1, c2, 0);
        let (c0, c1, c2) = muladd(self.0[1], rhs.0[7], c0, c1, c2);
        let (c0, c1, c2) = muladd(self.0[2], rhs.0[6], c0, c1, c2);
        let (c0, c1, c2) = muladd(self.0[3], rhs.0[5], c0, c1, c2);
        let (c0, c1, c2) = muladd(self.0[4], rhs.0[4], c0, c1, c2);
        let (c0, c1, c2) = muladd(self.0[5], rhs.0[3], c0, c1, c2);
        let (c0, c1, c2) = muladd(self.0[6], rhs.0[2], c0, c1, c2);
        let (c0, c1, c2) = muladd(self.0[7], rhs.0[1], c0, c1, c2);
        let (l8, c0, c1, c2) = (c0, c1, c2, 0);
        let (c0, c1, c2) = muladd(self.0[2], rhs.0[7], c0, c1, c2);
        let (c0, c1, c2) = muladd(self.0[3], rhs.0[6], c0, c1, c2);
        let (c0, c1, c2) = muladd(self.0[4], rhs.0[5], c0, c1, c2);
        let (c0, c1, c2) = muladd(self.0[5], rhs.0[4], c0, c1, c2);
        let (c0, c1, c2) = muladd(self.0[6], rhs.0[3], c0, c1, c2);
        let (c0, c1, c2) = muladd(self.0[7], rhs.0[2], c0, c1, c2);
        let (l9, c0, c1, c2) = (c0, c1, c2, 0);
        let (c0, c1, c2) = muladd(self.0[3], rhs.0[7], c0, c1, c2);
        let (c0, c1, c2) = muladd(self.0[4], rhs.0[6], c0, c1, c2);
        let (c0, c1, c2) = muladd(self.0[5], rhs.0[5], c0, c1, c2);
        let (c0, c1, c2) = muladd(self.0[6], rhs.0[4], c0, c1, c2);
        let (c0, c1, c2) = muladd(self.0[7], rhs.0[3], c0, c1, c2);
        let (l10, c0, c1, c2) = (c0, c1, c2, 0);
        let (c0, c1, c2) = muladd(self.0[4], rhs.0[7], c0, c1, c2);
        let (c0, c1, c2) = muladd(self.0[5], rhs.0[6], c0, c1, c2);
        let (c0, c1, c2) = muladd(self.0[6], rhs.0[5], c0, c1, c2);
        let (c0, c1, c2) = muladd(self.0[7], rhs.0[4], c0, c1, c2);
        let (l11, c0, c1, c2) = (c0, c1, c2, 0);
        let (c0, c1, c2) = muladd(self.0[5], rhs.0[7], c0, c1, c2);
        let (c0, c1, c2) = muladd(self.0[6], rhs.0[6], c0, c1, c2);
        let (c0, c1, c2) = muladd(self.0[7], rhs.0[5], c0, c1, c2);
        let (l12, c0, c1, c2) = (c0, c1, c2, 0);
        let (c0, c1, c2) = muladd(self.0[6], rhs.0[7], c0, c1, c2);
        let (c0, c1, c2) = muladd(self.0[7], rhs.0[6], c0, c1, c2);
        let (l13, c0, c1, _c2) = (c0, c1, c2, 0);
        let (c0, c1) = muladd_fast(self.0[7], rhs.0[7], c0, c1);
        let (l14, c0, c1) = (c0, c1, 0);
        debug_assert!(c1 == 0);
        let l15 = c0;

        [
            l0, l1, l2, l3, l4, l5, l6, l7, l8, l9, l10, l11, l12, l13, l14, l15,
        ]
    }

    /// Constant-time selection of `(high_bit * 2^256 + limbs) % n`.
    fn from_overflow(w: &[u32; 8], high_bit: Choice) -> Self {
        let (r2, underflow) = sbb_array_with_underflow(w, &MODULUS);
        Self(select_limbs(w, &r2, !underflow | high_bit))
    }

    /// Adds `flag * 2^bit` to this scalar in constant time with respect to
    /// the scalar (not the bit position).
    pub(crate) fn conditional_add_bit(&self, bit: usize, flag: Choice) -> Self {
        debug_assert!(bit < 256);

        // 1 << bit as a scalar; bit 255 of n is set so this cannot overflow.
        let bit_lo = bit & 0x1F;
        let w = Self([
            (((bit >> 5) == 0) as u32) << bit_lo,
            (((bit >> 5) == 1) as u32) << bit_lo,
            (((bit >> 5) == 2) as u32) << bit_lo,
            (((bit >> 5) == 3) as u32) << bit_lo,
            (((bit >> 5) == 4) as u32) << bit_lo,
            (((bit >> 5) == 5) as u32) << bit_lo,
            (((bit >> 5) == 6) as u32) << bit_lo,
            (((bit >> 5) == 7) as u32) << bit_lo,
        ]);

        Self::conditional_select(self, &self.add(&w), flag)
    }

    /// Computes `round(self * b / 2^shift)` for `shift >= 256`.
    ///
    /// Variable time in `shift` only; every call site uses a fixed shift.
    pub(crate) fn mul_shift_var(&self, b: &Self, shift: usize) -> Self {
        debug_assert!(shift >= 256);

        let l = self.mul_wide(b);
        let shiftlimbs = shift >> 5;
        let shiftlow = shift & 0x1F;
        let mut r = [0u32; 8];
        for (i, ri) in r.iter_mut().enumerate() {
            let limit = 512 - 32 * i;
            if shift < limit {
                let mut w = l[i + shiftlimbs] >> shiftlow;
                if shift < limit - 32 && shiftlow != 0 {
                    w |= l[i + shiftlimbs + 1] << (32 - shiftlow);
                }
                *ri = w;
            }
        }

        // Round up when the highest discarded bit is set.
        let c = (l[(shift - 1) >> 5] >> ((shift - 1) & 0x1f)) & 1;
        Self(r).conditional_add_bit(0, Choice::from(c as u8))
    }

    /// Returns the multiplicative inverse, computed in constant time as
    /// `self^(n-2)`. The inverse of zero is zero.
    pub fn invert(&self) -> Self {
        let mut r = Self::ONE;
        for byte in MODULUS_MINUS_2.iter() {
            for bit in (0..8).rev() {
                r = r.square();
                if (byte >> bit) & 1 != 0 {
                    r = r.mul(self);
                }
            }
        }
        r
    }

    /// Returns the multiplicative inverse via the binary extended GCD.
    ///
    /// NOT constant time; only use on public values (such as the r and s of
    /// a signature being verified). The inverse of zero is zero.
    pub fn invert_vartime(&self) -> Self {
        fn is_one(a: &[u32; 8]) -> bool {
            a[0] == 1 && a[1..].iter().all(|&w| w == 0)
        }
        fn is_even(a: &[u32; 8]) -> bool {
            a[0] & 1 == 0
        }
        /// Shift right by one, shifting `hi` (0 or 1) into the top bit.
        fn shr1(a: &mut [u32; 8], hi: u32) {
            for i in 0..7 {
                a[i] = (a[i] >> 1) | (a[i + 1] << 31);
            }
            a[7] = (a[7] >> 1) | (hi << 31);
        }
        fn ge(a: &[u32; 8], b: &[u32; 8]) -> bool {
            for i in (0..8).rev() {
                if a[i] != b[i] {
                    return a[i] > b[i];
                }
            }
            true
        }
        fn sub_in_place(a: &mut [u32; 8], b: &[u32; 8]) {
            let (r, borrow) = sbb_array(a, b);
            debug_assert!(borrow == 0);
            *a = r;
        }
        /// Halves a value modulo n: even values shift, odd values add n
        /// first (n is odd, so exactly one of x, x+n is even).
        fn half_mod(a: &mut [u32; 8]) {
            if is_even(a) {
                shr1(a, 0);
            } else {
                let (r, carry) = adc_array(a, &MODULUS);
                *a = r;
                shr1(a, carry);
            }
        }

        if bool::from(self.is_zero()) {
            return Self::ZERO;
        }

        let mut u = self.0;
        let mut v = MODULUS;
        let mut x1 = Self::ONE;
        let mut x2 = Self::ZERO;

        while !is_one(&u) && !is_one(&v) {
            while is_even(&u) {
                shr1(&mut u, 0);
                half_mod(&mut x1.0);
            }
            while is_even(&v) {
                shr1(&mut v, 0);
                half_mod(&mut x2.0);
            }
            if ge(&u, &v) {
                sub_in_place(&mut u, &v);
                x1 = x1.sub(&x2);
            } else {
                sub_in_place(&mut v, &u);
                x2 = x2.sub(&x1);
            }
        }

        if is_one(&u) {
            x1
        } else {
            x2
        }
    }
}

/// Reduces a 512-bit product modulo n using the complement 2^256 - n.
#[inline(always)]
fn reduce_wide(l: &[u32; 16]) -> Scalar {
    let n0 = l[8];
    let n1 = l[9];
    let n2 = l[10];
    let n3 = l[11];
    let n4 = l[12];
    let n5 = l[13];
    let n6 = l[14];
    let n7 = l[15];

    // 96-bit accumulator.
    //
    // Reduce 512 bits into 385: m[0..12] = l[0..7] + n[0..7] * NEG_MODULUS.
    let c0 = l[0];
    let c1 = 0;
    let c2 = 0;
    let (c0, c1) = muladd_fast(n0, NEG_MODULUS[0], c0, c1);
    let (m0, c0, c1) = (c0, c1, 0);
    let (c0, c1) = sumadd_fast(l[1], c0, c1);
    let (c0, c1, c2) = muladd(n1, NEG_MODULUS[0], c0, c1, c2);
    let (c0, c1, c2) = muladd(n0, NEG_MODULUS[1], c0, c1, c2);
    let (m1, c0, c1, c2) = (c0, c1, c2, 0);
    let (c0, c1, c2) = sumadd(l[2], c0, c1, c2);
    let (c0, c1, c2) = muladd(n2, NEG_MODULUS[0], c0, c1, c2);
    let (c0, c1, c2) = muladd(n1, NEG_MODULUS[1], c0, c1, c2);
    let (c0, c1, c2) = muladd(n0, NEG_MODULUS[2], c0, c1, c2);
    let (m2, c0, c1, c2) = (c0, c1, c2, 0);
    let (c0, c1, c2) = sumadd(l[3], c0, c1, c2);
    let (c0, c1, c2) = muladd(n3, NEG_MODULUS[0], c0, c1, c2);
    let (c0, c1, c2) = muladd(n2, NEG_MODULUS[1], c0, c1, c2);
    let (c0, c1, c2) = muladd(n1, NEG_MODULUS[2], c0, c1, c2);
    let (c0, c1, c2) = muladd(n0, NEG_MODULUS[3], c0, c1, c2);
    let (m3, c0, c1, c2) = (c0, c1, c2, 0);
    let (c0, c1, c2) = sumadd(l[4], c0, c1, c2);
    let (c0, c1, c2) = muladd(n4, NEG_MODULUS[0], c0, c1, c2);
    let (c0, c1, c2) = muladd(n3, NEG_MODULUS[1], c0, c1, c2);
    let (c0, c1, c2) = muladd(n2, NEG_MODULUS[2], c0, c1, c2);
    let (c0, c1, c2) = muladd(n1, NEG_MODULUS[3], c0, c1, c2);
    let (c0, c1, c2) = sumadd(n0, c0, c1, c2);
    let (m4, c0, c1, c2) = (c0, c1, c2, 0);
    let (c0, c1, c2) = sumadd(l[5], c0, c1, c2);
    let (c0, c1, c2) = muladd(n5, NEG_MODULUS[0], c0, c1, c2);
    let (c0, c1, c2) = muladd(n4, NEG_MODULUS[1], c0, c1, c2);
    let (c0, c1, c2) = muladd(n3, NEG_MODULUS[2], c0, c1, c2);
    let (c0, c1, c2) = muladd(n2, NEG_MODULUS[3], c0, c1, c2);
    let (c0, c1, c2) = sumadd(n1, c0, c1, c2);
    let (m5, c0, c1, c2) = (c0, c1, c2, 0);
    let (c0, c1, c2) = sumadd(l[6], c0, c1, c2);
    let (c0, c1, c2) = muladd(n6, NEG_MODULUS[0], c0, c1, c2);
    let (c0, c1, c2) = muladd(n5, NEG_MODULUS[1], c0, c1, c2);
    let (c0, c1, c2) = muladd(n4, NEG_MODULUS[2], c0, c1, c2);
    let (c0, c1, c2) = muladd(n3, NEG_MODULUS[3], c0, c1, c2);
    let (c0, c1, c2) = sumadd(n2, c0, c1, c2);
    let (m6, c0, c1, c2) = (c0, c1, c2, 0);
    let (c0, c1, c2) = sumadd(l[7], c0, c1, c2);
    let (c0, c1, c2) = muladd(n7, NEG_MODULUS[0], c0, c1, c2);
    let (c0, c1, c2) = muladd(n6, NEG_MODULUS[1], c0, c1, c2);
    let (c0, c1, c2) = muladd(n5, NEG_MODULUS[2], c0, c1, c2);
    let (c0, c1, c2) = muladd(n4, NEG_MODULUS[3], c0, c1, c2);
    let (c0, c1, c2) = sumadd(n3, c0, c1, c2);
    let (m7, c0, c1, c2) = (c0, c1, c2, 0);
    let (c0, c1, c2) = muladd(n7, NEG_MODULUS[1], c0, c1, c2);
    let (c0, c1, c2) = muladd(n6, NEG_MODULUS[2], c0, c1, c2);
    let (c0, c1, c2) = muladd(n5, NEG_MODULUS[3], c0, c1, c2);
    let (c0, c1, c2) = sumadd(n4, c0, c1, c2);
    let (m8, c0, c1, c2) = (c0, c1, c2, 0);
    let (c0, c1, c2) = muladd(n7, NEG_MODULUS[2], c0, c1, c2);
    let (c0, c1, c2) = muladd(n6, NEG_MODULUS[3], c0, c1, c2);
    let (c0, c1, c2) = sumadd(n5, c0, c1, c2);
    let (m9, c0, c1, c2) = (c0, c1, c2, 0);
    let (c0, c1, c2) = muladd(n7, NEG_MODULUS[3], c0, c1, c2);
    let (c0, c1, c2) = sumadd(n6, c0, c1, c2);
    let (m10, c0, c1, _c2) = (c0, c1, c2, 0);
    let (c0, c1) = sumadd_fast(n7, c0, c1);
    let (m11, c0, _c1) = (c0, c1, 0);
    debug_assert!(c0 <= 1);
    let m12 = c0;

    // Reduce 385 bits into 258: p[0..8] = m[0..7] + m[8..12] * NEG_MODULUS.
    let c0 = m0;
    let c1 = 0;
    let c2 = 0;
    let (c0, c1) = muladd_fast(m8, NEG_MODULUS[0], c0, c1);
    let (p0, c0, c1) = (c0, c1, 0);
    let (c0, c1) = sumadd_fast(m1, c0, c1);
    let (c0, c1, c2) = muladd(m9, NEG_MODULUS[0], c0, c1, c2);
    let (c0, c1, c2) = muladd(m8, NEG_MODULUS[1], c0, c1, c2);
    let (p1, c0, c1, c2) = (c0, c1, c2, 0);
    let (c0, c1, c2) = sumadd(m2, c0, c1, c2);
    let (c0, c1, c2) = muladd(m10, NEG_MODULUS[0], c0, c1, c2);
    let (c0, c1, c2) = muladd(m9, NEG_MODULUS[1], c0, c1, c2);
    let (c0, c1, c2) = muladd(m8, NEG_MODULUS[2], c0, c1, c2);
    let (p2, c0, c1, c2) = (c0, c1, c2, 0);
    let (c0, c1, c2) = sumadd(m3, c0, c1, c2);
    let (c0, c1, c2) = muladd(m11, NEG_MODULUS[0], c0, c1, c2);
    let (c0, c1, c2) = muladd(m10, NEG_MODULUS[1], c0, c1, c2);
    let (c0, c1, c2) = muladd(m9, NEG_MODULUS[2], c0, c1, c2);
    let (c0, c1, c2) = muladd(m8, NEG_MODULUS[3], c0, c1, c2);
    let (p3, c0, c1, c2) = (c0, c1, c2, 0);
    let (c0, c1, c2) = sumadd(m4, c0, c1, c2);
    let (c0, c1, c2) = muladd(m12, NEG_MODULUS[0], c0, c1, c2);
    let (c0, c1, c2) = muladd(m11, NEG_MODULUS[1], c0, c1, c2);
    let (c0, c1, c2) = muladd(m10, NEG_MODULUS[2], c0, c1, c2);
    let (c0, c1, c2) = muladd(m9, NEG_MODULUS[3], c0, c1, c2);
    let (c0, c1, c2) = sumadd(m8, c0, c1, c2);
    let (p4, c0, c1, c2) = (c0, c1, c2, 0);
    let (c0, c1, c2) = sumadd(m5, c0, c1, c2);
    let (c0, c1, c2) = muladd(m12, NEG_MODULUS[1], c0, c1, c2);
    let (c0, c1, c2) = muladd(m11, NEG_MODULUS[2], c0, c1, c2);
    let (c0, c1, c2) = muladd(m10, NEG_MODULUS[3], c0, c1, c2);
    let (c0, c1, c2) = sumadd(m9, c0, c1, c2);
    let (p5, c0, c1, c2) = (c0, c1, c2, 0);
    let (c0, c1, c2) = sumadd(m6, c0, c1, c2);
    let (c0, c1, c2) = muladd(m12, NEG_MODULUS[2], c0, c1, c2);
    let (c0, c1, c2) = muladd(m11, NEG_MODULUS[3], c0, c1, c2);
    let (c0, c1, c2) = sumadd(m10, c0, c1, c2);
    let (p6, c0, c1, _c2) = (c0, c1, c2, 0);
    let (c0, c1) = sumadd_fast(m7, c0, c1);
    let (c0, c1) = muladd_fast(m12, NEG_MODULUS[3], c0, c1);
    let (c0, c1) = sumadd_fast(m11, c0, c1);
    let (p7, c0, _c1) = (c0, c1, 0);
    let p8 = c0 + m12;
    debug_assert!(p8 <= 2);

    // Reduce 258 bits into 256: r[0..7] = p[0..7] + p[8] * NEG_MODULUS.
    let mut c = p0 as u64 + (NEG_MODULUS[0] as u64) * (p8 as u64);
    let r0 = (c & 0xFFFF_FFFF) as u32;
    c >>= 32;
    c += p1 as u64 + (NEG_MODULUS[1] as u64) * (p8 as u64);
    let r1 = (c & 0xFFFF_FFFF) as u32;
    c >>= 32;
    c += p2 as u64 + (NEG_MODULUS[2] as u64) * (p8 as u64);
    let r2 = (c & 0xFFFF_FFFF) as u32;
    c >>= 32;
    c += p3 as u64 + (NEG_MODULUS[3] as u64) * (p8 as u64);
    let r3 = (c & 0xFFFF_FFFF) as u32;
    c >>= 32;
    c += p4 as u64 + p8 as u64;
    let r4 = (c & 0xFFFF_FFFF) as u32;
    c >>= 32;
    c += p5 as u64;
    let r5 = (c & 0xFFFF_FFFF) as u32;
    c >>= 32;
    c += p6 as u64;
    let r6 = (c & 0xFFFF_FFFF) as u32;
    c >>= 32;
    c += p7 as u64;
    let r7 = (c & 0xFFFF_FFFF) as u32;
    c >>= 32;

    let high_bit = Choice::from(c as u8);
    Scalar::from_overflow(&[r0, r1, r2, r3, r4, r5, r6, r7], high_bit)
}

impl From<u32> for Scalar {
    fn from(k: u32) -> Self {
        Self([k, 0, 0, 0, 0, 0, 0, 0])
    }
}

impl From<u64> for Scalar {
    fn from(k: u64) -> Self {
        Self([k as u32, (k >> 32) as u32, 0, 0, 0, 0, 0, 0])
    }
}

impl ConditionallySelectable for Scalar {
    fn conditional_select(a: &Self, b: &Self, choice: Choice) -> Self {
        Self(select_limbs(&a.0, &b.0, choice))
    }
}

impl ConstantTimeEq for Scalar {
    fn ct_eq(&self, other: &Self) -> Choice {
        self.0.ct_eq(&other.0)
    }
}

impl PartialEq for Scalar {
    fn eq(&self, other: &Self) -> bool {
        self.ct_eq(other).into()
    }
}

impl Eq for Scalar {}

impl Zeroize for Scalar {
    fn zeroize(&mut self) {
        self.0.zeroize();
    }
}
