//! Group operations on secp256k1 in Jacobian projective coordinates.
//!
//! A point (X, Y, Z) corresponds to the affine point (X/Z², Y/Z³). The point
//! at infinity is emitted as the all-zero triple; on input both that encoding
//! and any triple with Z = 0 are accepted.
//!
//! Stored coordinates are always normalized field elements; the addition and
//! doubling routines rely on that to compare coordinates cheaply.

use crate::arithmetic::field::FieldElement;
use subtle::{Choice, ConditionallySelectable, ConstantTimeEq};

/// x coordinate of the generator G.
const GENERATOR_X: FieldElement = FieldElement::from_raw_normalized([
    0x2f81798, 0x0a056c5, 0x28d959f, 0x36cb738, 0x3029bfc, 0x3a1c2c1, 0x206295c, 0x2eeb156,
    0x27ef9dc, 0x01e6f99,
]);

/// y coordinate of the generator G.
const GENERATOR_Y: FieldElement = FieldElement::from_raw_normalized([
    0x310d4b8, 0x1f423fe, 0x14199c4, 0x1229a15, 0x0fd17b4, 0x384422a, 0x24fbfc0, 0x3119576,
    0x27726a3, 0x0120eb6,
]);

/// β, the cube root of unity in GF(p) realizing the curve endomorphism
/// λ·(x, y) = (β·x, y).
const ENDOMORPHISM_BETA: FieldElement = FieldElement::from_raw_normalized([
    0x19501ee, 0x25b0a1c, 0x0995c13, 0x1d44bd6, 0x19cf049, 0x30d0d3a, 0x24479ea, 0x01c41b9,
    0x22b657c, 0x01eba5a,
]);

/// A point on the secp256k1 curve in Jacobian projective coordinates.
#[derive(Clone, Copy, Debug)]
pub struct ProjectivePoint {
    pub(crate) x: FieldElement,
    pub(crate) y: FieldElement,
    pub(crate) z: FieldElement,
}

impl ProjectivePoint {
    /// The point at infinity.
    pub const IDENTITY: Self = Self {
        x: FieldElement::ZERO,
        y: FieldElement::ZERO,
        z: FieldElement::ZERO,
    };

    /// The base point G.
    pub const GENERATOR: Self = Self {
        x: GENERATOR_X,
        y: GENERATOR_Y,
        z: FieldElement::ONE,
    };

    /// Builds a point from affine coordinates (Z = 1). The coordinates must
    /// be normalized.
    pub(crate) const fn from_affine(x: FieldElement, y: FieldElement) -> Self {
        Self {
            x,
            y,
            z: FieldElement::ONE,
        }
    }

    /// The affine x coordinate accessor for points with Z = 1.
    pub fn x(&self) -> FieldElement {
        self.x
    }

    /// The affine y coordinate accessor for points with Z = 1.
    pub fn y(&self) -> FieldElement {
        self.y
    }

    /// Whether this point is the point at infinity, under either accepted
    /// encoding.
    pub fn is_identity(&self) -> Choice {
        (self.x.is_zero() & self.y.is_zero()) | self.z.is_zero()
    }

    /// Converts to the unique representation with Z = 1 (or the canonical
    /// identity encoding for the point at infinity).
    pub fn to_affine(&self) -> Self {
        self.z
            .invert()
            .map(|zinv| {
                let zinv2 = zinv.square();
                let x = self.x.mul(&zinv2).normalize();
                let y = self.y.mul(&zinv2).mul(&zinv).normalize();
                Self::from_affine(x, y)
            })
            .unwrap_or(Self::IDENTITY)
    }

    /// Returns `-self`.
    pub fn neg(&self) -> Self {
        Self {
            x: self.x,
            y: self.y.negate(1).normalize(),
            z: self.z,
        }
    }

    /// Applies the curve endomorphism: `λ·self = (β·X, Y, Z)`.
    pub(crate) fn endomorphism(&self) -> Self {
        Self {
            x: self.x.mul(&ENDOMORPHISM_BETA).normalize(),
            y: self.y,
            z: self.z,
        }
    }

    /// Whether Y² = X³ + 7·Z⁶, i.e. the point is on the curve (the identity
    /// included).
    pub fn is_on_curve(&self) -> Choice {
        let y2 = self.y.square().normalize();
        let x3 = self.x.square().mul(&self.x);
        let z2 = self.z.square();
        let z6 = z2.square().mul(&z2);
        let rhs = x3.add(&z6.mul_single(7)).normalize();
        y2.ct_eq(&rhs)
    }

    /// Adds two points with Z₁ = Z₂ = 1 using the mmadd-2007-bl method:
    /// H = X2-X1, I = 4H², J = HI, r = 2(Y2-Y1), V = X1·I,
    /// X3 = r²-J-2V, Y3 = r(V-X3)-2Y1·J, Z3 = 2H.
    /// 4M + 2S.
    fn add_z1_and_z2_eq_one(p1: &Self, p2: &Self) -> Self {
        // Equal x coordinates mean the points either double (equal y) or
        // cancel to the point at infinity (opposite y).
        if bool::from(p1.x.ct_eq(&p2.x)) {
            if bool::from(p1.y.ct_eq(&p2.y)) {
                return p1.double_var();
            }
            return Self::IDENTITY;
        }

        let h = p1.x.negate(1).add(&p2.x); // mag 3
        let i = h.square().mul_single(4); // mag 4
        let j = h.mul(&i); // mag 1
        let r = p1.y.negate(1).add(&p2.y).mul_single(2); // mag 6
        let v = p1.x.mul(&i); // mag 1
        let neg_j = j.negate(1); // mag 2
        let neg_2v = v.mul_single(2).negate(2); // mag 3
        let x3 = r.square().add(&neg_j).add(&neg_2v); // mag 6
        let neg_x3 = x3.negate(6); // mag 7
        let j = j.mul(&p1.y).mul_single(2).negate(2); // mag 3
        let y3 = v.add(&neg_x3).mul(&r).add(&j); // mag 4
        let z3 = h.mul_single(2); // mag 6

        Self {
            x: x3.normalize(),
            y: y3.normalize(),
            z: z3.normalize(),
        }
    }

    /// Adds two points sharing the same Z coordinate:
    /// A = X2-X1, B = A², C = Y2-Y1, D = C², E = X1·B, F = X2·B,
    /// X3 = D-E-F, Y3 = C(E-X3)-Y1(F-E), Z3 = Z1·A.
    /// 5M + 2S.
    fn add_z1_eq_z2(p1: &Self, p2: &Self) -> Self {
        if bool::from(p1.x.ct_eq(&p2.x)) {
            if bool::from(p1.y.ct_eq(&p2.y)) {
                return p1.double_var();
            }
            return Self::IDENTITY;
        }

        let a = p1.x.negate(1).add(&p2.x); // mag 3
        let b = a.square(); // mag 1
        let c = p1.y.negate(1).add(&p2.y); // mag 3
        let d = c.square(); // mag 1
        let e = p1.x.mul(&b); // mag 1
        let neg_e = e.negate(1); // mag 2
        let f = p2.x.mul(&b); // mag 1
        let x3 = e.add(&f).negate(3).add(&d); // mag 5
        let neg_x3 = x3.negate(5).normalize(); // mag 1
        let y3 = p1.y.mul(&f.add(&neg_e)).negate(3); // mag 4
        let y3 = y3.add(&e.add(&neg_x3).mul(&c)); // mag 5
        let z3 = p1.z.mul(&a); // mag 1

        Self {
            x: x3.normalize(),
            y: y3.normalize(),
            z: z3.normalize(),
        }
    }

    /// Adds a point with arbitrary Z to one with Z = 1 (madd-2007-bl):
    /// Z1Z1 = Z1², U2 = X2·Z1Z1, S2 = Y2·Z1·Z1Z1, H = U2-X1, HH = H²,
    /// I = 4HH, J = HI, r = 2(S2-Y1), V = X1·I,
    /// X3 = r²-J-2V, Y3 = r(V-X3)-2Y1·J, Z3 = (Z1+H)²-Z1Z1-HH.
    /// 7M + 4S.
    fn add_z2_eq_one(p1: &Self, p2: &Self) -> Self {
        // Bring the second point's coordinates into p1's projective scale
        // before the equal-x check. With Z2 = 1, only p2 needs scaling.
        let z1z1 = p1.z.square(); // mag 1
        let u2 = p2.x.mul(&z1z1).normalize(); // mag 1
        let s2 = p2.y.mul(&z1z1).mul(&p1.z).normalize(); // mag 1
        if bool::from(p1.x.ct_eq(&u2)) {
            if bool::from(p1.y.ct_eq(&s2)) {
                return p1.double_var();
            }
            return Self::IDENTITY;
        }

        let neg_x1 = p1.x.negate(1); // mag 2
        let h = u2.add(&neg_x1); // mag 3
        let hh = h.square(); // mag 1
        let i = hh.mul_single(4); // mag 4
        let j = h.mul(&i); // mag 1
        let neg_y1 = p1.y.negate(1); // mag 2
        let r = s2.add(&neg_y1).mul_single(2); // mag 6
        let rr = r.square(); // mag 1
        let v = p1.x.mul(&i); // mag 1
        let x3 = v.mul_single(2).add(&j).negate(3); // mag 4
        let x3 = x3.add(&rr); // mag 5
        let neg_x3 = x3.negate(5); // mag 6
        let y3 = p1.y.mul(&j).mul_single(2).negate(2); // mag 3
        let y3 = y3.add(&v.add(&neg_x3).mul(&r)); // mag 4
        let z3 = p1.z.add(&h).square(); // mag 1
        let z3 = z3.add(&z1z1.add(&hh).negate(2)); // mag 4

        Self {
            x: x3.normalize(),
            y: y3.normalize(),
            z: z3.normalize(),
        }
    }

    /// Adds two points with no assumptions on Z (add-2007-bl):
    /// Z1Z1 = Z1², Z2Z2 = Z2², U1 = X1·Z2Z2, U2 = X2·Z1Z1,
    /// S1 = Y1·Z2·Z2Z2, S2 = Y2·Z1·Z1Z1, H = U2-U1, I = (2H)², J = HI,
    /// r = 2(S2-S1), V = U1·I,
    /// X3 = r²-J-2V, Y3 = r(V-X3)-2S1·J, Z3 = ((Z1+Z2)²-Z1Z1-Z2Z2)·H.
    /// 11M + 5S.
    fn add_generic(p1: &Self, p2: &Self) -> Self {
        // Both points must be brought to like terms before the equal-x
        // check, since many Jacobian triples represent one affine point.
        let z1z1 = p1.z.square(); // mag 1
        let z2z2 = p2.z.square(); // mag 1
        let u1 = p1.x.mul(&z2z2).normalize(); // mag 1
        let u2 = p2.x.mul(&z1z1).normalize(); // mag 1
        let s1 = p1.y.mul(&z2z2).mul(&p2.z).normalize(); // mag 1
        let s2 = p2.y.mul(&z1z1).mul(&p1.z).normalize(); // mag 1
        if bool::from(u1.ct_eq(&u2)) {
            if bool::from(s1.ct_eq(&s2)) {
                return p1.double_var();
            }
            return Self::IDENTITY;
        }

        let neg_u1 = u1.negate(1); // mag 2
        let h = u2.add(&neg_u1); // mag 3
        let i = h.mul_single(2).square(); // mag 1
        let j = h.mul(&i); // mag 1
        let neg_s1 = s1.negate(1); // mag 2
        let r = s2.add(&neg_s1).mul_single(2); // mag 6
        let rr = r.square(); // mag 1
        let v = u1.mul(&i); // mag 1
        let x3 = v.mul_single(2).add(&j).negate(3).add(&rr); // mag 5
        let neg_x3 = x3.negate(5); // mag 6
        let y3 = s1.mul(&j).mul_single(2).negate(2); // mag 3
        let y3 = y3.add(&v.add(&neg_x3).mul(&r)); // mag 4
        let z3 = p1.z.add(&p2.z).square(); // mag 1
        let z3 = z3.add(&z1z1.add(&z2z2).negate(2)); // mag 4
        let z3 = z3.mul(&h); // mag 1

        Self {
            x: x3.normalize(),
            y: y3.normalize(),
            z: z3.normalize(),
        }
    }

    /// Adds two points, dispatching to the fastest applicable routine based
    /// on the Z coordinates.
    ///
    /// NOT constant time: the branch pattern depends on the operands.
    pub fn add_var(&self, other: &Self) -> Self {
        // ∞ + P = P and P + ∞ = P.
        if bool::from(self.is_identity()) {
            return *other;
        }
        if bool::from(other.is_identity()) {
            return *self;
        }

        let is_z1_one = bool::from(self.z.is_one());
        let is_z2_one = bool::from(other.z.is_one());
        if is_z1_one && is_z2_one {
            return Self::add_z1_and_z2_eq_one(self, other);
        }
        if bool::from(self.z.ct_eq(&other.z)) {
            return Self::add_z1_eq_z2(self, other);
        }
        if is_z2_one {
            return Self::add_z2_eq_one(self, other);
        }
        Self::add_generic(self, other)
    }

    /// Doubles a point with Z = 1:
    /// A = X1², B = Y1², C = B², D = 2((X1+B)²-A-C), E = 3A, F = E²,
    /// X3 = F-2D, Y3 = E(D-X3)-8C, Z3 = 2Y1.
    /// 1M + 5S.
    fn double_z1_eq_one(&self) -> Self {
        let z3 = self.y.mul_single(2); // mag 2
        let a = self.x.square(); // mag 1
        let b = self.y.square(); // mag 1
        let c = b.square(); // mag 1
        let b = b.add(&self.x).square(); // mag 1
        let d = a.add(&c).negate(2); // mag 3
        let d = d.add(&b).mul_single(2); // mag 8
        let e = a.mul_single(3); // mag 3
        let f = e.square(); // mag 1
        let x3 = d.mul_single(2).negate(16); // mag 17
        let x3 = x3.add(&f); // mag 18
        let f = x3.negate(18).add(&d).normalize(); // mag 1
        let y3 = c.mul_single(8).negate(8); // mag 9
        let y3 = y3.add(&f.mul(&e)); // mag 10

        Self {
            x: x3.normalize(),
            y: y3.normalize(),
            z: z3.normalize(),
        }
    }

    /// Doubles a point with arbitrary Z; same schedule as the Z = 1 case
    /// except Z3 = 2Y1·Z1. 2M + 5S.
    fn double_generic(&self) -> Self {
        let z3 = self.y.mul(&self.z).mul_single(2); // mag 2
        let a = self.x.square(); // mag 1
        let b = self.y.square(); // mag 1
        let c = b.square(); // mag 1
        let b = b.add(&self.x).square(); // mag 1
        let d = a.add(&c).negate(2); // mag 3
        let d = d.add(&b).mul_single(2); // mag 8
        let e = a.mul_single(3); // mag 3
        let f = e.square(); // mag 1
        let x3 = d.mul_single(2).negate(16); // mag 17
        let x3 = x3.add(&f); // mag 18
        let f = x3.negate(18).add(&d).normalize(); // mag 1
        let y3 = c.mul_single(8).negate(8); // mag 9
        let y3 = y3.add(&f.mul(&e)); // mag 10

        Self {
            x: x3.normalize(),
            y: y3.normalize(),
            z: z3.normalize(),
        }
    }

    /// Doubles this point.
    ///
    /// NOT constant time: the branch pattern depends on the operand.
    pub fn double_var(&self) -> Self {
        // 2∞ = ∞, and a point with Y = 0 is its own negation.
        if bool::from(self.y.is_zero() | self.z.is_zero()) {
            return Self::IDENTITY;
        }
        if bool::from(self.z.is_one()) {
            return self.double_z1_eq_one();
        }
        self.double_generic()
    }
}

/// Converts every point in the slice to its affine (Z = 1) representation
/// using a single field inversion (Montgomery's trick). Identity points are
/// left as the canonical identity encoding.
pub(crate) fn batch_normalize(points: &mut [ProjectivePoint]) {
    let mut prefix = Vec::with_capacity(points.len());
    let mut acc = FieldElement::ONE;
    for p in points.iter() {
        // Substitute 1 for identity Z values so the running product stays
        // invertible.
        let z = FieldElement::conditional_select(&p.z, &FieldElement::ONE, p.is_identity());
        prefix.push(acc);
        acc = acc.mul(&z).normalize();
    }

    let mut tail_inv = acc.invert().unwrap_or(FieldElement::ZERO);
    for i in (0..points.len()).rev() {
        let p = points[i];
        let ident = p.is_identity();
        let z = FieldElement::conditional_select(&p.z, &FieldElement::ONE, ident);
        let zinv = tail_inv.mul(&prefix[i]).normalize();
        tail_inv = tail_inv.mul(&z).normalize();

        let zinv2 = zinv.square();
        let x = p.x.mul(&zinv2).normalize();
        let y = p.y.mul(&zinv2).mul(&zinv).normalize();
        let affine = ProjectivePoint::from_affine(x, y);
        points[i] = ProjectivePoint::conditional_select(&affine, &ProjectivePoint::IDENTITY, ident);
    }
}

impl ConditionallySelectable for ProjectivePoint {
    fn conditional_select(a: &Self, b: &Self, choice: Choice) -> Self {
        Self {
            x: FieldElement::conditional_select(&a.x, &b.x, choice),
            y: FieldElement::conditional_select(&a.y, &b.y, choice),
            z: FieldElement::conditional_select(&a.z, &b.z, choice),
        }
    }
}

impl ConstantTimeEq for ProjectivePoint {
    fn ct_eq(&self, other: &Self) -> Choice {
        // Compare cross-multiplied coordinates: (X1, Y1, Z1) and (X2, Y2,
        // Z2) match when X1·Z2² = X2·Z1² and Y1·Z2³ = Y2·Z1³.
        let id1 = self.is_identity();
        let id2 = other.is_identity();

        let z1z1 = self.z.square().normalize();
        let z2z2 = other.z.square().normalize();
        let lhs_x = self.x.mul(&z2z2);
        let rhs_x = other.x.mul(&z1z1);
        let x_eq = lhs_x.add(&rhs_x.negate(1)).normalizes_to_zero();
        let lhs_y = self.y.mul(&z2z2).mul(&other.z);
        let rhs_y = other.y.mul(&z1z1).mul(&self.z);
        let y_eq = lhs_y.add(&rhs_y.negate(1)).normalizes_to_zero();

        (id1 & id2) | (!id1 & !id2 & x_eq & y_eq)
    }
}

impl PartialEq for ProjectivePoint {
    fn eq(&self, other: &Self) -> bool {
        self.ct_eq(other).into()
    }
}

impl Eq for ProjectivePoint {}

impl Default for ProjectivePoint {
    fn default() -> Self {
        Self::IDENTITY
    }
}

#[cfg(test)]
mod tests {
    use super::{batch_normalize, ProjectivePoint};
    use crate::arithmetic::field::FieldElement;

    /// Builds a point from (possibly short) hex coordinates.
    fn point(x: &str, y: &str, z: &str) -> ProjectivePoint {
        fn fe(s: &str) -> FieldElement {
            let padded = format!("{s:0>64}");
            let bytes: [u8; 32] = hex::decode(padded).unwrap().try_into().unwrap();
            FieldElement::from_bytes(&bytes).unwrap()
        }
        ProjectivePoint {
            x: fe(x),
            y: fe(y),
            z: fe(z),
        }
    }

    fn assert_same_representation(got: &ProjectivePoint, want: &ProjectivePoint, name: &str) {
        assert_eq!(got.x.to_bytes(), want.x.to_bytes(), "{name}: x mismatch");
        assert_eq!(got.y.to_bytes(), want.y.to_bytes(), "{name}: y mismatch");
        assert_eq!(got.z.to_bytes(), want.z.to_bytes(), "{name}: z mismatch");
    }

    /// Known-good Jacobian addition results covering every Z-coordinate
    /// specialization, including the equal-x doubling and cancellation
    /// cases.
    #[test]
    fn add_var_known_vectors() {
        let tests: &[(&str, [&str; 9])] = &[
            (
                "infinity + P = P",
                [
                    "0",
                    "0",
                    "0",
                    "d74bf844b0862475103d96a611cf2d898447e288d34b360bc885cb8ce7c00575",
                    "131c670d414c4546b88ac3ff664611b1c38ceb1c21d76369d7a7a0969d61d97d",
                    "1",
                    "d74bf844b0862475103d96a611cf2d898447e288d34b360bc885cb8ce7c00575",
                    "131c670d414c4546b88ac3ff664611b1c38ceb1c21d76369d7a7a0969d61d97d",
                    "1",
                ],
            ),
            (
                "P + infinity = P",
                [
                    "d74bf844b0862475103d96a611cf2d898447e288d34b360bc885cb8ce7c00575",
                    "131c670d414c4546b88ac3ff664611b1c38ceb1c21d76369d7a7a0969d61d97d",
                    "1",
                    "0",
                    "0",
                    "0",
                    "d74bf844b0862475103d96a611cf2d898447e288d34b360bc885cb8ce7c00575",
                    "131c670d414c4546b88ac3ff664611b1c38ceb1c21d76369d7a7a0969d61d97d",
                    "1",
                ],
            ),
            (
                "z1=z2=1, distinct x",
                [
                    "34f9460f0e4f08393d192b3c5133a6ba099aa0ad9fd54ebccfacdfa239ff49c6",
                    "0b71ea9bd730fd8923f6d25a7a91e7dd7728a960686cb5a901bb419e0f2ca232",
                    "1",
                    "d74bf844b0862475103d96a611cf2d898447e288d34b360bc885cb8ce7c00575",
                    "131c670d414c4546b88ac3ff664611b1c38ceb1c21d76369d7a7a0969d61d97d",
                    "1",
                    "0cfbc7da1e569b334460788faae0286e68b3af7379d5504efc25e4dba16e46a6",
                    "e205f79361bbe0346b037b4010985dbf4f9e1e955e7d0d14aca876bfa79aad87",
                    "44a5646b446e3877a648d6d381370d9ef55a83b666ebce9df1b1d7d65b817b2f",
                ],
            ),
            (
                "z1=z2=1, opposite y",
                [
                    "34f9460f0e4f08393d192b3c5133a6ba099aa0ad9fd54ebccfacdfa239ff49c6",
                    "0b71ea9bd730fd8923f6d25a7a91e7dd7728a960686cb5a901bb419e0f2ca232",
                    "1",
                    "34f9460f0e4f08393d192b3c5133a6ba099aa0ad9fd54ebccfacdfa239ff49c6",
                    "f48e156428cf0276dc092da5856e182288d7569f97934a56fe44be60f0d359fd",
                    "1",
                    "0",
                    "0",
                    "0",
                ],
            ),
            (
                "z1=z2=1, same point",
                [
                    "34f9460f0e4f08393d192b3c5133a6ba099aa0ad9fd54ebccfacdfa239ff49c6",
                    "0b71ea9bd730fd8923f6d25a7a91e7dd7728a960686cb5a901bb419e0f2ca232",
                    "1",
                    "34f9460f0e4f08393d192b3c5133a6ba099aa0ad9fd54ebccfacdfa239ff49c6",
                    "0b71ea9bd730fd8923f6d25a7a91e7dd7728a960686cb5a901bb419e0f2ca232",
                    "1",
                    "ec9f153b13ee7bd915882859635ea9730bf0dc7611b2c7b0e37ee64f87c50c27",
                    "b082b53702c466dcf6e984a35671756c506c67c2fcb8adb408c44dd0755c8f2a",
                    "16e3d537ae61fb1247eda4b4f523cfbaee5152c0d0d96b520376833c1e594464",
                ],
            ),
            (
                "z1=z2 (!=1), distinct x",
                [
                    "d3e5183c393c20e4f464acf144ce9ae8266a82b67f553af33eb37e88e7fd2718",
                    "5b8f54deb987ec491fb692d3d48f3eebb9454b034365ad480dda0cf079651190",
                    "2",
                    "5d2fe112c21891d440f65a98473cb626111f8a234d2cd82f22172e369f002147",
                    "98e3386a0a622a35c4561ffb32308d8e1c6758e10ebb1b4ebd3d04b4eb0ecbe8",
                    "2",
                    "cfbc7da1e569b334460788faae0286e68b3af7379d5504efc25e4dba16e46a60",
                    "817de4d86ef80d1ac0ded00426176fd3e787a5579f43452b2a1db021e6ac3778",
                    "129591ad11b8e1de99235b4e04dc367bd56a0ed99baf3a77c6c75f5a6e05f08d",
                ],
            ),
            (
                "z1=z2 (!=1), same point",
                [
                    "d3e5183c393c20e4f464acf144ce9ae8266a82b67f553af33eb37e88e7fd2718",
                    "5b8f54deb987ec491fb692d3d48f3eebb9454b034365ad480dda0cf079651190",
                    "2",
                    "d3e5183c393c20e4f464acf144ce9ae8266a82b67f553af33eb37e88e7fd2718",
                    "5b8f54deb987ec491fb692d3d48f3eebb9454b034365ad480dda0cf079651190",
                    "2",
                    "9f153b13ee7bd915882859635ea9730bf0dc7611b2c7b0e37ee65073c50fabac",
                    "2b53702c466dcf6e984a35671756c506c67c2fcb8adb408c44dd125dc91cb988",
                    "6e3d537ae61fb1247eda4b4f523cfbaee5152c0d0d96b520376833c2e5944a11",
                ],
            ),
            (
                "z1!=z2, z2=1, distinct x",
                [
                    "d3e5183c393c20e4f464acf144ce9ae8266a82b67f553af33eb37e88e7fd2718",
                    "5b8f54deb987ec491fb692d3d48f3eebb9454b034365ad480dda0cf079651190",
                    "2",
                    "d74bf844b0862475103d96a611cf2d898447e288d34b360bc885cb8ce7c00575",
                    "131c670d414c4546b88ac3ff664611b1c38ceb1c21d76369d7a7a0969d61d97d",
                    "1",
                    "3ef1f68795a6ccd1181e23eab80a1b9a2cebdcde755413bf097936eb5b91b4f3",
                    "0bef26c377c068d606f6802130bb7e9f3c3d2abcfa1a295950ed81133561cb04",
                    "252b235a2371c3bd3246b69c09b86cf7aad41db3375e74ef8d8ebeb4dc0be11a",
                ],
            ),
            (
                "z1!=z2, z2=1, opposite y",
                [
                    "d3e5183c393c20e4f464acf144ce9ae8266a82b67f553af33eb37e88e7fd2718",
                    "5b8f54deb987ec491fb692d3d48f3eebb9454b034365ad480dda0cf079651190",
                    "2",
                    "34f9460f0e4f08393d192b3c5133a6ba099aa0ad9fd54ebccfacdfa239ff49c6",
                    "f48e156428cf0276dc092da5856e182288d7569f97934a56fe44be60f0d359fd",
                    "1",
                    "0",
                    "0",
                    "0",
                ],
            ),
            (
                "z1!=z2, z2=1, same point",
                [
                    "d3e5183c393c20e4f464acf144ce9ae8266a82b67f553af33eb37e88e7fd2718",
                    "5b8f54deb987ec491fb692d3d48f3eebb9454b034365ad480dda0cf079651190",
                    "2",
                    "34f9460f0e4f08393d192b3c5133a6ba099aa0ad9fd54ebccfacdfa239ff49c6",
                    "0b71ea9bd730fd8923f6d25a7a91e7dd7728a960686cb5a901bb419e0f2ca232",
                    "1",
                    "9f153b13ee7bd915882859635ea9730bf0dc7611b2c7b0e37ee65073c50fabac",
                    "2b53702c466dcf6e984a35671756c506c67c2fcb8adb408c44dd125dc91cb988",
                    "6e3d537ae61fb1247eda4b4f523cfbaee5152c0d0d96b520376833c2e5944a11",
                ],
            ),
            (
                "z1!=z2, both !=1, distinct x",
                [
                    "d3e5183c393c20e4f464acf144ce9ae8266a82b67f553af33eb37e88e7fd2718",
                    "5b8f54deb987ec491fb692d3d48f3eebb9454b034365ad480dda0cf079651190",
                    "2",
                    "91abba6a34b7481d922a4bd6a04899d5a686f6cf6da4e66a0cb427fb25c04bd4",
                    "03fede65e30b4e7576a2abefc963ddbf9fdccbf791b77c29beadefe49951f7d1",
                    "3",
                    "3f07081927fd3f6dadd4476614c89a09eba7f57c1c6c3b01fa2d64eac1eef31e",
                    "949166e04ebc7fd95a9d77e5dfd88d1492ecffd189792e3944eb2b765e09e031",
                    "eb8cba81bcffa4f44d75427506737e1f045f21e6d6f65543ee0e1d163540c931",
                ],
            ),
            (
                "z1!=z2, both !=1, opposite y",
                [
                    "d3e5183c393c20e4f464acf144ce9ae8266a82b67f553af33eb37e88e7fd2718",
                    "5b8f54deb987ec491fb692d3d48f3eebb9454b034365ad480dda0cf079651190",
                    "2",
                    "dcc3768780c74a0325e2851edad0dc8a566fa61a9e7fc4a34d13dcb509f99bc7",
                    "cafc41904dd5428934f7d075129c8ba46eb622d4fc88d72cd1401452664add18",
                    "3",
                    "0",
                    "0",
                    "0",
                ],
            ),
            (
                "z1!=z2, both !=1, same point",
                [
                    "d3e5183c393c20e4f464acf144ce9ae8266a82b67f553af33eb37e88e7fd2718",
                    "5b8f54deb987ec491fb692d3d48f3eebb9454b034365ad480dda0cf079651190",
                    "2",
                    "dcc3768780c74a0325e2851edad0dc8a566fa61a9e7fc4a34d13dcb509f99bc7",
                    "3503be6fb22abd76cb082f8aed63745b9149dd2b037728d32ebfebac99b51f17",
                    "3",
                    "9f153b13ee7bd915882859635ea9730bf0dc7611b2c7b0e37ee65073c50fabac",
                    "2b53702c466dcf6e984a35671756c506c67c2fcb8adb408c44dd125dc91cb988",
                    "6e3d537ae61fb1247eda4b4f523cfbaee5152c0d0d96b520376833c2e5944a11",
                ],
            ),
        ];

        for (name, t) in tests {
            let p1 = point(t[0], t[1], t[2]);
            let p2 = point(t[3], t[4], t[5]);
            let want = point(t[6], t[7], t[8]);
            assert!(
                bool::from(p1.is_on_curve()),
                "{name}: first input not on curve"
            );
            assert!(
                bool::from(p2.is_on_curve()),
                "{name}: second input not on curve"
            );
            let got = p1.add_var(&p2);
            assert_same_representation(&got, &want, name);
        }
    }

    #[test]
    fn double_var_known_vectors() {
        let tests: &[(&str, [&str; 6])] = &[
            ("2*infinity = infinity", ["0", "0", "0", "0", "0", "0"]),
            (
                "doubling with z1=1",
                [
                    "34f9460f0e4f08393d192b3c5133a6ba099aa0ad9fd54ebccfacdfa239ff49c6",
                    "0b71ea9bd730fd8923f6d25a7a91e7dd7728a960686cb5a901bb419e0f2ca232",
                    "1",
                    "ec9f153b13ee7bd915882859635ea9730bf0dc7611b2c7b0e37ee64f87c50c27",
                    "b082b53702c466dcf6e984a35671756c506c67c2fcb8adb408c44dd0755c8f2a",
                    "16e3d537ae61fb1247eda4b4f523cfbaee5152c0d0d96b520376833c1e594464",
                ],
            ),
            (
                "doubling with z1!=1",
                [
                    "d3e5183c393c20e4f464acf144ce9ae8266a82b67f553af33eb37e88e7fd2718",
                    "5b8f54deb987ec491fb692d3d48f3eebb9454b034365ad480dda0cf079651190",
                    "2",
                    "9f153b13ee7bd915882859635ea9730bf0dc7611b2c7b0e37ee65073c50fabac",
                    "2b53702c466dcf6e984a35671756c506c67c2fcb8adb408c44dd125dc91cb988",
                    "6e3d537ae61fb1247eda4b4f523cfbaee5152c0d0d96b520376833c2e5944a11",
                ],
            ),
            (
                // Exercises the carry into bit 256 during field normalization.
                "carry to bit 256",
                [
                    "201e3f75715136d2f93c4f4598f91826f94ca01f4233a5bd35de9708859ca50d",
                    "bdf18566445e7562c6ada68aef02d498d7301503de5b18c6aef6e2b1722412e1",
                    "1",
                    "4a5e0559863ebb4e9ed85f5c4fa76003d05d9a7626616e614a1f738621e3c220",
                    "00000000000000000000000000000000000000000000000000000001b1388778",
                    "7be30acc88bceac58d5b4d15de05a931ae602a07bcb6318d5dedc563e4482993",
                ],
            ),
        ];

        for (name, t) in tests {
            let p = point(t[0], t[1], t[2]);
            let want = point(t[3], t[4], t[5]);
            assert!(bool::from(p.is_on_curve()), "{name}: input not on curve");
            let got = p.double_var();
            assert_same_representation(&got, &want, name);
        }
    }

    #[test]
    fn generator_is_on_curve() {
        let g = ProjectivePoint::GENERATOR;
        assert!(bool::from(g.is_on_curve()));
        assert!(!bool::from(g.is_identity()));
        assert!(bool::from(ProjectivePoint::IDENTITY.is_identity()));
    }

    #[test]
    fn add_matches_double() {
        let g = ProjectivePoint::GENERATOR;
        assert_eq!(g.add_var(&g), g.double_var());
        assert_eq!(
            g.double_var().add_var(&g.neg()),
            g,
            "2G - G should equal G"
        );
    }

    #[test]
    fn endomorphism_stays_on_curve() {
        let g2 = ProjectivePoint::GENERATOR.double_var();
        let mapped = g2.endomorphism();
        assert!(bool::from(mapped.is_on_curve()));
    }

    #[test]
    fn to_affine_round_trip() {
        let p = ProjectivePoint::GENERATOR.double_var();
        let affine = p.to_affine();
        assert!(bool::from(affine.z.is_one()));
        assert_eq!(affine, p);
        assert!(bool::from(
            ProjectivePoint::IDENTITY.to_affine().is_identity()
        ));
    }

    #[test]
    fn batch_normalize_matches_to_affine() {
        let g = ProjectivePoint::GENERATOR;
        let mut points = [
            g.double_var(),
            ProjectivePoint::IDENTITY,
            g.double_var().double_var(),
            g,
        ];
        let expected: Vec<_> = points.iter().map(|p| p.to_affine()).collect();
        batch_normalize(&mut points);
        for (got, want) in points.iter().zip(expected.iter()) {
            assert_same_representation(got, want, "batch_normalize");
        }
    }
}
