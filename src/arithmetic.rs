//! Pure Rust group, field and scalar arithmetic for secp256k1.

pub(crate) mod field;
pub(crate) mod mul;
pub(crate) mod projective;
pub(crate) mod scalar;
mod util;

pub use field::FieldElement;
pub use mul::{base_mul_var, mul_var};
pub use projective::ProjectivePoint;
pub use scalar::Scalar;

use subtle::{Choice, ConditionallySelectable, CtOption};

/// b = 7, the constant term of the curve equation y² = x³ + 7.
pub(crate) const CURVE_B: FieldElement = FieldElement::from_u64(7);

/// The group order n as a field element (n < p, so this is canonical).
pub(crate) const ORDER_AS_FIELD_ELEMENT: FieldElement = FieldElement::from_raw_normalized([
    0x0364141, 0x0097a334, 0x203bbfd, 0x39abd22, 0x2baaedc, 0x3ffffff, 0x3ffffff, 0x3ffffff,
    0x3ffffff, 0x03fffff,
]);

/// Solves y² = x³ + 7 for y, picking the root whose oddness matches `odd`.
///
/// Returns `None` when x is not the abscissa of a curve point (x³ + 7 has no
/// square root). The input must be normalized.
pub fn decompress_y(x: &FieldElement, odd: Choice) -> CtOption<FieldElement> {
    let alpha = x.square().mul(x).add(&CURVE_B);
    alpha.sqrt().map(|beta| {
        let beta = beta.normalize();
        FieldElement::conditional_select(&beta, &beta.negate(1).normalize(), beta.is_odd() ^ odd)
    })
}

/// Reinterprets a scalar as a field element. Always canonical since n < p.
pub(crate) fn scalar_to_field(s: &Scalar) -> FieldElement {
    FieldElement::from_bytes_unchecked(&s.to_bytes())
}

/// Reduces a field element modulo the group order, additionally reporting
/// whether the reduction wrapped (the field value was >= n).
pub(crate) fn field_to_scalar(v: &FieldElement) -> (Scalar, Choice) {
    let bytes = v.to_bytes();
    let s = Scalar::from_bytes_reduced(&bytes);
    let overflow = Scalar::from_bytes(&bytes).is_none();
    (s, overflow)
}

#[cfg(test)]
mod tests {
    use super::{
        decompress_y, field_to_scalar, scalar_to_field, FieldElement, Scalar,
        ORDER_AS_FIELD_ELEMENT,
    };
    use hex_literal::hex;
    use subtle::Choice;

    #[test]
    fn order_constant_matches_scalar_modulus() {
        let n_bytes = hex!("fffffffffffffffffffffffffffffffebaaedce6af48a03bbfd25e8cd0364141");
        assert_eq!(ORDER_AS_FIELD_ELEMENT.to_bytes(), n_bytes);
    }

    /// Decompression edge cases, including x values at the field and group
    /// order boundaries.
    #[test]
    fn decompress_y_boundaries() {
        struct Case {
            x: [u8; 32],
            valid: bool,
            odd_y: Option<[u8; 32]>,
            even_y: Option<[u8; 32]>,
        }
        let cases = [
            // x = 0 is not on the curve (7 has no square root).
            Case {
                x: [0; 32],
                valid: false,
                odd_y: None,
                even_y: None,
            },
            Case {
                x: {
                    let mut x = [0u8; 32];
                    x[31] = 1;
                    x
                },
                valid: true,
                odd_y: Some(hex!(
                    "bde70df51939b94c9c24979fa7dd04ebd9b3572da7802290438af2a681895441"
                )),
                even_y: Some(hex!(
                    "4218f20ae6c646b363db68605822fb14264ca8d2587fdd6fbc750d587e76a7ee"
                )),
            },
            // x = p - 1.
            Case {
                x: hex!("fffffffffffffffffffffffffffffffffffffffffffffffffffffffefffffc2e"),
                valid: false,
                odd_y: None,
                even_y: None,
            },
            // x = n (the group order reduced into the field).
            Case {
                x: hex!("fffffffffffffffffffffffffffffffebaaedce6af48a03bbfd25e8cd0364141"),
                valid: true,
                odd_y: Some(hex!(
                    "670999be34f51e8894b9c14211c28801d9a70fde24b71d3753854b35d07c9a11"
                )),
                even_y: Some(hex!(
                    "98f66641cb0ae1776b463ebdee3d77fe2658f021db48e2c8ac7ab4c92f83621e"
                )),
            },
            // x = n - 1.
            Case {
                x: hex!("fffffffffffffffffffffffffffffffebaaedce6af48a03bbfd25e8cd0364140"),
                valid: false,
                odd_y: None,
                even_y: None,
            },
        ];

        for case in &cases {
            let x = FieldElement::from_bytes(&case.x).unwrap();
            let odd = decompress_y(&x, Choice::from(1));
            let even = decompress_y(&x, Choice::from(0));
            assert_eq!(bool::from(odd.is_some()), case.valid);
            assert_eq!(bool::from(even.is_some()), case.valid);
            if let Some(want) = case.odd_y {
                let got = odd.unwrap().normalize();
                assert!(bool::from(got.is_odd()));
                assert_eq!(got.to_bytes(), want);
            }
            if let Some(want) = case.even_y {
                let got = even.unwrap().normalize();
                assert!(!bool::from(got.is_odd()));
                assert_eq!(got.to_bytes(), want);
            }
        }
    }

    #[test]
    fn field_scalar_conversion_reports_overflow() {
        // n wraps to zero with the overflow flag set.
        let n_as_field = ORDER_AS_FIELD_ELEMENT;
        let (s, overflow) = field_to_scalar(&n_as_field);
        assert_eq!(s, Scalar::ZERO);
        assert!(bool::from(overflow));

        let one = FieldElement::ONE;
        let (s, overflow) = field_to_scalar(&one);
        assert_eq!(s, Scalar::ONE);
        assert!(!bool::from(overflow));

        assert_eq!(scalar_to_field(&Scalar::ONE), FieldElement::ONE);
    }
}
