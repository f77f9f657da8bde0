//! Error types for signature and public key parsing.

use core::fmt;

/// Errors returned by the signature and public key codecs.
///
/// The variant is the sole programmatic discriminator; descriptions are
/// human-readable, stable enough to log, and never derived from secret data.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// A DER signature is shorter than the 8-byte minimum.
    SigTooShort,
    /// A DER signature is longer than the 72-byte maximum.
    SigTooLong,
    /// A DER signature does not start with the ASN.1 sequence identifier.
    SigInvalidSeqId,
    /// The declared length of a DER signature does not cover the remaining
    /// bytes exactly.
    SigInvalidDataLen,
    /// A DER signature ends before the ASN.1 type identifier for S.
    SigMissingSTypeId,
    /// A DER signature ends before the length byte for S.
    SigMissingSLen,
    /// The declared length of S disagrees with the overall signature length.
    SigInvalidSLen,
    /// The ASN.1 type identifier for R is not an integer.
    SigInvalidRIntId,
    /// The declared length of R is zero.
    SigZeroRLen,
    /// R has its sign bit set and would parse as a negative integer.
    SigNegativeR,
    /// R has a superfluous leading zero byte.
    SigTooMuchRPadding,
    /// R is zero.
    SigRIsZero,
    /// R is greater than or equal to the group order.
    SigRTooBig,
    /// The ASN.1 type identifier for S is not an integer.
    SigInvalidSIntId,
    /// The declared length of S is zero.
    SigZeroSLen,
    /// S has its sign bit set and would parse as a negative integer.
    SigNegativeS,
    /// S has a superfluous leading zero byte.
    SigTooMuchSPadding,
    /// S is zero.
    SigSIsZero,
    /// S is greater than or equal to the group order.
    SigSTooBig,
    /// A compact signature is not exactly 65 bytes.
    SigInvalidLen,
    /// The recovery code byte of a compact signature is outside the valid
    /// range.
    SigInvalidRecoveryCode,
    /// The recovery code claims R overflowed the group order, but R plus the
    /// order does not fit in the field.
    SigOverflowsPrime,
    /// Public key recovery produced a point that is not on the curve (or the
    /// point at infinity).
    PointNotOnCurve,

    /// A public key is not one of the supported lengths (33 or 65 bytes).
    PubKeyInvalidLen,
    /// A public key has an unsupported format byte for its length.
    PubKeyInvalidFormat,
    /// The X coordinate of a public key is not a canonical field element.
    PubKeyXTooBig,
    /// The Y coordinate of a public key is not a canonical field element.
    PubKeyYTooBig,
    /// The coordinates of a public key do not satisfy the curve equation.
    PubKeyNotOnCurve,
    /// The format byte of a hybrid public key disagrees with the oddness of
    /// its Y coordinate.
    PubKeyMismatchedOddness,
}

impl Error {
    /// Human-readable description of the error.
    pub fn description(&self) -> &'static str {
        match self {
            Error::SigTooShort => "malformed signature: too short",
            Error::SigTooLong => "malformed signature: too long",
            Error::SigInvalidSeqId => "malformed signature: format has wrong type",
            Error::SigInvalidDataLen => "malformed signature: bad length",
            Error::SigMissingSTypeId => "malformed signature: S type indicator missing",
            Error::SigMissingSLen => "malformed signature: S length missing",
            Error::SigInvalidSLen => "malformed signature: invalid S length",
            Error::SigInvalidRIntId => "malformed signature: R is not an integer",
            Error::SigZeroRLen => "malformed signature: R length is zero",
            Error::SigNegativeR => "malformed signature: R is negative",
            Error::SigTooMuchRPadding => "malformed signature: R value has too much padding",
            Error::SigRIsZero => "invalid signature: R is 0",
            Error::SigRTooBig => "invalid signature: R >= group order",
            Error::SigInvalidSIntId => "malformed signature: S is not an integer",
            Error::SigZeroSLen => "malformed signature: S length is zero",
            Error::SigNegativeS => "malformed signature: S is negative",
            Error::SigTooMuchSPadding => "malformed signature: S value has too much padding",
            Error::SigSIsZero => "invalid signature: S is 0",
            Error::SigSTooBig => "invalid signature: S >= group order",
            Error::SigInvalidLen => "malformed signature: wrong size for a compact signature",
            Error::SigInvalidRecoveryCode => {
                "invalid signature: public key recovery code is out of range"
            }
            Error::SigOverflowsPrime => "invalid signature: signature R + N >= P",
            Error::PointNotOnCurve => "invalid signature: not for a valid curve point",
            Error::PubKeyInvalidLen => "malformed public key: invalid length",
            Error::PubKeyInvalidFormat => "malformed public key: invalid format byte",
            Error::PubKeyXTooBig => "invalid public key: x >= field prime",
            Error::PubKeyYTooBig => "invalid public key: y >= field prime",
            Error::PubKeyNotOnCurve => "invalid public key: not on the curve",
            Error::PubKeyMismatchedOddness => "invalid public key: oddness does not match format",
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

impl std::error::Error for Error {}
