//! Deterministic nonce generation per RFC 6979.
//!
//! The generator is an HMAC-DRBG over SHA-256 keyed with the private key and
//! message hash, specialized to produce scalars in [1, n-1] for the
//! secp256k1 order. Identical inputs always produce identical nonces, which
//! removes the catastrophic failure mode of a repeated or biased random
//! nonce.

use crate::arithmetic::Scalar;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use zeroize::{Zeroize, Zeroizing};

type HmacSha256 = Hmac<Sha256>;

const PRIV_KEY_LEN: usize = 32;
const HASH_LEN: usize = 32;
const EXTRA_LEN: usize = 32;
const VERSION_LEN: usize = 16;

fn hmac_sha256(key: &[u8], chunks: &[&[u8]]) -> [u8; 32] {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC accepts any key length");
    for chunk in chunks {
        mac.update(chunk);
    }
    mac.finalize().into_bytes().into()
}

/// HMAC-DRBG state per RFC 6979 section 3.2.
struct HmacDrbg {
    k: [u8; 32],
    v: [u8; 32],
}

impl HmacDrbg {
    /// Steps b-g: seed the state from the entropy input.
    fn new(entropy: &[u8]) -> Self {
        let mut drbg = Self {
            k: [0x00; 32],
            v: [0x01; 32],
        };
        drbg.k = hmac_sha256(&drbg.k, &[&drbg.v, &[0x00], entropy]);
        drbg.v = hmac_sha256(&drbg.k, &[&drbg.v]);
        drbg.k = hmac_sha256(&drbg.k, &[&drbg.v, &[0x01], entropy]);
        drbg.v = hmac_sha256(&drbg.k, &[&drbg.v]);
        drbg
    }

    /// Step h: produce the next 32 bytes of output.
    fn generate(&mut self) -> [u8; 32] {
        self.v = hmac_sha256(&self.k, &[&self.v]);
        self.v
    }

    /// Re-keys the state between candidate draws.
    fn retry(&mut self) {
        self.k = hmac_sha256(&self.k, &[&self.v, &[0x00]]);
        self.v = hmac_sha256(&self.k, &[&self.v]);
    }
}

impl Drop for HmacDrbg {
    fn drop(&mut self) {
        self.k.zeroize();
        self.v.zeroize();
    }
}

/// Generates a deterministic nonce in [1, n-1] for use when signing `hash`
/// with `priv_key`.
///
/// `priv_key` and `hash` are interpreted big-endian: values shorter than 32
/// bytes are left-zero-padded, longer ones keep the low 32 bytes. `extra` is
/// mixed into the generator only when it is exactly 32 bytes and `version`
/// only when it is exactly 16 bytes; a version supplied without extra data
/// leaves a zero-filled extra block in its place so the two cases remain
/// domain-separated.
///
/// `extra_iterations` requests the (extra_iterations + 1)-th nonce the
/// generator produces. Signing code increments it to retry when a nonce
/// leads to r = 0 or s = 0. Candidates that are zero or overflow the group
/// order are redrawn and do not count as iterations.
pub fn nonce_rfc6979(
    priv_key: &[u8],
    hash: &[u8],
    extra: Option<&[u8]>,
    version: Option<&[u8]>,
    extra_iterations: u32,
) -> Scalar {
    let mut key_buf = Zeroizing::new([0u8; PRIV_KEY_LEN + HASH_LEN + EXTRA_LEN + VERSION_LEN]);
    let mut offset = 0;

    let priv_key = if priv_key.len() > PRIV_KEY_LEN {
        &priv_key[priv_key.len() - PRIV_KEY_LEN..]
    } else {
        priv_key
    };
    offset += PRIV_KEY_LEN - priv_key.len();
    key_buf[offset..offset + priv_key.len()].copy_from_slice(priv_key);
    offset += priv_key.len();

    let hash = if hash.len() > HASH_LEN {
        &hash[hash.len() - HASH_LEN..]
    } else {
        hash
    };
    offset += HASH_LEN - hash.len();
    key_buf[offset..offset + hash.len()].copy_from_slice(hash);
    offset += hash.len();

    let extra = extra.filter(|e| e.len() == EXTRA_LEN);
    let version = version.filter(|v| v.len() == VERSION_LEN);
    if let Some(extra) = extra {
        key_buf[offset..offset + EXTRA_LEN].copy_from_slice(extra);
        offset += EXTRA_LEN;
    }
    if let Some(version) = version {
        if extra.is_none() {
            offset += EXTRA_LEN;
        }
        key_buf[offset..offset + VERSION_LEN].copy_from_slice(version);
        offset += VERSION_LEN;
    }

    let mut drbg = HmacDrbg::new(&key_buf[..offset]);

    let mut generated = 0u32;
    loop {
        let candidate = Zeroizing::new(drbg.generate());
        let nonce = Scalar::from_bytes(&candidate);

        // Candidates at or above the order (or zero) are discarded without
        // consuming an iteration.
        if let Some(nonce) = Option::<Scalar>::from(nonce) {
            if !bool::from(nonce.is_zero()) {
                if generated == extra_iterations {
                    return nonce;
                }
                generated += 1;
            }
        }

        drbg.retry();
    }
}
