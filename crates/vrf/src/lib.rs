//! Bandersnatch VRF: deterministic signing and verification over the
//! short-Weierstrass Bandersnatch curve.
//!
//! The proof transcript is `H(pub ++ H_point ++ output ++ R ++ R_h)`; that
//! ordering is load-bearing for interoperability and must not change.

pub mod curve;
pub mod fields;

use blake2b_simd::Params as Blake2bParams;
use ff::Field;
use rand_core::RngCore;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use primitives::{blake2b_256, Hash};

use crate::curve::{hash_to_curve, is_in_subgroup, AffinePoint, ProjectivePoint};
use crate::fields::{from_canonical_le_bytes, from_le_bytes_reduced, to_le_bytes, Fr};

#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum VrfError {
    #[error("point decompression failed or point is off the curve")]
    NotOnCurve,
    #[error("scalar is malformed or exceeds the subgroup order")]
    InvalidScalar,
    #[error("proof challenge mismatch")]
    InvalidProof,
}

/// A VRF secret scalar.
#[derive(Clone)]
pub struct SecretKey(Fr);

impl SecretKey {
    /// Derive a secret key from 32 uniform octets, reduced mod the
    /// subgroup order.
    pub fn from_bytes(seed: &[u8; 32]) -> Self {
        SecretKey(from_le_bytes_reduced(seed))
    }

    pub fn random(rng: impl RngCore) -> Self {
        SecretKey(Fr::random(rng))
    }

    pub fn public(&self) -> PublicKey {
        let point = ProjectivePoint::generator().mul(&self.0).to_affine();
        PublicKey {
            bytes: point.to_bytes(),
            point,
        }
    }
}

impl core::fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "SecretKey(..)")
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
pub struct PublicKey {
    point: AffinePoint,
    bytes: [u8; 32],
}

impl PublicKey {
    pub fn from_bytes(bytes: &[u8; 32]) -> Result<Self, VrfError> {
        let point = AffinePoint::from_bytes(bytes)?;
        if !is_in_subgroup(&point) {
            return Err(VrfError::NotOnCurve);
        }
        Ok(Self {
            point,
            bytes: *bytes,
        })
    }

    pub fn to_bytes(&self) -> [u8; 32] {
        self.bytes
    }
}

impl core::fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "PublicKey({}..)", hex::encode(&self.bytes[..4]))
    }
}

/// Schnorr-style proof accompanying a VRF output.
#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Debug)]
pub struct VrfProof {
    pub c: [u8; 32],
    pub s: [u8; 32],
}

/// A VRF evaluation: the output point plus its proof, all compressed.
#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Debug)]
pub struct VrfOutput {
    pub output: [u8; 32],
    pub proof: VrfProof,
}

impl VrfOutput {
    /// Wire form: `output ++ c ++ s`.
    pub fn to_bytes(&self) -> [u8; 96] {
        let mut out = [0u8; 96];
        out[..32].copy_from_slice(&self.output);
        out[32..64].copy_from_slice(&self.proof.c);
        out[64..].copy_from_slice(&self.proof.s);
        out
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, VrfError> {
        if bytes.len() != 96 {
            return Err(VrfError::InvalidScalar);
        }
        let mut output = [0u8; 32];
        let mut c = [0u8; 32];
        let mut s = [0u8; 32];
        output.copy_from_slice(&bytes[..32]);
        c.copy_from_slice(&bytes[32..64]);
        s.copy_from_slice(&bytes[64..]);
        Ok(Self {
            output,
            proof: VrfProof { c, s },
        })
    }
}

/// Blake2b-256 over transcript parts, reduced into the scalar field.
fn challenge(parts: &[&[u8; 32]]) -> Fr {
    let mut params = Blake2bParams::new();
    params.hash_length(32);
    let mut state = params.to_state();
    for part in parts {
        state.update(&part[..]);
    }
    from_le_bytes_reduced(state.finalize().as_bytes())
}

/// Deterministic VRF evaluation. Identical inputs produce byte-identical
/// results.
pub fn sign(secret: &SecretKey, context: &[u8], message: &[u8]) -> VrfOutput {
    let priv_bytes = to_le_bytes(&secret.0);

    // RFC-6979-style deterministic nonce
    let mut params = Blake2bParams::new();
    params.hash_length(32);
    let mut state = params.to_state();
    state.update(&priv_bytes);
    state.update(context);
    state.update(message);
    let k: Fr = from_le_bytes_reduced(state.finalize().as_bytes());

    let h_affine = hash_to_curve(context, message);
    let h_bytes = h_affine.to_bytes();
    let h_point = ProjectivePoint::from(h_affine);
    let public = secret.public();
    let output = h_point.mul(&secret.0).to_affine().to_bytes();
    let r = ProjectivePoint::generator().mul(&k).to_affine().to_bytes();
    let r_h = h_point.mul(&k).to_affine().to_bytes();

    let c = challenge(&[&public.bytes, &h_bytes, &output, &r, &r_h]);
    let s = k + c * secret.0;

    VrfOutput {
        output,
        proof: VrfProof {
            c: to_le_bytes(&c),
            s: to_le_bytes(&s),
        },
    }
}

/// Verify a VRF evaluation against its public key and transcript.
pub fn verify(
    public: &PublicKey,
    context: &[u8],
    message: &[u8],
    vrf: &VrfOutput,
) -> Result<(), VrfError> {
    let output = AffinePoint::from_bytes(&vrf.output)?;
    if !is_in_subgroup(&output) {
        return Err(VrfError::NotOnCurve);
    }
    let c = from_canonical_le_bytes::<Fr>(&vrf.proof.c).ok_or(VrfError::InvalidScalar)?;
    let s = from_canonical_le_bytes::<Fr>(&vrf.proof.s).ok_or(VrfError::InvalidScalar)?;

    let h_affine = hash_to_curve(context, message);
    let h_bytes = h_affine.to_bytes();
    let h_point = ProjectivePoint::from(h_affine);
    let pub_point = ProjectivePoint::from(public.point);
    let out_point = ProjectivePoint::from(output);

    let r = ProjectivePoint::generator()
        .mul(&s)
        .sub(&pub_point.mul(&c))
        .to_affine()
        .to_bytes();
    let r_h = h_point
        .mul(&s)
        .sub(&out_point.mul(&c))
        .to_affine()
        .to_bytes();

    let expected = challenge(&[&public.bytes, &h_bytes, &vrf.output, &r, &r_h]);
    if expected != c {
        return Err(VrfError::InvalidProof);
    }
    Ok(())
}

/// Boolean form of [`verify`].
pub fn is_valid(public: &PublicKey, context: &[u8], message: &[u8], vrf: &VrfOutput) -> bool {
    verify(public, context, message, vrf).is_ok()
}

/// The ticket id: Blake2b-256 of the compressed output point.
pub fn output_hash(vrf: &VrfOutput) -> Hash {
    blake2b_256(&vrf.output)
}

pub struct BatchEntry<'a> {
    pub public: &'a PublicKey,
    pub context: &'a [u8],
    pub message: &'a [u8],
    pub vrf: &'a VrfOutput,
}

/// Verify a batch in parallel. Each entry is an independent pure check, so
/// the outcome does not depend on thread interleaving.
pub fn verify_batch(entries: &[BatchEntry<'_>]) -> bool {
    entries
        .par_iter()
        .all(|e| is_valid(e.public, e.context, e.message, e.vrf))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_key() -> SecretKey {
        let mut seed = [0u8; 32];
        for (i, b) in seed.iter_mut().enumerate() {
            *b = i as u8;
        }
        SecretKey::from_bytes(&seed)
    }

    const CTX: &[u8] = b"test-context";
    const MSG: &[u8] = b"Hello, Bandersnatch VRF!";

    #[test]
    fn sign_verify_roundtrip() {
        let sk = test_key();
        let pk = sk.public();
        let vrf = sign(&sk, CTX, MSG);
        assert_eq!(vrf.output.len(), 32);
        assert_eq!(vrf.proof.c.len(), 32);
        assert_eq!(vrf.proof.s.len(), 32);
        assert!(is_valid(&pk, CTX, MSG, &vrf));
    }

    #[test]
    fn signing_is_deterministic() {
        let sk = test_key();
        let a = sign(&sk, CTX, MSG);
        let b = sign(&sk, CTX, MSG);
        assert_eq!(a.output, b.output);
        assert_eq!(a.proof.c, b.proof.c);
        assert_eq!(a.proof.s, b.proof.s);
    }

    #[test]
    fn tampering_fails_verification() {
        let sk = test_key();
        let pk = sk.public();
        let vrf = sign(&sk, CTX, MSG);

        for i in [0usize, 15, 31] {
            let mut bad = vrf;
            bad.output[i] ^= 1;
            assert!(!is_valid(&pk, CTX, MSG, &bad), "output octet {i}");
            let mut bad = vrf;
            bad.proof.c[i] ^= 1;
            assert!(!is_valid(&pk, CTX, MSG, &bad), "c octet {i}");
            let mut bad = vrf;
            bad.proof.s[i] ^= 1;
            assert!(!is_valid(&pk, CTX, MSG, &bad), "s octet {i}");
        }
        assert!(!is_valid(&pk, CTX, b"Hello, Bandersnatch VRf!", &vrf));
        assert!(!is_valid(&pk, b"test-contexU", MSG, &vrf));

        let other = SecretKey::from_bytes(&[9u8; 32]).public();
        assert!(!is_valid(&other, CTX, MSG, &vrf));
    }

    #[test]
    fn verify_reports_typed_errors() {
        let sk = test_key();
        let pk = sk.public();
        let mut vrf = sign(&sk, CTX, MSG);

        // a scalar at the subgroup order is non-canonical
        vrf.proof.s = curve::SUBGROUP_ORDER_LE;
        assert_eq!(verify(&pk, CTX, MSG, &vrf), Err(VrfError::InvalidScalar));

        let vrf = sign(&sk, CTX, MSG);
        let mut bad = vrf;
        bad.proof.c[0] ^= 1;
        assert_eq!(verify(&pk, CTX, MSG, &bad), Err(VrfError::InvalidProof));
    }

    #[test]
    fn distinct_messages_have_distinct_outputs() {
        let sk = test_key();
        let a = sign(&sk, CTX, b"one");
        let b = sign(&sk, CTX, b"two");
        assert_ne!(a.output, b.output);
        assert_ne!(output_hash(&a), output_hash(&b));
    }

    #[test]
    fn public_key_roundtrip() {
        let pk = test_key().public();
        let restored = PublicKey::from_bytes(&pk.to_bytes()).unwrap();
        assert_eq!(restored, pk);
    }

    #[test]
    fn vrf_output_json_roundtrip() {
        let vrf = sign(&test_key(), CTX, MSG);
        let json = serde_json::to_string(&vrf).unwrap();
        assert_eq!(serde_json::from_str::<VrfOutput>(&json).unwrap(), vrf);
    }

    #[test]
    fn wire_form_roundtrip() {
        let vrf = sign(&test_key(), CTX, MSG);
        let bytes = vrf.to_bytes();
        assert_eq!(VrfOutput::from_bytes(&bytes).unwrap(), vrf);
        assert!(VrfOutput::from_bytes(&bytes[..95]).is_err());
    }

    #[test]
    fn batch_agrees_with_serial() {
        let keys: Vec<SecretKey> = (0u8..4)
            .map(|i| SecretKey::from_bytes(&[i + 1; 32]))
            .collect();
        let publics: Vec<PublicKey> = keys.iter().map(|k| k.public()).collect();
        let messages: Vec<Vec<u8>> = (0..4).map(|i| format!("msg-{i}").into_bytes()).collect();
        let vrfs: Vec<VrfOutput> = keys
            .iter()
            .zip(&messages)
            .map(|(k, m)| sign(k, CTX, m))
            .collect();

        let entries: Vec<BatchEntry> = publics
            .iter()
            .zip(&messages)
            .zip(&vrfs)
            .map(|((public, message), vrf)| BatchEntry {
                public,
                context: CTX,
                message,
                vrf,
            })
            .collect();
        assert!(verify_batch(&entries));

        let mut bad = vrfs[2];
        bad.output[7] ^= 0xFF;
        let mut entries = entries;
        entries[2] = BatchEntry {
            public: &publics[2],
            context: CTX,
            message: &messages[2],
            vrf: &bad,
        };
        assert!(!verify_batch(&entries));
    }
}
