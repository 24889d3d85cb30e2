//! The two prime fields underlying the Bandersnatch short-Weierstrass
//! curve: the base field (the BLS12-381 scalar field) and the scalar field
//! of the prime-order subgroup.

use ff::PrimeField;

/// Base field; curve coordinates live here.
mod fq_field {
    use ff::PrimeField;

    #[derive(PrimeField)]
    #[PrimeFieldModulus = "52435875175126190479447740508185965837690552500527637822603658699938581184513"]
    #[PrimeFieldGenerator = "7"]
    #[PrimeFieldReprEndianness = "little"]
    pub struct Fq([u64; 4]);
}
pub use fq_field::Fq;

/// Scalar field; the modulus is the order of the prime subgroup.
mod fr_field {
    use ff::PrimeField;

    #[derive(PrimeField)]
    #[PrimeFieldModulus = "13108968793781547619861935127046491459309155893440570251786403306729687672801"]
    #[PrimeFieldGenerator = "7"]
    #[PrimeFieldReprEndianness = "little"]
    pub struct Fr([u64; 4]);
}
pub use fr_field::Fr;

/// Interpret little-endian octets as an integer and reduce into the field.
/// Processes from the most significant octet down, so inputs of any length
/// reduce correctly.
pub fn from_le_bytes_reduced<F: PrimeField>(bytes: &[u8]) -> F {
    let radix = F::from(256);
    let mut acc = F::ZERO;
    for &b in bytes.iter().rev() {
        acc = acc * radix + F::from(b as u64);
    }
    acc
}

/// Canonical 32-octet little-endian form of a field element.
pub fn to_le_bytes<F: PrimeField>(f: &F) -> [u8; 32] {
    let repr = f.to_repr();
    let mut out = [0u8; 32];
    out.copy_from_slice(repr.as_ref());
    out
}

/// Parse exactly 32 canonical little-endian octets; `None` when the value
/// is not below the modulus.
pub fn from_canonical_le_bytes<F: PrimeField>(bytes: &[u8; 32]) -> Option<F> {
    let mut repr = F::Repr::default();
    repr.as_mut().copy_from_slice(bytes);
    F::from_repr(repr).into()
}
