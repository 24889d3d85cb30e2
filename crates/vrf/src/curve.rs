//! Short-Weierstrass arithmetic for the Bandersnatch curve
//! `y² = x³ + Ax + B` over the BLS12-381 scalar field, cofactor 4.
//!
//! Points serialize as 32 octets: the x coordinate little-endian with the
//! sign of y in the top bit. The identity serializes as all zeros; it is
//! never produced by honest signing and the subgroup check rejects the
//! non-subgroup point sharing x = 0.

use blake2b_simd::Params as Blake2bParams;
use ff::{Field, PrimeField};

use crate::fields::{from_canonical_le_bytes, from_le_bytes_reduced, to_le_bytes, Fq, Fr};
use crate::VrfError;

const CURVE_A_LE: [u8; 32] = [
    0x35, 0x79, 0x26, 0x33, 0x80, 0x0f, 0x72, 0xe0, 0x1d, 0x54, 0x20, 0x4f, 0xd2, 0x13, 0x29,
    0xe3, 0xe5, 0x26, 0xda, 0x26, 0x8e, 0x11, 0x4a, 0x8c, 0x8b, 0xfc, 0xf0, 0xe9, 0xcb, 0x5e,
    0xd1, 0x17,
];
const CURVE_B_LE: [u8; 32] = [
    0xbf, 0xbb, 0xe8, 0xd5, 0x28, 0x3d, 0xbb, 0x07, 0x69, 0x25, 0x8c, 0xab, 0xf0, 0x24, 0x2d,
    0xfa, 0x25, 0x46, 0x5d, 0x4d, 0x6b, 0x4e, 0x19, 0x11, 0xa8, 0x60, 0x2e, 0xd1, 0x20, 0xcb,
    0x5f, 0x41,
];
const GENERATOR_X_LE: [u8; 32] = [
    0xf7, 0xf2, 0x73, 0x0a, 0xea, 0x4a, 0xac, 0x47, 0xad, 0xae, 0x22, 0x70, 0x4d, 0xa0, 0x83,
    0x3f, 0xd6, 0x0a, 0x53, 0xef, 0x14, 0x20, 0x00, 0xbd, 0x5c, 0x7d, 0xe5, 0x2a, 0x12, 0xf9,
    0x50, 0x44,
];
const GENERATOR_Y_LE: [u8; 32] = [
    0xb2, 0xc1, 0x63, 0x77, 0xb5, 0x3e, 0x5a, 0x79, 0xbe, 0xe0, 0x63, 0x4a, 0x16, 0x4e, 0xf7,
    0x27, 0x26, 0x27, 0x2b, 0x2a, 0x41, 0x98, 0x25, 0x59, 0xb1, 0xe4, 0x2f, 0x06, 0xef, 0x80,
    0xff, 0x1b,
];
/// Order of the prime subgroup, little-endian (the `Fr` modulus).
pub const SUBGROUP_ORDER_LE: [u8; 32] = [
    0xe1, 0xe7, 0x76, 0x28, 0xb5, 0x06, 0xfd, 0x74, 0x71, 0x04, 0x19, 0x74, 0x00, 0x87, 0x8f,
    0xff, 0x00, 0x76, 0x68, 0x02, 0x02, 0x76, 0xce, 0x0c, 0x52, 0x5f, 0x67, 0xca, 0xd4, 0x69,
    0xfb, 0x1c,
];

fn curve_a() -> Fq {
    from_le_bytes_reduced(&CURVE_A_LE)
}

fn curve_b() -> Fq {
    from_le_bytes_reduced(&CURVE_B_LE)
}

/// Right-hand side of the curve equation at `x`.
fn curve_rhs(x: &Fq) -> Fq {
    (x.square() + curve_a()) * x + curve_b()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AffinePoint {
    pub x: Fq,
    pub y: Fq,
    pub infinity: bool,
}

impl AffinePoint {
    pub fn identity() -> Self {
        Self {
            x: Fq::ZERO,
            y: Fq::ZERO,
            infinity: true,
        }
    }

    pub fn generator() -> Self {
        Self {
            x: from_le_bytes_reduced(&GENERATOR_X_LE),
            y: from_le_bytes_reduced(&GENERATOR_Y_LE),
            infinity: false,
        }
    }

    pub fn is_on_curve(&self) -> bool {
        self.infinity || self.y.square() == curve_rhs(&self.x)
    }

    pub fn neg(&self) -> Self {
        Self {
            x: self.x,
            y: -self.y,
            infinity: self.infinity,
        }
    }

    /// Compressed 32-octet encoding: x little-endian, sign of y in the top
    /// bit. The identity encodes as all zeros.
    pub fn to_bytes(&self) -> [u8; 32] {
        if self.infinity {
            return [0u8; 32];
        }
        let mut out = to_le_bytes(&self.x);
        if bool::from(self.y.is_odd()) {
            out[31] |= 0x80;
        }
        out
    }

    /// Decompress a point. Non-canonical x encodings and x values off the
    /// curve are `NotOnCurve`.
    pub fn from_bytes(bytes: &[u8; 32]) -> Result<Self, VrfError> {
        let sign_odd = bytes[31] & 0x80 != 0;
        let mut repr = *bytes;
        repr[31] &= 0x7F;
        let x = from_canonical_le_bytes::<Fq>(&repr).ok_or(VrfError::NotOnCurve)?;
        let y = Option::<Fq>::from(curve_rhs(&x).sqrt()).ok_or(VrfError::NotOnCurve)?;
        let y = if bool::from(y.is_odd()) == sign_odd { y } else { -y };
        Ok(Self {
            x,
            y,
            infinity: false,
        })
    }
}

/// Jacobian coordinates; the identity is any point with z = 0.
#[derive(Clone, Copy, Debug)]
pub struct ProjectivePoint {
    x: Fq,
    y: Fq,
    z: Fq,
}

impl From<AffinePoint> for ProjectivePoint {
    fn from(p: AffinePoint) -> Self {
        if p.infinity {
            Self::identity()
        } else {
            Self {
                x: p.x,
                y: p.y,
                z: Fq::ONE,
            }
        }
    }
}

impl ProjectivePoint {
    pub fn identity() -> Self {
        Self {
            x: Fq::ONE,
            y: Fq::ONE,
            z: Fq::ZERO,
        }
    }

    pub fn generator() -> Self {
        AffinePoint::generator().into()
    }

    pub fn is_identity(&self) -> bool {
        self.z == Fq::ZERO
    }

    pub fn neg(&self) -> Self {
        Self {
            x: self.x,
            y: -self.y,
            z: self.z,
        }
    }

    pub fn to_affine(&self) -> AffinePoint {
        let zinv = match Option::<Fq>::from(self.z.invert()) {
            Some(zinv) => zinv,
            None => return AffinePoint::identity(),
        };
        let zinv2 = zinv.square();
        AffinePoint {
            x: self.x * zinv2,
            y: self.y * zinv2 * zinv,
            infinity: false,
        }
    }

    /// Point doubling (dbl-2007-bl, valid for arbitrary curve A).
    pub fn double(&self) -> Self {
        self.double_with(&curve_a())
    }

    fn double_with(&self, a: &Fq) -> Self {
        if self.is_identity() || self.y == Fq::ZERO {
            return Self::identity();
        }
        let xx = self.x.square();
        let yy = self.y.square();
        let yyyy = yy.square();
        let zz = self.z.square();
        let s = ((self.x + yy).square() - xx - yyyy).double();
        let m = xx.double() + xx + *a * zz.square();
        let x3 = m.square() - s.double();
        let y3 = m * (s - x3) - yyyy.double().double().double();
        let z3 = (self.y + self.z).square() - yy - zz;
        Self {
            x: x3,
            y: y3,
            z: z3,
        }
    }

    pub fn add(&self, other: &Self) -> Self {
        if self.is_identity() {
            return *other;
        }
        if other.is_identity() {
            return *self;
        }
        let z1z1 = self.z.square();
        let z2z2 = other.z.square();
        let u1 = self.x * z2z2;
        let u2 = other.x * z1z1;
        let s1 = self.y * z2z2 * other.z;
        let s2 = other.y * z1z1 * self.z;
        if u1 == u2 {
            if s1 == s2 {
                return self.double();
            }
            return Self::identity();
        }
        let h = u2 - u1;
        let hh = h.square();
        let hhh = hh * h;
        let r = s2 - s1;
        let v = u1 * hh;
        let x3 = r.square() - hhh - v.double();
        let y3 = r * (v - x3) - s1 * hhh;
        let z3 = h * self.z * other.z;
        Self {
            x: x3,
            y: y3,
            z: z3,
        }
    }

    pub fn sub(&self, other: &Self) -> Self {
        self.add(&other.neg())
    }

    /// Multiply by an integer given as 32 little-endian octets,
    /// most-significant-bit-first double-and-add.
    pub fn mul_bits(&self, scalar_le: &[u8; 32]) -> Self {
        let a = curve_a();
        let mut acc = Self::identity();
        for byte in scalar_le.iter().rev() {
            for bit in (0..8).rev() {
                acc = acc.double_with(&a);
                if byte >> bit & 1 == 1 {
                    acc = acc.add(self);
                }
            }
        }
        acc
    }

    pub fn mul(&self, scalar: &Fr) -> Self {
        self.mul_bits(&to_le_bytes(scalar))
    }
}

/// True iff the point lies in the prime-order subgroup.
pub fn is_in_subgroup(p: &AffinePoint) -> bool {
    ProjectivePoint::from(*p).mul_bits(&SUBGROUP_ORDER_LE).is_identity()
}

/// Deterministic try-and-increment hash-to-curve over
/// `H(context ++ message ++ counter)`, cofactor-cleared into the subgroup.
pub fn hash_to_curve(context: &[u8], message: &[u8]) -> AffinePoint {
    let mut counter: u32 = 0;
    loop {
        let mut params = Blake2bParams::new();
        params.hash_length(32);
        let mut state = params.to_state();
        state.update(context);
        state.update(message);
        state.update(&counter.to_le_bytes());
        let digest = state.finalize();
        let x: Fq = from_le_bytes_reduced(digest.as_bytes());
        if let Some(y) = Option::<Fq>::from(curve_rhs(&x).sqrt()) {
            // take the even root, then clear the cofactor
            let y = if bool::from(y.is_odd()) { -y } else { y };
            let candidate = ProjectivePoint::from(AffinePoint {
                x,
                y,
                infinity: false,
            });
            let cleared = candidate.double().double().to_affine();
            if !cleared.infinity {
                return cleared;
            }
        }
        counter += 1;
    }
}
