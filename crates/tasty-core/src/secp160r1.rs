//! secp160r1 over arbitrary precision integers.
//!
//! No maintained crate provides this curve, so the group law is implemented directly in
//! Jacobian coordinates. `a = -3` and `p = 3 mod 4`, which keeps doubling and square roots
//! simple.

use num_bigint::{BigUint, RandBigInt};
use num_traits::{One, Zero};
use once_cell::sync::Lazy;
use rand::{CryptoRng, RngCore};

use crate::{
    bits::to_fixed_bytes,
    curve::{CurveError, CurveId, EcGroup},
};

/// Length of an encoded coordinate in bytes.
const COORDINATE_LEN: usize = 20;

struct Params {
    p: BigUint,
    b: BigUint,
    n: BigUint,
    g: (BigUint, BigUint),
    /// (p + 1) / 4
    sqrt_exp: BigUint,
}

static PARAMS: Lazy<Params> = Lazy::new(|| {
    let hex = |s: &str| BigUint::parse_bytes(s.as_bytes(), 16).unwrap_or_default();
    let p = hex("FFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFF7FFFFFFF");
    Params {
        b: hex("1C97BEFC54BD7A8B65ACF89F81D4D4ADC565FA45"),
        n: hex("0100000000000000000001F4C8F927AED3CA752257"),
        g: (
            hex("4A96B5688EF573284664698968C38BB913CBFC82"),
            hex("23A628553168947D59DCC912042351377AC5FB32"),
        ),
        sqrt_exp: (&p + 1u32) >> 2,
        p,
    }
});

/// The secp160r1 curve.
#[derive(Debug, Clone, Copy, Default)]
pub struct Secp160r1;

/// A secp160r1 point in affine form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Secp160r1Point {
    /// The point at infinity.
    Identity,
    /// A finite point.
    Affine {
        /// x coordinate
        x: BigUint,
        /// y coordinate
        y: BigUint,
    },
}

/// A point in Jacobian coordinates, `Z = 0` being the identity.
#[derive(Clone)]
struct Jacobian {
    x: BigUint,
    y: BigUint,
    z: BigUint,
}

fn add_mod(a: &BigUint, b: &BigUint) -> BigUint {
    (a + b) % &PARAMS.p
}

fn sub_mod(a: &BigUint, b: &BigUint) -> BigUint {
    let p = &PARAMS.p;
    (a + p - (b % p)) % p
}

fn mul_mod(a: &BigUint, b: &BigUint) -> BigUint {
    (a * b) % &PARAMS.p
}

fn inv_mod(a: &BigUint) -> BigUint {
    let p = &PARAMS.p;
    a.modpow(&(p - 2u32), p)
}

/// Returns `x^3 - 3x + b`.
fn curve_rhs(x: &BigUint) -> BigUint {
    let x3 = mul_mod(&mul_mod(x, x), x);
    let three_x = mul_mod(x, &BigUint::from(3u32));
    add_mod(&sub_mod(&x3, &three_x), &PARAMS.b)
}

impl Jacobian {
    fn identity() -> Self {
        Self {
            x: BigUint::one(),
            y: BigUint::one(),
            z: BigUint::zero(),
        }
    }

    fn is_identity(&self) -> bool {
        self.z.is_zero()
    }

    fn double(&self) -> Self {
        if self.is_identity() || self.y.is_zero() {
            return Self::identity();
        }

        let delta = mul_mod(&self.z, &self.z);
        let gamma = mul_mod(&self.y, &self.y);
        let beta = mul_mod(&self.x, &gamma);
        let alpha = mul_mod(
            &BigUint::from(3u32),
            &mul_mod(&sub_mod(&self.x, &delta), &add_mod(&self.x, &delta)),
        );

        let eight_beta = mul_mod(&beta, &BigUint::from(8u32));
        let x = sub_mod(&mul_mod(&alpha, &alpha), &eight_beta);

        let yz = add_mod(&self.y, &self.z);
        let z = sub_mod(&sub_mod(&mul_mod(&yz, &yz), &gamma), &delta);

        let four_beta = mul_mod(&beta, &BigUint::from(4u32));
        let eight_gamma_sq = mul_mod(&mul_mod(&gamma, &gamma), &BigUint::from(8u32));
        let y = sub_mod(&mul_mod(&alpha, &sub_mod(&four_beta, &x)), &eight_gamma_sq);

        Self { x, y, z }
    }

    fn add(&self, other: &Self) -> Self {
        if self.is_identity() {
            return other.clone();
        }
        if other.is_identity() {
            return self.clone();
        }

        let z1z1 = mul_mod(&self.z, &self.z);
        let z2z2 = mul_mod(&other.z, &other.z);
        let u1 = mul_mod(&self.x, &z2z2);
        let u2 = mul_mod(&other.x, &z1z1);
        let s1 = mul_mod(&self.y, &mul_mod(&other.z, &z2z2));
        let s2 = mul_mod(&other.y, &mul_mod(&self.z, &z1z1));

        if u1 == u2 {
            return if s1 == s2 {
                self.double()
            } else {
                Self::identity()
            };
        }

        let h = sub_mod(&u2, &u1);
        let r = sub_mod(&s2, &s1);
        let hh = mul_mod(&h, &h);
        let hhh = mul_mod(&hh, &h);
        let u1hh = mul_mod(&u1, &hh);

        let x = sub_mod(
            &sub_mod(&mul_mod(&r, &r), &hhh),
            &add_mod(&u1hh, &u1hh),
        );
        let y = sub_mod(&mul_mod(&r, &sub_mod(&u1hh, &x)), &mul_mod(&s1, &hhh));
        let z = mul_mod(&h, &mul_mod(&self.z, &other.z));

        Self { x, y, z }
    }

    fn mul(&self, scalar: &BigUint) -> Self {
        let mut acc = Self::identity();
        for i in (0..scalar.bits()).rev() {
            acc = acc.double();
            if scalar.bit(i) {
                acc = acc.add(self);
            }
        }
        acc
    }

    fn to_affine(&self) -> Secp160r1Point {
        if self.is_identity() {
            return Secp160r1Point::Identity;
        }

        let z_inv = inv_mod(&self.z);
        let z_inv2 = mul_mod(&z_inv, &z_inv);
        Secp160r1Point::Affine {
            x: mul_mod(&self.x, &z_inv2),
            y: mul_mod(&self.y, &mul_mod(&z_inv2, &z_inv)),
        }
    }
}

impl From<&Secp160r1Point> for Jacobian {
    fn from(point: &Secp160r1Point) -> Self {
        match point {
            Secp160r1Point::Identity => Jacobian::identity(),
            Secp160r1Point::Affine { x, y } => Jacobian {
                x: x.clone(),
                y: y.clone(),
                z: BigUint::one(),
            },
        }
    }
}

fn coordinate(bytes: &[u8]) -> Result<BigUint, CurveError> {
    let value = BigUint::from_bytes_be(bytes);
    if value >= PARAMS.p {
        return Err(CurveError::CoordinateOutOfRange);
    }
    Ok(value)
}

fn check_len(prefix: u8, expected: usize, actual: usize) -> Result<(), CurveError> {
    if expected != actual {
        return Err(CurveError::InvalidLength {
            prefix,
            expected,
            actual,
        });
    }
    Ok(())
}

impl EcGroup for Secp160r1 {
    type Scalar = BigUint;
    type Point = Secp160r1Point;

    const ID: CurveId = CurveId::Secp160r1;

    fn random_scalar<R: RngCore + CryptoRng>(rng: &mut R) -> Self::Scalar {
        rng.gen_biguint_range(&BigUint::one(), &PARAMS.n)
    }

    fn mul_generator(scalar: &Self::Scalar) -> Self::Point {
        let (x, y) = &PARAMS.g;
        let g = Jacobian {
            x: x.clone(),
            y: y.clone(),
            z: BigUint::one(),
        };
        g.mul(scalar).to_affine()
    }

    fn mul(point: &Self::Point, scalar: &Self::Scalar) -> Self::Point {
        Jacobian::from(point).mul(scalar).to_affine()
    }

    fn sub(lhs: &Self::Point, rhs: &Self::Point) -> Self::Point {
        let neg = match rhs {
            Secp160r1Point::Identity => Jacobian::identity(),
            Secp160r1Point::Affine { x, y } => Jacobian {
                x: x.clone(),
                y: sub_mod(&BigUint::zero(), y),
                z: BigUint::one(),
            },
        };
        Jacobian::from(lhs).add(&neg).to_affine()
    }

    fn encode(point: &Self::Point, compress: bool) -> Vec<u8> {
        let Secp160r1Point::Affine { x, y } = point else {
            return vec![0x00];
        };

        // Coordinates are reduced modulo p, so they always fit.
        let x = to_fixed_bytes(x, COORDINATE_LEN).unwrap_or_default();
        if compress {
            let prefix = if y.bit(0) { 0x03 } else { 0x02 };
            [vec![prefix], x].concat()
        } else {
            let y = to_fixed_bytes(y, COORDINATE_LEN).unwrap_or_default();
            [vec![0x04], x, y].concat()
        }
    }

    fn decode(bytes: &[u8]) -> Result<Self::Point, CurveError> {
        let (&prefix, body) = bytes.split_first().ok_or(CurveError::Empty)?;

        match prefix {
            0x00 => {
                check_len(prefix, 1, bytes.len())?;
                Ok(Secp160r1Point::Identity)
            }
            0x02 | 0x03 => {
                check_len(prefix, 1 + COORDINATE_LEN, bytes.len())?;
                let x = coordinate(body)?;
                let rhs = curve_rhs(&x);
                let root = rhs.modpow(&PARAMS.sqrt_exp, &PARAMS.p);
                if mul_mod(&root, &root) != rhs {
                    return Err(CurveError::NotOnCurve);
                }

                let y = if root.bit(0) == (prefix == 0x03) {
                    root
                } else {
                    sub_mod(&BigUint::zero(), &root)
                };
                Ok(Secp160r1Point::Affine { x, y })
            }
            0x04 => {
                check_len(prefix, 1 + 2 * COORDINATE_LEN, bytes.len())?;
                let x = coordinate(&body[..COORDINATE_LEN])?;
                let y = coordinate(&body[COORDINATE_LEN..])?;
                if mul_mod(&y, &y) != curve_rhs(&x) {
                    return Err(CurveError::NotOnCurve);
                }
                Ok(Secp160r1Point::Affine { x, y })
            }
            _ => Err(CurveError::UnknownFormat(prefix)),
        }
    }
}
