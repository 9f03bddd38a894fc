//! Prime-order elliptic curve groups used by the Naor-Pinkas OT.
//!
//! The NIST curves come from the RustCrypto `p192`, `p224` and `p256` crates. Points cross
//! the wire in SEC1 encoding: a single `0x00` byte for the identity, `0x04 || x || y` for
//! uncompressed points and `0x02`/`0x03 || x` for compressed points.

use std::{fmt::Debug, marker::PhantomData};

use elliptic_curve::{
    group::Group,
    sec1::{EncodedPoint, FromEncodedPoint, ModulusSize, ToEncodedPoint},
    CurveArithmetic, FieldBytesSize, NonZeroScalar,
};
use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};

pub use crate::secp160r1::Secp160r1;

/// Errors that can occur when decoding points.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum CurveError {
    #[error("empty point encoding")]
    Empty,
    #[error("unknown point format: prefix {0:#04x}")]
    UnknownFormat(u8),
    #[error("invalid encoding length for prefix {prefix:#04x}: expected {expected}, got {actual}")]
    InvalidLength {
        prefix: u8,
        expected: usize,
        actual: usize,
    },
    #[error("malformed SEC1 point encoding")]
    InvalidEncoding,
    #[error("coordinate is not a field element")]
    CoordinateOutOfRange,
    #[error("point is not on the curve")]
    NotOnCurve,
}

/// Supported curves.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CurveId {
    /// secp160r1
    Secp160r1,
    /// secp192r1, also known as NIST P-192.
    Secp192r1,
    /// secp224r1
    Secp224r1,
    /// secp256r1, also known as NIST P-256.
    #[default]
    Secp256r1,
}

impl CurveId {
    /// NIST P-192.
    pub const P192: CurveId = CurveId::Secp192r1;

    /// All supported curves.
    pub const ALL: [CurveId; 4] = [
        CurveId::Secp160r1,
        CurveId::Secp192r1,
        CurveId::Secp224r1,
        CurveId::Secp256r1,
    ];
}

/// A prime-order group of curve points.
pub trait EcGroup: Send + Sync + 'static {
    /// Scalars modulo the group order.
    type Scalar: Clone + Send + Sync;
    /// Group elements.
    type Point: Clone + Debug + PartialEq + Send + Sync;

    /// The curve of this group.
    const ID: CurveId;

    /// Samples a uniformly random non-zero scalar.
    fn random_scalar<R: RngCore + CryptoRng>(rng: &mut R) -> Self::Scalar;

    /// Returns `scalar * G`.
    fn mul_generator(scalar: &Self::Scalar) -> Self::Point;

    /// Returns `scalar * point`.
    fn mul(point: &Self::Point, scalar: &Self::Scalar) -> Self::Point;

    /// Returns `lhs - rhs`.
    fn sub(lhs: &Self::Point, rhs: &Self::Point) -> Self::Point;

    /// Encodes a point, optionally in compressed form.
    fn encode(point: &Self::Point, compress: bool) -> Vec<u8>;

    /// Decodes a point, validating that it lies on the curve.
    fn decode(bytes: &[u8]) -> Result<Self::Point, CurveError>;
}

/// A curve implemented by a RustCrypto crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sec1Curve<C>(PhantomData<C>);

/// NIST P-192.
pub type P192 = Sec1Curve<p192::NistP192>;
/// NIST P-224.
pub type P224 = Sec1Curve<p224::NistP224>;
/// NIST P-256.
pub type P256 = Sec1Curve<p256::NistP256>;

/// Associates a RustCrypto curve with its identifier.
pub trait NamedCurve {
    /// The curve identifier.
    const ID: CurveId;
}

impl NamedCurve for p192::NistP192 {
    const ID: CurveId = CurveId::Secp192r1;
}

impl NamedCurve for p224::NistP224 {
    const ID: CurveId = CurveId::Secp224r1;
}

impl NamedCurve for p256::NistP256 {
    const ID: CurveId = CurveId::Secp256r1;
}

impl<C> EcGroup for Sec1Curve<C>
where
    C: CurveArithmetic + NamedCurve + Send + Sync + 'static,
    C::AffinePoint: FromEncodedPoint<C> + ToEncodedPoint<C>,
    FieldBytesSize<C>: ModulusSize,
{
    type Scalar = C::Scalar;
    type Point = C::ProjectivePoint;

    const ID: CurveId = <C as NamedCurve>::ID;

    fn random_scalar<R: RngCore + CryptoRng>(rng: &mut R) -> Self::Scalar {
        *NonZeroScalar::<C>::random(rng)
    }

    fn mul_generator(scalar: &Self::Scalar) -> Self::Point {
        C::ProjectivePoint::generator() * *scalar
    }

    fn mul(point: &Self::Point, scalar: &Self::Scalar) -> Self::Point {
        *point * *scalar
    }

    fn sub(lhs: &Self::Point, rhs: &Self::Point) -> Self::Point {
        *lhs - *rhs
    }

    fn encode(point: &Self::Point, compress: bool) -> Vec<u8> {
        let affine: C::AffinePoint = (*point).into();
        affine.to_encoded_point(compress).as_bytes().to_vec()
    }

    fn decode(bytes: &[u8]) -> Result<Self::Point, CurveError> {
        let encoded =
            EncodedPoint::<C>::from_bytes(bytes).map_err(|_| CurveError::InvalidEncoding)?;

        Option::<C::AffinePoint>::from(C::AffinePoint::from_encoded_point(&encoded))
            .map(C::ProjectivePoint::from)
            .ok_or(CurveError::NotOnCurve)
    }
}
