//! Algebraic substrates for the signature benchmarks.
//!
//! A [`BilinearGroup`] bundles three prime-order groups `G1`, `G2`, `GT`
//! with a pairing `e: G1 x G2 -> GT`. Schemes are written once against the
//! traits here and then instantiated with a real curve
//! ([`ArkPairingGroup`]), a fast insecure stand-in ([`DebugBilinearGroup`])
//! or an instrumented wrapper that tallies every primitive operation
//! ([`CountingBilinearGroup`]).

use rand::RngCore;
use std::fmt;
use thiserror::Error;

pub mod ark;
pub mod counting;
pub mod debug;

pub use ark::{ArkGroup, ArkPairingGroup, Bls12_381Group, Bn254Group};
pub use counting::{
    BucketCounts, CountingBilinearGroup, CountingGroup, OperationCountTable,
    OperationCounts,
};
pub use debug::{DebugBilinearGroup, DebugElement, DebugGroup, DEBUG_MODULUS};

pub type G1Element<B> = <<B as BilinearGroup>::G1 as Group>::Element;
pub type G2Element<B> = <<B as BilinearGroup>::G2 as Group>::Element;
pub type GtElement<B> = <<B as BilinearGroup>::Gt as Group>::Element;

/// Identifies one algebraic sub-structure of a bilinear group.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub enum Substructure {
    G1,
    G2,
    Gt,
    Pairing,
}

impl Substructure {
    pub const ALL: [Substructure; 4] =
        [Self::G1, Self::G2, Self::Gt, Self::Pairing];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::G1 => "G1",
            Self::G2 => "G2",
            Self::Gt => "GT",
            Self::Pairing => "e",
        }
    }
}

impl fmt::Display for Substructure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("invalid {structure} encoding: {reason}")]
    InvalidElement {
        structure: Substructure,
        reason: String,
    },
    #[error("invalid scalar encoding: {0}")]
    InvalidScalar(String),
}

/// A prime-order group written multiplicatively.
pub trait Group: Clone {
    type Element: Clone + fmt::Debug + PartialEq;
    type Scalar: Clone + fmt::Debug + PartialEq;

    fn generator(&self) -> Self::Element;
    fn identity(&self) -> Self::Element;
    fn op(&self, a: &Self::Element, b: &Self::Element) -> Self::Element;
    fn inv(&self, a: &Self::Element) -> Self::Element;
    fn pow(&self, a: &Self::Element, exponent: &Self::Scalar)
        -> Self::Element;
    fn random<R: RngCore + ?Sized>(&self, rng: &mut R) -> Self::Element;
    fn encode(&self, a: &Self::Element) -> Result<Vec<u8>, CodecError>;
    fn decode(&self, bytes: &[u8]) -> Result<Self::Element, CodecError>;
}

pub trait BilinearGroup: Clone {
    type Scalar: Clone + fmt::Debug + PartialEq;
    type G1: Group<Scalar = Self::Scalar>;
    type G2: Group<Scalar = Self::Scalar>;
    type Gt: Group<Scalar = Self::Scalar>;

    fn name(&self) -> String;
    fn g1(&self) -> &Self::G1;
    fn g2(&self) -> &Self::G2;
    fn gt(&self) -> &Self::Gt;
    fn pair(&self, a: &G1Element<Self>, b: &G2Element<Self>)
        -> GtElement<Self>;

    fn random_scalar<R: RngCore + ?Sized>(&self, rng: &mut R)
        -> Self::Scalar;
    fn scalar_inverse(&self, scalar: &Self::Scalar) -> Option<Self::Scalar>;
    fn scalar_from_u64(&self, value: u64) -> Self::Scalar;
    fn encode_scalar(&self, scalar: &Self::Scalar)
        -> Result<Vec<u8>, CodecError>;
    fn decode_scalar(&self, bytes: &[u8]) -> Result<Self::Scalar, CodecError>;

    /// Samples a scalar together with its inverse, retrying on zero.
    fn random_unit_scalar<R: RngCore + ?Sized>(
        &self,
        rng: &mut R,
    ) -> (Self::Scalar, Self::Scalar) {
        loop {
            let scalar = self.random_scalar(rng);
            if let Some(inverse) = self.scalar_inverse(&scalar) {
                return (scalar, inverse);
            }
        }
    }
}
