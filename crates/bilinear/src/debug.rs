//! Insecure bilinear group over `Z_p` for fast, hardware-independent runs.
//!
//! Every group is `(Z_p, +)` written multiplicatively, so `pow` is a modular
//! multiplication and the pairing is `e(a, b) = a * b mod p`. The structure
//! is bilinear and non-degenerate, which is all a counting run needs, but
//! discrete logarithms are trivial.

use crate::{BilinearGroup, CodecError, Group, Substructure};
use rand::RngCore;
use std::fmt;
use std::marker::PhantomData;

/// The Mersenne prime `2^61 - 1`.
pub const DEBUG_MODULUS: u64 = (1 << 61) - 1;

pub trait DebugSlot:
    Clone + Copy + fmt::Debug + Default + Eq + PartialEq
{
    const STRUCTURE: Substructure;
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct G1Slot;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct G2Slot;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct GtSlot;

impl DebugSlot for G1Slot {
    const STRUCTURE: Substructure = Substructure::G1;
}

impl DebugSlot for G2Slot {
    const STRUCTURE: Substructure = Substructure::G2;
}

impl DebugSlot for GtSlot {
    const STRUCTURE: Substructure = Substructure::Gt;
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct DebugElement<S> {
    value: u64,
    slot: PhantomData<S>,
}

impl<S> DebugElement<S> {
    fn new(value: u64) -> Self {
        Self {
            value: value % DEBUG_MODULUS,
            slot: PhantomData,
        }
    }

    pub fn value(&self) -> u64 {
        self.value
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct DebugGroup<S> {
    slot: PhantomData<S>,
}

impl<S: DebugSlot> Group for DebugGroup<S> {
    type Element = DebugElement<S>;
    type Scalar = u64;

    fn generator(&self) -> Self::Element {
        DebugElement::new(1)
    }

    fn identity(&self) -> Self::Element {
        DebugElement::new(0)
    }

    fn op(&self, a: &Self::Element, b: &Self::Element) -> Self::Element {
        DebugElement::new(add_mod(a.value, b.value))
    }

    fn inv(&self, a: &Self::Element) -> Self::Element {
        DebugElement::new(DEBUG_MODULUS - a.value)
    }

    fn pow(&self, a: &Self::Element, exponent: &u64) -> Self::Element {
        DebugElement::new(mul_mod(a.value, *exponent))
    }

    fn random<R: RngCore + ?Sized>(&self, rng: &mut R) -> Self::Element {
        DebugElement::new(sample_below_modulus(rng))
    }

    fn encode(&self, a: &Self::Element) -> Result<Vec<u8>, CodecError> {
        Ok(a.value.to_le_bytes().to_vec())
    }

    fn decode(&self, bytes: &[u8]) -> Result<Self::Element, CodecError> {
        let value = decode_residue(bytes).map_err(|reason| {
            CodecError::InvalidElement {
                structure: S::STRUCTURE,
                reason,
            }
        })?;
        Ok(DebugElement::new(value))
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct DebugBilinearGroup {
    g1: DebugGroup<G1Slot>,
    g2: DebugGroup<G2Slot>,
    gt: DebugGroup<GtSlot>,
}

impl DebugBilinearGroup {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BilinearGroup for DebugBilinearGroup {
    type Scalar = u64;
    type G1 = DebugGroup<G1Slot>;
    type G2 = DebugGroup<G2Slot>;
    type Gt = DebugGroup<GtSlot>;

    fn name(&self) -> String {
        "DebugBilinearGroup(Z_p, p = 2^61 - 1)".to_owned()
    }

    fn g1(&self) -> &Self::G1 {
        &self.g1
    }

    fn g2(&self) -> &Self::G2 {
        &self.g2
    }

    fn gt(&self) -> &Self::Gt {
        &self.gt
    }

    fn pair(
        &self,
        a: &DebugElement<G1Slot>,
        b: &DebugElement<G2Slot>,
    ) -> DebugElement<GtSlot> {
        DebugElement::new(mul_mod(a.value, b.value))
    }

    fn random_scalar<R: RngCore + ?Sized>(&self, rng: &mut R) -> u64 {
        sample_below_modulus(rng)
    }

    fn scalar_inverse(&self, scalar: &u64) -> Option<u64> {
        let scalar = scalar % DEBUG_MODULUS;
        if scalar == 0 {
            None
        } else {
            Some(pow_mod(scalar, DEBUG_MODULUS - 2))
        }
    }

    fn scalar_from_u64(&self, value: u64) -> u64 {
        value % DEBUG_MODULUS
    }

    fn encode_scalar(&self, scalar: &u64) -> Result<Vec<u8>, CodecError> {
        Ok(scalar.to_le_bytes().to_vec())
    }

    fn decode_scalar(&self, bytes: &[u8]) -> Result<u64, CodecError> {
        decode_residue(bytes).map_err(CodecError::InvalidScalar)
    }
}

fn add_mod(a: u64, b: u64) -> u64 {
    ((a as u128 + b as u128) % DEBUG_MODULUS as u128) as u64
}

fn mul_mod(a: u64, b: u64) -> u64 {
    ((a as u128 * b as u128) % DEBUG_MODULUS as u128) as u64
}

fn pow_mod(mut base: u64, mut exponent: u64) -> u64 {
    let mut acc = 1_u64;
    base %= DEBUG_MODULUS;
    while exponent > 0 {
        if exponent & 1 == 1 {
            acc = mul_mod(acc, base);
        }
        base = mul_mod(base, base);
        exponent >>= 1;
    }
    acc
}

// Rejection sampling on the top 61 bits keeps the distribution uniform.
fn sample_below_modulus<R: RngCore + ?Sized>(rng: &mut R) -> u64 {
    loop {
        let candidate = rng.next_u64() >> 3;
        if candidate < DEBUG_MODULUS {
            return candidate;
        }
    }
}

fn decode_residue(bytes: &[u8]) -> Result<u64, String> {
    let raw: [u8; 8] = bytes
        .try_into()
        .map_err(|_| format!("expected 8 bytes, got {}", bytes.len()))?;
    let value = u64::from_le_bytes(raw);
    if value >= DEBUG_MODULUS {
        return Err(format!("value {value} is not reduced modulo p"));
    }
    Ok(value)
}
