use crate::{BilinearGroup, CodecError, Group, Substructure};
use ark_ec::pairing::{Pairing, PairingOutput};
use ark_ff::{Field, UniformRand, Zero};
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use rand::RngCore;
use std::marker::PhantomData;

pub type Bls12_381Group = ArkPairingGroup<ark_bls12_381::Bls12_381>;
pub type Bn254Group = ArkPairingGroup<ark_bn254::Bn254>;

/// One arkworks group behind the [`Group`] trait.
#[derive(Clone, Copy, Debug)]
pub struct ArkGroup<C> {
    structure: Substructure,
    curve: PhantomData<C>,
}

impl<C> ArkGroup<C> {
    const fn new(structure: Substructure) -> Self {
        Self {
            structure,
            curve: PhantomData,
        }
    }
}

impl<C: ark_ec::Group> Group for ArkGroup<C> {
    type Element = C;
    type Scalar = C::ScalarField;

    fn generator(&self) -> C {
        C::generator()
    }

    fn identity(&self) -> C {
        C::zero()
    }

    fn op(&self, a: &C, b: &C) -> C {
        *a + *b
    }

    fn inv(&self, a: &C) -> C {
        -*a
    }

    fn pow(&self, a: &C, exponent: &C::ScalarField) -> C {
        *a * *exponent
    }

    fn random<R: RngCore + ?Sized>(&self, rng: &mut R) -> C {
        C::rand(rng)
    }

    fn encode(&self, a: &C) -> Result<Vec<u8>, CodecError> {
        let mut bytes = Vec::with_capacity(a.compressed_size());
        a.serialize_compressed(&mut bytes).map_err(|err| {
            CodecError::InvalidElement {
                structure: self.structure,
                reason: err.to_string(),
            }
        })?;
        Ok(bytes)
    }

    fn decode(&self, bytes: &[u8]) -> Result<C, CodecError> {
        C::deserialize_compressed(bytes).map_err(|err| {
            CodecError::InvalidElement {
                structure: self.structure,
                reason: err.to_string(),
            }
        })
    }
}

/// A pairing-friendly curve from arkworks, used as the timing substrate.
#[derive(Clone, Copy, Debug)]
pub struct ArkPairingGroup<E: Pairing> {
    label: &'static str,
    g1: ArkGroup<E::G1>,
    g2: ArkGroup<E::G2>,
    gt: ArkGroup<PairingOutput<E>>,
}

impl<E: Pairing> ArkPairingGroup<E> {
    pub const fn with_label(label: &'static str) -> Self {
        Self {
            label,
            g1: ArkGroup::new(Substructure::G1),
            g2: ArkGroup::new(Substructure::G2),
            gt: ArkGroup::new(Substructure::Gt),
        }
    }
}

impl ArkPairingGroup<ark_bls12_381::Bls12_381> {
    pub const fn bls12_381() -> Self {
        Self::with_label("BLS12-381")
    }
}

impl ArkPairingGroup<ark_bn254::Bn254> {
    pub const fn bn254() -> Self {
        Self::with_label("BN254")
    }
}

impl<E: Pairing> BilinearGroup for ArkPairingGroup<E> {
    type Scalar = E::ScalarField;
    type G1 = ArkGroup<E::G1>;
    type G2 = ArkGroup<E::G2>;
    type Gt = ArkGroup<PairingOutput<E>>;

    fn name(&self) -> String {
        format!("ArkPairingGroup({})", self.label)
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

    fn pair(&self, a: &E::G1, b: &E::G2) -> PairingOutput<E> {
        E::pairing(*a, *b)
    }

    fn random_scalar<R: RngCore + ?Sized>(
        &self,
        rng: &mut R,
    ) -> E::ScalarField {
        E::ScalarField::rand(rng)
    }

    fn scalar_inverse(
        &self,
        scalar: &E::ScalarField,
    ) -> Option<E::ScalarField> {
        scalar.inverse()
    }

    fn scalar_from_u64(&self, value: u64) -> E::ScalarField {
        E::ScalarField::from(value)
    }

    fn encode_scalar(
        &self,
        scalar: &E::ScalarField,
    ) -> Result<Vec<u8>, CodecError> {
        let mut bytes = Vec::with_capacity(scalar.compressed_size());
        scalar
            .serialize_compressed(&mut bytes)
            .map_err(|err| CodecError::InvalidScalar(err.to_string()))?;
        Ok(bytes)
    }

    fn decode_scalar(
        &self,
        bytes: &[u8],
    ) -> Result<E::ScalarField, CodecError> {
        E::ScalarField::deserialize_compressed(bytes)
            .map_err(|err| CodecError::InvalidScalar(err.to_string()))
    }
}
