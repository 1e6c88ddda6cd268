//! The seam between a signature scheme and the benchmark engines.
//!
//! A scheme plugs in by implementing [`MeasuredOperation`] for every group it
//! can be instantiated over. `construct` is the setup step and yields an
//! [`OperationInstance`] that carries the remaining lifecycle.

use crate::config::BenchRng;
use crate::message::{MessageBlock, MessageSpace};
use bilinear::{BilinearGroup, CodecError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OperationError {
    #[error("message has {actual} elements but the scheme was set up for {expected}")]
    MessageLength { expected: usize, actual: usize },
    #[error("sampled scalar has no inverse")]
    NonInvertible,
    #[error(transparent)]
    Codec(#[from] CodecError),
    #[error("malformed representation: {0}")]
    Representation(String),
    #[error("{0}")]
    Scheme(String),
}

pub trait Scheme {
    /// Human readable name, used in reports and export file names.
    fn scheme_name(&self) -> &str;

    /// Letters-only identifier for TeX macro names.
    fn tex_name(&self) -> String {
        self.scheme_name()
            .chars()
            .filter(char::is_ascii_alphabetic)
            .collect()
    }
}

pub trait SignatureKeyPair {
    type SigningKey;
    type VerificationKey;

    fn signing_key(&self) -> &Self::SigningKey;
    fn verification_key(&self) -> &Self::VerificationKey;
}

pub type SigningKeyOf<I> =
    <<I as OperationInstance>::KeyPair as SignatureKeyPair>::SigningKey;
pub type VerificationKeyOf<I> =
    <<I as OperationInstance>::KeyPair as SignatureKeyPair>::VerificationKey;

/// A set-up scheme: public parameters bound to one group.
pub trait OperationInstance {
    type Message;
    type KeyPair: SignatureKeyPair;
    type Signature;

    fn generate_key_pair(
        &self,
        payload_size: usize,
        rng: &mut BenchRng,
    ) -> Result<Self::KeyPair, OperationError>;

    fn sign(
        &self,
        signing_key: &SigningKeyOf<Self>,
        message: &Self::Message,
        rng: &mut BenchRng,
    ) -> Result<Self::Signature, OperationError>;

    /// `Ok(false)` is a rejected signature; `Err` is a malformed input.
    fn verify(
        &self,
        message: &Self::Message,
        signature: &Self::Signature,
        verification_key: &VerificationKeyOf<Self>,
    ) -> Result<bool, OperationError>;

    fn serialize_key_pair(
        &self,
        key_pair: &Self::KeyPair,
    ) -> Result<Vec<u8>, OperationError>;

    fn restore_key_pair(
        &self,
        bytes: &[u8],
    ) -> Result<Self::KeyPair, OperationError>;

    fn serialize_signature(
        &self,
        signature: &Self::Signature,
    ) -> Result<Vec<u8>, OperationError>;

    fn restore_signature(
        &self,
        bytes: &[u8],
    ) -> Result<Self::Signature, OperationError>;
}

pub type InstanceOf<G, O> = <O as MeasuredOperation<G>>::Instance;
pub type KeyPairOf<G, O> =
    <InstanceOf<G, O> as OperationInstance>::KeyPair;
pub type SignatureOf<G, O> =
    <InstanceOf<G, O> as OperationInstance>::Signature;
pub type MessageOf<G, O> = <InstanceOf<G, O> as OperationInstance>::Message;

pub trait MeasuredOperation<G: BilinearGroup>: Scheme {
    type Space: MessageSpace<G>;
    type Instance: OperationInstance<
        Message = MessageBlock<<Self::Space as MessageSpace<G>>::Element>,
    >;

    /// Runs the scheme's setup over `group` for messages of
    /// `payload_size` elements.
    fn construct(
        &self,
        group: &G,
        payload_size: usize,
        rng: &mut BenchRng,
    ) -> Result<Self::Instance, OperationError>;
}
