//! Minimal aggregate-signature scheme used to exercise the harness.
//!
//! Sign raises every message element to the secret `x` and multiplies the
//! results; verify checks `e(sig, h) == e(prod M_i, h^x)`.

use crate::config::BenchRng;
use crate::message::{G1Messages, MessageBlock};
use crate::operation::{
    MeasuredOperation, OperationError, OperationInstance, Scheme,
    SignatureKeyPair,
};
use bilinear::{BilinearGroup, G1Element, G2Element, Group};
use std::cell::Cell;
use std::rc::Rc;
use std::thread;
use std::time::Duration;

/// How long a [`ProductScheme::slow_drop`] signature takes to drop.
pub const SLOW_DROP: Duration = Duration::from_millis(20);

#[derive(Debug, Default)]
struct Calls {
    constructs: Cell<usize>,
    key_pairs: Cell<usize>,
    signs: Cell<usize>,
    verifies: Cell<usize>,
    restores: Cell<usize>,
}

#[derive(Clone, Debug, Default)]
pub struct CallLog(Rc<Calls>);

impl CallLog {
    pub fn constructs(&self) -> usize {
        self.0.constructs.get()
    }

    pub fn key_pairs(&self) -> usize {
        self.0.key_pairs.get()
    }

    pub fn signs(&self) -> usize {
        self.0.signs.get()
    }

    pub fn verifies(&self) -> usize {
        self.0.verifies.get()
    }

    pub fn restores(&self) -> usize {
        self.0.restores.get()
    }
}

fn bump(counter: &Cell<usize>) {
    counter.set(counter.get() + 1);
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Behaviour {
    Honest,
    Tamper,
    FailSign,
    SlowDrop,
}

pub struct ProductScheme {
    log: CallLog,
    behaviour: Behaviour,
}

impl ProductScheme {
    pub fn new(log: &CallLog) -> Self {
        Self {
            log: log.clone(),
            behaviour: Behaviour::Honest,
        }
    }

    /// Verifies against a modified message, so every check fails.
    pub fn tampering(log: &CallLog) -> Self {
        Self {
            behaviour: Behaviour::Tamper,
            ..Self::new(log)
        }
    }

    pub fn failing_sign(log: &CallLog) -> Self {
        Self {
            behaviour: Behaviour::FailSign,
            ..Self::new(log)
        }
    }

    /// Signatures that sleep for [`SLOW_DROP`] when dropped.
    pub fn slow_drop(log: &CallLog) -> Self {
        Self {
            behaviour: Behaviour::SlowDrop,
            ..Self::new(log)
        }
    }
}

impl Scheme for ProductScheme {
    fn scheme_name(&self) -> &str {
        "Product"
    }
}

pub struct ProductInstance<G: BilinearGroup> {
    group: G,
    h: G2Element<G>,
    log: CallLog,
    behaviour: Behaviour,
}

pub struct ProductSignature<G: BilinearGroup> {
    value: G1Element<G>,
    slow_drop: bool,
}

impl<G: BilinearGroup> Drop for ProductSignature<G> {
    fn drop(&mut self) {
        if self.slow_drop {
            thread::sleep(SLOW_DROP);
        }
    }
}

pub struct ProductKeyPair<G: BilinearGroup> {
    x: G::Scalar,
    vk: G2Element<G>,
}

impl<G: BilinearGroup> SignatureKeyPair for ProductKeyPair<G> {
    type SigningKey = G::Scalar;
    type VerificationKey = G2Element<G>;

    fn signing_key(&self) -> &G::Scalar {
        &self.x
    }

    fn verification_key(&self) -> &G2Element<G> {
        &self.vk
    }
}

impl<G: BilinearGroup> MeasuredOperation<G> for ProductScheme {
    type Space = G1Messages<G>;
    type Instance = ProductInstance<G>;

    fn construct(
        &self,
        group: &G,
        _payload_size: usize,
        rng: &mut BenchRng,
    ) -> Result<ProductInstance<G>, OperationError> {
        bump(&self.log.0.constructs);
        let s = group.random_scalar(rng);
        let h = group.g2().pow(&group.g2().generator(), &s);
        Ok(ProductInstance {
            group: group.clone(),
            h,
            log: self.log.clone(),
            behaviour: self.behaviour,
        })
    }
}

impl<G: BilinearGroup> ProductInstance<G> {
    fn signature(&self, value: G1Element<G>) -> ProductSignature<G> {
        ProductSignature {
            value,
            slow_drop: self.behaviour == Behaviour::SlowDrop,
        }
    }

    fn aggregate(&self, message: &MessageBlock<G1Element<G>>) -> G1Element<G> {
        let g1 = self.group.g1();
        message
            .elements()
            .iter()
            .cloned()
            .reduce(|acc, m| g1.op(&acc, &m))
            .unwrap_or_else(|| g1.identity())
    }
}

impl<G: BilinearGroup> OperationInstance for ProductInstance<G> {
    type Message = MessageBlock<G1Element<G>>;
    type KeyPair = ProductKeyPair<G>;
    type Signature = ProductSignature<G>;

    fn generate_key_pair(
        &self,
        _payload_size: usize,
        rng: &mut BenchRng,
    ) -> Result<ProductKeyPair<G>, OperationError> {
        bump(&self.log.0.key_pairs);
        let x = self.group.random_scalar(rng);
        let vk = self.group.g2().pow(&self.h, &x);
        Ok(ProductKeyPair { x, vk })
    }

    fn sign(
        &self,
        x: &G::Scalar,
        message: &Self::Message,
        _rng: &mut BenchRng,
    ) -> Result<ProductSignature<G>, OperationError> {
        bump(&self.log.0.signs);
        if self.behaviour == Behaviour::FailSign {
            return Err(OperationError::Scheme("signing disabled".to_owned()));
        }
        let g1 = self.group.g1();
        let value = message
            .elements()
            .iter()
            .map(|m| g1.pow(m, x))
            .reduce(|acc, m| g1.op(&acc, &m))
            .unwrap_or_else(|| g1.identity());
        Ok(self.signature(value))
    }

    fn verify(
        &self,
        message: &Self::Message,
        signature: &ProductSignature<G>,
        vk: &G2Element<G>,
    ) -> Result<bool, OperationError> {
        bump(&self.log.0.verifies);
        let mut aggregate = self.aggregate(message);
        if self.behaviour == Behaviour::Tamper {
            aggregate =
                self.group.g1().op(&aggregate, &self.group.g1().generator());
        }
        Ok(self.group.pair(&signature.value, &self.h)
            == self.group.pair(&aggregate, vk))
    }

    fn serialize_key_pair(
        &self,
        key_pair: &ProductKeyPair<G>,
    ) -> Result<Vec<u8>, OperationError> {
        let scalar = self.group.encode_scalar(&key_pair.x)?;
        let mut bytes = Vec::with_capacity(1 + scalar.len());
        bytes.push(scalar.len() as u8);
        bytes.extend_from_slice(&scalar);
        bytes.extend_from_slice(&self.group.g2().encode(&key_pair.vk)?);
        Ok(bytes)
    }

    fn restore_key_pair(
        &self,
        bytes: &[u8],
    ) -> Result<ProductKeyPair<G>, OperationError> {
        bump(&self.log.0.restores);
        let (&len, rest) = bytes.split_first().ok_or_else(|| {
            OperationError::Representation("empty key pair".to_owned())
        })?;
        if rest.len() < len as usize {
            return Err(OperationError::Representation(
                "truncated key pair".to_owned(),
            ));
        }
        let (scalar, vk) = rest.split_at(len as usize);
        Ok(ProductKeyPair {
            x: self.group.decode_scalar(scalar)?,
            vk: self.group.g2().decode(vk)?,
        })
    }

    fn serialize_signature(
        &self,
        signature: &ProductSignature<G>,
    ) -> Result<Vec<u8>, OperationError> {
        Ok(self.group.g1().encode(&signature.value)?)
    }

    fn restore_signature(
        &self,
        bytes: &[u8],
    ) -> Result<ProductSignature<G>, OperationError> {
        bump(&self.log.0.restores);
        Ok(self.signature(self.group.g1().decode(bytes)?))
    }
}
