//! Groth's structure-preserving signature scheme (Groth 2015) as a
//! measured operation for the SPS benchmark harness.
//!
//! With messages in the source group `M` and keys in the other source
//! group `K` (generators `g` and `h`):
//!
//! * setup: `Y = g^y` for random `y`
//! * keygen: `V = h^v`
//! * sign: `R = h^r`, `S = (Y * g^v)^(1/r)`, `T_i = (Y^v * M_i)^(1/r)`
//! * verify: `e(S, R) = e(Y, h) * e(g, V)` and
//!   `e(T_i, R) = e(Y, V) * e(M_i, h)` for every `i`

use bilinear::{BilinearGroup, Group};
use sps_bench::{
    BenchRng, MeasuredOperation, MessageBlock, OperationError,
    OperationInstance, Scheme, SignatureKeyPair,
};
use std::fmt;
use std::marker::PhantomData;

pub mod layout;
pub mod repr;

pub use layout::{
    KeyElement, Layout, MessageElement, MessagesInG1, MessagesInG2,
    Placement,
};

pub type Groth15G1 = Groth15<MessagesInG1>;
pub type Groth15G2 = Groth15<MessagesInG2>;

/// The scheme factory; `construct` is its setup algorithm.
#[derive(Clone, Copy, Debug, Default)]
pub struct Groth15<L> {
    layout: PhantomData<L>,
}

impl<L: Layout> Groth15<L> {
    pub const fn new() -> Self {
        Self {
            layout: PhantomData,
        }
    }
}

impl<L: Layout> Scheme for Groth15<L> {
    fn scheme_name(&self) -> &str {
        L::SCHEME_NAME
    }

    fn tex_name(&self) -> String {
        L::TEX_NAME.to_owned()
    }
}

impl<G, L> MeasuredOperation<G> for Groth15<L>
where
    G: BilinearGroup,
    L: Placement<G>,
{
    type Space = L::Space;
    type Instance = Groth15Instance<G, L>;

    fn construct(
        &self,
        group: &G,
        payload_size: usize,
        rng: &mut BenchRng,
    ) -> Result<Groth15Instance<G, L>, OperationError> {
        let messages = L::message_group(group);
        let y = group.random_scalar(rng);
        Ok(Groth15Instance {
            group: group.clone(),
            y: messages.pow(&messages.generator(), &y),
            message_length: payload_size,
            layout: PhantomData,
        })
    }
}

/// Public parameters for messages of a fixed length.
pub struct Groth15Instance<G: BilinearGroup, L: Placement<G>> {
    group: G,
    y: MessageElement<G, L>,
    message_length: usize,
    layout: PhantomData<L>,
}

impl<G: BilinearGroup, L: Placement<G>> Groth15Instance<G, L> {
    pub fn message_length(&self) -> usize {
        self.message_length
    }

    pub fn group(&self) -> &G {
        &self.group
    }

    fn check_length(&self, actual: usize) -> Result<(), OperationError> {
        if actual == self.message_length {
            Ok(())
        } else {
            Err(OperationError::MessageLength {
                expected: self.message_length,
                actual,
            })
        }
    }
}

pub struct Groth15KeyPair<G: BilinearGroup, L: Placement<G>> {
    signing_key: G::Scalar,
    verification_key: KeyElement<G, L>,
}

impl<G: BilinearGroup, L: Placement<G>> Groth15KeyPair<G, L> {
    pub fn new(
        signing_key: G::Scalar,
        verification_key: KeyElement<G, L>,
    ) -> Self {
        Self {
            signing_key,
            verification_key,
        }
    }
}

impl<G: BilinearGroup, L: Placement<G>> SignatureKeyPair
    for Groth15KeyPair<G, L>
{
    type SigningKey = G::Scalar;
    type VerificationKey = KeyElement<G, L>;

    fn signing_key(&self) -> &G::Scalar {
        &self.signing_key
    }

    fn verification_key(&self) -> &KeyElement<G, L> {
        &self.verification_key
    }
}

impl<G: BilinearGroup, L: Placement<G>> Clone for Groth15KeyPair<G, L> {
    fn clone(&self) -> Self {
        Self::new(self.signing_key.clone(), self.verification_key.clone())
    }
}

impl<G: BilinearGroup, L: Placement<G>> PartialEq for Groth15KeyPair<G, L> {
    fn eq(&self, other: &Self) -> bool {
        self.signing_key == other.signing_key
            && self.verification_key == other.verification_key
    }
}

impl<G: BilinearGroup, L: Placement<G>> fmt::Debug for Groth15KeyPair<G, L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Groth15KeyPair")
            .field("verification_key", &self.verification_key)
            .finish_non_exhaustive()
    }
}

pub struct Groth15Signature<G: BilinearGroup, L: Placement<G>> {
    pub r: KeyElement<G, L>,
    pub s: MessageElement<G, L>,
    pub t: Vec<MessageElement<G, L>>,
}

impl<G: BilinearGroup, L: Placement<G>> Clone for Groth15Signature<G, L> {
    fn clone(&self) -> Self {
        Self {
            r: self.r.clone(),
            s: self.s.clone(),
            t: self.t.clone(),
        }
    }
}

impl<G: BilinearGroup, L: Placement<G>> PartialEq for Groth15Signature<G, L> {
    fn eq(&self, other: &Self) -> bool {
        self.r == other.r && self.s == other.s && self.t == other.t
    }
}

impl<G: BilinearGroup, L: Placement<G>> fmt::Debug for Groth15Signature<G, L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Groth15Signature")
            .field("r", &self.r)
            .field("s", &self.s)
            .field("t", &self.t)
            .finish()
    }
}

impl<G, L> OperationInstance for Groth15Instance<G, L>
where
    G: BilinearGroup,
    L: Placement<G>,
{
    type Message = MessageBlock<MessageElement<G, L>>;
    type KeyPair = Groth15KeyPair<G, L>;
    type Signature = Groth15Signature<G, L>;

    fn generate_key_pair(
        &self,
        payload_size: usize,
        rng: &mut BenchRng,
    ) -> Result<Groth15KeyPair<G, L>, OperationError> {
        self.check_length(payload_size)?;
        let keys = L::key_group(&self.group);
        let v = self.group.random_scalar(rng);
        let verification_key = keys.pow(&keys.generator(), &v);
        Ok(Groth15KeyPair::new(v, verification_key))
    }

    fn sign(
        &self,
        v: &G::Scalar,
        message: &Self::Message,
        rng: &mut BenchRng,
    ) -> Result<Groth15Signature<G, L>, OperationError> {
        self.check_length(message.len())?;
        let messages = L::message_group(&self.group);
        let keys = L::key_group(&self.group);
        let (r, r_inv) = self.group.random_unit_scalar(rng);

        let big_r = keys.pow(&keys.generator(), &r);
        let g_v = messages.pow(&messages.generator(), v);
        let s = messages.pow(&messages.op(&self.y, &g_v), &r_inv);
        let y_v = messages.pow(&self.y, v);
        let t = message
            .elements()
            .iter()
            .map(|m| messages.pow(&messages.op(&y_v, m), &r_inv))
            .collect();

        Ok(Groth15Signature { r: big_r, s, t })
    }

    fn verify(
        &self,
        message: &Self::Message,
        signature: &Groth15Signature<G, L>,
        verification_key: &KeyElement<G, L>,
    ) -> Result<bool, OperationError> {
        self.check_length(message.len())?;
        if signature.t.len() != message.len() {
            return Ok(false);
        }
        let group = &self.group;
        let gt = group.gt();
        let g = L::message_group(group).generator();
        let h = L::key_group(group).generator();

        let left = L::pair(group, &signature.s, &signature.r);
        let right = gt.op(
            &L::pair(group, &self.y, &h),
            &L::pair(group, &g, verification_key),
        );
        if left != right {
            return Ok(false);
        }

        let y_v = L::pair(group, &self.y, verification_key);
        for (t_i, m_i) in signature.t.iter().zip(message.elements()) {
            let left = L::pair(group, t_i, &signature.r);
            let right = gt.op(&y_v, &L::pair(group, m_i, &h));
            if left != right {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn serialize_key_pair(
        &self,
        key_pair: &Groth15KeyPair<G, L>,
    ) -> Result<Vec<u8>, OperationError> {
        repr::KeyPairRepr::from_key_pair(self, key_pair)?.to_bytes()
    }

    fn restore_key_pair(
        &self,
        bytes: &[u8],
    ) -> Result<Groth15KeyPair<G, L>, OperationError> {
        repr::KeyPairRepr::from_bytes(bytes)?.restore(self)
    }

    fn serialize_signature(
        &self,
        signature: &Groth15Signature<G, L>,
    ) -> Result<Vec<u8>, OperationError> {
        repr::SignatureRepr::from_signature(self, signature)?.to_bytes()
    }

    fn restore_signature(
        &self,
        bytes: &[u8],
    ) -> Result<Groth15Signature<G, L>, OperationError> {
        repr::SignatureRepr::from_bytes(bytes)?.restore(self)
    }
}

#[cfg(test)]
mod tests {
    use super::{
        Groth15, Groth15G1, Groth15G2, Groth15Instance, Groth15KeyPair,
        Groth15Signature, MessageElement, Placement,
    };
    use crate::layout::{MessagesInG1, MessagesInG2};
    use bilinear::{
        BilinearGroup, Bn254Group, CountingBilinearGroup, DebugBilinearGroup,
        Group,
    };
    use rand::SeedableRng;
    use sps_bench::{
        prepare_messages, run_benchmark, BenchRng, BenchmarkConfig,
        BenchmarkMode, MeasuredOperation, MessageBlock, OperationError,
        OperationInstance, SignatureKeyPair,
    };

    struct Signed<G: BilinearGroup, L: Placement<G>> {
        instance: Groth15Instance<G, L>,
        key_pair: Groth15KeyPair<G, L>,
        message: MessageBlock<MessageElement<G, L>>,
        signature: Groth15Signature<G, L>,
    }

    fn sign_one<G, L>(group: &G, length: usize, seed: u64) -> Signed<G, L>
    where
        G: BilinearGroup,
        L: Placement<G>,
    {
        let mut rng = BenchRng::seed_from_u64(seed);
        let instance = Groth15::<L>::new()
            .construct(group, length, &mut rng)
            .expect("setup");
        let key_pair =
            instance.generate_key_pair(length, &mut rng).expect("keygen");
        let message =
            prepare_messages::<G, L::Space>(group, 1, length, &mut rng)
                .remove(0);
        let signature = instance
            .sign(key_pair.signing_key(), &message, &mut rng)
            .expect("sign");
        Signed {
            instance,
            key_pair,
            message,
            signature,
        }
    }

    fn verifies<G: BilinearGroup, L: Placement<G>>(
        signed: &Signed<G, L>,
    ) -> bool {
        signed
            .instance
            .verify(
                &signed.message,
                &signed.signature,
                signed.key_pair.verification_key(),
            )
            .expect("verify")
    }

    #[test]
    fn honest_signatures_verify_in_both_layouts() {
        let group = DebugBilinearGroup::new();
        assert!(verifies(&sign_one::<_, MessagesInG1>(&group, 5, 1)));
        assert!(verifies(&sign_one::<_, MessagesInG2>(&group, 5, 2)));
    }

    #[test]
    fn honest_signature_verifies_on_bn254() {
        let group = Bn254Group::bn254();
        assert!(verifies(&sign_one::<_, MessagesInG1>(&group, 2, 3)));
        assert!(verifies(&sign_one::<_, MessagesInG2>(&group, 2, 4)));
    }

    #[test]
    fn modified_message_is_rejected() {
        let group = DebugBilinearGroup::new();
        let mut signed = sign_one::<_, MessagesInG1>(&group, 3, 5);
        let mut elements = signed.message.elements().to_vec();
        elements[1] = group.g1().op(&elements[1], &group.g1().generator());
        signed.message = MessageBlock::new(elements);
        assert!(!verifies(&signed));
    }

    #[test]
    fn foreign_key_is_rejected() {
        let group = DebugBilinearGroup::new();
        let signed = sign_one::<_, MessagesInG2>(&group, 3, 6);
        let other = sign_one::<_, MessagesInG2>(&group, 3, 7);
        let verdict = signed
            .instance
            .verify(
                &signed.message,
                &signed.signature,
                other.key_pair.verification_key(),
            )
            .expect("verify");
        assert!(!verdict);
    }

    #[test]
    fn message_length_must_match_setup() {
        let group = DebugBilinearGroup::new();
        let signed = sign_one::<_, MessagesInG1>(&group, 4, 8);
        let short = MessageBlock::new(signed.message.elements()[..3].to_vec());
        let err = signed
            .instance
            .verify(&short, &signed.signature, signed.key_pair.verification_key())
            .unwrap_err();
        assert!(matches!(
            err,
            OperationError::MessageLength {
                expected: 4,
                actual: 3
            }
        ));
    }

    #[test]
    fn restored_objects_verify_identically() {
        let group = Bn254Group::bn254();
        let signed = sign_one::<_, MessagesInG1>(&group, 2, 9);
        let instance = &signed.instance;

        let key_bytes =
            instance.serialize_key_pair(&signed.key_pair).expect("ser key");
        let sig_bytes =
            instance.serialize_signature(&signed.signature).expect("ser sig");
        let key_pair = instance.restore_key_pair(&key_bytes).expect("key");
        let signature = instance.restore_signature(&sig_bytes).expect("sig");

        assert_eq!(key_pair, signed.key_pair);
        assert_eq!(signature, signed.signature);
        let verdict = instance
            .verify(&signed.message, &signature, key_pair.verification_key())
            .expect("verify");
        assert_eq!(verdict, verifies(&signed));
    }

    #[test]
    fn corrupted_bytes_are_errors() {
        let group = DebugBilinearGroup::new();
        let signed = sign_one::<_, MessagesInG2>(&group, 2, 10);
        assert!(signed.instance.restore_signature(b"{}").is_err());
        assert!(signed.instance.restore_key_pair(b"not json").is_err());
    }

    #[test]
    fn verify_cost_grows_with_message_length() {
        let group = CountingBilinearGroup::new(DebugBilinearGroup::new());
        for length in [1, 4] {
            let signed = sign_one::<_, MessagesInG1>(&group, length, 11);
            group.set_bucket("verify");
            group.reset_counters();
            assert!(verifies(&signed));
            let counts = group.bucket_counts("verify");
            assert_eq!(counts.pairings, 4 + 2 * length as u64);
            assert_eq!(counts.gt.group_ops, 1 + length as u64);
        }
    }

    #[test]
    fn scheme_names() {
        use sps_bench::Scheme;
        assert_eq!(Groth15G1::new().scheme_name(), "Groth15-G1");
        assert_eq!(Groth15G2::new().tex_name(), "GrothH");
    }

    #[test]
    fn full_lifecycle_runs_in_both_modes() {
        let config = BenchmarkConfig::new(
            DebugBilinearGroup::new(),
            DebugBilinearGroup::new(),
            2,
            6,
            3,
        )
        .expect("config");

        let timed = run_benchmark(&config, &Groth15G2::new(), BenchmarkMode::Timing)
            .expect("timing run");
        let tally = timed[3].verification.expect("tally");
        assert_eq!((tally.accepted, tally.rejected), (6, 0));

        let counted =
            run_benchmark(&config, &Groth15G2::new(), BenchmarkMode::Counting)
                .expect("counting run");
        let setup = counted[0].counts().expect("setup counts");
        let key_gen = counted[1].counts().expect("keygen counts");
        let sign = counted[2].counts().expect("sign counts");
        let verify = counted[3].counts().expect("verify counts");

        // messages live in G2, keys in G1
        assert_eq!(setup.g2.exponentiations, 1);
        assert_eq!(key_gen.g1.exponentiations, 1);
        assert_eq!(sign.g1.exponentiations, 1);
        assert_eq!(sign.g2.exponentiations, 3 + 3);
        assert_eq!(sign.g2.group_ops, 1 + 3);
        assert_eq!(sign.pairings, 0);
        assert_eq!(verify.pairings, 4 + 2 * 3);
        assert!(!counted[3].is_anomalous());
    }
}
