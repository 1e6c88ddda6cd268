//! Drives the four lifecycle stages through one of the engines.
//!
//! Each stage reads the objects the previous stage stored in its slot
//! arena. In timing mode every iteration has its own slot; in counting mode
//! all iterations share slot 0 and the key pair and signature are pushed
//! through their byte representation before verification.

use crate::config::{BenchRng, BenchmarkConfig};
use crate::counting::CountingEngine;
use crate::error::BenchmarkError;
use crate::message::{prepare_messages, MessageSpace};
use crate::operation::{
    InstanceOf, KeyPairOf, MeasuredOperation, MessageOf, OperationInstance,
    SignatureKeyPair, SignatureOf,
};
use crate::slots::{FreshPerIteration, SingleShared, SlotArena, SlotPolicy};
use crate::stage::{BenchmarkMode, Stage};
use crate::timing::{BenchmarkTimes, TimingEngine};
use bilinear::{BilinearGroup, BucketCounts, CountingBilinearGroup};
use std::marker::PhantomData;
use tracing::{info, warn};

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct VerificationTally {
    pub accepted: usize,
    pub rejected: usize,
}

impl VerificationTally {
    pub fn total(&self) -> usize {
        self.accepted + self.rejected
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Measurement {
    Times {
        times: BenchmarkTimes,
        peak_heap_bytes: usize,
    },
    Counts(BucketCounts),
}

#[derive(Clone, Debug, PartialEq)]
pub struct StageResult {
    pub stage: Stage,
    pub measurement: Measurement,
    /// Set for the verify stage only.
    pub verification: Option<VerificationTally>,
}

impl StageResult {
    fn new(stage: Stage, measurement: Measurement) -> Self {
        Self {
            stage,
            measurement,
            verification: None,
        }
    }

    fn with_verification(mut self, tally: VerificationTally) -> Self {
        self.verification = Some(tally);
        self
    }

    pub fn times(&self) -> Option<&BenchmarkTimes> {
        match &self.measurement {
            Measurement::Times { times, .. } => Some(times),
            Measurement::Counts(_) => None,
        }
    }

    pub fn counts(&self) -> Option<&BucketCounts> {
        match &self.measurement {
            Measurement::Counts(counts) => Some(counts),
            Measurement::Times { .. } => None,
        }
    }

    pub fn peak_heap_bytes(&self) -> Option<usize> {
        match self.measurement {
            Measurement::Times {
                peak_heap_bytes, ..
            } => Some(peak_heap_bytes),
            Measurement::Counts(_) => None,
        }
    }

    /// A verify stage that rejected at least one signature.
    pub fn is_anomalous(&self) -> bool {
        self.verification.is_some_and(|tally| tally.rejected > 0)
    }
}

/// Slot occupants a step replaced. The engines drop them after reading the
/// clock, so an earlier iteration's destructor never lands in a sample.
struct Retired<G: BilinearGroup, O: MeasuredOperation<G>> {
    _instance: Option<InstanceOf<G, O>>,
    _key_pair: Option<KeyPairOf<G, O>>,
    _signature: Option<SignatureOf<G, O>>,
}

impl<G: BilinearGroup, O: MeasuredOperation<G>> Retired<G, O> {
    fn nothing() -> Self {
        Self {
            _instance: None,
            _key_pair: None,
            _signature: None,
        }
    }
}

struct Lifecycle<'a, G, O, P>
where
    G: BilinearGroup,
    O: MeasuredOperation<G>,
{
    operation: &'a O,
    group: &'a G,
    payload_size: usize,
    rng: BenchRng,
    messages: Vec<MessageOf<G, O>>,
    instances: SlotArena<InstanceOf<G, O>>,
    key_pairs: SlotArena<KeyPairOf<G, O>>,
    signatures: SlotArena<SignatureOf<G, O>>,
    verdicts: SlotArena<bool>,
    policy: PhantomData<P>,
}

impl<'a, G, O, P> Lifecycle<'a, G, O, P>
where
    G: BilinearGroup,
    O: MeasuredOperation<G>,
    P: SlotPolicy,
{
    fn new<T: BilinearGroup, C: BilinearGroup>(
        operation: &'a O,
        group: &'a G,
        config: &BenchmarkConfig<T, C>,
    ) -> Self {
        let slots = P::slot_count(config.run_iterations());
        let mut message_rng = config.rng(&format!(
            "{}-messages-{}",
            operation.scheme_name(),
            P::NAME
        ));
        let messages = prepare_messages::<G, O::Space>(
            group,
            slots,
            config.payload_size(),
            &mut message_rng,
        );
        info!(
            space = <O::Space as MessageSpace<G>>::LABEL,
            blocks = slots,
            length = config.payload_size(),
            "messages prepared"
        );

        Self {
            operation,
            group,
            payload_size: config.payload_size(),
            rng: config.rng(&format!(
                "{}-lifecycle-{}",
                operation.scheme_name(),
                P::NAME
            )),
            messages,
            instances: SlotArena::new(slots),
            key_pairs: SlotArena::new(slots),
            signatures: SlotArena::new(slots),
            verdicts: SlotArena::new(slots),
            policy: PhantomData,
        }
    }

    fn step(
        &mut self,
        stage: Stage,
        iteration: usize,
    ) -> Result<Retired<G, O>, BenchmarkError> {
        let slot = P::slot(iteration);
        match stage {
            Stage::Setup => self.setup(slot),
            Stage::KeyGen => self.key_gen(slot),
            Stage::Sign => self.sign(slot),
            Stage::Verify => self.verify(slot),
        }
    }

    fn setup(&mut self, slot: usize) -> Result<Retired<G, O>, BenchmarkError> {
        let instance = self.operation.construct(
            self.group,
            self.payload_size,
            &mut self.rng,
        )?;
        Ok(Retired {
            _instance: store(&mut self.instances, Stage::Setup, slot, instance)?,
            ..Retired::nothing()
        })
    }

    fn key_gen(
        &mut self,
        slot: usize,
    ) -> Result<Retired<G, O>, BenchmarkError> {
        let instance = fetch(&self.instances, Stage::KeyGen, slot)?;
        let key_pair =
            instance.generate_key_pair(self.payload_size, &mut self.rng)?;
        Ok(Retired {
            _key_pair: store(&mut self.key_pairs, Stage::KeyGen, slot, key_pair)?,
            ..Retired::nothing()
        })
    }

    fn sign(&mut self, slot: usize) -> Result<Retired<G, O>, BenchmarkError> {
        let instance = fetch(&self.instances, Stage::Sign, slot)?;
        let key_pair = fetch(&self.key_pairs, Stage::Sign, slot)?;
        let message = message_at(&self.messages, Stage::Sign, slot)?;
        let signature =
            instance.sign(key_pair.signing_key(), message, &mut self.rng)?;
        Ok(Retired {
            _signature: store(&mut self.signatures, Stage::Sign, slot, signature)?,
            ..Retired::nothing()
        })
    }

    fn verify(
        &mut self,
        slot: usize,
    ) -> Result<Retired<G, O>, BenchmarkError> {
        let instance = fetch(&self.instances, Stage::Verify, slot)?;
        let key_pair = fetch(&self.key_pairs, Stage::Verify, slot)?;
        let signature = fetch(&self.signatures, Stage::Verify, slot)?;
        let message = message_at(&self.messages, Stage::Verify, slot)?;
        let verdict =
            instance.verify(message, signature, key_pair.verification_key())?;
        store(&mut self.verdicts, Stage::Verify, slot, verdict)?;
        Ok(Retired::nothing())
    }

    /// Replaces the key pair and signature in `slot` with copies restored
    /// from their serialized form.
    fn round_trip(&mut self, slot: usize) -> Result<(), BenchmarkError> {
        let instance = fetch(&self.instances, Stage::Verify, slot)?;
        let key_pair_bytes = instance
            .serialize_key_pair(fetch(&self.key_pairs, Stage::Verify, slot)?)?;
        let signature_bytes = instance.serialize_signature(fetch(
            &self.signatures,
            Stage::Verify,
            slot,
        )?)?;
        let key_pair = instance.restore_key_pair(&key_pair_bytes)?;
        let signature = instance.restore_signature(&signature_bytes)?;
        info!(
            key_pair_bytes = key_pair_bytes.len(),
            signature_bytes = signature_bytes.len(),
            "restored key pair and signature"
        );
        store(&mut self.key_pairs, Stage::Verify, slot, key_pair)?;
        store(&mut self.signatures, Stage::Verify, slot, signature)?;
        Ok(())
    }

    fn verification_tally(&self) -> VerificationTally {
        self.verdicts.filled().fold(
            VerificationTally::default(),
            |mut tally, &accepted| {
                if accepted {
                    tally.accepted += 1;
                } else {
                    tally.rejected += 1;
                }
                tally
            },
        )
    }
}

fn fetch<T>(
    arena: &SlotArena<T>,
    stage: Stage,
    slot: usize,
) -> Result<&T, BenchmarkError> {
    arena
        .get(slot)
        .ok_or(BenchmarkError::MissingSlot { stage, slot })
}

/// Returns the displaced occupant of `slot`, if any.
fn store<T>(
    arena: &mut SlotArena<T>,
    stage: Stage,
    slot: usize,
    value: T,
) -> Result<Option<T>, BenchmarkError> {
    let len = arena.len();
    arena
        .replace(slot, value)
        .map_err(|_| BenchmarkError::SlotOutOfRange { stage, slot, len })
}

fn message_at<M>(
    messages: &[M],
    stage: Stage,
    slot: usize,
) -> Result<&M, BenchmarkError> {
    messages
        .get(slot)
        .ok_or(BenchmarkError::MissingSlot { stage, slot })
}

fn report_verification(scheme: &str, tally: VerificationTally) {
    if tally.rejected > 0 {
        warn!(
            scheme,
            rejected = tally.rejected,
            accepted = tally.accepted,
            "verify rejected signatures; results are anomalous"
        );
    }
}

fn timed_stage<G, O, P>(
    engine: &TimingEngine,
    lifecycle: &mut Lifecycle<'_, G, O, P>,
    stage: Stage,
) -> Result<StageResult, BenchmarkError>
where
    G: BilinearGroup,
    O: MeasuredOperation<G>,
    P: SlotPolicy,
{
    let result =
        engine.measure(stage, |iteration| lifecycle.step(stage, iteration))?;
    info!(
        scheme = lifecycle.operation.scheme_name(),
        %stage,
        avg_ms = result.times.avg_millis(),
        min_ms = result.times.min_millis(),
        max_ms = result.times.max_millis(),
        "stage done"
    );
    Ok(StageResult::new(
        stage,
        Measurement::Times {
            times: result.times,
            peak_heap_bytes: result.peak_heap_bytes,
        },
    ))
}

fn counted_stage<B, O>(
    engine: &CountingEngine<'_, B>,
    lifecycle: &mut Lifecycle<'_, CountingBilinearGroup<B>, O, SingleShared>,
    stage: Stage,
) -> Result<StageResult, BenchmarkError>
where
    B: BilinearGroup,
    O: MeasuredOperation<CountingBilinearGroup<B>>,
{
    let counts =
        engine.measure(stage, |iteration| lifecycle.step(stage, iteration))?;
    info!(
        scheme = lifecycle.operation.scheme_name(),
        %stage,
        %counts,
        "stage done"
    );
    Ok(StageResult::new(stage, Measurement::Counts(counts)))
}

/// Measures wall-clock time of every stage over the timing group.
pub fn run_timed<T, C, O>(
    config: &BenchmarkConfig<T, C>,
    operation: &O,
) -> Result<[StageResult; 4], BenchmarkError>
where
    T: BilinearGroup,
    C: BilinearGroup,
    O: MeasuredOperation<T>,
{
    let engine =
        TimingEngine::new(config.prewarm_iterations(), config.run_iterations())?;
    let group = config.timing_group();
    info!(
        scheme = operation.scheme_name(),
        substrate = %group.name(),
        %config,
        "timing benchmark started"
    );
    let mut lifecycle =
        Lifecycle::<T, O, FreshPerIteration>::new(operation, group, config);

    let setup = timed_stage(&engine, &mut lifecycle, Stage::Setup)?;
    let key_gen = timed_stage(&engine, &mut lifecycle, Stage::KeyGen)?;
    let sign = timed_stage(&engine, &mut lifecycle, Stage::Sign)?;
    let verify = timed_stage(&engine, &mut lifecycle, Stage::Verify)?;

    let tally = lifecycle.verification_tally();
    report_verification(operation.scheme_name(), tally);
    Ok([setup, key_gen, sign, verify.with_verification(tally)])
}

/// Counts the primitive operations of every stage over the counting group.
pub fn run_counted<T, C, O>(
    config: &BenchmarkConfig<T, C>,
    operation: &O,
) -> Result<[StageResult; 4], BenchmarkError>
where
    T: BilinearGroup,
    C: BilinearGroup,
    O: MeasuredOperation<CountingBilinearGroup<C>>,
{
    let group = config.counting_group();
    let engine = CountingEngine::new(group, config.prewarm_iterations());
    info!(
        scheme = operation.scheme_name(),
        substrate = %group.name(),
        %config,
        "counting benchmark started"
    );
    let mut lifecycle =
        Lifecycle::<CountingBilinearGroup<C>, O, SingleShared>::new(
            operation, group, config,
        );

    let setup = counted_stage(&engine, &mut lifecycle, Stage::Setup)?;
    let key_gen = counted_stage(&engine, &mut lifecycle, Stage::KeyGen)?;
    let sign = counted_stage(&engine, &mut lifecycle, Stage::Sign)?;
    lifecycle.round_trip(SingleShared::slot(0))?;
    let verify = counted_stage(&engine, &mut lifecycle, Stage::Verify)?;

    let tally = lifecycle.verification_tally();
    report_verification(operation.scheme_name(), tally);
    Ok([setup, key_gen, sign, verify.with_verification(tally)])
}

/// Runs all four stages in order and returns one result per stage.
pub fn run_benchmark<T, C, O>(
    config: &BenchmarkConfig<T, C>,
    operation: &O,
    mode: BenchmarkMode,
) -> Result<[StageResult; 4], BenchmarkError>
where
    T: BilinearGroup,
    C: BilinearGroup,
    O: MeasuredOperation<T> + MeasuredOperation<CountingBilinearGroup<C>>,
{
    match mode {
        BenchmarkMode::Timing => run_timed(config, operation),
        BenchmarkMode::Counting => run_counted(config, operation),
    }
}
