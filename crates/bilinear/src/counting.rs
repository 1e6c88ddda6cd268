//! Instrumented wrapper that tallies primitive operations.
//!
//! Counts are attributed to the currently active bucket and split by
//! sub-structure. The wrapper and every clone handed to a scheme share one
//! counter state, so the benchmark driver can switch buckets and reset
//! counters while the scheme keeps computing through its own copy.

use crate::{
    BilinearGroup, CodecError, G1Element, G2Element, GtElement, Group,
    Substructure,
};
use rand::RngCore;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

pub const DEFAULT_BUCKET: &str = "default";

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct OperationCounts {
    pub group_ops: u64,
    pub inversions: u64,
    pub exponentiations: u64,
}

impl OperationCounts {
    pub fn total(&self) -> u64 {
        self.group_ops + self.inversions + self.exponentiations
    }

    pub fn is_zero(&self) -> bool {
        self.total() == 0
    }
}

/// Everything counted for one bucket.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct BucketCounts {
    pub g1: OperationCounts,
    pub g2: OperationCounts,
    pub gt: OperationCounts,
    pub pairings: u64,
}

impl BucketCounts {
    pub fn group(&self, structure: Substructure) -> Option<&OperationCounts> {
        match structure {
            Substructure::G1 => Some(&self.g1),
            Substructure::G2 => Some(&self.g2),
            Substructure::Gt => Some(&self.gt),
            Substructure::Pairing => None,
        }
    }

    /// Total count for a sub-structure; pairing applications for
    /// [`Substructure::Pairing`].
    pub fn count(&self, structure: Substructure) -> u64 {
        self.group(structure)
            .map_or(self.pairings, OperationCounts::total)
    }

    pub fn is_zero(&self) -> bool {
        Substructure::ALL.iter().all(|&s| self.count(s) == 0)
    }
}

impl fmt::Display for BucketCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (label, counts) in
            [("G1", &self.g1), ("G2", &self.g2), ("GT", &self.gt)]
        {
            write!(
                f,
                "{label}: {} ops / {} inv / {} exp | ",
                counts.group_ops, counts.inversions, counts.exponentiations
            )?;
        }
        write!(f, "pairings: {}", self.pairings)
    }
}

/// Bucket name to counts.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct OperationCountTable {
    buckets: BTreeMap<String, BucketCounts>,
}

impl OperationCountTable {
    /// Counts for `bucket`; all zero when nothing was attributed to it.
    pub fn get(&self, bucket: &str) -> BucketCounts {
        self.buckets.get(bucket).copied().unwrap_or_default()
    }

    pub fn count(&self, bucket: &str, structure: Substructure) -> u64 {
        self.get(bucket).count(structure)
    }

    pub fn buckets(&self) -> impl Iterator<Item = (&str, &BucketCounts)> {
        self.buckets.iter().map(|(name, counts)| (name.as_str(), counts))
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.values().all(BucketCounts::is_zero)
    }
}

#[derive(Clone, Copy, Debug)]
enum Tally {
    GroupOp,
    Inversion,
    Exponentiation,
}

#[derive(Debug)]
struct CounterState {
    active_bucket: String,
    table: OperationCountTable,
}

impl CounterState {
    fn new() -> Self {
        Self {
            active_bucket: DEFAULT_BUCKET.to_owned(),
            table: OperationCountTable::default(),
        }
    }

    fn active_counts(&mut self) -> &mut BucketCounts {
        self.table
            .buckets
            .entry(self.active_bucket.clone())
            .or_default()
    }

    fn record_group(&mut self, structure: Substructure, tally: Tally) {
        let bucket = self.active_counts();
        let counts = match structure {
            Substructure::G1 => &mut bucket.g1,
            Substructure::G2 => &mut bucket.g2,
            Substructure::Gt => &mut bucket.gt,
            Substructure::Pairing => return,
        };
        match tally {
            Tally::GroupOp => counts.group_ops += 1,
            Tally::Inversion => counts.inversions += 1,
            Tally::Exponentiation => counts.exponentiations += 1,
        }
    }
}

type SharedCounters = Rc<RefCell<CounterState>>;

/// A [`Group`] that records every `op`, `inv` and `pow` it performs.
#[derive(Clone)]
pub struct CountingGroup<G> {
    inner: G,
    structure: Substructure,
    counters: SharedCounters,
}

impl<G: Group> CountingGroup<G> {
    fn new(
        inner: &G,
        structure: Substructure,
        counters: &SharedCounters,
    ) -> Self {
        Self {
            inner: inner.clone(),
            structure,
            counters: Rc::clone(counters),
        }
    }

    fn record(&self, tally: Tally) {
        self.counters.borrow_mut().record_group(self.structure, tally);
    }
}

impl<G: Group> Group for CountingGroup<G> {
    type Element = G::Element;
    type Scalar = G::Scalar;

    fn generator(&self) -> G::Element {
        self.inner.generator()
    }

    fn identity(&self) -> G::Element {
        self.inner.identity()
    }

    fn op(&self, a: &G::Element, b: &G::Element) -> G::Element {
        self.record(Tally::GroupOp);
        self.inner.op(a, b)
    }

    fn inv(&self, a: &G::Element) -> G::Element {
        self.record(Tally::Inversion);
        self.inner.inv(a)
    }

    fn pow(&self, a: &G::Element, exponent: &G::Scalar) -> G::Element {
        self.record(Tally::Exponentiation);
        self.inner.pow(a, exponent)
    }

    fn random<R: RngCore + ?Sized>(&self, rng: &mut R) -> G::Element {
        self.inner.random(rng)
    }

    fn encode(&self, a: &G::Element) -> Result<Vec<u8>, CodecError> {
        self.inner.encode(a)
    }

    fn decode(&self, bytes: &[u8]) -> Result<G::Element, CodecError> {
        self.inner.decode(bytes)
    }
}

/// Counting substitute for any [`BilinearGroup`].
///
/// Sampling, scalar arithmetic and encoding are passed through uncounted;
/// group operations, inversions, exponentiations and pairings are tallied
/// into the active bucket.
#[derive(Clone)]
pub struct CountingBilinearGroup<B: BilinearGroup> {
    inner: B,
    g1: CountingGroup<B::G1>,
    g2: CountingGroup<B::G2>,
    gt: CountingGroup<B::Gt>,
    counters: SharedCounters,
}

impl<B: BilinearGroup> CountingBilinearGroup<B> {
    pub fn new(inner: B) -> Self {
        let counters = Rc::new(RefCell::new(CounterState::new()));
        Self {
            g1: CountingGroup::new(inner.g1(), Substructure::G1, &counters),
            g2: CountingGroup::new(inner.g2(), Substructure::G2, &counters),
            gt: CountingGroup::new(inner.gt(), Substructure::Gt, &counters),
            inner,
            counters,
        }
    }

    pub fn inner(&self) -> &B {
        &self.inner
    }

    /// Routes all following counts into `bucket`.
    pub fn set_bucket(&self, bucket: &str) {
        bucket.clone_into(&mut self.counters.borrow_mut().active_bucket);
    }

    pub fn active_bucket(&self) -> String {
        self.counters.borrow().active_bucket.clone()
    }

    /// Zeroes the counts of every bucket.
    pub fn reset_counters(&self) {
        self.counters.borrow_mut().table = OperationCountTable::default();
    }

    pub fn bucket_counts(&self, bucket: &str) -> BucketCounts {
        self.counters.borrow().table.get(bucket)
    }

    pub fn table(&self) -> OperationCountTable {
        self.counters.borrow().table.clone()
    }
}

impl<B: BilinearGroup> BilinearGroup for CountingBilinearGroup<B> {
    type Scalar = B::Scalar;
    type G1 = CountingGroup<B::G1>;
    type G2 = CountingGroup<B::G2>;
    type Gt = CountingGroup<B::Gt>;

    fn name(&self) -> String {
        format!("Counting[{}]", self.inner.name())
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

    fn pair(&self, a: &G1Element<B>, b: &G2Element<B>) -> GtElement<B> {
        self.counters.borrow_mut().active_counts().pairings += 1;
        self.inner.pair(a, b)
    }

    fn random_scalar<R: RngCore + ?Sized>(&self, rng: &mut R) -> B::Scalar {
        self.inner.random_scalar(rng)
    }

    fn scalar_inverse(&self, scalar: &B::Scalar) -> Option<B::Scalar> {
        self.inner.scalar_inverse(scalar)
    }

    fn scalar_from_u64(&self, value: u64) -> B::Scalar {
        self.inner.scalar_from_u64(value)
    }

    fn encode_scalar(
        &self,
        scalar: &B::Scalar,
    ) -> Result<Vec<u8>, CodecError> {
        self.inner.encode_scalar(scalar)
    }

    fn decode_scalar(&self, bytes: &[u8]) -> Result<B::Scalar, CodecError> {
        self.inner.decode_scalar(bytes)
    }
}
