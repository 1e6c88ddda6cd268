use crate::config::BenchRng;
use bilinear::{BilinearGroup, G1Element, G2Element, Group};
use std::fmt;
use std::marker::PhantomData;

/// A vector of group elements signed as one message.
#[derive(Clone, Debug, PartialEq)]
pub struct MessageBlock<E> {
    elements: Vec<E>,
}

impl<E> MessageBlock<E> {
    pub fn new(elements: Vec<E>) -> Self {
        Self { elements }
    }

    pub fn elements(&self) -> &[E] {
        &self.elements
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

impl<E> FromIterator<E> for MessageBlock<E> {
    fn from_iter<I: IntoIterator<Item = E>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Where a scheme's message elements live.
pub trait MessageSpace<G: BilinearGroup> {
    type Element: Clone + fmt::Debug + PartialEq;

    const LABEL: &'static str;

    fn sample(group: &G, rng: &mut BenchRng) -> Self::Element;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct G1Messages<G>(PhantomData<G>);

#[derive(Clone, Copy, Debug, Default)]
pub struct G2Messages<G>(PhantomData<G>);

impl<G: BilinearGroup> MessageSpace<G> for G1Messages<G> {
    type Element = G1Element<G>;

    const LABEL: &'static str = "G1";

    fn sample(group: &G, rng: &mut BenchRng) -> Self::Element {
        group.g1().random(rng)
    }
}

impl<G: BilinearGroup> MessageSpace<G> for G2Messages<G> {
    type Element = G2Element<G>;

    const LABEL: &'static str = "G2";

    fn sample(group: &G, rng: &mut BenchRng) -> Self::Element {
        group.g2().random(rng)
    }
}

/// Samples `block_count` independent messages of `message_length` elements.
pub fn prepare_messages<G, S>(
    group: &G,
    block_count: usize,
    message_length: usize,
    rng: &mut BenchRng,
) -> Vec<MessageBlock<S::Element>>
where
    G: BilinearGroup,
    S: MessageSpace<G>,
{
    (0..block_count)
        .map(|_| {
            (0..message_length)
                .map(|_| S::sample(group, rng))
                .collect::<MessageBlock<_>>()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{prepare_messages, G1Messages, G2Messages};
    use bilinear::{CountingBilinearGroup, DebugBilinearGroup};
    use rand::SeedableRng;
    use crate::config::BenchRng;

    #[test]
    fn blocks_have_requested_shape() {
        let group = DebugBilinearGroup::new();
        let mut rng = BenchRng::seed_from_u64(4);
        let blocks = prepare_messages::<_, G2Messages<_>>(&group, 3, 5, &mut rng);
        assert_eq!(blocks.len(), 3);
        assert!(blocks.iter().all(|block| block.len() == 5));
        assert_ne!(blocks[0], blocks[1]);
    }

    #[test]
    fn sampling_is_not_counted() {
        let group = CountingBilinearGroup::new(DebugBilinearGroup::new());
        let mut rng = BenchRng::seed_from_u64(8);
        let blocks = prepare_messages::<_, G1Messages<_>>(&group, 2, 4, &mut rng);
        assert_eq!(blocks.len(), 2);
        assert!(group.table().is_empty());
    }

    #[test]
    fn empty_payload_gives_empty_blocks() {
        let group = DebugBilinearGroup::new();
        let mut rng = BenchRng::seed_from_u64(9);
        let blocks = prepare_messages::<_, G1Messages<_>>(&group, 1, 0, &mut rng);
        assert!(blocks[0].is_empty());
    }
}
