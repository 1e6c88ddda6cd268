use bilinear::{BilinearGroup, Group, GtElement};
use sps_bench::{G1Messages, G2Messages, MessageSpace};

pub type MessageElement<G, L> =
    <<L as Placement<G>>::MessageGroup as Group>::Element;
pub type KeyElement<G, L> = <<L as Placement<G>>::KeyGroup as Group>::Element;

/// Which source group of the pairing carries the messages.
pub trait Layout {
    const SCHEME_NAME: &'static str;
    /// Letters only; `G` and `H` follow the usual names for the two
    /// source groups.
    const TEX_NAME: &'static str;
}

/// Binds a [`Layout`] to the groups of one bilinear group. The key side is
/// the source group the messages do not live in.
pub trait Placement<G: BilinearGroup>: Layout {
    type MessageGroup: Group<Scalar = G::Scalar>;
    type KeyGroup: Group<Scalar = G::Scalar>;
    type Space: MessageSpace<
        G,
        Element = <Self::MessageGroup as Group>::Element,
    >;

    fn message_group(group: &G) -> &Self::MessageGroup;
    fn key_group(group: &G) -> &Self::KeyGroup;
    fn pair(
        group: &G,
        message_side: &MessageElement<G, Self>,
        key_side: &KeyElement<G, Self>,
    ) -> GtElement<G>;
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct MessagesInG1;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct MessagesInG2;

impl Layout for MessagesInG1 {
    const SCHEME_NAME: &'static str = "Groth15-G1";
    const TEX_NAME: &'static str = "GrothG";
}

impl Layout for MessagesInG2 {
    const SCHEME_NAME: &'static str = "Groth15-G2";
    const TEX_NAME: &'static str = "GrothH";
}

impl<G: BilinearGroup> Placement<G> for MessagesInG1 {
    type MessageGroup = G::G1;
    type KeyGroup = G::G2;
    type Space = G1Messages<G>;

    fn message_group(group: &G) -> &G::G1 {
        group.g1()
    }

    fn key_group(group: &G) -> &G::G2 {
        group.g2()
    }

    fn pair(
        group: &G,
        message_side: &MessageElement<G, Self>,
        key_side: &KeyElement<G, Self>,
    ) -> GtElement<G> {
        group.pair(message_side, key_side)
    }
}

impl<G: BilinearGroup> Placement<G> for MessagesInG2 {
    type MessageGroup = G::G2;
    type KeyGroup = G::G1;
    type Space = G2Messages<G>;

    fn message_group(group: &G) -> &G::G2 {
        group.g2()
    }

    fn key_group(group: &G) -> &G::G1 {
        group.g1()
    }

    fn pair(
        group: &G,
        message_side: &MessageElement<G, Self>,
        key_side: &KeyElement<G, Self>,
    ) -> GtElement<G> {
        group.pair(key_side, message_side)
    }
}
