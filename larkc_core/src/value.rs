use std::convert::{TryFrom, TryInto};
use std::fmt;

derive_everything! {
    /// A cheap, non-owning reference to the instruction producing a value.
    ///
    /// Equality of two `ValueRef`s is identity of the producing instruction.
    #[derive(serde::Serialize, serde::Deserialize)]
    #[repr(transparent)]
    pub struct ValueRef(pub u32);
}

derive_everything! {
    /// A cheap reference to a basic block owned by some CFG context.
    #[derive(serde::Serialize, serde::Deserialize)]
    #[repr(transparent)]
    pub struct BlockRef(pub u32);
}

impl fmt::Display for ValueRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "%{}", self.0)
    }
}

impl fmt::Display for BlockRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "bb{}", self.0)
    }
}

impl From<petgraph::graph::NodeIndex<u32>> for BlockRef {
    fn from(ix: petgraph::graph::NodeIndex<u32>) -> Self {
        Self(ix.index() as u32)
    }
}

impl From<BlockRef> for petgraph::graph::NodeIndex<u32> {
    fn from(br: BlockRef) -> Self {
        petgraph::graph::NodeIndex::from(br.0)
    }
}

impl TryFrom<ValueRef> for usize {
    type Error = std::num::TryFromIntError;

    fn try_from(ValueRef(n): ValueRef) -> Result<Self, Self::Error> {
        n.try_into()
    }
}

impl TryFrom<usize> for ValueRef {
    type Error = std::num::TryFromIntError;

    fn try_from(n: usize) -> Result<Self, Self::Error> {
        Ok(Self(n.try_into()?))
    }
}

impl TryFrom<BlockRef> for usize {
    type Error = std::num::TryFromIntError;

    fn try_from(BlockRef(n): BlockRef) -> Result<Self, Self::Error> {
        n.try_into()
    }
}

impl TryFrom<usize> for BlockRef {
    type Error = std::num::TryFromIntError;

    fn try_from(n: usize) -> Result<Self, Self::Error> {
        Ok(Self(n.try_into()?))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn node_index_roundtrip() {
        let br = BlockRef(3);
        let ix = petgraph::graph::NodeIndex::<u32>::from(br);

        assert_eq!(ix.index(), 3);
        assert_eq!(BlockRef::from(ix), br);
    }

    #[test]
    fn display_forms() {
        assert_eq!(ValueRef(7).to_string(), "%7");
        assert_eq!(BlockRef(2).to_string(), "bb2");
    }
}
