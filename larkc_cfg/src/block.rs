use larkc_core::ValueRef;

/// An ordered sequence of instructions, the node of a CFG.
///
/// A block holds its members by reference; the instructions themselves live
/// in the owning [`Cfg`]'s arena. Membership and the instructions' parent
/// back-references are mutated only through the [`Cfg`] list operations.
///
/// A block whose last instruction is a terminator is *closed*; a block with
/// no terminator is *open* and only exists during construction.
///
/// [`Cfg`]: crate::cfg::Cfg
#[derive(Debug, Default, Clone)]
pub struct BasicBlock {
    insts: Vec<ValueRef>,
}

impl BasicBlock {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// The member instructions in program order.
    pub fn instructions(&self) -> &[ValueRef] {
        &self.insts
    }

    pub fn is_empty(&self) -> bool {
        self.insts.is_empty()
    }

    pub fn len(&self) -> usize {
        self.insts.len()
    }

    pub fn contains(&self, value: ValueRef) -> bool {
        self.insts.contains(&value)
    }

    pub(crate) fn push(&mut self, value: ValueRef) {
        self.insts.push(value);
    }

    pub(crate) fn remove(&mut self, value: ValueRef) {
        let ix = self
            .insts
            .iter()
            .position(|v| *v == value)
            .expect("instruction is not a member of this block");

        self.insts.remove(ix);
    }

    pub(crate) fn drain(&mut self, range: std::ops::Range<usize>) -> Vec<ValueRef> {
        self.insts.drain(range).collect()
    }

    pub(crate) fn extend(&mut self, values: Vec<ValueRef>) {
        self.insts.extend(values);
    }
}
