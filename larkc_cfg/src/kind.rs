/// The closed tag enumerating every concrete value-producing variant.
///
/// Discriminants are grouped into three contiguous ranges so category
/// membership is a pair of integer comparisons:
///
/// * allocations:  `AllocVar ..= AllocArray`
/// * instructions: `AllocVar ..= CondBranch` (currently every kind)
/// * terminators:  `Unreachable ..= CondBranch`
///
/// New kinds must be added inside the range they belong to, the ordering
/// is part of the contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum ValueKind {
    AllocVar = 0,
    AllocTmp = 1,
    AllocArray = 2,

    Apply = 3,
    ConstantRef = 4,
    ZeroValue = 5,
    IntegerLiteral = 6,
    FloatLiteral = 7,
    CharacterLiteral = 8,
    StringLiteral = 9,
    Load = 10,
    Store = 11,
    TypeConversion = 12,
    Tuple = 13,
    TypeOf = 14,
    ScalarToTuple = 15,
    TupleElement = 16,
    IndexLValue = 17,

    Unreachable = 18,
    Return = 19,
    Branch = 20,
    CondBranch = 21,
}

impl ValueKind {
    pub const FIRST_INSTRUCTION_INST: ValueKind = ValueKind::AllocVar;
    pub const LAST_INSTRUCTION_INST: ValueKind = ValueKind::CondBranch;

    pub const FIRST_ALLOC_INST: ValueKind = ValueKind::AllocVar;
    pub const LAST_ALLOC_INST: ValueKind = ValueKind::AllocArray;

    pub const FIRST_TERM_INST: ValueKind = ValueKind::Unreachable;
    pub const LAST_TERM_INST: ValueKind = ValueKind::CondBranch;

    pub fn is_instruction(self) -> bool {
        Self::FIRST_INSTRUCTION_INST as u8 <= self as u8
            && self as u8 <= Self::LAST_INSTRUCTION_INST as u8
    }

    pub fn is_allocation(self) -> bool {
        Self::FIRST_ALLOC_INST as u8 <= self as u8 && self as u8 <= Self::LAST_ALLOC_INST as u8
    }

    pub fn is_terminator(self) -> bool {
        Self::FIRST_TERM_INST as u8 <= self as u8 && self as u8 <= Self::LAST_TERM_INST as u8
    }
}
