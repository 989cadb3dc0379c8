use crate::value::{BlockRef, ValueRef};

use thiserror::Error;

pub type LarkResult<T> = Result<T, LarkError>;

/// Structural well-formedness violations found in a CFG.
///
/// These are internal compiler errors, a CFG builder that produces one of
/// these has a bug.
#[derive(Debug, Clone, Error)]
pub enum CfgError {
    #[error("A non-empty basic block does not end with a terminator.")]
    MissingTerminator { block: BlockRef },

    #[error("An instruction appears after the block terminator.")]
    InstructionAfterTerminator { block: BlockRef, value: ValueRef },

    #[error("A terminator names a successor block that is not part of this CFG.")]
    DanglingSuccessor { block: BlockRef, successor: BlockRef },

    #[error("An instruction's parent back-reference disagrees with block membership.")]
    ParentMismatch { block: BlockRef, value: ValueRef },

    #[error("An instruction operand references a value not owned by this CFG.")]
    DanglingOperand { value: ValueRef, operand: ValueRef },
}

#[derive(Debug, Error, derive_more::From)]
pub enum LarkError {
    #[error("An IO error.")]
    IO(std::io::Error),

    #[error("A CFG failed structural verification.")]
    InvalidCfg(CfgError),
}
