use larkc_core::{CfgError, LarkResult};

use crate::cfg::Cfg;

/// Check the structural well-formedness of `cfg`.
///
/// A violation means the builder that produced the CFG has a bug; the
/// findings are internal compiler errors, never user-visible diagnostics.
/// Typing rules beyond structure are not checked here.
pub fn verify(cfg: &Cfg) -> LarkResult<()> {
    for (block, data) in cfg.blocks() {
        let insts = data.instructions();

        for (ix, value) in insts.iter().copied().enumerate() {
            let inst = match cfg.try_inst(value) {
                Some(inst) => inst,
                None => return Err(CfgError::ParentMismatch { block, value }.into()),
            };

            if inst.parent() != Some(block) {
                return Err(CfgError::ParentMismatch { block, value }.into());
            }

            if inst.is_terminator() && ix + 1 != insts.len() {
                let value = insts[ix + 1];
                return Err(CfgError::InstructionAfterTerminator { block, value }.into());
            }

            for operand in inst.data().operands() {
                if cfg.try_inst(operand).is_none() {
                    return Err(CfgError::DanglingOperand { value, operand }.into());
                }
            }

            for successor in inst.successors().iter().copied() {
                if cfg.try_block(successor).is_none() {
                    return Err(CfgError::DanglingSuccessor { block, successor }.into());
                }
            }
        }

        if !insts.is_empty() && cfg.terminator_of(block).is_none() {
            return Err(CfgError::MissingTerminator { block }.into());
        }
    }

    Ok(())
}
