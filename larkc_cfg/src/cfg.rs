use std::fmt::Write;
use std::ops::Range;

use larkc_ast::{Ast, DeclRef, ExprKind, ExprRef, StmtKind, StmtRef};
use larkc_core::utils::SSAMap;
use larkc_core::{BlockRef, TypeId, TypeStore, TypingConstants, ValueRef};

use crate::block::BasicBlock;
use crate::inst::{InstData, Instruction};
use crate::location::Location;

/// The ownership context for one function's CFG.
///
/// Every instruction and basic block is allocated out of this context and
/// lives exactly as long as it. Dropping the context frees everything at
/// once; [`Cfg::erase_from_parent`] is an optimization, not a correctness
/// requirement.
///
/// The context is a single-threaded unit. Distinct contexts are fully
/// independent.
#[derive(Debug, Default)]
pub struct Cfg {
    insts: SSAMap<ValueRef, Instruction>,
    blocks: SSAMap<BlockRef, BasicBlock>,
    entry: Option<BlockRef>,
}

impl Cfg {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a fresh, open, empty block. The first block created becomes
    /// the entry block.
    pub fn new_block(&mut self) -> BlockRef {
        let block = self.blocks.insert(BasicBlock::new());

        if self.entry.is_none() {
            self.entry = Some(block);
        }

        block
    }

    pub fn entry(&self) -> Option<BlockRef> {
        self.entry
    }

    pub fn set_entry(&mut self, block: BlockRef) {
        assert!(self.blocks.get(block).is_some(), "entry must be a block of this CFG");

        self.entry = Some(block);
    }

    /// Panics when `value` does not belong to this context.
    pub fn inst(&self, value: ValueRef) -> &Instruction {
        self.insts.get(value).expect("dangling ValueRef")
    }

    pub fn try_inst(&self, value: ValueRef) -> Option<&Instruction> {
        self.insts.get(value)
    }

    /// Panics when `block` does not belong to this context.
    pub fn block(&self, block: BlockRef) -> &BasicBlock {
        self.blocks.get(block).expect("dangling BlockRef")
    }

    pub fn try_block(&self, block: BlockRef) -> Option<&BasicBlock> {
        self.blocks.get(block)
    }

    pub fn blocks(&self) -> impl Iterator<Item = (BlockRef, &BasicBlock)> {
        self.blocks.iter()
    }

    /// Whether `block` ends with a terminator. Append fails on a closed
    /// block.
    pub fn is_closed(&self, block: BlockRef) -> bool {
        self.terminator_of(block).is_some()
    }

    /// The block's terminator, `None` while the block is still open.
    pub fn terminator_of(&self, block: BlockRef) -> Option<ValueRef> {
        let last = *self.block(block).instructions().last()?;

        self.inst(last).is_terminator().then(|| last)
    }

    /// The successor edges of a closed block, in terminator order. Empty
    /// for open blocks.
    pub fn successors_of(&self, block: BlockRef) -> &[BlockRef] {
        match self.terminator_of(block) {
            Some(term) => self.inst(term).successors(),
            None => &[],
        }
    }

    fn create(&mut self, data: InstData, ty: TypeId, loc: Location) -> ValueRef {
        self.insts.insert(Instruction::new(data, ty, loc))
    }

    // -- factories
    //
    // Every factory produces a detached instruction; membership is
    // established separately through `append`.

    /// Allocate storage for a `var` declaration; produces the lvalue of the
    /// declared type.
    pub fn alloc_var(&mut self, decl: DeclRef, ast: &Ast, types: &mut TypeStore) -> ValueRef {
        let ty = types.lvalue_of(ast.decl(decl).ty);

        self.create(InstData::AllocVar, ty, Location::Decl(decl))
    }

    /// Allocate the temporary backing an rvalue-to-lvalue materialization.
    ///
    /// The next store to the produced lvalue is expected to be an
    /// initialization-style store providing the temporary's value.
    pub fn alloc_tmp(&mut self, expr: ExprRef, ast: &Ast, types: &TypeStore) -> ValueRef {
        assert!(
            matches!(ast.expr(expr).kind, ExprKind::Materialize { .. }),
            "alloc-tmp requires a materialization expression"
        );

        let ty = ast.expr_type(expr);

        assert!(types.is_lvalue(ty), "materialization must be typed as an lvalue");

        self.create(InstData::AllocTmp, ty, Location::Expr(expr))
    }

    /// Allocate an array of `num_elements` uniform elements, memory left
    /// uninitialized. Produces a two-element tuple of the object header
    /// pointer and an lvalue to the first element; `num_elements` may be 0,
    /// in which case the element lvalue must not be dereferenced.
    pub fn alloc_array(
        &mut self,
        expr: ExprRef,
        element_type: TypeId,
        num_elements: u32,
        ast: &Ast,
        types: &mut TypeStore,
    ) -> ValueRef {
        assert!(
            matches!(ast.expr(expr).kind, ExprKind::TupleShuffle { .. }),
            "alloc-array arises from tuple-shuffle lowering"
        );

        let first_element = types.lvalue_of(element_type);
        let ty = types.tuple_of(vec![TypingConstants::ObjectPtr, first_element]);

        let data = InstData::AllocArray {
            element_type,
            num_elements,
        };

        self.create(data, ty, Location::Expr(expr))
    }

    /// Apply `args` to the callable `callee`; produces the callee's return
    /// type.
    pub fn apply(
        &mut self,
        expr: ExprRef,
        callee: ValueRef,
        args: Vec<ValueRef>,
        ast: &Ast,
        types: &TypeStore,
    ) -> ValueRef {
        assert!(
            matches!(ast.expr(expr).kind, ExprKind::Apply { .. }),
            "apply requires a call expression"
        );

        let ty = types
            .return_type_of(self.inst(callee).ty())
            .expect("apply of a non-callable value");

        let data = InstData::Apply {
            callee,
            args: args.into_boxed_slice(),
        };

        self.create(data, ty, Location::Expr(expr))
    }

    /// Reference a constant declaration, evaluating to its value.
    pub fn constant_ref(&mut self, expr: ExprRef, ast: &Ast) -> ValueRef {
        let decl = ast
            .expr(expr)
            .as_decl_ref()
            .expect("constant-ref requires a declaration reference expression");

        assert!(
            ast.decl(decl).is_constant(),
            "constant-ref of a non-constant declaration"
        );

        self.create(InstData::ConstantRef, ast.expr_type(expr), Location::Expr(expr))
    }

    /// The default value of a variable declared without an initializer.
    pub fn zero_value(&mut self, decl: DeclRef, ast: &Ast) -> ValueRef {
        self.create(InstData::ZeroValue, ast.decl(decl).ty, Location::Decl(decl))
    }

    pub fn integer_literal(&mut self, expr: ExprRef, ast: &Ast) -> ValueRef {
        assert!(
            ast.expr(expr).as_int_lit().is_some(),
            "int-literal requires an integer literal expression"
        );

        self.create(InstData::IntegerLiteral, ast.expr_type(expr), Location::Expr(expr))
    }

    pub fn float_literal(&mut self, expr: ExprRef, ast: &Ast) -> ValueRef {
        assert!(
            ast.expr(expr).as_float_lit().is_some(),
            "float-literal requires a float literal expression"
        );

        self.create(InstData::FloatLiteral, ast.expr_type(expr), Location::Expr(expr))
    }

    pub fn character_literal(&mut self, expr: ExprRef, ast: &Ast) -> ValueRef {
        assert!(
            ast.expr(expr).as_char_lit().is_some(),
            "char-literal requires a character literal expression"
        );

        self.create(InstData::CharacterLiteral, ast.expr_type(expr), Location::Expr(expr))
    }

    pub fn string_literal(&mut self, expr: ExprRef, ast: &Ast) -> ValueRef {
        assert!(
            ast.expr(expr).as_str_lit().is_some(),
            "str-literal requires a string literal expression"
        );

        self.create(InstData::StringLiteral, ast.expr_type(expr), Location::Expr(expr))
    }

    /// Read through the lvalue `lvalue`; produces its pointee type.
    pub fn load(&mut self, expr: ExprRef, lvalue: ValueRef, ast: &Ast, types: &TypeStore) -> ValueRef {
        assert!(
            matches!(ast.expr(expr).kind, ExprKind::Load { .. }),
            "load requires a load expression"
        );

        let ty = ast.expr_type(expr);

        assert_eq!(
            types.pointee_of(self.inst(lvalue).ty()),
            Some(ty),
            "load operand must be an lvalue of the loaded type"
        );

        self.create(InstData::Load { lvalue }, ty, Location::Expr(expr))
    }

    fn store_impl(
        &mut self,
        loc: Location,
        src: ValueRef,
        dest: ValueRef,
        is_initialization: bool,
        types: &TypeStore,
    ) -> ValueRef {
        assert_eq!(
            types.pointee_of(self.inst(dest).ty()),
            Some(self.inst(src).ty()),
            "store destination must be an lvalue of the stored type"
        );

        let data = InstData::Store {
            src,
            dest,
            is_initialization,
        };

        self.create(data, TypingConstants::Unit, loc)
    }

    /// Store lowered from an assignment statement. The prior value at the
    /// destination is implicitly destroyed.
    pub fn store_assign(
        &mut self,
        stmt: StmtRef,
        src: ValueRef,
        dest: ValueRef,
        ast: &Ast,
        types: &TypeStore,
    ) -> ValueRef {
        assert!(
            matches!(ast.stmt(stmt).kind, StmtKind::Assign { .. }),
            "store-assign requires an assignment statement"
        );

        self.store_impl(Location::Stmt(stmt), src, dest, false, types)
    }

    /// Initialization-style store of a variable's initial value; the
    /// destination is known to be uninitialized.
    pub fn store_var_init(
        &mut self,
        decl: DeclRef,
        src: ValueRef,
        dest: ValueRef,
        types: &TypeStore,
    ) -> ValueRef {
        self.store_impl(Location::Decl(decl), src, dest, true, types)
    }

    /// Initialization-style store into a freshly materialized temporary.
    pub fn store_materialize(
        &mut self,
        expr: ExprRef,
        src: ValueRef,
        dest: ValueRef,
        ast: &Ast,
        types: &TypeStore,
    ) -> ValueRef {
        assert!(
            matches!(ast.expr(expr).kind, ExprKind::Materialize { .. }),
            "store-materialize requires a materialization expression"
        );

        self.store_impl(Location::Expr(expr), src, dest, true, types)
    }

    /// Initialization-style store into storage produced by tuple-shuffle
    /// lowering.
    pub fn store_shuffle(
        &mut self,
        expr: ExprRef,
        src: ValueRef,
        dest: ValueRef,
        ast: &Ast,
        types: &TypeStore,
    ) -> ValueRef {
        assert!(
            matches!(ast.expr(expr).kind, ExprKind::TupleShuffle { .. }),
            "store-shuffle requires a tuple-shuffle expression"
        );

        self.store_impl(Location::Expr(expr), src, dest, true, types)
    }

    /// Change the type of `operand` without affecting how it codegens.
    pub fn type_conversion(&mut self, expr: ExprRef, operand: ValueRef, ast: &Ast) -> ValueRef {
        assert!(
            matches!(ast.expr(expr).kind, ExprKind::Convert { .. }),
            "convert requires an implicit conversion expression"
        );

        self.create(InstData::TypeConversion { operand }, ast.expr_type(expr), Location::Expr(expr))
    }

    /// Construct a tuple from `elements`; produces the tuple of the element
    /// types. The backing expression is either a tuple expression or a
    /// tuple shuffle.
    pub fn tuple(
        &mut self,
        expr: ExprRef,
        elements: Vec<ValueRef>,
        ast: &Ast,
        types: &mut TypeStore,
    ) -> ValueRef {
        assert!(
            matches!(
                ast.expr(expr).kind,
                ExprKind::Tuple { .. } | ExprKind::TupleShuffle { .. }
            ),
            "tuple requires a tuple or tuple-shuffle expression"
        );

        let members = elements.iter().map(|e| self.inst(*e).ty()).collect();
        let ty = types.tuple_of(members);

        let data = InstData::Tuple {
            elements: elements.into_boxed_slice(),
        };

        self.create(data, ty, Location::Expr(expr))
    }

    /// Produce an instance of the metatype queried by a type-of expression.
    pub fn type_of(&mut self, expr: ExprRef, ast: &Ast, types: &mut TypeStore) -> ValueRef {
        let instance_ty = match ast.expr(expr).kind {
            ExprKind::TypeOf { instance_ty } => instance_ty,
            ref other => panic!("type-of requires a type-of expression, found {:?}", other),
        };

        let ty = types.metatype_of(instance_ty);

        self.create(InstData::TypeOf, ty, Location::Expr(expr))
    }

    /// Promote a scalar to the tuple shape given by the backing expression.
    pub fn scalar_to_tuple(
        &mut self,
        expr: ExprRef,
        operand: ValueRef,
        ast: &Ast,
        types: &TypeStore,
    ) -> ValueRef {
        assert!(
            matches!(ast.expr(expr).kind, ExprKind::ScalarToTuple { .. }),
            "scalar-to-tuple requires a scalar-to-tuple expression"
        );

        let ty = ast.expr_type(expr);

        assert!(
            types.tuple_members(ty).is_some(),
            "scalar-to-tuple must produce a tuple type"
        );

        self.create(InstData::ScalarToTuple { operand }, ty, Location::Expr(expr))
    }

    /// Extract field `field` from the tuple-typed `operand`.
    pub fn tuple_element(
        &mut self,
        expr: ExprRef,
        operand: ValueRef,
        field: u32,
        ast: &Ast,
        types: &TypeStore,
    ) -> ValueRef {
        assert!(
            matches!(ast.expr(expr).kind, ExprKind::TupleElement { .. }),
            "tuple-element requires a tuple-element expression"
        );

        let ty = self.tuple_field_type(operand, field, types);

        self.create(InstData::TupleElement { operand, field }, ty, Location::Expr(expr))
    }

    /// Implicitly generated form of [`Cfg::tuple_element`] with an explicit
    /// result type and no AST backing.
    pub fn tuple_element_raw(
        &mut self,
        result_ty: TypeId,
        operand: ValueRef,
        field: u32,
        types: &TypeStore,
    ) -> ValueRef {
        let ty = self.tuple_field_type(operand, field, types);

        assert_eq!(ty, result_ty, "tuple field type mismatch");

        self.create(InstData::TupleElement { operand, field }, ty, Location::Synthetic)
    }

    fn tuple_field_type(&self, operand: ValueRef, field: u32, types: &TypeStore) -> TypeId {
        let members = types
            .tuple_members(self.inst(operand).ty())
            .expect("tuple-element of a non-tuple value");

        match members.get(field as usize) {
            Some(ty) => *ty,
            None => panic!(
                "tuple field {} out of range for arity {}",
                field,
                members.len()
            ),
        }
    }

    /// Stride over the lvalue `operand` by `index` elements; produces the
    /// same lvalue type.
    pub fn index_lvalue(
        &mut self,
        expr: ExprRef,
        operand: ValueRef,
        index: u32,
        ast: &Ast,
        types: &TypeStore,
    ) -> ValueRef {
        assert!(
            matches!(ast.expr(expr).kind, ExprKind::TupleShuffle { .. }),
            "index-lvalue arises from tuple-shuffle lowering"
        );

        let ty = self.inst(operand).ty();

        assert!(types.is_lvalue(ty), "index-lvalue operand must be an lvalue");

        self.create(InstData::IndexLValue { operand, index }, ty, Location::Expr(expr))
    }

    /// A position which would be undefined to reach. Always implicitly
    /// generated, e.g. after a diverging call or exhaustive control flow.
    pub fn unreachable(&mut self) -> ValueRef {
        self.create(InstData::Unreachable, TypingConstants::Never, Location::Synthetic)
    }

    /// Return `value` from the current function.
    pub fn ret(&mut self, stmt: StmtRef, value: ValueRef, ast: &Ast) -> ValueRef {
        assert!(
            matches!(ast.stmt(stmt).kind, StmtKind::Return { .. }),
            "return requires a return statement"
        );

        self.create(InstData::Return { value }, TypingConstants::Never, Location::Stmt(stmt))
    }

    /// Branch unconditionally to `dest`.
    pub fn branch(&mut self, dest: BlockRef) -> ValueRef {
        assert!(self.blocks.get(dest).is_some(), "branch to a foreign block");

        let data = InstData::Branch {
            dest,
            args: Box::new([]),
        };

        self.create(data, TypingConstants::Never, Location::Synthetic)
    }

    /// Branch to `true_block` or `false_block` on the boolean `condition`.
    /// The two targets may be the same block.
    pub fn cond_branch(
        &mut self,
        stmt: StmtRef,
        condition: ValueRef,
        true_block: BlockRef,
        false_block: BlockRef,
        types: &TypeStore,
    ) -> ValueRef {
        assert!(
            types.is_bool(self.inst(condition).ty()),
            "cond-branch condition must be boolean"
        );

        assert!(
            self.blocks.get(true_block).is_some() && self.blocks.get(false_block).is_some(),
            "cond-branch to a foreign block"
        );

        let data = InstData::CondBranch {
            condition,
            targets: [true_block, false_block],
        };

        self.create(data, TypingConstants::Never, Location::Stmt(stmt))
    }

    /// Rewire an existing conditional branch.
    pub fn set_cond_branch_targets(
        &mut self,
        value: ValueRef,
        true_block: BlockRef,
        false_block: BlockRef,
    ) {
        assert!(
            self.blocks.get(true_block).is_some() && self.blocks.get(false_block).is_some(),
            "cond-branch to a foreign block"
        );

        match self.insts.get_mut(value).expect("dangling ValueRef").data_mut() {
            InstData::CondBranch { targets, .. } => *targets = [true_block, false_block],
            other => panic!("expected a cond-branch, found {}", other),
        }
    }

    // -- block membership
    //
    // The parent back-reference is maintained here and nowhere else.

    /// Append a detached instruction to an open block.
    pub fn append(&mut self, block: BlockRef, value: ValueRef) {
        assert!(!self.is_closed(block), "append to a closed block");

        let inst = self.insts.get_mut(value).expect("dangling ValueRef");

        assert!(
            inst.parent().is_none(),
            "append of an already-attached instruction"
        );

        inst.set_parent(Some(block));
        self.blocks.get_mut(block).expect("dangling BlockRef").push(value);

        tracing::trace!("[Cfg::append] {} -> {}", value, block);
    }

    /// Unlink `value` from its containing block without destroying it.
    pub fn remove_from_parent(&mut self, value: ValueRef) {
        let parent = self
            .inst(value)
            .parent()
            .expect("instruction is already detached");

        self.blocks.get_mut(parent).unwrap().remove(value);
        self.insts.get_mut(value).unwrap().set_parent(None);

        tracing::trace!("[Cfg::remove_from_parent] {} from {}", value, parent);
    }

    /// Unlink `value` from its containing block and return its storage to
    /// the arena.
    ///
    /// No attached instruction may still reference `value`; this is checked
    /// in debug builds only.
    pub fn erase_from_parent(&mut self, value: ValueRef) {
        debug_assert!(
            !self.has_attached_uses(value),
            "erase of a still-referenced instruction"
        );

        self.remove_from_parent(value);
        self.insts.remove(value);

        tracing::trace!("[Cfg::erase_from_parent] {}", value);
    }

    fn has_attached_uses(&self, value: ValueRef) -> bool {
        self.insts.iter().any(|(_, inst)| {
            inst.parent().is_some() && inst.data().operands().contains(&value)
        })
    }

    /// Re-parent the half-open instruction range `range` of `from` onto the
    /// end of `to` in one pass, preserving order. Observers never see the
    /// moved instructions detached.
    pub fn transfer(&mut self, from: BlockRef, range: Range<usize>, to: BlockRef) {
        assert_ne!(from, to, "transfer within one block");
        assert!(
            range.is_empty() || !self.is_closed(to),
            "transfer into a closed block"
        );

        let moved = self.blocks.get_mut(from).expect("dangling BlockRef").drain(range);

        for value in moved.iter() {
            self.insts.get_mut(*value).unwrap().set_parent(Some(to));
        }

        tracing::trace!("[Cfg::transfer] {} insts {} -> {}", moved.len(), from, to);

        self.blocks.get_mut(to).expect("dangling BlockRef").extend(moved);
    }

    /// Render every block and its instructions.
    pub fn dump(&self) -> String {
        let mut out = String::new();

        for (block, data) in self.blocks() {
            let _ = writeln!(out, "{}:", block);

            for value in data.instructions() {
                let _ = writeln!(out, "  {} = {}", value, self.inst(*value).data());
            }
        }

        out
    }
}
