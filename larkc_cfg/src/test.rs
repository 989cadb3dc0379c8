use larkc_ast::{Ast, DeclData, DeclKind, DeclRef, ExprData, ExprKind, ExprRef, StmtData, StmtKind, StmtRef};
use larkc_core::{TypeId, TypeStore, TypingConstants, ValueRef};

use crate::cfg::Cfg;
use crate::kind::ValueKind;
use crate::verify::verify;

/// A tiny pre-typed program fragment to lower instructions from.
struct Fixture {
    ast: Ast,
    types: TypeStore,
    names: u32,
}

impl Fixture {
    fn new() -> Self {
        Self {
            ast: Ast::new(),
            types: TypeStore::new(),
            names: 0,
        }
    }

    fn fresh_name(&mut self) -> larkc_core::SpanRef {
        let n = self.names;
        self.names += 1;

        n.into()
    }

    fn expr(&mut self, kind: ExprKind, ty: TypeId) -> ExprRef {
        self.ast.add_expr(ExprData { kind, ty, span: 0..0 })
    }

    fn stmt(&mut self, kind: StmtKind) -> StmtRef {
        self.ast.add_stmt(StmtData { kind, span: 0..0 })
    }

    fn decl(&mut self, kind: DeclKind, ty: TypeId) -> DeclRef {
        let name = self.fresh_name();

        self.ast.add_decl(DeclData {
            name,
            ty,
            kind,
            span: 0..0,
        })
    }

    fn int_lit(&mut self, n: i64) -> ExprRef {
        self.expr(ExprKind::IntLit(n), TypingConstants::Int)
    }

    fn float_lit(&mut self, n: f64) -> ExprRef {
        self.expr(ExprKind::FloatLit(n), TypingConstants::Float)
    }

    fn decl_ref(&mut self, decl: DeclRef) -> ExprRef {
        let ty = self.ast.decl(decl).ty;

        self.expr(ExprKind::DeclRef(decl), ty)
    }

    fn materialize(&mut self, operand: ExprRef) -> ExprRef {
        let ty = self.ast.expr_type(operand);
        let lv = self.types.lvalue_of(ty);

        self.expr(ExprKind::Materialize { operand }, lv)
    }

    /// A boolean condition value: a reference to a constant `Bool` binding.
    fn bool_cond(&mut self, cfg: &mut Cfg) -> ValueRef {
        let decl = self.decl(DeclKind::Constant, TypingConstants::Bool);
        let dref = self.decl_ref(decl);

        cfg.constant_ref(dref, &self.ast)
    }

    /// The `E / T / F / M` diamond of the conditional-lowering shape;
    /// returns the blocks and `T`'s branch terminator.
    fn diamond(&mut self, cfg: &mut Cfg) -> ([larkc_core::BlockRef; 4], ValueRef) {
        let e = cfg.new_block();
        let t = cfg.new_block();
        let f = cfg.new_block();
        let m = cfg.new_block();

        let cond = self.bool_cond(cfg);
        cfg.append(e, cond);

        let test = self.decl_ref(self.ast_last_decl());
        let if_stmt = self.stmt(StmtKind::If { test });

        let cb = cfg.cond_branch(if_stmt, cond, t, f, &self.types);
        cfg.append(e, cb);

        let t_br = cfg.branch(m);
        cfg.append(t, t_br);

        let f_br = cfg.branch(m);
        cfg.append(f, f_br);

        let rv_expr = self.int_lit(1);
        let rv = cfg.integer_literal(rv_expr, &self.ast);
        cfg.append(m, rv);

        let ret_stmt = self.stmt(StmtKind::Return { value: rv_expr });
        let ret = cfg.ret(ret_stmt, rv, &self.ast);
        cfg.append(m, ret);

        ([e, t, f, m], t_br)
    }

    fn ast_last_decl(&self) -> DeclRef {
        DeclRef(self.names - 1)
    }
}

#[test]
fn s1_empty_function() {
    let mut cfg = Cfg::new();

    let bb = cfg.new_block();
    let unreachable = cfg.unreachable();
    cfg.append(bb, unreachable);

    assert_eq!(cfg.blocks().count(), 1);
    assert_eq!(cfg.block(bb).len(), 1);
    assert_eq!(cfg.inst(unreachable).kind(), ValueKind::Unreachable);
    assert!(cfg.inst(unreachable).successors().is_empty());
    assert!(cfg.is_closed(bb));
    assert_eq!(cfg.entry(), Some(bb));

    verify(&cfg).unwrap();
}

#[test]
fn s2_return_of_integer_literal() {
    let mut fx = Fixture::new();
    let mut cfg = Cfg::new();

    let bb = cfg.new_block();

    let lit = fx.int_lit(42);
    let v0 = cfg.integer_literal(lit, &fx.ast);
    cfg.append(bb, v0);

    let ret_stmt = fx.stmt(StmtKind::Return { value: lit });
    let ret = cfg.ret(ret_stmt, v0, &fx.ast);
    cfg.append(bb, ret);

    assert_eq!(cfg.block(bb).len(), 2);
    assert_eq!(cfg.inst(ret).data().as_return(), Some(v0));
    assert!(cfg.inst(ret).successors().is_empty());
    assert!(cfg.is_closed(bb));

    assert_eq!(cfg.inst(v0).int_value(&fx.ast), Some(42));
    assert_eq!(cfg.inst(v0).ty(), TypingConstants::Int);

    verify(&cfg).unwrap();
}

#[test]
fn s3_conditional_diamond() {
    let mut fx = Fixture::new();
    let mut cfg = Cfg::new();

    let ([e, t, f, m], _) = fx.diamond(&mut cfg);

    assert_eq!(cfg.successors_of(e), &[t, f]);
    assert_eq!(cfg.successors_of(t), &[m]);
    assert_eq!(cfg.successors_of(f), &[m]);
    assert_eq!(cfg.successors_of(m), &[]);

    for block in [e, t, f, m] {
        assert!(cfg.is_closed(block));
    }

    verify(&cfg).unwrap();

    let graph = crate::graph::block_graph(&cfg);
    assert_eq!(graph.node_count(), 4);
    assert_eq!(graph.edge_count(), 4);
}

#[test]
fn s4_variable_initialization() {
    let mut fx = Fixture::new();
    let mut cfg = Cfg::new();

    let bb = cfg.new_block();

    let v = fx.decl(DeclKind::Var, TypingConstants::Int);
    let a = cfg.alloc_var(v, &fx.ast, &mut fx.types);
    cfg.append(bb, a);

    let zero = fx.int_lit(0);
    let v1 = cfg.integer_literal(zero, &fx.ast);
    cfg.append(bb, v1);

    let store = cfg.store_var_init(v, v1, a, &fx.types);
    cfg.append(bb, store);

    let (src, dest, is_init) = cfg.inst(store).data().as_store().unwrap();
    assert_eq!((src, dest), (v1, a));
    assert!(is_init);

    assert_eq!(cfg.inst(store).ty(), TypingConstants::Unit);
    assert_eq!(fx.types.pointee_of(cfg.inst(a).ty()), Some(TypingConstants::Int));
    assert_eq!(cfg.inst(v1).ty(), TypingConstants::Int);

    assert!(cfg.inst(a).is_allocation());
    assert_eq!(cfg.inst(a).alloc_decl(), Some(v));
}

#[test]
fn s5_tuple_extract() {
    let mut fx = Fixture::new();
    let mut cfg = Cfg::new();

    let bb = cfg.new_block();

    let xe = fx.int_lit(1);
    let ye = fx.float_lit(2.0);

    let x = cfg.integer_literal(xe, &fx.ast);
    let y = cfg.float_literal(ye, &fx.ast);
    cfg.append(bb, x);
    cfg.append(bb, y);

    let te = fx.expr(
        ExprKind::Tuple {
            elements: vec![xe, ye],
        },
        TypingConstants::Int, // the factory recomputes the tuple type
    );

    let t = cfg.tuple(te, vec![x, y], &fx.ast, &mut fx.types);
    cfg.append(bb, t);

    let e0 = fx.expr(
        ExprKind::TupleElement { operand: te, field: 0 },
        TypingConstants::Int,
    );
    let e1 = fx.expr(
        ExprKind::TupleElement { operand: te, field: 1 },
        TypingConstants::Float,
    );

    let v0 = cfg.tuple_element(e0, t, 0, &fx.ast, &fx.types);
    let v1 = cfg.tuple_element(e1, t, 1, &fx.ast, &fx.types);
    cfg.append(bb, v0);
    cfg.append(bb, v1);

    assert_eq!(cfg.inst(v0).ty(), cfg.inst(x).ty());
    assert_eq!(cfg.inst(v1).ty(), cfg.inst(y).ty());

    assert_eq!(cfg.inst(v0).data().as_tuple_element(), Some((t, 0)));
    assert_eq!(cfg.inst(v1).data().as_tuple_element(), Some((t, 1)));
    assert_eq!(cfg.inst(t).data().as_tuple(), Some(&[x, y][..]));
}

#[test]
fn s6_erase_and_rewire() {
    let mut fx = Fixture::new();
    let mut cfg = Cfg::new();

    let ([e, t, f, m], t_br) = fx.diamond(&mut cfg);

    cfg.erase_from_parent(t_br);
    assert!(cfg.try_inst(t_br).is_none());
    assert!(!cfg.is_closed(t));

    let m2 = cfg.new_block();
    let unreachable = cfg.unreachable();
    cfg.append(m2, unreachable);

    let new_br = cfg.branch(m2);
    cfg.append(t, new_br);

    assert_eq!(cfg.successors_of(t), &[m2]);
    assert_eq!(cfg.successors_of(f), &[m]);

    // rewire the conditional in place as well, swapping its targets.
    let e_term = cfg.terminator_of(e).unwrap();
    cfg.set_cond_branch_targets(e_term, f, t);
    assert_eq!(cfg.successors_of(e), &[f, t]);

    verify(&cfg).unwrap();
}

#[test]
fn parent_consistency() {
    let mut fx = Fixture::new();
    let mut cfg = Cfg::new();

    let bb = cfg.new_block();

    let lit = fx.int_lit(3);
    let v = cfg.integer_literal(lit, &fx.ast);

    assert_eq!(cfg.inst(v).parent(), None);

    cfg.append(bb, v);
    assert_eq!(cfg.inst(v).parent(), Some(bb));
    assert!(cfg.block(bb).contains(v));

    cfg.remove_from_parent(v);
    assert_eq!(cfg.inst(v).parent(), None);
    assert!(!cfg.block(bb).contains(v));

    // removal does not destroy, the value is still owned by the context.
    assert!(cfg.try_inst(v).is_some());
}

#[test]
fn transfer_preserves_order_and_parents() {
    let mut fx = Fixture::new();
    let mut cfg = Cfg::new();

    let b1 = cfg.new_block();
    let b2 = cfg.new_block();

    let values: Vec<ValueRef> = (0..3)
        .map(|n| {
            let lit = fx.int_lit(n);
            let v = cfg.integer_literal(lit, &fx.ast);
            cfg.append(b1, v);
            v
        })
        .collect();

    cfg.transfer(b1, 1..3, b2);

    assert_eq!(cfg.block(b1).instructions(), &values[..1]);
    assert_eq!(cfg.block(b2).instructions(), &values[1..]);

    for v in &values[1..] {
        assert_eq!(cfg.inst(*v).parent(), Some(b2));
    }

    assert_eq!(cfg.inst(values[0]).parent(), Some(b1));
}

#[test]
fn apply_trailing_storage() {
    let mut fx = Fixture::new();
    let mut cfg = Cfg::new();

    let bb = cfg.new_block();

    let fn_ty = fx.types.callable_of(
        vec![TypingConstants::Int, TypingConstants::Int, TypingConstants::Int],
        TypingConstants::Bool,
    );

    let callee_decl = fx.decl(DeclKind::Constant, fn_ty);
    let callee_expr = fx.decl_ref(callee_decl);
    let callee = cfg.constant_ref(callee_expr, &fx.ast);
    cfg.append(bb, callee);

    let arg_exprs: Vec<ExprRef> = (0..3).map(|n| fx.int_lit(n)).collect();
    let args: Vec<ValueRef> = arg_exprs
        .iter()
        .map(|e| {
            let v = cfg.integer_literal(*e, &fx.ast);
            cfg.append(bb, v);
            v
        })
        .collect();

    let call_expr = fx.expr(
        ExprKind::Apply {
            callee: callee_expr,
            args: arg_exprs,
        },
        TypingConstants::Bool,
    );

    let call = cfg.apply(call_expr, callee, args.clone(), &fx.ast, &fx.types);
    cfg.append(bb, call);

    let (c, stored) = cfg.inst(call).data().as_apply().unwrap();
    assert_eq!(c, callee);
    assert_eq!(stored, args.as_slice());
    assert_eq!(stored.len(), 3);

    assert_eq!(cfg.inst(call).ty(), TypingConstants::Bool);
    assert_eq!(cfg.inst(callee).constant_decl(&fx.ast), Some(callee_decl));
}

#[test]
fn store_constructor_selects_initialization() {
    let mut fx = Fixture::new();
    let mut cfg = Cfg::new();

    let bb = cfg.new_block();

    let v = fx.decl(DeclKind::Var, TypingConstants::Int);
    let slot = cfg.alloc_var(v, &fx.ast, &mut fx.types);
    cfg.append(bb, slot);

    let lit = fx.int_lit(9);
    let value = cfg.integer_literal(lit, &fx.ast);
    cfg.append(bb, value);

    let target = fx.decl_ref(v);
    let assign = fx.stmt(StmtKind::Assign { target, value: lit });

    let store = cfg.store_assign(assign, value, slot, &fx.ast, &fx.types);
    cfg.append(bb, store);

    let (_, _, is_init) = cfg.inst(store).data().as_store().unwrap();
    assert!(!is_init);
    assert_eq!(cfg.inst(store).ty(), TypingConstants::Unit);
    assert_eq!(cfg.inst(store).loc_stmt(), Some(assign));
}

#[test]
fn materialization_and_load() {
    let mut fx = Fixture::new();
    let mut cfg = Cfg::new();

    let bb = cfg.new_block();

    let lit = fx.int_lit(5);
    let value = cfg.integer_literal(lit, &fx.ast);
    cfg.append(bb, value);

    let mat = fx.materialize(lit);
    let tmp = cfg.alloc_tmp(mat, &fx.ast, &fx.types);
    cfg.append(bb, tmp);

    // the materialized temporary is initialized by an init-style store.
    let store = cfg.store_materialize(mat, value, tmp, &fx.ast, &fx.types);
    cfg.append(bb, store);

    let (_, _, is_init) = cfg.inst(store).data().as_store().unwrap();
    assert!(is_init);

    let load_expr = fx.expr(ExprKind::Load { operand: mat }, TypingConstants::Int);
    let loaded = cfg.load(load_expr, tmp, &fx.ast, &fx.types);
    cfg.append(bb, loaded);

    assert_eq!(cfg.inst(loaded).ty(), TypingConstants::Int);
    assert_eq!(cfg.inst(loaded).data().as_load(), Some(tmp));
    assert_eq!(
        fx.types.pointee_of(cfg.inst(tmp).ty()),
        Some(cfg.inst(loaded).ty())
    );
}

#[test]
fn array_allocation() {
    let mut fx = Fixture::new();
    let mut cfg = Cfg::new();

    let bb = cfg.new_block();

    let lit = fx.int_lit(7);
    let seed = cfg.integer_literal(lit, &fx.ast);
    cfg.append(bb, seed);

    let elem_lv = fx.types.lvalue_of(TypingConstants::Int);
    let shuffle_ty = fx
        .types
        .tuple_of(vec![TypingConstants::ObjectPtr, elem_lv]);
    let shuffle = fx.expr(
        ExprKind::TupleShuffle {
            operand: lit,
            mapping: vec![0, 0],
        },
        shuffle_ty,
    );

    let arr = cfg.alloc_array(shuffle, TypingConstants::Int, 2, &fx.ast, &mut fx.types);
    cfg.append(bb, arr);

    assert_eq!(
        cfg.inst(arr).data().as_alloc_array(),
        Some((TypingConstants::Int, 2))
    );
    assert_eq!(
        fx.types.tuple_members(cfg.inst(arr).ty()),
        Some(&[TypingConstants::ObjectPtr, elem_lv][..])
    );

    // address the element lvalue out of the returned tuple, stride to the
    // second element and initialize it.
    let first = cfg.tuple_element_raw(elem_lv, arr, 1, &fx.types);
    cfg.append(bb, first);
    assert!(cfg.inst(first).loc().is_synthetic());

    let second = cfg.index_lvalue(shuffle, first, 1, &fx.ast, &fx.types);
    cfg.append(bb, second);
    assert_eq!(cfg.inst(second).ty(), cfg.inst(first).ty());

    let store = cfg.store_shuffle(shuffle, seed, second, &fx.ast, &fx.types);
    cfg.append(bb, store);

    let (_, _, is_init) = cfg.inst(store).data().as_store().unwrap();
    assert!(is_init);

    // zero-length allocations are accepted.
    let empty = cfg.alloc_array(shuffle, TypingConstants::Int, 0, &fx.ast, &mut fx.types);
    cfg.append(bb, empty);
    assert_eq!(
        cfg.inst(empty).data().as_alloc_array(),
        Some((TypingConstants::Int, 0))
    );
}

#[test]
fn conversion_and_scalar_promotion() {
    let mut fx = Fixture::new();
    let mut cfg = Cfg::new();

    let bb = cfg.new_block();

    let lit = fx.int_lit(1);
    let value = cfg.integer_literal(lit, &fx.ast);
    cfg.append(bb, value);

    // a representation-preserving type change.
    let conv_expr = fx.expr(ExprKind::Convert { operand: lit }, TypingConstants::Bool);
    let conv = cfg.type_conversion(conv_expr, value, &fx.ast);
    cfg.append(bb, conv);

    assert_eq!(cfg.inst(conv).ty(), TypingConstants::Bool);
    assert_ne!(cfg.inst(conv).ty(), cfg.inst(value).ty());

    // promotion of a scalar into a one-field tuple.
    let one_field = fx.types.tuple_of(vec![TypingConstants::Int]);
    let promote_expr = fx.expr(ExprKind::ScalarToTuple { operand: lit }, one_field);
    let promoted = cfg.scalar_to_tuple(promote_expr, value, &fx.ast, &fx.types);
    cfg.append(bb, promoted);

    assert_eq!(fx.types.tuple_members(cfg.inst(promoted).ty()), Some(&[TypingConstants::Int][..]));

    // a metatype value for a static type.
    let meta_expr = {
        let ty = fx.types.metatype_of(TypingConstants::Int);
        fx.expr(
            ExprKind::TypeOf {
                instance_ty: TypingConstants::Int,
            },
            ty,
        )
    };
    let meta = cfg.type_of(meta_expr, &fx.ast, &mut fx.types);
    cfg.append(bb, meta);

    assert_eq!(cfg.inst(meta).ty(), fx.types.metatype_of(TypingConstants::Int));

    // the default value of an uninitialized variable.
    let v = fx.decl(DeclKind::Var, TypingConstants::Float);
    let zero = cfg.zero_value(v, &fx.ast);
    cfg.append(bb, zero);

    assert_eq!(cfg.inst(zero).ty(), TypingConstants::Float);
    assert_eq!(cfg.inst(zero).alloc_decl(), Some(v));
}

#[test]
fn literals_recover_ast_values() {
    let mut fx = Fixture::new();
    let mut cfg = Cfg::new();

    let bb = cfg.new_block();

    let fe = fx.float_lit(1.5);
    let fv = cfg.float_literal(fe, &fx.ast);
    cfg.append(bb, fv);

    let ce = fx.expr(ExprKind::CharLit('λ'), TypingConstants::Char);
    let cv = cfg.character_literal(ce, &fx.ast);
    cfg.append(bb, cv);

    let se = fx.expr(ExprKind::StrLit("lark".to_string()), TypingConstants::Str);
    let sv = cfg.string_literal(se, &fx.ast);
    cfg.append(bb, sv);

    assert_eq!(cfg.inst(fv).float_value(&fx.ast), Some(1.5));
    assert_eq!(cfg.inst(cv).char_value(&fx.ast), Some('λ'));
    assert_eq!(cfg.inst(sv).str_value(&fx.ast), Some("lark"));

    // wrong-kind accessors are None, not a panic.
    assert_eq!(cfg.inst(fv).int_value(&fx.ast), None);
    assert_eq!(cfg.inst(sv).char_value(&fx.ast), None);
}

#[test]
fn location_roundtrip() {
    let mut fx = Fixture::new();
    let mut cfg = Cfg::new();

    let lit = fx.int_lit(11);
    let v = cfg.integer_literal(lit, &fx.ast);

    assert_eq!(cfg.inst(v).loc_expr(), Some(lit));

    let synthetic = cfg.unreachable();
    assert!(cfg.inst(synthetic).loc().is_synthetic());
    assert_eq!(cfg.inst(synthetic).loc_expr(), None);
}

#[test]
#[should_panic(expected = "expected a statement location")]
fn location_wrong_tag_aborts() {
    let mut fx = Fixture::new();
    let mut cfg = Cfg::new();

    let lit = fx.int_lit(11);
    let v = cfg.integer_literal(lit, &fx.ast);

    let _ = cfg.inst(v).loc_stmt();
}

#[test]
fn verifier_rejects_open_block() {
    let mut fx = Fixture::new();
    let mut cfg = Cfg::new();

    let bb = cfg.new_block();

    let lit = fx.int_lit(0);
    let v = cfg.integer_literal(lit, &fx.ast);
    cfg.append(bb, v);

    assert!(verify(&cfg).is_err());
}

#[test]
#[should_panic(expected = "append to a closed block")]
fn append_after_terminator_aborts() {
    let mut fx = Fixture::new();
    let mut cfg = Cfg::new();

    let bb = cfg.new_block();

    let unreachable = cfg.unreachable();
    cfg.append(bb, unreachable);

    let lit = fx.int_lit(0);
    let v = cfg.integer_literal(lit, &fx.ast);
    cfg.append(bb, v);
}

#[test]
#[should_panic(expected = "erase of a still-referenced instruction")]
fn erase_of_referenced_value_aborts() {
    let mut fx = Fixture::new();
    let mut cfg = Cfg::new();

    let bb = cfg.new_block();

    let lit = fx.int_lit(0);
    let v = cfg.integer_literal(lit, &fx.ast);
    cfg.append(bb, v);

    let ret_stmt = fx.stmt(StmtKind::Return { value: lit });
    let ret = cfg.ret(ret_stmt, v, &fx.ast);
    cfg.append(bb, ret);

    cfg.erase_from_parent(v);
}

#[test]
fn cond_branch_may_target_one_block_twice() {
    let mut fx = Fixture::new();
    let mut cfg = Cfg::new();

    let e = cfg.new_block();
    let j = cfg.new_block();

    let cond = fx.bool_cond(&mut cfg);
    cfg.append(e, cond);

    let test = fx.decl_ref(fx.ast_last_decl());
    let if_stmt = fx.stmt(StmtKind::If { test });

    let cb = cfg.cond_branch(if_stmt, cond, j, j, &fx.types);
    cfg.append(e, cb);

    let unreachable = cfg.unreachable();
    cfg.append(j, unreachable);

    assert_eq!(cfg.successors_of(e), &[j, j]);

    verify(&cfg).unwrap();
}

#[test]
fn dump_renders_blocks() {
    let mut fx = Fixture::new();
    let mut cfg = Cfg::new();

    let bb = cfg.new_block();

    let lit = fx.int_lit(42);
    let v = cfg.integer_literal(lit, &fx.ast);
    cfg.append(bb, v);

    let ret_stmt = fx.stmt(StmtKind::Return { value: lit });
    let ret = cfg.ret(ret_stmt, v, &fx.ast);
    cfg.append(bb, ret);

    let rendered = cfg.dump();

    assert!(rendered.contains("bb0:"));
    assert!(rendered.contains("int-literal"));
    assert!(rendered.contains(&format!("return {}", v)));
}
