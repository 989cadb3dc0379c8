//! The typed AST consumed by the CFG layer.
//!
//! The front end has already run by the time these nodes are seen, every
//! expression carries its resolved `TypeId`. The CFG layer holds on to
//! nodes through the cheap `DeclRef`/`ExprRef`/`StmtRef` handles and
//! queries node data lazily, nothing here is cached downstream.

use larkc_core::derive_everything;
use larkc_core::utils::SSAMap;

pub mod decl;
pub mod expr;
pub mod stmt;

pub use decl::{DeclData, DeclKind};
pub use expr::{ExprData, ExprKind};
pub use stmt::{StmtData, StmtKind};

macro_rules! ast_ref {
    ($(#[$meta:meta] $name:ident,)+) => {
        $(
            derive_everything! {
                #[$meta]
                #[derive(serde::Serialize, serde::Deserialize)]
                #[repr(transparent)]
                pub struct $name(pub u32);
            }

            impl TryFrom<$name> for usize {
                type Error = std::num::TryFromIntError;

                fn try_from($name(n): $name) -> Result<Self, Self::Error> {
                    n.try_into()
                }
            }

            impl TryFrom<usize> for $name {
                type Error = std::num::TryFromIntError;

                fn try_from(n: usize) -> Result<Self, Self::Error> {
                    Ok(Self(n.try_into()?))
                }
            }
        )+
    };
}

ast_ref! {
    /// A cheap reference to a declaration node.
    DeclRef,
    /// A cheap reference to an expression node.
    ExprRef,
    /// A cheap reference to a statement node.
    StmtRef,
}

/// The store owning every AST node of one translation unit.
///
/// Nodes are only ever added, a ref stays valid for the store's lifetime.
#[derive(Debug, Default)]
pub struct Ast {
    decls: SSAMap<DeclRef, DeclData>,
    exprs: SSAMap<ExprRef, ExprData>,
    stmts: SSAMap<StmtRef, StmtData>,
}

impl Ast {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_decl(&mut self, decl: DeclData) -> DeclRef {
        self.decls.insert(decl)
    }

    pub fn add_expr(&mut self, expr: ExprData) -> ExprRef {
        self.exprs.insert(expr)
    }

    pub fn add_stmt(&mut self, stmt: StmtData) -> StmtRef {
        self.stmts.insert(stmt)
    }

    /// Panics when `dref` does not belong to this store.
    pub fn decl(&self, dref: DeclRef) -> &DeclData {
        self.decls.get(dref).expect("dangling DeclRef")
    }

    /// Panics when `eref` does not belong to this store.
    pub fn expr(&self, eref: ExprRef) -> &ExprData {
        self.exprs.get(eref).expect("dangling ExprRef")
    }

    /// Panics when `sref` does not belong to this store.
    pub fn stmt(&self, sref: StmtRef) -> &StmtData {
        self.stmts.get(sref).expect("dangling StmtRef")
    }

    /// The resolved type of an expression node.
    pub fn expr_type(&self, eref: ExprRef) -> larkc_core::TypeId {
        self.expr(eref).ty
    }
}
