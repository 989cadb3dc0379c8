use larkc_core::{Span, TypeId};

use crate::{DeclRef, ExprRef};

/// The shape of an expression node.
///
/// Only the kinds the CFG layer lowers are modelled, one variant per
/// instruction-producing syntactic form.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum ExprKind {
    IntLit(i64),

    FloatLit(f64),

    CharLit(char),

    StrLit(String),

    /// A reference to a named declaration.
    DeclRef(DeclRef),

    /// A call of `callee` with `args`.
    Apply {
        callee: ExprRef,
        args: Vec<ExprRef>,
    },

    /// An rvalue read through an lvalue operand.
    Load {
        operand: ExprRef,
    },

    /// An rvalue-to-lvalue materialization, backed by a temporary.
    Materialize {
        operand: ExprRef,
    },

    /// An implicit conversion that does not change the representation.
    Convert {
        operand: ExprRef,
    },

    Tuple {
        elements: Vec<ExprRef>,
    },

    /// A tuple reordered/defaulted into another tuple shape; `mapping[i]`
    /// names the operand field feeding result field `i`.
    TupleShuffle {
        operand: ExprRef,
        mapping: Vec<u32>,
    },

    /// Extraction of a numbered field from a tuple-typed operand.
    TupleElement {
        operand: ExprRef,
        field: u32,
    },

    /// Promotion of a scalar to a one-field (or defaulted) tuple.
    ScalarToTuple {
        operand: ExprRef,
    },

    /// A static metatype query of `instance_ty`.
    TypeOf {
        instance_ty: TypeId,
    },
}

/// An expression node, typed by the front end.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ExprData {
    pub kind: ExprKind,
    pub ty: TypeId,
    pub span: Span,
}

impl ExprData {
    pub fn as_int_lit(&self) -> Option<i64> {
        match self.kind {
            ExprKind::IntLit(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_float_lit(&self) -> Option<f64> {
        match self.kind {
            ExprKind::FloatLit(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_char_lit(&self) -> Option<char> {
        match self.kind {
            ExprKind::CharLit(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_str_lit(&self) -> Option<&str> {
        match &self.kind {
            ExprKind::StrLit(st) => Some(st.as_str()),
            _ => None,
        }
    }

    pub fn as_decl_ref(&self) -> Option<DeclRef> {
        match self.kind {
            ExprKind::DeclRef(dref) => Some(dref),
            _ => None,
        }
    }
}
