use larkc_core::Span;

use crate::ExprRef;

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum StmtKind {
    /// `target = value`
    Assign {
        target: ExprRef,
        value: ExprRef,
    },

    /// `return value` — a bare `return` carries an explicit unit expression.
    Return {
        value: ExprRef,
    },

    If {
        test: ExprRef,
    },

    While {
        test: ExprRef,
    },
}

/// A statement node.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct StmtData {
    pub kind: StmtKind,
    pub span: Span,
}
