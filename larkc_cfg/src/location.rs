use larkc_core::Span;
use larkc_ast::{Ast, DeclRef, ExprRef, StmtRef};

/// A back-reference to the AST node an instruction was lowered from.
///
/// Exactly one of three node categories, or `Synthetic` for implicitly
/// generated instructions. Asking a location for a node of the wrong
/// category is a programmer error and panics; asking a synthetic location
/// for any node returns `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Location {
    Decl(DeclRef),
    Expr(ExprRef),
    Stmt(StmtRef),
    Synthetic,
}

impl Location {
    pub fn is_synthetic(&self) -> bool {
        matches!(self, Self::Synthetic)
    }

    /// The originating declaration, `None` when synthetic.
    ///
    /// Panics when the location holds an expression or statement.
    pub fn decl(&self) -> Option<DeclRef> {
        match self {
            Self::Decl(dref) => Some(*dref),
            Self::Synthetic => None,
            other => panic!("expected a declaration location, found {:?}", other),
        }
    }

    /// The originating expression, `None` when synthetic.
    ///
    /// Panics when the location holds a declaration or statement.
    pub fn expr(&self) -> Option<ExprRef> {
        match self {
            Self::Expr(eref) => Some(*eref),
            Self::Synthetic => None,
            other => panic!("expected an expression location, found {:?}", other),
        }
    }

    /// The originating statement, `None` when synthetic.
    ///
    /// Panics when the location holds a declaration or expression.
    pub fn stmt(&self) -> Option<StmtRef> {
        match self {
            Self::Stmt(sref) => Some(*sref),
            Self::Synthetic => None,
            other => panic!("expected a statement location, found {:?}", other),
        }
    }

    /// The source range of the originating node, for diagnostics.
    pub fn span(&self, ast: &Ast) -> Option<Span> {
        match self {
            Self::Decl(dref) => Some(ast.decl(*dref).span.clone()),
            Self::Expr(eref) => Some(ast.expr(*eref).span.clone()),
            Self::Stmt(sref) => Some(ast.stmt(*sref).span.clone()),
            Self::Synthetic => None,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    use larkc_ast::{ExprData, ExprKind};
    use larkc_core::TypingConstants;

    #[test]
    fn matching_tag_roundtrips() {
        let loc = Location::Expr(ExprRef(3));

        assert_eq!(loc.expr(), Some(ExprRef(3)));
        assert!(!loc.is_synthetic());
    }

    #[test]
    fn synthetic_yields_none_for_every_tag() {
        let loc = Location::Synthetic;

        assert_eq!(loc.decl(), None);
        assert_eq!(loc.expr(), None);
        assert_eq!(loc.stmt(), None);
        assert_eq!(loc.span(&Ast::new()), None);
    }

    #[test]
    #[should_panic(expected = "expected a statement location")]
    fn wrong_tag_panics() {
        let loc = Location::Expr(ExprRef(0));
        let _ = loc.stmt();
    }

    #[test]
    fn span_extraction() {
        let mut ast = Ast::new();
        let e = ast.add_expr(ExprData {
            kind: ExprKind::IntLit(7),
            ty: TypingConstants::Int,
            span: 10..12,
        });

        assert_eq!(Location::Expr(e).span(&ast), Some(10..12));
    }
}
