use larkc_core::{Span, SpanRef, TypeId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum DeclKind {
    /// A mutable `var` binding.
    Var,

    /// An immutable or global binding, referenced through `ConstantRef`.
    Constant,
}

/// A named, typed declaration.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct DeclData {
    pub name: SpanRef,
    pub ty: TypeId,
    pub kind: DeclKind,
    pub span: Span,
}

impl DeclData {
    pub fn is_constant(&self) -> bool {
        matches!(self.kind, DeclKind::Constant)
    }
}
