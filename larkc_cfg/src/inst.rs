use std::fmt::Display;
use std::slice;

use larkc_ast::{Ast, DeclRef, ExprRef, StmtRef};
use larkc_core::{BlockRef, TypeId, ValueRef};

use crate::kind::ValueKind;
use crate::location::Location;

/// The per-variant payload of an instruction.
///
/// Operands are non-owning `ValueRef`s into the owning [`Cfg`], AST-derived
/// data (literal values, referenced declarations) is never duplicated here,
/// it is read back through the instruction's [`Location`] on demand.
///
/// Variable-length operand lists are a single boxed slice built only by the
/// [`Cfg`] factories.
///
/// [`Cfg`]: crate::cfg::Cfg
#[derive(Debug, Clone)]
#[allow(missing_docs)]
pub enum InstData {
    /// Allocation of a local variable due to a `var` declaration. Produces
    /// the lvalue of the declared type.
    AllocVar,

    /// Allocation of a temporary backing an rvalue-to-lvalue
    /// materialization. The initial value is provided by an
    /// initialization-style store to the temporary.
    AllocTmp,

    /// Allocation of an array of `num_elements` uniform elements, memory
    /// left uninitialized. Produces a two-element tuple: the object header
    /// pointer and an lvalue to the first element.
    AllocArray {
        element_type: TypeId,
        num_elements: u32,
    },

    /// Application of arguments to a callable value.
    Apply {
        callee: ValueRef,
        args: Box<[ValueRef]>,
    },

    /// A reference to a constant declaration, evaluating to its value.
    ConstantRef,

    /// The default "zero" value of a variable declared without an explicit
    /// initializer.
    ZeroValue,

    IntegerLiteral,

    FloatLiteral,

    CharacterLiteral,

    StringLiteral,

    /// A read through an lvalue.
    Load {
        lvalue: ValueRef,
    },

    /// A write of `src` through the lvalue `dest`.
    ///
    /// When `is_initialization` holds the destination is known to be
    /// uninitialized and the prior value is not destroyed.
    Store {
        src: ValueRef,
        dest: ValueRef,
        is_initialization: bool,
    },

    /// A change of type that does not affect code generation.
    TypeConversion {
        operand: ValueRef,
    },

    /// A constructed tuple.
    Tuple {
        elements: Box<[ValueRef]>,
    },

    /// Production of an instance of a static metatype.
    TypeOf,

    /// Promotion of a scalar to a tuple.
    ScalarToTuple {
        operand: ValueRef,
    },

    /// Extraction of a numbered element out of a tuple-typed value.
    TupleElement {
        operand: ValueRef,
        field: u32,
    },

    /// `%1 = index-lvalue %0, 42` — strided pointer arithmetic over an
    /// lvalue of uniform elements.
    IndexLValue {
        operand: ValueRef,
        index: u32,
    },

    /// A position in the code which would be undefined to reach.
    Unreachable,

    /// Return from the current function with `value`. Unit returns carry an
    /// explicit unit value, never a missing one.
    Return {
        value: ValueRef,
    },

    /// An unconditional branch. `args` is reserved for block arguments and
    /// is always empty.
    Branch {
        dest: BlockRef,
        args: Box<[ValueRef]>,
    },

    /// A two-way branch on a boolean condition; `targets` is
    /// `[true_block, false_block]`. Both edges may name the same block.
    CondBranch {
        condition: ValueRef,
        targets: [BlockRef; 2],
    },
}

impl InstData {
    pub fn kind(&self) -> ValueKind {
        match self {
            InstData::AllocVar => ValueKind::AllocVar,
            InstData::AllocTmp => ValueKind::AllocTmp,
            InstData::AllocArray { .. } => ValueKind::AllocArray,
            InstData::Apply { .. } => ValueKind::Apply,
            InstData::ConstantRef => ValueKind::ConstantRef,
            InstData::ZeroValue => ValueKind::ZeroValue,
            InstData::IntegerLiteral => ValueKind::IntegerLiteral,
            InstData::FloatLiteral => ValueKind::FloatLiteral,
            InstData::CharacterLiteral => ValueKind::CharacterLiteral,
            InstData::StringLiteral => ValueKind::StringLiteral,
            InstData::Load { .. } => ValueKind::Load,
            InstData::Store { .. } => ValueKind::Store,
            InstData::TypeConversion { .. } => ValueKind::TypeConversion,
            InstData::Tuple { .. } => ValueKind::Tuple,
            InstData::TypeOf => ValueKind::TypeOf,
            InstData::ScalarToTuple { .. } => ValueKind::ScalarToTuple,
            InstData::TupleElement { .. } => ValueKind::TupleElement,
            InstData::IndexLValue { .. } => ValueKind::IndexLValue,
            InstData::Unreachable => ValueKind::Unreachable,
            InstData::Return { .. } => ValueKind::Return,
            InstData::Branch { .. } => ValueKind::Branch,
            InstData::CondBranch { .. } => ValueKind::CondBranch,
        }
    }

    /// The successor blocks of a terminator, in the fixed per-variant
    /// order. Empty for non-terminators.
    pub fn successors(&self) -> &[BlockRef] {
        match self {
            InstData::Branch { dest, .. } => slice::from_ref(dest),
            InstData::CondBranch { targets, .. } => targets,
            _ => &[],
        }
    }

    /// Every value operand, in evaluation order.
    pub fn operands(&self) -> Vec<ValueRef> {
        match self {
            InstData::AllocVar
            | InstData::AllocTmp
            | InstData::AllocArray { .. }
            | InstData::ConstantRef
            | InstData::ZeroValue
            | InstData::IntegerLiteral
            | InstData::FloatLiteral
            | InstData::CharacterLiteral
            | InstData::StringLiteral
            | InstData::TypeOf
            | InstData::Unreachable => vec![],

            InstData::Apply { callee, args } => {
                let mut operands = Vec::with_capacity(args.len() + 1);
                operands.push(*callee);
                operands.extend(args.iter().copied());
                operands
            }

            InstData::Load { lvalue } => vec![*lvalue],
            InstData::Store { src, dest, .. } => vec![*src, *dest],

            InstData::TypeConversion { operand }
            | InstData::ScalarToTuple { operand }
            | InstData::TupleElement { operand, .. }
            | InstData::IndexLValue { operand, .. } => vec![*operand],

            InstData::Tuple { elements } => elements.to_vec(),

            InstData::Return { value } => vec![*value],
            InstData::Branch { args, .. } => args.to_vec(),
            InstData::CondBranch { condition, .. } => vec![*condition],
        }
    }

    pub fn as_apply(&self) -> Option<(ValueRef, &[ValueRef])> {
        match self {
            InstData::Apply { callee, args } => Some((*callee, args)),
            _ => None,
        }
    }

    pub fn as_tuple(&self) -> Option<&[ValueRef]> {
        match self {
            InstData::Tuple { elements } => Some(elements),
            _ => None,
        }
    }

    pub fn as_store(&self) -> Option<(ValueRef, ValueRef, bool)> {
        match self {
            InstData::Store {
                src,
                dest,
                is_initialization,
            } => Some((*src, *dest, *is_initialization)),
            _ => None,
        }
    }

    pub fn as_load(&self) -> Option<ValueRef> {
        match self {
            InstData::Load { lvalue } => Some(*lvalue),
            _ => None,
        }
    }

    pub fn as_return(&self) -> Option<ValueRef> {
        match self {
            InstData::Return { value } => Some(*value),
            _ => None,
        }
    }

    pub fn as_branch(&self) -> Option<BlockRef> {
        match self {
            InstData::Branch { dest, .. } => Some(*dest),
            _ => None,
        }
    }

    pub fn as_cond_branch(&self) -> Option<(ValueRef, BlockRef, BlockRef)> {
        match self {
            InstData::CondBranch { condition, targets } => {
                Some((*condition, targets[0], targets[1]))
            }
            _ => None,
        }
    }

    pub fn as_tuple_element(&self) -> Option<(ValueRef, u32)> {
        match self {
            InstData::TupleElement { operand, field } => Some((*operand, *field)),
            _ => None,
        }
    }

    pub fn as_alloc_array(&self) -> Option<(TypeId, u32)> {
        match self {
            InstData::AllocArray {
                element_type,
                num_elements,
            } => Some((*element_type, *num_elements)),
            _ => None,
        }
    }
}

fn format_vec_of_values(seq: &[ValueRef]) -> String {
    seq.iter()
        .map(|value| format!("{}", value))
        .collect::<Vec<_>>()
        .join(", ")
}

impl Display for InstData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InstData::AllocVar => write!(f, "alloc-var"),
            InstData::AllocTmp => write!(f, "alloc-tmp"),

            InstData::AllocArray {
                element_type,
                num_elements,
            } => write!(f, "alloc-array {} x {:?}", num_elements, element_type),

            InstData::Apply { callee, args } => {
                write!(f, "apply {} [{}]", callee, format_vec_of_values(args))
            }

            InstData::ConstantRef => write!(f, "constant-ref"),
            InstData::ZeroValue => write!(f, "zero-value"),
            InstData::IntegerLiteral => write!(f, "int-literal"),
            InstData::FloatLiteral => write!(f, "float-literal"),
            InstData::CharacterLiteral => write!(f, "char-literal"),
            InstData::StringLiteral => write!(f, "str-literal"),

            InstData::Load { lvalue } => write!(f, "load {}", lvalue),

            InstData::Store {
                src,
                dest,
                is_initialization,
            } => write!(
                f,
                "store {} -> {}{}",
                src,
                dest,
                if *is_initialization { " [init]" } else { "" }
            ),

            InstData::TypeConversion { operand } => write!(f, "convert {}", operand),

            InstData::Tuple { elements } => {
                write!(f, "tuple [{}]", format_vec_of_values(elements))
            }

            InstData::TypeOf => write!(f, "type-of"),
            InstData::ScalarToTuple { operand } => write!(f, "scalar-to-tuple {}", operand),

            InstData::TupleElement { operand, field } => {
                write!(f, "tuple-element {}, {}", operand, field)
            }

            InstData::IndexLValue { operand, index } => {
                write!(f, "index-lvalue {}, {}", operand, index)
            }

            InstData::Unreachable => write!(f, "unreachable"),
            InstData::Return { value } => write!(f, "return {}", value),
            InstData::Branch { dest, .. } => write!(f, "branch {}", dest),

            InstData::CondBranch { condition, targets } => {
                write!(f, "cond-branch {} {}, {}", condition, targets[0], targets[1])
            }
        }
    }
}

/// An instruction: the producer of at most one typed value, a member of at
/// most one basic block.
///
/// The parent back-reference is maintained exclusively by the owning
/// [`Cfg`]'s list operations, never directly.
///
/// [`Cfg`]: crate::cfg::Cfg
#[derive(Debug, Clone)]
pub struct Instruction {
    data: InstData,
    ty: TypeId,
    parent: Option<BlockRef>,
    loc: Location,
}

impl Instruction {
    pub(crate) fn new(data: InstData, ty: TypeId, loc: Location) -> Self {
        Self {
            data,
            ty,
            parent: None,
            loc,
        }
    }

    pub fn kind(&self) -> ValueKind {
        self.data.kind()
    }

    pub fn data(&self) -> &InstData {
        &self.data
    }

    pub(crate) fn data_mut(&mut self) -> &mut InstData {
        &mut self.data
    }

    /// The type of the produced value.
    pub fn ty(&self) -> TypeId {
        self.ty
    }

    /// The containing block, `None` while detached.
    pub fn parent(&self) -> Option<BlockRef> {
        self.parent
    }

    pub(crate) fn set_parent(&mut self, parent: Option<BlockRef>) {
        self.parent = parent;
    }

    pub fn loc(&self) -> Location {
        self.loc
    }

    pub fn is_terminator(&self) -> bool {
        self.kind().is_terminator()
    }

    pub fn is_allocation(&self) -> bool {
        self.kind().is_allocation()
    }

    /// See [`InstData::successors`].
    pub fn successors(&self) -> &[BlockRef] {
        self.data.successors()
    }

    /// The declaration this instruction was produced from, `None` if it is
    /// implicitly generated. Panics on locations that come from expressions
    /// or statements.
    pub fn loc_decl(&self) -> Option<DeclRef> {
        self.loc.decl()
    }

    /// The expression this instruction was produced from, `None` if it is
    /// implicitly generated. Panics on locations that come from
    /// declarations or statements.
    pub fn loc_expr(&self) -> Option<ExprRef> {
        self.loc.expr()
    }

    /// The statement this instruction was produced from, `None` if it is
    /// implicitly generated. Panics on locations that come from
    /// declarations or expressions.
    pub fn loc_stmt(&self) -> Option<StmtRef> {
        self.loc.stmt()
    }

    /// The integer value of an `IntegerLiteral`, read back from the backing
    /// AST node. `None` for every other kind.
    pub fn int_value(&self, ast: &Ast) -> Option<i64> {
        match self.data {
            InstData::IntegerLiteral => self.loc.expr().and_then(|e| ast.expr(e).as_int_lit()),
            _ => None,
        }
    }

    /// The value of a `FloatLiteral`, `None` for every other kind.
    pub fn float_value(&self, ast: &Ast) -> Option<f64> {
        match self.data {
            InstData::FloatLiteral => self.loc.expr().and_then(|e| ast.expr(e).as_float_lit()),
            _ => None,
        }
    }

    /// The value of a `CharacterLiteral`, `None` for every other kind.
    pub fn char_value(&self, ast: &Ast) -> Option<char> {
        match self.data {
            InstData::CharacterLiteral => self.loc.expr().and_then(|e| ast.expr(e).as_char_lit()),
            _ => None,
        }
    }

    /// The string data of a `StringLiteral`, `None` for every other kind.
    pub fn str_value<'a>(&self, ast: &'a Ast) -> Option<&'a str> {
        match self.data {
            InstData::StringLiteral => self
                .loc
                .expr()
                .and_then(|e| ast.expr(e).as_str_lit()),
            _ => None,
        }
    }

    /// The declaration behind an `AllocVar` or `ZeroValue`, `None` for
    /// every other kind.
    pub fn alloc_decl(&self) -> Option<DeclRef> {
        match self.data {
            InstData::AllocVar | InstData::ZeroValue => self.loc.decl(),
            _ => None,
        }
    }

    /// The declaration a `ConstantRef` refers to, resolved through its
    /// backing declaration-reference expression. `None` for every other
    /// kind.
    pub fn constant_decl(&self, ast: &Ast) -> Option<DeclRef> {
        match self.data {
            InstData::ConstantRef => self.loc.expr().and_then(|e| ast.expr(e).as_decl_ref()),
            _ => None,
        }
    }
}
