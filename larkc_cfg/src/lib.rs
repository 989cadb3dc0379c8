//! The control-flow-graph IR for Lark function bodies.
//!
//! This sits between the typed AST and code generation: expression
//! evaluation is linearized into straight-line sequences of named values,
//! control flow is explicit through basic blocks ending in terminators,
//! and memory operations (allocation, load, store, lvalue indexing) are
//! first-class instructions.
//!
//! All storage is owned by a [`Cfg`] context; instructions and blocks are
//! referred to through the cheap `ValueRef`/`BlockRef` handles of
//! `larkc_core` and freed in bulk when the context is dropped.

pub mod block;
pub mod cfg;
pub mod graph;
pub mod inst;
pub mod kind;
pub mod location;
pub mod verify;

pub use block::BasicBlock;
pub use cfg::Cfg;
pub use graph::{block_graph, BlockGraph, CfgEdge};
pub use inst::{InstData, Instruction};
pub use kind::ValueKind;
pub use location::Location;
pub use verify::verify;

#[cfg(test)]
mod test;
