//! Fundamental types shared across the larkc crates.
//!
//! Most resources have two representations:
//!
//! * A "fat", complete, and not-cheap-to-clone one holding all the metadata.
//! * A "cheap", small, and unambiguous reference to the complete information
//!   that you can throw around copies of everywhere.
//!
//! The naming scheme is a regular name for the fat representation and the
//! name with a "Ref" or "Id" suffix for the cheap one, i.e. `SpanData` and
//! `SpanRef` or `LarkType` and `TypeId`.

#[macro_use]
mod macros;

pub mod error;
pub mod span;
pub mod typing;
pub mod utils;
pub mod value;

pub use {error::*, span::*, typing::*, value::*};
