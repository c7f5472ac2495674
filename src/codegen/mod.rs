//! The intermediate-code generator: one more walk over the checked
//! tree, emitting one text line per evaluated construct.

pub mod codegen;
pub mod expr;
pub mod stmt;
