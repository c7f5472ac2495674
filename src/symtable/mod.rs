//! The symbol table: a forest of lexical scopes built in one pass over
//! the tree and replayed by the type checker and the code generator.

pub mod build;
pub mod symtable;
