//! The syntax tree handed over by the parser.
//!
//! The semantic passes only read the tree; the single mutation is the
//! scope-id annotation written by the scope builder.

pub mod ast;

#[cfg(test)]
mod tests;
