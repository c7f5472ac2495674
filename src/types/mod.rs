//! Type signatures for symbols, expressions and functions.

pub mod types;

#[cfg(test)]
mod tests;
