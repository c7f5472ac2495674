//! The type-checking pass: computes the type of every expression and
//! validates every statement against the language's coercion rules.

pub mod type_checker;

#[cfg(test)]
mod tests;
