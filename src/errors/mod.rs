//! Semantic diagnostics: the error taxonomy and the append-only
//! collector threaded through the passes.

pub mod errors;
