//! IR lowering core for the MatchIR graph query compiler.
//!
//! The front end parses a graph query into a flat, ordered sequence of IR
//! blocks; the backend turns lowered blocks into MATCH pattern text. This
//! crate is the middle tier between them: a set of independent, composable
//! passes that rewrite and analyze the block sequence. Nested constructs
//! (optional scopes, folded sub-traversals) are kept linear and delimited by
//! paired begin/end marker blocks, so every scope-aware pass here is a stack
//! machine over a single scan rather than a tree walk.
//!
//! Passes never mutate their input: each one takes a block slice and returns
//! a fresh sequence or derived lookup structure, so independent compilations
//! can run concurrently without coordination.

pub mod errors;
pub mod ir;
pub mod lowering;
