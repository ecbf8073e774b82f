use crate::ir::location::{FoldScopeLocation, Location};
use thiserror::Error;

/// Errors raised by the lowering passes. Every variant signals a violated
/// internal invariant, either a malformed block sequence handed down from an
/// upstream pass or an IR node that cannot be represented in the output
/// query language. None of these are user errors and none are recoverable:
/// callers abort the compilation and surface a diagnostic.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum LoweringError {
    #[error("Fold scope opened while another fold scope is still open: {fold}")]
    FoldWithinFold { fold: FoldScopeLocation },

    #[error("Unfold encountered outside of any fold scope")]
    UnmatchedUnfold,

    #[error("EndOptional encountered with no open optional scope")]
    UnmatchedEndOptional,

    #[error("Optional traverse along `{edge_name}` has no preceding MarkLocation")]
    OptionalTraverseWithoutLocation { edge_name: String },

    #[error("Expected a location at a vertex, but got: {location}")]
    FieldInVertexContext { location: Location },

    #[error("Mark name is not a safe identifier: {name:?}")]
    UnsafeName { name: String },

    #[error("Expression of kind `{kind}` has no MATCH representation")]
    NotRenderable { kind: &'static str },

    #[error("No location info registered for {location}")]
    UnregisteredLocation { location: Location },
}
