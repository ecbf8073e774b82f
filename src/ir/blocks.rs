use crate::{
    errors::LoweringError,
    ir::{
        expressions::Expression,
        location::{FoldScopeLocation, Location},
    },
};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

/// One step of the linear traversal plan produced by the front end.
///
/// The sequence is deliberately flat: nested constructs are delimited by
/// paired `Fold`/`Unfold` and optional-`Traverse`/`EndOptional` markers, and
/// the lowering passes reconstruct the scope structure by scanning. The
/// well-nesting invariants live with the passes that enforce them; a
/// violation always means a bug in the upstream producer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum IrBlock {
    /// The class the traversal starts from.
    QueryRoot { start_class: String },
    /// Declares that the preceding traversal step now occupies `location`;
    /// establishes the current location until the next `MarkLocation`.
    MarkLocation(Location),
    /// Move along an edge. `optional` marks the traverse as opening an
    /// `@optional` scope, closed by a later `EndOptional`.
    Traverse {
        direction: EdgeDirection,
        edge_name: String,
        optional: bool,
    },
    /// Recursive traversal up to `depth` repetitions of the edge. Behaves
    /// like `Traverse` for scope-complexity purposes but cannot itself be
    /// optional.
    Recurse {
        direction: EdgeDirection,
        edge_name: String,
        depth: u32,
    },
    /// Attach a predicate to the current location.
    Filter(Expression),
    /// Open a folded sub-traversal, closed by the matching `Unfold`.
    Fold(FoldScopeLocation),
    Unfold,
    /// Close the innermost open `@optional` scope.
    EndOptional,
    /// Narrow the current location to a subtype.
    CoerceType { target_class: String },
    /// Return to a previously marked location.
    Backtrack { location: Location },
    /// The terminal output projection, mapping output names to the
    /// expressions that produce them.
    ConstructResult(IndexMap<String, Expression>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EdgeDirection {
    In,
    Out,
}

impl Display for EdgeDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EdgeDirection::In => write!(f, "in"),
            EdgeDirection::Out => write!(f, "out"),
        }
    }
}

impl IrBlock {
    pub fn out_traverse(edge_name: impl Into<String>) -> Self {
        IrBlock::Traverse {
            direction: EdgeDirection::Out,
            edge_name: edge_name.into(),
            optional: false,
        }
    }

    pub fn optional_out_traverse(edge_name: impl Into<String>) -> Self {
        IrBlock::Traverse {
            direction: EdgeDirection::Out,
            edge_name: edge_name.into(),
            optional: true,
        }
    }

    /// The direction-qualified edge field this block traverses, e.g.
    /// `out_Animal_ParentOf`. `None` for non-traversal blocks.
    pub fn field_name(&self) -> Option<String> {
        match self {
            IrBlock::Traverse {
                direction,
                edge_name,
                ..
            }
            | IrBlock::Recurse {
                direction,
                edge_name,
                ..
            } => Some(format!("{direction}_{edge_name}")),
            _ => None,
        }
    }

    /// Applies `visitor` to every expression contained in this block,
    /// bottom-up, returning a new block of the same kind. Blocks without
    /// expressions come back as plain clones.
    pub fn visit_and_update_expressions<F>(&self, visitor: &mut F) -> Result<IrBlock, LoweringError>
    where
        F: FnMut(Expression) -> Result<Expression, LoweringError>,
    {
        match self {
            IrBlock::Filter(predicate) => {
                Ok(IrBlock::Filter(predicate.visit_and_update(visitor)?))
            }
            IrBlock::ConstructResult(fields) => {
                let mut new_fields = IndexMap::with_capacity(fields.len());
                for (output_name, expression) in fields {
                    new_fields.insert(output_name.clone(), expression.visit_and_update(visitor)?);
                }
                Ok(IrBlock::ConstructResult(new_fields))
            }
            IrBlock::QueryRoot { .. }
            | IrBlock::MarkLocation(_)
            | IrBlock::Traverse { .. }
            | IrBlock::Recurse { .. }
            | IrBlock::Fold(_)
            | IrBlock::Unfold
            | IrBlock::EndOptional
            | IrBlock::CoerceType { .. }
            | IrBlock::Backtrack { .. } => Ok(self.clone()),
        }
    }
}
