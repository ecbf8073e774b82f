use crate::{
    errors::LoweringError,
    ir::{
        location::{Location, validate_safe_string},
        metadata::TypeRef,
    },
};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

/// Operand of `Filter` and `ConstructResult` blocks. Equality is structural,
/// so literal variants need no interning: any two `NullLiteral`s compare
/// equal no matter where they were built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expression {
    NullLiteral,
    TrueLiteral,
    FalseLiteral,
    /// A field on the vertex at the current traversal position.
    LocalField(String),
    /// A runtime query parameter.
    Variable(String),
    /// Reference to a field or vertex at a location, resolved from the
    /// global traversal context.
    ContextField {
        location: Location,
        field_type: TypeRef,
    },
    /// "Does this optional- or fold-introduced location exist in this result
    /// row?" Not directly renderable; the existence lowering pass replaces
    /// every one of these with a null-comparison.
    ContextFieldExistence { location: Location },
    /// Vertex reference used only inside `ConstructResult` blocks; valid
    /// only over whole-vertex locations. Build through
    /// [`Expression::output_context_vertex`].
    OutputContextVertex {
        location: Location,
        field_type: TypeRef,
    },
    BinaryComposition {
        operator: BinaryOperator,
        left: Box<Expression>,
        right: Box<Expression>,
    },
    TernaryConditional {
        predicate: Box<Expression>,
        if_true: Box<Expression>,
        if_false: Box<Expression>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinaryOperator {
    Equal,
    NotEqual,
    And,
    Or,
    GreaterThan,
    GreaterThanOrEqual,
    LessThan,
    LessThanOrEqual,
}

impl BinaryOperator {
    /// The operator that negates this one, where that inversion is known.
    /// Only the equality pair can be inverted without evaluating operands.
    pub fn inverse(&self) -> Option<BinaryOperator> {
        match self {
            BinaryOperator::Equal => Some(BinaryOperator::NotEqual),
            BinaryOperator::NotEqual => Some(BinaryOperator::Equal),
            _ => None,
        }
    }
}

impl Display for BinaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BinaryOperator::Equal => write!(f, "="),
            BinaryOperator::NotEqual => write!(f, "!="),
            BinaryOperator::And => write!(f, "&&"),
            BinaryOperator::Or => write!(f, "||"),
            BinaryOperator::GreaterThan => write!(f, ">"),
            BinaryOperator::GreaterThanOrEqual => write!(f, ">="),
            BinaryOperator::LessThan => write!(f, "<"),
            BinaryOperator::LessThanOrEqual => write!(f, "<="),
        }
    }
}

impl Expression {
    pub fn binary(operator: BinaryOperator, left: Expression, right: Expression) -> Self {
        Expression::BinaryComposition {
            operator,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Builds an `OutputContextVertex`, rejecting locations that carry a
    /// field component: vertex-context references must denote whole vertices.
    pub fn output_context_vertex(
        location: Location,
        field_type: TypeRef,
    ) -> Result<Expression, LoweringError> {
        if location.field.is_some() {
            return Err(LoweringError::FieldInVertexContext { location });
        }
        Ok(Expression::OutputContextVertex {
            location,
            field_type,
        })
    }

    pub fn kind_str(&self) -> &'static str {
        match self {
            Expression::NullLiteral => "NullLiteral",
            Expression::TrueLiteral => "TrueLiteral",
            Expression::FalseLiteral => "FalseLiteral",
            Expression::LocalField(_) => "LocalField",
            Expression::Variable(_) => "Variable",
            Expression::ContextField { .. } => "ContextField",
            Expression::ContextFieldExistence { .. } => "ContextFieldExistence",
            Expression::OutputContextVertex { .. } => "OutputContextVertex",
            Expression::BinaryComposition { .. } => "BinaryComposition",
            Expression::TernaryConditional { .. } => "TernaryConditional",
        }
    }

    /// Rebuilds this expression bottom-up: children are rewritten first,
    /// then `visitor` is applied to the rebuilt node itself. The input is
    /// left untouched; the rewrite yields a fresh tree. Every lowering pass
    /// that touches expressions goes through this one capability rather than
    /// walking trees itself.
    pub fn visit_and_update<F>(&self, visitor: &mut F) -> Result<Expression, LoweringError>
    where
        F: FnMut(Expression) -> Result<Expression, LoweringError>,
    {
        match self {
            Expression::BinaryComposition {
                operator,
                left,
                right,
            } => {
                let left = left.visit_and_update(visitor)?;
                let right = right.visit_and_update(visitor)?;
                visitor(Expression::binary(*operator, left, right))
            }
            Expression::TernaryConditional {
                predicate,
                if_true,
                if_false,
            } => {
                let predicate = predicate.visit_and_update(visitor)?;
                let if_true = if_true.visit_and_update(visitor)?;
                let if_false = if_false.visit_and_update(visitor)?;
                visitor(Expression::TernaryConditional {
                    predicate: Box::new(predicate),
                    if_true: Box::new(if_true),
                    if_false: Box::new(if_false),
                })
            }
            Expression::NullLiteral
            | Expression::TrueLiteral
            | Expression::FalseLiteral
            | Expression::LocalField(_)
            | Expression::Variable(_)
            | Expression::ContextField { .. }
            | Expression::ContextFieldExistence { .. }
            | Expression::OutputContextVertex { .. } => visitor(self.clone()),
        }
    }

    /// Renders this expression as MATCH query text. Only
    /// `OutputContextVertex` is renderable at this layer: it yields its
    /// scope's mark name, checked to be a safe identifier. The backend
    /// generator owns rendering for everything else.
    pub fn to_match(&self) -> Result<String, LoweringError> {
        match self {
            Expression::OutputContextVertex { location, .. } => {
                if location.field.is_some() {
                    return Err(LoweringError::FieldInVertexContext {
                        location: location.clone(),
                    });
                }
                let (mark_name, _) = location.get_location_name();
                validate_safe_string(&mark_name)?;
                Ok(mark_name)
            }
            other => Err(LoweringError::NotRenderable {
                kind: other.kind_str(),
            }),
        }
    }
}
