use crate::{
    errors::LoweringError,
    ir::{
        blocks::IrBlock,
        expressions::{BinaryOperator, Expression},
    },
};

/// Merges every maximal run of consecutive `Filter` blocks into a single
/// `Filter` whose predicate is the left-to-right `&&` of the run's
/// predicates: `Filter(x), Filter(y)` becomes `Filter(x && y)`. All other
/// blocks, and non-adjacent filters, keep their identity and relative order.
///
/// Single scan with O(1) look-back at the last emitted block.
pub fn merge_consecutive_filter_clauses(ir_blocks: &[IrBlock]) -> Vec<IrBlock> {
    let mut new_ir_blocks: Vec<IrBlock> = Vec::with_capacity(ir_blocks.len());

    for block in ir_blocks {
        if let IrBlock::Filter(predicate) = block
            && let Some(IrBlock::Filter(merged)) = new_ir_blocks.last_mut()
        {
            *merged = Expression::binary(BinaryOperator::And, merged.clone(), predicate.clone());
        } else {
            new_ir_blocks.push(block.clone());
        }
    }

    new_ir_blocks
}

/// Simplifies comparisons of a boolean comparison against a boolean literal,
/// without evaluating the inner comparison:
/// - identity elimination: `(x != null) = true` becomes `x != null`, and
///   likewise `(x != null) != false`;
/// - double-negation elimination: `(x != null) = false` becomes `x = null`,
///   and likewise `(x != null) != true`.
///
/// The inner comparison's operator must have a known inverse (`=`/`!=`) for
/// the negating cases; anything else is returned unchanged. Typically run
/// after [`lower_context_field_existence`], which introduces exactly these
/// shapes.
///
/// [`lower_context_field_existence`]: crate::lowering::existence::lower_context_field_existence
pub fn optimize_boolean_expression_comparisons(
    ir_blocks: &[IrBlock],
) -> Result<Vec<IrBlock>, LoweringError> {
    let mut new_ir_blocks = Vec::with_capacity(ir_blocks.len());
    for block in ir_blocks {
        new_ir_blocks
            .push(block.visit_and_update_expressions(&mut |e| Ok(rewrite_comparison(e)))?);
    }
    Ok(new_ir_blocks)
}

fn rewrite_comparison(expression: Expression) -> Expression {
    let rewritten = match &expression {
        Expression::BinaryComposition {
            operator,
            left,
            right,
        } => simplified_comparison(*operator, left, right),
        _ => None,
    };
    rewritten.unwrap_or(expression)
}

fn simplified_comparison(
    operator: BinaryOperator,
    left: &Expression,
    right: &Expression,
) -> Option<Expression> {
    // The literal for which the comparison is the inner expression itself,
    // and the literal for which it is the inner expression negated.
    let (identity_literal, inverse_literal) = match operator {
        BinaryOperator::Equal => (Expression::TrueLiteral, Expression::FalseLiteral),
        BinaryOperator::NotEqual => (Expression::FalseLiteral, Expression::TrueLiteral),
        _ => return None,
    };

    let left_is_composition = matches!(left, Expression::BinaryComposition { .. });
    let right_is_composition = matches!(right, Expression::BinaryComposition { .. });
    if !left_is_composition && !right_is_composition {
        return None;
    }

    if *left == identity_literal && right_is_composition {
        return Some(right.clone());
    }
    if *right == identity_literal && left_is_composition {
        return Some(left.clone());
    }

    let expression_to_rewrite = if *left == inverse_literal && right_is_composition {
        right
    } else if *right == inverse_literal && left_is_composition {
        left
    } else {
        return None;
    };

    let Expression::BinaryComposition {
        operator: inner_operator,
        left: inner_left,
        right: inner_right,
    } = expression_to_rewrite
    else {
        return None;
    };

    // Without a known inverse the inner comparison cannot be negated.
    inner_operator.inverse().map(|inverted| Expression::BinaryComposition {
        operator: inverted,
        left: inner_left.clone(),
        right: inner_right.clone(),
    })
}
